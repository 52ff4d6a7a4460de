//! ### English
//! Bounded, yielding spin wait.
//!
//! ### 中文
//! 有界、会让出调度的自旋等待。

use std::time::{Duration, Instant};

use super::{Backoff, deadline_after};

/// ### English
/// Result of a [`spin_until`] call.
///
/// ### 中文
/// [`spin_until`] 的返回结果。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SpinOutcome {
    /// ### English
    /// The predicate became true.
    ///
    /// ### 中文
    /// 谓词已成立。
    Satisfied,
    /// ### English
    /// The hard cap elapsed first.
    ///
    /// ### 中文
    /// 先到达了硬性上限时间。
    TimedOut,
}

/// ### English
/// Re-evaluates `done` until it returns `true` or `cap` elapses, backing off between checks.
///
/// `done` is expected to take and release the shared lock itself, so the lock is never held
/// while this thread spins or yields.
///
/// ### 中文
/// 反复求值 `done`，直到其返回 `true` 或超过 `cap`，每次检查之间执行退避。
///
/// `done` 应自行获取并释放共享锁，因此自旋或让出调度期间不会持有该锁。
pub(crate) fn spin_until(cap: Duration, mut done: impl FnMut() -> bool) -> SpinOutcome {
    let deadline = deadline_after(cap);
    let mut backoff = Backoff::new();
    loop {
        if done() {
            return SpinOutcome::Satisfied;
        }
        if backoff.is_yielding() && deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            return SpinOutcome::TimedOut;
        }
        backoff.snooze();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::thread;

    use super::*;

    #[test]
    fn returns_as_soon_as_predicate_holds() {
        let mut calls = 0;
        let outcome = spin_until(Duration::from_secs(1), || {
            calls += 1;
            calls == 3
        });
        assert_eq!(outcome, SpinOutcome::Satisfied);
        assert_eq!(calls, 3);
    }

    #[test]
    fn gives_up_after_cap() {
        let start = Instant::now();
        let outcome = spin_until(Duration::from_millis(20), || false);
        assert_eq!(outcome, SpinOutcome::TimedOut);
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn observes_flag_set_by_another_thread() {
        let flag = Arc::new(AtomicBool::new(false));
        let setter = {
            let flag = flag.clone();
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(5));
                flag.store(true, Ordering::Release);
            })
        };
        let outcome = spin_until(Duration::from_secs(5), || flag.load(Ordering::Acquire));
        setter.join().unwrap();
        assert_eq!(outcome, SpinOutcome::Satisfied);
    }

    #[test]
    fn unbounded_cap_spins_until_satisfied() {
        let mut calls = 0;
        let outcome = spin_until(Duration::MAX, || {
            calls += 1;
            calls == 200
        });
        assert_eq!(outcome, SpinOutcome::Satisfied);
    }
}
