//! ### English
//! Binary semaphore used as the render worker's main-loop gate.
//!
//! ### 中文
//! 作为渲染工作线程主循环闸门使用的二值信号量。

use std::time::Duration;

use parking_lot::{Condvar, Mutex};

use super::deadline_after;

/// ### English
/// Single-permit wake gate.
///
/// `set()` stores one permit (setting twice still stores one), `wait()` blocks until a permit
/// exists and consumes it, `reset()` drops a permit left over from an earlier `set()`.
///
/// ### 中文
/// 单许可唤醒闸门。
///
/// `set()` 存入一个许可（重复 set 仍然只有一个），`wait()` 阻塞直到有许可并消费它，
/// `reset()` 丢弃之前 `set()` 遗留的许可。
#[derive(Default)]
pub struct Gate {
    permit: Mutex<bool>,
    cond: Condvar,
}

impl Gate {
    pub fn new() -> Self {
        Self::default()
    }

    /// ### English
    /// Stores the permit and wakes one waiter.
    ///
    /// ### 中文
    /// 存入许可并唤醒一个等待者。
    pub fn set(&self) {
        let mut permit = self.permit.lock();
        *permit = true;
        self.cond.notify_one();
    }

    /// ### English
    /// Drops a pending permit, if any.
    ///
    /// ### 中文
    /// 丢弃尚未被消费的许可（若存在）。
    pub fn reset(&self) {
        *self.permit.lock() = false;
    }

    pub fn is_set(&self) -> bool {
        *self.permit.lock()
    }

    /// ### English
    /// Blocks until the gate is set, then consumes the permit.
    ///
    /// ### 中文
    /// 阻塞直到闸门被 set，然后消费该许可。
    pub fn wait(&self) {
        let mut permit = self.permit.lock();
        while !*permit {
            self.cond.wait(&mut permit);
        }
        *permit = false;
    }

    /// ### English
    /// Like [`Self::wait`] but gives up after `timeout`. Returns `true` if a permit was consumed.
    /// A timeout too large to form a deadline waits like [`Self::wait`].
    ///
    /// ### 中文
    /// 与 [`Self::wait`] 相同，但超过 `timeout` 后放弃。成功消费许可时返回 `true`。
    /// 过大而无法构成截止时间的 `timeout` 与 [`Self::wait`] 行为一致。
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let deadline = deadline_after(timeout);
        let mut permit = self.permit.lock();
        while !*permit {
            match deadline {
                Some(deadline) => {
                    if self.cond.wait_until(&mut permit, deadline).timed_out() {
                        break;
                    }
                }
                None => self.cond.wait(&mut permit),
            }
        }
        let consumed = *permit;
        *permit = false;
        consumed
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;

    #[test]
    fn wait_consumes_the_permit() {
        let gate = Gate::new();
        gate.set();
        gate.set();
        assert!(gate.wait_timeout(Duration::from_millis(10)));
        assert!(!gate.is_set());
        assert!(!gate.wait_timeout(Duration::from_millis(10)));
    }

    #[test]
    fn reset_drops_stale_permit() {
        let gate = Gate::new();
        gate.set();
        gate.reset();
        assert!(!gate.wait_timeout(Duration::from_millis(10)));
    }

    #[test]
    fn set_wakes_a_blocked_waiter() {
        let gate = Arc::new(Gate::new());
        let waiter = {
            let gate = gate.clone();
            thread::spawn(move || gate.wait())
        };
        thread::sleep(Duration::from_millis(20));
        gate.set();
        waiter.join().unwrap();
        assert!(!gate.is_set());
    }

    #[test]
    fn unbounded_timeout_waits_for_set() {
        let gate = Arc::new(Gate::new());
        let setter = {
            let gate = gate.clone();
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(10));
                gate.set();
            })
        };
        assert!(gate.wait_timeout(Duration::MAX));
        setter.join().unwrap();
    }
}
