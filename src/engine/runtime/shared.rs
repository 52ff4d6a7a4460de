//! ### English
//! Cross-thread lifecycle state: one lock, one condition variable and the main-loop gate.
//!
//! ### 中文
//! 跨线程的生命周期状态：一把锁、一个条件变量以及主循环闸门。

use std::sync::Arc;
use std::time::Duration;

use dpi::PhysicalSize;
use parking_lot::{Condvar, Mutex, MutexGuard};

use crate::engine::error::LifecycleError;
use crate::engine::options::NORMAL_THREAD_PRIORITY;
use crate::engine::signal::{Gate, deadline_after};

use super::state::LifecycleState;

/// ### English
/// Everything the UI thread and the render worker both read or write.
///
/// Requests are written by the UI thread only, which also clears the `*_processed` flags when
/// it issues one; only the worker sets them.
///
/// ### 中文
/// UI 线程与渲染工作线程都会读写的全部状态。
///
/// 请求只由 UI 线程写入，UI 线程发出请求时同时清除对应的 `*_processed` 标记；只有工作线程会将其置位。
#[derive(Debug)]
pub(crate) struct SharedState {
    pub(crate) state: LifecycleState,
    pub(crate) host_surface_available: bool,
    pub(crate) surface_size: PhysicalSize<u32>,
    pub(crate) surface_ever_created: bool,
    pub(crate) cancel_requested: bool,
    /// ### English
    /// `false` while a resume requested by the host (`run`/`resume`) has not reached `Running`.
    /// A worker-initiated re-resume after the host surface returns leaves it untouched.
    ///
    /// ### 中文
    /// 宿主（`run`/`resume`）请求的恢复尚未到达 `Running` 时为 `false`。
    /// 宿主 surface 回来后由工作线程自行发起的重新恢复不会改变它。
    pub(crate) resume_processed: bool,
    pub(crate) exit_processed: bool,
    pub(crate) pause_resume_balance: i32,
    /// ### English
    /// Priority sampled on the UI thread during the last control call.
    ///
    /// ### 中文
    /// 最近一次控制调用时在 UI 线程上采样的优先级。
    pub(crate) ui_priority: i32,
    pub(crate) last_error: Option<Arc<LifecycleError>>,
}

impl Default for SharedState {
    fn default() -> Self {
        Self {
            state: LifecycleState::Exited,
            host_surface_available: false,
            surface_size: PhysicalSize::new(0, 0),
            surface_ever_created: false,
            cancel_requested: false,
            resume_processed: false,
            exit_processed: true,
            pause_resume_balance: 0,
            ui_priority: NORMAL_THREAD_PRIORITY,
            last_error: None,
        }
    }
}

/// ### English
/// The single authority for lifecycle state.
///
/// Every read and write goes through [`Self::lock`]; waiters block on the condition variable,
/// which is notified after every change. The worker additionally parks on `main_loop_gate`
/// while paused.
///
/// ### 中文
/// 生命周期状态的唯一权威。
///
/// 所有读写都经由 [`Self::lock`]；等待方阻塞在条件变量上，每次变更后都会通知。
/// 暂停期间工作线程还会额外停在 `main_loop_gate` 上。
#[derive(Default)]
pub(crate) struct LifecycleShared {
    inner: Mutex<SharedState>,
    changed: Condvar,
    pub(crate) main_loop_gate: Gate,
}

impl LifecycleShared {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub(crate) fn lock(&self) -> MutexGuard<'_, SharedState> {
        self.inner.lock()
    }

    /// ### English
    /// Runs `f` under the lock and wakes every waiter afterwards.
    ///
    /// ### 中文
    /// 在锁内执行 `f`，之后唤醒所有等待者。
    pub(crate) fn update<R>(&self, f: impl FnOnce(&mut SharedState) -> R) -> R {
        let result = {
            let mut inner = self.inner.lock();
            f(&mut inner)
        };
        self.changed.notify_all();
        result
    }

    pub(crate) fn state(&self) -> LifecycleState {
        self.inner.lock().state
    }

    /// ### English
    /// Worker-side compare-and-advance.
    ///
    /// Returns `Ok(false)` when the UI thread already replaced `from` with a newer request; that
    /// request wins and is handled on the next iteration. A move outside the worker transition
    /// table is a protocol violation.
    ///
    /// ### 中文
    /// 工作线程侧的“比较并推进”。
    ///
    /// 若 UI 线程已经用更新的请求替换了 `from`，返回 `Ok(false)`；该请求优先，并在下一次迭代中处理。
    /// 超出工作线程转移表的转移视为协议违规。
    pub(crate) fn advance(
        &self,
        from: LifecycleState,
        to: LifecycleState,
    ) -> Result<bool, LifecycleError> {
        if !from.can_advance_to(to) {
            return Err(LifecycleError::ProtocolViolation { from, to });
        }
        Ok(self.update(|inner| {
            if inner.state != from {
                return false;
            }
            inner.state = to;
            true
        }))
    }

    /// ### English
    /// Worker-side `ResumingRequested -> Running`.
    ///
    /// Returns `None` when a newer request replaced the resume, otherwise `Some(host_requested)`:
    /// `true` when this completes a resume the host asked for, `false` for the worker's own
    /// recovery after the host surface came back.
    ///
    /// ### 中文
    /// 工作线程侧的 `ResumingRequested -> Running`。
    ///
    /// 若恢复已被更新的请求替换则返回 `None`，否则返回 `Some(host_requested)`：
    /// 完成的是宿主请求的恢复时为 `true`，宿主 surface 回来后工作线程自行恢复时为 `false`。
    pub(crate) fn complete_resume(&self) -> Option<bool> {
        self.update(|inner| {
            if inner.state != LifecycleState::ResumingRequested {
                return None;
            }
            inner.state = LifecycleState::Running;
            let host_requested = !inner.resume_processed;
            inner.resume_processed = true;
            Some(host_requested)
        })
    }

    /// ### English
    /// Blocks until `done` holds or `timeout` elapses. Returns whether `done` held.
    /// `Duration::MAX` (or any timeout past the `Instant` range) waits without a deadline.
    ///
    /// ### 中文
    /// 阻塞直到 `done` 成立或超过 `timeout`。返回 `done` 是否成立。
    /// `Duration::MAX`（或任何超出 `Instant` 范围的超时）表示不设截止时间地等待。
    pub(crate) fn wait_until(
        &self,
        mut done: impl FnMut(&SharedState) -> bool,
        timeout: Duration,
    ) -> bool {
        let deadline = deadline_after(timeout);
        let mut inner = self.inner.lock();
        while !done(&inner) {
            match deadline {
                Some(deadline) => {
                    if self.changed.wait_until(&mut inner, deadline).timed_out() {
                        return done(&inner);
                    }
                }
                None => self.changed.wait(&mut inner),
            }
        }
        true
    }

    /// ### English
    /// Worker sleep while a resume waits for the host surface; returns early on any change.
    ///
    /// ### 中文
    /// 恢复请求等待宿主 surface 时工作线程的休眠；任何状态变化都会提前返回。
    pub(crate) fn wait_for_host_surface(&self, interval: Duration) {
        let mut inner = self.inner.lock();
        if inner.host_surface_available
            || inner.cancel_requested
            || inner.state != LifecycleState::ResumingRequested
        {
            return;
        }
        let _ = self.changed.wait_for(&mut inner, interval);
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    #[test]
    fn advance_loses_to_newer_request() {
        let shared = LifecycleShared::new();
        shared.update(|s| s.state = LifecycleState::PausingRequested);

        assert!(matches!(
            shared.advance(LifecycleState::ResumingRequested, LifecycleState::Running),
            Ok(false)
        ));
        assert_eq!(shared.state(), LifecycleState::PausingRequested);
        assert_eq!(shared.complete_resume(), None);
        assert_eq!(shared.state(), LifecycleState::PausingRequested);
    }

    #[test]
    fn advance_outside_table_is_a_violation() {
        let shared = LifecycleShared::new();
        shared.update(|s| s.state = LifecycleState::Running);

        assert!(matches!(
            shared.advance(LifecycleState::Running, LifecycleState::Paused),
            Err(LifecycleError::ProtocolViolation { .. })
        ));
        assert_eq!(shared.state(), LifecycleState::Running);
    }

    #[test]
    fn completing_a_host_resume_sets_processed_flag() {
        let shared = LifecycleShared::new();
        shared.update(|s| {
            s.state = LifecycleState::ResumingRequested;
            s.resume_processed = false;
        });

        assert_eq!(shared.complete_resume(), Some(true));
        assert_eq!(shared.state(), LifecycleState::Running);
        assert!(shared.lock().resume_processed);
    }

    #[test]
    fn worker_recovery_is_not_reported_as_host_resume() {
        let shared = LifecycleShared::new();
        shared.update(|s| {
            s.state = LifecycleState::Running;
            s.resume_processed = true;
        });

        assert!(matches!(
            shared.advance(LifecycleState::Running, LifecycleState::ResumingRequested),
            Ok(true)
        ));
        assert_eq!(shared.complete_resume(), Some(false));
        assert_eq!(shared.state(), LifecycleState::Running);
    }

    #[test]
    fn waiters_see_changes_from_other_threads() {
        let shared = Arc::new(LifecycleShared::new());
        let remote = shared.clone();
        let worker = thread::spawn(move || {
            thread::sleep(Duration::from_millis(10));
            remote.update(|s| s.state = LifecycleState::Paused);
        });

        assert!(shared.wait_until(
            |s| s.state == LifecycleState::Paused,
            Duration::from_secs(5)
        ));
        worker.join().unwrap();

        assert!(!shared.wait_until(
            |s| s.state == LifecycleState::Running,
            Duration::from_millis(5)
        ));
    }
}
