//! ### English
//! UI-thread frame dispatch: the worker queues one frame at a time for the host UI thread and
//! parks until the UI thread has run it (or until the worker abandons it).
//!
//! ### 中文
//! UI 线程帧分发：工作线程每次为宿主 UI 线程排队一帧，并 park 等待 UI 线程执行完成（或由工作线程放弃）。

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel as channel;
use parking_lot::Mutex;

use crate::engine::signal::deadline_after;

use super::render_core::RenderCore;

const QUEUED: u8 = 0;
const RUNNING: u8 = 1;
const DONE: u8 = 2;
const ABANDONED: u8 = 3;

/// ### English
/// Single-use claim/complete handoff between the render worker and the UI thread.
///
/// State machine:
///
/// - `QUEUED -> RUNNING` (UI thread claims it)
/// - `RUNNING -> DONE` (UI thread finished; wakes the worker)
/// - `QUEUED -> ABANDONED` (worker gave up before the UI thread claimed it)
///
/// A claimed ticket can no longer be abandoned, so the worker always waits for a frame that
/// already started.
///
/// ### 中文
/// 渲染工作线程与 UI 线程之间的一次性“领取/完成”交接。
///
/// 状态机：
///
/// - `QUEUED -> RUNNING`（UI 线程领取）
/// - `RUNNING -> DONE`（UI 线程完成；唤醒工作线程）
/// - `QUEUED -> ABANDONED`（工作线程在 UI 线程领取前放弃）
///
/// 已被领取的票据不能再被放弃，因此工作线程总会等待已经开始执行的帧。
pub(crate) struct FrameTicket {
    state: AtomicU8,
    waiter: thread::Thread,
}

impl FrameTicket {
    #[inline]
    pub(crate) fn new(waiter: thread::Thread) -> Self {
        Self {
            state: AtomicU8::new(QUEUED),
            waiter,
        }
    }

    #[inline]
    pub(crate) fn claim(&self) -> bool {
        self.state
            .compare_exchange(QUEUED, RUNNING, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    #[inline]
    pub(crate) fn complete(&self) {
        self.state.store(DONE, Ordering::Release);
        self.waiter.unpark();
    }

    #[inline]
    pub(crate) fn abandon(&self) -> bool {
        self.state
            .compare_exchange(QUEUED, ABANDONED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    #[inline]
    pub(crate) fn is_done(&self) -> bool {
        self.state.load(Ordering::Acquire) == DONE
    }

    /// ### English
    /// Parks the waiter until the ticket is done or `timeout` elapses. Returns `true` when done.
    ///
    /// ### 中文
    /// park 等待者直到票据完成或超过 `timeout`。完成时返回 `true`。
    pub(crate) fn wait_timeout(&self, timeout: Duration) -> bool {
        let deadline = deadline_after(timeout);
        loop {
            if self.is_done() {
                return true;
            }
            let Some(deadline) = deadline else {
                thread::park();
                continue;
            };
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            thread::park_timeout(deadline - now);
        }
    }
}

/// ### English
/// One frame to run on the UI thread.
///
/// ### 中文
/// 需要在 UI 线程上执行的一帧。
pub(crate) struct UiJob {
    pub(crate) ticket: Arc<FrameTicket>,
    pub(crate) core: Arc<Mutex<RenderCore>>,
}

impl UiJob {
    /// ### English
    /// Runs the frame if it was not abandoned. Returns whether a frame ran.
    ///
    /// ### 中文
    /// 若票据未被放弃则执行该帧。返回是否执行了一帧。
    pub(crate) fn run(self) -> bool {
        if !self.ticket.claim() {
            return false;
        }
        {
            let mut core = self.core.lock();
            core.run_bound_frame();
        }
        self.ticket.complete();
        true
    }
}

/// ### English
/// Channel pair carrying [`UiJob`]s from the worker to the UI pump.
///
/// ### 中文
/// 将 [`UiJob`] 从工作线程传递给 UI 泵的通道对。
pub(crate) struct UiDispatcher {
    tx: channel::Sender<UiJob>,
    rx: channel::Receiver<UiJob>,
}

impl UiDispatcher {
    pub(crate) fn new() -> Self {
        let (tx, rx) = channel::unbounded();
        Self { tx, rx }
    }

    pub(crate) fn sender(&self) -> channel::Sender<UiJob> {
        self.tx.clone()
    }

    /// ### English
    /// Runs every queued frame on the calling (UI) thread. Returns how many frames ran.
    ///
    /// ### 中文
    /// 在调用方（UI）线程上执行所有已排队的帧。返回执行的帧数。
    pub(crate) fn pump(&self) -> usize {
        self.rx.try_iter().map(UiJob::run).filter(|ran| *ran).count()
    }
}
