//! ### English
//! Cross-thread wake/wait primitives shared by the control API and the render worker.
//!
//! Blocking waits go through [`Gate`]; the only busy wait in the crate is [`spin_until`],
//! reserved for handshakes where the thread that must signal is the one doing the work.
//!
//! ### 中文
//! 控制 API 与渲染工作线程之间共用的跨线程唤醒/等待原语。
//!
//! 阻塞等待统一使用 [`Gate`]；crate 内唯一的忙等是 [`spin_until`]，
//! 仅用于“负责发信号的线程正是执行该工作的线程”这类握手。
mod backoff;
mod gate;
mod spin;

use std::time::{Duration, Instant};

pub(crate) use backoff::Backoff;
pub use gate::Gate;
pub(crate) use spin::{SpinOutcome, spin_until};

/// ### English
/// Deadline `timeout` from now, or `None` when it lies beyond what `Instant` can represent
/// (e.g. `Duration::MAX`), in which case callers wait without a deadline.
///
/// ### 中文
/// 从现在起 `timeout` 之后的截止时间；超出 `Instant` 可表示范围（如 `Duration::MAX`）时返回 `None`，
/// 此时调用方不设截止时间地等待。
#[inline]
pub(crate) fn deadline_after(timeout: Duration) -> Option<Instant> {
    Instant::now().checked_add(timeout)
}
