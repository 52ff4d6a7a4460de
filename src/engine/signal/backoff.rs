//! ### English
//! Spin-then-yield backoff used by bounded handshake loops.
//!
//! - Spin briefly to cover the short gap while the worker finishes a transition.
//! - Yield after the spin budget so a waiting UI thread never burns a full core.
//!
//! ### 中文
//! 有界握手循环使用的“短自旋 + 让出调度”退避工具。
//!
//! - 先短暂自旋，覆盖工作线程完成一次状态切换的短暂间隙；
//! - 超过自旋预算后调用 `yield`，保证等待中的 UI 线程不会空转占满一个核心。

use std::thread;

/// ### English
/// Spin budget before switching to `yield_now()`.
///
/// ### 中文
/// 在切换到 `yield_now()` 之前允许的自旋次数预算。
const SPIN_LIMIT: u32 = 64;

/// ### English
/// Spin-then-yield backoff state.
///
/// ### 中文
/// “短自旋 + 让出调度”的退避状态。
pub(crate) struct Backoff {
    spins: u32,
}

impl Backoff {
    #[inline]
    pub(crate) fn new() -> Self {
        Self { spins: 0 }
    }

    /// ### English
    /// Performs one backoff step.
    ///
    /// ### 中文
    /// 执行一次退避步骤。
    #[inline]
    pub(crate) fn snooze(&mut self) {
        if self.spins < SPIN_LIMIT {
            std::hint::spin_loop();
        } else {
            thread::yield_now();
        }
        self.spins = self.spins.wrapping_add(1);
    }

    /// ### English
    /// Returns `true` once the spin budget is exhausted and every step yields.
    ///
    /// ### 中文
    /// 自旋预算耗尽（之后每一步都会 yield）时返回 `true`。
    #[inline]
    pub(crate) fn is_yielding(&self) -> bool {
        self.spins >= SPIN_LIMIT
    }
}
