//! ### English
//! Bitflags controlling optional view behaviors.
//!
//! These are passed through the C ABI as a `u32` bitmask.
//!
//! ### 中文
//! 控制 view 可选行为的位标志（bitflags）。
//!
//! 通过 C ABI 以 `u32` 位掩码传入。

/// ### English
/// Run each frame's update/render on the host UI thread instead of the render worker.
///
/// In this mode the host must call `gameview_view_pump` regularly from its UI thread, and
/// `gameview_view_stop` / blocking pause do not wait for the worker.
///
/// ### 中文
/// 在宿主 UI 线程（而不是渲染工作线程）上执行每帧的 update/render。
///
/// 该模式下宿主必须在 UI 线程上定期调用 `gameview_view_pump`，
/// 并且 `gameview_view_stop` / 阻塞式暂停不会等待工作线程。
pub const GAMEVIEW_VIEW_FLAG_RENDER_ON_UI_THREAD: u32 = 1 << 0;

/// ### English
/// Log the measured frames per second once per second (`info` level).
///
/// ### 中文
/// 每秒以 `info` 级别记录一次测得的帧率。
pub const GAMEVIEW_VIEW_FLAG_LOG_FPS: u32 = 1 << 1;
