//! ### English
//! Application-facing capability interfaces called by the render worker.
//!
//! ### 中文
//! 渲染工作线程调用的面向应用的能力接口。

use std::time::Duration;

use dpi::PhysicalSize;

/// ### English
/// Frame sink and GPU-resource notifications implemented by the game/application layer.
///
/// All methods run with the graphics context current, on the render worker or (in
/// render-on-UI-thread mode) on the host UI thread. `on_update_frame`/`on_render_frame` errors
/// and panics are caught by the loop; the frame is skipped and rendering continues.
///
/// ### 中文
/// 由游戏/应用层实现的帧接收器与 GPU 资源通知。
///
/// 所有方法都在图形上下文为 current 的情况下调用：在渲染工作线程上，或（UI 线程渲染模式下）
/// 在宿主 UI 线程上。`on_update_frame`/`on_render_frame` 的错误与 panic 会被循环捕获；
/// 该帧被跳过，渲染继续。
pub trait GameHooks: Send {
    /// ### English
    /// Content can be loaded: a surface became ready after start or resume.
    ///
    /// ### 中文
    /// 可以加载内容：启动或恢复后 surface 已就绪。
    fn on_load(&mut self) {}

    /// ### English
    /// The surface is about to go away (pause or exit).
    ///
    /// ### 中文
    /// surface 即将被销毁（暂停或退出）。
    fn on_unload(&mut self) {}

    /// ### English
    /// The previous context was lost; GPU objects created on it are gone.
    ///
    /// ### 中文
    /// 之前的上下文已丢失；在其上创建的 GPU 对象均已失效。
    fn on_context_lost(&mut self) {}

    /// ### English
    /// A new context is current; rebuild GPU-side resources. Fires once per create/loss cycle.
    ///
    /// ### 中文
    /// 新上下文已成为 current；请重建 GPU 侧资源。每个创建/丢失周期只触发一次。
    fn on_context_set(&mut self) {}

    fn on_update_frame(&mut self, elapsed: Duration) -> anyhow::Result<()>;

    fn on_render_frame(&mut self, elapsed: Duration) -> anyhow::Result<()>;
}

/// ### English
/// Lightweight drawable shown for one frame right after the context was (re)created, while the
/// application reloads its GPU resources.
///
/// ### 中文
/// 上下文（重新）创建后立即显示一帧的轻量绘制对象，在应用重新加载 GPU 资源期间使用。
pub trait Resumer: Send {
    fn draw(&mut self, size: PhysicalSize<u32>) -> anyhow::Result<()>;
}
