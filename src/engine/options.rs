//! ### English
//! Per-view configuration.
//!
//! ### 中文
//! 单个 view 的配置。

use std::sync::Arc;
use std::time::Duration;

use crate::engine::flags;

/// ### English
/// Priority value every participating thread is expected to run at.
///
/// ### 中文
/// 所有参与线程应保持的优先级数值。
pub const NORMAL_THREAD_PRIORITY: i32 = 0;

/// ### English
/// Reports the calling thread's scheduling priority. Any value other than
/// [`NORMAL_THREAD_PRIORITY`] observed at the top of a loop iteration ends the session.
///
/// ### 中文
/// 报告调用线程的调度优先级。在循环迭代开头观测到任何非 [`NORMAL_THREAD_PRIORITY`] 的值都会结束会话。
pub trait ThreadPriorityProbe: Send + Sync {
    fn current_priority(&self) -> i32;
}

impl<F> ThreadPriorityProbe for F
where
    F: Fn() -> i32 + Send + Sync,
{
    fn current_priority(&self) -> i32 {
        self()
    }
}

/// ### English
/// Options fixed at view creation.
///
/// ### 中文
/// 在 view 创建时确定的选项。
#[derive(Clone)]
pub struct ViewOptions {
    /// ### English
    /// Run update/render on the host UI thread (see [`flags::GAMEVIEW_VIEW_FLAG_RENDER_ON_UI_THREAD`]).
    ///
    /// ### 中文
    /// 在宿主 UI 线程上执行 update/render（见 [`flags::GAMEVIEW_VIEW_FLAG_RENDER_ON_UI_THREAD`]）。
    pub render_on_ui_thread: bool,
    pub log_fps: bool,
    /// ### English
    /// Requested depth/stencil bits; the first pixel-config candidates use them.
    ///
    /// ### 中文
    /// 请求的深度/模板位数；最优先的像素配置候选会使用它们。
    pub depth_bits: u8,
    pub stencil_bits: u8,
    /// ### English
    /// Upper bound for the blocking pause barrier.
    ///
    /// ### 中文
    /// 阻塞式暂停屏障的等待上限。
    pub resume_wait_cap: Duration,
    /// ### English
    /// How long the worker sleeps between checks while waiting for a host surface.
    ///
    /// ### 中文
    /// 等待宿主 surface 时工作线程两次检查之间的睡眠时长。
    pub surface_retry_interval: Duration,
    /// ### English
    /// How long the worker waits for the UI thread to pick up a frame before re-checking its state.
    /// Capped at one second so a stop request is always noticed.
    ///
    /// ### 中文
    /// 工作线程等待 UI 线程领取一帧的时长，超时后重新检查状态。上限为一秒，以保证总能察觉停止请求。
    pub ui_frame_wait: Duration,
    pub priority_probe: Option<Arc<dyn ThreadPriorityProbe>>,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            render_on_ui_thread: false,
            log_fps: false,
            depth_bits: 24,
            stencil_bits: 8,
            resume_wait_cap: Duration::from_secs(2),
            surface_retry_interval: Duration::from_millis(10),
            ui_frame_wait: Duration::from_millis(50),
            priority_probe: None,
        }
    }
}

impl std::fmt::Debug for ViewOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewOptions")
            .field("render_on_ui_thread", &self.render_on_ui_thread)
            .field("log_fps", &self.log_fps)
            .field("depth_bits", &self.depth_bits)
            .field("stencil_bits", &self.stencil_bits)
            .field("resume_wait_cap", &self.resume_wait_cap)
            .field("surface_retry_interval", &self.surface_retry_interval)
            .field("ui_frame_wait", &self.ui_frame_wait)
            .field("priority_probe", &self.priority_probe.is_some())
            .finish()
    }
}

impl ViewOptions {
    /// ### English
    /// Builds options from the C ABI bitmask; everything else keeps its default.
    ///
    /// ### 中文
    /// 由 C ABI 位掩码构建选项；其余字段保持默认值。
    pub fn from_flags(view_flags: u32) -> Self {
        Self {
            render_on_ui_thread: (view_flags & flags::GAMEVIEW_VIEW_FLAG_RENDER_ON_UI_THREAD) != 0,
            log_fps: (view_flags & flags::GAMEVIEW_VIEW_FLAG_LOG_FPS) != 0,
            ..Self::default()
        }
    }

    pub fn render_on_ui_thread(mut self, enabled: bool) -> Self {
        self.render_on_ui_thread = enabled;
        self
    }

    pub fn log_fps(mut self, enabled: bool) -> Self {
        self.log_fps = enabled;
        self
    }

    pub fn depth_stencil(mut self, depth_bits: u8, stencil_bits: u8) -> Self {
        self.depth_bits = depth_bits;
        self.stencil_bits = stencil_bits;
        self
    }

    pub fn resume_wait_cap(mut self, cap: Duration) -> Self {
        self.resume_wait_cap = cap;
        self
    }

    pub fn priority_probe(mut self, probe: impl ThreadPriorityProbe + 'static) -> Self {
        self.priority_probe = Some(Arc::new(probe));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_map_onto_options() {
        let options = ViewOptions::from_flags(
            flags::GAMEVIEW_VIEW_FLAG_RENDER_ON_UI_THREAD | flags::GAMEVIEW_VIEW_FLAG_LOG_FPS,
        );
        assert!(options.render_on_ui_thread);
        assert!(options.log_fps);

        let options = ViewOptions::from_flags(0);
        assert!(!options.render_on_ui_thread);
        assert!(!options.log_fps);
        assert_eq!(options.depth_bits, 24);
    }

    #[test]
    fn closures_are_priority_probes() {
        let options = ViewOptions::default().priority_probe(|| 3);
        let probe = options.priority_probe.as_ref().map(|p| p.current_priority());
        assert_eq!(probe, Some(3));
    }
}
