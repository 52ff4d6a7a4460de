//! ### English
//! Render core: the context/surface manager plus the application hooks, driven by the worker
//! (or, per frame, by the UI thread).
//!
//! ### 中文
//! 渲染核心：上下文/surface 管理器加上应用钩子，由工作线程驱动（UI 线程渲染模式下每帧由 UI 线程驱动）。

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

use dpi::PhysicalSize;

use crate::engine::error::LifecycleError;
use crate::engine::hooks::{GameHooks, Resumer};
use crate::engine::rendering::SurfaceLifecycle;

use super::timing::{FpsCounter, FrameClock};

pub(crate) struct RenderCore {
    surfaces: SurfaceLifecycle,
    hooks: Box<dyn GameHooks>,
    resumer: Option<Box<dyn Resumer>>,
    /// ### English
    /// `on_load` has run and `on_unload` has not run since.
    ///
    /// ### 中文
    /// `on_load` 已执行且之后尚未执行 `on_unload`。
    loaded: bool,
    /// ### English
    /// `on_context_set` has fired for the current context.
    ///
    /// ### 中文
    /// 已为当前上下文触发过 `on_context_set`。
    context_announced: bool,
    update_clock: FrameClock,
    render_clock: FrameClock,
    fps: FpsCounter,
}

impl RenderCore {
    pub(crate) fn new(surfaces: SurfaceLifecycle, hooks: Box<dyn GameHooks>, log_fps: bool) -> Self {
        Self {
            surfaces,
            hooks,
            resumer: None,
            loaded: false,
            context_announced: false,
            update_clock: FrameClock::default(),
            render_clock: FrameClock::default(),
            fps: FpsCounter::new(log_fps),
        }
    }

    pub(crate) fn set_resumer(&mut self, resumer: Option<Box<dyn Resumer>>) {
        self.resumer = resumer;
    }

    #[cfg(test)]
    pub(crate) fn surfaces(&self) -> &SurfaceLifecycle {
        &self.surfaces
    }

    /// ### English
    /// Whether the core can run a frame right now.
    ///
    /// ### 中文
    /// 核心当前是否可以执行一帧。
    pub(crate) fn frame_ready(&self) -> bool {
        self.surfaces.context_available() && self.surfaces.surface_available()
    }

    /// ### English
    /// Brings context and surface up for `size`.
    ///
    /// A missing or lost context goes through the recreation path: the stale context is torn
    /// down (`on_context_lost` fires only if it was actually lost), a new one is created and,
    /// once a surface is bound, `on_context_set` fires and the resumer draws one frame.
    /// Any error leaves the core in a state the next call simply retries from.
    ///
    /// ### 中文
    /// 以 `size` 准备好上下文与 surface。
    ///
    /// 上下文缺失或丢失时走重建路径：销毁旧上下文（只有真正丢失时才触发 `on_context_lost`），
    /// 创建新上下文，并在 surface 绑定成功后触发 `on_context_set`，由 resumer 绘制一帧。
    /// 任何错误都会让核心停留在下一次调用可直接重试的状态。
    pub(crate) fn prepare(&mut self, size: PhysicalSize<u32>) -> Result<(), LifecycleError> {
        if !self.surfaces.context_available() {
            let lost = self.surfaces.context_lost();
            self.surfaces.destroy_context();
            self.context_announced = false;
            if lost {
                log::info!("recreating lost graphics context");
                guard_hook("on_context_lost", || self.hooks.on_context_lost());
            }
            self.surfaces.create_context()?;
        }

        self.surfaces.create_surface(size)?;

        if !self.context_announced {
            self.context_announced = true;
            guard_hook("on_context_set", || self.hooks.on_context_set());
            self.draw_resumer();
        }
        Ok(())
    }

    /// ### English
    /// Completes a resume: loads content if needed and restarts the frame clocks.
    ///
    /// ### 中文
    /// 完成恢复：按需加载内容并重启帧时钟。
    pub(crate) fn finish_resume(&mut self) {
        if !self.loaded {
            self.loaded = true;
            guard_hook("on_load", || self.hooks.on_load());
        }
        self.update_clock.reset();
        self.render_clock.reset();
    }

    pub(crate) fn recreate_surface(&mut self, size: PhysicalSize<u32>) -> Result<(), LifecycleError> {
        self.surfaces.destroy_surface();
        self.surfaces.create_surface(size)?;
        Ok(())
    }

    /// ### English
    /// Drops the drawable (host surface went away) while keeping the context and loaded content.
    ///
    /// ### 中文
    /// 丢弃可绘制 surface（宿主 surface 已消失），但保留上下文与已加载内容。
    pub(crate) fn release_surface(&mut self) {
        if self.surfaces.surface_available() {
            log::debug!("host surface gone; releasing drawable");
        }
        self.surfaces.destroy_surface();
    }

    pub(crate) fn pause(&mut self) {
        self.surfaces.destroy_surface();
        self.unload();
    }

    pub(crate) fn release_current(&mut self) {
        self.surfaces.clear_current();
    }

    /// ### English
    /// Runs one update + render + present pass with the context already current.
    ///
    /// A hook error or panic skips the rest of the frame. Returns `true` when a frame was presented.
    ///
    /// ### 中文
    /// 在上下文已为 current 的前提下执行一次 update + render + present。
    ///
    /// 钩子返回错误或 panic 时跳过该帧剩余部分。成功呈现一帧时返回 `true`。
    pub(crate) fn run_frame(&mut self) -> bool {
        if !self.frame_ready() {
            return false;
        }

        let elapsed = self.update_clock.tick(Instant::now());
        if !guard_frame("on_update_frame", || self.hooks.on_update_frame(elapsed)) {
            return false;
        }

        let elapsed = self.render_clock.tick(Instant::now());
        if !guard_frame("on_render_frame", || self.hooks.on_render_frame(elapsed)) {
            return false;
        }

        if !self.surfaces.swap_buffers() {
            return false;
        }
        self.fps.record(Instant::now());
        true
    }

    /// ### English
    /// [`Self::run_frame`] for a thread that does not own the context: binds it first and
    /// unbinds it afterwards.
    ///
    /// ### 中文
    /// 用于不持有上下文的线程的 [`Self::run_frame`]：先绑定，结束后解绑。
    pub(crate) fn run_bound_frame(&mut self) -> bool {
        if !self.frame_ready() {
            return false;
        }
        if let Err(err) = self.surfaces.make_current() {
            log::warn!("binding context on UI thread failed: {err}");
            return false;
        }
        let presented = self.run_frame();
        self.surfaces.clear_current();
        presented
    }

    /// ### English
    /// Final teardown when the session ends.
    ///
    /// ### 中文
    /// 会话结束时的最终清理。
    pub(crate) fn teardown(&mut self) {
        self.unload();
        self.surfaces.destroy_context();
        self.context_announced = false;
    }

    fn unload(&mut self) {
        if self.loaded {
            self.loaded = false;
            guard_hook("on_unload", || self.hooks.on_unload());
        }
    }

    fn draw_resumer(&mut self) {
        let Some(resumer) = self.resumer.as_mut() else {
            return;
        };
        let size = self.surfaces.surface_size();
        if guard_frame("resumer", || resumer.draw(size)) {
            self.surfaces.swap_buffers();
        }
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "non-string panic payload"
    }
}

fn guard_frame(what: &str, f: impl FnOnce() -> anyhow::Result<()>) -> bool {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(())) => true,
        Ok(Err(err)) => {
            log::error!("{what} failed; skipping frame: {err:#}");
            false
        }
        Err(payload) => {
            log::error!("{what} panicked; skipping frame: {}", panic_message(&*payload));
            false
        }
    }
}

fn guard_hook(what: &str, f: impl FnOnce()) {
    if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(f)) {
        log::error!("{what} panicked: {}", panic_message(&*payload));
    }
}
