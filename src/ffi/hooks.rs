//! ### English
//! [`GameHooks`] over a host-supplied [`GameViewHooks`] table.
//!
//! ### 中文
//! 基于宿主提供的 [`GameViewHooks`] 函数表实现的 [`GameHooks`]。

use std::time::Duration;

use crate::engine::GameHooks;

use super::GameViewHooks;

pub(super) struct FfiHooks {
    hooks: GameViewHooks,
}

/// ### English
/// Same contract as the graphics binding: calls happen on one thread at a time.
///
/// ### 中文
/// 与图形绑定相同的约定：同一时刻只会在一个线程上调用。
unsafe impl Send for FfiHooks {}

impl FfiHooks {
    pub(super) fn new(hooks: GameViewHooks) -> Self {
        Self { hooks }
    }

    fn notify(&self, hook: Option<unsafe extern "C" fn(*mut std::ffi::c_void)>) {
        if let Some(hook) = hook {
            unsafe { hook(self.hooks.user_data) };
        }
    }

    fn frame(
        &self,
        name: &str,
        hook: Option<unsafe extern "C" fn(*mut std::ffi::c_void, f64) -> i32>,
        elapsed: Duration,
    ) -> anyhow::Result<()> {
        let Some(hook) = hook else {
            return Ok(());
        };
        let code = unsafe { hook(self.hooks.user_data, elapsed.as_secs_f64()) };
        anyhow::ensure!(code == 0, "{name} returned {code}");
        Ok(())
    }
}

impl GameHooks for FfiHooks {
    fn on_load(&mut self) {
        self.notify(self.hooks.on_load);
    }

    fn on_unload(&mut self) {
        self.notify(self.hooks.on_unload);
    }

    fn on_context_lost(&mut self) {
        self.notify(self.hooks.on_context_lost);
    }

    fn on_context_set(&mut self) {
        self.notify(self.hooks.on_context_set);
    }

    fn on_update_frame(&mut self, elapsed: Duration) -> anyhow::Result<()> {
        self.frame("on_update_frame", self.hooks.on_update_frame, elapsed)
    }

    fn on_render_frame(&mut self, elapsed: Duration) -> anyhow::Result<()> {
        self.frame("on_render_frame", self.hooks.on_render_frame, elapsed)
    }
}
