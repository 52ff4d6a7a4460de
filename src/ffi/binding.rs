//! ### English
//! [`GraphicsBinding`] over a host-supplied [`GameViewGraphicsApi`] table.
//!
//! ### 中文
//! 基于宿主提供的 [`GameViewGraphicsApi`] 函数表实现的 [`GraphicsBinding`]。

use std::num::NonZeroU64;

use dpi::PhysicalSize;

use crate::engine::{BindingError, ContextHandle, GraphicsBinding, PixelConfig, SurfaceHandle};

use super::GameViewGraphicsApi;

pub(super) struct FfiGraphicsBinding {
    api: GameViewGraphicsApi,
}

/// ### English
/// The host promises its binding functions may be called from the render worker and (in
/// render-on-UI-thread mode) its UI thread, one at a time.
///
/// ### 中文
/// 宿主保证其绑定函数可以在渲染工作线程以及（UI 线程渲染模式下）UI 线程上被逐个调用。
unsafe impl Send for FfiGraphicsBinding {}

impl FfiGraphicsBinding {
    /// ### English
    /// Returns `None` unless every entry of the table is present.
    ///
    /// ### 中文
    /// 只有函数表的所有条目都存在时才返回 `Some`。
    pub(super) fn new(api: GameViewGraphicsApi) -> Option<Self> {
        let complete = api.create_context.is_some()
            && api.destroy_context.is_some()
            && api.create_surface.is_some()
            && api.destroy_surface.is_some()
            && api.make_current.is_some()
            && api.clear_current.is_some()
            && api.swap_buffers.is_some();
        complete.then_some(Self { api })
    }

    fn error(&self, code: i32, what: &str) -> BindingError {
        if code == self.api.context_lost_code {
            BindingError::ContextLost { code }
        } else {
            BindingError::failed(code, format!("{what} failed"))
        }
    }

    fn check(&self, code: i32, what: &str) -> Result<(), BindingError> {
        if code == 0 {
            Ok(())
        } else {
            Err(self.error(code, what))
        }
    }

    fn missing(what: &str) -> BindingError {
        BindingError::failed(-1, format!("{what} is not provided"))
    }
}

impl GraphicsBinding for FfiGraphicsBinding {
    fn create_context(&mut self, config: &PixelConfig) -> Result<ContextHandle, BindingError> {
        let Some(create) = self.api.create_context else {
            return Err(Self::missing("create_context"));
        };
        let mut code = 0;
        let raw = unsafe { create(self.api.user_data, config, &mut code) };
        NonZeroU64::new(raw)
            .map(ContextHandle)
            .ok_or_else(|| self.error(code, "create_context"))
    }

    fn destroy_context(&mut self, context: ContextHandle) -> Result<(), BindingError> {
        let Some(destroy) = self.api.destroy_context else {
            return Err(Self::missing("destroy_context"));
        };
        let code = unsafe { destroy(self.api.user_data, context.0.get()) };
        self.check(code, "destroy_context")
    }

    fn create_surface(
        &mut self,
        context: ContextHandle,
        size: PhysicalSize<u32>,
    ) -> Result<SurfaceHandle, BindingError> {
        let Some(create) = self.api.create_surface else {
            return Err(Self::missing("create_surface"));
        };
        let mut code = 0;
        let raw = unsafe {
            create(
                self.api.user_data,
                context.0.get(),
                size.width,
                size.height,
                &mut code,
            )
        };
        NonZeroU64::new(raw)
            .map(SurfaceHandle)
            .ok_or_else(|| self.error(code, "create_surface"))
    }

    fn destroy_surface(&mut self, surface: SurfaceHandle) -> Result<(), BindingError> {
        let Some(destroy) = self.api.destroy_surface else {
            return Err(Self::missing("destroy_surface"));
        };
        let code = unsafe { destroy(self.api.user_data, surface.0.get()) };
        self.check(code, "destroy_surface")
    }

    fn make_current(
        &mut self,
        context: ContextHandle,
        surface: SurfaceHandle,
    ) -> Result<(), BindingError> {
        let Some(make_current) = self.api.make_current else {
            return Err(Self::missing("make_current"));
        };
        let code = unsafe { make_current(self.api.user_data, context.0.get(), surface.0.get()) };
        self.check(code, "make_current")
    }

    fn clear_current(&mut self) -> Result<(), BindingError> {
        let Some(clear_current) = self.api.clear_current else {
            return Err(Self::missing("clear_current"));
        };
        let code = unsafe { clear_current(self.api.user_data) };
        self.check(code, "clear_current")
    }

    fn swap_buffers(&mut self, surface: SurfaceHandle) -> Result<(), BindingError> {
        let Some(swap) = self.api.swap_buffers else {
            return Err(Self::missing("swap_buffers"));
        };
        let code = unsafe { swap(self.api.user_data, surface.0.get()) };
        self.check(code, "swap_buffers")
    }
}
