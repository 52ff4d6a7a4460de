//! ### English
//! Narrow interface to the platform graphics binding (EGL/GLX/WGL/surfman/...).
//!
//! ### 中文
//! 与平台图形绑定层（EGL/GLX/WGL/surfman 等）之间的窄接口。

use std::num::NonZeroU64;

use dpi::PhysicalSize;

use super::PixelConfig;

/// ### English
/// Opaque handle to a GPU context created by a [`GraphicsBinding`].
///
/// ### 中文
/// 由 [`GraphicsBinding`] 创建的 GPU 上下文的不透明句柄。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextHandle(pub NonZeroU64);

/// ### English
/// Opaque handle to a drawable surface created by a [`GraphicsBinding`].
///
/// ### 中文
/// 由 [`GraphicsBinding`] 创建的可绘制 surface 的不透明句柄。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceHandle(pub NonZeroU64);

/// ### English
/// Failure reported by the graphics binding, carrying the platform error code.
///
/// ### 中文
/// 图形绑定层报告的失败，附带平台错误码。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BindingError {
    /// ### English
    /// The platform revoked the context; all GPU resources must be rebuilt.
    ///
    /// ### 中文
    /// 平台已回收该上下文；所有 GPU 资源都必须重建。
    #[error("graphics context lost (code {code:#x})")]
    ContextLost { code: i32 },

    #[error("graphics call failed (code {code:#x}): {message}")]
    Failed { code: i32, message: String },
}

impl BindingError {
    pub fn failed(code: i32, message: impl Into<String>) -> Self {
        Self::Failed {
            code,
            message: message.into(),
        }
    }

    pub fn code(&self) -> i32 {
        match self {
            Self::ContextLost { code } | Self::Failed { code, .. } => *code,
        }
    }

    pub fn is_context_lost(&self) -> bool {
        matches!(self, Self::ContextLost { .. })
    }
}

/// ### English
/// Platform graphics binding consumed by the lifecycle manager.
///
/// Every method is only ever called from the thread that currently owns rendering: the render
/// worker, or the host UI thread while it runs a marshalled frame. Implementations must not
/// assume a fixed calling thread, but may assume calls are never concurrent.
///
/// ### 中文
/// 生命周期管理器使用的平台图形绑定。
///
/// 所有方法只会在当前拥有渲染权的线程上调用：渲染工作线程，或正在执行被转交帧的宿主 UI 线程。
/// 实现不能假定固定的调用线程，但可以假定调用之间不会并发。
pub trait GraphicsBinding: Send {
    /// ### English
    /// Creates a context for exactly this configuration, or rejects it.
    ///
    /// ### 中文
    /// 为该配置创建上下文，或拒绝该配置。
    fn create_context(&mut self, config: &PixelConfig) -> Result<ContextHandle, BindingError>;

    fn destroy_context(&mut self, context: ContextHandle) -> Result<(), BindingError>;

    /// ### English
    /// Creates the drawable for the host window at `size`, attached to `context`.
    ///
    /// ### 中文
    /// 以 `size` 为宿主窗口创建可绘制 surface，并附着到 `context`。
    fn create_surface(
        &mut self,
        context: ContextHandle,
        size: PhysicalSize<u32>,
    ) -> Result<SurfaceHandle, BindingError>;

    fn destroy_surface(&mut self, surface: SurfaceHandle) -> Result<(), BindingError>;

    /// ### English
    /// Binds `context` and `surface` to the calling thread.
    ///
    /// ### 中文
    /// 将 `context` 与 `surface` 绑定到调用线程。
    fn make_current(
        &mut self,
        context: ContextHandle,
        surface: SurfaceHandle,
    ) -> Result<(), BindingError>;

    /// ### English
    /// Unbinds whatever is current on the calling thread.
    ///
    /// ### 中文
    /// 解绑调用线程上当前绑定的上下文与 surface。
    fn clear_current(&mut self) -> Result<(), BindingError>;

    fn swap_buffers(&mut self, surface: SurfaceHandle) -> Result<(), BindingError>;
}
