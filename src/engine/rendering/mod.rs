//! ### English
//! Rendering module entry point.
//! Splits the graphics binding contract, pixel-configuration fallback and the context/surface
//! lifecycle manager into submodules.
//!
//! ### 中文
//! 渲染模块入口。
//! 将图形绑定契约、像素配置回退以及上下文/surface 生命周期管理器拆分到子模块。

mod binding;
mod config;
mod lifecycle;

#[cfg(feature = "surfman")]
mod surfman_binding;

#[cfg(test)]
pub(crate) mod fake;

pub use binding::{BindingError, ContextHandle, GraphicsBinding, SurfaceHandle};
pub use config::{PixelConfig, candidate_configs};
pub use lifecycle::SurfaceLifecycle;

#[cfg(feature = "surfman")]
pub use surfman_binding::SurfmanBinding;
