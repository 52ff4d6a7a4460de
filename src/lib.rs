/// ### English
/// `gameview` crate root.
/// Exposes the C ABI via `ffi`; the lifecycle runtime lives under `engine` and is re-exported
/// here for Rust hosts.
///
/// ### 中文
/// `gameview` 的 crate 根。
/// 通过 `ffi` 导出 C ABI；生命周期运行时位于 `engine` 模块，并在此为 Rust 宿主重新导出。
pub mod engine;
mod ffi;

pub use engine::{
    BindingError, ContextHandle, GameHooks, GameView, GraphicsBinding, LifecycleError,
    LifecycleState, PixelConfig, Resumer, SurfaceHandle, ThreadPriorityProbe, ViewOptions,
};
