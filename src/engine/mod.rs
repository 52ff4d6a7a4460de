/// ### English
/// Engine internal modules (lifecycle runtime, context/surface management, signalling).
///
/// ### 中文
/// 引擎内部模块（生命周期运行时、上下文/surface 管理、信号原语等）。
pub mod error;
pub mod flags;
pub mod hooks;
pub mod options;
pub mod rendering;
pub mod runtime;
pub mod signal;

pub use error::LifecycleError;
pub use hooks::{GameHooks, Resumer};
pub use options::{NORMAL_THREAD_PRIORITY, ThreadPriorityProbe, ViewOptions};
pub use rendering::{BindingError, ContextHandle, GraphicsBinding, PixelConfig, SurfaceHandle};
pub use runtime::{GameView, LifecycleState};
