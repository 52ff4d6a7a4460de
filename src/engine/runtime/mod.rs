//! ### English
//! Render lifecycle runtime (public API).
//!
//! ### 中文
//! 渲染生命周期运行时（对外公开 API）。

mod dispatch;
mod events;
mod render_core;
mod shared;
mod state;
mod timing;
mod worker;

mod game_view;

pub use events::{LifecycleCallback, StopCallback};
pub use game_view::GameView;
pub use state::LifecycleState;
