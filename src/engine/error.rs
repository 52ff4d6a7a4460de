//! ### English
//! Error types surfaced by the lifecycle core.
//!
//! ### 中文
//! 生命周期核心对外暴露的错误类型。

use crate::engine::rendering::BindingError;
use crate::engine::runtime::LifecycleState;

/// ### English
/// Errors produced by the control API, the lifecycle manager and the render worker.
///
/// [`LifecycleError::ProtocolViolation`], [`LifecycleError::ThreadPriority`] and
/// [`LifecycleError::WorkerPanicked`] end a render session (see [`LifecycleError::is_fatal`]).
/// Surface and context failures are recovered locally by retrying on the next loop iteration;
/// the remaining variants are returned to the caller of the control API.
///
/// ### 中文
/// 控制 API、生命周期管理器与渲染工作线程产生的错误。
///
/// [`LifecycleError::ProtocolViolation`]、[`LifecycleError::ThreadPriority`] 与
/// [`LifecycleError::WorkerPanicked`] 会终止渲染会话（见 [`LifecycleError::is_fatal`]）。
/// surface 与上下文失败会在下一次循环迭代中本地重试恢复；其余变体直接返回给控制 API 的调用方。
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error("a render session is already running for this view")]
    AlreadyRunning,

    #[error("no render session is running")]
    NotRunning,

    #[error("no candidate pixel configuration was accepted by the platform")]
    NoPixelConfig,

    #[error("no graphics context is available")]
    NoContext,

    #[error(transparent)]
    Binding(#[from] BindingError),

    #[error("illegal lifecycle transition {from:?} -> {to:?}")]
    ProtocolViolation {
        from: LifecycleState,
        to: LifecycleState,
    },

    #[error("{thread} thread priority changed to {priority} (expected normal)")]
    ThreadPriority { thread: &'static str, priority: i32 },

    #[error("failed to spawn render worker: {0}")]
    WorkerSpawn(#[from] std::io::Error),

    #[error("render worker panicked: {0}")]
    WorkerPanicked(String),

    #[error("timed out waiting for the render worker")]
    Timeout,
}

impl LifecycleError {
    /// ### English
    /// Whether this error terminates the render loop.
    ///
    /// ### 中文
    /// 该错误是否会终止渲染循环。
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::ProtocolViolation { .. } | Self::ThreadPriority { .. } | Self::WorkerPanicked(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_session_ending_errors_are_fatal() {
        assert!(
            LifecycleError::ProtocolViolation {
                from: LifecycleState::Paused,
                to: LifecycleState::Running,
            }
            .is_fatal()
        );
        assert!(
            LifecycleError::ThreadPriority {
                thread: "ui",
                priority: 5,
            }
            .is_fatal()
        );
        assert!(LifecycleError::WorkerPanicked("boom".into()).is_fatal());

        assert!(!LifecycleError::Timeout.is_fatal());
        assert!(!LifecycleError::NoPixelConfig.is_fatal());
        assert!(!LifecycleError::from(BindingError::ContextLost { code: 0x300E }).is_fatal());
    }
}
