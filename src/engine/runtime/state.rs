//! ### English
//! The single authoritative lifecycle state and the worker's transition table.
//!
//! ### 中文
//! 唯一权威的生命周期状态及工作线程的状态转移表。

/// ### English
/// Lifecycle state shared between the host UI thread and the render worker.
///
/// `*Requested` values (and `ForceRecreateSurface`) are written by the UI thread; the worker
/// processes them and writes the follow-up state.
///
/// ### 中文
/// 宿主 UI 线程与渲染工作线程共享的生命周期状态。
///
/// `*Requested` 状态（以及 `ForceRecreateSurface`）由 UI 线程写入；工作线程处理后写入后续状态。
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LifecycleState {
    #[default]
    Exited = 0,
    Running = 1,
    PausingRequested = 2,
    Paused = 3,
    ResumingRequested = 4,
    ExitingRequested = 5,
    ForceRecreateSurface = 6,
}

impl LifecycleState {
    /// ### English
    /// Whether the render worker may move from `self` to `next` after processing `self`.
    ///
    /// Anything outside this table is a protocol violation.
    ///
    /// ### 中文
    /// 工作线程处理完 `self` 后是否允许转移到 `next`。
    ///
    /// 表外的任何转移都视为协议违规。
    pub fn can_advance_to(self, next: LifecycleState) -> bool {
        use LifecycleState::*;

        matches!(
            (self, next),
            (Running, ExitingRequested)
                | (Running, ResumingRequested)
                | (ResumingRequested, Running)
                | (PausingRequested, Paused)
                | (ForceRecreateSurface, Running)
                | (ExitingRequested, Exited)
        )
    }

    /// ### English
    /// States in which `pause()` has something to pause.
    ///
    /// ### 中文
    /// `pause()` 有实际暂停对象的状态。
    pub fn accepts_pause(self) -> bool {
        matches!(
            self,
            Self::Running | Self::ResumingRequested | Self::ForceRecreateSurface
        )
    }

    /// ### English
    /// States from which `resume()` is honoured. `PausingRequested` is included so a resume that
    /// arrives before the worker processed the pause still wins.
    ///
    /// ### 中文
    /// `resume()` 会生效的状态。包含 `PausingRequested`，使得在工作线程处理暂停之前到达的恢复请求依然生效。
    pub fn accepts_resume(self) -> bool {
        matches!(self, Self::Paused | Self::PausingRequested)
    }

    pub fn is_exiting(self) -> bool {
        matches!(self, Self::ExitingRequested | Self::Exited)
    }

    pub fn from_raw(raw: u8) -> Option<Self> {
        Some(match raw {
            0 => Self::Exited,
            1 => Self::Running,
            2 => Self::PausingRequested,
            3 => Self::Paused,
            4 => Self::ResumingRequested,
            5 => Self::ExitingRequested,
            6 => Self::ForceRecreateSurface,
            _ => return None,
        })
    }
}
