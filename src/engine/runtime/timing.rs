//! ### English
//! Frame timing: per-hook elapsed clocks, update pacing and the FPS log.
//!
//! ### 中文
//! 帧计时：各钩子的耗时时钟、update 节奏控制以及 FPS 日志。

use std::thread;
use std::time::{Duration, Instant};

/// ### English
/// Measures time between consecutive ticks. The first tick reports zero.
///
/// ### 中文
/// 测量相邻两次 tick 之间的时间。第一次 tick 返回零。
#[derive(Debug, Default)]
pub(crate) struct FrameClock {
    last: Option<Instant>,
}

impl FrameClock {
    pub(crate) fn tick(&mut self, now: Instant) -> Duration {
        let elapsed = self
            .last
            .map_or(Duration::ZERO, |last| now.saturating_duration_since(last));
        self.last = Some(now);
        elapsed
    }

    /// ### English
    /// Forgets the previous tick so time spent paused is not reported as one huge frame.
    ///
    /// ### 中文
    /// 忘记上一次 tick，使暂停期间的时间不会被报告为一帧超长耗时。
    pub(crate) fn reset(&mut self) {
        self.last = None;
    }
}

/// ### English
/// Sleeps the render worker so updates run at most `updates_per_second` times per second.
///
/// `0` (or any non-finite/negative value, or a rate whose interval does not fit a `Duration`)
/// disables pacing. When the loop falls more than one interval behind, the schedule is
/// re-anchored instead of bursting to catch up.
///
/// ### 中文
/// 让渲染工作线程休眠，使 update 每秒最多执行 `updates_per_second` 次。
///
/// `0`（或任何非有限值/负值，以及间隔无法用 `Duration` 表示的频率）表示不限速。
/// 当循环落后超过一个间隔时重新对齐时间表，而不是连续追帧。
#[derive(Debug)]
pub(crate) struct FramePacer {
    interval: Option<Duration>,
    next_deadline: Option<Instant>,
}

impl FramePacer {
    pub(crate) fn new(updates_per_second: f64) -> Self {
        let interval = if updates_per_second.is_finite() && updates_per_second > 0.0 {
            let interval = Duration::try_from_secs_f64(1.0 / updates_per_second).ok();
            if interval.is_none() {
                log::warn!(
                    "{updates_per_second} updates/s has no representable interval; running uncapped"
                );
            }
            interval
        } else {
            None
        };
        Self {
            interval,
            next_deadline: None,
        }
    }

    pub(crate) fn interval(&self) -> Option<Duration> {
        self.interval
    }

    /// ### English
    /// Returns how long to sleep before the next frame and advances the schedule.
    ///
    /// ### 中文
    /// 返回下一帧之前应休眠的时长，并推进时间表。
    pub(crate) fn delay(&mut self, now: Instant) -> Duration {
        let Some(interval) = self.interval else {
            return Duration::ZERO;
        };
        let deadline = match self.next_deadline {
            Some(deadline) if deadline.checked_add(interval).is_some_and(|late| late >= now) => {
                deadline
            }
            _ => now,
        };
        self.next_deadline = deadline.checked_add(interval);
        deadline.saturating_duration_since(now)
    }

    pub(crate) fn pace(&mut self) {
        let delay = self.delay(Instant::now());
        if !delay.is_zero() {
            thread::sleep(delay);
        }
    }

    pub(crate) fn reset(&mut self) {
        self.next_deadline = None;
    }
}

/// ### English
/// Counts presented frames and logs the rate once per second when enabled.
///
/// ### 中文
/// 统计已呈现的帧数，启用时每秒记录一次帧率。
#[derive(Debug)]
pub(crate) struct FpsCounter {
    enabled: bool,
    frames: u32,
    window_start: Option<Instant>,
}

impl FpsCounter {
    pub(crate) fn new(enabled: bool) -> Self {
        Self {
            enabled,
            frames: 0,
            window_start: None,
        }
    }

    /// ### English
    /// Records one frame; returns the measured rate when a one-second window closes.
    ///
    /// ### 中文
    /// 记录一帧；当一秒窗口结束时返回测得的帧率。
    pub(crate) fn record(&mut self, now: Instant) -> Option<f64> {
        if !self.enabled {
            return None;
        }
        let start = *self.window_start.get_or_insert(now);
        self.frames += 1;

        let window = now.saturating_duration_since(start);
        if window < Duration::from_secs(1) {
            return None;
        }
        let fps = f64::from(self.frames) / window.as_secs_f64();
        log::info!("{fps:.1} fps");
        self.frames = 0;
        self.window_start = Some(now);
        Some(fps)
    }
}
