//! ### English
//! Render worker loop: the only thread that performs lifecycle side effects and decides the
//! state that follows a processed request.
//!
//! ### 中文
//! 渲染工作线程循环：唯一执行生命周期副作用、并决定已处理请求之后状态的线程。

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel as channel;
use dpi::PhysicalSize;
use parking_lot::Mutex;

use crate::engine::error::LifecycleError;
use crate::engine::options::{NORMAL_THREAD_PRIORITY, ViewOptions};

use super::dispatch::{FrameTicket, UiJob};
use super::events::LifecycleEvents;
use super::render_core::{RenderCore, panic_message};
use super::shared::LifecycleShared;
use super::state::LifecycleState;
use super::timing::FramePacer;

/// ### English
/// Longest the worker parks on a UI frame before re-checking for cancellation.
///
/// ### 中文
/// 工作线程等待 UI 帧时重新检查取消请求之前的最长 park 时长。
const MAX_UI_FRAME_RECHECK: Duration = Duration::from_secs(1);

/// ### English
/// Everything the worker thread owns for one render session.
///
/// ### 中文
/// 一次渲染会话中工作线程持有的全部内容。
pub(crate) struct RenderWorker {
    pub(crate) session_id: u64,
    pub(crate) shared: Arc<LifecycleShared>,
    pub(crate) core: Arc<Mutex<RenderCore>>,
    pub(crate) events: Arc<LifecycleEvents>,
    pub(crate) options: ViewOptions,
    /// ### English
    /// Set in render-on-UI-thread mode: frames are shipped to the UI pump instead of run here.
    ///
    /// ### 中文
    /// UI 线程渲染模式下设置：帧被发送给 UI 泵执行，而不是在此执行。
    pub(crate) ui_jobs: Option<channel::Sender<UiJob>>,
    pub(crate) pacer: FramePacer,
}

/// ### English
/// Snapshot of the shared flags taken once per loop iteration.
///
/// ### 中文
/// 每次循环迭代读取一次的共享标记快照。
struct Tick {
    state: LifecycleState,
    cancel_requested: bool,
    host_surface_available: bool,
    surface_size: PhysicalSize<u32>,
}

impl RenderWorker {
    /// ### English
    /// Thread entry. Runs the loop, then always tears the core down, publishes `Exited` and
    /// fires the stop callbacks with the loop's outcome.
    ///
    /// ### 中文
    /// 线程入口。执行循环，之后总会清理核心、发布 `Exited`，并以循环结果触发停止回调。
    pub(crate) fn run(mut self) {
        log::debug!(
            "render session {} started (frame interval {:?})",
            self.session_id,
            self.pacer.interval()
        );

        let outcome = match panic::catch_unwind(AssertUnwindSafe(|| self.render_loop())) {
            Ok(outcome) => outcome,
            Err(payload) => Err(LifecycleError::WorkerPanicked(
                panic_message(&*payload).to_string(),
            )),
        };
        if let Err(err) = &outcome {
            log::error!("render session {} terminated: {err}", self.session_id);
        }

        self.core.lock().teardown();

        let error = outcome.err().map(Arc::new);
        self.shared.update(|s| {
            s.state = LifecycleState::Exited;
            s.exit_processed = true;
            s.cancel_requested = false;
            s.last_error = error.clone();
        });
        log::debug!("render session {} exited", self.session_id);

        self.events.fire_stopped(error.as_deref());
    }

    fn render_loop(&mut self) -> Result<(), LifecycleError> {
        loop {
            self.check_priority()?;

            let tick = {
                let s = self.shared.lock();
                Tick {
                    state: s.state,
                    cancel_requested: s.cancel_requested,
                    host_surface_available: s.host_surface_available,
                    surface_size: s.surface_size,
                }
            };

            match tick.state {
                LifecycleState::Running if tick.cancel_requested => {
                    self.advance(LifecycleState::Running, LifecycleState::ExitingRequested)?;
                }
                LifecycleState::Running => self.running(&tick)?,
                LifecycleState::ExitingRequested | LifecycleState::Exited => return Ok(()),
                LifecycleState::PausingRequested => self.pausing()?,
                LifecycleState::Paused => self.shared.main_loop_gate.wait(),
                LifecycleState::ResumingRequested => self.resuming(&tick)?,
                LifecycleState::ForceRecreateSurface => self.force_recreate(&tick)?,
            }
        }
    }

    fn advance(&self, from: LifecycleState, to: LifecycleState) -> Result<bool, LifecycleError> {
        let advanced = self.shared.advance(from, to)?;
        if advanced {
            log::trace!("{from:?} -> {to:?}");
        }
        Ok(advanced)
    }

    fn check_priority(&self) -> Result<(), LifecycleError> {
        let Some(probe) = self.options.priority_probe.as_ref() else {
            return Ok(());
        };
        let priority = probe.current_priority();
        if priority != NORMAL_THREAD_PRIORITY {
            return Err(LifecycleError::ThreadPriority {
                thread: "render",
                priority,
            });
        }
        let priority = self.shared.lock().ui_priority;
        if priority != NORMAL_THREAD_PRIORITY {
            return Err(LifecycleError::ThreadPriority {
                thread: "ui",
                priority,
            });
        }
        Ok(())
    }

    fn running(&mut self, tick: &Tick) -> Result<(), LifecycleError> {
        if !tick.host_surface_available {
            self.core.lock().release_surface();
            self.shared.wait_until(
                |s| s.host_surface_available || s.cancel_requested || s.state != LifecycleState::Running,
                self.options.surface_retry_interval,
            );
            return Ok(());
        }

        if !self.core.lock().frame_ready() {
            self.advance(LifecycleState::Running, LifecycleState::ResumingRequested)?;
            return Ok(());
        }

        self.pacer.pace();
        match self.ui_jobs.clone() {
            Some(ui_jobs) => self.dispatch_frame(&ui_jobs),
            None => {
                self.core.lock().run_frame();
            }
        }
        Ok(())
    }

    fn pausing(&mut self) -> Result<(), LifecycleError> {
        self.core.lock().pause();
        if self.advance(LifecycleState::PausingRequested, LifecycleState::Paused)? {
            self.pacer.reset();
            log::debug!("render session {} paused", self.session_id);
            self.events.fire_paused();
        }
        Ok(())
    }

    fn resuming(&mut self, tick: &Tick) -> Result<(), LifecycleError> {
        if !tick.host_surface_available {
            self.shared
                .wait_for_host_surface(self.options.surface_retry_interval);
            return Ok(());
        }

        let prepared = {
            let mut core = self.core.lock();
            let prepared = core.prepare(tick.surface_size);
            if prepared.is_ok() {
                core.finish_resume();
            }
            if self.ui_jobs.is_some() {
                core.release_current();
            }
            prepared
        };

        if let Err(err) = prepared {
            log::warn!("resume attempt failed, retrying: {err}");
            self.shared.wait_until(
                |s| s.cancel_requested || s.state != LifecycleState::ResumingRequested,
                self.options.surface_retry_interval,
            );
            return Ok(());
        }

        match self.shared.complete_resume() {
            Some(true) => {
                self.pacer.reset();
                log::debug!("render session {} resumed", self.session_id);
                self.events.fire_resumed();
            }
            Some(false) => {
                self.pacer.reset();
                log::debug!("render session {} restored its drawable", self.session_id);
            }
            None => {}
        }
        Ok(())
    }

    fn force_recreate(&mut self, tick: &Tick) -> Result<(), LifecycleError> {
        if tick.host_surface_available {
            let mut core = self.core.lock();
            if let Err(err) = core.recreate_surface(tick.surface_size) {
                log::warn!("recreating surface failed: {err}");
            }
            if self.ui_jobs.is_some() {
                core.release_current();
            }
        }
        self.advance(LifecycleState::ForceRecreateSurface, LifecycleState::Running)?;
        Ok(())
    }

    /// ### English
    /// Ships one frame to the UI pump and parks until it ran. A frame the UI thread has not
    /// claimed yet is abandoned on cancellation or when the state leaves `Running`.
    ///
    /// ### 中文
    /// 向 UI 泵发送一帧并 park 直到其执行完成。若 UI 线程尚未领取，
    /// 在取消或状态离开 `Running` 时放弃该帧。
    fn dispatch_frame(&self, ui_jobs: &channel::Sender<UiJob>) {
        let ticket = Arc::new(FrameTicket::new(thread::current()));
        let job = UiJob {
            ticket: ticket.clone(),
            core: self.core.clone(),
        };
        if ui_jobs.send(job).is_err() {
            log::debug!("UI frame pump is gone; dropping frame");
            return;
        }

        let recheck = self.options.ui_frame_wait.min(MAX_UI_FRAME_RECHECK);
        loop {
            if ticket.wait_timeout(recheck) {
                return;
            }
            let abandon = {
                let s = self.shared.lock();
                s.cancel_requested || s.state != LifecycleState::Running
            };
            if abandon && ticket.abandon() {
                log::trace!("abandoned unclaimed UI frame");
                return;
            }
        }
    }
}
