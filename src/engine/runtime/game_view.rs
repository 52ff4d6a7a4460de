//! ### English
//! Host-facing control API: one `GameView` per drawable, driven from the host UI thread.
//!
//! ### 中文
//! 面向宿主的控制 API：每个可绘制对象对应一个 `GameView`，由宿主 UI 线程驱动。

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::Duration;

use dpi::PhysicalSize;
use parking_lot::Mutex;

use crate::engine::error::LifecycleError;
use crate::engine::hooks::{GameHooks, Resumer};
use crate::engine::options::ViewOptions;
use crate::engine::rendering::{GraphicsBinding, SurfaceLifecycle};
use crate::engine::signal::{SpinOutcome, spin_until};

use super::dispatch::UiDispatcher;
use super::events::LifecycleEvents;
use super::render_core::RenderCore;
use super::shared::LifecycleShared;
use super::state::LifecycleState;
use super::timing::FramePacer;
use super::worker::RenderWorker;

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

const RENDER_THREAD_NAME: &str = "GameViewRender";

/// ### English
/// One live execution of the render worker.
///
/// ### 中文
/// 渲染工作线程的一次执行。
struct RenderSession {
    id: u64,
    thread: thread::JoinHandle<()>,
}

/// ### English
/// Game view: keeps a graphics context alive across host surface churn.
///
/// All methods are meant to be called from the host UI thread. They only *request* transitions;
/// the render worker performs the GPU work. `pause_blocking` and `stop` additionally wait for the
/// worker when frames run on the worker.
///
/// ### 中文
/// 游戏 view：在宿主 surface 反复创建/销毁的过程中保持图形上下文存活。
///
/// 所有方法都应在宿主 UI 线程上调用。它们只*请求*状态转移，GPU 工作由渲染工作线程完成。
/// 在工作线程渲染模式下，`pause_blocking` 与 `stop` 还会等待工作线程。
pub struct GameView {
    shared: Arc<LifecycleShared>,
    core: Arc<Mutex<RenderCore>>,
    events: Arc<LifecycleEvents>,
    options: ViewOptions,
    ui: Option<UiDispatcher>,
    session: Mutex<Option<RenderSession>>,
}

impl GameView {
    pub fn new(
        binding: Box<dyn GraphicsBinding>,
        hooks: Box<dyn GameHooks>,
        options: ViewOptions,
    ) -> Self {
        let surfaces = SurfaceLifecycle::new(binding, options.depth_bits, options.stencil_bits);
        let core = RenderCore::new(surfaces, hooks, options.log_fps);
        let ui = options.render_on_ui_thread.then(UiDispatcher::new);

        Self {
            shared: Arc::new(LifecycleShared::new()),
            core: Arc::new(Mutex::new(core)),
            events: Arc::new(LifecycleEvents::default()),
            options,
            ui,
            session: Mutex::new(None),
        }
    }

    /// ### English
    /// Starts a render session and returns immediately.
    ///
    /// `updates_per_second == 0.0` runs uncapped. A finished session is reaped first; a session
    /// that is still alive makes this fail with [`LifecycleError::AlreadyRunning`].
    ///
    /// ### 中文
    /// 启动渲染会话并立即返回。
    ///
    /// `updates_per_second == 0.0` 表示不限速。已结束的会话会先被回收；
    /// 仍然存活的会话会使该调用返回 [`LifecycleError::AlreadyRunning`]。
    pub fn run(&self, updates_per_second: f64) -> Result<(), LifecycleError> {
        self.sample_ui_priority();

        let mut session = self.session.lock();
        if session.is_some() && !self.shared.lock().exit_processed {
            return Err(LifecycleError::AlreadyRunning);
        }
        if let Some(finished) = session.take() {
            reap(finished);
        }

        self.shared.main_loop_gate.reset();
        self.shared.update(|s| {
            s.state = LifecycleState::ResumingRequested;
            s.cancel_requested = false;
            s.resume_processed = false;
            s.exit_processed = false;
            s.last_error = None;
        });

        let id = NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed);
        let worker = RenderWorker {
            session_id: id,
            shared: self.shared.clone(),
            core: self.core.clone(),
            events: self.events.clone(),
            options: self.options.clone(),
            ui_jobs: self.ui.as_ref().map(UiDispatcher::sender),
            pacer: FramePacer::new(updates_per_second),
        };

        let spawned = thread::Builder::new()
            .name(RENDER_THREAD_NAME.to_string())
            .spawn(move || worker.run());
        match spawned {
            Ok(thread) => {
                log::info!("render session {id} starting at {updates_per_second} updates/s");
                *session = Some(RenderSession { id, thread });
                Ok(())
            }
            Err(err) => {
                self.shared.update(|s| {
                    s.state = LifecycleState::Exited;
                    s.exit_processed = true;
                });
                Err(LifecycleError::WorkerSpawn(err))
            }
        }
    }

    /// ### English
    /// Requests a pause.
    ///
    /// In worker-render mode a resume that was requested but not yet processed is waited for
    /// first (bounded), so the pause is never applied to a half-resumed surface. Before any host
    /// surface existed the view goes straight to `Paused`.
    ///
    /// ### 中文
    /// 请求暂停。
    ///
    /// 工作线程渲染模式下，会先（有界地）等待已请求但尚未处理的恢复，使暂停永远不会作用于半恢复的
    /// surface。在宿主 surface 从未创建过之前，view 直接进入 `Paused`。
    pub fn pause(&self) {
        self.sample_ui_priority();

        if self.ui.is_none() {
            self.wait_for_pending_resume();
        }

        let gate = &self.shared.main_loop_gate;
        let (from, to) = self.shared.update(|s| {
            s.pause_resume_balance -= 1;
            if s.pause_resume_balance < 0 {
                log::warn!(
                    "pause without matching resume (balance {})",
                    s.pause_resume_balance
                );
            }

            let from = s.state;
            if !s.surface_ever_created && !from.is_exiting() {
                s.state = LifecycleState::Paused;
            } else if from.accepts_pause() {
                s.state = LifecycleState::PausingRequested;
            }
            // From `ResumingRequested` the permit left by `resume()` may still be owed to a
            // worker parked in `Paused`; only a worker that is looping can hold a stale one.
            if s.state != from
                && matches!(
                    from,
                    LifecycleState::Running | LifecycleState::ForceRecreateSurface
                )
            {
                gate.reset();
            }
            (from, s.state)
        });

        if from == to {
            log::debug!("pause ignored in {from:?}");
        } else {
            log::debug!("pause requested: {from:?} -> {to:?}");
        }
    }

    /// ### English
    /// [`Self::pause`] and wait until the worker reports the pause processed (worker-render
    /// mode only; returns immediately otherwise).
    ///
    /// ### 中文
    /// 执行 [`Self::pause`] 并等待工作线程报告暂停已处理（仅工作线程渲染模式；其他模式立即返回）。
    pub fn pause_blocking(&self, timeout: Duration) -> Result<(), LifecycleError> {
        self.pause();
        if self.ui.is_some() {
            return Ok(());
        }
        if self
            .shared
            .wait_until(|s| s.state != LifecycleState::PausingRequested, timeout)
        {
            Ok(())
        } else {
            Err(LifecycleError::Timeout)
        }
    }

    /// ### English
    /// Requests a resume. Honoured from `Paused` and from a pause the worker has not processed yet.
    ///
    /// ### 中文
    /// 请求恢复。在 `Paused` 以及工作线程尚未处理的暂停请求状态下生效。
    pub fn resume(&self) {
        self.sample_ui_priority();

        let (from, to) = self.shared.update(|s| {
            s.pause_resume_balance += 1;
            let from = s.state;
            if from.accepts_resume() {
                s.state = LifecycleState::ResumingRequested;
                s.resume_processed = false;
            }
            (from, s.state)
        });
        self.shared.main_loop_gate.set();

        if from == to {
            log::debug!("resume ignored in {from:?}");
        } else {
            log::debug!("resume requested: {from:?} -> {to:?}");
        }
    }

    /// ### English
    /// Requests exit. In worker-render mode blocks until the worker processed the exit and joins
    /// it; in render-on-UI-thread mode returns at once (the session is reaped by the next `run`
    /// or on drop).
    ///
    /// ### 中文
    /// 请求退出。工作线程渲染模式下阻塞直到工作线程处理完退出并 join；
    /// UI 线程渲染模式下立即返回（会话由下一次 `run` 或 drop 回收）。
    pub fn stop(&self) -> Result<(), LifecycleError> {
        self.sample_ui_priority();

        let mut session = self.session.lock();
        if session.is_none() {
            return Err(LifecycleError::NotRunning);
        }
        self.request_exit();

        if self.ui.is_some() {
            return Ok(());
        }
        while !self
            .shared
            .wait_until(|s| s.exit_processed, Duration::from_secs(1))
        {
            log::debug!("waiting for render worker to exit");
        }
        if let Some(finished) = session.take() {
            reap(finished);
        }
        Ok(())
    }

    /// ### English
    /// Host surface became available.
    ///
    /// ### 中文
    /// 宿主 surface 可用。
    pub fn surface_created(&self, size: PhysicalSize<u32>) {
        self.sample_ui_priority();
        self.shared.update(|s| {
            s.host_surface_available = true;
            s.surface_ever_created = true;
            s.surface_size = size;
        });
        log::debug!("host surface created {}x{}", size.width, size.height);
    }

    /// ### English
    /// Host surface geometry changed. While running this forces the drawable to be recreated;
    /// otherwise only the size is recorded.
    ///
    /// ### 中文
    /// 宿主 surface 几何尺寸变化。运行中会强制重建可绘制 surface；否则仅记录新尺寸。
    pub fn surface_changed(&self, size: PhysicalSize<u32>) {
        self.sample_ui_priority();
        let forced = self.shared.update(|s| {
            s.surface_size = size;
            if s.state == LifecycleState::Running {
                s.state = LifecycleState::ForceRecreateSurface;
                true
            } else {
                false
            }
        });
        log::debug!(
            "host surface changed {}x{} (recreate: {forced})",
            size.width,
            size.height
        );
    }

    pub fn surface_destroyed(&self) {
        self.sample_ui_priority();
        self.shared.update(|s| s.host_surface_available = false);
        log::debug!("host surface destroyed");
    }

    pub fn state(&self) -> LifecycleState {
        self.shared.state()
    }

    pub fn pause_resume_balance(&self) -> i32 {
        self.shared.lock().pause_resume_balance
    }

    /// ### English
    /// Whether a render session is alive (started and not yet exited).
    ///
    /// ### 中文
    /// 是否存在存活的渲染会话（已启动且尚未退出）。
    pub fn is_running(&self) -> bool {
        self.session.lock().is_some() && !self.shared.lock().exit_processed
    }

    /// ### English
    /// Runs the frames queued for the UI thread (render-on-UI-thread mode). Returns how many
    /// frames ran; always `0` in worker-render mode.
    ///
    /// ### 中文
    /// 执行为 UI 线程排队的帧（UI 线程渲染模式）。返回执行的帧数；工作线程渲染模式下总是 `0`。
    pub fn pump_ui(&self) -> usize {
        self.ui.as_ref().map_or(0, UiDispatcher::pump)
    }

    /// ### English
    /// Blocks until `done(state)` holds or `timeout` elapses. Returns whether it held.
    ///
    /// ### 中文
    /// 阻塞直到 `done(state)` 成立或超过 `timeout`。返回其是否成立。
    pub fn wait_for_state(
        &self,
        mut done: impl FnMut(LifecycleState) -> bool,
        timeout: Duration,
    ) -> bool {
        self.shared.wait_until(|s| done(s.state), timeout)
    }

    pub fn set_resumer(&self, resumer: Option<Box<dyn Resumer>>) {
        self.core.lock().set_resumer(resumer);
    }

    pub fn on_paused(&self, callback: impl Fn() + Send + Sync + 'static) {
        self.events.on_paused(Arc::new(callback));
    }

    /// ### English
    /// Registers an observer for resumes requested through [`Self::run`] or [`Self::resume`].
    /// The worker silently restoring its drawable after the host surface returns does not fire it.
    ///
    /// ### 中文
    /// 注册通过 [`Self::run`] 或 [`Self::resume`] 请求的恢复的观察者。
    /// 宿主 surface 回来后工作线程静默恢复可绘制 surface 时不会触发。
    pub fn on_resumed(&self, callback: impl Fn() + Send + Sync + 'static) {
        self.events.on_resumed(Arc::new(callback));
    }

    /// ### English
    /// Registers an observer for session end; it receives the fatal error, if any.
    ///
    /// ### 中文
    /// 注册会话结束观察者；若会话因致命错误结束，会收到该错误。
    pub fn on_stopped(
        &self,
        callback: impl Fn(Option<&LifecycleError>) + Send + Sync + 'static,
    ) {
        self.events.on_stopped(Arc::new(callback));
    }

    pub fn last_error(&self) -> Option<Arc<LifecycleError>> {
        self.shared.lock().last_error.clone()
    }

    pub fn options(&self) -> &ViewOptions {
        &self.options
    }

    fn request_exit(&self) {
        self.shared.update(|s| {
            s.cancel_requested = true;
            if s.state != LifecycleState::Exited {
                s.state = LifecycleState::ExitingRequested;
            }
        });
        self.shared.main_loop_gate.set();
    }

    fn sample_ui_priority(&self) {
        if let Some(probe) = self.options.priority_probe.as_ref() {
            let priority = probe.current_priority();
            self.shared.lock().ui_priority = priority;
        }
    }

    /// ### English
    /// Pause-after-resume barrier for a host resume the worker has not processed yet. Ends once
    /// the resume is processed, the host surface is gone, cancellation is requested, or after
    /// `resume_wait_cap`.
    ///
    /// ### 中文
    /// 针对工作线程尚未处理的宿主恢复请求的“恢复后再暂停”屏障。在恢复处理完成、宿主 surface 消失、
    /// 请求取消或超过 `resume_wait_cap` 时结束。
    fn wait_for_pending_resume(&self) {
        let pending = |shared: &LifecycleShared| {
            let s = shared.lock();
            !s.resume_processed
                && s.state == LifecycleState::ResumingRequested
                && s.host_surface_available
                && !s.cancel_requested
        };
        if !pending(&self.shared) {
            return;
        }
        if spin_until(self.options.resume_wait_cap, || !pending(&self.shared))
            == SpinOutcome::TimedOut
        {
            log::warn!(
                "resume still pending after {:?}; pausing anyway",
                self.options.resume_wait_cap
            );
        }
    }
}

impl Drop for GameView {
    fn drop(&mut self) {
        let Some(session) = self.session.get_mut().take() else {
            return;
        };
        self.request_exit();
        reap(session);
    }
}

fn reap(session: RenderSession) {
    if session.thread.join().is_err() {
        log::error!("render session {} thread panicked", session.id);
    }
}
