//! ### English
//! Shared fixtures for the integration tests: a recording graphics binding, counting hooks and
//! a harness owning one view.
//!
//! ### 中文
//! 集成测试共用的夹具：记录调用的图形绑定、计数钩子以及持有一个 view 的测试框架。

#![allow(dead_code)]

use std::num::NonZeroU64;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::thread::{self, ThreadId};
use std::time::{Duration, Instant};

use dpi::PhysicalSize;
use parking_lot::Mutex;

use gameview::{
    BindingError, ContextHandle, GameHooks, GameView, GraphicsBinding, LifecycleState,
    PixelConfig, Resumer, SurfaceHandle, ViewOptions,
};

pub const TIMEOUT: Duration = Duration::from_secs(5);

/// ### English
/// EGL's `EGL_BAD_CONFIG`, reported while context creation is being rejected.
///
/// ### 中文
/// EGL 的 `EGL_BAD_CONFIG`，在拒绝创建上下文期间返回。
const BAD_CONFIG: i32 = 0x3005;
const CONTEXT_LOST: i32 = 0x300E;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// ### English
/// Polls `done` until it holds or `timeout` elapses.
///
/// ### 中文
/// 轮询 `done`，直到其成立或超过 `timeout`。
pub fn eventually(timeout: Duration, mut done: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if done() {
            return true;
        }
        thread::sleep(Duration::from_millis(1));
    }
    done()
}

#[derive(Default)]
struct BindingState {
    calls: Vec<&'static str>,
    next_id: u64,
    live_contexts: u32,
    live_surfaces: u32,
    lost: bool,
    reject_contexts: bool,
}

/// ### English
/// Graphics binding that records every call and can simulate context loss or a platform that
/// rejects every pixel configuration.
///
/// ### 中文
/// 记录每次调用的图形绑定，可模拟上下文丢失，或模拟拒绝所有像素配置的平台。
#[derive(Clone, Default)]
pub struct RecordingBinding {
    state: Arc<Mutex<BindingState>>,
}

impl RecordingBinding {
    pub fn count(&self, call: &str) -> usize {
        self.state.lock().calls.iter().filter(|c| **c == call).count()
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.state.lock().calls.clone()
    }

    /// ### English
    /// Appends a marker to the call log so tests can check ordering against binding calls.
    ///
    /// ### 中文
    /// 向调用日志追加一个标记，便于测试检查其与绑定调用之间的顺序。
    pub fn mark(&self, marker: &'static str) {
        self.record(marker);
    }

    pub fn live_contexts(&self) -> u32 {
        self.state.lock().live_contexts
    }

    pub fn live_surfaces(&self) -> u32 {
        self.state.lock().live_surfaces
    }

    pub fn lose_context(&self) {
        self.state.lock().lost = true;
    }

    pub fn reject_contexts(&self, reject: bool) {
        self.state.lock().reject_contexts = reject;
    }

    fn record(&self, call: &'static str) -> parking_lot::MutexGuard<'_, BindingState> {
        let mut state = self.state.lock();
        state.calls.push(call);
        state
    }

    fn next_id(state: &mut BindingState) -> NonZeroU64 {
        state.next_id += 1;
        NonZeroU64::new(state.next_id).unwrap()
    }
}

impl GraphicsBinding for RecordingBinding {
    fn create_context(&mut self, config: &PixelConfig) -> Result<ContextHandle, BindingError> {
        let mut state = self.record("create_context");
        if state.reject_contexts {
            return Err(BindingError::failed(BAD_CONFIG, format!("{config} rejected")));
        }
        state.lost = false;
        state.live_contexts += 1;
        Ok(ContextHandle(Self::next_id(&mut state)))
    }

    fn destroy_context(&mut self, _context: ContextHandle) -> Result<(), BindingError> {
        self.record("destroy_context").live_contexts -= 1;
        Ok(())
    }

    fn create_surface(
        &mut self,
        _context: ContextHandle,
        _size: PhysicalSize<u32>,
    ) -> Result<SurfaceHandle, BindingError> {
        let mut state = self.record("create_surface");
        state.live_surfaces += 1;
        Ok(SurfaceHandle(Self::next_id(&mut state)))
    }

    fn destroy_surface(&mut self, _surface: SurfaceHandle) -> Result<(), BindingError> {
        self.record("destroy_surface").live_surfaces -= 1;
        Ok(())
    }

    fn make_current(
        &mut self,
        _context: ContextHandle,
        _surface: SurfaceHandle,
    ) -> Result<(), BindingError> {
        if self.record("make_current").lost {
            return Err(BindingError::ContextLost { code: CONTEXT_LOST });
        }
        Ok(())
    }

    fn clear_current(&mut self) -> Result<(), BindingError> {
        self.record("clear_current");
        Ok(())
    }

    fn swap_buffers(&mut self, _surface: SurfaceHandle) -> Result<(), BindingError> {
        if self.record("swap_buffers").lost {
            return Err(BindingError::ContextLost { code: CONTEXT_LOST });
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct HookCounters {
    pub loads: AtomicU32,
    pub unloads: AtomicU32,
    pub context_lost: AtomicU32,
    pub context_set: AtomicU32,
    pub updates: AtomicU32,
    pub renders: AtomicU32,
    pub panic_next_update: AtomicBool,
    pub render_threads: Mutex<Vec<ThreadId>>,
}

impl HookCounters {
    pub fn get(counter: &AtomicU32) -> u32 {
        counter.load(Ordering::SeqCst)
    }
}

/// ### English
/// Application hooks that count every notification.
///
/// ### 中文
/// 对每个通知计数的应用钩子。
pub struct RecordingHooks(pub Arc<HookCounters>);

impl GameHooks for RecordingHooks {
    fn on_load(&mut self) {
        self.0.loads.fetch_add(1, Ordering::SeqCst);
    }

    fn on_unload(&mut self) {
        self.0.unloads.fetch_add(1, Ordering::SeqCst);
    }

    fn on_context_lost(&mut self) {
        self.0.context_lost.fetch_add(1, Ordering::SeqCst);
    }

    fn on_context_set(&mut self) {
        self.0.context_set.fetch_add(1, Ordering::SeqCst);
    }

    fn on_update_frame(&mut self, _elapsed: Duration) -> anyhow::Result<()> {
        self.0.updates.fetch_add(1, Ordering::SeqCst);
        if self.0.panic_next_update.swap(false, Ordering::SeqCst) {
            panic!("update exploded");
        }
        Ok(())
    }

    fn on_render_frame(&mut self, _elapsed: Duration) -> anyhow::Result<()> {
        self.0.renders.fetch_add(1, Ordering::SeqCst);
        let mut threads = self.0.render_threads.lock();
        let current = thread::current().id();
        if !threads.contains(&current) {
            threads.push(current);
        }
        Ok(())
    }
}

/// ### English
/// Resumer that marks each draw in the binding's call log and remembers how many
/// `on_context_set` notifications had fired when it drew.
///
/// ### 中文
/// 在绑定调用日志中标记每次绘制的 resumer，并记录绘制时已触发的 `on_context_set` 次数。
pub struct CountingResumer {
    pub binding: RecordingBinding,
    pub hooks: Arc<HookCounters>,
    pub draws: Arc<Mutex<Vec<u32>>>,
}

impl Resumer for CountingResumer {
    fn draw(&mut self, size: PhysicalSize<u32>) -> anyhow::Result<()> {
        self.binding.mark("resumer_draw");
        self.draws
            .lock()
            .push(HookCounters::get(&self.hooks.context_set));
        anyhow::ensure!(size.width > 0 && size.height > 0, "empty drawable");
        Ok(())
    }
}

pub struct Harness {
    pub view: GameView,
    pub binding: RecordingBinding,
    pub hooks: Arc<HookCounters>,
}

impl Harness {
    pub fn new(options: ViewOptions) -> Self {
        init_logging();
        let binding = RecordingBinding::default();
        let hooks = Arc::new(HookCounters::default());
        let view = GameView::new(
            Box::new(binding.clone()),
            Box::new(RecordingHooks(hooks.clone())),
            options,
        );
        Self {
            view,
            binding,
            hooks,
        }
    }

    pub fn worker() -> Self {
        Self::new(ViewOptions::default().resume_wait_cap(Duration::from_millis(500)))
    }

    pub fn wait_state(&self, state: LifecycleState) -> bool {
        self.view.wait_for_state(|s| s == state, TIMEOUT)
    }

    /// ### English
    /// Waits until at least `n` more frames were rendered.
    ///
    /// ### 中文
    /// 等待至少再渲染 `n` 帧。
    pub fn wait_frames(&self, n: u32) -> bool {
        let start = HookCounters::get(&self.hooks.renders);
        eventually(TIMEOUT, || HookCounters::get(&self.hooks.renders) >= start + n)
    }

    /// ### English
    /// Pumps the UI frame queue until `state` is reached (render-on-UI-thread mode).
    ///
    /// ### 中文
    /// 持续泵送 UI 帧队列直到到达 `state`（UI 线程渲染模式）。
    pub fn pump_until(&self, state: LifecycleState) -> bool {
        eventually(TIMEOUT, || {
            self.view.pump_ui();
            self.view.state() == state
        })
    }
}
