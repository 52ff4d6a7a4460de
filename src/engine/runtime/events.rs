//! ### English
//! Per-view lifecycle notifications fired by the render worker.
//!
//! ### 中文
//! 由渲染工作线程触发的单个 view 级生命周期通知。

use std::sync::Arc;

use parking_lot::Mutex;

use crate::engine::error::LifecycleError;

pub type LifecycleCallback = Arc<dyn Fn() + Send + Sync>;
pub type StopCallback = Arc<dyn Fn(Option<&LifecycleError>) + Send + Sync>;

/// ### English
/// Registered observers. Callbacks run on the render worker after the matching state has been
/// reached, never under the shared state lock.
///
/// ### 中文
/// 已注册的观察者。回调在对应状态到达之后于渲染工作线程上执行，执行时从不持有共享状态锁。
#[derive(Default)]
pub(crate) struct LifecycleEvents {
    paused: Mutex<Vec<LifecycleCallback>>,
    resumed: Mutex<Vec<LifecycleCallback>>,
    stopped: Mutex<Vec<StopCallback>>,
}

impl LifecycleEvents {
    pub(crate) fn on_paused(&self, callback: LifecycleCallback) {
        self.paused.lock().push(callback);
    }

    pub(crate) fn on_resumed(&self, callback: LifecycleCallback) {
        self.resumed.lock().push(callback);
    }

    pub(crate) fn on_stopped(&self, callback: StopCallback) {
        self.stopped.lock().push(callback);
    }

    pub(crate) fn fire_paused(&self) {
        let callbacks = self.paused.lock().clone();
        callbacks.iter().for_each(|cb| cb());
    }

    pub(crate) fn fire_resumed(&self) {
        let callbacks = self.resumed.lock().clone();
        callbacks.iter().for_each(|cb| cb());
    }

    pub(crate) fn fire_stopped(&self, outcome: Option<&LifecycleError>) {
        let callbacks = self.stopped.lock().clone();
        callbacks.iter().for_each(|cb| cb(outcome));
    }
}
