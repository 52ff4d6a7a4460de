//! ### English
//! In-memory graphics binding used by unit tests.
//!
//! ### 中文
//! 单元测试使用的内存图形绑定。

use std::collections::HashSet;
use std::num::NonZeroU64;
use std::sync::Arc;

use dpi::PhysicalSize;
use parking_lot::Mutex;

use super::{BindingError, ContextHandle, GraphicsBinding, PixelConfig, SurfaceHandle};

/// ### English
/// Shared, ordered log of binding calls and hook notifications.
///
/// ### 中文
/// 共享且有序的绑定调用与钩子通知日志。
#[derive(Clone, Default)]
pub(crate) struct FakeLog(Arc<Mutex<Vec<String>>>);

impl FakeLog {
    pub(crate) fn push(&self, call: &str) {
        self.0.lock().push(call.to_string());
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.0.lock().clone()
    }

    pub(crate) fn count(&self, call: &str) -> usize {
        self.0.lock().iter().filter(|c| *c == call).count()
    }
}

#[derive(Default)]
struct FakeState {
    next_id: u64,
    accept_only: Option<PixelConfig>,
    reject_all: bool,
    fail_surfaces: u32,
    lost: bool,
    contexts: HashSet<u64>,
    surfaces: HashSet<u64>,
}

/// ### English
/// Scriptable binding: can accept a single configuration, reject them all, fail the next
/// surfaces or lose the context.
///
/// ### 中文
/// 可编排的绑定：可以只接受某一配置、拒绝全部配置、让接下来的 surface 创建失败或丢失上下文。
#[derive(Clone)]
pub(crate) struct FakeBinding {
    log: FakeLog,
    state: Arc<Mutex<FakeState>>,
}

impl FakeBinding {
    pub(crate) fn new(log: FakeLog) -> Self {
        Self {
            log,
            state: Arc::new(Mutex::new(FakeState::default())),
        }
    }

    pub(crate) fn accept_only(self, config: PixelConfig) -> Self {
        self.state.lock().accept_only = Some(config);
        self
    }

    pub(crate) fn reject_all_configs(&self, reject: bool) {
        self.state.lock().reject_all = reject;
    }

    pub(crate) fn fail_next_surfaces(&self, count: u32) {
        self.state.lock().fail_surfaces = count;
    }

    pub(crate) fn lose_context(&self) {
        self.state.lock().lost = true;
    }

    pub(crate) fn live_surfaces(&self) -> usize {
        self.state.lock().surfaces.len()
    }

    pub(crate) fn live_contexts(&self) -> usize {
        self.state.lock().contexts.len()
    }

    fn next_id(state: &mut FakeState) -> NonZeroU64 {
        state.next_id += 1;
        NonZeroU64::new(state.next_id).unwrap_or(NonZeroU64::MIN)
    }
}

impl GraphicsBinding for FakeBinding {
    fn create_context(&mut self, config: &PixelConfig) -> Result<ContextHandle, BindingError> {
        self.log.push("create_context");
        let mut state = self.state.lock();
        let accepted = !state.reject_all && state.accept_only.is_none_or(|only| only == *config);
        if !accepted {
            return Err(BindingError::failed(0x3005, "EGL_BAD_CONFIG"));
        }
        state.lost = false;
        let id = Self::next_id(&mut state);
        state.contexts.insert(id.get());
        Ok(ContextHandle(id))
    }

    fn destroy_context(&mut self, context: ContextHandle) -> Result<(), BindingError> {
        self.log.push("destroy_context");
        self.state.lock().contexts.remove(&context.0.get());
        Ok(())
    }

    fn create_surface(
        &mut self,
        _context: ContextHandle,
        _size: PhysicalSize<u32>,
    ) -> Result<SurfaceHandle, BindingError> {
        self.log.push("create_surface");
        let mut state = self.state.lock();
        if state.fail_surfaces > 0 {
            state.fail_surfaces -= 1;
            return Err(BindingError::failed(0x300B, "EGL_BAD_NATIVE_WINDOW"));
        }
        let id = Self::next_id(&mut state);
        state.surfaces.insert(id.get());
        Ok(SurfaceHandle(id))
    }

    fn destroy_surface(&mut self, surface: SurfaceHandle) -> Result<(), BindingError> {
        self.log.push("destroy_surface");
        self.state.lock().surfaces.remove(&surface.0.get());
        Ok(())
    }

    fn make_current(
        &mut self,
        _context: ContextHandle,
        _surface: SurfaceHandle,
    ) -> Result<(), BindingError> {
        self.log.push("make_current");
        if self.state.lock().lost {
            return Err(BindingError::ContextLost { code: 0x300E });
        }
        Ok(())
    }

    fn clear_current(&mut self) -> Result<(), BindingError> {
        self.log.push("clear_current");
        Ok(())
    }

    fn swap_buffers(&mut self, _surface: SurfaceHandle) -> Result<(), BindingError> {
        self.log.push("swap_buffers");
        if self.state.lock().lost {
            return Err(BindingError::ContextLost { code: 0x300E });
        }
        Ok(())
    }
}
