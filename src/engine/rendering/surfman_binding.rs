//! ### English
//! [`GraphicsBinding`] backed by surfman (EGL/GLX/WGL/CGL behind one API).
//! Surfaces are generic offscreen surfaces; presenting swaps surfman's back buffer.
//!
//! ### 中文
//! 基于 surfman 的 [`GraphicsBinding`] 实现（以统一 API 封装 EGL/GLX/WGL/CGL）。
//! surface 为通用离屏 surface；present 时交换 surfman 的后台缓冲。

use std::collections::HashMap;
use std::num::NonZeroU64;
use std::sync::Arc;

use dpi::PhysicalSize;
use euclid::default::Size2D;
use surfman::{
    Connection, Context, ContextAttributeFlags, ContextAttributes, Device, GLApi, GLVersion,
    SurfaceAccess, SurfaceType,
};

use super::{BindingError, ContextHandle, GraphicsBinding, PixelConfig, SurfaceHandle};

/// ### English
/// Platform error code used for surfman failures (surfman errors carry no numeric code).
///
/// ### 中文
/// surfman 失败时使用的平台错误码（surfman 错误本身不带数值码）。
const SURFMAN_ERROR_CODE: i32 = -1;

fn surfman_error(what: &str, err: surfman::Error) -> BindingError {
    BindingError::failed(SURFMAN_ERROR_CODE, format!("{what}: {err:?}"))
}

/// ### English
/// Converts a host size to surfman's signed size, rejecting dimensions above `i32::MAX`.
///
/// ### 中文
/// 将宿主尺寸转换为 surfman 的有符号尺寸，超过 `i32::MAX` 的维度会被拒绝。
fn surface_size(size: PhysicalSize<u32>) -> Result<Size2D<i32>, BindingError> {
    let (Ok(width), Ok(height)) = (i32::try_from(size.width), i32::try_from(size.height)) else {
        return Err(BindingError::failed(
            SURFMAN_ERROR_CODE,
            format!("surface size {}x{} exceeds i32", size.width, size.height),
        ));
    };
    Ok(Size2D::new(width, height))
}

/// ### English
/// surfman-backed graphics binding.
///
/// ### 中文
/// 基于 surfman 的图形绑定。
pub struct SurfmanBinding {
    connection: Connection,
    device: Device,
    contexts: HashMap<u64, Context>,
    /// ### English
    /// Surface id -> id of the context the surface is bound to.
    ///
    /// ### 中文
    /// surface id -> 该 surface 所绑定的上下文 id。
    surfaces: HashMap<u64, u64>,
    /// ### English
    /// glow loader for the current context (rebuilt after each new context).
    ///
    /// ### 中文
    /// 当前上下文的 glow 函数加载器（每次新建上下文后重建）。
    glow: Option<Arc<glow::Context>>,
    next_id: u64,
}

/// ### English
/// surfman contexts are not `Send`, but the lifecycle core only ever touches a binding from one
/// thread at a time (behind the render-core lock) and always clears the current context before
/// control moves to another thread.
///
/// ### 中文
/// surfman 上下文不是 `Send`，但生命周期核心同一时刻只会在一个线程上使用绑定（受渲染核心锁保护），
/// 并且在控制权转移到其他线程之前总会清除 current 上下文。
unsafe impl Send for SurfmanBinding {}

impl SurfmanBinding {
    /// ### English
    /// Opens a surfman connection and device on the default adapter.
    ///
    /// ### 中文
    /// 在默认 adapter 上打开 surfman connection 与 device。
    pub fn new() -> Result<Self, BindingError> {
        let connection =
            Connection::new().map_err(|err| surfman_error("creating connection", err))?;
        let adapter = connection
            .create_adapter()
            .map_err(|err| surfman_error("creating adapter", err))?;
        let device = connection
            .create_device(&adapter)
            .map_err(|err| surfman_error("creating device", err))?;

        Ok(Self {
            connection,
            device,
            contexts: HashMap::new(),
            surfaces: HashMap::new(),
            glow: None,
            next_id: 0,
        })
    }

    /// ### English
    /// glow API for the most recently created context, available after the first `make_current`.
    ///
    /// ### 中文
    /// 最近创建的上下文对应的 glow API，在首次 `make_current` 之后可用。
    pub fn gl(&self) -> Option<Arc<glow::Context>> {
        self.glow.clone()
    }

    fn next_id(&mut self) -> NonZeroU64 {
        self.next_id += 1;
        NonZeroU64::new(self.next_id).unwrap_or(NonZeroU64::MIN)
    }

    fn attributes(&self, config: &PixelConfig) -> ContextAttributes {
        let mut flags = ContextAttributeFlags::empty();
        if config.alpha > 0 {
            flags |= ContextAttributeFlags::ALPHA;
        }
        if config.depth > 0 {
            flags |= ContextAttributeFlags::DEPTH;
        }
        if config.stencil > 0 {
            flags |= ContextAttributeFlags::STENCIL;
        }
        let version = match self.connection.gl_api() {
            GLApi::GLES => GLVersion::new(3, 0),
            GLApi::GL => GLVersion::new(3, 2),
        };
        ContextAttributes { version, flags }
    }

    fn load_glow(&mut self, id: u64) {
        let Some(context) = self.contexts.get(&id) else {
            return;
        };
        let device = &self.device;
        let glow = unsafe {
            glow::Context::from_loader_function(|name| device.get_proc_address(context, name))
        };
        self.glow = Some(Arc::new(glow));
    }
}

impl GraphicsBinding for SurfmanBinding {
    fn create_context(&mut self, config: &PixelConfig) -> Result<ContextHandle, BindingError> {
        let attributes = self.attributes(config);
        let descriptor = self
            .device
            .create_context_descriptor(&attributes)
            .map_err(|err| surfman_error("creating context descriptor", err))?;
        let context = self
            .device
            .create_context(&descriptor, None)
            .map_err(|err| surfman_error("creating context", err))?;

        let id = self.next_id();
        self.contexts.insert(id.get(), context);
        self.glow = None;
        Ok(ContextHandle(id))
    }

    fn destroy_context(&mut self, context: ContextHandle) -> Result<(), BindingError> {
        let Some(mut ctx) = self.contexts.remove(&context.0.get()) else {
            return Ok(());
        };
        self.surfaces.retain(|_, owner| *owner != context.0.get());
        if let Ok(Some(mut surface)) = self.device.unbind_surface_from_context(&mut ctx) {
            let _ = self.device.destroy_surface(&mut ctx, &mut surface);
        }
        self.device
            .destroy_context(&mut ctx)
            .map_err(|err| surfman_error("destroying context", err))
    }

    fn create_surface(
        &mut self,
        context: ContextHandle,
        size: PhysicalSize<u32>,
    ) -> Result<SurfaceHandle, BindingError> {
        let size = surface_size(size)?;
        let context_id = context.0.get();
        let Some(ctx) = self.contexts.get_mut(&context_id) else {
            return Err(BindingError::failed(SURFMAN_ERROR_CODE, "unknown context handle"));
        };

        let surface = self
            .device
            .create_surface(ctx, SurfaceAccess::GPUOnly, SurfaceType::Generic { size })
            .map_err(|err| surfman_error("creating surface", err))?;
        if let Err((err, mut surface)) = self.device.bind_surface_to_context(ctx, surface) {
            let _ = self.device.destroy_surface(ctx, &mut surface);
            return Err(surfman_error("binding surface", err));
        }

        let id = self.next_id();
        self.surfaces.insert(id.get(), context_id);
        Ok(SurfaceHandle(id))
    }

    fn destroy_surface(&mut self, surface: SurfaceHandle) -> Result<(), BindingError> {
        let Some(context_id) = self.surfaces.remove(&surface.0.get()) else {
            return Ok(());
        };
        let device = &mut self.device;
        let Some(ctx) = self.contexts.get_mut(&context_id) else {
            return Ok(());
        };
        let unbound = device
            .unbind_surface_from_context(ctx)
            .map_err(|err| surfman_error("unbinding surface", err))?;
        if let Some(mut unbound) = unbound {
            device
                .destroy_surface(ctx, &mut unbound)
                .map_err(|err| surfman_error("destroying surface", err))?;
        }
        Ok(())
    }

    fn make_current(
        &mut self,
        context: ContextHandle,
        _surface: SurfaceHandle,
    ) -> Result<(), BindingError> {
        let context_id = context.0.get();
        let Some(ctx) = self.contexts.get(&context_id) else {
            return Err(BindingError::ContextLost {
                code: SURFMAN_ERROR_CODE,
            });
        };
        if let Err(err) = self.device.make_context_current(ctx) {
            log::debug!("surfman make_context_current failed: {err:?}");
            return Err(BindingError::ContextLost {
                code: SURFMAN_ERROR_CODE,
            });
        }
        if self.glow.is_none() {
            self.load_glow(context_id);
        }
        Ok(())
    }

    fn clear_current(&mut self) -> Result<(), BindingError> {
        self.device
            .make_no_context_current()
            .map_err(|err| surfman_error("clearing current context", err))
    }

    fn swap_buffers(&mut self, surface: SurfaceHandle) -> Result<(), BindingError> {
        let Some(&context_id) = self.surfaces.get(&surface.0.get()) else {
            return Err(BindingError::failed(SURFMAN_ERROR_CODE, "unknown surface handle"));
        };
        let device = &mut self.device;
        let ctx = self.contexts.get_mut(&context_id).ok_or(BindingError::ContextLost {
            code: SURFMAN_ERROR_CODE,
        })?;

        let mut bound = device
            .unbind_surface_from_context(ctx)
            .map_err(|err| surfman_error("unbinding surface for present", err))?
            .ok_or(BindingError::ContextLost {
                code: SURFMAN_ERROR_CODE,
            })?;
        let presented = device.present_surface(ctx, &mut bound);
        if let Err((err, mut bound)) = device.bind_surface_to_context(ctx, bound) {
            let _ = device.destroy_surface(ctx, &mut bound);
            self.surfaces.remove(&surface.0.get());
            return Err(surfman_error("rebinding surface after present", err));
        }
        presented.map_err(|err| {
            log::debug!("surfman present_surface failed: {err:?}");
            BindingError::ContextLost {
                code: SURFMAN_ERROR_CODE,
            }
        })
    }
}

impl Drop for SurfmanBinding {
    fn drop(&mut self) {
        let ids: Vec<u64> = self.contexts.keys().copied().collect();
        for id in ids {
            if let Some(id) = NonZeroU64::new(id) {
                let _ = self.destroy_context(ContextHandle(id));
            }
        }
    }
}
