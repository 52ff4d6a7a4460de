//! ### English
//! Owner of the GPU context and drawable surface.
//!
//! ### 中文
//! GPU 上下文与可绘制 surface 的持有者。

use dpi::PhysicalSize;

use crate::engine::error::LifecycleError;

use super::{BindingError, ContextHandle, GraphicsBinding, PixelConfig, SurfaceHandle};
use super::config::candidate_configs;

/// ### English
/// Creates, binds and destroys the context/surface pair through a [`GraphicsBinding`].
///
/// The handles never leave this type. All destroy operations are idempotent, and a failed create
/// leaves the corresponding `*_available()` flag `false` so the caller can simply retry later.
///
/// ### 中文
/// 通过 [`GraphicsBinding`] 创建、绑定并销毁上下文/surface 对。
///
/// 句柄不会离开该类型。所有销毁操作都是幂等的；创建失败时对应的 `*_available()` 保持 `false`，
/// 调用方稍后重试即可。
pub struct SurfaceLifecycle {
    binding: Box<dyn GraphicsBinding>,
    requested_depth: u8,
    requested_stencil: u8,
    context: Option<ContextHandle>,
    surface: Option<SurfaceHandle>,
    config: Option<PixelConfig>,
    surface_size: PhysicalSize<u32>,
    /// ### English
    /// Set once per loss; cleared when a new context is created.
    ///
    /// ### 中文
    /// 每次丢失只置位一次；创建新上下文时清除。
    context_lost: bool,
    /// ### English
    /// Whether this manager last left a context current on some thread.
    ///
    /// ### 中文
    /// 该管理器最近一次是否在某个线程上留下了 current 的上下文。
    current: bool,
}

impl SurfaceLifecycle {
    pub fn new(binding: Box<dyn GraphicsBinding>, requested_depth: u8, requested_stencil: u8) -> Self {
        Self {
            binding,
            requested_depth,
            requested_stencil,
            context: None,
            surface: None,
            config: None,
            surface_size: PhysicalSize::new(0, 0),
            context_lost: false,
            current: false,
        }
    }

    /// ### English
    /// `true` when a context exists and has not been reported lost.
    ///
    /// ### 中文
    /// 存在上下文且未被报告丢失时为 `true`。
    pub fn context_available(&self) -> bool {
        self.context.is_some() && !self.context_lost
    }

    pub fn surface_available(&self) -> bool {
        self.surface.is_some()
    }

    pub fn context_lost(&self) -> bool {
        self.context_lost
    }

    /// ### English
    /// Configuration chosen by the last successful [`Self::create_context`].
    ///
    /// ### 中文
    /// 最近一次成功的 [`Self::create_context`] 所选中的配置。
    pub fn config(&self) -> Option<PixelConfig> {
        self.config
    }

    pub fn surface_size(&self) -> PhysicalSize<u32> {
        self.surface_size
    }

    /// ### English
    /// Creates a new context, trying candidate configurations richest first.
    ///
    /// A context left over from an earlier call is destroyed first. Fails with
    /// [`LifecycleError::NoPixelConfig`] only when every candidate was rejected.
    ///
    /// ### 中文
    /// 创建新上下文，按从丰富到简单的顺序尝试候选配置。
    ///
    /// 之前遗留的上下文会先被销毁。只有全部候选都被拒绝时才返回
    /// [`LifecycleError::NoPixelConfig`]。
    pub fn create_context(&mut self) -> Result<(ContextHandle, PixelConfig), LifecycleError> {
        self.destroy_context();

        for candidate in candidate_configs(self.requested_depth, self.requested_stencil) {
            match self.binding.create_context(&candidate) {
                Ok(context) => {
                    log::debug!("created graphics context with {candidate}");
                    self.context = Some(context);
                    self.config = Some(candidate);
                    self.context_lost = false;
                    return Ok((context, candidate));
                }
                Err(err) => {
                    log::debug!("pixel configuration {candidate} rejected: {err}");
                }
            }
        }

        log::warn!(
            "no pixel configuration accepted (requested depth {}, stencil {})",
            self.requested_depth,
            self.requested_stencil
        );
        Err(LifecycleError::NoPixelConfig)
    }

    /// ### English
    /// Destroys the context (and any surface attached to it). No-op without a context.
    ///
    /// ### 中文
    /// 销毁上下文（以及附着其上的 surface）。没有上下文时为空操作。
    pub fn destroy_context(&mut self) {
        self.destroy_surface();

        let Some(context) = self.context.take() else {
            return;
        };
        self.clear_current();
        if let Err(err) = self.binding.destroy_context(context) {
            log::warn!("destroying graphics context failed: {err}");
        }
        self.config = None;
        self.context_lost = false;
    }

    /// ### English
    /// Creates the drawable at `size` and makes it current, unless a surface already exists.
    ///
    /// On failure nothing is kept: `surface_available()` stays `false`. A
    /// [`BindingError::ContextLost`] from either step marks the context lost.
    ///
    /// ### 中文
    /// 以 `size` 创建可绘制 surface 并设为 current（若 surface 已存在则直接返回）。
    ///
    /// 失败时不保留任何状态：`surface_available()` 保持 `false`。任一步骤返回
    /// [`BindingError::ContextLost`] 都会把上下文标记为丢失。
    pub fn create_surface(&mut self, size: PhysicalSize<u32>) -> Result<SurfaceHandle, LifecycleError> {
        if let Some(surface) = self.surface {
            return Ok(surface);
        }
        let Some(context) = self.context else {
            return Err(LifecycleError::NoContext);
        };

        let size = PhysicalSize::new(size.width.max(1), size.height.max(1));
        let surface = match self.binding.create_surface(context, size) {
            Ok(surface) => surface,
            Err(err) => return Err(self.surface_failure("creating surface", err)),
        };

        if let Err(err) = self.binding.make_current(context, surface) {
            if let Err(destroy_err) = self.binding.destroy_surface(surface) {
                log::debug!("discarding unbound surface failed: {destroy_err}");
            }
            return Err(self.surface_failure("binding surface", err));
        }

        self.current = true;
        self.surface = Some(surface);
        self.surface_size = size;
        log::debug!("created surface {}x{}", size.width, size.height);
        Ok(surface)
    }

    /// ### English
    /// Unbinds and destroys the surface. No-op without a surface.
    ///
    /// ### 中文
    /// 解绑并销毁 surface。没有 surface 时为空操作。
    pub fn destroy_surface(&mut self) {
        let Some(surface) = self.surface.take() else {
            return;
        };
        self.clear_current();
        if let Err(err) = self.binding.destroy_surface(surface) {
            log::warn!("destroying surface failed: {err}");
        }
    }

    /// ### English
    /// Binds the context/surface pair to the calling thread.
    ///
    /// ### 中文
    /// 将上下文/surface 对绑定到调用线程。
    pub fn make_current(&mut self) -> Result<(), LifecycleError> {
        let (Some(context), Some(surface)) = (self.context, self.surface) else {
            return Err(LifecycleError::NoContext);
        };
        match self.binding.make_current(context, surface) {
            Ok(()) => {
                self.current = true;
                Ok(())
            }
            Err(err) => {
                if err.is_context_lost() {
                    self.mark_context_lost(&err);
                }
                Err(err.into())
            }
        }
    }

    pub fn clear_current(&mut self) {
        if !self.current {
            return;
        }
        self.current = false;
        if let Err(err) = self.binding.clear_current() {
            log::debug!("clearing current context failed: {err}");
        }
    }

    /// ### English
    /// Presents the frame. A failure marks the context lost (logged once per loss); the caller
    /// keeps running and recovers through the recreation path.
    ///
    /// ### 中文
    /// 呈现当前帧。失败会把上下文标记为丢失（每次丢失只记录一次日志）；调用方继续运行，
    /// 并通过重建路径恢复。
    pub fn swap_buffers(&mut self) -> bool {
        let Some(surface) = self.surface else {
            return false;
        };
        match self.binding.swap_buffers(surface) {
            Ok(()) => true,
            Err(err) => {
                self.mark_context_lost(&err);
                false
            }
        }
    }

    fn surface_failure(&mut self, what: &str, err: BindingError) -> LifecycleError {
        if err.is_context_lost() {
            self.mark_context_lost(&err);
        } else {
            log::warn!("{what} failed: {err}");
        }
        err.into()
    }

    fn mark_context_lost(&mut self, err: &BindingError) {
        if self.context_lost || self.context.is_none() {
            return;
        }
        log::warn!("graphics context lost: {err}");
        self.context_lost = true;
    }
}

impl Drop for SurfaceLifecycle {
    fn drop(&mut self) {
        self.destroy_context();
    }
}
