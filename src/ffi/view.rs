//! ### English
//! C ABI bindings for view lifecycle and host surface callbacks.
//!
//! ### 中文
//! view 生命周期与宿主 surface 回调的 C ABI 绑定。

use std::time::Duration;

use dpi::PhysicalSize;

use crate::engine::{GameView, ViewOptions};

use super::binding::FfiGraphicsBinding;
use super::hooks::FfiHooks;
use super::{
    GAMEVIEW_STATUS_NULL_POINTER, GameViewGraphicsApi, GameViewHandle, GameViewHooks, status,
};

#[unsafe(no_mangle)]
/// ### English
/// Creates one view.
///
/// Returns NULL if `api`/`hooks` is NULL or the graphics table is incomplete. Both tables are
/// copied; the `user_data` pointers they carry must stay valid until the view is destroyed.
///
/// #### Parameters
/// - `view_flags`: `GAMEVIEW_VIEW_FLAG_*` bitmask.
/// - `depth_bits` / `stencil_bits`: preferred depth/stencil sizes for the first pixel-config
///   candidates.
///
/// ### 中文
/// 创建一个 view。
///
/// 当 `api`/`hooks` 为空指针或图形函数表不完整时返回 NULL。两个函数表都会被复制；
/// 其携带的 `user_data` 指针在 view 销毁之前必须保持有效。
///
/// #### 参数
/// - `view_flags`：`GAMEVIEW_VIEW_FLAG_*` 位掩码。
/// - `depth_bits` / `stencil_bits`：最优先像素配置候选使用的深度/模板位数。
pub unsafe extern "C" fn gameview_view_create(
    api: *const GameViewGraphicsApi,
    hooks: *const GameViewHooks,
    view_flags: u32,
    depth_bits: u8,
    stencil_bits: u8,
) -> *mut GameViewHandle {
    if api.is_null() || hooks.is_null() {
        return std::ptr::null_mut();
    }

    let (api, hooks) = unsafe { (*api, *hooks) };
    let Some(binding) = FfiGraphicsBinding::new(api) else {
        log::warn!("gameview_view_create: incomplete graphics function table");
        return std::ptr::null_mut();
    };

    let options = ViewOptions::from_flags(view_flags).depth_stencil(depth_bits, stencil_bits);
    let view = GameView::new(Box::new(binding), Box::new(FfiHooks::new(hooks)), options);
    Box::into_raw(Box::new(GameViewHandle { view }))
}

#[unsafe(no_mangle)]
/// ### English
/// Destroys a view created by `gameview_view_create`, stopping its render session first.
///
/// ### 中文
/// 销毁由 `gameview_view_create` 创建的 view，并先停止其渲染会话。
pub unsafe extern "C" fn gameview_view_destroy(view: *mut GameViewHandle) {
    if view.is_null() {
        return;
    }
    unsafe {
        drop(Box::from_raw(view));
    }
}

#[unsafe(no_mangle)]
/// ### English
/// Starts the render session. `updates_per_second = 0` runs uncapped.
///
/// ### 中文
/// 启动渲染会话。`updates_per_second = 0` 表示不限速。
pub unsafe extern "C" fn gameview_view_run(
    view: *mut GameViewHandle,
    updates_per_second: f64,
) -> i32 {
    if view.is_null() {
        return GAMEVIEW_STATUS_NULL_POINTER;
    }
    let view = unsafe { &(*view).view };
    status(view.run(updates_per_second))
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn gameview_view_pause(view: *mut GameViewHandle) {
    if view.is_null() {
        return;
    }
    unsafe { &(*view).view }.pause();
}

#[unsafe(no_mangle)]
/// ### English
/// Pauses and waits up to `timeout_ms` for the worker to process it.
///
/// ### 中文
/// 暂停并最多等待 `timeout_ms` 毫秒，直到工作线程处理完成。
pub unsafe extern "C" fn gameview_view_pause_blocking(
    view: *mut GameViewHandle,
    timeout_ms: u32,
) -> i32 {
    if view.is_null() {
        return GAMEVIEW_STATUS_NULL_POINTER;
    }
    let view = unsafe { &(*view).view };
    status(view.pause_blocking(Duration::from_millis(u64::from(timeout_ms))))
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn gameview_view_resume(view: *mut GameViewHandle) {
    if view.is_null() {
        return;
    }
    unsafe { &(*view).view }.resume();
}

#[unsafe(no_mangle)]
/// ### English
/// Stops the render session (blocks in worker-render mode, see `GameView::stop`).
///
/// ### 中文
/// 停止渲染会话（工作线程渲染模式下阻塞，见 `GameView::stop`）。
pub unsafe extern "C" fn gameview_view_stop(view: *mut GameViewHandle) -> i32 {
    if view.is_null() {
        return GAMEVIEW_STATUS_NULL_POINTER;
    }
    let view = unsafe { &(*view).view };
    status(view.stop())
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn gameview_view_surface_created(
    view: *mut GameViewHandle,
    width: u32,
    height: u32,
) {
    if view.is_null() {
        return;
    }
    unsafe { &(*view).view }.surface_created(PhysicalSize::new(width, height));
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn gameview_view_surface_changed(
    view: *mut GameViewHandle,
    width: u32,
    height: u32,
) {
    if view.is_null() {
        return;
    }
    unsafe { &(*view).view }.surface_changed(PhysicalSize::new(width, height));
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn gameview_view_surface_destroyed(view: *mut GameViewHandle) {
    if view.is_null() {
        return;
    }
    unsafe { &(*view).view }.surface_destroyed();
}

#[unsafe(no_mangle)]
/// ### English
/// Returns the current lifecycle state as its numeric value (`Exited = 0` for NULL).
///
/// ### 中文
/// 以数值形式返回当前生命周期状态（NULL 时返回 `Exited = 0`）。
pub unsafe extern "C" fn gameview_view_state(view: *mut GameViewHandle) -> u8 {
    if view.is_null() {
        return 0;
    }
    unsafe { &(*view).view }.state() as u8
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn gameview_view_pause_resume_balance(view: *mut GameViewHandle) -> i32 {
    if view.is_null() {
        return 0;
    }
    unsafe { &(*view).view }.pause_resume_balance()
}

#[unsafe(no_mangle)]
/// ### English
/// Runs frames queued for the UI thread (render-on-UI-thread mode). Call regularly from the host
/// UI thread. Returns how many frames ran.
///
/// ### 中文
/// 执行为 UI 线程排队的帧（UI 线程渲染模式）。宿主 UI 线程应定期调用。返回执行的帧数。
pub unsafe extern "C" fn gameview_view_pump(view: *mut GameViewHandle) -> u32 {
    if view.is_null() {
        return 0;
    }
    let ran = unsafe { &(*view).view }.pump_ui();
    u32::try_from(ran).unwrap_or(u32::MAX)
}
