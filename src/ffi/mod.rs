//! ### English
//! C ABI surface for `gameview`.
//!
//! All exported symbols are `extern "C"` functions; structs are `#[repr(C)]`.
//! The host supplies its graphics binding and application hooks as function tables carrying an
//! opaque `user_data` pointer; those functions are called from the render worker (and, in
//! render-on-UI-thread mode, from the thread calling `gameview_view_pump`).
//!
//! ### 中文
//! `gameview` 的 C ABI 接口层。
//!
//! 所有导出符号均为 `extern "C"` 函数；结构体使用 `#[repr(C)]`。
//! 宿主以携带不透明 `user_data` 指针的函数表形式提供图形绑定与应用钩子；这些函数会在渲染工作线程上
//! 调用（UI 线程渲染模式下，则在调用 `gameview_view_pump` 的线程上调用）。
mod abi;
mod binding;
mod hooks;
mod view;

use std::ffi::c_void;

use crate::engine::{GameView, LifecycleError, PixelConfig};

#[repr(C)]
/// ### English
/// Opaque view handle.
///
/// ### 中文
/// 不透明 view 句柄。
pub struct GameViewHandle {
    view: GameView,
}

/// ### English
/// Host graphics binding as a function table.
///
/// Create functions return a non-zero handle on success, or `0` and write the platform error code
/// to `*error`. The other functions return `0` on success or the platform error code. A code equal
/// to `context_lost_code` is reported as context loss.
///
/// ### 中文
/// 以函数表形式提供的宿主图形绑定。
///
/// 创建类函数成功时返回非零句柄；失败时返回 `0` 并把平台错误码写入 `*error`。
/// 其余函数成功返回 `0`，失败返回平台错误码。等于 `context_lost_code` 的错误码视为上下文丢失。
#[repr(C)]
#[derive(Clone, Copy)]
pub struct GameViewGraphicsApi {
    pub user_data: *mut c_void,
    pub context_lost_code: i32,
    pub create_context: Option<
        unsafe extern "C" fn(user_data: *mut c_void, config: *const PixelConfig, error: *mut i32) -> u64,
    >,
    pub destroy_context: Option<unsafe extern "C" fn(user_data: *mut c_void, context: u64) -> i32>,
    pub create_surface: Option<
        unsafe extern "C" fn(
            user_data: *mut c_void,
            context: u64,
            width: u32,
            height: u32,
            error: *mut i32,
        ) -> u64,
    >,
    pub destroy_surface: Option<unsafe extern "C" fn(user_data: *mut c_void, surface: u64) -> i32>,
    pub make_current:
        Option<unsafe extern "C" fn(user_data: *mut c_void, context: u64, surface: u64) -> i32>,
    pub clear_current: Option<unsafe extern "C" fn(user_data: *mut c_void) -> i32>,
    pub swap_buffers: Option<unsafe extern "C" fn(user_data: *mut c_void, surface: u64) -> i32>,
}

/// ### English
/// Application hooks as a function table. Every entry is optional.
///
/// Frame functions receive the elapsed time in seconds and return `0` on success; any other
/// value skips the rest of the frame.
///
/// ### 中文
/// 以函数表形式提供的应用钩子。所有条目均可为空。
///
/// 帧函数接收以秒为单位的耗时，成功时返回 `0`；其他返回值会跳过该帧剩余部分。
#[repr(C)]
#[derive(Clone, Copy)]
pub struct GameViewHooks {
    pub user_data: *mut c_void,
    pub on_load: Option<unsafe extern "C" fn(user_data: *mut c_void)>,
    pub on_unload: Option<unsafe extern "C" fn(user_data: *mut c_void)>,
    pub on_context_lost: Option<unsafe extern "C" fn(user_data: *mut c_void)>,
    pub on_context_set: Option<unsafe extern "C" fn(user_data: *mut c_void)>,
    pub on_update_frame: Option<unsafe extern "C" fn(user_data: *mut c_void, elapsed: f64) -> i32>,
    pub on_render_frame: Option<unsafe extern "C" fn(user_data: *mut c_void, elapsed: f64) -> i32>,
}

/// ### English
/// C ABI version for `gameview`.
///
/// ### 中文
/// `gameview` 的 C ABI 版本号。
const GAMEVIEW_ABI_VERSION: u32 = 1;

pub const GAMEVIEW_STATUS_OK: i32 = 0;
pub const GAMEVIEW_STATUS_NULL_POINTER: i32 = 1;
pub const GAMEVIEW_STATUS_ALREADY_RUNNING: i32 = 2;
pub const GAMEVIEW_STATUS_NOT_RUNNING: i32 = 3;
pub const GAMEVIEW_STATUS_TIMEOUT: i32 = 4;
pub const GAMEVIEW_STATUS_SPAWN_FAILED: i32 = 5;
pub const GAMEVIEW_STATUS_ERROR: i32 = -1;

/// ### English
/// Maps a control-API result to a C status code.
///
/// ### 中文
/// 将控制 API 的结果映射为 C 状态码。
fn status(result: Result<(), LifecycleError>) -> i32 {
    match result {
        Ok(()) => GAMEVIEW_STATUS_OK,
        Err(LifecycleError::AlreadyRunning) => GAMEVIEW_STATUS_ALREADY_RUNNING,
        Err(LifecycleError::NotRunning) => GAMEVIEW_STATUS_NOT_RUNNING,
        Err(LifecycleError::Timeout) => GAMEVIEW_STATUS_TIMEOUT,
        Err(LifecycleError::WorkerSpawn(_)) => GAMEVIEW_STATUS_SPAWN_FAILED,
        Err(err) => {
            log::debug!("control call failed: {err}");
            GAMEVIEW_STATUS_ERROR
        }
    }
}

#[cfg(test)]
mod tests;
