use std::ffi::c_void;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::time::Duration;

use crate::engine::LifecycleState;
use crate::engine::flags::GAMEVIEW_VIEW_FLAG_RENDER_ON_UI_THREAD;

use super::abi::gameview_abi_version;
use super::view::*;
use super::*;

const CONTEXT_LOST: i32 = 0x300E;

#[derive(Default)]
struct Host {
    next_handle: AtomicU64,
    live_contexts: AtomicU32,
    live_surfaces: AtomicU32,
    frames: AtomicU32,
    loads: AtomicU32,
    lose_next_swap: AtomicBool,
    context_sets: AtomicU32,
}

fn host(user_data: *mut c_void) -> &'static Host {
    unsafe { &*(user_data as *const Host) }
}

unsafe extern "C" fn create_context(
    user_data: *mut c_void,
    config: *const PixelConfig,
    error: *mut i32,
) -> u64 {
    let host = host(user_data);
    if unsafe { (*config).depth } > 16 {
        unsafe { *error = 0x3005 };
        return 0;
    }
    host.live_contexts.fetch_add(1, Ordering::SeqCst);
    host.next_handle.fetch_add(1, Ordering::SeqCst) + 1
}

unsafe extern "C" fn destroy_context(user_data: *mut c_void, _context: u64) -> i32 {
    host(user_data).live_contexts.fetch_sub(1, Ordering::SeqCst);
    0
}

unsafe extern "C" fn create_surface(
    user_data: *mut c_void,
    _context: u64,
    _width: u32,
    _height: u32,
    _error: *mut i32,
) -> u64 {
    let host = host(user_data);
    host.live_surfaces.fetch_add(1, Ordering::SeqCst);
    host.next_handle.fetch_add(1, Ordering::SeqCst) + 1
}

unsafe extern "C" fn destroy_surface(user_data: *mut c_void, _surface: u64) -> i32 {
    host(user_data).live_surfaces.fetch_sub(1, Ordering::SeqCst);
    0
}

unsafe extern "C" fn make_current(_user_data: *mut c_void, _context: u64, _surface: u64) -> i32 {
    0
}

unsafe extern "C" fn clear_current(_user_data: *mut c_void) -> i32 {
    0
}

unsafe extern "C" fn swap_buffers(user_data: *mut c_void, _surface: u64) -> i32 {
    let host = host(user_data);
    if host.lose_next_swap.swap(false, Ordering::SeqCst) {
        return CONTEXT_LOST;
    }
    host.frames.fetch_add(1, Ordering::SeqCst);
    0
}

unsafe extern "C" fn on_load(user_data: *mut c_void) {
    host(user_data).loads.fetch_add(1, Ordering::SeqCst);
}

unsafe extern "C" fn on_context_set(user_data: *mut c_void) {
    host(user_data).context_sets.fetch_add(1, Ordering::SeqCst);
}

unsafe extern "C" fn on_frame(_user_data: *mut c_void, elapsed: f64) -> i32 {
    if elapsed < 0.0 { 1 } else { 0 }
}

fn tables(host: &'static Host) -> (GameViewGraphicsApi, GameViewHooks) {
    let user_data = host as *const Host as *mut c_void;
    let api = GameViewGraphicsApi {
        user_data,
        context_lost_code: CONTEXT_LOST,
        create_context: Some(create_context),
        destroy_context: Some(destroy_context),
        create_surface: Some(create_surface),
        destroy_surface: Some(destroy_surface),
        make_current: Some(make_current),
        clear_current: Some(clear_current),
        swap_buffers: Some(swap_buffers),
    };
    let hooks = GameViewHooks {
        user_data,
        on_load: Some(on_load),
        on_unload: None,
        on_context_lost: None,
        on_context_set: Some(on_context_set),
        on_update_frame: Some(on_frame),
        on_render_frame: Some(on_frame),
    };
    (api, hooks)
}

fn wait_for(mut done: impl FnMut() -> bool) -> bool {
    for _ in 0..500 {
        if done() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    false
}

#[test]
fn abi_version_is_stable() {
    assert_eq!(gameview_abi_version(), GAMEVIEW_ABI_VERSION);
}

#[test]
fn create_rejects_null_and_incomplete_tables() {
    let host: &'static Host = Box::leak(Box::default());
    let (mut api, hooks) = tables(host);
    unsafe {
        assert!(gameview_view_create(std::ptr::null(), &hooks, 0, 24, 8).is_null());
        api.swap_buffers = None;
        assert!(gameview_view_create(&api, &hooks, 0, 24, 8).is_null());
        assert_eq!(gameview_view_run(std::ptr::null_mut(), 60.0), GAMEVIEW_STATUS_NULL_POINTER);
        assert_eq!(gameview_view_state(std::ptr::null_mut()), 0);
        gameview_view_destroy(std::ptr::null_mut());
    }
}

#[test]
fn worker_mode_session_over_c_abi() {
    let host: &'static Host = Box::leak(Box::default());
    let (api, hooks) = tables(host);

    unsafe {
        let view = gameview_view_create(&api, &hooks, 0, 24, 8);
        assert!(!view.is_null());

        gameview_view_surface_created(view, 640, 480);
        assert_eq!(gameview_view_run(view, 0.0), GAMEVIEW_STATUS_OK);
        assert_eq!(gameview_view_run(view, 0.0), GAMEVIEW_STATUS_ALREADY_RUNNING);
        assert!(wait_for(|| host.frames.load(Ordering::SeqCst) > 3));
        assert_eq!(gameview_view_state(view), LifecycleState::Running as u8);

        host.lose_next_swap.store(true, Ordering::SeqCst);
        assert!(wait_for(|| host.context_sets.load(Ordering::SeqCst) == 2));
        assert!(wait_for(|| gameview_view_state(view) == LifecycleState::Running as u8));

        assert_eq!(gameview_view_pause_blocking(view, 5_000), GAMEVIEW_STATUS_OK);
        assert_eq!(gameview_view_state(view), LifecycleState::Paused as u8);
        assert_eq!(host.live_surfaces.load(Ordering::SeqCst), 0);

        gameview_view_resume(view);
        assert_eq!(gameview_view_pause_resume_balance(view), 0);
        assert!(wait_for(|| gameview_view_state(view) == LifecycleState::Running as u8));

        assert_eq!(gameview_view_stop(view), GAMEVIEW_STATUS_OK);
        assert_eq!(gameview_view_stop(view), GAMEVIEW_STATUS_NOT_RUNNING);
        assert_eq!(gameview_view_state(view), LifecycleState::Exited as u8);
        assert_eq!(host.live_contexts.load(Ordering::SeqCst), 0);
        assert_eq!(host.loads.load(Ordering::SeqCst), 2);

        gameview_view_destroy(view);
    }
}

#[test]
fn ui_thread_mode_runs_frames_in_pump() {
    let host: &'static Host = Box::leak(Box::default());
    let (api, hooks) = tables(host);

    unsafe {
        let view = gameview_view_create(&api, &hooks, GAMEVIEW_VIEW_FLAG_RENDER_ON_UI_THREAD, 16, 0);
        assert!(!view.is_null());
        gameview_view_surface_created(view, 320, 240);
        assert_eq!(gameview_view_run(view, 0.0), GAMEVIEW_STATUS_OK);

        let mut pumped = 0;
        assert!(wait_for(|| {
            pumped += gameview_view_pump(view);
            pumped >= 3
        }));
        assert!(host.frames.load(Ordering::SeqCst) >= 3);

        assert_eq!(gameview_view_stop(view), GAMEVIEW_STATUS_OK);
        gameview_view_destroy(view);
        assert_eq!(host.live_contexts.load(Ordering::SeqCst), 0);
    }
}

#[test]
fn degenerate_update_rates_do_not_unwind_across_the_abi() {
    let host: &'static Host = Box::leak(Box::default());
    let (api, hooks) = tables(host);

    unsafe {
        let view = gameview_view_create(&api, &hooks, 0, 16, 0);
        assert!(!view.is_null());
        gameview_view_surface_created(view, 64, 64);

        for rate in [1e-20, f64::MIN_POSITIVE, f64::INFINITY, -30.0] {
            assert_eq!(gameview_view_run(view, rate), GAMEVIEW_STATUS_OK);
            assert!(wait_for(|| gameview_view_state(view) == LifecycleState::Running as u8));
            assert_eq!(gameview_view_stop(view), GAMEVIEW_STATUS_OK);
        }
        gameview_view_destroy(view);
    }
}
