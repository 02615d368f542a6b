//! FFI Bridge Layer: Rust Rail Core <-> Unreal Engine 5
//!
//! This module exposes C-ABI functions that UE5 can call via DLL loading.
//! Engines are opaque handles created by `rail_engine_create` and released with
//! `rail_engine_destroy`. Data is serialized as JSON across the boundary.
//! All functions returning `*mut c_char` hand out heap-allocated strings;
//! caller must free with `free_string`.

use bevy::math::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use crate::config::RailConfig;
use crate::engine::{EngineConfig, RailEngine, ShotResultMsg};
use crate::input::{InputResponse, InputValue, TriggerEvent};
use crate::logging;

/// Returned by `rail_engine_move_lane` for a null handle
pub const INVALID_LANE: i32 = i32::MIN;

// ========================
// Data transfer types
// ========================

/// Result of a routed action
#[derive(Debug, Serialize, Deserialize)]
pub struct InputResponseMsg {
    pub response: String,
    pub lane: Option<i32>,
    pub shot: Option<ShotResultMsg>,
}

impl From<InputResponse> for InputResponseMsg {
    fn from(response: InputResponse) -> Self {
        let (name, lane, shot) = match response {
            InputResponse::Unbound => ("unbound", None, None),
            InputResponse::Ignored => ("ignored", None, None),
            InputResponse::Looked => ("looked", None, None),
            InputResponse::LaneChanged(lane) => ("lane_changed", Some(lane.get()), None),
            InputResponse::Fired(shot) => ("fired", None, Some(ShotResultMsg::from(&shot))),
        };
        Self {
            response: name.to_string(),
            lane,
            shot,
        }
    }
}

/// Config validation result
#[derive(Debug, Serialize, Deserialize)]
pub struct ValidationMsg {
    pub valid: bool,
    pub error: Option<String>,
}

// ========================
// Helpers
// ========================

fn json_to_cstring<T: Serialize>(value: &T) -> *mut c_char {
    match serde_json::to_string(value) {
        Ok(json) => CString::new(json).unwrap_or_default().into_raw(),
        Err(_) => std::ptr::null_mut(),
    }
}

fn parse_cstr(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_owned()) }
}

/// Borrow the engine behind a handle; `None` for null
fn engine_mut<'a>(handle: *mut RailEngine) -> Option<&'a mut RailEngine> {
    unsafe { handle.as_mut() }
}

// ========================
// C-ABI: Core
// ========================

/// Version string
#[no_mangle]
pub extern "C" fn get_version() -> *mut c_char {
    CString::new(env!("CARGO_PKG_VERSION"))
        .unwrap_or_default()
        .into_raw()
}

/// Free a string allocated by Rust.
/// Called from C/UE5: ptr must be from a prior Rust FFI allocation or null.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        unsafe {
            drop(CString::from_raw(ptr));
        }
    }
}

/// Initialize logging (0=Trace, 1=Debug, 2=Info, 3=Warn, 4=Error). First call wins.
#[no_mangle]
pub extern "C" fn rail_init_logging(level_id: u32) {
    let level = logging::LogLevel::from_id(level_id);
    logging::init_tracing(&logging::TracingConfig::with_level(level));
}

// ========================
// C-ABI: Engine lifecycle
// ========================

/// Create an engine from an `EngineConfig` JSON; null config uses defaults.
/// Returns null when the config does not parse or validate.
#[no_mangle]
pub extern "C" fn rail_engine_create(config_json: *const c_char) -> *mut RailEngine {
    let config = match parse_cstr(config_json) {
        Some(json) => match EngineConfig::from_json(&json) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(target: "rail_core::bridge", "rail_engine_create: {e}");
                return std::ptr::null_mut();
            }
        },
        None => EngineConfig::default(),
    };

    match RailEngine::new(config) {
        Ok(engine) => Box::into_raw(Box::new(engine)),
        Err(e) => {
            tracing::warn!(target: "rail_core::bridge", "rail_engine_create: {e}");
            std::ptr::null_mut()
        }
    }
}

/// Destroy an engine created by `rail_engine_create`. Null is a no-op.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn rail_engine_destroy(handle: *mut RailEngine) {
    if !handle.is_null() {
        unsafe {
            drop(Box::from_raw(handle));
        }
    }
}

// ========================
// C-ABI: Frame + input
// ========================

/// Advance one frame. Returns 1 if the scene was reloaded, 0 if not, -1 for null.
#[no_mangle]
pub extern "C" fn rail_engine_tick(handle: *mut RailEngine, delta_time: f32) -> i32 {
    match engine_mut(handle) {
        Some(engine) => i32::from(engine.tick(delta_time).reload_requested),
        None => -1,
    }
}

/// Step lanes by the rounded input; returns the new lane or `INVALID_LANE`
#[no_mangle]
pub extern "C" fn rail_engine_move_lane(handle: *mut RailEngine, input: f32) -> i32 {
    match engine_mut(handle) {
        Some(engine) => engine.move_lane(input).get(),
        None => INVALID_LANE,
    }
}

/// Add yaw/pitch look input (degrees)
#[no_mangle]
pub extern "C" fn rail_engine_look(handle: *mut RailEngine, yaw: f32, pitch: f32) {
    if let Some(engine) = engine_mut(handle) {
        engine.handle_input(crate::input::InputEvent::Look(Vec2::new(yaw, pitch)));
    }
}

/// Fire the weapon; returns the shot as JSON
#[no_mangle]
pub extern "C" fn rail_engine_fire(handle: *mut RailEngine) -> *mut c_char {
    let Some(engine) = engine_mut(handle) else {
        return std::ptr::null_mut();
    };
    match engine.fire() {
        Some(shot) => json_to_cstring(&ShotResultMsg::from(&shot)),
        None => std::ptr::null_mut(),
    }
}

/// Route a named host action (trigger: 0=Started, 1=Triggered, 2=Completed).
/// The value is passed as a 2D axis and coerced per binding.
#[no_mangle]
pub extern "C" fn rail_engine_dispatch_action(
    handle: *mut RailEngine,
    action: *const c_char,
    trigger_id: u32,
    x: f32,
    y: f32,
) -> *mut c_char {
    let Some(engine) = engine_mut(handle) else {
        return std::ptr::null_mut();
    };
    let Some(action) = parse_cstr(action) else {
        return std::ptr::null_mut();
    };

    let response = TriggerEvent::from_id(trigger_id)
        .and_then(|trigger| {
            engine.dispatch_action(&action, trigger, InputValue::Axis2D(Vec2::new(x, y)))
        })
        .unwrap_or(InputResponse::Unbound);
    json_to_cstring(&InputResponseMsg::from(response))
}

// ========================
// C-ABI: State + world
// ========================

/// Current session state as JSON
#[no_mangle]
pub extern "C" fn rail_engine_state(handle: *mut RailEngine) -> *mut c_char {
    match engine_mut(handle) {
        Some(engine) => json_to_cstring(&engine.snapshot()),
        None => std::ptr::null_mut(),
    }
}

/// Add a blocking target box; returns its entity id, 0 for null
#[no_mangle]
#[allow(clippy::too_many_arguments)]
pub extern "C" fn rail_engine_add_target(
    handle: *mut RailEngine,
    min_x: f32,
    min_y: f32,
    min_z: f32,
    max_x: f32,
    max_y: f32,
    max_z: f32,
) -> u64 {
    match engine_mut(handle) {
        Some(engine) => {
            let min = Vec3::new(min_x, min_y, min_z);
            let max = Vec3::new(max_x, max_y, max_z);
            engine.world_mut().add_box(min, max).0
        }
        None => 0,
    }
}

/// Validate a `RailConfig` JSON
#[no_mangle]
pub extern "C" fn validate_rail_config(config_json: *const c_char) -> *mut c_char {
    let result = match parse_cstr(config_json) {
        Some(json) => RailConfig::from_json(&json).map(|_| ()),
        None => {
            return json_to_cstring(&ValidationMsg {
                valid: false,
                error: Some("null config".into()),
            })
        }
    };
    json_to_cstring(&ValidationMsg {
        valid: result.is_ok(),
        error: result.err().map(|e| e.to_string()),
    })
}
