//! Centralized tuning constants for the rail shooter core.
//!
//! Defaults for `RailConfig` live here so the FFI bridge, the headless host and
//! the controller agree on the same numbers.

// =====================================================
// Lanes
// =====================================================

/// Leftmost lane index
pub const LANE_MIN: i32 = -1;

/// Rightmost lane index
pub const LANE_MAX: i32 = 1;

/// Default distance between adjacent lanes (world units)
pub const DEFAULT_LANE_WIDTH: f32 = 300.0;

/// Rate constant for the lateral FInterpTo toward the lane offset
pub const LANE_INTERP_SPEED: f32 = 10.0;

/// Squared distance under which interpolation snaps to its target
pub const INTERP_SNAP_SQ: f32 = 1.0e-8;

// =====================================================
// Movement
// =====================================================

/// Default forward run speed (max walk speed handed to the movement service)
pub const DEFAULT_RUN_SPEED: f32 = 500.0;

/// Forward movement effort applied every tick
pub const FORWARD_EFFORT: f32 = 1.0;

/// Below this height the pawn has fallen out of the world
pub const KILL_Z: f32 = -1000.0;

/// Gravity acceleration (world units / s^2, Z up)
pub const GRAVITY_Z: f32 = -980.0;

// =====================================================
// Hit-scan
// =====================================================

/// Length of the aim trace cast from the camera
pub const CAMERA_TRACE_RANGE: f32 = 10_000.0;

/// Length of the weapon trace cast from the muzzle
pub const WEAPON_TRACE_RANGE: f32 = 5_000.0;

/// Muzzle height above the pawn origin (stand-in for a muzzle socket)
pub const MUZZLE_HEIGHT: f32 = 40.0;

/// Squared length under which a direction cannot be normalized
pub const SAFE_NORMAL_EPS_SQ: f32 = 1.0e-8;

// =====================================================
// Course
// =====================================================

/// Upper bound on generated target rows
pub const MAX_COURSE_ROWS: u32 = 10_000;

// =====================================================
// Scene
// =====================================================

/// Default scene (level) name
pub const DEFAULT_SCENE: &str = "ThirdPersonMap";

/// Default pawn blueprint selected by the game mode
pub const DEFAULT_PAWN_CLASS_PATH: &str = "/Game/ThirdPerson/Blueprints/BP_ThirdPersonCharacter";
