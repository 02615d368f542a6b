//! Rail movement: lane selection and lateral smoothing.

use bevy::math::Vec3;
use serde::{Deserialize, Serialize};

use crate::constants::{INTERP_SNAP_SQ, LANE_MAX, LANE_MIN};

/// Discrete lateral lane, always within `LANE_MIN..=LANE_MAX`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LaneIndex(i32);

impl LaneIndex {
    pub const LEFT: LaneIndex = LaneIndex(LANE_MIN);
    pub const CENTER: LaneIndex = LaneIndex(0);
    pub const RIGHT: LaneIndex = LaneIndex(LANE_MAX);

    /// Clamp any integer into the lane range
    pub fn new(index: i32) -> Self {
        Self(index.clamp(LANE_MIN, LANE_MAX))
    }

    pub fn get(self) -> i32 {
        self.0
    }

    /// Step by `delta` lanes; saturates at the outer lanes
    pub fn shifted(self, delta: i32) -> Self {
        Self::new(self.0.saturating_add(delta))
    }

    /// Step by a rounded analog input. `None` for non-finite input.
    pub fn shifted_by_input(self, input: f32) -> Option<Self> {
        if !input.is_finite() {
            return None;
        }
        // `as` saturates for values outside i32
        Some(self.shifted(input.round() as i32))
    }

    /// Lateral offset of this lane's center
    pub fn offset(self, lane_width: f32) -> f32 {
        self.0 as f32 * lane_width
    }
}

/// Frame-rate independent smoothing toward `target` (FInterpTo).
///
/// Moves `clamp(dt * speed, 0, 1)` of the remaining distance, so it never
/// overshoots. A non-positive speed snaps to the target; a NaN step holds.
pub fn interp_to(current: f32, target: f32, delta_time: f32, speed: f32) -> f32 {
    if speed <= 0.0 {
        return target;
    }
    let dist = target - current;
    if dist * dist < INTERP_SNAP_SQ {
        return target;
    }
    let alpha = delta_time * speed;
    if alpha.is_nan() {
        return current;
    }
    let alpha = alpha.clamp(0.0, 1.0);
    if alpha >= 1.0 {
        return target;
    }
    current + dist * alpha
}

/// Position after one tick of lateral (Y) smoothing toward `lane`
pub fn step_lateral(position: Vec3, lane: LaneIndex, lane_width: f32, delta_time: f32, speed: f32) -> Vec3 {
    let target_y = lane.offset(lane_width);
    Vec3::new(
        position.x,
        interp_to(position.y, target_y, delta_time, speed),
        position.z,
    )
}

/// True once the pawn has dropped below the kill plane
pub fn fell_out_of_world(position: Vec3, kill_z: f32) -> bool {
    position.z < kill_z
}
