//! Rail controller configuration.
//!
//! Loaded from JSON or RON (chosen by file extension) and validated before a
//! controller is built from it. Invalid tuning is rejected instead of producing
//! degenerate motion.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::constants::*;
use crate::error::{RailError, RailResult};

/// Core controller tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RailConfig {
    pub lane_width: f32,
    pub run_speed: f32,
    pub lane_interp_speed: f32,
    pub kill_z: f32,
    pub camera_trace_range: f32,
    pub weapon_trace_range: f32,
    pub muzzle_height: f32,
    pub movement: MovementTuning,
    pub camera: CameraRig,
    pub input: InputActions,
}

impl Default for RailConfig {
    fn default() -> Self {
        Self {
            lane_width: DEFAULT_LANE_WIDTH,
            run_speed: DEFAULT_RUN_SPEED,
            lane_interp_speed: LANE_INTERP_SPEED,
            kill_z: KILL_Z,
            camera_trace_range: CAMERA_TRACE_RANGE,
            weapon_trace_range: WEAPON_TRACE_RANGE,
            muzzle_height: MUZZLE_HEIGHT,
            movement: MovementTuning::default(),
            camera: CameraRig::default(),
            input: InputActions::default(),
        }
    }
}

/// Character movement settings handed to the movement service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementTuning {
    pub air_control: f32,
    pub min_analog_walk_speed: f32,
    pub max_acceleration: f32,
    pub braking_deceleration_walking: f32,
    pub braking_deceleration_falling: f32,
    pub gravity_scale: f32,
}

impl Default for MovementTuning {
    fn default() -> Self {
        Self {
            air_control: 0.35,
            min_analog_walk_speed: 20.0,
            max_acceleration: 2048.0,
            braking_deceleration_walking: 2000.0,
            braking_deceleration_falling: 1500.0,
            gravity_scale: 1.0,
        }
    }
}

/// Spring-arm camera following the pawn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraRig {
    pub arm_length: f32,
    pub pivot_height: f32,
    pub min_pitch_deg: f32,
    pub max_pitch_deg: f32,
}

impl Default for CameraRig {
    fn default() -> Self {
        Self {
            arm_length: 400.0,
            pivot_height: 60.0,
            min_pitch_deg: -89.0,
            max_pitch_deg: 89.0,
        }
    }
}

/// Input mapping context and action names. `None` leaves the action unbound.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputActions {
    pub mapping_context: Option<String>,
    pub look: Option<String>,
    pub fire: Option<String>,
    pub move_lane: Option<String>,
}

impl Default for InputActions {
    fn default() -> Self {
        Self {
            mapping_context: Some("IMC_Default".into()),
            look: Some("IA_Look".into()),
            fire: Some("IA_Fire".into()),
            move_lane: Some("IA_MoveLane".into()),
        }
    }
}

pub(crate) fn require_positive(field: &'static str, value: f32) -> RailResult<()> {
    if !value.is_finite() {
        return Err(RailError::InvalidConfig {
            field,
            value,
            reason: "must be finite",
        });
    }
    if value <= 0.0 {
        return Err(RailError::InvalidConfig {
            field,
            value,
            reason: "must be > 0",
        });
    }
    Ok(())
}

pub(crate) fn require_finite(field: &'static str, value: f32) -> RailResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(RailError::InvalidConfig {
            field,
            value,
            reason: "must be finite",
        })
    }
}

impl RailConfig {
    /// Check the construction invariants. The first violation wins.
    pub fn validate(&self) -> RailResult<()> {
        require_positive("lane_width", self.lane_width)?;
        require_positive("run_speed", self.run_speed)?;
        require_finite("lane_interp_speed", self.lane_interp_speed)?;
        if self.lane_interp_speed < 0.0 {
            return Err(RailError::InvalidConfig {
                field: "lane_interp_speed",
                value: self.lane_interp_speed,
                reason: "must be >= 0",
            });
        }
        require_finite("kill_z", self.kill_z)?;
        require_positive("camera_trace_range", self.camera_trace_range)?;
        require_positive("weapon_trace_range", self.weapon_trace_range)?;
        require_finite("muzzle_height", self.muzzle_height)?;
        require_positive("movement.max_acceleration", self.movement.max_acceleration)?;
        require_finite("movement.gravity_scale", self.movement.gravity_scale)?;
        require_positive("camera.arm_length", self.camera.arm_length)?;
        if self.camera.min_pitch_deg > self.camera.max_pitch_deg {
            return Err(RailError::InvalidConfig {
                field: "camera.min_pitch_deg",
                value: self.camera.min_pitch_deg,
                reason: "must not exceed max_pitch_deg",
            });
        }
        Ok(())
    }

    pub fn from_json(json: &str) -> RailResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_ron(text: &str) -> RailResult<Self> {
        let config: Self = ron::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Load and validate a `.json` or `.ron` config file
    pub fn load(path: impl AsRef<Path>) -> RailResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| RailError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&text),
            Some("ron") => Self::from_ron(&text),
            _ => Err(RailError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}
