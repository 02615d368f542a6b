use bevy::math::Vec3;
use serde::{Deserialize, Serialize};

use crate::combat::ShotOutcome;
use crate::host::RayHit;

// =====================================================
// Wire types shared by the FFI bridge and snapshots
// =====================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec3Msg {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl From<Vec3> for Vec3Msg {
    fn from(v: Vec3) -> Self {
        Self {
            x: v.x,
            y: v.y,
            z: v.z,
        }
    }
}

impl From<Vec3Msg> for Vec3 {
    fn from(v: Vec3Msg) -> Self {
        Vec3::new(v.x, v.y, v.z)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HitMsg {
    pub entity_id: u64,
    pub point: Vec3Msg,
}

impl From<RayHit> for HitMsg {
    fn from(hit: RayHit) -> Self {
        Self {
            entity_id: hit.entity.0,
            point: hit.point.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShotResultMsg {
    pub aim_point: Vec3Msg,
    pub aim_blocked: bool,
    pub muzzle: Vec3Msg,
    pub weapon_end: Vec3Msg,
    pub degenerate: bool,
    pub hit: Option<HitMsg>,
}

impl From<&ShotOutcome> for ShotResultMsg {
    fn from(shot: &ShotOutcome) -> Self {
        Self {
            aim_point: shot.aim_point.into(),
            aim_blocked: shot.aim_blocked,
            muzzle: shot.muzzle.into(),
            weapon_end: shot.weapon_end.into(),
            degenerate: shot.direction.is_none(),
            hit: shot.hit.map(HitMsg::from),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RailStateMsg {
    pub scene: String,
    pub pawn_class: String,
    pub lane: i32,
    pub position: Vec3Msg,
    pub velocity: Vec3Msg,
    pub camera_yaw: f32,
    pub camera_pitch: f32,
    pub tick: u64,
    pub elapsed_seconds: f64,
    pub reload_count: u32,
    pub total_hits: u64,
    pub targets: usize,
}

