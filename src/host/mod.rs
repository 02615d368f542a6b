//! Collaborator contracts the controller consumes.
//!
//! The host engine (UE5 through the bridge, the headless world in tests and the
//! demo) provides these. World axes follow the host: X forward, Y lateral, Z up.

use bevy::math::Vec3;
use serde::{Deserialize, Serialize};

use crate::telemetry::Telemetry;

/// Opaque identity of a world entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "entity#{}", self.0)
    }
}

/// First blocking hit of a line trace
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub point: Vec3,
    pub entity: EntityId,
}

/// Actor transform of the controlled entity
pub trait TransformService {
    fn entity(&self) -> EntityId;
    fn position(&self) -> Vec3;
    fn set_position(&mut self, position: Vec3);
    fn forward(&self) -> Vec3;
}

/// Character movement component; resolves speed and acceleration
pub trait MovementService {
    fn add_movement_input(&mut self, direction: Vec3, scale: f32);
    fn set_max_speed(&mut self, speed: f32);
}

/// Line traces against world geometry
pub trait CollisionQuery {
    /// Trace the segment `origin..end`, ignoring `excluding`
    fn raycast(&self, origin: Vec3, end: Vec3, excluding: EntityId) -> Option<RayHit>;
}

/// Follow camera and its control rotation
pub trait CameraService {
    fn camera_position(&self) -> Vec3;
    fn camera_forward(&self) -> Vec3;
    fn add_yaw(&mut self, delta: f32);
    fn add_pitch(&mut self, delta: f32);
}

/// Level management
pub trait LevelService {
    fn current_scene(&self) -> String;
    fn reload_scene(&mut self, scene_id: &str);
}

/// Everything a rail controller needs from its host
pub trait RailHost:
    TransformService + MovementService + CollisionQuery + CameraService + LevelService + Telemetry
{
}

impl<T> RailHost for T where
    T: TransformService + MovementService + CollisionQuery + CameraService + LevelService + Telemetry
{
}
