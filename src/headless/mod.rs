//! Headless host world.
//!
//! Implements every host collaborator without an engine: a pawn with a simple
//! character movement model, a spring-arm follow camera, box colliders for the
//! rail floor and targets, and a level service that restores the scene on
//! reload. Used by the demo binary, the Bevy plugin, the FFI bridge and tests.

use bevy::math::Vec3;

use crate::config::{CameraRig, MovementTuning, RailConfig};
use crate::constants::{DEFAULT_SCENE, GRAVITY_Z};
use crate::course::Course;
use crate::host::*;
use crate::telemetry::{ShotEvent, ShotLog, Telemetry};

pub const PAWN_ID: EntityId = EntityId(1);
pub const FLOOR_ID: EntityId = EntityId(2);
const FIRST_TARGET_ID: u64 = 100;

/// Floor slab thickness below z = 0
const FLOOR_DEPTH: f32 = 50.0;
/// Half width of the floor slab across the lanes
const FLOOR_HALF_WIDTH: f32 = 2_000.0;

// =====================================================
// Geometry
// =====================================================

/// Axis-aligned box collider
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxCollider {
    pub entity: EntityId,
    pub min: Vec3,
    pub max: Vec3,
}

/// Parametric `t` in `[0, 1]` where segment `p0..p1` first enters the box
pub fn segment_aabb_enter_t(p0: Vec3, p1: Vec3, min: Vec3, max: Vec3) -> Option<f32> {
    let d = p1 - p0;
    let mut tmin = 0.0f32;
    let mut tmax = 1.0f32;
    for i in 0..3 {
        let s = p0[i];
        let dir = d[i];
        if dir.abs() < 1e-6 {
            if s < min[i] || s > max[i] {
                return None;
            }
        } else {
            let inv = 1.0 / dir;
            let mut t0 = (min[i] - s) * inv;
            let mut t1 = (max[i] - s) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            tmin = tmin.max(t0);
            tmax = tmax.min(t1);
            if tmin > tmax {
                return None;
            }
        }
    }
    Some(tmin)
}

// =====================================================
// Pawn + camera
// =====================================================

#[derive(Debug, Clone)]
pub struct Pawn {
    pub position: Vec3,
    pub velocity: Vec3,
    pub forward: Vec3,
    pub max_speed: f32,
    pub grounded: bool,
    pending_input: Vec3,
}

impl Pawn {
    fn spawn(at: Vec3) -> Self {
        Self {
            position: at,
            velocity: Vec3::ZERO,
            forward: Vec3::X,
            max_speed: 0.0,
            grounded: true,
            pending_input: Vec3::ZERO,
        }
    }
}

/// Spring-arm camera driven by yaw/pitch accumulators (degrees)
#[derive(Debug, Clone)]
pub struct FollowCamera {
    pub yaw: f32,
    pub pitch: f32,
    pub rig: CameraRig,
}

impl FollowCamera {
    pub fn forward(&self) -> Vec3 {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        Vec3::new(pitch.cos() * yaw.cos(), pitch.cos() * yaw.sin(), pitch.sin())
    }

    pub fn position(&self, target: Vec3) -> Vec3 {
        target + Vec3::Z * self.rig.pivot_height - self.forward() * self.rig.arm_length
    }
}

// =====================================================
// World
// =====================================================

#[derive(Debug, Clone)]
pub struct HeadlessWorld {
    pub scene: String,
    pub spawn_point: Vec3,
    pub pawn: Pawn,
    pub camera: FollowCamera,
    pub movement: MovementTuning,
    pub course: Course,
    pub colliders: Vec<BoxCollider>,
    pub shots: ShotLog,
    pub debug_lines: u64,
    /// Every reload ever requested, in order
    pub reload_requests: Vec<String>,
    pending_reload: Option<String>,
    next_entity: u64,
}

impl HeadlessWorld {
    pub fn new(config: &RailConfig, course: Course) -> Self {
        let mut world = Self {
            scene: DEFAULT_SCENE.to_string(),
            spawn_point: Vec3::ZERO,
            pawn: Pawn::spawn(Vec3::ZERO),
            camera: FollowCamera {
                yaw: 0.0,
                pitch: 0.0,
                rig: config.camera.clone(),
            },
            movement: config.movement.clone(),
            course,
            colliders: Vec::new(),
            shots: ShotLog::default(),
            debug_lines: 0,
            reload_requests: Vec::new(),
            pending_reload: None,
            next_entity: FIRST_TARGET_ID,
        };
        world.build_scene();
        world
    }

    /// Empty rail floor of the given length
    pub fn flat(config: &RailConfig, floor_length: f32) -> Self {
        Self::new(config, Course::empty(floor_length))
    }

    pub fn with_scene(mut self, scene: impl Into<String>) -> Self {
        self.scene = scene.into();
        self
    }

    fn build_scene(&mut self) {
        self.colliders.clear();
        self.next_entity = FIRST_TARGET_ID;
        self.colliders.push(BoxCollider {
            entity: FLOOR_ID,
            min: Vec3::new(0.0, -FLOOR_HALF_WIDTH, -FLOOR_DEPTH),
            max: Vec3::new(self.course.floor_length, FLOOR_HALF_WIDTH, 0.0),
        });
        let targets = self.course.targets.clone();
        for t in targets {
            self.add_box(Vec3::from_array(t.min), Vec3::from_array(t.max));
        }
    }

    /// Add a blocking box; returns its entity id
    pub fn add_box(&mut self, min: Vec3, max: Vec3) -> EntityId {
        let entity = EntityId(self.next_entity);
        self.next_entity += 1;
        self.colliders.push(BoxCollider {
            entity,
            min: min.min(max),
            max: min.max(max),
        });
        entity
    }

    pub fn target_count(&self) -> usize {
        self.colliders.iter().filter(|c| c.entity != FLOOR_ID).count()
    }

    fn on_floor(&self, p: Vec3) -> bool {
        p.x >= 0.0 && p.x <= self.course.floor_length && p.y.abs() <= FLOOR_HALF_WIDTH
    }

    /// Integrate the character movement queued this frame
    pub fn step(&mut self, delta_time: f32) {
        if !delta_time.is_finite() || delta_time <= 0.0 {
            self.pawn.pending_input = Vec3::ZERO;
            return;
        }
        let grounded = self.pawn.position.z <= 0.0 && self.on_floor(self.pawn.position);
        let tuning = &self.movement;
        let pawn = &mut self.pawn;

        let input = pawn.pending_input.clamp_length_max(1.0);
        pawn.pending_input = Vec3::ZERO;
        pawn.grounded = grounded;

        let mut horizontal = Vec3::new(pawn.velocity.x, pawn.velocity.y, 0.0);
        let control = if grounded { 1.0 } else { tuning.air_control };
        let magnitude = input.length();
        if magnitude > 0.0 {
            let speed_cap = (pawn.max_speed * magnitude).max(tuning.min_analog_walk_speed);
            horizontal += input * tuning.max_acceleration * control * delta_time;
            horizontal = horizontal.clamp_length_max(speed_cap);
        } else {
            let braking = if grounded {
                tuning.braking_deceleration_walking
            } else {
                tuning.braking_deceleration_falling
            };
            let speed = horizontal.length();
            let reduced = (speed - braking * delta_time).max(0.0);
            horizontal = if speed > 0.0 {
                horizontal * (reduced / speed)
            } else {
                Vec3::ZERO
            };
        }

        let mut vz = pawn.velocity.z;
        if !grounded {
            vz += GRAVITY_Z * tuning.gravity_scale * delta_time;
        }
        pawn.velocity = Vec3::new(horizontal.x, horizontal.y, vz);
        pawn.position += pawn.velocity * delta_time;

        if pawn.position.z < 0.0 && grounded {
            pawn.position.z = 0.0;
            pawn.velocity.z = 0.0;
        }
    }

    /// Take a reload request raised since the last call
    pub fn take_reload_request(&mut self) -> Option<String> {
        self.pending_reload.take()
    }

    /// Reset the scene to its spawned state
    pub fn restore_scene(&mut self) {
        self.pawn = Pawn::spawn(self.spawn_point);
        self.camera.yaw = 0.0;
        self.camera.pitch = 0.0;
        self.shots = ShotLog::default();
        self.debug_lines = 0;
        self.build_scene();
        tracing::info!(target: "rail_core::headless", scene = %self.scene, "Scene restored");
    }
}

impl TransformService for HeadlessWorld {
    fn entity(&self) -> EntityId {
        PAWN_ID
    }

    fn position(&self) -> Vec3 {
        self.pawn.position
    }

    fn set_position(&mut self, position: Vec3) {
        self.pawn.position = position;
    }

    fn forward(&self) -> Vec3 {
        self.pawn.forward
    }
}

impl MovementService for HeadlessWorld {
    fn add_movement_input(&mut self, direction: Vec3, scale: f32) {
        self.pawn.pending_input += direction * scale;
    }

    fn set_max_speed(&mut self, speed: f32) {
        self.pawn.max_speed = speed;
    }
}

impl CollisionQuery for HeadlessWorld {
    fn raycast(&self, origin: Vec3, end: Vec3, excluding: EntityId) -> Option<RayHit> {
        self.colliders
            .iter()
            .filter(|c| c.entity != excluding)
            .filter_map(|c| segment_aabb_enter_t(origin, end, c.min, c.max).map(|t| (t, c.entity)))
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(t, entity)| RayHit {
                point: origin + (end - origin) * t,
                entity,
            })
    }
}

impl CameraService for HeadlessWorld {
    fn camera_position(&self) -> Vec3 {
        self.camera.position(self.pawn.position)
    }

    fn camera_forward(&self) -> Vec3 {
        self.camera.forward()
    }

    fn add_yaw(&mut self, delta: f32) {
        self.camera.yaw = (self.camera.yaw + delta).rem_euclid(360.0);
    }

    fn add_pitch(&mut self, delta: f32) {
        self.camera.pitch = (self.camera.pitch + delta)
            .clamp(self.camera.rig.min_pitch_deg, self.camera.rig.max_pitch_deg);
    }
}

impl LevelService for HeadlessWorld {
    fn current_scene(&self) -> String {
        self.scene.clone()
    }

    fn reload_scene(&mut self, scene_id: &str) {
        self.reload_requests.push(scene_id.to_string());
        self.pending_reload = Some(scene_id.to_string());
    }
}

impl Telemetry for HeadlessWorld {
    fn shot_hit(&mut self, event: &ShotEvent) {
        tracing::info!(
            target: "rail_core::combat",
            target_id = event.target.0,
            x = event.point.x,
            y = event.point.y,
            z = event.point.z,
            tick = event.at.tick,
            "Hit: {}",
            event.target
        );
        self.shots.record(*event);
    }

    fn debug_line(&mut self, from: Vec3, to: Vec3) {
        self.debug_lines += 1;
        tracing::trace!(target: "rail_core::combat", ?from, ?to, "shot trace");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> HeadlessWorld {
        let mut w = HeadlessWorld::flat(&RailConfig::default(), 10_000.0);
        w.set_max_speed(500.0);
        w
    }

    #[test]
    fn test_segment_aabb() {
        let min = Vec3::new(10.0, -1.0, -1.0);
        let max = Vec3::new(12.0, 1.0, 1.0);
        let t = segment_aabb_enter_t(Vec3::ZERO, Vec3::new(20.0, 0.0, 0.0), min, max).unwrap();
        assert!((t - 0.5).abs() < 1e-6);
        assert!(segment_aabb_enter_t(Vec3::ZERO, Vec3::new(5.0, 0.0, 0.0), min, max).is_none());
        assert!(segment_aabb_enter_t(Vec3::new(0.0, 5.0, 0.0), Vec3::new(20.0, 5.0, 0.0), min, max).is_none());
    }

    #[test]
    fn test_raycast_picks_nearest_and_excludes() {
        let mut w = world();
        let near = w.add_box(Vec3::new(500.0, -50.0, 0.0), Vec3::new(560.0, 50.0, 200.0));
        let far = w.add_box(Vec3::new(900.0, -50.0, 0.0), Vec3::new(960.0, 50.0, 200.0));
        let origin = Vec3::new(0.0, 0.0, 100.0);
        let end = Vec3::new(2000.0, 0.0, 100.0);

        let hit = w.raycast(origin, end, PAWN_ID).unwrap();
        assert_eq!(hit.entity, near);
        assert!((hit.point.x - 500.0).abs() < 1e-2);

        let hit = w.raycast(origin, end, near).unwrap();
        assert_eq!(hit.entity, far);
    }

    #[test]
    fn test_floor_is_traceable() {
        let w = world();
        let hit = w
            .raycast(Vec3::new(100.0, 0.0, 100.0), Vec3::new(100.0, 0.0, -100.0), PAWN_ID)
            .unwrap();
        assert_eq!(hit.entity, FLOOR_ID);
        assert!(hit.point.z.abs() < 1e-3);
    }

    #[test]
    fn test_pawn_accelerates_to_run_speed() {
        let mut w = world();
        for _ in 0..120 {
            w.add_movement_input(Vec3::X, 1.0);
            w.step(1.0 / 60.0);
        }
        assert!((w.pawn.velocity.x - 500.0).abs() < 1e-2);
        assert_eq!(w.pawn.position.z, 0.0);
        assert!(w.pawn.grounded);
    }

    #[test]
    fn test_pawn_brakes_without_input() {
        let mut w = world();
        w.pawn.velocity = Vec3::new(500.0, 0.0, 0.0);
        for _ in 0..60 {
            w.step(1.0 / 60.0);
        }
        assert_eq!(w.pawn.velocity.x, 0.0);
    }

    #[test]
    fn test_non_finite_step_is_inert() {
        let mut w = world();
        w.pawn.velocity = Vec3::new(500.0, 0.0, 0.0);
        for dt in [f32::NAN, f32::INFINITY] {
            w.add_movement_input(Vec3::X, 1.0);
            w.step(dt);
        }
        assert_eq!(w.pawn.position, Vec3::ZERO);
        assert_eq!(w.pawn.velocity, Vec3::new(500.0, 0.0, 0.0));
        assert_eq!(w.pawn.pending_input, Vec3::ZERO);
    }

    #[test]
    fn test_pawn_falls_off_the_end() {
        let mut w = world();
        w.pawn.position = Vec3::new(10_500.0, 0.0, 0.0);
        for _ in 0..30 {
            w.step(1.0 / 30.0);
        }
        assert!(!w.pawn.grounded);
        assert!(w.pawn.position.z < -100.0);
    }

    #[test]
    fn test_camera_boom_behind_pawn() {
        let w = world();
        let cam = w.camera_position();
        assert!((cam - Vec3::new(-400.0, 0.0, 60.0)).length() < 1e-3);
        assert!((w.camera_forward() - Vec3::X).length() < 1e-6);
    }

    #[test]
    fn test_camera_pitch_clamped_by_camera() {
        let mut w = world();
        w.add_pitch(500.0);
        assert_eq!(w.camera.pitch, 89.0);
        w.add_yaw(370.0);
        assert!((w.camera.yaw - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_reload_request_and_restore() {
        let mut w = world();
        let extra = w.add_box(Vec3::splat(10.0), Vec3::splat(20.0));
        w.pawn.position = Vec3::new(0.0, 0.0, -5000.0);
        w.reload_scene("ThirdPersonMap");
        assert_eq!(w.take_reload_request().as_deref(), Some("ThirdPersonMap"));
        assert_eq!(w.take_reload_request(), None);
        w.restore_scene();
        assert_eq!(w.pawn.position, Vec3::ZERO);
        assert!(w.colliders.iter().all(|c| c.entity != extra));
        assert_eq!(w.reload_requests.len(), 1);
    }
}
