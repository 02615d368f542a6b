//! Hit-scan weapon.
//!
//! A shot is two line traces: the camera trace decides what the player is
//! aiming at, the weapon trace from the muzzle decides what actually gets hit.
//! Anything between the muzzle and the aim point blocks the shot.

use bevy::math::Vec3;
use serde::{Deserialize, Serialize};

use crate::config::RailConfig;
use crate::constants::*;
use crate::host::{CameraService, CollisionQuery, EntityId, RayHit, TransformService};
use crate::telemetry::{ShotEvent, SimTime, Telemetry};

/// Trace lengths and muzzle placement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HitscanWeapon {
    pub camera_range: f32,
    pub weapon_range: f32,
    pub muzzle_height: f32,
}

impl Default for HitscanWeapon {
    fn default() -> Self {
        Self {
            camera_range: CAMERA_TRACE_RANGE,
            weapon_range: WEAPON_TRACE_RANGE,
            muzzle_height: MUZZLE_HEIGHT,
        }
    }
}

impl From<&RailConfig> for HitscanWeapon {
    fn from(config: &RailConfig) -> Self {
        Self {
            camera_range: config.camera_trace_range,
            weapon_range: config.weapon_trace_range,
            muzzle_height: config.muzzle_height,
        }
    }
}

impl HitscanWeapon {
    /// Muzzle origin for a pawn at `position`
    pub fn muzzle(&self, position: Vec3) -> Vec3 {
        // TODO: read the "Muzzle_01" socket once the host exposes attachment points
        position + Vec3::new(0.0, 0.0, self.muzzle_height)
    }
}

/// Everything resolved for one trigger pull
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShotOutcome {
    /// Where the camera trace says the player is aiming
    pub aim_point: Vec3,
    /// Whether the camera trace hit geometry (false: aim point is at max range)
    pub aim_blocked: bool,
    pub muzzle: Vec3,
    /// `None` when the aim point coincides with the muzzle
    pub direction: Option<Vec3>,
    /// End of the weapon trace (equals `muzzle` for a degenerate shot)
    pub weapon_end: Vec3,
    pub hit: Option<RayHit>,
}

impl ShotOutcome {
    pub fn target(&self) -> Option<EntityId> {
        self.hit.map(|h| h.entity)
    }
}

/// Normalize, or `None` for (near) zero-length vectors
pub fn safe_normal(v: Vec3) -> Option<Vec3> {
    let len_sq = v.length_squared();
    if !len_sq.is_finite() || len_sq <= SAFE_NORMAL_EPS_SQ {
        return None;
    }
    Some(v / len_sq.sqrt())
}

/// Resolve a dual-ray shot for `shooter` and report a hit through telemetry
pub fn fire<H>(host: &mut H, weapon: &HitscanWeapon, at: SimTime) -> ShotOutcome
where
    H: TransformService + CameraService + CollisionQuery + Telemetry,
{
    let shooter = host.entity();

    // What is the camera looking at
    let camera_start = host.camera_position();
    let camera_end = camera_start + host.camera_forward() * weapon.camera_range;
    let camera_hit = host.raycast(camera_start, camera_end, shooter);
    let aim_point = camera_hit.map_or(camera_end, |h| h.point);

    // Shoot from the muzzle toward it
    let muzzle = weapon.muzzle(host.position());
    let Some(direction) = safe_normal(aim_point - muzzle) else {
        tracing::debug!(
            target: "rail_core::combat",
            shooter = shooter.0,
            "Aim point coincides with muzzle, shot resolves to no hit"
        );
        return ShotOutcome {
            aim_point,
            aim_blocked: camera_hit.is_some(),
            muzzle,
            direction: None,
            weapon_end: muzzle,
            hit: None,
        };
    };

    let weapon_end = muzzle + direction * weapon.weapon_range;
    let hit = host.raycast(muzzle, weapon_end, shooter);

    host.debug_line(muzzle, weapon_end);

    if let Some(hit) = hit {
        host.shot_hit(&ShotEvent {
            shooter,
            target: hit.entity,
            point: hit.point,
            muzzle,
            at,
        });
    }

    ShotOutcome {
        aim_point,
        aim_blocked: camera_hit.is_some(),
        muzzle,
        direction: Some(direction),
        weapon_end,
        hit,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Host whose traces answer from a script, recording what was asked
    struct ScriptedHost {
        pawn: Vec3,
        camera: Vec3,
        camera_fwd: Vec3,
        answers: Vec<Option<RayHit>>,
        traces: RefCell<Vec<(Vec3, Vec3, EntityId)>>,
        hits: Vec<ShotEvent>,
        lines: usize,
    }

    impl ScriptedHost {
        fn new(answers: Vec<Option<RayHit>>) -> Self {
            Self {
                pawn: Vec3::ZERO,
                camera: Vec3::new(-400.0, 0.0, 100.0),
                camera_fwd: Vec3::X,
                answers,
                traces: RefCell::new(Vec::new()),
                hits: Vec::new(),
                lines: 0,
            }
        }
    }

    impl TransformService for ScriptedHost {
        fn entity(&self) -> EntityId {
            EntityId(1)
        }
        fn position(&self) -> Vec3 {
            self.pawn
        }
        fn set_position(&mut self, position: Vec3) {
            self.pawn = position;
        }
        fn forward(&self) -> Vec3 {
            Vec3::X
        }
    }

    impl CameraService for ScriptedHost {
        fn camera_position(&self) -> Vec3 {
            self.camera
        }
        fn camera_forward(&self) -> Vec3 {
            self.camera_fwd
        }
        fn add_yaw(&mut self, _delta: f32) {}
        fn add_pitch(&mut self, _delta: f32) {}
    }

    impl CollisionQuery for ScriptedHost {
        fn raycast(&self, origin: Vec3, end: Vec3, excluding: EntityId) -> Option<RayHit> {
            let mut traces = self.traces.borrow_mut();
            let i = traces.len();
            traces.push((origin, end, excluding));
            self.answers.get(i).copied().flatten()
        }
    }

    impl Telemetry for ScriptedHost {
        fn shot_hit(&mut self, event: &ShotEvent) {
            self.hits.push(*event);
        }
        fn debug_line(&mut self, _from: Vec3, _to: Vec3) {
            self.lines += 1;
        }
    }

    #[test]
    fn test_safe_normal() {
        assert_eq!(safe_normal(Vec3::new(0.0, 3.0, 4.0)), Some(Vec3::new(0.0, 0.6, 0.8)));
        assert_eq!(safe_normal(Vec3::ZERO), None);
        assert_eq!(safe_normal(Vec3::splat(1.0e-5)), None);
        assert_eq!(safe_normal(Vec3::new(f32::NAN, 0.0, 1.0)), None);
    }

    #[test]
    fn test_muzzle_offset() {
        let weapon = HitscanWeapon::default();
        assert_eq!(weapon.muzzle(Vec3::new(1.0, 2.0, 3.0)), Vec3::new(1.0, 2.0, 43.0));
    }

    #[test]
    fn test_camera_miss_aims_at_max_range() {
        // camera trace misses, weapon trace misses
        let mut host = ScriptedHost::new(vec![None, None]);
        let out = fire(&mut host, &HitscanWeapon::default(), SimTime::default());
        assert!(!out.aim_blocked);
        assert_eq!(out.aim_point, Vec3::new(9600.0, 0.0, 100.0));
        let dir = out.direction.unwrap();
        assert!((dir.length() - 1.0).abs() < 1e-5);
        assert!(dir.x > 0.99);
        assert!(out.hit.is_none());
        assert!(host.hits.is_empty());
        assert_eq!(host.lines, 1);

        let traces = host.traces.borrow();
        assert_eq!(traces.len(), 2);
        assert_eq!(traces[0].2, EntityId(1));
        assert_eq!(traces[1].0, Vec3::new(0.0, 0.0, 40.0));
    }

    #[test]
    fn test_weapon_hit_is_reported() {
        let wall = RayHit {
            point: Vec3::new(800.0, 0.0, 45.0),
            entity: EntityId(77),
        };
        let mut host = ScriptedHost::new(vec![None, Some(wall)]);
        let at = SimTime {
            seconds: 1.5,
            tick: 90,
        };
        let out = fire(&mut host, &HitscanWeapon::default(), at);
        assert_eq!(out.target(), Some(EntityId(77)));
        assert_eq!(host.hits.len(), 1);
        assert_eq!(host.hits[0].target, EntityId(77));
        assert_eq!(host.hits[0].shooter, EntityId(1));
        assert_eq!(host.hits[0].at.tick, 90);

        // weapon trace aimed at the camera trace's far end
        let traces = host.traces.borrow();
        let weapon_dir = (traces[1].1 - traces[1].0).normalize();
        let to_aim = (out.aim_point - out.muzzle).normalize();
        assert!(weapon_dir.dot(to_aim) > 0.9999);
        assert!(((traces[1].1 - traces[1].0).length() - 5000.0).abs() < 0.5);
    }

    #[test]
    fn test_camera_hit_sets_aim_point() {
        let crate_box = RayHit {
            point: Vec3::new(1200.0, 0.0, 100.0),
            entity: EntityId(5),
        };
        let mut host = ScriptedHost::new(vec![Some(crate_box), Some(crate_box)]);
        let out = fire(&mut host, &HitscanWeapon::default(), SimTime::default());
        assert!(out.aim_blocked);
        assert_eq!(out.aim_point, crate_box.point);
        assert_eq!(out.target(), Some(EntityId(5)));
    }

    #[test]
    fn test_degenerate_shot_is_no_hit() {
        let muzzle = Vec3::new(0.0, 0.0, 40.0);
        let mut host = ScriptedHost::new(vec![Some(RayHit {
            point: muzzle,
            entity: EntityId(9),
        })]);
        let out = fire(&mut host, &HitscanWeapon::default(), SimTime::default());
        assert!(out.aim_blocked);
        assert_eq!(out.direction, None);
        assert_eq!(out.weapon_end, muzzle);
        assert!(out.hit.is_none());
        assert!(!out.weapon_end.is_nan());
        assert!(host.hits.is_empty());
        assert_eq!(host.lines, 0);
    }
}
