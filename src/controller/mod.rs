//! Rail character controller.
//!
//! Runs the pawn forward every tick, eases it toward the selected lane,
//! forwards look input to the camera and resolves hit-scan shots. All engine
//! access goes through the injected host.

use serde::{Deserialize, Serialize};

use crate::combat::{self, HitscanWeapon, ShotOutcome};
use crate::config::RailConfig;
use crate::constants::FORWARD_EFFORT;
use crate::error::RailResult;
use crate::host::RailHost;
use crate::input::{InputDispatcher, InputEvent, InputKind, InputResponse};
use crate::movement::{self, LaneIndex};
use crate::telemetry::SimTime;

/// Per-spawn controller state
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ControllerState {
    pub lane: LaneIndex,
    pub clock: SimTime,
    /// Set once a reload has been requested for this life
    pub reload_requested: bool,
}

/// Result of one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickReport {
    pub reload_requested: bool,
}

pub struct RailController<H: RailHost> {
    config: RailConfig,
    weapon: HitscanWeapon,
    state: ControllerState,
    host: H,
}

impl<H: RailHost> RailController<H> {
    /// Validate `config` and take ownership of the host collaborators
    pub fn new(config: RailConfig, mut host: H) -> RailResult<Self> {
        config.validate()?;
        host.set_max_speed(config.run_speed);
        tracing::debug!(
            target: "rail_core::controller",
            entity = host.entity().0,
            lane_width = config.lane_width,
            run_speed = config.run_speed,
            "Rail controller spawned"
        );
        Ok(Self {
            weapon: HitscanWeapon::from(&config),
            config,
            state: ControllerState::default(),
            host,
        })
    }

    pub fn config(&self) -> &RailConfig {
        &self.config
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    pub fn lane(&self) -> LaneIndex {
        self.state.lane
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    /// Swap in new tuning; the current lane and clock are kept
    pub fn reconfigure(&mut self, config: RailConfig) -> RailResult<()> {
        config.validate()?;
        self.host.set_max_speed(config.run_speed);
        self.weapon = HitscanWeapon::from(&config);
        self.config = config;
        Ok(())
    }

    /// Fresh state for a newly spawned pawn
    pub fn respawn(&mut self) {
        self.state = ControllerState::default();
        self.host.set_max_speed(self.config.run_speed);
    }

    /// Advance one frame
    pub fn tick(&mut self, delta_time: f32) -> TickReport {
        let delta_time = if delta_time.is_finite() {
            delta_time
        } else {
            tracing::warn!(
                target: "rail_core::controller",
                delta_time,
                "Non-finite frame time, ticking as zero"
            );
            0.0
        };
        self.state.clock.seconds += f64::from(delta_time.max(0.0));
        self.state.clock.tick += 1;

        let forward = self.host.forward();
        self.host.add_movement_input(forward, FORWARD_EFFORT);

        let position = movement::step_lateral(
            self.host.position(),
            self.state.lane,
            self.config.lane_width,
            delta_time,
            self.config.lane_interp_speed,
        );
        self.host.set_position(position);

        let mut report = TickReport::default();
        if movement::fell_out_of_world(self.host.position(), self.config.kill_z)
            && !self.state.reload_requested
        {
            let scene = self.host.current_scene();
            tracing::warn!(
                target: "rail_core::controller",
                entity = self.host.entity().0,
                z = self.host.position().z,
                scene = %scene,
                "Pawn fell out of the world, reloading scene"
            );
            self.state.reload_requested = true;
            self.host.reload_scene(&scene);
            report.reload_requested = true;
        }
        report
    }

    /// Shift the lane by the rounded input, clamped to the outer lanes
    pub fn on_lane_change(&mut self, input: f32) -> LaneIndex {
        self.shift_lane(input);
        self.state.lane
    }

    /// `None` when the input was not finite and the lane is unchanged
    fn shift_lane(&mut self, input: f32) -> Option<LaneIndex> {
        let lane = self.state.lane.shifted_by_input(input);
        match lane {
            Some(lane) => self.state.lane = lane,
            None => tracing::warn!(
                target: "rail_core::controller",
                input,
                "Ignoring non-finite lane input"
            ),
        }
        lane
    }

    /// Add look input to the camera's yaw and pitch
    pub fn on_look(&mut self, input: bevy::math::Vec2) {
        self.host.add_yaw(input.x);
        self.host.add_pitch(input.y);
    }

    /// Fire the hit-scan weapon
    pub fn on_fire(&mut self) -> ShotOutcome {
        combat::fire(&mut self.host, &self.weapon, self.state.clock)
    }

    /// Route a typed input event straight to its handler
    pub fn handle(&mut self, event: InputEvent) -> InputResponse {
        match event {
            InputEvent::Look(v) => {
                self.on_look(v);
                InputResponse::Looked
            }
            InputEvent::MoveLane(v) => self
                .shift_lane(v)
                .map_or(InputResponse::Ignored, InputResponse::LaneChanged),
            InputEvent::Fire => InputResponse::Fired(self.on_fire()),
        }
    }
}

impl<H: RailHost + 'static> RailController<H> {
    /// Handler table for the controller's inputs
    pub fn input_table() -> InputDispatcher<Self> {
        InputDispatcher::new()
            .on(InputKind::Look, |c: &mut Self, v| {
                c.on_look(v.as_axis2d());
                InputResponse::Looked
            })
            .on(InputKind::MoveLane, |c: &mut Self, v| {
                c.shift_lane(v.as_axis1d())
                    .map_or(InputResponse::Ignored, InputResponse::LaneChanged)
            })
            .on(InputKind::Fire, |c: &mut Self, _| {
                InputResponse::Fired(c.on_fire())
            })
    }
}

impl<H: RailHost + std::fmt::Debug> std::fmt::Debug for RailController<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RailController")
            .field("state", &self.state)
            .field("host", &self.host)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RailError;
    use crate::host::*;
    use crate::telemetry::{ShotEvent, Telemetry};
    use bevy::math::{Vec2, Vec3};

    /// Minimal host: a pawn in empty space
    #[derive(Debug, Default)]
    struct StubHost {
        position: Vec3,
        movement_inputs: Vec<(Vec3, f32)>,
        max_speed: f32,
        yaw: f32,
        pitch: f32,
        reloads: Vec<String>,
        hits: Vec<ShotEvent>,
    }

    impl TransformService for StubHost {
        fn entity(&self) -> EntityId {
            EntityId(1)
        }
        fn position(&self) -> Vec3 {
            self.position
        }
        fn set_position(&mut self, position: Vec3) {
            self.position = position;
        }
        fn forward(&self) -> Vec3 {
            Vec3::X
        }
    }

    impl MovementService for StubHost {
        fn add_movement_input(&mut self, direction: Vec3, scale: f32) {
            self.movement_inputs.push((direction, scale));
        }
        fn set_max_speed(&mut self, speed: f32) {
            self.max_speed = speed;
        }
    }

    impl CollisionQuery for StubHost {
        fn raycast(&self, _origin: Vec3, _end: Vec3, _excluding: EntityId) -> Option<RayHit> {
            None
        }
    }

    impl CameraService for StubHost {
        fn camera_position(&self) -> Vec3 {
            self.position + Vec3::new(-400.0, 0.0, 60.0)
        }
        fn camera_forward(&self) -> Vec3 {
            Vec3::X
        }
        fn add_yaw(&mut self, delta: f32) {
            self.yaw += delta;
        }
        fn add_pitch(&mut self, delta: f32) {
            self.pitch += delta;
        }
    }

    impl LevelService for StubHost {
        fn current_scene(&self) -> String {
            "RailMap".into()
        }
        fn reload_scene(&mut self, scene_id: &str) {
            self.reloads.push(scene_id.to_string());
        }
    }

    impl Telemetry for StubHost {
        fn shot_hit(&mut self, event: &ShotEvent) {
            self.hits.push(*event);
        }
    }

    fn controller() -> RailController<StubHost> {
        RailController::new(RailConfig::default(), StubHost::default()).unwrap()
    }

    #[test]
    fn test_new_pushes_run_speed() {
        let c = controller();
        assert_eq!(c.host().max_speed, 500.0);
        assert_eq!(c.lane(), LaneIndex::CENTER);
    }

    #[test]
    fn test_new_rejects_bad_config() {
        let config = RailConfig {
            lane_width: -300.0,
            ..Default::default()
        };
        let err = RailController::new(config, StubHost::default()).unwrap_err();
        assert!(matches!(err, RailError::InvalidConfig { field: "lane_width", .. }));
    }

    #[test]
    fn test_tick_applies_forward_effort() {
        let mut c = controller();
        c.tick(1.0 / 60.0);
        assert_eq!(c.host().movement_inputs, vec![(Vec3::X, 1.0)]);
        assert_eq!(c.state().clock.tick, 1);
    }

    #[test]
    fn test_lane_change_scenario() {
        let mut c = controller();
        assert_eq!(c.on_lane_change(1.0), LaneIndex::RIGHT);

        let mut last = 0.0;
        for _ in 0..120 {
            c.tick(1.0 / 60.0);
            let y = c.host().position.y;
            assert!(y >= last, "lateral offset must not move away from the lane");
            assert!(y <= 300.0, "lateral offset overshot: {y}");
            last = y;
        }
        assert!((last - 300.0).abs() < 0.01);
    }

    #[test]
    fn test_lane_change_clamps_at_edge() {
        let mut c = controller();
        c.on_lane_change(1.0);
        assert_eq!(c.on_lane_change(1.0).get(), 1);
        assert_eq!(c.on_lane_change(-1.0).get(), 0);
        assert_eq!(c.on_lane_change(-1.0).get(), -1);
        assert_eq!(c.on_lane_change(-1.0).get(), -1);
    }

    #[test]
    fn test_nan_lane_input_ignored() {
        let mut c = controller();
        c.on_lane_change(1.0);
        assert_eq!(c.on_lane_change(f32::NAN), LaneIndex::RIGHT);
    }

    #[test]
    fn test_nan_dt_ticks_as_zero() {
        let mut c = controller();
        c.on_lane_change(1.0);
        c.tick(f32::NAN);
        assert_eq!(c.host().position.y, 0.0);
        assert_eq!(c.state().clock.seconds, 0.0);
        assert_eq!(c.state().clock.tick, 1);
    }

    #[test]
    fn test_fixed_point_tick_is_idempotent() {
        let mut c = controller();
        c.on_lane_change(-1.0);
        c.host_mut().position = Vec3::new(0.0, -300.0, 0.0);
        c.tick(0.016);
        assert_eq!(c.host().position.y, -300.0);
    }

    #[test]
    fn test_look_forwards_to_camera_unclamped() {
        let mut c = controller();
        c.on_look(Vec2::new(2.5, -400.0));
        c.on_look(Vec2::new(0.5, 0.0));
        assert_eq!(c.host().yaw, 3.0);
        assert_eq!(c.host().pitch, -400.0);
    }

    #[test]
    fn test_fall_requests_single_reload() {
        let mut c = controller();
        c.host_mut().position = Vec3::new(0.0, 0.0, -1000.01);
        assert!(c.tick(0.016).reload_requested);
        assert!(!c.tick(0.016).reload_requested);
        assert!(!c.tick(0.016).reload_requested);
        assert_eq!(c.host().reloads, vec!["RailMap".to_string()]);
    }

    #[test]
    fn test_respawn_rearms_reload_and_resets_lane() {
        let mut c = controller();
        c.on_lane_change(1.0);
        c.host_mut().position = Vec3::new(0.0, 0.0, -2000.0);
        c.tick(0.016);
        c.respawn();
        assert_eq!(c.lane(), LaneIndex::CENTER);
        assert!(!c.state().reload_requested);
        assert!(c.tick(0.016).reload_requested);
        assert_eq!(c.host().reloads.len(), 2);
    }

    #[test]
    fn test_no_reload_at_exact_kill_z() {
        let mut c = controller();
        c.host_mut().position = Vec3::new(0.0, 0.0, -1000.0);
        assert!(!c.tick(0.016).reload_requested);
    }

    #[test]
    fn test_fire_into_empty_space() {
        let mut c = controller();
        let shot = c.on_fire();
        assert!(shot.hit.is_none());
        assert!(!shot.aim_blocked);
        assert!(shot.direction.is_some());
        assert!(c.host().hits.is_empty());
    }

    #[test]
    fn test_input_table_dispatch() {
        let table = RailController::<StubHost>::input_table();
        let mut c = controller();
        assert_eq!(
            table.dispatch(&mut c, InputEvent::MoveLane(-1.0)),
            InputResponse::LaneChanged(LaneIndex::LEFT)
        );
        assert_eq!(
            table.dispatch(&mut c, InputEvent::Look(Vec2::new(1.0, 1.0))),
            InputResponse::Looked
        );
        assert!(matches!(
            table.dispatch(&mut c, InputEvent::Fire),
            InputResponse::Fired(_)
        ));
        assert_eq!(c.host().yaw, 1.0);
        assert_eq!(
            table.dispatch(&mut c, InputEvent::MoveLane(f32::NAN)),
            InputResponse::Ignored
        );
        assert_eq!(c.handle(InputEvent::MoveLane(f32::INFINITY)), InputResponse::Ignored);
        assert_eq!(c.lane(), LaneIndex::LEFT);
    }

    #[test]
    fn test_reconfigure_keeps_lane() {
        let mut c = controller();
        c.on_lane_change(1.0);
        let config = RailConfig {
            lane_width: 150.0,
            run_speed: 800.0,
            ..Default::default()
        };
        c.reconfigure(config).unwrap();
        assert_eq!(c.lane(), LaneIndex::RIGHT);
        assert_eq!(c.host().max_speed, 800.0);
        assert!(c
            .reconfigure(RailConfig {
                run_speed: 0.0,
                ..Default::default()
            })
            .is_err());
        assert_eq!(c.config().lane_width, 150.0);
    }
}
