use crate::combat::ShotOutcome;
use crate::config::RailConfig;
use crate::controller::{RailController, TickReport};
use crate::course::Course;
use crate::engine::config::EngineConfig;
use crate::engine::messages::RailStateMsg;
use crate::error::RailResult;
use crate::game_mode::{GameMode, PawnRegistry};
use crate::headless::HeadlessWorld;
use crate::host::TransformService;
use crate::input::{InputDispatcher, InputEvent, InputResponse, InputRouter, InputValue, TriggerEvent};
use crate::movement::LaneIndex;

type HeadlessController = RailController<HeadlessWorld>;

/// A playable rail session over the headless world.
/// Owns the controller, its input tables and the scene lifecycle.
pub struct RailEngine {
    pub config: EngineConfig,
    pub game_mode: GameMode,
    controller: HeadlessController,
    router: InputRouter,
    dispatcher: InputDispatcher<HeadlessController>,
    reload_count: u32,
    last_shot: Option<ShotOutcome>,
}

impl RailEngine {
    pub fn new(config: EngineConfig) -> RailResult<Self> {
        config.course.validate()?;
        let course = Course::generate(&config.course, config.rail.lane_width);
        let world = HeadlessWorld::new(&config.rail, course).with_scene(config.scene_name.clone());
        let controller = RailController::new(config.rail.clone(), world)?;
        let game_mode = GameMode::new(&PawnRegistry::with_defaults(), &config.pawn_class);

        tracing::info!(
            target: "rail_core::engine",
            scene = %config.scene_name,
            pawn = %game_mode.default_pawn_class.name,
            targets = controller.host().target_count(),
            "Rail session started"
        );

        Ok(Self {
            router: InputRouter::from_actions(&config.rail.input),
            dispatcher: HeadlessController::input_table(),
            game_mode,
            controller,
            config,
            reload_count: 0,
            last_shot: None,
        })
    }

    /// Advance the session by one frame: controller first, then character movement
    pub fn tick(&mut self, delta_time: f32) -> TickReport {
        let report = self.controller.tick(delta_time);
        self.controller.host_mut().step(delta_time);

        if let Some(scene) = self.controller.host_mut().take_reload_request() {
            self.reload(&scene);
        }
        report
    }

    fn reload(&mut self, scene: &str) {
        self.controller.host_mut().restore_scene();
        self.controller.respawn();
        self.last_shot = None;
        self.reload_count += 1;
        tracing::info!(
            target: "rail_core::engine",
            scene,
            reloads = self.reload_count,
            "Scene reloaded, pawn respawned"
        );
    }

    /// Route a typed input through the handler table
    pub fn handle_input(&mut self, event: InputEvent) -> InputResponse {
        let response = self.dispatcher.dispatch(&mut self.controller, event);
        if let InputResponse::Fired(shot) = response {
            self.last_shot = Some(shot);
        }
        response
    }

    /// Route a host action event; `None` when no binding matches
    pub fn dispatch_action(
        &mut self,
        action: &str,
        trigger: TriggerEvent,
        value: InputValue,
    ) -> Option<InputResponse> {
        let event = self.router.route(action, trigger, value)?;
        Some(self.handle_input(event))
    }

    pub fn move_lane(&mut self, input: f32) -> LaneIndex {
        match self.handle_input(InputEvent::MoveLane(input)) {
            InputResponse::LaneChanged(lane) => lane,
            _ => self.controller.lane(),
        }
    }

    pub fn fire(&mut self) -> Option<ShotOutcome> {
        match self.handle_input(InputEvent::Fire) {
            InputResponse::Fired(shot) => Some(shot),
            _ => None,
        }
    }

    /// Apply new rail tuning; rejected configs leave the session untouched
    pub fn apply_rail_config(&mut self, rail: RailConfig) -> RailResult<()> {
        self.controller.reconfigure(rail.clone())?;
        let world = self.controller.host_mut();
        world.camera.rig = rail.camera.clone();
        world.movement = rail.movement.clone();
        self.router = InputRouter::from_actions(&rail.input);
        self.config.rail = rail;
        tracing::info!(target: "rail_core::engine", "Rail config applied");
        Ok(())
    }

    pub fn controller(&self) -> &HeadlessController {
        &self.controller
    }

    pub fn world(&self) -> &HeadlessWorld {
        self.controller.host()
    }

    pub fn world_mut(&mut self) -> &mut HeadlessWorld {
        self.controller.host_mut()
    }

    pub fn router(&self) -> &InputRouter {
        &self.router
    }

    pub fn reload_count(&self) -> u32 {
        self.reload_count
    }

    pub fn last_shot(&self) -> Option<&ShotOutcome> {
        self.last_shot.as_ref()
    }

    pub fn snapshot(&self) -> RailStateMsg {
        let world = self.world();
        let state = self.controller.state();
        RailStateMsg {
            scene: world.scene.clone(),
            pawn_class: self.game_mode.default_pawn_class.name.clone(),
            lane: state.lane.get(),
            position: world.position().into(),
            velocity: world.pawn.velocity.into(),
            camera_yaw: world.camera.yaw,
            camera_pitch: world.camera.pitch,
            tick: state.clock.tick,
            elapsed_seconds: state.clock.seconds,
            reload_count: self.reload_count,
            total_hits: world.shots.total_hits,
            targets: world.target_count(),
        }
    }
}
