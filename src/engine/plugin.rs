use bevy::prelude::*;

use crate::combat::ShotOutcome;
use crate::engine::config::EngineConfig;
use crate::engine::session::RailEngine;
use crate::hotreload::{ConfigReloadEvent, ConfigWatcher, HotReloadState};
use crate::input::{InputEvent, InputResponse};

/// Drives a `RailEngine` from the Bevy `Update` schedule
#[derive(Default)]
pub struct RailShooterPlugin {
    pub config: EngineConfig,
}

impl Plugin for RailShooterPlugin {
    fn build(&self, app: &mut App) {
        let engine = match RailEngine::new(self.config.clone()) {
            Ok(engine) => engine,
            Err(e) => {
                error!("Rail config rejected ({e}), falling back to defaults");
                match RailEngine::new(EngineConfig::default()) {
                    Ok(engine) => engine,
                    Err(e) => {
                        error!("Default rail config rejected: {e}");
                        return;
                    }
                }
            }
        };

        app.insert_resource(EngineResource(engine))
            .add_event::<RailInputEvent>()
            .add_event::<ShotFiredEvent>()
            .add_event::<SceneReloadedEvent>()
            .add_event::<ConfigReloadEvent>()
            .init_resource::<HotReloadState>()
            .add_systems(
                Update,
                (apply_config_reloads, apply_rail_input, tick_rail_engine).chain(),
            );
    }
}

#[derive(Resource)]
pub struct EngineResource(pub RailEngine);

/// Input delivered by the host's input system
#[derive(Event, Debug, Clone, Copy)]
pub struct RailInputEvent(pub InputEvent);

#[derive(Event, Debug, Clone, Copy)]
pub struct ShotFiredEvent(pub ShotOutcome);

#[derive(Event, Debug, Clone)]
pub struct SceneReloadedEvent {
    pub scene: String,
    pub reload_count: u32,
}

/// Insert a `ConfigWatcher` resource to hot-reload the rail tuning
fn apply_config_reloads(
    watcher: Option<Res<ConfigWatcher>>,
    mut engine: ResMut<EngineResource>,
    mut state: ResMut<HotReloadState>,
    mut events: EventWriter<ConfigReloadEvent>,
) {
    let Some(watcher) = watcher else {
        return;
    };
    let Some(result) = watcher.poll() else {
        return;
    };

    let result = result.and_then(|config| engine.0.apply_rail_config(config));
    match &result {
        Ok(()) => info!("Rail config hot-reloaded ({})", watcher.path().display()),
        Err(e) => warn!("Rail config reload rejected, keeping previous: {e}"),
    }
    state.record(&result);
    events.send(ConfigReloadEvent {
        path: watcher.path().to_path_buf(),
        success: result.is_ok(),
        error: result.err().map(|e| e.to_string()),
    });
}

fn apply_rail_input(
    mut inputs: EventReader<RailInputEvent>,
    mut engine: ResMut<EngineResource>,
    mut shots: EventWriter<ShotFiredEvent>,
) {
    for RailInputEvent(event) in inputs.read() {
        if let InputResponse::Fired(shot) = engine.0.handle_input(*event) {
            shots.send(ShotFiredEvent(shot));
        }
    }
}

fn tick_rail_engine(
    time: Res<Time>,
    mut engine: ResMut<EngineResource>,
    mut reloads: EventWriter<SceneReloadedEvent>,
) {
    let report = engine.0.tick(time.delta_secs());
    if report.reload_requested {
        reloads.send(SceneReloadedEvent {
            scene: engine.0.world().scene.clone(),
            reload_count: engine.0.reload_count(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::course::CourseConfig;
    use bevy::math::Vec3;
    use std::time::Duration;

    fn app() -> App {
        let config = EngineConfig {
            course: CourseConfig {
                target_density: 0.0,
                ..Default::default()
            },
            ..Default::default()
        };
        let mut app = App::new();
        app.init_resource::<Time>()
            .add_plugins(RailShooterPlugin { config });
        app
    }

    fn advance(app: &mut App, millis: u64) {
        app.world_mut()
            .resource_mut::<Time>()
            .advance_by(Duration::from_millis(millis));
        app.update();
    }

    #[test]
    fn test_plugin_ticks_engine() {
        let mut app = app();
        for _ in 0..30 {
            advance(&mut app, 16);
        }
        let engine = &app.world().resource::<EngineResource>().0;
        assert_eq!(engine.controller().state().clock.tick, 30);
        assert!(engine.world().pawn.position.x > 0.0);
    }

    #[test]
    fn test_plugin_routes_input_and_reports_shots() {
        let mut app = app();
        let target = app
            .world_mut()
            .resource_mut::<EngineResource>()
            .0
            .world_mut()
            .add_box(Vec3::new(1_000.0, -60.0, 0.0), Vec3::new(1_120.0, 60.0, 200.0));

        app.world_mut().send_event(RailInputEvent(InputEvent::MoveLane(1.0)));
        app.world_mut().send_event(RailInputEvent(InputEvent::MoveLane(-1.0)));
        app.world_mut().send_event(RailInputEvent(InputEvent::Fire));
        advance(&mut app, 16);

        let shots = app.world().resource::<Events<ShotFiredEvent>>();
        assert_eq!(shots.len(), 1);
        let engine = &app.world().resource::<EngineResource>().0;
        assert_eq!(engine.last_shot().and_then(|s| s.target()), Some(target));
        assert_eq!(engine.controller().lane().get(), 0);
    }

    #[test]
    fn test_invalid_config_falls_back_to_defaults() {
        let mut config = EngineConfig::default();
        config.rail.lane_width = f32::NAN;
        let mut app = App::new();
        app.init_resource::<Time>()
            .add_plugins(RailShooterPlugin { config });
        let engine = &app.world().resource::<EngineResource>().0;
        assert_eq!(engine.config.rail.lane_width, 300.0);
    }
}
