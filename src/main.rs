//! Headless rail demo: runs a scripted session through the Bevy plugin.
//!
//! Usage: rail-demo [engine.json|engine.ron] [--frames N] [--watch rail.json]

use anyhow::{bail, Context, Result};
use bevy::prelude::*;
use std::time::Duration;

use rail_core::engine::{EngineConfig, EngineResource, RailInputEvent, RailShooterPlugin};
use rail_core::hotreload::{ConfigWatcher, HotReloadState, HotReloadStatus};
use rail_core::input::InputEvent;
use rail_core::logging::LoggingPlugin;

#[derive(Debug, Default)]
struct DemoArgs {
    config: Option<String>,
    frames: Option<u32>,
    watch: Option<String>,
}

fn parse_args() -> Result<DemoArgs> {
    let mut args = DemoArgs::default();
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--frames" => {
                let n = iter.next().context("--frames needs a value")?;
                args.frames = Some(n.parse().with_context(|| format!("bad frame count {n:?}"))?);
            }
            "--watch" => args.watch = Some(iter.next().context("--watch needs a path")?),
            other if other.starts_with("--") => bail!("unknown flag {other}"),
            path => args.config = Some(path.to_string()),
        }
    }
    Ok(args)
}

/// Scripted input for frame `n`
fn scripted_input(frame: u32, tick_rate: u32) -> Option<InputEvent> {
    let second = tick_rate.max(1);
    match frame {
        f if f == second => Some(InputEvent::MoveLane(1.0)),
        f if f == 3 * second => Some(InputEvent::MoveLane(-1.0)),
        f if f == 4 * second => Some(InputEvent::MoveLane(-1.0)),
        f if f == 6 * second => Some(InputEvent::Look(Vec2::new(0.0, -2.0))),
        f if f % (second / 2).max(1) == 0 => Some(InputEvent::Fire),
        _ => None,
    }
}

fn main() -> Result<()> {
    let args = parse_args()?;
    let config = match &args.config {
        Some(path) => EngineConfig::load(path).with_context(|| format!("loading {path}"))?,
        None => EngineConfig::default(),
    };
    let tick_rate = config.tick_rate;
    let frame = Duration::from_secs_f32(config.frame_time());
    // Default: long enough to run off the end of the course once
    let frames = args.frames.unwrap_or_else(|| {
        let seconds = config.course.floor_length / config.rail.run_speed + 5.0;
        (seconds * tick_rate as f32) as u32
    });

    let mut app = App::new();
    app.init_resource::<Time>()
        .add_plugins(LoggingPlugin)
        .add_plugins(RailShooterPlugin { config });

    if let Some(path) = &args.watch {
        let watcher = ConfigWatcher::watch(path).with_context(|| format!("watching {path}"))?;
        app.insert_resource(watcher);
    }

    for n in 1..=frames {
        if let Some(event) = scripted_input(n, tick_rate) {
            app.world_mut().send_event(RailInputEvent(event));
        }
        app.world_mut().resource_mut::<Time>().advance_by(frame);
        app.update();
    }

    let Some(engine) = app.world().get_resource::<EngineResource>() else {
        bail!("rail engine failed to start");
    };
    let snapshot = serde_json::to_string_pretty(&engine.0.snapshot())?;
    if let Some(state) = app.world().get_resource::<HotReloadState>() {
        let status = HotReloadStatus::from_state(app.world().get_resource::<ConfigWatcher>(), state);
        info!("Hot-reload status: {}", serde_json::to_string(&status)?);
    }
    info!("Demo finished after {frames} frames");
    println!("{snapshot}");
    Ok(())
}
