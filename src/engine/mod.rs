//! Rail Session Engine: Integration Layer
//!
//! Wires the rail controller to the headless world and exposes it to hosts:
//!   Bevy app   ←→ `RailShooterPlugin` (Update systems, events)
//!   UE5 / C    ←→ FFI/DLL JSON bridge (`crate::bridge`)
//!
//! A session owns the controller, the input router and handler table, the
//! game mode's pawn class and the fall-through reload cycle.

pub mod config;
pub mod messages;
pub mod plugin;
pub mod session;

pub use config::EngineConfig;
pub use messages::*;
pub use plugin::{EngineResource, RailInputEvent, RailShooterPlugin, SceneReloadedEvent, ShotFiredEvent};
pub use session::RailEngine;

// =====================================================
// Tests
// =====================================================
