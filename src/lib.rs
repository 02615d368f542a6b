//! Rail Shooter - Core Library
//!
//! This crate provides the engine-agnostic gameplay logic for a lane-based
//! rail shooter:
//! - Lane movement (three lanes, exponential lateral easing, constant forward run)
//! - Dual-ray hit-scan firing (camera aim ray + muzzle ray)
//! - Fall-through detection with a single scene reload per life
//! - Input routing (action names → typed events → handler table)
//! - Game mode pawn class selection
//! - Headless host world and seeded course generation
//! - Bevy plugin, config hot-reload and FFI bridge for UE5 integration

pub mod bridge;
pub mod combat;
pub mod config;
pub mod constants;
pub mod controller;
pub mod course;
pub mod engine;
pub mod error;
pub mod game_mode;
pub mod headless;
pub mod host;
pub mod hotreload;
pub mod input;
pub mod logging;
pub mod movement;
pub mod telemetry;

pub use config::RailConfig;
pub use controller::RailController;
pub use error::{RailError, RailResult};
