//! Shot telemetry.
//!
//! Hits are reported as structured events instead of ad-hoc log lines. The
//! default trait methods log through `tracing`; hosts override them to feed
//! scoring, analytics or debug drawing.

use bevy::math::Vec3;
use serde::{Deserialize, Serialize};

use crate::host::EntityId;

/// Simulation clock stamp (seconds since spawn + frame counter)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SimTime {
    pub seconds: f64,
    pub tick: u64,
}

/// A resolved shot that hit something
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShotEvent {
    pub shooter: EntityId,
    pub target: EntityId,
    pub point: Vec3,
    pub muzzle: Vec3,
    pub at: SimTime,
}

pub trait Telemetry {
    fn shot_hit(&mut self, event: &ShotEvent) {
        tracing::info!(
            target: "rail_core::combat",
            shooter = event.shooter.0,
            target_id = event.target.0,
            x = event.point.x,
            y = event.point.y,
            z = event.point.z,
            tick = event.at.tick,
            t = event.at.seconds,
            "Hit: {}",
            event.target
        );
    }

    /// Debug trace line for a shot; cosmetic
    fn debug_line(&mut self, _from: Vec3, _to: Vec3) {}
}

/// Bounded in-memory record of hits
#[derive(Debug, Clone)]
pub struct ShotLog {
    pub events: Vec<ShotEvent>,
    pub capacity: usize,
    pub total_hits: u64,
}

impl Default for ShotLog {
    fn default() -> Self {
        Self::with_capacity(256)
    }
}

impl ShotLog {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: Vec::new(),
            capacity,
            total_hits: 0,
        }
    }

    pub fn record(&mut self, event: ShotEvent) {
        if self.capacity == 0 {
            self.total_hits += 1;
            return;
        }
        if self.events.len() >= self.capacity {
            self.events.remove(0);
        }
        self.events.push(event);
        self.total_hits += 1;
    }

    pub fn last(&self) -> Option<&ShotEvent> {
        self.events.last()
    }

    pub fn hits_on(&self, target: EntityId) -> usize {
        self.events.iter().filter(|e| e.target == target).count()
    }
}
