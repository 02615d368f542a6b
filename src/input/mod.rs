//! Input routing for the rail controller.
//!
//! Two layers:
//! 1. **`InputRouter`**: host action names + trigger phase → typed `InputEvent`
//! 2. **`InputDispatcher`**: `InputKind` → handler closure, built once at setup

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::combat::ShotOutcome;
use crate::config::InputActions;
use crate::movement::LaneIndex;

// ============================================================================
// Input Types
// ============================================================================

/// Kinds of input the controller reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputKind {
    Look,
    MoveLane,
    Fire,
}

/// Trigger phase reported by the host input system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TriggerEvent {
    Started,
    Triggered,
    Completed,
}

impl TriggerEvent {
    pub fn from_id(id: u32) -> Option<Self> {
        match id {
            0 => Some(TriggerEvent::Started),
            1 => Some(TriggerEvent::Triggered),
            2 => Some(TriggerEvent::Completed),
            _ => None,
        }
    }
}

/// Raw action value; coerced like the host does
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputValue {
    Digital(bool),
    Axis1D(f32),
    Axis2D(Vec2),
}

impl InputValue {
    pub fn as_axis1d(self) -> f32 {
        match self {
            InputValue::Digital(pressed) => {
                if pressed {
                    1.0
                } else {
                    0.0
                }
            }
            InputValue::Axis1D(v) => v,
            InputValue::Axis2D(v) => v.x,
        }
    }

    pub fn as_axis2d(self) -> Vec2 {
        match self {
            InputValue::Axis2D(v) => v,
            other => Vec2::new(other.as_axis1d(), 0.0),
        }
    }
}

/// Typed controller input
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Look(Vec2),
    MoveLane(f32),
    Fire,
}

impl InputEvent {
    pub fn kind(&self) -> InputKind {
        match self {
            InputEvent::Look(_) => InputKind::Look,
            InputEvent::MoveLane(_) => InputKind::MoveLane,
            InputEvent::Fire => InputKind::Fire,
        }
    }

    pub fn value(&self) -> InputValue {
        match *self {
            InputEvent::Look(v) => InputValue::Axis2D(v),
            InputEvent::MoveLane(v) => InputValue::Axis1D(v),
            InputEvent::Fire => InputValue::Digital(true),
        }
    }

    pub fn from_value(kind: InputKind, value: InputValue) -> Self {
        match kind {
            InputKind::Look => InputEvent::Look(value.as_axis2d()),
            InputKind::MoveLane => InputEvent::MoveLane(value.as_axis1d()),
            InputKind::Fire => InputEvent::Fire,
        }
    }
}

/// What a handler did with an event
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputResponse {
    Unbound,
    Ignored,
    Looked,
    LaneChanged(LaneIndex),
    Fired(ShotOutcome),
}

// ============================================================================
// Router
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionBinding {
    pub kind: InputKind,
    pub trigger: TriggerEvent,
}

/// Maps host action names onto controller inputs
#[derive(Debug, Clone, Default)]
pub struct InputRouter {
    pub mapping_context: Option<String>,
    bindings: HashMap<String, ActionBinding>,
}

impl InputRouter {
    /// Bind the configured actions. Fire reacts on `Started`; look and lane
    /// moves on `Triggered`, so a held lane key keeps stepping.
    pub fn from_actions(actions: &InputActions) -> Self {
        let Some(context) = actions.mapping_context.clone() else {
            tracing::error!(
                target: "rail_core::input",
                "No input mapping context configured; input bindings skipped"
            );
            return Self::default();
        };

        let mut router = Self {
            mapping_context: Some(context),
            bindings: HashMap::new(),
        };

        match &actions.look {
            Some(name) => router.bind(name, InputKind::Look, TriggerEvent::Triggered),
            None => tracing::error!(target: "rail_core::input", "Look action missing; camera look unbound"),
        }
        if let Some(name) = &actions.fire {
            router.bind(name, InputKind::Fire, TriggerEvent::Started);
        }
        if let Some(name) = &actions.move_lane {
            router.bind(name, InputKind::MoveLane, TriggerEvent::Triggered);
        }

        tracing::debug!(
            target: "rail_core::input",
            bindings = router.bindings.len(),
            "Input bindings registered"
        );
        router
    }

    pub fn bind(&mut self, action: &str, kind: InputKind, trigger: TriggerEvent) {
        self.bindings
            .insert(action.to_string(), ActionBinding { kind, trigger });
    }

    pub fn binding(&self, action: &str) -> Option<ActionBinding> {
        self.bindings.get(action).copied()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Resolve a host action event; `None` if unbound or the wrong phase
    pub fn route(&self, action: &str, trigger: TriggerEvent, value: InputValue) -> Option<InputEvent> {
        let binding = self.bindings.get(action)?;
        if binding.trigger != trigger {
            return None;
        }
        Some(InputEvent::from_value(binding.kind, value))
    }
}

// ============================================================================
// Dispatcher
// ============================================================================

pub type InputHandler<C> = Box<dyn Fn(&mut C, InputValue) -> InputResponse + Send + Sync>;

/// Handler table keyed by input kind
pub struct InputDispatcher<C> {
    handlers: HashMap<InputKind, InputHandler<C>>,
}

impl<C> Default for InputDispatcher<C> {
    fn default() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }
}

impl<C> InputDispatcher<C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on<F>(mut self, kind: InputKind, handler: F) -> Self
    where
        F: Fn(&mut C, InputValue) -> InputResponse + Send + Sync + 'static,
    {
        self.handlers.insert(kind, Box::new(handler));
        self
    }

    pub fn is_bound(&self, kind: InputKind) -> bool {
        self.handlers.contains_key(&kind)
    }

    pub fn dispatch(&self, target: &mut C, event: InputEvent) -> InputResponse {
        match self.handlers.get(&event.kind()) {
            Some(handler) => handler(target, event.value()),
            None => InputResponse::Unbound,
        }
    }
}

impl<C> std::fmt::Debug for InputDispatcher<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputDispatcher")
            .field("kinds", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}
