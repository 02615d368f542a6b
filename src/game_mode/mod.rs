//! Game mode: picks the pawn class spawned for the player.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::constants::DEFAULT_PAWN_CLASS_PATH;

/// Pawn class spawned when no blueprint class resolves
pub const NATIVE_PAWN_CLASS: &str = "RailShooterCharacter";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PawnClass {
    pub path: String,
    pub name: String,
}

impl PawnClass {
    pub fn native() -> Self {
        Self {
            path: format!("/Script/RailShooter.{NATIVE_PAWN_CLASS}"),
            name: NATIVE_PAWN_CLASS.into(),
        }
    }
}

/// Class lookup by asset path
pub trait PawnClassRegistry {
    fn find_class(&self, path: &str) -> Option<PawnClass>;
}

/// In-memory registry of known pawn classes
#[derive(Debug, Clone, Default)]
pub struct PawnRegistry {
    classes: HashMap<String, PawnClass>,
}

impl PawnRegistry {
    /// Registry holding the third-person blueprint
    pub fn with_defaults() -> Self {
        let mut registry = Self::default();
        registry.register(DEFAULT_PAWN_CLASS_PATH);
        registry
    }

    /// Register a class; its name is the last path segment
    pub fn register(&mut self, path: &str) -> PawnClass {
        let name = path.rsplit('/').next().unwrap_or(path).to_string();
        let class = PawnClass {
            path: path.to_string(),
            name,
        };
        self.classes.insert(path.to_string(), class.clone());
        class
    }
}

impl PawnClassRegistry for PawnRegistry {
    fn find_class(&self, path: &str) -> Option<PawnClass> {
        self.classes.get(path).cloned()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameMode {
    pub default_pawn_class: PawnClass,
}

impl Default for GameMode {
    fn default() -> Self {
        Self {
            default_pawn_class: PawnClass::native(),
        }
    }
}

impl GameMode {
    /// Use the class at `path` as the default pawn when it resolves
    pub fn new(registry: &dyn PawnClassRegistry, path: &str) -> Self {
        match registry.find_class(path) {
            Some(class) => Self {
                default_pawn_class: class,
            },
            None => {
                tracing::warn!(
                    target: "rail_core::game_mode",
                    path,
                    "Pawn class not found, keeping native pawn"
                );
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_blueprint_resolves() {
        let registry = PawnRegistry::with_defaults();
        let mode = GameMode::new(&registry, DEFAULT_PAWN_CLASS_PATH);
        assert_eq!(mode.default_pawn_class.name, "BP_ThirdPersonCharacter");
        assert_eq!(mode.default_pawn_class.path, DEFAULT_PAWN_CLASS_PATH);
    }

    #[test]
    fn test_missing_class_keeps_native() {
        let registry = PawnRegistry::default();
        let mode = GameMode::new(&registry, "/Game/Missing/BP_Nope");
        assert_eq!(mode, GameMode::default());
        assert_eq!(mode.default_pawn_class.name, NATIVE_PAWN_CLASS);
    }
}
