use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::config::RailConfig;
use crate::constants::{DEFAULT_PAWN_CLASS_PATH, DEFAULT_SCENE};
use crate::course::CourseConfig;
use crate::error::{RailError, RailResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub scene_name: String,
    pub tick_rate: u32,
    pub pawn_class: String,
    pub rail: RailConfig,
    pub course: CourseConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            scene_name: DEFAULT_SCENE.into(),
            tick_rate: 60,
            pawn_class: DEFAULT_PAWN_CLASS_PATH.into(),
            rail: RailConfig::default(),
            course: CourseConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Fixed frame time for the configured tick rate
    pub fn frame_time(&self) -> f32 {
        1.0 / self.tick_rate.max(1) as f32
    }

    /// Rail tuning and course layout must both be usable
    pub fn validate(&self) -> RailResult<()> {
        self.rail.validate()?;
        self.course.validate()
    }

    pub fn from_json(json: &str) -> RailResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> RailResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| RailError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::from_str(&text)?,
            Some("ron") => ron::from_str(&text)?,
            _ => return Err(RailError::UnsupportedFormat(path.to_path_buf())),
        };
        config.validate()?;
        Ok(config)
    }
}
