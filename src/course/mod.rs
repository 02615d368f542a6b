//! Deterministic rail course layout (seed → floor length + lane targets).

use bevy::math::Vec3;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};

use crate::config::{require_finite, require_positive};
use crate::constants::{LANE_MAX, LANE_MIN, MAX_COURSE_ROWS};
use crate::error::{RailError, RailResult};
use crate::movement::LaneIndex;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CourseConfig {
    pub seed: u64,
    /// Length of the rail floor along +X; running past it drops the pawn
    pub floor_length: f32,
    /// Depth of the first target row
    pub first_row: f32,
    pub row_spacing: f32,
    /// Chance that a lane in a row holds a target
    pub target_density: f32,
    pub target_size: [f32; 3],
}

impl Default for CourseConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            floor_length: 20_000.0,
            first_row: 1_500.0,
            row_spacing: 1_000.0,
            target_density: 0.4,
            target_size: [60.0, 120.0, 160.0],
        }
    }
}

impl CourseConfig {
    /// Reject layouts that cannot be generated in bounded time
    pub fn validate(&self) -> RailResult<()> {
        require_positive("course.floor_length", self.floor_length)?;
        require_positive("course.row_spacing", self.row_spacing)?;
        require_finite("course.first_row", self.first_row)?;
        require_finite("course.target_density", self.target_density)?;
        for size in self.target_size {
            require_positive("course.target_size", size)?;
        }
        let span = (self.floor_length - self.first_row) / self.row_spacing;
        if span > MAX_COURSE_ROWS as f32 {
            return Err(RailError::InvalidConfig {
                field: "course.row_spacing",
                value: self.row_spacing,
                reason: "too small for floor_length (row limit exceeded)",
            });
        }
        Ok(())
    }

    /// Rows that fit on the floor, at most `MAX_COURSE_ROWS`
    pub fn row_count(&self) -> u32 {
        if !self.row_spacing.is_finite() || self.row_spacing <= 0.0 {
            return 0;
        }
        let jitter = self.row_spacing * 0.25;
        let usable = self.floor_length - self.first_row - jitter - self.target_size[0];
        if usable.is_nan() || usable < 0.0 {
            return 0;
        }
        let rows = (usable / self.row_spacing).floor() + 1.0;
        rows.min(MAX_COURSE_ROWS as f32) as u32
    }
}

/// A static target box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetSpec {
    pub lane: LaneIndex,
    pub row: u32,
    pub min: [f32; 3],
    pub max: [f32; 3],
}

impl TargetSpec {
    pub fn center(&self) -> Vec3 {
        (Vec3::from_array(self.min) + Vec3::from_array(self.max)) * 0.5
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub seed: u64,
    pub floor_length: f32,
    pub targets: Vec<TargetSpec>,
}

impl Course {
    /// A floor with nothing on it
    pub fn empty(floor_length: f32) -> Self {
        Self {
            seed: 0,
            floor_length,
            targets: Vec::new(),
        }
    }

    /// Lay out target rows along the rail. Same seed, same course.
    pub fn generate(config: &CourseConfig, lane_width: f32) -> Self {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(config.seed);
        let [sx, sy, sz] = config.target_size;
        let density = if config.target_density.is_nan() {
            0.0
        } else {
            f64::from(config.target_density.clamp(0.0, 1.0))
        };

        let rows = config.row_count();
        let jitter = config.row_spacing * 0.25;
        let mut targets = Vec::new();
        for row in 0..rows {
            let depth = config.first_row + row as f32 * config.row_spacing;
            for lane in LANE_MIN..=LANE_MAX {
                if !rng.gen_bool(density) {
                    continue;
                }
                let lane = LaneIndex::new(lane);
                let y = lane.offset(lane_width);
                // jitter inside the row so rows do not look stamped
                let offset = if jitter > 0.0 { rng.gen_range(0.0..jitter) } else { 0.0 };
                let x = depth + offset;
                targets.push(TargetSpec {
                    lane,
                    row,
                    min: [x, y - sy * 0.5, 0.0],
                    max: [x + sx, y + sy * 0.5, sz],
                });
            }
        }

        tracing::debug!(
            target: "rail_core::course",
            seed = config.seed,
            rows,
            targets = targets.len(),
            "Course generated"
        );

        Self {
            seed: config.seed,
            floor_length: config.floor_length,
            targets,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_course_deterministic() {
        let config = CourseConfig::default();
        let a = Course::generate(&config, 300.0);
        let b = Course::generate(&config, 300.0);
        assert_eq!(a, b);
        assert!(!a.targets.is_empty());
    }

    #[test]
    fn test_different_seed_differs() {
        let a = Course::generate(&CourseConfig::default(), 300.0);
        let b = Course::generate(
            &CourseConfig {
                seed: 7,
                ..Default::default()
            },
            300.0,
        );
        assert_ne!(a.targets, b.targets);
    }

    #[test]
    fn test_targets_sit_in_lanes_on_floor() {
        let config = CourseConfig::default();
        let course = Course::generate(&config, 300.0);
        for t in &course.targets {
            let c = t.center();
            assert!((c.y - t.lane.offset(300.0)).abs() < 1e-3);
            assert!(t.max[0] <= config.floor_length);
            assert_eq!(t.min[2], 0.0);
        }
    }

    #[test]
    fn test_zero_density_is_empty() {
        let config = CourseConfig {
            target_density: 0.0,
            ..Default::default()
        };
        assert!(Course::generate(&config, 300.0).targets.is_empty());
    }

    #[test]
    fn test_row_count_matches_floor() {
        // rows at 1500, 2500 .. 19500; the next would overrun 20000
        assert_eq!(CourseConfig::default().row_count(), 19);
        assert!(CourseConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_unbounded_layouts() {
        let huge_floor = CourseConfig {
            floor_length: 1e30,
            ..Default::default()
        };
        assert!(matches!(
            huge_floor.validate(),
            Err(RailError::InvalidConfig { field: "course.row_spacing", .. })
        ));

        let tiny_spacing = CourseConfig {
            row_spacing: 1e-5,
            ..Default::default()
        };
        assert!(tiny_spacing.validate().is_err());

        let nan_first = CourseConfig {
            first_row: f32::NAN,
            ..Default::default()
        };
        assert!(nan_first.validate().is_err());
    }

    #[test]
    fn test_generate_caps_rows_without_validation() {
        let config = CourseConfig {
            floor_length: 1e30,
            target_density: 1.0,
            ..Default::default()
        };
        assert_eq!(config.row_count(), MAX_COURSE_ROWS);
        let course = Course::generate(&config, 300.0);
        assert_eq!(course.targets.len(), 3 * MAX_COURSE_ROWS as usize);
    }

    #[test]
    fn test_subnormal_spacing_does_not_panic() {
        // jitter rounds to zero at the smallest subnormal spacing
        let config = CourseConfig {
            floor_length: 1e-40,
            first_row: 0.0,
            row_spacing: f32::from_bits(1),
            target_density: 1.0,
            target_size: [0.0, 1.0, 1.0],
            ..Default::default()
        };
        let course = Course::generate(&config, 300.0);
        assert!(course.targets.iter().all(|t| t.min[0].is_finite()));
    }

    #[test]
    fn test_zero_spacing_terminates() {
        let config = CourseConfig {
            row_spacing: 0.0,
            ..Default::default()
        };
        assert!(Course::generate(&config, 300.0).targets.is_empty());
    }
}
