//! Forest configuration
//!
//! Defaults reproduce the classic 6×6 layout of 60×60-cell tiles.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Largest supported tile side
pub const MAX_TILE_SIZE: usize = u16::MAX as usize;

/// Static simulation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestConfig {
    /// Side length `S` of every tile, in cells (one cell per world unit)
    pub tile_size: usize,
    /// Number of tiles along world X (`W`), also the number of scheduler rows
    pub width: usize,
    /// Number of tiles along world Z (`H`)
    pub height: usize,
    /// Per-tick probability that a living tree samples its neighbours for heat
    pub fire_spread_speed: f32,
    /// Per-tick probability that a burning tree advances one step
    pub burn_speed: f32,
    /// Scales wind speed when building the neighbour weight matrix
    pub wind_multiplier: f32,
    /// Tile rows ticked per scheduling step
    pub rows_per_step: usize,
    /// Attempts made by `random_ignite` before giving up on a tile
    pub random_ignite_attempts: usize,
    /// Density score above which a regenerated cell starts as a tree
    pub tree_threshold: f32,
    /// Smoke particles requested for each fully burned cell
    pub smoke_spawn_count: u32,
    /// Seed of the visual variant hash
    pub variant_seed: u32,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            tile_size: 60,
            width: 6,
            height: 6,
            fire_spread_speed: 0.6,
            burn_speed: 0.6,
            wind_multiplier: 1.0,
            rows_per_step: 2,
            random_ignite_attempts: 150,
            tree_threshold: 3.0,
            smoke_spawn_count: 5,
            variant_seed: 0,
        }
    }
}

impl ForestConfig {
    /// Grid of `width × height` tiles of side `tile_size`, other fields default
    pub fn with_dimensions(tile_size: usize, width: usize, height: usize) -> Self {
        Self {
            tile_size,
            width,
            height,
            ..Self::default()
        }
    }

    pub fn with_fire_spread_speed(mut self, value: f32) -> Self {
        self.fire_spread_speed = value;
        self
    }

    pub fn with_burn_speed(mut self, value: f32) -> Self {
        self.burn_speed = value;
        self
    }

    pub fn with_wind_multiplier(mut self, value: f32) -> Self {
        self.wind_multiplier = value;
        self
    }

    pub fn with_rows_per_step(mut self, value: usize) -> Self {
        self.rows_per_step = value;
        self
    }

    /// World extent along X
    pub fn world_width(&self) -> f32 {
        (self.width * self.tile_size) as f32
    }

    /// World extent along Z
    pub fn world_depth(&self) -> f32 {
        (self.height * self.tile_size) as f32
    }

    /// Check every parameter; the first offending one is reported.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("tile_size", self.tile_size),
            ("width", self.width),
            ("height", self.height),
            ("rows_per_step", self.rows_per_step),
        ] {
            if value == 0 {
                return Err(ConfigError::ZeroDimension { name });
            }
        }
        if self.tile_size > MAX_TILE_SIZE {
            return Err(ConfigError::TileTooLarge {
                size: self.tile_size,
            });
        }

        for (name, value) in [
            ("fire_spread_speed", self.fire_spread_speed),
            ("burn_speed", self.burn_speed),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite { name, value });
            }
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::ProbabilityOutOfRange { name, value });
            }
        }

        for (name, value) in [
            ("wind_multiplier", self.wind_multiplier),
            ("tree_threshold", self.tree_threshold),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite { name, value });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = ForestConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.world_width(), 360.0);
        assert_eq!(config.world_depth(), 360.0);
    }

    #[test]
    fn test_rejects_bad_probabilities() {
        let config = ForestConfig::default().with_burn_speed(1.2);
        assert_eq!(
            config.validate(),
            Err(ConfigError::ProbabilityOutOfRange {
                name: "burn_speed",
                value: 1.2
            })
        );

        let config = ForestConfig::default().with_fire_spread_speed(f32::NAN);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonFinite {
                name: "fire_spread_speed",
                ..
            })
        ));

        let config = ForestConfig::default().with_fire_spread_speed(-0.1);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_dimensions() {
        let config = ForestConfig::with_dimensions(0, 2, 2);
        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroDimension { name: "tile_size" })
        );

        let config = ForestConfig::default().with_rows_per_step(0);
        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroDimension {
                name: "rows_per_step"
            })
        );
    }

    #[test]
    fn test_rejects_non_finite_multiplier() {
        let config = ForestConfig::default().with_wind_multiplier(f32::INFINITY);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonFinite {
                name: "wind_multiplier",
                ..
            })
        ));
    }

    #[test]
    fn test_probability_bounds_inclusive() {
        let config = ForestConfig::with_dimensions(4, 2, 2)
            .with_fire_spread_speed(1.0)
            .with_burn_speed(0.0);
        assert!(config.validate().is_ok());
    }
}
