//! Error types surfaced by the forest API

use std::fmt;

/// Rejected configuration, reported at construction time
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A per-tick probability lies outside `[0, 1]`
    ProbabilityOutOfRange { name: &'static str, value: f32 },
    /// A scalar parameter is NaN or infinite
    NonFinite { name: &'static str, value: f32 },
    /// A size or count parameter is zero
    ZeroDimension { name: &'static str },
    /// Tile side is too large for local cell coordinates
    TileTooLarge { size: usize },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ProbabilityOutOfRange { name, value } => {
                write!(f, "{name} must lie in [0, 1], got {value}")
            }
            ConfigError::NonFinite { name, value } => {
                write!(f, "{name} must be finite, got {value}")
            }
            ConfigError::ZeroDimension { name } => write!(f, "{name} must be positive"),
            ConfigError::TileTooLarge { size } => {
                write!(f, "tile_size {size} exceeds the supported maximum")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Errors returned by forest operations
#[derive(Debug, Clone, PartialEq)]
pub enum ForestError {
    /// World coordinate maps outside the tile grid
    OutOfRange { x: f32, z: f32 },
    /// Tile index outside `[0, width) × [0, height)`
    TileOutOfRange { tile_x: i64, tile_y: i64 },
    /// Local cell index outside `[0, tile_size)²`
    CellOutOfRange { x: i64, y: i64 },
    /// Invalid configuration
    Config(ConfigError),
}

impl fmt::Display for ForestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ForestError::OutOfRange { x, z } => {
                write!(f, "world position ({x}, {z}) lies outside the forest")
            }
            ForestError::TileOutOfRange { tile_x, tile_y } => {
                write!(f, "tile ({tile_x}, {tile_y}) lies outside the forest")
            }
            ForestError::CellOutOfRange { x, y } => {
                write!(f, "cell ({x}, {y}) lies outside the tile")
            }
            ForestError::Config(err) => write!(f, "invalid configuration: {err}"),
        }
    }
}

impl std::error::Error for ForestError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ForestError::Config(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ConfigError> for ForestError {
    fn from(err: ConfigError) -> Self {
        ForestError::Config(err)
    }
}

pub type ForestResult<T> = Result<T, ForestError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_display_messages() {
        let err = ForestError::OutOfRange { x: -1.5, z: 3.0 };
        assert_eq!(err.to_string(), "world position (-1.5, 3) lies outside the forest");

        let err: ForestError = ConfigError::ProbabilityOutOfRange {
            name: "burn_speed",
            value: 1.5,
        }
        .into();
        assert_eq!(
            err.to_string(),
            "invalid configuration: burn_speed must lie in [0, 1], got 1.5"
        );
        assert!(err.source().is_some());
    }
}
