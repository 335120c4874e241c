//! Wind model
//!
//! Converts a scalar wind speed and a bearing into the 3×3 neighbour weight
//! matrix consumed by the tile automaton. Without wind, axis neighbours weigh
//! `1.0` and diagonal neighbours `0.5` since they sit farther away.
//!
//! The bearing is the direction the wind blows *from*. A burning neighbour lying
//! in that direction is upwind of the cell and pushes fire onto it harder;
//! a burning neighbour on the opposite side contributes less, down to zero.

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

/// Weight of an axis-aligned neighbour with no wind
pub const AXIS_WEIGHT: f32 = 1.0;
/// Weight of a diagonal neighbour with no wind
pub const DIAGONAL_WEIGHT: f32 = 0.5;

/// The eight relative neighbour offsets, axis neighbours first.
pub const NEIGHBOR_OFFSETS: [(i32, i32); 8] = [
    (-1, 0),
    (1, 0),
    (0, -1),
    (0, 1),
    (-1, -1),
    (-1, 1),
    (1, -1),
    (1, 1),
];

/// Non-negative weights indexed by relative direction `(dx, dy) ∈ {-1, 0, 1}²`.
///
/// Stored as `weights[dx + 1][dy + 1]`. The centre entry is never read.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindMatrix {
    weights: [[f32; 3]; 3],
}

impl WindMatrix {
    /// Matrix describing spread with no wind
    pub fn calm() -> Self {
        let mut weights = [[0.0; 3]; 3];
        for (i, row) in weights.iter_mut().enumerate() {
            for (j, weight) in row.iter_mut().enumerate() {
                *weight = base_weight(i as i32 - 1, j as i32 - 1);
            }
        }
        Self { weights }
    }

    /// Build from raw weights. Negative and non-finite entries are clamped to zero.
    pub fn from_weights(weights: [[f32; 3]; 3]) -> Self {
        let mut clamped = weights;
        for row in &mut clamped {
            for weight in row.iter_mut() {
                if !weight.is_finite() || *weight < 0.0 {
                    *weight = 0.0;
                }
            }
        }
        Self { weights: clamped }
    }

    /// Weight for the neighbour at relative offset `(dx, dy)`
    #[inline]
    pub fn weight(&self, dx: i32, dy: i32) -> f32 {
        debug_assert!((-1..=1).contains(&dx) && (-1..=1).contains(&dy));
        self.weights[(dx + 1) as usize][(dy + 1) as usize]
    }

    /// Raw weight table, `[dx + 1][dy + 1]`
    pub fn weights(&self) -> &[[f32; 3]; 3] {
        &self.weights
    }
}

impl Default for WindMatrix {
    fn default() -> Self {
        Self::calm()
    }
}

/// Calm-air weight for a relative direction (centre is zero)
fn base_weight(dx: i32, dy: i32) -> f32 {
    match (dx, dy) {
        (0, 0) => 0.0,
        (0, _) | (_, 0) => AXIS_WEIGHT,
        _ => DIAGONAL_WEIGHT,
    }
}

/// Produces wind matrices from speed and bearing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindModel {
    /// Scales how strongly wind speed biases the calm weights
    pub multiplier: f32,
}

impl WindModel {
    pub fn new(multiplier: f32) -> Self {
        Self { multiplier }
    }

    /// Compute the weight matrix for `speed` and bearing `angle` (radians).
    ///
    /// `weight(dx, dy) = base(dx, dy) + multiplier * speed * dot(normalize(dx, dy), v)`
    /// with `v = (cos angle, sin angle)`, clamped at zero.
    pub fn matrix(&self, speed: f32, angle: f32) -> WindMatrix {
        let wind = Vector2::new(angle.cos(), angle.sin());
        let strength = self.multiplier * speed;

        let mut weights = [[0.0; 3]; 3];
        for (i, row) in weights.iter_mut().enumerate() {
            for (j, weight) in row.iter_mut().enumerate() {
                let (dx, dy) = (i as i32 - 1, j as i32 - 1);
                if dx == 0 && dy == 0 {
                    continue;
                }
                let direction = Vector2::new(dx as f32, dy as f32).normalize();
                *weight = (base_weight(dx, dy) + strength * direction.dot(&wind)).max(0.0);
            }
        }

        WindMatrix { weights }
    }
}

impl Default for WindModel {
    fn default() -> Self {
        Self::new(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::{FRAC_1_SQRT_2, PI};

    #[test]
    fn test_calm_matrix() {
        let calm = WindMatrix::calm();
        for (dx, dy) in NEIGHBOR_OFFSETS {
            let expected = if dx == 0 || dy == 0 { 1.0 } else { 0.5 };
            assert_eq!(calm.weight(dx, dy), expected);
        }
    }

    #[test]
    fn test_zero_speed_matches_calm() {
        let model = WindModel::new(3.0);
        assert_eq!(model.matrix(0.0, 1.234), WindMatrix::calm());
    }

    #[test]
    fn test_wind_biases_toward_bearing() {
        // Bearing 0 points along +x
        let matrix = WindModel::new(1.0).matrix(0.5, 0.0);

        assert_relative_eq!(matrix.weight(1, 0), 1.5, epsilon = 1e-6);
        assert_relative_eq!(matrix.weight(-1, 0), 0.5, epsilon = 1e-6);
        assert_relative_eq!(matrix.weight(0, 1), 1.0, epsilon = 1e-6);
        assert_relative_eq!(
            matrix.weight(1, 1),
            0.5 + 0.5 * FRAC_1_SQRT_2,
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_weights_clamped_non_negative() {
        let matrix = WindModel::new(2.0).matrix(10.0, PI / 2.0);
        for (dx, dy) in NEIGHBOR_OFFSETS {
            assert!(matrix.weight(dx, dy) >= 0.0);
        }
        assert_eq!(matrix.weight(0, -1), 0.0);
        assert_relative_eq!(matrix.weight(0, 1), 21.0, epsilon = 1e-4);
    }

    #[test]
    fn test_from_weights_clamps() {
        let matrix = WindMatrix::from_weights([[-1.0, 2.0, f32::NAN], [0.0; 3], [0.5; 3]]);
        assert_eq!(matrix.weight(-1, -1), 0.0);
        assert_eq!(matrix.weight(-1, 0), 2.0);
        assert_eq!(matrix.weight(-1, 1), 0.0);
        assert_eq!(matrix.weight(1, 1), 0.5);
    }
}
