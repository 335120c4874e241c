//! Terrain collaborators
//!
//! The forest does not model terrain itself. It asks a [`DensityField`] where
//! trees should grow when regenerating, and a [`HeightField`] how high the
//! ground is when reporting where smoke should spawn.

use crate::noise::GradientNoise;
use serde::{Deserialize, Serialize};

/// Tree density score used by forest regeneration.
pub trait DensityField {
    /// Density at a world position given the regeneration offsets.
    /// Cells scoring above the configured threshold start as living trees.
    fn density(&self, offset_x: f32, offset_y: f32, world_x: f32, world_z: f32) -> f32;
}

/// Ground elevation lookup.
pub trait HeightField {
    fn height(&self, world_x: f32, world_z: f32) -> f32;
}

impl<F> HeightField for F
where
    F: Fn(f32, f32) -> f32,
{
    fn height(&self, world_x: f32, world_z: f32) -> f32 {
        self(world_x, world_z)
    }
}

/// Noise-driven density: `tree_density * noise(offset + position * scale)`
/// with noise in `[0, 1]`.
#[derive(Debug, Clone)]
pub struct NoiseDensity {
    noise: GradientNoise,
    /// World-to-noise coordinate scale
    pub scale: f32,
    /// Peak density score
    pub tree_density: f32,
}

impl NoiseDensity {
    pub fn new(seed: u64) -> Self {
        Self {
            noise: GradientNoise::new(seed),
            scale: 0.2,
            tree_density: 10.0,
        }
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_tree_density(mut self, tree_density: f32) -> Self {
        self.tree_density = tree_density;
        self
    }
}

impl Default for NoiseDensity {
    fn default() -> Self {
        Self::new(0)
    }
}

impl DensityField for NoiseDensity {
    fn density(&self, offset_x: f32, offset_y: f32, world_x: f32, world_z: f32) -> f32 {
        self.tree_density
            * self.noise.sample_unit(
                offset_x + world_x * self.scale,
                offset_y + world_z * self.scale,
            )
    }
}

/// Same density everywhere
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UniformDensity(pub f32);

impl DensityField for UniformDensity {
    fn density(&self, _offset_x: f32, _offset_y: f32, _world_x: f32, _world_z: f32) -> f32 {
        self.0
    }
}

/// Level ground
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FlatTerrain {
    pub elevation: f32,
}

impl FlatTerrain {
    pub fn new(elevation: f32) -> Self {
        Self { elevation }
    }
}

impl HeightField for FlatTerrain {
    fn height(&self, _world_x: f32, _world_z: f32) -> f32 {
        self.elevation
    }
}

/// Regular grid of elevation samples with bilinear lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeightMap {
    width: f32,
    depth: f32,
    /// Sample spacing along X and Z
    spacing: (f32, f32),
    nx: usize,
    nz: usize,
    /// Row-major: `[iz * nx + ix]`
    elevations: Vec<f32>,
}

impl HeightMap {
    /// Wrap `nx × nz` samples spanning `width × depth` world units.
    ///
    /// Returns `None` when the sample count does not match or fewer than two
    /// samples exist along an axis.
    pub fn from_samples(
        width: f32,
        depth: f32,
        nx: usize,
        nz: usize,
        elevations: Vec<f32>,
    ) -> Option<Self> {
        if nx < 2 || nz < 2 || nx.checked_mul(nz)? != elevations.len() {
            return None;
        }
        if !(width.is_finite() && width > 0.0 && depth.is_finite() && depth > 0.0) {
            return None;
        }
        Some(Self {
            width,
            depth,
            spacing: (width / (nx - 1) as f32, depth / (nz - 1) as f32),
            nx,
            nz,
            elevations,
        })
    }

    /// Gaussian hill centred on the map
    pub fn single_hill(
        width: f32,
        depth: f32,
        resolution: f32,
        base: f32,
        hill_height: f32,
        hill_radius: f32,
    ) -> Self {
        let nx = (width / resolution).ceil() as usize + 1;
        let nz = (depth / resolution).ceil() as usize + 1;
        let (cx, cz) = (width / 2.0, depth / 2.0);

        let mut elevations = Vec::with_capacity(nx * nz);
        for iz in 0..nz {
            for ix in 0..nx {
                let dx = ix as f32 * resolution - cx;
                let dz = iz as f32 * resolution - cz;
                let falloff = (-(dx * dx + dz * dz) / (hill_radius * hill_radius)).exp();
                elevations.push(base + hill_height * falloff);
            }
        }

        Self {
            width,
            depth,
            spacing: (resolution, resolution),
            nx,
            nz,
            elevations,
        }
    }
}

impl HeightField for HeightMap {
    fn height(&self, world_x: f32, world_z: f32) -> f32 {
        let gx = world_x.clamp(0.0, self.width) / self.spacing.0;
        let gz = world_z.clamp(0.0, self.depth) / self.spacing.1;

        let ix0 = (gx.floor() as usize).min(self.nx - 2);
        let iz0 = (gz.floor() as usize).min(self.nz - 2);
        let fx = gx - ix0 as f32;
        let fz = gz - iz0 as f32;

        let at = |ix: usize, iz: usize| self.elevations[iz * self.nx + ix];
        let near = at(ix0, iz0) * (1.0 - fx) + at(ix0 + 1, iz0) * fx;
        let far = at(ix0, iz0 + 1) * (1.0 - fx) + at(ix0 + 1, iz0 + 1) * fx;
        near * (1.0 - fz) + far * fz
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_heightmap_bilinear() {
        let map = HeightMap::from_samples(10.0, 10.0, 2, 2, vec![0.0, 10.0, 20.0, 30.0])
            .expect("valid samples");
        assert_relative_eq!(map.height(0.0, 0.0), 0.0);
        assert_relative_eq!(map.height(10.0, 0.0), 10.0);
        assert_relative_eq!(map.height(0.0, 10.0), 20.0);
        assert_relative_eq!(map.height(5.0, 5.0), 15.0);
        // Clamped outside the map
        assert_relative_eq!(map.height(-5.0, 50.0), 20.0);
    }

    #[test]
    fn test_heightmap_rejects_bad_input() {
        assert!(HeightMap::from_samples(10.0, 10.0, 2, 2, vec![0.0; 3]).is_none());
        assert!(HeightMap::from_samples(10.0, 10.0, 1, 4, vec![0.0; 4]).is_none());
        assert!(HeightMap::from_samples(-1.0, 10.0, 2, 2, vec![0.0; 4]).is_none());
    }

    #[test]
    fn test_heightmap_rectangular_spacing() {
        // 3 samples over 20 units along X, 2 over 4 units along Z
        let map = HeightMap::from_samples(20.0, 4.0, 3, 2, vec![0.0, 1.0, 2.0, 4.0, 5.0, 6.0])
            .expect("valid samples");
        assert_relative_eq!(map.height(10.0, 0.0), 1.0);
        assert_relative_eq!(map.height(0.0, 4.0), 4.0);
        assert_relative_eq!(map.height(15.0, 2.0), 3.5);
    }

    #[test]
    fn test_single_hill_peaks_in_centre() {
        let map = HeightMap::single_hill(100.0, 100.0, 5.0, 10.0, 50.0, 20.0);
        let peak = map.height(50.0, 50.0);
        assert_relative_eq!(peak, 60.0, epsilon = 1e-3);
        assert!(map.height(0.0, 0.0) < peak);
    }

    #[test]
    fn test_noise_density_bounds() {
        let density = NoiseDensity::new(5);
        for i in 0..200 {
            let value = density.density(4894.98, 6548.8, i as f32 * 0.7, i as f32 * 1.3);
            assert!((0.0..=10.0).contains(&value));
        }
    }

    #[test]
    fn test_closure_height_field() {
        let slope = |x: f32, z: f32| x + 2.0 * z;
        assert_eq!(slope.height(1.0, 2.0), 5.0);
        assert_eq!(FlatTerrain::new(3.5).height(100.0, -4.0), 3.5);
    }
}
