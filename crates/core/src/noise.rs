//! 2D gradient noise for procedural tree placement
//!
//! Perlin-style lattice noise with quintic fade, summed over octaves.
//! Only used to seed the initial forest; fire dynamics never touch it.

use std::f32::consts::FRAC_1_SQRT_2;

const LATTICE: usize = 256;

const GRADIENTS: [(f32, f32); 8] = [
    (1.0, 0.0),
    (FRAC_1_SQRT_2, FRAC_1_SQRT_2),
    (0.0, 1.0),
    (-FRAC_1_SQRT_2, FRAC_1_SQRT_2),
    (-1.0, 0.0),
    (-FRAC_1_SQRT_2, -FRAC_1_SQRT_2),
    (0.0, -1.0),
    (FRAC_1_SQRT_2, -FRAC_1_SQRT_2),
];

/// One frequency band of the noise sum
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Octave {
    pub frequency: f32,
    pub amplitude: f32,
}

impl Octave {
    pub const fn new(frequency: f32, amplitude: f32) -> Self {
        Self {
            frequency,
            amplitude,
        }
    }
}

/// Seeded multi-octave gradient noise.
#[derive(Debug, Clone)]
pub struct GradientNoise {
    seed: u64,
    octaves: Vec<Octave>,
    /// Permutation doubled so lookups never wrap
    perm: Vec<u8>,
}

impl GradientNoise {
    /// Single octave at unit frequency
    pub fn new(seed: u64) -> Self {
        Self::with_octaves(seed, vec![Octave::new(1.0, 1.0)])
    }

    pub fn with_octaves(seed: u64, octaves: Vec<Octave>) -> Self {
        Self {
            seed,
            octaves,
            perm: permutation(seed),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Noise in `[-1, 1]`, normalised by total amplitude
    pub fn sample(&self, x: f32, y: f32) -> f32 {
        let mut total = 0.0_f32;
        let mut amplitude_sum = 0.0_f32;
        for octave in &self.octaves {
            total += self.lattice_noise(x * octave.frequency, y * octave.frequency)
                * octave.amplitude;
            amplitude_sum += octave.amplitude;
        }

        if amplitude_sum > 0.0 {
            (total / amplitude_sum).clamp(-1.0, 1.0)
        } else {
            0.0
        }
    }

    /// Noise remapped to `[0, 1]`
    pub fn sample_unit(&self, x: f32, y: f32) -> f32 {
        (self.sample(x, y) + 1.0) * 0.5
    }

    fn lattice_noise(&self, x: f32, y: f32) -> f32 {
        let (xf, yf) = (x.floor(), y.floor());
        let (x0, y0) = (xf as i32, yf as i32);
        let (fx, fy) = (x - xf, y - yf);

        let n00 = self.corner(x0, y0, fx, fy);
        let n10 = self.corner(x0 + 1, y0, fx - 1.0, fy);
        let n01 = self.corner(x0, y0 + 1, fx, fy - 1.0);
        let n11 = self.corner(x0 + 1, y0 + 1, fx - 1.0, fy - 1.0);

        let (sx, sy) = (fade(fx), fade(fy));
        let bottom = lerp(n00, n10, sx);
        let top = lerp(n01, n11, sx);
        lerp(bottom, top, sy)
    }

    fn corner(&self, ix: i32, iy: i32, dx: f32, dy: f32) -> f32 {
        let px = (ix & 0xFF) as usize;
        let py = (iy & 0xFF) as usize;
        let index = self.perm[usize::from(self.perm[px]) + py] & 0x07;
        let (gx, gy) = GRADIENTS[usize::from(index)];
        gx * dx + gy * dy
    }
}

/// Fisher-Yates shuffle driven by a MINSTD generator.
fn permutation(seed: u64) -> Vec<u8> {
    let mut perm: Vec<u8> = (0..=255).collect();
    // MINSTD state must be non-zero
    let mut state = seed % 2_147_483_647;
    if state == 0 {
        state = 1;
    }
    for i in (1..LATTICE).rev() {
        state = state.wrapping_mul(48_271) % 2_147_483_647;
        let j = (state as usize) % (i + 1);
        perm.swap(i, j);
    }
    let mut doubled = perm.clone();
    doubled.extend_from_slice(&perm);
    doubled
}

#[inline]
fn fade(t: f32) -> f32 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + t * (b - a)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range() {
        let noise = GradientNoise::new(12345);
        for i in 0..1000 {
            let (x, y) = (i as f32 * 0.37, i as f32 * 0.71);
            let value = noise.sample(x, y);
            assert!((-1.0..=1.0).contains(&value), "{value} at ({x}, {y})");
            assert!((0.0..=1.0).contains(&noise.sample_unit(x, y)));
        }
    }

    #[test]
    fn test_lattice_points_are_zero() {
        let noise = GradientNoise::new(3);
        assert_eq!(noise.sample(4.0, 9.0), 0.0);
        assert_eq!(noise.sample_unit(4.0, 9.0), 0.5);
    }

    #[test]
    fn test_deterministic_per_seed() {
        let a = GradientNoise::new(99);
        let b = GradientNoise::new(99);
        let c = GradientNoise::new(100);
        let mut differs = false;
        for i in 0..100 {
            let (x, y) = (i as f32 * 1.37 + 0.5, i as f32 * 0.93 + 0.25);
            assert_eq!(a.sample(x, y), b.sample(x, y));
            differs |= a.sample(x, y) != c.sample(x, y);
        }
        assert!(differs, "different seeds should give different noise");
    }

    #[test]
    fn test_continuity() {
        let noise = GradientNoise::new(7);
        let here = noise.sample(10.3, 20.6);
        let near = noise.sample(10.31, 20.61);
        assert!((here - near).abs() < 0.1);
    }

    #[test]
    fn test_empty_octaves() {
        let noise = GradientNoise::with_octaves(1, Vec::new());
        assert_eq!(noise.sample(0.3, 0.4), 0.0);
    }
}
