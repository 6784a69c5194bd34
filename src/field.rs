//! Continuous environmental fields consulted during generation.
//!
//! A [`ScalarField`] is a pure function of position. The generator only relies on the
//! [`ScalarField::sample`] contract, so any deterministic source works: the bundled noise
//! fields, a [`Constant`], or a plain closure.

use fastnoise_lite::{FastNoiseLite, FractalType, NoiseType};
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Population density above which a grid point becomes a highway target.
pub const CENTER_DENSITY: f32 = 0.7;

/// Population density above which an intersection stub is built.
pub const STUB_DENSITY: f32 = 0.25;

/// Population density below which a proposed road ends its branch.
pub const ROAD_DENSITY: f32 = 0.2;

/// A deterministic scalar function over the plane.
pub trait ScalarField {
    fn sample(&self, point: Vec2) -> f32;
}

impl<F> ScalarField for F
where
    F: Fn(Vec2) -> f32,
{
    fn sample(&self, point: Vec2) -> f32 {
        self(point)
    }
}

/// A field with the same value everywhere.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Constant(pub f32);

impl ScalarField for Constant {
    fn sample(&self, _point: Vec2) -> f32 {
        self.0
    }
}

/// Parameters for a fractal-Brownian value-noise field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseSettings {
    pub seed: i32,
    /// Base frequency applied to world coordinates.
    pub frequency: f32,
    pub octaves: i32,
    pub lacunarity: f32,
    /// Amplitude multiplier between octaves.
    pub gain: f32,
    /// Added to the query point before sampling, decorrelating fields that share a seed.
    pub offset: Vec2,
}

impl Default for NoiseSettings {
    fn default() -> Self {
        Self {
            seed: 1337,
            frequency: 1.0,
            octaves: 8,
            lacunarity: 1.9,
            gain: 0.55,
            offset: Vec2::ZERO,
        }
    }
}

/// Normalized fBm noise shared by the terrain and population fields.
struct FractalNoise {
    noise: FastNoiseLite,
    offset: Vec2,
}

impl FractalNoise {
    fn new(settings: &NoiseSettings) -> Self {
        let mut noise = FastNoiseLite::with_seed(settings.seed);
        noise.set_noise_type(Some(NoiseType::Value));
        noise.set_frequency(Some(settings.frequency));
        noise.set_fractal_type(Some(FractalType::FBm));
        noise.set_fractal_octaves(Some(settings.octaves));
        noise.set_fractal_lacunarity(Some(settings.lacunarity));
        noise.set_fractal_gain(Some(settings.gain));
        Self {
            noise,
            offset: settings.offset,
        }
    }

    fn sample(&self, point: Vec2) -> f32 {
        let p = point + self.offset;
        let raw = self.noise.get_noise_2d(p.x, p.y);
        // fBm output is in [-1, 1]; the thresholds expect [0, 1]
        ((raw + 1.0) * 0.5).clamp(0.0, 1.0)
    }
}

/// Terrain elevation in `[0, 1]`. Points below the configured sea level are water.
pub struct Terrain {
    inner: FractalNoise,
}

impl Terrain {
    pub fn new(settings: &NoiseSettings) -> Self {
        Self {
            inner: FractalNoise::new(settings),
        }
    }
}

impl Default for Terrain {
    fn default() -> Self {
        Self::new(&NoiseSettings {
            frequency: 2.0,
            offset: Vec2::new(33.33, 67.0),
            ..Default::default()
        })
    }
}

impl ScalarField for Terrain {
    fn sample(&self, point: Vec2) -> f32 {
        self.inner.sample(point)
    }
}

/// Population density in `[0, 1]`.
pub struct Population {
    inner: FractalNoise,
}

impl Population {
    pub fn new(settings: &NoiseSettings) -> Self {
        Self {
            inner: FractalNoise::new(settings),
        }
    }
}

impl Default for Population {
    fn default() -> Self {
        Self::new(&NoiseSettings {
            seed: 7919,
            frequency: 3.0,
            offset: Vec2::new(-12.5, 41.0),
            ..Default::default()
        })
    }
}

impl ScalarField for Population {
    fn sample(&self, point: Vec2) -> f32 {
        self.inner.sample(point)
    }
}
