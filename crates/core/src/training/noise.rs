use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of the random perturbation added to each step's loss.
pub trait NoiseSource: Send {
    fn sample(&mut self) -> f64;
}

/// Uniform noise in `[-amplitude, amplitude]`.
#[derive(Debug, Clone)]
pub struct UniformNoise {
    rng: StdRng,
    amplitude: f64,
}

impl UniformNoise {
    /// Entropy-seeded noise; every run differs.
    pub fn new(amplitude: f64) -> Self {
        Self {
            rng: StdRng::from_entropy(),
            amplitude: amplitude.abs(),
        }
    }

    /// Reproducible noise for a given seed.
    pub fn seeded(amplitude: f64, seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            amplitude: amplitude.abs(),
        }
    }

    pub fn amplitude(&self) -> f64 {
        self.amplitude
    }
}

impl NoiseSource for UniformNoise {
    fn sample(&mut self) -> f64 {
        if self.amplitude == 0.0 {
            return 0.0;
        }
        self.rng.gen_range(-self.amplitude..=self.amplitude)
    }
}

/// Always returns the same value.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedNoise(pub f64);

impl NoiseSource for FixedNoise {
    fn sample(&mut self) -> f64 {
        self.0
    }
}

/// Cycles through a fixed list of values. An empty list yields `0.0`.
#[derive(Debug, Clone, Default)]
pub struct SequenceNoise {
    values: Vec<f64>,
    next: usize,
}

impl SequenceNoise {
    pub fn new(values: Vec<f64>) -> Self {
        Self { values, next: 0 }
    }
}

impl NoiseSource for SequenceNoise {
    fn sample(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let value = self.values[self.next % self.values.len()];
        self.next += 1;
        value
    }
}
