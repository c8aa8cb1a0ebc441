//! Injectable randomness.
//!
//! The engine never reaches for a global RNG. Everything random goes
//! through a `RandomSource`, so tests can script exact rolls while the
//! game itself runs on a real `rand` generator.

use rand::Rng;

pub trait RandomSource {
    /// Uniform draw in `[0, 1)`.
    fn next_unit(&mut self) -> f64;

    /// `base + floor(r * span)`, i.e. uniform over `base..base + span`.
    fn roll(&mut self, base: u32, span: u32) -> u32 {
        base + (self.next_unit() * span as f64).floor() as u32
    }

    /// Symmetric spread `(r - 0.5) * magnitude`.
    fn spread(&mut self, magnitude: f64) -> f64 {
        (self.next_unit() - 0.5) * magnitude
    }

    /// `base + r * span` as a float.
    fn between(&mut self, base: f64, span: f64) -> f64 {
        base + self.next_unit() * span
    }

    /// Uniform index into a collection of `len` items (`len > 0`).
    fn pick(&mut self, len: usize) -> usize {
        ((self.next_unit() * len as f64).floor() as usize).min(len.saturating_sub(1))
    }
}

/// Adapter from any `rand` generator.
pub struct RngSource<R: Rng>(pub R);

impl<R: Rng> RandomSource for RngSource<R> {
    fn next_unit(&mut self) -> f64 {
        self.0.gen::<f64>()
    }
}
