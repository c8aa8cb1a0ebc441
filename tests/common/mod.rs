#![allow(dead_code)]

use rand::rngs::StdRng;
use rand::SeedableRng;

use storm_arena::display::Surface;
use storm_arena::engine::BattleEngine;
use storm_arena::random::{RandomSource, RngSource};

/// Replays fixed draws, then keeps returning 0.0 (minimum rolls).
pub struct Scripted {
    values: Vec<f64>,
    next: usize,
}

impl Scripted {
    pub fn new(values: &[f64]) -> Self {
        Self { values: values.to_vec(), next: 0 }
    }

    pub fn zeros() -> Self {
        Self::new(&[])
    }
}

impl RandomSource for Scripted {
    fn next_unit(&mut self) -> f64 {
        let v = self.values.get(self.next).copied().unwrap_or(0.0);
        self.next += 1;
        v
    }
}

pub fn seeded(seed: u64) -> RngSource<StdRng> {
    RngSource(StdRng::seed_from_u64(seed))
}

pub fn surface() -> Option<Surface> {
    Surface::new(80, 24)
}

/// Engine on an 80x24 surface with scripted game rolls.
pub fn engine_with_rolls(rolls: &[f64]) -> BattleEngine {
    BattleEngine::mount(surface(), Box::new(Scripted::new(rolls)), Box::new(seeded(7)))
}
