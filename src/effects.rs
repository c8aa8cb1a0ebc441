//! Transient visual entities: spawning and per-frame advance.
//!
//! The choreographer calls the `spawn_*` / `trigger_shake` helpers as side
//! effects of a step. After that only `advance` touches these entities,
//! once per render tick.

use crate::entities::{
    CameraShake, DamageNumber, Effects, Hsl, Particle, ParticleKind, SpeedLine, Vec2,
};
use crate::random::RandomSource;

// ── Tuning ───────────────────────────────────────────────────────────────────

/// Added to a dust particle's vertical velocity every tick.
pub const GRAVITY: f64 = 0.2;
/// Spawn jitter around the requested origin, on each axis.
pub const SPAWN_JITTER: f64 = 20.0;

pub const DAMAGE_NUMBER_LIFE: u32 = 60;
/// Upward drift per tick.
pub const DAMAGE_NUMBER_RISE: f64 = 2.0;

pub const SPEED_LINES_PER_BURST: usize = 15;
pub const SPEED_LINE_WINDOW_MS: u64 = 300;
const SPEED_LINE_SCATTER: f64 = 400.0;
const SPEED_LINE_ANGLE_SPREAD: f64 = 0.3;

// ── Spawners ─────────────────────────────────────────────────────────────────

pub fn spawn_particles(
    effects: &mut Effects,
    at: Vec2,
    kind: ParticleKind,
    count: usize,
    rng: &mut dyn RandomSource,
) {
    effects
        .particles
        .extend((0..count).map(|_| make_particle(at, kind, rng)));
}

fn make_particle(at: Vec2, kind: ParticleKind, rng: &mut dyn RandomSource) -> Particle {
    let (color, velocity, size, life) = match kind {
        ParticleKind::Energy => (
            Hsl::new(rng.between(200.0, 20.0), 95.0, rng.between(60.0, 20.0)),
            Vec2::new(rng.spread(8.0), rng.spread(8.0)),
            rng.between(3.0, 4.0),
            rng.between(30.0, 20.0),
        ),
        ParticleKind::Dust => (
            Hsl::new(0.0, 0.0, rng.between(70.0, 20.0)),
            // Dust kicks up before gravity pulls it back down.
            Vec2::new(rng.spread(4.0), rng.spread(4.0) - 2.0),
            rng.between(2.0, 3.0),
            rng.between(20.0, 15.0),
        ),
        ParticleKind::Lightning => (
            Hsl::new(rng.between(220.0, 20.0), 100.0, rng.between(80.0, 15.0)),
            Vec2::new(rng.spread(12.0), rng.spread(12.0)),
            rng.between(2.0, 3.0),
            rng.between(15.0, 10.0),
        ),
        ParticleKind::Spark => (
            Hsl::new(rng.between(45.0, 20.0), 100.0, rng.between(60.0, 20.0)),
            Vec2::new(rng.spread(6.0), rng.spread(6.0)),
            rng.between(1.0, 2.0),
            rng.between(10.0, 10.0),
        ),
    };
    let position = at.offset(rng.spread(SPAWN_JITTER), rng.spread(SPAWN_JITTER));
    Particle {
        position,
        velocity,
        life,
        max_life: life,
        color,
        size,
        kind,
    }
}

pub fn spawn_damage_number(effects: &mut Effects, at: Vec2, value: u32, critical: bool) {
    effects.damage_numbers.push(DamageNumber {
        position: at,
        value,
        life: DAMAGE_NUMBER_LIFE,
        max_life: DAMAGE_NUMBER_LIFE,
        critical,
    });
}

/// A burst of streaks scattered around `at`, all pointing roughly along
/// `direction`. They live for `SPEED_LINE_WINDOW_MS` of clock time.
pub fn spawn_speed_lines(
    effects: &mut Effects,
    at: Vec2,
    direction: f64,
    now_ms: u64,
    rng: &mut dyn RandomSource,
) {
    let expires_at_ms = now_ms + SPEED_LINE_WINDOW_MS;
    for _ in 0..SPEED_LINES_PER_BURST {
        let origin = at.offset(rng.spread(SPEED_LINE_SCATTER), rng.spread(SPEED_LINE_SCATTER));
        effects.speed_lines.push(SpeedLine {
            origin,
            length: rng.between(50.0, 100.0),
            angle: direction + rng.spread(SPEED_LINE_ANGLE_SPREAD),
            expires_at_ms,
        });
    }
}

/// Start a shake that decays linearly to rest over `duration` ticks.
/// Replaces whatever shake was running.
pub fn trigger_shake(effects: &mut Effects, intensity: f64, duration: u32) {
    effects.shake = CameraShake {
        offset: Vec2::default(),
        intensity,
        initial: intensity,
        elapsed: 0,
        duration,
    };
}

// ── Per-frame advance ────────────────────────────────────────────────────────

/// Advance every transient entity by one render tick and drop the expired.
pub fn advance(effects: &mut Effects, now_ms: u64, rng: &mut dyn RandomSource) {
    for p in &mut effects.particles {
        p.position = p.position.offset(p.velocity.x, p.velocity.y);
        if p.kind == ParticleKind::Dust {
            p.velocity.y += GRAVITY;
        }
        p.life -= 1.0;
    }
    effects.particles.retain(|p| p.life > 0.0);

    for dn in &mut effects.damage_numbers {
        dn.position.y -= DAMAGE_NUMBER_RISE;
        dn.life = dn.life.saturating_sub(1);
    }
    effects.damage_numbers.retain(|dn| dn.life > 0);

    effects.speed_lines.retain(|line| line.expires_at_ms > now_ms);

    advance_shake(&mut effects.shake, rng);
}

fn advance_shake(shake: &mut CameraShake, rng: &mut dyn RandomSource) {
    if !shake.is_active() {
        return;
    }
    shake.elapsed += 1;
    if shake.elapsed >= shake.duration {
        *shake = CameraShake::default();
        return;
    }
    shake.offset = Vec2::new(rng.spread(shake.initial), rng.spread(shake.initial));
    shake.intensity = shake.initial * (1.0 - shake.elapsed as f64 / shake.duration as f64);
}
