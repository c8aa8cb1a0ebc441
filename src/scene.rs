//! Scene composition: battle state in, layered draw list out.
//!
//! `compose` is a pure function of the state and the clock and never
//! touches a drawing surface. `display` turns the result into terminal
//! cells.

use std::f64::consts::{FRAC_PI_2, TAU};

use crate::compute::can_begin_player_action;
use crate::entities::{
    ActionTag, BattlePhase, BattleState, Combatant, EnemyAction, Hsl, Limb, ParticleKind, Vec2,
    WORLD_HEIGHT, WORLD_WIDTH,
};

/// Paint order, back to front. `Ord` follows declaration order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Layer {
    Background,
    Ambient,
    SpeedLines,
    Particles,
    Enemy,
    Player,
    DamageNumbers,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    /// Vertical gradient over the whole surface.
    Sky { top: Hsl, bottom: Hsl },
    /// Filled ellipse with a vertical gradient.
    Island { centre: Vec2, rx: f64, ry: f64, top: Hsl, bottom: Hsl },
    /// Filled circle.
    Disc { centre: Vec2, radius: f64, color: Hsl, alpha: f64 },
    /// A single glyph, used for particles.
    Dot { at: Vec2, glyph: char, color: Hsl, alpha: f64 },
    Line { from: Vec2, to: Vec2, color: Hsl, alpha: f64 },
    /// Centred text.
    Text { at: Vec2, text: String, color: Hsl, alpha: f64, scale: f64, bold: bool },
}

#[derive(Clone, Debug, PartialEq)]
pub struct DrawCmd {
    pub layer: Layer,
    pub shape: Shape,
}

/// Overlay data; drawn after the camera offset is reverted.
#[derive(Clone, Debug, PartialEq)]
pub struct Hud {
    pub player_health: u32,
    pub enemy_health: u32,
    pub combo_count: u32,
    pub phase: BattlePhase,
    /// "Start combo" is accepted right now.
    pub prompt: bool,
    /// Some actor is mid-action; the painter adds a motion tint.
    pub in_motion: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Camera shake translation for every world layer.
    pub offset: Vec2,
    pub commands: Vec<DrawCmd>,
    pub hud: Hud,
}

impl Scene {
    pub fn layer(&self, layer: Layer) -> impl Iterator<Item = &Shape> + '_ {
        self.commands
            .iter()
            .filter(move |c| c.layer == layer)
            .map(|c| &c.shape)
    }
}

// ── Palette ──────────────────────────────────────────────────────────────────

const SKY_TOP: Hsl = Hsl::new(220.0, 50.0, 15.0);
const SKY_BOTTOM: Hsl = Hsl::new(220.0, 60.0, 8.0);
const ISLAND_TOP: Hsl = Hsl::new(30.0, 40.0, 25.0);
const ISLAND_BOTTOM: Hsl = Hsl::new(30.0, 50.0, 15.0);
const CLOUD: Hsl = Hsl::new(220.0, 30.0, 20.0);
const GLOW: Hsl = Hsl::new(200.0, 95.0, 65.0);
const KRAKEN_BODY: Hsl = Hsl::new(220.0, 70.0, 22.0);
const KRAKEN_EYE: Hsl = Hsl::new(200.0, 100.0, 80.0);
const TENTACLE: Hsl = Hsl::new(220.0, 60.0, 25.0);
const SKIN: Hsl = Hsl::new(33.0, 100.0, 84.0);
const HAIR: Hsl = Hsl::new(212.0, 72.0, 59.0);
const TUNIC: Hsl = Hsl::new(207.0, 52.0, 36.0);
const LIMBS: Hsl = Hsl::new(210.0, 55.0, 23.0);
const BLADE: Hsl = Hsl::new(200.0, 95.0, 80.0);
const CRIT_NUMBER: Hsl = Hsl::new(0.0, 100.0, 60.0);
const PLAIN_NUMBER: Hsl = Hsl::new(0.0, 0.0, 100.0);

const ISLAND_DROP: f64 = 150.0;
const TENTACLE_LENGTH: f64 = 150.0;

// ── Composition ──────────────────────────────────────────────────────────────

pub fn compose(state: &BattleState, clock_ms: u64) -> Scene {
    let mut out = Vec::new();
    let t = clock_ms as f64;

    draw_arena(&mut out, t);

    for line in &state.effects.speed_lines {
        push(&mut out, Layer::SpeedLines, Shape::Line {
            from: line.origin,
            to: line.end(),
            color: GLOW,
            alpha: 0.6,
        });
    }

    for p in &state.effects.particles {
        push(&mut out, Layer::Particles, Shape::Dot {
            at: p.position,
            glyph: particle_glyph(p.kind, p.size),
            color: p.color,
            alpha: p.alpha(),
        });
    }

    let enemy_action = match state.enemy.current_action {
        Some(ActionTag::Enemy(a)) => Some(a),
        _ => None,
    };
    draw_kraken(&mut out, &state.enemy, &state.limbs, enemy_action, clock_ms);
    draw_kaia(&mut out, &state.player);

    for dn in &state.effects.damage_numbers {
        push(&mut out, Layer::DamageNumbers, Shape::Text {
            at: dn.position,
            text: dn.value.to_string(),
            color: if dn.critical { CRIT_NUMBER } else { PLAIN_NUMBER },
            alpha: dn.alpha(),
            scale: dn.scale(),
            bold: dn.critical,
        });
    }

    Scene {
        offset: state.effects.shake.offset,
        commands: out,
        hud: Hud {
            player_health: state.player.health,
            enemy_health: state.enemy.health,
            combo_count: state.combo_count,
            phase: state.phase,
            prompt: can_begin_player_action(state),
            in_motion: state.player.is_acting() || state.enemy.is_acting(),
        },
    }
}

fn push(out: &mut Vec<DrawCmd>, layer: Layer, shape: Shape) {
    out.push(DrawCmd { layer, shape });
}

fn particle_glyph(kind: ParticleKind, size: f64) -> char {
    match kind {
        ParticleKind::Energy if size >= 5.0 => '●',
        ParticleKind::Energy => '•',
        ParticleKind::Dust => '.',
        ParticleKind::Lightning => '+',
        ParticleKind::Spark => '*',
    }
}

fn draw_arena(out: &mut Vec<DrawCmd>, t: f64) {
    let island_y = WORLD_HEIGHT - ISLAND_DROP;
    push(out, Layer::Background, Shape::Sky { top: SKY_TOP, bottom: SKY_BOTTOM });
    push(out, Layer::Background, Shape::Island {
        centre: Vec2::new(WORLD_WIDTH / 2.0, island_y),
        rx: WORLD_WIDTH * 0.4,
        ry: 80.0,
        top: ISLAND_TOP,
        bottom: ISLAND_BOTTOM,
    });

    // Drifting clouds wrap around the right edge.
    for i in 0..5 {
        let x = (t * 0.01 + i as f64 * 200.0) % (WORLD_WIDTH + 200.0) - 100.0;
        let y = 100.0 + i as f64 * 150.0;
        for (dx, r) in [(0.0, 40.0), (30.0, 50.0), (60.0, 40.0)] {
            push(out, Layer::Ambient, Shape::Disc {
                centre: Vec2::new(x + dx, y),
                radius: r,
                color: CLOUD,
                alpha: 0.4,
            });
        }
    }

    let pulse = (t * 0.005).sin() * 0.3 + 0.7;
    for i in 0..6 {
        let a = i as f64 * TAU / 6.0;
        let c = Vec2::new(
            WORLD_WIDTH / 2.0 + a.cos() * WORLD_WIDTH * 0.3,
            island_y + a.sin() * 30.0,
        );
        let diamond = [c.offset(0.0, -15.0), c.offset(-10.0, 0.0), c.offset(0.0, 15.0), c.offset(10.0, 0.0)];
        for k in 0..4 {
            push(out, Layer::Ambient, Shape::Line {
                from: diamond[k],
                to: diamond[(k + 1) % 4],
                color: GLOW,
                alpha: pulse,
            });
        }
    }
}

fn draw_kraken(
    out: &mut Vec<DrawCmd>,
    kraken: &Combatant,
    limbs: &[Limb],
    action: Option<EnemyAction>,
    clock_ms: u64,
) {
    let c = kraken.position;
    // Flicker changes every 50ms so the bolts read as motion, not noise.
    let beat = clock_ms / 50;

    push(out, Layer::Enemy, Shape::Disc { centre: c, radius: 80.0, color: KRAKEN_BODY, alpha: 1.0 });
    let glow = (clock_ms as f64 * 0.01).sin() * 0.3 + 0.7;
    for dx in [-25.0, 25.0] {
        push(out, Layer::Enemy, Shape::Disc {
            centre: c.offset(dx, -20.0),
            radius: 12.0,
            color: KRAKEN_EYE,
            alpha: glow,
        });
    }

    for (i, limb) in limbs.iter().enumerate() {
        let dir = limb.angle + FRAC_PI_2;
        push(out, Layer::Enemy, Shape::Line {
            from: limb.position,
            to: limb.position.along(dir, TENTACLE_LENGTH),
            color: TENTACLE,
            alpha: 1.0,
        });
        if action == Some(EnemyAction::TentacleSlam) {
            let seed = beat * 1000 + i as u64 * 10;
            let a = limb.position.along(dir, 50.0).offset(jitter(seed) * 30.0, 0.0);
            let b = limb.position.along(dir, 100.0).offset(jitter(seed + 1) * 30.0, 0.0);
            let bolt = Hsl::new(220.0 + (jitter(seed + 2) + 0.5) * 20.0, 100.0, 80.0);
            push(out, Layer::Enemy, Shape::Line { from: limb.position, to: a, color: bolt, alpha: 1.0 });
            push(out, Layer::Enemy, Shape::Line { from: a, to: b, color: bolt, alpha: 1.0 });
        }
    }

    if action == Some(EnemyAction::LightningStrike) {
        for i in 0..10u64 {
            let seed = beat * 1000 + 500 + i * 10;
            let from = c.offset(jitter(seed) * 100.0, jitter(seed + 1) * 100.0);
            let to = c.offset(jitter(seed + 2) * 200.0, jitter(seed + 3) * 200.0);
            let color = Hsl::new(
                220.0 + (jitter(seed + 4) + 0.5) * 20.0,
                100.0,
                80.0 + (jitter(seed + 5) + 0.5) * 15.0,
            );
            push(out, Layer::Enemy, Shape::Line { from, to, color, alpha: 1.0 });
        }
    }
}

fn draw_kaia(out: &mut Vec<DrawCmd>, kaia: &Combatant) {
    let acting = match kaia.current_action {
        Some(ActionTag::Player(a)) => Some(a),
        _ => None,
    };
    // Body-space point: rotate and scale around the actor's centre.
    let at = |dx: f64, dy: f64| {
        let (s, c) = kaia.rotation.sin_cos();
        let (dx, dy) = (dx * kaia.scale, dy * kaia.scale);
        kaia.position.offset(dx * c - dy * s, dx * s + dy * c)
    };
    let line = |out: &mut Vec<DrawCmd>, a: (f64, f64), b: (f64, f64), color: Hsl| {
        push(out, Layer::Player, Shape::Line { from: at(a.0, a.1), to: at(b.0, b.1), color, alpha: 1.0 });
    };

    if acting.is_some() {
        push(out, Layer::Player, Shape::Disc {
            centre: kaia.position,
            radius: 60.0 * kaia.scale,
            color: GLOW,
            alpha: 0.35,
        });
    }

    push(out, Layer::Player, Shape::Disc { centre: at(0.0, -50.0), radius: 18.0 * kaia.scale, color: HAIR, alpha: 1.0 });
    push(out, Layer::Player, Shape::Disc { centre: at(0.0, -40.0), radius: 15.0 * kaia.scale, color: SKIN, alpha: 1.0 });
    line(out, (0.0, -25.0), (0.0, 10.0), TUNIC);
    line(out, (-16.0, -20.0), (-16.0, 5.0), LIMBS);
    line(out, (16.0, -20.0), (16.0, 5.0), LIMBS);

    if acting.is_some_and(|a| a.shows_blades()) {
        line(out, (-25.0, -15.0), (-35.0, -25.0), BLADE);
        line(out, (25.0, -15.0), (35.0, -25.0), BLADE);
    }

    line(out, (-6.0, 10.0), (-6.0, 35.0), LIMBS);
    line(out, (6.0, 10.0), (6.0, 35.0), LIMBS);
}

/// Deterministic value in `[-0.5, 0.5)` for a seed (splitmix64 finaliser).
fn jitter(seed: u64) -> f64 {
    let mut x = seed.wrapping_add(0x9E37_79B9_7F4A_7C15);
    x = (x ^ (x >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    x ^= x >> 31;
    (x >> 11) as f64 / (1u64 << 53) as f64 - 0.5
}
