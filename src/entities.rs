//! All battle entity types. Pure data, no game logic.

use std::f64::consts::TAU;

// ── World constants ──────────────────────────────────────────────────────────

/// Upper bound of both health pools.
pub const MAX_HEALTH: u32 = 100;

/// Logical arena size. The drawing surface scales this to whatever it has.
pub const WORLD_WIDTH: f64 = 1000.0;
pub const WORLD_HEIGHT: f64 = 600.0;

pub const PLAYER_HOME: Vec2 = Vec2::new(200.0, 300.0);
pub const ENEMY_HOME: Vec2 = Vec2::new(800.0, 200.0);

/// Number of tentacles around the enemy body.
pub const LIMB_COUNT: usize = 6;
/// Distance of each tentacle root from the enemy centre at rest.
pub const LIMB_REST_RADIUS: f64 = 50.0;

// ── Geometry & colour ────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Point reached by travelling `length` along `angle` (radians).
    pub fn along(self, angle: f64, length: f64) -> Self {
        self.offset(angle.cos() * length, angle.sin() * length)
    }
}

/// Hue in degrees, saturation and lightness in percent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hsl {
    pub h: f64,
    pub s: f64,
    pub l: f64,
}

impl Hsl {
    pub const fn new(h: f64, s: f64, l: f64) -> Self {
        Self { h, s, l }
    }

    pub fn to_rgb(self) -> (u8, u8, u8) {
        let s = (self.s / 100.0).clamp(0.0, 1.0);
        let l = (self.l / 100.0).clamp(0.0, 1.0);
        let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let h = self.h.rem_euclid(360.0) / 60.0;
        let x = c * (1.0 - (h % 2.0 - 1.0).abs());
        let (r, g, b) = match h as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };
        let m = l - c / 2.0;
        let to_u8 = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
        (to_u8(r), to_u8(g), to_u8(b))
    }
}

// ── Phase & actions ──────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BattlePhase {
    Idle,
    PlayerTurn,
    EnemyTurn,
    Victory,
    Defeat,
}

impl BattlePhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, BattlePhase::Victory | BattlePhase::Defeat)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BattleOutcome {
    Victory,
    Defeat,
}

impl BattleOutcome {
    pub fn phase(self) -> BattlePhase {
        match self {
            BattleOutcome::Victory => BattlePhase::Victory,
            BattleOutcome::Defeat => BattlePhase::Defeat,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Player,
    Enemy,
}

/// The four links of the player's combo, in chain order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayerAction {
    Dash,
    Slash,
    Spin,
    EnergyBurst,
}

impl PlayerAction {
    /// Stages during which the energy blades are drawn.
    pub fn shows_blades(self) -> bool {
        !matches!(self, PlayerAction::Dash)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnemyAction {
    TentacleSlam,
    LightningStrike,
}

impl EnemyAction {
    /// The enemy's whole move set; choice is uniform over this slice.
    pub const ALL: [EnemyAction; 2] = [EnemyAction::TentacleSlam, EnemyAction::LightningStrike];
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionTag {
    Player(PlayerAction),
    Enemy(EnemyAction),
}

// ── Combatants ───────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Combatant {
    /// Always within `0..=MAX_HEALTH`.
    pub health: u32,
    pub position: Vec2,
    /// Rest position the actor returns to between turns.
    pub home: Vec2,
    pub rotation: f64,
    pub scale: f64,
    pub current_action: Option<ActionTag>,
}

impl Combatant {
    pub fn new(home: Vec2) -> Self {
        Self {
            health: MAX_HEALTH,
            position: home,
            home,
            rotation: 0.0,
            scale: 1.0,
            current_action: None,
        }
    }

    pub fn is_acting(&self) -> bool {
        self.current_action.is_some()
    }

    pub fn is_defeated(&self) -> bool {
        self.health == 0
    }

    /// Back to the rest pose. Health is untouched.
    pub fn reset_pose(&mut self) {
        self.position = self.home;
        self.rotation = 0.0;
        self.scale = 1.0;
    }
}

/// One tentacle of the enemy: root position and facing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Limb {
    pub position: Vec2,
    pub angle: f64,
}

impl Limb {
    /// Rest placement of limb `index` of `LIMB_COUNT` around `centre`.
    pub fn at_rest(centre: Vec2, index: usize) -> Self {
        let angle = index as f64 * TAU / LIMB_COUNT as f64;
        Self {
            position: centre.along(angle, LIMB_REST_RADIUS),
            angle,
        }
    }
}

// ── Transient visual entities ────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParticleKind {
    Energy,
    Dust,
    Lightning,
    Spark,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Remaining render ticks; retired once this is `<= 0`.
    pub life: f64,
    pub max_life: f64,
    pub color: Hsl,
    pub size: f64,
    pub kind: ParticleKind,
}

impl Particle {
    pub fn alpha(&self) -> f64 {
        (self.life / self.max_life).clamp(0.0, 1.0)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DamageNumber {
    pub position: Vec2,
    pub value: u32,
    pub life: u32,
    pub max_life: u32,
    pub critical: bool,
}

impl DamageNumber {
    pub fn alpha(&self) -> f64 {
        self.life as f64 / self.max_life as f64
    }

    /// Grows as it fades, for the pop effect.
    pub fn scale(&self) -> f64 {
        1.0 + (1.0 - self.alpha()) * 0.5
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SpeedLine {
    pub origin: Vec2,
    pub length: f64,
    pub angle: f64,
    /// Clock time (ms) at which the render loop drops this line.
    pub expires_at_ms: u64,
}

impl SpeedLine {
    pub fn end(&self) -> Vec2 {
        self.origin.along(self.angle, self.length)
    }
}

/// Whole-scene jitter. All zero when idle.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CameraShake {
    pub offset: Vec2,
    pub intensity: f64,
    /// Intensity at trigger time; offsets are drawn from this.
    pub initial: f64,
    pub elapsed: u32,
    pub duration: u32,
}

impl CameraShake {
    pub fn is_active(&self) -> bool {
        self.duration > 0
    }
}

/// Everything owned by the effects & render loop.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Effects {
    pub particles: Vec<Particle>,
    pub damage_numbers: Vec<DamageNumber>,
    pub speed_lines: Vec<SpeedLine>,
    pub shake: CameraShake,
}

impl Effects {
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
            && self.damage_numbers.is_empty()
            && self.speed_lines.is_empty()
            && !self.shake.is_active()
    }
}

// ── Master battle state ──────────────────────────────────────────────────────

/// The whole encounter as one exclusively owned aggregate.
#[derive(Clone, Debug, PartialEq)]
pub struct BattleState {
    pub phase: BattlePhase,
    pub player: Combatant,
    pub enemy: Combatant,
    pub limbs: Vec<Limb>,
    /// Completed combo chains since the last "start combo".
    pub combo_count: u32,
    pub effects: Effects,
    /// Render ticks elapsed.
    pub frame: u64,
}

impl BattleState {
    pub fn new() -> Self {
        Self {
            phase: BattlePhase::Idle,
            player: Combatant::new(PLAYER_HOME),
            enemy: Combatant::new(ENEMY_HOME),
            limbs: Vec::new(),
            combo_count: 0,
            effects: Effects::default(),
            frame: 0,
        }
    }

    pub fn combatant(&self, side: Side) -> &Combatant {
        match side {
            Side::Player => &self.player,
            Side::Enemy => &self.enemy,
        }
    }

    pub fn combatant_mut(&mut self, side: Side) -> &mut Combatant {
        match side {
            Side::Player => &mut self.player,
            Side::Enemy => &mut self.enemy,
        }
    }

    pub fn outcome(&self) -> Option<BattleOutcome> {
        match self.phase {
            BattlePhase::Victory => Some(BattleOutcome::Victory),
            BattlePhase::Defeat => Some(BattleOutcome::Defeat),
            _ => None,
        }
    }
}

impl Default for BattleState {
    fn default() -> Self {
        Self::new()
    }
}
