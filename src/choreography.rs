//! Action choreographer.
//!
//! A chosen action becomes a chain of `Step`s. Running a step mutates the
//! battle state, spawns its effects and names the step that follows along
//! with the delay before it. The caller owns the timers; this module never
//! waits.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, TAU};

use tracing::debug;

use crate::compute::{self, ENEMY_THINK_MS};
use crate::effects::{spawn_damage_number, spawn_particles, spawn_speed_lines, trigger_shake};
use crate::entities::{
    ActionTag, BattleOutcome, BattlePhase, BattleState, EnemyAction, ParticleKind, PlayerAction,
    Side,
};
use crate::random::RandomSource;

// ── Damage tables ────────────────────────────────────────────────────────────

/// Uniform integer range `base ..= base + span - 1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DamageRange {
    pub base: u32,
    pub span: u32,
}

impl DamageRange {
    pub const fn min(self) -> u32 {
        self.base
    }

    pub const fn max(self) -> u32 {
        self.base + self.span - 1
    }

    pub fn roll(self, rng: &mut dyn RandomSource) -> u32 {
        rng.roll(self.base, self.span).min(self.max())
    }
}

pub const SLASH_DAMAGE: DamageRange = DamageRange { base: 15, span: 10 };
pub const SPIN_DAMAGE: DamageRange = DamageRange { base: 20, span: 15 };
pub const BURST_DAMAGE: DamageRange = DamageRange { base: 30, span: 20 };
pub const TENTACLE_SLAM_DAMAGE: DamageRange = DamageRange { base: 10, span: 15 };
pub const LIGHTNING_STRIKE_DAMAGE: DamageRange = DamageRange { base: 15, span: 20 };

// ── Step chain ───────────────────────────────────────────────────────────────

const DASH_DISTANCE: f64 = 150.0;
const SLAM_DROP: f64 = 200.0;
/// Damage numbers float this far above the target's centre.
const NUMBER_HEIGHT: f64 = 50.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// One link of the player's combo.
    Player(PlayerAction),
    /// Closing beat of the combo: counter bump and turn hand-off.
    ComboFinish,
    /// Enemy picks and performs its move.
    EnemyThink,
    /// Enemy move wind-down and turn hand-off.
    EnemyRecover(EnemyAction),
}

/// A step together with the delay before it fires, measured from the
/// moment the previous step ran.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActionStep {
    pub step: Step,
    pub delay_ms: u64,
}

impl ActionStep {
    pub const fn after(delay_ms: u64, step: Step) -> Self {
        Self { step, delay_ms }
    }
}

/// The fixed successor of each player combo link.
pub fn combo_successor(action: PlayerAction) -> ActionStep {
    match action {
        PlayerAction::Dash => ActionStep::after(200, Step::Player(PlayerAction::Slash)),
        PlayerAction::Slash => ActionStep::after(300, Step::Player(PlayerAction::Spin)),
        PlayerAction::Spin => ActionStep::after(400, Step::Player(PlayerAction::EnergyBurst)),
        PlayerAction::EnergyBurst => ActionStep::after(500, Step::ComboFinish),
    }
}

/// How long an enemy move plays before the turn goes back.
pub fn recovery_ms(action: EnemyAction) -> u64 {
    match action {
        EnemyAction::TentacleSlam => 800,
        EnemyAction::LightningStrike => 600,
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StepResult {
    pub next: Option<ActionStep>,
    /// Set when a damage application in this step ended the encounter.
    pub outcome: Option<BattleOutcome>,
}

impl StepResult {
    fn done() -> Self {
        Self::default()
    }
}

/// The two random streams a step may draw from: game rolls (damage,
/// enemy choice) and cosmetic jitter.
pub struct Dice<'a> {
    pub rolls: &'a mut dyn RandomSource,
    pub cosmetic: &'a mut dyn RandomSource,
}

// ── Running steps ────────────────────────────────────────────────────────────

/// Run one step at clock time `now_ms`.
///
/// Nothing runs once the encounter is over, and a step whose turn has
/// already passed is dropped, so stale timers cannot touch the state.
pub fn perform(step: Step, state: &mut BattleState, now_ms: u64, dice: &mut Dice<'_>) -> StepResult {
    if state.phase.is_terminal() {
        return StepResult::done();
    }
    debug!(?step, now_ms, "step");
    let result = match step {
        Step::Player(action) => {
            if state.phase != BattlePhase::PlayerTurn {
                return StepResult::done();
            }
            state.player.current_action = Some(ActionTag::Player(action));
            let outcome = player_stage(action, state, now_ms, dice);
            StepResult {
                next: Some(combo_successor(action)),
                outcome,
            }
        }
        Step::ComboFinish => {
            state.player.reset_pose();
            state.combo_count += 1;
            let enemy_turn = compute::end_player_turn(state);
            StepResult {
                next: enemy_turn.then(|| ActionStep::after(ENEMY_THINK_MS, Step::EnemyThink)),
                outcome: None,
            }
        }
        Step::EnemyThink => {
            if !compute::can_begin_enemy_action(state) {
                return StepResult::done();
            }
            let action = EnemyAction::ALL[dice.rolls.pick(EnemyAction::ALL.len())];
            state.enemy.current_action = Some(ActionTag::Enemy(action));
            let outcome = enemy_stage(action, state, dice);
            StepResult {
                next: Some(ActionStep::after(recovery_ms(action), Step::EnemyRecover(action))),
                outcome,
            }
        }
        Step::EnemyRecover(action) => {
            if action == EnemyAction::TentacleSlam {
                compute::rest_limbs(state);
            }
            compute::end_enemy_turn(state);
            StepResult::done()
        }
    };

    if state.phase.is_terminal() {
        return StepResult {
            next: None,
            ..result
        };
    }
    result
}

fn player_stage(
    action: PlayerAction,
    state: &mut BattleState,
    now_ms: u64,
    dice: &mut Dice<'_>,
) -> Option<BattleOutcome> {
    let fx = &mut state.effects;
    let player = &mut state.player;
    match action {
        PlayerAction::Dash => {
            let origin = player.position;
            player.position = origin.offset(DASH_DISTANCE, 0.0);
            spawn_speed_lines(fx, origin, -FRAC_PI_2, now_ms, dice.cosmetic);
            spawn_particles(fx, player.position, ParticleKind::Energy, 20, dice.cosmetic);
            None
        }
        PlayerAction::Slash => {
            player.rotation += FRAC_PI_4;
            let at = player.position;
            spawn_particles(fx, at, ParticleKind::Energy, 15, dice.cosmetic);
            spawn_particles(fx, at, ParticleKind::Spark, 10, dice.cosmetic);
            let outcome = strike(state, Side::Enemy, SLASH_DAMAGE.roll(dice.rolls), false);
            trigger_shake(&mut state.effects, 5.0, 8);
            outcome
        }
        PlayerAction::Spin => {
            player.position = player.position.offset(100.0, -80.0);
            player.rotation += TAU;
            let at = player.position;
            spawn_particles(fx, at, ParticleKind::Energy, 30, dice.cosmetic);
            spawn_speed_lines(fx, at, -FRAC_PI_2, now_ms, dice.cosmetic);
            let outcome = strike(state, Side::Enemy, SPIN_DAMAGE.roll(dice.rolls), true);
            trigger_shake(&mut state.effects, 8.0, 10);
            outcome
        }
        PlayerAction::EnergyBurst => {
            player.scale = 1.5;
            let at = player.position;
            spawn_particles(fx, at, ParticleKind::Energy, 50, dice.cosmetic);
            spawn_particles(fx, at, ParticleKind::Spark, 30, dice.cosmetic);
            let outcome = strike(state, Side::Enemy, BURST_DAMAGE.roll(dice.rolls), true);
            trigger_shake(&mut state.effects, 12.0, 15);
            outcome
        }
    }
}

fn enemy_stage(
    action: EnemyAction,
    state: &mut BattleState,
    dice: &mut Dice<'_>,
) -> Option<BattleOutcome> {
    let target = state.player.position;
    match action {
        EnemyAction::TentacleSlam => {
            for limb in &mut state.limbs {
                limb.position.y += SLAM_DROP;
                limb.angle += FRAC_PI_4;
            }
            let ground = target.offset(0.0, 100.0);
            spawn_particles(&mut state.effects, ground, ParticleKind::Dust, 40, dice.cosmetic);
            spawn_particles(&mut state.effects, ground, ParticleKind::Spark, 20, dice.cosmetic);
            let outcome = strike(state, Side::Player, TENTACLE_SLAM_DAMAGE.roll(dice.rolls), false);
            trigger_shake(&mut state.effects, 10.0, 12);
            outcome
        }
        EnemyAction::LightningStrike => {
            spawn_particles(&mut state.effects, target, ParticleKind::Lightning, 60, dice.cosmetic);
            spawn_particles(&mut state.effects, target, ParticleKind::Energy, 30, dice.cosmetic);
            let outcome =
                strike(state, Side::Player, LIGHTNING_STRIKE_DAMAGE.roll(dice.rolls), false);
            trigger_shake(&mut state.effects, 8.0, 10);
            outcome
        }
    }
}

/// Apply the damage and pop a number over the target.
fn strike(state: &mut BattleState, target: Side, amount: u32, critical: bool) -> Option<BattleOutcome> {
    let at = state.combatant(target).position.offset(0.0, -NUMBER_HEIGHT);
    let outcome = compute::apply_damage(state, target, amount);
    spawn_damage_number(&mut state.effects, at, amount, critical);
    outcome
}
