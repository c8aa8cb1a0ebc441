//! Battle state machine.
//!
//! Every function takes the exclusively owned `BattleState` aggregate and
//! performs its whole read-modify-write before returning, so no render
//! frame can observe a half-applied transition.

use tracing::{debug, info};

use crate::entities::{
    BattleOutcome, BattlePhase, BattleState, Limb, Side, LIMB_COUNT, MAX_HEALTH,
};

/// Pause between the end of the player's chain and the enemy's move.
pub const ENEMY_THINK_MS: u64 = 1000;

// ── Setup ────────────────────────────────────────────────────────────────────

/// Fresh encounter: full health, player to move, limbs at rest.
pub fn start_encounter(state: &mut BattleState) {
    for side in [Side::Player, Side::Enemy] {
        let c = state.combatant_mut(side);
        c.health = MAX_HEALTH;
        c.current_action = None;
        c.reset_pose();
    }
    state.combo_count = 0;
    rest_limbs(state);
    state.phase = BattlePhase::PlayerTurn;
    info!("encounter started");
}

/// Lay the enemy's limbs out evenly around its body.
pub fn rest_limbs(state: &mut BattleState) {
    let centre = state.enemy.position;
    state.limbs = (0..LIMB_COUNT).map(|i| Limb::at_rest(centre, i)).collect();
}

// ── Guards ───────────────────────────────────────────────────────────────────

/// Input is accepted only on the player's turn with nothing in flight.
pub fn can_begin_player_action(state: &BattleState) -> bool {
    state.phase == BattlePhase::PlayerTurn && !state.player.is_acting()
}

pub fn can_begin_enemy_action(state: &BattleState) -> bool {
    state.phase == BattlePhase::EnemyTurn && !state.enemy.is_acting()
}

// ── Transitions ──────────────────────────────────────────────────────────────

/// Subtract `amount` from `target`, floored at zero, and settle the
/// encounter if that emptied the pool.
///
/// Returns the outcome only on the call that ended the encounter. Once the
/// phase is terminal further damage is ignored.
pub fn apply_damage(state: &mut BattleState, target: Side, amount: u32) -> Option<BattleOutcome> {
    if state.phase.is_terminal() {
        return None;
    }
    let c = state.combatant_mut(target);
    c.health = c.health.saturating_sub(amount).min(MAX_HEALTH);
    debug!(?target, amount, health = c.health, "damage applied");
    if !c.is_defeated() {
        return None;
    }

    let outcome = match target {
        Side::Enemy => BattleOutcome::Victory,
        Side::Player => BattleOutcome::Defeat,
    };
    state.phase = outcome.phase();
    state.player.current_action = None;
    state.enemy.current_action = None;
    info!(?outcome, "encounter over");
    Some(outcome)
}

/// Hand the turn to the enemy. Returns `true` if the enemy turn began, in
/// which case the caller schedules the enemy's move after `ENEMY_THINK_MS`.
pub fn end_player_turn(state: &mut BattleState) -> bool {
    state.player.current_action = None;
    if state.phase.is_terminal() {
        return false;
    }
    state.phase = BattlePhase::EnemyTurn;
    debug!("enemy turn");
    true
}

/// Hand the turn back to the player unless the encounter is over.
pub fn end_enemy_turn(state: &mut BattleState) -> bool {
    state.enemy.current_action = None;
    if state.phase.is_terminal() {
        return false;
    }
    state.phase = BattlePhase::PlayerTurn;
    debug!("player turn");
    true
}
