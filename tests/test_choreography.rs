mod common;

use std::f64::consts::{FRAC_PI_4, TAU};

use storm_arena::choreography::*;
use storm_arena::compute::start_encounter;
use storm_arena::entities::*;
use storm_arena::random::RandomSource;

use common::{seeded, Scripted};

fn started() -> BattleState {
    let mut s = BattleState::new();
    start_encounter(&mut s);
    s
}

fn run(step: Step, s: &mut BattleState, rolls: &mut dyn RandomSource) -> StepResult {
    let mut cosmetic = seeded(1);
    let mut dice = Dice { rolls, cosmetic: &mut cosmetic };
    perform(step, s, 0, &mut dice)
}

// ── damage tables ─────────────────────────────────────────────────────────────

#[test]
fn damage_ranges_match_the_documented_bounds() {
    assert_eq!((SLASH_DAMAGE.min(), SLASH_DAMAGE.max()), (15, 24));
    assert_eq!((SPIN_DAMAGE.min(), SPIN_DAMAGE.max()), (20, 34));
    assert_eq!((BURST_DAMAGE.min(), BURST_DAMAGE.max()), (30, 49));
    assert_eq!((TENTACLE_SLAM_DAMAGE.min(), TENTACLE_SLAM_DAMAGE.max()), (10, 24));
    assert_eq!((LIGHTNING_STRIKE_DAMAGE.min(), LIGHTNING_STRIKE_DAMAGE.max()), (15, 34));
}

#[test]
fn rolls_stay_inside_their_range_and_reach_both_ends() {
    let mut rng = seeded(99);
    for range in [SLASH_DAMAGE, SPIN_DAMAGE, BURST_DAMAGE, TENTACLE_SLAM_DAMAGE, LIGHTNING_STRIKE_DAMAGE] {
        let rolls: Vec<u32> = (0..2000).map(|_| range.roll(&mut rng)).collect();
        assert!(rolls.iter().all(|&r| r >= range.min() && r <= range.max()));
        assert!(rolls.contains(&range.min()));
        assert!(rolls.contains(&range.max()));
    }
}

#[test]
fn extreme_draws_map_to_range_ends() {
    assert_eq!(SLASH_DAMAGE.roll(&mut Scripted::new(&[0.0])), 15);
    assert_eq!(SLASH_DAMAGE.roll(&mut Scripted::new(&[0.999_999])), 24);
    assert_eq!(BURST_DAMAGE.roll(&mut Scripted::new(&[0.5])), 40);
}

// ── chain structure ───────────────────────────────────────────────────────────

#[test]
fn combo_links_are_staged_serially() {
    assert_eq!(combo_successor(PlayerAction::Dash), ActionStep::after(200, Step::Player(PlayerAction::Slash)));
    assert_eq!(combo_successor(PlayerAction::Slash), ActionStep::after(300, Step::Player(PlayerAction::Spin)));
    assert_eq!(combo_successor(PlayerAction::Spin), ActionStep::after(400, Step::Player(PlayerAction::EnergyBurst)));
    assert_eq!(combo_successor(PlayerAction::EnergyBurst), ActionStep::after(500, Step::ComboFinish));
    assert_eq!(recovery_ms(EnemyAction::TentacleSlam), 800);
    assert_eq!(recovery_ms(EnemyAction::LightningStrike), 600);
}

// ── player stages ─────────────────────────────────────────────────────────────

#[test]
fn dash_moves_forward_without_damage() {
    let mut s = started();
    let r = run(Step::Player(PlayerAction::Dash), &mut s, &mut Scripted::zeros());
    assert_eq!(r.next, Some(ActionStep::after(200, Step::Player(PlayerAction::Slash))));
    assert_eq!(r.outcome, None);
    assert_eq!(s.player.position, PLAYER_HOME.offset(150.0, 0.0));
    assert_eq!(s.player.current_action, Some(ActionTag::Player(PlayerAction::Dash)));
    assert_eq!(s.enemy.health, 100);
    assert_eq!(s.effects.speed_lines.len(), 15);
    assert_eq!(s.effects.particles.len(), 20);
    assert!(s.effects.particles.iter().all(|p| p.kind == ParticleKind::Energy));
}

#[test]
fn slash_rolls_damage_and_shakes() {
    let mut s = started();
    let r = run(Step::Player(PlayerAction::Slash), &mut s, &mut Scripted::zeros());
    assert_eq!(s.enemy.health, 85);
    assert_eq!(r.next, Some(ActionStep::after(300, Step::Player(PlayerAction::Spin))));
    assert!((s.player.rotation - FRAC_PI_4).abs() < 1e-9);
    assert_eq!(s.effects.particles.len(), 25);
    assert_eq!(s.effects.shake.duration, 8);
    assert_eq!(s.effects.shake.initial, 5.0);

    let dn = &s.effects.damage_numbers[0];
    assert_eq!(dn.value, 15);
    assert!(!dn.critical);
    assert_eq!(dn.position, ENEMY_HOME.offset(0.0, -50.0));
}

#[test]
fn spin_is_critical_and_lifts_the_player() {
    let mut s = started();
    run(Step::Player(PlayerAction::Spin), &mut s, &mut Scripted::zeros());
    assert_eq!(s.enemy.health, 80);
    assert_eq!(s.player.position, PLAYER_HOME.offset(100.0, -80.0));
    assert!((s.player.rotation - TAU).abs() < 1e-9);
    assert!(s.effects.damage_numbers[0].critical);
    assert_eq!(s.effects.speed_lines.len(), 15);
    assert_eq!(s.effects.shake.duration, 10);
}

#[test]
fn energy_burst_scales_up_and_hits_hardest() {
    let mut s = started();
    let r = run(Step::Player(PlayerAction::EnergyBurst), &mut s, &mut Scripted::zeros());
    assert_eq!(s.enemy.health, 70);
    assert_eq!(s.player.scale, 1.5);
    assert_eq!(s.effects.particles.len(), 80);
    assert_eq!(s.effects.shake.duration, 15);
    assert_eq!(r.next, Some(ActionStep::after(500, Step::ComboFinish)));
}

#[test]
fn combo_finish_counts_and_hands_off() {
    let mut s = started();
    s.player.current_action = Some(ActionTag::Player(PlayerAction::EnergyBurst));
    s.player.scale = 1.5;
    s.player.position = Vec2::new(450.0, 220.0);
    let r = run(Step::ComboFinish, &mut s, &mut Scripted::zeros());
    assert_eq!(s.combo_count, 1);
    assert_eq!(s.phase, BattlePhase::EnemyTurn);
    assert_eq!(s.player.scale, 1.0);
    assert_eq!(s.player.position, PLAYER_HOME);
    assert!(!s.player.is_acting());
    assert_eq!(r.next, Some(ActionStep::after(1000, Step::EnemyThink)));
}

#[test]
fn killing_blow_stops_the_chain() {
    let mut s = started();
    s.enemy.health = 10;
    let r = run(Step::Player(PlayerAction::Slash), &mut s, &mut Scripted::zeros());
    assert_eq!(r.outcome, Some(BattleOutcome::Victory));
    assert_eq!(r.next, None);
    assert_eq!(s.phase, BattlePhase::Victory);
}

#[test]
fn player_step_outside_player_turn_is_dropped() {
    let mut s = started();
    s.phase = BattlePhase::EnemyTurn;
    let before = s.clone();
    let r = run(Step::Player(PlayerAction::Slash), &mut s, &mut Scripted::zeros());
    assert_eq!(r, StepResult::default());
    assert_eq!(s, before);
}

#[test]
fn nothing_runs_after_the_encounter_is_over() {
    let mut s = started();
    s.phase = BattlePhase::Defeat;
    let before = s.clone();
    for step in [Step::Player(PlayerAction::EnergyBurst), Step::ComboFinish, Step::EnemyThink] {
        assert_eq!(run(step, &mut s, &mut Scripted::zeros()), StepResult::default());
    }
    assert_eq!(s, before);
}

// ── enemy moves ───────────────────────────────────────────────────────────────

fn enemy_turn() -> BattleState {
    let mut s = started();
    s.phase = BattlePhase::EnemyTurn;
    s
}

#[test]
fn low_draw_picks_tentacle_slam() {
    let mut s = enemy_turn();
    let rest = s.limbs.clone();
    let r = run(Step::EnemyThink, &mut s, &mut Scripted::new(&[0.2, 0.0]));
    assert_eq!(s.enemy.current_action, Some(ActionTag::Enemy(EnemyAction::TentacleSlam)));
    assert_eq!(s.player.health, 90);
    for (limb, rest) in s.limbs.iter().zip(&rest) {
        assert!((limb.position.y - rest.position.y - 200.0).abs() < 1e-9);
        assert!((limb.angle - rest.angle - FRAC_PI_4).abs() < 1e-9);
    }
    let kinds: Vec<_> = s.effects.particles.iter().map(|p| p.kind).collect();
    assert_eq!(kinds.iter().filter(|k| **k == ParticleKind::Dust).count(), 40);
    assert_eq!(kinds.iter().filter(|k| **k == ParticleKind::Spark).count(), 20);
    assert_eq!(r.next, Some(ActionStep::after(800, Step::EnemyRecover(EnemyAction::TentacleSlam))));
}

#[test]
fn high_draw_picks_lightning_strike() {
    let mut s = enemy_turn();
    let r = run(Step::EnemyThink, &mut s, &mut Scripted::new(&[0.7, 0.999]));
    assert_eq!(s.enemy.current_action, Some(ActionTag::Enemy(EnemyAction::LightningStrike)));
    assert_eq!(s.player.health, 66); // 100 - 34
    let lightning = s.effects.particles.iter().filter(|p| p.kind == ParticleKind::Lightning).count();
    assert_eq!(lightning, 60);
    assert_eq!(r.next, Some(ActionStep::after(600, Step::EnemyRecover(EnemyAction::LightningStrike))));
}

#[test]
fn enemy_think_skipped_while_enemy_busy() {
    let mut s = enemy_turn();
    s.enemy.current_action = Some(ActionTag::Enemy(EnemyAction::LightningStrike));
    let r = run(Step::EnemyThink, &mut s, &mut Scripted::zeros());
    assert_eq!(r, StepResult::default());
    assert_eq!(s.player.health, 100);
}

#[test]
fn recovery_restores_limbs_and_player_turn() {
    let mut s = enemy_turn();
    let rest = s.limbs.clone();
    run(Step::EnemyThink, &mut s, &mut Scripted::zeros());
    assert_ne!(s.limbs, rest);
    let r = run(Step::EnemyRecover(EnemyAction::TentacleSlam), &mut s, &mut Scripted::zeros());
    assert_eq!(s.limbs, rest);
    assert_eq!(s.phase, BattlePhase::PlayerTurn);
    assert!(!s.enemy.is_acting());
    assert_eq!(r.next, None);
}

#[test]
fn enemy_choice_is_roughly_uniform() {
    let mut rng = seeded(5);
    let mut slams = 0;
    for _ in 0..1000 {
        let mut s = enemy_turn();
        run(Step::EnemyThink, &mut s, &mut rng);
        if s.enemy.current_action == Some(ActionTag::Enemy(EnemyAction::TentacleSlam)) {
            slams += 1;
        }
    }
    assert!((400..=600).contains(&slams), "slams = {slams}");
}
