mod common;

use storm_arena::engine::BattleEngine;
use storm_arena::entities::*;

use common::{engine_with_rolls, seeded, surface, Scripted};

fn zeros_engine() -> BattleEngine {
    engine_with_rolls(&[])
}

// ── Scenario: full combo at minimum rolls ─────────────────────────────────────

#[test]
fn combo_then_enemy_reply_at_minimum_rolls() {
    let mut engine = zeros_engine();
    assert!(engine.start_combo());

    engine.advance(900);
    assert_eq!(engine.state().enemy.health, 35);
    assert_eq!(engine.state().phase, BattlePhase::PlayerTurn);

    engine.advance(499);
    assert_eq!(engine.state().phase, BattlePhase::PlayerTurn);
    engine.advance(1);
    assert_eq!(engine.state().phase, BattlePhase::EnemyTurn);
    assert_eq!(engine.state().combo_count, 1);
    assert_eq!(engine.state().player.position, PLAYER_HOME);

    engine.advance(1_000);
    assert_eq!(engine.state().player.health, 90);
    assert_eq!(
        engine.state().enemy.current_action,
        Some(ActionTag::Enemy(EnemyAction::TentacleSlam))
    );

    engine.advance(800);
    assert_eq!(engine.state().phase, BattlePhase::PlayerTurn);
    assert_eq!(engine.state().enemy.current_action, None);
    assert_eq!(engine.pending_timers(), 0);
    assert_eq!(engine.take_outcome(), None);
}

#[test]
fn each_link_lands_on_its_cumulative_delay() {
    let mut engine = zeros_engine();
    engine.start_combo();
    let tag = |e: &BattleEngine| e.state().player.current_action;

    assert_eq!(tag(&engine), Some(ActionTag::Player(PlayerAction::Dash)));
    engine.advance(199);
    assert_eq!(tag(&engine), Some(ActionTag::Player(PlayerAction::Dash)));
    engine.advance(1);
    assert_eq!(tag(&engine), Some(ActionTag::Player(PlayerAction::Slash)));
    engine.advance(300);
    assert_eq!(tag(&engine), Some(ActionTag::Player(PlayerAction::Spin)));
    engine.advance(400);
    assert_eq!(tag(&engine), Some(ActionTag::Player(PlayerAction::EnergyBurst)));
}

#[test]
fn one_big_advance_matches_many_small_ones() {
    let mut big = zeros_engine();
    let mut small = zeros_engine();
    big.start_combo();
    small.start_combo();

    big.advance(3_200);
    for _ in 0..200 {
        small.advance(16);
    }

    assert_eq!(big.state().phase, small.state().phase);
    assert_eq!(big.state().player.health, small.state().player.health);
    assert_eq!(big.state().enemy.health, small.state().enemy.health);
    assert_eq!(big.state().combo_count, small.state().combo_count);
}

// ── Scenario: killing blow ────────────────────────────────────────────────────

#[test]
fn slash_kills_and_the_rest_of_the_combo_never_runs() {
    let mut engine = zeros_engine();
    engine.state_mut().enemy.health = 10;
    engine.start_combo();
    engine.advance(200);

    let state = engine.state();
    assert_eq!(state.phase, BattlePhase::Victory);
    assert_eq!(state.enemy.health, 0);
    assert_eq!(state.player.current_action, None);
    assert_eq!(state.combo_count, 0);
    assert_eq!(state.effects.damage_numbers.len(), 1);
    assert_eq!(engine.pending_timers(), 0);

    assert_eq!(engine.take_outcome(), Some(BattleOutcome::Victory));
    assert_eq!(engine.take_outcome(), None);

    engine.advance(10_000);
    assert_eq!(engine.state().phase, BattlePhase::Victory);
    assert_eq!(engine.state().effects.damage_numbers.len(), 1);
    assert!(!engine.start_combo());
}

// ── Scenario: enemy finishes the player ───────────────────────────────────────

#[test]
fn lightning_finishes_a_weakened_player() {
    let mut engine = engine_with_rolls(&[0.0, 0.0, 0.0, 0.5, 0.0]);
    engine.state_mut().player.health = 5;
    engine.start_combo();

    engine.advance(1_400);
    assert_eq!(engine.state().phase, BattlePhase::EnemyTurn);
    assert_eq!(engine.state().enemy.health, 35);

    engine.advance(1_000);
    assert_eq!(engine.state().phase, BattlePhase::Defeat);
    assert_eq!(engine.state().player.health, 0);
    assert_eq!(engine.state().enemy.current_action, None);
    assert_eq!(engine.pending_timers(), 0);
    assert_eq!(engine.take_outcome(), Some(BattleOutcome::Defeat));
}

// ── Scenario: unmount mid-combo ───────────────────────────────────────────────

#[test]
fn unmount_mid_combo_freezes_everything() {
    let mut engine = zeros_engine();
    engine.start_combo();
    engine.advance(250);
    assert_eq!(engine.state().enemy.health, 85);

    engine.unmount();
    assert!(!engine.is_live());
    assert_eq!(engine.pending_timers(), 0);

    let frozen = engine.state().clone();
    engine.advance(10_000);
    assert!(!engine.tick());
    assert!(!engine.start_combo());
    assert!(engine.scene().is_none());
    assert_eq!(engine.state(), &frozen);
    assert_eq!(engine.take_outcome(), None);
}

#[test]
fn unmount_twice_is_harmless() {
    let mut engine = zeros_engine();
    engine.unmount();
    engine.unmount();
    assert!(!engine.is_live());
}

// ── Input guard ───────────────────────────────────────────────────────────────

#[test]
fn input_during_combo_is_ignored() {
    let mut engine = zeros_engine();
    assert!(engine.start_combo());
    engine.advance(100);
    let before = engine.state().clone();
    let pending = engine.pending_timers();

    assert!(!engine.start_combo());
    assert_eq!(engine.state(), &before);
    assert_eq!(engine.pending_timers(), pending);
}

#[test]
fn input_on_enemy_turn_is_ignored() {
    let mut engine = zeros_engine();
    engine.start_combo();
    engine.advance(1_500);
    assert_eq!(engine.state().phase, BattlePhase::EnemyTurn);

    let before = engine.state().clone();
    assert!(!engine.start_combo());
    assert_eq!(engine.state(), &before);
}

#[test]
fn new_combo_resets_the_counter_shown_mid_combo() {
    let mut engine = zeros_engine();
    engine.start_combo();
    engine.advance(3_200);
    assert_eq!(engine.state().combo_count, 1);
    assert!(engine.start_combo());
    assert_eq!(engine.state().combo_count, 0);
}

// ── Seeded play ───────────────────────────────────────────────────────────────

#[test]
fn seeded_battles_always_settle() {
    for seed in 0..25 {
        let mut engine =
            BattleEngine::mount(surface(), Box::new(seeded(seed)), Box::new(seeded(seed + 1)));
        let mut turns = 0;
        while !engine.state().phase.is_terminal() {
            assert!(engine.start_combo(), "seed {seed}: combo refused");
            engine.advance(3_200);
            for _ in 0..10 {
                engine.tick();
            }
            turns += 1;
            assert!(turns < 20, "seed {seed}: no end in sight");
        }
        let state = engine.state();
        assert!(state.player.health == 0 || state.enemy.health == 0);
        assert_eq!(engine.pending_timers(), 0);
        assert!(engine.take_outcome().is_some());
    }
}

#[test]
fn same_seed_same_battle() {
    let play = |seed| {
        let mut engine =
            BattleEngine::mount(surface(), Box::new(seeded(seed)), Box::new(seeded(99)));
        engine.start_combo();
        engine.advance(3_200);
        (engine.state().player.health, engine.state().enemy.health)
    };
    assert_eq!(play(42), play(42));
}

// ── Render loop and surface ───────────────────────────────────────────────────

#[test]
fn tick_ages_effects_but_not_the_encounter() {
    let mut engine = zeros_engine();
    engine.start_combo();
    let particles = engine.state().effects.particles.len();
    assert!(particles > 0);

    assert!(engine.tick());
    assert_eq!(engine.state().frame, 1);
    assert_eq!(engine.state().player.current_action, Some(ActionTag::Player(PlayerAction::Dash)));
    assert!(engine.state().effects.particles.iter().all(|p| p.life < p.max_life));
}

#[test]
fn resize_keeps_the_encounter() {
    let mut engine = zeros_engine();
    engine.start_combo();
    engine.advance(300);
    let before = engine.state().clone();

    engine.resize(120, 40);
    let surface = engine.surface().unwrap();
    assert_eq!((surface.cols, surface.rows), (120, 40));
    assert_eq!(engine.state(), &before);
    assert!(engine.pending_timers() > 0);
}

#[test]
fn no_surface_means_no_render_loop() {
    let mut engine =
        BattleEngine::mount(None, Box::new(Scripted::zeros()), Box::new(Scripted::zeros()));
    assert!(engine.is_live());
    assert!(!engine.is_rendering());
    assert!(!engine.tick());
    assert!(engine.scene().is_none());
    assert_eq!(engine.state().frame, 0);

    engine.resize(100, 30);
    assert!(engine.surface().is_none());
}
