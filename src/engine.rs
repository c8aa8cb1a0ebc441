//! The battle screen's engine: owns the encounter, its timers and the
//! random streams, and exposes the mount/unmount contract to the host.
//!
//! Two timing domains meet here. `advance` moves the logical clock and
//! fires due choreography timers, one at a time; `tick` is the render
//! tick and only ever touches transient effects.

use tracing::{debug, info};

use crate::choreography::{self, Dice, Step};
use crate::compute;
use crate::display::Surface;
use crate::effects;
use crate::entities::{BattleOutcome, BattleState, PlayerAction};
use crate::random::RandomSource;
use crate::scene::{self, Scene};
use crate::scheduler::Scheduler;

pub struct BattleEngine {
    state: BattleState,
    timers: Scheduler<Step>,
    rolls: Box<dyn RandomSource>,
    cosmetic: Box<dyn RandomSource>,
    surface: Option<Surface>,
    clock_ms: u64,
    live: bool,
    /// Outcome waiting to be picked up by the host.
    unreported: Option<BattleOutcome>,
}

impl BattleEngine {
    /// Set up a fresh encounter. Without a surface the encounter exists but
    /// the render loop never runs.
    pub fn mount(
        surface: Option<Surface>,
        rolls: Box<dyn RandomSource>,
        cosmetic: Box<dyn RandomSource>,
    ) -> Self {
        let mut state = BattleState::new();
        compute::start_encounter(&mut state);
        info!(?surface, "battle mounted");
        Self {
            state,
            timers: Scheduler::new(),
            rolls,
            cosmetic,
            surface,
            clock_ms: 0,
            live: true,
            unreported: None,
        }
    }

    /// Stop everything. Pending timers are dropped and later calls to
    /// `advance` / `tick` / `start_combo` do nothing.
    pub fn unmount(&mut self) {
        if !self.live {
            return;
        }
        self.live = false;
        let dropped = self.timers.cancel_all();
        info!(dropped, "battle unmounted");
    }

    /// The single input: begin the four-link combo. Ignored unless it is the
    /// player's turn with nothing in flight.
    pub fn start_combo(&mut self) -> bool {
        if !self.live || !compute::can_begin_player_action(&self.state) {
            debug!(phase = ?self.state.phase, "start combo ignored");
            return false;
        }
        self.state.combo_count = 0;
        self.run(Step::Player(PlayerAction::Dash));
        true
    }

    /// Move the logical clock forward and fire every timer that came due.
    pub fn advance(&mut self, elapsed_ms: u64) {
        if !self.live {
            return;
        }
        let target = self.clock_ms.saturating_add(elapsed_ms);
        while let Some((token, step)) = self.timers.pop_due(target) {
            // Follow-ups are staged from the moment their parent fired.
            self.clock_ms = token.due_ms();
            self.run(step);
        }
        self.clock_ms = target;
    }

    /// One render tick. Returns `false` when the render loop is not running.
    pub fn tick(&mut self) -> bool {
        if !self.is_rendering() {
            return false;
        }
        effects::advance(&mut self.state.effects, self.clock_ms, &mut *self.cosmetic);
        self.state.frame += 1;
        true
    }

    /// Snapshot of the current frame, if the render loop is running.
    pub fn scene(&self) -> Option<Scene> {
        self.is_rendering()
            .then(|| scene::compose(&self.state, self.clock_ms))
    }

    /// New viewport dimensions. Only the surface changes.
    pub fn resize(&mut self, cols: u16, rows: u16) {
        if let Some(surface) = self.surface.as_mut() {
            *surface = surface.resized(cols, rows);
            debug!(cols, rows, "surface resized");
        }
    }

    /// The "battle ended" event; yields the outcome exactly once.
    pub fn take_outcome(&mut self) -> Option<BattleOutcome> {
        self.unreported.take()
    }

    pub fn state(&self) -> &BattleState {
        &self.state
    }

    /// Direct access for hosts that stage a particular encounter.
    pub fn state_mut(&mut self) -> &mut BattleState {
        &mut self.state
    }

    pub fn surface(&self) -> Option<Surface> {
        self.surface
    }

    pub fn clock_ms(&self) -> u64 {
        self.clock_ms
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    pub fn is_live(&self) -> bool {
        self.live
    }

    pub fn is_rendering(&self) -> bool {
        self.live && self.surface.is_some()
    }

    fn run(&mut self, step: Step) {
        let mut dice = Dice {
            rolls: &mut *self.rolls,
            cosmetic: &mut *self.cosmetic,
        };
        let result = choreography::perform(step, &mut self.state, self.clock_ms, &mut dice);
        if let Some(outcome) = result.outcome {
            let dropped = self.timers.cancel_all();
            debug!(dropped, "remaining chain cancelled");
            self.unreported = Some(outcome);
            return;
        }
        if let Some(next) = result.next {
            self.timers.schedule(self.clock_ms, next.delay_ms, next.step);
        }
    }
}
