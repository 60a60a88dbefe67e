/// The session: single owner of the game state and the scheduler.
///
/// All mutation flows through here:
///   - key transitions (`key_down` / `key_up` / `release_all`)
///   - timer dispatch (`advance`)
///   - `collect` and `change_level`
///
/// Timer handlers return `Result<(), SimFault>`. A fault is caught at the
/// tick boundary: the faulting timer is cancelled, the error slot is set
/// and a dismissal timer is armed. Nothing propagates to the caller.
///
/// Events accumulate between calls and are drained by `advance` /
/// `take_events`.

use std::collections::HashMap;
use std::fmt;

use log::{debug, error, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::TimingConfig;
use crate::domain::catalog::{realm_name, Catalog};
use crate::domain::collection::{check_collision, completes_level, Progression};
use crate::domain::gait;
use crate::domain::input::{InputTracker, Key};
use crate::domain::jump::{JumpFault, JumpPhase};
use crate::domain::mascot::{should_cycle, MascotAnim};
use crate::domain::motion::{self, PositionFault};
use super::event::GameEvent;
use super::save::{ProgressStore, SavedState};
use super::scheduler::{Fired, Scheduler, TimerId, TimerKind};
use super::world::GameState;

/// Chance per displacing motion tick of a footstep sound.
pub const MOVE_SOUND_CHANCE: f64 = 0.3;

// ══════════════════════════════════════════════════════════════
// Faults
// ══════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq)]
pub enum SimFault {
    Position(PositionFault),
    Jump(JumpFault),
    UnknownMascot(usize),
}

impl SimFault {
    /// Text shown in the error notice.
    pub fn user_message(&self) -> &'static str {
        match self {
            SimFault::Position(_) => "Movement error occurred. Movement has been stopped.",
            SimFault::Jump(_) => "Jump error occurred. Jump has been reset.",
            SimFault::UnknownMascot(_) => "Animation error occurred.",
        }
    }
}

impl fmt::Display for SimFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimFault::Position(PositionFault(p)) => {
                write!(f, "character position {p} outside the playfield")
            }
            SimFault::Jump(JumpFault { phase, height }) => {
                write!(f, "inconsistent jump state {phase:?} at height {height}")
            }
            SimFault::UnknownMascot(i) => write!(f, "no mascot at catalog index {i}"),
        }
    }
}

impl std::error::Error for SimFault {}

// ══════════════════════════════════════════════════════════════
// Session
// ══════════════════════════════════════════════════════════════

/// Live timer handles. `None` means not running.
#[derive(Default)]
struct Timers {
    motion: Option<TimerId>,
    jump: Option<TimerId>,
    advance: Option<TimerId>,
    error: Option<TimerId>,
    gait: Option<TimerId>,
    mascots: HashMap<usize, TimerId>,
}

pub struct Session {
    catalog: Catalog,
    timing: TimingConfig,
    state: GameState,
    input: InputTracker,
    sched: Scheduler,
    timers: Timers,
    store: Box<dyn ProgressStore>,
    rng: StdRng,
    muted: bool,
    events: Vec<GameEvent>,
    motion_ticks: u64,
    torn_down: bool,
}

impl Session {
    /// Start a session, restoring progress from `store` when possible.
    pub fn new(
        catalog: Catalog,
        timing: TimingConfig,
        store: Box<dyn ProgressStore>,
        seed: Option<u64>,
        muted: bool,
    ) -> Self {
        let progression = match store.load() {
            Ok(Some(saved)) => {
                let p = saved.restore(&catalog);
                info!(
                    "restored progress: {} collected, score {}, level {}",
                    p.collected().len(), p.score(), p.level()
                );
                p
            }
            Ok(None) => Progression::new(catalog.total_levels()),
            Err(e) => {
                warn!("could not load saved progress, starting fresh: {e}");
                Progression::new(catalog.total_levels())
            }
        };

        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };

        let state = GameState::new(&catalog, progression);
        let mut session = Session {
            catalog,
            timing,
            state,
            input: InputTracker::new(),
            sched: Scheduler::new(),
            timers: Timers::default(),
            store,
            rng,
            muted,
            events: Vec::new(),
            motion_ticks: 0,
            torn_down: false,
        };
        session.arm_gait();
        session.sync_mascots();
        session
    }

    // ── Read access ──

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[cfg(test)]
    pub fn input(&self) -> &InputTracker {
        &self.input
    }

    #[cfg(test)]
    pub fn now(&self) -> u64 {
        self.sched.now()
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    #[cfg(test)]
    pub fn is_motion_active(&self) -> bool {
        self.timers.motion.is_some()
    }

    #[cfg(test)]
    pub fn is_jump_active(&self) -> bool {
        self.timers.jump.is_some()
    }

    pub fn is_advance_pending(&self) -> bool {
        self.timers.advance.is_some()
    }

    #[cfg(test)]
    pub fn is_mascot_cycling(&self, index: usize) -> bool {
        self.timers.mascots.contains_key(&index)
    }

    #[cfg(test)]
    pub fn active_timers(&self) -> usize {
        self.sched.active_count()
    }

    /// Number of motion tick callbacks run so far.
    #[cfg(test)]
    pub fn motion_ticks(&self) -> u64 {
        self.motion_ticks
    }

    pub fn realm(&self) -> &'static str {
        realm_name(self.state.progression.level())
    }

    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    // ── Input ──

    pub fn key_down(&mut self, key: Key) {
        if self.torn_down {
            return;
        }
        self.input.on_key_down(key);

        if key.is_directional() {
            self.set_moving(true);
            if self.timers.motion.is_none() {
                let period = self.timing.motion_tick_ms;
                self.timers.motion = Some(self.sched.start_interval(TimerKind::Motion, period));
            }
        }

        if key.is_jump() && self.state.jump.press() {
            if self.timers.jump.is_none() {
                let period = self.timing.jump_tick_ms;
                self.timers.jump = Some(self.sched.start_interval(TimerKind::Jump, period));
            }
            self.events.push(GameEvent::JumpStarted);
        }
    }

    pub fn key_up(&mut self, key: Key) {
        if self.torn_down {
            return;
        }
        self.input.on_key_up(key);
        // Motion keeps running while the other direction is still held
        if key.is_directional() && !self.input.any_directional() {
            self.stop_motion();
        }
    }

    /// Release every held key (focus loss, tab switch).
    pub fn release_all(&mut self) {
        self.input.release_all();
        self.stop_motion();
    }

    pub fn toggle_mute(&mut self) -> bool {
        self.muted = !self.muted;
        info!("sound {}", if self.muted { "muted" } else { "unmuted" });
        self.muted
    }

    fn stop_motion(&mut self) {
        if let Some(id) = self.timers.motion.take() {
            self.sched.cancel(id);
        }
        self.set_moving(false);
    }

    /// Update the moving flag; the gait period follows it.
    fn set_moving(&mut self, moving: bool) {
        if self.state.body.is_moving() == moving {
            return;
        }
        self.state.body.set_moving(moving);
        if !self.torn_down {
            self.arm_gait();
        }
    }

    fn arm_gait(&mut self) {
        if let Some(id) = self.timers.gait.take() {
            self.sched.cancel(id);
        }
        let period = gait::period_ms(
            self.state.body.is_moving(),
            self.timing.gait_moving_ms,
            self.timing.gait_idle_ms,
        );
        self.timers.gait = Some(self.sched.start_interval(TimerKind::Gait, period));
    }

    // ── Time ──

    /// Run every timer due within the next `ms` of virtual time, in
    /// deadline order, and return the events produced since the last drain.
    pub fn advance(&mut self, ms: u64) -> Vec<GameEvent> {
        let until = self.sched.now() + ms;
        while let Some(fired) = self.sched.next_due(until) {
            if let Err(fault) = self.dispatch(fired) {
                self.on_fault(fired, fault);
            }
        }
        self.sched.settle(until);
        self.take_events()
    }

    fn dispatch(&mut self, fired: Fired) -> Result<(), SimFault> {
        match fired.kind {
            TimerKind::Motion => self.on_motion_tick(),
            TimerKind::Jump => self.on_jump_tick(fired.id),
            TimerKind::LevelAdvance => {
                self.on_level_advance();
                Ok(())
            }
            TimerKind::MascotCycle(index) => self.on_mascot_cycle(index),
            TimerKind::ErrorDismiss => {
                self.timers.error = None;
                self.state.error = None;
                self.events.push(GameEvent::ErrorCleared);
                Ok(())
            }
            TimerKind::Gait => {
                self.state.gait.advance();
                Ok(())
            }
        }
    }

    fn on_motion_tick(&mut self) -> Result<(), SimFault> {
        self.motion_ticks += 1;
        let before = self.state.body.position();
        let moved = motion::tick(&mut self.state.body, &self.input).map_err(SimFault::Position)?;

        if moved.moved() {
            self.state.gait.observe(before, self.state.body.position());
            if !self.muted && self.rng.gen_bool(MOVE_SOUND_CHANCE) {
                self.events.push(GameEvent::MoveSound);
            }
        }

        // Position update strictly precedes the scan
        let hits: Vec<String> = check_collision(
            self.state.body.position(),
            self.state.progression.level(),
            self.state.progression.collected(),
            &self.catalog,
        )
        .into_iter()
        .map(str::to_string)
        .collect();

        for id in hits {
            self.collect(&id);
        }
        Ok(())
    }

    fn on_jump_tick(&mut self, id: TimerId) -> Result<(), SimFault> {
        let phase = self.state.jump.tick().map_err(SimFault::Jump)?;
        if phase == JumpPhase::Idle {
            self.sched.cancel(id);
            self.timers.jump = None;
            self.events.push(GameEvent::Landed);
        }
        Ok(())
    }

    fn on_level_advance(&mut self) {
        self.timers.advance = None;
        if self.state.progression.advance_level() {
            let level = self.state.progression.level();
            info!("level cleared, advancing to {level} ({})", realm_name(level));
            self.events.push(GameEvent::LevelChanged { level, manual: false });
            self.sync_mascots();
            self.persist();
        }
    }

    fn on_mascot_cycle(&mut self, index: usize) -> Result<(), SimFault> {
        let anim = self
            .state
            .mascot_anim_mut(index)
            .ok_or(SimFault::UnknownMascot(index))?;
        *anim = anim.next();
        Ok(())
    }

    fn on_fault(&mut self, fired: Fired, fault: SimFault) {
        error!("simulation fault in {:?} tick: {fault}", fired.kind);
        self.sched.cancel(fired.id);
        match fired.kind {
            TimerKind::Motion => {
                self.timers.motion = None;
                self.set_moving(false);
            }
            TimerKind::Jump => {
                self.timers.jump = None;
                self.state.jump.reset();
            }
            TimerKind::MascotCycle(index) => {
                self.timers.mascots.remove(&index);
            }
            TimerKind::LevelAdvance => self.timers.advance = None,
            TimerKind::ErrorDismiss => self.timers.error = None,
            TimerKind::Gait => self.timers.gait = None,
        }

        let message = fault.user_message().to_string();
        self.state.error = Some(message.clone());
        self.events.push(GameEvent::Fault { message });

        // A second fault replaces the notice and restarts its countdown
        if let Some(id) = self.timers.error.take() {
            self.sched.cancel(id);
        }
        let delay = self.timing.error_notice_ms;
        self.timers.error = Some(self.sched.start_once(TimerKind::ErrorDismiss, delay));
    }

    // ── Collection / levels ──

    /// Collect `id`. Returns false if it was already collected or unknown.
    pub fn collect(&mut self, id: &str) -> bool {
        if self.torn_down {
            return false;
        }
        if self.catalog.get(id).is_none() {
            warn!("collect: unknown collectible '{id}'");
            return false;
        }
        let level = self.state.progression.level();
        // Evaluated against the set as it was before this insertion
        let completes = completes_level(&self.catalog, level, self.state.progression.collected());

        if !self.state.progression.collect(id) {
            return false;
        }
        debug!("collected '{id}', score {}", self.state.progression.score());
        self.events.push(GameEvent::Collected { id: id.to_string() });

        if completes && level < self.state.progression.total_levels() {
            if let Some(old) = self.timers.advance.take() {
                self.sched.cancel(old);
            }
            let delay = self.timing.level_advance_ms;
            self.timers.advance = Some(self.sched.start_once(TimerKind::LevelAdvance, delay));
            self.events.push(GameEvent::LevelAdvanceScheduled { to: level + 1 });
        }

        self.sync_mascots();
        self.persist();
        true
    }

    /// Manual level navigation (±1), clamped. Returns true if the level changed.
    pub fn change_level(&mut self, direction: i32) -> bool {
        if self.torn_down || !self.state.progression.step_level(direction) {
            return false;
        }
        if let Some(id) = self.timers.advance.take() {
            self.sched.cancel(id);
        }
        let level = self.state.progression.level();
        info!("level changed to {level} ({})", realm_name(level));
        self.events.push(GameEvent::LevelChanged { level, manual: true });
        self.sync_mascots();
        self.persist();
        true
    }

    /// Start or stop mascot cycles to match visibility. A mascot that becomes
    /// visible always restarts at IDLE.
    fn sync_mascots(&mut self) {
        if self.torn_down {
            return;
        }
        let level = self.state.progression.level();
        for index in self.catalog.mascot_indices() {
            let entity = &self.catalog.entities()[index];
            let mascot_level = entity.kind.level().unwrap_or(0);
            let collected = self.state.progression.is_collected(&entity.id);
            let visible = should_cycle(mascot_level, level, collected);
            let running = self.timers.mascots.contains_key(&index);

            if visible && !running {
                if let Some(anim) = self.state.mascot_anim_mut(index) {
                    *anim = MascotAnim::Idle;
                }
                let period = self.timing.mascot_cycle_ms;
                let id = self.sched.start_interval(TimerKind::MascotCycle(index), period);
                self.timers.mascots.insert(index, id);
            } else if !visible && running {
                if let Some(id) = self.timers.mascots.remove(&index) {
                    self.sched.cancel(id);
                }
                if let Some(anim) = self.state.mascot_anim_mut(index) {
                    *anim = MascotAnim::Idle;
                }
            }
        }
    }

    fn persist(&self) {
        let snapshot = SavedState::capture(&self.state.progression);
        if let Err(e) = self.store.save(&snapshot) {
            warn!("could not save progress (continuing in memory): {e}");
        }
    }

    /// Cancel every timer and save one last time. Safe to call repeatedly.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.sched.clear();
        self.timers = Timers::default();
        self.input.release_all();
        self.state.body.set_moving(false);
        self.persist();
        info!(
            "session ended: score {}, {} motion ticks",
            self.state.progression.score(),
            self.motion_ticks
        );
    }

    #[cfg(test)]
    pub(crate) fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.teardown();
    }
}
