/// Cooperative virtual-time scheduler.
///
/// Every periodic or deferred action in a session (motion tick, jump tick,
/// level advance, mascot cycles, error dismissal, gait) is a timer here.
/// Time only moves when the owner drains due timers with `next_due` and
/// then calls `settle`, so tests drive it deterministically:
///
/// ```text
///   while let Some(fired) = sched.next_due(until) { dispatch(fired) }
///   sched.settle(until)
/// ```

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct TimerId(u64);

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum TimerKind {
    Motion,
    Jump,
    LevelAdvance,
    /// Catalog index of the mascot.
    MascotCycle(usize),
    ErrorDismiss,
    Gait,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Fired {
    pub id: TimerId,
    pub kind: TimerKind,
    /// Virtual time the timer fired at.
    pub at: u64,
}

#[derive(Clone, Debug)]
struct Timer {
    id: TimerId,
    kind: TimerKind,
    deadline: u64,
    period: Option<u64>,
}

#[derive(Debug, Default)]
pub struct Scheduler {
    now: u64,
    next_id: u64,
    timers: Vec<Timer>,
}

impl Scheduler {
    pub fn new() -> Self {
        Scheduler::default()
    }

    pub fn now(&self) -> u64 {
        self.now
    }

    /// Repeating timer; first fires one period from now.
    pub fn start_interval(&mut self, kind: TimerKind, period_ms: u64) -> TimerId {
        let period = period_ms.max(1);
        self.push(kind, self.now + period, Some(period))
    }

    pub fn start_once(&mut self, kind: TimerKind, delay_ms: u64) -> TimerId {
        self.push(kind, self.now + delay_ms, None)
    }

    fn push(&mut self, kind: TimerKind, deadline: u64, period: Option<u64>) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.timers.push(Timer { id, kind, deadline, period });
        id
    }

    /// Returns false if the timer was not active (already fired or cancelled).
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.id != id);
        self.timers.len() != before
    }

    #[cfg(test)]
    pub fn is_active(&self, id: TimerId) -> bool {
        self.timers.iter().any(|t| t.id == id)
    }

    #[cfg(test)]
    pub fn active_count(&self) -> usize {
        self.timers.len()
    }

    /// Pop the earliest timer due at or before `until` and move the clock to
    /// its deadline. Ties fire in creation order. Intervals are re-armed
    /// before being returned.
    pub fn next_due(&mut self, until: u64) -> Option<Fired> {
        let idx = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.deadline <= until)
            .min_by_key(|(_, t)| (t.deadline, t.id))
            .map(|(i, _)| i)?;

        let timer = &mut self.timers[idx];
        let fired = Fired { id: timer.id, kind: timer.kind, at: timer.deadline };
        self.now = self.now.max(timer.deadline);
        match timer.period {
            Some(p) => timer.deadline += p,
            None => {
                self.timers.swap_remove(idx);
            }
        }
        Some(fired)
    }

    /// Move the clock forward once nothing more is due.
    pub fn settle(&mut self, until: u64) {
        self.now = self.now.max(until);
    }

    pub fn clear(&mut self) {
        self.timers.clear();
    }
}
