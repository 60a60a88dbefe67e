/// Events emitted by the session while handling input and timers.
/// The presentation layer consumes these for sound and notices.

#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    Collected { id: String },
    /// Random footstep while displacing; only emitted when not muted.
    MoveSound,
    JumpStarted,
    Landed,
    LevelAdvanceScheduled { to: u32 },
    LevelChanged { level: u32, manual: bool },
    Fault { message: String },
    ErrorCleared,
}
