/// Jump state machine (vertical offset), independent of horizontal motion.
///
///   IDLE ──press──▶ RISING ──height ≥ ceiling──▶ FALLING ──height ≤ 0──▶ IDLE
///
/// Each phase switch happens on the tick *after* the threshold is reached.
/// Rising is +4 per tick, falling −3 per tick (clamped at 0).

pub const JUMP_CEILING: i32 = 20;
pub const RISE_PER_TICK: i32 = 4;
pub const FALL_PER_TICK: i32 = 3;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum JumpPhase {
    Idle,
    Rising,
    Falling,
}

/// Inconsistent jump state observed at a tick boundary.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct JumpFault {
    pub phase: JumpPhase,
    pub height: i32,
}

#[derive(Clone, Debug)]
pub struct Jump {
    phase: JumpPhase,
    height: i32,
}

impl Jump {
    pub fn new() -> Self {
        Jump { phase: JumpPhase::Idle, height: 0 }
    }

    #[cfg(test)]
    pub fn phase(&self) -> JumpPhase {
        self.phase
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn is_airborne(&self) -> bool {
        self.phase != JumpPhase::Idle
    }

    /// Start a jump. Returns false (no-op) while already airborne.
    pub fn press(&mut self) -> bool {
        if self.is_airborne() {
            return false;
        }
        self.phase = JumpPhase::Rising;
        true
    }

    /// Advance one jump tick. Returns the phase after the tick.
    pub fn tick(&mut self) -> Result<JumpPhase, JumpFault> {
        if self.height < 0 || (self.phase == JumpPhase::Idle && self.height != 0) {
            return Err(JumpFault { phase: self.phase, height: self.height });
        }
        match self.phase {
            JumpPhase::Idle => {}
            JumpPhase::Rising => {
                if self.height >= JUMP_CEILING {
                    self.phase = JumpPhase::Falling;
                } else {
                    self.height += RISE_PER_TICK;
                }
            }
            JumpPhase::Falling => {
                if self.height <= 0 {
                    self.phase = JumpPhase::Idle;
                    self.height = 0;
                } else {
                    self.height = (self.height - FALL_PER_TICK).max(0);
                }
            }
        }
        Ok(self.phase)
    }

    /// Abort any jump in progress (session teardown).
    pub fn reset(&mut self) {
        self.phase = JumpPhase::Idle;
        self.height = 0;
    }

    #[cfg(test)]
    pub fn force(&mut self, phase: JumpPhase, height: i32) {
        self.phase = phase;
        self.height = height;
    }
}

impl Default for Jump {
    fn default() -> Self {
        Jump::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_from_idle_starts_rising() {
        let mut j = Jump::new();
        assert!(!j.is_airborne());
        assert!(j.press());
        assert!(j.is_airborne());
        assert_eq!(j.phase(), JumpPhase::Rising);
        assert_eq!(j.height(), 0);
        // second press while airborne is ignored
        assert!(!j.press());
        assert_eq!(j.phase(), JumpPhase::Rising);
    }

    #[test]
    fn full_cycle_tick_counts() {
        let mut j = Jump::new();
        j.press();

        // Ticks 1-5: 4, 8, 12, 16, 20
        for expected in [4, 8, 12, 16, 20] {
            assert_eq!(j.tick(), Ok(JumpPhase::Rising));
            assert_eq!(j.height(), expected);
        }
        // Tick 6: ceiling reached → falling, height unchanged
        assert_eq!(j.tick(), Ok(JumpPhase::Falling));
        assert_eq!(j.height(), 20);

        // Ticks 7-13: 17, 14, 11, 8, 5, 2, 0 (clamped)
        for expected in [17, 14, 11, 8, 5, 2, 0] {
            assert_eq!(j.tick(), Ok(JumpPhase::Falling));
            assert_eq!(j.height(), expected);
        }
        // Tick 14: landed
        assert_eq!(j.tick(), Ok(JumpPhase::Idle));
        assert_eq!(j.height(), 0);
    }

    #[test]
    fn no_double_jump() {
        let mut j = Jump::new();
        j.press();
        j.tick().unwrap();
        assert!(!j.press());
        assert_eq!(j.height(), 4);
        assert_eq!(j.phase(), JumpPhase::Rising);

        j.force(JumpPhase::Falling, 10);
        assert!(!j.press());
        assert_eq!(j.phase(), JumpPhase::Falling);
    }

    #[test]
    fn idle_tick_is_stable() {
        let mut j = Jump::new();
        assert_eq!(j.tick(), Ok(JumpPhase::Idle));
        assert_eq!(j.height(), 0);
    }

    #[test]
    fn inconsistent_state_faults() {
        let mut j = Jump::new();
        j.force(JumpPhase::Idle, 7);
        assert_eq!(j.tick(), Err(JumpFault { phase: JumpPhase::Idle, height: 7 }));
        j.force(JumpPhase::Falling, -3);
        assert!(j.tick().is_err());
    }

    #[test]
    fn reset_lands_immediately() {
        let mut j = Jump::new();
        j.press();
        j.tick().unwrap();
        j.reset();
        assert_eq!(j.phase(), JumpPhase::Idle);
        assert_eq!(j.height(), 0);
    }
}
