/// Character walking frames and facing, derived from motion.

pub const GAIT_FRAMES: u8 = 4;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

#[derive(Clone, Debug, Default)]
pub struct Gait {
    frame: u8,
    facing: Facing,
}

impl Gait {
    pub fn new() -> Self {
        Gait::default()
    }

    pub fn frame(&self) -> u8 {
        self.frame
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    /// One gait timer tick.
    pub fn advance(&mut self) {
        self.frame = (self.frame + 1) % GAIT_FRAMES;
    }

    /// Facing follows the sign of the last position change; no change keeps it.
    pub fn observe(&mut self, previous: f32, current: f32) {
        if current > previous {
            self.facing = Facing::Right;
        } else if current < previous {
            self.facing = Facing::Left;
        }
    }
}

/// Gait timer period for the current motion state.
pub fn period_ms(is_moving: bool, moving_ms: u64, idle_ms: u64) -> u64 {
    if is_moving { moving_ms } else { idle_ms }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_wrap_at_four() {
        let mut g = Gait::new();
        for _ in 0..5 {
            g.advance();
        }
        assert_eq!(g.frame(), 1);
    }

    #[test]
    fn facing_tracks_last_change() {
        let mut g = Gait::new();
        g.observe(20.0, 18.0);
        assert_eq!(g.facing(), Facing::Left);
        g.observe(18.0, 18.0);
        assert_eq!(g.facing(), Facing::Left);
        g.observe(18.0, 20.0);
        assert_eq!(g.facing(), Facing::Right);
    }

    #[test]
    fn period_depends_on_motion() {
        assert_eq!(period_ms(true, 150, 400), 150);
        assert_eq!(period_ms(false, 150, 400), 400);
    }
}
