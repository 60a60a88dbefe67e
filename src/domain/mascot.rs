/// Mascot animation cycle: IDLE → BOUNCE → SPIN → IDLE, one step per period.
///
/// Each mascot owns its own cycle. The cycle only runs while the mascot is
/// visible and uncollected; when it becomes visible again it restarts at
/// IDLE instead of resuming.

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum MascotAnim {
    #[default]
    Idle,
    Bounce,
    Spin,
}

impl MascotAnim {
    pub fn next(self) -> MascotAnim {
        match self {
            MascotAnim::Idle => MascotAnim::Bounce,
            MascotAnim::Bounce => MascotAnim::Spin,
            MascotAnim::Spin => MascotAnim::Idle,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MascotAnim::Idle => "idle",
            MascotAnim::Bounce => "bounce",
            MascotAnim::Spin => "spin",
        }
    }
}

/// Whether a mascot's cycle should be running.
pub fn should_cycle(mascot_level: u32, current_level: u32, collected: bool) -> bool {
    mascot_level == current_level && !collected
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_order() {
        let a = MascotAnim::default();
        assert_eq!(a, MascotAnim::Idle);
        assert_eq!(a.next(), MascotAnim::Bounce);
        assert_eq!(a.next().next(), MascotAnim::Spin);
        assert_eq!(a.next().next().next(), MascotAnim::Idle);
    }

    #[test]
    fn cycles_only_on_own_level_while_uncollected() {
        assert!(should_cycle(2, 2, false));
        assert!(!should_cycle(2, 1, false));
        assert!(!should_cycle(2, 2, true));
    }
}
