/// Input tracker: live pressed/released state of keys.
///
/// Front-ends translate their native events (terminal keys, gamepad
/// buttons) into `Key` and report transitions. The simulation reads the
/// tracked state once per tick.

use std::collections::HashMap;

/// Logical key identifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Key {
    Left,
    Right,
    Up,
    Space,
}

impl Key {
    pub fn is_directional(self) -> bool {
        matches!(self, Key::Left | Key::Right)
    }

    /// Jump is bound to Up with Space as the secondary key.
    pub fn is_jump(self) -> bool {
        matches!(self, Key::Up | Key::Space)
    }
}

#[derive(Clone, Debug, Default)]
pub struct InputTracker {
    tracked: HashMap<Key, bool>,
}

impl InputTracker {
    pub fn new() -> Self {
        InputTracker { tracked: HashMap::with_capacity(8) }
    }

    pub fn on_key_down(&mut self, key: Key) {
        self.tracked.insert(key, true);
    }

    pub fn on_key_up(&mut self, key: Key) {
        self.tracked.insert(key, false);
    }

    /// Unknown keys read as released.
    pub fn is_pressed(&self, key: Key) -> bool {
        self.tracked.get(&key).copied().unwrap_or(false)
    }

    pub fn any_directional(&self) -> bool {
        self.is_pressed(Key::Left) || self.is_pressed(Key::Right)
    }

    /// Mark every tracked key released.
    pub fn release_all(&mut self) {
        for pressed in self.tracked.values_mut() {
            *pressed = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_key_defaults_to_released() {
        let t = InputTracker::new();
        assert!(!t.is_pressed(Key::Up));
        assert!(!t.any_directional());
    }

    #[test]
    fn down_then_up() {
        let mut t = InputTracker::new();
        t.on_key_down(Key::Right);
        assert!(t.is_pressed(Key::Right));
        assert!(t.any_directional());
        t.on_key_up(Key::Right);
        assert!(!t.is_pressed(Key::Right));
        assert!(!t.any_directional());
    }

    #[test]
    fn release_all_clears_every_key() {
        let mut t = InputTracker::new();
        t.on_key_down(Key::Left);
        t.on_key_down(Key::Space);
        t.release_all();
        assert!(!t.is_pressed(Key::Left));
        assert!(!t.is_pressed(Key::Space));
    }

    #[test]
    fn key_roles() {
        assert!(Key::Up.is_jump() && Key::Space.is_jump());
        assert!(!Key::Left.is_jump());
        assert!(Key::Left.is_directional() && Key::Right.is_directional());
        assert!(!Key::Space.is_directional() && !Key::Up.is_directional());
    }
}
