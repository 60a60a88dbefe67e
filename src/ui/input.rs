/// Terminal input tracker.
///
/// Drains crossterm events once per frame and tracks:
///   - the held state of the game keys (move left/right, jump)
///   - the raw key press events of this frame, for menu/meta handling
///
/// `KeyMerger` turns the held state of all devices into key-down /
/// key-up transitions for the session.
///
/// Uses crossterm's keyboard enhancement for Release events when available.
/// Falls back to timeout-based release detection on terminals that don't
/// report releases (a held key auto-repeats, so silence means released).

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::domain::input::Key;

/// After this duration without a Press/Repeat event, consider the key released.
/// Only used when the terminal doesn't report Release events.
const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

/// Logical game keys the tracker reports transitions for.
const GAME_KEYS: [Key; 4] = [Key::Left, Key::Right, Key::Up, Key::Space];

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Transition {
    Down(Key),
    Up(Key),
}

/// Terminal key → logical game key. Arrow keys and WASD-style letters.
pub fn game_key(code: KeyCode) -> Option<Key> {
    match code {
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Some(Key::Left),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Some(Key::Right),
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => Some(Key::Up),
        KeyCode::Char(' ') => Some(Key::Space),
        _ => None,
    }
}

/// Transitions between two held sets, in `GAME_KEYS` order.
fn diff(before: &[bool; 4], after: &[bool; 4]) -> Vec<Transition> {
    GAME_KEYS
        .iter()
        .zip(before.iter().zip(after.iter()))
        .filter_map(|(&key, (&was, &is))| match (was, is) {
            (false, true) => Some(Transition::Down(key)),
            (true, false) => Some(Transition::Up(key)),
            _ => None,
        })
        .collect()
}

/// Folds the held game keys of every input device into one set of
/// transitions, so a key held on two devices is released only once both
/// let go.
#[derive(Debug, Default)]
pub struct KeyMerger {
    reported: [bool; 4],
}

impl KeyMerger {
    pub fn new() -> Self {
        KeyMerger::default()
    }

    pub fn update(&mut self, sources: &[[bool; 4]]) -> Vec<Transition> {
        let mut held = [false; 4];
        for src in sources {
            for (h, s) in held.iter_mut().zip(src.iter()) {
                *h |= *s;
            }
        }
        let transitions = diff(&self.reported, &held);
        self.reported = held;
        transitions
    }

    /// Report every held key as released.
    pub fn release_all(&mut self) -> Vec<Transition> {
        let transitions = diff(&self.reported, &[false; 4]);
        self.reported = [false; 4];
        transitions
    }
}

/// Index of `key` in the held-state arrays, if it is a game key.
pub fn slot(key: Key) -> Option<usize> {
    GAME_KEYS.iter().position(|k| *k == key)
}

pub struct InputState {
    /// Timestamp of last Press/Repeat event for each key code.
    last_active: HashMap<KeyCode, Instant>,

    /// Raw Press events collected during drain, for meta-key handling.
    pub raw_events: Vec<KeyEvent>,

    /// Whether to honor Release events. Only true when keyboard
    /// enhancement is confirmed working.
    pub honor_release: bool,
}

impl InputState {
    pub fn new(honor_release: bool) -> Self {
        InputState {
            last_active: HashMap::with_capacity(16),
            raw_events: Vec::with_capacity(8),
            honor_release,
        }
    }

    /// Drain all pending terminal events and update key states.
    /// Call this once per frame.
    pub fn drain_events(&mut self) {
        self.raw_events.clear();

        // Read all available events without blocking
        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                match key.kind {
                    KeyEventKind::Release if self.honor_release => {
                        self.last_active.remove(&key.code);
                    }
                    KeyEventKind::Release => {
                        // Enhancement not confirmed; rely on timeout expiry
                    }
                    KeyEventKind::Press => {
                        self.raw_events.push(key);
                        self.last_active.insert(key.code, Instant::now());
                    }
                    _ => {
                        self.last_active.insert(key.code, Instant::now());
                    }
                }
            }
        }

        if !self.honor_release {
            let now = Instant::now();
            self.last_active.retain(|_, t| now.duration_since(*t) < HOLD_TIMEOUT);
        }
    }

    /// Held state of the game keys, indexed like `slot`.
    pub fn held_game_keys(&self) -> [bool; 4] {
        let mut held = [false; 4];
        for code in self.last_active.keys() {
            if let Some(i) = game_key(*code).and_then(slot) {
                held[i] = true;
            }
        }
        held
    }

    /// Forget every held key (tab switch).
    pub fn clear_held(&mut self) {
        self.last_active.clear();
    }

    /// Was this key pressed this frame?
    pub fn was_pressed(&self, code: KeyCode) -> bool {
        self.raw_events.iter().any(|k| k.code == code)
    }

    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.was_pressed(*c))
    }

    /// Check if any raw event this frame has Ctrl+C
    pub fn ctrl_c_pressed(&self) -> bool {
        self.raw_events.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_mapping() {
        assert_eq!(game_key(KeyCode::Left), Some(Key::Left));
        assert_eq!(game_key(KeyCode::Char('D')), Some(Key::Right));
        assert_eq!(game_key(KeyCode::Char('w')), Some(Key::Up));
        assert_eq!(game_key(KeyCode::Char(' ')), Some(Key::Space));
        assert_eq!(game_key(KeyCode::Char('m')), None);
        assert_eq!(game_key(KeyCode::Down), None);
    }

    #[test]
    fn diff_reports_edges_only() {
        let t = diff(&[true, false, false, true], &[true, true, false, false]);
        assert_eq!(t, vec![Transition::Down(Key::Right), Transition::Up(Key::Space)]);
        assert!(diff(&[false; 4], &[false; 4]).is_empty());
    }

    #[test]
    fn merger_releases_only_when_every_device_lets_go() {
        let left = [true, false, false, false];
        let none = [false; 4];
        let mut m = KeyMerger::new();
        assert_eq!(m.update(&[left, none]), vec![Transition::Down(Key::Left)]);
        // pad also holds left: nothing new
        assert!(m.update(&[left, left]).is_empty());
        // keyboard lets go, pad still holds
        assert!(m.update(&[none, left]).is_empty());
        assert_eq!(m.update(&[none, none]), vec![Transition::Up(Key::Left)]);
    }

    #[test]
    fn merger_release_all() {
        let mut m = KeyMerger::new();
        m.update(&[[true, false, true, false]]);
        assert_eq!(
            m.release_all(),
            vec![Transition::Up(Key::Left), Transition::Up(Key::Up)]
        );
        assert!(m.release_all().is_empty());
    }

    #[test]
    fn slots_follow_game_key_order() {
        assert_eq!(slot(Key::Left), Some(0));
        assert_eq!(slot(Key::Space), Some(3));
    }
}
