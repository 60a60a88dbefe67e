/// Motion engine rules: held direction keys → horizontal displacement.
///
/// `Body` is the only state the motion engine may write (position and the
/// moving flag). Its fields are private to this module, so every write goes
/// through the functions below.

use super::input::{InputTracker, Key};

/// Playfield bounds (percent of width).
pub const PLAYFIELD_MIN: f32 = 5.0;
pub const PLAYFIELD_MAX: f32 = 85.0;
/// Displacement per motion tick.
pub const MOVE_STEP: f32 = 2.0;
/// Where a fresh session puts the character.
pub const START_POSITION: f32 = 20.0;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Displacement {
    None,
    Left,
    Right,
}

impl Displacement {
    pub fn moved(self) -> bool {
        self != Displacement::None
    }
}

/// The position was found outside the playfield (or not a number) at the
/// start of a tick.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct PositionFault(pub f32);

#[derive(Clone, Debug)]
pub struct Body {
    position: f32,
    is_moving: bool,
}

impl Body {
    pub fn new() -> Self {
        Body { position: START_POSITION, is_moving: false }
    }

    pub fn position(&self) -> f32 {
        self.position
    }

    pub fn is_moving(&self) -> bool {
        self.is_moving
    }

    pub fn set_moving(&mut self, moving: bool) {
        self.is_moving = moving;
    }

    #[cfg(test)]
    pub fn force_position(&mut self, position: f32) {
        self.position = position;
    }
}

impl Default for Body {
    fn default() -> Self {
        Body::new()
    }
}

pub fn in_playfield(position: f32) -> bool {
    position.is_finite() && (PLAYFIELD_MIN..=PLAYFIELD_MAX).contains(&position)
}

/// Advance one motion tick.
///
/// Right is evaluated first; at most one direction applies per tick. A
/// direction only applies while the character is not already at that edge,
/// and the result is clamped to the playfield.
pub fn tick(body: &mut Body, input: &InputTracker) -> Result<Displacement, PositionFault> {
    if !in_playfield(body.position) {
        return Err(PositionFault(body.position));
    }

    let pos = body.position;
    let displacement = if input.is_pressed(Key::Right) && pos < PLAYFIELD_MAX {
        body.position = (pos + MOVE_STEP).min(PLAYFIELD_MAX);
        Displacement::Right
    } else if input.is_pressed(Key::Left) && pos > PLAYFIELD_MIN {
        body.position = (pos - MOVE_STEP).max(PLAYFIELD_MIN);
        Displacement::Left
    } else {
        Displacement::None
    };

    Ok(displacement)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn held(keys: &[Key]) -> InputTracker {
        let mut t = InputTracker::new();
        for &k in keys {
            t.on_key_down(k);
        }
        t
    }

    #[test]
    fn right_moves_by_step() {
        let mut b = Body::new();
        assert_eq!(tick(&mut b, &held(&[Key::Right])), Ok(Displacement::Right));
        assert_eq!(b.position(), START_POSITION + MOVE_STEP);
    }

    #[test]
    fn left_moves_by_step() {
        let mut b = Body::new();
        assert_eq!(tick(&mut b, &held(&[Key::Left])), Ok(Displacement::Left));
        assert_eq!(b.position(), START_POSITION - MOVE_STEP);
    }

    #[test]
    fn both_keys_favor_right() {
        let mut b = Body::new();
        assert_eq!(tick(&mut b, &held(&[Key::Left, Key::Right])), Ok(Displacement::Right));
        assert_eq!(b.position(), 22.0);
    }

    #[test]
    fn right_edge_clamps_and_stops() {
        let mut b = Body::new();
        let input = held(&[Key::Right]);
        for _ in 0..100 {
            tick(&mut b, &input).unwrap();
        }
        assert_eq!(b.position(), PLAYFIELD_MAX);
        assert_eq!(tick(&mut b, &input), Ok(Displacement::None));
    }

    #[test]
    fn left_edge_clamps_and_stops() {
        let mut b = Body::new();
        let input = held(&[Key::Left]);
        for _ in 0..100 {
            tick(&mut b, &input).unwrap();
        }
        assert_eq!(b.position(), PLAYFIELD_MIN);
        assert_eq!(tick(&mut b, &input), Ok(Displacement::None));
    }

    #[test]
    fn both_keys_at_right_edge_fall_through_to_left() {
        let mut b = Body::new();
        b.force_position(PLAYFIELD_MAX);
        assert_eq!(tick(&mut b, &held(&[Key::Left, Key::Right])), Ok(Displacement::Left));
        assert_eq!(b.position(), PLAYFIELD_MAX - MOVE_STEP);
    }

    #[test]
    fn no_keys_no_displacement() {
        let mut b = Body::new();
        assert_eq!(tick(&mut b, &InputTracker::new()), Ok(Displacement::None));
        assert_eq!(b.position(), START_POSITION);
    }

    #[test]
    fn corrupt_position_is_a_fault() {
        let mut b = Body::new();
        b.force_position(f32::NAN);
        assert!(tick(&mut b, &held(&[Key::Right])).is_err());
        b.force_position(200.0);
        assert_eq!(tick(&mut b, &held(&[Key::Right])), Err(PositionFault(200.0)));
    }
}
