/// Gamepad input tracker using gilrs.
///
/// Button mapping is loaded from config.toml via `load_button_config()`.
/// Default mapping:
///   D-pad / Left Stick    →  Move left / right
///   A / B                 →  Jump
///   Start / X             →  Confirm (open / collect in the showcase)
///   Select / Y            →  Cancel (close detail, leave tab)
///   L1 / R1               →  Previous / next level

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};

use crate::config::GamepadConfig;
use crate::domain::input::Key;
use super::input::slot;

#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
const STICK_DEADZONE: f32 = 0.25;

/// Logical button identifiers (one per physical button).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Btn {
    A,       // South
    B,       // East
    X,       // West
    Y,       // North
    L1,      // LeftTrigger
    R1,      // RightTrigger
    L2,      // LeftTrigger2
    R2,      // RightTrigger2
    Start,
    Select,
}

impl Btn {
    fn from_name(s: &str) -> Option<Btn> {
        match s.to_uppercase().as_str() {
            "A" | "SOUTH"  => Some(Btn::A),
            "B" | "EAST"   => Some(Btn::B),
            "X" | "WEST"   => Some(Btn::X),
            "Y" | "NORTH"  => Some(Btn::Y),
            "L1" | "LB" | "LEFTTRIGGER"  => Some(Btn::L1),
            "R1" | "RB" | "RIGHTTRIGGER" => Some(Btn::R1),
            "L2" | "LT" | "LEFTTRIGGER2"  => Some(Btn::L2),
            "R2" | "RT" | "RIGHTTRIGGER2" => Some(Btn::R2),
            "START" => Some(Btn::Start),
            "SELECT" | "BACK" => Some(Btn::Select),
            _ => None,
        }
    }

    #[cfg(feature = "gamepad")]
    fn from_gilrs(btn: Button) -> Option<Btn> {
        match btn {
            Button::South     => Some(Btn::A),
            Button::East      => Some(Btn::B),
            Button::West      => Some(Btn::X),
            Button::North     => Some(Btn::Y),
            Button::LeftTrigger  => Some(Btn::L1),
            Button::RightTrigger => Some(Btn::R1),
            Button::LeftTrigger2  => Some(Btn::L2),
            Button::RightTrigger2 => Some(Btn::R2),
            Button::Start     => Some(Btn::Start),
            Button::Select    => Some(Btn::Select),
            _ => None,
        }
    }
}

/// Per-button state: held (continuous) and just_pressed (edge).
#[derive(Clone, Copy, Debug, Default)]
struct BtnState {
    held: bool,
    just_pressed: bool,
}

/// Action-to-button mapping (loaded from config).
struct ActionMap {
    jump: Vec<Btn>,
    confirm: Vec<Btn>,
    cancel: Vec<Btn>,
    level_prev: Vec<Btn>,
    level_next: Vec<Btn>,
}

impl Default for ActionMap {
    fn default() -> Self {
        ActionMap {
            jump:       vec![Btn::A, Btn::B],
            confirm:    vec![Btn::Start, Btn::X],
            cancel:     vec![Btn::Select, Btn::Y],
            level_prev: vec![Btn::L1],
            level_next: vec![Btn::R1],
        }
    }
}

fn parse_list(names: &[String]) -> Vec<Btn> {
    names.iter().filter_map(|s| Btn::from_name(s)).collect()
}

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,

    // All tracked buttons (indexed by Btn)
    buttons: [BtnState; 10],

    dpad_left: bool,
    dpad_right: bool,
    dpad_up: bool,
    dpad_down: bool,
    stick_x: f32,
    stick_y: f32,

    action_map: ActionMap,

    pub connected: bool,
}

fn btn_index(btn: Btn) -> usize {
    btn as usize
}

impl GamepadState {
    pub fn new() -> Self {
        #[cfg(feature = "gamepad")]
        let (gilrs_opt, connected) = {
            match Gilrs::new() {
                Ok(g) => {
                    let has_pad = g.gamepads().next().is_some();
                    (Some(g), has_pad)
                }
                Err(e) => {
                    log::warn!("gamepad support unavailable: {e}");
                    (None, false)
                }
            }
        };
        #[cfg(not(feature = "gamepad"))]
        let connected = false;

        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs: gilrs_opt,
            buttons: [BtnState::default(); 10],
            dpad_left: false,
            dpad_right: false,
            dpad_up: false,
            dpad_down: false,
            stick_x: 0.0,
            stick_y: 0.0,
            action_map: ActionMap::default(),
            connected,
        }
    }

    /// Load button mapping from config. Lists with no recognised button
    /// names keep the default.
    pub fn load_button_config(&mut self, cfg: &GamepadConfig) {
        let map = &mut self.action_map;
        for (names, target) in [
            (&cfg.jump, &mut map.jump),
            (&cfg.confirm, &mut map.confirm),
            (&cfg.cancel, &mut map.cancel),
            (&cfg.level_prev, &mut map.level_prev),
            (&cfg.level_next, &mut map.level_next),
        ] {
            let parsed = parse_list(names);
            if !parsed.is_empty() {
                *target = parsed;
            }
        }
    }

    pub fn update(&mut self) {
        for b in &mut self.buttons { b.just_pressed = false; }

        #[cfg(feature = "gamepad")]
        self.poll_gilrs();
    }

    #[cfg(feature = "gamepad")]
    fn poll_gilrs(&mut self) {
        let gilrs = match &mut self.gilrs {
            Some(g) => g,
            None => return,
        };

        let events: Vec<_> = std::iter::from_fn(|| gilrs.next_event()).collect();

        for event in events {
            match event.event {
                EventType::ButtonPressed(btn, _) => {
                    self.connected = true;
                    self.set_button(btn, true);
                }
                EventType::ButtonReleased(btn, _) => {
                    self.connected = true;
                    self.set_button(btn, false);
                }
                EventType::AxisChanged(axis, value, _) => {
                    self.connected = true;
                    match axis {
                        Axis::LeftStickX => self.stick_x = value,
                        Axis::LeftStickY => self.stick_y = value,
                        _ => {}
                    }
                }
                EventType::Connected => {
                    log::info!("gamepad connected");
                    self.connected = true;
                }
                EventType::Disconnected => {
                    log::info!("gamepad disconnected");
                    self.connected = false;
                    self.release_all();
                }
                _ => {}
            }
        }
    }

    #[cfg(feature = "gamepad")]
    fn set_button(&mut self, gilrs_btn: Button, held: bool) {
        // D-pad handled separately (not in Btn enum)
        match gilrs_btn {
            Button::DPadLeft  => { self.dpad_left = held; return; }
            Button::DPadRight => { self.dpad_right = held; return; }
            Button::DPadUp    => { self.press_dpad_vertical(true, held); return; }
            Button::DPadDown  => { self.press_dpad_vertical(false, held); return; }
            _ => {}
        }

        if let Some(btn) = Btn::from_gilrs(gilrs_btn) {
            self.press(btn, held);
        }
    }

    #[cfg(feature = "gamepad")]
    fn press_dpad_vertical(&mut self, up: bool, held: bool) {
        if up { self.dpad_up = held; } else { self.dpad_down = held; }
    }

    fn press(&mut self, btn: Btn, held: bool) {
        let state = &mut self.buttons[btn_index(btn)];
        if held && !state.held {
            state.just_pressed = true;
        }
        state.held = held;
    }

    // ── Action queries (config-driven) ──

    fn any_just_pressed(&self, btns: &[Btn]) -> bool {
        btns.iter().any(|&b| self.buttons[btn_index(b)].just_pressed)
    }

    fn any_held(&self, btns: &[Btn]) -> bool {
        btns.iter().any(|&b| self.buttons[btn_index(b)].held)
    }

    pub fn confirm_pressed(&self) -> bool {
        self.any_just_pressed(&self.action_map.confirm)
    }
    pub fn cancel_pressed(&self) -> bool {
        self.any_just_pressed(&self.action_map.cancel)
    }
    pub fn level_prev_pressed(&self) -> bool {
        self.any_just_pressed(&self.action_map.level_prev)
    }
    pub fn level_next_pressed(&self) -> bool {
        self.any_just_pressed(&self.action_map.level_next)
    }

    /// D-pad up/down, for list navigation.
    pub fn vertical(&self) -> i32 {
        if self.dpad_up || self.stick_y > STICK_DEADZONE {
            -1
        } else if self.dpad_down || self.stick_y < -STICK_DEADZONE {
            1
        } else {
            0
        }
    }

    /// Held state of the game keys, indexed like the keyboard's.
    pub fn held_game_keys(&self) -> [bool; 4] {
        let mut held = [false; 4];
        let mut mark = |key: Key, on: bool| {
            if let Some(i) = slot(key) {
                held[i] |= on;
            }
        };
        mark(Key::Left, self.dpad_left || self.stick_x < -STICK_DEADZONE);
        mark(Key::Right, self.dpad_right || self.stick_x > STICK_DEADZONE);
        mark(Key::Up, self.any_held(&self.action_map.jump));
        held
    }

    // ── Internal ──

    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn release_all(&mut self) {
        for b in &mut self.buttons { *b = BtnState::default(); }
        self.dpad_left = false;
        self.dpad_right = false;
        self.dpad_up = false;
        self.dpad_down = false;
        self.stick_x = 0.0;
        self.stick_y = 0.0;
    }
}
