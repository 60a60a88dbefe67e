/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory, the CWD or
/// `~/.local/share/pixel-collect`. Falls back to defaults if the file is
/// missing or incomplete. Problems found while loading are kept in
/// `GameConfig::warnings` and logged once the logger is up (the logger's
/// own target comes from this file).

use serde::Deserialize;
use std::path::PathBuf;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub timing: TimingConfig,
    pub audio: AudioConfig,
    pub gamepad: GamepadConfig,
    pub session_id: String,
    pub save_dir: Option<PathBuf>,
    pub catalog_file: Option<PathBuf>,
    pub log_file: PathBuf,
    pub log_level: String,
    pub seed: Option<u64>,
    pub warnings: Vec<String>,
}

/// Every period/delay the session schedules, in milliseconds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimingConfig {
    pub motion_tick_ms: u64,
    pub jump_tick_ms: u64,
    pub mascot_cycle_ms: u64,
    pub level_advance_ms: u64,
    pub error_notice_ms: u64,
    pub gait_moving_ms: u64,
    pub gait_idle_ms: u64,
    pub frame_sleep_ms: u64,
}

#[derive(Clone, Debug)]
pub struct AudioConfig {
    pub muted: bool,
    pub volume: f32,
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub jump: Vec<String>,
    pub confirm: Vec<String>,
    pub cancel: Vec<String>,
    pub level_prev: Vec<String>,
    pub level_next: Vec<String>,
}

impl Default for TimingConfig {
    fn default() -> Self {
        let t = TomlTiming::default();
        TimingConfig {
            motion_tick_ms: t.motion_tick_ms,
            jump_tick_ms: t.jump_tick_ms,
            mascot_cycle_ms: t.mascot_cycle_ms,
            level_advance_ms: t.level_advance_ms,
            error_notice_ms: t.error_notice_ms,
            gait_moving_ms: t.gait_moving_ms,
            gait_idle_ms: t.gait_idle_ms,
            frame_sleep_ms: t.frame_sleep_ms,
        }
    }
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    timing: TomlTiming,
    #[serde(default)]
    audio: TomlAudio,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlTiming {
    #[serde(default = "default_motion_tick")]
    motion_tick_ms: u64,
    #[serde(default = "default_jump_tick")]
    jump_tick_ms: u64,
    #[serde(default = "default_mascot_cycle")]
    mascot_cycle_ms: u64,
    #[serde(default = "default_level_advance")]
    level_advance_ms: u64,
    #[serde(default = "default_error_notice")]
    error_notice_ms: u64,
    #[serde(default = "default_gait_moving")]
    gait_moving_ms: u64,
    #[serde(default = "default_gait_idle")]
    gait_idle_ms: u64,
    #[serde(default = "default_frame_sleep")]
    frame_sleep_ms: u64,
}

#[derive(Deserialize, Debug)]
struct TomlAudio {
    #[serde(default)]
    muted: bool,
    #[serde(default = "default_volume")]
    volume: f32,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_jump")]
    jump: Vec<String>,
    #[serde(default = "default_confirm")]
    confirm: Vec<String>,
    #[serde(default = "default_cancel")]
    cancel: Vec<String>,
    #[serde(default = "default_level_prev")]
    level_prev: Vec<String>,
    #[serde(default = "default_level_next")]
    level_next: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_session_id")]
    session_id: String,
    #[serde(default)]
    save_dir: Option<String>,
    #[serde(default)]
    catalog_file: Option<String>,
    #[serde(default = "default_log_file")]
    log_file: String,
    #[serde(default = "default_log_level")]
    log_level: String,
    #[serde(default)]
    seed: Option<u64>,
}

// ── Defaults ──

fn default_motion_tick() -> u64 { 50 }
fn default_jump_tick() -> u64 { 50 }
fn default_mascot_cycle() -> u64 { 5000 }
fn default_level_advance() -> u64 { 2000 }
fn default_error_notice() -> u64 { 5000 }
fn default_gait_moving() -> u64 { 150 }
fn default_gait_idle() -> u64 { 400 }
fn default_frame_sleep() -> u64 { 10 }

fn default_volume() -> f32 { 0.3 }

fn default_jump() -> Vec<String> { vec!["A".into(), "B".into()] }
fn default_confirm() -> Vec<String> { vec!["Start".into(), "X".into()] }
fn default_cancel() -> Vec<String> { vec!["Select".into(), "Y".into()] }
fn default_level_prev() -> Vec<String> { vec!["L1".into()] }
fn default_level_next() -> Vec<String> { vec!["R1".into()] }

fn default_session_id() -> String { "default".into() }
fn default_log_file() -> String { "pixel-collect.log".into() }
fn default_log_level() -> String { "info".into() }

impl Default for TomlTiming {
    fn default() -> Self {
        TomlTiming {
            motion_tick_ms: default_motion_tick(),
            jump_tick_ms: default_jump_tick(),
            mascot_cycle_ms: default_mascot_cycle(),
            level_advance_ms: default_level_advance(),
            error_notice_ms: default_error_notice(),
            gait_moving_ms: default_gait_moving(),
            gait_idle_ms: default_gait_idle(),
            frame_sleep_ms: default_frame_sleep(),
        }
    }
}

impl Default for TomlAudio {
    fn default() -> Self {
        TomlAudio { muted: false, volume: default_volume() }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            jump: default_jump(),
            confirm: default_confirm(),
            cancel: default_cancel(),
            level_prev: default_level_prev(),
            level_next: default_level_next(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            session_id: default_session_id(),
            save_dir: None,
            catalog_file: None,
            log_file: default_log_file(),
            log_level: default_log_level(),
            seed: None,
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from the first `config.toml` found in the candidate dirs.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let mut warnings = Vec::new();
        let toml_cfg = load_toml(&search_dirs, &mut warnings);
        Self::resolve(toml_cfg, &search_dirs, warnings)
    }

    /// Parse config text directly. Parse errors yield defaults plus a warning.
    #[cfg(test)]
    pub fn from_toml_str(text: &str) -> Self {
        let mut warnings = Vec::new();
        let toml_cfg = parse_toml(text, &mut warnings);
        Self::resolve(toml_cfg, &[], warnings)
    }

    fn resolve(t: TomlConfig, search_dirs: &[PathBuf], mut warnings: Vec<String>) -> Self {
        let mut volume = t.audio.volume;
        if !(0.0..=1.0).contains(&volume) {
            warnings.push(format!("audio.volume {volume} out of range, clamped to 0..=1"));
            volume = if volume.is_finite() { volume.clamp(0.0, 1.0) } else { default_volume() };
        }

        let session_id = sanitize_session_id(&t.general.session_id, &mut warnings);

        // Relative catalog paths are looked up next to config.toml first
        let catalog_file = t.general.catalog_file.map(|name| {
            let p = PathBuf::from(&name);
            if p.is_absolute() {
                p
            } else {
                search_dirs.iter()
                    .map(|d| d.join(&name))
                    .find(|p| p.is_file())
                    .unwrap_or(p)
            }
        });

        GameConfig {
            timing: TimingConfig {
                motion_tick_ms: t.timing.motion_tick_ms,
                jump_tick_ms: t.timing.jump_tick_ms,
                mascot_cycle_ms: t.timing.mascot_cycle_ms,
                level_advance_ms: t.timing.level_advance_ms,
                error_notice_ms: t.timing.error_notice_ms,
                gait_moving_ms: t.timing.gait_moving_ms,
                gait_idle_ms: t.timing.gait_idle_ms,
                frame_sleep_ms: t.timing.frame_sleep_ms,
            },
            audio: AudioConfig { muted: t.audio.muted, volume },
            gamepad: GamepadConfig {
                jump: t.gamepad.jump,
                confirm: t.gamepad.confirm,
                cancel: t.gamepad.cancel,
                level_prev: t.gamepad.level_prev,
                level_next: t.gamepad.level_next,
            },
            session_id,
            save_dir: t.general.save_dir.map(PathBuf::from),
            catalog_file,
            log_file: PathBuf::from(t.general.log_file),
            log_level: t.general.log_level,
            seed: t.general.seed,
            warnings,
        }
    }
}

/// Session ids become file names; keep them to a safe character set.
fn sanitize_session_id(raw: &str, warnings: &mut Vec<String>) -> String {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect();
    if cleaned.is_empty() {
        warnings.push(format!("general.session_id {raw:?} is unusable, using \"default\""));
        return default_session_id();
    }
    if cleaned != raw {
        warnings.push(format!("general.session_id {raw:?} sanitized to {cleaned:?}"));
    }
    cleaned
}

/// Candidate directories to search: exe dir + CWD + XDG data dir (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    // 3. XDG data home (~/.local/share/pixel-collect)
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/pixel-collect");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

fn parse_toml(text: &str, warnings: &mut Vec<String>) -> TomlConfig {
    match toml::from_str::<TomlConfig>(text) {
        Ok(cfg) => cfg,
        Err(e) => {
            warnings.push(format!("config.toml parse error, using defaults: {e}"));
            TomlConfig::default()
        }
    }
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf], warnings: &mut Vec<String>) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => return parse_toml(&text, warnings),
                Err(e) => {
                    warnings.push(format!("could not read {}: {e}", path.display()));
                }
            }
        }
    }
    TomlConfig::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let cfg = GameConfig::from_toml_str("");
        assert_eq!(cfg.timing, TimingConfig::default());
        assert_eq!(cfg.timing.motion_tick_ms, 50);
        assert_eq!(cfg.timing.mascot_cycle_ms, 5000);
        assert_eq!(cfg.timing.gait_idle_ms, 400);
        assert!(!cfg.audio.muted);
        assert_eq!(cfg.audio.volume, 0.3);
        assert_eq!(cfg.session_id, "default");
        assert_eq!(cfg.log_level, "info");
        assert!(cfg.save_dir.is_none());
        assert!(cfg.warnings.is_empty());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = GameConfig::from_toml_str(
            r#"
            [timing]
            motion_tick_ms = 30

            [audio]
            muted = true

            [general]
            session_id = "player-2"
            seed = 7
            "#,
        );
        assert_eq!(cfg.timing.motion_tick_ms, 30);
        assert_eq!(cfg.timing.jump_tick_ms, 50);
        assert!(cfg.audio.muted);
        assert_eq!(cfg.audio.volume, 0.3);
        assert_eq!(cfg.session_id, "player-2");
        assert_eq!(cfg.seed, Some(7));
        assert_eq!(cfg.gamepad.level_next, vec!["R1".to_string()]);
    }

    #[test]
    fn parse_error_falls_back_with_warning() {
        let cfg = GameConfig::from_toml_str("[timing\nmotion_tick_ms = ");
        assert_eq!(cfg.timing, TimingConfig::default());
        assert_eq!(cfg.warnings.len(), 1);
    }

    #[test]
    fn volume_is_clamped() {
        let cfg = GameConfig::from_toml_str("[audio]\nvolume = 4.0");
        assert_eq!(cfg.audio.volume, 1.0);
        assert_eq!(cfg.warnings.len(), 1);
    }

    #[test]
    fn session_id_is_sanitized() {
        let cfg = GameConfig::from_toml_str("[general]\nsession_id = \"../evil\"");
        assert_eq!(cfg.session_id, "evil");
        let cfg = GameConfig::from_toml_str("[general]\nsession_id = \"///\"");
        assert_eq!(cfg.session_id, "default");
    }
}
