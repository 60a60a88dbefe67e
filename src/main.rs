/// Entry point and frame loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::fs::OpenOptions;
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyModifiers};
use log::{error, info, warn};

use config::GameConfig;
use domain::catalog::Catalog;
use sim::save;
use sim::session::Session;
use sim::world::{Tab, ViewState};
use ui::gamepad::GamepadState;
use ui::input::{InputState, KeyMerger, Transition};
use ui::renderer::Renderer;
use ui::sound::{process_sound_events, SoundEngine, ToneKind};

fn main() {
    let config = GameConfig::load();
    init_logging(&config);
    for w in &config.warnings {
        warn!("config: {w}");
    }

    let catalog = load_catalog(&config);
    let dir = config.save_dir.clone().or_else(save::default_save_dir);
    let store = save::open_store(dir.as_deref(), &config.session_id);

    let mut session = Session::new(
        catalog,
        config.timing.clone(),
        store,
        config.seed,
        config.audio.muted,
    );

    let mut renderer = Renderer::new();
    let honor_release = match renderer.init() {
        Ok(enhanced) => enhanced,
        Err(e) => {
            let _ = renderer.cleanup();
            eprintln!("Terminal init failed: {e}");
            return;
        }
    };
    info!("key release events: {}", if honor_release { "reported" } else { "timeout fallback" });

    let sound = SoundEngine::new();

    let result = game_loop(&mut session, &mut renderer, &sound, &config, honor_release);

    session.teardown();

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        error!("game loop failed: {e}");
        eprintln!("Game error: {e}");
    }

    let prog = &session.state().progression;
    println!();
    println!("Thanks for playing Pixel Collect!");
    println!(
        "Final Score: {}  ({} of {} collected)",
        prog.score(),
        prog.collected().len(),
        session.catalog().len()
    );
}

/// Log to `general.log_file`; the terminal belongs to the game. If the file
/// cannot be opened, logging stays off.
fn init_logging(config: &GameConfig) {
    let file = match OpenOptions::new().create(true).append(true).open(&config.log_file) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Logging disabled ({}): {e}", config.log_file.display());
            return;
        }
    };
    let env = env_logger::Env::default().default_filter_or(config.log_level.as_str());
    let _ = env_logger::Builder::from_env(env)
        .target(env_logger::Target::Pipe(Box::new(file)))
        .format_timestamp_millis()
        .try_init();
}

fn load_catalog(config: &GameConfig) -> Catalog {
    let path = match &config.catalog_file {
        Some(p) => p,
        None => return Catalog::builtin(),
    };
    let loaded = std::fs::read_to_string(path)
        .map_err(|e| e.to_string())
        .and_then(|text| Catalog::from_toml(&text).map_err(|e| e.to_string()));
    match loaded {
        Ok(c) => {
            info!("catalog: {} entities from {}", c.len(), path.display());
            c
        }
        Err(e) => {
            warn!("catalog {} unusable, using built-in: {e}", path.display());
            Catalog::builtin()
        }
    }
}

/// Front-end state that lives across frames.
struct Front {
    view: ViewState,
    kb: InputState,
    gp: GamepadState,
    merger: KeyMerger,
    /// Last gamepad vertical direction, for edge-triggered list moves.
    gp_vertical: i32,
}

enum Flow {
    Continue,
    Quit,
}

fn game_loop(
    session: &mut Session,
    renderer: &mut Renderer,
    sound: &SoundEngine,
    config: &GameConfig,
    honor_release: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut front = Front {
        view: ViewState::new(),
        kb: InputState::new(honor_release),
        gp: GamepadState::new(),
        merger: KeyMerger::new(),
        gp_vertical: 0,
    };
    front.gp.load_button_config(&config.gamepad);

    let frame_sleep = Duration::from_millis(config.timing.frame_sleep_ms);
    let mut last = Instant::now();

    loop {
        front.kb.drain_events();
        front.gp.update();

        if front.kb.ctrl_c_pressed() {
            break;
        }
        if let Flow::Quit = handle_meta(session, &mut front, sound, config) {
            break;
        }

        // Game keys only reach the session on the adventure tab
        if front.view.tab == Tab::Adventure {
            let sources = [front.kb.held_game_keys(), front.gp.held_game_keys()];
            for t in front.merger.update(&sources) {
                match t {
                    Transition::Down(key) => session.key_down(key),
                    Transition::Up(key) => session.key_up(key),
                }
            }
        }

        let elapsed = last.elapsed().as_millis() as u64;
        if elapsed > 0 {
            last += Duration::from_millis(elapsed);
            let events = session.advance(elapsed);
            process_sound_events(sound, &events, config.audio.volume, session.is_muted());
        }

        renderer.render(session, &front.view)?;
        std::thread::sleep(frame_sleep);
    }

    Ok(())
}

fn play_select(session: &Session, sound: &SoundEngine, config: &GameConfig) {
    if !session.is_muted() {
        sound.play_tone(ToneKind::Select, config.audio.volume, || {});
    }
}

fn switch_tab(session: &mut Session, front: &mut Front, tab: Tab, sound: &SoundEngine, config: &GameConfig) {
    let leaving_game = front.view.tab == Tab::Adventure;
    if !front.view.switch_to(tab) {
        return;
    }
    if leaving_game {
        // Held keys must not keep the character walking off-screen
        front.merger.release_all();
        front.kb.clear_held();
        session.release_all();
    }
    play_select(session, sound, config);
}

fn handle_meta(session: &mut Session, front: &mut Front, sound: &SoundEngine, config: &GameConfig) -> Flow {
    if front.view.editing_query {
        edit_query(front);
        return Flow::Continue;
    }

    let kb = &front.kb;
    let esc = kb.was_pressed(KeyCode::Esc) || front.gp.cancel_pressed();

    // ── Tabs ──
    let target = if kb.was_pressed(KeyCode::Tab) {
        Some(front.view.tab.next())
    } else if kb.was_pressed(KeyCode::Char('1')) {
        Some(Tab::Adventure)
    } else if kb.was_pressed(KeyCode::Char('2')) {
        Some(Tab::Showcase)
    } else if kb.was_pressed(KeyCode::Char('3')) {
        Some(Tab::Stats)
    } else {
        None
    };
    if let Some(tab) = target {
        switch_tab(session, front, tab, sound, config);
        return Flow::Continue;
    }

    // ── Global keys ──
    let kb = &front.kb;
    if kb.any_pressed(&[KeyCode::Char('m'), KeyCode::Char('M')]) {
        session.toggle_mute();
    }
    if kb.any_pressed(&[KeyCode::Char('['), KeyCode::PageUp]) || front.gp.level_prev_pressed() {
        session.change_level(-1);
    } else if kb.any_pressed(&[KeyCode::Char(']'), KeyCode::PageDown]) || front.gp.level_next_pressed() {
        session.change_level(1);
    }
    if kb.any_pressed(&[KeyCode::Char('q'), KeyCode::Char('Q')]) {
        return Flow::Quit;
    }

    match front.view.tab {
        Tab::Showcase => {
            if esc && front.view.detail.is_some() {
                front.view.detail = None;
                return Flow::Continue;
            }
            handle_showcase(session, front);
        }
        Tab::Adventure | Tab::Stats => {}
    }

    if esc { Flow::Quit } else { Flow::Continue }
}

fn handle_showcase(session: &mut Session, front: &mut Front) {
    let kb = &front.kb;
    let vertical = front.gp.vertical();
    let gp_step = if vertical != front.gp_vertical { vertical } else { 0 };
    front.gp_vertical = vertical;

    let up = kb.was_pressed(KeyCode::Up) || gp_step < 0;
    let down = kb.was_pressed(KeyCode::Down) || gp_step > 0;
    let confirm = kb.was_pressed(KeyCode::Enter) || front.gp.confirm_pressed();
    let search = kb.was_pressed(KeyCode::Char('/'));
    let rarity = kb.any_pressed(&[KeyCode::Char('r'), KeyCode::Char('R')]);
    let collect = kb.any_pressed(&[KeyCode::Char('c'), KeyCode::Char('C')]);

    let view = &mut front.view;
    if search {
        view.editing_query = true;
        return;
    }
    if rarity {
        view.filter.cycle_rarity();
        view.cursor = 0;
    }

    let ids: Vec<String> = view
        .filter
        .apply(session.catalog())
        .iter()
        .map(|e| e.id.clone())
        .collect();
    view.clamp_cursor(ids.len());

    if up {
        view.cursor = view.cursor.saturating_sub(1);
    } else if down && view.cursor + 1 < ids.len() {
        view.cursor += 1;
    }

    if confirm {
        let selected = ids.get(view.cursor).cloned();
        view.detail = if view.detail == selected { None } else { selected };
    }

    if collect {
        if let Some(id) = view.detail.clone() {
            session.collect(&id);
        }
    }
}

/// Typing into the showcase search box.
fn edit_query(front: &mut Front) {
    let view = &mut front.view;
    for ev in &front.kb.raw_events {
        match ev.code {
            KeyCode::Enter | KeyCode::Esc => view.editing_query = false,
            KeyCode::Backspace => {
                view.filter.query.pop();
            }
            KeyCode::Char(c) if !ev.modifiers.contains(KeyModifiers::CONTROL) => {
                view.filter.query.push(c);
            }
            _ => {}
        }
        if !view.editing_query {
            break;
        }
    }
    view.cursor = 0;
    view.detail = None;
}
