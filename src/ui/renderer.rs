/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// The renderer only reads the session; it never writes game state.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::catalog::{realm_name, Collectible, Kind, Rarity};
use crate::domain::collection::is_visible;
use crate::domain::gait::Facing;
use crate::domain::jump::JUMP_CEILING;
use crate::domain::mascot::MascotAnim;
use crate::domain::motion::{PLAYFIELD_MAX, PLAYFIELD_MIN};
use crate::domain::progress::{ProgressSnapshot, Tally};
use crate::sim::session::Session;
use crate::sim::world::{Tab, ViewState};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background for all "empty" terminal cells, so cleared
    /// areas and drawn cells share one color.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Sentinel cell used to invalidate the back buffer.
    /// Different from any real cell, so every position will be diff'd.
    const INVALID: Cell = Cell { ch: '\u{0}', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        let bg = match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        };
        Cell { ch, fg, bg }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer {
            width: w,
            height: h,
            cells: vec![Cell::BLANK; w * h],
        }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    /// Write a string at (x, y) with given colors. Each char occupies 1 column.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width { break; }
            self.set(x + i, y, Cell::new(ch, fg, bg));
        }
    }

    /// Paint a whole row with `bg`, then the text on top.
    fn put_bar(&mut self, y: usize, s: &str, fg: Color, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Cell::new(' ', fg, bg));
        }
        self.put_str(0, y, s, fg, bg);
    }
}

// ── Layout ──

const TAB_ROW: usize = 0;
const HUD_ROW: usize = 2;
const FIELD_TOP: usize = 4;
/// Rows between the top of the playfield and the ground line.
const FIELD_ROWS: usize = 9;
const GROUND_ROW: usize = FIELD_TOP + FIELD_ROWS;
const FIELD_MARGIN: usize = 2;

const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };
const NOTICE_BG: Color = Color::Rgb { r: 200, g: 180, b: 50 };
const ERROR_BG: Color = Color::Rgb { r: 170, g: 30, b: 30 };
const HI: Color = Color::Rgb { r: 80, g: 255, b: 80 };
const GOLD: Color = Color::Rgb { r: 255, g: 200, b: 50 };
const DIM: Color = Color::DarkGrey;

/// Terminal column for a playfield position (percent of width).
fn field_column(position: f32, width: usize) -> usize {
    let span = width.saturating_sub(2 * FIELD_MARGIN + 1).max(1) as f32;
    let t = (position.clamp(0.0, 100.0) / 100.0) * span;
    FIELD_MARGIN + t.round() as usize
}

/// Rows the character is drawn above the ground for a jump height.
fn lift_rows(height: i32) -> usize {
    // ceiling maps to 5 rows
    (height.clamp(0, JUMP_CEILING) as usize + 3) / 4
}

fn progress_bar(tally: &Tally, width: usize) -> String {
    let filled = (tally.ratio() * width as f64).round() as usize;
    let filled = filled.min(width);
    format!("[{}{}]", "#".repeat(filled), ".".repeat(width - filled))
}

fn rarity_color(r: Rarity) -> Color {
    match r {
        Rarity::Common => Color::Grey,
        Rarity::Uncommon => Color::Green,
        Rarity::Rare => Color::Blue,
        Rarity::Epic => Color::Magenta,
        Rarity::Legendary => GOLD,
        Rarity::Mythic => Color::Cyan,
    }
}

fn entity_glyph(e: &Collectible, anim: MascotAnim) -> char {
    match e.kind {
        Kind::Item { .. } => '◆',
        Kind::Creature { .. } => '♣',
        Kind::Mascot { .. } => match anim {
            MascotAnim::Idle => '☺',
            MascotAnim::Bounce => '☻',
            MascotAnim::Spin => '✦',
        },
    }
}

/// Leg frames for the walking character.
const GAIT_LEGS: [char; 4] = ['Λ', '|', 'λ', '|'];

// ── Renderer ──

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_tab: Option<Tab>,
    keyboard_enhanced: bool,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_tab: None,
            keyboard_enhanced: false,
        }
    }

    /// Enter raw mode and the alternate screen. Returns whether the terminal
    /// reports key releases.
    pub fn init(&mut self) -> io::Result<bool> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        if terminal::supports_keyboard_enhancement().unwrap_or(false) {
            self.keyboard_enhanced = execute!(
                self.writer,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )
            .is_ok();
        }

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        // Force full repaint on first frame: back ≠ front for every cell.
        self.back.cells.fill(Cell::INVALID);

        Ok(self.keyboard_enhanced)
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        if self.keyboard_enhanced {
            let _ = execute!(self.writer, PopKeyboardEnhancementFlags);
        }
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    pub fn render(&mut self, session: &Session, view: &ViewState) -> io::Result<()> {
        // Detect terminal resize
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        // Tab change → clear for clean transition
        if self.last_tab != Some(view.tab) {
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
            self.last_tab = Some(view.tab);
        }

        self.compose(session, view);
        self.flush_diff()?;

        // Swap: current front becomes next back
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    fn compose(&mut self, session: &Session, view: &ViewState) {
        self.front.clear();
        self.compose_tabs(session, view);
        match view.tab {
            Tab::Adventure => self.compose_adventure(session),
            Tab::Showcase => self.compose_showcase(session, view),
            Tab::Stats => self.compose_stats(session),
        }
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        // Explicit base colors; ResetColor would fall back to the terminal default.
        queue!(self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Cell::BASE_BG),
        )?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    need_move = true;
                    continue;
                }

                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }

                queue!(self.writer, Print(cell.ch))?;
                last_x = x;
                last_y = y;
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn compose_tabs(&mut self, session: &Session, view: &ViewState) {
        let mut x = 1;
        for (i, tab) in Tab::ALL.iter().enumerate() {
            let label = format!(" {} {} ", i + 1, tab.label());
            let (fg, bg) = if *tab == view.tab { (Color::Black, HI) } else { (Color::White, Color::Reset) };
            self.front.put_str(x, TAB_ROW, &label, fg, bg);
            x += label.chars().count() + 1;
        }
        let sound = if session.is_muted() { "♪ MUTED" } else { "♪ ON" };
        let sx = self.front.width.saturating_sub(sound.chars().count() + 1);
        self.front.put_str(sx, TAB_ROW, sound, DIM, Color::Reset);
    }

    fn compose_adventure(&mut self, session: &Session) {
        let state = session.state();
        let prog = &state.progression;
        let catalog = session.catalog();
        let buf_w = self.front.width;

        // ── HUD row ──
        let hud = format!(
            " {}   Level {}/{}   Score {:<6}  Lives {}",
            session.realm(),
            prog.level(),
            prog.total_levels(),
            prog.score(),
            "♥".repeat(prog.lives() as usize),
        );
        self.front.put_bar(HUD_ROW, &hud, Color::White, HUD_BG);

        // ── Playfield bounds ──
        for row in FIELD_TOP..GROUND_ROW {
            self.front.set(field_column(PLAYFIELD_MIN, buf_w) - 1, row, Cell::new('┆', DIM, Color::Reset));
            self.front.set(field_column(PLAYFIELD_MAX, buf_w) + 1, row, Cell::new('┆', DIM, Color::Reset));
        }
        for x in 0..buf_w {
            self.front.set(x, GROUND_ROW, Cell::new('▀', Color::Rgb { r: 90, g: 160, b: 70 }, Color::Reset));
        }

        // ── Entities ──
        for (index, e) in catalog.entities().iter().enumerate() {
            if !is_visible(e, prog.level()) || prog.is_collected(&e.id) {
                continue;
            }
            let col = field_column(e.position(), buf_w);
            let anim = state.mascot_anim(index).unwrap_or_default();
            let mut row = GROUND_ROW - 1;
            if matches!(e.kind, Kind::Mascot { .. }) {
                if anim == MascotAnim::Bounce {
                    row -= 1;
                }
                let tag = format!("{}:{}", e.name, anim.label());
                let tx = col.saturating_sub(tag.chars().count() / 2);
                self.front.put_str(tx, FIELD_TOP, &tag, Color::Cyan, Color::Reset);
            }
            self.front.set(col, row, Cell::new(entity_glyph(e, anim), rarity_color(e.rarity), Color::Reset));
        }

        // ── Character ──
        let col = field_column(state.body.position(), buf_w);
        let feet = GROUND_ROW - 1 - lift_rows(state.jump.height());
        let head = if state.gait.facing() == Facing::Right { '►' } else { '◄' };
        self.front.set(col, feet - 1, Cell::new(head, GOLD, Color::Reset));
        self.front.set(col, feet, Cell::new(GAIT_LEGS[state.gait.frame() as usize % GAIT_LEGS.len()], GOLD, Color::Reset));

        // ── Notices ──
        let mut row = GROUND_ROW + 2;
        if let Some(last) = prog.last_collected().and_then(|id| catalog.get(id)) {
            let msg = format!("COLLECTED: {}!", last.name.to_uppercase());
            self.front.put_str(1, row, &msg, HI, Color::Reset);
        }
        row += 1;
        if session.is_advance_pending() {
            let next = realm_name(prog.level() + 1);
            self.front.put_bar(row, &format!(" ◈ Level complete! Heading to the {next}... "), Color::Black, NOTICE_BG);
        }
        row += 1;
        if let Some(err) = &state.error {
            self.front.put_bar(row, &format!(" ! {err} "), Color::White, ERROR_BG);
        }

        // ── Help bar ──
        let help_row = self.front.height.saturating_sub(1).max(row + 2);
        let help = " ←→/AD:Move  ↑/W/Space:Jump  [ ]:Level  M:Mute  Tab/1-3:View  Q:Quit";
        self.front.put_str(0, help_row, help, DIM, Color::Reset);
    }

    fn compose_showcase(&mut self, session: &Session, view: &ViewState) {
        let catalog = session.catalog();
        let prog = &session.state().progression;

        let cursor = if view.editing_query { "_" } else { "" };
        let search = format!(" Search: {}{}", view.filter.query, cursor);
        let search_fg = if view.editing_query { Color::White } else { DIM };
        self.front.put_str(0, HUD_ROW, &search, search_fg, Color::Reset);
        let rarity = view.filter.rarity.map_or("ALL", Rarity::label);
        self.front.put_str(40.min(self.front.width), HUD_ROW, &format!("Rarity: {rarity}"), DIM, Color::Reset);

        let list = view.filter.apply(catalog);
        if list.is_empty() {
            self.front.put_str(2, FIELD_TOP, "No matches.", DIM, Color::Reset);
        }
        for (i, e) in list.iter().enumerate() {
            let row = FIELD_TOP + i;
            if row + 2 >= self.front.height { break; }
            let mark = if prog.is_collected(&e.id) { '✓' } else { '·' };
            let line = format!(
                "{} {} {:<18} {:<10} {}",
                if i == view.cursor { '▶' } else { ' ' },
                mark,
                e.name,
                e.rarity.label(),
                e.type_label,
            );
            let fg = if i == view.cursor { Color::White } else { rarity_color(e.rarity) };
            self.front.put_str(1, row, &line, fg, Color::Reset);
        }

        if let Some(e) = view.detail.as_deref().and_then(|id| catalog.get(id)) {
            self.compose_detail(e, prog.is_collected(&e.id));
        }

        let help_row = self.front.height.saturating_sub(1);
        let help = " ↑↓:Select  Enter:Details  /:Search  R:Rarity  C:Collect  Esc:Close";
        self.front.put_str(0, help_row, help, DIM, Color::Reset);
    }

    fn compose_detail(&mut self, e: &Collectible, collected: bool) {
        let x = (self.front.width / 2).max(48);
        let mut lines: Vec<(String, Color)> = vec![
            (e.name.to_uppercase(), rarity_color(e.rarity)),
            (format!("{}  {}", e.rarity.label(), e.type_label), DIM),
            (String::new(), Color::White),
            (e.description.clone(), Color::White),
            (String::new(), Color::White),
        ];
        match e.kind {
            Kind::Mascot { level, season, .. } => {
                lines.push((format!("Season  {}", season.label()), Color::Cyan));
                lines.push((format!("Realm   {}", realm_name(level)), Color::Cyan));
            }
            _ => lines.push((format!("Category {}", e.category().label()), Color::Cyan)),
        }
        for (name, value) in &e.attributes {
            lines.push((format!("{name:<10} {value}"), Color::White));
        }
        lines.push((format!("Edition {}  ({})", e.edition, e.year), DIM));
        lines.push((String::new(), Color::White));
        if collected {
            lines.push(("✓ COLLECTED".to_string(), HI));
        } else {
            lines.push(("LOCKED  [C] Collect".to_string(), GOLD));
        }

        for (i, (text, fg)) in lines.iter().enumerate() {
            self.front.put_str(x, FIELD_TOP + i, text, *fg, Color::Reset);
        }
    }

    fn compose_stats(&mut self, session: &Session) {
        let catalog = session.catalog();
        let snap = ProgressSnapshot::compute(catalog, session.state().progression.collected());

        let overall = format!(
            " Collection {} {}%  ({}/{})",
            progress_bar(&snap.overall, 30),
            snap.overall.percent(),
            snap.overall.collected,
            snap.overall.total,
        );
        self.front.put_str(0, HUD_ROW, &overall, HI, Color::Reset);

        let mut row = FIELD_TOP;
        self.front.put_str(1, row, "BY RARITY", GOLD, Color::Reset);
        for (rarity, t) in &snap.by_rarity {
            row += 1;
            let line = format!("  {:<10} {}/{}", rarity.label(), t.collected, t.total);
            self.front.put_str(1, row, &line, rarity_color(*rarity), Color::Reset);
        }

        row += 2;
        self.front.put_str(1, row, "BY CATEGORY", GOLD, Color::Reset);
        for (category, t) in &snap.by_category {
            row += 1;
            let line = format!("  {:<10} {}/{}", category.label(), t.collected, t.total);
            self.front.put_str(1, row, &line, Color::White, Color::Reset);
        }

        row += 2;
        self.front.put_str(1, row, "RECENT", GOLD, Color::Reset);
        if session.state().progression.collected().is_empty() {
            self.front.put_str(3, row + 1, "Nothing collected yet.", DIM, Color::Reset);
        }
        for id in &snap.recent {
            row += 1;
            if let Some(e) = catalog.get(id) {
                let line = format!("  {:<18} {}", e.name, e.rarity.label());
                self.front.put_str(1, row, &line, rarity_color(e.rarity), Color::Reset);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TimingConfig;
    use crate::domain::catalog::Catalog;
    use crate::sim::save::MemoryStore;

    fn session() -> Session {
        Session::new(
            Catalog::builtin(),
            TimingConfig::default(),
            Box::new(MemoryStore::new()),
            Some(7),
            true,
        )
    }

    fn composed(session: &Session, view: &ViewState) -> Renderer {
        let mut r = Renderer::new();
        r.front.resize(100, 30);
        r.compose(session, view);
        r
    }

    fn row_text(r: &Renderer, y: usize) -> String {
        (0..r.front.width).map(|x| r.front.get(x, y).ch).collect()
    }

    fn screen_text(r: &Renderer) -> String {
        (0..r.front.height).map(|y| row_text(r, y)).collect::<Vec<_>>().join("\n")
    }

    #[test]
    fn field_columns_are_ordered_and_in_bounds() {
        let a = field_column(PLAYFIELD_MIN, 80);
        let b = field_column(50.0, 80);
        let c = field_column(PLAYFIELD_MAX, 80);
        assert!(a < b && b < c);
        assert!(c + 1 < 80);
        // tiny terminals don't underflow
        assert_eq!(field_column(50.0, 0), FIELD_MARGIN + 1);
    }

    #[test]
    fn lift_tracks_jump_height() {
        assert_eq!(lift_rows(0), 0);
        assert_eq!(lift_rows(4), 1);
        assert_eq!(lift_rows(JUMP_CEILING), 5);
        assert_eq!(lift_rows(-3), 0);
    }

    #[test]
    fn progress_bar_fills_proportionally() {
        assert_eq!(progress_bar(&Tally { collected: 0, total: 4 }, 4), "[....]");
        assert_eq!(progress_bar(&Tally { collected: 2, total: 4 }, 4), "[##..]");
        assert_eq!(progress_bar(&Tally { collected: 4, total: 4 }, 4), "[####]");
        assert_eq!(progress_bar(&Tally::default(), 3), "[...]");
    }

    #[test]
    fn put_str_clips_at_edge() {
        let mut fb = FrameBuffer::new(4, 1);
        fb.put_str(2, 0, "abcdef", Color::White, Color::Reset);
        assert_eq!(fb.get(2, 0).ch, 'a');
        assert_eq!(fb.get(3, 0).ch, 'b');
        assert_eq!(fb.get(4, 0), Cell::BLANK);
    }

    #[test]
    fn adventure_hud_shows_realm_level_score_lives() {
        let s = session();
        let r = composed(&s, &ViewState::new());
        let hud = row_text(&r, HUD_ROW);
        assert!(hud.contains("SPRING REALM"));
        assert!(hud.contains("Level 1/4"));
        assert!(hud.contains("Score 0"));
        assert!(hud.contains("♥♥♥"));
        assert!(row_text(&r, TAB_ROW).contains("MUTED"));
    }

    #[test]
    fn adventure_shows_last_collected_and_errors() {
        let mut s = session();
        s.collect("golden-key");
        s.state_mut().error = Some("Movement error occurred.".into());
        let text = screen_text(&composed(&s, &ViewState::new()));
        assert!(text.contains("COLLECTED: GOLDEN KEY!"));
        assert!(text.contains("Movement error occurred."));
    }

    #[test]
    fn visible_mascot_has_animation_tag() {
        let s = session();
        let text = screen_text(&composed(&s, &ViewState::new()));
        let spring = s.catalog().get("mascot-spring").unwrap();
        assert!(text.contains(&format!("{}:idle", spring.name)));
        let summer = s.catalog().get("mascot-summer").unwrap();
        assert!(!text.contains(&format!("{}:", summer.name)));
    }

    #[test]
    fn showcase_lists_filter_and_detail() {
        let mut s = session();
        s.collect("card-fox");
        let mut view = ViewState::new();
        view.switch_to(Tab::Showcase);
        view.filter.query = "consumable".into();
        view.detail = Some("mana-potion".into());
        let text = screen_text(&composed(&s, &view));
        let potion = s.catalog().get("mana-potion").unwrap();
        assert!(text.contains(&potion.name));
        assert!(text.contains("LOCKED"));
        assert!(!text.contains(&s.catalog().get("card-fox").unwrap().name));
    }

    #[test]
    fn stats_show_overall_and_recent() {
        let mut s = session();
        s.collect("pixel-sword");
        s.collect("card-lion");
        let mut view = ViewState::new();
        view.switch_to(Tab::Stats);
        let r = composed(&s, &view);
        let top = row_text(&r, HUD_ROW);
        assert!(top.contains("17%"));
        assert!(top.contains("(2/12)"));
        let text = screen_text(&r);
        let lion = &s.catalog().get("card-lion").unwrap().name;
        let sword = &s.catalog().get("pixel-sword").unwrap().name;
        // newest first
        assert!(text.find(lion.as_str()) < text.find(sword.as_str()));
        assert!(!text.contains("Nothing collected yet."));
    }

    #[test]
    fn stats_empty_collection_notice() {
        let s = session();
        let mut view = ViewState::new();
        view.switch_to(Tab::Stats);
        let text = screen_text(&composed(&s, &view));
        assert!(text.contains("Nothing collected yet."));
    }
}
