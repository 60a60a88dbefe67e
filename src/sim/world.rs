/// State read by the renderer.
///
/// `GameState` is the simulation state. It is owned by the `Session`,
/// which hands out shared references only; the motion and jump parts keep
/// their fields private to their own modules.
///
/// `ViewState` is front-end only (active tab, showcase cursor) and never
/// touched by the simulation.

use crate::domain::catalog::Catalog;
use crate::domain::collection::Progression;
use crate::domain::gait::Gait;
use crate::domain::jump::Jump;
use crate::domain::mascot::MascotAnim;
use crate::domain::motion::Body;
use crate::domain::showcase::ShowcaseFilter;

#[derive(Clone, Debug)]
pub struct GameState {
    pub body: Body,
    pub jump: Jump,
    pub gait: Gait,
    pub progression: Progression,
    /// (catalog index, animation) for every mascot in the catalog.
    pub mascots: Vec<(usize, MascotAnim)>,
    /// Transient user-facing error notice.
    pub error: Option<String>,
}

impl GameState {
    pub fn new(catalog: &Catalog, progression: Progression) -> Self {
        GameState {
            body: Body::new(),
            jump: Jump::new(),
            gait: Gait::new(),
            progression,
            mascots: catalog
                .mascot_indices()
                .into_iter()
                .map(|i| (i, MascotAnim::Idle))
                .collect(),
            error: None,
        }
    }

    pub fn mascot_anim(&self, index: usize) -> Option<MascotAnim> {
        self.mascots.iter().find(|(i, _)| *i == index).map(|(_, a)| *a)
    }

    pub(crate) fn mascot_anim_mut(&mut self, index: usize) -> Option<&mut MascotAnim> {
        self.mascots.iter_mut().find(|(i, _)| *i == index).map(|(_, a)| a)
    }
}

// ── Front-end view state ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Tab {
    Adventure,
    Showcase,
    Stats,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Adventure, Tab::Showcase, Tab::Stats];

    pub fn label(self) -> &'static str {
        match self {
            Tab::Adventure => "ADVENTURE",
            Tab::Showcase => "SHOWCASE",
            Tab::Stats => "STATS",
        }
    }

    pub fn next(self) -> Tab {
        match self {
            Tab::Adventure => Tab::Showcase,
            Tab::Showcase => Tab::Stats,
            Tab::Stats => Tab::Adventure,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ViewState {
    pub tab: Tab,
    pub filter: ShowcaseFilter,
    /// Index into the filtered showcase list.
    pub cursor: usize,
    /// Catalog id shown in the detail panel.
    pub detail: Option<String>,
    /// Typing goes into the search query instead of acting as commands.
    pub editing_query: bool,
}

impl ViewState {
    pub fn new() -> Self {
        ViewState {
            tab: Tab::Adventure,
            filter: ShowcaseFilter::new(),
            cursor: 0,
            detail: None,
            editing_query: false,
        }
    }

    /// Switch tabs. Returns false if `tab` is already active. Leaving a tab
    /// closes the detail panel.
    pub fn switch_to(&mut self, tab: Tab) -> bool {
        if self.tab == tab {
            return false;
        }
        self.tab = tab;
        self.detail = None;
        self.editing_query = false;
        true
    }

    /// Keep the cursor inside a list of `len` entries.
    pub fn clamp_cursor(&mut self, len: usize) {
        if len == 0 {
            self.cursor = 0;
        } else if self.cursor >= len {
            self.cursor = len - 1;
        }
    }
}

impl Default for ViewState {
    fn default() -> Self {
        ViewState::new()
    }
}
