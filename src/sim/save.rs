/// Persist collection progress between sessions.
///
/// ## File format:
///   One JSON document per session id, `<save_dir>/<session_id>.json`:
///   `{"collected": [...], "score": 300, "currentLevel": 2}`.
///
/// Writes go to `<session_id>.json.tmp` first and are renamed into place,
/// so a crash mid-write leaves the previous save intact.

use std::cell::RefCell;
use std::fmt;
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::domain::catalog::Catalog;
use crate::domain::collection::{Progression, POINTS_PER_COLLECT};

// ══════════════════════════════════════════════════════════════
// Public types
// ══════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawSaved")]
pub struct SavedState {
    pub collected: Vec<String>,
    pub score: u32,
    #[serde(rename = "currentLevel")]
    pub current_level: u32,
}

/// On-disk shape as read back. Any field may be absent or `null`.
#[derive(Deserialize)]
struct RawSaved {
    #[serde(default)]
    collected: Option<Vec<String>>,
    #[serde(default)]
    score: Option<u32>,
    #[serde(default, rename = "currentLevel")]
    current_level: Option<u32>,
}

impl From<RawSaved> for SavedState {
    fn from(raw: RawSaved) -> Self {
        SavedState {
            collected: raw.collected.unwrap_or_default(),
            score: raw.score.unwrap_or(0),
            current_level: raw.current_level.unwrap_or(1),
        }
    }
}

impl SavedState {
    pub fn capture(p: &Progression) -> Self {
        SavedState {
            collected: p.collected().ids().to_vec(),
            score: p.score(),
            current_level: p.level(),
        }
    }

    /// Rebuild progression against the active catalog. Unknown ids and
    /// duplicates are dropped, the level is clamped and the score is
    /// re-derived from what survives.
    pub fn restore(&self, catalog: &Catalog) -> Progression {
        let p = Progression::restore(
            catalog.total_levels(),
            self.collected.iter().map(String::as_str),
            self.current_level,
            |id| catalog.get(id).is_some(),
        );
        let dropped = self.collected.len() - p.collected().len();
        if dropped > 0 {
            warn!("save: dropped {dropped} unknown or duplicate collectible id(s)");
        }
        if p.level() != self.current_level {
            warn!("save: level {} clamped to {}", self.current_level, p.level());
        }
        if p.score() != self.score {
            warn!(
                "save: stored score {} disagrees with {} collected; using {}",
                self.score,
                p.collected().len(),
                p.collected().len() as u32 * POINTS_PER_COLLECT,
            );
        }
        p
    }
}

#[derive(Debug)]
pub enum SaveError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    Encode(serde_json::Error),
}

impl fmt::Display for SaveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveError::Io(e) => write!(f, "save file I/O failed: {e}"),
            SaveError::Parse(e) => write!(f, "save file is corrupt: {e}"),
            SaveError::Encode(e) => write!(f, "could not encode save data: {e}"),
        }
    }
}

impl std::error::Error for SaveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SaveError::Io(e) => Some(e),
            SaveError::Parse(e) | SaveError::Encode(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for SaveError {
    fn from(e: std::io::Error) -> Self {
        SaveError::Io(e)
    }
}

/// Persistence collaborator. Callers log and swallow failures.
pub trait ProgressStore {
    fn load(&self) -> Result<Option<SavedState>, SaveError>;
    fn save(&self, state: &SavedState) -> Result<(), SaveError>;
}

// ══════════════════════════════════════════════════════════════
// Paths
// ══════════════════════════════════════════════════════════════

/// True when `dir` exists (or can be created) and accepts a new file.
pub fn is_writable_dir(dir: &Path) -> bool {
    if std::fs::create_dir_all(dir).is_err() {
        return false;
    }
    let test_path = dir.join(".write_test_pixel_collect");
    if std::fs::write(&test_path, "").is_err() {
        return false;
    }
    let _ = std::fs::remove_file(&test_path);
    true
}

/// Default save directory when the config does not name one, or `None`
/// when no candidate is writable.
pub fn default_save_dir() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    // 1. Exe directory (portable installs; system installs won't be writable)
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            candidates.push(parent.to_path_buf());
        }
    }

    // 2. XDG data home
    if let Ok(home) = std::env::var("HOME") {
        candidates.push(PathBuf::from(&home).join(".local/share/pixel-collect"));
    }

    // 3. CWD
    if let Ok(cwd) = std::env::current_dir() {
        candidates.push(cwd);
    }

    candidates.into_iter().find(|dir| is_writable_dir(dir))
}

/// File-backed store in `dir` when it is usable, otherwise an in-memory
/// store so play goes on without persistence.
pub fn open_store(dir: Option<&Path>, session_id: &str) -> Box<dyn ProgressStore> {
    match dir {
        Some(dir) if is_writable_dir(dir) => {
            let store = FileStore::new(dir, session_id);
            info!("progress file: {}", store.path().display());
            Box::new(store)
        }
        Some(dir) => {
            warn!("save dir {} is not writable; progress kept in memory only", dir.display());
            Box::new(MemoryStore::new())
        }
        None => {
            warn!("no writable save dir found; progress kept in memory only");
            Box::new(MemoryStore::new())
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Stores
// ══════════════════════════════════════════════════════════════

pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(dir: &Path, session_id: &str) -> Self {
        FileStore { path: dir.join(format!("{session_id}.json")) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ProgressStore for FileStore {
    fn load(&self) -> Result<Option<SavedState>, SaveError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(t) => t,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(SaveError::Io(e)),
        };
        serde_json::from_str(&text).map(Some).map_err(SaveError::Parse)
    }

    fn save(&self, state: &SavedState) -> Result<(), SaveError> {
        let json = serde_json::to_string_pretty(state).map_err(SaveError::Encode)?;
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// In-process store; nothing survives the process.
#[derive(Default)]
pub struct MemoryStore {
    slot: RefCell<Option<SavedState>>,
    fail_saves: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    #[cfg(test)]
    pub fn with_state(state: SavedState) -> Self {
        MemoryStore { slot: RefCell::new(Some(state)), fail_saves: false }
    }

    /// A store whose `save` always errors.
    #[cfg(test)]
    pub fn failing() -> Self {
        MemoryStore { slot: RefCell::new(None), fail_saves: true }
    }

    #[cfg(test)]
    pub fn snapshot(&self) -> Option<SavedState> {
        self.slot.borrow().clone()
    }
}

impl ProgressStore for MemoryStore {
    fn load(&self) -> Result<Option<SavedState>, SaveError> {
        Ok(self.slot.borrow().clone())
    }

    fn save(&self, state: &SavedState) -> Result<(), SaveError> {
        if self.fail_saves {
            return Err(SaveError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "store is read-only",
            )));
        }
        *self.slot.borrow_mut() = Some(state.clone());
        Ok(())
    }
}

impl<S: ProgressStore + ?Sized> ProgressStore for std::rc::Rc<S> {
    fn load(&self) -> Result<Option<SavedState>, SaveError> {
        (**self).load()
    }

    fn save(&self, state: &SavedState) -> Result<(), SaveError> {
        (**self).save(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn scratch_dir() -> PathBuf {
        static N: AtomicUsize = AtomicUsize::new(0);
        let dir = std::env::temp_dir().join(format!(
            "pixel-collect-test-{}-{}",
            std::process::id(),
            N.fetch_add(1, Ordering::Relaxed)
        ));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    fn sample() -> SavedState {
        SavedState {
            collected: vec!["pixel-sword".into(), "card-fox".into()],
            score: 200,
            current_level: 2,
        }
    }

    #[test]
    fn json_uses_camel_case_level_key() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert!(json.contains("\"currentLevel\":2"));
        assert!(json.contains("\"collected\":[\"pixel-sword\",\"card-fox\"]"));
        assert!(json.contains("\"score\":200"));
    }

    #[test]
    fn file_store_missing_file_is_none() {
        let dir = scratch_dir();
        let store = FileStore::new(&dir, "nobody");
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn file_store_save_then_load() {
        let dir = scratch_dir();
        let store = FileStore::new(&dir, "alice");
        store.save(&sample()).unwrap();
        assert_eq!(store.load().unwrap(), Some(sample()));
        assert!(!store.path().with_extension("json.tmp").exists());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn file_store_corrupt_file_is_parse_error() {
        let dir = scratch_dir();
        std::fs::create_dir_all(&dir).unwrap();
        let store = FileStore::new(&dir, "broken");
        std::fs::write(store.path(), "{ not json").unwrap();
        assert!(matches!(store.load(), Err(SaveError::Parse(_))));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn file_store_partial_file_uses_defaults() {
        let dir = scratch_dir();
        std::fs::create_dir_all(&dir).unwrap();
        let store = FileStore::new(&dir, "partial");

        std::fs::write(
            store.path(),
            r#"{"collected":["pixel-sword"],"score":100,"currentLevel":null}"#,
        )
        .unwrap();
        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.collected, vec!["pixel-sword".to_string()]);
        assert_eq!(loaded.score, 100);
        assert_eq!(loaded.current_level, 1);

        std::fs::write(store.path(), r#"{"collected":["pixel-sword"],"score":100}"#).unwrap();
        assert_eq!(store.load().unwrap(), Some(loaded));

        std::fs::write(store.path(), r#"{"collected":null}"#).unwrap();
        let empty = store.load().unwrap().unwrap();
        assert!(empty.collected.is_empty());
        assert_eq!(empty.score, 0);
        assert_eq!(empty.current_level, 1);
        assert_eq!(empty.restore(&Catalog::builtin()).level(), 1);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn unusable_dir_falls_back_to_memory() {
        let dir = scratch_dir();
        std::fs::create_dir_all(&dir).unwrap();
        let blocker = dir.join("not-a-dir");
        std::fs::write(&blocker, "").unwrap();
        let below_file = blocker.join("saves");
        assert!(!is_writable_dir(&below_file));
        assert!(is_writable_dir(&dir));
        assert!(!dir.join(".write_test_pixel_collect").exists());

        let store = open_store(Some(below_file.as_path()), "alice");
        store.save(&sample()).unwrap();
        assert_eq!(store.load().unwrap(), Some(sample()));
        assert!(!below_file.exists());

        let none = open_store(None, "alice");
        assert!(none.load().unwrap().is_none());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn writable_dir_opens_file_store() {
        let dir = scratch_dir();
        let store = open_store(Some(dir.as_path()), "bob");
        store.save(&sample()).unwrap();
        assert!(dir.join("bob.json").exists());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn restore_sanitizes() {
        let catalog = Catalog::builtin();
        let saved = SavedState {
            collected: vec!["pixel-sword".into(), "ghost".into(), "pixel-sword".into()],
            score: 9999,
            current_level: 0,
        };
        let p = saved.restore(&catalog);
        assert_eq!(p.collected().ids(), &["pixel-sword".to_string()]);
        assert_eq!(p.score(), 100);
        assert_eq!(p.level(), 1);
    }

    #[test]
    fn memory_store_roundtrip_and_failure() {
        let store = MemoryStore::new();
        assert!(store.load().unwrap().is_none());
        store.save(&sample()).unwrap();
        assert_eq!(store.snapshot(), Some(sample()));

        let bad = MemoryStore::failing();
        assert!(matches!(bad.save(&sample()), Err(SaveError::Io(_))));
    }
}
