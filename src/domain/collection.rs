/// Collection rules: proximity, visibility, scoring and level completion.
///
/// `Progression` is the collection/score/level part of the game state. It
/// is owned by the session's coordinator; nothing else holds a `&mut` to it.

use std::collections::HashSet;

use super::catalog::{Catalog, Collectible, Kind};

/// Strict proximity radius: collectible when `|pos - entity| < COLLECT_RADIUS`.
pub const COLLECT_RADIUS: f32 = 10.0;
pub const POINTS_PER_COLLECT: u32 = 100;
pub const START_LIVES: u32 = 3;

// ── Collected set ──

/// Set of collected ids that remembers insertion order (for "recent" views).
#[derive(Clone, Debug, Default)]
pub struct CollectedSet {
    order: Vec<String>,
    lookup: HashSet<String>,
}

impl CollectedSet {
    pub fn new() -> Self {
        CollectedSet::default()
    }

    /// Returns false if the id was already present.
    pub fn insert(&mut self, id: &str) -> bool {
        if self.lookup.contains(id) {
            return false;
        }
        self.lookup.insert(id.to_string());
        self.order.push(id.to_string());
        true
    }

    pub fn contains(&self, id: &str) -> bool {
        self.lookup.contains(id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Ids in collection order.
    pub fn ids(&self) -> &[String] {
        &self.order
    }

    /// Up to `n` most recent ids, newest first.
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &str> {
        self.order.iter().rev().take(n).map(String::as_str)
    }
}

// ── Visibility / proximity ──

/// Items and creatures are always visible; mascots only on their own level.
pub fn is_visible(entity: &Collectible, current_level: u32) -> bool {
    match entity.kind {
        Kind::Item { .. } | Kind::Creature { .. } => true,
        Kind::Mascot { level, .. } => level == current_level,
    }
}

pub fn in_reach(character_position: f32, entity_position: f32) -> bool {
    (character_position - entity_position).abs() < COLLECT_RADIUS
}

/// Ids that the character would newly collect at `character_position`,
/// in catalog order.
pub fn check_collision<'a>(
    character_position: f32,
    current_level: u32,
    collected: &CollectedSet,
    catalog: &'a Catalog,
) -> Vec<&'a str> {
    catalog
        .entities()
        .iter()
        .filter(|e| is_visible(e, current_level))
        .filter(|e| in_reach(character_position, e.position()))
        .filter(|e| !collected.contains(&e.id))
        .map(|e| e.id.as_str())
        .collect()
}

// ── Level completion policy ──

/// Entities that count towards clearing `level`: every item plus the
/// mascots scoped to that level. Creatures do not count.
pub fn level_item_ids(catalog: &Catalog, level: u32) -> Vec<&str> {
    catalog
        .entities()
        .iter()
        .filter(|e| match e.kind {
            Kind::Item { .. } => true,
            Kind::Mascot { level: l, .. } => l == level,
            Kind::Creature { .. } => false,
        })
        .map(|e| e.id.as_str())
        .collect()
}

/// Completion check, evaluated against the collected set as it was *before*
/// the collection that triggered it: fires when exactly one level item was
/// still missing at that point. If the triggering collection was not itself
/// a level item, this fires with one level item still uncollected.
pub fn completes_level(catalog: &Catalog, level: u32, collected_before: &CollectedSet) -> bool {
    let ids = level_item_ids(catalog, level);
    if ids.is_empty() {
        return false;
    }
    let have = ids.iter().filter(|id| collected_before.contains(id)).count();
    have == ids.len() - 1
}

// ── Progression ──

#[derive(Clone, Debug)]
pub struct Progression {
    level: u32,
    total_levels: u32,
    score: u32,
    lives: u32,
    collected: CollectedSet,
    last_collected: Option<String>,
}

impl Progression {
    pub fn new(total_levels: u32) -> Self {
        Progression {
            level: 1,
            total_levels: total_levels.max(1),
            score: 0,
            lives: START_LIVES,
            collected: CollectedSet::new(),
            last_collected: None,
        }
    }

    pub fn level(&self) -> u32 { self.level }
    pub fn total_levels(&self) -> u32 { self.total_levels }
    pub fn score(&self) -> u32 { self.score }
    pub fn lives(&self) -> u32 { self.lives }
    pub fn collected(&self) -> &CollectedSet { &self.collected }
    pub fn last_collected(&self) -> Option<&str> { self.last_collected.as_deref() }

    pub fn is_collected(&self, id: &str) -> bool {
        self.collected.contains(id)
    }

    /// Record a collection. Returns false (and changes nothing) if `id`
    /// was already collected.
    pub fn collect(&mut self, id: &str) -> bool {
        if !self.collected.insert(id) {
            return false;
        }
        self.score += POINTS_PER_COLLECT;
        self.last_collected = Some(id.to_string());
        true
    }

    /// Move one level in `direction` (±1). Returns false when the move
    /// would leave `1..=total_levels`.
    pub fn step_level(&mut self, direction: i32) -> bool {
        let target = self.level as i64 + direction.signum() as i64;
        if direction == 0 || target < 1 || target > self.total_levels as i64 {
            return false;
        }
        self.level = target as u32;
        true
    }

    /// Automatic advance: +1 while below the last level.
    pub fn advance_level(&mut self) -> bool {
        self.step_level(1)
    }

    /// Rebuild from persisted progress. Ids not accepted by `keep` are
    /// dropped; duplicates keep their first occurrence; the level is
    /// clamped; the score is derived from the restored set.
    pub fn restore<'a>(
        total_levels: u32,
        ids: impl IntoIterator<Item = &'a str>,
        level: u32,
        keep: impl Fn(&str) -> bool,
    ) -> Self {
        let mut p = Progression::new(total_levels);
        for id in ids {
            if keep(id) && p.collected.insert(id) {
                p.score += POINTS_PER_COLLECT;
            }
        }
        p.level = level.clamp(1, p.total_levels);
        p
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cat() -> Catalog {
        Catalog::builtin()
    }

    #[test]
    fn proximity_boundary_is_strict() {
        assert!(in_reach(75.0, 70.0));
        assert!(!in_reach(75.0, 60.0));
        assert!(!in_reach(80.0, 70.0)); // exactly 10 apart
        assert!(in_reach(79.9, 70.0));
    }

    #[test]
    fn collision_at_75_picks_golden_key() {
        let c = cat();
        let hits = check_collision(75.0, 1, &CollectedSet::new(), &c);
        // golden-key @70 (5 away) and card-panda @78 (3 away); health-crystal @85 is exactly 10
        assert_eq!(hits, vec!["golden-key", "card-panda"]);
    }

    #[test]
    fn collision_skips_collected() {
        let c = cat();
        let mut set = CollectedSet::new();
        set.insert("golden-key");
        assert_eq!(check_collision(75.0, 1, &set, &c), vec!["card-panda"]);
    }

    #[test]
    fn mascot_only_collectible_on_its_level() {
        let c = cat();
        // summer mascot @40, level 2; card-lion @45 is always visible
        let l1 = check_collision(40.0, 1, &CollectedSet::new(), &c);
        assert!(!l1.contains(&"mascot-summer"));
        let l2 = check_collision(40.0, 2, &CollectedSet::new(), &c);
        assert!(l2.contains(&"mascot-summer"));
    }

    #[test]
    fn visibility_rules() {
        let c = cat();
        let fall = c.get("mascot-fall").unwrap();
        assert!(!is_visible(fall, 1));
        assert!(is_visible(fall, 3));
        assert!(is_visible(c.get("card-fox").unwrap(), 4));
        assert!(is_visible(c.get("mana-potion").unwrap(), 2));
    }

    #[test]
    fn level_items_are_items_plus_current_mascot() {
        let c = cat();
        let ids = level_item_ids(&c, 2);
        assert_eq!(ids, vec!["pixel-sword", "mana-potion", "golden-key", "health-crystal", "mascot-summer"]);
    }

    #[test]
    fn completion_fires_when_one_level_item_missing_before_insert() {
        let c = cat();
        let mut before = CollectedSet::new();
        for id in ["mascot-spring", "pixel-sword", "mana-potion"] {
            before.insert(id);
        }
        // 3 of 5 collected: not yet
        assert!(!completes_level(&c, 1, &before));
        before.insert("golden-key");
        // 4 of 5 collected before this collection: fires
        assert!(completes_level(&c, 1, &before));
        before.insert("health-crystal");
        // all collected: does not fire again
        assert!(!completes_level(&c, 1, &before));
    }

    #[test]
    fn progression_collect_is_idempotent() {
        let mut p = Progression::new(4);
        assert!(p.collect("pixel-sword"));
        assert!(!p.collect("pixel-sword"));
        assert_eq!(p.score(), 100);
        assert_eq!(p.collected().len(), 1);
        assert_eq!(p.last_collected(), Some("pixel-sword"));
    }

    #[test]
    fn step_level_clamps() {
        let mut p = Progression::new(4);
        assert!(!p.step_level(-1));
        assert_eq!(p.level(), 1);
        for _ in 0..3 {
            assert!(p.step_level(1));
        }
        assert_eq!(p.level(), 4);
        assert!(!p.step_level(1));
        assert!(!p.advance_level());
        assert_eq!(p.level(), 4);
    }

    #[test]
    fn recent_is_newest_first() {
        let mut set = CollectedSet::new();
        for id in ["a", "b", "c"] {
            set.insert(id);
        }
        let r: Vec<&str> = set.recent(2).collect();
        assert_eq!(r, vec!["c", "b"]);
    }

    #[test]
    fn restore_filters_and_derives_score() {
        let c = cat();
        let ids = ["pixel-sword", "bogus", "pixel-sword", "card-fox"];
        let p = Progression::restore(4, ids, 9, |id| c.get(id).is_some());
        assert_eq!(p.collected().ids(), &["pixel-sword".to_string(), "card-fox".to_string()]);
        assert_eq!(p.score(), 200);
        assert_eq!(p.level(), 4);
    }
}
