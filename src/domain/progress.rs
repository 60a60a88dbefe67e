/// Collection statistics for the stats view.

use super::catalog::{Catalog, Category, Rarity};
use super::collection::CollectedSet;

pub const RECENT_LIMIT: usize = 6;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Tally {
    pub collected: usize,
    pub total: usize,
}

impl Tally {
    fn add(&mut self, collected: bool) {
        self.total += 1;
        if collected {
            self.collected += 1;
        }
    }

    /// Rounded percentage; an empty tally is 0%.
    pub fn percent(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        (self.collected as f64 * 100.0 / self.total as f64).round() as u32
    }

    pub fn ratio(&self) -> f64 {
        if self.total == 0 { 0.0 } else { self.collected as f64 / self.total as f64 }
    }
}

#[derive(Clone, Debug)]
pub struct ProgressSnapshot {
    pub overall: Tally,
    /// Only rarities present in the catalog, in rarity order.
    pub by_rarity: Vec<(Rarity, Tally)>,
    pub by_category: Vec<(Category, Tally)>,
    /// Newest first.
    pub recent: Vec<String>,
}

impl ProgressSnapshot {
    pub fn compute(catalog: &Catalog, collected: &CollectedSet) -> Self {
        let mut overall = Tally::default();
        let mut by_rarity: Vec<(Rarity, Tally)> =
            Rarity::ALL.iter().map(|&r| (r, Tally::default())).collect();
        let mut by_category: Vec<(Category, Tally)> =
            Category::ALL.iter().map(|&c| (c, Tally::default())).collect();

        for e in catalog.entities() {
            let got = collected.contains(&e.id);
            overall.add(got);
            if let Some((_, t)) = by_rarity.iter_mut().find(|(r, _)| *r == e.rarity) {
                t.add(got);
            }
            if let Some((_, t)) = by_category.iter_mut().find(|(c, _)| *c == e.category()) {
                t.add(got);
            }
        }
        by_rarity.retain(|(_, t)| t.total > 0);

        let recent = collected
            .recent(RECENT_LIMIT)
            .filter(|id| catalog.get(id).is_some())
            .map(str::to_string)
            .collect();

        ProgressSnapshot { overall, by_rarity, by_category, recent }
    }
}
