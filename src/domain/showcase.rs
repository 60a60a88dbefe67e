/// Showcase browsing: text query plus an optional rarity filter.

use super::catalog::{Catalog, Collectible, Rarity};

#[derive(Clone, Debug, Default)]
pub struct ShowcaseFilter {
    pub query: String,
    pub rarity: Option<Rarity>,
}

impl ShowcaseFilter {
    pub fn new() -> Self {
        ShowcaseFilter::default()
    }

    /// Selecting the active rarity again clears the filter.
    #[cfg(test)]
    pub fn toggle_rarity(&mut self, rarity: Rarity) {
        self.rarity = if self.rarity == Some(rarity) { None } else { Some(rarity) };
    }

    pub fn cycle_rarity(&mut self) {
        self.rarity = Rarity::cycle(self.rarity);
    }

    /// Case-insensitive substring match on name, type label or description.
    pub fn matches(&self, e: &Collectible) -> bool {
        let q = self.query.trim().to_lowercase();
        let text_ok = q.is_empty()
            || e.name.to_lowercase().contains(&q)
            || e.type_label.to_lowercase().contains(&q)
            || e.description.to_lowercase().contains(&q);
        let rarity_ok = self.rarity.map_or(true, |r| e.rarity == r);
        text_ok && rarity_ok
    }

    /// Matching entities in catalog order.
    pub fn apply<'a>(&self, catalog: &'a Catalog) -> Vec<&'a Collectible> {
        catalog.entities().iter().filter(|e| self.matches(e)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids<'a>(v: &[&'a Collectible]) -> Vec<&'a str> {
        v.iter().map(|e| e.id.as_str()).collect()
    }

    #[test]
    fn empty_filter_matches_everything() {
        let c = Catalog::builtin();
        assert_eq!(ShowcaseFilter::new().apply(&c).len(), c.len());
    }

    #[test]
    fn query_is_case_insensitive_across_fields() {
        let c = Catalog::builtin();
        let mut f = ShowcaseFilter::new();
        f.query = "PiXeL sWoRd".into();
        assert_eq!(ids(&f.apply(&c)), vec!["pixel-sword"]);

        // type label
        f.query = "consumable".into();
        assert_eq!(ids(&f.apply(&c)), vec!["mana-potion", "health-crystal"]);

        // description only
        f.query = "bamboo brew".into();
        assert!(f.apply(&c).is_empty());
        f.query = "glows in the dark".into();
        assert_eq!(ids(&f.apply(&c)), vec!["card-panda"]);
    }

    #[test]
    fn rarity_toggle() {
        let c = Catalog::builtin();
        let mut f = ShowcaseFilter::new();
        f.toggle_rarity(Rarity::Legendary);
        assert_eq!(ids(&f.apply(&c)), vec!["golden-key", "card-lion"]);
        f.toggle_rarity(Rarity::Legendary);
        assert_eq!(f.rarity, None);
    }

    #[test]
    fn query_and_rarity_combine() {
        let c = Catalog::builtin();
        let mut f = ShowcaseFilter::new();
        f.query = "pixel".into();
        f.rarity = Some(Rarity::Epic);
        assert_eq!(ids(&f.apply(&c)), vec!["card-wolf"]);
    }
}
