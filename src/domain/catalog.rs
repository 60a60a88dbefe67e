/// Collectible catalog: immutable entity definitions.
///
/// Every collectible is one of three kinds, and the kind carries the data
/// that only makes sense for it:
///
///   - `Item`    : level-independent pickup on the playfield
///   - `Mascot`  : seasonal guardian, visible only on its own level
///   - `Creature`: level-independent creature card
///
/// The catalog is built once at startup (built-in table or an external
/// TOML file) and never mutated afterwards.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use serde::Deserialize;

/// Horizontal extent of the catalog coordinate space (percent of playfield).
pub const POSITION_MIN: f32 = 0.0;
pub const POSITION_MAX: f32 = 100.0;

// ── Rarity ──

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
    Mythic,
}

impl Rarity {
    pub const ALL: [Rarity; 6] = [
        Rarity::Common,
        Rarity::Uncommon,
        Rarity::Rare,
        Rarity::Epic,
        Rarity::Legendary,
        Rarity::Mythic,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Rarity::Common => "COMMON",
            Rarity::Uncommon => "UNCOMMON",
            Rarity::Rare => "RARE",
            Rarity::Epic => "EPIC",
            Rarity::Legendary => "LEGENDARY",
            Rarity::Mythic => "MYTHIC",
        }
    }

    /// Next rarity in a filter cycle: None → Common → … → Mythic → None.
    pub fn cycle(current: Option<Rarity>) -> Option<Rarity> {
        match current {
            None => Some(Rarity::Common),
            Some(Rarity::Common) => Some(Rarity::Uncommon),
            Some(Rarity::Uncommon) => Some(Rarity::Rare),
            Some(Rarity::Rare) => Some(Rarity::Epic),
            Some(Rarity::Epic) => Some(Rarity::Legendary),
            Some(Rarity::Legendary) => Some(Rarity::Mythic),
            Some(Rarity::Mythic) => None,
        }
    }
}

// ── Season ──

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Season {
    Spring,
    Summer,
    Fall,
    Winter,
}

impl Season {
    pub fn label(self) -> &'static str {
        match self {
            Season::Spring => "SPRING",
            Season::Summer => "SUMMER",
            Season::Fall => "FALL",
            Season::Winter => "WINTER",
        }
    }
}

/// Display name of a level ("realm").
pub fn realm_name(level: u32) -> &'static str {
    match level {
        1 => "SPRING REALM",
        2 => "SUMMER REALM",
        3 => "FALL REALM",
        4 => "WINTER REALM",
        _ => "UNKNOWN REALM",
    }
}

// ── Kind / Category ──

/// Tagged variant over the three collectible kinds.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Kind {
    Item { position: f32 },
    Mascot { position: f32, level: u32, season: Season },
    Creature { position: f32 },
}

/// Showcase/stats grouping, one per `Kind` variant.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Category {
    Items,
    Mascots,
    Creatures,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Items, Category::Mascots, Category::Creatures];

    pub fn label(self) -> &'static str {
        match self {
            Category::Items => "ITEMS",
            Category::Mascots => "MASCOTS",
            Category::Creatures => "CREATURES",
        }
    }
}

impl Kind {
    pub fn position(&self) -> f32 {
        match *self {
            Kind::Item { position } => position,
            Kind::Mascot { position, .. } => position,
            Kind::Creature { position } => position,
        }
    }

    /// Level this entity is scoped to. Items and creatures are level-independent.
    pub fn level(&self) -> Option<u32> {
        match *self {
            Kind::Mascot { level, .. } => Some(level),
            Kind::Item { .. } | Kind::Creature { .. } => None,
        }
    }

    pub fn category(&self) -> Category {
        match self {
            Kind::Item { .. } => Category::Items,
            Kind::Mascot { .. } => Category::Mascots,
            Kind::Creature { .. } => Category::Creatures,
        }
    }
}

// ── Attributes ──

/// A named stat value: numeric or free text ("Infinite", "Nature").
#[derive(Clone, PartialEq, Debug, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Num(i64),
    Text(String),
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Num(n) => write!(f, "{n}"),
            AttrValue::Text(s) => f.write_str(s),
        }
    }
}

// ── Collectible ──

#[derive(Clone, Debug)]
pub struct Collectible {
    pub id: String,
    pub name: String,
    pub kind: Kind,
    pub rarity: Rarity,
    /// Free-form type label ("WEAPON", "CONSUMABLE", "MASCOT", …).
    pub type_label: String,
    pub description: String,
    pub attributes: BTreeMap<String, AttrValue>,
    pub year: u32,
    pub edition: String,
}

impl Collectible {
    pub fn position(&self) -> f32 {
        self.kind.position()
    }

    pub fn category(&self) -> Category {
        self.kind.category()
    }
}

// ── Errors ──

#[derive(Clone, Debug, PartialEq)]
pub enum CatalogError {
    Empty,
    DuplicateId(String),
    PositionOutOfRange { id: String, position: f32 },
    LevelOutOfRange { id: String, level: u32 },
    Parse(String),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::Empty => write!(f, "catalog has no entities"),
            CatalogError::DuplicateId(id) => write!(f, "duplicate collectible id '{id}'"),
            CatalogError::PositionOutOfRange { id, position } => {
                write!(f, "'{id}' position {position} outside {POSITION_MIN}..={POSITION_MAX}")
            }
            CatalogError::LevelOutOfRange { id, level } => {
                write!(f, "'{id}' has invalid level {level} (levels start at 1)")
            }
            CatalogError::Parse(msg) => write!(f, "catalog parse error: {msg}"),
        }
    }
}

impl std::error::Error for CatalogError {}

// ── Catalog ──

#[derive(Clone, Debug)]
pub struct Catalog {
    entities: Vec<Collectible>,
    total_levels: u32,
}

impl Catalog {
    /// Validate and freeze a list of entities.
    pub fn new(entities: Vec<Collectible>) -> Result<Self, CatalogError> {
        if entities.is_empty() {
            return Err(CatalogError::Empty);
        }
        let mut seen = HashSet::with_capacity(entities.len());
        for e in &entities {
            if !seen.insert(e.id.as_str()) {
                return Err(CatalogError::DuplicateId(e.id.clone()));
            }
            let p = e.position();
            if !p.is_finite() || !(POSITION_MIN..=POSITION_MAX).contains(&p) {
                return Err(CatalogError::PositionOutOfRange { id: e.id.clone(), position: p });
            }
            if let Some(level) = e.kind.level() {
                if level == 0 {
                    return Err(CatalogError::LevelOutOfRange { id: e.id.clone(), level });
                }
            }
        }
        let total_levels = entities
            .iter()
            .filter_map(|e| e.kind.level())
            .max()
            .unwrap_or(1);
        Ok(Catalog { entities, total_levels })
    }

    pub fn entities(&self) -> &[Collectible] {
        &self.entities
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn total_levels(&self) -> u32 {
        self.total_levels
    }

    pub fn get(&self, id: &str) -> Option<&Collectible> {
        self.entities.iter().find(|e| e.id == id)
    }

    #[cfg(test)]
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.entities.iter().position(|e| e.id == id)
    }

    /// Indices of all mascot entities, in catalog order.
    pub fn mascot_indices(&self) -> Vec<usize> {
        self.entities
            .iter()
            .enumerate()
            .filter(|(_, e)| matches!(e.kind, Kind::Mascot { .. }))
            .map(|(i, _)| i)
            .collect()
    }

    /// Parse an external catalog file.
    pub fn from_toml(text: &str) -> Result<Self, CatalogError> {
        let file: TomlCatalog = toml::from_str(text).map_err(|e| CatalogError::Parse(e.to_string()))?;
        let entities = file
            .entity
            .into_iter()
            .map(TomlEntity::into_collectible)
            .collect::<Result<Vec<_>, _>>()?;
        Catalog::new(entities)
    }

    /// The built-in catalog: 4 items, 4 seasonal mascots, 4 creature cards.
    pub fn builtin() -> Self {
        let entities = builtin_entities();
        let total_levels = entities.iter().filter_map(|e| e.kind.level()).max().unwrap_or(1);
        Catalog { entities, total_levels }
    }
}

// ── TOML schema ──

#[derive(Deserialize, Debug)]
struct TomlCatalog {
    #[serde(default)]
    entity: Vec<TomlEntity>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "lowercase")]
enum TomlKind {
    Item,
    Mascot,
    Creature,
}

#[derive(Deserialize, Debug)]
struct TomlEntity {
    id: String,
    name: String,
    kind: TomlKind,
    rarity: Rarity,
    position: f32,
    #[serde(default)]
    level: Option<u32>,
    #[serde(default)]
    season: Option<Season>,
    #[serde(default, rename = "type")]
    type_label: Option<String>,
    #[serde(default)]
    description: String,
    #[serde(default)]
    attributes: BTreeMap<String, AttrValue>,
    #[serde(default = "default_year")]
    year: u32,
    #[serde(default)]
    edition: String,
}

fn default_year() -> u32 { 2025 }

impl TomlEntity {
    fn into_collectible(self) -> Result<Collectible, CatalogError> {
        let kind = match self.kind {
            TomlKind::Item => Kind::Item { position: self.position },
            TomlKind::Creature => Kind::Creature { position: self.position },
            TomlKind::Mascot => {
                let level = self.level.ok_or_else(|| {
                    CatalogError::Parse(format!("mascot '{}' is missing `level`", self.id))
                })?;
                let season = self.season.unwrap_or(match level {
                    1 => Season::Spring,
                    2 => Season::Summer,
                    3 => Season::Fall,
                    _ => Season::Winter,
                });
                Kind::Mascot { position: self.position, level, season }
            }
        };
        let type_label = self.type_label.unwrap_or_else(|| match kind.category() {
            Category::Items => "ITEM".to_string(),
            Category::Mascots => "MASCOT".to_string(),
            Category::Creatures => "CREATURE".to_string(),
        });
        Ok(Collectible {
            id: self.id,
            name: self.name,
            kind,
            rarity: self.rarity,
            type_label,
            description: self.description,
            attributes: self.attributes,
            year: self.year,
            edition: self.edition,
        })
    }
}

// ══════════════════════════════════════════════════════════════
// Built-in data
// ══════════════════════════════════════════════════════════════

fn attrs(pairs: &[(&str, AttrValue)]) -> BTreeMap<String, AttrValue> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
}

fn num(n: i64) -> AttrValue { AttrValue::Num(n) }
fn text(s: &str) -> AttrValue { AttrValue::Text(s.to_string()) }

#[allow(clippy::too_many_arguments)]
fn entity(
    id: &str, name: &str, kind: Kind, rarity: Rarity, type_label: &str,
    description: &str, attributes: BTreeMap<String, AttrValue>, edition: &str,
) -> Collectible {
    Collectible {
        id: id.to_string(),
        name: name.to_string(),
        kind,
        rarity,
        type_label: type_label.to_string(),
        description: description.to_string(),
        attributes,
        year: 2025,
        edition: edition.to_string(),
    }
}

fn builtin_entities() -> Vec<Collectible> {
    use Rarity::*;
    vec![
        // ── Items ──
        entity("pixel-sword", "PIXEL SWORD", Kind::Item { position: 30.0 }, Rare, "WEAPON",
            "A legendary pixel sword forged in the digital realm.",
            attrs(&[("attack", num(75)), ("durability", num(120)), ("speed", num(65))]), "Genesis"),
        entity("mana-potion", "MANA POTION", Kind::Item { position: 50.0 }, Uncommon, "CONSUMABLE",
            "Restores magical energy with a fizzy pixel brew.",
            attrs(&[("mana", num(50)), ("duration", num(30)), ("cooldown", num(60))]), "Genesis"),
        entity("golden-key", "GOLDEN KEY", Kind::Item { position: 70.0 }, Legendary, "KEY ITEM",
            "Unlocks the most precious pixel treasures.",
            attrs(&[("unlock", num(100)), ("durability", text("Infinite")), ("value", num(1000))]), "Genesis"),
        entity("health-crystal", "HEALTH CRYSTAL", Kind::Item { position: 85.0 }, Common, "CONSUMABLE",
            "A crystallized pixel of pure life energy.",
            attrs(&[("health", num(25)), ("uses", num(3)), ("glow", text("Red"))]), "Genesis"),
        // ── Seasonal mascots ──
        entity("mascot-spring", "CHUNCHUN",
            Kind::Mascot { position: 15.0, level: 1, season: Season::Spring }, Mythic, "MASCOT",
            "The guardian of pixel spring, brings growth and renewal.",
            attrs(&[("element", text("Nature")), ("power", num(95)), ("season", text("Spring"))]), "Seasonal"),
        entity("mascot-summer", "XTAXTANG",
            Kind::Mascot { position: 40.0, level: 2, season: Season::Summer }, Mythic, "MASCOT",
            "Master of summer pixels, controls heat and light.",
            attrs(&[("element", text("Fire")), ("power", num(98)), ("season", text("Summer"))]), "Seasonal"),
        entity("mascot-fall", "QIUMING",
            Kind::Mascot { position: 65.0, level: 3, season: Season::Fall }, Mythic, "MASCOT",
            "The autumn pixel keeper, brings harvest and change.",
            attrs(&[("element", text("Earth")), ("power", num(92)), ("season", text("Fall"))]), "Seasonal"),
        entity("mascot-winter", "DONGSHAN",
            Kind::Mascot { position: 85.0, level: 4, season: Season::Winter }, Mythic, "MASCOT",
            "The winter pixel guardian, master of frost and snow.",
            attrs(&[("element", text("Ice")), ("power", num(97)), ("season", text("Winter"))]), "Seasonal"),
        // ── Creature cards ──
        entity("card-fox", "PIXEL FOX", Kind::Creature { position: 22.0 }, Rare, "CREATURE",
            "A mischievous digital fox that can phase through pixel walls.",
            attrs(&[("speed", num(85)), ("stealth", num(70)), ("luck", num(90))]), "Creatures"),
        entity("card-lion", "CYBER LION", Kind::Creature { position: 45.0 }, Legendary, "CREATURE",
            "King of the digital savanna, with a roar that crashes systems.",
            attrs(&[("strength", num(95)), ("leadership", num(100)), ("courage", num(90))]), "Creatures"),
        entity("card-wolf", "PIXEL WOLF", Kind::Creature { position: 60.0 }, Epic, "CREATURE",
            "A lone wolf made of pixels that howls at the digital moon.",
            attrs(&[("pack", num(80)), ("hunting", num(85)), ("night", num(95))]), "Creatures"),
        entity("card-panda", "NEON PANDA", Kind::Creature { position: 78.0 }, Uncommon, "CREATURE",
            "A peaceful pixel panda that glows in the dark.",
            attrs(&[("calm", num(100)), ("glow", num(75)), ("bamboo", num(90))]), "Creatures"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_shape() {
        let c = Catalog::builtin();
        assert_eq!(c.len(), 12);
        assert_eq!(c.total_levels(), 4);
        assert_eq!(c.mascot_indices().len(), 4);
        // Builtin data passes the same validation as external catalogs
        assert!(Catalog::new(c.entities().to_vec()).is_ok());
    }

    #[test]
    fn mascots_are_level_scoped_items_are_not() {
        let c = Catalog::builtin();
        assert_eq!(c.get("mascot-fall").and_then(|e| e.kind.level()), Some(3));
        assert_eq!(c.get("pixel-sword").and_then(|e| e.kind.level()), None);
        assert_eq!(c.get("card-wolf").map(|e| e.category()), Some(Category::Creatures));
    }

    #[test]
    fn duplicate_ids_rejected() {
        let mut list = Catalog::builtin().entities().to_vec();
        list.push(list[0].clone());
        assert_eq!(
            Catalog::new(list).unwrap_err(),
            CatalogError::DuplicateId("pixel-sword".into())
        );
    }

    #[test]
    fn out_of_range_position_rejected() {
        let mut list = Catalog::builtin().entities().to_vec();
        list[1].kind = Kind::Item { position: 120.0 };
        assert!(matches!(
            Catalog::new(list),
            Err(CatalogError::PositionOutOfRange { .. })
        ));
    }

    #[test]
    fn rarity_filter_cycle_wraps_to_none() {
        let mut r = None;
        for _ in 0..Rarity::ALL.len() {
            r = Rarity::cycle(r);
            assert!(r.is_some());
        }
        assert_eq!(Rarity::cycle(r), None);
    }

    #[test]
    fn external_toml_catalog() {
        let text = r#"
            [[entity]]
            id = "orb"
            name = "ORB"
            kind = "item"
            rarity = "EPIC"
            position = 42.0
            attributes = { shine = 7, hue = "Blue" }

            [[entity]]
            id = "yeti"
            name = "YETI"
            kind = "mascot"
            rarity = "MYTHIC"
            position = 10.0
            level = 6
        "#;
        let c = Catalog::from_toml(text).unwrap();
        assert_eq!(c.len(), 2);
        assert_eq!(c.total_levels(), 6);
        let orb = c.get("orb").unwrap();
        assert_eq!(orb.attributes.get("shine"), Some(&AttrValue::Num(7)));
        assert_eq!(orb.attributes.get("hue"), Some(&AttrValue::Text("Blue".into())));
        assert_eq!(orb.type_label, "ITEM");
        assert!(matches!(
            c.get("yeti").unwrap().kind,
            Kind::Mascot { level: 6, season: Season::Winter, .. }
        ));
    }

    #[test]
    fn mascot_without_level_is_a_parse_error() {
        let text = r#"
            [[entity]]
            id = "ghost"
            name = "GHOST"
            kind = "mascot"
            rarity = "RARE"
            position = 10.0
        "#;
        assert!(matches!(Catalog::from_toml(text), Err(CatalogError::Parse(_))));
    }

    #[test]
    fn empty_catalog_rejected() {
        assert_eq!(Catalog::from_toml("").unwrap_err(), CatalogError::Empty);
    }

    #[test]
    fn realm_names() {
        assert_eq!(realm_name(1), "SPRING REALM");
        assert_eq!(realm_name(4), "WINTER REALM");
        assert_eq!(realm_name(9), "UNKNOWN REALM");
    }
}
