use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

use crate::engine::error::CatalogError;

// --- Enums ---

/// Rarity tier of a catch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Common,
    Rare,
    Junk,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Common => "common",
            Category::Rare => "rare",
            Category::Junk => "junk",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Rod,
    Bait,
    Other,
}

// --- Structs ---

/// Relative weights of the three catch pools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatchWeights {
    pub common: u32,
    pub rare: u32,
    pub junk: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopItem {
    pub name: String,
    pub price: u64,
    pub kind: ItemKind,
    /// Extra weight added to the common pool while this rod is equipped.
    #[serde(default)]
    pub rod_bonus: u32,
    #[serde(default)]
    pub default_owned: bool,
    #[serde(default)]
    pub consumable: bool,
}

impl ShopItem {
    fn rod(name: &str, price: u64, rod_bonus: u32, default_owned: bool) -> Self {
        Self {
            name: name.to_string(),
            price,
            kind: ItemKind::Rod,
            rod_bonus,
            default_owned,
            consumable: false,
        }
    }

    fn bait(name: &str, price: u64) -> Self {
        Self {
            name: name.to_string(),
            price,
            kind: ItemKind::Bait,
            rod_bonus: 0,
            default_owned: false,
            consumable: true,
        }
    }
}

/// Static game data: catch pools, weights, sale prices and the shop.
///
/// Built once at startup (usually as part of [`crate::config::Config`]) and
/// shared read-only. Every constructor path runs the same validation, so a
/// `Catalog` value always has non-empty pools, a positive weight total and
/// exactly one default rod.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawCatalog")]
pub struct Catalog {
    common_species: Vec<String>,
    rare_species: Vec<String>,
    junk_items: Vec<String>,
    weights: CatchWeights,
    prices: BTreeMap<String, u64>,
    shop_items: Vec<ShopItem>,
    /// Index of the single default-owned rod in `shop_items`.
    #[serde(skip_serializing)]
    default_rod: usize,
}

/// Unvalidated catalog as it appears in `config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawCatalog {
    pub common_species: Vec<String>,
    pub rare_species: Vec<String>,
    pub junk_items: Vec<String>,
    pub weights: CatchWeights,
    pub prices: BTreeMap<String, u64>,
    pub shop_items: Vec<ShopItem>,
}

impl TryFrom<RawCatalog> for Catalog {
    type Error = CatalogError;

    fn try_from(raw: RawCatalog) -> Result<Self, Self::Error> {
        let pools = [
            (Category::Common, &raw.common_species),
            (Category::Rare, &raw.rare_species),
            (Category::Junk, &raw.junk_items),
        ];
        for (category, pool) in pools {
            if pool.is_empty() {
                return Err(CatalogError::EmptyPool(category));
            }
        }

        let w = raw.weights;
        if u64::from(w.common) + u64::from(w.rare) + u64::from(w.junk) == 0 {
            return Err(CatalogError::ZeroWeights);
        }

        if let Some((name, _)) = raw.prices.iter().find(|(_, price)| **price == 0) {
            return Err(CatalogError::NonPositivePrice(name.clone()));
        }

        let mut seen = HashSet::new();
        for item in &raw.shop_items {
            if !seen.insert(item.name.as_str()) {
                return Err(CatalogError::DuplicateShopItem(item.name.clone()));
            }
        }

        let defaults: Vec<usize> = raw
            .shop_items
            .iter()
            .enumerate()
            .filter(|(_, item)| item.default_owned)
            .map(|(index, _)| index)
            .collect();
        let default_rod = match defaults.as_slice() {
            [index] => *index,
            _ => return Err(CatalogError::DefaultItemCount(defaults.len())),
        };
        if raw.shop_items[default_rod].kind != ItemKind::Rod {
            return Err(CatalogError::DefaultItemNotRod(raw.shop_items[default_rod].name.clone()));
        }

        Ok(Self {
            common_species: raw.common_species,
            rare_species: raw.rare_species,
            junk_items: raw.junk_items,
            weights: raw.weights,
            prices: raw.prices,
            shop_items: raw.shop_items,
            default_rod,
        })
    }
}

impl Catalog {
    pub fn new(raw: RawCatalog) -> Result<Self, CatalogError> {
        Self::try_from(raw)
    }

    pub fn weights(&self) -> CatchWeights {
        self.weights
    }

    /// Species pool for a category. Never empty.
    pub fn pool(&self, category: Category) -> &[String] {
        match category {
            Category::Common => &self.common_species,
            Category::Rare => &self.rare_species,
            Category::Junk => &self.junk_items,
        }
    }

    /// Sale price of a species, `None` when it cannot be sold.
    pub fn price_of(&self, species: &str) -> Option<u64> {
        self.prices.get(species).copied()
    }

    pub fn shop_item(&self, name: &str) -> Option<&ShopItem> {
        self.shop_items.iter().find(|item| item.name == name)
    }

    /// Shop items in listing order.
    pub fn shop_items(&self) -> &[ShopItem] {
        &self.shop_items
    }

    pub fn default_rod(&self) -> &ShopItem {
        &self.shop_items[self.default_rod]
    }

    pub fn is_rod(&self, name: &str) -> bool {
        matches!(self.shop_item(name), Some(item) if item.kind == ItemKind::Rod)
    }

    /// Common-pool bonus of a rod; 0 for anything that is not a known rod.
    pub fn rod_bonus_for(&self, rod: &str) -> u32 {
        match self.shop_item(rod) {
            Some(item) if item.kind == ItemKind::Rod => item.rod_bonus,
            _ => 0,
        }
    }
}

// --- Data Loading ---

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl Default for RawCatalog {
    fn default() -> Self {
        let mut prices = BTreeMap::new();
        for (species, price) in [
            ("Tilápia", 10),
            ("Sardinha", 8),
            ("Carpa", 12),
            ("Bagre", 15),
            ("Dourado", 100),
            ("Salmão", 120),
            ("Atum", 150),
            ("Cherne", 200),
        ] {
            prices.insert(species.to_string(), price);
        }

        Self {
            common_species: names(&["Tilápia", "Sardinha", "Carpa", "Bagre"]),
            rare_species: names(&["Dourado", "Salmão", "Atum", "Cherne"]),
            junk_items: names(&["Garrafa Plástica", "Lata", "Saco Plástico", "Pneu Velho"]),
            weights: CatchWeights { common: 70, rare: 5, junk: 25 },
            prices,
            shop_items: vec![
                ShopItem::rod("Vara Básica", 0, 0, true),
                ShopItem::rod("Vara Intermediária", 500, 5, false),
                ShopItem::rod("Vara Avançada", 2000, 10, false),
                ShopItem::bait("Isca Comum", 5),
                ShopItem::bait("Isca Rara", 20),
            ],
        }
    }
}

impl Default for Catalog {
    fn default() -> Self {
        let raw = RawCatalog::default();
        Self {
            common_species: raw.common_species,
            rare_species: raw.rare_species,
            junk_items: raw.junk_items,
            weights: raw.weights,
            prices: raw.prices,
            shop_items: raw.shop_items,
            // "Vara Básica" leads the built-in shop.
            default_rod: 0,
        }
    }
}
