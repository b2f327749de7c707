use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::engine::game_data::{Catalog, Category};

/// Durable per-user state. Serialized as one JSON document per user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub money: u64,
    /// Item name to count. A key exists only while its count is positive.
    pub inventory: BTreeMap<String, u64>,
    pub equipped_rod: String,
    pub bait_count: u64,
    pub stats: CatchStats,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatchStats {
    pub total_catches: u64,
    pub common_caught: u64,
    pub rare_caught: u64,
    pub junk_caught: u64,
}

impl CatchStats {
    /// Counts one catch. At the `u64` ceiling the tally stops moving as a
    /// whole, so the category counters still add up to the total.
    pub fn record(&mut self, category: Category) {
        let Some(total) = self.total_catches.checked_add(1) else {
            return;
        };
        self.total_catches = total;
        let counter = match category {
            Category::Common => &mut self.common_caught,
            Category::Rare => &mut self.rare_caught,
            Category::Junk => &mut self.junk_caught,
        };
        *counter = counter.saturating_add(1);
    }

    pub fn is_consistent(&self) -> bool {
        self.common_caught
            .checked_add(self.rare_caught)
            .and_then(|sum| sum.checked_add(self.junk_caught))
            == Some(self.total_catches)
    }
}

impl UserRecord {
    /// State of a player seen for the first time.
    pub fn new_player(catalog: &Catalog, starting_money: u64) -> Self {
        Self {
            money: starting_money,
            inventory: BTreeMap::new(),
            equipped_rod: catalog.default_rod().name.clone(),
            bait_count: 0,
            stats: CatchStats::default(),
        }
    }

    pub fn count_of(&self, item: &str) -> u64 {
        self.inventory.get(item).copied().unwrap_or(0)
    }

    pub fn add_item(&mut self, item: &str, amount: u64) {
        if amount == 0 {
            return;
        }
        *self.inventory.entry(item.to_string()).or_insert(0) += amount;
    }

    /// Removes an entry entirely, returning how many units it held.
    pub fn take_all(&mut self, item: &str) -> u64 {
        self.inventory.remove(item).unwrap_or(0)
    }

    /// Checks the invariants a persisted record must satisfy.
    pub fn validate(&self, catalog: &Catalog) -> Result<(), String> {
        if let Some((item, _)) = self.inventory.iter().find(|(_, count)| **count == 0) {
            return Err(format!("inventory entry {item:?} has a zero count"));
        }
        if !self.stats.is_consistent() {
            return Err(format!(
                "stats disagree: total {} but common {} + rare {} + junk {}",
                self.stats.total_catches,
                self.stats.common_caught,
                self.stats.rare_caught,
                self.stats.junk_caught
            ));
        }
        if !catalog.is_rod(&self.equipped_rod) {
            return Err(format!("equipped rod {:?} is not a rod in the catalog", self.equipped_rod));
        }
        Ok(())
    }
}
