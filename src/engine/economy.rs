//! Economy operations over a single [`UserRecord`].
//!
//! Each mutating operation borrows the current record and returns a
//! [`Transition`] holding the next record and what happened. A failed
//! operation returns an error and no record at all, so there is nothing a
//! caller could persist by mistake.

use rand::Rng;

use crate::engine::error::GameError;
use crate::engine::game_data::{Catalog, ItemKind};
use crate::engine::mechanics::{self, Catch};
use crate::engine::profile::UserRecord;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition<T> {
    pub record: UserRecord,
    pub outcome: T,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoldLine {
    pub item: String,
    pub count: u64,
    pub subtotal: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleReceipt {
    pub lines: Vec<SoldLine>,
    pub total: u64,
    pub balance: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Purchase {
    Rod { name: String, price: u64 },
    Bait { name: String, price: u64, bait_count: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShopListing {
    pub name: String,
    pub price: u64,
    pub owned: bool,
    pub equipped: bool,
    pub consumable: bool,
}

/// Read-only snapshot used to render `/inventario`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryView<'a> {
    pub money: u64,
    pub rod: &'a str,
    pub bait_count: u64,
    pub items: Vec<(&'a str, u64)>,
}

/// Casts the line: draws a catch and stores it.
pub fn fish<R: Rng + ?Sized>(record: &UserRecord, catalog: &Catalog, rng: &mut R) -> Transition<Catch> {
    let catch = mechanics::resolve_catch(catalog, &record.equipped_rod, rng);
    record_catch(record, catch)
}

/// Adds an already drawn catch to the inventory and stats.
pub fn record_catch(record: &UserRecord, catch: Catch) -> Transition<Catch> {
    let mut next = record.clone();
    next.add_item(&catch.species, 1);
    next.stats.record(catch.category);
    Transition { record: next, outcome: catch }
}

pub fn inventory(record: &UserRecord) -> InventoryView<'_> {
    InventoryView {
        money: record.money,
        rod: &record.equipped_rod,
        bait_count: record.bait_count,
        items: record
            .inventory
            .iter()
            .filter(|(_, count)| **count > 0)
            .map(|(name, count)| (name.as_str(), *count))
            .collect(),
    }
}

/// Sells every inventory entry that has a catalog price. Unpriced items stay.
pub fn sell(record: &UserRecord, catalog: &Catalog) -> Result<Transition<SaleReceipt>, GameError> {
    let sellable: Vec<(String, u64)> = record
        .inventory
        .iter()
        .filter_map(|(item, count)| catalog.price_of(item).map(|price| (item.clone(), price)))
        .collect();

    if sellable.is_empty() {
        return Err(GameError::NothingToSell);
    }

    let mut next = record.clone();
    let mut lines = Vec::with_capacity(sellable.len());
    let mut total: u64 = 0;
    for (item, price) in sellable {
        let count = next.take_all(&item);
        let subtotal = price.saturating_mul(count);
        total = total.saturating_add(subtotal);
        lines.push(SoldLine { item, count, subtotal });
    }
    next.money = next.money.saturating_add(total);

    let balance = next.money;
    Ok(Transition { record: next, outcome: SaleReceipt { lines, total, balance } })
}

/// Items shown in `/loja`: consumables, items the player does not own, and
/// the rod currently in hand.
pub fn shop(record: &UserRecord, catalog: &Catalog) -> Vec<ShopListing> {
    catalog
        .shop_items()
        .iter()
        .filter_map(|item| {
            let equipped = item.kind == ItemKind::Rod && record.equipped_rod == item.name;
            let owned = equipped || item.default_owned;
            if owned && !item.consumable && !equipped {
                return None;
            }
            Some(ShopListing {
                name: item.name.clone(),
                price: item.price,
                owned,
                equipped,
                consumable: item.consumable,
            })
        })
        .collect()
}

/// Buys a shop item by its exact catalog name.
///
/// Rods replace the equipped rod; the previous rod is not remembered.
pub fn buy(record: &UserRecord, catalog: &Catalog, item_name: &str) -> Result<Transition<Purchase>, GameError> {
    let item = catalog
        .shop_item(item_name)
        .ok_or_else(|| GameError::ItemNotFound(item_name.to_string()))?;

    if record.money < item.price {
        return Err(GameError::InsufficientFunds { price: item.price, balance: record.money });
    }

    let mut next = record.clone();
    let outcome = match item.kind {
        ItemKind::Rod => {
            next.money -= item.price;
            next.equipped_rod = item.name.clone();
            Purchase::Rod { name: item.name.clone(), price: item.price }
        }
        ItemKind::Bait => {
            next.money -= item.price;
            next.bait_count = next.bait_count.saturating_add(1);
            Purchase::Bait { name: item.name.clone(), price: item.price, bait_count: next.bait_count }
        }
        ItemKind::Other => return Err(GameError::UnknownItemCategory(item.name.clone())),
    };

    Ok(Transition { record: next, outcome })
}
