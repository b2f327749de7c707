use thiserror::Error;

use crate::engine::game_data::Category;

/// Failures of an economy operation. None of them leave a record mutated.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("item not found in shop: {0}")]
    ItemNotFound(String),

    #[error("insufficient funds: item costs {price}, balance is {balance}")]
    InsufficientFunds { price: u64, balance: u64 },

    #[error("item {0} is neither a rod nor bait")]
    UnknownItemCategory(String),

    /// Reported as a normal reply, not a failure.
    #[error("nothing to sell")]
    NothingToSell,
}

/// Failures of the persistence layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Persisted content exists but cannot be turned back into a valid record.
    #[error("record for {user_id} is corrupt: {reason}")]
    CorruptRecord { user_id: String, reason: String },

    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("failed to encode record: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("invalid storage key: {0:?}")]
    InvalidKey(String),
}

/// Rejections raised while building a catalog from configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("the {0} pool has no entries")]
    EmptyPool(Category),

    #[error("catch weights must not all be zero")]
    ZeroWeights,

    #[error("sale price for {0} must be positive")]
    NonPositivePrice(String),

    #[error("shop item {0} is listed more than once")]
    DuplicateShopItem(String),

    #[error("expected exactly one default-owned shop item, found {0}")]
    DefaultItemCount(usize),

    #[error("default-owned item {0} is not a rod")]
    DefaultItemNotRod(String),
}
