use dashmap::DashMap;
use log::{debug, error, info};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use thiserror::Error;

use crate::config::{BackendKind, Config};
use crate::engine::database::SqliteBackend;
use crate::engine::economy::{self, Transition};
use crate::engine::error::{GameError, StoreError};
use crate::engine::game_data::Catalog;
use crate::engine::parser::{self, Command};
use crate::engine::profile::UserRecord;
use crate::engine::replies;
use crate::engine::store::{FileBackend, MemoryBackend, StorageBackend, UserStore};

#[derive(Debug, Error)]
enum DispatchError {
    #[error(transparent)]
    Game(#[from] GameError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Routes chat commands to economy operations and renders the replies.
///
/// Holds no game state of its own. Commands for the same user are
/// serialized by a per-user lock around load, mutate and save; different
/// users never wait on each other.
pub struct Dispatcher {
    catalog: Arc<Catalog>,
    store: UserStore,
    rng: Mutex<StdRng>,
    user_locks: DashMap<String, Arc<tokio::sync::Mutex<()>>>,
}

impl Dispatcher {
    pub fn new(catalog: Arc<Catalog>, store: UserStore, rng: StdRng) -> Self {
        Self {
            catalog,
            store,
            rng: Mutex::new(rng),
            user_locks: DashMap::new(),
        }
    }

    /// Builds the backend named in the config, initialises it and wires a
    /// dispatcher on top.
    pub async fn from_config(config: &Config) -> Result<Self, StoreError> {
        let backend: Arc<dyn StorageBackend> = match config.system.backend {
            BackendKind::Json => Arc::new(FileBackend::new(&config.system.data_dir)),
            BackendKind::Sqlite => Arc::new(SqliteBackend::open(&config.system.database_path).await?),
            BackendKind::Memory => Arc::new(MemoryBackend::new()),
        };

        let catalog = Arc::new(config.catalog.clone());
        let store = UserStore::new(backend, catalog.clone(), config.game.starting_money);
        store.init().await?;
        info!("Storage ready ({:?} backend)", config.system.backend);

        let rng = match config.system.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self::new(catalog, store, rng))
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Current record of a user without creating one.
    pub async fn peek(&self, user_id: &str) -> Result<Option<UserRecord>, StoreError> {
        self.store.peek(user_id).await
    }

    /// Handles one incoming chat message. Returns `None` for messages that
    /// are not commands.
    pub async fn handle_command(&self, user_id: &str, text: &str) -> Option<String> {
        if !parser::is_command(text) {
            return None;
        }

        let command = parser::parse_command(text);
        debug!("{} -> {:?}", user_id, command);

        if !command.touches_state() {
            return Some(Self::stateless_reply(&command));
        }

        let reply = {
            let lock = self.user_lock(user_id);
            let _guard = lock.lock().await;

            match self.execute(user_id, command).await {
                Ok(reply) => reply,
                Err(DispatchError::Game(e)) => replies::game_error_message(&e),
                Err(DispatchError::Store(e)) => {
                    error!("Storage failure for {}: {}", user_id, e);
                    replies::storage_failure_message()
                }
            }
        };
        self.release_user_lock(user_id);
        Some(reply)
    }

    fn user_lock(&self, user_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        self.user_locks.entry(user_id.to_string()).or_default().clone()
    }

    /// Drops the lock entry once no task holds or waits on it. Cloning
    /// happens under the same shard lock, so a count of one is final.
    fn release_user_lock(&self, user_id: &str) {
        self.user_locks.remove_if(user_id, |_, lock| Arc::strong_count(lock) == 1);
    }

    fn stateless_reply(command: &Command) -> String {
        match command {
            Command::ShowRanking => replies::ranking_message(),
            _ => replies::help_message(),
        }
    }

    async fn execute(&self, user_id: &str, command: Command) -> Result<String, DispatchError> {
        let record = self.store.load(user_id).await?;

        match command {
            Command::Fish => {
                let step = {
                    let mut rng = self.rng.lock();
                    economy::fish(&record, &self.catalog, &mut *rng)
                };
                debug!("{} caught {} ({})", user_id, step.outcome.species, step.outcome.category);
                self.commit(user_id, &step).await?;
                Ok(replies::catch_message(&step.outcome))
            }
            Command::ShowInventory => Ok(replies::inventory_message(&economy::inventory(&record))),
            Command::Sell => {
                let step = economy::sell(&record, &self.catalog)?;
                self.commit(user_id, &step).await?;
                info!("{} sold goods for {}", user_id, step.outcome.total);
                Ok(replies::sale_message(&step.outcome))
            }
            Command::ShowShop => {
                let listing = economy::shop(&record, &self.catalog);
                Ok(replies::shop_message(record.money, &listing))
            }
            Command::Buy(item) => {
                let step = economy::buy(&record, &self.catalog, &item)?;
                self.commit(user_id, &step).await?;
                info!("{} bought {}", user_id, item);
                Ok(replies::purchase_message(&step.outcome))
            }
            Command::ShowRanking | Command::Unknown => Ok(Self::stateless_reply(&command)),
        }
    }

    async fn commit<T>(&self, user_id: &str, step: &Transition<T>) -> Result<(), StoreError> {
        self.store.save(user_id, &step.record).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dispatcher_with(backend: Arc<MemoryBackend>, seed: u64) -> Dispatcher {
        let catalog = Arc::new(Catalog::default());
        let store = UserStore::new(backend, catalog.clone(), 100);
        Dispatcher::new(catalog, store, StdRng::seed_from_u64(seed))
    }

    fn dispatcher() -> (Dispatcher, Arc<MemoryBackend>) {
        let backend = Arc::new(MemoryBackend::new());
        (dispatcher_with(backend.clone(), 3), backend)
    }

    #[tokio::test]
    async fn test_new_user_scenario() {
        let (bot, _) = dispatcher();

        let reply = bot.handle_command("U1", "/pescar").await.unwrap();
        assert!(reply.contains("Pescaria Realizada"));
        let record = bot.peek("U1").await.unwrap().unwrap();
        assert_eq!(record.inventory.len(), 1);
        assert_eq!(record.inventory.values().copied().collect::<Vec<_>>(), vec![1]);
        assert_eq!(record.stats.total_catches, 1);

        let shop = bot.handle_command("U1", "/loja").await.unwrap();
        assert!(shop.contains("✅ Vara Básica (equipada) - R$ 0"));
        assert!(shop.contains("❌ Vara Intermediária - R$ 500"));

        let reply = bot.handle_command("U1", "/comprar Vara Intermediária").await.unwrap();
        assert!(reply.contains("Saldo insuficiente"));
        let after = bot.peek("U1").await.unwrap().unwrap();
        assert_eq!(after.equipped_rod, "Vara Básica");
        assert_eq!(after, record);
    }

    #[tokio::test]
    async fn test_plain_chatter_gets_no_reply() {
        let (bot, backend) = dispatcher();
        assert_eq!(bot.handle_command("U1", "oi, tudo bem?").await, None);
        assert!(backend.get_raw("U1").is_none());
    }

    #[tokio::test]
    async fn test_unknown_command_shows_help_without_creating_record() {
        let (bot, backend) = dispatcher();
        let reply = bot.handle_command("U1", "/ajuda").await.unwrap();
        assert_eq!(reply, replies::help_message());
        let reply = bot.handle_command("U1", "/comprar").await.unwrap();
        assert_eq!(reply, replies::help_message());
        assert_eq!(bot.handle_command("U1", "/RANKING").await.unwrap(), replies::ranking_message());
        assert!(backend.get_raw("U1").is_none());
    }

    #[tokio::test]
    async fn test_buy_bait_and_inventory() {
        let (bot, _) = dispatcher();
        let reply = bot.handle_command("U2", "/comprar Isca Comum").await.unwrap();
        assert_eq!(reply, "✅ Isca Comum comprada! Iscas: 1");
        let inventory = bot.handle_command("U2", "/inventario").await.unwrap();
        assert!(inventory.contains("Dinheiro: R$ 95"));
        assert!(inventory.contains("Iscas: 1"));

        let reply = bot.handle_command("U2", "/comprar Vara Mágica").await.unwrap();
        assert_eq!(reply, "❌ Item não encontrado na loja!");
    }

    #[tokio::test]
    async fn test_sell_twice() {
        let (bot, _) = dispatcher();
        assert_eq!(bot.handle_command("U3", "/vender").await.unwrap(), "❌ Nenhum peixe para vender!");
        assert_eq!(bot.handle_command("U3", "/vender").await.unwrap(), "❌ Nenhum peixe para vender!");
        assert_eq!(bot.peek("U3").await.unwrap().unwrap().money, 100);
    }

    #[tokio::test]
    async fn test_corrupt_record_gets_generic_reply() {
        let (bot, backend) = dispatcher();
        backend.put_raw("U4", b"\x00\x01");
        let reply = bot.handle_command("U4", "/pescar").await.unwrap();
        assert_eq!(reply, replies::storage_failure_message());
        assert_eq!(backend.get_raw("U4").unwrap(), b"\x00\x01".to_vec());
    }

    #[tokio::test]
    async fn test_same_seed_same_story() {
        let a = dispatcher_with(Arc::new(MemoryBackend::new()), 11);
        let b = dispatcher_with(Arc::new(MemoryBackend::new()), 11);
        for _ in 0..10 {
            assert_eq!(
                a.handle_command("U5", "/pescar").await,
                b.handle_command("U5", "/pescar").await
            );
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_commands_for_one_user_are_not_lost() {
        let (bot, _) = dispatcher();
        let bot = Arc::new(bot);

        let mut handles = Vec::new();
        for _ in 0..32 {
            let bot = bot.clone();
            handles.push(tokio::spawn(async move { bot.handle_command("U6", "/pescar").await }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let record = bot.peek("U6").await.unwrap().unwrap();
        assert_eq!(record.stats.total_catches, 32);
        assert_eq!(record.inventory.values().sum::<u64>(), 32);
        assert!(bot.user_locks.is_empty());
    }

    #[tokio::test]
    async fn test_idle_user_locks_are_released() {
        let (bot, _) = dispatcher();
        for user in ["U7", "U8", "U9"] {
            bot.handle_command(user, "/pescar").await.unwrap();
            bot.handle_command(user, "/vender").await.unwrap();
        }
        assert!(bot.user_locks.is_empty());
    }
}
