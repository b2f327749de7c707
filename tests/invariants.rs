use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::sync::Arc;

use pescabot_rs::engine::bot::Dispatcher;
use pescabot_rs::engine::game_data::Catalog;
use pescabot_rs::engine::profile::UserRecord;
use pescabot_rs::engine::store::{FileBackend, MemoryBackend, StorageBackend, UserStore};

const COMMANDS: &[&str] = &[
    "/pescar",
    "/pescar",
    "/pescar",
    "/vender",
    "/inventario",
    "/loja",
    "/ranking",
    "/comprar Vara Intermediária",
    "/comprar Vara Avançada",
    "/comprar Vara Básica",
    "/comprar Isca Comum",
    "/comprar Isca Rara",
    "/comprar Barco",
    "/qualquer",
    "sem barra",
];

fn dispatcher(backend: Arc<dyn StorageBackend>, starting_money: u64, seed: u64) -> Dispatcher {
    let catalog = Arc::new(Catalog::default());
    let store = UserStore::new(backend, catalog.clone(), starting_money);
    Dispatcher::new(catalog, store, StdRng::seed_from_u64(seed))
}

fn assert_invariants(record: &UserRecord, catalog: &Catalog) {
    let stats = record.stats;
    assert_eq!(stats.total_catches, stats.common_caught + stats.rare_caught + stats.junk_caught);
    assert!(record.inventory.values().all(|count| *count > 0));
    assert!(catalog.is_rod(&record.equipped_rod));
    assert!(record.validate(catalog).is_ok());
}

#[tokio::test]
async fn random_sessions_keep_records_consistent() {
    let bot = dispatcher(Arc::new(MemoryBackend::new()), 100, 2024);
    let mut pick = StdRng::seed_from_u64(77);
    let users = ["ana", "bruno", "5511999999999@c.us"];

    let mut previous_stats = std::collections::HashMap::new();
    for _ in 0..600 {
        let user = *users.choose(&mut pick).unwrap();
        let command = *COMMANDS.choose(&mut pick).unwrap();
        let reply = bot.handle_command(user, command).await;
        assert_eq!(reply.is_some(), command.starts_with('/'));

        if let Some(record) = bot.peek(user).await.unwrap() {
            assert_invariants(&record, bot.catalog());

            let (total, common, rare, junk) = previous_stats.get(user).copied().unwrap_or((0, 0, 0, 0));
            assert!(record.stats.total_catches >= total);
            assert!(record.stats.common_caught >= common);
            assert!(record.stats.rare_caught >= rare);
            assert!(record.stats.junk_caught >= junk);
            previous_stats.insert(
                user,
                (
                    record.stats.total_catches,
                    record.stats.common_caught,
                    record.stats.rare_caught,
                    record.stats.junk_caught,
                ),
            );
        }
    }
}

#[tokio::test]
async fn rich_player_buys_and_sells_through_files() {
    let dir = tempfile::tempdir().unwrap();
    let backend = Arc::new(FileBackend::new(dir.path()));
    backend.init().await.unwrap();
    let bot = dispatcher(backend, 5_000, 9);

    let reply = bot.handle_command("rico", "/comprar Vara Avançada").await.unwrap();
    assert_eq!(reply, "✅ Vara Avançada comprada com sucesso!");

    for _ in 0..40 {
        bot.handle_command("rico", "/pescar").await.unwrap();
    }
    let before = bot.peek("rico").await.unwrap().unwrap();
    assert_eq!(before.money, 3_000);
    assert_eq!(before.stats.total_catches, 40);

    let junk: u64 = bot.catalog().pool(pescabot_rs::engine::game_data::Category::Junk)
        .iter()
        .map(|item| before.count_of(item))
        .sum();
    let expected_gain: u64 = before
        .inventory
        .iter()
        .filter_map(|(item, count)| bot.catalog().price_of(item).map(|price| price * count))
        .sum();

    bot.handle_command("rico", "/vender").await.unwrap();
    let after = bot.peek("rico").await.unwrap().unwrap();
    assert_eq!(after.money, before.money + expected_gain);
    assert_eq!(after.inventory.values().sum::<u64>(), junk);
    assert_invariants(&after, bot.catalog());

    // A second dispatcher over the same directory sees the same player.
    let reopened = dispatcher(Arc::new(FileBackend::new(dir.path())), 5_000, 1);
    assert_eq!(reopened.peek("rico").await.unwrap(), Some(after));
}
