use serde::{Deserialize, Serialize};
use std::path::Path;
use anyhow::Result;
use std::fs;

use crate::engine::game_data::Catalog;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct Config {
    pub system: SystemConfig,
    pub game: GameConfig,
    pub catalog: Catalog,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// One JSON file per user in `data_dir`.
    Json,
    Sqlite,
    /// Nothing survives a restart.
    Memory,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct SystemConfig {
    pub backend: BackendKind,
    pub data_dir: String,
    pub database_path: String,
    pub log_level: String,
    pub log_file: String,
    pub debug: bool,
    pub default_user: String,
    pub rng_seed: Option<u64>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct GameConfig {
    pub starting_money: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            system: SystemConfig {
                backend: BackendKind::Json,
                data_dir: "users".to_string(),
                database_path: "pescabot.db".to_string(),
                log_level: "info".to_string(),
                log_file: "pescabot.log".to_string(),
                debug: false,
                default_user: "console".to_string(),
                rng_seed: None,
            },
            game: GameConfig {
                starting_money: 100,
            },
            catalog: Catalog::default(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let mut config: Config = toml::from_str(&content)?;

        config.system.default_user = config.system.default_user.trim().to_string();

        Ok(config)
    }

    /// Loads `path`, writing the default config there first when it is missing.
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            let cfg = Config::default();
            cfg.save(path)?;
            Ok(cfg)
        }
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Log filter: `debug` when the debug flag is set, else `log_level`.
    pub fn log_filter(&self) -> &str {
        if self.system.debug { "debug" } else { &self.system.log_level }
    }
}
