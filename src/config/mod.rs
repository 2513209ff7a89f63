//! # Configuration Management Module
//!
//! Loads and writes `config.toml`. Every section and field has a serde
//! default, so a partial file (or an empty one) still yields a playable game.
//!
//! ## Configuration Structure
//!
//! - [`GameConfig`] - start location, starting purse, pack size, quest limits, RNG seed
//! - [`PrisonConfig`] - guard count and strength, sentence length
//! - [`GymConfig`] - tournament size and prize money
//! - [`HealerConfig`] - healing and cure prices
//! - [`LoggingConfig`] - log level and optional log file
//! - [`StorageConfig`] - save directory
//!
//! ## Usage
//!
//! ```rust,no_run
//! use questhold::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     Config::create_default("config.toml").await?;
//!     let config = Config::load("config.toml").await?;
//!     println!("Pack size: {}", config.game.inventory_capacity);
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration File Format
//!
//! ```toml
//! [game]
//! starting_gold = 500
//! max_active_quests = 3
//! rng_seed = 42
//!
//! [prison]
//! guard_count = 2
//! ```

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::game::types::{LocationId, DEFAULT_INVENTORY_CAPACITY};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub start_location: LocationId,
    pub starting_gold: u64,
    pub inventory_capacity: usize,
    /// Quests a character may hold claimed at once.
    pub max_active_quests: usize,
    /// Quests a new character may post.
    pub quest_creation_quota: u8,
    /// Seed for the shared RNG; entropy when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rng_seed: Option<u64>,
    /// Length of narrative pauses in milliseconds (0 disables them).
    pub pacing_ms: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            start_location: LocationId::START,
            starting_gold: 500,
            inventory_capacity: DEFAULT_INVENTORY_CAPACITY,
            max_active_quests: 3,
            quest_creation_quota: 3,
            rng_seed: None,
            pacing_ms: 400,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PrisonConfig {
    pub guard_count: usize,
    /// Guards fight this many levels above the prisoner they watch.
    pub guard_level_bonus: u32,
    /// Days served after a failed break-out.
    pub sentence_days: u32,
    pub darkness_per_break: i64,
}

impl Default for PrisonConfig {
    fn default() -> Self {
        Self {
            guard_count: 2,
            guard_level_bonus: 1,
            sentence_days: 3,
            darkness_per_break: 25,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GymConfig {
    pub bout_opponents: usize,
    pub prize_gold_per_level: u64,
}

impl Default for GymConfig {
    fn default() -> Self {
        Self {
            bout_opponents: 3,
            prize_gold_per_level: 100,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HealerConfig {
    pub price_per_hp: u64,
    pub cure_poison: u64,
    pub cure_disease: u64,
    pub remove_curse: u64,
}

impl Default for HealerConfig {
    fn default() -> Self {
        Self {
            price_per_hp: 5,
            cure_poison: 200,
            cure_disease: 500,
            remove_curse: 1_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security_file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: Some("questhold.log".to_string()),
            security_file: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: "./data".to_string(),
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub game: GameConfig,
    pub prison: PrisonConfig,
    pub gym: GymConfig,
    pub healer: HealerConfig,
    pub logging: LoggingConfig,
    pub storage: StorageConfig,
}

impl Config {
    /// Load configuration from a file
    pub async fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path, e))?;

        Self::from_toml(&content).map_err(|e| anyhow!("Failed to parse config file {}: {}", path, e))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Create a default configuration file
    pub async fn create_default(path: &str) -> Result<()> {
        let config = Config::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| anyhow!("Failed to serialize default config: {}", e))?;

        fs::write(path, content)
            .await
            .map_err(|e| anyhow!("Failed to write config file {}: {}", path, e))?;

        Ok(())
    }

    /// Reject values that would make the game unplayable.
    pub fn validate(&self) -> Result<()> {
        if self.game.inventory_capacity == 0 {
            return Err(anyhow!("game.inventory_capacity must be at least 1"));
        }
        if self.game.max_active_quests == 0 {
            return Err(anyhow!("game.max_active_quests must be at least 1"));
        }
        if self.prison.guard_count == 0 {
            return Err(anyhow!("prison.guard_count must be at least 1"));
        }
        if self.gym.bout_opponents == 0 {
            return Err(anyhow!("gym.bout_opponents must be at least 1"));
        }
        Ok(())
    }
}
