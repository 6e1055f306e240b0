//! # Configuration Management Module
//!
//! Bot settings live in a TOML file, organised into sections:
//!
//! - [`BotConfig`] - chat-platform identifiers the adapter needs (guild, roles, channels)
//! - [`GameFilesConfig`] - where the game document and its template files live
//! - [`LoggingConfig`] - log level and optional log file
//!
//! ## Usage
//!
//! ```rust,no_run
//! use larpbot::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     Config::create_default("config.toml").await?;
//!     let config = Config::load("config.toml").await?;
//!     println!("Game file: {}", config.game_path().display());
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration File Format
//!
//! ```toml
//! [bot]
//! name = "larpbot"
//! guild_id = 123456789012345678
//! vote_channel = 223456789012345678
//!
//! [game]
//! data_dir = "./data"
//! game_file = "game.json"
//! configuration_file = "game_configuration.json"
//!
//! [logging]
//! level = "info"
//! file = "larpbot.log"
//! ```
//!
//! Relative file names in `[game]` are resolved against `data_dir`.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    pub name: String,
    pub guild_id: u64,
    /// Role allowed to run moderator commands.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moderator_role_id: Option<u64>,
    /// Channel for public vote announcements. Without one, announcements go to the
    /// channel the vote was cast in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vote_channel: Option<u64>,
    /// Channel where player requests to moderators are posted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_channel: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameFilesConfig {
    pub data_dir: String,
    #[serde(default = "default_game_file")]
    pub game_file: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configuration_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub character_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_file: Option<String>,
}

fn default_game_file() -> String {
    "game.json".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(default)]
    pub file: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub bot: BotConfig,
    pub game: GameFilesConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a file
    pub async fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path, e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {}: {}", path, e))?;

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

    pub fn validate(&self) -> Result<()> {
        if self.game.data_dir.trim().is_empty() {
            return Err(anyhow!("game.data_dir must not be empty"));
        }
        if self.game.game_file.trim().is_empty() {
            return Err(anyhow!("game.game_file must not be empty"));
        }
        match self.logging.level.to_ascii_lowercase().as_str() {
            "error" | "warn" | "info" | "debug" | "trace" | "off" => Ok(()),
            other => Err(anyhow!("Unknown logging.level '{}'", other)),
        }
    }

    fn resolve(&self, file: &str) -> PathBuf {
        let file = Path::new(file);
        if file.is_absolute() {
            file.to_path_buf()
        } else {
            Path::new(&self.game.data_dir).join(file)
        }
    }

    pub fn game_path(&self) -> PathBuf {
        self.resolve(&self.game.game_file)
    }

    pub fn configuration_path(&self) -> Option<PathBuf> {
        self.game.configuration_file.as_deref().map(|f| self.resolve(f))
    }

    pub fn character_path(&self) -> Option<PathBuf> {
        self.game.character_file.as_deref().map(|f| self.resolve(f))
    }

    pub fn action_path(&self) -> Option<PathBuf> {
        self.game.action_file.as_deref().map(|f| self.resolve(f))
    }

    pub fn item_path(&self) -> Option<PathBuf> {
        self.game.item_file.as_deref().map(|f| self.resolve(f))
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bot: BotConfig {
                name: "larpbot".to_string(),
                guild_id: 0,
                moderator_role_id: None,
                vote_channel: None,
                request_channel: None,
            },
            game: GameFilesConfig {
                data_dir: "./data".to_string(),
                game_file: default_game_file(),
                configuration_file: Some("game_configuration.json".to_string()),
                character_file: Some("characters.json".to_string()),
                action_file: Some("actions.json".to_string()),
                item_file: Some("items.json".to_string()),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                file: Some("larpbot.log".to_string()),
            },
        }
    }
}
