//! # larpbot - game-state core for social-deduction and LARP moderation bots
//!
//! Moderators and players drive a persistent game through chat commands. Every command
//! loads the game document, changes it, and writes it back. This crate holds everything
//! below the chat adapter:
//!
//! - [`game`] - entity model, JSON codec, durable store and the command layer
//! - [`config`] - bot configuration (TOML)
//!
//! The chat-platform client, message formatting and command registration live in the
//! adapter that links this crate.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use larpbot::config::Config;
//! use larpbot::game::GameStore;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.toml").await?;
//!     let store = GameStore::new(config.game_path());
//!     let game = store.load_or_default().await?;
//!     println!("{} players registered", game.players.len());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod game;
