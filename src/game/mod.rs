//! Game state for the moderation bot.
//!
//! - [`types`] - players, rounds, votes, dilemmas, parties, items and actions
//! - [`state`] - the [`Game`] aggregate and its lookups
//! - [`codec`] - JSON document encoding
//! - [`store`] - atomic file persistence with optional conflict detection
//! - [`configuration`] - game configuration, character sheets and catalogs
//! - [`tally`] - vote totals
//! - [`commands`] - validated moderator and player commands
//!
//! A command handler loads the game through a [`GameStore`], applies one of the
//! [`commands`] and saves the result:
//!
//! ```rust,no_run
//! use larpbot::game::{commands, CommandError, GameStore};
//!
//! # async fn run() -> Result<(), CommandError> {
//! let store = GameStore::new("data/game.json");
//! let round = store.update(|game| commands::start_round(game)).await?;
//! println!("round {} started", round);
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod commands;
pub mod configuration;
pub mod errors;
pub mod state;
pub mod store;
pub mod tally;
pub mod types;

pub use codec::{decode, encode};
pub use configuration::{CharacterSheets, GameConfiguration, PlayerCharacter};
pub use errors::{CommandError, CommandResult, GameError, GameResult};
pub use state::Game;
pub use store::{load_game, save_game, GameStore, StagedSave};
pub use tally::{TallyEntry, VoteTally};
pub use types::{
    Action, ActionTiming, Attribute, ChannelId, Dilemma, Item, MessageId, Party, Player,
    PlayerId, Resource, Round, Vote, VoteChoice,
};
