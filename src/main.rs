//! Binary entrypoint for the larpbot moderation CLI.
//!
//! Commands:
//! - `init` - write a starter `config.toml` and an empty game document
//! - `status` - print a summary of the current game
//! - `start-round` / `end-round` - open the next round or close the active one
//! - `add-player <id> <name>` - register a player
//! - `vote <voter> <target|no-vote|unvote>` - cast a main-round vote
//! - `tally [round]` - show vote totals
//! - `set-flag <flag> <true|false>` - toggle the active state or a lock
//! - `import-catalog` - merge action/item catalog files into the game
//! - `assign-character <id> <character>` - grant a character sheet to a player
//! - `roll-dice <count> <faces>` - roll up to five dice
//!
//! See the library crate docs for module-level details: `larpbot::`.
use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::{info, warn};
use std::path::PathBuf;

use larpbot::config::Config;
use larpbot::game::commands::{self, Ballot, GameLock, VoteOutcome};
use larpbot::game::configuration::{load_action_catalog, load_item_catalog, CharacterSheets};
use larpbot::game::{CommandError, Game, GameConfiguration, GameError, GameStore};

#[derive(Parser)]
#[command(name = "larpbot")]
#[command(about = "Game-state toolkit for social-deduction and LARP moderation bots")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (can be used before or after subcommand)
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: String,

    /// Verbose logging (-v, -vv for more; may appear before or after subcommand)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a default configuration and an empty game document
    Init,
    /// Show game status
    Status,
    /// Open the next round
    StartRound,
    /// Close the active round and its dilemmas
    EndRound,
    /// Register a player
    AddPlayer {
        player_id: u64,
        name: String,
        /// Player's private moderator channel
        #[arg(long)]
        mod_channel: Option<u64>,
    },
    /// Cast a vote in the active round
    Vote {
        voter: u64,
        /// Target player id, `no-vote` or `unvote`
        target: String,
    },
    /// Show vote totals for a round (latest by default)
    Tally { round: Option<u32> },
    /// Toggle the game's active state or one of its locks
    SetFlag {
        #[arg(value_enum)]
        flag: Flag,
        #[arg(action = clap::ArgAction::Set)]
        value: bool,
    },
    /// Merge action and item catalog files into the game
    ImportCatalog {
        /// Action catalog (defaults to game.action_file)
        #[arg(long)]
        actions: Option<PathBuf>,
        /// Item catalog (defaults to game.item_file)
        #[arg(long)]
        items: Option<PathBuf>,
    },
    /// Give a player the attributes, resources, actions and items of a character sheet
    AssignCharacter {
        player_id: u64,
        character: String,
        /// Character sheet file (defaults to game.character_file)
        #[arg(long)]
        sheets: Option<PathBuf>,
    },
    /// Roll dice (1-5 dice with 2, 4, 6, 8, 10, 12 or 20 faces)
    RollDice { count: u32, faces: u32 },
}

#[derive(Clone, Copy, ValueEnum)]
enum Flag {
    Active,
    VotingLocked,
    PartiesLocked,
    ItemsLocked,
}

fn parse_ballot(target: &str) -> Result<Ballot> {
    match target.to_ascii_lowercase().as_str() {
        "no-vote" | "novote" | "no vote" => Ok(Ballot::NoVote),
        "unvote" => Ok(Ballot::Unvote),
        other => other
            .parse::<u64>()
            .map(Ballot::Player)
            .map_err(|_| anyhow!("Vote target must be a player id, 'no-vote' or 'unvote'")),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::Init = cli.command {
        init_logging(&None, cli.verbose);
        return init(&cli.config).await;
    }

    let config = Config::load(&cli.config).await?;
    init_logging(&Some(config.clone()), cli.verbose);
    let store = GameStore::new(config.game_path());

    match cli.command {
        // Handled before the config is loaded
        Commands::Init => {}
        Commands::Status => {
            let game = store.load().await?;
            print_status(&game);
        }
        Commands::StartRound => {
            let number = store.update(commands::start_round).await?;
            println!("Created round {}!", number);
        }
        Commands::EndRound => {
            let number = store.update(commands::end_round).await?;
            println!("Ended round {}!", number);
        }
        Commands::AddPlayer {
            player_id,
            name,
            mod_channel,
        } => {
            let configuration = load_configuration(&config)?;
            store
                .update(|game| {
                    commands::add_player(game, player_id, &name, mod_channel, configuration.as_ref())
                })
                .await?;
            println!("Added player {} ({})", name, player_id);
        }
        Commands::Vote { voter, target } => {
            let ballot = parse_ballot(&target)?;
            let now = chrono::Utc::now().timestamp();
            let outcome = store
                .update(|game| commands::cast_vote(game, voter, ballot, now))
                .await?;
            match outcome {
                VoteOutcome::Cast(choice) => println!("Registered vote for {}!", choice),
                VoteOutcome::Changed { previous, current } => {
                    println!("Changed vote from {} to {}!", previous, current)
                }
                VoteOutcome::Withdrawn(choice) => println!("Withdrew vote for {}", choice),
            }
        }
        Commands::Tally { round } => {
            let game = store.load().await?;
            let tally = commands::tally_round(&game, round)?;
            if tally.entries.is_empty() {
                println!("No votes recorded.");
            }
            for entry in &tally.entries {
                let voters: Vec<String> = entry.voters.iter().map(|v| v.to_string()).collect();
                println!("{:>3}  {}  ({})", entry.count(), entry.choice, voters.join(", "));
            }
        }
        Commands::SetFlag { flag, value } => {
            store
                .update(|game| {
                    match flag {
                        Flag::Active => commands::set_game_active(game, value),
                        Flag::VotingLocked => commands::set_lock(game, GameLock::Voting, value),
                        Flag::PartiesLocked => commands::set_lock(game, GameLock::Parties, value),
                        Flag::ItemsLocked => commands::set_lock(game, GameLock::Items, value),
                    }
                    Ok::<(), GameError>(())
                })
                .await?;
            println!("Flag updated.");
        }
        Commands::ImportCatalog { actions, items } => {
            let actions_path = actions.or_else(|| config.action_path());
            let items_path = items.or_else(|| config.item_path());
            let actions = match actions_path {
                Some(path) if path.exists() => load_action_catalog(&path)?,
                Some(path) => {
                    warn!("Action catalog {} not found, skipping", path.display());
                    Vec::new()
                }
                None => Vec::new(),
            };
            let items = match items_path {
                Some(path) if path.exists() => load_item_catalog(&path)?,
                Some(path) => {
                    warn!("Item catalog {} not found, skipping", path.display());
                    Vec::new()
                }
                None => Vec::new(),
            };
            let (action_count, item_count) = (actions.len(), items.len());
            let replaced = store
                .update(|game| {
                    Ok::<usize, GameError>(game.import_actions(actions) + game.import_items(items))
                })
                .await?;
            println!(
                "Imported {} actions and {} items ({} replaced existing entries)",
                action_count, item_count, replaced
            );
        }
        Commands::AssignCharacter {
            player_id,
            character,
            sheets,
        } => {
            let path = sheets
                .or_else(|| config.character_path())
                .ok_or_else(|| anyhow!("No character file configured (game.character_file)"))?;
            let sheets = CharacterSheets::load(&path)?;
            store
                .update(|game| commands::assign_character(game, player_id, &sheets, &character))
                .await?;
            println!("Assigned {} to player {}", character, player_id);
        }
        Commands::RollDice { count, faces } => {
            let rolls = commands::roll_dice(count, faces)?;
            let values: Vec<String> = rolls.iter().map(|r| r.to_string()).collect();
            println!("Rolling {} d{}...", count, faces);
            println!("Rolled values: {}", values.join(", "));
        }
    }

    Ok(())
}

async fn init(config_path: &str) -> Result<()> {
    info!("Initializing new larpbot configuration");
    if std::path::Path::new(config_path).exists() {
        warn!("{} already exists, leaving it unchanged", config_path);
    } else {
        Config::create_default(config_path).await?;
        info!("Configuration file created at {}", config_path);
    }
    let config = Config::load(config_path).await?;

    let store = GameStore::new(config.game_path());
    if store.exists() {
        info!("Game document already present at {}", store.path().display());
    } else {
        store.save(&Game::default()).await?;
        info!("Created empty game at {}", store.path().display());
    }

    if let Some(path) = config.configuration_path() {
        if !path.exists() {
            GameConfiguration::default().save(&path)?;
            info!("Created default game configuration at {}", path.display());
        }
    }
    Ok(())
}

fn load_configuration(config: &Config) -> Result<Option<GameConfiguration>, CommandError> {
    match config.configuration_path() {
        Some(path) => match GameConfiguration::load(&path) {
            Ok(configuration) => Ok(Some(configuration)),
            Err(GameError::NotFound(_)) => Ok(None),
            Err(e) => Err(e.into()),
        },
        None => Ok(None),
    }
}

fn print_status(game: &Game) {
    println!("Game: {}", if game.is_active { "active" } else { "inactive" });
    println!(
        "Locks: voting={} parties={} items={}",
        game.voting_locked, game.parties_locked, game.items_locked
    );
    println!(
        "Players: {} ({} alive)",
        game.players.len(),
        game.get_living_player_ids().len()
    );
    match game.get_latest_round() {
        Some(round) => println!(
            "Latest round: {} ({}, {} votes, {} dilemmas)",
            round.round_number,
            if round.is_active_round { "active" } else { "ended" },
            round.votes.len(),
            round.round_dilemmas.len()
        ),
        None => println!("Latest round: none"),
    }
    println!("Parties: {}", game.parties.len());
    println!(
        "Catalog: {} actions, {} items",
        game.actions.len(),
        game.items.len()
    );
    println!("Revision: {}", game.revision);
}

fn init_logging(config: &Option<Config>, verbosity: u8) {
    use std::io::Write;
    let mut builder = env_logger::Builder::new();
    // CLI verbosity overrides the configured level
    let base_level = match (verbosity, config) {
        (0, Some(cfg)) => cfg
            .logging
            .level
            .parse()
            .unwrap_or(log::LevelFilter::Info),
        (0, None) => log::LevelFilter::Info,
        (1, _) => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(base_level);

    let log_file = config
        .as_ref()
        .and_then(|cfg| cfg.logging.file.as_ref())
        .and_then(|file| {
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(file)
                .ok()
        });

    match log_file {
        Some(f) => {
            let write_mutex = std::sync::Arc::new(std::sync::Mutex::new(f));
            // Echo to the console only when someone is watching
            let is_tty = atty::is(atty::Stream::Stdout);
            builder.format(move |fmt, record| {
                let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
                let line = format!("{} [{}] {}", ts, record.level(), record.args());
                if let Ok(mut guard) = write_mutex.lock() {
                    let _ = writeln!(guard, "{}", line);
                }
                if is_tty {
                    writeln!(fmt, "{}", line)
                } else {
                    Ok(())
                }
            });
        }
        None => {
            builder.format(|fmt, record| {
                let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
                writeln!(fmt, "{} [{}] {}", ts, record.level(), record.args())
            });
        }
    }
    let _ = builder.try_init();
}
