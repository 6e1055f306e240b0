use thiserror::Error;

/// Errors raised by the game-state model, codec and durable store.
///
/// Lookups never produce these; they return `Option` and leave it to the caller to
/// decide whether absence is a user error.
#[derive(Debug, Error)]
pub enum GameError {
    /// Wrapper around IO errors (permissions, disk full, path gone).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The game document does not exist at the requested path.
    #[error("game document not found: {0}")]
    NotFound(String),

    /// The document is not valid JSON or a structure has the wrong shape.
    #[error("malformed game document: {0}")]
    Malformed(#[from] serde_json::Error),

    /// A mutation was asked to do something the model cannot represent, such as
    /// removing an entity that is not a member of its collection.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// The on-disk document moved on since this copy was loaded.
    #[error("revision conflict: loaded revision {expected}, found {found} on disk")]
    Conflict { expected: u64, found: u64 },
}

pub type GameResult<T> = Result<T, GameError>;

/// Refusals from the moderation command layer.
///
/// Everything except [`CommandError::Game`] is a user-facing outcome: the command was
/// understood but the game state does not allow it, and nothing was changed.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("the game is not active")]
    GameInactive,

    #[error("voting is locked")]
    VotingLocked,

    #[error("parties are locked")]
    PartiesLocked,

    #[error("item trading is locked")]
    ItemsLocked,

    #[error("there is no active round")]
    NoActiveRound,

    #[error("round {0} is still active")]
    RoundAlreadyActive(u32),

    #[error("round {0} does not exist")]
    RoundNotFound(u32),

    #[error("player {0} is already registered")]
    PlayerExists(u64),

    #[error("player {0} is not registered")]
    PlayerNotFound(u64),

    #[error("player {0} is dead")]
    PlayerDead(u64),

    #[error("player {0} has no vote to withdraw")]
    NothingToWithdraw(u64),

    #[error("dilemma '{0}' already exists in this round")]
    DilemmaExists(String),

    #[error("dilemma '{0}' does not exist")]
    DilemmaNotFound(String),

    #[error("dilemma '{0}' is not open")]
    DilemmaClosed(String),

    #[error("player {player} may not vote in dilemma '{dilemma}'")]
    NotEligible { player: u64, dilemma: String },

    #[error("'{0}' is not a valid choice")]
    InvalidChoice(String),

    #[error("a party already uses channel {0}")]
    PartyExists(u64),

    #[error("no party uses channel {0}")]
    PartyNotFound(u64),

    #[error("party '{party}' is full ({max_size} players)")]
    PartyFull { party: String, max_size: u32 },

    #[error("player {0} is already in a party")]
    AlreadyInParty(u64),

    #[error("player {0} is not in that party")]
    NotInParty(u64),

    #[error("item '{0}' not found")]
    ItemNotFound(String),

    #[error("action '{0}' not found")]
    ActionNotFound(String),

    #[error("action '{0}' has no uses remaining")]
    NoUsesRemaining(String),

    #[error("not enough resources for '{0}'")]
    InsufficientResources(String),

    #[error("character '{0}' not found")]
    CharacterNotFound(String),

    #[error("cannot roll {count}d{faces}")]
    InvalidDice { count: u32, faces: u32 },

    #[error(transparent)]
    Game(#[from] GameError),
}

pub type CommandResult<T> = Result<T, CommandError>;
