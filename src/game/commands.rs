//! Moderation and player commands over a loaded [`Game`].
//!
//! Each function validates against the current state, mutates the game in place, and
//! returns data for the chat adapter to render. On error the game is unchanged. These
//! functions are where uniqueness, party capacity and the single-active-round rule are
//! enforced; the model itself accepts anything.
//!
//! Locks (`voting_locked`, `parties_locked`, `items_locked`) and the inactive-game
//! gate only apply to player-initiated commands. A moderator acting through
//! [`Actor::Moderator`] bypasses them.

use log::{debug, info};
use rand::Rng;
use serde::Serialize;

use super::configuration::{CharacterSheets, GameConfiguration};
use super::errors::{CommandError, CommandResult};
use super::state::Game;
use super::tally::VoteTally;
use super::types::{
    Action, ChannelId, Dilemma, Item, Party, Player, PlayerId, Round, Vote, VoteChoice,
};

/// Who is issuing a command that players may also run themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    Moderator,
    Player,
}

impl Actor {
    fn is_moderator(self) -> bool {
        matches!(self, Actor::Moderator)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameLock {
    Parties,
    Voting,
    Items,
}

/// Whether a dilemma edit adds or removes an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edit {
    Add,
    Remove,
}

/// A main-round ballot as submitted by a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ballot {
    Player(PlayerId),
    NoVote,
    Unvote,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum VoteOutcome {
    /// First vote from this player.
    Cast(VoteChoice),
    /// An earlier vote was replaced in place.
    Changed {
        previous: VoteChoice,
        current: VoteChoice,
    },
    /// The player's vote was removed.
    Withdrawn(VoteChoice),
}

fn require_active(game: &Game) -> CommandResult<()> {
    if game.is_active {
        Ok(())
    } else {
        Err(CommandError::GameInactive)
    }
}

fn require_living(game: &Game, player_id: PlayerId) -> CommandResult<&Player> {
    match game.get_player(player_id) {
        None => Err(CommandError::PlayerNotFound(player_id)),
        Some(player) if player.is_dead => Err(CommandError::PlayerDead(player_id)),
        Some(player) => Ok(player),
    }
}

fn active_round_mut(game: &mut Game) -> CommandResult<&mut Round> {
    match game.get_latest_round_mut() {
        Some(round) if round.is_active_round => Ok(round),
        _ => Err(CommandError::NoActiveRound),
    }
}

/// Replace the voter's existing vote in place, or append a new one.
fn place_vote(votes: &mut Vec<Vote>, voter: PlayerId, choice: VoteChoice, now: i64) -> VoteOutcome {
    match votes.iter_mut().rev().find(|v| v.player_id == voter) {
        Some(existing) => {
            let previous = existing.choice.clone();
            existing.replace(choice.clone(), now);
            VoteOutcome::Changed {
                previous,
                current: choice,
            }
        }
        None => {
            votes.push(Vote::new(voter, choice.clone(), now));
            VoteOutcome::Cast(choice)
        }
    }
}

// ============================================================================
// Game flags and players
// ============================================================================

pub fn set_game_active(game: &mut Game, active: bool) {
    game.is_active = active;
    info!("Game active state set to {}", active);
}

pub fn set_lock(game: &mut Game, lock: GameLock, locked: bool) {
    match lock {
        GameLock::Parties => game.parties_locked = locked,
        GameLock::Voting => game.voting_locked = locked,
        GameLock::Items => game.items_locked = locked,
    }
    info!("{:?} lock set to {}", lock, locked);
}

/// Register a player. Starting resources come from the configuration when given.
pub fn add_player(
    game: &mut Game,
    player_id: PlayerId,
    discord_name: &str,
    mod_channel: Option<ChannelId>,
    configuration: Option<&GameConfiguration>,
) -> CommandResult<()> {
    if game.get_player(player_id).is_some() {
        return Err(CommandError::PlayerExists(player_id));
    }
    let mut player = Player::new(player_id, discord_name);
    player.player_mod_channel = mod_channel;
    if let Some(configuration) = configuration {
        player.player_resources = configuration.default_resources();
    }
    game.add_player(player);
    info!("Added player {} ({})", discord_name, player_id);
    Ok(())
}

pub fn set_player_dead(game: &mut Game, player_id: PlayerId, dead: bool) -> CommandResult<()> {
    let player = game
        .get_player_mut(player_id)
        .ok_or(CommandError::PlayerNotFound(player_id))?;
    player.is_dead = dead;
    info!("Player {} marked {}", player_id, if dead { "dead" } else { "alive" });
    Ok(())
}

// ============================================================================
// Rounds and dilemmas
// ============================================================================

/// Open the next round. Fails while the latest round is still active.
pub fn start_round(game: &mut Game) -> CommandResult<u32> {
    if let Some(latest) = game.get_latest_round() {
        if latest.is_active_round {
            return Err(CommandError::RoundAlreadyActive(latest.round_number));
        }
    }
    let mut round = Round::new(game.next_round_number());
    round.activate()?;
    let number = round.round_number;
    game.add_round(round);
    info!("Started round {}", number);
    Ok(number)
}

/// Close the active round and every dilemma in it.
pub fn end_round(game: &mut Game) -> CommandResult<u32> {
    let round = active_round_mut(game)?;
    round.deactivate();
    round.close_dilemmas();
    info!("Ended round {}", round.round_number);
    Ok(round.round_number)
}

/// Add a closed dilemma to the active round.
pub fn create_dilemma(
    game: &mut Game,
    dilemma_name: &str,
    player_ids: &[PlayerId],
    choices: &[String],
) -> CommandResult<()> {
    if let Some(missing) = player_ids.iter().find(|id| game.get_player(**id).is_none()) {
        return Err(CommandError::PlayerNotFound(*missing));
    }
    let round = active_round_mut(game)?;
    if round.get_dilemma(dilemma_name).is_some() {
        return Err(CommandError::DilemmaExists(dilemma_name.to_string()));
    }
    let dilemma = Dilemma::new(dilemma_name)
        .with_players(player_ids.iter().copied())
        .with_choices(choices.iter().cloned());
    round.add_dilemma(dilemma);
    info!(
        "Created dilemma '{}' in round {} for {} players",
        dilemma_name,
        round.round_number,
        player_ids.len()
    );
    Ok(())
}

pub fn open_dilemma(game: &mut Game, dilemma_name: &str) -> CommandResult<()> {
    let dilemma = dilemma_mut(game, dilemma_name)?;
    dilemma.open()?;
    info!("Opened dilemma '{}'", dilemma_name);
    Ok(())
}

pub fn close_dilemma(game: &mut Game, dilemma_name: &str) -> CommandResult<()> {
    let dilemma = dilemma_mut(game, dilemma_name)?;
    dilemma.close();
    info!("Closed dilemma '{}'", dilemma_name);
    Ok(())
}

fn dilemma_mut<'a>(game: &'a mut Game, dilemma_name: &str) -> CommandResult<&'a mut Dilemma> {
    active_round_mut(game)?
        .get_dilemma_mut(dilemma_name)
        .ok_or_else(|| CommandError::DilemmaNotFound(dilemma_name.to_string()))
}

/// Add or remove an eligible player. Returns false when adding a player who was
/// already eligible.
pub fn update_dilemma_player(
    game: &mut Game,
    dilemma_name: &str,
    player_id: PlayerId,
    edit: Edit,
) -> CommandResult<bool> {
    if edit == Edit::Add && game.get_player(player_id).is_none() {
        return Err(CommandError::PlayerNotFound(player_id));
    }
    let dilemma = dilemma_mut(game, dilemma_name)?;
    let changed = match edit {
        Edit::Add => dilemma.add_player(player_id),
        Edit::Remove => {
            dilemma.remove_player(player_id)?;
            true
        }
    };
    info!("Dilemma '{}': {:?} player {}", dilemma_name, edit, player_id);
    Ok(changed)
}

/// Add or remove an answer choice. Returns false when adding a choice that was
/// already offered.
pub fn update_dilemma_choice(
    game: &mut Game,
    dilemma_name: &str,
    choice: &str,
    edit: Edit,
) -> CommandResult<bool> {
    let dilemma = dilemma_mut(game, dilemma_name)?;
    let changed = match edit {
        Edit::Add => dilemma.add_choice(choice),
        Edit::Remove => {
            dilemma.remove_choice(choice)?;
            true
        }
    };
    info!("Dilemma '{}': {:?} choice '{}'", dilemma_name, edit, choice);
    Ok(changed)
}

// ============================================================================
// Voting
// ============================================================================

/// Record a main-round vote from `voter`.
///
/// A repeat vote replaces the earlier one in place; `Unvote` removes it.
pub fn cast_vote(game: &mut Game, voter: PlayerId, ballot: Ballot, now: i64) -> CommandResult<VoteOutcome> {
    require_active(game)?;
    if game.voting_locked {
        return Err(CommandError::VotingLocked);
    }
    require_living(game, voter)?;
    if let Ballot::Player(target) = ballot {
        require_living(game, target)?;
    }

    let round = active_round_mut(game)?;
    let outcome = match ballot {
        Ballot::Unvote => {
            let existing = round
                .get_player_vote(voter)
                .cloned()
                .ok_or(CommandError::NothingToWithdraw(voter))?;
            round.remove_vote(&existing)?;
            VoteOutcome::Withdrawn(existing.choice)
        }
        Ballot::NoVote => place_vote(&mut round.votes, voter, VoteChoice::NoVote, now),
        Ballot::Player(target) => place_vote(&mut round.votes, voter, VoteChoice::Player(target), now),
    };
    debug!("Round {} vote from {}: {:?}", round.round_number, voter, outcome);
    Ok(outcome)
}

/// Record a dilemma answer. Without a name, the voter's own dilemma is used.
pub fn cast_dilemma_vote(
    game: &mut Game,
    voter: PlayerId,
    dilemma_name: Option<&str>,
    choice: &str,
    now: i64,
) -> CommandResult<VoteOutcome> {
    require_active(game)?;
    if game.voting_locked {
        return Err(CommandError::VotingLocked);
    }
    require_living(game, voter)?;

    let round = active_round_mut(game)?;
    let name = match dilemma_name {
        Some(name) => name.to_string(),
        None => round
            .get_player_dilemma(voter)
            .map(|d| d.dilemma_name.clone())
            .ok_or_else(|| CommandError::DilemmaNotFound(format!("for player {}", voter)))?,
    };
    let dilemma = round
        .get_dilemma_mut(&name)
        .ok_or_else(|| CommandError::DilemmaNotFound(name.clone()))?;
    if !dilemma.is_active_dilemma {
        return Err(CommandError::DilemmaClosed(name));
    }
    if !dilemma.is_eligible(voter) {
        return Err(CommandError::NotEligible {
            player: voter,
            dilemma: name,
        });
    }
    if !dilemma.allows_choice(choice) {
        return Err(CommandError::InvalidChoice(choice.to_string()));
    }
    let outcome = place_vote(&mut dilemma.dilemma_votes, voter, VoteChoice::from(choice), now);
    debug!("Dilemma '{}' vote from {}: {:?}", name, voter, outcome);
    Ok(outcome)
}

/// Totals for a round, or for the latest round when none is named.
pub fn tally_round(game: &Game, round_number: Option<u32>) -> CommandResult<VoteTally> {
    let round = match round_number {
        Some(number) => game
            .get_round(number)
            .ok_or(CommandError::RoundNotFound(number))?,
        None => game.get_latest_round().ok_or(CommandError::NoActiveRound)?,
    };
    Ok(VoteTally::for_round(round))
}

// ============================================================================
// Parties
// ============================================================================

pub fn create_party(game: &mut Game, channel_id: ChannelId, party_name: &str, max_size: u32) -> CommandResult<()> {
    if game.get_party(channel_id).is_some() {
        return Err(CommandError::PartyExists(channel_id));
    }
    game.add_party(Party::new(channel_id, party_name, max_size));
    info!("Created party '{}' on channel {} (max {})", party_name, channel_id, max_size);
    Ok(())
}

/// Put a player into a party. A player may only be in one party at a time.
pub fn join_party(game: &mut Game, actor: Actor, player_id: PlayerId, channel_id: ChannelId) -> CommandResult<()> {
    if !actor.is_moderator() {
        require_active(game)?;
        if game.parties_locked {
            return Err(CommandError::PartiesLocked);
        }
    }
    let player = match game.get_player(player_id) {
        Some(player) => player.clone(),
        None => return Err(CommandError::PlayerNotFound(player_id)),
    };
    if player.is_dead && !actor.is_moderator() {
        return Err(CommandError::PlayerDead(player_id));
    }
    if game.get_player_party(&player).is_some() {
        return Err(CommandError::AlreadyInParty(player_id));
    }
    let party = game
        .get_party_mut(channel_id)
        .ok_or(CommandError::PartyNotFound(channel_id))?;
    if party.is_full() {
        return Err(CommandError::PartyFull {
            party: party.party_name.clone(),
            max_size: party.max_size,
        });
    }
    party.add_player(&player);
    info!("Player {} joined party '{}'", player_id, party.party_name);
    Ok(())
}

/// Take a player out of whatever party they are in. Returns that party's channel.
pub fn leave_party(game: &mut Game, actor: Actor, player_id: PlayerId) -> CommandResult<ChannelId> {
    if !actor.is_moderator() {
        require_active(game)?;
        if game.parties_locked {
            return Err(CommandError::PartiesLocked);
        }
    }
    let player = match game.get_player(player_id) {
        Some(player) => player.clone(),
        None => return Err(CommandError::PlayerNotFound(player_id)),
    };
    let party = game
        .get_player_party_mut(&player)
        .ok_or(CommandError::NotInParty(player_id))?;
    party.remove_player(&player)?;
    info!("Player {} left party '{}'", player_id, party.party_name);
    Ok(party.channel_id)
}

// ============================================================================
// Items and actions
// ============================================================================

/// Give a player their own copy of a catalog item.
pub fn grant_item(game: &mut Game, player_id: PlayerId, item_name: &str) -> CommandResult<()> {
    let item = game
        .get_item(item_name)
        .cloned()
        .ok_or_else(|| CommandError::ItemNotFound(item_name.to_string()))?;
    let player = game
        .get_player_mut(player_id)
        .ok_or(CommandError::PlayerNotFound(player_id))?;
    player.add_item(item);
    info!("Granted item '{}' to player {}", item_name, player_id);
    Ok(())
}

pub fn revoke_item(game: &mut Game, player_id: PlayerId, item_name: &str) -> CommandResult<Item> {
    let player = game
        .get_player_mut(player_id)
        .ok_or(CommandError::PlayerNotFound(player_id))?;
    let item = player
        .get_item(item_name)
        .cloned()
        .ok_or_else(|| CommandError::ItemNotFound(item_name.to_string()))?;
    let removed = player.remove_item(&item)?;
    info!("Revoked item '{}' from player {}", item_name, player_id);
    Ok(removed)
}

/// Move a held item between players, keeping its remaining uses.
pub fn transfer_item(
    game: &mut Game,
    actor: Actor,
    from: PlayerId,
    to: PlayerId,
    item_name: &str,
) -> CommandResult<()> {
    if !actor.is_moderator() {
        require_active(game)?;
        if game.items_locked {
            return Err(CommandError::ItemsLocked);
        }
        require_living(game, from)?;
        require_living(game, to)?;
    } else if game.get_player(to).is_none() {
        return Err(CommandError::PlayerNotFound(to));
    }

    let item = revoke_item(game, from, item_name)?;
    let recipient = game
        .get_player_mut(to)
        .ok_or(CommandError::PlayerNotFound(to))?;
    recipient.add_item(item);
    info!("Transferred item '{}' from {} to {}", item_name, from, to);
    Ok(())
}

/// Give a player their own copy of a catalog action.
pub fn grant_action(game: &mut Game, player_id: PlayerId, action_name: &str) -> CommandResult<()> {
    let action = game
        .get_action(action_name)
        .cloned()
        .ok_or_else(|| CommandError::ActionNotFound(action_name.to_string()))?;
    let player = game
        .get_player_mut(player_id)
        .ok_or(CommandError::PlayerNotFound(player_id))?;
    player.add_action(action);
    info!("Granted action '{}' to player {}", action_name, player_id);
    Ok(())
}

pub fn revoke_action(game: &mut Game, player_id: PlayerId, action_name: &str) -> CommandResult<Action> {
    let player = game
        .get_player_mut(player_id)
        .ok_or(CommandError::PlayerNotFound(player_id))?;
    let action = player
        .get_action(action_name)
        .cloned()
        .ok_or_else(|| CommandError::ActionNotFound(action_name.to_string()))?;
    let removed = player.remove_action(&action)?;
    info!("Revoked action '{}' from player {}", action_name, player_id);
    Ok(removed)
}

/// Spend one use of an action the player holds directly or through an item, paying
/// its resource costs. Returns the uses left afterwards (-1 when unlimited).
pub fn use_action(game: &mut Game, player_id: PlayerId, action_name: &str) -> CommandResult<i32> {
    require_active(game)?;
    require_living(game, player_id)?;
    let player = game
        .get_player_mut(player_id)
        .ok_or(CommandError::PlayerNotFound(player_id))?;

    let held = player.get_action(action_name).cloned().or_else(|| {
        player
            .get_item_actions()
            .into_iter()
            .find(|(_, action)| action.name == action_name)
            .map(|(_, action)| action.clone())
    });
    let action = held.ok_or_else(|| CommandError::ActionNotFound(action_name.to_string()))?;
    if !action.has_uses_left() {
        return Err(CommandError::NoUsesRemaining(action_name.to_string()));
    }
    if !player.can_afford(&action.action_costs) {
        return Err(CommandError::InsufficientResources(action_name.to_string()));
    }

    player.spend(&action.action_costs)?;
    let direct = player
        .player_actions
        .iter()
        .position(|a| a.name == action_name);
    let slot = match direct {
        Some(index) => &mut player.player_actions[index],
        None => player
            .player_items
            .iter_mut()
            .filter_map(|item| item.item_action.as_mut())
            .find(|a| a.name == action_name)
            .ok_or_else(|| CommandError::ActionNotFound(action_name.to_string()))?,
    };
    slot.consume_use()?;
    info!("Player {} used action '{}' ({} uses left)", player_id, action_name, slot.uses);
    Ok(slot.uses)
}

/// Change a player's resource, clamped to the configured bounds. Returns the new amount.
pub fn adjust_resource(
    game: &mut Game,
    player_id: PlayerId,
    resource_name: &str,
    delta: i64,
    configuration: Option<&GameConfiguration>,
) -> CommandResult<i64> {
    let (min, max) = configuration
        .map(|c| c.resource_bounds(resource_name))
        .unwrap_or((0, None));
    let player = game
        .get_player_mut(player_id)
        .ok_or(CommandError::PlayerNotFound(player_id))?;
    let amount = player.adjust_resource(resource_name, delta, min, max);
    info!("Player {} {} is now {}", player_id, resource_name, amount);
    Ok(amount)
}

/// Apply a character sheet to a registered player.
pub fn assign_character(
    game: &mut Game,
    player_id: PlayerId,
    sheets: &CharacterSheets,
    character_name: &str,
) -> CommandResult<()> {
    let character = sheets
        .get(character_name)
        .ok_or_else(|| CommandError::CharacterNotFound(character_name.to_string()))?;
    let player = game
        .get_player_mut(player_id)
        .ok_or(CommandError::PlayerNotFound(player_id))?;
    character.grant_to(player)?;
    info!("Assigned character '{}' to player {}", character_name, player_id);
    Ok(())
}

// ============================================================================
// Dice
// ============================================================================

pub const MAX_DICE: u32 = 5;
pub const DIE_FACES: [u32; 7] = [2, 4, 6, 8, 10, 12, 20];

/// Roll `count` dice with `faces` sides each. Values come back sorted ascending.
pub fn roll_dice(count: u32, faces: u32) -> CommandResult<Vec<u32>> {
    roll_dice_with(&mut rand::thread_rng(), count, faces)
}

pub fn roll_dice_with<R: Rng + ?Sized>(rng: &mut R, count: u32, faces: u32) -> CommandResult<Vec<u32>> {
    if count == 0 || count > MAX_DICE || !DIE_FACES.contains(&faces) {
        return Err(CommandError::InvalidDice { count, faces });
    }
    let mut rolls: Vec<u32> = (0..count).map(|_| rng.gen_range(1..=faces)).collect();
    rolls.sort_unstable();
    debug!("Rolled {}d{}: {:?}", count, faces, rolls);
    Ok(rolls)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::errors::GameError;
    use crate::game::types::Resource;

    fn running_game() -> Game {
        let mut game = Game::new(true);
        for (id, name) in [(1, "alice"), (2, "bob"), (3, "cara")] {
            add_player(&mut game, id, name, None, None).unwrap();
        }
        game
    }

    fn game_with_dilemma() -> Game {
        let mut game = running_game();
        start_round(&mut game).unwrap();
        create_dilemma(&mut game, "bridge", &[1], &["cross".to_string()]).unwrap();
        game
    }

    fn bridge(game: &Game) -> &Dilemma {
        game.get_latest_round().unwrap().get_dilemma("bridge").unwrap()
    }

    #[test]
    fn dilemma_players_are_added_and_removed() {
        let mut game = game_with_dilemma();
        assert!(update_dilemma_player(&mut game, "bridge", 2, Edit::Add).unwrap());
        assert!(!update_dilemma_player(&mut game, "bridge", 2, Edit::Add).unwrap());
        assert!(bridge(&game).is_eligible(2));

        assert!(matches!(
            update_dilemma_player(&mut game, "bridge", 9, Edit::Add),
            Err(CommandError::PlayerNotFound(9))
        ));
        update_dilemma_player(&mut game, "bridge", 1, Edit::Remove).unwrap();
        assert!(!bridge(&game).is_eligible(1));
        assert!(matches!(
            update_dilemma_player(&mut game, "bridge", 1, Edit::Remove),
            Err(CommandError::Game(GameError::InvariantViolation(_)))
        ));
        assert!(matches!(
            update_dilemma_player(&mut game, "tunnel", 2, Edit::Add),
            Err(CommandError::DilemmaNotFound(_))
        ));
    }

    #[test]
    fn dilemma_choices_are_added_and_removed() {
        let mut game = game_with_dilemma();
        assert!(update_dilemma_choice(&mut game, "bridge", "wait", Edit::Add).unwrap());
        open_dilemma(&mut game, "bridge").unwrap();
        cast_dilemma_vote(&mut game, 1, None, "wait", 5).unwrap();

        update_dilemma_choice(&mut game, "bridge", "cross", Edit::Remove).unwrap();
        assert!(matches!(
            cast_dilemma_vote(&mut game, 1, None, "cross", 6),
            Err(CommandError::InvalidChoice(_))
        ));
        assert!(matches!(
            update_dilemma_choice(&mut game, "bridge", "cross", Edit::Remove),
            Err(CommandError::Game(GameError::InvariantViolation(_)))
        ));

        end_round(&mut game).unwrap();
        assert!(matches!(
            update_dilemma_choice(&mut game, "bridge", "run", Edit::Add),
            Err(CommandError::NoActiveRound)
        ));
    }

    #[test]
    fn dice_rolls_are_sorted_and_in_range() {
        use rand::SeedableRng;
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        for faces in DIE_FACES {
            let rolls = roll_dice_with(&mut rng, MAX_DICE, faces).unwrap();
            assert_eq!(rolls.len(), MAX_DICE as usize);
            assert!(rolls.windows(2).all(|w| w[0] <= w[1]));
            assert!(rolls.iter().all(|r| (1..=faces).contains(r)));
        }
        assert_eq!(roll_dice(1, 20).unwrap().len(), 1);
    }

    #[test]
    fn dice_outside_the_table_are_refused() {
        assert!(matches!(roll_dice(0, 6), Err(CommandError::InvalidDice { count: 0, faces: 6 })));
        assert!(matches!(roll_dice(6, 6), Err(CommandError::InvalidDice { .. })));
        assert!(matches!(roll_dice(2, 7), Err(CommandError::InvalidDice { .. })));
    }

    #[test]
    fn use_action_prefers_player_copy_then_item() {
        let mut game = running_game();
        let player = game.get_player_mut(1).unwrap();
        player.add_action(Action::new("Peek", "").with_uses(1));
        player.add_item(Item::new("Wand", "").with_action(Action::new("Zap", "").with_uses(2)));

        assert_eq!(use_action(&mut game, 1, "Peek").unwrap(), 0);
        assert!(matches!(
            use_action(&mut game, 1, "Peek"),
            Err(CommandError::NoUsesRemaining(_))
        ));
        assert_eq!(use_action(&mut game, 1, "Zap").unwrap(), 1);
        assert!(matches!(
            use_action(&mut game, 1, "Fly"),
            Err(CommandError::ActionNotFound(_))
        ));
    }

    #[test]
    fn use_action_pays_costs_or_changes_nothing() {
        let mut game = running_game();
        let player = game.get_player_mut(2).unwrap();
        player.add_action(Action::new("Bribe", "").with_cost("gold", 3));
        player.adjust_resource("gold", 4, 0, None);

        assert_eq!(use_action(&mut game, 2, "Bribe").unwrap(), -1);
        assert_eq!(game.get_player(2).unwrap().resource_amount("gold"), 1);
        assert!(matches!(
            use_action(&mut game, 2, "Bribe"),
            Err(CommandError::InsufficientResources(_))
        ));
        assert_eq!(game.get_player(2).unwrap().resource_amount("gold"), 1);
    }

    #[test]
    fn add_player_rejects_duplicates_and_seeds_resources() {
        let mut game = running_game();
        assert!(matches!(
            add_player(&mut game, 1, "again", None, None),
            Err(CommandError::PlayerExists(1))
        ));
        let mut conf = GameConfiguration::default();
        conf.game_resources
            .push(crate::game::configuration::GameResource::new("gold").with_default_amount(5));
        add_player(&mut game, 9, "dan", Some(77), Some(&conf)).unwrap();
        let dan = game.get_player(9).unwrap();
        assert_eq!(dan.player_resources, vec![Resource::new("gold", 5)]);
        assert_eq!(dan.player_mod_channel, Some(77));
    }

    #[test]
    fn inactive_game_refuses_player_commands() {
        let mut game = running_game();
        start_round(&mut game).unwrap();
        set_game_active(&mut game, false);
        assert!(matches!(
            cast_vote(&mut game, 1, Ballot::NoVote, 0),
            Err(CommandError::GameInactive)
        ));
    }
}
