use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};

use super::codec::{empty_object_as_none, none_as_empty_object, null_as_default, uses_or_unlimited};
use super::errors::{GameError, GameResult};

/// Chat-platform user identifier.
pub type PlayerId = u64;
/// Chat-platform channel identifier.
pub type ChannelId = u64;
/// Chat-platform message identifier.
pub type MessageId = u64;

/// Use count meaning an action never runs out.
pub const UNLIMITED_USES: i32 = -1;

/// Document spelling of the "No Vote" ballot.
pub const NO_VOTE: &str = "No Vote";
/// Document spelling of the "Unvote" ballot.
pub const UNVOTE: &str = "Unvote";

/// Removes the first element equal to `item`, failing when there is none.
fn remove_member<T: PartialEq>(list: &mut Vec<T>, item: &T, what: &str) -> GameResult<T> {
    match list.iter().position(|candidate| candidate == item) {
        Some(index) => Ok(list.remove(index)),
        None => Err(GameError::InvariantViolation(format!(
            "{what} is not a member of this collection"
        ))),
    }
}

// ============================================================================
// Attributes & resources
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub level: i32,
    #[serde(default)]
    pub max_level: Option<i32>,
}

impl Attribute {
    pub fn new(name: &str, level: i32, max_level: Option<i32>) -> Self {
        Self {
            name: name.to_string(),
            level,
            max_level,
        }
    }
}

/// An amount of a named resource. Used for player holdings and action costs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub resource_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub resource_amt: i64,
}

impl Resource {
    pub fn new(resource_name: &str, resource_amt: i64) -> Self {
        Self {
            resource_name: resource_name.to_string(),
            resource_amt,
        }
    }
}

// ============================================================================
// Actions & items
// ============================================================================

/// When an action may be used. Advisory only; nothing in the model enforces it.
///
/// Timings compare by their stored string, so `Custom("night")` equals `Night`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActionTiming {
    Night,
    Day,
    Any,
    NightBonus,
    DayBonus,
    AnyBonus,
    Other,
    OtherBonus,
    Passive,
    /// Anything else a moderator typed into the document.
    Custom(String),
}

impl ActionTiming {
    pub fn as_str(&self) -> &str {
        match self {
            ActionTiming::Night => "night",
            ActionTiming::Day => "day",
            ActionTiming::Any => "any",
            ActionTiming::NightBonus => "night_bonus",
            ActionTiming::DayBonus => "day_bonus",
            ActionTiming::AnyBonus => "any_bonus",
            ActionTiming::Other => "other",
            ActionTiming::OtherBonus => "other_bonus",
            ActionTiming::Passive => "passive",
            ActionTiming::Custom(raw) => raw,
        }
    }
}

impl PartialEq for ActionTiming {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for ActionTiming {}

impl Hash for ActionTiming {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

impl From<String> for ActionTiming {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "night" => ActionTiming::Night,
            "day" => ActionTiming::Day,
            "any" => ActionTiming::Any,
            "night_bonus" => ActionTiming::NightBonus,
            "day_bonus" => ActionTiming::DayBonus,
            "any_bonus" => ActionTiming::AnyBonus,
            "other" => ActionTiming::Other,
            "other_bonus" => ActionTiming::OtherBonus,
            "passive" => ActionTiming::Passive,
            _ => ActionTiming::Custom(raw),
        }
    }
}

impl From<ActionTiming> for String {
    fn from(timing: ActionTiming) -> Self {
        match timing {
            ActionTiming::Custom(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ActionTiming {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A capability definition. The game catalog holds the canonical copy; players and
/// items hold their own copies so `uses` is tracked per holder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    #[serde(alias = "action_name")]
    pub name: String,
    #[serde(default, alias = "action_desc", deserialize_with = "null_as_default")]
    pub desc: String,
    #[serde(default, alias = "action_timing")]
    pub timing: Option<ActionTiming>,
    /// Remaining uses; [`UNLIMITED_USES`] never runs out.
    #[serde(
        default = "unlimited_uses",
        alias = "action_uses",
        deserialize_with = "uses_or_unlimited"
    )]
    pub uses: i32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub action_costs: Vec<Resource>,
}

fn unlimited_uses() -> i32 {
    UNLIMITED_USES
}

impl Action {
    pub fn new(name: &str, desc: &str) -> Self {
        Self {
            name: name.to_string(),
            desc: desc.to_string(),
            timing: None,
            uses: UNLIMITED_USES,
            action_costs: Vec::new(),
        }
    }

    pub fn with_timing(mut self, timing: ActionTiming) -> Self {
        self.timing = Some(timing);
        self
    }

    pub fn with_uses(mut self, uses: i32) -> Self {
        self.uses = uses;
        self
    }

    pub fn with_cost(mut self, resource_name: &str, amount: i64) -> Self {
        self.action_costs.push(Resource::new(resource_name, amount));
        self
    }

    pub fn is_unlimited(&self) -> bool {
        self.uses < 0
    }

    pub fn has_uses_left(&self) -> bool {
        self.is_unlimited() || self.uses > 0
    }

    /// Spend one use. Unlimited actions are left untouched.
    pub fn consume_use(&mut self) -> GameResult<()> {
        if self.is_unlimited() {
            return Ok(());
        }
        if self.uses == 0 {
            return Err(GameError::InvariantViolation(format!(
                "action '{}' has no uses remaining",
                self.name
            )));
        }
        self.uses -= 1;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub item_name: String,
    #[serde(
        rename = "item_desc",
        alias = "item_descr",
        default,
        deserialize_with = "null_as_default"
    )]
    pub item_descr: String,
    /// Action granted to whoever holds the item. Stored as `{}` when absent.
    #[serde(
        default,
        deserialize_with = "empty_object_as_none",
        serialize_with = "none_as_empty_object"
    )]
    pub item_action: Option<Action>,
    #[serde(default)]
    pub item_properties: Option<String>,
}

impl Item {
    pub fn new(item_name: &str, item_descr: &str) -> Self {
        Self {
            item_name: item_name.to_string(),
            item_descr: item_descr.to_string(),
            item_action: None,
            item_properties: None,
        }
    }

    pub fn with_action(mut self, action: Action) -> Self {
        self.item_action = Some(action);
        self
    }

    pub fn with_properties(mut self, properties: &str) -> Self {
        self.item_properties = Some(properties.to_string());
        self
    }
}

// ============================================================================
// Players
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub player_id: PlayerId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub player_discord_name: String,
    #[serde(default)]
    pub player_mod_channel: Option<ChannelId>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub player_attributes: Vec<Attribute>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub player_actions: Vec<Action>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub player_items: Vec<Item>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub player_resources: Vec<Resource>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_dead: bool,
}

impl Player {
    pub fn new(player_id: PlayerId, player_discord_name: &str) -> Self {
        Self {
            player_id,
            player_discord_name: player_discord_name.to_string(),
            player_mod_channel: None,
            player_attributes: Vec::new(),
            player_actions: Vec::new(),
            player_items: Vec::new(),
            player_resources: Vec::new(),
            is_dead: false,
        }
    }

    pub fn with_mod_channel(mut self, channel_id: ChannelId) -> Self {
        self.player_mod_channel = Some(channel_id);
        self
    }

    pub fn is_alive(&self) -> bool {
        !self.is_dead
    }

    pub fn get_item(&self, item_name: &str) -> Option<&Item> {
        self.player_items.iter().find(|i| i.item_name == item_name)
    }

    pub fn get_item_mut(&mut self, item_name: &str) -> Option<&mut Item> {
        self.player_items.iter_mut().find(|i| i.item_name == item_name)
    }

    pub fn add_item(&mut self, item: Item) {
        self.player_items.push(item);
    }

    /// Remove an item previously obtained from [`Player::get_item`].
    pub fn remove_item(&mut self, item: &Item) -> GameResult<Item> {
        remove_member(&mut self.player_items, item, &format!("item '{}'", item.item_name))
    }

    pub fn get_action(&self, action_name: &str) -> Option<&Action> {
        self.player_actions.iter().find(|a| a.name == action_name)
    }

    pub fn get_action_mut(&mut self, action_name: &str) -> Option<&mut Action> {
        self.player_actions.iter_mut().find(|a| a.name == action_name)
    }

    pub fn add_action(&mut self, action: Action) {
        self.player_actions.push(action);
    }

    /// Remove an action previously obtained from [`Player::get_action`].
    pub fn remove_action(&mut self, action: &Action) -> GameResult<Action> {
        remove_member(&mut self.player_actions, action, &format!("action '{}'", action.name))
    }

    /// Actions granted by held items, paired with the granting item's name.
    pub fn get_item_actions(&self) -> Vec<(&str, &Action)> {
        self.player_items
            .iter()
            .filter_map(|item| {
                item.item_action
                    .as_ref()
                    .map(|action| (item.item_name.as_str(), action))
            })
            .collect()
    }

    pub fn get_attribute(&self, name: &str) -> Option<&Attribute> {
        self.player_attributes.iter().find(|a| a.name == name)
    }

    pub fn get_attribute_mut(&mut self, name: &str) -> Option<&mut Attribute> {
        self.player_attributes.iter_mut().find(|a| a.name == name)
    }

    pub fn get_resource(&self, resource_name: &str) -> Option<&Resource> {
        self.player_resources
            .iter()
            .find(|r| r.resource_name == resource_name)
    }

    /// Held amount of a resource; zero when the player has none on record.
    pub fn resource_amount(&self, resource_name: &str) -> i64 {
        self.get_resource(resource_name)
            .map(|r| r.resource_amt)
            .unwrap_or(0)
    }

    /// Add `delta` to a resource, clamped to `[min, max]`. Returns the new amount.
    pub fn adjust_resource(
        &mut self,
        resource_name: &str,
        delta: i64,
        min: i64,
        max: Option<i64>,
    ) -> i64 {
        let index = match self
            .player_resources
            .iter()
            .position(|r| r.resource_name == resource_name)
        {
            Some(index) => index,
            None => {
                self.player_resources.push(Resource::new(resource_name, 0));
                self.player_resources.len() - 1
            }
        };
        let entry = &mut self.player_resources[index];
        let mut amount = entry.resource_amt.saturating_add(delta).max(min);
        if let Some(max) = max {
            amount = amount.min(max);
        }
        entry.resource_amt = amount;
        amount
    }

    pub fn can_afford(&self, costs: &[Resource]) -> bool {
        costs
            .iter()
            .all(|cost| self.resource_amount(&cost.resource_name) >= cost.resource_amt)
    }

    /// Deduct every cost, or nothing at all if any one is unaffordable.
    pub fn spend(&mut self, costs: &[Resource]) -> GameResult<()> {
        if !self.can_afford(costs) {
            return Err(GameError::InvariantViolation(format!(
                "player {} cannot afford the cost",
                self.player_id
            )));
        }
        for cost in costs {
            self.adjust_resource(&cost.resource_name, -cost.resource_amt, i64::MIN, None);
        }
        Ok(())
    }
}

// ============================================================================
// Votes
// ============================================================================

/// What a vote was cast for.
///
/// Player targets are stored as their id string, so any choice string that is the
/// canonical decimal form of an id decodes as [`VoteChoice::Player`]. Build choices
/// from raw strings with `VoteChoice::from` to get the same normalisation.
///
/// Equality and hashing go through the stored string: `Answer("2")` and `Player(2)`
/// are the same choice.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum VoteChoice {
    Player(PlayerId),
    NoVote,
    Unvote,
    /// A free-form answer, such as a dilemma choice.
    Answer(String),
}

impl VoteChoice {
    pub fn player_id(&self) -> Option<PlayerId> {
        match self {
            VoteChoice::Player(id) => Some(*id),
            _ => None,
        }
    }
}

impl PartialEq for VoteChoice {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (VoteChoice::Player(a), VoteChoice::Player(b)) => a == b,
            (VoteChoice::NoVote, VoteChoice::NoVote) | (VoteChoice::Unvote, VoteChoice::Unvote) => {
                true
            }
            _ => self.to_string() == other.to_string(),
        }
    }
}

impl Eq for VoteChoice {}

impl Hash for VoteChoice {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_string().hash(state);
    }
}

impl From<String> for VoteChoice {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            NO_VOTE => VoteChoice::NoVote,
            UNVOTE => VoteChoice::Unvote,
            _ => match raw.parse::<PlayerId>() {
                Ok(id) if id.to_string() == raw => VoteChoice::Player(id),
                _ => VoteChoice::Answer(raw),
            },
        }
    }
}

impl From<&str> for VoteChoice {
    fn from(raw: &str) -> Self {
        VoteChoice::from(raw.to_string())
    }
}

impl From<VoteChoice> for String {
    fn from(choice: VoteChoice) -> Self {
        choice.to_string()
    }
}

impl fmt::Display for VoteChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VoteChoice::Player(id) => write!(f, "{}", id),
            VoteChoice::NoVote => f.write_str(NO_VOTE),
            VoteChoice::Unvote => f.write_str(UNVOTE),
            VoteChoice::Answer(raw) => f.write_str(raw),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub player_id: PlayerId,
    pub choice: VoteChoice,
    /// Unix seconds.
    #[serde(default, deserialize_with = "null_as_default")]
    pub timestamp: i64,
}

impl Vote {
    pub fn new(player_id: PlayerId, choice: VoteChoice, timestamp: i64) -> Self {
        Self {
            player_id,
            choice,
            timestamp,
        }
    }

    /// A vote stamped with the current time.
    pub fn now(player_id: PlayerId, choice: VoteChoice) -> Self {
        Self::new(player_id, choice, chrono::Utc::now().timestamp())
    }

    pub fn replace(&mut self, choice: VoteChoice, timestamp: i64) {
        self.choice = choice;
        self.timestamp = timestamp;
    }
}

// ============================================================================
// Dilemmas
// ============================================================================

/// A sub-vote within a round, open to a subset of players and answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dilemma {
    #[serde(alias = "dilemma_id")]
    pub dilemma_name: String,
    #[serde(default)]
    pub dilemma_channel_id: Option<ChannelId>,
    #[serde(default)]
    pub dilemma_message_id: Option<MessageId>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub dilemma_player_ids: BTreeSet<PlayerId>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub dilemma_choices: BTreeSet<String>,
    #[serde(default, alias = "votes", deserialize_with = "null_as_default")]
    pub dilemma_votes: Vec<Vote>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_active_dilemma: bool,
}

impl Dilemma {
    pub fn new(dilemma_name: &str) -> Self {
        Self {
            dilemma_name: dilemma_name.to_string(),
            dilemma_channel_id: None,
            dilemma_message_id: None,
            dilemma_player_ids: BTreeSet::new(),
            dilemma_choices: BTreeSet::new(),
            dilemma_votes: Vec::new(),
            is_active_dilemma: false,
        }
    }

    pub fn with_players(mut self, player_ids: impl IntoIterator<Item = PlayerId>) -> Self {
        self.dilemma_player_ids.extend(player_ids);
        self
    }

    pub fn with_choices<S: Into<String>>(mut self, choices: impl IntoIterator<Item = S>) -> Self {
        self.dilemma_choices.extend(choices.into_iter().map(Into::into));
        self
    }

    pub fn is_eligible(&self, player_id: PlayerId) -> bool {
        self.dilemma_player_ids.contains(&player_id)
    }

    pub fn allows_choice(&self, choice: &str) -> bool {
        self.dilemma_choices.contains(choice)
    }

    /// Returns false if the player was already eligible.
    pub fn add_player(&mut self, player_id: PlayerId) -> bool {
        self.dilemma_player_ids.insert(player_id)
    }

    pub fn remove_player(&mut self, player_id: PlayerId) -> GameResult<()> {
        if !self.dilemma_player_ids.remove(&player_id) {
            return Err(GameError::InvariantViolation(format!(
                "player {} is not in dilemma '{}'",
                player_id, self.dilemma_name
            )));
        }
        Ok(())
    }

    /// Returns false if the choice was already offered.
    pub fn add_choice(&mut self, choice: &str) -> bool {
        self.dilemma_choices.insert(choice.to_string())
    }

    pub fn remove_choice(&mut self, choice: &str) -> GameResult<()> {
        if !self.dilemma_choices.remove(choice) {
            return Err(GameError::InvariantViolation(format!(
                "'{}' is not a choice in dilemma '{}'",
                choice, self.dilemma_name
            )));
        }
        Ok(())
    }

    /// The player's vote; if duplicates exist the last one wins.
    pub fn get_player_vote(&self, player_id: PlayerId) -> Option<&Vote> {
        self.dilemma_votes
            .iter()
            .rev()
            .find(|v| v.player_id == player_id)
    }

    pub fn get_player_vote_mut(&mut self, player_id: PlayerId) -> Option<&mut Vote> {
        self.dilemma_votes
            .iter_mut()
            .rev()
            .find(|v| v.player_id == player_id)
    }

    pub fn add_vote(&mut self, vote: Vote) {
        self.dilemma_votes.push(vote);
    }

    pub fn remove_vote(&mut self, vote: &Vote) -> GameResult<Vote> {
        remove_member(
            &mut self.dilemma_votes,
            vote,
            &format!("vote by player {}", vote.player_id),
        )
    }

    pub fn open(&mut self) -> GameResult<()> {
        if self.is_active_dilemma {
            return Err(GameError::InvariantViolation(format!(
                "dilemma '{}' is already active",
                self.dilemma_name
            )));
        }
        self.is_active_dilemma = true;
        Ok(())
    }

    pub fn close(&mut self) {
        self.is_active_dilemma = false;
    }
}

// ============================================================================
// Parties
// ============================================================================

/// A capacity-bounded group sharing a channel. Capacity is checked by callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    #[serde(default, deserialize_with = "null_as_default")]
    pub player_ids: BTreeSet<PlayerId>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub party_name: String,
    pub channel_id: ChannelId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub max_size: u32,
}

impl Party {
    pub fn new(channel_id: ChannelId, party_name: &str, max_size: u32) -> Self {
        Self {
            player_ids: BTreeSet::new(),
            party_name: party_name.to_string(),
            channel_id,
            max_size,
        }
    }

    pub fn contains(&self, player_id: PlayerId) -> bool {
        self.player_ids.contains(&player_id)
    }

    pub fn size(&self) -> usize {
        self.player_ids.len()
    }

    pub fn is_full(&self) -> bool {
        self.player_ids.len() >= self.max_size as usize
    }

    pub fn add_player(&mut self, player: &Player) {
        self.player_ids.insert(player.player_id);
    }

    pub fn remove_player(&mut self, player: &Player) -> GameResult<()> {
        if self.player_ids.remove(&player.player_id) {
            Ok(())
        } else {
            Err(GameError::InvariantViolation(format!(
                "player {} is not in party '{}'",
                player.player_id, self.party_name
            )))
        }
    }
}

// ============================================================================
// Rounds
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    pub round_number: u32,
    #[serde(default)]
    pub round_channel_id: Option<ChannelId>,
    #[serde(default)]
    pub round_message_id: Option<MessageId>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_active_round: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub votes: Vec<Vote>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub round_dilemmas: Vec<Dilemma>,
}

impl Round {
    pub fn new(round_number: u32) -> Self {
        Self {
            round_number,
            round_channel_id: None,
            round_message_id: None,
            is_active_round: false,
            votes: Vec::new(),
            round_dilemmas: Vec::new(),
        }
    }

    pub fn activate(&mut self) -> GameResult<()> {
        if self.is_active_round {
            return Err(GameError::InvariantViolation(format!(
                "round {} is already active",
                self.round_number
            )));
        }
        self.is_active_round = true;
        Ok(())
    }

    pub fn deactivate(&mut self) {
        self.is_active_round = false;
    }

    /// The player's vote; if duplicates exist the last one wins.
    pub fn get_player_vote(&self, player_id: PlayerId) -> Option<&Vote> {
        self.votes.iter().rev().find(|v| v.player_id == player_id)
    }

    pub fn get_player_vote_mut(&mut self, player_id: PlayerId) -> Option<&mut Vote> {
        self.votes.iter_mut().rev().find(|v| v.player_id == player_id)
    }

    pub fn add_vote(&mut self, vote: Vote) {
        self.votes.push(vote);
    }

    pub fn remove_vote(&mut self, vote: &Vote) -> GameResult<Vote> {
        remove_member(
            &mut self.votes,
            vote,
            &format!("vote by player {}", vote.player_id),
        )
    }

    pub fn add_dilemma(&mut self, dilemma: Dilemma) {
        self.round_dilemmas.push(dilemma);
    }

    pub fn get_dilemma(&self, dilemma_name: &str) -> Option<&Dilemma> {
        self.round_dilemmas
            .iter()
            .find(|d| d.dilemma_name == dilemma_name)
    }

    pub fn get_dilemma_mut(&mut self, dilemma_name: &str) -> Option<&mut Dilemma> {
        self.round_dilemmas
            .iter_mut()
            .find(|d| d.dilemma_name == dilemma_name)
    }

    /// The dilemma the player may vote in; if several, the last one listed.
    pub fn get_player_dilemma(&self, player_id: PlayerId) -> Option<&Dilemma> {
        self.round_dilemmas
            .iter()
            .rev()
            .find(|d| d.is_eligible(player_id))
    }

    pub fn close_dilemmas(&mut self) {
        for dilemma in &mut self.round_dilemmas {
            dilemma.close();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vote_choice_parses_sentinels_and_ids() {
        assert_eq!(VoteChoice::from("No Vote"), VoteChoice::NoVote);
        assert_eq!(VoteChoice::from("Unvote"), VoteChoice::Unvote);
        assert_eq!(VoteChoice::from("1234"), VoteChoice::Player(1234));
        assert_eq!(
            VoteChoice::from("0042"),
            VoteChoice::Answer("0042".to_string())
        );
        assert_eq!(
            VoteChoice::from("Save the mayor"),
            VoteChoice::Answer("Save the mayor".to_string())
        );
        assert_eq!(VoteChoice::Player(77).to_string(), "77");
    }

    #[test]
    fn action_timing_keeps_unknown_values() {
        assert_eq!(ActionTiming::from("night_bonus".to_string()), ActionTiming::NightBonus);
        let custom = ActionTiming::from("dawn".to_string());
        assert_eq!(custom, ActionTiming::Custom("dawn".to_string()));
        assert_eq!(String::from(custom), "dawn");
    }

    #[test]
    fn choices_compare_by_stored_form() {
        assert_eq!(VoteChoice::Answer("2".to_string()), VoteChoice::Player(2));
        assert_eq!(VoteChoice::Answer("No Vote".to_string()), VoteChoice::NoVote);
        assert_ne!(VoteChoice::Answer("02".to_string()), VoteChoice::Player(2));
        assert_eq!(ActionTiming::Custom("night".to_string()), ActionTiming::Night);

        let mut seen = std::collections::HashSet::new();
        seen.insert(VoteChoice::Player(2));
        assert!(seen.contains(&VoteChoice::Answer("2".to_string())));
    }

    #[test]
    fn dilemma_players_and_choices_can_change() {
        let mut dilemma = Dilemma::new("bridge").with_players([1]).with_choices(["cross"]);
        assert!(dilemma.add_player(2));
        assert!(!dilemma.add_player(2));
        assert!(dilemma.add_choice("wait"));
        assert!(dilemma.allows_choice("wait"));

        dilemma.remove_player(1).unwrap();
        assert!(!dilemma.is_eligible(1));
        assert!(matches!(
            dilemma.remove_player(1),
            Err(GameError::InvariantViolation(_))
        ));
        dilemma.remove_choice("cross").unwrap();
        assert!(matches!(
            dilemma.remove_choice("cross"),
            Err(GameError::InvariantViolation(_))
        ));
        assert_eq!(dilemma.dilemma_choices.len(), 1);
    }

    #[test]
    fn limited_action_runs_out() {
        let mut action = Action::new("Investigate", "Learn a role").with_uses(1);
        assert!(action.consume_use().is_ok());
        assert_eq!(action.uses, 0);
        assert!(!action.has_uses_left());
        assert!(matches!(
            action.consume_use(),
            Err(GameError::InvariantViolation(_))
        ));

        let mut unlimited = Action::new("Talk", "Chat");
        unlimited.consume_use().unwrap();
        assert_eq!(unlimited.uses, UNLIMITED_USES);
    }

    #[test]
    fn resources_clamp_and_spend_atomically() {
        let mut player = Player::new(1, "alice");
        assert_eq!(player.adjust_resource("gold", 10, 0, Some(8)), 8);
        assert_eq!(player.adjust_resource("gold", -20, 0, None), 0);
        player.adjust_resource("gold", 5, 0, None);
        player.adjust_resource("mana", 1, 0, None);

        let costs = vec![Resource::new("gold", 3), Resource::new("mana", 2)];
        assert!(player.spend(&costs).is_err());
        assert_eq!(player.resource_amount("gold"), 5);

        player.adjust_resource("mana", 1, 0, None);
        player.spend(&costs).unwrap();
        assert_eq!(player.resource_amount("gold"), 2);
        assert_eq!(player.resource_amount("mana"), 0);
    }

    #[test]
    fn item_actions_are_paired_with_item_names() {
        let mut player = Player::new(1, "alice");
        player.add_item(Item::new("Lantern", "Bright").with_action(Action::new("Shine", "Reveal")));
        player.add_item(Item::new("Rock", "Heavy"));
        let actions = player.get_item_actions();
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].0, "Lantern");
        assert_eq!(actions[0].1.name, "Shine");
    }

    #[test]
    fn dilemma_open_twice_is_rejected() {
        let mut dilemma = Dilemma::new("bridge");
        dilemma.open().unwrap();
        assert!(dilemma.open().is_err());
        dilemma.close();
        dilemma.close();
        assert!(!dilemma.is_active_dilemma);
    }

    #[test]
    fn player_dilemma_prefers_last_listed() {
        let mut round = Round::new(1);
        round.add_dilemma(Dilemma::new("first").with_players([5]));
        round.add_dilemma(Dilemma::new("second").with_players([5, 6]));
        assert_eq!(round.get_player_dilemma(5).unwrap().dilemma_name, "second");
        assert!(round.get_player_dilemma(9).is_none());
    }
}
