use serde::{Deserialize, Serialize};

use super::codec::null_as_default;
use super::types::{Action, Item, Party, Player, PlayerId, Round, ChannelId};

/// Root aggregate persisted as one JSON document.
///
/// Every collection keeps document order and every lookup is a linear scan on the
/// natural key. Keys are unique by convention only: `add_*` never rejects a duplicate,
/// so command code checks before inserting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_active: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub parties_locked: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub voting_locked: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub items_locked: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub players: Vec<Player>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub rounds: Vec<Round>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub parties: Vec<Party>,
    /// Canonical action definitions, copied onto holders when granted.
    #[serde(default, deserialize_with = "null_as_default")]
    pub actions: Vec<Action>,
    /// Canonical item definitions, copied onto holders when granted.
    #[serde(default, deserialize_with = "null_as_default")]
    pub items: Vec<Item>,
    /// Bumped by every checked save; see `GameStore::save_checked`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub revision: u64,
}

impl Game {
    pub fn new(is_active: bool) -> Self {
        Self {
            is_active,
            ..Self::default()
        }
    }

    // ------------------------------------------------------------------
    // Players
    // ------------------------------------------------------------------

    /// First player with this id.
    pub fn get_player(&self, player_id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.player_id == player_id)
    }

    pub fn get_player_mut(&mut self, player_id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.player_id == player_id)
    }

    pub fn add_player(&mut self, player: Player) {
        self.players.push(player);
    }

    pub fn get_living_player_ids(&self) -> Vec<PlayerId> {
        self.players
            .iter()
            .filter(|p| p.is_alive())
            .map(|p| p.player_id)
            .collect()
    }

    // ------------------------------------------------------------------
    // Rounds
    // ------------------------------------------------------------------

    pub fn get_round(&self, round_number: u32) -> Option<&Round> {
        self.rounds.iter().find(|r| r.round_number == round_number)
    }

    pub fn get_round_mut(&mut self, round_number: u32) -> Option<&mut Round> {
        self.rounds
            .iter_mut()
            .find(|r| r.round_number == round_number)
    }

    pub fn add_round(&mut self, round: Round) {
        self.rounds.push(round);
    }

    /// Round with the greatest number. With duplicate numbers the one listed last wins.
    pub fn get_latest_round(&self) -> Option<&Round> {
        self.rounds.iter().max_by_key(|r| r.round_number)
    }

    pub fn get_latest_round_mut(&mut self) -> Option<&mut Round> {
        self.rounds.iter_mut().max_by_key(|r| r.round_number)
    }

    /// Number the next round should take: one past the latest, starting at 1.
    pub fn next_round_number(&self) -> u32 {
        self.get_latest_round()
            .map(|r| r.round_number.saturating_add(1))
            .unwrap_or(1)
    }

    // ------------------------------------------------------------------
    // Parties
    // ------------------------------------------------------------------

    pub fn get_party(&self, channel_id: ChannelId) -> Option<&Party> {
        self.parties.iter().find(|p| p.channel_id == channel_id)
    }

    pub fn get_party_mut(&mut self, channel_id: ChannelId) -> Option<&mut Party> {
        self.parties.iter_mut().find(|p| p.channel_id == channel_id)
    }

    pub fn add_party(&mut self, party: Party) {
        self.parties.push(party);
    }

    pub fn get_player_party(&self, player: &Player) -> Option<&Party> {
        self.parties.iter().find(|p| p.contains(player.player_id))
    }

    pub fn get_player_party_mut(&mut self, player: &Player) -> Option<&mut Party> {
        self.parties
            .iter_mut()
            .find(|p| p.contains(player.player_id))
    }

    // ------------------------------------------------------------------
    // Catalog
    // ------------------------------------------------------------------

    pub fn get_action(&self, name: &str) -> Option<&Action> {
        self.actions.iter().find(|a| a.name == name)
    }

    pub fn get_item(&self, item_name: &str) -> Option<&Item> {
        self.items.iter().find(|i| i.item_name == item_name)
    }

    pub fn add_action(&mut self, action: Action) {
        self.actions.push(action);
    }

    pub fn add_item(&mut self, item: Item) {
        self.items.push(item);
    }

    /// Merge definitions into the action catalog, replacing entries with the same name.
    /// Returns how many existing entries were replaced.
    pub fn import_actions(&mut self, actions: impl IntoIterator<Item = Action>) -> usize {
        let mut replaced = 0;
        for action in actions {
            match self.actions.iter_mut().find(|a| a.name == action.name) {
                Some(existing) => {
                    *existing = action;
                    replaced += 1;
                }
                None => self.actions.push(action),
            }
        }
        replaced
    }

    /// Merge definitions into the item catalog, replacing entries with the same name.
    pub fn import_items(&mut self, items: impl IntoIterator<Item = Item>) -> usize {
        let mut replaced = 0;
        for item in items {
            match self.items.iter_mut().find(|i| i.item_name == item.item_name) {
                Some(existing) => {
                    *existing = item;
                    replaced += 1;
                }
                None => self.items.push(item),
            }
        }
        replaced
    }

    /// Actions carried by catalog items, paired with the item name.
    pub fn get_item_actions(&self) -> Vec<(&str, &Action)> {
        self.items
            .iter()
            .filter_map(|item| {
                item.item_action
                    .as_ref()
                    .map(|action| (item.item_name.as_str(), action))
            })
            .collect()
    }
}
