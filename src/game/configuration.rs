//! Template documents that sit beside the live game: game configuration, character
//! sheets and action/item catalogs.
//!
//! These are read-mostly. Moderators edit them by hand and the bot reads them when it
//! seeds a player or imports a catalog, so decoding is as tolerant as the game codec.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use super::codec::null_as_default;
use super::errors::{GameError, GameResult};
use super::store::write_atomic;
use super::types::{Action, ActionTiming, Attribute, Item, Player, Resource, UNLIMITED_USES};

fn read_document(path: &Path) -> GameResult<String> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(content),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            Err(GameError::NotFound(path.display().to_string()))
        }
        Err(e) => Err(e.into()),
    }
}

fn default_true() -> bool {
    true
}

fn unlimited() -> i32 {
    UNLIMITED_USES
}

// ============================================================================
// Game configuration
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VotingStyle {
    /// Votes name a player.
    #[default]
    Player,
    /// Votes pick one of a fixed set of answers.
    Option,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VotingParameters {
    #[serde(default)]
    pub voting_style: VotingStyle,
    #[serde(default = "default_true")]
    pub voting_enabled: bool,
}

impl Default for VotingParameters {
    fn default() -> Self {
        Self {
            voting_style: VotingStyle::Player,
            voting_enabled: true,
        }
    }
}

/// A resource the game tracks, with the bounds player amounts are clamped to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResource {
    pub resource_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_commodity: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub resource_faction_limited: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub resource_tag_limited: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub resource_def_amt: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub resource_min: i64,
    #[serde(default)]
    pub resource_max: Option<i64>,
}

impl GameResource {
    pub fn new(resource_name: &str) -> Self {
        Self {
            resource_name: resource_name.to_string(),
            is_commodity: false,
            resource_faction_limited: Vec::new(),
            resource_tag_limited: Vec::new(),
            resource_def_amt: 0,
            resource_min: 0,
            resource_max: None,
        }
    }

    pub fn with_bounds(mut self, min: i64, max: Option<i64>) -> Self {
        self.resource_min = min;
        self.resource_max = max;
        self
    }

    pub fn with_default_amount(mut self, amount: i64) -> Self {
        self.resource_def_amt = amount;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameAttribute {
    pub attr_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_adjustable: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub attr_def_amt: i32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub attr_min: i32,
    #[serde(default)]
    pub attr_max: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfiguration {
    #[serde(default, deserialize_with = "null_as_default")]
    pub voting_configuration: VotingParameters,
    #[serde(default, deserialize_with = "null_as_default")]
    pub game_resources: Vec<GameResource>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub game_attributes: Vec<GameAttribute>,
}

/// On-disk wrapper: `{"game_configuration": {...}}`.
#[derive(Debug, Default, Serialize, Deserialize)]
struct GameConfigurationFile {
    #[serde(default, deserialize_with = "null_as_default")]
    game_configuration: GameConfiguration,
}

impl GameConfiguration {
    pub fn load<P: AsRef<Path>>(path: P) -> GameResult<Self> {
        let content = read_document(path.as_ref())?;
        let file: GameConfigurationFile = serde_json::from_str(&content)?;
        Ok(file.game_configuration)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> GameResult<()> {
        let file = GameConfigurationFile {
            game_configuration: self.clone(),
        };
        write_atomic(path.as_ref(), &serde_json::to_string_pretty(&file)?)
    }

    pub fn resource(&self, resource_name: &str) -> Option<&GameResource> {
        self.game_resources
            .iter()
            .find(|r| r.resource_name == resource_name)
    }

    pub fn attribute(&self, attr_name: &str) -> Option<&GameAttribute> {
        self.game_attributes
            .iter()
            .find(|a| a.attr_name == attr_name)
    }

    /// Clamp bounds for a resource. Unconfigured resources only floor at zero.
    pub fn resource_bounds(&self, resource_name: &str) -> (i64, Option<i64>) {
        self.resource(resource_name)
            .map(|r| (r.resource_min, r.resource_max))
            .unwrap_or((0, None))
    }

    /// Starting holdings for a new player.
    pub fn default_resources(&self) -> Vec<Resource> {
        self.game_resources
            .iter()
            .map(|r| Resource::new(&r.resource_name, r.resource_def_amt))
            .collect()
    }
}

// ============================================================================
// Character sheets
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteAttributes {
    #[serde(default = "default_true")]
    pub can_vote: bool,
    #[serde(default = "default_true")]
    pub can_be_voted: bool,
    #[serde(default = "default_vote_strength")]
    pub vote_strength: u32,
}

fn default_vote_strength() -> u32 {
    1
}

impl Default for VoteAttributes {
    fn default() -> Self {
        Self {
            can_vote: true,
            can_be_voted: true,
            vote_strength: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharResource {
    pub resource_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub resource_amt: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub resource_min: i64,
    #[serde(default)]
    pub resource_max: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharAttribute {
    pub attr_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub attr_amount: i32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub attr_min: i32,
    #[serde(default)]
    pub attr_max: Option<i32>,
}

fn collapse_timing(timings: &[ActionTiming]) -> Option<ActionTiming> {
    match timings {
        [] => None,
        [single] => Some(single.clone()),
        many => Some(ActionTiming::Custom(
            many.iter()
                .map(ActionTiming::as_str)
                .collect::<Vec<_>>()
                .join("/"),
        )),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharAction {
    pub action_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub action_timing: Vec<ActionTiming>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub action_text: String,
    #[serde(default = "unlimited")]
    pub action_uses: i32,
}

impl CharAction {
    /// The grant copy of this action. Several timings collapse to one `a/b` value.
    pub fn to_action(&self) -> Action {
        Action {
            name: self.action_name.clone(),
            desc: self.action_text.clone(),
            timing: collapse_timing(&self.action_timing),
            uses: self.action_uses,
            action_costs: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameItem {
    pub item_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub item_descr: String,
    pub item_action_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub item_action_timing: Vec<ActionTiming>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub item_action_text: String,
    #[serde(default = "unlimited")]
    pub item_action_uses: i32,
}

impl GameItem {
    pub fn to_item(&self) -> Item {
        let action = Action {
            name: self.item_action_name.clone(),
            desc: self.item_action_text.clone(),
            timing: collapse_timing(&self.item_action_timing),
            uses: self.item_action_uses,
            action_costs: Vec::new(),
        };
        Item::new(&self.item_name, &self.item_descr).with_action(action)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerCharacter {
    pub character_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub character_factions: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub character_tags: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub character_objectives: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub character_vote_attributes: VoteAttributes,
    #[serde(default, deserialize_with = "null_as_default")]
    pub character_resources: Vec<CharResource>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub character_attrs: Vec<CharAttribute>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub character_actions: Vec<CharAction>,
    /// Maximum items held; negative means no limit.
    #[serde(default = "unlimited")]
    pub character_item_capacity: i32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub character_items: Vec<GameItem>,
}

impl PlayerCharacter {
    pub fn new(character_name: &str) -> Self {
        Self {
            character_name: character_name.to_string(),
            character_factions: Vec::new(),
            character_tags: Vec::new(),
            character_objectives: Vec::new(),
            character_vote_attributes: VoteAttributes::default(),
            character_resources: Vec::new(),
            character_attrs: Vec::new(),
            character_actions: Vec::new(),
            character_item_capacity: UNLIMITED_USES,
            character_items: Vec::new(),
        }
    }

    /// Whether a holder of this character may carry `count` items.
    pub fn has_item_capacity(&self, count: usize) -> bool {
        self.character_item_capacity < 0 || count <= self.character_item_capacity as usize
    }

    /// Copy the sheet onto a player: attributes and resources are set, actions and
    /// items appended. Fails without touching the player if the resulting inventory
    /// would exceed the item capacity.
    pub fn grant_to(&self, player: &mut Player) -> GameResult<()> {
        let total_items = player.player_items.len() + self.character_items.len();
        if !self.has_item_capacity(total_items) {
            return Err(GameError::InvariantViolation(format!(
                "character '{}' can carry {} items, grant would leave {}",
                self.character_name, self.character_item_capacity, total_items
            )));
        }

        for attr in &self.character_attrs {
            let level = attr.attr_amount.max(attr.attr_min);
            let level = attr.attr_max.map_or(level, |max| level.min(max));
            match player.get_attribute_mut(&attr.attr_name) {
                Some(existing) => {
                    existing.level = level;
                    existing.max_level = attr.attr_max;
                }
                None => player
                    .player_attributes
                    .push(Attribute::new(&attr.attr_name, level, attr.attr_max)),
            }
        }
        for resource in &self.character_resources {
            let current = player.resource_amount(&resource.resource_name);
            player.adjust_resource(
                &resource.resource_name,
                resource.resource_amt - current,
                resource.resource_min,
                resource.resource_max,
            );
        }
        for action in &self.character_actions {
            player.add_action(action.to_action());
        }
        for item in &self.character_items {
            player.add_item(item.to_item());
        }
        Ok(())
    }
}

/// On-disk wrapper: `{"characters": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterSheets {
    #[serde(default, deserialize_with = "null_as_default")]
    pub characters: Vec<PlayerCharacter>,
}

impl CharacterSheets {
    pub fn load<P: AsRef<Path>>(path: P) -> GameResult<Self> {
        let content = read_document(path.as_ref())?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> GameResult<()> {
        write_atomic(path.as_ref(), &serde_json::to_string_pretty(self)?)
    }

    pub fn get(&self, character_name: &str) -> Option<&PlayerCharacter> {
        self.characters
            .iter()
            .find(|c| c.character_name == character_name)
    }
}

// ============================================================================
// Catalog files
// ============================================================================

/// Load a JSON array of action definitions.
pub fn load_action_catalog<P: AsRef<Path>>(path: P) -> GameResult<Vec<Action>> {
    let content = read_document(path.as_ref())?;
    Ok(serde_json::from_str(&content)?)
}

/// Load a JSON array of item definitions.
pub fn load_item_catalog<P: AsRef<Path>>(path: P) -> GameResult<Vec<Item>> {
    let content = read_document(path.as_ref())?;
    Ok(serde_json::from_str(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn configuration_defaults_fill_missing_sections() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("game_configuration.json");
        fs::write(
            &path,
            r#"{"game_configuration": {"game_resources": [{"resource_name": "gold", "resource_max": 10}]}}"#,
        )
        .unwrap();
        let conf = GameConfiguration::load(&path).unwrap();
        assert_eq!(conf.voting_configuration.voting_style, VotingStyle::Player);
        assert!(conf.voting_configuration.voting_enabled);
        assert_eq!(conf.resource_bounds("gold"), (0, Some(10)));
        assert_eq!(conf.resource_bounds("mana"), (0, None));
        assert!(conf.game_attributes.is_empty());
    }

    #[test]
    fn configuration_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("conf.json");
        let conf = GameConfiguration {
            voting_configuration: VotingParameters {
                voting_style: VotingStyle::Option,
                voting_enabled: false,
            },
            game_resources: vec![GameResource::new("gold").with_default_amount(3)],
            game_attributes: Vec::new(),
        };
        conf.save(&path).unwrap();
        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"game_configuration\""));
        assert!(raw.contains("\"option\""));
        let loaded = GameConfiguration::load(&path).unwrap();
        assert_eq!(loaded, conf);
        assert_eq!(loaded.default_resources()[0].resource_amt, 3);
    }

    #[test]
    fn missing_configuration_is_not_found() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            GameConfiguration::load(dir.path().join("nope.json")),
            Err(GameError::NotFound(_))
        ));
    }

    #[test]
    fn character_grant_copies_sheet_onto_player() {
        let sheet: PlayerCharacter = serde_json::from_value(serde_json::json!({
            "character_name": "Seer",
            "character_attrs": [{"attr_name": "Insight", "attr_amount": 9, "attr_max": 5}],
            "character_resources": [{"resource_name": "gold", "resource_amt": 4}],
            "character_actions": [
                {"action_name": "Peek", "action_timing": ["night"], "action_text": "See a role", "action_uses": 2},
                {"action_name": "Pray", "action_timing": ["day", "night"], "action_text": "Hope"}
            ],
            "character_item_capacity": 1,
            "character_items": [{"item_name": "Orb", "item_action_name": "Gaze", "item_action_text": "Look"}]
        }))
        .unwrap();

        let mut player = Player::new(7, "sam");
        player.adjust_resource("gold", 10, 0, None);
        sheet.grant_to(&mut player).unwrap();

        assert_eq!(player.get_attribute("Insight").unwrap().level, 5);
        assert_eq!(player.resource_amount("gold"), 4);
        let peek = player.get_action("Peek").unwrap();
        assert_eq!(peek.timing, Some(ActionTiming::Night));
        assert_eq!(peek.uses, 2);
        assert_eq!(
            player.get_action("Pray").unwrap().timing,
            Some(ActionTiming::Custom("day/night".to_string()))
        );
        assert!(player.get_action("Pray").unwrap().is_unlimited());
        let orb = player.get_item("Orb").unwrap();
        assert_eq!(orb.item_action.as_ref().unwrap().name, "Gaze");

        // A second grant would exceed the one-item capacity
        assert!(sheet.grant_to(&mut player).is_err());
        assert_eq!(player.player_items.len(), 1);
    }

    #[test]
    fn catalogs_load_from_arrays() {
        let dir = TempDir::new().unwrap();
        let actions = dir.path().join("actions.json");
        let items = dir.path().join("items.json");
        fs::write(&actions, r#"[{"name": "Heal", "desc": "Restore", "timing": "night", "uses": 1}]"#).unwrap();
        fs::write(&items, r#"[{"item_name": "Rope", "item_desc": "Long", "item_action": {}}]"#).unwrap();
        assert_eq!(load_action_catalog(&actions).unwrap()[0].uses, 1);
        assert!(load_item_catalog(&items).unwrap()[0].item_action.is_none());
        fs::write(&items, "{}").unwrap();
        assert!(matches!(load_item_catalog(&items), Err(GameError::Malformed(_))));
    }
}
