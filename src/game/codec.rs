//! JSON codec for the game document.
//!
//! Decoding is tolerant: a missing or `null` collection decodes as empty, a missing
//! flag as `false`, and an `item_action` of `{}` as no action. Encoding is the
//! inverse; set-valued fields are emitted in sorted order, so the same `Game` always
//! produces the same bytes.

use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use super::errors::GameResult;
use super::state::Game;
use super::types::{Action, UNLIMITED_USES};

/// Encode a game as pretty-printed UTF-8 JSON.
pub fn encode(game: &Game) -> GameResult<String> {
    Ok(serde_json::to_string_pretty(game)?)
}

/// Decode a game from JSON text.
pub fn decode(content: &str) -> GameResult<Game> {
    // Guard against leading NULs left behind by a torn write from an older tool
    let cleaned = content.trim_start_matches('\0');
    Ok(serde_json::from_str(cleaned)?)
}

pub fn to_value(game: &Game) -> GameResult<Value> {
    Ok(serde_json::to_value(game)?)
}

pub fn from_value(value: Value) -> GameResult<Game> {
    Ok(serde_json::from_value(value)?)
}

/// Treat `null` the same as an absent key.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

pub(crate) fn uses_or_unlimited<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<i32>::deserialize(deserializer)?.unwrap_or(UNLIMITED_USES))
}

pub(crate) fn empty_object_as_none<'de, D>(deserializer: D) -> Result<Option<Action>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(map)) if map.is_empty() => Ok(None),
        Some(other) => serde_json::from_value(other)
            .map(Some)
            .map_err(D::Error::custom),
    }
}

pub(crate) fn none_as_empty_object<S>(
    action: &Option<Action>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match action {
        Some(action) => action.serialize(serializer),
        None => serializer.serialize_map(Some(0))?.end(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::types::{ActionTiming, VoteChoice};

    #[test]
    fn empty_object_decodes_to_inactive_empty_game() {
        let game = decode("{}").unwrap();
        assert_eq!(game, Game::default());
        assert!(!game.is_active);
    }

    #[test]
    fn null_collections_decode_as_empty() {
        let doc = r#"{
            "is_active": true,
            "players": null,
            "rounds": [{"round_number": 1, "votes": null, "round_dilemmas": null}],
            "parties": [{"channel_id": 9, "player_ids": null, "party_name": "Scouts", "max_size": 3}]
        }"#;
        let game = decode(doc).unwrap();
        assert!(game.is_active);
        assert!(game.players.is_empty());
        assert!(game.rounds[0].votes.is_empty());
        assert!(game.rounds[0].round_dilemmas.is_empty());
        assert!(!game.rounds[0].is_active_round);
        assert!(game.parties[0].player_ids.is_empty());
        assert!(game.actions.is_empty());
        assert!(game.items.is_empty());
    }

    #[test]
    fn player_document_shape_decodes() {
        let doc = r#"{
            "players": [{
                "player_id": 101,
                "player_discord_name": "alice",
                "player_mod_channel": null,
                "player_attributes": [{"name": "Strength", "level": 2, "max_level": 5}],
                "player_actions": [{"name": "Heal", "desc": "Restore", "uses": 2, "timing": "night"}],
                "player_items": [
                    {"item_name": "Rope", "item_desc": "Long", "item_action": {}},
                    {"item_name": "Wand", "item_desc": "Zap", "item_action": {"name": "Zap", "desc": "Ouch", "uses": -1, "timing": "any"}}
                ],
                "is_dead": false
            }]
        }"#;
        let game = decode(doc).unwrap();
        let player = game.get_player(101).unwrap();
        assert_eq!(player.player_mod_channel, None);
        assert_eq!(player.player_attributes[0].max_level, Some(5));
        assert_eq!(player.player_actions[0].timing, Some(ActionTiming::Night));
        assert_eq!(player.player_actions[0].uses, 2);
        assert!(player.get_item("Rope").unwrap().item_action.is_none());
        let wand = player.get_item("Wand").unwrap();
        assert_eq!(wand.item_descr, "Zap");
        assert_eq!(wand.item_action.as_ref().unwrap().timing, Some(ActionTiming::Any));
    }

    #[test]
    fn legacy_field_names_are_accepted() {
        let doc = r#"{
            "rounds": [{
                "round_number": 2,
                "is_active_round": true,
                "round_dilemmas": [{
                    "dilemma_id": "bridge",
                    "dilemma_player_ids": [3, 1, 3],
                    "dilemma_choices": ["cross", "wait"],
                    "votes": [{"player_id": 1, "choice": "cross", "timestamp": 5}],
                    "is_active_dilemma": true
                }]
            }],
            "items": [{"item_name": "Key", "item_descr": "Opens", "item_action": {"action_name": "Unlock", "action_desc": "Open a door", "action_uses": 1}}]
        }"#;
        let game = decode(doc).unwrap();
        let dilemma = game.rounds[0].get_dilemma("bridge").unwrap();
        assert_eq!(dilemma.dilemma_player_ids.len(), 2);
        assert_eq!(
            dilemma.get_player_vote(1).unwrap().choice,
            VoteChoice::Answer("cross".to_string())
        );
        let key = game.get_item("Key").unwrap();
        assert_eq!(key.item_descr, "Opens");
        let unlock = key.item_action.as_ref().unwrap();
        assert_eq!(unlock.name, "Unlock");
        assert_eq!(unlock.uses, 1);
    }

    #[test]
    fn missing_uses_means_unlimited() {
        let doc = r#"{"actions": [{"name": "Talk", "uses": null}, {"name": "Walk"}]}"#;
        let game = decode(doc).unwrap();
        assert!(game.actions.iter().all(|a| a.uses == UNLIMITED_USES));
    }

    #[test]
    fn absent_item_action_encodes_as_empty_object() {
        let mut game = Game::default();
        game.add_item(crate::game::types::Item::new("Rope", "Long"));
        let value = to_value(&game).unwrap();
        assert_eq!(value["items"][0]["item_action"], serde_json::json!({}));
        assert_eq!(value["items"][0]["item_desc"], "Long");
    }

    #[test]
    fn leading_nuls_are_ignored() {
        let game = decode("\0\0{\"is_active\": true}").unwrap();
        assert!(game.is_active);
    }

    #[test]
    fn wrong_shape_is_malformed() {
        assert!(matches!(
            decode("[]"),
            Err(crate::game::GameError::Malformed(_))
        ));
        assert!(matches!(
            decode(r#"{"players": [{"player_discord_name": "no id"}]}"#),
            Err(crate::game::GameError::Malformed(_))
        ));
        assert!(decode("").is_err());
    }
}
