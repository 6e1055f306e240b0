mod common;

use larpbot::game::codec::{decode, encode, from_value, to_value};
use larpbot::game::types::{Action, ActionTiming, Dilemma, Round, Vote, VoteChoice};
use larpbot::game::{Game, GameError, VoteTally};

#[test]
fn encode_then_decode_reproduces_the_game() {
    let game = common::sample_game();
    let text = encode(&game).unwrap();
    let back = decode(&text).unwrap();
    assert_eq!(back, game);
    assert_eq!(
        back.get_action("Kill").unwrap().timing,
        Some(ActionTiming::Custom("dusk".to_string()))
    );
}

#[test]
fn choices_and_timings_built_by_hand_survive_a_round_trip() {
    let mut game = Game::default();
    let mut round = Round::new(1);
    let mut dilemma = Dilemma::new("door").with_players([1, 2]).with_choices(["2", "7"]);
    dilemma.add_vote(Vote::new(1, VoteChoice::Answer("2".to_string()), 10));
    dilemma.add_vote(Vote::new(2, VoteChoice::Answer("Not Sure".to_string()), 11));
    round.add_dilemma(dilemma);
    game.add_round(round);
    game.add_action(Action::new("Prowl", "Walk at night").with_timing(ActionTiming::Custom("night".to_string())));

    let back = decode(&encode(&game).unwrap()).unwrap();
    assert_eq!(back, game);
    assert_eq!(back.get_action("Prowl").unwrap().timing, Some(ActionTiming::Night));

    let tally = VoteTally::for_dilemma(&back.get_round(1).unwrap().round_dilemmas[0]);
    assert_eq!(tally.count_for(&VoteChoice::Answer("2".to_string())), 1);
    assert_eq!(tally.count_for(&VoteChoice::Player(2)), 1);
}

#[test]
fn sets_encode_sorted_regardless_of_input_order() {
    let doc = std::fs::read_to_string(common::fixture_root().join("game.json")).unwrap();
    let game = decode(&doc).unwrap();
    let value = to_value(&game).unwrap();
    let dilemma = &value["rounds"][1]["round_dilemmas"][0];
    assert_eq!(dilemma["dilemma_player_ids"], serde_json::json!([300, 184467440737095516u64]));
    assert_eq!(dilemma["dilemma_choices"], serde_json::json!(["cross", "wait"]));

    // Same game, same bytes
    assert_eq!(encode(&game).unwrap(), encode(&decode(&encode(&game).unwrap()).unwrap()).unwrap());
}

#[test]
fn fixture_document_decodes_with_tolerant_defaults() {
    let doc = std::fs::read_to_string(common::fixture_root().join("game.json")).unwrap();
    let game = decode(&doc).unwrap();

    assert!(game.is_active);
    assert!(game.items_locked);
    assert!(game.actions.is_empty());
    assert!(game.items.is_empty());
    assert_eq!(game.revision, 0);

    let cara = game.get_player(300).unwrap();
    assert!(cara.player_items.is_empty());
    assert!(!cara.is_dead);
    assert_eq!(cara.player_mod_channel, None);

    let alice = game.get_player(184467440737095516).unwrap();
    assert_eq!(alice.player_mod_channel, Some(900000000000000001));
    assert!(alice.get_item("Coin").unwrap().item_action.is_none());
    assert_eq!(alice.get_item_actions().len(), 1);

    let first = game.get_round(1).unwrap();
    assert_eq!(first.get_player_vote(300).unwrap().choice, VoteChoice::NoVote);
    assert_eq!(
        first.get_player_vote(184467440737095516).unwrap().choice,
        VoteChoice::Player(300)
    );
    assert!(game.get_round(2).unwrap().votes.is_empty());
}

#[test]
fn value_round_trip_keeps_empty_item_action_shape() {
    let doc = std::fs::read_to_string(common::fixture_root().join("game.json")).unwrap();
    let game = decode(&doc).unwrap();
    let value = to_value(&game).unwrap();
    assert_eq!(value["players"][0]["player_items"][1]["item_action"], serde_json::json!({}));
    assert_eq!(from_value(value).unwrap(), game);
}

#[test]
fn non_document_input_is_malformed() {
    for bad in ["not json", "{\"players\": {}}", "{\"rounds\": [{\"is_active_round\": true}]}"] {
        assert!(
            matches!(decode(bad), Err(GameError::Malformed(_))),
            "expected malformed for {bad}"
        );
    }
    assert_eq!(decode("{}").unwrap(), Game::default());
}
