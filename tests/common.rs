//! Test utilities & fixtures.
//! Provides access to the sample game document under `tests/test-data-int`.

use larpbot::game::types::{Action, ActionTiming, Dilemma, Item, Party, Player, Round, Vote, VoteChoice};
use larpbot::game::Game;
use std::path::{Path, PathBuf};

/// Return the path to the static integration test fixture directory.
pub fn fixture_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("test-data-int")
}

/// Copy the sample game document into a temp dir and return both.
#[allow(dead_code)]
pub fn writable_fixture() -> (tempfile::TempDir, PathBuf) {
    let tmp = tempfile::tempdir().expect("tempdir");
    let target = tmp.path().join("game.json");
    std::fs::copy(fixture_root().join("game.json"), &target).unwrap();
    (tmp, target)
}

/// A game touching every entity type, built through the model API.
#[allow(dead_code)]
pub fn sample_game() -> Game {
    let mut game = Game::new(true);
    game.voting_locked = true;

    let mut alice = Player::new(11, "alice").with_mod_channel(9001);
    alice.add_action(Action::new("Heal", "Save someone tonight").with_timing(ActionTiming::Night).with_uses(2));
    alice.add_item(Item::new("Lantern", "Lights the way").with_action(Action::new("Reveal", "Show a hidden player")));
    alice.add_item(Item::new("Coin", "Shiny").with_properties("tradeable"));
    alice.adjust_resource("gold", 7, 0, None);
    game.add_player(alice);
    game.add_player(Player::new(22, "bob"));
    game.add_player(Player::new(33, "cara"));

    let mut round = Round::new(1);
    round.activate().unwrap();
    round.add_vote(Vote::new(11, VoteChoice::Player(22), 100));
    round.add_vote(Vote::new(22, VoteChoice::NoVote, 101));
    let mut dilemma = Dilemma::new("bridge")
        .with_players([33, 11])
        .with_choices(["wait", "cross"]);
    dilemma.add_vote(Vote::new(33, VoteChoice::from("cross"), 102));
    round.add_dilemma(dilemma);
    game.add_round(round);

    let mut party = Party::new(5000, "Night Watch", 3);
    party.player_ids.extend([33, 22]);
    game.add_party(party);

    game.add_action(Action::new("Kill", "Night kill").with_timing(ActionTiming::Custom("dusk".into())).with_cost("gold", 2));
    game.add_item(Item::new("Rope", "Long"));
    game
}
