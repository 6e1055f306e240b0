//! Vote totals for a round or dilemma.

use serde::Serialize;

use super::types::{Dilemma, PlayerId, Round, Vote, VoteChoice};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TallyEntry {
    pub choice: VoteChoice,
    /// Voters in the order their votes appear.
    pub voters: Vec<PlayerId>,
}

impl TallyEntry {
    pub fn count(&self) -> usize {
        self.voters.len()
    }
}

/// Entries ordered by vote count, highest first. Equal counts keep the order in which
/// each choice first appeared.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VoteTally {
    pub entries: Vec<TallyEntry>,
}

impl VoteTally {
    pub fn for_round(round: &Round) -> Self {
        Self::from_votes(&round.votes)
    }

    pub fn for_dilemma(dilemma: &Dilemma) -> Self {
        Self::from_votes(&dilemma.dilemma_votes)
    }

    fn from_votes(votes: &[Vote]) -> Self {
        let mut entries: Vec<TallyEntry> = Vec::new();
        for vote in votes {
            // A stored "Unvote" is a withdrawal, not a ballot
            if vote.choice == VoteChoice::Unvote {
                continue;
            }
            match entries.iter_mut().find(|e| e.choice == vote.choice) {
                Some(entry) => entry.voters.push(vote.player_id),
                None => entries.push(TallyEntry {
                    choice: vote.choice.clone(),
                    voters: vec![vote.player_id],
                }),
            }
        }
        // sort_by is stable, so ties stay in first-appearance order
        entries.sort_by(|a, b| b.count().cmp(&a.count()));
        Self { entries }
    }

    pub fn total_votes(&self) -> usize {
        self.entries.iter().map(TallyEntry::count).sum()
    }

    /// Every choice sharing the top count. Empty when nobody voted.
    pub fn leaders(&self) -> Vec<&TallyEntry> {
        let top = match self.entries.first() {
            Some(entry) => entry.count(),
            None => return Vec::new(),
        };
        self.entries.iter().take_while(|e| e.count() == top).collect()
    }

    pub fn count_for(&self, choice: &VoteChoice) -> usize {
        self.entries
            .iter()
            .find(|e| &e.choice == choice)
            .map(TallyEntry::count)
            .unwrap_or(0)
    }
}
