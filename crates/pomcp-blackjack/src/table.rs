//! Observable and hidden halves of a round in progress.

use crate::card::{Card, RANKS};
use crate::shoe::Shoe;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The player's options. Legality depends on the table state and rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Hit,
    Stand,
    Double,
    Split,
    Surrender,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::Hit => "hit",
            Action::Stand => "stand",
            Action::Double => "double",
            Action::Split => "split",
            Action::Surrender => "surrender",
        };
        f.write_str(name)
    }
}

/// One player hand (several after splits).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HandView {
    pub cards: Vec<Card>,
    /// Bet multiplier: 1, or 2 after doubling down.
    pub bet: u8,
    /// No further actions for this hand (stood, busted, doubled, or
    /// surrendered).
    pub resolved: bool,
    pub surrendered: bool,
    pub from_split: bool,
}

impl HandView {
    pub fn opening(cards: Vec<Card>) -> Self {
        Self {
            cards,
            bet: 1,
            resolved: false,
            surrendered: false,
            from_split: false,
        }
    }
}

/// Everything the decision-maker can see: the table plus the running count
/// of cards seen in earlier rounds of the same shoe.
///
/// This type doubles as the planner's observation: it is a deterministic,
/// lossy projection of the full state. The hole card and the shoe never
/// appear here until the rules reveal them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableView {
    pub hands: Vec<HandView>,
    /// Index of the hand awaiting a decision; `hands.len()` once the player
    /// is done.
    pub active: usize,
    pub dealer_up: Card,
    /// Hole card followed by dealer draws; empty until the showdown.
    pub dealer_revealed: Vec<Card>,
    /// Per-rank counts of cards seen before this round was dealt.
    pub prior_seen: [u8; RANKS],
    /// True once the round has been paid out.
    pub settled: bool,
}

impl TableView {
    pub fn active_hand(&self) -> Option<&HandView> {
        self.hands.get(self.active)
    }

    pub fn player_done(&self) -> bool {
        self.active >= self.hands.len()
    }

    /// All cards revealed during this round, in no particular order.
    pub fn visible_cards(&self) -> impl Iterator<Item = Card> + '_ {
        self.hands
            .iter()
            .flat_map(|hand| hand.cards.iter().copied())
            .chain(std::iter::once(self.dealer_up))
            .chain(self.dealer_revealed.iter().copied())
    }

    /// Per-rank counts of every card this player has ever seen from the
    /// current shoe, including this round.
    pub fn seen_counts(&self) -> [u8; RANKS] {
        let mut counts = self.prior_seen;
        for card in self.visible_cards() {
            counts[card.index()] += 1;
        }
        counts
    }
}

/// The hidden half of the state: remaining shoe composition and the
/// dealer's hole card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShoeState {
    pub shoe: Shoe,
    pub hole: Card,
}
