use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of distinct ranks; suits never matter in this game.
pub const RANKS: usize = 13;

/// A card identified by rank alone: 1 (ace) through 13 (king).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Card(u8);

impl Card {
    pub const ACE: Card = Card(1);

    pub fn new(rank: u8) -> Option<Card> {
        (1..=RANKS as u8).contains(&rank).then_some(Card(rank))
    }

    pub const fn rank(self) -> u8 {
        self.0
    }

    /// Index into rank-count tables.
    pub const fn index(self) -> usize {
        (self.0 - 1) as usize
    }

    pub fn from_index(index: usize) -> Option<Card> {
        Card::new(index as u8 + 1)
    }

    /// Pip value with the ace counted low; soft totals are the hand's job.
    pub const fn value(self) -> u8 {
        if self.0 > 10 { 10 } else { self.0 }
    }

    pub const fn is_ace(self) -> bool {
        self.0 == 1
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            1 => write!(f, "A"),
            11 => write!(f, "J"),
            12 => write!(f, "Q"),
            13 => write!(f, "K"),
            n => write!(f, "{n}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Card;

    #[test]
    fn face_cards_are_worth_ten() {
        for rank in 11..=13 {
            assert_eq!(Card::new(rank).unwrap().value(), 10);
        }
        assert_eq!(Card::new(10).unwrap().value(), 10);
    }

    #[test]
    fn ace_is_low_by_itself() {
        assert_eq!(Card::ACE.value(), 1);
        assert!(Card::ACE.is_ace());
    }

    #[test]
    fn rank_bounds_are_enforced() {
        assert!(Card::new(0).is_none());
        assert!(Card::new(14).is_none());
        assert!(Card::new(13).is_some());
    }

    #[test]
    fn index_round_trips() {
        for rank in 1..=13u8 {
            let card = Card::new(rank).unwrap();
            assert_eq!(Card::from_index(card.index()), Some(card));
        }
    }
}
