//! A count-based multi-deck shoe. Only rank composition matters, so the shoe
//! is thirteen counters rather than an ordered sequence.

use crate::card::{Card, RANKS};
use rand::Rng;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Shoe {
    counts: [u8; RANKS],
}

impl Shoe {
    /// A full, freshly shuffled shoe of `decks` decks.
    pub fn full(decks: u8) -> Self {
        Self {
            counts: [4 * decks; RANKS],
        }
    }

    pub fn empty() -> Self {
        Self { counts: [0; RANKS] }
    }

    pub fn len(&self) -> usize {
        self.counts.iter().map(|&c| c as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.iter().all(|&c| c == 0)
    }

    pub fn count(&self, card: Card) -> u8 {
        self.counts[card.index()]
    }

    /// Removes one copy of `card`; false if none remain.
    pub fn remove(&mut self, card: Card) -> bool {
        let slot = &mut self.counts[card.index()];
        if *slot == 0 {
            return false;
        }
        *slot -= 1;
        true
    }

    /// Returns one copy of `card` to the shoe.
    pub fn insert(&mut self, card: Card) {
        self.counts[card.index()] += 1;
    }

    /// Removes `counts[i]` copies of each rank; false (and the shoe left
    /// unchanged) if any rank would go negative.
    pub fn remove_counts(&mut self, counts: &[u8; RANKS]) -> bool {
        for (have, take) in self.counts.iter().zip(counts.iter()) {
            if take > have {
                return false;
            }
        }
        for (have, take) in self.counts.iter_mut().zip(counts.iter()) {
            *have -= take;
        }
        true
    }

    /// Draws a uniformly random remaining card.
    pub fn draw<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<Card> {
        let total = self.len();
        if total == 0 {
            return None;
        }
        let mut pick = rng.gen_range(0..total);
        for index in 0..RANKS {
            let count = self.counts[index] as usize;
            if pick < count {
                self.counts[index] -= 1;
                return Card::from_index(index);
            }
            pick -= count;
        }
        unreachable!("pick exceeded shoe total");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn full_shoe_has_four_of_each_rank_per_deck() {
        let shoe = Shoe::full(2);
        assert_eq!(shoe.len(), 104);
        for rank in 1..=13 {
            assert_eq!(shoe.count(Card::new(rank).unwrap()), 8);
        }
    }

    #[test]
    fn draw_depletes_and_respects_composition() {
        let mut rng = SmallRng::seed_from_u64(17);
        let mut shoe = Shoe::full(1);
        for remaining in (0..52usize).rev() {
            let card = shoe.draw(&mut rng).expect("card available");
            assert!(card.rank() >= 1 && card.rank() <= 13);
            assert_eq!(shoe.len(), remaining);
        }
        assert!(shoe.draw(&mut rng).is_none());
    }

    #[test]
    fn remove_fails_on_exhausted_rank() {
        let mut shoe = Shoe::full(1);
        let ace = Card::ACE;
        for _ in 0..4 {
            assert!(shoe.remove(ace));
        }
        assert!(!shoe.remove(ace));
        shoe.insert(ace);
        assert_eq!(shoe.count(ace), 1);
    }

    #[test]
    fn remove_counts_is_atomic() {
        let mut shoe = Shoe::full(1);
        let mut too_many = [0u8; RANKS];
        too_many[0] = 5;
        assert!(!shoe.remove_counts(&too_many));
        assert_eq!(shoe.len(), 52);

        let mut ok = [1u8; RANKS];
        ok[12] = 4;
        assert!(shoe.remove_counts(&ok));
        assert_eq!(shoe.len(), 52 - 16);
    }

    #[test]
    fn draw_is_deterministic_with_fixed_seed() {
        let mut rng_a = SmallRng::seed_from_u64(99);
        let mut rng_b = SmallRng::seed_from_u64(99);
        let mut shoe_a = Shoe::full(2);
        let mut shoe_b = Shoe::full(2);
        for _ in 0..30 {
            assert_eq!(shoe_a.draw(&mut rng_a), shoe_b.draw(&mut rng_b));
        }
    }
}
