//! Hand scoring on a single comparable scale: bust is 0, ordinary totals are
//! their face value, and a natural (two-card 21) is 22 so it outranks any
//! drawn 21.

use crate::card::Card;

/// Sentinel score for a busted hand.
pub const BUST: u8 = 0;
/// Sentinel score for a natural blackjack.
pub const NATURAL: u8 = 22;

/// Computes `(score, soft)` for a hand. `soft` is true when an ace is being
/// counted as eleven.
pub fn score_soft(cards: &[Card]) -> (u8, bool) {
    let mut aces = 0u8;
    let mut score = 0u16;
    for card in cards {
        if card.is_ace() {
            score += 11;
            aces += 1;
        } else {
            score += u16::from(card.value());
        }
    }
    while score > 21 && aces > 0 {
        score -= 10;
        aces -= 1;
    }

    if score == 21 && cards.len() == 2 {
        (NATURAL, true)
    } else if score > 21 {
        (BUST, false)
    } else {
        (score as u8, aces > 0)
    }
}

pub fn score(cards: &[Card]) -> u8 {
    score_soft(cards).0
}

pub fn is_bust(cards: &[Card]) -> bool {
    score(cards) == BUST
}

pub fn is_natural(cards: &[Card]) -> bool {
    score(cards) == NATURAL
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hand(ranks: &[u8]) -> Vec<Card> {
        ranks.iter().map(|&r| Card::new(r).unwrap()).collect()
    }

    #[test]
    fn hard_totals_add_up() {
        assert_eq!(score_soft(&hand(&[10, 6])), (16, false));
        assert_eq!(score_soft(&hand(&[2, 3, 4])), (9, false));
    }

    #[test]
    fn aces_fall_back_from_eleven_to_one() {
        assert_eq!(score_soft(&hand(&[1, 6])), (17, true));
        assert_eq!(score_soft(&hand(&[1, 6, 9])), (16, false));
        assert_eq!(score_soft(&hand(&[1, 1, 9])), (21, true));
    }

    #[test]
    fn two_card_twenty_one_is_a_natural() {
        assert_eq!(score(&hand(&[1, 13])), NATURAL);
        assert!(is_natural(&hand(&[1, 10])));
        // Drawn 21 is an ordinary 21 and loses to a natural.
        assert_eq!(score(&hand(&[7, 7, 7])), 21);
    }

    #[test]
    fn busts_score_zero() {
        assert!(is_bust(&hand(&[10, 9, 8])));
        assert_eq!(score(&hand(&[13, 12, 11])), BUST);
    }

    #[test]
    fn face_cards_count_ten() {
        assert_eq!(score(&hand(&[11, 12])), 20);
    }
}
