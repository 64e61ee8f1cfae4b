//! The generative Blackjack model behind the planner's `Simulator` seam.

use crate::hand::{self, BUST, NATURAL};
use crate::rules::RulesConfig;
use crate::shoe::Shoe;
use crate::table::{Action, HandView, ShoeState, TableView};
use pomcp_core::{Simulator, Step};
use rand::Rng;

/// A freshly dealt round: the table as the player sees it plus the true
/// hidden state (the caller keeps the hidden half to drive the real game).
#[derive(Debug, Clone)]
pub struct Deal {
    pub view: TableView,
    pub hidden: ShoeState,
}

/// Stateless given a rules variant: every transition is a pure function of
/// (observable, hidden, action) plus randomness.
#[derive(Debug, Clone)]
pub struct BlackjackSim {
    rules: RulesConfig,
}

impl BlackjackSim {
    pub fn new(rules: RulesConfig) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &RulesConfig {
        &self.rules
    }

    /// Deals a round from `shoe`, which is mutated in place (this is the
    /// real shoe when driving an actual game). `prior_seen` carries the
    /// player's running count from earlier rounds of the same shoe.
    /// `None` when fewer than four cards remain.
    pub fn deal<R: Rng + ?Sized>(
        &self,
        shoe: &mut Shoe,
        prior_seen: [u8; crate::card::RANKS],
        rng: &mut R,
    ) -> Option<Deal> {
        let first = shoe.draw(rng)?;
        let second = shoe.draw(rng)?;
        let dealer_up = shoe.draw(rng)?;
        let hole = shoe.draw(rng)?;

        let view = TableView {
            hands: vec![HandView::opening(vec![first, second])],
            active: 0,
            dealer_up,
            dealer_revealed: Vec::new(),
            prior_seen,
            settled: false,
        };
        let hidden = ShoeState {
            shoe: shoe.clone(),
            hole,
        };
        Some(Deal { view, hidden })
    }

    fn resolve_active(view: &mut TableView) {
        if let Some(hand) = view.hands.get_mut(view.active) {
            hand.resolved = true;
        }
        while view.active < view.hands.len() && view.hands[view.active].resolved {
            view.active += 1;
        }
    }

    /// Plays the dealer out and pays every hand. Called exactly once, when
    /// the last player hand resolves.
    fn settle<R: Rng + ?Sized>(
        &self,
        view: &mut TableView,
        hidden: &mut ShoeState,
        rng: &mut R,
    ) -> f64 {
        let everyone_dead = view
            .hands
            .iter()
            .all(|h| h.surrendered || hand::is_bust(&h.cards));

        let dealer_score = if everyone_dead {
            // Nothing left to beat; the hole card stays face down.
            None
        } else {
            let mut dealer_cards = vec![view.dealer_up, hidden.hole];
            loop {
                let (score, soft) = hand::score_soft(&dealer_cards);
                if score == BUST || score == NATURAL {
                    break;
                }
                let must_hit = score < self.rules.dealer_stands_on
                    || (soft && score == self.rules.dealer_stands_on && self.rules.dealer_hits_soft);
                if !must_hit {
                    break;
                }
                match hidden.shoe.draw(rng) {
                    Some(card) => dealer_cards.push(card),
                    None => break,
                }
            }
            view.dealer_revealed = dealer_cards[1..].to_vec();
            Some(hand::score(&dealer_cards))
        };

        let mut reward = 0.0;
        for hand_view in &view.hands {
            let bet = f64::from(hand_view.bet);
            if hand_view.surrendered {
                reward -= 0.5;
                continue;
            }
            let mut player = hand::score(&hand_view.cards);
            // A 21 assembled after a split is an ordinary 21, not a natural.
            if player == NATURAL && hand_view.from_split {
                player = 21;
            }
            if player == BUST {
                reward -= bet;
                continue;
            }
            let dealer = dealer_score.unwrap_or(BUST);
            if player == NATURAL && dealer != NATURAL {
                reward += bet * self.rules.natural_payout;
            } else if player > dealer {
                reward += bet;
            } else if player < dealer {
                reward -= bet;
            }
        }

        view.settled = true;
        reward
    }

    fn apply<R: Rng + ?Sized>(
        &self,
        view: &mut TableView,
        hidden: &mut ShoeState,
        action: Action,
        rng: &mut R,
    ) {
        match action {
            Action::Hit => {
                if let Some(card) = hidden.shoe.draw(rng) {
                    let active = view.active;
                    view.hands[active].cards.push(card);
                    if hand::is_bust(&view.hands[active].cards) {
                        Self::resolve_active(view);
                    }
                } else {
                    // Shoe ran dry mid-round; the hand stands where it is.
                    Self::resolve_active(view);
                }
            }
            Action::Stand => Self::resolve_active(view),
            Action::Double => {
                let active = view.active;
                view.hands[active].bet = 2;
                if let Some(card) = hidden.shoe.draw(rng) {
                    view.hands[active].cards.push(card);
                }
                Self::resolve_active(view);
            }
            Action::Split => {
                let active = view.active;
                let moved = view.hands[active]
                    .cards
                    .pop()
                    .unwrap_or_else(|| view.hands[active].cards[0]);
                let split_aces = view.hands[active].cards[0].is_ace();

                for (slot, seed_card) in [(active, None), (active + 1, Some(moved))] {
                    let mut cards = match seed_card {
                        Some(card) => vec![card],
                        None => std::mem::take(&mut view.hands[active].cards),
                    };
                    if let Some(card) = hidden.shoe.draw(rng) {
                        cards.push(card);
                    }
                    let replacement = HandView {
                        cards,
                        bet: 1,
                        // Split aces take one card each and stand.
                        resolved: split_aces,
                        surrendered: false,
                        from_split: true,
                    };
                    if slot == active {
                        view.hands[active] = replacement;
                    } else {
                        view.hands.insert(slot, replacement);
                    }
                }
                if split_aces {
                    Self::resolve_active(view);
                }
            }
            Action::Surrender => {
                let active = view.active;
                view.hands[active].surrendered = true;
                Self::resolve_active(view);
            }
        }
    }
}

impl Simulator for BlackjackSim {
    type Observable = TableView;
    type Hidden = ShoeState;
    type Action = Action;
    type Observation = TableView;

    fn legal_actions(&self, view: &TableView) -> Vec<Action> {
        if view.settled {
            return Vec::new();
        }
        let Some(hand_view) = view.active_hand() else {
            return Vec::new();
        };

        let mut actions = vec![Action::Hit, Action::Stand];
        if hand_view.cards.len() == 2 {
            if self.rules.allow_double {
                actions.push(Action::Double);
            }
            if self.rules.allow_split
                && view.hands.len() < usize::from(self.rules.max_split_hands)
                && hand_view.cards[0].value() == hand_view.cards[1].value()
            {
                actions.push(Action::Split);
            }
            if self.rules.allow_surrender && !hand_view.from_split && view.hands.len() == 1 {
                actions.push(Action::Surrender);
            }
        }
        actions
    }

    fn step<R: Rng + ?Sized>(
        &self,
        view: &TableView,
        hidden: &ShoeState,
        action: Action,
        rng: &mut R,
    ) -> Step<Self> {
        let mut view = view.clone();
        let mut hidden = hidden.clone();

        self.apply(&mut view, &mut hidden, action, rng);

        let reward = if view.player_done() && !view.settled {
            self.settle(&mut view, &mut hidden, rng)
        } else {
            0.0
        };

        Step {
            observation: view.clone(),
            terminal: view.settled,
            observable: view,
            hidden,
            reward,
        }
    }

    fn sample_hidden<R: Rng + ?Sized>(&self, view: &TableView, rng: &mut R) -> Option<ShoeState> {
        let mut shoe = Shoe::full(self.rules.decks);
        if !shoe.remove_counts(&view.prior_seen) {
            return None;
        }
        for card in view.visible_cards() {
            if !shoe.remove(card) {
                return None;
            }
        }
        let hole = match view.dealer_revealed.first() {
            // Showdown already happened: the hole card is public and the
            // loop above removed it from the shoe.
            Some(&hole) => hole,
            None => shoe.draw(rng)?,
        };
        Some(ShoeState { shoe, hole })
    }
}
