//! Rollout policy that mimics the house: hit below the stand threshold.
//! Cheaper-variance leaf estimates than uniform random play, and exactly the
//! default policy the planner was tuned with.

use crate::hand::{self, BUST, NATURAL};
use crate::sim::BlackjackSim;
use crate::table::{Action, TableView};
use pomcp_core::RolloutPolicy;
use rand::Rng;

#[derive(Debug, Clone, Copy)]
pub struct DealerRollout {
    pub stand_on: u8,
    pub hit_soft: bool,
}

impl Default for DealerRollout {
    fn default() -> Self {
        Self {
            stand_on: 17,
            hit_soft: true,
        }
    }
}

impl DealerRollout {
    /// Mirrors the table's own dealer behavior.
    pub fn from_rules(rules: &crate::rules::RulesConfig) -> Self {
        Self {
            stand_on: rules.dealer_stands_on,
            hit_soft: rules.dealer_hits_soft,
        }
    }

    fn wants_hit(&self, view: &TableView) -> bool {
        let Some(hand_view) = view.active_hand() else {
            return false;
        };
        let (score, soft) = hand::score_soft(&hand_view.cards);
        if score == BUST || score == NATURAL {
            return false;
        }
        score < self.stand_on || (soft && score == self.stand_on && self.hit_soft)
    }
}

impl RolloutPolicy<BlackjackSim> for DealerRollout {
    fn choose<R: Rng + ?Sized>(
        &self,
        _sim: &BlackjackSim,
        view: &TableView,
        legal: &[Action],
        _rng: &mut R,
    ) -> Action {
        let preferred = if self.wants_hit(view) {
            Action::Hit
        } else {
            Action::Stand
        };
        if legal.contains(&preferred) {
            preferred
        } else {
            legal[0]
        }
    }
}
