//! Action-selection policies: the in-tree bandit rule and the rollout default.

use crate::simulator::Simulator;
use crate::tree::ActionArm;
use rand::Rng;

/// Bandit rule applied inside the tree.
///
/// Implementations pick an arm index given the parent's visit total and the
/// per-arm statistics; swapping the rule (UCB-V, Thompson sampling) leaves
/// the rest of the planner untouched.
pub trait TreePolicy {
    /// Returns the index of the arm to simulate next. `arms` is never empty.
    fn select<A: Copy>(&self, parent_visits: u64, arms: &[ActionArm<A>]) -> usize;
}

/// UCB1: `value + c * sqrt(ln(N) / n)`.
///
/// Unvisited arms carry an effectively infinite bonus and are tried first,
/// lowest index first so runs with a fixed seed are reproducible.
#[derive(Debug, Clone, Copy)]
pub struct Ucb1 {
    pub exploration: f64,
}

impl TreePolicy for Ucb1 {
    fn select<A: Copy>(&self, parent_visits: u64, arms: &[ActionArm<A>]) -> usize {
        if let Some(index) = arms.iter().position(|arm| arm.visits == 0) {
            return index;
        }

        let ln_total = (parent_visits.max(1) as f64).ln();
        let mut best = 0;
        let mut best_score = f64::NEG_INFINITY;
        for (index, arm) in arms.iter().enumerate() {
            let bonus = self.exploration * (ln_total / arm.visits as f64).sqrt();
            let score = arm.value + bonus;
            if score > best_score {
                best = index;
                best_score = score;
            }
        }
        best
    }
}

/// Default policy applied once a simulation leaves the tree.
pub trait RolloutPolicy<S: Simulator> {
    /// Picks one of `legal` (never empty) for the rollout step.
    fn choose<R: Rng + ?Sized>(
        &self,
        sim: &S,
        observable: &S::Observable,
        legal: &[S::Action],
        rng: &mut R,
    ) -> S::Action;
}

/// Uniform-random legal action; the cheapest unbiased rollout.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformRollout;

impl<S: Simulator> RolloutPolicy<S> for UniformRollout {
    fn choose<R: Rng + ?Sized>(
        &self,
        _sim: &S,
        _observable: &S::Observable,
        legal: &[S::Action],
        rng: &mut R,
    ) -> S::Action {
        legal[rng.gen_range(0..legal.len())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arms(stats: &[(u64, f64)]) -> Vec<ActionArm<u8>> {
        stats
            .iter()
            .enumerate()
            .map(|(i, &(visits, value))| ActionArm {
                action: i as u8,
                visits,
                value,
            })
            .collect()
    }

    #[test]
    fn unvisited_arms_are_selected_first_in_index_order() {
        let policy = Ucb1 { exploration: 7.0 };
        let arms = arms(&[(3, 0.9), (0, 0.0), (0, 0.0)]);
        assert_eq!(policy.select(3, &arms), 1);
    }

    #[test]
    fn zero_exploration_is_greedy_on_value() {
        let policy = Ucb1 { exploration: 0.0 };
        let arms = arms(&[(10, 0.1), (10, 0.7), (10, 0.4)]);
        assert_eq!(policy.select(30, &arms), 1);
    }

    #[test]
    fn exploration_bonus_lifts_rarely_tried_arms() {
        let policy = Ucb1 { exploration: 7.0 };
        // Arm 1 is slightly worse on value but nearly untried.
        let arms = arms(&[(400, 0.6), (1, 0.4)]);
        assert_eq!(policy.select(401, &arms), 1);
    }
}
