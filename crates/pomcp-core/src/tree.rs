//! Search-tree nodes keyed by action/observation histories.

use crate::belief::Belief;
use crate::simulator::Simulator;
use std::collections::HashMap;

/// Per-action statistics at a node: visit count and running mean return.
#[derive(Debug, Clone)]
pub struct ActionArm<A> {
    pub action: A,
    pub visits: u64,
    pub value: f64,
}

impl<A> ActionArm<A> {
    fn new(action: A) -> Self {
        Self {
            action,
            visits: 0,
            value: 0.0,
        }
    }
}

/// One node of the search tree, identified by the (action, observation)
/// sequence leading to it from the root of the current decision.
///
/// A node exclusively owns its belief, its action arms, and its children;
/// promoting a child to root (see [`take_child`](HistoryNode::take_child))
/// drops every sibling subtree along with the old root.
pub struct HistoryNode<S: Simulator> {
    belief: Belief<S::Hidden>,
    arms: Vec<ActionArm<S::Action>>,
    children: HashMap<(S::Action, S::Observation), HistoryNode<S>>,
    visits: u64,
    expanded: bool,
}

impl<S: Simulator> HistoryNode<S> {
    /// Creates a fresh node with an empty belief of the given capacity.
    pub fn new(particle_capacity: usize) -> Self {
        Self {
            belief: Belief::with_capacity(particle_capacity),
            arms: Vec::new(),
            children: HashMap::new(),
            visits: 0,
            expanded: false,
        }
    }

    /// True until the node has been expanded by a simulation.
    pub fn is_leaf(&self) -> bool {
        !self.expanded
    }

    /// Initializes one zeroed arm per legal action and marks the node
    /// expanded. A second call is a logic error: expansion happens exactly
    /// once, on the first simulation that reaches this history.
    pub fn expand(&mut self, legal: &[S::Action]) {
        debug_assert!(!self.expanded, "node expanded twice");
        self.arms = legal.iter().copied().map(ActionArm::new).collect();
        self.expanded = true;
    }

    pub fn arms(&self) -> &[ActionArm<S::Action>] {
        &self.arms
    }

    /// Total number of backed-up simulations through this node.
    pub fn visits(&self) -> u64 {
        self.visits
    }

    pub fn belief(&self) -> &Belief<S::Hidden> {
        &self.belief
    }

    pub fn belief_mut(&mut self) -> &mut Belief<S::Hidden> {
        &mut self.belief
    }

    /// Records a simulated return for the arm at `index` using an
    /// incremental mean.
    pub fn backup(&mut self, index: usize, ret: f64) {
        self.visits += 1;
        let arm = &mut self.arms[index];
        arm.visits += 1;
        arm.value += (ret - arm.value) / arm.visits as f64;
    }

    /// Returns the child for `(action, observation)`, creating an empty one
    /// (fresh stats, empty belief) on first visit.
    pub fn child_mut(
        &mut self,
        action: S::Action,
        observation: S::Observation,
        particle_capacity: usize,
    ) -> &mut HistoryNode<S> {
        self.children
            .entry((action, observation))
            .or_insert_with(|| HistoryNode::new(particle_capacity))
    }

    /// Detaches and returns the child for `(action, observation)`, if any.
    /// The caller becomes the owner; everything left behind is dropped with
    /// this node.
    pub fn take_child(
        &mut self,
        action: S::Action,
        observation: &S::Observation,
    ) -> Option<HistoryNode<S>> {
        self.children.remove(&(action, observation.clone()))
    }

    pub fn child(
        &self,
        action: S::Action,
        observation: &S::Observation,
    ) -> Option<&HistoryNode<S>> {
        self.children.get(&(action, observation.clone()))
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulator::{Simulator, Step};
    use rand::Rng;

    /// Minimal simulator so the node type parameters resolve in tests.
    struct UnitSim;

    impl Simulator for UnitSim {
        type Observable = ();
        type Hidden = u8;
        type Action = u8;
        type Observation = u8;

        fn legal_actions(&self, _observable: &()) -> Vec<u8> {
            vec![0, 1]
        }

        fn step<R: Rng + ?Sized>(&self, _: &(), hidden: &u8, _: u8, _: &mut R) -> Step<Self> {
            Step {
                observable: (),
                hidden: *hidden,
                observation: 0,
                reward: 0.0,
                terminal: true,
            }
        }

        fn sample_hidden<R: Rng + ?Sized>(&self, _: &(), _: &mut R) -> Option<u8> {
            Some(0)
        }
    }

    #[test]
    fn expansion_flips_leaf_state_and_zeroes_arms() {
        let mut node: HistoryNode<UnitSim> = HistoryNode::new(8);
        assert!(node.is_leaf());
        node.expand(&[0, 1, 2]);
        assert!(!node.is_leaf());
        assert_eq!(node.arms().len(), 3);
        assert!(node.arms().iter().all(|a| a.visits == 0 && a.value == 0.0));
    }

    #[test]
    fn backup_maintains_incremental_mean() {
        let mut node: HistoryNode<UnitSim> = HistoryNode::new(8);
        node.expand(&[0]);
        node.backup(0, 1.0);
        node.backup(0, 0.0);
        node.backup(0, 0.5);
        let arm = &node.arms()[0];
        assert_eq!(arm.visits, 3);
        assert!((arm.value - 0.5).abs() < 1e-12);
        assert_eq!(node.visits(), 3);
    }

    #[test]
    fn children_are_created_lazily_and_detached_exclusively() {
        let mut node: HistoryNode<UnitSim> = HistoryNode::new(8);
        assert_eq!(node.child_count(), 0);
        node.child_mut(0, 7, 8).expand(&[0]);
        node.child_mut(1, 7, 8);
        assert_eq!(node.child_count(), 2);

        let taken = node.take_child(0, &7).expect("child exists");
        assert!(!taken.is_leaf());
        assert_eq!(node.child_count(), 1);
        assert!(node.take_child(0, &7).is_none());
    }
}
