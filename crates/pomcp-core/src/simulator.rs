//! Generative simulation interface consumed by the planner.

use rand::Rng;
use std::fmt;
use std::hash::Hash;

/// Outcome of one generative transition.
pub struct Step<S: Simulator + ?Sized> {
    /// Publicly visible successor state.
    pub observable: S::Observable,
    /// Hidden successor state (never shown to the decision-maker).
    pub hidden: S::Hidden,
    /// Lossy projection of the successor state; the tree branches on this.
    pub observation: S::Observation,
    pub reward: f64,
    pub terminal: bool,
}

/// A generative model of the environment.
///
/// Repeated `step` calls with identical inputs may return different outputs
/// (card draws are stochastic), but the marginal distribution over outputs
/// must match the true game dynamics. Implementations live outside this
/// crate; the planner treats every associated type as opaque.
pub trait Simulator {
    type Observable: Clone;
    type Hidden: Clone;
    type Action: Copy + Eq + Hash + fmt::Debug;
    type Observation: Clone + Eq + Hash + fmt::Debug;

    /// Actions available from `observable`. Empty means terminal.
    fn legal_actions(&self, observable: &Self::Observable) -> Vec<Self::Action>;

    /// Samples one transition of the full (observable + hidden) state.
    fn step<R: Rng + ?Sized>(
        &self,
        observable: &Self::Observable,
        hidden: &Self::Hidden,
        action: Self::Action,
        rng: &mut R,
    ) -> Step<Self>;

    /// Draws a hidden state consistent with public information only.
    ///
    /// Used for belief initialization and reinvigoration. `None` signals that
    /// no consistent hidden state could be produced for this attempt; the
    /// planner retries up to its configured budget before surfacing a
    /// [`PlanError::BeliefCollapse`](crate::error::PlanError::BeliefCollapse).
    fn sample_hidden<R: Rng + ?Sized>(
        &self,
        observable: &Self::Observable,
        rng: &mut R,
    ) -> Option<Self::Hidden>;
}
