//! Planner failure taxonomy.
//!
//! Every variant here is surfaced to the caller rather than papered over: an
//! impossible observation or an exhausted budget indicates a modeling or
//! configuration bug, and silently guessing an action would hide it.

use std::fmt::Debug;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum PlanError<A: Debug> {
    /// The action is not in `legal_actions` for the current observable state.
    #[error("action {action:?} is illegal for the current observable state")]
    IllegalAction { action: A },

    /// No particle consistent with the observation survived, and the
    /// conditional sampler failed `attempts` consecutive times. The real
    /// observation was impossible under the simulator's model.
    #[error("belief collapsed: sampler failed {attempts} consecutive attempts")]
    BeliefCollapse { attempts: usize },

    /// The simulation budget was too small to visit any root action even
    /// once. A degenerate configuration, not a planning outcome.
    #[error("budget of {simulations} simulations visited no root action")]
    NoVisits { simulations: usize },

    /// `update` was called without a preceding `plan`, or twice for the same
    /// decision; the tree has already advanced past this root.
    #[error("tree already advanced past this decision; plan must precede update")]
    TreeOutOfSync,
}
