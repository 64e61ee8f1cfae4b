#![deny(warnings)]
//! Online POMDP planning via Partially Observable Monte-Carlo Planning.
//!
//! The planner interleaves acting and planning: each real decision runs a
//! budget of simulated episodes through a search tree keyed by
//! action/observation histories, with an unweighted particle filter standing
//! in for the exact belief over hidden state. The game itself is reached only
//! through the generative [`Simulator`](simulator::Simulator) interface.

pub mod belief;
pub mod config;
pub mod error;
pub mod planner;
pub mod policy;
pub mod simulator;
pub mod tree;

pub use belief::Belief;
pub use config::PlannerConfig;
pub use error::PlanError;
pub use planner::Planner;
pub use policy::{RolloutPolicy, TreePolicy, Ucb1, UniformRollout};
pub use simulator::{Simulator, Step};
pub use tree::HistoryNode;
