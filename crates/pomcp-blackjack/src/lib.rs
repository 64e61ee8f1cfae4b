#![deny(warnings)]
//! A generative Blackjack simulator for the POMCP planner.
//!
//! Implements the [`pomcp_core::Simulator`] interface: the observable state
//! is everything on the table plus the running count of cards seen, the
//! hidden state is the remaining shoe composition and the dealer's hole
//! card. Rules variants (deck count, soft-17 behavior, double/split/
//! surrender availability) are carried as opaque configuration.

pub mod card;
pub mod hand;
pub mod policy;
pub mod rules;
pub mod shoe;
pub mod sim;
pub mod table;

pub use card::Card;
pub use policy::DealerRollout;
pub use rules::RulesConfig;
pub use shoe::Shoe;
pub use sim::{BlackjackSim, Deal};
pub use table::{Action, HandView, ShoeState, TableView};
