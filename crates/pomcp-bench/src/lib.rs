#![deny(warnings)]
//! Experiment harness: plays POMCP and baseline agents over many rounds of
//! Blackjack and reports win statistics.

pub mod agent;
pub mod config;
pub mod experiment;
pub mod logging;
