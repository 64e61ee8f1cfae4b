//! Rules-variant configuration. The planner core never interprets any of
//! this; it is threaded into the simulator as opaque parameters.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Decks in the shoe.
    pub decks: u8,
    /// Dealer stands once their total reaches this value.
    pub dealer_stands_on: u8,
    /// Dealer hits a soft total equal to the stand threshold (H17 tables).
    pub dealer_hits_soft: bool,
    /// Doubling down on any first two cards.
    pub allow_double: bool,
    /// Splitting equal-value pairs.
    pub allow_split: bool,
    /// Upper bound on simultaneous hands after splitting.
    pub max_split_hands: u8,
    /// Late surrender on the opening hand.
    pub allow_surrender: bool,
    /// Payout for a player natural, as a multiple of the bet.
    pub natural_payout: f64,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            decks: 2,
            dealer_stands_on: 17,
            dealer_hits_soft: true,
            allow_double: true,
            allow_split: true,
            max_split_hands: 4,
            allow_surrender: true,
            natural_payout: 1.5,
        }
    }
}

impl RulesConfig {
    pub fn validate(&self) -> Result<(), RulesError> {
        if self.decks == 0 {
            return Err(RulesError::invalid("decks", "must be at least 1"));
        }
        if !(12..=21).contains(&self.dealer_stands_on) {
            return Err(RulesError::invalid(
                "dealer_stands_on",
                "must be between 12 and 21",
            ));
        }
        if self.max_split_hands == 0 {
            return Err(RulesError::invalid(
                "max_split_hands",
                "must be at least 1",
            ));
        }
        if !(self.natural_payout >= 1.0 && self.natural_payout.is_finite()) {
            return Err(RulesError::invalid(
                "natural_payout",
                "must be a finite multiple of at least 1.0",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RulesError {
    #[error("{field}: {message}")]
    InvalidField {
        field: &'static str,
        message: &'static str,
    },
}

impl RulesError {
    fn invalid(field: &'static str, message: &'static str) -> Self {
        RulesError::InvalidField { field, message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        RulesConfig::default().validate().expect("defaults valid");
    }

    #[test]
    fn rejects_zero_decks() {
        let rules = RulesConfig {
            decks: 0,
            ..RulesConfig::default()
        };
        assert!(matches!(
            rules.validate(),
            Err(RulesError::InvalidField { field: "decks", .. })
        ));
    }

    #[test]
    fn rejects_absurd_stand_threshold() {
        let rules = RulesConfig {
            dealer_stands_on: 25,
            ..RulesConfig::default()
        };
        assert!(rules.validate().is_err());
    }
}
