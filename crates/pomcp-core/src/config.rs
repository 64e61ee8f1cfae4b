//! Planner tunables with documented defaults.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Knobs for one planner instance.
///
/// The exploration constant, particle count, horizon, and discount are
/// deliberately configuration rather than constants; the defaults are the
/// values the engine was tuned with and are a reasonable starting point for
/// shoe sizes of a few decks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Discount factor applied per simulated step, in (0, 1].
    pub discount: f64,
    /// Simulation stops once `discount^depth` drops below this threshold.
    pub epsilon: f64,
    /// UCB1 exploration constant `c`.
    pub exploration: f64,
    /// Belief capacity `K`: particles retained per history node.
    pub particles: usize,
    /// Minimum viable particle count; beliefs below this are reinvigorated.
    pub min_particles: usize,
    /// Fresh draws added per reinvigoration pass.
    pub reinvigoration: usize,
    /// Hard depth cutoff for a simulated episode.
    pub horizon: u32,
    /// Simulated episodes per real decision.
    pub simulations: usize,
    /// Consecutive conditional-sampler failures tolerated before the belief
    /// is declared collapsed.
    pub collapse_retries: usize,
    /// RNG seed; `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            discount: 0.8,
            epsilon: 1e-7,
            exploration: 7.0,
            particles: 128,
            min_particles: 16,
            reinvigoration: 16,
            horizon: 32,
            simulations: 128,
            collapse_retries: 8,
            seed: None,
        }
    }
}

impl PlannerConfig {
    /// Validates field ranges without performing any I/O.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.discount > 0.0 && self.discount <= 1.0) {
            return Err(ConfigError::invalid("discount", "must be in (0, 1]"));
        }
        if !(self.epsilon > 0.0) {
            return Err(ConfigError::invalid("epsilon", "must be positive"));
        }
        if self.exploration < 0.0 || !self.exploration.is_finite() {
            return Err(ConfigError::invalid(
                "exploration",
                "must be finite and non-negative",
            ));
        }
        if self.particles == 0 {
            return Err(ConfigError::invalid("particles", "must be at least 1"));
        }
        if self.min_particles == 0 || self.min_particles > self.particles {
            return Err(ConfigError::invalid(
                "min_particles",
                "must be in 1..=particles",
            ));
        }
        if self.horizon == 0 {
            return Err(ConfigError::invalid("horizon", "must be at least 1"));
        }
        if self.simulations == 0 {
            return Err(ConfigError::invalid("simulations", "must be at least 1"));
        }
        if self.collapse_retries == 0 {
            return Err(ConfigError::invalid(
                "collapse_retries",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Configuration failures with field-level context.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{field}: {message}")]
    InvalidField {
        field: &'static str,
        message: &'static str,
    },
}

impl ConfigError {
    fn invalid(field: &'static str, message: &'static str) -> Self {
        ConfigError::InvalidField { field, message }
    }
}
