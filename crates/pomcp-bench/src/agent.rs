//! Round-level players: the POMCP planner and the fixed baselines it is
//! measured against.

use pomcp_blackjack::{Action, BlackjackSim, Deal, DealerRollout, ShoeState, TableView};
use pomcp_core::{PlanError, Planner, PlannerConfig, RolloutPolicy, Simulator, Ucb1};
use rand::Rng;
use thiserror::Error;

use crate::config::AgentKind;

/// What one finished round looked like from the harness's side.
#[derive(Debug, Clone)]
pub struct RoundOutcome {
    /// Net payout across all hands, in units of the base bet.
    pub reward: f64,
    /// Actions taken, in order.
    pub actions: Vec<Action>,
    /// The table after settlement.
    pub final_view: TableView,
    /// The true hidden state after settlement; the harness reconciles the
    /// persistent shoe from this.
    pub final_hidden: ShoeState,
}

impl RoundOutcome {
    pub fn decisions(&self) -> usize {
        self.actions.len()
    }
}

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("planner failed: {0}")]
    Plan(#[from] PlanError<Action>),
    #[error("round exceeded {limit} decisions without terminating")]
    RunawayRound { limit: usize },
}

const DECISION_LIMIT: usize = 64;

/// Plays one dealt round to completion with the given agent kind.
///
/// `round_seed` seeds the planner so a rerun of the same experiment makes the
/// same decisions; `env_rng` drives the real cards.
pub fn play_round<R: Rng>(
    kind: AgentKind,
    sim: &BlackjackSim,
    planner_cfg: &PlannerConfig,
    deal: Deal,
    round_seed: u64,
    env_rng: &mut R,
) -> Result<RoundOutcome, AgentError> {
    let rollout = DealerRollout::from_rules(sim.rules());
    let mut planner = match kind {
        AgentKind::Pomcp => {
            let config = PlannerConfig {
                seed: Some(round_seed),
                ..planner_cfg.clone()
            };
            let exploration = config.exploration;
            Some(Planner::with_policies(
                sim.clone(),
                deal.view.clone(),
                config,
                Ucb1 { exploration },
                rollout,
            ))
        }
        AgentKind::Dealer | AgentKind::Random => None,
    };

    let mut view = deal.view;
    let mut hidden = deal.hidden;
    let mut reward = 0.0;
    let mut actions = Vec::new();

    loop {
        let legal = sim.legal_actions(&view);
        if legal.is_empty() {
            break;
        }
        if actions.len() >= DECISION_LIMIT {
            return Err(AgentError::RunawayRound {
                limit: DECISION_LIMIT,
            });
        }

        let action = match (&mut planner, kind) {
            (Some(planner), _) => planner.plan()?,
            (None, AgentKind::Dealer) => rollout.choose(sim, &view, &legal, env_rng),
            (None, _) => legal[env_rng.gen_range(0..legal.len())],
        };

        let step = sim.step(&view, &hidden, action, env_rng);
        actions.push(action);
        reward += step.reward;
        view = step.observable;
        hidden = step.hidden;
        if step.terminal {
            break;
        }
        if let Some(planner) = planner.as_mut() {
            planner.update(action, step.observation, view.clone())?;
        }
    }

    Ok(RoundOutcome {
        reward,
        actions,
        final_view: view,
        final_hidden: hidden,
    })
}
