//! Round loop, JSONL telemetry, and per-agent win statistics.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, Normal};
use thiserror::Error;
use tracing::debug;

use pomcp_blackjack::card::RANKS;
use pomcp_blackjack::{Action, BlackjackSim, Shoe};

use crate::agent::{AgentError, play_round};
use crate::config::{AgentConfig, ExperimentConfig, ResolvedOutputs};

/// Primary entry point for running a configured experiment.
pub struct ExperimentRunner {
    config: ExperimentConfig,
    outputs: ResolvedOutputs,
}

/// Summary details returned after a run.
pub struct RunSummary {
    pub rounds_played: usize,
    pub rows_written: usize,
    pub jsonl_path: PathBuf,
    pub summary_path: PathBuf,
    pub agents: Vec<AgentSummary>,
}

/// Win statistics for one agent over the whole run.
#[derive(Debug, Clone, Serialize)]
pub struct AgentSummary {
    pub name: String,
    pub rounds: usize,
    pub wins: usize,
    pub pushes: usize,
    pub losses: usize,
    pub win_rate: f64,
    /// 95% normal-approximation interval on the win rate.
    pub win_rate_low: f64,
    pub win_rate_high: f64,
    pub mean_reward: f64,
}

/// One JSONL row per finished round.
#[derive(Debug, Serialize)]
struct RoundLogRow {
    run_id: String,
    agent: String,
    round: usize,
    deal_seed: u64,
    reward: f64,
    outcome: &'static str,
    decisions: usize,
    actions: Vec<Action>,
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Agent(#[from] AgentError),
    #[error("statistics error: {0}")]
    Stats(#[from] statrs::StatsError),
    #[error("shoe exhausted while dealing round {round}")]
    ShoeExhausted { round: usize },
}

impl ExperimentRunner {
    /// Build a runner from a validated configuration.
    pub fn new(config: ExperimentConfig, outputs: ResolvedOutputs) -> Self {
        Self { config, outputs }
    }

    /// Execute the experiment, streaming JSONL rows to disk.
    pub fn run(&self) -> Result<RunSummary, RunnerError> {
        ensure_parent(self.outputs.jsonl.parent())?;
        ensure_parent(self.outputs.summary_md.parent())?;

        let mut writer = BufWriter::new(File::create(&self.outputs.jsonl)?);
        let mut rows_written = 0usize;
        let mut agents = Vec::with_capacity(self.config.agents.len());

        for agent in &self.config.agents {
            let summary = self.run_agent(agent, &mut writer, &mut rows_written)?;
            agents.push(summary);
        }

        writer.flush()?;
        write_summary_markdown(&self.outputs.summary_md, &self.config.run_id, &agents)?;

        Ok(RunSummary {
            rounds_played: self.config.rounds.count,
            rows_written,
            jsonl_path: self.outputs.jsonl.clone(),
            summary_path: self.outputs.summary_md.clone(),
            agents,
        })
    }

    /// Plays every configured round for one agent against a persistent shoe.
    ///
    /// Each agent restarts the seed stream, so all agents see the same deal
    /// sequence until their own choices perturb the shoe.
    fn run_agent(
        &self,
        agent: &AgentConfig,
        writer: &mut BufWriter<File>,
        rows_written: &mut usize,
    ) -> Result<AgentSummary, RunnerError> {
        let sim = BlackjackSim::new(self.config.rules.clone());
        let mut seed_rng = SmallRng::seed_from_u64(self.config.rounds.seed.unwrap_or(0));

        let full_len = Shoe::full(self.config.rules.decks).len();
        let cut = self.config.rounds.shoe_cut;
        let mut shoe = Shoe::full(self.config.rules.decks);
        let mut prior_seen = [0u8; RANKS];

        let mut wins = 0usize;
        let mut pushes = 0usize;
        let mut losses = 0usize;
        let mut total_reward = 0.0;

        for round in 0..self.config.rounds.count {
            let deal_seed = seed_rng.next_u64();
            let planner_seed = seed_rng.next_u64();
            let mut env_rng = SmallRng::seed_from_u64(deal_seed);

            if (shoe.len() as f64) < cut * full_len as f64 {
                shoe = Shoe::full(self.config.rules.decks);
                prior_seen = [0; RANKS];
            }

            let deal = match sim.deal(&mut shoe, prior_seen, &mut env_rng) {
                Some(deal) => deal,
                None => {
                    shoe = Shoe::full(self.config.rules.decks);
                    prior_seen = [0; RANKS];
                    sim.deal(&mut shoe, prior_seen, &mut env_rng)
                        .ok_or(RunnerError::ShoeExhausted { round })?
                }
            };

            let outcome = play_round(
                agent.kind,
                &sim,
                &self.config.planner,
                deal,
                planner_seed,
                &mut env_rng,
            )?;

            // Carry the real shoe into the next round. A hole card the dealer
            // never showed goes back in; nobody saw it, so the composition the
            // player believes in stays exact.
            shoe = outcome.final_hidden.shoe.clone();
            if outcome.final_view.dealer_revealed.is_empty() {
                shoe.insert(outcome.final_hidden.hole);
            }
            prior_seen = outcome.final_view.seen_counts();

            let label = outcome_label(outcome.reward);
            match label {
                "win" => wins += 1,
                "push" => pushes += 1,
                _ => losses += 1,
            }
            total_reward += outcome.reward;

            debug!(
                agent = %agent.name,
                round,
                reward = outcome.reward,
                outcome = label,
                decisions = outcome.decisions(),
                "round settled"
            );

            let row = RoundLogRow {
                run_id: self.config.run_id.clone(),
                agent: agent.name.clone(),
                round,
                deal_seed,
                reward: outcome.reward,
                outcome: label,
                decisions: outcome.decisions(),
                actions: outcome.actions,
            };
            serde_json::to_writer(&mut *writer, &row)?;
            writer.write_all(b"\n")?;
            *rows_written += 1;
        }

        let rounds = self.config.rounds.count;
        let win_rate = wins as f64 / rounds as f64;
        let (win_rate_low, win_rate_high) = win_rate_interval(wins, rounds)?;

        Ok(AgentSummary {
            name: agent.name.clone(),
            rounds,
            wins,
            pushes,
            losses,
            win_rate,
            win_rate_low,
            win_rate_high,
            mean_reward: total_reward / rounds as f64,
        })
    }
}

fn outcome_label(reward: f64) -> &'static str {
    if reward > 0.0 {
        "win"
    } else if reward < 0.0 {
        "loss"
    } else {
        "push"
    }
}

/// 95% normal-approximation confidence interval on a binomial proportion.
fn win_rate_interval(wins: usize, rounds: usize) -> Result<(f64, f64), RunnerError> {
    let n = rounds as f64;
    let p = wins as f64 / n;
    let z = Normal::new(0.0, 1.0)?.inverse_cdf(0.975);
    let half_width = z * (p * (1.0 - p) / n).sqrt();
    Ok(((p - half_width).max(0.0), (p + half_width).min(1.0)))
}

fn ensure_parent(path: Option<&Path>) -> Result<(), RunnerError> {
    if let Some(dir) = path.filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

fn write_summary_markdown(
    path: &Path,
    run_id: &str,
    agents: &[AgentSummary],
) -> Result<(), RunnerError> {
    let mut out = String::new();
    out.push_str(&format!("# Experiment `{run_id}`\n\n"));
    out.push_str("| agent | rounds | wins | pushes | losses | win rate | 95% CI | mean reward |\n");
    out.push_str("|-------|--------|------|--------|--------|----------|--------|-------------|\n");
    for agent in agents {
        out.push_str(&format!(
            "| {} | {} | {} | {} | {} | {:.1}% | [{:.1}%, {:.1}%] | {:+.3} |\n",
            agent.name,
            agent.rounds,
            agent.wins,
            agent.pushes,
            agent.losses,
            100.0 * agent.win_rate,
            100.0 * agent.win_rate_low,
            100.0 * agent.win_rate_high,
            agent.mean_reward,
        ));
    }
    fs::write(path, out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_labels_partition_rewards() {
        assert_eq!(outcome_label(1.5), "win");
        assert_eq!(outcome_label(0.0), "push");
        assert_eq!(outcome_label(-0.5), "loss");
    }

    #[test]
    fn win_rate_interval_is_clamped_and_centered() {
        let (low, high) = win_rate_interval(50, 100).expect("interval");
        assert!(low > 0.35 && low < 0.5);
        assert!(high > 0.5 && high < 0.65);
        assert!((0.5 - low - (high - 0.5)).abs() < 1e-9);

        let (low, high) = win_rate_interval(0, 10).expect("interval");
        assert_eq!(low, 0.0);
        assert_eq!(high, 0.0);

        let (low, high) = win_rate_interval(10, 10).expect("interval");
        assert_eq!(low, 1.0);
        assert_eq!(high, 1.0);
    }
}
