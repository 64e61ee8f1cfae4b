use std::path::PathBuf;

use clap::Parser;

use pomcp_bench::config::{ExperimentConfig, ResolvedOutputs};
use pomcp_bench::experiment::ExperimentRunner;
use pomcp_bench::logging::init_logging;

/// Win-rate benchmarking harness for the POMCP Blackjack planner.
#[derive(Debug, Parser)]
#[command(
    name = "pomcp-bench",
    author,
    version,
    about = "Deterministic POMCP Blackjack experiment harness"
)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "bench/bench.yaml")]
    config: PathBuf,

    /// Override the run identifier (substitutes {run_id} templates).
    #[arg(long, value_name = "RUN_ID")]
    run_id: Option<String>,

    /// Override the number of rounds to play per agent.
    #[arg(long, value_name = "ROUNDS")]
    rounds: Option<usize>,

    /// Override the RNG seed for dealing.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Override the planner's simulation budget per decision.
    #[arg(long, value_name = "COUNT")]
    simulations: Option<usize>,

    /// Exit after validating the configuration (no experiment is run).
    #[arg(long)]
    validate_only: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = ExperimentConfig::from_path(&cli.config)?;

    if let Some(run_id) = cli.run_id {
        config.run_id = run_id;
    }

    if let Some(rounds) = cli.rounds {
        config.rounds.count = rounds;
    }

    if let Some(seed) = cli.seed {
        config.rounds.seed = Some(seed);
    }

    if let Some(simulations) = cli.simulations {
        config.planner.simulations = simulations;
    }

    config.validate()?;

    let outputs: ResolvedOutputs = config.resolved_outputs();
    let agent_count = config.agents.len();
    let run_id = config.run_id.clone();
    let rounds = config.rounds.count;

    println!(
        "Loaded configuration '{run_id}' with {agent_count} agent{} ({rounds} rounds each)",
        if agent_count == 1 { "" } else { "s" }
    );

    let logging_guard = init_logging(&config.logging, &outputs)?;

    if cli.validate_only {
        println!("Validation-only mode: experiment execution skipped.");
        return Ok(());
    }

    let runner = ExperimentRunner::new(config, outputs);
    let summary = runner.run()?;

    println!(
        "Experiment complete for '{run_id}': {} rounds × {} agents → {} rows at {}",
        summary.rounds_played,
        agent_count,
        summary.rows_written,
        summary.jsonl_path.display()
    );
    println!("Summary table: {}", summary.summary_path.display());
    if let Some(guard) = logging_guard.as_ref() {
        println!("Telemetry log: {}", guard.telemetry_path.display());
    }
    for agent in &summary.agents {
        println!(
            "  {}: {:.1}% wins ({} / {} / {}), mean reward {:+.3}",
            agent.name,
            100.0 * agent.win_rate,
            agent.wins,
            agent.pushes,
            agent.losses,
            agent.mean_reward,
        );
    }

    Ok(())
}
