//! End-to-end harness smoke test: a tiny experiment runs to completion and
//! leaves well-formed artifacts behind.

use std::fs;
use std::io::{BufRead, BufReader};

use pomcp_bench::config::{
    AgentConfig, AgentKind, ExperimentConfig, LoggingConfig, OutputsConfig, RoundsConfig,
};
use pomcp_bench::experiment::ExperimentRunner;
use pomcp_blackjack::RulesConfig;
use pomcp_core::PlannerConfig;
use serde_json::Value;

fn tiny_config(jsonl: String, summary_md: String) -> ExperimentConfig {
    ExperimentConfig {
        run_id: "smoke".to_string(),
        rounds: RoundsConfig {
            seed: Some(7),
            count: 4,
            shoe_cut: 0.25,
        },
        agents: vec![
            AgentConfig {
                name: "pomcp".to_string(),
                kind: AgentKind::Pomcp,
            },
            AgentConfig {
                name: "house".to_string(),
                kind: AgentKind::Dealer,
            },
        ],
        outputs: OutputsConfig { jsonl, summary_md },
        planner: PlannerConfig {
            simulations: 16,
            particles: 32,
            min_particles: 4,
            ..PlannerConfig::default()
        },
        rules: RulesConfig::default(),
        logging: LoggingConfig::default(),
    }
}

#[test]
fn tiny_experiment_writes_rows_and_summary() {
    let dir = tempfile::tempdir().expect("temp dir");
    let jsonl = dir.path().join("rounds.jsonl");
    let summary_md = dir.path().join("summary.md");

    let mut config = tiny_config(
        jsonl.to_string_lossy().into_owned(),
        summary_md.to_string_lossy().into_owned(),
    );
    config.validate().expect("config valid");

    let outputs = config.resolved_outputs();
    let runner = ExperimentRunner::new(config, outputs);
    let summary = runner.run().expect("experiment runs");

    assert_eq!(summary.rounds_played, 4);
    assert_eq!(summary.rows_written, 8);
    assert_eq!(summary.agents.len(), 2);
    for agent in &summary.agents {
        assert_eq!(agent.wins + agent.pushes + agent.losses, 4);
        assert!(agent.win_rate >= agent.win_rate_low);
        assert!(agent.win_rate <= agent.win_rate_high);
    }

    let reader = BufReader::new(fs::File::open(&jsonl).expect("jsonl exists"));
    let mut rows = 0usize;
    for line in reader.lines() {
        let line = line.expect("read line");
        let row: Value = serde_json::from_str(&line).expect("well-formed row");
        assert_eq!(row["run_id"], "smoke");
        assert!(row["outcome"].is_string());
        assert!(row["reward"].is_number());
        rows += 1;
    }
    assert_eq!(rows, 8);

    let markdown = fs::read_to_string(&summary_md).expect("summary exists");
    assert!(markdown.contains("pomcp"));
    assert!(markdown.contains("house"));
}

#[test]
fn identical_seeds_reproduce_identical_rows() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut contents = Vec::new();

    for attempt in 0..2 {
        let jsonl = dir.path().join(format!("rounds_{attempt}.jsonl"));
        let summary_md = dir.path().join(format!("summary_{attempt}.md"));
        let mut config = tiny_config(
            jsonl.to_string_lossy().into_owned(),
            summary_md.to_string_lossy().into_owned(),
        );
        config.validate().expect("config valid");
        let outputs = config.resolved_outputs();
        ExperimentRunner::new(config, outputs)
            .run()
            .expect("experiment runs");
        contents.push(fs::read_to_string(&jsonl).expect("jsonl exists"));
    }

    assert_eq!(contents[0], contents[1]);
}
