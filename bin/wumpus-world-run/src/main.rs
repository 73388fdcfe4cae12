/*
 * Copyright (C) 2023 Asim Ihsan
 * SPDX-License-Identifier: AGPL-3.0-only
 *
 * This program is free software: you can redistribute it and/or modify it under
 * the terms of the GNU Affero General Public License as published by the Free
 * Software Foundation, version 3.
 *
 * This program is distributed in the hope that it will be useful, but WITHOUT ANY
 * WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A
 * PARTICULAR PURPOSE. See the GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License along
 * with this program. If not, see <https://www.gnu.org/licenses/>
 */

//! Chapter 7, run the wumpus world.
//!
//! Runs the knowledge-based agent once, lets a human play, or evaluates the agent over a range of
//! seeded boards and reports the average score.

mod human;

use std::error::Error;

use clap::Parser;
use serde::Serialize;
use tracing::{debug, error, info, Level};
use tracing_subscriber::FmtSubscriber;
use wumpus_world::{Controller, Outcome, RunReport, WorldConfig, WumpusError, WumpusWorld};

use crate::human::HumanAgent;

/// Wumpus world simulator
#[derive(Parser, Debug)]
#[command(name = "wumpus-world-run")]
#[command(about = "Run a knowledge-based agent in the wumpus world", long_about = None)]
struct Args {
    /// Board side length
    #[arg(short = 'n', long, default_value = "4")]
    size: usize,

    /// Chance of a pit in each cell other than the start
    #[arg(short, long, default_value = "0.2")]
    pit_probability: f64,

    /// Seed for board generation (random if absent)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Maximum number of actions per episode
    #[arg(long, default_value = "200")]
    step_limit: usize,

    /// Evaluate the agent over this many boards, seeded from --seed upwards
    #[arg(short, long)]
    episodes: Option<usize>,

    /// Play the game yourself through stdin
    #[arg(short, long, conflicts_with = "episodes")]
    interactive: bool,

    /// JSON output
    #[arg(long)]
    json: bool,

    /// Print the board before and after the run
    #[arg(long)]
    show_board: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn config(&self) -> WorldConfig {
        WorldConfig {
            board_size: self.size,
            pit_probability: self.pit_probability,
            seed: self.seed,
            step_limit: self.step_limit,
        }
    }
}

/// Outcome counts and average score over a batch of episodes.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
struct EvaluationSummary {
    episodes: usize,
    died: usize,
    climbed_out_with_gold: usize,
    climbed_out_empty: usize,
    exceeded_step_limit: usize,
    average_score: f64,
}

impl EvaluationSummary {
    fn from_reports<'a>(reports: impl IntoIterator<Item = &'a RunReport<i32>>) -> Self {
        let mut summary = Self::default();
        let mut total: i64 = 0;
        for report in reports {
            summary.episodes += 1;
            total += i64::from(report.score);
            match report.outcome {
                Outcome::Died => summary.died += 1,
                Outcome::ClimbedOutWithGold => summary.climbed_out_with_gold += 1,
                Outcome::ClimbedOutEmpty => summary.climbed_out_empty += 1,
                Outcome::ExceededStepLimit => summary.exceeded_step_limit += 1,
            }
        }
        if summary.episodes > 0 {
            summary.average_score = total as f64 / summary.episodes as f64;
        }
        summary
    }
}

impl std::fmt::Display for EvaluationSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "episodes:              {}", self.episodes)?;
        writeln!(f, "climbed out with gold: {}", self.climbed_out_with_gold)?;
        writeln!(f, "climbed out empty:     {}", self.climbed_out_empty)?;
        writeln!(f, "died:                  {}", self.died)?;
        writeln!(f, "exceeded step limit:   {}", self.exceeded_step_limit)?;
        write!(f, "average score:         {:.2}", self.average_score)
    }
}

fn print_report(args: &Args, report: &RunReport<i32>) -> Result<(), Box<dyn Error>> {
    if args.json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        println!("outcome: {}", report.outcome);
        println!("steps:   {}", report.steps);
        println!("score:   {}", report.score);
    }
    Ok(())
}

fn run_once(args: &Args) -> Result<(), Box<dyn Error>> {
    let config = args.config();
    let mut controller = Controller::from_config(&config)?;
    if args.show_board {
        println!("{}\n", controller.environment());
    }
    let report = controller.run()?;
    if args.show_board {
        println!("{}\n", controller.environment());
        println!("{}\n", controller.agent().belief());
    }
    print_report(args, &report)
}

fn run_interactive(args: &Args) -> Result<(), Box<dyn Error>> {
    let config = args.config();
    let world = WumpusWorld::from_config(&config)?;
    let stdin = std::io::stdin();
    let agent = HumanAgent::new(stdin.lock(), std::io::stdout());
    let mut controller = Controller::new(world, agent, config.step_limit)?;
    if args.show_board {
        println!("{}\n", controller.environment());
    }
    let report = match played_to_the_end(controller.run())? {
        Some(report) => report,
        None => {
            info!("player quit");
            return Ok(());
        }
    };
    println!("{}\n", controller.environment());
    print_report(args, &report)
}

/// A player quitting is a clean exit with no report.
fn played_to_the_end(
    result: Result<RunReport<i32>, WumpusError>,
) -> Result<Option<RunReport<i32>>, WumpusError> {
    match result {
        Ok(report) => Ok(Some(report)),
        Err(WumpusError::Quit) => Ok(None),
        Err(e) => Err(e),
    }
}

fn run_evaluation(args: &Args, episodes: usize) -> Result<(), Box<dyn Error>> {
    let base_seed = args.seed.unwrap_or(0);
    let mut reports = Vec::with_capacity(episodes);
    for seed in (0..episodes as u64).map(|i| base_seed.wrapping_add(i)) {
        let config = WorldConfig {
            seed: Some(seed),
            ..args.config()
        };
        let mut controller = Controller::from_config(&config)?;
        let report = controller.run()?;
        debug!(seed, outcome = %report.outcome, score = report.score, "episode");
        reports.push(report);
    }

    let summary = EvaluationSummary::from_reports(&reports);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{}", summary);
    }
    Ok(())
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    args.config().validate()?;
    match args.episodes {
        Some(episodes) => run_evaluation(args, episodes),
        None if args.interactive => run_interactive(args),
        None => run_once(args),
    }
}

fn main() {
    let args = Args::parse();

    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("failed to set tracing subscriber: {}", e);
        std::process::exit(1);
    }

    info!(size = args.size, pit_probability = args.pit_probability, seed = ?args.seed, "starting");
    if let Err(e) = run(&args) {
        error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["wumpus-world-run"]).expect("parse");
        assert_eq!(args.config(), WorldConfig::default());
        assert_eq!(args.episodes, None);
        assert!(!args.interactive);
        assert!(!args.json);
    }

    #[test]
    fn test_flags() {
        let args = Args::try_parse_from([
            "wumpus-world-run",
            "--size",
            "6",
            "--pit-probability",
            "0.1",
            "--seed",
            "7",
            "--step-limit",
            "50",
            "--episodes",
            "10",
            "--json",
            "-v",
        ])
        .expect("parse");
        assert_eq!(
            args.config(),
            WorldConfig {
                board_size: 6,
                pit_probability: 0.1,
                seed: Some(7),
                step_limit: 50,
            }
        );
        assert_eq!(args.episodes, Some(10));
        assert!(args.json);
        assert!(args.verbose);
    }

    #[test]
    fn test_interactive_and_episodes_conflict() {
        assert!(
            Args::try_parse_from(["wumpus-world-run", "--interactive", "--episodes", "3"]).is_err()
        );
    }

    #[test]
    fn test_rejects_non_numeric_size() {
        assert!(Args::try_parse_from(["wumpus-world-run", "--size", "big"]).is_err());
    }

    #[test]
    fn test_summary_counts_outcomes() {
        let reports: Vec<RunReport<i32>> = (1..=10)
            .map(|seed| {
                let config = WorldConfig {
                    seed: Some(seed),
                    ..WorldConfig::default()
                };
                Controller::from_config(&config)
                    .expect("config")
                    .run()
                    .expect("run")
            })
            .collect();
        let summary = EvaluationSummary::from_reports(&reports);
        assert_eq!(summary.episodes, 10);
        assert_eq!(
            summary.died
                + summary.climbed_out_with_gold
                + summary.climbed_out_empty
                + summary.exceeded_step_limit,
            10
        );
        let total: i32 = reports.iter().map(|r| r.score).sum();
        assert!((summary.average_score - f64::from(total) / 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_quitting_is_not_an_error() {
        assert!(matches!(played_to_the_end(Err(WumpusError::Quit)), Ok(None)));
        assert!(matches!(
            played_to_the_end(Err(WumpusError::InputClosed)),
            Err(WumpusError::InputClosed)
        ));

        let agent = HumanAgent::new("d\nq\n".as_bytes(), Vec::new());
        let world = WumpusWorld::initialize(Some(1), 4, 0.2).expect("board");
        let mut controller = Controller::new(world, agent, 10).expect("step limit");
        assert!(matches!(played_to_the_end(controller.run()), Ok(None)));
    }

    #[test]
    fn test_empty_summary() {
        let summary = EvaluationSummary::from_reports(&Vec::<RunReport<i32>>::new());
        assert_eq!(summary, EvaluationSummary::default());
    }
}
