//! Battle Odds - Entry Point
//!
//! Loads a scenario and its ruleset, computes the odds, and prints a report.

use battle_odds::core::config::{load_config, EngineConfig};
use battle_odds::core::error::{OddsError, Result};
use battle_odds::core::types::Side;
use battle_odds::resolution::{calculate, calculate_parallel, Battle, BattleOdds};
use battle_odds::rules::load_ruleset;
use battle_odds::scenario::load_scenario;
use battle_odds::simulation::{simulate, MonteCarloOdds};

use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

/// Exact win/lose/tie odds for a dice battle
#[derive(Parser, Debug)]
#[command(name = "battle-odds")]
#[command(about = "Compute the odds of a dice battle described by a TOML scenario")]
struct Args {
    /// Scenario file (ruleset, location, attacker and defender stacks)
    scenario: PathBuf,

    /// Engine config file; defaults apply when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output format: json or text
    #[arg(long, default_value = "text")]
    format: String,

    /// Also run this many dice-rolling trials as a cross-check
    #[arg(long)]
    monte_carlo: Option<u32>,

    /// Seed for the dice-rolling trials
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Spread the calculation over all cores
    #[arg(long)]
    parallel: bool,
}

#[derive(Serialize)]
struct UnitSurvival {
    unit_type: String,
    side: Side,
    chance: f64,
}

/// JSON output structure
#[derive(Serialize)]
struct Report {
    location: String,
    odds: BattleOdds,
    survival: Vec<UnitSurvival>,
    #[serde(skip_serializing_if = "Option::is_none")]
    monte_carlo: Option<MonteCarloOdds>,
}

fn survival_rows(battle: &Battle, odds: &BattleOdds) -> Vec<UnitSurvival> {
    [Side::Attacker, Side::Defender]
        .into_iter()
        .flat_map(|side| {
            battle.combatants(side).iter().map(move |c| UnitSurvival {
                unit_type: c.unit.unit_type.clone(),
                side,
                chance: odds.survival().chance(c.unit.id),
            })
        })
        .collect()
}

fn print_text(report: &Report) {
    let odds = &report.odds;
    println!("Battle Odds");
    println!("===========");
    if !report.location.is_empty() {
        println!("Location: {}", report.location);
    }
    println!("Win:  {:>6.2}%", odds.win_probability() * 100.0);
    println!("Lose: {:>6.2}%", odds.lose_probability() * 100.0);
    println!("Tie:  {:>6.2}%", odds.tie_probability() * 100.0);
    println!("Bad:  {:>6.2}%", odds.bad_probability() * 100.0);
    println!();
    println!("Average rounds: {:.2}", odds.average_rounds());
    println!(
        "Average survivors: attacker {:.2}, defender {:.2}",
        odds.average_survivors(Side::Attacker),
        odds.average_survivors(Side::Defender)
    );
    println!(
        "Branches: {} expanded, {} pruned",
        odds.branches_expanded(),
        odds.branches_pruned()
    );
    println!();
    println!("Survival:");
    for row in &report.survival {
        println!("  {:?} {:<16} {:>6.2}%", row.side, row.unit_type, row.chance * 100.0);
    }
    if let Some(mc) = &report.monte_carlo {
        println!();
        println!("Monte Carlo ({} trials):", mc.trials);
        println!(
            "  win {:.2}%  lose {:.2}%  tie {:.2}%  unresolved {:.2}%",
            mc.win * 100.0,
            mc.lose * 100.0,
            mc.tie * 100.0,
            mc.unresolved * 100.0
        );
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "battle_odds=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => EngineConfig::default(),
    };
    config.validate().map_err(OddsError::InvalidConfig)?;

    let scenario = load_scenario(&args.scenario)?;
    let ruleset = Arc::new(load_ruleset(&scenario.ruleset_path(&args.scenario))?);
    tracing::info!(
        "Loaded ruleset '{}' with {} unit types",
        ruleset.name,
        ruleset.unit_types.len()
    );
    let battle = scenario.battle(ruleset)?;

    let odds = if args.parallel {
        calculate_parallel(&battle, &config)
    } else {
        calculate(&battle, &config)
    };
    let monte_carlo = args
        .monte_carlo
        .map(|trials| simulate(&battle, &config, trials, args.seed));

    let report = Report {
        location: scenario.location.clone(),
        survival: survival_rows(&battle, &odds),
        odds,
        monte_carlo,
    };

    match args.format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        "text" => print_text(&report),
        other => {
            tracing::warn!("Unknown format '{}', defaulting to text", other);
            print_text(&report);
        }
    }
    Ok(())
}
