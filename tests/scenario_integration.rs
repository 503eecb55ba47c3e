//! Scenario files end to end
//!
//! Loads the shipped ruleset and scenario, computes the odds, and checks
//! them against dice-rolling trials.

use battle_odds::core::config::{load_config, EngineConfig, PruneMode};
use battle_odds::core::types::Side;
use battle_odds::resolution::{calculate, calculate_parallel};
use battle_odds::rules::load_ruleset;
use battle_odds::scenario::{load_scenario, parse_scenario};
use battle_odds::simulation::simulate;
use std::path::{Path, PathBuf};
use std::sync::Arc;

fn data(file: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("data").join(file)
}

#[test]
fn test_classic_ruleset_loads() {
    let ruleset = load_ruleset(&data("classic.toml")).unwrap();
    assert_eq!(ruleset.dice_sides, 6);
    let battleship = ruleset.unit_type("battleship").unwrap().stats(6);
    assert_eq!(battleship.hit_points, 2);
    let aa = ruleset.unit_type("aa_gun").unwrap().stats(6);
    assert!(aa.roles.infrastructure);
    assert!(aa.roles.anti_air.is_some());
    assert!(ruleset.modifier("mountains").is_some());
}

#[test]
fn test_engine_config_loads() {
    let config = load_config(&data("engine.toml")).unwrap();
    assert_eq!(config.prune_mode, PruneMode::Volley);
    assert_eq!(config.max_rounds, 16);
    assert!(config.validate().is_ok());
}

#[test]
fn test_karelia_odds_are_consistent() {
    let path = data("karelia.toml");
    let scenario = load_scenario(&path).unwrap();
    let ruleset = Arc::new(load_ruleset(&scenario.ruleset_path(&path)).unwrap());
    let battle = scenario.battle(ruleset).unwrap();
    assert_eq!(battle.combatants(Side::Attacker).len(), 7);
    assert_eq!(battle.combatants(Side::Defender).len(), 6);

    let config = EngineConfig::default();
    let odds = calculate(&battle, &config);
    assert!((odds.total() - 1.0).abs() < 1e-3);
    assert!(odds.bad_probability() < 0.05);

    let parallel = calculate_parallel(&battle, &config);
    assert!((parallel.win_probability() - odds.win_probability()).abs() < 1e-9);

    let mc = simulate(&battle, &config, 20_000, 42);
    let slack = 0.02 + odds.bad_probability();
    assert!((mc.win - odds.win_probability()).abs() < slack);
    assert!((mc.lose - odds.lose_probability()).abs() < slack);
    assert!((mc.tie - odds.tie_probability()).abs() < slack);
}

#[test]
fn test_mountains_favour_the_defender() {
    let ruleset_path = data("classic.toml");
    let ruleset = Arc::new(load_ruleset(&ruleset_path).unwrap());
    let open = format!(
        "ruleset = {:?}\n[[attackers]]\ntype = \"infantry\"\ncount = 3\n[[defenders]]\ntype = \"infantry\"\ncount = 2\n",
        ruleset_path
    );
    let mountains = format!("modifiers = [\"mountains\"]\n{open}");

    let config = EngineConfig::default();
    let plain = parse_scenario(&open).unwrap().battle(ruleset.clone()).unwrap();
    let uphill = parse_scenario(&mountains).unwrap().battle(ruleset).unwrap();
    assert!(
        calculate(&uphill, &config).win_probability() < calculate(&plain, &config).win_probability()
    );
}
