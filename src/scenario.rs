//! Battle scenarios loaded from TOML
//!
//! A scenario names a ruleset file, where the battle is fought, which of the
//! ruleset's modifiers are active, and each side's stacks in order of loss.

use crate::core::error::{OddsError, Result};
use crate::core::types::Side;
use crate::resolution::Battle;
use crate::roster::Unit;
use crate::rules::{Context, Ruleset, RulesetResolver};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// `count` units of one type
#[derive(Debug, Clone, Deserialize)]
pub struct Stack {
    #[serde(rename = "type")]
    pub unit_type: String,
    #[serde(default = "one")]
    pub count: usize,
}

fn one() -> usize {
    1
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    /// Ruleset file, relative to the scenario file
    pub ruleset: PathBuf,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub modifiers: Vec<String>,
    #[serde(default)]
    pub attackers: Vec<Stack>,
    #[serde(default)]
    pub defenders: Vec<Stack>,
}

impl Scenario {
    pub fn stacks(&self, side: Side) -> &[Stack] {
        match side {
            Side::Attacker => &self.attackers,
            Side::Defender => &self.defenders,
        }
    }

    /// Fresh units for one side, in order of loss
    pub fn units(&self, side: Side) -> Vec<Unit> {
        self.stacks(side)
            .iter()
            .flat_map(|stack| Unit::create(stack.count, &stack.unit_type, side))
            .collect()
    }

    /// Context with the named modifiers looked up in `ruleset`
    pub fn context(&self, ruleset: Arc<Ruleset>) -> Result<Context> {
        let modifiers = self
            .modifiers
            .iter()
            .map(|name| {
                ruleset.modifier(name).cloned().ok_or_else(|| {
                    OddsError::InvalidScenario(format!("unknown modifier '{name}'"))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let mut context = Context::new(ruleset, self.location.clone());
        context.modifiers = modifiers;
        Ok(context)
    }

    pub fn battle(&self, ruleset: Arc<Ruleset>) -> Result<Battle> {
        let context = self.context(ruleset)?;
        Battle::new(
            self.units(Side::Attacker),
            self.units(Side::Defender),
            &RulesetResolver,
            &context,
        )
    }

    /// Ruleset path resolved against the directory holding the scenario
    pub fn ruleset_path(&self, scenario_path: &Path) -> PathBuf {
        match scenario_path.parent() {
            Some(dir) if self.ruleset.is_relative() => dir.join(&self.ruleset),
            _ => self.ruleset.clone(),
        }
    }
}

pub fn parse_scenario(content: &str) -> Result<Scenario> {
    let scenario: Scenario = toml::from_str(content)?;
    if scenario.attackers.iter().all(|s| s.count == 0) {
        return Err(OddsError::InvalidScenario("no attacking units".into()));
    }
    Ok(scenario)
}

pub fn load_scenario(path: &Path) -> Result<Scenario> {
    let content = fs::read_to_string(path)?;
    parse_scenario(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::parse_ruleset;

    const RULESET: &str = r#"
[unit_types.infantry]
attack = 1
defense = 2

[unit_types.armour]
attack = 3
defense = 3

[[modifiers]]
name = "entrenched"
side = "defender"
defense_bonus = 1
"#;

    const SCENARIO: &str = r#"
ruleset = "classic.toml"
location = "ridge"
modifiers = ["entrenched"]

[[attackers]]
type = "infantry"
count = 2

[[attackers]]
type = "armour"

[[defenders]]
type = "infantry"
count = 2
"#;

    #[test]
    fn test_units_follow_stack_order() {
        let scenario = parse_scenario(SCENARIO).unwrap();
        let attackers = scenario.units(Side::Attacker);
        let types: Vec<&str> = attackers.iter().map(|u| u.unit_type.as_str()).collect();
        assert_eq!(types, vec!["infantry", "infantry", "armour"]);
    }

    #[test]
    fn test_battle_applies_active_modifiers() {
        let scenario = parse_scenario(SCENARIO).unwrap();
        let ruleset = Arc::new(parse_ruleset(RULESET).unwrap());
        let battle = scenario.battle(ruleset).unwrap();
        assert_eq!(battle.stats(Side::Defender, 0).defense, 3);
        assert_eq!(battle.stats(Side::Attacker, 0).attack, 1);
    }

    #[test]
    fn test_unknown_modifier_rejected() {
        let mut scenario = parse_scenario(SCENARIO).unwrap();
        scenario.modifiers.push("fog".into());
        let ruleset = Arc::new(parse_ruleset(RULESET).unwrap());
        assert!(matches!(
            scenario.context(ruleset),
            Err(OddsError::InvalidScenario(_))
        ));
    }

    #[test]
    fn test_ruleset_path_is_relative_to_scenario() {
        let scenario = parse_scenario(SCENARIO).unwrap();
        let path = scenario.ruleset_path(Path::new("data/scenarios/ridge.toml"));
        assert_eq!(path, PathBuf::from("data/scenarios/classic.toml"));
    }

    #[test]
    fn test_scenario_needs_attackers() {
        let err = parse_scenario("ruleset = \"classic.toml\"\n").unwrap_err();
        assert!(matches!(err, OddsError::InvalidScenario(_)));
    }
}
