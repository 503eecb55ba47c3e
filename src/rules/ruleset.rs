//! Unit-type definitions and the reference stats resolver

use crate::core::error::{OddsError, Result};
use crate::core::types::Side;
use crate::roster::Unit;
use crate::rules::context::{Context, LocationModifier};
use crate::rules::stats::{AntiAirStats, StatsResolver, UnitRoles, UnitStats};
use ahash::AHashMap;
use serde::Deserialize;

fn one() -> u32 {
    1
}

fn yes() -> bool {
    true
}

fn six() -> u32 {
    6
}

/// Base stats of one unit type as written in a ruleset file
#[derive(Debug, Clone, Deserialize)]
pub struct UnitTypeDef {
    pub attack: u32,
    pub defense: u32,
    #[serde(default = "one")]
    pub rolls: u32,
    #[serde(default = "one")]
    pub hit_points: u32,
    #[serde(default)]
    pub anti_air: Option<AntiAirStats>,
    #[serde(default)]
    pub first_strike: bool,
    #[serde(default)]
    pub suicide_on_hit: bool,
    #[serde(default)]
    pub infrastructure: bool,
    #[serde(default)]
    pub air: bool,
    #[serde(default = "yes")]
    pub can_target_air: bool,
}

impl UnitTypeDef {
    pub fn stats(&self, dice_sides: u32) -> UnitStats {
        UnitStats {
            attack: self.attack,
            defense: self.defense,
            rolls: self.rolls,
            hit_points: self.hit_points,
            dice_sides,
            roles: UnitRoles {
                anti_air: self.anti_air,
                first_strike: self.first_strike,
                suicide_on_hit: self.suicide_on_hit,
                infrastructure: self.infrastructure,
                air: self.air,
                can_target_air: self.can_target_air,
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Ruleset {
    #[serde(default)]
    pub name: String,
    #[serde(default = "six")]
    pub dice_sides: u32,
    #[serde(default)]
    pub unit_types: AHashMap<String, UnitTypeDef>,
    /// Modifiers a scenario may activate by name
    #[serde(default)]
    pub modifiers: Vec<LocationModifier>,
}

impl Default for Ruleset {
    fn default() -> Self {
        Self {
            name: String::new(),
            dice_sides: 6,
            unit_types: AHashMap::new(),
            modifiers: Vec::new(),
        }
    }
}

impl Ruleset {
    pub fn new(name: impl Into<String>, dice_sides: u32) -> Self {
        Self {
            name: name.into(),
            dice_sides,
            ..Self::default()
        }
    }

    pub fn with_unit_type(mut self, name: impl Into<String>, def: UnitTypeDef) -> Self {
        self.unit_types.insert(name.into(), def);
        self
    }

    pub fn unit_type(&self, name: &str) -> Option<&UnitTypeDef> {
        self.unit_types.get(name)
    }

    pub fn modifier(&self, name: &str) -> Option<&LocationModifier> {
        self.modifiers.iter().find(|m| m.name == name)
    }

    pub fn validate(&self) -> Result<()> {
        if self.dice_sides == 0 {
            return Err(OddsError::InvalidConfig(format!(
                "ruleset '{}' needs dice with at least one side",
                self.name
            )));
        }
        for (name, def) in &self.unit_types {
            def.stats(self.dice_sides)
                .validate()
                .map_err(|reason| OddsError::InvalidStats {
                    unit_type: name.clone(),
                    reason,
                })?;
        }
        Ok(())
    }
}

/// Resolves stats from the ruleset carried by the context
///
/// Active location modifiers add flat bonuses; the result is clamped to the
/// die, so a modifier can never make a unit hit on a roll it doesn't have.
#[derive(Debug, Clone, Copy, Default)]
pub struct RulesetResolver;

impl StatsResolver for RulesetResolver {
    fn resolve(&self, unit: &Unit, side: Side, context: &Context) -> Result<UnitStats> {
        let ruleset = &context.ruleset;
        let def = ruleset
            .unit_type(&unit.unit_type)
            .ok_or_else(|| OddsError::UnknownUnitType(unit.unit_type.clone()))?;

        let mut stats = def.stats(ruleset.dice_sides);
        let (attack_bonus, defense_bonus) = context
            .modifiers_for(&unit.unit_type, side)
            .fold((0i64, 0i64), |(a, d), m| {
                (a + m.attack_bonus as i64, d + m.defense_bonus as i64)
            });

        let clamp = |base: u32, bonus: i64| -> u32 {
            (base as i64 + bonus).clamp(0, ruleset.dice_sides as i64) as u32
        };
        stats.attack = clamp(stats.attack, attack_bonus);
        stats.defense = clamp(stats.defense, defense_bonus);
        Ok(stats)
    }
}
