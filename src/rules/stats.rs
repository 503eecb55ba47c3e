//! Effective unit stats and the resolver boundary
//!
//! Everything the engine knows about a unit's strength arrives through
//! [`StatsResolver`]. Support bonuses, technology, and location effects are
//! already folded in by the time stats reach the outcome tree.

use crate::core::error::Result;
use crate::core::types::Side;
use crate::roster::Unit;
use crate::rules::context::Context;
use serde::{Deserialize, Serialize};

/// Anti-air capability: fires before combat at enemy air units only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AntiAirStats {
    pub attack: u32,
    pub defense: u32,
    /// Dice per round, at most one per targetable air unit
    #[serde(default = "default_shots")]
    pub shots: u32,
}

fn default_shots() -> u32 {
    1
}

impl AntiAirStats {
    pub fn power(&self, side: Side) -> u32 {
        match side {
            Side::Attacker => self.attack,
            Side::Defender => self.defense,
        }
    }
}

/// Role flags that change when and at what a unit fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitRoles {
    pub anti_air: Option<AntiAirStats>,
    /// Fires in the special-fire phase; its casualties cannot return fire
    pub first_strike: bool,
    /// Each hit this unit scores also destroys the unit
    pub suicide_on_hit: bool,
    /// Non-combatant: never targeted by ordinary fire, never keeps a battle going
    pub infrastructure: bool,
    pub air: bool,
    pub can_target_air: bool,
}

impl Default for UnitRoles {
    fn default() -> Self {
        Self {
            anti_air: None,
            first_strike: false,
            suicide_on_hit: false,
            infrastructure: false,
            air: false,
            can_target_air: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitStats {
    pub attack: u32,
    pub defense: u32,
    pub rolls: u32,
    pub hit_points: u32,
    pub dice_sides: u32,
    pub roles: UnitRoles,
}

impl UnitStats {
    /// Single-die, single-hit-point unit on a d6
    pub fn new(attack: u32, defense: u32) -> Self {
        Self {
            attack,
            defense,
            rolls: 1,
            hit_points: 1,
            dice_sides: 6,
            roles: UnitRoles::default(),
        }
    }

    pub fn with_rolls(mut self, rolls: u32) -> Self {
        self.rolls = rolls;
        self
    }

    pub fn with_hit_points(mut self, hit_points: u32) -> Self {
        self.hit_points = hit_points;
        self
    }

    pub fn with_dice_sides(mut self, dice_sides: u32) -> Self {
        self.dice_sides = dice_sides;
        self
    }

    pub fn with_anti_air(mut self, anti_air: AntiAirStats) -> Self {
        self.roles.anti_air = Some(anti_air);
        self
    }

    pub fn first_strike(mut self) -> Self {
        self.roles.first_strike = true;
        self
    }

    pub fn suicide_on_hit(mut self) -> Self {
        self.roles.suicide_on_hit = true;
        self
    }

    pub fn infrastructure(mut self) -> Self {
        self.roles.infrastructure = true;
        self
    }

    pub fn air(mut self) -> Self {
        self.roles.air = true;
        self
    }

    pub fn cannot_target_air(mut self) -> Self {
        self.roles.can_target_air = false;
        self
    }

    /// Hit threshold when fighting on `side`
    pub fn power(&self, side: Side) -> u32 {
        match side {
            Side::Attacker => self.attack,
            Side::Defender => self.defense,
        }
    }

    pub fn is_multi_hit(&self) -> bool {
        self.hit_points > 1
    }

    pub fn is_combatant(&self) -> bool {
        !self.roles.infrastructure
    }

    /// Contract checks run once when a battle is assembled
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.hit_points == 0 {
            return Err("hit_points must be at least 1".into());
        }
        if self.dice_sides == 0 {
            return Err("dice_sides must be at least 1".into());
        }
        Ok(())
    }
}

/// Source of effective stats for a unit in a given context
pub trait StatsResolver {
    fn resolve(&self, unit: &Unit, side: Side, context: &Context) -> Result<UnitStats>;
}

impl<F> StatsResolver for F
where
    F: Fn(&Unit, Side, &Context) -> Result<UnitStats>,
{
    fn resolve(&self, unit: &Unit, side: Side, context: &Context) -> Result<UnitStats> {
        self(unit, side, context)
    }
}
