//! A battle ready for resolution: units in order of loss with resolved stats

use crate::core::error::{OddsError, Result};
use crate::core::types::{Outcome, Side};
use crate::roster::{RosterState, Unit};
use crate::rules::context::Context;
use crate::rules::stats::{StatsResolver, UnitStats};

/// A unit together with its effective stats for this battle
#[derive(Debug, Clone)]
pub struct Combatant {
    pub unit: Unit,
    pub stats: UnitStats,
}

#[derive(Debug, Clone)]
pub struct Battle {
    attackers: Vec<Combatant>,
    defenders: Vec<Combatant>,
    dice_sides: u32,
}

impl Battle {
    /// Resolve every unit's stats once; the tree never calls the resolver again
    pub fn new<R: StatsResolver + ?Sized>(
        attackers: Vec<Unit>,
        defenders: Vec<Unit>,
        resolver: &R,
        context: &Context,
    ) -> Result<Self> {
        let resolve_side = |units: Vec<Unit>, side: Side| -> Result<Vec<Combatant>> {
            units
                .into_iter()
                .map(|unit| {
                    let stats = resolver.resolve(&unit, side, context)?;
                    Ok(Combatant { unit, stats })
                })
                .collect()
        };
        let attackers = resolve_side(attackers, Side::Attacker)?;
        let defenders = resolve_side(defenders, Side::Defender)?;
        Self::from_combatants(attackers, defenders)
    }

    /// Build a battle from precomputed stats, one anonymous unit per entry
    pub fn from_stats(attackers: Vec<UnitStats>, defenders: Vec<UnitStats>) -> Result<Self> {
        let wrap = |stats: Vec<UnitStats>, side: Side| -> Vec<Combatant> {
            stats
                .into_iter()
                .map(|stats| Combatant {
                    unit: Unit::new("unit", side),
                    stats,
                })
                .collect()
        };
        Self::from_combatants(wrap(attackers, Side::Attacker), wrap(defenders, Side::Defender))
    }

    pub fn from_combatants(attackers: Vec<Combatant>, defenders: Vec<Combatant>) -> Result<Self> {
        for combatant in attackers.iter().chain(&defenders) {
            combatant
                .stats
                .validate()
                .map_err(|reason| OddsError::InvalidStats {
                    unit_type: combatant.unit.unit_type.clone(),
                    reason,
                })?;
        }

        let mut sides = attackers
            .iter()
            .chain(&defenders)
            .map(|c| c.stats.dice_sides);
        let dice_sides = sides.next().unwrap_or(6);
        if sides.any(|s| s != dice_sides) {
            return Err(OddsError::InvalidScenario(
                "all units in a battle must roll the same dice".into(),
            ));
        }

        Ok(Self {
            attackers,
            defenders,
            dice_sides,
        })
    }

    pub fn combatants(&self, side: Side) -> &[Combatant] {
        match side {
            Side::Attacker => &self.attackers,
            Side::Defender => &self.defenders,
        }
    }

    pub fn stats(&self, side: Side, slot: usize) -> &UnitStats {
        &self.combatants(side)[slot].stats
    }

    pub fn dice_sides(&self) -> u32 {
        self.dice_sides
    }

    /// Opening roster: everyone alive and undamaged
    pub fn initial_state(&self) -> RosterState {
        let capacities = |side: Side| -> Vec<u32> {
            self.combatants(side)
                .iter()
                .map(|c| c.stats.hit_points)
                .collect()
        };
        RosterState::new(&capacities(Side::Attacker), &capacities(Side::Defender))
    }

    /// A side is out of the fight once only infrastructure (or nothing) is left
    pub fn is_eliminated(&self, state: &RosterState, side: Side) -> bool {
        !state
            .alive(side)
            .any(|slot| self.stats(side, slot).is_combatant())
    }

    /// Classify a roster, `None` while both sides can still fight
    ///
    /// The attacker must clear every combat unit to win. When nobody at all is
    /// left the battle is a tie.
    pub fn outcome(&self, state: &RosterState) -> Option<Outcome> {
        let attacker_out = self.is_eliminated(state, Side::Attacker);
        let defender_out = self.is_eliminated(state, Side::Defender);
        if !attacker_out && !defender_out {
            return None;
        }
        if state.no_more_friendlies() && state.no_more_enemies() {
            Some(Outcome::Tie)
        } else if attacker_out {
            Some(Outcome::Lose)
        } else {
            Some(Outcome::Win)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::ruleset::Ruleset;
    use std::sync::Arc;

    #[test]
    fn test_initial_state_uses_hit_points() {
        let battle = Battle::from_stats(
            vec![UnitStats::new(4, 4).with_hit_points(2)],
            vec![UnitStats::new(1, 2), UnitStats::new(1, 2)],
        )
        .unwrap();
        let state = battle.initial_state();
        assert_eq!(state.count_of_friendly_hit_points(), 2);
        assert_eq!(state.count_of_enemy_hit_points(), 2);
    }

    #[test]
    fn test_mixed_dice_rejected() {
        let result = Battle::from_stats(
            vec![UnitStats::new(1, 2)],
            vec![UnitStats::new(1, 2).with_dice_sides(12)],
        );
        assert!(matches!(result, Err(OddsError::InvalidScenario(_))));
    }

    #[test]
    fn test_zero_hit_points_rejected() {
        let result = Battle::from_stats(vec![UnitStats::new(1, 2).with_hit_points(0)], vec![]);
        assert!(matches!(result, Err(OddsError::InvalidStats { .. })));
    }

    #[test]
    fn test_infrastructure_alone_does_not_hold_the_field() {
        let battle = Battle::from_stats(
            vec![UnitStats::new(3, 3)],
            vec![UnitStats::new(0, 0).infrastructure()],
        )
        .unwrap();
        let state = battle.initial_state();
        assert!(battle.is_eliminated(&state, Side::Defender));
        assert_eq!(battle.outcome(&state), Some(Outcome::Win));

        let mut attacker_dead = state.clone();
        attacker_dead.kill_friendly(0);
        assert_eq!(
            battle.outcome(&attacker_dead.remove_waiting_to_die()),
            Some(Outcome::Lose)
        );
    }

    #[test]
    fn test_mutual_destruction_is_tie() {
        let battle =
            Battle::from_stats(vec![UnitStats::new(1, 2)], vec![UnitStats::new(1, 2)]).unwrap();
        let mut state = battle.initial_state();
        assert_eq!(battle.outcome(&state), None);
        state.kill_friendly(0);
        state.kill_enemy(0);
        assert_eq!(battle.outcome(&state.remove_waiting_to_die()), Some(Outcome::Tie));
    }

    #[test]
    fn test_new_propagates_resolver_errors() {
        let context = Context::new(Arc::new(Ruleset::default()), "nowhere");
        let failing = |unit: &Unit, _: Side, _: &Context| -> Result<UnitStats> {
            Err(OddsError::UnknownUnitType(unit.unit_type.clone()))
        };
        let result = Battle::new(
            Unit::create(1, "infantry", Side::Attacker),
            vec![],
            &failing,
            &context,
        );
        assert!(matches!(result, Err(OddsError::UnknownUnitType(_))));
    }
}
