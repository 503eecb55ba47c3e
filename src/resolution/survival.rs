//! Per-unit survival chances
//!
//! Only branches that reach a decision contribute. Pruned and capped mass is
//! unknown, so it counts for no one.

use crate::core::types::{Side, UnitId};
use crate::resolution::battle::Battle;
use crate::roster::RosterState;
use ahash::AHashMap;

#[derive(Debug, Clone, Default)]
pub struct SurvivalAggregator {
    /// (unit, chance) indexed by slot
    friendly: Vec<(UnitId, f64)>,
    enemy: Vec<(UnitId, f64)>,
    index: AHashMap<UnitId, (Side, usize)>,
}

impl SurvivalAggregator {
    pub fn new(battle: &Battle) -> Self {
        let roster = |side: Side| -> Vec<(UnitId, f64)> {
            battle
                .combatants(side)
                .iter()
                .map(|c| (c.unit.id, 0.0))
                .collect()
        };
        let friendly = roster(Side::Attacker);
        let enemy = roster(Side::Defender);
        let index = friendly
            .iter()
            .enumerate()
            .map(|(slot, &(id, _))| (id, (Side::Attacker, slot)))
            .chain(
                enemy
                    .iter()
                    .enumerate()
                    .map(|(slot, &(id, _))| (id, (Side::Defender, slot))),
            )
            .collect();
        Self {
            friendly,
            enemy,
            index,
        }
    }

    fn side(&self, side: Side) -> &[(UnitId, f64)] {
        match side {
            Side::Attacker => &self.friendly,
            Side::Defender => &self.enemy,
        }
    }

    fn side_mut(&mut self, side: Side) -> &mut [(UnitId, f64)] {
        match side {
            Side::Attacker => &mut self.friendly,
            Side::Defender => &mut self.enemy,
        }
    }

    /// Credit every unit alive at the end of a decided branch
    pub fn add(&mut self, probability: f64, state: &RosterState) {
        for side in [Side::Attacker, Side::Defender] {
            let slots: Vec<usize> = state.alive(side).collect();
            let chances = self.side_mut(side);
            for slot in slots {
                chances[slot].1 += probability;
            }
        }
    }

    pub fn merge(&mut self, other: &SurvivalAggregator) {
        for side in [Side::Attacker, Side::Defender] {
            let theirs = other.side(side);
            for (mine, (id, chance)) in self.side_mut(side).iter_mut().zip(theirs) {
                debug_assert_eq!(mine.0, *id, "merging survival for different battles");
                mine.1 += chance;
            }
        }
    }

    pub fn chance(&self, id: UnitId) -> f64 {
        self.index
            .get(&id)
            .map(|&(side, slot)| self.side(side)[slot].1)
            .unwrap_or(0.0)
    }

    pub fn chances(&self, side: Side) -> AHashMap<UnitId, f64> {
        self.side(side).iter().copied().collect()
    }

    pub fn friendly_chances(&self) -> AHashMap<UnitId, f64> {
        self.chances(Side::Attacker)
    }

    pub fn enemy_chances(&self) -> AHashMap<UnitId, f64> {
        self.chances(Side::Defender)
    }

    /// Units whose survival chance is at least `threshold`, in order of loss
    pub fn with_chance(&self, side: Side, threshold: f64) -> Vec<UnitId> {
        self.side(side)
            .iter()
            .filter(|&&(_, chance)| chance >= threshold)
            .map(|&(id, _)| id)
            .collect()
    }

    pub fn friendly_with_chance(&self, threshold: f64) -> Vec<UnitId> {
        self.with_chance(Side::Attacker, threshold)
    }

    pub fn enemy_with_chance(&self, threshold: f64) -> Vec<UnitId> {
        self.with_chance(Side::Defender, threshold)
    }

    /// `(unit, chance)` in order of loss
    pub fn ordered(&self, side: Side) -> &[(UnitId, f64)] {
        self.side(side)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::stats::UnitStats;

    fn battle() -> Battle {
        Battle::from_stats(
            vec![UnitStats::new(1, 2), UnitStats::new(3, 3)],
            vec![UnitStats::new(1, 2)],
        )
        .unwrap()
    }

    #[test]
    fn test_every_unit_starts_at_zero() {
        let battle = battle();
        let survival = SurvivalAggregator::new(&battle);
        assert_eq!(survival.friendly_chances().len(), 2);
        assert_eq!(survival.enemy_chances().len(), 1);
        assert!(survival.friendly_chances().values().all(|&c| c == 0.0));
    }

    #[test]
    fn test_add_credits_survivors_only() {
        let battle = battle();
        let mut survival = SurvivalAggregator::new(&battle);
        let mut state = battle.initial_state();
        state.kill_friendly(0);
        state.kill_enemy(0);
        survival.add(0.25, &state.remove_waiting_to_die());

        let infantry = battle.combatants(Side::Attacker)[0].unit.id;
        let armour = battle.combatants(Side::Attacker)[1].unit.id;
        assert_eq!(survival.chance(infantry), 0.0);
        assert_eq!(survival.chance(armour), 0.25);
        assert_eq!(survival.friendly_with_chance(0.2), vec![armour]);
        assert!(survival.enemy_with_chance(0.01).is_empty());
    }

    #[test]
    fn test_merge_sums_chances() {
        let battle = battle();
        let state = battle.initial_state();
        let mut a = SurvivalAggregator::new(&battle);
        let mut b = SurvivalAggregator::new(&battle);
        a.add(0.1, &state);
        b.add(0.2, &state);
        a.merge(&b);
        let defender = battle.combatants(Side::Defender)[0].unit.id;
        assert!((a.chance(defender) - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_unit_has_no_chance() {
        let survival = SurvivalAggregator::new(&battle());
        assert_eq!(survival.chance(UnitId::new()), 0.0);
    }
}
