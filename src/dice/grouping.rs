//! Grouping dice by hit threshold

use crate::core::types::Side;
use crate::rules::stats::UnitStats;
use std::collections::BTreeMap;

/// Dice for one volley, grouped by the value a die must roll at or under to hit
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RollData {
    pub rolls_by_power: BTreeMap<u32, u32>,
    pub dice_sides: u32,
}

impl RollData {
    pub fn new(dice_sides: u32) -> Self {
        debug_assert!(dice_sides > 0, "dice need at least one side");
        Self {
            rolls_by_power: BTreeMap::new(),
            dice_sides,
        }
    }

    pub fn from_groups<I>(groups: I, dice_sides: u32) -> Self
    where
        I: IntoIterator<Item = (u32, u32)>,
    {
        let mut roll = Self::new(dice_sides);
        for (power, rolls) in groups {
            roll.add(power, rolls);
        }
        roll
    }

    /// Add `rolls` dice hitting on `power`; power is clamped to the die size
    pub fn add(&mut self, power: u32, rolls: u32) {
        if rolls == 0 {
            return;
        }
        *self
            .rolls_by_power
            .entry(power.min(self.dice_sides))
            .or_insert(0) += rolls;
    }

    /// `(power, rolls)` pairs, weakest first
    pub fn groups(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.rolls_by_power.iter().map(|(&power, &rolls)| (power, rolls))
    }

    pub fn total_rolls(&self) -> u32 {
        self.rolls_by_power.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.rolls_by_power.is_empty()
    }

    pub fn hit_chance(&self, power: u32) -> f64 {
        power.min(self.dice_sides) as f64 / self.dice_sides as f64
    }
}

/// Group firing units' dice by their power on `side`
///
/// Units with no power roll nothing and are left out.
pub fn dice_grouped<'a, I>(units: I, side: Side) -> BTreeMap<u32, u32>
where
    I: IntoIterator<Item = &'a UnitStats>,
{
    let mut grouped = BTreeMap::new();
    for stats in units {
        let power = stats.power(side).min(stats.dice_sides);
        if power == 0 || stats.rolls == 0 {
            continue;
        }
        *grouped.entry(power).or_insert(0) += stats.rolls;
    }
    grouped
}

/// [`dice_grouped`] packaged as a [`RollData`]
pub fn roll_data<'a, I>(units: I, side: Side, dice_sides: u32) -> RollData
where
    I: IntoIterator<Item = &'a UnitStats>,
{
    RollData {
        rolls_by_power: dice_grouped(units, side),
        dice_sides,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_groups_by_power_for_side() {
        let infantry = UnitStats::new(1, 2);
        let armour = UnitStats::new(3, 3);
        let units = [infantry.clone(), infantry, armour];

        let attacking = dice_grouped(units.iter(), Side::Attacker);
        assert_eq!(attacking, BTreeMap::from([(1, 2), (3, 1)]));

        let defending = dice_grouped(units.iter(), Side::Defender);
        assert_eq!(defending, BTreeMap::from([(2, 2), (3, 1)]));
    }

    #[test]
    fn test_zero_power_units_roll_nothing() {
        let aa_gun = UnitStats::new(0, 0);
        let grouped = dice_grouped([&aa_gun], Side::Defender);
        assert!(grouped.is_empty());
    }

    #[test]
    fn test_extra_rolls_are_counted() {
        let bomber = UnitStats::new(4, 1).with_rolls(2);
        let roll = roll_data([&bomber], Side::Attacker, 6);
        assert_eq!(roll.total_rolls(), 2);
    }

    #[test]
    fn test_power_clamped_to_die() {
        let mut roll = RollData::new(6);
        roll.add(9, 1);
        roll.add(6, 1);
        assert_eq!(roll.groups().collect::<Vec<_>>(), vec![(6, 2)]);
        assert_eq!(roll.hit_chance(6), 1.0);
    }
}
