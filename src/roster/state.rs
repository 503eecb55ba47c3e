//! Per-branch roster state
//!
//! Tracks who is alive, damaged, or dead on each side for one branch of the
//! outcome tree. "Friendly" is always the attacker and "enemy" the defender.
//!
//! Units are referred to by slot: their index in the battle's original order
//! of loss for that side. Entries stay sorted by slot, so removal preserves
//! order of loss and lookups can binary search.
//!
//! Hits never remove a unit. A unit whose damage reaches its capacity is
//! "waiting to die" and stays visible until `remove_waiting_to_die` produces
//! the next state.

use crate::core::types::Side;

/// One unit occurrence in a branch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RosterEntry {
    pub slot: usize,
    pub hit_points: u32,
    pub damage: u32,
}

impl RosterEntry {
    pub fn new(slot: usize, hit_points: u32) -> Self {
        debug_assert!(hit_points >= 1, "unit in slot {slot} has no hit points");
        Self {
            slot,
            hit_points,
            damage: 0,
        }
    }

    pub fn remaining(&self) -> u32 {
        self.hit_points - self.damage
    }

    pub fn is_dead(&self) -> bool {
        self.damage >= self.hit_points
    }

    pub fn is_damaged(&self) -> bool {
        self.damage > 0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct RosterState {
    friendly: Vec<RosterEntry>,
    enemy: Vec<RosterEntry>,
}

impl RosterState {
    /// Build the opening state from each side's hit-point capacities in order of loss
    pub fn new(friendly_capacities: &[u32], enemy_capacities: &[u32]) -> Self {
        let entries = |caps: &[u32]| {
            caps.iter()
                .enumerate()
                .map(|(slot, &hp)| RosterEntry::new(slot, hp))
                .collect()
        };
        Self {
            friendly: entries(friendly_capacities),
            enemy: entries(enemy_capacities),
        }
    }

    pub fn entries(&self, side: Side) -> &[RosterEntry] {
        match side {
            Side::Attacker => &self.friendly,
            Side::Defender => &self.enemy,
        }
    }

    fn entries_mut(&mut self, side: Side) -> &mut Vec<RosterEntry> {
        match side {
            Side::Attacker => &mut self.friendly,
            Side::Defender => &mut self.enemy,
        }
    }

    pub fn entry(&self, side: Side, slot: usize) -> Option<&RosterEntry> {
        let entries = self.entries(side);
        entries
            .binary_search_by_key(&slot, |e| e.slot)
            .ok()
            .map(|idx| &entries[idx])
    }

    fn entry_mut(&mut self, side: Side, slot: usize) -> &mut RosterEntry {
        let entries = self.entries_mut(side);
        match entries.binary_search_by_key(&slot, |e| e.slot) {
            Ok(idx) => &mut entries[idx],
            Err(_) => panic!("slot {slot} is not on the {side:?} roster"),
        }
    }

    /// Damage recorded against a unit, `None` once it has been removed
    pub fn damage(&self, side: Side, slot: usize) -> Option<u32> {
        self.entry(side, slot).map(|e| e.damage)
    }

    /// Record one hit, capped at the unit's capacity
    pub fn hit(&mut self, side: Side, slot: usize) {
        let entry = self.entry_mut(side, slot);
        if entry.damage < entry.hit_points {
            entry.damage += 1;
        }
    }

    /// Mark a unit dead regardless of remaining hit points
    pub fn kill(&mut self, side: Side, slot: usize) {
        let entry = self.entry_mut(side, slot);
        entry.damage = entry.hit_points;
    }

    pub fn hit_friendly(&mut self, slot: usize) {
        self.hit(Side::Attacker, slot);
    }

    pub fn hit_enemy(&mut self, slot: usize) {
        self.hit(Side::Defender, slot);
    }

    pub fn kill_friendly(&mut self, slot: usize) {
        self.kill(Side::Attacker, slot);
    }

    pub fn kill_enemy(&mut self, slot: usize) {
        self.kill(Side::Defender, slot);
    }

    /// New state with every dead unit purged from both sides
    pub fn remove_waiting_to_die(&self) -> RosterState {
        if !self.has_waiting_to_die() {
            return self.clone();
        }
        let survivors = |entries: &[RosterEntry]| {
            entries.iter().filter(|e| !e.is_dead()).copied().collect()
        };
        RosterState {
            friendly: survivors(&self.friendly),
            enemy: survivors(&self.enemy),
        }
    }

    pub fn has_waiting_to_die(&self) -> bool {
        self.friendly.iter().chain(&self.enemy).any(RosterEntry::is_dead)
    }

    /// Slots of units not yet dead, in order of loss
    pub fn alive(&self, side: Side) -> impl Iterator<Item = usize> + '_ {
        self.entries(side)
            .iter()
            .filter(|e| !e.is_dead())
            .map(|e| e.slot)
    }

    pub fn no_more(&self, side: Side) -> bool {
        self.entries(side).iter().all(RosterEntry::is_dead)
    }

    pub fn no_more_friendlies(&self) -> bool {
        self.no_more(Side::Attacker)
    }

    pub fn no_more_enemies(&self) -> bool {
        self.no_more(Side::Defender)
    }

    pub fn count_not_damaged_or_dead(&self, side: Side) -> usize {
        self.entries(side).iter().filter(|e| !e.is_damaged()).count()
    }

    pub fn count_of_friendlies_not_damaged_or_dead(&self) -> usize {
        self.count_not_damaged_or_dead(Side::Attacker)
    }

    pub fn count_of_enemies_not_damaged_or_dead(&self) -> usize {
        self.count_not_damaged_or_dead(Side::Defender)
    }

    /// Hits the side can still absorb
    pub fn count_hit_points(&self, side: Side) -> u32 {
        self.entries(side).iter().map(RosterEntry::remaining).sum()
    }

    pub fn count_of_friendly_hit_points(&self) -> u32 {
        self.count_hit_points(Side::Attacker)
    }

    pub fn count_of_enemy_hit_points(&self) -> u32 {
        self.count_hit_points(Side::Defender)
    }

    /// Casualty sequence for `slots`: each unit repeated once per remaining hit point
    ///
    /// Assigning hits in this order stacks damage onto a partially damaged
    /// multi-hit unit before moving on to the next unit in order of loss.
    pub fn multi_hit_targets<I>(&self, side: Side, slots: I) -> MultiHitTargets<'_, I::IntoIter>
    where
        I: IntoIterator<Item = usize>,
    {
        MultiHitTargets {
            entries: self.entries(side),
            slots: slots.into_iter(),
            current: None,
        }
    }

    pub fn add_friendly_multi_hit_targets<I>(&self, slots: I) -> MultiHitTargets<'_, I::IntoIter>
    where
        I: IntoIterator<Item = usize>,
    {
        self.multi_hit_targets(Side::Attacker, slots)
    }

    pub fn add_enemy_multi_hit_targets<I>(&self, slots: I) -> MultiHitTargets<'_, I::IntoIter>
    where
        I: IntoIterator<Item = usize>,
    {
        self.multi_hit_targets(Side::Defender, slots)
    }
}

/// Lazy casualty sequence produced by [`RosterState::multi_hit_targets`]
#[derive(Debug, Clone)]
pub struct MultiHitTargets<'a, I> {
    entries: &'a [RosterEntry],
    slots: I,
    current: Option<(usize, u32)>,
}

impl<I: Iterator<Item = usize>> Iterator for MultiHitTargets<'_, I> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        loop {
            if let Some((slot, left)) = self.current {
                if left > 0 {
                    self.current = Some((slot, left - 1));
                    return Some(slot);
                }
            }
            let slot = self.slots.next()?;
            let remaining = self
                .entries
                .binary_search_by_key(&slot, |e| e.slot)
                .map(|idx| self.entries[idx].remaining())
                .unwrap_or(0);
            self.current = Some((slot, remaining));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multi_hit_unit_needs_every_hit_point() {
        let mut state = RosterState::new(&[2], &[1]);
        assert_eq!(state.count_of_friendly_hit_points(), 2);

        state.hit_friendly(0);
        assert_eq!(state.count_of_friendly_hit_points(), 1);
        assert_eq!(state.remove_waiting_to_die().entries(Side::Attacker).len(), 1);

        state.hit_friendly(0);
        assert_eq!(state.count_of_friendly_hit_points(), 0);
        assert!(state.no_more_friendlies());
        assert!(state.remove_waiting_to_die().entries(Side::Attacker).is_empty());
    }

    #[test]
    fn test_hits_are_capped_at_capacity() {
        let mut state = RosterState::new(&[1], &[]);
        state.hit_friendly(0);
        state.hit_friendly(0);
        assert_eq!(state.damage(Side::Attacker, 0), Some(1));
    }

    #[test]
    fn test_waiting_to_die_stays_visible_until_removed() {
        let mut state = RosterState::new(&[1, 1], &[1]);
        state.hit_friendly(0);
        assert_eq!(state.entries(Side::Attacker).len(), 2);
        assert!(state.has_waiting_to_die());
        assert_eq!(state.alive(Side::Attacker).collect::<Vec<_>>(), vec![1]);

        let next = state.remove_waiting_to_die();
        assert_eq!(next.entries(Side::Attacker).len(), 1);
        assert_eq!(next.entries(Side::Attacker)[0].slot, 1);
        assert!(!next.has_waiting_to_die());
    }

    #[test]
    fn test_remove_preserves_order_of_loss() {
        let mut state = RosterState::new(&[1, 1, 1, 1], &[1, 1]);
        state.hit_friendly(1);
        state.hit_enemy(0);
        let next = state.remove_waiting_to_die();
        let slots: Vec<_> = next.alive(Side::Attacker).collect();
        assert_eq!(slots, vec![0, 2, 3]);
        assert_eq!(next.alive(Side::Defender).collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn test_counts_not_damaged() {
        let mut state = RosterState::new(&[2, 1], &[1, 1, 1]);
        state.hit_friendly(0);
        state.hit_enemy(2);
        assert_eq!(state.count_of_friendlies_not_damaged_or_dead(), 1);
        assert_eq!(state.count_of_enemies_not_damaged_or_dead(), 2);
        assert_eq!(state.count_of_enemy_hit_points(), 2);
    }

    #[test]
    fn test_multi_hit_targets_expand_remaining_capacity() {
        let mut state = RosterState::new(&[1, 2], &[]);
        let targets: Vec<_> = state.add_friendly_multi_hit_targets([0, 1]).collect();
        assert_eq!(targets, vec![0, 1, 1]);

        state.hit_friendly(1);
        let targets: Vec<_> = state.add_friendly_multi_hit_targets([0, 1]).collect();
        assert_eq!(targets, vec![0, 1]);
    }

    #[test]
    fn test_multi_hit_targets_are_lazy() {
        let state = RosterState::new(&[], &[3, 3, 3]);
        let first_four: Vec<_> = state.add_enemy_multi_hit_targets(0..3).take(4).collect();
        assert_eq!(first_four, vec![0, 0, 0, 1]);
    }

    #[test]
    fn test_kill_ignores_remaining_hit_points() {
        let mut state = RosterState::new(&[], &[3]);
        state.kill_enemy(0);
        assert!(state.no_more_enemies());
    }

    #[test]
    fn test_states_compare_by_value() {
        let mut a = RosterState::new(&[1, 2], &[1]);
        let mut b = RosterState::new(&[1, 2], &[1]);
        assert_eq!(a, b);
        a.hit_friendly(1);
        assert_ne!(a, b);
        b.hit_friendly(1);
        assert_eq!(a, b);
    }

    #[test]
    #[should_panic]
    fn test_hitting_unknown_slot_is_a_contract_violation() {
        let mut state = RosterState::new(&[1], &[1]);
        state.hit_enemy(5);
    }
}
