//! Fire phases of one combat round
//!
//! A round is anti-air fire (opening rounds only), first-strike fire, then
//! ordinary fire. Within a phase both sides shoot at the roster as it stood
//! when the phase began; casualties are purged before the next phase, so a
//! unit killed by special fire never shoots back.
//!
//! A side's shots in one phase form a [`Volley`], split into target groups:
//! units that cannot reach air, or that die when they score, get their own
//! group so their hits land only where they may.

use crate::core::config::{EngineConfig, PruneMode};
use crate::core::types::Side;
use crate::dice::{roll_data, BinomialCache, RollData};
use crate::resolution::battle::Battle;
use crate::roster::RosterState;
use crate::rules::stats::UnitStats;
use ahash::AHashMap;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    AntiAir,
    FirstStrike,
    Ordinary,
}

impl Phase {
    /// Phases fought in `round` (1-based)
    pub fn sequence(round: u32, config: &EngineConfig) -> &'static [Phase] {
        if round <= config.anti_air_rounds {
            &[Phase::AntiAir, Phase::FirstStrike, Phase::Ordinary]
        } else {
            &[Phase::FirstStrike, Phase::Ordinary]
        }
    }
}

/// Dice that share one set of eligible targets
#[derive(Debug, Clone)]
pub struct TargetGroup {
    pub roll: RollData,
    /// Enemy slots this group may hit, in order of loss
    pub targets: Vec<usize>,
    /// Own slots destroyed one per hit scored
    pub shooters: Vec<usize>,
    /// Hits beyond this are wasted
    pub max_hits: usize,
}

#[derive(Debug, Clone)]
pub struct Volley {
    pub side: Side,
    pub groups: Vec<TargetGroup>,
}

impl Volley {
    fn empty(side: Side) -> Self {
        Self {
            side,
            groups: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Every combination of per-group hit counts with its probability
    pub fn outcomes(&self, cache: &mut BinomialCache) -> Vec<(Vec<usize>, f64)> {
        let mut combos: Vec<(Vec<usize>, f64)> = vec![(Vec::new(), 1.0)];
        for group in &self.groups {
            let dist = cache.hit_probabilities(&group.roll).capped(group.max_hits);
            let mut next = Vec::with_capacity(combos.len() * (dist.max_hits() + 1));
            for (hits, p) in &combos {
                for (h, q) in dist.outcomes() {
                    let mut extended = hits.clone();
                    extended.push(h);
                    next.push((extended, p * q));
                }
            }
            combos = next;
        }
        combos
    }

    /// Assign `hits[i]` hits from group `i` to the enemy in order of loss
    ///
    /// Groups are applied in sequence against the updated roster, so a later
    /// group never wastes hits on a unit an earlier group already finished.
    pub fn apply_hits(&self, state: &mut RosterState, hits: &[usize]) {
        let enemy = self.side.opponent();
        for (group, &count) in self.groups.iter().zip(hits) {
            if count == 0 {
                continue;
            }
            let casualties: Vec<usize> = state
                .multi_hit_targets(enemy, group.targets.iter().copied())
                .take(count)
                .collect();
            for slot in casualties {
                state.hit(enemy, slot);
            }
        }
    }

    /// Destroy one suicide-on-hit shooter per hit it scored
    pub fn apply_suicides(&self, state: &mut RosterState, hits: &[usize]) {
        for (group, &count) in self.groups.iter().zip(hits) {
            for &slot in group.shooters.iter().take(count) {
                state.kill(self.side, slot);
            }
        }
    }
}

fn target_group(
    state: &RosterState,
    enemy: Side,
    roll: RollData,
    targets: Vec<usize>,
    shooters: Vec<usize>,
) -> Option<TargetGroup> {
    if roll.is_empty() || targets.is_empty() {
        return None;
    }
    let max_hits = targets
        .iter()
        .filter_map(|&slot| state.entry(enemy, slot))
        .map(|e| e.remaining() as usize)
        .sum();
    Some(TargetGroup {
        roll,
        targets,
        shooters,
        max_hits,
    })
}

/// Shots `side` takes in `phase` against the current roster
pub fn volley(battle: &Battle, state: &RosterState, side: Side, phase: Phase) -> Volley {
    let enemy = side.opponent();
    let dice_sides = battle.dice_sides();
    let mut volley = Volley::empty(side);

    match phase {
        Phase::AntiAir => {
            let targets: Vec<usize> = state
                .alive(enemy)
                .filter(|&slot| battle.stats(enemy, slot).roles.air)
                .collect();
            let (power, shots) = state
                .alive(side)
                .filter_map(|slot| battle.stats(side, slot).roles.anti_air)
                .fold((0, 0), |(power, shots), aa| {
                    (power.max(aa.power(side)), shots + aa.shots)
                });
            // at most one die per aircraft
            let dice = shots.min(targets.len() as u32);
            if power > 0 && dice > 0 {
                let roll = RollData::from_groups([(power, dice)], dice_sides);
                volley
                    .groups
                    .extend(target_group(state, enemy, roll, targets, Vec::new()));
            }
        }
        Phase::FirstStrike | Phase::Ordinary => {
            let first_strike = phase == Phase::FirstStrike;
            // (reaches air, dies on hit) -> shooters; restricted groups sort first
            let mut shooters: BTreeMap<(bool, bool), Vec<usize>> = BTreeMap::new();
            for slot in state.alive(side) {
                let stats = battle.stats(side, slot);
                if stats.roles.first_strike != first_strike
                    || stats.power(side) == 0
                    || stats.rolls == 0
                {
                    continue;
                }
                shooters
                    .entry((stats.roles.can_target_air, stats.roles.suicide_on_hit))
                    .or_default()
                    .push(slot);
            }

            for ((reaches_air, suicide), slots) in shooters {
                let targets: Vec<usize> = state
                    .alive(enemy)
                    .filter(|&slot| {
                        let stats = battle.stats(enemy, slot);
                        stats.is_combatant() && (reaches_air || !stats.roles.air)
                    })
                    .collect();
                let stats: Vec<&UnitStats> =
                    slots.iter().map(|&slot| battle.stats(side, slot)).collect();
                let roll = roll_data(stats.iter().copied(), side, dice_sides);
                let shooters = if suicide { slots } else { Vec::new() };
                volley
                    .groups
                    .extend(target_group(state, enemy, roll, targets, shooters));
            }
        }
    }
    volley
}

/// Rosters reachable from one roster, with the mass pruning dropped
#[derive(Debug, Clone, Default)]
pub struct Transitions {
    pub outcomes: Vec<(RosterState, f64)>,
    /// Probability of the volley outcomes that were not expanded
    pub pruned: f64,
    pub pruned_count: u64,
}

impl Transitions {
    fn unchanged(state: &RosterState) -> Self {
        Self {
            outcomes: vec![(state.clone(), 1.0)],
            ..Self::default()
        }
    }
}

/// Both sides fire simultaneously; identical resulting rosters are merged
///
/// A side's hit count whose probability is below `prune_below` is not
/// expanded. Its mass, jointly with every outcome of the other side, is
/// reported in [`Transitions::pruned`].
pub fn resolve_phase(
    battle: &Battle,
    state: &RosterState,
    phase: Phase,
    prune_below: f64,
    cache: &mut BinomialCache,
) -> Transitions {
    let attack = volley(battle, state, Side::Attacker, phase);
    let defend = volley(battle, state, Side::Defender, phase);
    if attack.is_empty() && defend.is_empty() {
        return Transitions::unchanged(state);
    }

    let mut transitions = Transitions::default();
    let keep = |outcomes: Vec<(Vec<usize>, f64)>, transitions: &mut Transitions| {
        let (kept, dropped): (Vec<_>, Vec<_>) =
            outcomes.into_iter().partition(|(_, p)| *p >= prune_below);
        let dropped_mass: f64 = dropped.iter().map(|(_, p)| p).sum();
        transitions.pruned_count += dropped.len() as u64;
        (kept, dropped_mass)
    };
    let (attack_outcomes, attack_dropped) = keep(attack.outcomes(cache), &mut transitions);
    let (defend_outcomes, defend_dropped) = keep(defend.outcomes(cache), &mut transitions);
    // inclusion-exclusion over the two sides' dropped mass
    transitions.pruned = attack_dropped + defend_dropped - attack_dropped * defend_dropped;

    let mut merged: AHashMap<RosterState, f64> = AHashMap::new();
    for (attack_hits, pa) in &attack_outcomes {
        for (defend_hits, pd) in &defend_outcomes {
            let mut next = state.clone();
            attack.apply_hits(&mut next, attack_hits);
            defend.apply_hits(&mut next, defend_hits);
            attack.apply_suicides(&mut next, attack_hits);
            defend.apply_suicides(&mut next, defend_hits);
            *merged.entry(next.remove_waiting_to_die()).or_insert(0.0) += pa * pd;
        }
    }
    transitions.outcomes = merged.into_iter().collect();
    transitions
}

/// One full round from `state`: the distribution over rosters at its end
///
/// Rosters that are already decided skip ordinary fire but still take part
/// in special fire, so an anti-air gun shoots even when it is the defender's
/// only unit.
pub fn resolve_round(
    battle: &Battle,
    state: &RosterState,
    round: u32,
    config: &EngineConfig,
    cache: &mut BinomialCache,
) -> Transitions {
    let prune_below = match config.prune_mode {
        PruneMode::Volley => config.prune_threshold,
        PruneMode::Branch => 0.0,
    };

    let mut result = Transitions::unchanged(state);
    for &phase in Phase::sequence(round, config) {
        let mut next: AHashMap<RosterState, f64> = AHashMap::new();
        for (current, p) in result.outcomes.drain(..) {
            if phase == Phase::Ordinary && battle.outcome(&current).is_some() {
                *next.entry(current).or_insert(0.0) += p;
                continue;
            }
            let step = resolve_phase(battle, &current, phase, prune_below, cache);
            result.pruned += p * step.pruned;
            result.pruned_count += step.pruned_count;
            for (child, q) in step.outcomes {
                *next.entry(child).or_insert(0.0) += p * q;
            }
        }
        result.outcomes = next.into_iter().collect();
    }
    result
}
