//! Dice-rolling reference calculator
//!
//! Fights the battle many times with real dice through the same fire phases
//! the outcome tree enumerates. Slower and noisy, but independent of the
//! tree's pruning and loop folding, which makes it a cross-check.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::core::config::EngineConfig;
use crate::core::types::{Outcome, Side};
use crate::dice::RollData;
use crate::resolution::battle::Battle;
use crate::resolution::phases::{volley, Phase};
use crate::roster::RosterState;

/// Observed outcome frequencies over `trials` fights
#[derive(Debug, Clone, Serialize)]
pub struct MonteCarloOdds {
    pub trials: u32,
    pub win: f64,
    pub lose: f64,
    pub tie: f64,
    /// Fights still undecided at the round cap
    pub unresolved: f64,
    /// Mean rounds over decided fights
    pub average_rounds: f64,
}

fn roll_hits(roll: &RollData, rng: &mut ChaCha8Rng) -> usize {
    roll.groups()
        .map(|(power, rolls)| {
            (0..rolls)
                .filter(|_| rng.gen_range(1..=roll.dice_sides) <= power)
                .count()
        })
        .sum()
}

fn fight_phase(
    battle: &Battle,
    state: &RosterState,
    phase: Phase,
    rng: &mut ChaCha8Rng,
) -> RosterState {
    let volleys = [
        volley(battle, state, Side::Attacker, phase),
        volley(battle, state, Side::Defender, phase),
    ];
    let hits: Vec<Vec<usize>> = volleys
        .iter()
        .map(|v| {
            v.groups
                .iter()
                .map(|g| roll_hits(&g.roll, rng).min(g.max_hits))
                .collect()
        })
        .collect();

    let mut next = state.clone();
    for (v, h) in volleys.iter().zip(&hits) {
        v.apply_hits(&mut next, h);
    }
    for (v, h) in volleys.iter().zip(&hits) {
        v.apply_suicides(&mut next, h);
    }
    next.remove_waiting_to_die()
}

/// Fight once; `None` if the round cap is reached first
fn fight(battle: &Battle, config: &EngineConfig, rng: &mut ChaCha8Rng) -> (Option<Outcome>, u32) {
    let mut state = battle.initial_state();
    for round in 1..=config.max_rounds {
        for &phase in Phase::sequence(round, config) {
            if phase == Phase::Ordinary && battle.outcome(&state).is_some() {
                break;
            }
            state = fight_phase(battle, &state, phase, rng);
        }
        if let Some(outcome) = battle.outcome(&state) {
            return (Some(outcome), round);
        }
    }
    (None, config.max_rounds)
}

/// Run `trials` seeded fights of `battle`
pub fn simulate(battle: &Battle, config: &EngineConfig, trials: u32, seed: u64) -> MonteCarloOdds {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let (mut win, mut lose, mut tie, mut unresolved) = (0u32, 0u32, 0u32, 0u32);
    let mut decided_rounds = 0u64;

    for _ in 0..trials {
        match fight(battle, config, &mut rng) {
            (Some(outcome), rounds) => {
                decided_rounds += rounds as u64;
                match outcome {
                    Outcome::Win => win += 1,
                    Outcome::Lose => lose += 1,
                    Outcome::Tie => tie += 1,
                }
            }
            (None, _) => unresolved += 1,
        }
    }

    let frequency = |count: u32| {
        if trials == 0 {
            0.0
        } else {
            count as f64 / trials as f64
        }
    };
    let decided = win + lose + tie;
    let odds = MonteCarloOdds {
        trials,
        win: frequency(win),
        lose: frequency(lose),
        tie: frequency(tie),
        unresolved: frequency(unresolved),
        average_rounds: if decided == 0 {
            0.0
        } else {
            decided_rounds as f64 / decided as f64
        },
    };
    tracing::debug!(
        "Monte Carlo over {} trials: win {:.4} lose {:.4} tie {:.4}",
        trials,
        odds.win,
        odds.lose,
        odds.tie
    );
    odds
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolution::tree::calculate;
    use crate::rules::stats::UnitStats;

    #[test]
    fn test_same_seed_same_result() {
        let battle =
            Battle::from_stats(vec![UnitStats::new(1, 2); 3], vec![UnitStats::new(1, 2); 2])
                .unwrap();
        let config = EngineConfig::default();
        let a = simulate(&battle, &config, 500, 7);
        let b = simulate(&battle, &config, 500, 7);
        assert_eq!(a.win, b.win);
        assert_eq!(a.lose, b.lose);
    }

    #[test]
    fn test_agrees_with_tree_on_small_battle() {
        let battle =
            Battle::from_stats(vec![UnitStats::new(3, 3)], vec![UnitStats::new(1, 2)]).unwrap();
        let config = EngineConfig::default();
        let tree = calculate(&battle, &config);
        let mc = simulate(&battle, &config, 20_000, 42);
        assert!((mc.win - tree.win_probability()).abs() < 0.02);
        assert!((mc.lose - tree.lose_probability()).abs() < 0.02);
        assert!((mc.tie - tree.tie_probability()).abs() < 0.02);
    }

    #[test]
    fn test_hopeless_battle_never_resolves() {
        let battle =
            Battle::from_stats(vec![UnitStats::new(0, 0)], vec![UnitStats::new(0, 0)]).unwrap();
        let mc = simulate(&battle, &EngineConfig::default(), 10, 1);
        assert_eq!(mc.unresolved, 1.0);
        assert_eq!(mc.average_rounds, 0.0);
    }
}
