//! Outcome-tree traversal
//!
//! The tree is walked one round at a time. The work-list for a round is the
//! set of distinct rosters still fighting, each carrying the absolute
//! probability of reaching it; branches that arrive at the same roster by
//! different paths are merged. Expanding a roster resolves one round and
//! either settles each child (win/lose/tie), drops it into `bad` (pruned,
//! stalemated, or past the round cap), or adds it to the next round's list.
//! Nothing is accumulated bottom-up, so win + lose + tie + bad equals 1 up to
//! floating-point error.
//!
//! A round in which nobody is hit leads back to the same roster. Past the
//! anti-air rounds that self-loop is folded away in closed form: the other
//! children are scaled by 1 / (1 - q), where q is the loop probability.

use crate::core::config::{EngineConfig, PruneMode};
use crate::dice::BinomialCache;
use crate::resolution::battle::Battle;
use crate::resolution::outcome::{BattleOdds, OutcomeAccumulator};
use crate::resolution::phases::resolve_round;
use crate::roster::RosterState;
use ahash::AHashMap;
use rayon::prelude::*;

/// Loop probability treated as certain: no one can ever be hit
const STALEMATE_EPSILON: f64 = 1e-12;

/// Probability mass sitting on one roster at the start of a round
#[derive(Debug, Clone, Copy, Default)]
struct Branch {
    probability: f64,
    /// Sum over merged paths of probability times rounds fought so far
    weighted_rounds: f64,
}

impl Branch {
    fn add(&mut self, probability: f64, rounds: f64) {
        self.probability += probability;
        self.weighted_rounds += probability * rounds;
    }

    fn rounds(&self) -> f64 {
        if self.probability > 0.0 {
            self.weighted_rounds / self.probability
        } else {
            0.0
        }
    }
}

type Frontier = AHashMap<RosterState, Branch>;

/// What expanding part of a round produced
struct Layer {
    acc: OutcomeAccumulator,
    next: Frontier,
}

impl Layer {
    fn new(battle: &Battle) -> Self {
        Self {
            acc: OutcomeAccumulator::new(battle),
            next: Frontier::new(),
        }
    }

    fn merge(mut self, other: Layer) -> Layer {
        self.acc.merge(&other.acc);
        for (state, branch) in other.next {
            self.next
                .entry(state)
                .or_default()
                .add(branch.probability, branch.rounds());
        }
        self
    }
}

/// Resolve one round from `state`, settling or forwarding every child
fn expand(
    battle: &Battle,
    config: &EngineConfig,
    round: u32,
    state: RosterState,
    branch: Branch,
    cache: &mut BinomialCache,
    layer: &mut Layer,
) {
    layer.acc.record_expansion();
    let mut transitions = resolve_round(battle, &state, round, config, cache);

    let mut scale = 1.0;
    let mut loop_rounds = 0.0;
    // a decided roster only sees special fire and is settled below, never looped
    let decided = battle.outcome(&state).is_some();
    if round > config.anti_air_rounds && !decided {
        let stay = transitions
            .outcomes
            .iter()
            .find(|(child, _)| *child == state)
            .map(|&(_, q)| q);
        if let Some(q) = stay {
            if q >= 1.0 - STALEMATE_EPSILON {
                tracing::trace!(
                    "Stalemate at round {} with probability {:.6}",
                    round,
                    branch.probability
                );
                layer.acc.add_stalemate(branch.probability);
                return;
            }
            scale = 1.0 / (1.0 - q);
            loop_rounds = q / (1.0 - q);
            transitions.outcomes.retain(|(child, _)| *child != state);
        }
    }

    if transitions.pruned > 0.0 {
        tracing::trace!(
            "Pruned {} volley outcomes at round {}",
            transitions.pruned_count,
            round
        );
        layer.acc.add_pruned(
            branch.probability * transitions.pruned * scale,
            transitions.pruned_count,
        );
    }

    let rounds = branch.rounds() + 1.0 + loop_rounds;
    for (child, p) in transitions.outcomes {
        let probability = branch.probability * p * scale;
        match battle.outcome(&child) {
            Some(outcome) => layer.acc.add_terminal(outcome, probability, &child, rounds),
            None => layer.next.entry(child).or_default().add(probability, rounds),
        }
    }
}

fn expand_sequential(
    battle: &Battle,
    config: &EngineConfig,
    round: u32,
    frontier: Frontier,
    cache: &mut BinomialCache,
) -> Layer {
    let mut layer = Layer::new(battle);
    for (state, branch) in frontier {
        expand(battle, config, round, state, branch, cache, &mut layer);
    }
    layer
}

fn expand_parallel(
    battle: &Battle,
    config: &EngineConfig,
    round: u32,
    frontier: Frontier,
) -> Layer {
    // PARALLEL: rosters in one round are independent; each worker keeps its own cache
    let work: Vec<(RosterState, Branch)> = frontier.into_iter().collect();
    work.into_par_iter()
        .fold(
            || (BinomialCache::new(), Layer::new(battle)),
            |(mut cache, mut layer), (state, branch)| {
                expand(battle, config, round, state, branch, &mut cache, &mut layer);
                (cache, layer)
            },
        )
        .map(|(_, layer)| layer)
        .reduce(|| Layer::new(battle), Layer::merge)
}

fn run(battle: &Battle, config: &EngineConfig, parallel: bool) -> BattleOdds {
    let mut acc = OutcomeAccumulator::new(battle);
    let mut cache = BinomialCache::new();
    let mut frontier = Frontier::new();
    frontier.insert(
        battle.initial_state(),
        Branch {
            probability: 1.0,
            weighted_rounds: 0.0,
        },
    );

    let mut round = 1;
    while !frontier.is_empty() {
        if round > config.max_rounds {
            let unresolved: f64 = frontier.values().map(|b| b.probability).sum();
            acc.add_capped(unresolved);
            tracing::warn!(
                "Round cap of {} left {:.4} of the probability unresolved across {} rosters",
                config.max_rounds,
                unresolved,
                frontier.len()
            );
            break;
        }

        let layer = if parallel && frontier.len() >= config.parallel_threshold {
            tracing::debug!("Round {}: expanding {} rosters in parallel", round, frontier.len());
            expand_parallel(battle, config, round, frontier)
        } else {
            expand_sequential(battle, config, round, frontier, &mut cache)
        };
        acc.merge(&layer.acc);
        frontier = layer.next;

        if config.prune_mode == PruneMode::Branch {
            frontier.retain(|_, branch| {
                if branch.probability < config.prune_threshold {
                    acc.add_pruned(branch.probability, 1);
                    false
                } else {
                    true
                }
            });
        }
        round += 1;
    }

    let odds = acc.finish();
    tracing::debug!(
        "Odds: win {:.4} lose {:.4} tie {:.4} bad {:.4} ({} expanded, {} pruned)",
        odds.win_probability(),
        odds.lose_probability(),
        odds.tie_probability(),
        odds.bad_probability(),
        odds.branches_expanded(),
        odds.branches_pruned()
    );
    odds
}

/// Exact-up-to-pruning odds for `battle`
pub fn calculate(battle: &Battle, config: &EngineConfig) -> BattleOdds {
    run(battle, config, false)
}

/// [`calculate`] with large rounds spread over the rayon pool
///
/// A round with at least `parallel_threshold` distinct rosters is expanded
/// on all workers. Results match [`calculate`] up to floating-point
/// summation order.
pub fn calculate_parallel(battle: &Battle, config: &EngineConfig) -> BattleOdds {
    run(battle, config, true)
}
