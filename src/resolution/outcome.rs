//! Accumulated battle odds

use crate::core::types::{Outcome, Side};
use crate::resolution::battle::Battle;
use crate::resolution::survival::SurvivalAggregator;
use crate::roster::RosterState;
use serde::Serialize;

/// Running totals while the tree is traversed
///
/// Every contribution is an absolute probability, so totals are plain sums
/// and accumulators from separate workers merge by addition.
#[derive(Debug, Clone, Default)]
pub struct OutcomeAccumulator {
    win: f64,
    lose: f64,
    tie: f64,
    pruned: f64,
    capped: f64,
    stalemate: f64,
    weighted_rounds: f64,
    weighted_attackers: f64,
    weighted_defenders: f64,
    branches_expanded: u64,
    branches_pruned: u64,
    survival: SurvivalAggregator,
}

impl OutcomeAccumulator {
    pub fn new(battle: &Battle) -> Self {
        Self {
            survival: SurvivalAggregator::new(battle),
            ..Self::default()
        }
    }

    pub fn add_terminal(
        &mut self,
        outcome: Outcome,
        probability: f64,
        state: &RosterState,
        rounds: f64,
    ) {
        match outcome {
            Outcome::Win => self.win += probability,
            Outcome::Lose => self.lose += probability,
            Outcome::Tie => self.tie += probability,
        }
        self.weighted_rounds += probability * rounds;
        self.weighted_attackers += probability * state.alive(Side::Attacker).count() as f64;
        self.weighted_defenders += probability * state.alive(Side::Defender).count() as f64;
        self.survival.add(probability, state);
    }

    /// Mass from `count` outcomes that were not expanded
    pub fn add_pruned(&mut self, probability: f64, count: u64) {
        self.pruned += probability;
        self.branches_pruned += count;
    }

    pub fn add_capped(&mut self, probability: f64) {
        self.capped += probability;
    }

    pub fn add_stalemate(&mut self, probability: f64) {
        self.stalemate += probability;
    }

    pub fn record_expansion(&mut self) {
        self.branches_expanded += 1;
    }

    pub fn merge(&mut self, other: &OutcomeAccumulator) {
        self.win += other.win;
        self.lose += other.lose;
        self.tie += other.tie;
        self.pruned += other.pruned;
        self.capped += other.capped;
        self.stalemate += other.stalemate;
        self.weighted_rounds += other.weighted_rounds;
        self.weighted_attackers += other.weighted_attackers;
        self.weighted_defenders += other.weighted_defenders;
        self.branches_expanded += other.branches_expanded;
        self.branches_pruned += other.branches_pruned;
        self.survival.merge(&other.survival);
    }

    pub fn finish(self) -> BattleOdds {
        let resolved = self.win + self.lose + self.tie;
        let per_resolved = |weighted: f64| {
            if resolved > 0.0 {
                weighted / resolved
            } else {
                0.0
            }
        };
        BattleOdds {
            win: self.win,
            lose: self.lose,
            tie: self.tie,
            bad: self.pruned + self.capped + self.stalemate,
            pruned: self.pruned,
            capped: self.capped,
            stalemate: self.stalemate,
            average_rounds: per_resolved(self.weighted_rounds),
            average_attackers: per_resolved(self.weighted_attackers),
            average_defenders: per_resolved(self.weighted_defenders),
            branches_expanded: self.branches_expanded,
            branches_pruned: self.branches_pruned,
            survival: self.survival,
        }
    }
}

/// Result of one odds calculation, from the attacker's point of view
#[derive(Debug, Clone, Serialize)]
pub struct BattleOdds {
    win: f64,
    lose: f64,
    tie: f64,
    /// Mass left unresolved: pruned + capped + stalemate
    bad: f64,
    pruned: f64,
    capped: f64,
    stalemate: f64,
    average_rounds: f64,
    average_attackers: f64,
    average_defenders: f64,
    branches_expanded: u64,
    branches_pruned: u64,
    #[serde(skip)]
    survival: SurvivalAggregator,
}

impl BattleOdds {
    pub fn win_probability(&self) -> f64 {
        self.win
    }

    pub fn lose_probability(&self) -> f64 {
        self.lose
    }

    pub fn tie_probability(&self) -> f64 {
        self.tie
    }

    pub fn bad_probability(&self) -> f64 {
        self.bad
    }

    /// Bad mass from branches dropped below the prune threshold
    pub fn pruned_probability(&self) -> f64 {
        self.pruned
    }

    /// Bad mass still fighting when the round cap was reached
    pub fn capped_probability(&self) -> f64 {
        self.capped
    }

    /// Bad mass from rosters where nobody can be hit any more
    pub fn stalemate_probability(&self) -> f64 {
        self.stalemate
    }

    /// Expected units left on `side` over decided branches
    pub fn average_survivors(&self, side: Side) -> f64 {
        match side {
            Side::Attacker => self.average_attackers,
            Side::Defender => self.average_defenders,
        }
    }

    /// Expected rounds fought over decided branches
    pub fn average_rounds(&self) -> f64 {
        self.average_rounds
    }

    pub fn branches_expanded(&self) -> u64 {
        self.branches_expanded
    }

    pub fn branches_pruned(&self) -> u64 {
        self.branches_pruned
    }

    pub fn survival(&self) -> &SurvivalAggregator {
        &self.survival
    }

    pub fn total(&self) -> f64 {
        self.win + self.lose + self.tie + self.bad
    }
}
