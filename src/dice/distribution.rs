//! Hit-count probability distributions
//!
//! The only place binomial coefficients appear. A side's distribution for one
//! volley is the convolution of one Binomial(n, power / sides) per group of
//! dice sharing a hit threshold.

use crate::dice::grouping::RollData;
use ahash::AHashMap;
use std::sync::Arc;

/// Probability mass over hit counts `0..=max_hits()`
#[derive(Debug, Clone, PartialEq)]
pub struct HitDistribution {
    masses: Vec<f64>,
}

impl HitDistribution {
    /// Certainty of zero hits
    pub fn point_mass() -> Self {
        Self { masses: vec![1.0] }
    }

    pub fn from_masses(masses: Vec<f64>) -> Self {
        debug_assert!(!masses.is_empty(), "distribution needs at least one mass");
        Self { masses }
    }

    pub fn max_hits(&self) -> usize {
        self.masses.len() - 1
    }

    pub fn probability(&self, hits: usize) -> f64 {
        self.masses.get(hits).copied().unwrap_or(0.0)
    }

    pub fn masses(&self) -> &[f64] {
        &self.masses
    }

    pub fn total(&self) -> f64 {
        self.masses.iter().sum()
    }

    /// `(hits, probability)` pairs with non-zero mass
    pub fn outcomes(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.masses
            .iter()
            .copied()
            .enumerate()
            .filter(|&(_, p)| p > 0.0)
    }

    /// Fold the mass of every hit count above `max` into `max`
    ///
    /// Hits beyond the targets' remaining hit points are wasted, so they lead
    /// to the same roster as exactly `max` hits.
    pub fn capped(&self, max: usize) -> HitDistribution {
        if max >= self.max_hits() {
            return self.clone();
        }
        let mut masses = self.masses[..=max].to_vec();
        masses[max] += self.masses[max + 1..].iter().sum::<f64>();
        HitDistribution { masses }
    }
}

/// Binomial(n, p) probability mass function
///
/// Evaluated in log space: for large pools the coefficient overflows while
/// `p^k q^(n-k)` underflows. Certain outcomes (p = 0 or p = 1) stay exact.
pub fn binomial(rolls: u32, p: f64) -> HitDistribution {
    let n = rolls as usize;
    let mut masses = vec![0.0; n + 1];
    if p <= 0.0 {
        masses[0] = 1.0;
        return HitDistribution { masses };
    }
    if p >= 1.0 {
        masses[n] = 1.0;
        return HitDistribution { masses };
    }

    let (ln_p, ln_q) = (p.ln(), (1.0 - p).ln());
    let mut ln_coefficient = 0.0_f64;
    for (k, mass) in masses.iter_mut().enumerate() {
        if k > 0 {
            ln_coefficient += ((n - k + 1) as f64).ln() - (k as f64).ln();
        }
        *mass = (ln_coefficient + k as f64 * ln_p + (n - k) as f64 * ln_q).exp();
    }
    HitDistribution { masses }
}

/// Discrete convolution: distribution of the sum of two independent hit counts
pub fn convolve(a: &HitDistribution, b: &HitDistribution) -> HitDistribution {
    let mut masses = vec![0.0; a.masses.len() + b.masses.len() - 1];
    for (i, &pa) in a.masses.iter().enumerate() {
        if pa == 0.0 {
            continue;
        }
        for (j, &pb) in b.masses.iter().enumerate() {
            masses[i + j] += pa * pb;
        }
    }
    HitDistribution { masses }
}

/// Hit-count distribution for one volley described by `roll`
pub fn hit_probabilities(roll: &RollData) -> HitDistribution {
    roll.groups()
        .map(|(power, rolls)| binomial(rolls, roll.hit_chance(power)))
        .fold(HitDistribution::point_mass(), |acc, group| {
            convolve(&acc, &group)
        })
}

/// Memoised binomials for one traversal
///
/// The same (rolls, power, sides) triple recurs in nearly every branch of a
/// battle, so each is computed once.
#[derive(Debug, Default)]
pub struct BinomialCache {
    binomials: AHashMap<(u32, u32, u32), Arc<HitDistribution>>,
}

impl BinomialCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn binomial(&mut self, rolls: u32, power: u32, dice_sides: u32) -> Arc<HitDistribution> {
        self.binomials
            .entry((rolls, power, dice_sides))
            .or_insert_with(|| {
                let p = power.min(dice_sides) as f64 / dice_sides as f64;
                Arc::new(binomial(rolls, p))
            })
            .clone()
    }

    /// Cached equivalent of [`hit_probabilities`]
    pub fn hit_probabilities(&mut self, roll: &RollData) -> HitDistribution {
        let mut result = HitDistribution::point_mass();
        for (power, rolls) in roll.groups() {
            let group = self.binomial(rolls, power, roll.dice_sides);
            result = convolve(&result, &group);
        }
        result
    }

    pub fn len(&self) -> usize {
        self.binomials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.binomials.is_empty()
    }
}
