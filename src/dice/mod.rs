//! Dice-distribution calculator
//!
//! Pure functions from grouped dice to exact hit-count probabilities.

pub mod distribution;
pub mod grouping;

pub use distribution::{binomial, convolve, hit_probabilities, BinomialCache, HitDistribution};
pub use grouping::{dice_grouped, roll_data, RollData};
