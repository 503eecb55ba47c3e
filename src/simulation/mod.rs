//! Monte Carlo cross-check of the outcome tree

pub mod monte_carlo;

pub use monte_carlo::{simulate, MonteCarloOdds};
