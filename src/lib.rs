//! Battle Odds - exact combat odds for dice wargames
//!
//! Computes the probability that an attack wins, loses, or ties by walking
//! every casualty outcome of the battle, plus each unit's chance to survive.

pub mod core;
pub mod dice;
pub mod resolution;
pub mod roster;
pub mod rules;
pub mod scenario;
pub mod simulation;
