//! Battle resolution
//!
//! Turns a [`Battle`] into [`BattleOdds`] by walking the tree of every
//! casualty outcome, round by round.

pub mod battle;
pub mod outcome;
pub mod phases;
pub mod survival;
pub mod tree;

pub use battle::{Battle, Combatant};
pub use outcome::{BattleOdds, OutcomeAccumulator};
pub use phases::{resolve_phase, resolve_round, volley, Phase, TargetGroup, Transitions, Volley};
pub use survival::SurvivalAggregator;
pub use tree::{calculate, calculate_parallel};
