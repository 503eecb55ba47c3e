//! Battle rosters: unit identities and per-branch damage tracking

pub mod state;
pub mod unit;

pub use state::{MultiHitTargets, RosterEntry, RosterState};
pub use unit::Unit;
