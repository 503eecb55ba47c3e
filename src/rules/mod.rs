//! Effective unit stats and the rules that produce them

pub mod context;
pub mod ruleset;
pub mod stats;
mod loader;

pub use context::{Context, LocationModifier};
pub use loader::{load_ruleset, parse_ruleset};
pub use ruleset::{Ruleset, RulesetResolver, UnitTypeDef};
pub use stats::{AntiAirStats, StatsResolver, UnitRoles, UnitStats};
