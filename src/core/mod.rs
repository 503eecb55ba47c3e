pub mod config;
pub mod error;
pub mod types;

pub use config::{EngineConfig, PruneMode};
pub use error::{OddsError, Result};
pub use types::{Outcome, Side, UnitId};
