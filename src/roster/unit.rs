//! Battle participants
//!
//! A `Unit` is pure identity. Damage lives in `RosterState` so the same unit
//! can be in different damage states on different branches.

use crate::core::types::{Side, UnitId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub side: Side,
    pub unit_type: String,
}

impl Unit {
    pub fn new(unit_type: impl Into<String>, side: Side) -> Self {
        Self {
            id: UnitId::new(),
            side,
            unit_type: unit_type.into(),
        }
    }

    /// Create `count` fresh units of one type, ready to append to an order of loss
    pub fn create(count: usize, unit_type: &str, side: Side) -> Vec<Unit> {
        (0..count).map(|_| Unit::new(unit_type, side)).collect()
    }
}
