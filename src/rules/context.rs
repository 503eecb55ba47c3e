//! Immutable bundle handed to the stats resolver
//!
//! The engine never inspects a `Context`; it only forwards it to
//! [`StatsResolver::resolve`](crate::rules::stats::StatsResolver::resolve).

use crate::core::types::Side;
use crate::rules::ruleset::Ruleset;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Flat strength adjustment that applies at a location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationModifier {
    pub name: String,
    /// Applies to every unit type when unset
    #[serde(default)]
    pub unit_type: Option<String>,
    /// Applies to both sides when unset
    #[serde(default)]
    pub side: Option<Side>,
    #[serde(default)]
    pub attack_bonus: i32,
    #[serde(default)]
    pub defense_bonus: i32,
}

impl LocationModifier {
    pub fn applies_to(&self, unit_type: &str, side: Side) -> bool {
        self.unit_type.as_deref().map_or(true, |t| t == unit_type)
            && self.side.map_or(true, |s| s == side)
    }
}

#[derive(Debug, Clone)]
pub struct Context {
    pub ruleset: Arc<Ruleset>,
    pub location: String,
    pub modifiers: Vec<LocationModifier>,
}

impl Context {
    pub fn new(ruleset: Arc<Ruleset>, location: impl Into<String>) -> Self {
        Self {
            ruleset,
            location: location.into(),
            modifiers: Vec::new(),
        }
    }

    pub fn with_modifier(mut self, modifier: LocationModifier) -> Self {
        self.modifiers.push(modifier);
        self
    }

    /// Active modifiers relevant to one unit type fighting on `side`
    pub fn modifiers_for<'a>(
        &'a self,
        unit_type: &'a str,
        side: Side,
    ) -> impl Iterator<Item = &'a LocationModifier> + 'a {
        self.modifiers
            .iter()
            .filter(move |m| m.applies_to(unit_type, side))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn modifier(unit_type: Option<&str>, side: Option<Side>) -> LocationModifier {
        LocationModifier {
            name: "test".into(),
            unit_type: unit_type.map(String::from),
            side,
            attack_bonus: 1,
            defense_bonus: 0,
        }
    }

    #[test]
    fn test_unscoped_modifier_applies_everywhere() {
        let m = modifier(None, None);
        assert!(m.applies_to("infantry", Side::Attacker));
        assert!(m.applies_to("armour", Side::Defender));
    }

    #[test]
    fn test_scoped_modifier_filters() {
        let m = modifier(Some("infantry"), Some(Side::Attacker));
        assert!(m.applies_to("infantry", Side::Attacker));
        assert!(!m.applies_to("infantry", Side::Defender));
        assert!(!m.applies_to("armour", Side::Attacker));
    }

    #[test]
    fn test_context_filters_active_modifiers() {
        let context = Context::new(Arc::new(Ruleset::default()), "coast")
            .with_modifier(modifier(Some("infantry"), None))
            .with_modifier(modifier(Some("armour"), None));
        assert_eq!(context.modifiers_for("infantry", Side::Defender).count(), 1);
        assert_eq!(context.location, "coast");
    }
}
