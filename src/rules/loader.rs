//! Load rulesets from TOML files

use crate::core::error::Result;
use crate::rules::ruleset::Ruleset;
use std::fs;
use std::path::Path;

/// Parse and validate a ruleset from TOML text
pub fn parse_ruleset(content: &str) -> Result<Ruleset> {
    let ruleset: Ruleset = toml::from_str(content)?;
    ruleset.validate()?;
    Ok(ruleset)
}

pub fn load_ruleset(path: &Path) -> Result<Ruleset> {
    let content = fs::read_to_string(path)?;
    parse_ruleset(&content)
}
