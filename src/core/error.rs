use thiserror::Error;

#[derive(Error, Debug)]
pub enum OddsError {
    #[error("Unknown unit type: {0}")]
    UnknownUnitType(String),

    #[error("Invalid unit stats for {unit_type}: {reason}")]
    InvalidStats { unit_type: String, reason: String },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Invalid scenario: {0}")]
    InvalidScenario(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, OddsError>;
