use thiserror::Error;

use crate::schema::{Entity, Keyword};

#[derive(Error, Debug)]
pub enum EqlError {
    #[error("Config error: {0}")]
    Config(String),
    #[error("{keyword} suggestions require an entity")]
    MissingEntity { keyword: Keyword },
    #[error("Operators not found for filter \"{field}\" of entity \"{entity}\"")]
    UnknownFilter { entity: Entity, field: String },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, EqlError>;

// Helper conversions
impl From<config::ConfigError> for EqlError {
    fn from(e: config::ConfigError) -> Self { Self::Config(e.to_string()) }
}
