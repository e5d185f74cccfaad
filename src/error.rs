use thiserror::Error;

use crate::types::OrgLevel;

/// The engine's only failure: a report was requested for an entity that has
/// no records. Empty groups, zero denominators and thin SVI coverage are not
/// errors; they resolve to zero values or placeholder narratives.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("no records found for {level} `{id}`")]
    NotFound { level: OrgLevel, id: String },
}

impl EngineError {
    pub fn not_found(level: OrgLevel, id: impl Into<String>) -> Self {
        Self::NotFound { level, id: id.into() }
    }

    /// The identifier the caller asked for.
    pub fn entity_id(&self) -> &str {
        match self {
            Self::NotFound { id, .. } => id,
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
