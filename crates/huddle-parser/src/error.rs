//! Parser error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Invalid date '{value}': {source}")]
    InvalidDate {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("Unknown priority '{0}'")]
    UnknownPriority(String),
}
