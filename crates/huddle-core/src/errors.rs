//! Cross-cutting error types for Huddle.
//!
//! Domain-specific errors (`DatabaseError`, `ParseError`, `ConfigError`) live in
//! their respective crates. The HTTP-facing `ApiError` in `huddle-server` is
//! where all crate errors converge.

use thiserror::Error;

/// Errors that can be raised by any Huddle crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Entity lookup returned no result.
    #[error("Entity not found: {entity_type} {id}")]
    NotFound { entity_type: String, id: String },

    /// The entity type does not carry a `linked_entities` array.
    #[error("Entity type '{0}' cannot be linked")]
    NotLinkable(String),

    /// A string did not name a known variant.
    #[error("Unknown {kind} '{value}'")]
    UnknownVariant { kind: &'static str, value: String },

    /// Data failed validation (format, constraints).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
