//! Typed audit detail payloads.
//!
//! Each audit action can carry a structured `detail` JSON blob. These types
//! provide schema validation for the most common detail shapes.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Detail for `AuditAction::StatusChanged`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct StatusChangedDetail {
    pub from: String,
    pub to: String,
}

/// Detail for `AuditAction::Linked` and `AuditAction::Unlinked`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct LinkedDetail {
    pub source_type: String,
    pub source_id: String,
    pub target_type: String,
    pub target_id: String,
}

/// Detail for `AuditAction::Extracted`, written once per todo sync of a note.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ExtractedDetail {
    pub created: u32,
    pub updated: u32,
    pub unchanged: u32,
    pub unresolved: Vec<String>,
}

/// Detail for `AuditAction::Repaired`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct RepairedDetail {
    pub missing_type: String,
    pub missing_id: String,
}
