use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::EntityType;

/// One entry of a document's `linked_entities` array.
///
/// Serialized as `{"type": "note", "id": "not-1a2b3c4d"}`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash)]
pub struct EntityRef {
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    pub id: String,
}

impl EntityRef {
    #[must_use]
    pub fn new(entity_type: EntityType, id: impl Into<String>) -> Self {
        Self {
            entity_type,
            id: id.into(),
        }
    }
}

impl std::fmt::Display for EntityRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.entity_type, self.id)
    }
}

/// A linked reference populated with the display title of its document.
///
/// `title` is `None` when the referenced document no longer exists.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct LinkedEntity {
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    pub id: String,
    pub title: Option<String>,
}

/// A mirrored pair of references between two linkable documents.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Connection {
    pub source: EntityRef,
    pub target: EntityRef,
}

/// Denormalized scope pointers used for dashboard queries and permission checks.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ConnectedTo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_id: Option<String>,
}

impl ConnectedTo {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.location_id.is_none() && self.team_id.is_none() && self.member_id.is_none()
    }
}
