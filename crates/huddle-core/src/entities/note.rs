use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::{ConnectedTo, EntityRef};
use crate::enums::NoteStatus;

/// A free-form document. Its content is scanned for todo lines on every write.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Note {
    pub id: String,
    pub title: String,
    pub content: String,
    pub slug: String,
    pub author_id: String,
    pub connected_to: ConnectedTo,
    /// Todos extracted from `content`. Maintained by the todo sync only.
    pub linked_todos: Vec<String>,
    pub connected_members: Vec<NoteMember>,
    pub tags: Vec<String>,
    pub is_pinned: bool,
    pub is_archived: bool,
    pub status: NoteStatus,
    pub linked_entities: Vec<EntityRef>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A collaborator attached to a note.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct NoteMember {
    pub member_id: String,
    pub role: String,
    pub added_at: DateTime<Utc>,
}
