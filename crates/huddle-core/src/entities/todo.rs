use chrono::{DateTime, NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::{ConnectedTo, EntityRef};
use crate::enums::{Priority, TodoStatus};

/// An actionable item, created directly or extracted from a note.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Todo {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub status: TodoStatus,
    pub priority: Priority,
    pub assigned_to: Option<String>,
    pub created_by: String,
    pub connected_to: ConnectedTo,
    pub list_id: Option<String>,
    pub due_date: Option<NaiveDate>,
    /// Set when the todo was extracted from a note.
    pub linked_note: Option<String>,
    pub linked_chat: Option<String>,
    pub linked_entities: Vec<EntityRef>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
