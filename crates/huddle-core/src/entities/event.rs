use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::{ConnectedTo, EntityRef};

/// A scheduled meeting or occasion.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Event {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub venue: Option<String>,
    pub created_by: String,
    pub connected_to: ConnectedTo,
    pub linked_entities: Vec<EntityRef>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
