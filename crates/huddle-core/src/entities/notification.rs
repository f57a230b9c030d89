use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::EntityRef;
use crate::enums::NotificationKind;

/// A per-member inbox entry raised by mentions, assignments, and new links.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Notification {
    pub id: String,
    pub member_id: String,
    pub kind: NotificationKind,
    pub title: String,
    pub body: Option<String>,
    pub entity: Option<EntityRef>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}
