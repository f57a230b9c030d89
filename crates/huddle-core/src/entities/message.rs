use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A chat message. Mention and hashtag references are resolved when the
/// message is written and stored alongside the text.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Message {
    pub id: String,
    pub channel_id: String,
    pub member_id: String,
    pub text: String,
    pub mentioned_members: Vec<String>,
    pub linked_note: Option<String>,
    pub linked_todo: Option<String>,
    pub linked_event: Option<String>,
    pub is_system: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
