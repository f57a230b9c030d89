use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::{ConnectedTo, EntityRef};
use crate::enums::ChannelType;

/// A chat channel. Messages live in their own table keyed by `channel_id`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Channel {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub channel_type: ChannelType,
    pub connected_to: ConnectedTo,
    pub members: Vec<String>,
    pub linked_entities: Vec<EntityRef>,
    pub is_archived: bool,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
