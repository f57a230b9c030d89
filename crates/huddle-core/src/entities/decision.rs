use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::{ConnectedTo, EntityRef};
use crate::enums::DecisionStatus;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Decision {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub status: DecisionStatus,
    pub created_by: String,
    pub connected_to: ConnectedTo,
    pub linked_entities: Vec<EntityRef>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
