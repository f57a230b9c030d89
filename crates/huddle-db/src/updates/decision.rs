//! Decision update builder.

use serde::{Deserialize, Serialize};

use huddle_core::entities::ConnectedTo;
use huddle_core::enums::DecisionStatus;

use super::double_option;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DecisionUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<DecisionStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connected_to: Option<ConnectedTo>,
}

pub struct DecisionUpdateBuilder(DecisionUpdate);

impl DecisionUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self(DecisionUpdate::default())
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.0.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: Option<String>) -> Self {
        self.0.description = Some(description);
        self
    }

    #[must_use]
    pub const fn status(mut self, status: DecisionStatus) -> Self {
        self.0.status = Some(status);
        self
    }

    #[must_use]
    pub fn connected_to(mut self, connected_to: ConnectedTo) -> Self {
        self.0.connected_to = Some(connected_to);
        self
    }

    #[must_use]
    pub fn build(self) -> DecisionUpdate {
        self.0
    }
}
