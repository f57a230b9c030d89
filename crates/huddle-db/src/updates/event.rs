//! Event update builder.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use huddle_core::entities::ConnectedTo;

use super::double_option;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starts_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub ends_at: Option<Option<DateTime<Utc>>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub venue: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connected_to: Option<ConnectedTo>,
}

pub struct EventUpdateBuilder(EventUpdate);

impl EventUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self(EventUpdate::default())
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
    pub const fn starts_at(mut self, starts_at: DateTime<Utc>) -> Self {
        self.0.starts_at = Some(starts_at);
        self
    }

    #[must_use]
    pub const fn ends_at(mut self, ends_at: Option<DateTime<Utc>>) -> Self {
        self.0.ends_at = Some(ends_at);
        self
    }

    #[must_use]
    pub fn venue(mut self, venue: Option<String>) -> Self {
        self.0.venue = Some(venue);
        self
    }

    #[must_use]
    pub fn connected_to(mut self, connected_to: ConnectedTo) -> Self {
        self.0.connected_to = Some(connected_to);
        self
    }

    #[must_use]
    pub fn build(self) -> EventUpdate {
        self.0
    }
}
