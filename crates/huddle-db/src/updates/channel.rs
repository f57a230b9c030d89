//! Channel update builder.

use serde::{Deserialize, Serialize};

use huddle_core::entities::ConnectedTo;
use huddle_core::enums::ChannelType;

use super::double_option;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChannelUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub channel_type: Option<ChannelType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub members: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_archived: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connected_to: Option<ConnectedTo>,
}

pub struct ChannelUpdateBuilder(ChannelUpdate);

impl ChannelUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self(ChannelUpdate::default())
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.0.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: Option<String>) -> Self {
        self.0.description = Some(description);
        self
    }

    #[must_use]
    pub const fn channel_type(mut self, channel_type: ChannelType) -> Self {
        self.0.channel_type = Some(channel_type);
        self
    }

    #[must_use]
    pub fn members(mut self, members: Vec<String>) -> Self {
        self.0.members = Some(members);
        self
    }

    #[must_use]
    pub const fn is_archived(mut self, is_archived: bool) -> Self {
        self.0.is_archived = Some(is_archived);
        self
    }

    #[must_use]
    pub fn connected_to(mut self, connected_to: ConnectedTo) -> Self {
        self.0.connected_to = Some(connected_to);
        self
    }

    #[must_use]
    pub fn build(self) -> ChannelUpdate {
        self.0
    }
}
