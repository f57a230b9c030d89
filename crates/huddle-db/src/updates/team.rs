//! Team update builder.

use serde::{Deserialize, Serialize};

use super::double_option;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TeamUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub location_id: Option<Option<String>>,
}

pub struct TeamUpdateBuilder(TeamUpdate);

impl TeamUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self(TeamUpdate::default())
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
    pub fn location_id(mut self, location_id: Option<String>) -> Self {
        self.0.location_id = Some(location_id);
        self
    }

    #[must_use]
    pub fn build(self) -> TeamUpdate {
        self.0
    }
}
