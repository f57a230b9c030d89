//! Location update builder.

use serde::{Deserialize, Serialize};

use super::double_option;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocationUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub address: Option<Option<String>>,
}

pub struct LocationUpdateBuilder(LocationUpdate);

impl LocationUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self(LocationUpdate::default())
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.0.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn address(mut self, address: Option<String>) -> Self {
        self.0.address = Some(address);
        self
    }

    #[must_use]
    pub fn build(self) -> LocationUpdate {
        self.0
    }
}
