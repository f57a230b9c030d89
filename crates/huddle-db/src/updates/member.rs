//! Member update builder.

use serde::{Deserialize, Serialize};

use huddle_core::enums::Role;

use super::double_option;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemberUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub team_id: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub location_id: Option<Option<String>>,
}

pub struct MemberUpdateBuilder(MemberUpdate);

impl MemberUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self(MemberUpdate::default())
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.0.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.0.email = Some(email.into());
        self
    }

    #[must_use]
    pub const fn role(mut self, role: Role) -> Self {
        self.0.role = Some(role);
        self
    }

    #[must_use]
    pub fn team_id(mut self, team_id: Option<String>) -> Self {
        self.0.team_id = Some(team_id);
        self
    }

    #[must_use]
    pub fn location_id(mut self, location_id: Option<String>) -> Self {
        self.0.location_id = Some(location_id);
        self
    }

    #[must_use]
    pub fn build(self) -> MemberUpdate {
        self.0
    }
}
