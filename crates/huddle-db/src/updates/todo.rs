//! Todo update builder.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use huddle_core::entities::ConnectedTo;
use huddle_core::enums::{Priority, TodoStatus};

use super::double_option;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TodoUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TodoStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub assigned_to: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub due_date: Option<Option<NaiveDate>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub list_id: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub linked_chat: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connected_to: Option<ConnectedTo>,
}

pub struct TodoUpdateBuilder(TodoUpdate);

impl TodoUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self(TodoUpdate::default())
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
    pub const fn status(mut self, status: TodoStatus) -> Self {
        self.0.status = Some(status);
        self
    }

    #[must_use]
    pub const fn priority(mut self, priority: Priority) -> Self {
        self.0.priority = Some(priority);
        self
    }

    #[must_use]
    pub fn assigned_to(mut self, member_id: Option<String>) -> Self {
        self.0.assigned_to = Some(member_id);
        self
    }

    #[must_use]
    pub const fn due_date(mut self, due_date: Option<NaiveDate>) -> Self {
        self.0.due_date = Some(due_date);
        self
    }

    #[must_use]
    pub fn list_id(mut self, list_id: Option<String>) -> Self {
        self.0.list_id = Some(list_id);
        self
    }

    #[must_use]
    pub fn linked_chat(mut self, linked_chat: Option<String>) -> Self {
        self.0.linked_chat = Some(linked_chat);
        self
    }

    #[must_use]
    pub fn connected_to(mut self, connected_to: ConnectedTo) -> Self {
        self.0.connected_to = Some(connected_to);
        self
    }

    #[must_use]
    pub fn build(self) -> TodoUpdate {
        self.0
    }
}
