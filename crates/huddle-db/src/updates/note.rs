//! Note update builder.

use serde::{Deserialize, Serialize};

use huddle_core::entities::ConnectedTo;
use huddle_core::enums::NoteStatus;

use crate::repos::note::NoteMemberInput;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NoteUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_pinned: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_archived: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<NoteStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connected_to: Option<ConnectedTo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connected_members: Option<Vec<NoteMemberInput>>,
}

pub struct NoteUpdateBuilder(NoteUpdate);

impl NoteUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self(NoteUpdate::default())
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.0.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.0.content = Some(content.into());
        self
    }

    #[must_use]
    pub fn tags(mut self, tags: Vec<String>) -> Self {
        self.0.tags = Some(tags);
        self
    }

    #[must_use]
    pub const fn is_pinned(mut self, is_pinned: bool) -> Self {
        self.0.is_pinned = Some(is_pinned);
        self
    }

    #[must_use]
    pub const fn is_archived(mut self, is_archived: bool) -> Self {
        self.0.is_archived = Some(is_archived);
        self
    }

    #[must_use]
    pub const fn status(mut self, status: NoteStatus) -> Self {
        self.0.status = Some(status);
        self
    }

    #[must_use]
    pub fn connected_to(mut self, connected_to: ConnectedTo) -> Self {
        self.0.connected_to = Some(connected_to);
        self
    }

    #[must_use]
    pub fn connected_members(mut self, members: Vec<NoteMemberInput>) -> Self {
        self.0.connected_members = Some(members);
        self
    }

    #[must_use]
    pub fn build(self) -> NoteUpdate {
        self.0
    }
}
