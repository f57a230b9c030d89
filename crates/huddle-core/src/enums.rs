//! Status enums, entity types, roles, and actions for Huddle.
//!
//! All enums use `snake_case` serialization via `#[serde(rename_all = "snake_case")]`.
//! The same string is stored in SQL, so `as_str()` and serde always agree.
//! Status enums with a lifecycle provide `allowed_next_states()`.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::CoreError;

/// Implements `Display` via `as_str()` and `FromStr` by scanning `ALL`.
macro_rules! str_enum_impls {
    ($ty:ident, $kind:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str() == s)
                    .ok_or_else(|| CoreError::UnknownVariant {
                        kind: $kind,
                        value: s.to_string(),
                    })
            }
        }
    };
}

// ---------------------------------------------------------------------------
// EntityType
// ---------------------------------------------------------------------------

/// Type of document in the store, used in audit entries and entity references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Location,
    Team,
    Member,
    Note,
    Todo,
    Decision,
    Event,
    Channel,
    Message,
    Notification,
    Connection,
}

impl EntityType {
    pub const ALL: [Self; 11] = [
        Self::Location,
        Self::Team,
        Self::Member,
        Self::Note,
        Self::Todo,
        Self::Decision,
        Self::Event,
        Self::Channel,
        Self::Message,
        Self::Notification,
        Self::Connection,
    ];

    /// Entity types whose documents carry a `linked_entities` array.
    pub const LINKABLE: [Self; 5] = [
        Self::Note,
        Self::Todo,
        Self::Decision,
        Self::Event,
        Self::Channel,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Location => "location",
            Self::Team => "team",
            Self::Member => "member",
            Self::Note => "note",
            Self::Todo => "todo",
            Self::Decision => "decision",
            Self::Event => "event",
            Self::Channel => "channel",
            Self::Message => "message",
            Self::Notification => "notification",
            Self::Connection => "connection",
        }
    }

    /// Whether documents of this type can take part in a connection.
    #[must_use]
    pub const fn is_linkable(self) -> bool {
        matches!(
            self,
            Self::Note | Self::Todo | Self::Decision | Self::Event | Self::Channel
        )
    }
}

str_enum_impls!(EntityType, "entity type");

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// Organisational role of a member. Drives the permission matrix.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    Member,
    Manager,
    Admin,
}

impl Role {
    pub const ALL: [Self; 3] = [Self::Member, Self::Manager, Self::Admin];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Member => "member",
            Self::Manager => "manager",
            Self::Admin => "admin",
        }
    }
}

str_enum_impls!(Role, "role");

// ---------------------------------------------------------------------------
// NoteStatus
// ---------------------------------------------------------------------------

/// Publication status of a note.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum NoteStatus {
    #[default]
    Draft,
    Published,
    Archived,
}

impl NoteStatus {
    pub const ALL: [Self; 3] = [Self::Draft, Self::Published, Self::Archived];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
            Self::Archived => "archived",
        }
    }
}

str_enum_impls!(NoteStatus, "note status");

// ---------------------------------------------------------------------------
// TodoStatus
// ---------------------------------------------------------------------------

/// Status of a todo.
///
/// ```text
/// pending → in_progress → completed
///         → completed   → pending (reopened)
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum TodoStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

impl TodoStatus {
    pub const ALL: [Self; 3] = [Self::Pending, Self::InProgress, Self::Completed];

    #[must_use]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::Pending => &[Self::InProgress, Self::Completed],
            Self::InProgress => &[Self::Pending, Self::Completed],
            Self::Completed => &[Self::Pending],
        }
    }

    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self == next || self.allowed_next_states().contains(&next)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }
}

str_enum_impls!(TodoStatus, "todo status");

// ---------------------------------------------------------------------------
// Priority
// ---------------------------------------------------------------------------

/// Priority of a todo. Ordered from least to most pressing.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub const ALL: [Self; 4] = [Self::Low, Self::Medium, Self::High, Self::Urgent];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }
}

str_enum_impls!(Priority, "priority");

// ---------------------------------------------------------------------------
// DecisionStatus
// ---------------------------------------------------------------------------

/// Status of a decision.
///
/// ```text
/// proposed → approved → superseded
///          → rejected
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum DecisionStatus {
    #[default]
    Proposed,
    Approved,
    Rejected,
    Superseded,
}

impl DecisionStatus {
    pub const ALL: [Self; 4] = [
        Self::Proposed,
        Self::Approved,
        Self::Rejected,
        Self::Superseded,
    ];

    #[must_use]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::Proposed => &[Self::Approved, Self::Rejected],
            Self::Approved => &[Self::Superseded],
            Self::Rejected | Self::Superseded => &[],
        }
    }

    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self == next || self.allowed_next_states().contains(&next)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Proposed => "proposed",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Superseded => "superseded",
        }
    }
}

str_enum_impls!(DecisionStatus, "decision status");

// ---------------------------------------------------------------------------
// ChannelType
// ---------------------------------------------------------------------------

/// Visibility of a chat channel.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum ChannelType {
    #[default]
    Public,
    Private,
    Direct,
}

impl ChannelType {
    pub const ALL: [Self; 3] = [Self::Public, Self::Private, Self::Direct];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
            Self::Direct => "direct",
        }
    }
}

str_enum_impls!(ChannelType, "channel type");

// ---------------------------------------------------------------------------
// NotificationKind
// ---------------------------------------------------------------------------

/// Why a notification was raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Mention,
    Assignment,
    Link,
}

impl NotificationKind {
    pub const ALL: [Self; 3] = [Self::Mention, Self::Assignment, Self::Link];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mention => "mention",
            Self::Assignment => "assignment",
            Self::Link => "link",
        }
    }
}

str_enum_impls!(NotificationKind, "notification kind");

// ---------------------------------------------------------------------------
// AuditAction
// ---------------------------------------------------------------------------

/// Type of action recorded in the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Created,
    Updated,
    Deleted,
    StatusChanged,
    Linked,
    Unlinked,
    Extracted,
    Repaired,
}

impl AuditAction {
    pub const ALL: [Self; 8] = [
        Self::Created,
        Self::Updated,
        Self::Deleted,
        Self::StatusChanged,
        Self::Linked,
        Self::Unlinked,
        Self::Extracted,
        Self::Repaired,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Deleted => "deleted",
            Self::StatusChanged => "status_changed",
            Self::Linked => "linked",
            Self::Unlinked => "unlinked",
            Self::Extracted => "extracted",
            Self::Repaired => "repaired",
        }
    }
}

str_enum_impls!(AuditAction, "audit action");

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! test_serde_roundtrip {
        ($name:ident, $ty:ty, $variant:expr, $expected_str:expr) => {
            #[test]
            fn $name() {
                let val = $variant;
                let json = serde_json::to_string(&val).unwrap();
                assert_eq!(json, format!("\"{}\"", $expected_str));
                let recovered: $ty = serde_json::from_str(&json).unwrap();
                assert_eq!(recovered, val);
                assert_eq!(<$ty>::from_str($expected_str).unwrap(), val);
            }
        };
    }

    test_serde_roundtrip!(entity_type_note, EntityType, EntityType::Note, "note");
    test_serde_roundtrip!(role_manager, Role, Role::Manager, "manager");
    test_serde_roundtrip!(
        todo_in_progress,
        TodoStatus,
        TodoStatus::InProgress,
        "in_progress"
    );
    test_serde_roundtrip!(priority_urgent, Priority, Priority::Urgent, "urgent");
    test_serde_roundtrip!(
        decision_superseded,
        DecisionStatus,
        DecisionStatus::Superseded,
        "superseded"
    );
    test_serde_roundtrip!(channel_direct, ChannelType, ChannelType::Direct, "direct");
    test_serde_roundtrip!(
        audit_status_changed,
        AuditAction,
        AuditAction::StatusChanged,
        "status_changed"
    );

    #[test]
    fn only_document_types_with_link_arrays_are_linkable() {
        for ty in EntityType::ALL {
            assert_eq!(ty.is_linkable(), EntityType::LINKABLE.contains(&ty), "{ty}");
        }
        assert!(!EntityType::Member.is_linkable());
        assert!(!EntityType::Message.is_linkable());
    }

    #[test]
    fn unknown_variant_is_rejected() {
        let err = EntityType::from_str("widget").unwrap_err();
        assert!(err.to_string().contains("widget"));
    }

    #[test]
    fn todo_transitions() {
        assert!(TodoStatus::Pending.can_transition_to(TodoStatus::InProgress));
        assert!(TodoStatus::Completed.can_transition_to(TodoStatus::Pending));
        assert!(!TodoStatus::Completed.can_transition_to(TodoStatus::InProgress));
    }

    #[test]
    fn decision_terminal_states() {
        assert!(DecisionStatus::Rejected.allowed_next_states().is_empty());
        assert!(!DecisionStatus::Proposed.can_transition_to(DecisionStatus::Superseded));
    }

    #[test]
    fn priority_ordering() {
        assert!(Priority::Low < Priority::Medium);
        assert!(Priority::High < Priority::Urgent);
    }
}
