//! Role-based permission matrix.
//!
//! Every `(role, section, action)` triple maps to the widest [`Scope`] the
//! role may act within, or `None` when the action is not allowed at all.
//! Scopes are ordered `self < team < location < company`.
//!
//! | role    | view     | edit    | delete  |
//! |---------|----------|---------|---------|
//! | member  | team     | self    | self    |
//! | manager | location | team    | team    |
//! | admin   | company  | company | company |
//!
//! The org sections (locations, teams, members) are visible company-wide.
//! Only admins change them, except that managers may edit teams and members
//! within their own location.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::{ConnectedTo, Member};
use crate::enums::{EntityType, Role};

// ---------------------------------------------------------------------------
// Scope / Section / Action
// ---------------------------------------------------------------------------

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    #[serde(rename = "self")]
    Own,
    Team,
    Location,
    Company,
}

impl Scope {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Own => "self",
            Self::Team => "team",
            Self::Location => "location",
            Self::Company => "company",
        }
    }
}

/// A gated area of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Locations,
    Teams,
    Members,
    Notes,
    Todos,
    Decisions,
    Events,
    Channels,
}

impl Section {
    pub const ALL: [Self; 8] = [
        Self::Locations,
        Self::Teams,
        Self::Members,
        Self::Notes,
        Self::Todos,
        Self::Decisions,
        Self::Events,
        Self::Channels,
    ];

    #[must_use]
    pub const fn is_org(self) -> bool {
        matches!(self, Self::Locations | Self::Teams | Self::Members)
    }

    /// Section that gates documents of the given type. Messages fall under
    /// their channel; notifications and connections are gated elsewhere.
    #[must_use]
    pub const fn for_entity(entity_type: EntityType) -> Option<Self> {
        match entity_type {
            EntityType::Location => Some(Self::Locations),
            EntityType::Team => Some(Self::Teams),
            EntityType::Member => Some(Self::Members),
            EntityType::Note => Some(Self::Notes),
            EntityType::Todo => Some(Self::Todos),
            EntityType::Decision => Some(Self::Decisions),
            EntityType::Event => Some(Self::Events),
            EntityType::Channel | EntityType::Message => Some(Self::Channels),
            EntityType::Notification | EntityType::Connection => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    View,
    Edit,
    Delete,
}

// ---------------------------------------------------------------------------
// Matrix
// ---------------------------------------------------------------------------

/// Widest scope `role` may perform `action` in within `section`.
#[must_use]
pub const fn scope_for(role: Role, section: Section, action: Action) -> Option<Scope> {
    if section.is_org() {
        return match (role, action) {
            (_, Action::View) | (Role::Admin, _) => Some(Scope::Company),
            (Role::Manager, Action::Edit) if !matches!(section, Section::Locations) => {
                Some(Scope::Location)
            }
            _ => None,
        };
    }
    Some(match (role, action) {
        (Role::Member, Action::View) | (Role::Manager, Action::Edit | Action::Delete) => {
            Scope::Team
        }
        (Role::Member, Action::Edit | Action::Delete) => Scope::Own,
        (Role::Manager, Action::View) => Scope::Location,
        (Role::Admin, _) => Scope::Company,
    })
}

/// One row of the caller's effective matrix.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct PermissionEntry {
    pub section: Section,
    pub view: Option<Scope>,
    pub edit: Option<Scope>,
    pub delete: Option<Scope>,
}

// ---------------------------------------------------------------------------
// Actor / Target
// ---------------------------------------------------------------------------

/// The member performing a request, with the org placement that scopes match on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub member_id: String,
    pub role: Role,
    pub team_id: Option<String>,
    pub location_id: Option<String>,
}

/// What a permission check is evaluated against.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Target {
    /// Author or creator of the document.
    pub owner_id: Option<String>,
    pub connected_to: ConnectedTo,
}

impl Target {
    #[must_use]
    pub fn new(owner_id: impl Into<String>, connected_to: ConnectedTo) -> Self {
        Self {
            owner_id: Some(owner_id.into()),
            connected_to,
        }
    }
}

/// Row filter for list queries derived from the caller's view scope.
///
/// A row passes a `Restricted` filter when any of the present ids matches:
/// owner or `member_id` against `member_id`, `team_id`, or `location_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeFilter {
    Unrestricted,
    Restricted {
        member_id: String,
        team_id: Option<String>,
        location_id: Option<String>,
    },
    Nothing,
}

impl ScopeFilter {
    #[must_use]
    pub fn allows(&self, target: &Target) -> bool {
        match self {
            Self::Unrestricted => true,
            Self::Nothing => false,
            Self::Restricted {
                member_id,
                team_id,
                location_id,
            } => {
                let ct = &target.connected_to;
                target.owner_id.as_ref() == Some(member_id)
                    || ct.member_id.as_ref() == Some(member_id)
                    || (team_id.is_some() && ct.team_id == *team_id)
                    || (location_id.is_some() && ct.location_id == *location_id)
            }
        }
    }
}

impl Actor {
    #[must_use]
    pub fn from_member(member: &Member) -> Self {
        Self {
            member_id: member.id.clone(),
            role: member.role,
            team_id: member.team_id.clone(),
            location_id: member.location_id.clone(),
        }
    }

    #[must_use]
    pub fn can(&self, section: Section, action: Action, target: &Target) -> bool {
        scope_for(self.role, section, action)
            .is_some_and(|scope| self.filter_for(scope).allows(target))
    }

    #[must_use]
    pub fn list_filter(&self, section: Section) -> ScopeFilter {
        scope_for(self.role, section, Action::View)
            .map_or(ScopeFilter::Nothing, |scope| self.filter_for(scope))
    }

    /// The caller's effective matrix, one entry per section.
    #[must_use]
    pub fn matrix(&self) -> Vec<PermissionEntry> {
        Section::ALL
            .iter()
            .map(|&section| PermissionEntry {
                section,
                view: scope_for(self.role, section, Action::View),
                edit: scope_for(self.role, section, Action::Edit),
                delete: scope_for(self.role, section, Action::Delete),
            })
            .collect()
    }

    fn filter_for(&self, scope: Scope) -> ScopeFilter {
        let member_id = self.member_id.clone();
        match scope {
            Scope::Company => ScopeFilter::Unrestricted,
            Scope::Own => ScopeFilter::Restricted {
                member_id,
                team_id: None,
                location_id: None,
            },
            Scope::Team => ScopeFilter::Restricted {
                member_id,
                team_id: self.team_id.clone(),
                location_id: None,
            },
            Scope::Location => ScopeFilter::Restricted {
                member_id,
                team_id: self.team_id.clone(),
                location_id: self.location_id.clone(),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn actor(role: Role) -> Actor {
        Actor {
            member_id: "mem-00000001".into(),
            role,
            team_id: Some("tea-00000001".into()),
            location_id: Some("loc-00000001".into()),
        }
    }

    fn target(owner: &str, team: Option<&str>, location: Option<&str>) -> Target {
        Target::new(
            owner,
            ConnectedTo {
                location_id: location.map(Into::into),
                team_id: team.map(Into::into),
                member_id: None,
            },
        )
    }

    #[test]
    fn content_matrix_matches_table() {
        let rows = [
            (Role::Member, [Scope::Team, Scope::Own, Scope::Own]),
            (Role::Manager, [Scope::Location, Scope::Team, Scope::Team]),
            (Role::Admin, [Scope::Company, Scope::Company, Scope::Company]),
        ];
        for (role, [view, edit, delete]) in rows {
            assert_eq!(scope_for(role, Section::Notes, Action::View), Some(view));
            assert_eq!(scope_for(role, Section::Notes, Action::Edit), Some(edit));
            assert_eq!(scope_for(role, Section::Notes, Action::Delete), Some(delete));
        }
    }

    #[test]
    fn org_sections_are_admin_edited() {
        for role in Role::ALL {
            assert_eq!(
                scope_for(role, Section::Locations, Action::View),
                Some(Scope::Company)
            );
        }
        assert_eq!(scope_for(Role::Member, Section::Teams, Action::Edit), None);
        assert_eq!(
            scope_for(Role::Manager, Section::Members, Action::Edit),
            Some(Scope::Location)
        );
        assert_eq!(scope_for(Role::Manager, Section::Members, Action::Delete), None);
        assert_eq!(scope_for(Role::Manager, Section::Locations, Action::Edit), None);
        assert_eq!(
            scope_for(Role::Admin, Section::Locations, Action::Delete),
            Some(Scope::Company)
        );
    }

    #[test]
    fn scopes_are_ordered() {
        assert!(Scope::Own < Scope::Team);
        assert!(Scope::Team < Scope::Location);
        assert!(Scope::Location < Scope::Company);
        assert_eq!(serde_json::to_string(&Scope::Own).unwrap(), "\"self\"");
    }

    #[test]
    fn member_edits_only_own_documents() {
        let a = actor(Role::Member);
        let own = target("mem-00000001", Some("tea-00000001"), None);
        let teammate = target("mem-00000002", Some("tea-00000001"), None);
        assert!(a.can(Section::Notes, Action::Edit, &own));
        assert!(!a.can(Section::Notes, Action::Edit, &teammate));
        assert!(a.can(Section::Notes, Action::View, &teammate));
    }

    #[test]
    fn self_scope_matches_connected_member() {
        let a = actor(Role::Member);
        let mut t = target("mem-00000009", None, None);
        t.connected_to.member_id = Some("mem-00000001".into());
        assert!(a.can(Section::Todos, Action::Delete, &t));
    }

    #[test]
    fn member_cannot_view_other_teams() {
        let a = actor(Role::Member);
        let other = target("mem-00000002", Some("tea-00000002"), Some("loc-00000001"));
        assert!(!a.can(Section::Events, Action::View, &other));
        assert!(actor(Role::Manager).can(Section::Events, Action::View, &other));
    }

    #[test]
    fn manager_team_scope_does_not_reach_other_team() {
        let m = actor(Role::Manager);
        let other = target("mem-00000002", Some("tea-00000002"), Some("loc-00000001"));
        assert!(!m.can(Section::Decisions, Action::Delete, &other));
    }

    #[test]
    fn admin_reaches_everything() {
        let a = actor(Role::Admin);
        let far = target("mem-00000099", Some("tea-00000099"), Some("loc-00000099"));
        for action in [Action::View, Action::Edit, Action::Delete] {
            assert!(a.can(Section::Channels, action, &far));
        }
        assert_eq!(a.list_filter(Section::Notes), ScopeFilter::Unrestricted);
    }

    #[test]
    fn actor_without_team_falls_back_to_self() {
        let a = Actor {
            team_id: None,
            ..actor(Role::Member)
        };
        let untagged = Target::new("mem-00000002", ConnectedTo::default());
        assert!(!a.can(Section::Notes, Action::View, &untagged));
    }

    #[test]
    fn matrix_lists_every_section() {
        let rows = actor(Role::Member).matrix();
        assert_eq!(rows.len(), Section::ALL.len());
        let members = rows.iter().find(|r| r.section == Section::Members).unwrap();
        assert_eq!(members.view, Some(Scope::Company));
        assert_eq!(members.edit, None);
    }
}
