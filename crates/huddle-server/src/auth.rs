//! Caller identification and permission checks.
//!
//! The caller names themselves with the `x-member-id` header. There is no
//! session or token: the header must name an existing member.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use huddle_core::entities::{ConnectedTo, EntityRef, Member, Team};
use huddle_core::enums::{EntityType, Role};
use huddle_core::permissions::{Action, Actor, Section, Target};

use crate::AppState;
use crate::error::ApiError;

pub const MEMBER_HEADER: &str = "x-member-id";

/// The authenticated caller.
#[derive(Debug, Clone)]
pub struct Caller {
    pub member: Member,
    pub actor: Actor,
}

impl FromRequestParts<AppState> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let id = parts
            .headers
            .get(MEMBER_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| ApiError::Unauthorized(format!("missing {MEMBER_HEADER} header")))?;

        let member = state
            .svc
            .find_member(id)
            .await?
            .ok_or_else(|| ApiError::Unauthorized(format!("unknown member {id}")))?;
        let actor = Actor::from_member(&member);
        Ok(Self { member, actor })
    }
}

impl Caller {
    #[must_use]
    pub fn id(&self) -> &str {
        &self.member.id
    }

    /// Fail with 403 unless the caller may perform `action` on `target`.
    pub fn require(&self, section: Section, action: Action, target: &Target) -> Result<(), ApiError> {
        if self.actor.can(section, action, target) {
            Ok(())
        } else {
            tracing::debug!(
                member_id = %self.member.id,
                ?section,
                ?action,
                "permission denied"
            );
            Err(ApiError::forbidden(format_args!(
                "{} {}",
                action_verb(action),
                section_noun(section)
            )))
        }
    }

    /// Only admins hand out roles other than `member`.
    pub fn require_role_grant(&self, role: Role) -> Result<(), ApiError> {
        if role == Role::Member || self.actor.role == Role::Admin {
            Ok(())
        } else {
            Err(ApiError::forbidden(format_args!("grant the {role} role")))
        }
    }
}

const fn action_verb(action: Action) -> &'static str {
    match action {
        Action::View => "view",
        Action::Edit => "edit",
        Action::Delete => "delete",
    }
}

const fn section_noun(section: Section) -> &'static str {
    match section {
        Section::Locations => "locations",
        Section::Teams => "teams",
        Section::Members => "members",
        Section::Notes => "notes",
        Section::Todos => "todos",
        Section::Decisions => "decisions",
        Section::Events => "events",
        Section::Channels => "channels",
    }
}

/// A team as a permission target: scoped to itself and its location.
#[must_use]
pub fn team_target(team: &Team) -> Target {
    Target {
        owner_id: None,
        connected_to: ConnectedTo {
            location_id: team.location_id.clone(),
            team_id: Some(team.id.clone()),
            member_id: None,
        },
    }
}

/// A member as a permission target: scoped to their own placement.
#[must_use]
pub fn member_target(member: &Member) -> Target {
    Target {
        owner_id: None,
        connected_to: ConnectedTo {
            location_id: member.location_id.clone(),
            team_id: member.team_id.clone(),
            member_id: Some(member.id.clone()),
        },
    }
}

/// Load a linkable document and describe it as a permission target.
pub async fn linkable_target(
    state: &AppState,
    entity: &EntityRef,
) -> Result<(Section, Target), ApiError> {
    let svc = &state.svc;
    let target = match entity.entity_type {
        EntityType::Note => {
            let note = svc.get_note(&entity.id).await?;
            Target::new(note.author_id, note.connected_to)
        }
        EntityType::Todo => {
            let todo = svc.get_todo(&entity.id).await?;
            Target::new(todo.created_by, todo.connected_to)
        }
        EntityType::Decision => {
            let decision = svc.get_decision(&entity.id).await?;
            Target::new(decision.created_by, decision.connected_to)
        }
        EntityType::Event => {
            let event = svc.get_event(&entity.id).await?;
            Target::new(event.created_by, event.connected_to)
        }
        EntityType::Channel => {
            let channel = svc.get_channel(&entity.id).await?;
            Target::new(channel.created_by, channel.connected_to)
        }
        other => {
            return Err(ApiError::BadRequest(format!(
                "{other} documents cannot be connected"
            )));
        }
    };
    let section = Section::for_entity(entity.entity_type)
        .ok_or_else(|| ApiError::BadRequest(format!("no section for {}", entity.entity_type)))?;
    Ok((section, target))
}
