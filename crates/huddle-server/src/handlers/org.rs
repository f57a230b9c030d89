//! Locations, teams, and members.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use huddle_core::entities::{ConnectedTo, Location, Member, Team};
use huddle_core::permissions::{Action, Section, Target};
use huddle_db::repos::member::NewMember;
use huddle_db::updates::location::LocationUpdate;
use huddle_db::updates::member::MemberUpdate;
use huddle_db::updates::team::TeamUpdate;
use serde::Deserialize;

use super::ListParams;
use crate::AppState;
use crate::auth::{Caller, member_target, team_target};
use crate::error::ApiError;
use crate::response::{
    ApiResult, AppJson, AppQuery, Deleted, Envelope, created, ok, paged,
};

// ---------------------------------------------------------------------------
// Locations
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct NewLocation {
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
}

pub async fn list_locations(
    State(state): State<AppState>,
    caller: Caller,
    AppQuery(params): AppQuery<ListParams>,
) -> ApiResult<Vec<Location>> {
    caller.require(Section::Locations, Action::View, &Target::default())?;
    let page = state
        .svc
        .list_locations(params.page(), params.limit(&state))
        .await?;
    Ok(paged(page))
}

pub async fn create_location(
    State(state): State<AppState>,
    caller: Caller,
    AppJson(input): AppJson<NewLocation>,
) -> Result<(StatusCode, Json<Envelope<Location>>), ApiError> {
    caller.require(Section::Locations, Action::Edit, &Target::default())?;
    let location = state
        .svc
        .create_location(Some(caller.id()), &input.name, input.address.as_deref())
        .await?;
    Ok(created(location))
}

pub async fn get_location(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> ApiResult<Location> {
    caller.require(Section::Locations, Action::View, &Target::default())?;
    Ok(ok(state.svc.get_location(&id).await?))
}

pub async fn update_location(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
    AppJson(update): AppJson<LocationUpdate>,
) -> ApiResult<Location> {
    caller.require(Section::Locations, Action::Edit, &location_target(&id))?;
    let location = state
        .svc
        .update_location(Some(caller.id()), &id, update)
        .await?;
    Ok(ok(location))
}

pub async fn delete_location(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> ApiResult<Deleted> {
    caller.require(Section::Locations, Action::Delete, &location_target(&id))?;
    state.svc.delete_location(Some(caller.id()), &id).await?;
    Ok(ok(Deleted { id }))
}

fn location_target(id: &str) -> Target {
    Target {
        owner_id: None,
        connected_to: ConnectedTo {
            location_id: Some(id.to_string()),
            ..ConnectedTo::default()
        },
    }
}

// ---------------------------------------------------------------------------
// Teams
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct NewTeam {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location_id: Option<String>,
}

pub async fn list_teams(
    State(state): State<AppState>,
    caller: Caller,
    AppQuery(params): AppQuery<ListParams>,
) -> ApiResult<Vec<Team>> {
    caller.require(Section::Teams, Action::View, &Target::default())?;
    let page = state
        .svc
        .list_teams(
            params.location_id.as_deref(),
            params.page(),
            params.limit(&state),
        )
        .await?;
    Ok(paged(page))
}

pub async fn create_team(
    State(state): State<AppState>,
    caller: Caller,
    AppJson(input): AppJson<NewTeam>,
) -> Result<(StatusCode, Json<Envelope<Team>>), ApiError> {
    let target = Target {
        owner_id: None,
        connected_to: ConnectedTo {
            location_id: input.location_id.clone(),
            ..ConnectedTo::default()
        },
    };
    caller.require(Section::Teams, Action::Edit, &target)?;
    let team = state
        .svc
        .create_team(
            Some(caller.id()),
            &input.name,
            input.description.as_deref(),
            input.location_id.as_deref(),
        )
        .await?;
    Ok(created(team))
}

pub async fn get_team(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> ApiResult<Team> {
    let team = state.svc.get_team(&id).await?;
    caller.require(Section::Teams, Action::View, &team_target(&team))?;
    Ok(ok(team))
}

pub async fn update_team(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
    AppJson(update): AppJson<TeamUpdate>,
) -> ApiResult<Team> {
    let team = state.svc.get_team(&id).await?;
    caller.require(Section::Teams, Action::Edit, &team_target(&team))?;
    if let Some(location_id) = &update.location_id {
        let moved = Team {
            location_id: location_id.clone(),
            ..team
        };
        caller.require(Section::Teams, Action::Edit, &team_target(&moved))?;
    }
    let team = state.svc.update_team(Some(caller.id()), &id, update).await?;
    Ok(ok(team))
}

pub async fn delete_team(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> ApiResult<Deleted> {
    let team = state.svc.get_team(&id).await?;
    caller.require(Section::Teams, Action::Delete, &team_target(&team))?;
    state.svc.delete_team(Some(caller.id()), &id).await?;
    Ok(ok(Deleted { id }))
}

// ---------------------------------------------------------------------------
// Members
// ---------------------------------------------------------------------------

pub async fn list_members(
    State(state): State<AppState>,
    caller: Caller,
    AppQuery(params): AppQuery<ListParams>,
) -> ApiResult<Vec<Member>> {
    caller.require(Section::Members, Action::View, &Target::default())?;
    let page = state
        .svc
        .list_members(
            params.team_id.as_deref(),
            params.location_id.as_deref(),
            params.page(),
            params.limit(&state),
        )
        .await?;
    Ok(paged(page))
}

pub async fn create_member(
    State(state): State<AppState>,
    caller: Caller,
    AppJson(input): AppJson<NewMember>,
) -> Result<(StatusCode, Json<Envelope<Member>>), ApiError> {
    caller.require_role_grant(input.role)?;
    let location_id = match (&input.location_id, &input.team_id) {
        (None, Some(team_id)) => state.svc.get_team(team_id).await?.location_id,
        (location_id, _) => location_id.clone(),
    };
    let target = Target {
        owner_id: None,
        connected_to: ConnectedTo {
            location_id,
            team_id: input.team_id.clone(),
            member_id: None,
        },
    };
    caller.require(Section::Members, Action::Edit, &target)?;
    let member = state.svc.create_member(Some(caller.id()), input).await?;
    Ok(created(member))
}

pub async fn get_member(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> ApiResult<Member> {
    let member = state.svc.get_member(&id).await?;
    caller.require(Section::Members, Action::View, &member_target(&member))?;
    Ok(ok(member))
}

pub async fn update_member(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
    AppJson(update): AppJson<MemberUpdate>,
) -> ApiResult<Member> {
    let member = state.svc.get_member(&id).await?;
    caller.require(Section::Members, Action::Edit, &member_target(&member))?;
    if let Some(role) = update.role {
        caller.require_role_grant(role)?;
    }
    if update.team_id.is_some() || update.location_id.is_some() {
        let moved = Member {
            team_id: update.team_id.clone().unwrap_or(member.team_id.clone()),
            location_id: update
                .location_id
                .clone()
                .unwrap_or(member.location_id.clone()),
            ..member
        };
        caller.require(Section::Members, Action::Edit, &member_target(&moved))?;
    }
    let member = state
        .svc
        .update_member(Some(caller.id()), &id, update)
        .await?;
    Ok(ok(member))
}

pub async fn delete_member(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> ApiResult<Deleted> {
    let member = state.svc.get_member(&id).await?;
    caller.require(Section::Members, Action::Delete, &member_target(&member))?;
    state.svc.delete_member(Some(caller.id()), &id).await?;
    Ok(ok(Deleted { id }))
}
