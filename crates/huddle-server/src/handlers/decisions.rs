use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use huddle_core::entities::Decision;
use huddle_core::permissions::{Action, Section, Target};
use huddle_db::repos::decision::NewDecision;
use huddle_db::updates::decision::DecisionUpdate;

use super::ListParams;
use crate::AppState;
use crate::auth::Caller;
use crate::error::ApiError;
use crate::response::{ApiResult, AppJson, AppQuery, Deleted, Envelope, created, ok, paged};

fn target(decision: &Decision) -> Target {
    Target::new(decision.created_by.clone(), decision.connected_to.clone())
}

pub async fn list_decisions(
    State(state): State<AppState>,
    caller: Caller,
    AppQuery(params): AppQuery<ListParams>,
) -> ApiResult<Vec<Decision>> {
    let query = params.query(&state, caller.actor.list_filter(Section::Decisions));
    Ok(paged(state.svc.list_decisions(&query).await?))
}

pub async fn create_decision(
    State(state): State<AppState>,
    caller: Caller,
    AppJson(input): AppJson<NewDecision>,
) -> Result<(StatusCode, Json<Envelope<Decision>>), ApiError> {
    let target = Target::new(caller.id(), input.connected_to.clone());
    caller.require(Section::Decisions, Action::Edit, &target)?;
    let decision = state.svc.create_decision(caller.id(), input).await?;
    Ok(created(decision))
}

pub async fn get_decision(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> ApiResult<Decision> {
    let decision = state.svc.get_decision(&id).await?;
    caller.require(Section::Decisions, Action::View, &target(&decision))?;
    Ok(ok(decision))
}

pub async fn update_decision(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
    AppJson(update): AppJson<DecisionUpdate>,
) -> ApiResult<Decision> {
    let decision = state.svc.get_decision(&id).await?;
    caller.require(Section::Decisions, Action::Edit, &target(&decision))?;
    if let Some(connected_to) = &update.connected_to {
        let moved = Target::new(decision.created_by.clone(), connected_to.clone());
        caller.require(Section::Decisions, Action::Edit, &moved)?;
    }
    let decision = state
        .svc
        .update_decision(Some(caller.id()), &id, update)
        .await?;
    Ok(ok(decision))
}

pub async fn delete_decision(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> ApiResult<Deleted> {
    let decision = state.svc.get_decision(&id).await?;
    caller.require(Section::Decisions, Action::Delete, &target(&decision))?;
    state.svc.delete_decision(Some(caller.id()), &id).await?;
    Ok(ok(Deleted { id }))
}
