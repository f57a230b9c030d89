use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use huddle_core::entities::Event;
use huddle_core::permissions::{Action, Section, Target};
use huddle_db::repos::event::NewEvent;
use huddle_db::updates::event::EventUpdate;

use super::ListParams;
use crate::AppState;
use crate::auth::Caller;
use crate::error::ApiError;
use crate::response::{ApiResult, AppJson, AppQuery, Deleted, Envelope, created, ok, paged};

fn target(event: &Event) -> Target {
    Target::new(event.created_by.clone(), event.connected_to.clone())
}

pub async fn list_events(
    State(state): State<AppState>,
    caller: Caller,
    AppQuery(params): AppQuery<ListParams>,
) -> ApiResult<Vec<Event>> {
    let query = params.query(&state, caller.actor.list_filter(Section::Events));
    Ok(paged(state.svc.list_events(&query).await?))
}

pub async fn create_event(
    State(state): State<AppState>,
    caller: Caller,
    AppJson(input): AppJson<NewEvent>,
) -> Result<(StatusCode, Json<Envelope<Event>>), ApiError> {
    let target = Target::new(caller.id(), input.connected_to.clone());
    caller.require(Section::Events, Action::Edit, &target)?;
    let event = state.svc.create_event(caller.id(), input).await?;
    Ok(created(event))
}

pub async fn get_event(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> ApiResult<Event> {
    let event = state.svc.get_event(&id).await?;
    caller.require(Section::Events, Action::View, &target(&event))?;
    Ok(ok(event))
}

pub async fn update_event(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
    AppJson(update): AppJson<EventUpdate>,
) -> ApiResult<Event> {
    let event = state.svc.get_event(&id).await?;
    caller.require(Section::Events, Action::Edit, &target(&event))?;
    if let Some(connected_to) = &update.connected_to {
        let moved = Target::new(event.created_by.clone(), connected_to.clone());
        caller.require(Section::Events, Action::Edit, &moved)?;
    }
    let event = state
        .svc
        .update_event(Some(caller.id()), &id, update)
        .await?;
    Ok(ok(event))
}

pub async fn delete_event(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> ApiResult<Deleted> {
    let event = state.svc.get_event(&id).await?;
    caller.require(Section::Events, Action::Delete, &target(&event))?;
    state.svc.delete_event(Some(caller.id()), &id).await?;
    Ok(ok(Deleted { id }))
}
