use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use huddle_core::entities::Todo;
use huddle_core::permissions::{Action, Section, Target};
use huddle_db::repos::todo::NewTodo;
use huddle_db::updates::todo::TodoUpdate;

use super::ListParams;
use crate::AppState;
use crate::auth::Caller;
use crate::error::ApiError;
use crate::response::{ApiResult, AppJson, AppQuery, Deleted, Envelope, created, ok, paged};
use crate::views::TodoDetail;

fn target(todo: &Todo) -> Target {
    Target::new(todo.created_by.clone(), todo.connected_to.clone())
}

pub async fn list_todos(
    State(state): State<AppState>,
    caller: Caller,
    AppQuery(params): AppQuery<ListParams>,
) -> ApiResult<Vec<Todo>> {
    let query = params.query(&state, caller.actor.list_filter(Section::Todos));
    Ok(paged(state.svc.list_todos(&query).await?))
}

pub async fn create_todo(
    State(state): State<AppState>,
    caller: Caller,
    AppJson(input): AppJson<NewTodo>,
) -> Result<(StatusCode, Json<Envelope<Todo>>), ApiError> {
    let target = Target::new(caller.id(), input.connected_to.clone());
    caller.require(Section::Todos, Action::Edit, &target)?;
    let todo = state.svc.create_todo(caller.id(), input).await?;
    Ok(created(todo))
}

pub async fn get_todo(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> ApiResult<TodoDetail> {
    let todo = state.svc.get_todo(&id).await?;
    caller.require(Section::Todos, Action::View, &target(&todo))?;
    Ok(ok(TodoDetail::load(&state.svc, todo).await?))
}

/// The assignee may always move their own todo along, whatever its owner.
pub async fn update_todo(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
    AppJson(update): AppJson<TodoUpdate>,
) -> ApiResult<Todo> {
    let todo = state.svc.get_todo(&id).await?;
    let status_only = update.status.is_some()
        && update.title.is_none()
        && update.description.is_none()
        && update.priority.is_none()
        && update.assigned_to.is_none()
        && update.due_date.is_none()
        && update.list_id.is_none()
        && update.linked_chat.is_none()
        && update.connected_to.is_none();
    let is_assignee = todo.assigned_to.as_deref() == Some(caller.id());
    if !(status_only && is_assignee) {
        caller.require(Section::Todos, Action::Edit, &target(&todo))?;
    }
    if let Some(connected_to) = &update.connected_to {
        let moved = Target::new(todo.created_by.clone(), connected_to.clone());
        caller.require(Section::Todos, Action::Edit, &moved)?;
    }
    Ok(ok(state.svc.update_todo(Some(caller.id()), &id, update).await?))
}

pub async fn delete_todo(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> ApiResult<Deleted> {
    let todo = state.svc.get_todo(&id).await?;
    caller.require(Section::Todos, Action::Delete, &target(&todo))?;
    state.svc.delete_todo(Some(caller.id()), &id).await?;
    Ok(ok(Deleted { id }))
}
