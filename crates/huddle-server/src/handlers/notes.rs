//! Notes and todo extraction.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use huddle_core::entities::{Note, Todo};
use huddle_core::permissions::{Action, Section, Target};
use huddle_db::repos::note::{NewNote, NoteWrite};
use huddle_db::repos::todo_sync::TodoSyncReport;
use huddle_db::updates::note::NoteUpdate;

use super::ListParams;
use crate::AppState;
use crate::auth::Caller;
use crate::error::ApiError;
use crate::response::{ApiResult, AppJson, AppQuery, Deleted, Envelope, created, ok, paged};
use crate::views::NoteDetail;

fn target(note: &Note) -> Target {
    Target::new(note.author_id.clone(), note.connected_to.clone())
}

pub async fn list_notes(
    State(state): State<AppState>,
    caller: Caller,
    AppQuery(params): AppQuery<ListParams>,
) -> ApiResult<Vec<Note>> {
    let query = params.query(&state, caller.actor.list_filter(Section::Notes));
    Ok(paged(state.svc.list_notes(&query).await?))
}

pub async fn create_note(
    State(state): State<AppState>,
    caller: Caller,
    AppJson(input): AppJson<NewNote>,
) -> Result<(StatusCode, Json<Envelope<NoteWrite>>), ApiError> {
    let target = Target::new(caller.id(), input.connected_to.clone());
    caller.require(Section::Notes, Action::Edit, &target)?;
    let written = state.svc.create_note(caller.id(), input).await?;
    Ok(created(written))
}

pub async fn get_note(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> ApiResult<NoteDetail> {
    let note = state.svc.get_note(&id).await?;
    caller.require(Section::Notes, Action::View, &target(&note))?;
    Ok(ok(NoteDetail::load(&state.svc, note).await?))
}

pub async fn update_note(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
    AppJson(update): AppJson<NoteUpdate>,
) -> ApiResult<NoteWrite> {
    let note = state.svc.get_note(&id).await?;
    caller.require(Section::Notes, Action::Edit, &target(&note))?;
    if let Some(connected_to) = &update.connected_to {
        let moved = Target::new(note.author_id.clone(), connected_to.clone());
        caller.require(Section::Notes, Action::Edit, &moved)?;
    }
    Ok(ok(state.svc.update_note(Some(caller.id()), &id, update).await?))
}

pub async fn delete_note(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> ApiResult<Deleted> {
    let note = state.svc.get_note(&id).await?;
    caller.require(Section::Notes, Action::Delete, &target(&note))?;
    state.svc.delete_note(Some(caller.id()), &id).await?;
    Ok(ok(Deleted { id }))
}

/// `POST /notes/{id}/todos/sync`
pub async fn sync_todos(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> ApiResult<TodoSyncReport> {
    let note = state.svc.get_note(&id).await?;
    caller.require(Section::Notes, Action::Edit, &target(&note))?;
    let report = state.svc.sync_todos_from_note(Some(caller.id()), &id).await?;
    Ok(ok(report))
}

/// `GET /notes/{id}/todos`
pub async fn note_todos(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> ApiResult<Vec<Todo>> {
    let note = state.svc.get_note(&id).await?;
    caller.require(Section::Notes, Action::View, &target(&note))?;
    Ok(ok(state.svc.todos_for_note(&id).await?))
}
