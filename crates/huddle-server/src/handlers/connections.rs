//! Bi-directional connections between linkable documents.
//!
//! Connecting or disconnecting needs edit access to the source and view
//! access to the target. Listing needs view access to the document.
//! Disconnecting tolerates one side being gone: edit access to the
//! surviving document is then enough.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use huddle_core::entities::{Connection, EntityRef, LinkedEntity};
use huddle_core::enums::EntityType;
use huddle_core::permissions::{Action, Section, Target};
use huddle_db::error::DatabaseError;
use serde::Deserialize;

use crate::AppState;
use crate::auth::{Caller, linkable_target};
use crate::error::ApiError;
use crate::response::{ApiResult, AppJson, AppQuery, Envelope, created, ok, paged};

#[derive(Debug, Deserialize)]
pub struct ConnectionParams {
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    pub id: String,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

async fn authorize(state: &AppState, caller: &Caller, connection: &Connection) -> Result<(), ApiError> {
    let (section, source) = linkable_target(state, &connection.source).await?;
    caller.require(section, Action::Edit, &source)?;
    let (section, target) = linkable_target(state, &connection.target).await?;
    caller.require(section, Action::View, &target)
}

/// Like [`linkable_target`], but a missing document is `None`.
async fn surviving_target(
    state: &AppState,
    entity: &EntityRef,
) -> Result<Option<(Section, Target)>, ApiError> {
    match linkable_target(state, entity).await {
        Ok(found) => Ok(Some(found)),
        Err(ApiError::Database(DatabaseError::NotFound { .. })) => Ok(None),
        Err(err) => Err(err),
    }
}

async fn authorize_removal(
    state: &AppState,
    caller: &Caller,
    connection: &Connection,
) -> Result<(), ApiError> {
    let source = surviving_target(state, &connection.source).await?;
    let target = surviving_target(state, &connection.target).await?;
    match (source, target) {
        (Some((section, source)), target) => {
            caller.require(section, Action::Edit, &source)?;
            match target {
                Some((section, target)) => caller.require(section, Action::View, &target),
                None => Ok(()),
            }
        }
        (None, Some((section, target))) => caller.require(section, Action::Edit, &target),
        // Neither exists: the service reports not-found.
        (None, None) => Ok(()),
    }
}

pub async fn list_connections(
    State(state): State<AppState>,
    caller: Caller,
    AppQuery(params): AppQuery<ConnectionParams>,
) -> ApiResult<Vec<LinkedEntity>> {
    let entity = EntityRef::new(params.entity_type, params.id);
    let (section, target) = linkable_target(&state, &entity).await?;
    caller.require(section, Action::View, &target)?;
    let page = state
        .svc
        .list_connections(
            &entity,
            params.page.unwrap_or(1).max(1),
            state.general.page_size(params.limit),
        )
        .await?;
    Ok(paged(page))
}

pub async fn create_connection(
    State(state): State<AppState>,
    caller: Caller,
    AppJson(body): AppJson<Connection>,
) -> Result<(StatusCode, Json<Envelope<Connection>>), ApiError> {
    authorize(&state, &caller, &body).await?;
    let connection = state
        .svc
        .create_connection(Some(caller.id()), &body.source, &body.target)
        .await?;
    Ok(created(connection))
}

pub async fn delete_connection(
    State(state): State<AppState>,
    caller: Caller,
    AppJson(body): AppJson<Connection>,
) -> ApiResult<Connection> {
    authorize_removal(&state, &caller, &body).await?;
    state
        .svc
        .delete_connection(Some(caller.id()), &body.source, &body.target)
        .await?;
    Ok(ok(body))
}
