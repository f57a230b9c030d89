//! The caller's own notifications.

use axum::extract::{Path, State};
use huddle_core::entities::Notification;
use serde::Deserialize;

use crate::AppState;
use crate::auth::Caller;
use crate::response::{ApiResult, AppQuery, ok, paged};

#[derive(Debug, Default, Deserialize)]
pub struct NotificationParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    #[serde(default)]
    pub unread: bool,
}

pub async fn list_notifications(
    State(state): State<AppState>,
    caller: Caller,
    AppQuery(params): AppQuery<NotificationParams>,
) -> ApiResult<Vec<Notification>> {
    let page = state
        .svc
        .list_notifications(
            caller.id(),
            params.unread,
            params.page.unwrap_or(1).max(1),
            state.general.page_size(params.limit),
        )
        .await?;
    Ok(paged(page))
}

pub async fn mark_read(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> ApiResult<Notification> {
    Ok(ok(state.svc.mark_notification_read(caller.id(), &id).await?))
}
