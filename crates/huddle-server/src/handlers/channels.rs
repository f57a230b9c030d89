//! Channels and their messages. Messages are gated by the channel section:
//! reading or posting needs view access to the channel, changing a message
//! needs edit access with the message's author as owner.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use huddle_core::entities::{Channel, Message};
use huddle_core::permissions::{Action, Section, Target};
use huddle_db::repos::channel::NewChannel;
use huddle_db::repos::message::MessageWrite;
use huddle_db::updates::channel::ChannelUpdate;
use serde::Deserialize;

use super::ListParams;
use crate::AppState;
use crate::auth::Caller;
use crate::error::ApiError;
use crate::response::{ApiResult, AppJson, AppQuery, Deleted, Envelope, created, ok, paged};
use crate::views::MessageDetail;

fn target(channel: &Channel) -> Target {
    Target::new(channel.created_by.clone(), channel.connected_to.clone())
}

pub async fn list_channels(
    State(state): State<AppState>,
    caller: Caller,
    AppQuery(params): AppQuery<ListParams>,
) -> ApiResult<Vec<Channel>> {
    let query = params.query(&state, caller.actor.list_filter(Section::Channels));
    Ok(paged(state.svc.list_channels(&query).await?))
}

pub async fn create_channel(
    State(state): State<AppState>,
    caller: Caller,
    AppJson(input): AppJson<NewChannel>,
) -> Result<(StatusCode, Json<Envelope<Channel>>), ApiError> {
    let target = Target::new(caller.id(), input.connected_to.clone());
    caller.require(Section::Channels, Action::Edit, &target)?;
    let channel = state.svc.create_channel(caller.id(), input).await?;
    Ok(created(channel))
}

pub async fn get_channel(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> ApiResult<Channel> {
    let channel = state.svc.get_channel(&id).await?;
    caller.require(Section::Channels, Action::View, &target(&channel))?;
    Ok(ok(channel))
}

pub async fn update_channel(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
    AppJson(update): AppJson<ChannelUpdate>,
) -> ApiResult<Channel> {
    let channel = state.svc.get_channel(&id).await?;
    caller.require(Section::Channels, Action::Edit, &target(&channel))?;
    if let Some(connected_to) = &update.connected_to {
        let moved = Target::new(channel.created_by.clone(), connected_to.clone());
        caller.require(Section::Channels, Action::Edit, &moved)?;
    }
    let channel = state
        .svc
        .update_channel(Some(caller.id()), &id, update)
        .await?;
    Ok(ok(channel))
}

pub async fn delete_channel(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> ApiResult<Deleted> {
    let channel = state.svc.get_channel(&id).await?;
    caller.require(Section::Channels, Action::Delete, &target(&channel))?;
    state.svc.delete_channel(Some(caller.id()), &id).await?;
    Ok(ok(Deleted { id }))
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct MessageBody {
    pub text: String,
}

/// A message is owned by its author and scoped like its channel.
async fn message_target(state: &AppState, message: &Message) -> Result<Target, ApiError> {
    let channel = state.svc.get_channel(&message.channel_id).await?;
    Ok(Target::new(message.member_id.clone(), channel.connected_to))
}

pub async fn list_messages(
    State(state): State<AppState>,
    caller: Caller,
    Path(channel_id): Path<String>,
    AppQuery(params): AppQuery<ListParams>,
) -> ApiResult<Vec<Message>> {
    let channel = state.svc.get_channel(&channel_id).await?;
    caller.require(Section::Channels, Action::View, &target(&channel))?;
    let page = state
        .svc
        .list_messages(&channel_id, params.page(), params.limit(&state))
        .await?;
    Ok(paged(page))
}

pub async fn post_message(
    State(state): State<AppState>,
    caller: Caller,
    Path(channel_id): Path<String>,
    AppJson(body): AppJson<MessageBody>,
) -> Result<(StatusCode, Json<Envelope<MessageWrite>>), ApiError> {
    let channel = state.svc.get_channel(&channel_id).await?;
    caller.require(Section::Channels, Action::View, &target(&channel))?;
    let written = state
        .svc
        .create_message(caller.id(), &channel_id, &body.text)
        .await?;
    Ok(created(written))
}

pub async fn get_message(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> ApiResult<MessageDetail> {
    let message = state.svc.get_message(&id).await?;
    let channel = state.svc.get_channel(&message.channel_id).await?;
    caller.require(Section::Channels, Action::View, &target(&channel))?;
    Ok(ok(MessageDetail::load(&state.svc, message).await?))
}

pub async fn update_message(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
    AppJson(body): AppJson<MessageBody>,
) -> ApiResult<MessageWrite> {
    let message = state.svc.get_message(&id).await?;
    let target = message_target(&state, &message).await?;
    caller.require(Section::Channels, Action::Edit, &target)?;
    let written = state
        .svc
        .update_message(Some(caller.id()), &id, &body.text)
        .await?;
    Ok(ok(written))
}

pub async fn delete_message(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> ApiResult<Deleted> {
    let message = state.svc.get_message(&id).await?;
    let target = message_target(&state, &message).await?;
    caller.require(Section::Channels, Action::Delete, &target)?;
    state.svc.delete_message(Some(caller.id()), &id).await?;
    Ok(ok(Deleted { id }))
}
