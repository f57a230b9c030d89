//! # huddle-server
//!
//! JSON REST API over [`huddle_db::service::HuddleService`].
//!
//! Every route lives under `/api`. Callers identify themselves with the
//! `x-member-id` header, and each handler checks the permission matrix
//! against the documents it touches before calling the service.

pub mod auth;
pub mod cli;
pub mod error;
pub mod handlers;
pub mod response;
pub mod views;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use huddle_config::{GeneralConfig, ServerConfig};
use huddle_db::service::HuddleService;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use handlers::{
    channels, connections, decisions, events, notes, notifications, org, system, todos,
};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub svc: Arc<HuddleService>,
    pub general: GeneralConfig,
}

impl AppState {
    #[must_use]
    pub fn new(svc: HuddleService, general: GeneralConfig) -> Self {
        Self {
            svc: Arc::new(svc),
            general,
        }
    }
}

/// Build the full router, including tracing and optional CORS layers.
pub fn router(state: AppState, server: &ServerConfig) -> Router {
    let app = Router::new()
        .nest("/api", api_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http());
    if server.cors_permissive {
        app.layer(CorsLayer::permissive())
    } else {
        app
    }
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(system::health))
        .route("/permissions", get(system::permissions))
        // org
        .route(
            "/locations",
            get(org::list_locations).post(org::create_location),
        )
        .route(
            "/locations/{id}",
            get(org::get_location)
                .patch(org::update_location)
                .delete(org::delete_location),
        )
        .route("/teams", get(org::list_teams).post(org::create_team))
        .route(
            "/teams/{id}",
            get(org::get_team)
                .patch(org::update_team)
                .delete(org::delete_team),
        )
        .route("/members", get(org::list_members).post(org::create_member))
        .route(
            "/members/{id}",
            get(org::get_member)
                .patch(org::update_member)
                .delete(org::delete_member),
        )
        // documents
        .route("/notes", get(notes::list_notes).post(notes::create_note))
        .route(
            "/notes/{id}",
            get(notes::get_note)
                .patch(notes::update_note)
                .delete(notes::delete_note),
        )
        .route("/notes/{id}/todos", get(notes::note_todos))
        .route("/notes/{id}/todos/sync", post(notes::sync_todos))
        .route("/todos", get(todos::list_todos).post(todos::create_todo))
        .route(
            "/todos/{id}",
            get(todos::get_todo)
                .patch(todos::update_todo)
                .delete(todos::delete_todo),
        )
        .route(
            "/decisions",
            get(decisions::list_decisions).post(decisions::create_decision),
        )
        .route(
            "/decisions/{id}",
            get(decisions::get_decision)
                .patch(decisions::update_decision)
                .delete(decisions::delete_decision),
        )
        .route("/events", get(events::list_events).post(events::create_event))
        .route(
            "/events/{id}",
            get(events::get_event)
                .patch(events::update_event)
                .delete(events::delete_event),
        )
        .route(
            "/channels",
            get(channels::list_channels).post(channels::create_channel),
        )
        .route(
            "/channels/{id}",
            get(channels::get_channel)
                .patch(channels::update_channel)
                .delete(channels::delete_channel),
        )
        .route(
            "/channels/{id}/messages",
            get(channels::list_messages).post(channels::post_message),
        )
        .route(
            "/messages/{id}",
            get(channels::get_message)
                .patch(channels::update_message)
                .delete(channels::delete_message),
        )
        // connections and inbox
        .route(
            "/connections",
            get(connections::list_connections)
                .post(connections::create_connection)
                .delete(connections::delete_connection),
        )
        .route("/notifications", get(notifications::list_notifications))
        .route("/notifications/{id}/read", post(notifications::mark_read))
}
