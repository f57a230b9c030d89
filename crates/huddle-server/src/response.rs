//! Success envelope and extractors that reject with [`ApiError`].

use axum::Json;
use axum::extract::{FromRequest, FromRequestParts};
use axum::http::StatusCode;
use huddle_core::responses::{Page, Pagination};
use serde::Serialize;

use crate::error::ApiError;

/// `{ "success": true, "data": ..., "pagination"?: ... }`
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

pub type ApiResult<T> = Result<Json<Envelope<T>>, ApiError>;

pub const fn ok<T>(data: T) -> Json<Envelope<T>> {
    Json(Envelope {
        success: true,
        data,
        pagination: None,
    })
}

pub const fn created<T>(data: T) -> (StatusCode, Json<Envelope<T>>) {
    (StatusCode::CREATED, ok(data))
}

pub fn paged<T>(page: Page<T>) -> Json<Envelope<Vec<T>>> {
    Json(Envelope {
        success: true,
        data: page.items,
        pagination: Some(page.pagination),
    })
}

#[derive(Debug, Serialize)]
pub struct Deleted {
    pub id: String,
}

/// JSON body whose parse failures use the error envelope.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct AppJson<T>(pub T);

/// Query string whose parse failures use the error envelope.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct AppQuery<T>(pub T);
