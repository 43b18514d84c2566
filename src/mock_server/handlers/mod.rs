//! HTTP request handlers for the mock server.

pub mod comments;
pub mod projects;
pub mod social;

pub use comments::*;
pub use projects::*;
pub use social::*;

use axum::{
    http::{header::COOKIE, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use crate::MAX_BATCH;

/// `limit` and `offset` query parameters of listing endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct OffsetQuery {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

/// Apply offset pagination, refusing batches above [`MAX_BATCH`].
pub(crate) fn paginate<T: Clone>(items: Vec<&T>, query: &OffsetQuery) -> Result<Vec<T>, Response> {
    let limit = query.limit.unwrap_or(16);
    if limit > MAX_BATCH {
        return Err(error_code(
            StatusCode::BAD_REQUEST,
            "BadRequest",
            &format!("limit must be less than or equal to {MAX_BATCH}"),
        ));
    }
    let offset = query.offset.unwrap_or(0) as usize;

    Ok(items
        .into_iter()
        .skip(offset)
        .take(limit as usize)
        .cloned()
        .collect())
}

/// Error body in the platform's `{"code", "message"}` shape.
pub(crate) fn error_code(status: StatusCode, code: &str, message: &str) -> Response {
    (
        status,
        Json(serde_json::json!({ "code": code, "message": message })),
    )
        .into_response()
}

pub(crate) fn not_found() -> Response {
    error_code(StatusCode::NOT_FOUND, "NotFound", "")
}

/// Reject requests that carry no session cookie.
pub(crate) fn require_session(headers: &HeaderMap) -> Result<(), Response> {
    let logged_in = headers
        .get(COOKIE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|cookie| cookie.contains("scratchsessionsid"));
    if logged_in {
        Ok(())
    } else {
        Err((
            StatusCode::FORBIDDEN,
            Json(serde_json::json!({ "error": "Forbidden" })),
        )
            .into_response())
    }
}
