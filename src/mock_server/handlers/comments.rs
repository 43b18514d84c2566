//! Comment endpoint handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use tokio::sync::RwLock;

use super::{error_code, not_found, paginate, require_session, OffsetQuery};
use crate::mock_server::state::MockState;
use crate::{Comment, CommentAuthor};

/// GET /users/{author}/projects/{id}/comments
pub async fn list_comments(
    State(state): State<Arc<RwLock<MockState>>>,
    Path((_author, id)): Path<(String, u64)>,
    Query(query): Query<OffsetQuery>,
) -> Response {
    let state = state.read().await;
    match paginate(state.list_comments(id, None), &query) {
        Ok(page) => (StatusCode::OK, Json(page)).into_response(),
        Err(response) => response,
    }
}

/// GET /users/{author}/projects/{id}/comments/{comment_id}/replies
pub async fn list_replies(
    State(state): State<Arc<RwLock<MockState>>>,
    Path((_author, id, comment_id)): Path<(String, u64, u64)>,
    Query(query): Query<OffsetQuery>,
) -> Response {
    let state = state.read().await;
    match paginate(state.list_comments(id, Some(comment_id)), &query) {
        Ok(page) => (StatusCode::OK, Json(page)).into_response(),
        Err(response) => response,
    }
}

/// GET /users/{author}/projects/{id}/comments/{comment_id}
pub async fn get_comment(
    State(state): State<Arc<RwLock<MockState>>>,
    Path((_author, id, comment_id)): Path<(String, u64, u64)>,
) -> Response {
    let state = state.read().await;
    match state.get_comment(id, comment_id) {
        Some(comment) => (StatusCode::OK, Json(comment.clone())).into_response(),
        None => not_found(),
    }
}

/// POST /proxy/comments/project/{id}/
///
/// `parent_id` and `commentee_id` are either numbers or empty strings.
pub async fn post_comment(
    State(state): State<Arc<RwLock<MockState>>>,
    Path(id): Path<u64>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Err(denied) = require_session(&headers) {
        return denied;
    }
    let Some(content) = body.get("content").and_then(Value::as_str) else {
        return error_code(StatusCode::BAD_REQUEST, "BadRequest", "content is required");
    };
    let parent_id = body.get("parent_id").and_then(Value::as_u64);
    let commentee_id = body.get("commentee_id").and_then(Value::as_u64);

    let mut state = state.write().await;
    match state.projects.get(&id) {
        Some(project) if project.comments_allowed => {}
        Some(_) => return error_code(StatusCode::FORBIDDEN, "Forbidden", "comments are off"),
        None => return not_found(),
    }

    let now = Some(Utc::now());
    let comment = Comment {
        id: state.next_comment_id(),
        parent_id,
        commentee_id,
        content: content.to_string(),
        datetime_created: now,
        datetime_modified: now,
        visibility: Some("visible".to_string()),
        author: Some(CommentAuthor {
            id: None,
            username: state.session_user.clone(),
            scratchteam: false,
            image: None,
        }),
        reply_count: 0,
    };

    let thread = state.comments.entry(id).or_default();
    if let Some(parent) = parent_id.and_then(|p| thread.iter_mut().find(|c| c.id == p)) {
        parent.reply_count += 1;
    }
    thread.push(comment.clone());

    (StatusCode::OK, Json(comment)).into_response()
}

/// DELETE /proxy/comments/project/{id}/comment/{comment_id}/
pub async fn delete_comment(
    State(state): State<Arc<RwLock<MockState>>>,
    Path((id, comment_id)): Path<(u64, u64)>,
    headers: HeaderMap,
) -> Response {
    if let Err(denied) = require_session(&headers) {
        return denied;
    }
    let mut state = state.write().await;

    let Some(thread) = state.comments.get_mut(&id) else {
        return not_found();
    };
    let before = thread.len();
    thread.retain(|c| c.id != comment_id && c.parent_id != Some(comment_id));
    if thread.len() == before {
        return not_found();
    }
    (StatusCode::OK, Json(json!({}))).into_response()
}

/// DELETE /proxy/comments/project/{id}/comment/{comment_id}/report
pub async fn report_comment(
    State(state): State<Arc<RwLock<MockState>>>,
    Path((id, comment_id)): Path<(u64, u64)>,
    headers: HeaderMap,
) -> Response {
    if let Err(denied) = require_session(&headers) {
        return denied;
    }
    let mut state = state.write().await;

    if state.get_comment(id, comment_id).is_none() {
        return not_found();
    }
    state.reported_comments.push(comment_id);
    (StatusCode::OK, Json(json!({}))).into_response()
}
