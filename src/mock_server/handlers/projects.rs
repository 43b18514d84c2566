//! Project endpoint handlers.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header::RETRY_AFTER, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::RwLock;

use super::{error_code, not_found, paginate, require_session, OffsetQuery};
use crate::mock_server::state::MockState;
use crate::RawProject;

/// Query parameters for explore and search.
#[derive(Debug, Default, Deserialize)]
pub struct ExploreParams {
    pub q: Option<String>,
    pub mode: Option<String>,
    pub language: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl ExploreParams {
    fn page(&self) -> OffsetQuery {
        OffsetQuery {
            limit: self.limit,
            offset: self.offset,
        }
    }
}

/// Query parameters for the project host.
#[derive(Debug, Default, Deserialize)]
pub struct TokenQuery {
    pub token: Option<String>,
}

/// GET /projects/{id}
pub async fn get_project(
    State(state): State<Arc<RwLock<MockState>>>,
    Path(id): Path<u64>,
) -> Response {
    let state = state.read().await;

    if state.rate_limited {
        return (
            StatusCode::TOO_MANY_REQUESTS,
            [(RETRY_AFTER, "5")],
            Json(json!({ "code": "TooManyRequests", "message": "" })),
        )
            .into_response();
    }

    match state.get_shared_project(id) {
        Some(project) => (StatusCode::OK, Json(project.clone())).into_response(),
        None => not_found(),
    }
}

/// PUT /projects/{id}
///
/// Accepts any subset of `title`, `instructions`, `description` and
/// `comments_allowed`, and answers with the updated record.
pub async fn update_project(
    State(state): State<Arc<RwLock<MockState>>>,
    Path(id): Path<u64>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Err(denied) = require_session(&headers) {
        return denied;
    }
    let mut state = state.write().await;

    let Some(project) = state.projects.get_mut(&id) else {
        return not_found();
    };
    if let Some(title) = body.get("title").and_then(Value::as_str) {
        project.title = title.to_string();
    }
    if let Some(text) = body.get("instructions").and_then(Value::as_str) {
        project.instructions = Some(text.to_string());
    }
    if let Some(text) = body.get("description").and_then(Value::as_str) {
        project.description = Some(text.to_string());
    }
    if let Some(allowed) = body.get("comments_allowed").and_then(Value::as_bool) {
        project.comments_allowed = allowed;
    }

    (StatusCode::OK, Json(project.clone())).into_response()
}

/// GET /explore/projects
pub async fn explore_projects(
    State(state): State<Arc<RwLock<MockState>>>,
    Query(params): Query<ExploreParams>,
) -> Response {
    let state = state.read().await;
    let text = params.q.as_deref().unwrap_or("*");
    list_response(state.search_projects(text), &params.page())
}

/// GET /search/projects
pub async fn search_projects(
    State(state): State<Arc<RwLock<MockState>>>,
    Query(params): Query<ExploreParams>,
) -> Response {
    let state = state.read().await;
    match params.q.as_deref() {
        Some(text) if !text.is_empty() => {
            list_response(state.search_projects(text), &params.page())
        }
        _ => error_code(StatusCode::BAD_REQUEST, "BadRequest", "q is required"),
    }
}

/// GET /projects/{id}/remixes
pub async fn list_remixes(
    State(state): State<Arc<RwLock<MockState>>>,
    Path(id): Path<u64>,
    Query(query): Query<OffsetQuery>,
) -> Response {
    let state = state.read().await;
    list_response(state.list_remixes(id), &query)
}

fn list_response(projects: Vec<&RawProject>, query: &OffsetQuery) -> Response {
    match paginate(projects, query) {
        Ok(page) => (StatusCode::OK, Json(page)).into_response(),
        Err(response) => response,
    }
}

/// PUT /proxy/projects/{id}/share/
pub async fn share_project(
    State(state): State<Arc<RwLock<MockState>>>,
    Path(id): Path<u64>,
    headers: HeaderMap,
) -> Response {
    set_public(state, id, &headers, true).await
}

/// PUT /proxy/projects/{id}/unshare/
pub async fn unshare_project(
    State(state): State<Arc<RwLock<MockState>>>,
    Path(id): Path<u64>,
    headers: HeaderMap,
) -> Response {
    set_public(state, id, &headers, false).await
}

async fn set_public(
    state: Arc<RwLock<MockState>>,
    id: u64,
    headers: &HeaderMap,
    public: bool,
) -> Response {
    if let Err(denied) = require_session(headers) {
        return denied;
    }
    let mut state = state.write().await;

    match state.projects.get_mut(&id) {
        Some(project) => {
            project.public = Some(public);
            project.is_published = Some(public);
            (StatusCode::OK, Json(json!({ "success": true }))).into_response()
        }
        None => not_found(),
    }
}

/// POST /users/{author}/projects/{id}/views/
pub async fn post_view(
    State(state): State<Arc<RwLock<MockState>>>,
    Path((_author, id)): Path<(String, u64)>,
) -> Response {
    let mut state = state.write().await;

    match state.projects.get_mut(&id) {
        Some(project) => {
            project.stats.views += 1;
            (StatusCode::OK, Json(json!({}))).into_response()
        }
        None => not_found(),
    }
}

/// GET /users/{author}/projects/{id}/studios
pub async fn list_studios(
    State(state): State<Arc<RwLock<MockState>>>,
    Path((_author, id)): Path<(String, u64)>,
    Query(query): Query<OffsetQuery>,
) -> Response {
    let state = state.read().await;
    match paginate(state.list_studios(id), &query) {
        Ok(page) => (StatusCode::OK, Json(page)).into_response(),
        Err(response) => response,
    }
}

/// GET /project-host/{id}?token=...
pub async fn get_payload(
    State(state): State<Arc<RwLock<MockState>>>,
    Path(id): Path<u64>,
    Query(query): Query<TokenQuery>,
) -> Response {
    let state = state.read().await;

    let authorized = state
        .projects
        .get(&id)
        .and_then(|p| p.project_token.as_deref())
        .is_some_and(|token| query.token.as_deref() == Some(token));
    if !authorized {
        return (StatusCode::FORBIDDEN, "Forbidden").into_response();
    }

    match state.payloads.get(&id) {
        Some(payload) => (StatusCode::OK, Json(payload.clone())).into_response(),
        None => (StatusCode::NOT_FOUND, "Not Found").into_response(),
    }
}

/// PUT /project-host/{id}
pub async fn put_payload(
    State(state): State<Arc<RwLock<MockState>>>,
    Path(id): Path<u64>,
    headers: HeaderMap,
    Json(payload): Json<Value>,
) -> Response {
    if let Err(denied) = require_session(&headers) {
        return denied;
    }
    let mut state = state.write().await;

    if !state.projects.contains_key(&id) {
        return not_found();
    }
    state.payloads.insert(id, payload);
    (
        StatusCode::OK,
        Json(json!({ "status": "ok", "content-name": id.to_string() })),
    )
        .into_response()
}

/// POST /site/internalapi/project/thumbnail/{id}/set/
pub async fn set_thumbnail(
    State(state): State<Arc<RwLock<MockState>>>,
    Path(id): Path<u64>,
    headers: HeaderMap,
    image: Bytes,
) -> Response {
    if let Err(denied) = require_session(&headers) {
        return denied;
    }
    let mut state = state.write().await;

    if !state.projects.contains_key(&id) {
        return not_found();
    }
    let length = image.len();
    state.thumbnails.insert(id, image.to_vec());
    (StatusCode::OK, Json(json!({ "content-length": length }))).into_response()
}
