//! Love and favorite endpoint handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tokio::sync::RwLock;

use super::{not_found, require_session};
use crate::mock_server::state::{MockState, SocialKind};

/// POST /proxy/projects/{id}/loves/user/{username}
pub async fn add_love(
    State(state): State<Arc<RwLock<MockState>>>,
    Path((id, username)): Path<(u64, String)>,
    headers: HeaderMap,
) -> Response {
    toggle(state, &headers, SocialKind::Love, id, &username, true).await
}

/// DELETE /proxy/projects/{id}/loves/user/{username}
pub async fn remove_love(
    State(state): State<Arc<RwLock<MockState>>>,
    Path((id, username)): Path<(u64, String)>,
    headers: HeaderMap,
) -> Response {
    toggle(state, &headers, SocialKind::Love, id, &username, false).await
}

/// POST /proxy/projects/{id}/favorites/user/{username}
pub async fn add_favorite(
    State(state): State<Arc<RwLock<MockState>>>,
    Path((id, username)): Path<(u64, String)>,
    headers: HeaderMap,
) -> Response {
    toggle(state, &headers, SocialKind::Favorite, id, &username, true).await
}

/// DELETE /proxy/projects/{id}/favorites/user/{username}
pub async fn remove_favorite(
    State(state): State<Arc<RwLock<MockState>>>,
    Path((id, username)): Path<(u64, String)>,
    headers: HeaderMap,
) -> Response {
    toggle(state, &headers, SocialKind::Favorite, id, &username, false).await
}

async fn toggle(
    state: Arc<RwLock<MockState>>,
    headers: &HeaderMap,
    kind: SocialKind,
    id: u64,
    username: &str,
    on: bool,
) -> Response {
    if let Err(denied) = require_session(headers) {
        return denied;
    }
    let mut state = state.write().await;

    if !state.projects.contains_key(&id) {
        return not_found();
    }
    let acknowledged = state.toggle_social(kind, id, username, on);
    let field = match kind {
        SocialKind::Love => "userLove",
        SocialKind::Favorite => "userFavorite",
    };

    (
        StatusCode::OK,
        Json(json!({
            "projectId": id.to_string(),
            "username": username,
            field: acknowledged,
            "statusChanged": true
        })),
    )
        .into_response()
}
