//! Shared helpers for the wiremock-based integration tests.

#![allow(dead_code)]

use scratchapi::{ClientConfig, Get, Project, RetryPolicy, ScratchClient, Session};
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Anonymous client with every host routed to `server`.
pub fn anonymous(server: &MockServer) -> ScratchClient {
    ScratchClient::new(
        ClientConfig::with_base_url(&server.uri()).with_toggle_retry(RetryPolicy::immediate(3)),
    )
    .unwrap()
}

/// Client logged in as `username`.
pub fn logged_in(server: &MockServer, username: &str) -> ScratchClient {
    anonymous(server)
        .with_session(Session::new(username, "test-session", "test-csrf"))
        .unwrap()
}

/// Project JSON as the API returns it.
pub fn project_json(id: u64, author: &str) -> Value {
    json!({
        "id": id,
        "title": "Weekend",
        "description": "Made with love",
        "instructions": "Press the green flag",
        "visibility": "visible",
        "public": true,
        "comments_allowed": true,
        "is_published": true,
        "author": {"id": 1, "username": author, "scratchteam": false},
        "image": format!("https://cdn2.scratch.mit.edu/get_image/project/{id}_480x360.png"),
        "history": {
            "created": "2020-01-01T00:00:00.000Z",
            "modified": "2020-01-02T00:00:00.000Z",
            "shared": "2020-01-01T00:00:00.000Z"
        },
        "stats": {"views": 10, "loves": 2, "favorites": 1, "remixes": 0},
        "remix": {"parent": null, "root": null},
        "project_token": "tok"
    })
}

/// Error body used by the API for missing and unshared projects.
pub fn not_found_json() -> Value {
    json!({"code": "NotFound", "message": ""})
}

/// Serve `body` for GET /projects/{id} and load it through `client`.
pub async fn load_project(server: &MockServer, client: &ScratchClient, body: Value) -> Project {
    let id = body["id"].as_u64().unwrap();
    Mock::given(method("GET"))
        .and(path(format!("/projects/{id}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(server)
        .await;

    Project::get(client, id).await.unwrap()
}
