//! Mock Scratch API server.
//!
//! Provides an axum-based HTTP server that simulates the Scratch API hosts
//! under the prefixes used by [`ClientConfig::with_base_url`].

use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use super::fixtures::{DefaultScenario, Fixtures};
use super::handlers;
use super::state::MockState;
use crate::{ClientConfig, RetryPolicy, ScratchClient, Session};

/// A mock Scratch API server for testing.
///
/// The server runs in the background and can be used to test the client
/// against a realistic, stateful API implementation.
pub struct MockServer {
    /// The URL where the server is listening.
    url: String,
    /// Handle to the server task.
    handle: JoinHandle<()>,
    /// Shared state that can be modified during tests.
    state: Arc<RwLock<MockState>>,
}

impl MockServer {
    /// Start a new mock server with default fixtures.
    ///
    /// The server listens on a random available port and returns immediately.
    /// Use `url()` to get the server's base URL.
    pub async fn start() -> Self {
        Self::with_state(Self::default_state()).await
    }

    /// Start a mock server with empty state.
    ///
    /// Useful when you want to control exactly what data is available.
    pub async fn start_empty() -> Self {
        Self::with_state(MockState::new()).await
    }

    /// Start a mock server with custom state.
    pub async fn with_state(state: MockState) -> Self {
        let shared_state = state.shared();
        let app = Self::create_router(shared_state.clone());

        // Bind to a random available port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to address");
        let addr = listener.local_addr().expect("Failed to get local address");

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Server error");
        });

        Self {
            url: format!("http://{}", addr),
            handle,
            state: shared_state,
        }
    }

    /// Get the base URL of the mock server.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Client configuration pointing every host at this server.
    ///
    /// Toggle retries do not sleep.
    pub fn config(&self) -> ClientConfig {
        ClientConfig::with_base_url(&self.url).with_toggle_retry(RetryPolicy::immediate(5))
    }

    /// Anonymous client for this server.
    ///
    /// # Panics
    ///
    /// Panics if the client cannot be built.
    pub fn client(&self) -> ScratchClient {
        ScratchClient::new(self.config()).expect("Failed to build client")
    }

    /// Client logged in as `username`.
    ///
    /// # Panics
    ///
    /// Panics if the client cannot be built.
    pub fn client_as(&self, username: &str) -> ScratchClient {
        self.client()
            .with_session(Session::new(username, "mock-session", "mock-csrf"))
            .expect("Failed to attach session")
    }

    /// Get access to the server's shared state.
    ///
    /// This allows modifying the mock data during a test.
    pub fn state(&self) -> Arc<RwLock<MockState>> {
        self.state.clone()
    }

    /// Shutdown the server.
    ///
    /// This aborts the server task. It's safe to call multiple times.
    pub async fn shutdown(self) {
        self.handle.abort();
        let _ = self.handle.await;
    }

    /// Create the default state with common test fixtures.
    fn default_state() -> MockState {
        let scenario = Fixtures::default_scenario();
        Self::state_from_scenario(scenario)
    }

    /// Create state from a scenario.
    fn state_from_scenario(scenario: DefaultScenario) -> MockState {
        let mut state = MockState::new();

        for project in scenario.projects {
            state = state.with_project(project);
        }

        for (project_id, payload) in scenario.payloads {
            state = state.with_payload(project_id, payload);
        }

        for (project_id, comments) in scenario.comments {
            state = state.with_comments(project_id, comments);
        }

        for (project_id, studios) in scenario.studios {
            state = state.with_studios(project_id, studios);
        }

        state
    }

    /// Create the axum router with all routes.
    fn create_router(state: Arc<RwLock<MockState>>) -> Router {
        Router::new()
            // Project routes
            .route(
                "/projects/:id",
                get(handlers::get_project).put(handlers::update_project),
            )
            .route("/projects/:id/", put(handlers::update_project))
            .route("/projects/:id/remixes", get(handlers::list_remixes))
            .route("/explore/projects", get(handlers::explore_projects))
            .route("/search/projects", get(handlers::search_projects))
            .route(
                "/users/:author/projects/:id/views/",
                post(handlers::post_view),
            )
            .route(
                "/users/:author/projects/:id/studios",
                get(handlers::list_studios),
            )
            .route("/proxy/projects/:id/share/", put(handlers::share_project))
            .route(
                "/proxy/projects/:id/unshare/",
                put(handlers::unshare_project),
            )
            // Comment routes
            .route(
                "/users/:author/projects/:id/comments",
                get(handlers::list_comments),
            )
            .route(
                "/users/:author/projects/:id/comments/:comment_id",
                get(handlers::get_comment),
            )
            .route(
                "/users/:author/projects/:id/comments/:comment_id/replies",
                get(handlers::list_replies),
            )
            .route(
                "/proxy/comments/project/:id/",
                post(handlers::post_comment),
            )
            .route(
                "/proxy/comments/project/:id/comment/:comment_id/",
                axum::routing::delete(handlers::delete_comment),
            )
            .route(
                "/proxy/comments/project/:id/comment/:comment_id/report",
                axum::routing::delete(handlers::report_comment),
            )
            // Social routes
            .route(
                "/proxy/projects/:id/loves/user/:username",
                post(handlers::add_love).delete(handlers::remove_love),
            )
            .route(
                "/proxy/projects/:id/favorites/user/:username",
                post(handlers::add_favorite).delete(handlers::remove_favorite),
            )
            // Other hosts
            .route(
                "/project-host/:id",
                get(handlers::get_payload).put(handlers::put_payload),
            )
            .route(
                "/site/internalapi/project/thumbnail/:id/set/",
                post(handlers::set_thumbnail),
            )
            // Health check
            .route("/health", get(health_check))
            .with_state(state)
    }
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "ok"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{get_project, Get, Project, ProjectLookup, ScratchError};

    #[tokio::test]
    async fn test_server_starts_and_responds() {
        let server = MockServer::start().await;

        let client = reqwest::Client::new();
        let response = client
            .get(format!("{}/health", server.url()))
            .send()
            .await
            .expect("Failed to send request");

        assert!(response.status().is_success());
        assert_eq!(response.text().await.unwrap(), "ok");

        server.shutdown().await;
    }

    #[tokio::test]
    async fn test_get_project_with_client() {
        let server = MockServer::start().await;

        let project = Project::get(&server.client(), 104)
            .await
            .expect("Failed to get project");

        assert_eq!(project.title, "Weekend");
        assert_eq!(project.author, "andresmh");

        server.shutdown().await;
    }

    #[tokio::test]
    async fn test_unshared_project_is_partial() {
        let server = MockServer::start().await;

        let lookup = get_project(&server.client(), 300).await.unwrap();
        assert!(matches!(lookup, ProjectLookup::Partial(ref p) if p.id == 300));

        server.shutdown().await;
    }

    #[tokio::test]
    async fn test_empty_server() {
        let server = MockServer::start_empty().await;

        let result = Project::get(&server.client(), 1).await;
        assert!(matches!(result, Err(ScratchError::NotAccessible { .. })));

        server.shutdown().await;
    }

    #[tokio::test]
    async fn test_custom_state() {
        let state = MockState::new().with_project(Fixtures::project(7, "My Custom Project", "me"));

        let server = MockServer::with_state(state).await;
        let project = Project::get(&server.client(), 7)
            .await
            .expect("Failed to get project");

        assert_eq!(project.title, "My Custom Project");

        server.shutdown().await;
    }
}
