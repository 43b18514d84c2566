//! Mock Scratch API server for E2E testing.
//!
//! This module provides an in-memory mock server that simulates the Scratch
//! API for integration and end-to-end testing. Unlike wiremock which mocks at
//! the HTTP level per-test, this server maintains state across requests, so a
//! love, a posted comment or a title change is visible to later reads.
//!
//! # Example
//!
//! ```ignore
//! use scratchapi::mock_server::MockServer;
//! use scratchapi::{Project, Get};
//!
//! #[tokio::test]
//! async fn test_workflow() {
//!     let server = MockServer::start().await;
//!     let client = server.client_as("mock_user");
//!
//!     // Server comes with default fixtures
//!     let project = Project::get(&client, 104).await.unwrap();
//!     assert_eq!(project.title, "Weekend");
//!     project.love().await.unwrap();
//!
//!     server.shutdown().await;
//! }
//! ```

mod fixtures;
mod handlers;
mod server;
mod state;

pub use fixtures::{DefaultScenario, Fixtures};
pub use server::MockServer;
pub use state::{MockState, SocialKind};
