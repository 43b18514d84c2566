//! Tests for session and ownership guards.
//!
//! Every guarded operation must fail before any request reaches the server.

mod common;

use common::{anonymous, load_project, logged_in, project_json};
use scratchapi::ScratchError;
use serde_json::json;
use wiremock::matchers::{any, method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Fail the test if anything other than the project lookup is requested.
async fn forbid_other_requests(mock_server: &MockServer) {
    Mock::given(any())
        .and(path_regex(r"^/(proxy|site|project-host|users)/"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(mock_server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn test_anonymous_cannot_toggle_or_comment() {
    let mock_server = MockServer::start().await;
    let client = anonymous(&mock_server);
    let project = load_project(&mock_server, &client, project_json(104, "andresmh")).await;
    forbid_other_requests(&mock_server).await;

    assert!(matches!(project.love().await, Err(ScratchError::Unauthenticated)));
    assert!(matches!(project.unfavorite().await, Err(ScratchError::Unauthenticated)));
    assert!(matches!(
        project.post_comment("hi", None, None).await,
        Err(ScratchError::Unauthenticated)
    ));
    assert!(matches!(
        project.report_comment(1).await,
        Err(ScratchError::Unauthenticated)
    ));
}

#[tokio::test]
async fn test_anonymous_cannot_edit() {
    let mock_server = MockServer::start().await;
    let client = anonymous(&mock_server);
    let mut project = load_project(&mock_server, &client, project_json(104, "andresmh")).await;
    forbid_other_requests(&mock_server).await;

    let err = project.set_title("New").await.unwrap_err();
    assert!(matches!(err, ScratchError::Unauthenticated));
    assert!(err.is_auth());
}

#[tokio::test]
async fn test_non_owner_cannot_use_owner_operations() {
    let mock_server = MockServer::start().await;
    let client = logged_in(&mock_server, "bob");
    let mut project = load_project(&mock_server, &client, project_json(104, "andresmh")).await;
    forbid_other_requests(&mock_server).await;

    assert!(matches!(
        project.set_title("Mine now").await,
        Err(ScratchError::Unauthorized { .. })
    ));
    assert!(matches!(
        project.set_notes("x").await,
        Err(ScratchError::Unauthorized { .. })
    ));
    assert!(matches!(
        project.turn_off_commenting().await,
        Err(ScratchError::Unauthorized { .. })
    ));
    assert!(matches!(
        project.unshare().await,
        Err(ScratchError::Unauthorized { .. })
    ));
    assert!(matches!(
        project.delete_comment(1).await,
        Err(ScratchError::Unauthorized { .. })
    ));
    assert!(matches!(
        project.set_thumbnail(vec![0x89, 0x50]).await,
        Err(ScratchError::Unauthorized { .. })
    ));
    assert!(matches!(
        project.set_json(&json!({"targets": []})).await,
        Err(ScratchError::Unauthorized { .. })
    ));
    assert!(matches!(
        project.upload_json_from(5).await,
        Err(ScratchError::Unauthorized { .. })
    ));

    // Nothing changed locally either
    assert_eq!(project.title, "Weekend");
    assert!(project.comments_allowed);
}

#[tokio::test]
async fn test_owner_check_is_case_insensitive() {
    let mock_server = MockServer::start().await;
    let client = logged_in(&mock_server, "AndresMH");
    let mut project = load_project(&mock_server, &client, project_json(104, "andresmh")).await;

    let mut renamed = project_json(104, "andresmh");
    renamed["title"] = "Renamed".into();
    Mock::given(method("PUT"))
        .and(path("/projects/104"))
        .respond_with(ResponseTemplate::new(200).set_body_json(renamed))
        .expect(1)
        .mount(&mock_server)
        .await;

    project.set_title("Renamed").await.unwrap();
    assert_eq!(project.title, "Renamed");
}

#[tokio::test]
async fn test_with_session_does_not_affect_existing_records() {
    let mock_server = MockServer::start().await;
    let anonymous_client = anonymous(&mock_server);
    let project =
        load_project(&mock_server, &anonymous_client, project_json(104, "andresmh")).await;
    forbid_other_requests(&mock_server).await;

    let _logged_in = anonymous_client
        .with_session(scratchapi::Session::new("alice", "sid", "csrf"))
        .unwrap();

    assert!(project.client().session().is_none());
    assert!(matches!(project.love().await, Err(ScratchError::Unauthenticated)));
}
