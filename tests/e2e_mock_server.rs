//! E2E tests using the mock Scratch server.
//!
//! These tests exercise full workflows against the mock server,
//! testing realistic scenarios rather than individual endpoints.

#![cfg(feature = "test-server")]

use scratchapi::mock_server::{Fixtures, MockServer, MockState};
use scratchapi::{
    explore_projects, get_project, search_projects, ExploreQuery, Get, Listing, Project,
    ProjectLookup, ScratchError,
};

// =============================================================================
// Server Lifecycle Tests
// =============================================================================

#[tokio::test]
async fn test_server_starts_on_random_port() {
    let server1 = MockServer::start().await;
    let server2 = MockServer::start().await;

    assert_ne!(server1.url(), server2.url());

    server1.shutdown().await;
    server2.shutdown().await;
}

#[tokio::test]
async fn test_server_shutdown_is_clean() {
    let server = MockServer::start().await;
    let url = server.url().to_string();

    server.shutdown().await;

    let client = reqwest::Client::new();
    let result = client.get(format!("{}/health", url)).send().await;

    assert!(result.is_err());
}

// =============================================================================
// Read Workflow Tests
// =============================================================================

#[tokio::test]
async fn test_lookup_then_list_remixes() {
    let server = MockServer::start().await;
    let client = server.client();

    let ProjectLookup::Found(project) = get_project(&client, 104).await.unwrap() else {
        panic!("project 104 should be shared");
    };
    assert_eq!(project.title, "Weekend");

    let remixes = project.remixes(Listing::all()).await.unwrap();
    let ids: Vec<u64> = remixes.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![201, 202]);
    assert!(remixes.iter().all(|p| p.remix_parent == Some(104)));

    server.shutdown().await;
}

#[tokio::test]
async fn test_explore_pages_through_many_projects() {
    let mut state = MockState::new();
    for id in 1..=95 {
        state = state.with_project(Fixtures::project(id, &format!("Game {id}"), "maker"));
    }
    let server = MockServer::with_state(state).await;
    let client = server.client();

    let all = explore_projects(&client, ExploreQuery::default(), Listing::all())
        .await
        .unwrap();
    assert_eq!(all.len(), 95);

    let listing = Listing::first(50).starting_at(10);
    let some = explore_projects(&client, ExploreQuery::default(), listing)
        .await
        .unwrap();
    assert_eq!(some.len(), 50);
    assert_eq!(some[0].id, 11);

    server.shutdown().await;
}

#[tokio::test]
async fn test_search_finds_matching_titles() {
    let server = MockServer::start().await;
    let client = server.client();

    let found = search_projects(&client, ExploreQuery::search("platformer"), Listing::all())
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, 202);

    server.shutdown().await;
}

#[tokio::test]
async fn test_comment_thread_reads() {
    let server = MockServer::start().await;
    let project = Project::get(&server.client(), 104).await.unwrap();

    let comments = project.comments(Listing::all()).await.unwrap();
    assert_eq!(comments.len(), 2);

    let replies = project.comment_replies(1, Listing::all()).await.unwrap();
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].author_name(), Some("andresmh"));

    let single = project.comment(3).await.unwrap();
    assert_eq!(single.content, "How did you make the music?");

    server.shutdown().await;
}

#[tokio::test]
async fn test_project_studios() {
    let server = MockServer::start().await;
    let project = Project::get(&server.client(), 104).await.unwrap();

    let studios = project.studios(Listing::all()).await.unwrap();
    let titles: Vec<&str> = studios.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, vec!["Music Projects", "Weekend Games"]);
    assert_eq!(studios[0].host, Some(1717));

    let remix = Project::get(&server.client(), 201).await.unwrap();
    assert!(remix.studios(Listing::all()).await.unwrap().is_empty());

    server.shutdown().await;
}

#[tokio::test]
async fn test_many_studios_span_batches() {
    let studios = (1..=50)
        .map(|id| Fixtures::studio(id, &format!("Studio {id}"), 7))
        .collect();
    let state = MockState::new()
        .with_project(Fixtures::project(1, "Game", "maker"))
        .with_studios(1, studios);
    let server = MockServer::with_state(state).await;
    let project = Project::get(&server.client(), 1).await.unwrap();

    let all = project.studios(Listing::all()).await.unwrap();
    assert_eq!(all.len(), 50);
    assert_eq!(all[49].id, 50);

    let tail = project.studios(Listing::all().starting_at(45)).await.unwrap();
    let ids: Vec<u64> = tail.iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![46, 47, 48, 49, 50]);

    server.shutdown().await;
}

#[tokio::test]
async fn test_rate_limited_lookup() {
    let server = MockServer::start().await;
    server.state().write().await.rate_limited = true;

    let err = get_project(&server.client(), 104).await.unwrap_err();
    assert!(matches!(
        err,
        ScratchError::RateLimited {
            retry_after_secs: Some(5)
        }
    ));

    server.shutdown().await;
}

// =============================================================================
// Mutation Workflow Tests
// =============================================================================

#[tokio::test]
async fn test_love_survives_stale_acknowledgment() {
    let server = MockServer::with_state(
        MockState::new()
            .with_project(Fixtures::project(1, "Game", "maker"))
            .with_stale_acks(2),
    )
    .await;
    let client = server.client_as("fan");

    let mut project = Project::get(&client, 1).await.unwrap();
    project.love().await.unwrap();
    project.favorite().await.unwrap();

    project.refresh().await.unwrap();
    assert_eq!(project.loves, 1);
    assert_eq!(project.favorites, 1);

    project.unlove().await.unwrap();
    project.refresh().await.unwrap();
    assert_eq!(project.loves, 0);

    server.shutdown().await;
}

#[tokio::test]
async fn test_owner_edits_are_visible_to_other_readers() {
    let server = MockServer::start().await;
    let owner = server.client_as("mock_user");

    let mut project = Project::get(&owner, 202).await.unwrap();
    project.set_title("Weekend platformer 2").await.unwrap();
    project.set_instructions("Jump with space").await.unwrap();
    project.turn_off_commenting().await.unwrap();
    assert!(!project.comments_allowed);

    let seen = Project::get(&server.client(), 202).await.unwrap();
    assert_eq!(seen.title, "Weekend platformer 2");
    assert_eq!(seen.instructions, "Jump with space");
    assert!(!seen.comments_allowed);

    server.shutdown().await;
}

#[tokio::test]
async fn test_unshare_then_lookup_is_partial() {
    let server = MockServer::start().await;
    let owner = server.client_as("mock_user");

    let mut project = Project::get(&owner, 203).await.unwrap();
    project.unshare().await.unwrap();

    let lookup = get_project(&server.client(), 203).await.unwrap();
    assert!(!lookup.is_found());

    project.share().await.unwrap();
    assert!(get_project(&server.client(), 203).await.unwrap().is_found());

    server.shutdown().await;
}

#[tokio::test]
async fn test_comment_workflow() {
    let server = MockServer::start().await;
    let fan = server.client_as("fan");
    let project = Project::get(&fan, 104).await.unwrap();

    let posted = project.post_comment("Love the music", None, None).await.unwrap();
    let reply = project.reply_comment("Me too", posted.id, None).await.unwrap();
    assert_eq!(reply.parent_id, Some(posted.id));

    let replies = project.comment_replies(posted.id, Listing::all()).await.unwrap();
    assert_eq!(replies.len(), 1);

    project.report_comment(reply.id).await.unwrap();
    assert_eq!(server.state().read().await.reported_comments, vec![reply.id]);

    // Only the author may delete
    assert!(matches!(
        project.delete_comment(posted.id).await,
        Err(ScratchError::Unauthorized { .. })
    ));
    let owner_view = Project::get(&server.client_as("andresmh"), 104).await.unwrap();
    owner_view.delete_comment(posted.id).await.unwrap();
    assert_eq!(project.comments(Listing::all()).await.unwrap().len(), 2);

    server.shutdown().await;
}

#[tokio::test]
async fn test_copy_payload_between_projects() {
    let server = MockServer::start().await;
    let owner = server.client_as("mock_user");

    let target = Project::get(&owner, 203).await.unwrap();
    target.upload_json_from(104).await.unwrap();

    let mut copied = Project::get(&owner, 203).await.unwrap();
    assert_eq!(
        copied.creator_agent().await.unwrap(),
        "Mozilla/5.0 (X11; Linux x86_64)"
    );

    server.shutdown().await;
}

#[tokio::test]
async fn test_thumbnail_and_views() {
    let server = MockServer::start().await;
    let owner = server.client_as("mock_user");

    let mut project = Project::get(&owner, 203).await.unwrap();
    project.set_thumbnail(vec![1, 2, 3]).await.unwrap();
    project.post_view().await.unwrap();
    project.refresh().await.unwrap();

    assert_eq!(project.views, 1);
    assert_eq!(server.state().read().await.thumbnails[&203], vec![1, 2, 3]);

    server.shutdown().await;
}
