//! Scratch API client library.
//!
//! A Rust library for reading and managing projects on the Scratch
//! community platform. Reads are trait-based: each operation ([`Get`],
//! [`List`]) is a trait that entity types implement. Mutating operations
//! are methods on [`Project`] and use the session of the client the
//! record was created with.
//!
//! # Quick Start
//!
//! ```no_run
//! use scratchapi::{get_project, Comment, Listing, ProjectLookup, ScratchClient};
//!
//! #[tokio::main]
//! async fn main() -> scratchapi::Result<()> {
//!     // Anonymous, or logged in when SCRATCH_SESSION_ID is set
//!     let client = ScratchClient::from_env()?;
//!
//!     let project = match get_project(&client, 104).await? {
//!         ProjectLookup::Found(project) => project,
//!         ProjectLookup::Partial(partial) => {
//!             println!("project {} is not shared", partial.id);
//!             return Ok(());
//!         }
//!     };
//!     println!("{} by {}", project.title, project.author);
//!
//!     // Listings are fetched in batches of at most 40
//!     let comments: Vec<Comment> = project.comments(Listing::first(100)).await?;
//!     println!("Found {} comments", comments.len());
//!
//!     Ok(())
//! }
//! ```
//!
//! # Sessions
//!
//! A [`ScratchClient`] is anonymous until [`ScratchClient::with_session`]
//! attaches a [`Session`]. Operations that need a login fail with
//! [`ScratchError::Unauthenticated`] before any request is sent; operations
//! reserved to the project author fail with [`ScratchError::Unauthorized`].
//!
//! # Configuration
//!
//! The client reads configuration from environment variables:
//!
//! - `SCRATCH_API_URL`, `SCRATCH_SITE_URL`, `SCRATCH_PROJECTS_URL`,
//!   `SCRATCHDB_URL`, `SCRATCH_NFE_URL` (optional) - base URL overrides
//! - `SCRATCH_USERNAME`, `SCRATCH_SESSION_ID`, `SCRATCH_CSRF_TOKEN`
//!   (required for a session), `SCRATCH_X_TOKEN` (optional)

mod client;
mod config;
mod error;
mod models;
mod pagination;
mod session;
mod toggle;
mod traits;

#[cfg(feature = "test-server")]
pub mod mock_server;

// Re-export core types
pub use client::ScratchClient;
pub use config::ClientConfig;
pub use error::{Result, ScratchError};
pub use pagination::{fetch_all, Listing, Page, PaginationParams, MAX_BATCH};
pub use session::Session;
pub use toggle::{set_flag, RetryPolicy};

// Re-export traits
pub use traits::{Get, List};

// Re-export models
pub use models::{
    // Project types
    ExploreMode,
    ExploreQuery,
    PartialProject,
    Project,
    ProjectListQuery,
    ProjectLookup,
    RawAuthor,
    RawHistory,
    RawProject,
    RawRemix,
    RawStats,
    RefreshOutcome,
    // Comment types
    Comment,
    CommentAuthor,
    CommentQuery,
    // Studio types
    ProjectStudiosQuery,
    StudioSummary,
    // Statistics
    CountryRanks,
    ModerationStatus,
    ProjectRanks,
};

// Re-export convenience functions
pub use models::{explore_projects, get_project, search_projects};
