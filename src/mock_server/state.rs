//! Mock server state management.
//!
//! Provides the in-memory data store for the mock Scratch API server.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

use serde_json::Value;

use crate::{Comment, RawProject, StudioSummary};

/// Shared state for the mock server.
///
/// This struct holds all the mock data that the server will serve.
/// It's wrapped in `Arc<RwLock<_>>` for concurrent access.
#[derive(Debug, Default)]
pub struct MockState {
    /// Project records indexed by id. Records with `public == Some(false)`
    /// are answered like unshared projects.
    pub projects: HashMap<u64, RawProject>,

    /// Project JSON payloads indexed by project id.
    pub payloads: HashMap<u64, Value>,

    /// Comments indexed by project id, replies included.
    pub comments: HashMap<u64, Vec<Comment>>,

    /// Studios each project was added to, indexed by project id.
    pub studios: HashMap<u64, Vec<StudioSummary>>,

    /// (project id, username) pairs that loved a project.
    pub loves: HashSet<(u64, String)>,

    /// (project id, username) pairs that favorited a project.
    pub favorites: HashSet<(u64, String)>,

    /// Uploaded thumbnails indexed by project id.
    pub thumbnails: HashMap<u64, Vec<u8>>,

    /// Ids of comments that were reported.
    pub reported_comments: Vec<u64>,

    /// Number of upcoming love/favorite requests acknowledged with the
    /// previous state instead of the new one.
    pub stale_acks: u32,

    /// When set, project lookups answer 429.
    pub rate_limited: bool,

    /// Username recorded as the author of posted comments.
    pub session_user: String,
}

impl MockState {
    /// Create a new empty state.
    pub fn new() -> Self {
        Self {
            session_user: "mock_user".to_string(),
            ..Self::default()
        }
    }

    /// Create state wrapped in Arc<RwLock> for sharing.
    pub fn shared(self) -> Arc<RwLock<Self>> {
        Arc::new(RwLock::new(self))
    }

    /// Add a project to the state.
    ///
    /// # Panics
    ///
    /// Panics if the record has no id.
    pub fn with_project(mut self, project: RawProject) -> Self {
        let id = project.id.expect("fixture projects need an id");
        self.projects.insert(id, project);
        self
    }

    /// Add a project payload.
    pub fn with_payload(mut self, project_id: u64, payload: Value) -> Self {
        self.payloads.insert(project_id, payload);
        self
    }

    /// Add comments to a project.
    pub fn with_comments(mut self, project_id: u64, comments: Vec<Comment>) -> Self {
        self.comments.entry(project_id).or_default().extend(comments);
        self
    }

    /// Add a project to studios.
    pub fn with_studios(mut self, project_id: u64, studios: Vec<StudioSummary>) -> Self {
        self.studios.entry(project_id).or_default().extend(studios);
        self
    }

    /// Acknowledge the next `count` social toggles with stale state.
    pub fn with_stale_acks(mut self, count: u32) -> Self {
        self.stale_acks = count;
        self
    }

    /// Get a shared project by id.
    pub fn get_shared_project(&self, id: u64) -> Option<&RawProject> {
        self.projects.get(&id).filter(|p| p.public != Some(false))
    }

    /// Shared projects whose title contains `text`, in id order.
    ///
    /// `*` matches every project.
    pub fn search_projects(&self, text: &str) -> Vec<&RawProject> {
        let needle = text.to_lowercase();
        let mut matches: Vec<&RawProject> = self
            .projects
            .values()
            .filter(|p| p.public != Some(false))
            .filter(|p| text == "*" || p.title.to_lowercase().contains(&needle))
            .collect();
        matches.sort_by_key(|p| p.id);
        matches
    }

    /// Shared remixes of a project, in id order.
    pub fn list_remixes(&self, parent: u64) -> Vec<&RawProject> {
        let mut remixes: Vec<&RawProject> = self
            .projects
            .values()
            .filter(|p| p.public != Some(false))
            .filter(|p| p.remix.as_ref().and_then(|r| r.parent) == Some(parent))
            .collect();
        remixes.sort_by_key(|p| p.id);
        remixes
    }

    /// Top-level comments of a project, or the replies to `parent`.
    pub fn list_comments(&self, project_id: u64, parent: Option<u64>) -> Vec<&Comment> {
        self.comments
            .get(&project_id)
            .map(|all| all.iter().filter(|c| c.parent_id == parent).collect())
            .unwrap_or_default()
    }

    /// Studios containing a project.
    pub fn list_studios(&self, project_id: u64) -> Vec<&StudioSummary> {
        self.studios
            .get(&project_id)
            .map(|all| all.iter().collect())
            .unwrap_or_default()
    }

    /// Find one comment of a project.
    pub fn get_comment(&self, project_id: u64, comment_id: u64) -> Option<&Comment> {
        self.comments
            .get(&project_id)?
            .iter()
            .find(|c| c.id == comment_id)
    }

    /// Next free comment id.
    pub fn next_comment_id(&self) -> u64 {
        self.comments
            .values()
            .flatten()
            .map(|c| c.id)
            .max()
            .unwrap_or(0)
            + 1
    }

    /// Apply a love or favorite toggle and return the acknowledged state.
    pub fn toggle_social(
        &mut self,
        kind: SocialKind,
        project_id: u64,
        user: &str,
        on: bool,
    ) -> bool {
        let key = (project_id, user.to_string());
        let set = match kind {
            SocialKind::Love => &mut self.loves,
            SocialKind::Favorite => &mut self.favorites,
        };
        let before = set.contains(&key);
        if on {
            set.insert(key);
        } else {
            set.remove(&key);
        }

        let count = set.iter().filter(|(id, _)| *id == project_id).count() as u64;
        if let Some(project) = self.projects.get_mut(&project_id) {
            match kind {
                SocialKind::Love => project.stats.loves = count,
                SocialKind::Favorite => project.stats.favorites = count,
            }
        }

        if self.stale_acks > 0 {
            self.stale_acks -= 1;
            before
        } else {
            on
        }
    }
}

/// Which social counter a toggle addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocialKind {
    Love,
    Favorite,
}
