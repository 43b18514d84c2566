//! Test data fixtures for the mock server.
//!
//! Provides factory functions for creating realistic test data.

use chrono::{TimeZone, Utc};
use serde_json::{json, Value};

use crate::{
    Comment, CommentAuthor, RawAuthor, RawHistory, RawProject, RawRemix, RawStats, StudioSummary,
};

/// Collection of fixture factories for test data.
pub struct Fixtures;

/// Default scenario with interconnected test data.
pub struct DefaultScenario {
    pub projects: Vec<RawProject>,
    pub payloads: Vec<(u64, Value)>,
    pub comments: Vec<(u64, Vec<Comment>)>,
    pub studios: Vec<(u64, Vec<StudioSummary>)>,
}

impl Fixtures {
    // =========================================================================
    // Project Fixtures
    // =========================================================================

    /// Create a shared project.
    pub fn project(id: u64, title: &str, author: &str) -> RawProject {
        let created = Utc.with_ymd_and_hms(2023, 5, 1, 12, 0, 0).single();
        RawProject {
            id: Some(id),
            title: title.to_string(),
            description: Some(String::new()),
            instructions: Some(String::new()),
            visibility: Some("visible".to_string()),
            public: Some(true),
            comments_allowed: true,
            is_published: Some(true),
            author: RawAuthor {
                id: None,
                username: author.to_string(),
                scratchteam: false,
            },
            image: Some(format!(
                "https://cdn2.scratch.mit.edu/get_image/project/{id}_480x360.png"
            )),
            history: RawHistory {
                created,
                modified: created,
                shared: created,
            },
            stats: RawStats::default(),
            remix: Some(RawRemix::default()),
            project_token: Some(format!("token-{id}")),
        }
    }

    /// Create an unshared project.
    pub fn unshared_project(id: u64, title: &str, author: &str) -> RawProject {
        let mut project = Self::project(id, title, author);
        project.public = Some(false);
        project.is_published = Some(false);
        project.history.shared = None;
        project
    }

    /// Create a remix of `parent`.
    pub fn remix(id: u64, title: &str, author: &str, parent: u64, root: u64) -> RawProject {
        let mut project = Self::project(id, title, author);
        project.remix = Some(RawRemix {
            parent: Some(parent),
            root: Some(root),
        });
        project
    }

    /// A minimal Scratch 3 project payload.
    pub fn payload(agent: &str) -> Value {
        json!({
            "targets": [{"isStage": true, "name": "Stage", "blocks": {}}],
            "monitors": [],
            "extensions": [],
            "meta": {"semver": "3.0.0", "vm": "2.3.0", "agent": agent}
        })
    }

    // =========================================================================
    // Comment Fixtures
    // =========================================================================

    /// Create a visible comment.
    pub fn comment(id: u64, parent_id: Option<u64>, content: &str, author: &str) -> Comment {
        let posted = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).single();
        Comment {
            id,
            parent_id,
            commentee_id: None,
            content: content.to_string(),
            datetime_created: posted,
            datetime_modified: posted,
            visibility: Some("visible".to_string()),
            author: Some(CommentAuthor {
                id: None,
                username: author.to_string(),
                scratchteam: false,
                image: None,
            }),
            reply_count: 0,
        }
    }

    // =========================================================================
    // Studio Fixtures
    // =========================================================================

    /// Create a studio hosted by user `host`.
    pub fn studio(id: u64, title: &str, host: u64) -> StudioSummary {
        StudioSummary {
            id,
            title: title.to_string(),
            host: Some(host),
            description: Some(format!("Projects about {}", title.to_lowercase())),
            image: Some(format!(
                "https://cdn2.scratch.mit.edu/get_image/gallery/{id}_170x100.png"
            )),
        }
    }

    // =========================================================================
    // Scenarios
    // =========================================================================

    /// Create a default scenario with interconnected data.
    ///
    /// Project 104 by `andresmh` has a payload, comments with replies, two
    /// remixes and sits in two studios. Project 300 by `mock_user` is
    /// unshared.
    pub fn default_scenario() -> DefaultScenario {
        let mut weekend = Self::project(104, "Weekend", "andresmh");
        weekend.description = Some("Made with love".to_string());
        weekend.instructions = Some("Press the green flag".to_string());
        weekend.stats = RawStats {
            views: 5000,
            loves: 0,
            favorites: 0,
            remixes: 2,
        };

        let mut first = Self::comment(1, None, "Great project!", "fan");
        first.reply_count = 1;

        DefaultScenario {
            projects: vec![
                weekend,
                Self::remix(201, "Weekend remix", "remixer", 104, 104),
                Self::remix(202, "Weekend platformer", "mock_user", 104, 104),
                Self::project(203, "Space Maze", "mock_user"),
                Self::unshared_project(300, "Draft", "mock_user"),
            ],
            payloads: vec![
                (104, Self::payload("Mozilla/5.0 (X11; Linux x86_64)")),
                (202, Self::payload("Mozilla/5.0 (Macintosh)")),
            ],
            comments: vec![(
                104,
                vec![
                    first,
                    Self::comment(2, Some(1), "Thanks!", "andresmh"),
                    Self::comment(3, None, "How did you make the music?", "curious"),
                ],
            )],
            studios: vec![(
                104,
                vec![
                    Self::studio(5001, "Music Projects", 1717),
                    Self::studio(5002, "Weekend Games", 1818),
                ],
            )],
        }
    }
}
