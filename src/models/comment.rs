//! Project comments.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};

use crate::client::ScratchClient;
use crate::error::Result;
use crate::pagination::{Page, PaginationParams};
use crate::traits::List;

/// A comment on a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    /// The comment id.
    pub id: u64,
    /// Top-level comment this one replies to.
    #[serde(default)]
    pub parent_id: Option<u64>,
    /// User mentioned by this comment.
    #[serde(default)]
    pub commentee_id: Option<u64>,
    /// The comment text.
    pub content: String,
    #[serde(default)]
    pub datetime_created: Option<DateTime<Utc>>,
    #[serde(default)]
    pub datetime_modified: Option<DateTime<Utc>>,
    /// "visible" unless deleted or censored.
    #[serde(default)]
    pub visibility: Option<String>,
    #[serde(default)]
    pub author: Option<CommentAuthor>,
    /// Number of replies (top-level comments only).
    #[serde(default)]
    pub reply_count: u32,
}

/// Author summary attached to a comment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentAuthor {
    #[serde(default)]
    pub id: Option<u64>,
    pub username: String,
    #[serde(default)]
    pub scratchteam: bool,
    #[serde(default)]
    pub image: Option<String>,
}

impl Comment {
    /// Whether this comment is a reply.
    pub fn is_reply(&self) -> bool {
        self.parent_id.is_some()
    }

    /// Username of the author, if present.
    pub fn author_name(&self) -> Option<&str> {
        self.author.as_ref().map(|a| a.username.as_str())
    }
}

/// Selects the comments of a project, or the replies to one comment.
#[derive(Debug, Clone, PartialEq)]
pub struct CommentQuery {
    /// The project id.
    pub project_id: u64,
    /// Username of the project author; part of the endpoint path.
    pub author: String,
    /// List the replies to this comment instead of top-level comments.
    pub replies_to: Option<u64>,
}

impl CommentQuery {
    /// Top-level comments of a project.
    pub fn project(project_id: u64, author: impl Into<String>) -> Self {
        Self {
            project_id,
            author: author.into(),
            replies_to: None,
        }
    }

    /// Replies to `comment_id`.
    #[must_use]
    pub fn replies_to(mut self, comment_id: u64) -> Self {
        self.replies_to = Some(comment_id);
        self
    }

    pub(crate) fn path(&self) -> String {
        let base = format!(
            "users/{}/projects/{}/comments",
            urlencoding::encode(&self.author),
            self.project_id
        );
        match self.replies_to {
            Some(parent) => format!("{base}/{parent}/replies"),
            None => base,
        }
    }
}

/// Random value that defeats the comment endpoints' response cache.
pub(crate) fn cachebust() -> u32 {
    fastrand::u32(0..=9999)
}

#[async_trait]
impl List for Comment {
    type Query = CommentQuery;

    #[tracing::instrument(skip(client))]
    async fn list_page(
        client: &ScratchClient,
        query: &Self::Query,
        params: PaginationParams,
    ) -> Result<Page<Self>> {
        #[derive(Serialize)]
        struct RequestParams {
            #[serde(flatten)]
            page: PaginationParams,
            cachebust: u32,
        }

        let url = client.api_url(&query.path())?;
        let request = RequestParams {
            page: params,
            cachebust: cachebust(),
        };
        let response = client.get_with_query(url, &request).await?;
        let data: Option<Vec<Comment>> = ScratchClient::json(response).await?;

        Ok(Page::new(data.unwrap_or_default(), params.offset, params.limit))
    }
}

/// Body of a new comment. Absent ids are sent as empty strings.
#[derive(Debug, Serialize)]
pub(crate) struct NewComment<'a> {
    #[serde(serialize_with = "id_or_empty")]
    pub commentee_id: Option<u64>,
    pub content: &'a str,
    #[serde(serialize_with = "id_or_empty")]
    pub parent_id: Option<u64>,
}

fn id_or_empty<S: Serializer>(
    id: &Option<u64>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    match id {
        Some(id) => serializer.serialize_u64(*id),
        None => serializer.serialize_str(""),
    }
}
