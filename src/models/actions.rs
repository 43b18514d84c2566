//! Project operations beyond lookup: comments, social toggles, owner
//! settings, and the project payload.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE, REFERER};
use reqwest::Method;
use serde::Deserialize;
use serde_json::{json, Value};
use url::Url;

use crate::client::ScratchClient;
use crate::error::{Result, ScratchError};
use crate::models::comment::{cachebust, Comment, CommentQuery, NewComment};
use crate::models::project::{get_project, Project, ProjectLookup, RawProject, RefreshOutcome};
use crate::models::stats::{ModerationResponse, ModerationStatus, ProjectRanks, ScratchDbInfo};
use crate::models::studio::{ProjectStudiosQuery, StudioSummary};
use crate::pagination::Listing;
use crate::toggle::set_flag;
use crate::traits::List;

/// Love and favorite flags share one endpoint shape.
#[derive(Debug, Clone, Copy)]
enum SocialFlag {
    Love,
    Favorite,
}

impl SocialFlag {
    fn segment(self) -> &'static str {
        match self {
            Self::Love => "loves",
            Self::Favorite => "favorites",
        }
    }

    fn action(self, desired: bool) -> &'static str {
        match (self, desired) {
            (Self::Love, true) => "love",
            (Self::Love, false) => "unlove",
            (Self::Favorite, true) => "favorite",
            (Self::Favorite, false) => "unfavorite",
        }
    }

    fn acknowledged(self, ack: &SocialAck) -> Result<bool> {
        match self {
            Self::Love => ack.user_love.ok_or(ScratchError::MissingField("userLove")),
            Self::Favorite => ack
                .user_favorite
                .ok_or(ScratchError::MissingField("userFavorite")),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SocialAck {
    #[serde(rename = "userLove", default)]
    user_love: Option<bool>,
    #[serde(rename = "userFavorite", default)]
    user_favorite: Option<bool>,
}

impl Project {
    // =========================================================================
    // Reads
    // =========================================================================

    /// Top-level comments, newest first.
    pub async fn comments(&self, listing: Listing) -> Result<Vec<Comment>> {
        let query = CommentQuery::project(self.id, self.author.clone());
        Comment::list_all(&self.client, &query, listing).await
    }

    /// Replies to one comment.
    pub async fn comment_replies(&self, comment_id: u64, listing: Listing) -> Result<Vec<Comment>> {
        let query = CommentQuery::project(self.id, self.author.clone()).replies_to(comment_id);
        Comment::list_all(&self.client, &query, listing).await
    }

    /// A single comment.
    #[tracing::instrument(skip(self), fields(id = self.id))]
    pub async fn comment(&self, comment_id: u64) -> Result<Comment> {
        let path = format!(
            "{}/{comment_id}",
            CommentQuery::project(self.id, self.author.clone()).path()
        );
        let url = self.client.api_url(&path)?;
        let response = self
            .client
            .get_with_query(url, &[("cachebust", cachebust())])
            .await?;
        ScratchClient::json(response).await
    }

    /// Studios this project was added to.
    pub async fn studios(&self, listing: Listing) -> Result<Vec<StudioSummary>> {
        let query = ProjectStudiosQuery {
            project_id: self.id,
            author: self.author.clone(),
        };
        StudioSummary::list_all(&self.client, &query, listing).await
    }

    /// Increase the view counter by one.
    ///
    /// Always sent anonymously.
    #[tracing::instrument(skip(self), fields(id = self.id))]
    pub async fn post_view(&self) -> Result<()> {
        let url = self.client.api_url(&format!(
            "users/{}/projects/{}/views/",
            urlencoding::encode(&self.author),
            self.id
        ))?;
        self.client
            .send(self.client.request_anonymous(Method::POST, url))
            .await?;
        Ok(())
    }

    /// Ranks from ScratchDB. Unavailable ranks are `-1`.
    #[tracing::instrument(skip(self), fields(id = self.id))]
    pub async fn ranks(&self) -> Result<ProjectRanks> {
        let url = self
            .client
            .scratchdb_url(&format!("v3/project/info/{}", self.id))?;
        let response = self
            .client
            .send(self.client.request_anonymous(Method::GET, url))
            .await?;
        let info: ScratchDbInfo = ScratchClient::json(response).await?;
        Ok(info
            .statistics
            .and_then(|s| s.ranks)
            .unwrap_or_default())
    }

    /// Review state from the moderation status service.
    #[tracing::instrument(skip(self), fields(id = self.id))]
    pub async fn moderation_status(&self) -> Result<ModerationStatus> {
        let url = self.client.nfe_url("")?;
        let response = self
            .client
            .send(
                self.client
                    .request_anonymous(Method::GET, url)
                    .query(&[("project", self.id)]),
            )
            .await?;
        let body: ModerationResponse = ScratchClient::json(response).await?;
        Ok(ModerationStatus::from_status(&body.status))
    }

    // =========================================================================
    // Project payload
    // =========================================================================

    /// Refresh the record and build the token-authorized payload URL.
    async fn payload_url(&mut self) -> Result<Url> {
        if self.refresh().await? == RefreshOutcome::NotAccessible {
            return Err(ScratchError::FetchError(format!(
                "project {} is not accessible",
                self.id
            )));
        }
        let token = self.project_token.as_deref().ok_or_else(|| {
            ScratchError::FetchError(
                "no project token; the payload is only available for Scratch 3 projects"
                    .to_string(),
            )
        })?;

        let mut url = self.client.projects_url(&self.id.to_string())?;
        url.query_pairs_mut().append_pair("token", token);
        Ok(url)
    }

    /// The project JSON (Scratch 3 projects only).
    ///
    /// Refreshes the record first to obtain a current project token.
    #[tracing::instrument(skip(self), fields(id = self.id))]
    pub async fn raw_json(&mut self) -> Result<Value> {
        let url = self.payload_url().await?;
        let response = self.client.get(url).await?;
        ScratchClient::json(response).await
    }

    /// The project payload as opaque bytes.
    #[tracing::instrument(skip(self), fields(id = self.id))]
    pub async fn download(&mut self) -> Result<Vec<u8>> {
        let url = self.payload_url().await?;
        let response = self.client.get(url).await?;
        let bytes = response.bytes().await.map_err(ScratchError::HttpError)?;
        Ok(bytes.to_vec())
    }

    /// User agent of the browser the project was last saved with.
    pub async fn creator_agent(&mut self) -> Result<String> {
        let payload = self.raw_json().await?;
        payload
            .pointer("/meta/agent")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| ScratchError::FetchError("project JSON has no meta.agent".to_string()))
    }

    // =========================================================================
    // Social toggles (session required)
    // =========================================================================

    /// Love the project.
    pub async fn love(&self) -> Result<()> {
        self.set_social_flag(SocialFlag::Love, true).await
    }

    /// Remove the love from the project.
    pub async fn unlove(&self) -> Result<()> {
        self.set_social_flag(SocialFlag::Love, false).await
    }

    /// Favorite the project.
    pub async fn favorite(&self) -> Result<()> {
        self.set_social_flag(SocialFlag::Favorite, true).await
    }

    /// Remove the favorite from the project.
    pub async fn unfavorite(&self) -> Result<()> {
        self.set_social_flag(SocialFlag::Favorite, false).await
    }

    #[tracing::instrument(skip(self), fields(id = self.id))]
    async fn set_social_flag(&self, flag: SocialFlag, desired: bool) -> Result<()> {
        let session = self.client.require_session()?;
        let url = self.client.api_url(&format!(
            "proxy/projects/{}/{}/user/{}",
            self.id,
            flag.segment(),
            urlencoding::encode(session.username())
        ))?;
        let method = if desired { Method::POST } else { Method::DELETE };
        let client = &self.client;

        set_flag(
            &client.config().toggle_retry,
            flag.action(desired),
            desired,
            || {
                let request = client.request(method.clone(), url.clone());
                async move {
                    let response = client.send(request).await?;
                    let ack: SocialAck = ScratchClient::json(response).await?;
                    flag.acknowledged(&ack)
                }
            },
        )
        .await
    }

    // =========================================================================
    // Comments (session required)
    // =========================================================================

    /// Post a comment, optionally as a reply and mentioning a user.
    #[tracing::instrument(skip(self, content), fields(id = self.id))]
    pub async fn post_comment(
        &self,
        content: &str,
        parent_id: Option<u64>,
        commentee_id: Option<u64>,
    ) -> Result<Comment> {
        self.client.require_session()?;

        let url = self
            .client
            .api_url(&format!("proxy/comments/project/{}/", self.id))?;
        let referer = self.client.site_url(&format!("projects/{}/", self.id))?;
        let mut headers = HeaderMap::new();
        headers.insert(
            REFERER,
            HeaderValue::from_str(referer.as_str())
                .map_err(|_| ScratchError::InvalidInput(format!("invalid referer '{referer}'")))?,
        );

        let body = NewComment {
            commentee_id,
            content,
            parent_id,
        };
        let request = self
            .client
            .request(Method::POST, url)
            .headers(headers)
            .header(ACCEPT, "application/json")
            .json(&body);
        let response = self.client.send(request).await?;
        ScratchClient::json(response).await
    }

    /// Reply to a top-level comment.
    pub async fn reply_comment(
        &self,
        content: &str,
        parent_id: u64,
        commentee_id: Option<u64>,
    ) -> Result<Comment> {
        self.post_comment(content, Some(parent_id), commentee_id).await
    }

    /// Report a comment to the moderators.
    #[tracing::instrument(skip(self), fields(id = self.id))]
    pub async fn report_comment(&self, comment_id: u64) -> Result<()> {
        self.client.require_session()?;
        let url = self.client.api_url(&format!(
            "proxy/comments/project/{}/comment/{comment_id}/report",
            self.id
        ))?;
        self.client.delete(url).await?;
        Ok(())
    }

    // =========================================================================
    // Owner-only operations
    // =========================================================================

    /// Delete a comment on the project.
    #[tracing::instrument(skip(self), fields(id = self.id))]
    pub async fn delete_comment(&self, comment_id: u64) -> Result<()> {
        self.client.require_owner(&self.author, "delete comments")?;
        let url = self.client.api_url(&format!(
            "proxy/comments/project/{}/comment/{comment_id}/",
            self.id
        ))?;
        self.client.delete(url).await?;
        Ok(())
    }

    /// PUT changed fields and rehydrate from the reply.
    async fn put_fields(&mut self, path: String, body: Value) -> Result<()> {
        let url = self.client.api_url(&path)?;
        let response = self.client.put(url, &body).await?;
        let raw: RawProject = ScratchClient::json(response).await?;
        self.hydrate(raw)
    }

    /// Enable or disable commenting.
    #[tracing::instrument(skip(self), fields(id = self.id))]
    pub async fn set_commenting(&mut self, allowed: bool) -> Result<()> {
        self.client.require_owner(&self.author, "change commenting")?;
        self.put_fields(
            format!("projects/{}/", self.id),
            json!({ "comments_allowed": allowed }),
        )
        .await
    }

    /// Enable commenting.
    pub async fn turn_on_commenting(&mut self) -> Result<()> {
        self.set_commenting(true).await
    }

    /// Disable commenting.
    pub async fn turn_off_commenting(&mut self) -> Result<()> {
        self.set_commenting(false).await
    }

    /// Flip commenting based on the current record.
    pub async fn toggle_commenting(&mut self) -> Result<()> {
        let allowed = !self.comments_allowed;
        self.set_commenting(allowed).await
    }

    /// Change the title.
    #[tracing::instrument(skip(self), fields(id = self.id))]
    pub async fn set_title(&mut self, title: &str) -> Result<()> {
        self.client.require_owner(&self.author, "change the title")?;
        self.put_fields(format!("projects/{}", self.id), json!({ "title": title }))
            .await
    }

    /// Change the instructions.
    #[tracing::instrument(skip(self, text), fields(id = self.id))]
    pub async fn set_instructions(&mut self, text: &str) -> Result<()> {
        self.client
            .require_owner(&self.author, "change the instructions")?;
        self.put_fields(
            format!("projects/{}", self.id),
            json!({ "instructions": text }),
        )
        .await
    }

    /// Change the notes and credits.
    #[tracing::instrument(skip(self, text), fields(id = self.id))]
    pub async fn set_notes(&mut self, text: &str) -> Result<()> {
        self.client.require_owner(&self.author, "change the notes")?;
        self.put_fields(
            format!("projects/{}", self.id),
            json!({ "description": text }),
        )
        .await
    }

    /// Share the project. Does nothing if it is known to be shared.
    pub async fn share(&mut self) -> Result<()> {
        self.set_shared(true).await
    }

    /// Unshare the project. Does nothing if it is known to be unshared.
    pub async fn unshare(&mut self) -> Result<()> {
        self.set_shared(false).await
    }

    #[tracing::instrument(skip(self), fields(id = self.id))]
    async fn set_shared(&mut self, shared: bool) -> Result<()> {
        self.client.require_owner(
            &self.author,
            if shared { "share the project" } else { "unshare the project" },
        )?;
        if self.shared == Some(shared) {
            return Ok(());
        }

        let endpoint = if shared { "share" } else { "unshare" };
        let url = self
            .client
            .api_url(&format!("proxy/projects/{}/{endpoint}/", self.id))?;
        let request = self
            .client
            .request(Method::PUT, url)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json");
        self.client.send(request).await?;
        self.shared = Some(shared);
        Ok(())
    }

    /// Replace the thumbnail with an encoded image.
    #[tracing::instrument(skip(self, image), fields(id = self.id, len = image.len()))]
    pub async fn set_thumbnail(&self, image: Vec<u8>) -> Result<()> {
        self.client.require_owner(&self.author, "set the thumbnail")?;
        let url = self
            .client
            .site_url(&format!("internalapi/project/thumbnail/{}/set/", self.id))?;
        let request = self
            .client
            .request(Method::POST, url)
            .header(CONTENT_TYPE, "image/png")
            .body(image);
        self.client.send(request).await?;
        Ok(())
    }

    /// Replace the project JSON.
    #[tracing::instrument(skip(self, payload), fields(id = self.id))]
    pub async fn set_json(&self, payload: &Value) -> Result<()> {
        self.client.require_owner(&self.author, "upload project JSON")?;
        let url = self.client.projects_url(&self.id.to_string())?;
        self.client.put(url, payload).await?;
        Ok(())
    }

    /// Copy the project JSON of `source_id` into this project.
    #[tracing::instrument(skip(self), fields(id = self.id))]
    pub async fn upload_json_from(&self, source_id: u64) -> Result<()> {
        self.client.require_owner(&self.author, "upload project JSON")?;
        let payload = match get_project(&self.client, source_id).await? {
            ProjectLookup::Found(mut source) => source.raw_json().await?,
            ProjectLookup::Partial(_) => {
                return Err(ScratchError::FetchError(format!(
                    "project {source_id} is not accessible"
                )))
            }
        };
        self.set_json(&payload).await
    }
}
