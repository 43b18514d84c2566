//! Project record, hydration, and read operations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{CACHE_CONTROL, PRAGMA};
use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::client::ScratchClient;
use crate::error::{Result, ScratchError};
use crate::pagination::{Listing, Page, PaginationParams};
use crate::traits::{Get, List};

/// A Scratch project.
///
/// Fields are replaced wholesale from the latest JSON snapshot by
/// [`Project::hydrate`]. The record keeps a clone of the client it was
/// created with; mutating operations use that client's session.
#[derive(Debug, Clone, Serialize)]
pub struct Project {
    /// The project id.
    pub id: u64,
    /// Public page of the project.
    pub url: String,
    /// The project title.
    pub title: String,
    /// Username of the author.
    pub author: String,
    /// Whether comments are enabled.
    pub comments_allowed: bool,
    /// The "Instructions" section.
    pub instructions: String,
    /// The "Notes and Credits" section.
    pub notes: String,
    /// When the project was created.
    pub created: Option<DateTime<Utc>>,
    /// When the project was last modified.
    pub last_modified: Option<DateTime<Utc>>,
    /// When the project was shared.
    pub share_date: Option<DateTime<Utc>>,
    /// Thumbnail image URL.
    pub thumbnail_url: Option<String>,
    /// The project this one was remixed from.
    pub remix_parent: Option<u64>,
    /// The original project at the root of the remix tree.
    pub remix_root: Option<u64>,
    /// Love count.
    pub loves: u64,
    /// Favorite count.
    pub favorites: u64,
    /// Number of remixes.
    pub remix_count: u64,
    /// View count.
    pub views: u64,
    /// Token required to access the project payload.
    pub project_token: Option<String>,
    /// Whether the project is shared, when known.
    pub shared: Option<bool>,

    #[serde(skip)]
    pub(crate) client: ScratchClient,
}

/// Project JSON as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawProject {
    /// Absent in some write acknowledgments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default)]
    pub visibility: Option<String>,
    #[serde(default)]
    pub public: Option<bool>,
    #[serde(default)]
    pub comments_allowed: bool,
    #[serde(default)]
    pub is_published: Option<bool>,
    pub author: RawAuthor,
    #[serde(default)]
    pub image: Option<String>,
    pub history: RawHistory,
    pub stats: RawStats,
    #[serde(default)]
    pub remix: Option<RawRemix>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_token: Option<String>,
}

/// Author sub-object of a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawAuthor {
    #[serde(default)]
    pub id: Option<u64>,
    pub username: String,
    #[serde(default)]
    pub scratchteam: bool,
}

/// Timestamps sub-object of a project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawHistory {
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
    #[serde(default)]
    pub modified: Option<DateTime<Utc>>,
    #[serde(default)]
    pub shared: Option<DateTime<Utc>>,
}

/// Counters sub-object of a project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawStats {
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub loves: u64,
    #[serde(default)]
    pub favorites: u64,
    #[serde(default)]
    pub remixes: u64,
}

/// Remix lineage sub-object of a project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRemix {
    #[serde(default)]
    pub parent: Option<u64>,
    #[serde(default)]
    pub root: Option<u64>,
}

/// A project that exists but cannot be read, usually because it is unshared.
#[derive(Debug, Clone)]
pub struct PartialProject {
    /// The project id.
    pub id: u64,
    client: ScratchClient,
}

/// Result of looking a project up.
#[derive(Debug, Clone)]
pub enum ProjectLookup {
    /// The project was readable.
    Found(Project),
    /// The platform reported the project as absent or unshared.
    Partial(PartialProject),
}

/// Result of [`Project::refresh`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Fields were replaced from a fresh snapshot.
    Updated,
    /// The project is no longer accessible; fields were left untouched.
    NotAccessible,
}

impl ProjectLookup {
    /// The id of the looked-up project.
    pub fn id(&self) -> u64 {
        match self {
            Self::Found(p) => p.id,
            Self::Partial(p) => p.id,
        }
    }

    /// Whether the full project was readable.
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    /// The full project, if readable.
    pub fn project(&self) -> Option<&Project> {
        match self {
            Self::Found(p) => Some(p),
            Self::Partial(_) => None,
        }
    }

    /// Consume into the full project, if readable.
    pub fn into_project(self) -> Option<Project> {
        match self {
            Self::Found(p) => Some(p),
            Self::Partial(_) => None,
        }
    }
}

impl PartialProject {
    pub(crate) fn new(client: &ScratchClient, id: u64) -> Self {
        Self {
            id,
            client: client.clone(),
        }
    }

    /// Remixes of this project.
    pub async fn remixes(&self, listing: Listing) -> Result<Vec<Project>> {
        Project::list_all(&self.client, &ProjectListQuery::Remixes(self.id), listing).await
    }

    /// Whether the project is currently shared (readable by everyone).
    pub async fn is_shared(&self) -> Result<bool> {
        Ok(get_project(&self.client, self.id).await?.is_found())
    }
}

impl std::fmt::Display for Project {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.title)
    }
}

impl Project {
    /// An empty record awaiting hydration.
    fn blank(client: &ScratchClient, id: u64) -> Self {
        Self {
            id,
            url: String::new(),
            title: String::new(),
            author: String::new(),
            comments_allowed: false,
            instructions: String::new(),
            notes: String::new(),
            created: None,
            last_modified: None,
            share_date: None,
            thumbnail_url: None,
            remix_parent: None,
            remix_root: None,
            loves: 0,
            favorites: 0,
            remix_count: 0,
            views: 0,
            project_token: None,
            shared: None,
            client: client.clone(),
        }
    }

    /// Build a record from a listing entry.
    ///
    /// # Errors
    ///
    /// Returns [`ScratchError::MissingField`] if the payload has no `id`.
    pub fn from_raw(client: &ScratchClient, raw: RawProject) -> Result<Self> {
        let id = raw.id.ok_or(ScratchError::MissingField("id"))?;
        let mut project = Self::blank(client, id);
        project.hydrate(raw)?;
        Ok(project)
    }

    /// Replace every field from `raw`.
    ///
    /// A payload without `id` keeps the current id. Absent optional keys
    /// (remix lineage, project token, texts) reset the field to empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the public URL cannot be built from the site URL.
    pub fn hydrate(&mut self, raw: RawProject) -> Result<()> {
        if let Some(id) = raw.id {
            self.id = id;
        }
        let remix = raw.remix.unwrap_or_default();

        self.url = self.client.site_url(&format!("projects/{}/", self.id))?.to_string();
        self.title = raw.title;
        self.author = raw.author.username;
        self.comments_allowed = raw.comments_allowed;
        self.instructions = raw.instructions.unwrap_or_default();
        self.notes = raw.description.unwrap_or_default();
        self.created = raw.history.created;
        self.last_modified = raw.history.modified;
        self.share_date = raw.history.shared;
        self.thumbnail_url = raw.image;
        self.remix_parent = remix.parent;
        self.remix_root = remix.root;
        self.loves = raw.stats.loves;
        self.favorites = raw.stats.favorites;
        self.remix_count = raw.stats.remixes;
        self.views = raw.stats.views;
        self.project_token = raw.project_token;
        self.shared = raw.public;
        Ok(())
    }

    /// Whether this project is a remix of another.
    pub fn is_remix(&self) -> bool {
        self.remix_parent.is_some()
    }

    /// The client this record was created with.
    pub fn client(&self) -> &ScratchClient {
        &self.client
    }

    /// Re-fetch the project and replace all fields.
    ///
    /// # Errors
    ///
    /// [`ScratchError::RateLimited`] and transport failures propagate.
    /// A project that became unshared yields [`RefreshOutcome::NotAccessible`].
    #[tracing::instrument(skip(self), fields(id = self.id))]
    pub async fn refresh(&mut self) -> Result<RefreshOutcome> {
        match fetch_raw(&self.client, self.id).await {
            Ok(raw) => {
                self.hydrate(raw)?;
                Ok(RefreshOutcome::Updated)
            }
            Err(e) if e.is_not_accessible() => Ok(RefreshOutcome::NotAccessible),
            Err(e) => Err(e),
        }
    }

    /// Remixes of this project.
    pub async fn remixes(&self, listing: Listing) -> Result<Vec<Project>> {
        Project::list_all(&self.client, &ProjectListQuery::Remixes(self.id), listing).await
    }
}

/// Fetch a project's JSON without cache.
async fn fetch_raw(client: &ScratchClient, id: u64) -> Result<RawProject> {
    let url = client.api_url(&format!("projects/{id}"))?;
    let request = client
        .request(Method::GET, url)
        .header(PRAGMA, "no-cache")
        .header(CACHE_CONTROL, "no-cache");
    let response = client.send(request).await?;
    ScratchClient::json(response).await
}

/// Look a project up by id.
///
/// Unshared or missing projects are not an error: they come back as
/// [`ProjectLookup::Partial`].
///
/// # Errors
///
/// [`ScratchError::RateLimited`] when throttled; transport and parse
/// failures propagate.
///
/// # Example
///
/// ```no_run
/// use scratchapi::{get_project, ProjectLookup, ScratchClient};
///
/// # async fn example() -> scratchapi::Result<()> {
/// let client = ScratchClient::anonymous()?;
/// match get_project(&client, 104).await? {
///     ProjectLookup::Found(project) => println!("{} by {}", project.title, project.author),
///     ProjectLookup::Partial(partial) => println!("{} is not shared", partial.id),
/// }
/// # Ok(())
/// # }
/// ```
#[tracing::instrument(skip(client))]
pub async fn get_project(client: &ScratchClient, id: u64) -> Result<ProjectLookup> {
    match fetch_raw(client, id).await {
        Ok(raw) => {
            let mut project = Project::blank(client, id);
            project.hydrate(raw)?;
            Ok(ProjectLookup::Found(project))
        }
        Err(e) if e.is_not_accessible() => {
            tracing::debug!(id, "project not accessible");
            Ok(ProjectLookup::Partial(PartialProject::new(client, id)))
        }
        Err(e) => Err(e),
    }
}

#[async_trait]
impl Get for Project {
    type Id = u64;

    /// Strict lookup: an inaccessible project is [`ScratchError::NotAccessible`].
    #[tracing::instrument(skip(client))]
    async fn get(client: &ScratchClient, id: u64) -> Result<Self> {
        let raw = fetch_raw(client, id).await?;
        let mut project = Project::blank(client, id);
        project.hydrate(raw)?;
        Ok(project)
    }
}

/// Ordering of explore and search results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExploreMode {
    #[default]
    Trending,
    Popular,
    Recent,
}

/// Filters for explore and search listings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExploreQuery {
    /// Explore tag or search text. `*` selects every tag on explore.
    #[serde(rename = "q")]
    pub query: String,
    /// Result ordering.
    pub mode: ExploreMode,
    /// Language abbreviation; the platform localizes results.
    pub language: String,
}

impl Default for ExploreQuery {
    fn default() -> Self {
        Self {
            query: "*".to_string(),
            mode: ExploreMode::default(),
            language: "en".to_string(),
        }
    }
}

impl ExploreQuery {
    /// A search for `text` with default mode and language.
    pub fn search(text: impl Into<String>) -> Self {
        Self {
            query: text.into(),
            ..Self::default()
        }
    }

    /// Set the mode.
    #[must_use]
    pub fn mode(mut self, mode: ExploreMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the language.
    #[must_use]
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }
}

/// Which project listing to read.
#[derive(Debug, Clone, PartialEq)]
pub enum ProjectListQuery {
    /// The explore page.
    Explore(ExploreQuery),
    /// Search results. The query text must not be empty.
    Search(ExploreQuery),
    /// Remixes of the given project.
    Remixes(u64),
}

#[async_trait]
impl List for Project {
    type Query = ProjectListQuery;

    #[tracing::instrument(skip(client))]
    async fn list_page(
        client: &ScratchClient,
        query: &Self::Query,
        params: PaginationParams,
    ) -> Result<Page<Self>> {
        #[derive(Serialize)]
        struct RequestParams<'a> {
            #[serde(flatten)]
            filters: Option<&'a ExploreQuery>,
            #[serde(flatten)]
            page: PaginationParams,
        }

        let (path, filters) = match query {
            ProjectListQuery::Explore(filters) => ("explore/projects".to_string(), Some(filters)),
            ProjectListQuery::Search(filters) => {
                if filters.query.is_empty() {
                    return Err(ScratchError::InvalidInput(
                        "the query can't be empty for search".to_string(),
                    ));
                }
                ("search/projects".to_string(), Some(filters))
            }
            ProjectListQuery::Remixes(id) => (format!("projects/{id}/remixes"), None),
        };

        let url = client.api_url(&path)?;
        let response = client
            .get_with_query(url, &RequestParams { filters, page: params })
            .await?;
        let data: Option<Vec<RawProject>> = ScratchClient::json(response).await?;

        let items = data
            .unwrap_or_default()
            .into_iter()
            .map(|raw| Project::from_raw(client, raw))
            .collect::<Result<Vec<_>>>()?;

        Ok(Page::new(items, params.offset, params.limit))
    }
}

/// Projects on the explore page.
///
/// # Example
///
/// ```no_run
/// use scratchapi::{explore_projects, ExploreMode, ExploreQuery, Listing, ScratchClient};
///
/// # async fn example() -> scratchapi::Result<()> {
/// let client = ScratchClient::anonymous()?;
/// let query = ExploreQuery::default().mode(ExploreMode::Popular);
/// let projects = explore_projects(&client, query, Listing::first(80)).await?;
/// # Ok(())
/// # }
/// ```
pub async fn explore_projects(
    client: &ScratchClient,
    query: ExploreQuery,
    listing: Listing,
) -> Result<Vec<Project>> {
    Project::list_all(client, &ProjectListQuery::Explore(query), listing).await
}

/// Projects matching a search.
///
/// # Errors
///
/// [`ScratchError::InvalidInput`] for an empty query, before any request.
pub async fn search_projects(
    client: &ScratchClient,
    query: ExploreQuery,
    listing: Listing,
) -> Result<Vec<Project>> {
    if query.query.is_empty() {
        return Err(ScratchError::InvalidInput(
            "the query can't be empty for search".to_string(),
        ));
    }
    Project::list_all(client, &ProjectListQuery::Search(query), listing).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_json() -> serde_json::Value {
        serde_json::json!({
            "id": 104,
            "title": "Weekend",
            "description": "Made with love",
            "instructions": "Press the green flag",
            "visibility": "visible",
            "public": true,
            "comments_allowed": true,
            "is_published": true,
            "author": {"id": 1, "username": "andresmh", "scratchteam": true},
            "image": "https://cdn2.scratch.mit.edu/get_image/project/104_480x360.png",
            "history": {
                "created": "2007-03-05T09:20:40.000Z",
                "modified": "2012-10-25T13:05:20.000Z",
                "shared": "2007-03-05T09:20:40.000Z"
            },
            "stats": {"views": 5000, "loves": 30, "favorites": 20, "remixes": 3},
            "remix": {"parent": null, "root": null},
            "project_token": "1700000000_abcdef"
        })
    }

    fn raw() -> RawProject {
        serde_json::from_value(raw_json()).unwrap()
    }

    fn client() -> ScratchClient {
        ScratchClient::anonymous().unwrap()
    }

    #[test]
    fn test_from_raw_maps_fields() {
        let project = Project::from_raw(&client(), raw()).unwrap();

        assert_eq!(project.id, 104);
        assert_eq!(project.url, "https://scratch.mit.edu/projects/104/");
        assert_eq!(project.author, "andresmh");
        assert_eq!(project.notes, "Made with love");
        assert_eq!(project.instructions, "Press the green flag");
        assert_eq!(project.loves, 30);
        assert_eq!(project.remix_count, 3);
        assert_eq!(project.views, 5000);
        assert_eq!(project.project_token.as_deref(), Some("1700000000_abcdef"));
        assert_eq!(project.shared, Some(true));
        assert!(!project.is_remix());
        assert_eq!(
            project.created.unwrap().to_rfc3339(),
            "2007-03-05T09:20:40+00:00"
        );
        assert_eq!(project.to_string(), "Weekend");
    }

    #[test]
    fn test_hydrate_is_idempotent() {
        let mut project = Project::from_raw(&client(), raw()).unwrap();
        let first = serde_json::to_value(&project).unwrap();

        project.hydrate(raw()).unwrap();
        let second = serde_json::to_value(&project).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_remix_is_tolerated() {
        let mut json = raw_json();
        json.as_object_mut().unwrap().remove("remix");
        json.as_object_mut().unwrap().remove("project_token");

        let project = Project::from_raw(&client(), serde_json::from_value(json).unwrap()).unwrap();
        assert_eq!(project.remix_parent, None);
        assert_eq!(project.remix_root, None);
        assert_eq!(project.project_token, None);
    }

    #[test]
    fn test_remix_lineage() {
        let mut json = raw_json();
        json["remix"] = serde_json::json!({"parent": 50, "root": 10});

        let project = Project::from_raw(&client(), serde_json::from_value(json).unwrap()).unwrap();
        assert!(project.is_remix());
        assert_eq!(project.remix_parent, Some(50));
        assert_eq!(project.remix_root, Some(10));
    }

    #[test]
    fn test_from_raw_requires_id() {
        let mut raw = raw();
        raw.id = None;

        let err = Project::from_raw(&client(), raw).unwrap_err();
        assert!(matches!(err, ScratchError::MissingField("id")));
    }

    #[test]
    fn test_hydrate_without_id_keeps_identity() {
        let mut project = Project::from_raw(&client(), raw()).unwrap();
        let mut update = raw();
        update.id = None;
        update.title = "Renamed".to_string();

        project.hydrate(update).unwrap();
        assert_eq!(project.id, 104);
        assert_eq!(project.title, "Renamed");
    }

    #[test]
    fn test_hydrate_replaces_stale_fields() {
        let mut project = Project::from_raw(&client(), raw()).unwrap();
        let mut update = raw();
        update.remix = Some(RawRemix {
            parent: Some(7),
            root: Some(7),
        });
        update.project_token = None;
        update.stats.loves = 31;

        project.hydrate(update).unwrap();
        assert_eq!(project.remix_parent, Some(7));
        assert_eq!(project.project_token, None);
        assert_eq!(project.loves, 31);
    }

    #[test]
    fn test_missing_required_key_fails_to_decode() {
        let mut json = raw_json();
        json.as_object_mut().unwrap().remove("author");
        assert!(serde_json::from_value::<RawProject>(json).is_err());
    }

    #[test]
    fn test_explore_query_serialization() {
        let query = ExploreQuery::search("platformer")
            .mode(ExploreMode::Recent)
            .language("de");
        let serialized = serde_qs::to_string(&query).unwrap();
        assert_eq!(serialized, "q=platformer&mode=recent&language=de");

        let defaults = serde_qs::to_string(&ExploreQuery::default()).unwrap();
        assert!(defaults.contains("mode=trending"));
        assert!(defaults.contains("language=en"));
    }
}
