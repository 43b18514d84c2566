//! Client configuration.

use std::env;
use std::time::Duration;

use url::Url;

use crate::error::Result;
use crate::toggle::RetryPolicy;

const DEFAULT_API_URL: &str = "https://api.scratch.mit.edu";
const DEFAULT_SITE_URL: &str = "https://scratch.mit.edu";
const DEFAULT_PROJECTS_URL: &str = "https://projects.scratch.mit.edu";
const DEFAULT_SCRATCHDB_URL: &str = "https://scratchdb.lefty.one";
const DEFAULT_NFE_URL: &str = "https://jeffalo.net/api/nfe";

/// Base URLs, timeout and retry settings for a [`ScratchClient`](crate::ScratchClient).
///
/// # Example
///
/// ```
/// use scratchapi::ClientConfig;
///
/// let config = ClientConfig::default();
/// assert_eq!(config.api_url, "https://api.scratch.mit.edu");
///
/// // Point every host at a single test server
/// let config = ClientConfig::with_base_url("http://127.0.0.1:8080");
/// assert_eq!(config.site_url, "http://127.0.0.1:8080/site");
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// REST API host (project metadata, comments, listings).
    pub api_url: String,
    /// Main site host (referer, thumbnail uploads).
    pub site_url: String,
    /// Project payload host (token-authorized JSON download and upload).
    pub projects_url: String,
    /// ScratchDB host for rank statistics.
    pub scratchdb_url: String,
    /// Moderation status service.
    pub nfe_url: String,
    /// Transport timeout per request.
    pub timeout: Duration,
    /// Retry bounds for love/favorite toggles.
    pub toggle_retry: RetryPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            site_url: DEFAULT_SITE_URL.to_string(),
            projects_url: DEFAULT_PROJECTS_URL.to_string(),
            scratchdb_url: DEFAULT_SCRATCHDB_URL.to_string(),
            nfe_url: DEFAULT_NFE_URL.to_string(),
            timeout: Duration::from_secs(30),
            toggle_retry: RetryPolicy::default(),
        }
    }
}

impl ClientConfig {
    /// Read base URL overrides from the environment.
    ///
    /// Each of `SCRATCH_API_URL`, `SCRATCH_SITE_URL`, `SCRATCH_PROJECTS_URL`,
    /// `SCRATCHDB_URL` and `SCRATCH_NFE_URL` is optional and falls back to
    /// the public service.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_url: env::var("SCRATCH_API_URL").unwrap_or(defaults.api_url),
            site_url: env::var("SCRATCH_SITE_URL").unwrap_or(defaults.site_url),
            projects_url: env::var("SCRATCH_PROJECTS_URL").unwrap_or(defaults.projects_url),
            scratchdb_url: env::var("SCRATCHDB_URL").unwrap_or(defaults.scratchdb_url),
            nfe_url: env::var("SCRATCH_NFE_URL").unwrap_or(defaults.nfe_url),
            ..defaults
        }
    }

    /// Serve every host from one server, each under its own prefix.
    ///
    /// The API lives at the root; the site, project payload, ScratchDB and
    /// moderation hosts live under `/site`, `/project-host`, `/scratchdb`
    /// and `/nfe`.
    pub fn with_base_url(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            api_url: base.to_string(),
            site_url: format!("{base}/site"),
            projects_url: format!("{base}/project-host"),
            scratchdb_url: format!("{base}/scratchdb"),
            nfe_url: format!("{base}/nfe"),
            ..Self::default()
        }
    }

    /// Replace the toggle retry policy.
    #[must_use]
    pub fn with_toggle_retry(mut self, policy: RetryPolicy) -> Self {
        self.toggle_retry = policy;
        self
    }

    /// Replace the transport timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Parsed base URLs, each ending with `/` so that `join` appends.
#[derive(Debug)]
pub(crate) struct Endpoints {
    pub api: Url,
    pub site: Url,
    pub projects: Url,
    pub scratchdb: Url,
    pub nfe: Url,
}

impl Endpoints {
    pub(crate) fn parse(config: &ClientConfig) -> Result<Self> {
        Ok(Self {
            api: parse_base(&config.api_url)?,
            site: parse_base(&config.site_url)?,
            projects: parse_base(&config.projects_url)?,
            scratchdb: parse_base(&config.scratchdb_url)?,
            nfe: parse_base(&config.nfe_url)?,
        })
    }
}

fn parse_base(base_url: &str) -> Result<Url> {
    // Ensure base URL ends with /
    let base_url = if base_url.ends_with('/') {
        base_url.to_string()
    } else {
        format!("{base_url}/")
    };
    Ok(Url::parse(&base_url)?)
}
