//! Logged-in session credentials.

use std::env;

use crate::error::{Result, ScratchError};

/// Credentials of a logged-in Scratch user.
///
/// A session is immutable once built. Clients hold it behind an `Arc`, so
/// every record created through a client sees exactly the session that was
/// attached when the record was created.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    username: String,
    session_id: String,
    csrf_token: String,
    x_token: Option<String>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Create a session from the values of the `scratchsessionsid` and
    /// `scratchcsrftoken` cookies.
    pub fn new(
        username: impl Into<String>,
        session_id: impl Into<String>,
        csrf_token: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            session_id: session_id.into(),
            csrf_token: csrf_token.into(),
            x_token: None,
        }
    }

    /// Attach the API token used by `x-token` authenticated reads.
    #[must_use]
    pub fn with_x_token(mut self, token: impl Into<String>) -> Self {
        self.x_token = Some(token.into());
        self
    }

    /// Read a session from `SCRATCH_USERNAME`, `SCRATCH_SESSION_ID`,
    /// `SCRATCH_CSRF_TOKEN` and optionally `SCRATCH_X_TOKEN`.
    ///
    /// # Errors
    ///
    /// Returns [`ScratchError::ConfigMissing`] if a required variable is unset.
    pub fn from_env() -> Result<Self> {
        let session = Self::new(
            required_var("SCRATCH_USERNAME")?,
            required_var("SCRATCH_SESSION_ID")?,
            required_var("SCRATCH_CSRF_TOKEN")?,
        );
        Ok(match env::var("SCRATCH_X_TOKEN") {
            Ok(token) => session.with_x_token(token),
            Err(_) => session,
        })
    }

    /// The logged-in username.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// The CSRF token sent as `x-csrftoken`.
    pub fn csrf_token(&self) -> &str {
        &self.csrf_token
    }

    /// The API token, if one was attached.
    pub fn x_token(&self) -> Option<&str> {
        self.x_token.as_deref()
    }

    /// Cookie header value carrying the session.
    pub(crate) fn cookie(&self) -> String {
        format!(
            "scratchcsrftoken={};scratchlanguage=en;scratchsessionsid=\"{}\";",
            self.csrf_token, self.session_id
        )
    }

    /// Whether this session belongs to `author`. Usernames are case-insensitive.
    pub fn is_owner(&self, author: &str) -> bool {
        self.username.eq_ignore_ascii_case(author)
    }
}

fn required_var(name: &str) -> Result<String> {
    env::var(name)
        .map_err(|_| ScratchError::ConfigMissing(format!("{name} environment variable not set")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_hides_secrets() {
        let session = Session::new("griffpatch", "secret-session", "secret-csrf")
            .with_x_token("secret-token");
        let debug = format!("{:?}", session);
        assert!(debug.contains("griffpatch"));
        assert!(!debug.contains("secret"));
    }

    #[test]
    fn test_cookie_format() {
        let session = Session::new("user", "sid", "csrf");
        assert_eq!(
            session.cookie(),
            "scratchcsrftoken=csrf;scratchlanguage=en;scratchsessionsid=\"sid\";"
        );
    }

    #[test]
    fn test_owner_check_ignores_case() {
        let session = Session::new("Griffpatch", "sid", "csrf");
        assert!(session.is_owner("griffpatch"));
        assert!(!session.is_owner("someone_else"));
    }
}
