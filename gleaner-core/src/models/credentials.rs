//! Basic-auth credentials.

use std::fmt;

use crate::error::CoreError;

/// A user/token pair sent as HTTP basic auth.
///
/// Both halves are required; a lone user or a lone token is a
/// configuration error caught when the backend is built.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    user: String,
    token: String,
}

impl Credentials {
    /// Creates credentials from a non-empty user and token.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfig`] if either half is empty.
    pub fn new(user: impl Into<String>, token: impl Into<String>) -> Result<Self, CoreError> {
        let user = user.into();
        let token = token.into();
        if user.is_empty() || token.is_empty() {
            return Err(CoreError::InvalidConfig(
                "Authentication requires both user and api token".to_string(),
            ));
        }
        Ok(Self { user, token })
    }

    /// Builds optional credentials from optional halves.
    ///
    /// Empty strings count as absent. Returns `Ok(None)` when neither half
    /// is present.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfig`] when only one half is present.
    pub fn from_parts(user: Option<String>, token: Option<String>) -> Result<Option<Self>, CoreError> {
        let user = user.filter(|u| !u.is_empty());
        let token = token.filter(|t| !t.is_empty());

        match (user, token) {
            (Some(user), Some(token)) => Self::new(user, token).map(Some),
            (None, None) => Ok(None),
            _ => Err(CoreError::InvalidConfig(
                "Authentication requires both user and api token".to_string(),
            )),
        }
    }

    /// Returns the user name.
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Returns the API token.
    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("token", &"<redacted>")
            .finish()
    }
}
