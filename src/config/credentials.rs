use std::fmt;

use anyhow::{bail, Result};

/// Twitter/X API credentials.
///
/// Only the bearer token is required for read/search against the v2 API.
/// Posting needs the consumer key/secret and access token/secret as well.
#[derive(Clone)]
pub struct Credentials {
    bearer_token: String,
    api_key: Option<String>,
    api_secret: Option<String>,
    access_token: Option<String>,
    access_secret: Option<String>,
}

impl Credentials {
    /// Load credentials from the process environment. A `.env` file in the
    /// working directory is merged in first when present.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::resolve(|name| std::env::var(name).ok())
    }

    /// Resolve credentials through an arbitrary lookup. Each secret accepts
    /// two names; the first that resolves to a non-empty value wins.
    pub fn resolve(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let Some(bearer) = first_non_empty(&lookup, &["TW_BEARER_TOKEN", "BEARER_TOKEN"]) else {
            bail!("Missing BEARER token. Set TW_BEARER_TOKEN or BEARER_TOKEN in env/.env.");
        };

        Ok(Self {
            bearer_token: bearer.trim().to_string(),
            api_key: first_non_empty(&lookup, &["TW_API_KEY", "API_KEY"]),
            api_secret: first_non_empty(&lookup, &["TW_API_SECRET", "API_SECRET"]),
            access_token: first_non_empty(&lookup, &["TW_ACCESS_TOKEN", "ACCESS_TOKEN"]),
            access_secret: first_non_empty(&lookup, &["TW_ACCESS_SECRET", "ACCESS_TOKEN_SECRET"]),
        })
    }

    /// Build read-only credentials from a bearer token.
    pub fn bearer_only(bearer_token: impl Into<String>) -> Self {
        Self {
            bearer_token: bearer_token.into(),
            api_key: None,
            api_secret: None,
            access_token: None,
            access_secret: None,
        }
    }

    /// Build full credentials, including the user-context secrets.
    pub fn with_user_context(
        bearer_token: impl Into<String>,
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
        access_token: impl Into<String>,
        access_secret: impl Into<String>,
    ) -> Self {
        Self {
            bearer_token: bearer_token.into(),
            api_key: Some(api_key.into()),
            api_secret: Some(api_secret.into()),
            access_token: Some(access_token.into()),
            access_secret: Some(access_secret.into()),
        }
    }

    pub fn bearer_token(&self) -> &str {
        &self.bearer_token
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    pub fn api_secret(&self) -> Option<&str> {
        self.api_secret.as_deref()
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    pub fn access_secret(&self) -> Option<&str> {
        self.access_secret.as_deref()
    }

    /// True when all four user-context secrets are present.
    pub fn has_user_context(&self) -> bool {
        self.api_key.is_some()
            && self.api_secret.is_some()
            && self.access_token.is_some()
            && self.access_secret.is_some()
    }
}

// Secrets stay out of logs and panic messages.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Credentials").field(&"REDACTED").finish()
    }
}

/// Empty values count as unset, matching shells that `export VAR=`.
fn first_non_empty(lookup: &impl Fn(&str) -> Option<String>, names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|&name| lookup(name))
        .find(|value| !value.is_empty())
}
