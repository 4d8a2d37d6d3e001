use anyhow::{bail, Result};
use tracing::debug;

use crate::api::models::{
    CreateTweetRequest, CreateTweetResponse, SearchPage, EXPANSIONS, TWEET_FIELDS, USER_FIELDS,
};
use crate::api::oauth;
use crate::config::credentials::Credentials;

pub const DEFAULT_BASE_URL: &str = "https://api.twitter.com";

const RECENT_SEARCH_PATH: &str = "/2/tweets/search/recent";
const CREATE_TWEET_PATH: &str = "/2/tweets";

/// Recent search parameters. `max_results` is normalized into the
/// 10..=100 range the endpoint accepts; time bounds are ISO 8601 strings
/// passed through verbatim.
#[derive(Debug, Clone)]
pub struct SearchParams {
    pub query: String,
    pub max_results: u32,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub limit_pages: usize,
}

impl SearchParams {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            max_results: 100,
            start_time: None,
            end_time: None,
            limit_pages: 10,
        }
    }

    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn with_time_window(mut self, start: Option<String>, end: Option<String>) -> Self {
        self.start_time = start;
        self.end_time = end;
        self
    }

    /// Cap on fetched pages. Zero means no cap; iteration then runs
    /// until the server stops returning a next_token.
    pub fn with_page_limit(mut self, limit_pages: usize) -> Self {
        self.limit_pages = limit_pages;
        self
    }

    /// Per-page size clamped to what the endpoint accepts.
    pub fn normalized_max_results(&self) -> u32 {
        self.max_results.clamp(10, 100)
    }
}

/// Thin client over the Twitter/X v2 API for recent search and
/// (optionally) posting.
#[derive(Debug, Clone)]
pub struct TwitterClient {
    client: reqwest::blocking::Client,
    credentials: Credentials,
    base_url: String,
    can_write: bool,
}

impl TwitterClient {
    /// Read-only client with credentials taken from the environment.
    pub fn new() -> Result<Self> {
        Ok(Self::read_only(Credentials::from_env()?))
    }

    /// Read-only client: searches work, posting is refused.
    pub fn read_only(credentials: Credentials) -> Self {
        Self::build(credentials, false)
    }

    /// Read-write client. All four user-context secrets must be present.
    pub fn read_write(credentials: Credentials) -> Result<Self> {
        if !credentials.has_user_context() {
            bail!(
                "write access requires TW_API_KEY/TW_API_SECRET and \
                 TW_ACCESS_TOKEN/TW_ACCESS_SECRET"
            );
        }
        Ok(Self::build(credentials, true))
    }

    fn build(credentials: Credentials, can_write: bool) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            credentials,
            base_url: DEFAULT_BASE_URL.to_string(),
            can_write,
        }
    }

    /// Point the client at a different server. Used by tests.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Lazy sequence of result pages. Nothing is fetched until the
    /// iterator is advanced, and each page is fetched on demand.
    pub fn search(&self, params: SearchParams) -> SearchPages<'_> {
        SearchPages {
            client: self,
            params,
            next_token: None,
            pages_fetched: 0,
            done: false,
        }
    }

    fn fetch_page(&self, params: &SearchParams, next_token: Option<&str>) -> Result<SearchPage> {
        let url = format!("{}{}", self.base_url, RECENT_SEARCH_PATH);
        let max_results = params.normalized_max_results().to_string();

        let mut query: Vec<(&str, &str)> = vec![
            ("query", params.query.as_str()),
            ("max_results", max_results.as_str()),
            ("tweet.fields", TWEET_FIELDS),
            ("expansions", EXPANSIONS),
            ("user.fields", USER_FIELDS),
        ];
        if let Some(start) = params.start_time.as_deref() {
            query.push(("start_time", start));
        }
        if let Some(end) = params.end_time.as_deref() {
            query.push(("end_time", end));
        }
        if let Some(token) = next_token {
            query.push(("next_token", token));
        }

        let response = self
            .client
            .get(&url)
            .bearer_auth(self.credentials.bearer_token())
            .query(&query)
            .send()?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text()?;
            bail!("API error {}: {}", status, error_text);
        }

        let page: SearchPage = response.json()?;
        Ok(page)
    }

    /// Post a tweet and return its id. Fails on a read-only client
    /// before any network traffic.
    pub fn post_tweet(&self, text: &str) -> Result<String> {
        if !self.can_write {
            bail!("Client not initialized with write permissions.");
        }

        let url = format!("{}{}", self.base_url, CREATE_TWEET_PATH);
        let auth = oauth::authorization_header("POST", &url, &self.credentials)?;

        let response = self
            .client
            .post(&url)
            .header(reqwest::header::AUTHORIZATION, auth)
            .json(&CreateTweetRequest { text })
            .send()?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text()?;
            bail!("API error {}: {}", status, error_text);
        }

        let created: CreateTweetResponse = response.json()?;
        Ok(created.data.id)
    }
}

/// Iterator over recent search pages.
///
/// Stops after `limit_pages` pages (when non-zero) or when the server
/// returns no next_token. A fetch error ends the iteration after
/// yielding the error.
pub struct SearchPages<'a> {
    client: &'a TwitterClient,
    params: SearchParams,
    next_token: Option<String>,
    pages_fetched: usize,
    done: bool,
}

impl Iterator for SearchPages<'_> {
    type Item = Result<SearchPage>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if self.params.limit_pages != 0 && self.pages_fetched >= self.params.limit_pages {
            self.done = true;
            return None;
        }

        debug!(
            target: "api",
            "fetching page {} (token: {:?})",
            self.pages_fetched + 1,
            self.next_token
        );
        let page = match self
            .client
            .fetch_page(&self.params, self.next_token.as_deref())
        {
            Ok(page) => page,
            Err(e) => {
                self.done = true;
                return Some(Err(e));
            }
        };

        self.pages_fetched += 1;
        match page.next_token() {
            Some(token) => self.next_token = Some(token.to_string()),
            None => self.done = true,
        }
        Some(Ok(page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_results_is_clamped_to_endpoint_range() {
        let params = |n| SearchParams::new("q").with_max_results(n);
        assert_eq!(params(3).normalized_max_results(), 10);
        assert_eq!(params(10).normalized_max_results(), 10);
        assert_eq!(params(55).normalized_max_results(), 55);
        assert_eq!(params(100).normalized_max_results(), 100);
        assert_eq!(params(500).normalized_max_results(), 100);
    }

    #[test]
    fn read_write_requires_full_credentials() {
        let err = TwitterClient::read_write(Credentials::bearer_only("b")).unwrap_err();
        assert!(err.to_string().contains("write access"));

        let creds = Credentials::with_user_context("b", "ck", "cs", "at", "as");
        assert!(TwitterClient::read_write(creds).is_ok());
    }
}
