use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Tweet fields requested on every search call.
pub const TWEET_FIELDS: &str = "id,text,author_id,created_at,lang,conversation_id,public_metrics";

/// Expansions requested alongside the tweets.
pub const EXPANSIONS: &str = "author_id";

/// Fields for the expanded user objects.
pub const USER_FIELDS: &str = "id,name,username";

/// A raw tweet object as returned by recent search.
///
/// Every field is optional. The server only sends what was asked for,
/// and third-party payloads have been seen with fields missing entirely.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Tweet {
    #[serde(deserialize_with = "id_string")]
    pub id: Option<String>,
    pub text: Option<String>,
    #[serde(deserialize_with = "id_string")]
    pub author_id: Option<String>,
    pub created_at: Option<String>,
    pub lang: Option<String>,
    #[serde(deserialize_with = "id_string")]
    pub conversation_id: Option<String>,
    pub public_metrics: Option<PublicMetrics>,
}

/// Engagement counters attached to a tweet.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PublicMetrics {
    pub like_count: Option<i64>,
    pub retweet_count: Option<i64>,
    pub reply_count: Option<i64>,
    pub quote_count: Option<i64>,
}

/// Expanded user object from the `author_id` expansion.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApiUser {
    #[serde(deserialize_with = "id_string")]
    pub id: Option<String>,
    pub name: Option<String>,
    pub username: Option<String>,
}

/// Expansion payloads delivered next to the tweet data.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Includes {
    pub users: Vec<ApiUser>,
}

/// Pagination metadata for a search page.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SearchMeta {
    pub result_count: Option<u64>,
    pub newest_id: Option<String>,
    pub oldest_id: Option<String>,
    pub next_token: Option<String>,
}

/// One page of recent search results.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SearchPage {
    pub data: Vec<Tweet>,
    pub includes: Option<Includes>,
    pub meta: Option<SearchMeta>,
}

impl SearchPage {
    /// Token for the next page, when the server has more results.
    pub fn next_token(&self) -> Option<&str> {
        self.meta.as_ref().and_then(|m| m.next_token.as_deref())
    }
}

/// Body of `POST /2/tweets`.
#[derive(Debug, Serialize)]
pub struct CreateTweetRequest<'a> {
    pub text: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct CreateTweetResponse {
    pub data: CreatedTweet,
}

#[derive(Debug, Deserialize)]
pub struct CreatedTweet {
    pub id: String,
}

/// The v2 API serializes ids as strings, but cached copies and test
/// fixtures sometimes carry bare numbers. Accept both.
fn id_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(other) => Some(other.to_string()),
    })
}
