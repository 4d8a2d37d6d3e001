use crate::api::models::{Includes, Tweet};

/// Flattened tweet record with the fixed export schema.
///
/// `id` and `text` default to the empty string when the source tweet
/// lacks them; every other field is nullable. Field declaration order
/// is the CSV column order.
#[derive(Debug, Clone, PartialEq)]
pub struct TweetRow {
    pub id: String,
    pub created_at: Option<String>,
    pub text: String,
    pub author_id: Option<String>,
    pub like_count: Option<i64>,
    pub retweet_count: Option<i64>,
    pub reply_count: Option<i64>,
    pub quote_count: Option<i64>,
    pub lang: Option<String>,
    pub conversation_id: Option<String>,
}

/// Convert raw tweets to flat rows, preserving input order.
///
/// `includes` is accepted for parity with the page payload; the current
/// schema does not pull anything out of it.
pub fn flatten_tweets(tweets: &[Tweet], _includes: Option<&Includes>) -> Vec<TweetRow> {
    tweets.iter().map(flatten_tweet).collect()
}

fn flatten_tweet(tweet: &Tweet) -> TweetRow {
    let metrics = tweet.public_metrics.clone().unwrap_or_default();
    TweetRow {
        id: tweet.id.clone().unwrap_or_default(),
        created_at: tweet.created_at.clone(),
        text: tweet.text.clone().unwrap_or_default(),
        author_id: non_empty(tweet.author_id.as_deref()),
        like_count: metrics.like_count,
        retweet_count: metrics.retweet_count,
        reply_count: metrics.reply_count,
        quote_count: metrics.quote_count,
        lang: tweet.lang.clone(),
        conversation_id: non_empty(tweet.conversation_id.as_deref()),
    }
}

/// Reference fields treat the empty string as absent.
fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}
