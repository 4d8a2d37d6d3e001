use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

use tweetgrab::api::client::{SearchParams, TwitterClient};
use tweetgrab::api::models::{SearchPage, TWEET_FIELDS};
use tweetgrab::config::credentials::Credentials;
use tweetgrab::data::row::flatten_tweets;

/// Matches requests that carry no `name` query parameter at all.
struct NoQueryParam(&'static str);

impl Match for NoQueryParam {
    fn matches(&self, request: &Request) -> bool {
        !request.url.query_pairs().any(|(key, _)| key == self.0)
    }
}

/// Matches a signed OAuth 1.0a authorization header.
struct OauthHeader;

impl Match for OauthHeader {
    fn matches(&self, request: &Request) -> bool {
        request
            .headers
            .get("authorization")
            .and_then(|value| value.to_str().ok())
            .map(|value| value.starts_with("OAuth "))
            .unwrap_or(false)
    }
}

fn read_only_client(uri: String) -> TwitterClient {
    TwitterClient::read_only(Credentials::bearer_only("test-token")).with_base_url(uri)
}

fn page_json(ids: &[&str], next_token: Option<&str>) -> serde_json::Value {
    let data: Vec<serde_json::Value> = ids
        .iter()
        .map(|id| {
            json!({
                "id": *id,
                "text": format!("tweet {}", id),
                "author_id": "42",
                "created_at": "2024-05-02T10:30:00.000Z",
                "lang": "en",
                "conversation_id": *id,
                "public_metrics": {
                    "like_count": 1,
                    "retweet_count": 0,
                    "reply_count": 0,
                    "quote_count": 0
                }
            })
        })
        .collect();

    let mut meta = json!({"result_count": ids.len()});
    if let Some(token) = next_token {
        meta["next_token"] = json!(token);
    }

    json!({
        "data": data,
        "includes": {"users": [{"id": "42", "name": "Someone", "username": "someone"}]},
        "meta": meta
    })
}

async fn collect_pages(
    uri: String,
    params: SearchParams,
) -> anyhow::Result<Vec<SearchPage>> {
    tokio::task::spawn_blocking(move || {
        read_only_client(uri).search(params).collect::<anyhow::Result<Vec<_>>>()
    })
    .await
    .expect("blocking task panicked")
}

#[tokio::test]
async fn test_search_sends_bearer_and_normalized_params() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/2/tweets/search/recent"))
        .and(query_param("query", "rust lang:en"))
        .and(query_param("max_results", "10"))
        .and(query_param("tweet.fields", TWEET_FIELDS))
        .and(query_param("expansions", "author_id"))
        .and(wiremock::matchers::bearer_token("test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(&["1"], None)))
        .expect(1)
        .mount(&server)
        .await;

    // max_results below the endpoint minimum gets clamped up to 10
    let params = SearchParams::new("rust lang:en")
        .with_max_results(3)
        .with_page_limit(1);
    let pages = collect_pages(server.uri(), params)
        .await
        .expect("search should succeed");

    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].data.len(), 1);
}

#[tokio::test]
async fn test_search_passes_time_window() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/2/tweets/search/recent"))
        .and(query_param("start_time", "2024-05-01T00:00:00Z"))
        .and(query_param("end_time", "2024-05-02T00:00:00Z"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(&["1"], None)))
        .expect(1)
        .mount(&server)
        .await;

    let params = SearchParams::new("rust")
        .with_time_window(
            Some("2024-05-01T00:00:00Z".to_string()),
            Some("2024-05-02T00:00:00Z".to_string()),
        )
        .with_page_limit(1);
    collect_pages(server.uri(), params)
        .await
        .expect("search should succeed");
}

#[tokio::test]
async fn test_pagination_follows_next_token_until_exhausted() {
    let server = MockServer::start().await;
    // First request carries no token and advertises one more page
    Mock::given(method("GET"))
        .and(path("/2/tweets/search/recent"))
        .and(NoQueryParam("next_token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(page_json(&["1", "2"], Some("t2"))),
        )
        .expect(1)
        .mount(&server)
        .await;
    // Follow-up with the token returns the final page
    Mock::given(method("GET"))
        .and(path("/2/tweets/search/recent"))
        .and(query_param("next_token", "t2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(&["3"], None)))
        .expect(1)
        .mount(&server)
        .await;

    let params = SearchParams::new("rust").with_page_limit(10);
    let pages = collect_pages(server.uri(), params)
        .await
        .expect("search should succeed");

    assert_eq!(pages.len(), 2);
    let rows: Vec<_> = pages
        .iter()
        .flat_map(|page| flatten_tweets(&page.data, page.includes.as_ref()))
        .collect();
    let ids: Vec<&str> = rows.iter().map(|row| row.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2", "3"]);
}

#[tokio::test]
async fn test_page_cap_stops_even_when_more_pages_exist() {
    let server = MockServer::start().await;
    // Every response advertises another page; only the cap stops us
    Mock::given(method("GET"))
        .and(path("/2/tweets/search/recent"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(page_json(&["1"], Some("again"))),
        )
        .expect(2)
        .mount(&server)
        .await;

    let params = SearchParams::new("rust").with_page_limit(2);
    let pages = collect_pages(server.uri(), params)
        .await
        .expect("search should succeed");

    assert_eq!(pages.len(), 2);
}

#[tokio::test]
async fn test_page_cap_zero_means_uncapped() {
    let server = MockServer::start().await;
    // Three pages chained by token; only exhaustion stops the iteration
    Mock::given(method("GET"))
        .and(path("/2/tweets/search/recent"))
        .and(NoQueryParam("next_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(&["1"], Some("t2"))))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/2/tweets/search/recent"))
        .and(query_param("next_token", "t2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(&["2"], Some("t3"))))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/2/tweets/search/recent"))
        .and(query_param("next_token", "t3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(&["3"], None)))
        .expect(1)
        .mount(&server)
        .await;

    let params = SearchParams::new("rust").with_page_limit(0);
    let pages = collect_pages(server.uri(), params)
        .await
        .expect("search should succeed");

    assert_eq!(pages.len(), 3);
    let rows: Vec<_> = pages
        .iter()
        .flat_map(|page| flatten_tweets(&page.data, page.includes.as_ref()))
        .collect();
    let ids: Vec<&str> = rows.iter().map(|row| row.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2", "3"]);
}

#[tokio::test]
async fn test_zero_results_is_an_empty_page_not_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/2/tweets/search/recent"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"meta": {"result_count": 0}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let params = SearchParams::new("rust").with_page_limit(5);
    let pages = collect_pages(server.uri(), params)
        .await
        .expect("search should succeed");

    assert_eq!(pages.len(), 1);
    assert!(pages[0].data.is_empty());
    assert!(flatten_tweets(&pages[0].data, pages[0].includes.as_ref()).is_empty());
}

#[tokio::test]
async fn test_api_error_carries_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/2/tweets/search/recent"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let params = SearchParams::new("rust").with_page_limit(3);
    let err = collect_pages(server.uri(), params)
        .await
        .expect_err("search should fail");

    let message = err.to_string();
    assert!(message.contains("500"), "message was: {}", message);
    assert!(message.contains("boom"), "message was: {}", message);
}

#[tokio::test]
async fn test_iteration_ends_after_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/2/tweets/search/recent"))
        .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    let (first_is_err, second_is_none) = tokio::task::spawn_blocking(move || {
        let client = read_only_client(uri);
        let mut pages = client.search(SearchParams::new("rust").with_page_limit(5));
        let first = pages.next();
        let second = pages.next();
        (
            matches!(first, Some(Err(_))),
            second.is_none(),
        )
    })
    .await
    .expect("blocking task panicked");

    assert!(first_is_err);
    assert!(second_is_none);
}

#[tokio::test]
async fn test_post_tweet_refused_without_write_client() {
    let server = MockServer::start().await;
    // No request must reach the server
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let uri = server.uri();
    let err = tokio::task::spawn_blocking(move || read_only_client(uri).post_tweet("hi"))
        .await
        .expect("blocking task panicked")
        .expect_err("post should be refused");

    assert!(err.to_string().contains("write permissions"));
}

#[tokio::test]
async fn test_post_tweet_sends_signed_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/2/tweets"))
        .and(OauthHeader)
        .and(body_json(json!({"text": "hello from the crate"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "data": {"id": "99", "text": "hello from the crate"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    let id = tokio::task::spawn_blocking(move || {
        let creds = Credentials::with_user_context("b", "ck", "cs", "at", "as");
        let client = TwitterClient::read_write(creds)?.with_base_url(uri);
        client.post_tweet("hello from the crate")
    })
    .await
    .expect("blocking task panicked")
    .expect("post should succeed");

    assert_eq!(id, "99");
}
