//! OAuth 1.0a request signing for user-context write endpoints.
//!
//! The v2 read endpoints take a plain bearer token, but `POST /2/tweets`
//! requires an HMAC-SHA1 signed `Authorization: OAuth ...` header built
//! from the consumer and access secrets.

use anyhow::{anyhow, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::Utc;
use hmac::{Hmac, Mac};
use rand::Rng;
use sha1::Sha1;

use crate::config::credentials::Credentials;

type HmacSha1 = Hmac<Sha1>;

/// Build the `Authorization` header value for a request.
///
/// Callers pass the URL without a query string. JSON-bodied requests
/// contribute no parameters to the signature, so only the oauth_*
/// parameters are signed.
pub fn authorization_header(method: &str, url: &str, credentials: &Credentials) -> Result<String> {
    let missing = || anyhow!("write access requires API key/secret and access token/secret");
    let api_key = credentials.api_key().ok_or_else(missing)?;
    let api_secret = credentials.api_secret().ok_or_else(missing)?;
    let access_token = credentials.access_token().ok_or_else(missing)?;
    let access_secret = credentials.access_secret().ok_or_else(missing)?;

    header_with(
        method,
        url,
        api_key,
        api_secret,
        access_token,
        access_secret,
        &nonce(),
        &Utc::now().timestamp().to_string(),
    )
}

#[allow(clippy::too_many_arguments)]
fn header_with(
    method: &str,
    url: &str,
    api_key: &str,
    api_secret: &str,
    access_token: &str,
    access_secret: &str,
    nonce: &str,
    timestamp: &str,
) -> Result<String> {
    let mut params = vec![
        ("oauth_consumer_key".to_string(), api_key.to_string()),
        ("oauth_nonce".to_string(), nonce.to_string()),
        ("oauth_signature_method".to_string(), "HMAC-SHA1".to_string()),
        ("oauth_timestamp".to_string(), timestamp.to_string()),
        ("oauth_token".to_string(), access_token.to_string()),
        ("oauth_version".to_string(), "1.0".to_string()),
    ];

    let base = signature_base_string(method, url, &params);
    let signing_key = format!("{}&{}", percent_encode(api_secret), percent_encode(access_secret));
    let signature = hmac_sha1_base64(signing_key.as_bytes(), base.as_bytes())?;
    params.push(("oauth_signature".to_string(), signature));
    params.sort();

    let fields: Vec<String> = params
        .iter()
        .map(|(key, value)| format!(r#"{}="{}""#, percent_encode(key), percent_encode(value)))
        .collect();
    Ok(format!("OAuth {}", fields.join(", ")))
}

/// Signature base string per RFC 5849 section 3.4.1: uppercase method,
/// encoded URL, and the encoded-then-sorted parameter string.
fn signature_base_string(method: &str, url: &str, params: &[(String, String)]) -> String {
    let mut encoded: Vec<(String, String)> = params
        .iter()
        .map(|(key, value)| (percent_encode(key), percent_encode(value)))
        .collect();
    encoded.sort();

    let param_string = encoded
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join("&");

    format!(
        "{}&{}&{}",
        method.to_uppercase(),
        percent_encode(url),
        percent_encode(&param_string)
    )
}

fn hmac_sha1_base64(key: &[u8], message: &[u8]) -> Result<String> {
    let mut mac =
        HmacSha1::new_from_slice(key).map_err(|_| anyhow!("invalid HMAC key length"))?;
    mac.update(message);
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

/// RFC 3986 strict encoding: everything but unreserved characters.
fn percent_encode(input: &str) -> String {
    urlencoding::encode(input).into_owned()
}

fn nonce() -> String {
    let bytes: [u8; 16] = rand::rng().random();
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
