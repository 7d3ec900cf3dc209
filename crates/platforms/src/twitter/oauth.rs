//! OAuth 1.0a request signing (HMAC-SHA1).
//!
//! Only requests without query or form parameters are signed here; the v2
//! endpoints this crate calls take JSON bodies, which are not part of the
//! signature base string.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use hmac::{Hmac, Mac};
use sha1::Sha1;

use reactor::ServiceError;

type HmacSha1 = Hmac<Sha1>;

/// User-context signing material.
#[derive(Debug, Clone)]
pub struct OAuth1Credentials {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub access_token: String,
    pub access_token_secret: String,
}

/// RFC 3986 percent-encoding over the unreserved set.
fn encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Random request nonce.
pub fn nonce() -> String {
    format!("{:08x}{:08x}", rand::random::<u32>(), rand::random::<u32>())
}

/// Build the `Authorization` header for one request.
pub fn authorization_header(
    method: &str,
    url: &str,
    credentials: &OAuth1Credentials,
    nonce: &str,
    timestamp: i64,
) -> Result<String, ServiceError> {
    let timestamp = timestamp.to_string();
    let mut params: Vec<(&str, &str)> = vec![
        ("oauth_consumer_key", &credentials.consumer_key),
        ("oauth_nonce", nonce),
        ("oauth_signature_method", "HMAC-SHA1"),
        ("oauth_timestamp", &timestamp),
        ("oauth_token", &credentials.access_token),
        ("oauth_version", "1.0"),
    ];
    params.sort();

    let param_string = params
        .iter()
        .map(|(k, v)| format!("{}={}", encode(k), encode(v)))
        .collect::<Vec<_>>()
        .join("&");
    let base = format!(
        "{}&{}&{}",
        method.to_uppercase(),
        encode(url),
        encode(&param_string)
    );
    let signing_key = format!(
        "{}&{}",
        encode(&credentials.consumer_secret),
        encode(&credentials.access_token_secret)
    );

    let mut mac = HmacSha1::new_from_slice(signing_key.as_bytes())
        .map_err(|e| ServiceError::other(format!("signing key rejected: {e}")))?;
    mac.update(base.as_bytes());
    let signature = BASE64.encode(mac.finalize().into_bytes());

    let mut header_params: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (k.to_string(), encode(v)))
        .collect();
    header_params.push(("oauth_signature".to_string(), encode(&signature)));
    header_params.sort();

    let fields = header_params
        .iter()
        .map(|(k, v)| format!("{k}=\"{v}\""))
        .collect::<Vec<_>>()
        .join(", ");
    Ok(format!("OAuth {fields}"))
}
