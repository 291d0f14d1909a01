//! Alibaba Cloud RPC request signing (signature version 1.0, HMAC-SHA1).

use base64::Engine as _;
use base64::engine::general_purpose;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha1::Sha1;
use std::collections::BTreeMap;

type HmacSha1 = Hmac<Sha1>;

pub const SIGNATURE_METHOD: &str = "HMAC-SHA1";
pub const SIGNATURE_VERSION: &str = "1.0";

/// RFC 3986 encoding: everything except `A-Z a-z 0-9 - _ . ~` is escaped.
pub fn percent_encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Timestamp in the ISO 8601 form the API expects.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Sorted, encoded `k=v&k=v` query.
pub fn canonical_query(params: &BTreeMap<String, String>) -> String {
    params
        .iter()
        .map(|(key, value)| format!("{}={}", percent_encode(key), percent_encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}

pub fn string_to_sign(method: &str, canonical: &str) -> String {
    format!(
        "{}&{}&{}",
        method,
        percent_encode("/"),
        percent_encode(canonical)
    )
}

/// `base64(HMAC-SHA1(secret + "&", string_to_sign))`
pub fn sign(secret: &str, string_to_sign: &str) -> String {
    let key = format!("{secret}&");
    // HMAC accepts keys of any length.
    let mut mac = HmacSha1::new_from_slice(key.as_bytes()).expect("HMAC can take key of any size");
    mac.update(string_to_sign.as_bytes());
    general_purpose::STANDARD.encode(mac.finalize().into_bytes())
}

/// Sign a GET request carrying `params` (action-specific and common ones).
///
/// Returns the query string with `Signature` appended.
pub fn sign_get(secret: &str, params: &BTreeMap<String, String>) -> String {
    let canonical = canonical_query(params);
    let signature = sign(secret, &string_to_sign("GET", &canonical));
    format!("{}&Signature={}", canonical, percent_encode(&signature))
}
