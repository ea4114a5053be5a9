//! HTTP Basic credential decoding
//!
//! Every step returns `None` on malformed input. A bad header is an
//! ordinary negative outcome, not an error.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Scheme prefix of a Basic `Authorization` header
pub const BASIC_PREFIX: &str = "Basic ";

/// Token part of a `Basic <token>` header
pub fn extract_basic_token(header: Option<&str>) -> Option<&str> {
    header?.strip_prefix(BASIC_PREFIX)
}

/// Decode a base64 token into UTF-8 text
pub fn decode_base64(token: Option<&str>) -> Option<String> {
    let bytes = STANDARD.decode(token?).ok()?;
    String::from_utf8(bytes).ok()
}

/// Split `user:password` on the first `:`
///
/// The password may itself contain `:`.
pub fn split_credentials(decoded: Option<&str>) -> Option<(&str, &str)> {
    decoded?.split_once(':')
}

/// Build a Basic `Authorization` header value
pub fn basic_header(user: &str, password: &str) -> String {
    format!("{}{}", BASIC_PREFIX, STANDARD.encode(format!("{}:{}", user, password)))
}

/// Value of the cookie `name` in a `Cookie` header
pub fn cookie_value<'a>(header: Option<&'a str>, name: &str) -> Option<&'a str> {
    header?
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}
