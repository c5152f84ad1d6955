//! Session Layer
//!
//! Attaches an opaque per-browser session ID to every request. The ID is the
//! only user identity in the app; the token lifecycle never sees the cookie
//! machinery, just the [`SessionId`].

use axum::{
    extract::Request,
    http::{
        header::{COOKIE, SET_COOKIE},
        HeaderMap,
    },
    middleware::Next,
    response::Response,
};
use base64::{engine::general_purpose, Engine as _};
use rand::RngCore;

/// Cookie carrying the session ID.
pub const SESSION_COOKIE: &str = "quickstart_session";

/// Opaque session identifier, available to handlers as an extension.
#[derive(Clone, Debug)]
pub struct SessionId(String);

impl SessionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Middleware: reuse the session cookie or mint a new one.
pub async fn attach_session(mut request: Request, next: Next) -> Response {
    let existing = session_from_headers(request.headers());
    let is_new = existing.is_none();
    let id = existing.unwrap_or_else(generate_session_id);

    request.extensions_mut().insert(SessionId(id.clone()));
    let mut response = next.run(request).await;

    if is_new {
        let cookie = format!("{}={}; Path=/; HttpOnly", SESSION_COOKIE, id);
        if let Ok(value) = cookie.parse() {
            response.headers_mut().append(SET_COOKIE, value);
        }
    }
    response
}

fn generate_session_id() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

fn session_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_session_parsed_from_cookie_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("other=1; quickstart_session=abc123; theme=dark"),
        );
        assert_eq!(session_from_headers(&headers).as_deref(), Some("abc123"));
    }

    #[test]
    fn test_missing_cookie_yields_none() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("other=1"));
        assert_eq!(session_from_headers(&headers), None);
        assert_eq!(session_from_headers(&HeaderMap::new()), None);
    }

    #[test]
    fn test_generated_ids_are_unique_and_cookie_safe() {
        let a = generate_session_id();
        let b = generate_session_id();
        assert_ne!(a, b);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }
}
