//! Per-request correlation id.

use std::fmt;

use axum::http::{HeaderValue, Request};
use uuid::Uuid;

/// Header carrying the request id in both directions.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Opaque id attached to every request as an extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(String);

impl RequestId {
    /// Generates a fresh random id.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the id attached to `request`, attaching one first if needed.
    ///
    /// An id already stored in the extensions wins, then a non-empty
    /// `x-request-id` header, then a generated one.
    pub fn ensure<B>(request: &mut Request<B>) -> RequestId {
        if let Some(existing) = request.extensions().get::<RequestId>() {
            return existing.clone();
        }

        let id = request
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(|v| RequestId(v.to_string()))
            .unwrap_or_default();

        request.extensions_mut().insert(id.clone());
        id
    }

    /// Header form of the id, if it is a valid header value.
    pub fn header_value(&self) -> Option<HeaderValue> {
        HeaderValue::from_str(&self.0).ok()
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> Request<()> {
        Request::builder().uri("/").body(()).unwrap()
    }

    #[test]
    fn test_generated_ids_are_unique() {
        assert_ne!(RequestId::new(), RequestId::new());
    }

    #[test]
    fn test_ensure_is_idempotent() {
        let mut req = request();

        let first = RequestId::ensure(&mut req);
        let second = RequestId::ensure(&mut req);

        assert_eq!(first, second);
        assert!(Uuid::parse_str(first.as_str()).is_ok());
    }

    #[test]
    fn test_ensure_keeps_existing_extension() {
        let mut req = request();
        req.extensions_mut().insert(RequestId("upstream".into()));

        assert_eq!(RequestId::ensure(&mut req).as_str(), "upstream");
    }

    #[test]
    fn test_ensure_adopts_incoming_header() {
        let mut req = Request::builder()
            .uri("/")
            .header(REQUEST_ID_HEADER, "abc-123")
            .body(())
            .unwrap();

        let id = RequestId::ensure(&mut req);

        assert_eq!(id.to_string(), "abc-123");
        assert_eq!(req.extensions().get::<RequestId>(), Some(&id));
    }

    #[test]
    fn test_ensure_ignores_blank_header() {
        let mut req = Request::builder()
            .uri("/")
            .header(REQUEST_ID_HEADER, "  ")
            .body(())
            .unwrap();

        let id = RequestId::ensure(&mut req);

        assert!(Uuid::parse_str(id.as_str()).is_ok());
    }
}
