//! Early body size check.

use sextant_core::{Error, HttpError, Request};

use crate::middleware::{Flow, Middleware};

/// Fails with `413 BODY_TOO_LARGE` when a readable request declares a
/// `content-length` above the request's limit.
///
/// Requests without a declared length are checked by the body reader as
/// bytes arrive.
#[derive(Debug, Clone, Copy, Default)]
pub struct BodyLimit;

impl Middleware for BodyLimit {
    fn name(&self) -> &'static str {
        "body_limit"
    }

    fn before_handler(&self, request: &mut Request) -> Result<Flow, Error> {
        if !request.has_readable_body() {
            return Ok(Flow::Continue);
        }
        match request.content_length() {
            Some(len) if len > request.max_body_size() => {
                tracing::debug!(
                    content_length = len,
                    limit = request.max_body_size(),
                    "rejecting oversized body"
                );
                Err(HttpError::body_too_large().into())
            }
            _ => Ok(Flow::Continue),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header::{HeaderValue, CONTENT_LENGTH};
    use http::Method;
    use sextant_core::RawRequest;

    fn declared(method: Method, len: &'static str) -> Request {
        let raw = RawRequest::new(method, "/upload")
            .with_header(CONTENT_LENGTH, HeaderValue::from_static(len));
        Request::new(raw, 100)
    }

    #[test]
    fn test_rejects_declared_oversize() {
        let err = BodyLimit
            .before_handler(&mut declared(Method::POST, "101"))
            .unwrap_err();
        assert_eq!(err.as_http().map(HttpError::code), Some("BODY_TOO_LARGE"));
    }

    #[test]
    fn test_allows_at_limit() {
        let flow = BodyLimit
            .before_handler(&mut declared(Method::PUT, "100"))
            .unwrap();
        assert!(flow.is_continue());
    }

    #[test]
    fn test_ignores_methods_without_body() {
        let flow = BodyLimit
            .before_handler(&mut declared(Method::GET, "5000"))
            .unwrap();
        assert!(flow.is_continue());
    }
}
