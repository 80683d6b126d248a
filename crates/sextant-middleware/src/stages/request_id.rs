//! Request ID propagation.
//!
//! Every request already carries a fresh UUID v7 [`RequestId`]. This
//! middleware optionally adopts an ID sent by a trusted upstream in the
//! `x-request-id` header, and echoes the final ID on the response so clients
//! can correlate their requests with server logs.

use http::header::{HeaderName, HeaderValue};
use sextant_core::{Error, Request, RequestId, Response};
use uuid::Uuid;

use crate::middleware::{Flow, Middleware};

/// The header name for request ID propagation.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Middleware that propagates request IDs.
///
/// # Example
///
/// ```
/// use sextant_middleware::{MiddlewareChain, RequestIdMiddleware};
///
/// let mut chain = MiddlewareChain::new();
/// chain.push(RequestIdMiddleware::trust_incoming());
/// ```
#[derive(Debug, Clone, Default)]
pub struct RequestIdMiddleware {
    /// Whether to adopt incoming request ID headers.
    trust_incoming: bool,
}

impl RequestIdMiddleware {
    /// Creates a middleware that ignores incoming IDs.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a middleware that adopts valid incoming `x-request-id` values.
    #[must_use]
    pub fn trust_incoming() -> Self {
        Self {
            trust_incoming: true,
        }
    }

    fn incoming(&self, request: &Request) -> Option<RequestId> {
        if !self.trust_incoming {
            return None;
        }
        request
            .header(REQUEST_ID_HEADER)
            .and_then(|s| Uuid::parse_str(s.trim()).ok())
            .map(RequestId::from_uuid)
    }
}

impl Middleware for RequestIdMiddleware {
    fn name(&self) -> &'static str {
        "request_id"
    }

    fn before_route(&self, request: &mut Request) -> Result<Flow, Error> {
        if let Some(id) = self.incoming(request) {
            request.context_mut().set_request_id(id);
        }
        Ok(Flow::Continue)
    }

    fn after_handler(&self, request: &Request, response: &mut Response) -> Result<(), Error> {
        // A hyphenated UUID is always a valid header value.
        if let Ok(value) = HeaderValue::from_str(&request.request_id().to_string()) {
            response
                .headers_mut()
                .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;
    use sextant_core::RawRequest;

    fn request_with_id(id: &'static str) -> Request {
        Request::from(
            RawRequest::new(Method::GET, "/test")
                .with_header(HeaderName::from_static(REQUEST_ID_HEADER), HeaderValue::from_static(id)),
        )
    }

    fn run(middleware: &RequestIdMiddleware, mut request: Request) -> (Request, Response) {
        middleware.before_route(&mut request).unwrap();
        let mut response = Response::text("OK");
        middleware.after_handler(&request, &mut response).unwrap();
        (request, response)
    }

    #[test]
    fn test_echoes_generated_id() {
        let (request, response) = run(
            &RequestIdMiddleware::new(),
            Request::from(RawRequest::new(Method::GET, "/test")),
        );
        assert_eq!(
            response.header(REQUEST_ID_HEADER),
            Some(request.request_id().to_string().as_str())
        );
    }

    #[test]
    fn test_ignores_incoming_id_when_not_trusted() {
        let incoming = "01234567-89ab-7def-8123-456789abcdef";
        let (_, response) = run(&RequestIdMiddleware::new(), request_with_id(incoming));
        assert_ne!(response.header(REQUEST_ID_HEADER), Some(incoming));
    }

    #[test]
    fn test_uses_incoming_id_when_trusted() {
        let incoming = "01234567-89ab-7def-8123-456789abcdef";
        let (request, response) = run(&RequestIdMiddleware::trust_incoming(), request_with_id(incoming));
        assert_eq!(response.header(REQUEST_ID_HEADER), Some(incoming));
        assert_eq!(request.request_id().to_string(), incoming);
    }

    #[test]
    fn test_ignores_invalid_incoming_id() {
        let (_, response) = run(
            &RequestIdMiddleware::trust_incoming(),
            request_with_id("not-a-valid-uuid"),
        );
        let header = response.header(REQUEST_ID_HEADER).unwrap();
        assert!(Uuid::parse_str(header).is_ok());
    }
}
