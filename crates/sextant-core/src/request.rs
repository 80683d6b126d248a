//! Inbound requests.
//!
//! A host builds a [`RawRequest`] from whatever transport it speaks and hands
//! it to the dispatcher, which wraps it in a [`Request`]. The request body is
//! read lazily, at most once, and never beyond the configured limit.

use std::fmt;
use std::io::{self, Read};

use bytes::{Bytes, BytesMut};
use http::header::{HeaderName, HeaderValue, CONTENT_LENGTH, CONTENT_TYPE, HOST};
use http::{Extensions, HeaderMap, Method};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use sextant_router::{ParamValue, Params};

use crate::context::{RequestContext, RequestId};
use crate::error::{Error, HttpError};
use crate::settings::DEFAULT_MAX_BODY_SIZE;

/// Size of each read from the body stream.
const READ_CHUNK: usize = 64 * 1024;

/// The transport-level view of a request.
///
/// # Example
///
/// ```
/// use sextant_core::RawRequest;
/// use http::Method;
///
/// let raw = RawRequest::new(Method::GET, "/search/rust%20lang?page=2");
/// assert_eq!(raw.path, "/search/rust lang");
/// assert_eq!(raw.query, "page=2");
/// ```
pub struct RawRequest {
    /// Request method.
    pub method: Method,
    /// Percent-decoded path.
    pub path: String,
    /// Raw query string, without the `?`.
    pub query: String,
    /// Request headers.
    pub headers: HeaderMap,
    /// Body stream.
    pub body: Box<dyn Read + Send>,
}

impl RawRequest {
    /// Creates a request from a method and a request target such as
    /// `/path?query`.
    ///
    /// The path is percent-decoded. A path that does not decode to UTF-8 is
    /// kept as written.
    #[must_use]
    pub fn new(method: Method, target: &str) -> Self {
        let (path, query) = target.split_once('?').unwrap_or((target, ""));
        let path = match urlencoding::decode(path) {
            Ok(decoded) => decoded.into_owned(),
            Err(_) => path.to_string(),
        };
        Self {
            method,
            path,
            query: query.to_string(),
            headers: HeaderMap::new(),
            body: Box::new(io::empty()),
        }
    }

    /// Adds a header.
    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Sets a streaming body of unknown length.
    #[must_use]
    pub fn with_body(mut self, body: impl Read + Send + 'static) -> Self {
        self.body = Box::new(body);
        self
    }

    /// Sets an in-memory body and its `content-length`.
    #[must_use]
    pub fn with_bytes(mut self, body: impl Into<Bytes>) -> Self {
        let body = body.into();
        self.headers
            .insert(CONTENT_LENGTH, HeaderValue::from(body.len() as u64));
        self.body = Box::new(io::Cursor::new(body));
        self
    }
}

impl fmt::Debug for RawRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawRequest")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("query", &self.query)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

enum BodyState {
    Pending(Box<dyn Read + Send>),
    Buffered(Bytes),
    Failed(Option<HttpError>),
}

/// A request as seen by middleware and views.
pub struct Request {
    method: Method,
    path: String,
    query: String,
    headers: HeaderMap,
    params: Params,
    context: RequestContext,
    extensions: Extensions,
    max_body_size: u64,
    body: BodyState,
}

impl Request {
    /// Wraps a raw request, reading at most `max_body_size` body bytes.
    #[must_use]
    pub fn new(raw: RawRequest, max_body_size: u64) -> Self {
        Self {
            method: raw.method,
            path: raw.path,
            query: raw.query,
            headers: raw.headers,
            params: Params::new(),
            context: RequestContext::new(),
            extensions: Extensions::new(),
            max_body_size,
            body: BodyState::Pending(raw.body),
        }
    }

    /// Request method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Decoded request path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Raw query string.
    #[must_use]
    pub fn query_string(&self) -> &str {
        &self.query
    }

    /// Request headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Mutable request headers.
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// A header value as text, if present and valid.
    #[must_use]
    pub fn header(&self, name: impl http::header::AsHeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// The media type of the body, without parameters.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.header(CONTENT_TYPE)
            .map(|ct| ct.split(';').next().unwrap_or(ct).trim())
    }

    /// The declared body length.
    #[must_use]
    pub fn content_length(&self) -> Option<u64> {
        self.header(CONTENT_LENGTH)
            .and_then(|v| v.trim().parse().ok())
    }

    /// The `host` header.
    #[must_use]
    pub fn host(&self) -> Option<&str> {
        self.header(HOST)
    }

    /// Typed path parameters.
    #[must_use]
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// One path parameter, `None` if absent.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&ParamValue> {
        self.params.get(name)
    }

    /// Replaces the path parameters. Called by the dispatcher after routing.
    pub fn set_params(&mut self, params: Params) {
        self.params = params;
    }

    /// Per-request bookkeeping.
    #[must_use]
    pub fn context(&self) -> &RequestContext {
        &self.context
    }

    /// Mutable per-request bookkeeping.
    pub fn context_mut(&mut self) -> &mut RequestContext {
        &mut self.context
    }

    /// Shortcut for `context().request_id()`.
    #[must_use]
    pub fn request_id(&self) -> RequestId {
        self.context.request_id()
    }

    /// Typed values attached by middleware.
    #[must_use]
    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    /// Mutable typed values attached by middleware.
    pub fn extensions_mut(&mut self) -> &mut Extensions {
        &mut self.extensions
    }

    /// The body size limit.
    #[must_use]
    pub fn max_body_size(&self) -> u64 {
        self.max_body_size
    }

    /// Returns true if this method carries a body that will be read.
    #[must_use]
    pub fn has_readable_body(&self) -> bool {
        matches!(self.method, Method::POST | Method::PUT | Method::PATCH)
    }

    /// The full body.
    ///
    /// The body is read on first access. Only `POST`, `PUT` and `PATCH`
    /// bodies are read; other methods see an empty body. Fails with
    /// `413 BODY_TOO_LARGE` when the declared length or the bytes actually
    /// received exceed the limit.
    pub fn body(&mut self) -> Result<&Bytes, Error> {
        if let BodyState::Pending(_) = self.body {
            let state = std::mem::replace(&mut self.body, BodyState::Failed(None));
            if let BodyState::Pending(reader) = state {
                match self.read_limited(reader) {
                    Ok(bytes) => self.body = BodyState::Buffered(bytes),
                    Err(err) => {
                        self.body = BodyState::Failed(err.as_http().cloned());
                        return Err(err);
                    }
                }
            }
        }

        match &self.body {
            BodyState::Buffered(bytes) => Ok(bytes),
            BodyState::Failed(Some(err)) => Err(err.clone().into()),
            BodyState::Failed(None) | BodyState::Pending(_) => {
                Err(Error::fault("request body could not be read"))
            }
        }
    }

    fn read_limited(&self, mut reader: Box<dyn Read + Send>) -> Result<Bytes, Error> {
        if !self.has_readable_body() {
            return Ok(Bytes::new());
        }

        let limit = self.max_body_size;
        let declared = self.content_length();
        if let Some(len) = declared.filter(|&len| len > limit) {
            tracing::debug!(declared = len, limit, "declared body length over limit");
            return Err(HttpError::body_too_large().into());
        }

        let mut buf = BytesMut::new();
        let mut chunk = vec![0_u8; READ_CHUNK];
        loop {
            let want = match declared {
                Some(len) => {
                    let remaining = len.saturating_sub(buf.len() as u64);
                    usize::try_from(remaining).map_or(READ_CHUNK, |r| r.min(READ_CHUNK))
                }
                None => READ_CHUNK,
            };
            if want == 0 {
                break;
            }

            let n = match reader.read(&mut chunk[..want]) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            buf.extend_from_slice(&chunk[..n]);
            if buf.len() as u64 > limit {
                tracing::debug!(limit, "body stream crossed limit");
                return Err(HttpError::body_too_large().into());
            }
        }

        Ok(buf.freeze())
    }

    /// The body parsed as JSON.
    ///
    /// Returns `None` when the content type is not `application/json` or
    /// `application/json-rpc`, or when the body is empty. A body that does
    /// not parse fails with `400 MALFORMED_BODY`.
    pub fn json<T: DeserializeOwned>(&mut self) -> Result<Option<T>, Error> {
        let is_json = self.content_type().is_some_and(|ct| {
            ct.eq_ignore_ascii_case("application/json")
                || ct.eq_ignore_ascii_case("application/json-rpc")
        });
        if !is_json {
            return Ok(None);
        }

        let body = self.body()?;
        if body.is_empty() {
            return Ok(None);
        }
        serde_json::from_slice(body)
            .map(Some)
            .map_err(|_| HttpError::malformed_body().into())
    }

    /// The body parsed as a URL-encoded form.
    ///
    /// Repeated keys keep the last value. Multipart bodies are not parsed
    /// and yield `None`, as does an empty body.
    pub fn form(&mut self) -> Result<Option<IndexMap<String, String>>, Error> {
        if self
            .content_type()
            .is_some_and(|ct| ct.to_ascii_lowercase().starts_with("multipart/"))
        {
            return Ok(None);
        }

        let body = self.body()?;
        if body.is_empty() {
            return Ok(None);
        }
        let text = std::str::from_utf8(body).map_err(|_| HttpError::malformed_body())?;
        let pairs = parse_urlencoded(text).ok_or_else(HttpError::malformed_body)?;

        let form: IndexMap<String, String> = pairs.into_iter().collect();
        Ok((!form.is_empty()).then_some(form))
    }

    /// The query string parsed into key to values.
    ///
    /// Components that fail to decode are skipped.
    #[must_use]
    pub fn query(&self) -> IndexMap<String, Vec<String>> {
        let mut out: IndexMap<String, Vec<String>> = IndexMap::new();
        for pair in self.query.split('&').filter(|p| !p.is_empty()) {
            if let Some((key, value)) = decode_pair(pair) {
                out.entry(key).or_default().push(value);
            }
        }
        out
    }

    /// The first value of a query parameter.
    #[must_use]
    pub fn query_param(&self, name: &str) -> Option<String> {
        self.query.split('&').find_map(|pair| {
            decode_pair(pair).and_then(|(k, v)| (k == name).then_some(v))
        })
    }
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("query", &self.query)
            .field("params", &self.params)
            .field("request_id", &self.context.request_id())
            .finish_non_exhaustive()
    }
}

impl From<RawRequest> for Request {
    fn from(raw: RawRequest) -> Self {
        Self::new(raw, DEFAULT_MAX_BODY_SIZE)
    }
}

/// Parses `a=1&b=two+words` into ordered pairs.
///
/// Returns `None` if any component is not valid percent-encoded UTF-8.
pub fn parse_urlencoded(input: &str) -> Option<Vec<(String, String)>> {
    input
        .split('&')
        .filter(|p| !p.is_empty())
        .map(decode_pair)
        .collect()
}

fn decode_pair(pair: &str) -> Option<(String, String)> {
    let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
    Some((decode_component(key)?, decode_component(value)?))
}

fn decode_component(raw: &str) -> Option<String> {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced).ok().map(|s| s.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Endless;

    impl Read for Endless {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            buf.fill(b'x');
            Ok(buf.len())
        }
    }

    fn post(body: &'static str) -> RawRequest {
        RawRequest::new(Method::POST, "/submit").with_bytes(body)
    }

    #[test]
    fn test_raw_request_splits_target() {
        let raw = RawRequest::new(Method::GET, "/a/b?x=1&y=2");
        assert_eq!(raw.path, "/a/b");
        assert_eq!(raw.query, "x=1&y=2");

        let raw = RawRequest::new(Method::GET, "/plain");
        assert_eq!(raw.query, "");
    }

    #[test]
    fn test_body_read_once() {
        let mut req = Request::new(post("hello"), 1024);
        assert_eq!(req.body().unwrap().as_ref(), b"hello");
        assert_eq!(req.body().unwrap().as_ref(), b"hello");
    }

    #[test]
    fn test_get_body_is_empty() {
        let raw = RawRequest::new(Method::GET, "/").with_bytes("ignored");
        let mut req = Request::new(raw, 1024);
        assert!(req.body().unwrap().is_empty());
    }

    #[test]
    fn test_declared_length_over_limit_fails_fast() {
        let raw = RawRequest::new(Method::POST, "/")
            .with_header(CONTENT_LENGTH, HeaderValue::from_static("2048"))
            .with_body(Endless);
        let mut req = Request::new(raw, 1024);

        let err = req.body().unwrap_err();
        assert_eq!(err.as_http().map(HttpError::code), Some("BODY_TOO_LARGE"));

        // The failure is sticky.
        let err = req.body().unwrap_err();
        assert_eq!(err.as_http().map(HttpError::code), Some("BODY_TOO_LARGE"));
    }

    #[test]
    fn test_undeclared_stream_stops_at_limit() {
        let raw = RawRequest::new(Method::PUT, "/").with_body(Endless);
        let mut req = Request::new(raw, 100_000);

        let err = req.body().unwrap_err();
        assert_eq!(err.status().as_u16(), 413);
    }

    #[test]
    fn test_body_exactly_at_limit() {
        let mut req = Request::new(post("12345"), 5);
        assert_eq!(req.body().unwrap().len(), 5);
    }

    #[test]
    fn test_declared_length_bounds_read() {
        let raw = RawRequest::new(Method::POST, "/")
            .with_header(CONTENT_LENGTH, HeaderValue::from_static("3"))
            .with_body(io::Cursor::new(b"abcdef".to_vec()));
        let mut req = Request::new(raw, 1024);
        assert_eq!(req.body().unwrap().as_ref(), b"abc");
    }

    #[test]
    fn test_json_body() {
        let raw = post(r#"{"name": "ada"}"#)
            .with_header(CONTENT_TYPE, HeaderValue::from_static("application/json; charset=utf-8"));
        let mut req = Request::new(raw, 1024);

        let value: serde_json::Value = req.json().unwrap().unwrap();
        assert_eq!(value["name"], "ada");
    }

    #[test]
    fn test_json_wrong_content_type_is_none() {
        let raw = post(r#"{"name": "ada"}"#)
            .with_header(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        let mut req = Request::new(raw, 1024);
        assert!(req.json::<serde_json::Value>().unwrap().is_none());
    }

    #[test]
    fn test_json_malformed() {
        let raw = post("{nope")
            .with_header(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let mut req = Request::new(raw, 1024);

        let err = req.json::<serde_json::Value>().unwrap_err();
        assert_eq!(err.as_http().map(HttpError::code), Some("MALFORMED_BODY"));
    }

    #[test]
    fn test_json_empty_body_is_none() {
        let raw = post("").with_header(CONTENT_TYPE, HeaderValue::from_static("application/json-rpc"));
        let mut req = Request::new(raw, 1024);
        assert!(req.json::<serde_json::Value>().unwrap().is_none());
    }

    #[test]
    fn test_form_last_value_wins() {
        let raw = post("a=1&b=two+words&a=3&c=%C3%A9").with_header(
            CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded"),
        );
        let mut req = Request::new(raw, 1024);

        let form = req.form().unwrap().unwrap();
        assert_eq!(form["a"], "3");
        assert_eq!(form["b"], "two words");
        assert_eq!(form["c"], "é");
    }

    #[test]
    fn test_form_malformed_encoding() {
        let mut req = Request::new(post("a=%FF%FE"), 1024);
        let err = req.form().unwrap_err();
        assert_eq!(err.as_http().map(HttpError::code), Some("MALFORMED_BODY"));
    }

    #[test]
    fn test_query() {
        let req = Request::from(RawRequest::new(Method::GET, "/s?tag=a&tag=b&q=hello+world&flag"));
        let query = req.query();
        assert_eq!(query["tag"], vec!["a", "b"]);
        assert_eq!(query["flag"], vec![""]);
        assert_eq!(req.query_param("q").as_deref(), Some("hello world"));
        assert_eq!(req.query_param("missing"), None);
    }

    #[test]
    fn test_content_type_strips_parameters() {
        let raw = RawRequest::new(Method::GET, "/")
            .with_header(CONTENT_TYPE, HeaderValue::from_static("text/html; charset=utf-8"));
        let req = Request::from(raw);
        assert_eq!(req.content_type(), Some("text/html"));
    }

    #[test]
    fn test_extensions() {
        #[derive(Debug, Clone, PartialEq)]
        struct User(&'static str);

        let mut req = Request::from(RawRequest::new(Method::GET, "/"));
        req.extensions_mut().insert(User("ada"));
        assert_eq!(req.extensions().get::<User>(), Some(&User("ada")));
    }
}
