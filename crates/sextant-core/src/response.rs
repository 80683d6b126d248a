//! Outbound responses.
//!
//! Views and middleware build and mutate a [`Response`]. The dispatcher turns
//! it into a [`FinalizedResponse`], the transport-ready triple of status line,
//! header list and body.

use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use bytes::{Bytes, BytesMut};
use http::header::{
    HeaderName, HeaderValue, CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE, LOCATION,
};
use http::{HeaderMap, StatusCode};
use serde::Serialize;

use crate::error::{Error, Fault, HttpError};
use crate::status;

/// Content type of plain responses.
pub const TEXT_PLAIN: &str = "text/plain; charset=utf-8";
/// Content type of JSON responses.
pub const APPLICATION_JSON: &str = "application/json; charset=utf-8";
/// Content type of streamed and file responses.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Size of each chunk read from a file or reader body.
const FILE_CHUNK: usize = 256 * 1024;

/// Headers dropped from `304 Not Modified` responses.
const NOT_MODIFIED_STRIPPED: [&str; 8] = [
    "allow",
    "content-encoding",
    "content-language",
    "content-length",
    "content-range",
    "content-type",
    "content-md5",
    "last-modified",
];

/// A lazy sequence of body chunks.
pub type ChunkStream = Box<dyn Iterator<Item = io::Result<Bytes>> + Send>;

/// A response body.
#[derive(Default)]
pub enum Body {
    /// No body.
    #[default]
    Empty,
    /// A fully buffered body.
    Bytes(Bytes),
    /// A body produced chunk by chunk.
    Stream(ChunkStream),
}

impl Body {
    /// Returns true if the body is known to be empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Bytes(b) => b.is_empty(),
            Self::Stream(_) => false,
        }
    }

    /// The exact length, if buffered.
    #[must_use]
    pub fn len_hint(&self) -> Option<usize> {
        match self {
            Self::Empty => Some(0),
            Self::Bytes(b) => Some(b.len()),
            Self::Stream(_) => None,
        }
    }

    /// Collects the body into memory.
    pub fn into_bytes(self) -> io::Result<Bytes> {
        match self {
            Self::Empty => Ok(Bytes::new()),
            Self::Bytes(b) => Ok(b),
            Self::Stream(chunks) => {
                let mut buf = BytesMut::new();
                for chunk in chunks {
                    buf.extend_from_slice(&chunk?);
                }
                Ok(buf.freeze())
            }
        }
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("Empty"),
            Self::Bytes(b) => f.debug_tuple("Bytes").field(&b.len()).finish(),
            Self::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

impl From<Bytes> for Body {
    fn from(bytes: Bytes) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<String> for Body {
    fn from(s: String) -> Self {
        Self::Bytes(Bytes::from(s))
    }
}

impl From<&'static str> for Body {
    fn from(s: &'static str) -> Self {
        Self::Bytes(Bytes::from_static(s.as_bytes()))
    }
}

impl From<Vec<u8>> for Body {
    fn from(v: Vec<u8>) -> Self {
        Self::Bytes(Bytes::from(v))
    }
}

/// Adapts a reader into a [`ChunkStream`].
struct ReaderChunks<R> {
    reader: R,
    done: bool,
}

impl<R: Read> Iterator for ReaderChunks<R> {
    type Item = io::Result<Bytes>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let mut buf = vec![0_u8; FILE_CHUNK];
        loop {
            match self.reader.read(&mut buf) {
                Ok(0) => {
                    self.done = true;
                    return None;
                }
                Ok(n) => {
                    buf.truncate(n);
                    return Some(Ok(Bytes::from(buf)));
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

/// A response under construction.
///
/// # Example
///
/// ```
/// use sextant_core::Response;
/// use http::StatusCode;
///
/// let response = Response::text("created").with_status(StatusCode::CREATED);
/// let finalized = response.finalize().unwrap();
///
/// assert_eq!(finalized.status_line, "201 Created");
/// assert!(finalized.headers.contains(&("content-length".to_string(), "7".to_string())));
/// ```
#[derive(Debug)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Body,
}

impl Default for Response {
    fn default() -> Self {
        Self::with_content_type(TEXT_PLAIN, Body::Empty)
    }
}

impl Response {
    /// An empty `200` response with the plain text content type.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn with_content_type(content_type: &'static str, body: Body) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        Self {
            status: StatusCode::OK,
            headers,
            body,
        }
    }

    /// A plain text response.
    #[must_use]
    pub fn text(body: impl Into<String>) -> Self {
        Self::with_content_type(TEXT_PLAIN, Body::from(body.into()))
    }

    /// A JSON response.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, Error> {
        let body = serde_json::to_vec(value)?;
        Ok(Self::with_content_type(APPLICATION_JSON, Body::from(body)))
    }

    /// A JSON response from an already built value.
    #[must_use]
    pub fn json_value(value: &serde_json::Value) -> Self {
        Self::with_content_type(APPLICATION_JSON, Body::from(value.to_string()))
    }

    /// A raw byte response.
    #[must_use]
    pub fn bytes(body: impl Into<Bytes>) -> Self {
        Self::with_content_type(OCTET_STREAM, Body::Bytes(body.into()))
    }

    /// A redirect: `301` when `permanent`, `302` otherwise. The body is empty.
    pub fn redirect(location: &str, permanent: bool) -> Result<Self, Error> {
        let value = HeaderValue::from_str(location)
            .map_err(|_| HttpError::bad_request("Invalid redirect location."))?;
        let mut response = Self::default().with_status(if permanent {
            StatusCode::MOVED_PERMANENTLY
        } else {
            StatusCode::FOUND
        });
        response.headers.insert(LOCATION, value);
        Ok(response)
    }

    /// A streamed response of unknown length.
    #[must_use]
    pub fn stream<I>(chunks: I) -> Self
    where
        I: IntoIterator<Item = io::Result<Bytes>>,
        I::IntoIter: Send + 'static,
    {
        Self::with_content_type(OCTET_STREAM, Body::Stream(Box::new(chunks.into_iter())))
    }

    /// A streamed response read from `reader` in fixed-size chunks.
    #[must_use]
    pub fn reader(reader: impl Read + Send + 'static) -> Self {
        Self::with_content_type(
            OCTET_STREAM,
            Body::Stream(Box::new(ReaderChunks {
                reader,
                done: false,
            })),
        )
    }

    /// A file download prompting the client to save it as `filename`.
    #[must_use]
    pub fn attachment(body: impl Into<Bytes>, filename: &str) -> Self {
        Self::bytes(body).with_disposition("attachment", filename)
    }

    /// A file shown inline under the name `filename`.
    #[must_use]
    pub fn inline(body: impl Into<Bytes>, filename: &str) -> Self {
        Self::bytes(body).with_disposition("inline", filename)
    }

    /// Streams a file from disk.
    ///
    /// A missing file fails with `404 FILE_NOT_FOUND`.
    pub fn file(path: impl AsRef<Path>, filename: &str, attachment: bool) -> Result<Self, Error> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(HttpError::new(
                StatusCode::NOT_FOUND,
                "FILE_NOT_FOUND",
                "File not found.",
            )
            .into());
        }
        let file = File::open(path)?;
        let disposition = if attachment { "attachment" } else { "inline" };
        Ok(Self::reader(file).with_disposition(disposition, filename))
    }

    fn with_disposition(mut self, kind: &str, filename: &str) -> Self {
        let value = format!("{kind}; filename*=UTF-8''{}", urlencoding::encode(filename));
        // The encoded filename is plain ASCII.
        if let Ok(value) = HeaderValue::from_str(&value) {
            self.headers.insert(CONTENT_DISPOSITION, value);
        }
        self
    }

    /// The status code.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Sets the status from a numeric code, which must be registered.
    pub fn set_status(&mut self, code: u16) -> Result<(), HttpError> {
        self.status = status::registered(code).ok_or_else(|| HttpError::invalid_status_code(code))?;
        Ok(())
    }

    /// Replaces the status.
    #[must_use]
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// The headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Mutable headers.
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// A header value as text.
    #[must_use]
    pub fn header(&self, name: impl http::header::AsHeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Sets a header, replacing any previous value.
    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// The body.
    #[must_use]
    pub fn body(&self) -> &Body {
        &self.body
    }

    /// Replaces the body.
    pub fn set_body(&mut self, body: impl Into<Body>) {
        self.body = body.into();
    }

    /// Produces the transport-ready response.
    ///
    /// Buffered bodies get an exact `content-length`. `204` and `304`
    /// responses drop the headers those statuses must not carry. A status
    /// missing from the registry is a handler contract fault.
    pub fn finalize(self) -> Result<FinalizedResponse, Fault> {
        let code = self.status.as_u16();
        let status_line = status::status_line(code)
            .ok_or_else(|| Fault::HandlerContract(format!("unregistered status code {code}")))?;

        let mut headers = self.headers;
        if let Some(len) = self.body.len_hint() {
            headers.insert(CONTENT_LENGTH, HeaderValue::from(len));
        }
        match code {
            204 => {
                headers.remove(CONTENT_TYPE);
                headers.remove(CONTENT_LENGTH);
            }
            304 => {
                for name in NOT_MODIFIED_STRIPPED {
                    headers.remove(name);
                }
            }
            _ => {}
        }

        let headers = headers
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();

        Ok(FinalizedResponse {
            status: self.status,
            status_line,
            headers,
            body: self.body,
        })
    }
}

impl From<HttpError> for Response {
    fn from(err: HttpError) -> Self {
        let mut response = Self::json_value(&serde_json::to_value(err.to_body()).unwrap_or_default())
            .with_status(err.status());
        for (name, value) in err.headers() {
            response.headers.append(name, value.clone());
        }
        response
    }
}

/// The `(status line, headers, body)` triple handed to the transport.
#[derive(Debug)]
pub struct FinalizedResponse {
    /// Status code.
    pub status: StatusCode,
    /// `"{code} {reason}"`.
    pub status_line: String,
    /// Lower-case header names and values, in order.
    pub headers: Vec<(String, String)>,
    /// Body.
    pub body: Body,
}

impl FinalizedResponse {
    /// First value of a header, by lower-case name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Drops the body, keeping every header. Used for `HEAD`.
    pub fn strip_body(&mut self) {
        self.body = Body::Empty;
    }

    /// Collects the body into memory.
    pub fn into_bytes(self) -> io::Result<Bytes> {
        self.body.into_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header::{ALLOW, LAST_MODIFIED};
    use std::io::Write;

    #[test]
    fn test_default_response() {
        let response = Response::new();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.header(CONTENT_TYPE), Some(TEXT_PLAIN));
        assert!(response.body().is_empty());
    }

    #[test]
    fn test_finalize_sets_content_length() {
        let finalized = Response::text("hello").finalize().unwrap();
        assert_eq!(finalized.status_line, "200 OK");
        assert_eq!(finalized.header("content-length"), Some("5"));
        assert_eq!(finalized.into_bytes().unwrap().as_ref(), b"hello");
    }

    #[test]
    fn test_json_response() {
        let response = Response::json(&serde_json::json!({"ok": true})).unwrap();
        assert_eq!(response.header(CONTENT_TYPE), Some(APPLICATION_JSON));
        let body = response.finalize().unwrap().into_bytes().unwrap();
        assert_eq!(body.as_ref(), br#"{"ok":true}"#);
    }

    #[test]
    fn test_set_status_validates() {
        let mut response = Response::new();
        response.set_status(418).unwrap();
        assert_eq!(response.status().as_u16(), 418);

        let err = response.set_status(299).unwrap_err();
        assert_eq!(err.code(), "INVALID_STATUS_CODE");
        assert_eq!(response.status().as_u16(), 418);
    }

    #[test]
    fn test_unregistered_status_fails_finalize() {
        let status = StatusCode::from_u16(299).unwrap();
        let err = Response::new().with_status(status).finalize().unwrap_err();
        assert!(matches!(err, Fault::HandlerContract(_)));
    }

    #[test]
    fn test_no_content_strips_headers() {
        let finalized = Response::text("ignored")
            .with_status(StatusCode::NO_CONTENT)
            .finalize()
            .unwrap();
        assert_eq!(finalized.header("content-type"), None);
        assert_eq!(finalized.header("content-length"), None);
    }

    #[test]
    fn test_not_modified_strips_headers() {
        let finalized = Response::new()
            .with_status(StatusCode::NOT_MODIFIED)
            .with_header(ALLOW, HeaderValue::from_static("GET"))
            .with_header(LAST_MODIFIED, HeaderValue::from_static("yesterday"))
            .with_header(
                HeaderName::from_static("etag"),
                HeaderValue::from_static("\"v1\""),
            )
            .finalize()
            .unwrap();
        assert_eq!(finalized.header("allow"), None);
        assert_eq!(finalized.header("last-modified"), None);
        assert_eq!(finalized.header("content-type"), None);
        assert_eq!(finalized.header("etag"), Some("\"v1\""));
    }

    #[test]
    fn test_redirect() {
        let temporary = Response::redirect("/login", false).unwrap();
        assert_eq!(temporary.status(), StatusCode::FOUND);
        assert_eq!(temporary.header(LOCATION), Some("/login"));

        let permanent = Response::redirect("/home", true).unwrap();
        assert_eq!(permanent.status(), StatusCode::MOVED_PERMANENTLY);
        assert!(permanent.body().is_empty());
    }

    #[test]
    fn test_stream_has_no_content_length() {
        let chunks = vec![Ok(Bytes::from_static(b"ab")), Ok(Bytes::from_static(b"cd"))];
        let finalized = Response::stream(chunks).finalize().unwrap();
        assert_eq!(finalized.header("content-length"), None);
        assert_eq!(finalized.into_bytes().unwrap().as_ref(), b"abcd");
    }

    #[test]
    fn test_attachment_disposition() {
        let response = Response::attachment("data", "report 2024.csv");
        assert_eq!(
            response.header(CONTENT_DISPOSITION),
            Some("attachment; filename*=UTF-8''report%202024.csv")
        );

        let response = Response::inline("data", "a.txt");
        assert_eq!(
            response.header(CONTENT_DISPOSITION),
            Some("inline; filename*=UTF-8''a.txt")
        );
    }

    #[test]
    fn test_file_response_streams_contents() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"file contents").unwrap();

        let response = Response::file(file.path(), "notes.txt", true).unwrap();
        assert_eq!(response.header(CONTENT_TYPE), Some(OCTET_STREAM));
        let body = response.finalize().unwrap().into_bytes().unwrap();
        assert_eq!(body.as_ref(), b"file contents");
    }

    #[test]
    fn test_missing_file() {
        let err = Response::file("/definitely/not/here.bin", "x.bin", false).unwrap_err();
        assert_eq!(err.as_http().map(HttpError::code), Some("FILE_NOT_FOUND"));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_from_http_error() {
        let err = HttpError::method_not_allowed(&[http::Method::GET]);
        let response = Response::from(err);
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.header(ALLOW), Some("GET"));

        let body = response.finalize().unwrap().into_bytes().unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["code"], "METHOD_NOT_ALLOWED");
        assert_eq!(json["message"], "Method not allowed.");
    }

    #[test]
    fn test_strip_body_keeps_length() {
        let mut finalized = Response::text("pong").finalize().unwrap();
        finalized.strip_body();
        assert_eq!(finalized.header("content-length"), Some("4"));
        assert!(finalized.into_bytes().unwrap().is_empty());
    }
}
