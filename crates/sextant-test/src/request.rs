//! Test request building.

use crate::error::TestError;
use bytes::Bytes;
use http::{header, HeaderMap, HeaderName, HeaderValue, Method};
use serde::Serialize;
use sextant_core::RawRequest;

/// A request ready to be dispatched by a [`TestClient`](crate::TestClient).
#[derive(Debug, Clone)]
pub struct TestRequest {
    /// HTTP method.
    pub method: Method,
    /// Path with optional query string, e.g. `/search?q=rust`.
    pub target: String,
    /// Request headers.
    pub headers: HeaderMap,
    /// Request body.
    pub body: Bytes,
    /// Send the body without a `content-length` header.
    pub streamed: bool,
}

impl TestRequest {
    /// Creates a new GET request.
    pub fn get(target: impl AsRef<str>) -> TestRequestBuilder {
        TestRequestBuilder::new(Method::GET, target)
    }

    /// Creates a new POST request.
    pub fn post(target: impl AsRef<str>) -> TestRequestBuilder {
        TestRequestBuilder::new(Method::POST, target)
    }

    /// Creates a new PUT request.
    pub fn put(target: impl AsRef<str>) -> TestRequestBuilder {
        TestRequestBuilder::new(Method::PUT, target)
    }

    /// Creates a new PATCH request.
    pub fn patch(target: impl AsRef<str>) -> TestRequestBuilder {
        TestRequestBuilder::new(Method::PATCH, target)
    }

    /// Creates a new DELETE request.
    pub fn delete(target: impl AsRef<str>) -> TestRequestBuilder {
        TestRequestBuilder::new(Method::DELETE, target)
    }

    /// Creates a new HEAD request.
    pub fn head(target: impl AsRef<str>) -> TestRequestBuilder {
        TestRequestBuilder::new(Method::HEAD, target)
    }

    /// Converts this request to the form a server adapter hands over.
    pub fn into_raw(self) -> RawRequest {
        let mut raw = RawRequest::new(self.method, &self.target);
        for (name, value) in &self.headers {
            raw = raw.with_header(name.clone(), value.clone());
        }
        if self.streamed {
            raw.with_body(std::io::Cursor::new(self.body))
        } else if self.body.is_empty() {
            raw
        } else {
            raw.with_bytes(self.body)
        }
    }
}

/// Builder for constructing test requests.
///
/// Invalid headers and unserializable bodies are reported by
/// [`build`](Self::build).
#[must_use]
#[derive(Debug)]
pub struct TestRequestBuilder {
    method: Method,
    target: String,
    headers: HeaderMap,
    body: Option<Bytes>,
    streamed: bool,
    error: Option<TestError>,
}

impl TestRequestBuilder {
    /// Creates a new request builder.
    pub fn new(method: Method, target: impl AsRef<str>) -> Self {
        Self {
            method,
            target: target.as_ref().to_string(),
            headers: HeaderMap::new(),
            body: None,
            streamed: false,
            error: None,
        }
    }

    /// Appends a header.
    ///
    /// # Example
    ///
    /// ```
    /// use sextant_test::TestRequest;
    ///
    /// let request = TestRequest::get("/users")
    ///     .header("x-request-id", "12345")
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(request.headers["x-request-id"], "12345");
    /// ```
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        let name = HeaderName::try_from(name.as_ref());
        let value = HeaderValue::try_from(value.as_ref());
        match (name, value) {
            (Ok(name), Ok(value)) => {
                self.headers.append(name, value);
            }
            (Err(e), _) => self.fail(TestError::InvalidHeader(e.to_string())),
            (_, Err(e)) => self.fail(TestError::InvalidHeader(e.to_string())),
        }
        self
    }

    /// Sets the Content-Type header.
    pub fn content_type(mut self, content_type: impl AsRef<str>) -> Self {
        self.headers.remove(header::CONTENT_TYPE);
        self.header(header::CONTENT_TYPE.as_str(), content_type)
    }

    /// Sets the raw request body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Sets a body that is sent without `content-length`, as a chunked
    /// upload would be.
    pub fn streamed_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self.streamed = true;
        self
    }

    /// Sets the request body as JSON and the matching content type.
    pub fn json<T: Serialize + ?Sized>(mut self, value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(bytes) => self.body = Some(Bytes::from(bytes)),
            Err(e) => self.fail(e.into()),
        }
        self.content_type("application/json")
    }

    /// Sets the request body as `application/x-www-form-urlencoded`.
    pub fn form<I, K, V>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let encoded = fields
            .into_iter()
            .map(|(k, v)| {
                format!(
                    "{}={}",
                    urlencoding::encode(k.as_ref()),
                    urlencoding::encode(v.as_ref())
                )
            })
            .collect::<Vec<_>>()
            .join("&");
        self.body = Some(Bytes::from(encoded));
        self.content_type("application/x-www-form-urlencoded")
    }

    /// Builds the test request.
    pub fn build(self) -> Result<TestRequest, TestError> {
        if let Some(err) = self.error {
            return Err(err);
        }
        if !self.target.starts_with('/') {
            return Err(TestError::RequestBuild(format!(
                "target must start with '/': {}",
                self.target
            )));
        }

        Ok(TestRequest {
            method: self.method,
            target: self.target,
            headers: self.headers,
            body: self.body.unwrap_or_default(),
            streamed: self.streamed,
        })
    }

    fn fail(&mut self, err: TestError) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }
}
