//! Test client for in-memory dispatch.

use crate::error::TestError;
use crate::request::{TestRequest, TestRequestBuilder};
use crate::response::TestResponse;
use bytes::Bytes;
use http::Method;
use sextant::App;
use std::sync::Arc;

/// A test client that sends requests straight into an [`App`].
///
/// The client can be cloned and shared between threads; clones dispatch to
/// the same application.
///
/// # Example
///
/// ```
/// use sextant::{App, ViewBinding};
/// use sextant_core::Response;
/// use sextant_test::TestClient;
/// use http::Method;
///
/// let app = App::builder()
///     .route(ViewBinding::handler("/ping", |_req| Ok(Response::text("pong"))).method(Method::GET))
///     .bootstrap()
///     .unwrap();
///
/// let client = TestClient::new(app).with_default_header("x-client", "tests");
/// client.get("/ping").send().assert_status_code(200).assert_body_eq("pong");
/// ```
#[must_use]
#[derive(Debug, Clone)]
pub struct TestClient {
    app: Arc<App>,
    default_headers: Vec<(String, String)>,
}

impl TestClient {
    /// Creates a test client for `app`.
    pub fn new(app: App) -> Self {
        Self::shared(Arc::new(app))
    }

    /// Creates a test client for a shared app.
    pub fn shared(app: Arc<App>) -> Self {
        Self {
            app,
            default_headers: Vec::new(),
        }
    }

    /// Adds a default header that will be included in all requests.
    pub fn with_default_header(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    /// The application under test.
    #[must_use]
    pub fn app(&self) -> &App {
        &self.app
    }

    /// Creates a GET request builder.
    pub fn get(&self, target: impl AsRef<str>) -> TestClientRequest<'_> {
        TestClientRequest::new(self, TestRequest::get(target))
    }

    /// Creates a POST request builder.
    pub fn post(&self, target: impl AsRef<str>) -> TestClientRequest<'_> {
        TestClientRequest::new(self, TestRequest::post(target))
    }

    /// Creates a PUT request builder.
    pub fn put(&self, target: impl AsRef<str>) -> TestClientRequest<'_> {
        TestClientRequest::new(self, TestRequest::put(target))
    }

    /// Creates a PATCH request builder.
    pub fn patch(&self, target: impl AsRef<str>) -> TestClientRequest<'_> {
        TestClientRequest::new(self, TestRequest::patch(target))
    }

    /// Creates a DELETE request builder.
    pub fn delete(&self, target: impl AsRef<str>) -> TestClientRequest<'_> {
        TestClientRequest::new(self, TestRequest::delete(target))
    }

    /// Creates a HEAD request builder.
    pub fn head(&self, target: impl AsRef<str>) -> TestClientRequest<'_> {
        TestClientRequest::new(self, TestRequest::head(target))
    }

    /// Creates a request builder with a custom method.
    pub fn request(&self, method: Method, target: impl AsRef<str>) -> TestClientRequest<'_> {
        TestClientRequest::new(self, TestRequestBuilder::new(method, target))
    }

    /// Dispatches a prepared request.
    pub fn dispatch(&self, request: TestRequest) -> Result<TestResponse, TestError> {
        TestResponse::from_finalized(self.app.dispatch(request.into_raw()))
    }
}

/// A request builder bound to a test client.
#[must_use]
pub struct TestClientRequest<'a> {
    client: &'a TestClient,
    builder: TestRequestBuilder,
}

impl<'a> TestClientRequest<'a> {
    fn new(client: &'a TestClient, builder: TestRequestBuilder) -> Self {
        let mut builder = builder;
        for (name, value) in &client.default_headers {
            builder = builder.header(name, value);
        }
        Self { client, builder }
    }

    /// Appends a header.
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.builder = self.builder.header(name, value);
        self
    }

    /// Sets the Content-Type header.
    pub fn content_type(mut self, content_type: impl AsRef<str>) -> Self {
        self.builder = self.builder.content_type(content_type);
        self
    }

    /// Sets the raw request body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.builder = self.builder.body(body);
        self
    }

    /// Sets a body sent without `content-length`.
    pub fn streamed_body(mut self, body: impl Into<Bytes>) -> Self {
        self.builder = self.builder.streamed_body(body);
        self
    }

    /// Sets the request body as JSON.
    pub fn json<T: serde::Serialize + ?Sized>(mut self, value: &T) -> Self {
        self.builder = self.builder.json(value);
        self
    }

    /// Sets a urlencoded form body.
    pub fn form<I, K, V>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.builder = self.builder.form(fields);
        self
    }

    /// Sends the request and returns the response.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built or the body cannot be read.
    pub fn send(self) -> TestResponse {
        match self.try_send() {
            Ok(response) => response,
            Err(e) => panic!("test request failed: {e}"),
        }
    }

    /// Sends the request and returns a Result.
    pub fn try_send(self) -> Result<TestResponse, TestError> {
        let request = self.builder.build()?;
        self.client.dispatch(request)
    }
}
