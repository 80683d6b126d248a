//! Test response wrapper.

use crate::error::TestError;
use bytes::Bytes;
use http::StatusCode;
use serde::de::DeserializeOwned;
use sextant_core::FinalizedResponse;

/// A collected response with helper methods for assertions.
#[derive(Debug, Clone)]
pub struct TestResponse {
    status: StatusCode,
    status_line: String,
    headers: Vec<(String, String)>,
    body: Bytes,
}

impl TestResponse {
    /// Collects a finalized response.
    pub fn from_finalized(response: FinalizedResponse) -> Result<Self, TestError> {
        let FinalizedResponse {
            status,
            status_line,
            headers,
            body,
        } = response;
        let body = body
            .into_bytes()
            .map_err(|e| TestError::BodyRead(e.to_string()))?;

        Ok(Self {
            status,
            status_line,
            headers,
            body,
        })
    }

    /// Returns the status code.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the status code as a u16.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    /// Returns the `"{code} {reason}"` status line.
    #[must_use]
    pub fn status_line(&self) -> &str {
        &self.status_line
    }

    /// Returns true if the status is successful (2xx).
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Returns the headers in the order the application emitted them.
    #[must_use]
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// First value of a header, case-insensitively.
    #[must_use]
    pub fn header(&self, name: impl AsRef<str>) -> Option<&str> {
        let name = name.as_ref();
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns the Content-Type header value.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Returns the Content-Length header value.
    #[must_use]
    pub fn content_length(&self) -> Option<u64> {
        self.header("content-length").and_then(|v| v.parse().ok())
    }

    /// Returns the raw body bytes.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Returns the body as a string.
    pub fn text(&self) -> Result<String, TestError> {
        String::from_utf8(self.body.to_vec())
            .map_err(|e| TestError::BodyRead(format!("invalid UTF-8: {e}")))
    }

    /// Deserializes the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, TestError> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Deserializes the body as a JSON value.
    pub fn json_value(&self) -> Result<serde_json::Value, TestError> {
        self.json()
    }

    // Assertion methods

    /// Asserts that the status code equals the expected value.
    ///
    /// # Panics
    ///
    /// Panics if the status code doesn't match.
    pub fn assert_status(&self, expected: StatusCode) -> &Self {
        assert_eq!(
            self.status, expected,
            "expected status {expected}, got {} with body {:?}",
            self.status, self.body
        );
        self
    }

    /// Asserts that the status code equals the expected u16 value.
    ///
    /// # Panics
    ///
    /// Panics if the status code doesn't match.
    pub fn assert_status_code(&self, expected: u16) -> &Self {
        assert_eq!(
            self.status.as_u16(),
            expected,
            "expected status {expected}, got {} with body {:?}",
            self.status,
            self.body
        );
        self
    }

    /// Asserts that a header exists with the expected value.
    ///
    /// # Panics
    ///
    /// Panics if the header is missing or different.
    pub fn assert_header(&self, name: impl AsRef<str>, expected: impl AsRef<str>) -> &Self {
        let name = name.as_ref();
        let expected = expected.as_ref();
        match self.header(name) {
            Some(actual) => assert_eq!(
                actual, expected,
                "header {name}: expected {expected:?}, got {actual:?}"
            ),
            None => panic!("header {name} is missing"),
        }
        self
    }

    /// Asserts that a header is absent.
    ///
    /// # Panics
    ///
    /// Panics if the header is present.
    pub fn assert_no_header(&self, name: impl AsRef<str>) -> &Self {
        let name = name.as_ref();
        assert!(
            self.header(name).is_none(),
            "header {name} should be absent"
        );
        self
    }

    /// Asserts that the body equals the expected string.
    ///
    /// # Panics
    ///
    /// Panics if the body is not UTF-8 or differs.
    pub fn assert_body_eq(&self, expected: impl AsRef<str>) -> &Self {
        match self.text() {
            Ok(text) => assert_eq!(text, expected.as_ref()),
            Err(e) => panic!("{e}"),
        }
        self
    }

    /// Asserts that a top-level JSON field has the expected value.
    ///
    /// # Panics
    ///
    /// Panics if the body is not a JSON object or the field differs.
    pub fn assert_json_field(
        &self,
        field: &str,
        expected: impl Into<serde_json::Value>,
    ) -> &Self {
        let value = match self.json_value() {
            Ok(value) => value,
            Err(e) => panic!("{e}"),
        };
        assert_eq!(value[field], expected.into(), "JSON field {field}");
        self
    }

    /// Asserts the `code` field of a JSON error body.
    ///
    /// # Panics
    ///
    /// Panics if the body carries a different error code.
    pub fn assert_error_code(&self, code: &str) -> &Self {
        self.assert_json_field("code", code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sextant_core::{HttpError, Response};

    fn collect(response: Response) -> TestResponse {
        TestResponse::from_finalized(response.finalize().unwrap()).unwrap()
    }

    #[test]
    fn test_text_response() {
        let response = collect(Response::text("hello"));
        response
            .assert_status_code(200)
            .assert_header("Content-Length", "5")
            .assert_body_eq("hello");
        assert_eq!(response.status_line(), "200 OK");
        assert_eq!(response.content_length(), Some(5));
    }

    #[test]
    fn test_error_response() {
        let response = collect(Response::from(HttpError::new(
            StatusCode::NOT_FOUND,
            "USER_NOT_FOUND",
            "no such user",
        )));
        response
            .assert_status(StatusCode::NOT_FOUND)
            .assert_error_code("USER_NOT_FOUND")
            .assert_json_field("message", "no such user");
        assert!(response.content_type().unwrap().starts_with("application/json"));
    }

    #[test]
    #[should_panic(expected = "header x-missing is missing")]
    fn test_assert_header_missing() {
        collect(Response::new()).assert_header("x-missing", "1");
    }
}
