//! Error types for Sextant.
//!
//! Hook and handler code returns [`Error`], which is either an application
//! level [`HttpError`] or a [`Fault`].
//!
//! | kind | recovery | response |
//! |---|---|---|
//! | [`HttpError`] | the view's `on_exception` hook, then the dispatcher | its own status, `{"code", "message", ...payload}` |
//! | [`Fault`] | dispatcher only | `500 INTERNAL_SERVER_ERROR` with a generic message |
//!
//! Any `anyhow::Error`, `std::io::Error` or `serde_json::Error` converts into
//! a fault, so `?` works on ordinary fallible code inside handlers.

use http::header::{HeaderName, HeaderValue, ALLOW};
use http::{HeaderMap, Method, StatusCode};
use serde::Serialize;
use serde_json::{Map, Value};

/// Result type alias using [`Error`].
pub type SextantResult<T> = Result<T, Error>;

/// Machine-readable code of the generic fault response.
pub const INTERNAL_SERVER_ERROR_CODE: &str = "INTERNAL_SERVER_ERROR";

/// Message of the generic fault response.
pub const INTERNAL_SERVER_ERROR_MESSAGE: &str = "Something went wrong, try again later.";

/// An application-level error carrying its own HTTP rendering.
///
/// The default is `400 HTTP_EXCEPTION` with the message
/// `"An unknown error has occurred."`.
///
/// # Example
///
/// ```
/// use sextant_core::HttpError;
/// use http::StatusCode;
///
/// let err = HttpError::new(StatusCode::CONFLICT, "EMAIL_TAKEN", "Email already registered.")
///     .with_payload_field("field", "email");
///
/// assert_eq!(err.status(), StatusCode::CONFLICT);
/// assert_eq!(err.code(), "EMAIL_TAKEN");
/// assert_eq!(err.payload().unwrap()["field"], "email");
/// ```
#[derive(Debug, Clone, thiserror::Error)]
#[error("{code}: {message}")]
pub struct HttpError {
    status: StatusCode,
    code: String,
    message: String,
    headers: HeaderMap,
    payload: Option<Map<String, Value>>,
}

impl Default for HttpError {
    fn default() -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            "HTTP_EXCEPTION",
            "An unknown error has occurred.",
        )
    }
}

impl HttpError {
    /// Creates an error with the given status, code and message.
    #[must_use]
    pub fn new(status: StatusCode, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            code: code.into(),
            message: message.into(),
            headers: HeaderMap::new(),
            payload: None,
        }
    }

    /// Creates a `400 HTTP_EXCEPTION` error with a custom message.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::default().with_message(message)
    }

    /// `404 ROUTE_NOT_FOUND`.
    #[must_use]
    pub fn route_not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "ROUTE_NOT_FOUND", "Route not found.")
    }

    /// `405 METHOD_NOT_ALLOWED` with an `allow` header listing `allowed`.
    #[must_use]
    pub fn method_not_allowed(allowed: &[Method]) -> Self {
        let allow = allowed
            .iter()
            .map(Method::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        let err = Self::new(
            StatusCode::METHOD_NOT_ALLOWED,
            "METHOD_NOT_ALLOWED",
            "Method not allowed.",
        );
        match HeaderValue::from_str(&allow) {
            Ok(value) => err.with_header(ALLOW, value),
            Err(_) => err,
        }
    }

    /// `413 BODY_TOO_LARGE`.
    #[must_use]
    pub fn body_too_large() -> Self {
        Self::new(
            StatusCode::PAYLOAD_TOO_LARGE,
            "BODY_TOO_LARGE",
            "Request body too large.",
        )
    }

    /// `400 MALFORMED_BODY`.
    #[must_use]
    pub fn malformed_body() -> Self {
        Self::new(StatusCode::BAD_REQUEST, "MALFORMED_BODY", "Malformed body.")
    }

    /// `400 INVALID_PATH_PARAMETER` naming the offending parameter.
    #[must_use]
    pub fn invalid_path_parameter(param: &str) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            "INVALID_PATH_PARAMETER",
            format!("Invalid value for path parameter '{param}'."),
        )
        .with_payload_field("parameter", param)
    }

    /// `500 INVALID_STATUS_CODE` for a code missing from the status registry.
    #[must_use]
    pub fn invalid_status_code(code: u16) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INVALID_STATUS_CODE",
            format!("Invalid status code {code}."),
        )
    }

    /// Replaces the status.
    #[must_use]
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Replaces the machine-readable code.
    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    /// Replaces the message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Adds a header to the rendered response.
    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Replaces the payload merged into the rendered body.
    #[must_use]
    pub fn with_payload(mut self, payload: Map<String, Value>) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Adds one payload field.
    #[must_use]
    pub fn with_payload_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.payload
            .get_or_insert_with(Map::new)
            .insert(key.into(), value.into());
        self
    }

    /// HTTP status.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Machine-readable code.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Extra response headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Extra body fields.
    #[must_use]
    pub fn payload(&self) -> Option<&Map<String, Value>> {
        self.payload.as_ref()
    }

    /// Builds the JSON body for this error.
    #[must_use]
    pub fn to_body(&self) -> ErrorBody {
        ErrorBody {
            code: self.code.clone(),
            message: self.message.clone(),
            payload: self.payload.clone().unwrap_or_default(),
            details: None,
        }
    }
}

/// What is known about a caught panic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PanicReport {
    /// The panic message.
    pub message: String,
    /// `file:line:column` where the panic was raised, when known.
    pub location: Option<String>,
    /// Backtrace lines captured at the panic site.
    pub backtrace: Vec<String>,
}

impl PanicReport {
    /// Creates a report carrying only a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }
}

impl std::fmt::Display for PanicReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// A non-application failure.
///
/// Faults are always rendered as a generic `500` response. Their text is only
/// shown to clients in debug mode.
#[derive(Debug, thiserror::Error)]
pub enum Fault {
    /// A handler produced a response the framework cannot send.
    #[error("handler contract violated: {0}")]
    HandlerContract(String),

    /// A view's `on_exception` hook declined to produce a response.
    #[error("exception handler must return a Response")]
    ExceptionHandlerContract,

    /// User code panicked.
    #[error("panic: {0}")]
    Panic(PanicReport),

    /// Any other failure.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Fault {
    /// Short name of the fault kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::HandlerContract(_) => "HandlerContract",
            Self::ExceptionHandlerContract => "ExceptionHandlerContract",
            Self::Panic(_) => "Panic",
            Self::Other(_) => "Error",
        }
    }

    /// Diagnostic lines: the cause chain, then any captured backtrace.
    #[must_use]
    pub fn stacktrace(&self) -> Vec<String> {
        match self {
            Self::Other(err) => {
                let mut lines: Vec<String> = err.chain().map(ToString::to_string).collect();
                let backtrace = err.backtrace();
                if backtrace.status() == std::backtrace::BacktraceStatus::Captured {
                    lines.extend(backtrace.to_string().lines().map(str::to_string));
                }
                lines
            }
            Self::Panic(report) => {
                let mut lines = vec![self.to_string()];
                if let Some(location) = &report.location {
                    lines.push(format!("at {location}"));
                }
                lines.extend(report.backtrace.iter().cloned());
                lines
            }
            other => vec![other.to_string()],
        }
    }
}

/// The error type of hooks and handlers.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An application error with its own HTTP rendering.
    #[error(transparent)]
    Http(#[from] HttpError),

    /// A fault rendered as a generic 500.
    #[error(transparent)]
    Fault(#[from] Fault),
}

impl Error {
    /// Creates a fault from any message.
    pub fn fault(message: impl std::fmt::Display + std::fmt::Debug + Send + Sync + 'static) -> Self {
        Self::Fault(Fault::Other(anyhow::Error::msg(message)))
    }

    /// Returns the application error, if this is one.
    #[must_use]
    pub fn as_http(&self) -> Option<&HttpError> {
        match self {
            Self::Http(err) => Some(err),
            Self::Fault(_) => None,
        }
    }

    /// Returns true for faults.
    #[must_use]
    pub fn is_fault(&self) -> bool {
        matches!(self, Self::Fault(_))
    }

    /// The status the error renders with.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Http(err) => err.status(),
            Self::Fault(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        // An HttpError wrapped by anyhow keeps its HTTP rendering.
        match err.downcast::<HttpError>() {
            Ok(http) => Self::Http(http),
            Err(err) => Self::Fault(Fault::Other(err)),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Fault(Fault::Other(err.into()))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Fault(Fault::Other(err.into()))
    }
}

/// Serializable error response body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code.
    pub code: String,
    /// Human-readable message.
    pub message: String,
    /// Extra fields merged into the top level.
    #[serde(flatten)]
    pub payload: Map<String, Value>,
    /// Diagnostics, only present in debug mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<ErrorDetails>,
}

impl ErrorBody {
    /// The generic body used for faults.
    #[must_use]
    pub fn internal() -> Self {
        Self {
            code: INTERNAL_SERVER_ERROR_CODE.to_string(),
            message: INTERNAL_SERVER_ERROR_MESSAGE.to_string(),
            payload: Map::new(),
            details: None,
        }
    }

    /// Attaches debug diagnostics.
    #[must_use]
    pub fn with_details(mut self, details: ErrorDetails) -> Self {
        self.details = Some(details);
        self
    }
}

/// Debug diagnostics attached to an error body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorDetails {
    /// The error text.
    pub exception: String,
    /// Cause chain and backtrace lines.
    pub stacktrace: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_error_defaults() {
        let err = HttpError::default();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.code(), "HTTP_EXCEPTION");
        assert_eq!(err.message(), "An unknown error has occurred.");
        assert!(err.payload().is_none());
    }

    #[test]
    fn test_method_not_allowed_allow_header() {
        let err = HttpError::method_not_allowed(&[Method::GET, Method::HEAD, Method::POST]);
        assert_eq!(err.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(err.headers().get(ALLOW).unwrap(), "GET, HEAD, POST");
    }

    #[test]
    fn test_fixed_framework_errors() {
        assert_eq!(HttpError::route_not_found().status(), StatusCode::NOT_FOUND);
        assert_eq!(HttpError::body_too_large().code(), "BODY_TOO_LARGE");
        assert_eq!(HttpError::body_too_large().status().as_u16(), 413);
        assert_eq!(HttpError::malformed_body().code(), "MALFORMED_BODY");
        assert_eq!(HttpError::invalid_status_code(999).status().as_u16(), 500);
    }

    #[test]
    fn test_body_flattens_payload() {
        let err = HttpError::bad_request("Nope.")
            .with_code("NOPE")
            .with_payload_field("field", "email")
            .with_payload_field("limit", 3);

        let json = serde_json::to_value(err.to_body()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"code": "NOPE", "message": "Nope.", "field": "email", "limit": 3})
        );
    }

    #[test]
    fn test_internal_body_with_details() {
        let body = ErrorBody::internal().with_details(ErrorDetails {
            exception: "boom".into(),
            stacktrace: vec!["boom".into()],
        });
        let json = serde_json::to_value(body).unwrap();
        assert_eq!(json["code"], INTERNAL_SERVER_ERROR_CODE);
        assert_eq!(json["message"], INTERNAL_SERVER_ERROR_MESSAGE);
        assert_eq!(json["details"]["exception"], "boom");
    }

    #[test]
    fn test_internal_body_omits_details() {
        let json = serde_json::to_value(ErrorBody::internal()).unwrap();
        assert!(json.get("details").is_none());
    }

    #[test]
    fn test_anyhow_becomes_fault() {
        let err: Error = anyhow::anyhow!("database unreachable").into();
        assert!(err.is_fault());
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_anyhow_wrapping_http_error_stays_http() {
        let err: Error = anyhow::Error::new(HttpError::route_not_found()).into();
        assert_eq!(err.as_http().map(HttpError::code), Some("ROUTE_NOT_FOUND"));
    }

    #[test]
    fn test_io_and_json_errors_are_faults() {
        let io: Error = std::io::Error::new(std::io::ErrorKind::Other, "disk").into();
        assert!(io.is_fault());

        let json: Error = serde_json::from_str::<Value>("{").unwrap_err().into();
        assert!(json.is_fault());
    }

    #[test]
    fn test_fault_stacktrace_includes_chain() {
        let inner = anyhow::anyhow!("connection refused");
        let fault = Fault::Other(inner.context("loading user"));
        let lines = fault.stacktrace();
        assert_eq!(lines[0], "loading user");
        assert_eq!(lines[1], "connection refused");
    }

    #[test]
    fn test_fault_kinds() {
        assert_eq!(Fault::ExceptionHandlerContract.kind(), "ExceptionHandlerContract");
        assert_eq!(
            Fault::ExceptionHandlerContract.to_string(),
            "exception handler must return a Response"
        );
        assert_eq!(
            Fault::Panic(PanicReport::new("x")).stacktrace(),
            vec!["panic: x".to_string()]
        );
    }

    #[test]
    fn test_panic_stacktrace_lists_location_then_frames() {
        let fault = Fault::Panic(PanicReport {
            message: "index out of bounds".into(),
            location: Some("src/views.rs:12:5".into()),
            backtrace: vec!["0: views::show".into(), "1: sextant::app::dispatch".into()],
        });
        assert_eq!(
            fault.stacktrace(),
            vec![
                "panic: index out of bounds",
                "at src/views.rs:12:5",
                "0: views::show",
                "1: sextant::app::dispatch",
            ]
        );
    }
}
