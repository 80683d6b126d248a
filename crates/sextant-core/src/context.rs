//! Request context types.
//!
//! The [`RequestContext`] carries per-request bookkeeping through the
//! dispatch pipeline: the request id, the current [`Stage`], the matched
//! route and timing.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// A unique identifier for each request, using UUID v7.
///
/// UUID v7 is time-ordered, which makes it ideal for request tracking
/// and log correlation.
///
/// # Example
///
/// ```
/// use sextant_core::RequestId;
///
/// let id = RequestId::new();
/// assert_eq!(id.to_string().len(), 36);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Creates a new unique request ID using UUID v7.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Creates a `RequestId` from an existing UUID.
    ///
    /// Useful when the host propagates an id from an inbound header.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for RequestId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// Position of a request in the dispatch pipeline.
///
/// ```text
/// Received → PreRoute → Routed → PreHandler → Handling → PostHandler → Complete
///     └──────────────────────── Error ──────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// The request has been accepted.
    Received,
    /// Middleware `before_route` hooks are running.
    PreRoute,
    /// The route has been resolved.
    Routed,
    /// Middleware `before_handler` hooks are running.
    PreHandler,
    /// The view's hooks and handler are running.
    Handling,
    /// Middleware `after_handler` hooks are running.
    PostHandler,
    /// A response has been finalized.
    Complete,
    /// An error is being rendered.
    Error,
}

impl Stage {
    /// Stable name used in logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::PreRoute => "pre_route",
            Self::Routed => "routed",
            Self::PreHandler => "pre_handler",
            Self::Handling => "handling",
            Self::PostHandler => "post_handler",
            Self::Complete => "complete",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-request bookkeeping owned by the request.
///
/// # Example
///
/// ```
/// use sextant_core::{RequestContext, Stage};
///
/// let mut ctx = RequestContext::new();
/// assert_eq!(ctx.stage(), Stage::Received);
///
/// ctx.set_stage(Stage::Routed);
/// ctx.set_route("/users/<id:int>", Some("user"));
/// assert_eq!(ctx.route(), Some("/users/<id:int>"));
/// ```
#[derive(Debug, Clone)]
pub struct RequestContext {
    request_id: RequestId,
    stage: Stage,
    route: Option<String>,
    route_name: Option<String>,
    started_at: Instant,
}

impl RequestContext {
    /// Creates a context with a fresh request ID.
    #[must_use]
    pub fn new() -> Self {
        Self::with_request_id(RequestId::new())
    }

    /// Creates a context with the specified request ID.
    #[must_use]
    pub fn with_request_id(request_id: RequestId) -> Self {
        Self {
            request_id,
            stage: Stage::Received,
            route: None,
            route_name: None,
            started_at: Instant::now(),
        }
    }

    /// Returns the request ID.
    #[must_use]
    pub const fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Replaces the request ID, e.g. with one propagated by an upstream
    /// service.
    pub fn set_request_id(&mut self, request_id: RequestId) {
        self.request_id = request_id;
    }

    /// Returns the current stage.
    #[must_use]
    pub const fn stage(&self) -> Stage {
        self.stage
    }

    /// Moves the request to a new stage.
    pub fn set_stage(&mut self, stage: Stage) {
        self.stage = stage;
    }

    /// The pattern of the matched route.
    #[must_use]
    pub fn route(&self) -> Option<&str> {
        self.route.as_deref()
    }

    /// The name of the matched route.
    #[must_use]
    pub fn route_name(&self) -> Option<&str> {
        self.route_name.as_deref()
    }

    /// Records the matched route.
    pub fn set_route(&mut self, pattern: impl Into<String>, name: Option<&str>) {
        self.route = Some(pattern.into());
        self.route_name = name.map(str::to_string);
    }

    /// Returns the elapsed time since the request started.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_id_new_generates_unique_ids() {
        let id1 = RequestId::new();
        let id2 = RequestId::new();
        assert_ne!(id1, id2, "Each RequestId should be unique");
    }

    #[test]
    fn test_request_id_is_v7() {
        let id = RequestId::new();
        assert_eq!(id.as_uuid().get_version_num(), 7);
    }

    #[test]
    fn test_request_id_serialization() {
        let id = RequestId::new();
        let json = serde_json::to_string(&id).expect("serialization should work");
        let parsed: RequestId = serde_json::from_str(&json).expect("deserialization should work");
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_context_starts_received() {
        let ctx = RequestContext::new();
        assert_eq!(ctx.stage(), Stage::Received);
        assert!(ctx.route().is_none());
        assert!(ctx.route_name().is_none());
    }

    #[test]
    fn test_context_route() {
        let mut ctx = RequestContext::new();
        ctx.set_route("/a/<id>", None);
        assert_eq!(ctx.route(), Some("/a/<id>"));
        assert!(ctx.route_name().is_none());
    }

    #[test]
    fn test_stage_names() {
        assert_eq!(Stage::PreRoute.name(), "pre_route");
        assert_eq!(Stage::PostHandler.to_string(), "post_handler");
        assert_eq!(serde_json::to_string(&Stage::PreHandler).unwrap(), "\"pre_handler\"");
    }

    #[test]
    fn test_request_context_elapsed() {
        let ctx = RequestContext::new();
        std::thread::sleep(Duration::from_millis(10));
        assert!(ctx.elapsed() >= Duration::from_millis(10));
    }
}
