//! The middleware hook trait.
//!
//! A middleware has three optional hooks. The dispatcher calls them on every
//! registered middleware in registration order:
//!
//! ```text
//! before_route ─→ (routing) ─→ before_handler ─→ (view) ─→ after_handler
//! ```
//!
//! `before_route` and `before_handler` may short-circuit the request by
//! returning [`Flow::Respond`]. `after_handler` may mutate the response but
//! cannot replace it.

use sextant_core::{Error, Request, Response};

/// Outcome of a pre-handler hook.
#[derive(Debug)]
pub enum Flow {
    /// Keep going.
    Continue,
    /// Stop and send this response.
    Respond(Response),
}

impl Flow {
    /// Returns true for [`Flow::Continue`].
    #[must_use]
    pub fn is_continue(&self) -> bool {
        matches!(self, Self::Continue)
    }

    /// The short-circuit response, if any.
    #[must_use]
    pub fn into_response(self) -> Option<Response> {
        match self {
            Self::Continue => None,
            Self::Respond(response) => Some(response),
        }
    }
}

impl From<Response> for Flow {
    fn from(response: Response) -> Self {
        Self::Respond(response)
    }
}

/// A set of request lifecycle hooks.
///
/// Every hook has a default that does nothing, so implementations only
/// override what they need.
///
/// # Example
///
/// ```
/// use sextant_core::{Error, Request, Response};
/// use sextant_middleware::{Flow, Middleware};
/// use http::header::{HeaderName, HeaderValue};
///
/// struct PoweredBy;
///
/// impl Middleware for PoweredBy {
///     fn name(&self) -> &'static str {
///         "powered_by"
///     }
///
///     fn after_handler(&self, _request: &Request, response: &mut Response) -> Result<(), Error> {
///         response.headers_mut().insert(
///             HeaderName::from_static("x-powered-by"),
///             HeaderValue::from_static("sextant"),
///         );
///         Ok(())
///     }
/// }
/// ```
pub trait Middleware: Send + Sync + 'static {
    /// Name used in logs.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Runs before the route is resolved. Path parameters are not yet set.
    fn before_route(&self, request: &mut Request) -> Result<Flow, Error> {
        let _ = request;
        Ok(Flow::Continue)
    }

    /// Runs after routing, before the view.
    fn before_handler(&self, request: &mut Request) -> Result<Flow, Error> {
        let _ = request;
        Ok(Flow::Continue)
    }

    /// Runs after the view produced a response.
    fn after_handler(&self, request: &Request, response: &mut Response) -> Result<(), Error> {
        let _ = (request, response);
        Ok(())
    }
}

type PreHook = Box<dyn Fn(&mut Request) -> Result<Flow, Error> + Send + Sync>;
type PostHook = Box<dyn Fn(&Request, &mut Response) -> Result<(), Error> + Send + Sync>;

/// A middleware assembled from closures.
///
/// # Example
///
/// ```
/// use sextant_core::Response;
/// use sextant_middleware::{Flow, FnMiddleware};
///
/// let maintenance = FnMiddleware::new("maintenance")
///     .on_before_route(|_req| Ok(Flow::Respond(Response::text("down for maintenance"))));
/// ```
pub struct FnMiddleware {
    name: &'static str,
    before_route: Option<PreHook>,
    before_handler: Option<PreHook>,
    after_handler: Option<PostHook>,
}

impl FnMiddleware {
    /// Creates a middleware with no hooks.
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            before_route: None,
            before_handler: None,
            after_handler: None,
        }
    }

    /// Sets the `before_route` hook.
    #[must_use]
    pub fn on_before_route<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut Request) -> Result<Flow, Error> + Send + Sync + 'static,
    {
        self.before_route = Some(Box::new(f));
        self
    }

    /// Sets the `before_handler` hook.
    #[must_use]
    pub fn on_before_handler<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut Request) -> Result<Flow, Error> + Send + Sync + 'static,
    {
        self.before_handler = Some(Box::new(f));
        self
    }

    /// Sets the `after_handler` hook.
    #[must_use]
    pub fn on_after_handler<F>(mut self, f: F) -> Self
    where
        F: Fn(&Request, &mut Response) -> Result<(), Error> + Send + Sync + 'static,
    {
        self.after_handler = Some(Box::new(f));
        self
    }
}

impl std::fmt::Debug for FnMiddleware {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnMiddleware")
            .field("name", &self.name)
            .field("before_route", &self.before_route.is_some())
            .field("before_handler", &self.before_handler.is_some())
            .field("after_handler", &self.after_handler.is_some())
            .finish()
    }
}

impl Middleware for FnMiddleware {
    fn name(&self) -> &'static str {
        self.name
    }

    fn before_route(&self, request: &mut Request) -> Result<Flow, Error> {
        self.before_route
            .as_ref()
            .map_or(Ok(Flow::Continue), |hook| hook(request))
    }

    fn before_handler(&self, request: &mut Request) -> Result<Flow, Error> {
        self.before_handler
            .as_ref()
            .map_or(Ok(Flow::Continue), |hook| hook(request))
    }

    fn after_handler(&self, request: &Request, response: &mut Response) -> Result<(), Error> {
        self.after_handler
            .as_ref()
            .map_or(Ok(()), |hook| hook(request, response))
    }
}
