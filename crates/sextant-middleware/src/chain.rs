//! Ordered middleware chain.
//!
//! Hooks run in registration order at every stage. Post-handler hooks are
//! not reversed: given `[m1, m2]`, both `before_route` and `after_handler`
//! run `m1` then `m2`.

use std::sync::Arc;

use sextant_core::{Error, Request, Response};

use crate::middleware::{Flow, Middleware};

/// A shared, type-erased middleware.
pub type BoxedMiddleware = Arc<dyn Middleware>;

/// The ordered list of middleware a dispatcher runs.
///
/// # Example
///
/// ```
/// use sextant_middleware::{FnMiddleware, MiddlewareChain};
///
/// let mut chain = MiddlewareChain::new();
/// chain.push(FnMiddleware::new("first"));
/// chain.push(FnMiddleware::new("second"));
///
/// assert_eq!(chain.names(), vec!["first", "second"]);
/// ```
#[derive(Clone, Default)]
pub struct MiddlewareChain {
    middlewares: Vec<BoxedMiddleware>,
}

impl MiddlewareChain {
    /// Creates an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a middleware.
    pub fn push(&mut self, middleware: impl Middleware) {
        self.middlewares.push(Arc::new(middleware));
    }

    /// Appends an already shared middleware.
    pub fn push_arc(&mut self, middleware: BoxedMiddleware) {
        self.middlewares.push(middleware);
    }

    /// Appends every middleware of `other`, keeping their order.
    pub fn extend(&mut self, other: &Self) {
        self.middlewares.extend(other.middlewares.iter().cloned());
    }

    /// Names in registration order.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.middlewares.iter().map(|m| m.name()).collect()
    }

    /// Number of middlewares.
    #[must_use]
    pub fn len(&self) -> usize {
        self.middlewares.len()
    }

    /// Returns true if the chain is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.middlewares.is_empty()
    }

    /// Runs every `before_route` hook, stopping at the first response.
    pub fn before_route(&self, request: &mut Request) -> Result<Flow, Error> {
        self.run_pre(request, "before_route", |m, req| m.before_route(req))
    }

    /// Runs every `before_handler` hook, stopping at the first response.
    pub fn before_handler(&self, request: &mut Request) -> Result<Flow, Error> {
        self.run_pre(request, "before_handler", |m, req| m.before_handler(req))
    }

    /// Runs every `after_handler` hook.
    pub fn after_handler(&self, request: &Request, response: &mut Response) -> Result<(), Error> {
        for middleware in &self.middlewares {
            middleware.after_handler(request, response)?;
        }
        Ok(())
    }

    fn run_pre<F>(&self, request: &mut Request, hook: &'static str, run: F) -> Result<Flow, Error>
    where
        F: Fn(&dyn Middleware, &mut Request) -> Result<Flow, Error>,
    {
        for middleware in &self.middlewares {
            if let Flow::Respond(response) = run(middleware.as_ref(), request)? {
                tracing::debug!(
                    middleware = middleware.name(),
                    hook,
                    status = response.status().as_u16(),
                    "middleware short-circuited request"
                );
                return Ok(Flow::Respond(response));
            }
        }
        Ok(Flow::Continue)
    }
}

impl std::fmt::Debug for MiddlewareChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MiddlewareChain")
            .field("middlewares", &self.names())
            .finish()
    }
}
