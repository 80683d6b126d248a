//! Views and their route bindings.
//!
//! A [`View`] is the request handler plus three optional hooks scoped to it:
//!
//! ```text
//! before_handler ─→ handle ─→ after_handler
//!        └────────────┴────────────┴──→ on_exception (application errors only)
//! ```
//!
//! A [`ViewBinding`] attaches a view to a path pattern and a set of methods.

use std::fmt;
use std::sync::Arc;

use http::Method;
use sextant_core::{Error, HttpError, Request, Response};
use sextant_middleware::Flow;

/// What a view's `on_exception` hook decided.
#[derive(Debug)]
pub enum Recovery {
    /// The error was turned into a response. The response is final: it
    /// skips the view's and the middlewares' after-hooks.
    Handled(Response),
    /// Hand the error to the dispatcher.
    Propagate(Error),
    /// The hook could not produce a response. This is a fault.
    Unhandled,
}

impl From<Response> for Recovery {
    fn from(response: Response) -> Self {
        Self::Handled(response)
    }
}

/// A request handler with optional scoped hooks.
///
/// # Example
///
/// ```
/// use sextant::{Recovery, View};
/// use sextant_core::{Error, HttpError, Request, Response};
///
/// struct GetUser;
///
/// impl View for GetUser {
///     fn handle(&self, request: &mut Request) -> Result<Response, Error> {
///         let id = request.params().get_int("id").unwrap_or_default();
///         Response::json(&serde_json::json!({ "id": id }))
///     }
///
///     fn on_exception(&self, _request: &Request, error: HttpError) -> Recovery {
///         Recovery::Propagate(error.into())
///     }
/// }
/// ```
pub trait View: Send + Sync + 'static {
    /// Runs before the handler; may short-circuit with a response.
    fn before_handler(&self, request: &mut Request) -> Result<Flow, Error> {
        let _ = request;
        Ok(Flow::Continue)
    }

    /// Produces the response.
    fn handle(&self, request: &mut Request) -> Result<Response, Error>;

    /// Runs after the handler and may mutate its response.
    fn after_handler(&self, request: &Request, response: &mut Response) -> Result<(), Error> {
        let _ = (request, response);
        Ok(())
    }

    /// Called with any application error raised by the three hooks above.
    ///
    /// Faults never reach this hook. The default hands the error back to
    /// the dispatcher.
    fn on_exception(&self, request: &Request, error: HttpError) -> Recovery {
        let _ = request;
        Recovery::Propagate(error.into())
    }
}

/// A view made from a single handler closure.
pub struct FnView<F> {
    handler: F,
}

impl<F> View for FnView<F>
where
    F: Fn(&mut Request) -> Result<Response, Error> + Send + Sync + 'static,
{
    fn handle(&self, request: &mut Request) -> Result<Response, Error> {
        (self.handler)(request)
    }
}

/// A view attached to a pattern, a set of methods and an optional name.
///
/// # Example
///
/// ```
/// use sextant::ViewBinding;
/// use sextant_core::Response;
/// use http::Method;
///
/// let binding = ViewBinding::handler("/ping", |_req| Ok(Response::text("pong")))
///     .method(Method::GET)
///     .name("ping");
///
/// assert_eq!(binding.pattern(), "/ping");
/// assert_eq!(binding.methods_declared(), &[Method::GET]);
/// ```
#[derive(Clone)]
pub struct ViewBinding {
    pattern: String,
    methods: Vec<Method>,
    name: Option<String>,
    view: Arc<dyn View>,
}

impl ViewBinding {
    /// Binds `view` to `pattern`. Add methods with [`method`](Self::method).
    #[must_use]
    pub fn new(pattern: impl Into<String>, view: impl View) -> Self {
        Self::from_arc(pattern, Arc::new(view))
    }

    /// Binds a shared view.
    #[must_use]
    pub fn from_arc(pattern: impl Into<String>, view: Arc<dyn View>) -> Self {
        Self {
            pattern: pattern.into(),
            methods: Vec::new(),
            name: None,
            view,
        }
    }

    /// Binds a handler closure with no hooks.
    #[must_use]
    pub fn handler<F>(pattern: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&mut Request) -> Result<Response, Error> + Send + Sync + 'static,
    {
        Self::new(pattern, FnView { handler })
    }

    /// Adds a method.
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        if !self.methods.contains(&method) {
            self.methods.push(method);
        }
        self
    }

    /// Adds several methods.
    #[must_use]
    pub fn methods(mut self, methods: impl IntoIterator<Item = Method>) -> Self {
        for method in methods {
            self = self.method(method);
        }
        self
    }

    /// Names the binding for [`url_for`](crate::Registry::url_for).
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// The raw pattern.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// The declared methods.
    #[must_use]
    pub fn methods_declared(&self) -> &[Method] {
        &self.methods
    }

    /// The route name.
    #[must_use]
    pub fn route_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The bound view.
    #[must_use]
    pub fn view(&self) -> &Arc<dyn View> {
        &self.view
    }

    pub(crate) fn into_route(self) -> sextant_router::Route<Arc<dyn View>> {
        let route = sextant_router::Route::new(self.pattern, self.view).methods(self.methods);
        match self.name {
            Some(name) => route.name(name),
            None => route,
        }
    }
}

impl fmt::Debug for ViewBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewBinding")
            .field("pattern", &self.pattern)
            .field("methods", &self.methods)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
