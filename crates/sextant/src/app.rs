//! The application and its dispatch state machine.
//!
//! ```text
//! Received → PreRoute → Routed → PreHandler → Handling → PostHandler → Complete
//!     │          │         │          │           │            │
//!     └──────────┴─────────┴──── Error ┴───────────┴────────────┘
//! ```
//!
//! Any stage may end the request early: a short-circuit response from a
//! pre-hook goes straight to `Complete`, and an error goes to `Error`,
//! which renders it and then completes.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use http::{Method, StatusCode};
use sextant_core::{
    status, Body, Error, Fault, FinalizedResponse, RawRequest, Request, Response, Settings, Stage,
    StaticSettings, TEXT_PLAIN,
};
use sextant_middleware::{BodyLimit, Flow, Middleware};
use sextant_router::{ParamType, RouteResult};

use crate::registry::Registry;
use crate::render;
use crate::unwind;
use crate::view::{Recovery, View, ViewBinding};

/// How the view stage ended.
enum ViewOutcome {
    /// Continue to the middleware post-hooks.
    Handled(Response),
    /// Send as is, skipping every remaining hook.
    Final(Response),
}

/// A bootstrapped application.
///
/// `App` is immutable and `Send + Sync`; share it between worker threads and
/// call [`dispatch`](Self::dispatch) once per request.
///
/// # Example
///
/// ```
/// use sextant::{App, ViewBinding};
/// use sextant_core::{RawRequest, Response};
/// use http::Method;
///
/// let app = App::builder()
///     .route(
///         ViewBinding::handler("/hello/<name>", |req| {
///             let name = req.params().get_str("name").unwrap_or("world").to_string();
///             Ok(Response::text(format!("hello {name}")))
///         })
///         .method(Method::GET),
///     )
///     .bootstrap()
///     .unwrap();
///
/// let response = app.dispatch(RawRequest::new(Method::GET, "/hello/ada"));
/// assert_eq!(response.status_line, "200 OK");
/// assert_eq!(response.into_bytes().unwrap().as_ref(), b"hello ada");
/// ```
pub struct App {
    registry: Registry,
    settings: Arc<dyn Settings>,
    body_limit: BodyLimit,
}

impl App {
    /// Starts building an application.
    #[must_use]
    pub fn builder() -> AppBuilder {
        AppBuilder::new()
    }

    /// Freezes `registry` and wraps it in an application.
    ///
    /// The resolution cache is sized from
    /// [`Settings::route_cache_capacity`].
    #[must_use]
    pub fn bootstrap(mut registry: Registry, settings: Arc<dyn Settings>) -> Self {
        unwind::install_hook();
        registry
            .router_mut()
            .set_cache_capacity(settings.route_cache_capacity());
        registry.freeze();

        tracing::info!(
            routes = registry.len(),
            endpoints = registry.router().endpoint_count(),
            middlewares = ?registry.middlewares().names(),
            debug = settings.debug(),
            "application bootstrapped"
        );

        Self {
            registry,
            settings,
            body_limit: BodyLimit,
        }
    }

    /// The frozen registry.
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The settings in use.
    #[must_use]
    pub fn settings(&self) -> &dyn Settings {
        self.settings.as_ref()
    }

    /// Handles one request.
    ///
    /// Never fails and never panics: routing failures, application errors,
    /// faults and panics inside user code all become responses.
    pub fn dispatch(&self, raw: RawRequest) -> FinalizedResponse {
        let mut request = Request::new(raw, self.settings.max_body_size());
        let is_head = request.method() == Method::HEAD;

        let span = tracing::info_span!(
            "request",
            request_id = %request.request_id(),
            http.method = %request.method(),
            http.path = request.path(),
            route = tracing::field::Empty,
            stage = tracing::field::Empty,
            http.status_code = tracing::field::Empty,
        );
        let _entered = span.enter();

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.process(&mut request)));
        let response = match outcome {
            Ok(Ok(response)) => response,
            Ok(Err(err)) => self.fail(&mut request, &err),
            Err(payload) => {
                let err = Error::Fault(unwind::panic_fault(payload.as_ref()));
                self.fail(&mut request, &err)
            }
        };

        let mut finalized = match response.finalize() {
            Ok(finalized) => finalized,
            Err(fault) => self.finalize_fault(&mut request, fault),
        };
        if is_head {
            finalized.strip_body();
        }

        request.context_mut().set_stage(Stage::Complete);
        if let Some(route) = request.context().route() {
            span.record("route", route);
        }
        span.record("stage", Stage::Complete.name());
        span.record("http.status_code", finalized.status.as_u16());
        sextant_telemetry::log_request_complete!(
            request.request_id(),
            finalized.status.as_u16(),
            u64::try_from(request.context().elapsed().as_millis()).unwrap_or(u64::MAX)
        );

        finalized
    }

    fn process(&self, request: &mut Request) -> Result<Response, Error> {
        request.context_mut().set_stage(Stage::PreRoute);
        let middlewares = self.registry.middlewares();
        if let Flow::Respond(response) = middlewares.before_route(request)? {
            return Ok(response);
        }

        let found = self
            .registry
            .resolve(request.method(), request.path())
            .map_err(|err| {
                tracing::debug!(error = %err, "route resolution failed");
                render::resolve_error(&err)
            })?;
        request.context_mut().set_stage(Stage::Routed);
        request
            .context_mut()
            .set_route(found.pattern(), found.name());
        request.set_params(found.params.clone());
        tracing::debug!(route = found.pattern(), "route resolved");

        request.context_mut().set_stage(Stage::PreHandler);
        if let Flow::Respond(response) = self.body_limit.before_handler(request)? {
            return Ok(response);
        }
        if let Flow::Respond(response) = middlewares.before_handler(request)? {
            return Ok(response);
        }

        request.context_mut().set_stage(Stage::Handling);
        let mut response = match run_view(found.value().as_ref(), request)? {
            ViewOutcome::Handled(response) => response,
            ViewOutcome::Final(response) => return Ok(response),
        };

        request.context_mut().set_stage(Stage::PostHandler);
        middlewares.after_handler(request, &mut response)?;
        Ok(response)
    }

    fn fail(&self, request: &mut Request, err: &Error) -> Response {
        let response = render::error_response(request, err, self.settings.debug());
        request.context_mut().set_stage(Stage::Error);
        response
    }

    /// A response that cannot be finalized is itself a fault; its 500
    /// rendering always finalizes.
    fn finalize_fault(&self, request: &mut Request, fault: Fault) -> FinalizedResponse {
        let err = Error::Fault(fault);
        match self.fail(request, &err).finalize() {
            Ok(finalized) => finalized,
            Err(_) => FinalizedResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                status_line: "500 Internal Server Error".to_string(),
                headers: vec![
                    ("content-type".to_string(), TEXT_PLAIN.to_string()),
                    ("content-length".to_string(), "0".to_string()),
                ],
                body: Body::Empty,
            },
        }
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("registry", &self.registry)
            .field("debug", &self.settings.debug())
            .field("max_body_size", &self.settings.max_body_size())
            .finish_non_exhaustive()
    }
}

/// Runs the view hooks with localized recovery of application errors.
fn run_view(view: &dyn View, request: &mut Request) -> Result<ViewOutcome, Error> {
    let attempt = (|| {
        if let Flow::Respond(response) = view.before_handler(request)? {
            tracing::debug!("view short-circuited request");
            return Ok(ViewOutcome::Final(response));
        }
        let mut response = view.handle(request)?;
        let code = response.status().as_u16();
        if !status::is_registered(code) {
            return Err(Fault::HandlerContract(format!(
                "handler returned unregistered status code {code}"
            ))
            .into());
        }
        view.after_handler(request, &mut response)?;
        Ok(ViewOutcome::Handled(response))
    })();

    match attempt {
        Err(Error::Http(err)) => match view.on_exception(request, err) {
            Recovery::Handled(response) => Ok(ViewOutcome::Final(response)),
            Recovery::Propagate(err) => Err(err),
            Recovery::Unhandled => Err(Fault::ExceptionHandlerContract.into()),
        },
        other => other,
    }
}

enum Pending {
    Type(String, Arc<dyn ParamType>, bool),
    Route(ViewBinding),
    Registry(Registry),
}

/// Builder for an [`App`].
///
/// Registration is deferred: every configuration error surfaces from
/// [`bootstrap`](Self::bootstrap), in registration order.
#[derive(Default)]
pub struct AppBuilder {
    pending: Vec<Pending>,
    middlewares: Vec<Arc<dyn Middleware>>,
    settings: Option<Arc<dyn Settings>>,
}

impl AppBuilder {
    /// Creates an empty builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses these settings instead of [`StaticSettings::default`].
    #[must_use]
    pub fn settings(mut self, settings: impl Settings + 'static) -> Self {
        self.settings = Some(Arc::new(settings));
        self
    }

    /// Uses shared settings.
    #[must_use]
    pub fn shared_settings(mut self, settings: Arc<dyn Settings>) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Registers a parameter type.
    #[must_use]
    pub fn param_type(
        mut self,
        name: impl Into<String>,
        ty: impl ParamType,
        allow_replace: bool,
    ) -> Self {
        self.pending
            .push(Pending::Type(name.into(), Arc::new(ty), allow_replace));
        self
    }

    /// Adds a view binding.
    #[must_use]
    pub fn route(mut self, binding: ViewBinding) -> Self {
        self.pending.push(Pending::Route(binding));
        self
    }

    /// Adds several view bindings.
    #[must_use]
    pub fn routes(mut self, bindings: impl IntoIterator<Item = ViewBinding>) -> Self {
        self.pending
            .extend(bindings.into_iter().map(Pending::Route));
        self
    }

    /// Appends a middleware.
    #[must_use]
    pub fn middleware(mut self, middleware: impl Middleware) -> Self {
        self.middlewares.push(Arc::new(middleware));
        self
    }

    /// Merges a prepared registry.
    #[must_use]
    pub fn registry(mut self, registry: Registry) -> Self {
        self.pending.push(Pending::Registry(registry));
        self
    }

    /// Registers everything and freezes the result.
    ///
    /// Fails with the first [`RouteError`](sextant_router::RouteError), such
    /// as a duplicate route or an unknown parameter type.
    pub fn bootstrap(self) -> RouteResult<App> {
        let mut registry = Registry::new();
        for pending in self.pending {
            match pending {
                Pending::Type(name, ty, allow_replace) => {
                    registry.register_type_arc(name, ty, allow_replace)?;
                }
                Pending::Route(binding) => registry.add_route(binding)?,
                Pending::Registry(other) => registry.merge(other)?,
            }
        }
        for middleware in self.middlewares {
            registry.add_shared_middleware(middleware)?;
        }

        let settings = self
            .settings
            .unwrap_or_else(|| Arc::new(StaticSettings::default()));
        Ok(App::bootstrap(registry, settings))
    }
}

impl std::fmt::Debug for AppBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppBuilder")
            .field("pending", &self.pending.len())
            .field("middlewares", &self.middlewares.len())
            .finish_non_exhaustive()
    }
}
