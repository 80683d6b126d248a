//! The route and middleware registry.

use std::sync::Arc;

use http::Method;
use sextant_middleware::{Middleware, MiddlewareChain};
use sextant_router::{
    ParamType, ParamTypes, ParamValue, ResolveError, RouteError, RouteMatch, RouteResult, Router,
};

use crate::view::{View, ViewBinding};

/// A resolved view and its typed parameters.
pub type ViewMatch = RouteMatch<Arc<dyn View>>;

/// Owns the route trie, the parameter types and the middleware list.
///
/// A registry is mutable until [`freeze`](Self::freeze), which
/// [`App::bootstrap`](crate::App::bootstrap) calls. After that every
/// mutation fails with [`RouteError::Frozen`].
///
/// # Example
///
/// ```
/// use sextant::{Registry, ViewBinding};
/// use sextant_core::Response;
/// use http::Method;
///
/// let mut registry = Registry::new();
/// registry
///     .add_route(
///         ViewBinding::handler("/users/<id:int>", |_req| Ok(Response::text("user")))
///             .method(Method::GET)
///             .name("user"),
///     )
///     .unwrap();
///
/// assert_eq!(registry.url_for("user", [("id", 7_i64)]).unwrap(), "/users/7");
/// let found = registry.resolve(&Method::GET, "/users/7").unwrap();
/// assert_eq!(found.params.get_int("id"), Some(7));
/// ```
#[derive(Debug, Default)]
pub struct Registry {
    router: Router<Arc<dyn View>>,
    middlewares: MiddlewareChain,
}

impl Registry {
    /// Creates a registry with the built-in parameter types.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with a custom parameter type set.
    #[must_use]
    pub fn with_types(types: ParamTypes) -> Self {
        Self {
            router: Router::with_types(types),
            middlewares: MiddlewareChain::new(),
        }
    }

    /// Registers a parameter type.
    pub fn register_type(
        &mut self,
        name: impl Into<String>,
        ty: impl ParamType,
        allow_replace: bool,
    ) -> RouteResult<()> {
        self.router.register_type(name, ty, allow_replace)
    }

    /// Registers a shared parameter type.
    pub fn register_type_arc(
        &mut self,
        name: impl Into<String>,
        ty: Arc<dyn ParamType>,
        allow_replace: bool,
    ) -> RouteResult<()> {
        self.router.register_type_arc(name, ty, allow_replace)
    }

    /// Adds a view binding. Conflicts are rejected, never overwritten.
    pub fn add_route(&mut self, binding: ViewBinding) -> RouteResult<()> {
        self.router.add(binding.into_route())?;
        Ok(())
    }

    /// Appends a middleware.
    pub fn add_middleware(&mut self, middleware: impl Middleware) -> RouteResult<()> {
        self.ensure_mutable()?;
        self.middlewares.push(middleware);
        Ok(())
    }

    /// Appends a shared middleware.
    pub fn add_shared_middleware(&mut self, middleware: Arc<dyn Middleware>) -> RouteResult<()> {
        self.ensure_mutable()?;
        self.middlewares.push_arc(middleware);
        Ok(())
    }

    /// Moves the routes, types and middlewares of `other` into this
    /// registry. `other`'s middlewares run after this registry's.
    pub fn merge(&mut self, other: Registry) -> RouteResult<()> {
        self.ensure_mutable()?;
        self.router.merge(other.router)?;
        self.middlewares.extend(&other.middlewares);
        Ok(())
    }

    /// Resolves a method and path.
    pub fn resolve(&self, method: &Method, path: &str) -> Result<ViewMatch, ResolveError> {
        self.router.resolve(method, path)
    }

    /// Builds the URL of a named route.
    pub fn url_for<I, K, V>(&self, name: &str, values: I) -> RouteResult<String>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<ParamValue>,
    {
        self.router.url_for(name, values)
    }

    /// Ends the registration phase.
    pub fn freeze(&mut self) {
        self.router.freeze();
    }

    /// Returns true once frozen.
    #[must_use]
    pub fn is_frozen(&self) -> bool {
        self.router.is_frozen()
    }

    /// The route trie.
    #[must_use]
    pub fn router(&self) -> &Router<Arc<dyn View>> {
        &self.router
    }

    pub(crate) fn router_mut(&mut self) -> &mut Router<Arc<dyn View>> {
        &mut self.router
    }

    /// The middlewares, in registration order.
    #[must_use]
    pub fn middlewares(&self) -> &MiddlewareChain {
        &self.middlewares
    }

    /// Number of registered view bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.router.len()
    }

    /// Returns true if no view is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.router.is_empty()
    }

    fn ensure_mutable(&self) -> RouteResult<()> {
        if self.is_frozen() {
            Err(RouteError::Frozen)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sextant_core::Response;
    use sextant_middleware::FnMiddleware;

    fn ping() -> ViewBinding {
        ViewBinding::handler("/ping", |_req| Ok(Response::text("pong"))).method(Method::GET)
    }

    #[test]
    fn test_duplicate_route_is_rejected() {
        let mut registry = Registry::new();
        registry.add_route(ping()).unwrap();

        let err = registry.add_route(ping()).unwrap_err();
        assert!(matches!(err, RouteError::RouteConflict { .. }));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_methods_on_same_pattern_merge() {
        let mut registry = Registry::new();
        registry.add_route(ping()).unwrap();
        registry
            .add_route(
                ViewBinding::handler("/ping", |_req| Ok(Response::text("posted")))
                    .method(Method::POST),
            )
            .unwrap();

        assert!(registry.resolve(&Method::GET, "/ping").is_ok());
        assert!(registry.resolve(&Method::POST, "/ping").is_ok());
    }

    #[test]
    fn test_frozen_rejects_everything() {
        let mut registry = Registry::new();
        registry.freeze();

        assert_eq!(registry.add_route(ping()), Err(RouteError::Frozen));
        assert_eq!(
            registry.add_middleware(FnMiddleware::new("late")),
            Err(RouteError::Frozen)
        );
        assert_eq!(
            registry.register_type("hex", sextant_router::SlugType, false),
            Err(RouteError::Frozen)
        );
        assert_eq!(registry.merge(Registry::new()), Err(RouteError::Frozen));
    }

    #[test]
    fn test_merge_combines_routes_and_middlewares() {
        let mut left = Registry::new();
        left.add_route(ping()).unwrap();
        left.add_middleware(FnMiddleware::new("left")).unwrap();

        let mut right = Registry::new();
        right
            .add_route(
                ViewBinding::handler("/health", |_req| Ok(Response::text("ok")))
                    .method(Method::GET),
            )
            .unwrap();
        right.add_middleware(FnMiddleware::new("right")).unwrap();

        left.merge(right).unwrap();
        assert_eq!(left.len(), 2);
        assert_eq!(left.middlewares().names(), vec!["left", "right"]);
        assert!(left.resolve(&Method::GET, "/health").is_ok());
    }

    #[test]
    fn test_merge_conflict_leaves_registry_unchanged() {
        let mut left = Registry::new();
        left.add_route(ping()).unwrap();

        let mut right = Registry::new();
        right.add_route(ping()).unwrap();
        right.add_middleware(FnMiddleware::new("right")).unwrap();

        assert!(left.merge(right).is_err());
        assert_eq!(left.len(), 1);
        assert!(left.middlewares().is_empty());
    }
}
