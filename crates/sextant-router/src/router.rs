//! High-level router API.
//!
//! This module provides the main [`Router`] struct: route registration,
//! resolution, reverse URL lookup and the freeze step that ends the
//! registration phase.

use std::fmt;
use std::sync::Arc;

use http::Method;
use indexmap::IndexMap;

use crate::cache::ResolveCache;
use crate::error::{ResolveError, RouteError, RouteResult};
use crate::node::{split_path, Node};
use crate::params::Params;
use crate::pattern::RoutePattern;
use crate::route::{Route, RouteEntry};
use crate::types::{ParamType, ParamTypes, ParamValue};
use crate::RouteMatch;

/// Default number of resolutions kept in the cache.
pub const DEFAULT_CACHE_CAPACITY: usize = 1024;

/// A segment-trie router with typed path parameters.
///
/// # Example
///
/// ```rust
/// use sextant_router::{Route, Router, ResolveError};
/// use http::Method;
///
/// let mut router = Router::new();
/// router.add(Route::new("/users", "list").method(Method::GET)).unwrap();
/// router.add(Route::new("/users/<id:int>", "show").method(Method::GET)).unwrap();
/// router.freeze();
///
/// let found = router.resolve(&Method::GET, "/users/42").unwrap();
/// assert_eq!(*found.value(), "show");
/// assert_eq!(found.params.get_int("id"), Some(42));
///
/// let err = router.resolve(&Method::POST, "/users").unwrap_err();
/// assert!(matches!(err, ResolveError::MethodNotAllowed { .. }));
/// ```
///
/// # Route Priority
///
/// At each depth a static segment is preferred over parameter segments.
/// Parameter segments are tried in the order their types were first used at
/// that depth. If the preferred branch cannot reach a route, the next
/// candidate is tried.
pub struct Router<T> {
    types: ParamTypes,
    root: Node<T>,
    entries: Vec<Arc<RouteEntry<T>>>,
    names: IndexMap<String, Arc<RouteEntry<T>>>,
    frozen: bool,
    cache: ResolveCache<T>,
}

impl<T> Default for Router<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Router<T> {
    /// Creates an empty router with the built-in parameter types.
    #[must_use]
    pub fn new() -> Self {
        Self::with_types(ParamTypes::new())
    }

    /// Creates an empty router using the given type registry.
    #[must_use]
    pub fn with_types(types: ParamTypes) -> Self {
        Self {
            types,
            root: Node::root(),
            entries: Vec::new(),
            names: IndexMap::new(),
            frozen: false,
            cache: ResolveCache::new(DEFAULT_CACHE_CAPACITY),
        }
    }

    /// Sets the resolution cache capacity. Zero disables caching.
    #[must_use]
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.set_cache_capacity(capacity);
        self
    }

    /// Sets the resolution cache capacity, dropping cached entries.
    pub fn set_cache_capacity(&mut self, capacity: usize) {
        self.cache = ResolveCache::new(capacity);
    }

    /// The resolution cache capacity.
    #[must_use]
    pub fn cache_capacity(&self) -> usize {
        self.cache.capacity()
    }

    /// Number of cached resolutions.
    #[must_use]
    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    /// The parameter type registry.
    #[must_use]
    pub fn types(&self) -> &ParamTypes {
        &self.types
    }

    /// Registers a parameter type.
    pub fn register_type(
        &mut self,
        name: impl Into<String>,
        ty: impl ParamType,
        allow_replace: bool,
    ) -> RouteResult<()> {
        self.ensure_mutable()?;
        self.types.register(name, ty, allow_replace)
    }

    /// Registers an already shared parameter type.
    pub fn register_type_arc(
        &mut self,
        name: impl Into<String>,
        ty: Arc<dyn ParamType>,
        allow_replace: bool,
    ) -> RouteResult<()> {
        self.ensure_mutable()?;
        self.types.register_arc(name, ty, allow_replace)
    }

    /// Adds a route.
    ///
    /// The route table is left unchanged when this fails.
    pub fn add(&mut self, route: Route<T>) -> RouteResult<Arc<RouteEntry<T>>> {
        self.ensure_mutable()?;

        let pattern = RoutePattern::parse(route.pattern())?;
        if route.declared_methods().is_empty() {
            return Err(RouteError::invalid_pattern(
                pattern.as_str(),
                "route must declare at least one method",
            ));
        }

        let entry = Arc::new(route.into_entry(pattern));
        let mut root = self.root.clone();
        let mut names = self.names.clone();
        Self::insert_entry(&mut root, &mut names, &self.types, &entry)?;

        self.root = root;
        self.names = names;
        self.entries.push(Arc::clone(&entry));
        self.cache.clear();

        tracing::debug!(
            route = entry.pattern().as_str(),
            methods = ?entry.methods(),
            "route registered"
        );
        Ok(entry)
    }

    /// Moves every route of `other` into this router.
    ///
    /// Parameter types of `other` that are not registered here are copied
    /// over first. Either every route is merged or none is.
    pub fn merge(&mut self, other: Router<T>) -> RouteResult<()> {
        self.ensure_mutable()?;

        let mut types = self.types.clone();
        types.absorb(&other.types);

        let mut root = self.root.clone();
        let mut names = self.names.clone();
        for entry in &other.entries {
            Self::insert_entry(&mut root, &mut names, &types, entry)?;
        }

        self.types = types;
        self.root = root;
        self.names = names;
        self.entries.extend(other.entries);
        self.cache.clear();
        Ok(())
    }

    fn insert_entry(
        root: &mut Node<T>,
        names: &mut IndexMap<String, Arc<RouteEntry<T>>>,
        types: &ParamTypes,
        entry: &Arc<RouteEntry<T>>,
    ) -> RouteResult<()> {
        if let Some(name) = entry.name() {
            if names.contains_key(name) {
                return Err(RouteError::DuplicateName {
                    name: name.to_string(),
                });
            }
            names.insert(name.to_string(), Arc::clone(entry));
        }

        for variant in entry.pattern().variants() {
            root.insert(&variant, types, entry)?;
        }
        Ok(())
    }

    /// Resolves a request to a route and its typed parameters.
    pub fn resolve(&self, method: &Method, path: &str) -> Result<RouteMatch<T>, ResolveError> {
        if let Some(hit) = self.cache.get(method, path) {
            return Ok(hit);
        }

        let segments = split_path(path);
        let mut bound = Vec::with_capacity(segments.len());
        let mut fallback = None;
        let Some(endpoint) = self.root.find(method, &segments, &mut bound, &mut fallback) else {
            return Err(match fallback {
                Some(endpoint) => ResolveError::MethodNotAllowed {
                    path: path.to_string(),
                    allowed: endpoint.allowed_methods(),
                },
                None => ResolveError::NotFound {
                    path: path.to_string(),
                },
            });
        };

        let entry = endpoint
            .resolve(method)
            .ok_or_else(|| ResolveError::MethodNotAllowed {
                path: path.to_string(),
                allowed: endpoint.allowed_methods(),
            })?;

        let mut params = Params::with_capacity(bound.len());
        for spec in entry.pattern().params() {
            let value = match bound.iter().find(|(name, _, _)| *name == spec.name) {
                Some((_, ty, raw)) => Some(ty.convert(raw).map_err(|source| {
                    ResolveError::Conversion {
                        param: spec.name.clone(),
                        source,
                    }
                })?),
                None => None,
            };
            params.push(spec.name.clone(), value);
        }

        let found = RouteMatch {
            entry: Arc::clone(entry),
            params,
        };
        self.cache.insert(method, path, &found);
        Ok(found)
    }

    /// Builds the URL of a named route.
    ///
    /// ```rust
    /// use sextant_router::{Route, Router};
    /// use http::Method;
    ///
    /// let mut router = Router::new();
    /// router
    ///     .add(Route::new("/users/<id:int>", ()).method(Method::GET).name("user"))
    ///     .unwrap();
    ///
    /// assert_eq!(router.url_for("user", [("id", 5_i64)]).unwrap(), "/users/5");
    /// ```
    pub fn url_for<I, K, V>(&self, name: &str, values: I) -> RouteResult<String>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<ParamValue>,
    {
        let entry = self
            .names
            .get(name)
            .ok_or_else(|| RouteError::url_build(name, "no route with this name"))?;
        let values: IndexMap<String, ParamValue> = values
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        entry.pattern().build_url(name, &values)
    }

    /// Ends the registration phase.
    ///
    /// Every later mutation fails with [`RouteError::Frozen`].
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    /// Returns true once [`freeze`](Self::freeze) has been called.
    #[must_use]
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    fn ensure_mutable(&self) -> RouteResult<()> {
        if self.frozen {
            Err(RouteError::Frozen)
        } else {
            Ok(())
        }
    }

    /// Iterates registered routes in registration order.
    pub fn routes(&self) -> impl Iterator<Item = &Arc<RouteEntry<T>>> {
        self.entries.iter()
    }

    /// Looks up a named route.
    #[must_use]
    pub fn named(&self, name: &str) -> Option<&Arc<RouteEntry<T>>> {
        self.names.get(name)
    }

    /// Number of distinct endpoint nodes in the trie.
    #[must_use]
    pub fn endpoint_count(&self) -> usize {
        self.root.endpoint_count()
    }

    /// Returns the number of routes registered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no routes are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> fmt::Debug for Router<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("routes", &self.entries.len())
            .field("types", &self.types)
            .field("frozen", &self.frozen)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}
