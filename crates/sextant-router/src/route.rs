//! Route definitions and registered route entries.

use http::Method;

use crate::pattern::RoutePattern;

/// A route to be added to a [`Router`](crate::Router).
///
/// # Example
///
/// ```rust
/// use sextant_router::Route;
/// use http::Method;
///
/// let route = Route::new("/users/<id:int>", "show_user")
///     .method(Method::GET)
///     .name("user");
/// assert_eq!(route.pattern(), "/users/<id:int>");
/// ```
#[derive(Debug, Clone)]
pub struct Route<T> {
    pattern: String,
    methods: Vec<Method>,
    name: Option<String>,
    value: T,
}

impl<T> Route<T> {
    /// Creates a route for `pattern` carrying `value`.
    #[must_use]
    pub fn new(pattern: impl Into<String>, value: T) -> Self {
        Self {
            pattern: pattern.into(),
            methods: Vec::new(),
            name: None,
            value,
        }
    }

    /// Adds a method this route answers to.
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

    /// Names the route for reverse lookup.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// The raw pattern text.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub(crate) fn into_entry(self, pattern: RoutePattern) -> RouteEntry<T> {
        RouteEntry {
            pattern,
            methods: self.methods,
            name: self.name,
            value: self.value,
        }
    }

    pub(crate) fn declared_methods(&self) -> &[Method] {
        &self.methods
    }
}

/// A route as stored in the router.
#[derive(Debug)]
pub struct RouteEntry<T> {
    pattern: RoutePattern,
    methods: Vec<Method>,
    name: Option<String>,
    value: T,
}

impl<T> RouteEntry<T> {
    /// The compiled pattern.
    #[must_use]
    pub fn pattern(&self) -> &RoutePattern {
        &self.pattern
    }

    /// Methods this route was registered for.
    #[must_use]
    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    /// The route name, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The value carried by this route.
    #[must_use]
    pub fn value(&self) -> &T {
        &self.value
    }
}
