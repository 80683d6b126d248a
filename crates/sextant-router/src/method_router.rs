//! HTTP method-based routing.
//!
//! [`MethodRouter`] maps HTTP methods to values for a single path. A `HEAD`
//! request falls back to the `GET` value when no explicit `HEAD` value is
//! registered.

use http::Method;
use indexmap::IndexMap;

/// Maps HTTP methods to values for a single route endpoint.
///
/// # Example
///
/// ```rust
/// use sextant_router::MethodRouter;
/// use http::Method;
///
/// let mut router = MethodRouter::new();
/// router.insert(Method::GET, "list").unwrap();
/// router.insert(Method::POST, "create").unwrap();
///
/// assert_eq!(router.resolve(&Method::GET), Some(&"list"));
/// assert_eq!(router.resolve(&Method::HEAD), Some(&"list"));
/// assert_eq!(router.resolve(&Method::DELETE), None);
///
/// // The same method cannot be registered twice.
/// assert!(router.insert(Method::GET, "other").is_err());
/// ```
#[derive(Debug, Clone)]
pub struct MethodRouter<T> {
    handlers: IndexMap<Method, T>,
}

impl<T> Default for MethodRouter<T> {
    fn default() -> Self {
        Self {
            handlers: IndexMap::new(),
        }
    }
}

impl<T> MethodRouter<T> {
    /// Creates an empty method router.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a value for a method.
    ///
    /// Existing registrations are never overwritten: if the method is
    /// already present the method is handed back as the error.
    pub fn insert(&mut self, method: Method, value: T) -> Result<(), Method> {
        if self.handlers.contains_key(&method) {
            return Err(method);
        }
        self.handlers.insert(method, value);
        Ok(())
    }

    /// Returns the value registered for exactly this method.
    #[must_use]
    pub fn get(&self, method: &Method) -> Option<&T> {
        self.handlers.get(method)
    }

    /// Returns the value for a method, with `HEAD` falling back to `GET`.
    #[must_use]
    pub fn resolve(&self, method: &Method) -> Option<&T> {
        self.handlers.get(method).or_else(|| {
            if *method == Method::HEAD {
                self.handlers.get(&Method::GET)
            } else {
                None
            }
        })
    }

    /// Returns true if a value is registered for this method.
    #[must_use]
    pub fn has_method(&self, method: &Method) -> bool {
        self.handlers.contains_key(method)
    }

    /// Methods that resolve to a value, in registration order.
    ///
    /// `HEAD` is listed after `GET` when it is only reachable through the
    /// fallback.
    #[must_use]
    pub fn allowed_methods(&self) -> Vec<Method> {
        let mut methods: Vec<Method> = Vec::with_capacity(self.handlers.len() + 1);
        for method in self.handlers.keys() {
            methods.push(method.clone());
            if *method == Method::GET && !self.handlers.contains_key(&Method::HEAD) {
                methods.push(Method::HEAD);
            }
        }
        methods
    }

    /// Iterates registrations in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&Method, &T)> {
        self.handlers.iter()
    }

    /// Returns true if no methods are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Returns the number of registered methods.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_router_empty() {
        let router: MethodRouter<&str> = MethodRouter::new();
        assert!(router.is_empty());
        assert_eq!(router.resolve(&Method::GET), None);
        assert!(router.allowed_methods().is_empty());
    }

    #[test]
    fn test_method_router_custom_method() {
        let purge = Method::from_bytes(b"PURGE").unwrap();
        let mut router = MethodRouter::new();
        router.insert(purge.clone(), 1).unwrap();

        assert_eq!(router.get(&purge), Some(&1));
        assert_eq!(router.resolve(&Method::GET), None);
    }

    #[test]
    fn test_head_falls_back_to_get() {
        let mut router = MethodRouter::new();
        router.insert(Method::GET, "get").unwrap();
        assert_eq!(router.resolve(&Method::HEAD), Some(&"get"));
        assert_eq!(router.get(&Method::HEAD), None);
    }

    #[test]
    fn test_explicit_head_wins() {
        let mut router = MethodRouter::new();
        router.insert(Method::GET, "get").unwrap();
        router.insert(Method::HEAD, "head").unwrap();
        assert_eq!(router.resolve(&Method::HEAD), Some(&"head"));
    }

    #[test]
    fn test_allowed_methods_lists_implicit_head() {
        let mut router = MethodRouter::new();
        router.insert(Method::POST, "create").unwrap();
        router.insert(Method::GET, "list").unwrap();

        assert_eq!(
            router.allowed_methods(),
            vec![Method::POST, Method::GET, Method::HEAD]
        );
    }

    #[test]
    fn test_insert_rejects_duplicate() {
        let mut router = MethodRouter::new();
        router.insert(Method::GET, "a").unwrap();
        assert_eq!(router.insert(Method::GET, "b"), Err(Method::GET));
        assert_eq!(router.get(&Method::GET), Some(&"a"));
    }
}
