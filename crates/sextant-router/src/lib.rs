//! Segment-trie router with typed path parameters for Sextant.
//!
//! This crate turns declarative route patterns such as `/users/<id:int>` into
//! a trie of whole-segment edges and resolves inbound `(method, path)` pairs
//! to the registered value plus typed [`Params`].
//!
//! # Features
//!
//! - **Typed parameters**: `string`, `int`, `float`, `slug`, `uuid` and custom
//!   [`ParamType`]s, converted during resolution
//! - **Optional segments**: `<?name>` may be absent anywhere in the pattern
//! - **Static-over-dynamic precedence** with backtracking
//! - **Method routing** with `HEAD` falling back to `GET`
//! - **Reverse lookup** of named routes via [`Router::url_for`]
//! - **Bounded resolution cache** once the table is frozen
//!
//! # Example
//!
//! ```rust
//! use sextant_router::{Route, Router, ParamValue};
//! use http::Method;
//!
//! let mut router = Router::new();
//! router.add(Route::new("/users", "list_users").method(Method::GET)).unwrap();
//! router
//!     .add(Route::new("/users/<id:int>", "get_user").methods([Method::GET, Method::DELETE]))
//!     .unwrap();
//! router.add(Route::new("/search/<?q>", "search").method(Method::GET)).unwrap();
//! router.freeze();
//!
//! let m = router.resolve(&Method::GET, "/users/123").unwrap();
//! assert_eq!(*m.value(), "get_user");
//! assert_eq!(m.params.get("id"), Some(&ParamValue::Int(123)));
//!
//! let m = router.resolve(&Method::GET, "/search").unwrap();
//! assert_eq!(m.params.get("q"), None);
//! ```
//!
//! # Architecture
//!
//! Each edge is one path segment. Parameter edges are keyed by type:
//!
//! ```text
//!              (root)
//!                │
//!         ┌──────┴──────┐
//!         │             │
//!      "users"      "search"
//!       [GET]         [GET]
//!         │             │
//!     <id:int>      <q:string>
//!   [GET,DELETE]      [GET]
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod cache;
mod error;
mod method_router;
mod node;
mod params;
mod pattern;
mod route;
mod router;
mod types;

use std::sync::Arc;

pub use error::{ResolveError, RouteError, RouteResult};
pub use method_router::MethodRouter;
pub use params::Params;
pub use pattern::{ParamSpec, RoutePattern, Segment, MAX_OPTIONAL_PARAMS};
pub use route::{Route, RouteEntry};
pub use router::{Router, DEFAULT_CACHE_CAPACITY};
pub use types::{
    CompiledType, ConversionError, FloatType, IntType, ParamType, ParamTypes, ParamValue,
    SlugType, StringType, UuidType, DEFAULT_TYPE,
};

/// A resolved route with its typed parameters.
#[derive(Debug)]
pub struct RouteMatch<T> {
    /// The matched route.
    pub entry: Arc<RouteEntry<T>>,
    /// Extracted path parameters.
    pub params: Params,
}

impl<T> Clone for RouteMatch<T> {
    fn clone(&self) -> Self {
        Self {
            entry: Arc::clone(&self.entry),
            params: self.params.clone(),
        }
    }
}

impl<T> RouteMatch<T> {
    /// The value registered for the matched route and method.
    #[must_use]
    pub fn value(&self) -> &T {
        self.entry.value()
    }

    /// The pattern of the matched route.
    #[must_use]
    pub fn pattern(&self) -> &str {
        self.entry.pattern().as_str()
    }

    /// The name of the matched route, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.entry.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;

    #[test]
    fn test_basic_routing() {
        let mut router = Router::new();
        router.add(Route::new("/users", "listUsers").method(Method::GET)).unwrap();
        router.add(Route::new("/users/<id>", "getUser").method(Method::GET)).unwrap();

        let m = router.resolve(&Method::GET, "/users").unwrap();
        assert_eq!(*m.value(), "listUsers");
        assert!(m.params.is_empty());

        let m = router.resolve(&Method::GET, "/users/123").unwrap();
        assert_eq!(*m.value(), "getUser");
        assert_eq!(m.params.get_str("id"), Some("123"));
        assert_eq!(m.pattern(), "/users/<id>");
    }

    #[test]
    fn test_multiple_params() {
        let mut router = Router::new();
        router
            .add(
                Route::new("/orgs/<org:slug>/users/<user:int>", "getOrgUser")
                    .method(Method::GET)
                    .name("org_user"),
            )
            .unwrap();

        let m = router.resolve(&Method::GET, "/orgs/acme/users/123").unwrap();
        assert_eq!(m.name(), Some("org_user"));
        assert_eq!(m.params.get_str("org"), Some("acme"));
        assert_eq!(m.params.get_int("user"), Some(123));
    }

    #[test]
    fn test_no_match() {
        let mut router = Router::new();
        router.add(Route::new("/users", "listUsers").method(Method::GET)).unwrap();

        let err = router.resolve(&Method::GET, "/posts").unwrap_err();
        assert_eq!(
            err,
            ResolveError::NotFound {
                path: "/posts".into()
            }
        );
    }

    #[test]
    fn test_router_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Router<Arc<str>>>();
    }
}
