//! Router error types.
//!
//! [`RouteError`] covers configuration mistakes detected while the route
//! table is being built. [`ResolveError`] covers failures to resolve an
//! inbound `(method, path)` pair.

use http::Method;

use crate::types::ConversionError;

/// A configuration error raised while building the route table.
///
/// These are fatal: an application that hits one must not start serving.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    /// The route pattern is malformed.
    #[error("invalid route pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The offending pattern.
        pattern: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A parameter references a type that is not registered.
    #[error("route pattern '{pattern}' uses unknown parameter type '{type_name}'")]
    UnknownParamType {
        /// The offending pattern.
        pattern: String,
        /// The unknown type name.
        type_name: String,
    },

    /// A parameter type could not be registered.
    #[error("invalid parameter type '{name}': {reason}")]
    InvalidParamType {
        /// Name the type was registered under.
        name: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A parameter type with this name already exists.
    #[error("parameter type '{name}' is already registered")]
    DuplicateType {
        /// The duplicate name.
        name: String,
    },

    /// A route with this name already exists.
    #[error("a route named '{name}' already exists")]
    DuplicateName {
        /// The duplicate route name.
        name: String,
    },

    /// Two routes resolve to the same path for the same method.
    #[error("conflicting routes for {method} {pattern}")]
    RouteConflict {
        /// The pattern being registered.
        pattern: String,
        /// The method registered twice.
        method: Method,
    },

    /// Two parameters of the same type at the same depth use different names.
    #[error("route pattern '{pattern}' names parameter '{name}' where '{existing}' is already bound")]
    ParamNameConflict {
        /// The pattern being registered.
        pattern: String,
        /// The name already used on the shared edge.
        existing: String,
        /// The conflicting name.
        name: String,
    },

    /// The route table has been frozen and can no longer change.
    #[error("route table is frozen")]
    Frozen,

    /// A URL could not be built for a named route.
    #[error("cannot build URL for '{name}': {reason}")]
    UrlBuild {
        /// The route name.
        name: String,
        /// Why the URL could not be built.
        reason: String,
    },
}

impl RouteError {
    pub(crate) fn invalid_pattern(pattern: &str, reason: impl Into<String>) -> Self {
        Self::InvalidPattern {
            pattern: pattern.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn url_build(name: &str, reason: impl Into<String>) -> Self {
        Self::UrlBuild {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

/// A failure to resolve an inbound request to a route.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ResolveError {
    /// No route matches the path.
    #[error("no route matches '{path}'")]
    NotFound {
        /// The requested path.
        path: String,
    },

    /// A route matches the path, but not for this method.
    #[error("method not allowed for '{path}'")]
    MethodNotAllowed {
        /// The requested path.
        path: String,
        /// Methods registered for the matched path.
        allowed: Vec<Method>,
    },

    /// A segment matched a parameter type but failed conversion.
    #[error("invalid value for path parameter '{param}'")]
    Conversion {
        /// The parameter name.
        param: String,
        /// The conversion failure.
        #[source]
        source: ConversionError,
    },
}

/// Result alias for route table construction.
pub type RouteResult<T> = Result<T, RouteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_error_display() {
        let err = RouteError::invalid_pattern("/a/<", "unterminated parameter");
        assert_eq!(
            err.to_string(),
            "invalid route pattern '/a/<': unterminated parameter"
        );

        let err = RouteError::RouteConflict {
            pattern: "/a".into(),
            method: Method::GET,
        };
        assert_eq!(err.to_string(), "conflicting routes for GET /a");
    }

    #[test]
    fn test_resolve_error_source() {
        use std::error::Error as _;

        let err = ResolveError::Conversion {
            param: "id".into(),
            source: ConversionError::new("int", "99999999999999999999", "number too large"),
        };
        assert!(err.source().is_some());
        assert_eq!(err.to_string(), "invalid value for path parameter 'id'");
    }
}
