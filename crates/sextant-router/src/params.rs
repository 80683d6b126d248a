//! Extracted path parameters.
//!
//! Parameters are stored as `(name, value)` pairs in a small vector so that
//! the common case of one to four parameters does not allocate. An optional
//! parameter whose segment was absent is stored with a `None` value.

use serde::ser::{Serialize, SerializeMap, Serializer};
use smallvec::SmallVec;

use crate::types::ParamValue;

/// Maximum number of parameters stored inline (stack allocated).
const INLINE_PARAMS: usize = 4;

/// Typed path parameters from a route match.
///
/// # Example
///
/// ```rust
/// use sextant_router::{Params, ParamValue};
///
/// let mut params = Params::new();
/// params.push("id", Some(ParamValue::Int(42)));
/// params.push("tab", None);
///
/// assert_eq!(params.get_int("id"), Some(42));
/// assert!(params.contains("tab"));
/// assert_eq!(params.get("tab"), None);
/// assert_eq!(params.get("unknown"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Params {
    inner: SmallVec<[(String, Option<ParamValue>); INLINE_PARAMS]>,
}

impl Params {
    /// Creates an empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a parameter set with the given capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: SmallVec::with_capacity(capacity),
        }
    }

    /// Adds a parameter.
    pub fn push(&mut self, name: impl Into<String>, value: Option<ParamValue>) {
        self.inner.push((name.into(), value));
    }

    /// Returns the value of a parameter, `None` if absent or undeclared.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.inner
            .iter()
            .find(|(n, _)| n == name)
            .and_then(|(_, v)| v.as_ref())
    }

    /// Returns a text parameter.
    #[must_use]
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(ParamValue::as_str)
    }

    /// Returns an integer parameter.
    #[must_use]
    pub fn get_int(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(ParamValue::as_int)
    }

    /// Returns true if the route declares this parameter, present or not.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.inner.iter().any(|(n, _)| n == name)
    }

    /// Returns true if there are no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns the number of parameters, including absent optional ones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Iterates parameters in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&ParamValue>)> {
        self.inner.iter().map(|(n, v)| (n.as_str(), v.as_ref()))
    }
}

impl FromIterator<(String, Option<ParamValue>)> for Params {
    fn from_iter<I: IntoIterator<Item = (String, Option<ParamValue>)>>(iter: I) -> Self {
        Self {
            inner: iter.into_iter().collect(),
        }
    }
}

impl Serialize for Params {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.inner.len()))?;
        for (name, value) in &self.inner {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
