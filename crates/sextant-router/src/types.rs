//! Path parameter types.
//!
//! A [`ParamType`] describes how one path segment is recognised and converted
//! into a typed [`ParamValue`]. Types are registered by name in a
//! [`ParamTypes`] registry and referenced from route patterns with the
//! `<name:type>` syntax.
//!
//! | name | pattern | value |
//! |---|---|---|
//! | `string` (default, alias `str`) | `([^/]+)` | [`ParamValue::Str`] |
//! | `int` | `(\d+)` | [`ParamValue::Int`] |
//! | `float` | `(\d+\.\d+)` | [`ParamValue::Float`] |
//! | `slug` | `([a-z0-9-]+)` | [`ParamValue::Str`] |
//! | `uuid` | `([0-9a-fA-F-]{36})` | [`ParamValue::Uuid`] |

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use regex::Regex;
use serde::Serialize;
use uuid::Uuid;

use crate::error::RouteError;

/// Name of the type used when a parameter declares no type.
pub const DEFAULT_TYPE: &str = "string";

/// A typed path parameter value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// Text value (`string`, `slug`, custom text types).
    Str(String),
    /// Integer value (`int`).
    Int(i64),
    /// Floating point value (`float`).
    Float(f64),
    /// UUID value (`uuid`).
    Uuid(Uuid),
}

impl ParamValue {
    /// Returns the value as text if it is a [`ParamValue::Str`].
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value as an integer if it is a [`ParamValue::Int`].
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the value as a float if it is a [`ParamValue::Float`].
    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Returns the value as a UUID if it is a [`ParamValue::Uuid`].
    #[must_use]
    pub fn as_uuid(&self) -> Option<&Uuid> {
        match self {
            Self::Uuid(u) => Some(u),
            _ => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => f.write_str(s),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Uuid(u) => write!(f, "{u}"),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<Uuid> for ParamValue {
    fn from(value: Uuid) -> Self {
        Self::Uuid(value)
    }
}

/// A segment value matched the type pattern but could not be converted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot convert '{value}' to {type_name}: {reason}")]
pub struct ConversionError {
    /// Name of the type that rejected the value.
    pub type_name: String,
    /// The raw segment text.
    pub value: String,
    /// Why conversion failed.
    pub reason: String,
}

impl ConversionError {
    /// Creates a conversion error.
    pub fn new(
        type_name: impl Into<String>,
        value: impl Into<String>,
        reason: impl fmt::Display,
    ) -> Self {
        Self {
            type_name: type_name.into(),
            value: value.into(),
            reason: reason.to_string(),
        }
    }
}

/// A converter for one kind of path parameter.
///
/// The pattern must be a single capturing group, e.g. `(\d+)`. It is matched
/// against a whole path segment.
pub trait ParamType: Send + Sync + 'static {
    /// The capturing regex fragment recognising a segment of this type.
    fn pattern(&self) -> &str;

    /// Extra validation for a segment that already matched [`pattern`](Self::pattern).
    ///
    /// A segment that fails validation does not match this type.
    fn validate(&self, _value: &str) -> bool {
        true
    }

    /// Converts the raw segment text into a typed value.
    fn convert(&self, value: &str) -> Result<ParamValue, ConversionError>;
}

/// The `string` type: any non-empty text without slashes.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringType;

impl ParamType for StringType {
    fn pattern(&self) -> &str {
        r"([^/]+)"
    }

    fn convert(&self, value: &str) -> Result<ParamValue, ConversionError> {
        Ok(ParamValue::Str(value.to_string()))
    }
}

/// The `int` type: one or more ASCII digits.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntType;

impl ParamType for IntType {
    fn pattern(&self) -> &str {
        r"(\d+)"
    }

    fn convert(&self, value: &str) -> Result<ParamValue, ConversionError> {
        value
            .parse::<i64>()
            .map(ParamValue::Int)
            .map_err(|e| ConversionError::new("int", value, e))
    }
}

/// The `float` type: digits, a dot, digits.
#[derive(Debug, Clone, Copy, Default)]
pub struct FloatType;

impl ParamType for FloatType {
    fn pattern(&self) -> &str {
        r"(\d+\.\d+)"
    }

    fn convert(&self, value: &str) -> Result<ParamValue, ConversionError> {
        value
            .parse::<f64>()
            .map(ParamValue::Float)
            .map_err(|e| ConversionError::new("float", value, e))
    }
}

/// The `slug` type: lowercase letters, digits and hyphens.
#[derive(Debug, Clone, Copy, Default)]
pub struct SlugType;

impl ParamType for SlugType {
    fn pattern(&self) -> &str {
        r"([a-z0-9-]+)"
    }

    fn convert(&self, value: &str) -> Result<ParamValue, ConversionError> {
        Ok(ParamValue::Str(value.to_string()))
    }
}

/// The `uuid` type: 36 hex-and-hyphen characters, parsed as a UUID.
///
/// Text that fits the pattern but is not a UUID fails in `convert`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidType;

impl ParamType for UuidType {
    fn pattern(&self) -> &str {
        r"([0-9a-fA-F-]{36})"
    }

    fn convert(&self, value: &str) -> Result<ParamValue, ConversionError> {
        Uuid::parse_str(value)
            .map(ParamValue::Uuid)
            .map_err(|e| ConversionError::new("uuid", value, e))
    }
}

/// A registered type together with its compiled, segment-anchored regex.
#[derive(Clone)]
pub struct CompiledType {
    name: Arc<str>,
    regex: Regex,
    inner: Arc<dyn ParamType>,
}

impl CompiledType {
    fn compile(name: &str, inner: Arc<dyn ParamType>) -> Result<Self, RouteError> {
        let invalid = |reason: String| RouteError::InvalidParamType {
            name: name.to_string(),
            reason,
        };

        let pattern = inner.pattern();
        let regex = Regex::new(&format!("^(?:{pattern})$"))
            .map_err(|e| invalid(format!("pattern '{pattern}' does not compile: {e}")))?;

        // Group 0 is the whole match; exactly one user group is required.
        if regex.captures_len() != 2 {
            return Err(invalid(format!(
                "pattern '{pattern}' must contain exactly one capturing group"
            )));
        }

        Ok(Self {
            name: Arc::from(name),
            regex,
            inner,
        })
    }

    /// The name this type was registered under.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The type's raw pattern fragment.
    #[must_use]
    pub fn pattern(&self) -> &str {
        self.inner.pattern()
    }

    /// Matches a whole segment, returning the captured raw value.
    ///
    /// Returns `None` when the regex does not match or validation rejects
    /// the value.
    #[must_use]
    pub fn capture<'s>(&self, segment: &'s str) -> Option<&'s str> {
        let value = self.regex.captures(segment)?.get(1)?.as_str();
        self.inner.validate(value).then_some(value)
    }

    /// Converts a captured value.
    pub fn convert(&self, value: &str) -> Result<ParamValue, ConversionError> {
        self.inner.convert(value)
    }
}

impl fmt::Debug for CompiledType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledType")
            .field("name", &self.name)
            .field("pattern", &self.pattern())
            .finish()
    }
}

/// Registry of named parameter types.
///
/// A fresh registry contains the built-in types.
///
/// # Example
///
/// ```rust
/// use sextant_router::{ParamTypes, ParamValue};
///
/// let types = ParamTypes::new();
/// let int = types.resolve(Some("int")).unwrap();
/// let raw = int.capture("42").unwrap();
/// assert_eq!(int.convert(raw).unwrap(), ParamValue::Int(42));
///
/// // No type suffix falls back to `string`.
/// assert_eq!(types.resolve(None).unwrap().name(), "string");
/// ```
#[derive(Debug, Clone)]
pub struct ParamTypes {
    types: IndexMap<String, CompiledType>,
}

impl Default for ParamTypes {
    fn default() -> Self {
        Self::new()
    }
}

impl ParamTypes {
    /// Creates a registry holding the built-in types.
    #[must_use]
    pub fn new() -> Self {
        let mut types = Self {
            types: IndexMap::new(),
        };
        let builtins: [(&str, Arc<dyn ParamType>); 6] = [
            (DEFAULT_TYPE, Arc::new(StringType)),
            ("str", Arc::new(StringType)),
            ("int", Arc::new(IntType)),
            ("float", Arc::new(FloatType)),
            ("slug", Arc::new(SlugType)),
            ("uuid", Arc::new(UuidType)),
        ];
        for (name, ty) in builtins {
            // Built-in patterns are constant and known to be valid.
            if let Ok(compiled) = CompiledType::compile(name, ty) {
                types.types.insert(name.to_string(), compiled);
            }
        }
        types
    }

    /// Registers a type under `name`.
    ///
    /// Fails with [`RouteError::DuplicateType`] when the name is taken and
    /// `allow_replace` is false, and with [`RouteError::InvalidParamType`]
    /// when the pattern is not a single capturing group.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        ty: impl ParamType,
        allow_replace: bool,
    ) -> Result<(), RouteError> {
        self.register_arc(name, Arc::new(ty), allow_replace)
    }

    /// Registers an already shared type.
    pub fn register_arc(
        &mut self,
        name: impl Into<String>,
        ty: Arc<dyn ParamType>,
        allow_replace: bool,
    ) -> Result<(), RouteError> {
        let name = name.into();
        if self.types.contains_key(&name) && !allow_replace {
            return Err(RouteError::DuplicateType { name });
        }
        let compiled = CompiledType::compile(&name, ty)?;
        self.types.insert(name, compiled);
        Ok(())
    }

    /// Copies every type from `other` whose name is not registered here.
    pub(crate) fn absorb(&mut self, other: &ParamTypes) {
        for (name, ty) in &other.types {
            if !self.types.contains_key(name) {
                self.types.insert(name.clone(), ty.clone());
            }
        }
    }

    /// Looks up a type, falling back to `string` when no name is given.
    #[must_use]
    pub fn resolve(&self, name: Option<&str>) -> Option<&CompiledType> {
        self.types.get(name.unwrap_or(DEFAULT_TYPE))
    }

    /// Returns true if a type is registered under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Iterates registered type names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }
}
