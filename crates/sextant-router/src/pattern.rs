//! Route pattern parsing.
//!
//! A route pattern is a slash-separated path where each segment is either
//! static text or a single parameter:
//!
//! | syntax | meaning |
//! |---|---|
//! | `<name>` | required parameter of the default `string` type |
//! | `<name:type>` | required parameter of a registered type |
//! | `<?name>`, `<?name:type>` | optional parameter, the segment may be absent |
//!
//! Parsing only checks syntax. Parameter types are checked against a
//! [`ParamTypes`](crate::ParamTypes) registry when the pattern is inserted
//! into a [`Router`](crate::Router).

use std::fmt;

use indexmap::IndexMap;

use crate::error::{RouteError, RouteResult};
use crate::types::ParamValue;

/// Upper bound on optional parameters in one pattern.
///
/// Each optional segment doubles the number of trie insertions.
pub const MAX_OPTIONAL_PARAMS: usize = 16;

fn is_word(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn is_static_text(text: &str) -> bool {
    text.chars().all(|c| is_word(c) || c == '-')
}

fn is_param_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| is_word(c) || c == '?')
}

fn is_type_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(is_word)
}

/// A parameter declared in a route pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSpec {
    /// Parameter name.
    pub name: String,
    /// Declared type name, `None` for the default type.
    pub type_name: Option<String>,
    /// Whether the segment may be absent.
    pub optional: bool,
}

/// One segment of a parsed route pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Literal text that must match exactly.
    Static(String),
    /// A parameter segment.
    Param(ParamSpec),
}

/// A parsed route pattern.
///
/// # Example
///
/// ```rust
/// use sextant_router::{RoutePattern, Segment};
///
/// let pattern = RoutePattern::parse("/users/<id:int>/<?tab>").unwrap();
/// assert_eq!(pattern.segments().len(), 3);
/// assert!(matches!(&pattern.segments()[0], Segment::Static(s) if s == "users"));
///
/// let names: Vec<_> = pattern.params().map(|p| p.name.as_str()).collect();
/// assert_eq!(names, vec!["id", "tab"]);
///
/// // One variant with the optional segment, one without.
/// assert_eq!(pattern.variants().len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    raw: String,
    segments: Vec<Segment>,
}

impl RoutePattern {
    /// Parses a pattern string.
    pub fn parse(raw: &str) -> RouteResult<Self> {
        let Some(body) = raw.strip_prefix('/') else {
            return Err(RouteError::invalid_pattern(raw, "pattern must start with '/'"));
        };
        let body = body.strip_suffix('/').unwrap_or(body);

        let mut segments = Vec::new();
        if !body.is_empty() {
            for part in body.split('/') {
                segments.push(parse_segment(raw, part)?);
            }
        }

        let optional = segments
            .iter()
            .filter(|s| matches!(s, Segment::Param(spec) if spec.optional))
            .count();
        if optional > MAX_OPTIONAL_PARAMS {
            return Err(RouteError::invalid_pattern(
                raw,
                format!("more than {MAX_OPTIONAL_PARAMS} optional parameters"),
            ));
        }

        let mut seen: Vec<&str> = Vec::new();
        for segment in &segments {
            if let Segment::Param(spec) = segment {
                if seen.contains(&spec.name.as_str()) {
                    return Err(RouteError::invalid_pattern(
                        raw,
                        format!("duplicate parameter name '{}'", spec.name),
                    ));
                }
                seen.push(&spec.name);
            }
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    /// The pattern text as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The parsed segments in order.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Iterates the parameter specs in left-to-right order.
    pub fn params(&self) -> impl Iterator<Item = &ParamSpec> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Param(spec) => Some(spec),
            Segment::Static(_) => None,
        })
    }

    /// Returns true if the pattern has no parameters.
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.params().next().is_none()
    }

    /// Every concrete segment sequence this pattern can match.
    ///
    /// With `k` optional parameters there are `2^k` variants. The first
    /// variant has every optional segment present; later variants drop
    /// them in binary-counting order.
    #[must_use]
    pub fn variants(&self) -> Vec<Vec<&Segment>> {
        let optional: Vec<usize> = self
            .segments
            .iter()
            .enumerate()
            .filter_map(|(i, s)| match s {
                Segment::Param(spec) if spec.optional => Some(i),
                _ => None,
            })
            .collect();

        (0..1usize << optional.len())
            .map(|mask| {
                self.segments
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| {
                        optional
                            .iter()
                            .position(|o| o == i)
                            .map_or(true, |bit| mask & (1 << bit) == 0)
                    })
                    .map(|(_, s)| s)
                    .collect()
            })
            .collect()
    }

    /// Builds a concrete path by substituting parameter values.
    ///
    /// Values are percent-encoded. Optional parameters may be omitted, in
    /// which case their segment is dropped. `route_name` is only used in
    /// error messages.
    pub fn build_url(
        &self,
        route_name: &str,
        values: &IndexMap<String, ParamValue>,
    ) -> RouteResult<String> {
        for key in values.keys() {
            if !self.params().any(|p| &p.name == key) {
                return Err(RouteError::url_build(
                    route_name,
                    format!("unknown parameter '{key}'"),
                ));
            }
        }

        let mut url = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Static(text) => {
                    url.push('/');
                    url.push_str(text);
                }
                Segment::Param(spec) => match values.get(&spec.name) {
                    Some(value) => {
                        url.push('/');
                        url.push_str(&urlencoding::encode(&value.to_string()));
                    }
                    None if spec.optional => {}
                    None => {
                        return Err(RouteError::url_build(
                            route_name,
                            format!("missing required parameter '{}'", spec.name),
                        ));
                    }
                },
            }
        }

        if url.is_empty() {
            url.push('/');
        }
        Ok(url)
    }
}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn parse_segment(raw: &str, part: &str) -> RouteResult<Segment> {
    if part.is_empty() {
        return Err(RouteError::invalid_pattern(raw, "empty path segment"));
    }

    let Some(open) = part.find('<') else {
        if !is_static_text(part) {
            return Err(RouteError::invalid_pattern(
                raw,
                format!("invalid static text '{part}'"),
            ));
        }
        return Ok(Segment::Static(part.to_string()));
    };

    if part.matches('<').count() > 1 {
        return Err(RouteError::invalid_pattern(
            raw,
            format!("segment '{part}' has more than one parameter"),
        ));
    }

    let Some(close) = part[open..].find('>').map(|i| open + i) else {
        return Err(RouteError::invalid_pattern(
            raw,
            format!("unterminated parameter in '{part}'"),
        ));
    };

    let prefix = &part[..open];
    let suffix = &part[close + 1..];
    for text in [prefix, suffix] {
        if !is_static_text(text) {
            return Err(RouteError::invalid_pattern(
                raw,
                format!("invalid static text '{text}'"),
            ));
        }
    }
    if !prefix.is_empty() || !suffix.is_empty() {
        return Err(RouteError::invalid_pattern(
            raw,
            format!("parameter must span the whole segment in '{part}'"),
        ));
    }

    let inner = &part[open + 1..close];
    let (optional, inner) = match inner.strip_prefix('?') {
        Some(rest) => (true, rest),
        None => (false, inner),
    };
    let (name, ty) = match inner.split_once(':') {
        Some((name, ty)) => (name, Some(ty)),
        None => (inner, None),
    };

    if name.is_empty() {
        return Err(RouteError::invalid_pattern(raw, "empty parameter name"));
    }
    if !is_param_name(name) {
        return Err(RouteError::invalid_pattern(
            raw,
            format!("invalid parameter name '{name}'"),
        ));
    }
    if let Some(ty) = ty {
        if !is_type_name(ty) {
            return Err(RouteError::invalid_pattern(
                raw,
                format!("invalid type name '{ty}' for parameter '{name}'"),
            ));
        }
    }

    Ok(Segment::Param(ParamSpec {
        name: name.to_string(),
        type_name: ty.map(str::to_string),
        optional,
    }))
}
