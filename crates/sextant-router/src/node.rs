//! Segment trie.
//!
//! Every edge of the trie is one whole path segment. Static edges are kept
//! sorted for binary search; dynamic edges are keyed by parameter type and
//! tried in insertion order. A node carrying a non-empty [`MethodRouter`] is
//! a route endpoint.

use std::sync::Arc;

use http::Method;

use crate::error::{RouteError, RouteResult};
use crate::method_router::MethodRouter;
use crate::pattern::Segment;
use crate::route::RouteEntry;
use crate::types::{CompiledType, ParamTypes};

pub(crate) type Endpoint<T> = MethodRouter<Arc<RouteEntry<T>>>;

/// A parameter edge: the type recognising the segment and the name bound.
pub(crate) struct DynamicEdge<T> {
    pub(crate) ty: CompiledType,
    pub(crate) name: String,
    pub(crate) node: Node<T>,
}

impl<T> Clone for DynamicEdge<T> {
    fn clone(&self) -> Self {
        Self {
            ty: self.ty.clone(),
            name: self.name.clone(),
            node: self.node.clone(),
        }
    }
}

/// A node in the segment trie.
pub(crate) struct Node<T> {
    segment: String,
    static_children: Vec<Node<T>>,
    dynamic_children: Vec<DynamicEdge<T>>,
    endpoint: Endpoint<T>,
}

impl<T> Clone for Node<T> {
    fn clone(&self) -> Self {
        Self {
            segment: self.segment.clone(),
            static_children: self.static_children.clone(),
            dynamic_children: self.dynamic_children.clone(),
            endpoint: self.endpoint.clone(),
        }
    }
}

impl<T> Node<T> {
    fn new(segment: impl Into<String>) -> Self {
        Self {
            segment: segment.into(),
            static_children: Vec::new(),
            dynamic_children: Vec::new(),
            endpoint: MethodRouter::new(),
        }
    }

    /// Creates the root node.
    pub(crate) fn root() -> Self {
        Self::new("")
    }

    /// Inserts one segment sequence ending at `entry`.
    pub(crate) fn insert(
        &mut self,
        segments: &[&Segment],
        types: &ParamTypes,
        entry: &Arc<RouteEntry<T>>,
    ) -> RouteResult<()> {
        let Some((first, rest)) = segments.split_first() else {
            for method in entry.methods() {
                self.endpoint
                    .insert(method.clone(), Arc::clone(entry))
                    .map_err(|method| RouteError::RouteConflict {
                        pattern: entry.pattern().to_string(),
                        method,
                    })?;
            }
            return Ok(());
        };

        match first {
            Segment::Static(text) => {
                let idx = match self
                    .static_children
                    .binary_search_by(|c| c.segment.as_str().cmp(text.as_str()))
                {
                    Ok(idx) => idx,
                    Err(idx) => {
                        self.static_children.insert(idx, Node::new(text.as_str()));
                        idx
                    }
                };
                self.static_children[idx].insert(rest, types, entry)
            }
            Segment::Param(spec) => {
                let pattern = entry.pattern().as_str();
                let ty = types.resolve(spec.type_name.as_deref()).ok_or_else(|| {
                    RouteError::UnknownParamType {
                        pattern: pattern.to_string(),
                        type_name: spec.type_name.clone().unwrap_or_default(),
                    }
                })?;

                let existing = self
                    .dynamic_children
                    .iter()
                    .position(|edge| edge.ty.name() == ty.name());
                let idx = match existing {
                    Some(idx) => {
                        let edge = &self.dynamic_children[idx];
                        if edge.name != spec.name {
                            return Err(RouteError::ParamNameConflict {
                                pattern: pattern.to_string(),
                                existing: edge.name.clone(),
                                name: spec.name.clone(),
                            });
                        }
                        idx
                    }
                    None => {
                        self.dynamic_children.push(DynamicEdge {
                            ty: ty.clone(),
                            name: spec.name.clone(),
                            node: Node::new(format!("<{}:{}>", spec.name, ty.name())),
                        });
                        self.dynamic_children.len() - 1
                    }
                };
                self.dynamic_children[idx].node.insert(rest, types, entry)
            }
        }
    }

    /// Finds an endpoint accepting `method` for a split path.
    ///
    /// Dynamic captures along the successful branch are left in `bound`.
    /// The first endpoint reached that rejects `method` is kept in
    /// `fallback` so the caller can report its allowed methods.
    pub(crate) fn find<'a, 's>(
        &'a self,
        method: &Method,
        segments: &[&'s str],
        bound: &mut Vec<(&'a str, &'a CompiledType, &'s str)>,
        fallback: &mut Option<&'a Endpoint<T>>,
    ) -> Option<&'a Endpoint<T>> {
        let Some((&segment, rest)) = segments.split_first() else {
            if self.endpoint.is_empty() {
                return None;
            }
            if self.endpoint.resolve(method).is_some() {
                return Some(&self.endpoint);
            }
            if fallback.is_none() {
                *fallback = Some(&self.endpoint);
            }
            return None;
        };

        if segment.is_empty() {
            return None;
        }

        // Static edges first, then dynamic edges in insertion order.
        if let Ok(idx) = self
            .static_children
            .binary_search_by(|c| c.segment.as_str().cmp(segment))
        {
            if let Some(found) = self.static_children[idx].find(method, rest, bound, fallback) {
                return Some(found);
            }
        }

        for edge in &self.dynamic_children {
            if let Some(raw) = edge.ty.capture(segment) {
                bound.push((edge.name.as_str(), &edge.ty, raw));
                if let Some(found) = edge.node.find(method, rest, bound, fallback) {
                    return Some(found);
                }
                bound.pop();
            }
        }

        None
    }

    /// Number of endpoint nodes below and including this one.
    pub(crate) fn endpoint_count(&self) -> usize {
        usize::from(!self.endpoint.is_empty())
            + self
                .static_children
                .iter()
                .map(Node::endpoint_count)
                .sum::<usize>()
            + self
                .dynamic_children
                .iter()
                .map(|e| e.node.endpoint_count())
                .sum::<usize>()
    }
}

/// Splits a request path into segments.
///
/// A single trailing slash is ignored; the root path yields no segments.
pub(crate) fn split_path(path: &str) -> Vec<&str> {
    let rest = path.strip_prefix('/').unwrap_or(path);
    if rest.is_empty() {
        return Vec::new();
    }
    let rest = rest.strip_suffix('/').unwrap_or(rest);
    rest.split('/').collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::RoutePattern;
    use crate::route::Route;

    fn entry(pattern: &str, method: Method) -> Arc<RouteEntry<&'static str>> {
        let parsed = RoutePattern::parse(pattern).unwrap();
        Arc::new(Route::new(pattern, "v").method(method).into_entry(parsed))
    }

    fn insert(root: &mut Node<&'static str>, pattern: &str, method: Method) -> RouteResult<()> {
        let types = ParamTypes::new();
        let e = entry(pattern, method);
        for variant in e.pattern().variants() {
            root.insert(&variant, &types, &e)?;
        }
        Ok(())
    }

    #[test]
    fn test_split_path() {
        assert!(split_path("/").is_empty());
        assert!(split_path("").is_empty());
        assert_eq!(split_path("/users"), vec!["users"]);
        assert_eq!(split_path("/users/"), vec!["users"]);
        assert_eq!(split_path("/users//5"), vec!["users", "", "5"]);
        assert_eq!(split_path("//"), vec![""]);
    }

    #[test]
    fn test_static_children_sorted() {
        let mut root = Node::root();
        insert(&mut root, "/c", Method::GET).unwrap();
        insert(&mut root, "/a", Method::GET).unwrap();
        insert(&mut root, "/b", Method::GET).unwrap();

        let order: Vec<_> = root
            .static_children
            .iter()
            .map(|c| c.segment.as_str())
            .collect();
        assert_eq!(order, vec!["a", "b", "c"]);
        assert_eq!(root.endpoint_count(), 3);
    }

    #[test]
    fn test_dynamic_edges_keyed_by_type() {
        let mut root = Node::root();
        insert(&mut root, "/<id:int>", Method::GET).unwrap();
        insert(&mut root, "/<id:int>/x", Method::GET).unwrap();
        insert(&mut root, "/<slug:slug>", Method::GET).unwrap();

        assert_eq!(root.dynamic_children.len(), 2);
        assert_eq!(root.dynamic_children[0].ty.name(), "int");
        assert_eq!(root.dynamic_children[1].ty.name(), "slug");
    }

    #[test]
    fn test_param_name_conflict() {
        let mut root = Node::root();
        insert(&mut root, "/<id:int>", Method::GET).unwrap();
        let err = insert(&mut root, "/<pk:int>", Method::POST).unwrap_err();
        assert!(matches!(err, RouteError::ParamNameConflict { .. }));
    }

    #[test]
    fn test_find_backtracks_from_static() {
        let mut root = Node::root();
        insert(&mut root, "/users/me/settings", Method::GET).unwrap();
        insert(&mut root, "/users/<name>", Method::GET).unwrap();

        let segments = split_path("/users/me");
        let mut bound = Vec::new();
        let found = root
            .find(&Method::GET, &segments, &mut bound, &mut None)
            .unwrap();
        assert!(found.has_method(&Method::GET));
        assert_eq!(bound.len(), 1);
        assert_eq!(bound[0].0, "name");
        assert_eq!(bound[0].2, "me");
    }

    #[test]
    fn test_find_rejects_empty_segment() {
        let mut root = Node::root();
        insert(&mut root, "/users/<id>", Method::GET).unwrap();

        let mut bound = Vec::new();
        assert!(root
            .find(&Method::GET, &split_path("/users//5"), &mut bound, &mut None)
            .is_none());
        assert!(bound.is_empty());
    }

    #[test]
    fn test_find_skips_endpoint_without_method() {
        let mut root = Node::root();
        insert(&mut root, "/users/me", Method::POST).unwrap();
        insert(&mut root, "/users/<name>", Method::GET).unwrap();

        let segments = split_path("/users/me");
        let mut bound = Vec::new();
        let mut fallback = None;
        let found = root
            .find(&Method::GET, &segments, &mut bound, &mut fallback)
            .unwrap();
        assert!(found.has_method(&Method::GET));
        assert_eq!(bound[0].0, "name");
        assert!(fallback.unwrap().has_method(&Method::POST));
    }

    #[test]
    fn test_find_records_fallback_when_no_branch_accepts() {
        let mut root = Node::root();
        insert(&mut root, "/users/me", Method::POST).unwrap();

        let mut bound = Vec::new();
        let mut fallback = None;
        assert!(root
            .find(&Method::GET, &split_path("/users/me"), &mut bound, &mut fallback)
            .is_none());
        assert_eq!(fallback.unwrap().allowed_methods(), vec![Method::POST]);
    }
}
