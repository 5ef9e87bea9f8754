//! Dependency closure
//!
//! Expands a requested set of components to everything they transitively
//! depend on. Membership is checked before enqueueing, so cycles stop
//! expanding once every member has been seen.

use crate::error::{CompkitError, CompkitResult};
use std::collections::{HashMap, HashSet, VecDeque};

/// Declared dependencies, keyed by component name
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    edges: HashMap<String, Vec<String>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from `(name, dependencies)` pairs
    pub fn from_components<I, S>(components: I) -> Self
    where
        I: IntoIterator<Item = (S, Vec<String>)>,
        S: Into<String>,
    {
        let edges = components
            .into_iter()
            .map(|(name, deps)| (name.into(), deps))
            .collect();
        Self { edges }
    }

    pub fn insert(&mut self, name: impl Into<String>, dependencies: Vec<String>) {
        self.edges.insert(name.into(), dependencies);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.edges.contains_key(name)
    }

    pub fn dependencies_of(&self, name: &str) -> Option<&[String]> {
        self.edges.get(name).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

/// Compute the transitive closure of `requested` over `graph`.
///
/// Names come back in breadth-first discovery order, requested names
/// first and without duplicates. Any name missing from the graph fails
/// the whole resolution.
pub fn resolve<S: AsRef<str>>(
    requested: &[S],
    graph: &DependencyGraph,
) -> CompkitResult<Vec<String>> {
    let mut order = Vec::new();
    let mut seen = HashSet::new();
    let mut queue = VecDeque::new();

    for name in requested {
        let name = name.as_ref();
        if seen.insert(name.to_string()) {
            order.push(name.to_string());
            queue.push_back(name.to_string());
        }
    }

    while let Some(name) = queue.pop_front() {
        let Some(dependencies) = graph.dependencies_of(&name) else {
            let required_by = parent_of(&name, &order, graph);
            return Err(CompkitError::ComponentNotFound { name, required_by });
        };

        for dep in dependencies {
            if seen.insert(dep.clone()) {
                order.push(dep.clone());
                queue.push_back(dep.clone());
            }
        }
    }

    Ok(order)
}

/// First resolved component that declares `name` as a dependency
fn parent_of(name: &str, order: &[String], graph: &DependencyGraph) -> Option<String> {
    order
        .iter()
        .find(|candidate| {
            graph
                .dependencies_of(candidate)
                .is_some_and(|deps| deps.iter().any(|d| d == name))
        })
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(edges: &[(&str, &[&str])]) -> DependencyGraph {
        DependencyGraph::from_components(edges.iter().map(|(name, deps)| {
            (
                name.to_string(),
                deps.iter().map(|d| d.to_string()).collect::<Vec<_>>(),
            )
        }))
    }

    #[test]
    fn expands_transitive_dependencies() {
        let g = graph(&[
            ("table", &["button", "checkbox"]),
            ("button", &[]),
            ("checkbox", &["label"]),
            ("label", &[]),
        ]);
        let resolved = resolve(&["table"], &g).unwrap();
        assert_eq!(resolved, vec!["table", "button", "checkbox", "label"]);
    }

    #[test]
    fn requested_names_first_and_deduplicated() {
        let g = graph(&[("table", &["button"]), ("button", &[])]);
        let resolved = resolve(&["button", "table", "button"], &g).unwrap();
        assert_eq!(resolved, vec!["button", "table"]);
    }

    #[test]
    fn cycles_terminate() {
        let g = graph(&[("a", &["b"]), ("b", &["a"])]);
        let resolved = resolve(&["a"], &g).unwrap();
        assert_eq!(resolved, vec!["a", "b"]);
    }

    #[test]
    fn missing_requested_name_fails() {
        let g = graph(&[("button", &[])]);
        let err = resolve(&["dialog"], &g).unwrap_err();
        match err {
            CompkitError::ComponentNotFound { name, required_by } => {
                assert_eq!(name, "dialog");
                assert!(required_by.is_none());
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn missing_dependency_names_parent() {
        let g = graph(&[("table", &["button"]), ("button", &["icon"])]);
        let err = resolve(&["table"], &g).unwrap_err();
        match err {
            CompkitError::ComponentNotFound { name, required_by } => {
                assert_eq!(name, "icon");
                assert_eq!(required_by.as_deref(), Some("button"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn empty_request_resolves_to_nothing() {
        let g = graph(&[("button", &[])]);
        let resolved = resolve::<&str>(&[], &g).unwrap();
        assert!(resolved.is_empty());
    }
}
