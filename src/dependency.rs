//! Record of which protocols may hand data to which.
//!
//! The graph answers impact questions such as "what stops being decoded if I
//! disable X". Dispatch never reads it.

use std::collections::{BTreeMap, BTreeSet};

/// Deduplicated set of `(parent, dependent)` protocol-name pairs.
#[derive(Clone, Debug, Default)]
pub struct DependencyGraph {
    edges: BTreeMap<String, BTreeSet<String>>,
}

impl DependencyGraph {
    /// Record that `parent` may hand data to `dependent`.
    ///
    /// Returns `true` when the edge is new.
    pub fn register(&mut self, parent: &str, dependent: &str) -> bool {
        self.edges
            .entry(parent.to_owned())
            .or_default()
            .insert(dependent.to_owned())
    }

    /// Remove the edge from `parent` to `dependent`.
    ///
    /// Returns `true` when the edge existed.
    pub fn deregister(&mut self, parent: &str, dependent: &str) -> bool {
        let Some(dependents) = self.edges.get_mut(parent) else {
            return false;
        };
        let removed = dependents.remove(dependent);
        if dependents.is_empty() {
            self.edges.remove(parent);
        }
        removed
    }

    /// Direct dependents of `parent`.
    #[must_use]
    pub fn dependents_of(&self, parent: &str) -> BTreeSet<String> {
        self.edges.get(parent).cloned().unwrap_or_default()
    }

    /// Every protocol reachable from `protocol`, excluding `protocol` itself
    /// unless it lies on a cycle.
    ///
    /// ```
    /// use dissect_core::dependency::DependencyGraph;
    ///
    /// let mut graph = DependencyGraph::default();
    /// graph.register("eth", "ip");
    /// graph.register("ip", "udp");
    /// let impacted: Vec<_> = graph.impacted_by("eth").into_iter().collect();
    /// assert_eq!(impacted, ["ip", "udp"]);
    /// ```
    #[must_use]
    pub fn impacted_by(&self, protocol: &str) -> BTreeSet<String> {
        let mut impacted = BTreeSet::new();
        let mut pending: Vec<&str> = vec![protocol];
        while let Some(current) = pending.pop() {
            let Some(dependents) = self.edges.get(current) else {
                continue;
            };
            for dependent in dependents {
                if impacted.insert(dependent.clone()) {
                    pending.push(dependent);
                }
            }
        }
        impacted
    }

    /// Number of edges.
    #[must_use]
    pub fn len(&self) -> usize { self.edges.values().map(BTreeSet::len).sum() }

    /// Whether no edge is recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.edges.is_empty() }
}
