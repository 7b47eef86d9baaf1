//! Series hierarchy reconstructed from delimited series names.
//!
//! The catalog stores series flat: a row named `Discworld.City Watch` means
//! "City Watch, inside Discworld". Each delimited segment becomes one node in
//! a [`SeriesRegistry`] keyed by segment name, so a segment shared by several
//! rows (`Discworld.Rincewind`, `Discworld.City Watch`) is a single node.
//!
//! Building happens in two passes:
//!
//! 1. [`SeriesRegistry::insert_chain`] for every catalog row. Each segment is
//!    written with its parent (the previous segment) and a `leaf` flag (last
//!    segment of the chain). Writes for a name that already exists replace
//!    the earlier node: across the whole pass, the last writer wins.
//! 2. [`SeriesRegistry::build_forest`] once all nodes exist. Roots (nodes
//!    without a parent) are sorted by name, then a breadth-first walk assigns
//!    each dequeued node its name-sorted children.
//!
//! Catalog data can make the last-writer pass produce a parent cycle
//! (`A.B.A` leaves `A → B → A`). Nodes on such a cycle are unreachable from
//! any root and stay out of the forest; they remain in the registry.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use crate::naming::slugify;

/// One level of the series hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesNode {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    pub slug: String,
    /// True when this node was last written as the final segment of a chain.
    pub leaf: bool,
    /// Child node names, sorted. Empty until [`SeriesRegistry::build_forest`].
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<String>,
}

/// Keyed node registry plus the sorted root list of the forest.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SeriesRegistry {
    nodes: BTreeMap<String, SeriesNode>,
    roots: Vec<String>,
}

impl SeriesRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write one node per segment of `chain`, replacing same-named nodes.
    pub fn insert_chain(&mut self, chain: &[String]) {
        let last = chain.len().saturating_sub(1);
        for (i, name) in chain.iter().enumerate() {
            let node = SeriesNode {
                name: name.clone(),
                parent: i.checked_sub(1).map(|p| chain[p].clone()),
                slug: slugify(name),
                leaf: i == last,
                children: Vec::new(),
            };
            if let Some(previous) = self.nodes.insert(name.clone(), node) {
                tracing::trace!(series = %previous.name, "series node rewritten");
            }
        }
    }

    /// Populate `children` for every node reachable from a root.
    ///
    /// Safe to call more than once; each call recomputes the forest from the
    /// parent pointers.
    pub fn build_forest(&mut self) {
        let mut by_parent: HashMap<String, Vec<String>> = HashMap::new();
        for node in self.nodes.values_mut() {
            node.children.clear();
            if let Some(parent) = &node.parent {
                by_parent
                    .entry(parent.clone())
                    .or_default()
                    .push(node.name.clone());
            }
        }

        let mut roots: Vec<String> = self
            .nodes
            .values()
            .filter(|n| n.parent.is_none())
            .map(|n| n.name.clone())
            .collect();
        roots.sort();

        let mut queue: VecDeque<String> = roots.iter().cloned().collect();
        let mut visited = HashSet::new();
        while let Some(name) = queue.pop_front() {
            if !visited.insert(name.clone()) {
                continue;
            }
            let mut children = by_parent.remove(&name).unwrap_or_default();
            children.sort();
            queue.extend(children.iter().cloned());
            if let Some(node) = self.nodes.get_mut(&name) {
                node.children = children;
            }
        }

        let orphaned = self.nodes.len() - visited.len();
        if orphaned > 0 {
            tracing::warn!(orphaned, "series nodes unreachable from any root");
        }
        self.roots = roots;
    }

    pub fn get(&self, name: &str) -> Option<&SeriesNode> {
        self.nodes.get(name)
    }

    /// All nodes, in name order.
    pub fn nodes(&self) -> impl Iterator<Item = &SeriesNode> {
        self.nodes.values()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Forest roots, sorted by name.
    pub fn roots(&self) -> impl Iterator<Item = &SeriesNode> {
        self.roots.iter().filter_map(|name| self.nodes.get(name))
    }

    /// Sorted children of `node`.
    pub fn children<'a>(&'a self, node: &'a SeriesNode) -> impl Iterator<Item = &'a SeriesNode> {
        node.children.iter().filter_map(|name| self.nodes.get(name))
    }

    /// Resolve a chain of names to nodes, skipping names with no node.
    pub fn resolve_chain(&self, names: &[String]) -> Vec<&SeriesNode> {
        names.iter().filter_map(|name| self.nodes.get(name)).collect()
    }
}
