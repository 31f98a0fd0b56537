//! Inferred foreign-key graph of a schema.
//!
//! Edges are inferred purely from column names: a table links to another
//! table when it carries a column named like that table's primary key.
//! Declared constraints are never consulted.
//!
//! ```text
//! orders(order_id PK, customer_id)      customers(customer_id PK)
//!
//!   orders.linked_to    = [customers]
//!   customers.linked_from = [orders]
//! ```
//!
//! The graph is built once ([`build`]), can be serialized for caching, and is
//! never mutated afterwards. [`SchemaGraph::find_joins`] searches it.

mod builder;
mod path;

pub use builder::{build, BuildOptions};
pub use path::DEFAULT_MAX_DEPTH;

use std::collections::{BTreeSet, HashMap};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};

use crate::cache::compute_hash;
use crate::error::{Error, Result};

/// One table of the schema graph.
///
/// `linked_to` and `linked_from` are the stored form of the inferred edges.
/// The graph adds one edge per `linked_to` entry when it is assembled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDescriptor {
    pub name: String,
    /// Column names in database-reported order.
    pub columns: Vec<String>,
    /// Single primary-key column, if the table has exactly one.
    pub primary_key: Option<String>,
    /// Tables this table references, in discovery order. May repeat.
    #[serde(default)]
    pub linked_to: Vec<String>,
    /// Tables that reference this table, in discovery order. May repeat.
    #[serde(default)]
    pub linked_from: Vec<String>,
}

impl TableDescriptor {
    /// Whether this table has an outgoing edge to `table`.
    pub fn links_to(&self, table: &str) -> bool {
        self.linked_to.iter().any(|t| t == table)
    }
}

/// Directed table graph. Nodes are tables in enumeration order, edges point
/// from the referencing table to the referenced one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<TableDescriptor>", into = "Vec<TableDescriptor>")]
pub struct SchemaGraph {
    graph: DiGraph<TableDescriptor, ()>,
    node_indices: HashMap<String, NodeIndex>,
}

impl From<Vec<TableDescriptor>> for SchemaGraph {
    fn from(tables: Vec<TableDescriptor>) -> Self {
        let mut graph = DiGraph::with_capacity(tables.len(), 0);
        let mut node_indices = HashMap::with_capacity(tables.len());

        for table in tables {
            let name = table.name.clone();
            let idx = graph.add_node(table);
            node_indices.insert(name, idx);
        }

        let nodes: Vec<NodeIndex> = graph.node_indices().collect();
        for from in nodes {
            let targets = graph[from].linked_to.clone();
            for target in targets {
                match node_indices.get(&target) {
                    Some(&to) => {
                        graph.add_edge(from, to, ());
                    }
                    None => log::warn!(
                        "'{}' links to unknown table '{}', ignoring edge",
                        graph[from].name,
                        target
                    ),
                }
            }
        }

        Self {
            graph,
            node_indices,
        }
    }
}

impl From<SchemaGraph> for Vec<TableDescriptor> {
    fn from(graph: SchemaGraph) -> Self {
        let (nodes, _) = graph.graph.into_nodes_edges();
        nodes.into_iter().map(|node| node.weight).collect()
    }
}

impl PartialEq for SchemaGraph {
    fn eq(&self, other: &Self) -> bool {
        self.tables().eq(other.tables())
    }
}

impl Eq for SchemaGraph {}

impl SchemaGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn contains(&self, table: &str) -> bool {
        self.node_indices.contains_key(table)
    }

    /// Look up a table by name.
    pub fn table(&self, name: &str) -> Option<&TableDescriptor> {
        self.node_indices.get(name).map(|&idx| &self.graph[idx])
    }

    /// Look up a table by name, failing with `UnknownTable`.
    pub fn get(&self, name: &str) -> Result<&TableDescriptor> {
        self.table(name)
            .ok_or_else(|| Error::UnknownTable(name.to_string()))
    }

    pub fn tables(&self) -> impl Iterator<Item = &TableDescriptor> {
        self.graph.node_weights()
    }

    /// Distinct `(from, to)` edges in discovery order.
    pub fn edges(&self) -> Vec<(&str, &str)> {
        let mut seen = BTreeSet::new();
        self.graph
            .edge_references()
            .map(|e| {
                (
                    self.graph[e.source()].name.as_str(),
                    self.graph[e.target()].name.as_str(),
                )
            })
            .filter(|edge| seen.insert(*edge))
            .collect()
    }

    /// Sorted, de-duplicated edge set. Equal for graphs that differ only in
    /// duplicate-entry artifacts.
    pub fn edge_set(&self) -> BTreeSet<(String, String)> {
        self.edges()
            .into_iter()
            .map(|(a, b)| (a.to_string(), b.to_string()))
            .collect()
    }

    /// Content hash of the edge set.
    pub fn fingerprint(&self) -> Result<String> {
        Ok(compute_hash(&self.edge_set())?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    fn node(&self, name: &str) -> Result<NodeIndex> {
        self.node_indices
            .get(name)
            .copied()
            .ok_or_else(|| Error::UnknownTable(name.to_string()))
    }

    /// Targets of the outgoing edges of `idx`, in the order they were added.
    fn successors(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut out: Vec<_> = self
            .graph
            .edges(idx)
            .map(|e| (e.id(), e.target()))
            .collect();
        // petgraph yields the newest edge first.
        out.sort_by_key(|(id, _)| *id);
        out.into_iter().map(|(_, target)| target).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(name: &str, pk: Option<&str>, linked_to: &[&str]) -> TableDescriptor {
        TableDescriptor {
            name: name.to_string(),
            columns: pk.iter().map(|s| s.to_string()).collect(),
            primary_key: pk.map(String::from),
            linked_to: linked_to.iter().map(|s| s.to_string()).collect(),
            linked_from: vec![],
        }
    }

    #[test]
    fn test_lookup() {
        let graph = SchemaGraph::from(vec![
            descriptor("orders", Some("order_id"), &["customers"]),
            descriptor("customers", Some("customer_id"), &[]),
        ]);

        assert_eq!(graph.len(), 2);
        assert!(graph.contains("orders"));
        assert!(graph.get("orders").unwrap().links_to("customers"));
        assert!(graph.get("nope").unwrap_err().is_unknown_table());
    }

    #[test]
    fn test_edges_are_deduplicated() {
        let graph = SchemaGraph::from(vec![
            descriptor("a", Some("a_id"), &["b", "b", "c"]),
            descriptor("b", Some("b_id"), &[]),
            descriptor("c", Some("c_id"), &[]),
        ]);
        assert_eq!(graph.edges(), vec![("a", "b"), ("a", "c")]);
    }

    #[test]
    fn test_json_round_trip_rebuilds_index() {
        let graph = SchemaGraph::from(vec![
            descriptor("orders", Some("order_id"), &["customers"]),
            descriptor("customers", Some("customer_id"), &[]),
        ]);

        let json = graph.to_json().unwrap();
        assert!(json.starts_with('['));

        let restored = SchemaGraph::from_json(&json).unwrap();
        assert_eq!(restored, graph);
        assert!(restored.table("customers").is_some());
        assert_eq!(restored.edges(), vec![("orders", "customers")]);
    }

    #[test]
    fn test_unknown_link_target_is_dropped() {
        let graph = SchemaGraph::from(vec![descriptor("a", Some("a_id"), &["ghost", "a"])]);
        assert_eq!(graph.edges(), vec![("a", "a")]);
    }

    #[test]
    fn test_successors_keep_link_order() {
        let graph = SchemaGraph::from(vec![
            descriptor("a", Some("a_id"), &["c", "b", "c"]),
            descriptor("b", Some("b_id"), &[]),
            descriptor("c", Some("c_id"), &[]),
        ]);
        let a = graph.node("a").unwrap();
        let names: Vec<&str> = graph
            .successors(a)
            .into_iter()
            .map(|idx| graph.graph[idx].name.as_str())
            .collect();
        assert_eq!(names, vec!["c", "b", "c"]);
    }

    #[test]
    fn test_fingerprint_ignores_duplicates() {
        let a = SchemaGraph::from(vec![descriptor("a", None, &["b", "b"])]);
        let b = SchemaGraph::from(vec![descriptor("a", None, &["b"])]);
        assert_eq!(a.fingerprint().unwrap(), b.fingerprint().unwrap());
    }
}
