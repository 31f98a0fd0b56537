//! Join-path search over the schema graph.
//!
//! Depth-first, following `linked_to` edges in insertion order. The first
//! path found wins; there is no shortest-path guarantee. A table already on
//! the current path is never revisited, but separate branches may explore
//! the same table again. That is fine for schemas of a few dozen tables.

use petgraph::graph::NodeIndex;

use super::SchemaGraph;
use crate::error::{Error, Result};

/// Default bound on the accumulated path length, start table included.
pub const DEFAULT_MAX_DEPTH: usize = 100;

impl SchemaGraph {
    /// Find a join path from `start` to `end`.
    ///
    /// The returned path excludes `start` and ends with `end`; every
    /// consecutive pair of `[start] + path` is an edge of the graph.
    /// Returns `Ok(None)` when `end` is unreachable. Both tables must exist.
    ///
    /// A table joins to itself only through an explicit self edge, in which
    /// case the path is `[start]`.
    pub fn find_joins(&self, start: &str, end: &str) -> Result<Option<Vec<String>>> {
        self.find_joins_with_depth(start, end, DEFAULT_MAX_DEPTH)
    }

    /// Like [`find_joins`](Self::find_joins) with an explicit depth bound.
    ///
    /// Fails with `RunawaySearch` once the path under construction, counting
    /// the start table, holds more than `max_depth` tables.
    pub fn find_joins_with_depth(
        &self,
        start: &str,
        end: &str,
        max_depth: usize,
    ) -> Result<Option<Vec<String>>> {
        let origin = self.node(start)?;
        let target = self.node(end)?;

        if origin == target {
            let found = self.graph.contains_edge(origin, target);
            return Ok(found.then(|| vec![end.to_string()]));
        }

        let search = JoinSearch {
            graph: self,
            origin,
            target,
            max_depth,
        };
        let path = search.descend(origin, Vec::new())?.map(|nodes| {
            nodes
                .into_iter()
                .map(|idx| self.graph[idx].name.clone())
                .collect::<Vec<_>>()
        });

        match &path {
            Some(p) => log::debug!("join path {} -> {}: {:?}", start, end, p),
            None => log::debug!("no join path {} -> {}", start, end),
        }
        Ok(path)
    }

    /// Whether `end` is reachable from `start`.
    pub fn has_path(&self, start: &str, end: &str) -> Result<bool> {
        Ok(self.find_joins(start, end)?.is_some())
    }
}

/// Immutable search context. All per-branch state travels in `path`.
struct JoinSearch<'a> {
    graph: &'a SchemaGraph,
    origin: NodeIndex,
    target: NodeIndex,
    max_depth: usize,
}

impl JoinSearch<'_> {
    fn descend(&self, current: NodeIndex, path: Vec<NodeIndex>) -> Result<Option<Vec<NodeIndex>>> {
        let depth = path.len() + 1;
        if depth > self.max_depth {
            let name = |idx: NodeIndex| self.graph.graph[idx].name.clone();
            log::warn!(
                "runaway join search {} -> {} aborted at depth {}",
                name(self.origin),
                name(self.target),
                depth
            );
            return Err(Error::RunawaySearch {
                start: name(self.origin),
                end: name(self.target),
                depth,
            });
        }

        let successors = self.graph.successors(current);
        if successors.contains(&self.target) {
            let mut path = path;
            path.push(self.target);
            return Ok(Some(path));
        }

        for neighbor in successors {
            if neighbor == self.origin || path.contains(&neighbor) {
                continue;
            }

            let mut extended = path.clone();
            extended.push(neighbor);

            if let Some(found) = self.descend(neighbor, extended)? {
                return Ok(Some(found));
            }
        }

        Ok(None)
    }
}
