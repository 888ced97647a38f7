//! Relationship resolution - shortest paths between entities.
//!
//! Resolution first looks for a direct edge, then falls back to a bounded
//! breadth-first search over the [`SchemaGraph`]. An unreachable entity is an
//! expected outcome and is reported as `None`, never as an error.


use std::collections::{HashMap, HashSet, VecDeque};

use petgraph::graph::{EdgeIndex, NodeIndex};
use serde::Serialize;

use crate::schema::{RelationshipEdge, SchemaGraph};

/// Default maximum number of hops a resolved path may have.
pub const DEFAULT_MAX_DEPTH: usize = 3;

/// An ordered chain of edges from `start` to `end`.
///
/// Consecutive edges are connected (`edges[i].to_entity ==
/// edges[i + 1].from_entity`) and no entity appears twice. The empty path
/// means `start == end`: no relationship is needed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelationshipPath {
    pub start: String,
    pub end: String,
    pub edges: Vec<RelationshipEdge>,
}

impl RelationshipPath {
    /// The empty path from an entity to itself.
    pub fn identity(entity: &str) -> Self {
        Self {
            start: entity.into(),
            end: entity.into(),
            edges: vec![],
        }
    }

    /// Number of hops in this path.
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Is this path empty (same start and end)?
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// All entities on the path, including start and end.
    pub fn entities(&self) -> Vec<&str> {
        let mut result = vec![self.start.as_str()];
        result.extend(self.edges.iter().map(|e| e.to_entity.as_str()));
        result
    }
}

/// Parent information for path reconstruction.
struct ParentInfo {
    parent: NodeIndex,
    edge_idx: EdgeIndex,
}

/// Finds shortest relationship paths over a read-only [`SchemaGraph`].
///
/// Holds nothing but a shared reference and a depth bound, so it is `Copy`
/// and can be used from many threads at once.
#[derive(Debug, Clone, Copy)]
pub struct RelationshipResolver<'a> {
    graph: &'a SchemaGraph,
    max_depth: usize,
}

impl<'a> RelationshipResolver<'a> {
    pub fn new(graph: &'a SchemaGraph) -> Self {
        Self {
            graph,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn graph(&self) -> &'a SchemaGraph {
        self.graph
    }

    /// Resolve a path using the configured depth bound.
    pub fn resolve(&self, start: &str, end: &str) -> Option<RelationshipPath> {
        self.resolve_within(start, end, self.max_depth)
    }

    /// Find the shortest path from `start` to `end` with at most `max_depth`
    /// edges.
    ///
    /// A direct edge always wins. Otherwise the BFS explores layer by layer
    /// and returns the first path that reaches `end`, which is a shortest one.
    /// Returns `None` if either entity is unknown or nothing connects them
    /// within the bound.
    pub fn resolve_within(
        &self,
        start: &str,
        end: &str,
        max_depth: usize,
    ) -> Option<RelationshipPath> {
        let start_idx = self.graph.node_index(start)?;
        let end_idx = self.graph.node_index(end)?;

        // Same entity = empty path
        if start_idx == end_idx {
            return Some(RelationshipPath::identity(start));
        }

        if max_depth == 0 {
            return None;
        }

        if let Some(edge) = self.direct_edge(start_idx, end_idx) {
            return Some(RelationshipPath {
                start: start.into(),
                end: end.into(),
                edges: vec![edge.clone()],
            });
        }

        let mut visited: HashSet<NodeIndex> = HashSet::new();
        let mut parents: HashMap<NodeIndex, ParentInfo> = HashMap::new();
        let mut queue: VecDeque<(NodeIndex, usize)> = VecDeque::new();

        queue.push_back((start_idx, 0));
        visited.insert(start_idx);

        while let Some((current, depth)) = queue.pop_front() {
            if depth >= max_depth {
                continue;
            }

            for (edge_idx, neighbor) in self.graph.outgoing(current) {
                if !visited.insert(neighbor) {
                    continue;
                }

                parents.insert(
                    neighbor,
                    ParentInfo {
                        parent: current,
                        edge_idx,
                    },
                );

                if neighbor == end_idx {
                    let path = self.reconstruct_path(start, end, start_idx, end_idx, &parents);
                    tracing::trace!(start, end, hops = path.len(), "resolved relationship path");
                    return Some(path);
                }

                queue.push_back((neighbor, depth + 1));
            }
        }

        None
    }

    /// First registered edge leading from `start` straight to `end`.
    fn direct_edge(&self, start: NodeIndex, end: NodeIndex) -> Option<&'a RelationshipEdge> {
        let graph = self.graph;
        graph
            .outgoing(start)
            .into_iter()
            .find(|(_, target)| *target == end)
            .map(|(edge, _)| graph.edge(edge))
    }

    /// Walk parent pointers back from `end_idx`, then reverse.
    fn reconstruct_path(
        &self,
        start: &str,
        end: &str,
        start_idx: NodeIndex,
        end_idx: NodeIndex,
        parents: &HashMap<NodeIndex, ParentInfo>,
    ) -> RelationshipPath {
        let mut edges = Vec::new();
        let mut current = end_idx;

        while current != start_idx {
            let Some(info) = parents.get(&current) else {
                break;
            };
            edges.push(self.graph.edge(info.edge_idx).clone());
            current = info.parent;
        }

        edges.reverse();
        RelationshipPath {
            start: start.into(),
            end: end.into(),
            edges,
        }
    }
}
