//! SchemaGraph - the load-once registry of entities and relationship edges.
//!
//! Every relationship is stored in both directions, so traversal works from
//! either endpoint:
//!
//! ```text
//!   Account ──ParentOf (Contacts)──▶ Contact
//!   Account ◀──ChildOf (Account)──── Contact
//! ```
//!
//! Relationship names are resolved when the graph is built (explicit name,
//! else the fallback in [`naming`]), so the resolver and the renderer always
//! agree on them.

mod definition;
pub mod naming;


pub use definition::{EntityDefinition, RelationshipDefinition, SchemaDefinition};

use std::collections::HashMap;
use std::fmt;

use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{SchemaError, SchemaResult};

/// Logical direction of an edge, seen from its `from_entity`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    /// `from_entity` is the parent of `to_entity` (one-to-many).
    ParentOf,
    /// `from_entity` is a child of `to_entity` (many-to-one).
    ChildOf,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::ParentOf => write!(f, "parent of"),
            Direction::ChildOf => write!(f, "child of"),
        }
    }
}

/// A directed, typed edge between two entities.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RelationshipEdge {
    pub from_entity: String,
    pub to_entity: String,
    pub direction: Direction,
    /// Foreign key on the child side of the relationship.
    pub foreign_key_field: String,
    /// Name used when this edge is rendered (subquery source or dotted path).
    pub relationship_name: String,
}

/// A node in the entity graph.
#[derive(Debug, Clone)]
pub struct EntityNode {
    pub name: String,
    pub fields: Vec<String>,
}

/// Non-fatal problems found while building the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SchemaWarning {
    /// Two relationships connect the same pair with different names.
    /// The first-registered one is kept.
    AmbiguousRelationshipName {
        from: String,
        to: String,
        kept: String,
        discarded: String,
    },
    /// A relationship from an entity to itself. It is never navigated.
    SelfRelationshipIgnored { entity: String, foreign_key: String },
}

impl fmt::Display for SchemaWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaWarning::AmbiguousRelationshipName {
                from,
                to,
                kept,
                discarded,
            } => write!(
                f,
                "ambiguous relationship name {} -> {}: kept '{}', discarded '{}'",
                from, to, kept, discarded
            ),
            SchemaWarning::SelfRelationshipIgnored {
                entity,
                foreign_key,
            } => write!(
                f,
                "self relationship {}.{} ignored",
                entity, foreign_key
            ),
        }
    }
}

/// Immutable graph of entities and relationship edges.
///
/// Built once from a [`SchemaDefinition`]; nothing is added or removed
/// afterwards, so a shared reference can be used from any number of threads.
#[derive(Debug, Clone)]
pub struct SchemaGraph {
    /// Nodes are entities, edges are relationships (both directions stored).
    graph: DiGraph<EntityNode, RelationshipEdge>,

    /// Mapping from entity name to node index.
    node_indices: HashMap<String, NodeIndex>,

    warnings: Vec<SchemaWarning>,
}

impl SchemaGraph {
    /// Build the graph from a schema definition.
    pub fn from_definition(definition: SchemaDefinition) -> SchemaResult<Self> {
        let mut graph: DiGraph<EntityNode, RelationshipEdge> = DiGraph::new();
        let mut node_indices = HashMap::new();
        let mut warnings = Vec::new();

        for entity in definition.entities {
            ensure_identifier(&entity.name)?;
            for field in &entity.fields {
                ensure_identifier(field)?;
            }
            if node_indices.contains_key(&entity.name) {
                return Err(SchemaError::DuplicateEntity(entity.name));
            }

            let name = entity.name.clone();
            let idx = graph.add_node(EntityNode {
                name: entity.name,
                fields: entity.fields,
            });
            node_indices.insert(name, idx);
        }

        for rel in definition.relationships {
            ensure_identifier(&rel.foreign_key)?;
            for name in rel
                .child_relationship_name
                .iter()
                .chain(rel.parent_relationship_name.iter())
            {
                ensure_identifier(name)?;
            }

            let lookup = |entity: &str| {
                node_indices
                    .get(entity)
                    .copied()
                    .ok_or_else(|| SchemaError::UnknownEntity {
                        parent: rel.parent.clone(),
                        child: rel.child.clone(),
                        missing: entity.to_string(),
                    })
            };
            let parent_idx = lookup(&rel.parent)?;
            let child_idx = lookup(&rel.child)?;

            if parent_idx == child_idx {
                tracing::warn!(
                    entity = %rel.parent,
                    foreign_key = %rel.foreign_key,
                    "ignoring self relationship"
                );
                warnings.push(SchemaWarning::SelfRelationshipIgnored {
                    entity: rel.parent,
                    foreign_key: rel.foreign_key,
                });
                continue;
            }

            let down = RelationshipEdge {
                from_entity: rel.parent.clone(),
                to_entity: rel.child.clone(),
                direction: Direction::ParentOf,
                foreign_key_field: rel.foreign_key.clone(),
                relationship_name: rel
                    .child_relationship_name
                    .clone()
                    .unwrap_or_else(|| naming::child_relationship_name(&rel.child)),
            };
            let up = RelationshipEdge {
                from_entity: rel.child.clone(),
                to_entity: rel.parent.clone(),
                direction: Direction::ChildOf,
                foreign_key_field: rel.foreign_key.clone(),
                relationship_name: rel
                    .parent_relationship_name
                    .clone()
                    .unwrap_or_else(|| naming::parent_relationship_name(&rel.parent)),
            };

            // Both directions are always added together, so checking one
            // ordered pair is enough to detect a duplicate relationship.
            let existing = graph
                .find_edge(parent_idx, child_idx)
                .map(|e| (e, graph.find_edge(child_idx, parent_idx)));
            if let Some((existing_down, existing_up)) = existing {
                let kept = [Some(existing_down), existing_up];
                for (kept_idx, candidate) in kept.iter().zip([&down, &up]) {
                    let Some(kept_edge) = kept_idx.map(|i| &graph[i]) else {
                        continue;
                    };
                    if kept_edge.relationship_name != candidate.relationship_name {
                        tracing::warn!(
                            from = %candidate.from_entity,
                            to = %candidate.to_entity,
                            kept = %kept_edge.relationship_name,
                            discarded = %candidate.relationship_name,
                            "ambiguous relationship name, keeping first registered"
                        );
                        warnings.push(SchemaWarning::AmbiguousRelationshipName {
                            from: candidate.from_entity.clone(),
                            to: candidate.to_entity.clone(),
                            kept: kept_edge.relationship_name.clone(),
                            discarded: candidate.relationship_name.clone(),
                        });
                    }
                }
                continue;
            }

            graph.add_edge(parent_idx, child_idx, down);
            graph.add_edge(child_idx, parent_idx, up);
        }

        tracing::debug!(
            entities = graph.node_count(),
            edges = graph.edge_count(),
            warnings = warnings.len(),
            "schema graph built"
        );

        Ok(Self {
            graph,
            node_indices,
            warnings,
        })
    }

    /// Check if an entity exists in the graph.
    pub fn has_entity(&self, name: &str) -> bool {
        self.node_indices.contains_key(name)
    }

    /// Number of entities.
    pub fn entity_count(&self) -> usize {
        self.node_indices.len()
    }

    /// Number of relationships (each stored as two edges).
    pub fn relationship_count(&self) -> usize {
        self.graph.edge_count() / 2
    }

    /// All entity names, in definition order.
    pub fn entity_names(&self) -> Vec<&str> {
        self.graph
            .node_indices()
            .map(|idx| self.graph[idx].name.as_str())
            .collect()
    }

    /// Fields declared for an entity. `None` for unknown entities.
    pub fn entity_fields(&self, name: &str) -> Option<&[String]> {
        self.node_indices
            .get(name)
            .map(|idx| self.graph[*idx].fields.as_slice())
    }

    /// Is `field` a declared field of `entity`?
    ///
    /// Entities declared without a field list accept every field.
    pub fn has_field(&self, entity: &str, field: &str) -> bool {
        match self.entity_fields(entity) {
            Some([]) => true,
            Some(fields) => fields.iter().any(|f| f == field),
            None => false,
        }
    }

    /// All edges incident to `entity` in either logical direction, normalized
    /// so that `from_entity == entity`, in registration order.
    ///
    /// Returns an empty list for unknown entities.
    pub fn edges_from(&self, entity: &str) -> Vec<RelationshipEdge> {
        match self.node_indices.get(entity) {
            Some(idx) => self
                .outgoing(*idx)
                .into_iter()
                .map(|(edge, _)| self.graph[edge].clone())
                .collect(),
            None => Vec::new(),
        }
    }

    /// The first registered edge leading from `from` to `to`, if the two are
    /// adjacent.
    pub fn edge_between(&self, from: &str, to: &str) -> Option<&RelationshipEdge> {
        let from_idx = self.node_index(from)?;
        let to_idx = self.node_index(to)?;
        self.outgoing(from_idx)
            .into_iter()
            .find(|(_, target)| *target == to_idx)
            .map(|(edge, _)| &self.graph[edge])
    }

    /// Name under which the edge `from → to` is rendered.
    ///
    /// Returns `None` when no edge connects the two entities.
    pub fn relationship_name(&self, from: &str, to: &str) -> Option<String> {
        self.edge_between(from, to)
            .map(|edge| edge.relationship_name.clone())
    }

    /// Warnings collected while building the graph.
    pub fn warnings(&self) -> &[SchemaWarning] {
        &self.warnings
    }

    /// Stable content hash of the entities and edges.
    pub fn fingerprint(&self) -> Result<String, serde_json::Error> {
        let entities: Vec<(&str, &[String])> = self
            .graph
            .node_indices()
            .map(|idx| {
                let node = &self.graph[idx];
                (node.name.as_str(), node.fields.as_slice())
            })
            .collect();
        let edges: Vec<&RelationshipEdge> = self.graph.edge_weights().collect();
        content_hash(&(entities, edges))
    }

    // =========================================================================
    // Index-level access for the resolver
    // =========================================================================

    pub(crate) fn node_index(&self, name: &str) -> Option<NodeIndex> {
        self.node_indices.get(name).copied()
    }

    /// Outgoing edges of a node in registration order.
    ///
    /// petgraph walks a node's adjacency list newest-first, so the edges are
    /// re-sorted by index to keep "first registered" meaningful.
    pub(crate) fn outgoing(&self, idx: NodeIndex) -> Vec<(EdgeIndex, NodeIndex)> {
        let mut edges: Vec<(EdgeIndex, NodeIndex)> = self
            .graph
            .edges(idx)
            .map(|edge| (edge.id(), edge.target()))
            .collect();
        edges.sort_by_key(|(edge, _)| *edge);
        edges
    }

    pub(crate) fn edge(&self, idx: EdgeIndex) -> &RelationshipEdge {
        &self.graph[idx]
    }
}

fn ensure_identifier(name: &str) -> SchemaResult<()> {
    if naming::is_identifier(name) {
        Ok(())
    } else {
        Err(SchemaError::InvalidIdentifier(name.to_string()))
    }
}

/// Lowercase hex SHA-256 of a value's JSON encoding.
pub(crate) fn content_hash<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let digest = Sha256::digest(serde_json::to_vec(value)?);
    Ok(digest.iter().map(|byte| format!("{:02x}", byte)).collect())
}
