//! Depth-aware splitting of relationship paths.
//!
//! A path longer than the nesting budget is cut into one nested segment under
//! the main query plus one or more side segments. Each side segment starts a
//! new top-level query whose filter walks back up to the main query's root.
//!
//! ```text
//!   Account → Opportunity → Quote → QuoteLineItem      (budget 2)
//!   └──────── nested ────────┘   └─ side: QuoteLineItem
//!             WHERE Quote.Opportunity.AccountId = <AccountId>
//! ```

use super::plan::TransitiveFilter;
use crate::config::PlannerSettings;
use crate::schema::{Direction, RelationshipEdge, SchemaGraph};

/// A portion of a path that becomes its own top-level query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SideSegment<'p> {
    /// Index of the edge leading into the side query's entity.
    pub cut: usize,
    /// Edges nested as subqueries under the side query.
    pub nested: &'p [RelationshipEdge],
}

impl<'p> SideSegment<'p> {
    /// Entity the side query selects from.
    pub fn entity<'e>(&self, edges: &'e [RelationshipEdge]) -> &'e str {
        &edges[self.cut].to_entity
    }
}

/// Split a path into the part nested under the main query and side segments.
pub(crate) fn split_path(
    edges: &[RelationshipEdge],
    budget: usize,
) -> (&[RelationshipEdge], Vec<SideSegment<'_>>) {
    let nested_len = budget.min(edges.len());
    let mut segments = Vec::new();

    let mut cut = nested_len;
    while cut < edges.len() {
        let end = (cut + 1 + budget).min(edges.len());
        segments.push(SideSegment {
            cut,
            nested: &edges[cut + 1..end],
        });
        cut = end;
    }

    (&edges[..nested_len], segments)
}

/// Build the filter linking the entity at `edges[cut].to_entity` back to the
/// root (`edges[0].from_entity`).
///
/// The linked hops split at the last upward (`ChildOf`) hop. Hops below it
/// go down from some ancestor `A` of the root to the side entity, so the
/// chain walks parent names back up to `A` and ends in the foreign key that
/// points at `A`. Hops above it go up from the root to `A`, so `A`'s id is
/// the root's own key path (`Contact.Account.OwnerId`), which becomes the
/// placeholder. With no downward hops the side entity is `A` itself and its
/// id is compared directly.
///
/// A downward hop followed by an upward one has no such key path; those
/// chains fall back to the inverse relationship names.
pub(crate) fn transitive_filter(
    graph: &SchemaGraph,
    edges: &[RelationshipEdge],
    cut: usize,
    settings: &PlannerSettings,
) -> TransitiveFilter {
    let linked = &edges[..=cut];
    let root = &linked[0].from_entity;
    let pivot = linked
        .iter()
        .rposition(|edge| edge.direction == Direction::ChildOf)
        .map_or(0, |i| i + 1);
    let (upper, lower) = linked.split_at(pivot);

    if !upper.iter().all(|edge| edge.direction == Direction::ChildOf) {
        return inverse_filter(graph, linked, settings);
    }

    let key = match upper.split_last() {
        None => settings.id_field.clone(),
        Some((last, [])) => last.foreign_key_field.clone(),
        Some((last, rest)) => rest
            .iter()
            .map(|edge| edge.relationship_name.as_str())
            .chain([last.foreign_key_field.as_str()])
            .fold(String::new(), |path, part| format!("{}.{}", path, part)),
    };

    let (chain, field) = match lower.split_first() {
        Some((first, below)) => (
            below.iter().rev().map(|edge| upward_name(graph, edge)).collect(),
            first.foreign_key_field.clone(),
        ),
        None => (Vec::new(), settings.id_field.clone()),
    };

    TransitiveFilter {
        chain,
        field,
        placeholder: settings.placeholder_for(root, &key),
    }
}

/// Chain of inverse relationship names from the side entity back to the
/// root's first hop.
fn inverse_filter(
    graph: &SchemaGraph,
    linked: &[RelationshipEdge],
    settings: &PlannerSettings,
) -> TransitiveFilter {
    let chain = linked[1..]
        .iter()
        .rev()
        .map(|edge| upward_name(graph, edge))
        .collect();

    let first = &linked[0];
    let (field, key) = match first.direction {
        Direction::ParentOf => (first.foreign_key_field.as_str(), settings.id_field.as_str()),
        Direction::ChildOf => (settings.id_field.as_str(), first.foreign_key_field.as_str()),
    };

    TransitiveFilter {
        chain,
        field: field.to_string(),
        placeholder: settings.placeholder_for(&first.from_entity, key),
    }
}

/// Name for walking `edge` backwards, from its target to its source.
fn upward_name(graph: &SchemaGraph, edge: &RelationshipEdge) -> String {
    graph
        .relationship_name(&edge.to_entity, &edge.from_entity)
        .unwrap_or_else(|| edge.from_entity.clone())
}
