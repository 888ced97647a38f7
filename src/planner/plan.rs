//! Query plan types - the depth-bounded tree handed to the renderer.

use std::fmt;

use serde::Serialize;

use super::types::{QueryOptions, SortSpec};
use crate::schema::{Direction, RelationshipEdge};

/// One SELECT in the plan: the main query, a subquery or a side query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryPlanNode {
    pub entity: String,
    /// Name of the edge this node hangs off. `None` for top-level nodes.
    pub relationship_name: Option<String>,
    /// Direction of the edge this node hangs off. `None` for top-level nodes.
    pub direction: Option<Direction>,
    pub fields: Vec<String>,
    pub filter: Option<String>,
    pub sort: Option<SortSpec>,
    pub limit: Option<u64>,
    pub children: Vec<QueryPlanNode>,
}

impl QueryPlanNode {
    /// A top-level node selecting from `entity` directly.
    pub fn top_level(entity: &str) -> Self {
        Self {
            entity: entity.into(),
            relationship_name: None,
            direction: None,
            fields: vec![],
            filter: None,
            sort: None,
            limit: None,
            children: vec![],
        }
    }

    /// A nested node reached through `edge`.
    pub fn via(edge: &RelationshipEdge) -> Self {
        Self {
            relationship_name: Some(edge.relationship_name.clone()),
            direction: Some(edge.direction),
            ..Self::top_level(&edge.to_entity)
        }
    }

    /// Number of nested levels below this node (0 for a leaf).
    pub fn depth(&self) -> usize {
        self.children
            .iter()
            .map(|child| child.depth() + 1)
            .max()
            .unwrap_or(0)
    }

    /// The direct child for `entity`, if any.
    pub fn child(&self, entity: &str) -> Option<&QueryPlanNode> {
        self.children.iter().find(|c| c.entity == entity)
    }

    /// Does this node render as dotted parent fields rather than a subquery?
    ///
    /// Only a child-to-parent hop with no clauses of its own, whose children
    /// are all parent lookups as well, qualifies.
    pub fn is_parent_lookup(&self) -> bool {
        self.direction == Some(Direction::ChildOf)
            && self.filter.is_none()
            && self.sort.is_none()
            && self.limit.is_none()
            && self.children.iter().all(QueryPlanNode::is_parent_lookup)
    }

    /// Append fields not yet selected, keeping first-seen order.
    pub fn merge_fields<'f>(&mut self, fields: impl IntoIterator<Item = &'f String>) {
        for field in fields {
            if !self.fields.contains(field) {
                self.fields.push(field.clone());
            }
        }
    }

    /// AND a filter onto the existing one. Repeating a filter is a no-op.
    pub fn add_filter(&mut self, filter: &str) {
        self.filter = match self.filter.take() {
            None => Some(filter.to_string()),
            Some(existing) if existing == filter => Some(existing),
            Some(existing) => Some(and_filters(&existing, filter)),
        };
    }

    /// Find the child for the edge's target, creating it if needed.
    pub(crate) fn child_for_edge(&mut self, edge: &RelationshipEdge) -> &mut QueryPlanNode {
        let position = self
            .children
            .iter()
            .position(|c| c.entity == edge.to_entity);
        match position {
            Some(i) => &mut self.children[i],
            None => {
                self.children.push(QueryPlanNode::via(edge));
                let last = self.children.len() - 1;
                &mut self.children[last]
            }
        }
    }
}

/// Join two opaque filters with AND, parenthesizing each side.
pub(crate) fn and_filters(left: &str, right: &str) -> String {
    format!("({}) AND ({})", left, right)
}

/// The link from a side query back to the main query's root record.
///
/// Renders as `<chain>.<field> = <placeholder>`, e.g.
/// `Quote.Opportunity.AccountId = <AccountId>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TransitiveFilter {
    /// Parent relationship names walked upward from the side query's entity.
    pub chain: Vec<String>,
    /// Field compared at the end of the chain.
    pub field: String,
    /// Marker the caller replaces with the root record's key.
    pub placeholder: String,
}

impl fmt::Display for TransitiveFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for name in &self.chain {
            write!(f, "{}.", name)?;
        }
        write!(f, "{} = {}", self.field, self.placeholder)
    }
}

/// A standalone query emitted because nesting it would exceed the depth limit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SideQuery {
    /// The query itself; `filter` always holds the rendered link.
    pub node: QueryPlanNode,
    pub link: TransitiveFilter,
    /// Relationship name of the skipped edge into this entity, used for labels.
    pub label: String,
}

/// The result of assembly: a depth-bounded main query plus side queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryPlan {
    pub main: QueryPlanNode,
    pub side_queries: Vec<SideQuery>,
    pub options: QueryOptions,
}

impl QueryPlan {
    /// Nesting depth of the main query.
    pub fn depth(&self) -> usize {
        self.main.depth()
    }

    /// The side query selecting from `entity`, if any.
    pub fn side_query(&self, entity: &str) -> Option<&SideQuery> {
        self.side_queries.iter().find(|s| s.node.entity == entity)
    }

    /// Stable content hash of the plan.
    pub fn fingerprint(&self) -> Result<String, serde_json::Error> {
        crate::schema::content_hash(self)
    }
}

/// Non-fatal problems found during assembly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Diagnostic {
    /// No path within `max_depth` hops connects the two entities.
    UnreachableRelationship {
        from: String,
        to: String,
        max_depth: usize,
    },
    /// A requested field is not declared on the entity. It is still selected.
    UnknownField { entity: String, field: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnreachableRelationship {
                from,
                to,
                max_depth,
            } => write!(
                f,
                "no relationship from {} to {} within {} hops",
                from, to, max_depth
            ),
            Diagnostic::UnknownField { entity, field } => {
                write!(f, "unknown field {}.{}", entity, field)
            }
        }
    }
}

/// A plan plus the diagnostics recorded while assembling it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assembly {
    pub plan: QueryPlan,
    pub diagnostics: Vec<Diagnostic>,
}

impl Assembly {
    /// Requests that were dropped because no path was found.
    pub fn unreachable(&self) -> impl Iterator<Item = (&str, &str)> {
        self.diagnostics.iter().filter_map(|d| match d {
            Diagnostic::UnreachableRelationship { from, to, .. } => {
                Some((from.as_str(), to.as_str()))
            }
            _ => None,
        })
    }
}
