//! Constrained query assembly - turns a [`QueryIntent`] into a [`QueryPlan`].
//!
//! Assembly runs in four steps:
//! 1. Resolve every relationship request to a path from the root entity
//! 2. Nest the first edges of each path under the main query, sharing nodes
//!    between requests that walk through the same entity
//! 3. Cut whatever exceeds the nesting ceiling into side queries linked back
//!    to the root by a transitive filter
//! 4. Finalize: id fields, side-query filters
//!
//! Nothing here fails for a relationship that cannot be found. Such requests
//! are dropped and reported as [`Diagnostic`]s next to the plan.

mod flatten;
pub mod plan;
pub mod types;


pub use plan::{Assembly, Diagnostic, QueryPlan, QueryPlanNode, SideQuery, TransitiveFilter};
pub use types::{
    QueryIntent, QueryOptions, RelationshipRequest, RowLock, SortDirection, SortSpec,
};

use crate::config::{PlannerSettings, RenderSettings, Settings};
use crate::error::{PlanError, PlanResult};
use crate::render::{RenderedQuery, Renderer};
use crate::resolver::{RelationshipPath, RelationshipResolver};
use crate::schema::naming::is_identifier;
use crate::schema::{RelationshipEdge, SchemaGraph};

/// Hard ceiling on subquery levels below the main query.
pub const MAX_NESTING_DEPTH: usize = 2;

/// Output of [`QueryPlanner::generate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedQuery {
    pub plan: QueryPlan,
    pub rendered: RenderedQuery,
    pub diagnostics: Vec<Diagnostic>,
}

/// Builds depth-bounded query plans over a [`SchemaGraph`].
///
/// Holds no per-call state: every `assemble` starts from scratch, so one
/// planner can be shared across threads.
#[derive(Debug, Clone)]
pub struct QueryPlanner<'a> {
    resolver: RelationshipResolver<'a>,
    settings: PlannerSettings,
    render: RenderSettings,
}

impl<'a> QueryPlanner<'a> {
    /// Create a planner with default settings.
    pub fn new(graph: &'a SchemaGraph) -> Self {
        Self::with_settings(graph, &Settings::default())
    }

    /// Create a planner from loaded settings.
    pub fn with_settings(graph: &'a SchemaGraph, settings: &Settings) -> Self {
        Self {
            resolver: RelationshipResolver::new(graph)
                .with_max_depth(settings.resolver.max_depth),
            settings: settings.planner.clone(),
            render: settings.render.clone(),
        }
    }

    pub fn resolver(&self) -> &RelationshipResolver<'a> {
        &self.resolver
    }

    /// Subquery levels this planner will nest, never more than
    /// [`MAX_NESTING_DEPTH`].
    pub fn nesting_budget(&self) -> usize {
        self.settings.max_nesting_depth.clamp(1, MAX_NESTING_DEPTH)
    }

    /// Assemble a plan for `intent`.
    ///
    /// Fails only when the root entity is not in the schema. Requests are
    /// processed in a canonical order, so permuting them yields the same plan.
    pub fn assemble(&self, intent: &QueryIntent) -> PlanResult<Assembly> {
        let graph = self.resolver.graph();
        let root = intent.root_entity.as_str();
        if !graph.has_entity(root) {
            return Err(PlanError::UnknownRootEntity(intent.root_entity.clone()));
        }

        let mut diagnostics = Vec::new();
        self.check_fields(root, &intent.fields, &mut diagnostics);

        let mut main = QueryPlanNode::top_level(root);
        main.merge_fields(&intent.fields);
        if let Some(filter) = &intent.filter {
            main.add_filter(filter);
        }
        main.sort = intent.sort.clone();
        main.limit = intent.limit;

        let mut side_queries = Vec::new();

        let mut requests: Vec<&RelationshipRequest> = intent.relationship_requests.iter().collect();
        requests.sort_by(|a, b| {
            (&a.target_entity, &a.requested_fields, &a.filter_on_target).cmp(&(
                &b.target_entity,
                &b.requested_fields,
                &b.filter_on_target,
            ))
        });
        requests.dedup();

        for request in requests {
            let Some(path) = self.resolver.resolve(root, &request.target_entity) else {
                tracing::warn!(
                    from = root,
                    to = %request.target_entity,
                    max_depth = self.resolver.max_depth(),
                    "dropping unreachable relationship request"
                );
                diagnostics.push(Diagnostic::UnreachableRelationship {
                    from: root.to_string(),
                    to: request.target_entity.clone(),
                    max_depth: self.resolver.max_depth(),
                });
                continue;
            };

            self.check_fields(&request.target_entity, &request.requested_fields, &mut diagnostics);
            self.place(&mut main, &mut side_queries, &path, request);
        }

        self.finalize_node(&mut main, true);
        for side in &mut side_queries {
            self.finalize_side(side);
        }

        tracing::debug!(
            root,
            depth = main.depth(),
            side_queries = side_queries.len(),
            diagnostics = diagnostics.len(),
            "assembled query plan"
        );

        Ok(Assembly {
            plan: QueryPlan {
                main,
                side_queries,
                options: intent.options,
            },
            diagnostics,
        })
    }

    /// Assemble and render in one call.
    pub fn generate(&self, intent: &QueryIntent) -> PlanResult<GeneratedQuery> {
        let Assembly { plan, diagnostics } = self.assemble(intent)?;
        let rendered = Renderer::new(self.render.clone()).render(&plan);
        Ok(GeneratedQuery {
            plan,
            rendered,
            diagnostics,
        })
    }

    /// Put one resolved request into the plan.
    fn place(
        &self,
        main: &mut QueryPlanNode,
        side_queries: &mut Vec<SideQuery>,
        path: &RelationshipPath,
        request: &RelationshipRequest,
    ) {
        let graph = self.resolver.graph();
        let edges = &path.edges;
        let (nested, segments) = flatten::split_path(edges, self.nesting_budget());

        // Intermediate levels appear in the main query even when the target
        // itself ends up in a side query.
        let main_tail = nest(main, nested);

        let mut last_side = None;
        for segment in &segments {
            let link = flatten::transitive_filter(graph, edges, segment.cut, &self.settings);
            let entity = segment.entity(edges);

            let existing = side_queries
                .iter()
                .position(|side| side.node.entity == entity && side.link == link);
            let index = match existing {
                Some(index) => index,
                None => {
                    tracing::debug!(entity, link = %link, "flattening relationship into side query");
                    side_queries.push(SideQuery {
                        node: QueryPlanNode::top_level(entity),
                        link,
                        label: edges[segment.cut].relationship_name.clone(),
                    });
                    side_queries.len() - 1
                }
            };

            nest(&mut side_queries[index].node, segment.nested);
            last_side = Some((index, segment.nested));
        }

        let target = match last_side {
            Some((index, tail)) => nest(&mut side_queries[index].node, tail),
            None => main_tail,
        };
        target.merge_fields(&request.requested_fields);
        if let Some(filter) = &request.filter_on_target {
            target.add_filter(filter);
        }
    }

    /// Record fields that are plain identifiers missing from a declared field
    /// list. Expressions and dotted paths pass through unchecked.
    fn check_fields(&self, entity: &str, fields: &[String], diagnostics: &mut Vec<Diagnostic>) {
        let graph = self.resolver.graph();
        let declares_fields = graph
            .entity_fields(entity)
            .is_some_and(|declared| !declared.is_empty());
        if !declares_fields {
            return;
        }

        for field in fields {
            if !is_identifier(field) || graph.has_field(entity, field) {
                continue;
            }
            let diagnostic = Diagnostic::UnknownField {
                entity: entity.to_string(),
                field: field.clone(),
            };
            if !diagnostics.contains(&diagnostic) {
                tracing::warn!(entity, field = %field, "unknown field requested");
                diagnostics.push(diagnostic);
            }
        }
    }

    fn finalize_node(&self, node: &mut QueryPlanNode, is_main: bool) {
        let wants_id = if node.is_parent_lookup() {
            node.fields.is_empty() && node.children.is_empty()
        } else if is_main {
            node.fields.is_empty()
        } else {
            self.settings.ensure_id_field || node.fields.is_empty()
        };

        let id_field = &self.settings.id_field;
        if wants_id && !node.fields.contains(id_field) {
            node.fields.insert(0, id_field.clone());
        }

        for child in &mut node.children {
            self.finalize_node(child, false);
        }
    }

    fn finalize_side(&self, side: &mut SideQuery) {
        self.finalize_node(&mut side.node, false);

        let link = side.link.to_string();
        side.node.filter = Some(match side.node.filter.take() {
            None => link,
            Some(filter) => plan::and_filters(&link, &filter),
        });
    }
}

/// Walk (creating as needed) one child per edge and return the last node.
fn nest<'n>(node: &'n mut QueryPlanNode, edges: &[RelationshipEdge]) -> &'n mut QueryPlanNode {
    edges
        .iter()
        .fold(node, |current, edge| current.child_for_edge(edge))
}
