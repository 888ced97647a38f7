use nestplan::config::Settings;
use nestplan::planner::{
    Diagnostic, QueryIntent, QueryPlanNode, QueryPlanner, RelationshipRequest,
    MAX_NESTING_DEPTH,
};
use nestplan::schema::{EntityDefinition, RelationshipDefinition, SchemaDefinition, SchemaGraph};
use nestplan::PlanError;

fn sales_graph() -> SchemaGraph {
    let def = SchemaDefinition::new()
        .with_entity(EntityDefinition::new("Account").with_fields(vec!["Id", "Name"]))
        .with_entity(EntityDefinition::new("Contact").with_fields(vec!["Id", "Email"]))
        .with_entity(EntityDefinition::new("Opportunity").with_fields(vec!["Id", "Amount"]))
        .with_entity(EntityDefinition::new("Quote").with_fields(vec!["Id", "Status"]))
        .with_entity(EntityDefinition::new("QuoteLineItem").with_fields(vec!["Id", "Quantity"]))
        .with_entity(EntityDefinition::new("Unrelated"))
        .with_relationship(RelationshipDefinition::new("Account", "Contact", "AccountId"))
        .with_relationship(RelationshipDefinition::new("Account", "Opportunity", "AccountId"))
        .with_relationship(RelationshipDefinition::new("Opportunity", "Quote", "OpportunityId"))
        .with_relationship(RelationshipDefinition::new("Quote", "QuoteLineItem", "QuoteId"));
    SchemaGraph::from_definition(def).unwrap()
}

fn relationship_names(node: &QueryPlanNode) -> Vec<&str> {
    node.children
        .iter()
        .filter_map(|c| c.relationship_name.as_deref())
        .collect()
}

#[test]
fn test_sibling_children() {
    let graph = sales_graph();
    let intent = QueryIntent::new("Account")
        .with_relationship(RelationshipRequest::new("Contact"))
        .with_relationship(RelationshipRequest::new("Opportunity"));

    let assembly = QueryPlanner::new(&graph).assemble(&intent).unwrap();

    assert_eq!(
        relationship_names(&assembly.plan.main),
        vec!["Contacts", "Opportunities"]
    );
    assert!(assembly.plan.side_queries.is_empty());
    assert!(assembly.diagnostics.is_empty());
}

#[test]
fn test_overflow_becomes_side_query() {
    let graph = sales_graph();
    let intent =
        QueryIntent::new("Account").with_relationship(RelationshipRequest::new("QuoteLineItem"));

    let plan = QueryPlanner::new(&graph).assemble(&intent).unwrap().plan;

    assert_eq!(relationship_names(&plan.main), vec!["Opportunities"]);
    let opportunities = &plan.main.children[0];
    assert_eq!(relationship_names(opportunities), vec!["Quotes"]);
    assert_eq!(plan.depth(), 2);

    assert_eq!(plan.side_queries.len(), 1);
    let side = &plan.side_queries[0].node;
    assert_eq!(side.entity, "QuoteLineItem");
    assert_eq!(
        side.filter.as_deref(),
        Some("Quote.Opportunity.AccountId = <AccountId>")
    );
}

#[test]
fn test_unreachable_request_keeps_the_rest() {
    let graph = sales_graph();
    let intent = QueryIntent::new("Account")
        .with_relationship(RelationshipRequest::new("Contact"))
        .with_relationship(RelationshipRequest::new("Unrelated"));

    let assembly = QueryPlanner::new(&graph).assemble(&intent).unwrap();

    assert_eq!(relationship_names(&assembly.plan.main), vec!["Contacts"]);
    assert_eq!(
        assembly.diagnostics,
        vec![Diagnostic::UnreachableRelationship {
            from: "Account".into(),
            to: "Unrelated".into(),
            max_depth: 3,
        }]
    );
    assert_eq!(
        assembly.diagnostics[0].to_string(),
        "no relationship from Account to Unrelated within 3 hops"
    );
}

#[test]
fn test_unknown_root_entity() {
    let graph = sales_graph();
    let result = QueryPlanner::new(&graph).assemble(&QueryIntent::new("Lead"));

    assert_eq!(result.unwrap_err(), PlanError::UnknownRootEntity("Lead".into()));
}

#[test]
fn test_request_order_does_not_matter() {
    let graph = sales_graph();
    let planner = QueryPlanner::new(&graph);
    let forward = QueryIntent::new("Account")
        .with_relationship(RelationshipRequest::new("QuoteLineItem").with_fields(vec!["Quantity"]))
        .with_relationship(RelationshipRequest::new("Contact").with_fields(vec!["Email"]))
        .with_relationship(RelationshipRequest::new("Quote").with_fields(vec!["Status"]));
    let backward = QueryIntent::new("Account")
        .with_relationship(RelationshipRequest::new("Quote").with_fields(vec!["Status"]))
        .with_relationship(RelationshipRequest::new("Contact").with_fields(vec!["Email"]))
        .with_relationship(RelationshipRequest::new("QuoteLineItem").with_fields(vec!["Quantity"]));

    let a = planner.generate(&forward).unwrap();
    let b = planner.generate(&backward).unwrap();

    assert_eq!(a.rendered.main_text, b.rendered.main_text);
    assert_eq!(a.rendered.side_texts, b.rendered.side_texts);
    assert_eq!(a.plan.fingerprint().unwrap(), b.plan.fingerprint().unwrap());
}

#[test]
fn test_settings_drive_the_planner() {
    let graph = sales_graph();
    let settings = Settings::from_toml_str(
        r#"
[planner]
max_nesting_depth = 1
root_placeholder = ":{root}_{key}"
"#,
    )
    .unwrap();
    let intent =
        QueryIntent::new("Account").with_relationship(RelationshipRequest::new("QuoteLineItem"));

    let plan = QueryPlanner::with_settings(&graph, &settings)
        .assemble(&intent)
        .unwrap()
        .plan;

    assert_eq!(plan.depth(), 1);
    let side = &plan.side_queries[0];
    assert_eq!(side.node.entity, "Quote");
    assert_eq!(side.link.to_string(), "Opportunity.AccountId = :Account_Id");
    assert_eq!(relationship_names(&side.node), vec!["QuoteLineItems"]);
}

#[test]
fn test_depth_invariant_over_all_requests() {
    let graph = sales_graph();
    let planner = QueryPlanner::new(&graph);

    for root in graph.entity_names() {
        let intent = graph
            .entity_names()
            .into_iter()
            .fold(QueryIntent::new(root), |intent, target| {
                intent.with_relationship(RelationshipRequest::new(target))
            });

        let plan = planner.assemble(&intent).unwrap().plan;
        assert!(plan.depth() <= MAX_NESTING_DEPTH);
        assert!(plan
            .side_queries
            .iter()
            .all(|side| side.node.filter.is_some()));
    }
}
