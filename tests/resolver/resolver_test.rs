use nestplan::resolver::{RelationshipResolver, DEFAULT_MAX_DEPTH};
use nestplan::schema::{
    Direction, EntityDefinition, RelationshipDefinition, SchemaDefinition, SchemaGraph,
};

/// Account → Contact, Account → Opportunity → Quote → QuoteLineItem, and an
/// entity with no relationships.
fn sales_graph() -> SchemaGraph {
    let def = SchemaDefinition::new()
        .with_entity(EntityDefinition::new("Account"))
        .with_entity(EntityDefinition::new("Contact"))
        .with_entity(EntityDefinition::new("Opportunity"))
        .with_entity(EntityDefinition::new("Quote"))
        .with_entity(EntityDefinition::new("QuoteLineItem"))
        .with_entity(EntityDefinition::new("Unrelated"))
        .with_relationship(RelationshipDefinition::new("Account", "Contact", "AccountId"))
        .with_relationship(RelationshipDefinition::new("Account", "Opportunity", "AccountId"))
        .with_relationship(RelationshipDefinition::new("Opportunity", "Quote", "OpportunityId"))
        .with_relationship(RelationshipDefinition::new("Quote", "QuoteLineItem", "QuoteId"));
    SchemaGraph::from_definition(def).unwrap()
}

fn names(graph: &SchemaGraph, from: &str, to: &str) -> Option<Vec<String>> {
    RelationshipResolver::new(graph).resolve(from, to).map(|path| {
        path.edges
            .iter()
            .map(|e| e.relationship_name.clone())
            .collect()
    })
}

#[test]
fn test_direct_relationship() {
    let graph = sales_graph();
    let path = RelationshipResolver::new(&graph)
        .resolve("Account", "Contact")
        .unwrap();

    assert_eq!(path.len(), 1);
    assert_eq!(path.edges[0].from_entity, "Account");
    assert_eq!(path.edges[0].to_entity, "Contact");
    assert_eq!(path.edges[0].direction, Direction::ParentOf);
}

#[test]
fn test_two_edge_path() {
    let graph = sales_graph();
    assert_eq!(
        names(&graph, "Account", "Quote"),
        Some(vec!["Opportunities".to_string(), "Quotes".to_string()])
    );
}

#[test]
fn test_three_edge_path() {
    let graph = sales_graph();
    let path = RelationshipResolver::new(&graph)
        .resolve("Account", "QuoteLineItem")
        .unwrap();

    assert_eq!(path.len(), 3);
    assert_eq!(
        path.entities(),
        vec!["Account", "Opportunity", "Quote", "QuoteLineItem"]
    );
}

#[test]
fn test_upward_path() {
    let graph = sales_graph();
    assert_eq!(
        names(&graph, "QuoteLineItem", "Opportunity"),
        Some(vec!["Quote".to_string(), "Opportunity".to_string()])
    );
}

#[test]
fn test_no_path() {
    let graph = sales_graph();
    let resolver = RelationshipResolver::new(&graph);

    assert!(resolver.resolve("Account", "Unrelated").is_none());
    assert!(resolver.resolve("Unrelated", "Account").is_none());
}

#[test]
fn test_depth_limit() {
    let graph = sales_graph();
    let resolver = RelationshipResolver::new(&graph);

    assert_eq!(resolver.max_depth(), DEFAULT_MAX_DEPTH);
    // Contact → Account → Opportunity → Quote → QuoteLineItem
    assert!(resolver.resolve("Contact", "QuoteLineItem").is_none());
    assert_eq!(
        resolver
            .with_max_depth(4)
            .resolve("Contact", "QuoteLineItem")
            .unwrap()
            .len(),
        4
    );
    assert!(resolver.resolve_within("Account", "Quote", 1).is_none());
}

#[test]
fn test_every_path_is_shortest_and_simple() {
    let graph = sales_graph();
    let resolver = RelationshipResolver::new(&graph).with_max_depth(10);
    let entities = graph.entity_names();

    for from in &entities {
        for to in &entities {
            let Some(path) = resolver.resolve(from, to) else {
                assert!(*from == "Unrelated" || *to == "Unrelated");
                continue;
            };

            let visited = path.entities();
            let mut unique = visited.clone();
            unique.sort_unstable();
            unique.dedup();
            assert_eq!(unique.len(), visited.len());

            // No shorter path exists within a tighter bound.
            if !path.is_empty() {
                assert!(resolver.resolve_within(from, to, path.len() - 1).is_none());
            }
        }
    }
}
