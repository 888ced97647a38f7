use insta::assert_snapshot;
use nestplan::config::{RenderSettings, Settings};
use nestplan::planner::{QueryIntent, QueryPlanner, RelationshipRequest, RowLock, SortSpec};
use nestplan::render::Renderer;
use nestplan::schema::{EntityDefinition, RelationshipDefinition, SchemaDefinition, SchemaGraph};

fn service_graph() -> SchemaGraph {
    let def = SchemaDefinition::new()
        .with_entity(EntityDefinition::new("User"))
        .with_entity(EntityDefinition::new("Account"))
        .with_entity(EntityDefinition::new("Contact"))
        .with_entity(EntityDefinition::new("Case"))
        .with_entity(EntityDefinition::new("CaseComment"))
        .with_entity(EntityDefinition::new("Attachment"))
        .with_relationship(
            RelationshipDefinition::new("User", "Account", "OwnerId").with_parent_name("Owner"),
        )
        .with_relationship(RelationshipDefinition::new("Account", "Contact", "AccountId"))
        .with_relationship(RelationshipDefinition::new("Contact", "Case", "ContactId"))
        .with_relationship(RelationshipDefinition::new("Case", "CaseComment", "ParentId"))
        .with_relationship(
            RelationshipDefinition::new("CaseComment", "Attachment", "CommentId")
                .with_child_name("Files"),
        );
    SchemaGraph::from_definition(def).unwrap()
}

#[test]
fn test_nested_query_text() {
    let graph = service_graph();
    let intent = QueryIntent::new("Account")
        .with_fields(vec!["Name"])
        .with_filter("Industry = 'Energy'")
        .with_sort(SortSpec::asc(vec!["Name"]))
        .with_limit(20)
        .with_relationship(
            RelationshipRequest::new("Case")
                .with_fields(vec!["Subject"])
                .with_filter("IsClosed = false"),
        );

    let generated = QueryPlanner::new(&graph).generate(&intent).unwrap();

    assert_snapshot!(
        generated.rendered.main_text,
        @"SELECT Name, (SELECT Id, (SELECT Id, Subject FROM Cases WHERE IsClosed = false) FROM Contacts) FROM Account WHERE Industry = 'Energy' ORDER BY Name LIMIT 20"
    );
    assert!(generated.rendered.side_texts.is_empty());
}

#[test]
fn test_side_queries_text() {
    let graph = service_graph();
    let intent = QueryIntent::new("Account")
        .with_relationship(RelationshipRequest::new("CaseComment").with_fields(vec!["Body"]))
        .with_relationship(RelationshipRequest::new("User").with_fields(vec!["Alias"]))
        .with_row_lock(RowLock::ForView);

    let generated = QueryPlanner::new(&graph).generate(&intent).unwrap();

    assert_snapshot!(
        generated.rendered.main_text,
        @"SELECT Id, Owner.Alias, (SELECT Id, (SELECT Id FROM Cases) FROM Contacts) FROM Account FOR VIEW"
    );
    assert_snapshot!(
        generated.rendered.side_texts.join("\n"),
        @"SELECT Id, Body FROM CaseComment WHERE Case.Contact.AccountId = <AccountId>"
    );
}

#[test]
fn test_upward_side_query_text() {
    let graph = service_graph();
    let intent = QueryIntent::new("Case")
        .with_fields(vec!["Subject"])
        .with_relationship(RelationshipRequest::new("User").with_fields(vec!["Alias"]));

    let generated = QueryPlanner::new(&graph).generate(&intent).unwrap();

    assert_snapshot!(
        generated.rendered.main_text,
        @"SELECT Subject, Contact.Account.Id FROM Case"
    );
    assert_snapshot!(
        generated.rendered.side_texts.join("\n"),
        @"SELECT Id, Alias FROM User WHERE Id = <Case.Contact.Account.OwnerId>"
    );
}

#[test]
fn test_labelled_output() {
    let graph = service_graph();
    let mut settings = Settings::default();
    settings.resolver.max_depth = 4;
    let intent = QueryIntent::new("Account")
        .with_relationship(RelationshipRequest::new("Attachment").with_fields(vec!["Name"]));

    let plan = QueryPlanner::with_settings(&graph, &settings)
        .assemble(&intent)
        .unwrap()
        .plan;
    let renderer = Renderer::new(RenderSettings {
        label_side_queries: true,
        ..RenderSettings::default()
    });

    assert_snapshot!(renderer.render_text(&plan), @r"
    SELECT Id, (SELECT Id, (SELECT Id FROM Cases) FROM Contacts) FROM Account

    -- Query CaseComments:
    SELECT Id, (SELECT Id, Name FROM Files) FROM CaseComment WHERE Case.Contact.AccountId = <AccountId>
    ");
}
