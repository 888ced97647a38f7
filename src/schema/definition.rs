//! Schema definitions - the input contract from schema loading.
//!
//! A [`SchemaDefinition`] is what an upstream metadata loader hands over:
//! entity names with their field lists, plus parent/child relationships.
//! It is turned into an immutable [`SchemaGraph`](super::SchemaGraph) once.

use serde::{Deserialize, Serialize};

use crate::error::SchemaResult;

/// Complete description of the entities and relationships of a schema.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[must_use = "builders have no effect until used"]
pub struct SchemaDefinition {
    #[serde(default)]
    pub entities: Vec<EntityDefinition>,
    #[serde(default)]
    pub relationships: Vec<RelationshipDefinition>,
}

impl SchemaDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON schema document.
    ///
    /// ```json
    /// {
    ///   "entities": [{ "name": "Account", "fields": ["Id", "Name"] }],
    ///   "relationships": [
    ///     { "parent": "Account", "child": "Contact", "foreign_key": "AccountId" }
    ///   ]
    /// }
    /// ```
    pub fn from_json_str(json: &str) -> SchemaResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_entity(mut self, entity: EntityDefinition) -> Self {
        self.entities.push(entity);
        self
    }

    pub fn with_relationship(mut self, relationship: RelationshipDefinition) -> Self {
        self.relationships.push(relationship);
        self
    }
}

/// An entity and the fields it exposes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[must_use = "builders have no effect until used"]
pub struct EntityDefinition {
    pub name: String,
    /// Known fields. An empty list means "unknown", not "no fields".
    #[serde(default)]
    pub fields: Vec<String>,
}

impl EntityDefinition {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.into(),
            fields: vec![],
        }
    }

    pub fn with_fields(mut self, fields: Vec<&str>) -> Self {
        self.fields.extend(fields.into_iter().map(String::from));
        self
    }
}

/// A parent/child relationship.
///
/// The foreign key lives on the child and points at the parent. Each
/// definition produces two navigable edges: parent → child (`ParentOf`) and
/// child → parent (`ChildOf`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[must_use = "builders have no effect until used"]
pub struct RelationshipDefinition {
    pub parent: String,
    pub child: String,
    pub foreign_key: String,
    /// Name used for parent → child subqueries (e.g. `Contacts`).
    #[serde(default)]
    pub child_relationship_name: Option<String>,
    /// Name used for child → parent dotted access (e.g. `Account`).
    #[serde(default)]
    pub parent_relationship_name: Option<String>,
}

impl RelationshipDefinition {
    pub fn new(parent: &str, child: &str, foreign_key: &str) -> Self {
        Self {
            parent: parent.into(),
            child: child.into(),
            foreign_key: foreign_key.into(),
            child_relationship_name: None,
            parent_relationship_name: None,
        }
    }

    pub fn with_child_name(mut self, name: &str) -> Self {
        self.child_relationship_name = Some(name.into());
        self
    }

    pub fn with_parent_name(mut self, name: &str) -> Self {
        self.parent_relationship_name = Some(name.into());
        self
    }
}
