//! Query intent types - the input handed over by the intent-extraction layer.
//!
//! An intent is a self-contained value: everything the planner needs travels
//! with it, nothing is remembered between calls.

use serde::{Deserialize, Serialize};

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// ORDER BY fields sharing one direction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortSpec {
    pub fields: Vec<String>,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn asc(fields: Vec<&str>) -> Self {
        Self {
            fields: fields.into_iter().map(String::from).collect(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(fields: Vec<&str>) -> Self {
        Self {
            fields: fields.into_iter().map(String::from).collect(),
            direction: SortDirection::Desc,
        }
    }
}

/// Row locking / visibility clause appended to the main query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RowLock {
    ForView,
    ForReference,
    ForUpdate,
}

/// Trailing clauses of the main query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct QueryOptions {
    /// Include deleted and archived records (`ALL ROWS`).
    #[serde(default)]
    pub all_rows: bool,
    #[serde(default)]
    pub row_lock: Option<RowLock>,
}

/// A request to pull in records of another entity related to the root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[must_use = "builders have no effect until used"]
pub struct RelationshipRequest {
    pub target_entity: String,
    #[serde(default)]
    pub requested_fields: Vec<String>,
    /// Opaque filter applied to the target's records.
    #[serde(default)]
    pub filter_on_target: Option<String>,
}

impl RelationshipRequest {
    pub fn new(target_entity: &str) -> Self {
        Self {
            target_entity: target_entity.into(),
            requested_fields: vec![],
            filter_on_target: None,
        }
    }

    pub fn with_fields(mut self, fields: Vec<&str>) -> Self {
        self.requested_fields
            .extend(fields.into_iter().map(String::from));
        self
    }

    pub fn with_filter(mut self, filter: &str) -> Self {
        self.filter_on_target = Some(filter.into());
        self
    }
}

/// A structured, already-interpreted description of what to query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[must_use = "builders have no effect until used"]
pub struct QueryIntent {
    pub root_entity: String,
    #[serde(default)]
    pub fields: Vec<String>,
    /// Opaque filter on the root entity, passed through unchanged.
    #[serde(default)]
    pub filter: Option<String>,
    #[serde(default)]
    pub sort: Option<SortSpec>,
    #[serde(default)]
    pub limit: Option<u64>,
    #[serde(default)]
    pub relationship_requests: Vec<RelationshipRequest>,
    #[serde(default)]
    pub options: QueryOptions,
}

impl QueryIntent {
    pub fn new(root_entity: &str) -> Self {
        Self {
            root_entity: root_entity.into(),
            fields: vec![],
            filter: None,
            sort: None,
            limit: None,
            relationship_requests: vec![],
            options: QueryOptions::default(),
        }
    }

    pub fn with_fields(mut self, fields: Vec<&str>) -> Self {
        self.fields.extend(fields.into_iter().map(String::from));
        self
    }

    pub fn with_filter(mut self, filter: &str) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn with_sort(mut self, sort: SortSpec) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_relationship(mut self, request: RelationshipRequest) -> Self {
        self.relationship_requests.push(request);
        self
    }

    pub fn all_rows(mut self) -> Self {
        self.options.all_rows = true;
        self
    }

    pub fn with_row_lock(mut self, lock: RowLock) -> Self {
        self.options.row_lock = Some(lock);
        self
    }
}
