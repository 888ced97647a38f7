//! Error types for schema construction and query planning.
//!
//! Only structurally invalid input is an error. Relationships that cannot be
//! connected are reported as [`Diagnostic`](crate::planner::Diagnostic)s and
//! never abort assembly.

use thiserror::Error;

/// Result type for schema construction.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Result type for query planning.
pub type PlanResult<T> = Result<T, PlanError>;

/// Errors raised while building a [`SchemaGraph`](crate::schema::SchemaGraph).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("Entity '{0}' is defined more than once")]
    DuplicateEntity(String),

    #[error("Relationship {parent} -> {child} references unknown entity '{missing}'")]
    UnknownEntity {
        parent: String,
        child: String,
        missing: String,
    },

    #[error("'{0}' is not a valid identifier")]
    InvalidIdentifier(String),

    #[error("Failed to parse schema definition: {0}")]
    Parse(String),
}

impl From<serde_json::Error> for SchemaError {
    fn from(err: serde_json::Error) -> Self {
        SchemaError::Parse(err.to_string())
    }
}

/// Errors raised while assembling a query plan.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    /// The intent's root entity is not part of the schema.
    #[error("Unknown root entity: '{0}'")]
    UnknownRootEntity(String),
}
