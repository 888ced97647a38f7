//! # nestplan
//!
//! Depth-bounded nested query planning over a relationship schema.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │            SchemaDefinition (entities, links)            │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [schema]
//! ┌─────────────────────────────────────────────────────────┐
//! │       SchemaGraph (both directions of every link)        │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [resolver]  QueryIntent
//! ┌─────────────────────────────────────────────────────────┐
//! │        RelationshipPath per relationship request         │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [planner]
//! ┌─────────────────────────────────────────────────────────┐
//! │   QueryPlan (main ≤ 2 levels deep + side queries)        │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [render]
//! ┌─────────────────────────────────────────────────────────┐
//! │              main_text + side_texts                      │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use nestplan::prelude::*;
//!
//! let schema = SchemaDefinition::new()
//!     .with_entity(EntityDefinition::new("Account"))
//!     .with_entity(EntityDefinition::new("Opportunity"))
//!     .with_entity(EntityDefinition::new("Quote"))
//!     .with_entity(EntityDefinition::new("QuoteLineItem"))
//!     .with_relationship(RelationshipDefinition::new("Account", "Opportunity", "AccountId"))
//!     .with_relationship(RelationshipDefinition::new("Opportunity", "Quote", "OpportunityId"))
//!     .with_relationship(RelationshipDefinition::new("Quote", "QuoteLineItem", "QuoteId"));
//! let graph = SchemaGraph::from_definition(schema).unwrap();
//!
//! let intent = QueryIntent::new("Account")
//!     .with_relationship(RelationshipRequest::new("QuoteLineItem"));
//! let generated = QueryPlanner::new(&graph).generate(&intent).unwrap();
//!
//! assert_eq!(
//!     generated.rendered.main_text,
//!     "SELECT Id, (SELECT Id, (SELECT Id FROM Quotes) FROM Opportunities) FROM Account"
//! );
//! assert_eq!(
//!     generated.rendered.side_texts,
//!     vec!["SELECT Id FROM QuoteLineItem WHERE Quote.Opportunity.AccountId = <AccountId>"]
//! );
//! ```

pub mod config;
pub mod error;
pub mod planner;
pub mod render;
pub mod resolver;
pub mod schema;

pub use error::{PlanError, PlanResult, SchemaError, SchemaResult};

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::config::Settings;
    pub use crate::error::{PlanError, SchemaError};
    pub use crate::planner::{
        Diagnostic, GeneratedQuery, QueryIntent, QueryPlan, QueryPlanner, RelationshipRequest,
        RowLock, SortSpec,
    };
    pub use crate::render::{RenderedQuery, Renderer};
    pub use crate::resolver::{RelationshipPath, RelationshipResolver};
    pub use crate::schema::{
        Direction, EntityDefinition, RelationshipDefinition, SchemaDefinition, SchemaGraph,
    };
}
