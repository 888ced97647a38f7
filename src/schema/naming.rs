//! Naming rules shared by schema construction and rendering.
//!
//! The pluralization fallback is part of the rendered output contract: a
//! parent-to-child relationship with no registered name is always rendered
//! under the name produced here.

use regex::Regex;
use std::sync::LazyLock;

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

/// Is `name` usable as an entity, field or relationship name?
pub fn is_identifier(name: &str) -> bool {
    IDENTIFIER.is_match(name)
}

/// Default child relationship name for a parent-to-child edge.
///
/// A trailing `y` becomes `ies`; every other name gets an `s` appended.
/// Case is preserved.
///
/// # Examples
/// ```
/// use nestplan::schema::naming::child_relationship_name;
///
/// assert_eq!(child_relationship_name("Opportunity"), "Opportunities");
/// assert_eq!(child_relationship_name("Quote"), "Quotes");
/// assert_eq!(child_relationship_name("Survey"), "Surveies");
/// ```
pub fn child_relationship_name(child_entity: &str) -> String {
    if let Some(stem) = child_entity.strip_suffix('y') {
        format!("{}ies", stem)
    } else if let Some(stem) = child_entity.strip_suffix('Y') {
        format!("{}IES", stem)
    } else if child_entity.is_empty() {
        String::new()
    } else {
        format!("{}s", child_entity)
    }
}

/// Default parent relationship name for a child-to-parent edge: the parent
/// entity's own name.
pub fn parent_relationship_name(parent_entity: &str) -> String {
    parent_entity.to_string()
}
