//! TOML-based configuration for nestplan.
//!
//! Example configuration:
//! ```toml
//! [resolver]
//! max_depth = 3
//!
//! [planner]
//! max_nesting_depth = 2
//! id_field = "Id"
//! ensure_id_field = true
//! root_placeholder = "<{root}{key}>"
//!
//! [render]
//! inline_parent_lookups = true
//! label_side_queries = false
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::planner::MAX_NESTING_DEPTH;
use crate::resolver::DEFAULT_MAX_DEPTH;

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Relationship resolution.
    pub resolver: ResolverSettings,

    /// Plan assembly.
    pub planner: PlannerSettings,

    /// Text rendering.
    pub render: RenderSettings,
}

/// Relationship resolution settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ResolverSettings {
    /// Maximum number of hops in a resolved relationship path.
    pub max_depth: usize,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Plan assembly settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct PlannerSettings {
    /// Subquery levels allowed under the main query (1 or 2).
    pub max_nesting_depth: usize,

    /// Identifier field of every entity.
    pub id_field: String,

    /// Put the id field first in every subquery and side query.
    pub ensure_id_field: bool,

    /// Marker for the root record in side-query filters.
    ///
    /// `{root}` is replaced by the root entity name and `{key}` by the root
    /// field the chain is compared against: the id field, the root's foreign
    /// key when the first hop goes up to a parent, or a dotted key path such
    /// as `.Contact.AccountId` when several hops go up.
    pub root_placeholder: String,
}

impl Default for PlannerSettings {
    fn default() -> Self {
        Self {
            max_nesting_depth: MAX_NESTING_DEPTH,
            id_field: "Id".to_string(),
            ensure_id_field: true,
            root_placeholder: "<{root}{key}>".to_string(),
        }
    }
}

impl PlannerSettings {
    /// Expand the placeholder template for a root entity.
    pub fn placeholder_for(&self, root: &str, key: &str) -> String {
        self.root_placeholder
            .replace("{root}", root)
            .replace("{key}", key)
    }
}

/// Rendering settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Render child-to-parent hops as dotted fields (`Account.Name`).
    pub inline_parent_lookups: bool,

    /// Precede each side query with a `-- Query <name>:` comment when the
    /// output is combined into one text.
    pub label_side_queries: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            inline_parent_lookups: true,
            label_side_queries: false,
        }
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate settings from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, SettingsError> {
        let settings: Settings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `NESTPLAN_CONFIG`
    /// 2. `./nestplan.toml`
    /// 3. `~/.config/nestplan/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var("NESTPLAN_CONFIG") {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("nestplan.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("nestplan").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        // Return defaults if no config file found
        Ok(Settings::default())
    }

    /// Reject values the planner cannot honor.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.resolver.max_depth == 0 {
            return Err(SettingsError::InvalidConfig(
                "resolver.max_depth must be at least 1".to_string(),
            ));
        }
        if !(1..=MAX_NESTING_DEPTH).contains(&self.planner.max_nesting_depth) {
            return Err(SettingsError::InvalidConfig(format!(
                "planner.max_nesting_depth must be between 1 and {}, got {}",
                MAX_NESTING_DEPTH, self.planner.max_nesting_depth
            )));
        }
        if self.planner.id_field.trim().is_empty() {
            return Err(SettingsError::InvalidConfig(
                "planner.id_field must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
