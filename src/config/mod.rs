//! Configuration module for nestplan.
//!
//! Settings for relationship resolution, plan assembly and rendering.

mod settings;

pub use settings::{PlannerSettings, RenderSettings, ResolverSettings, Settings, SettingsError};
