//! The registry-facing description of a component.

use serde::{Deserialize, Serialize};

use crate::interface::ComponentInterface;

/// Identity and provenance of a component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentMeta {
    /// Unique identifier (e.g. "distillation-feature-transform-engine").
    pub id: String,
    /// Human-readable label.
    pub name: String,
    /// Palette grouping (e.g. "tabular").
    pub category: String,
    pub description: Option<String>,
    /// Version of the backing container image.
    pub version: Option<String>,
}

/// A component definition as stored in the registry: identity plus the full
/// typed interface. Serializes to and from YAML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentDefinition {
    pub meta: ComponentMeta,
    pub interface: ComponentInterface,
}
