//! Typed parameter and output schema of a component interface.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::artifact::OutputKind;

/// Scalar type of an input parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ParameterType {
    String,
    Integer,
    Double,
    Boolean,
}

/// Definition of one input parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterDef {
    /// The parameter key name.
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: ParameterType,
    /// Is this parameter mandatory?
    #[serde(default)]
    pub required: bool,
    /// Default substituted when the parameter is omitted. Absent for
    /// required parameters.
    #[serde(default)]
    pub default: Option<Value>,
    /// User-facing description.
    #[serde(default)]
    pub description: String,
}

impl ParameterDef {
    pub fn required(name: &str, param_type: ParameterType, description: &str) -> Self {
        Self {
            name: name.to_string(),
            param_type,
            required: true,
            default: None,
            description: description.to_string(),
        }
    }

    pub fn optional(
        name: &str,
        param_type: ParameterType,
        default: Value,
        description: &str,
    ) -> Self {
        Self {
            name: name.to_string(),
            param_type,
            required: false,
            default: Some(default),
            description: description.to_string(),
        }
    }
}

/// Definition of one declared output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputDef {
    pub name: String,
    pub kind: OutputKind,
    #[serde(default)]
    pub description: String,
}

/// The full typed interface of a component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentInterface {
    pub parameters: Vec<ParameterDef>,
    pub outputs: Vec<OutputDef>,
}

impl ComponentInterface {
    /// Looks up a parameter definition by name.
    pub fn parameter(&self, name: &str) -> Option<&ParameterDef> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Looks up an output definition by name.
    pub fn output(&self, name: &str) -> Option<&OutputDef> {
        self.outputs.iter().find(|o| o.name == name)
    }
}
