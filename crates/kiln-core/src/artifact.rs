//! Named output slots of a component.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::placeholder;

/// How the orchestrator tracks an output.
///
/// `Dataset` and `Artifact` are tracked artifacts addressed by storage URI;
/// `Path` is a plain side-channel file (e.g. a JSON record of provisioned
/// cloud resources) addressed by local path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum OutputKind {
    Dataset,
    Artifact,
    Path,
}

/// One declared output slot. `location` is a placeholder token the
/// orchestrator substitutes with the allocated storage location at run time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputBinding {
    pub name: String,
    pub kind: OutputKind,
    pub location: String,
}

impl OutputBinding {
    pub fn dataset(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: OutputKind::Dataset,
            location: placeholder::output_uri(name),
        }
    }

    pub fn artifact(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: OutputKind::Artifact,
            location: placeholder::output_uri(name),
        }
    }

    pub fn path(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: OutputKind::Path,
            location: placeholder::output_path(name),
        }
    }
}
