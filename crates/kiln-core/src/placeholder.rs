//! Deferred substitution points resolved by the orchestrator at run time.
//!
//! Component builders never see concrete run identifiers or output
//! locations. They emit template tokens instead, and the orchestrator
//! substitutes them once a task is actually scheduled. Tokens use handlebars
//! syntax so resolution is a plain template render.

use std::collections::BTreeMap;

use handlebars::Handlebars;
use once_cell::sync::Lazy;
use serde::Serialize;
use serde_json::json;

use crate::error::Error;

/// Token for the opaque identifier of the enclosing pipeline run.
pub const PIPELINE_JOB_ID: &str = "{{pipeline_job_id}}";

/// Token for the opaque identifier of the task within the run.
pub const PIPELINE_TASK_ID: &str = "{{pipeline_task_id}}";

/// Token for the orchestrator-allocated storage URI of a named artifact output.
pub fn output_uri(name: &str) -> String {
    format!("{{{{outputs.{name}.uri}}}}")
}

/// Token for the orchestrator-allocated file path of a named plain output.
pub fn output_path(name: &str) -> String {
    format!("{{{{outputs.{name}.path}}}}")
}

/// Builds the task-scoped path template `<root_dir>/<job id>/<task id>/<suffix>`.
///
/// Both identifiers are substituted by the orchestrator, so concurrent runs
/// and concurrent tasks within a run never collide on storage paths.
pub fn task_scoped_path(root_dir: &str, suffix: &str) -> String {
    format!("{root_dir}/{PIPELINE_JOB_ID}/{PIPELINE_TASK_ID}/{suffix}")
}

// Strict mode: an unresolved token is a render error, not an empty string.
// Escaping is disabled since rendered values are CLI arguments, not HTML.
static ENGINE: Lazy<Handlebars<'static>> = Lazy::new(|| {
    let mut hbs = Handlebars::new();
    hbs.set_strict_mode(true);
    hbs.register_escape_fn(handlebars::no_escape);
    hbs
});

/// The storage location the orchestrator allocated for one output slot.
#[derive(Debug, Clone, Serialize, Default)]
pub struct OutputLocation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Orchestrator-side resolution context for one task instantiation.
///
/// Holds the concrete run/task identifiers and the allocated output
/// locations, and substitutes them into placeholder templates. This is the
/// collaborator half of the contract: component construction itself never
/// resolves anything.
#[derive(Debug, Clone, Default)]
pub struct RuntimeContext {
    job_id: String,
    task_id: String,
    outputs: BTreeMap<String, OutputLocation>,
}

impl RuntimeContext {
    pub fn new(job_id: impl Into<String>, task_id: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            task_id: task_id.into(),
            outputs: BTreeMap::new(),
        }
    }

    /// Records the allocated URI for an artifact output.
    pub fn with_output_uri(mut self, name: impl Into<String>, uri: impl Into<String>) -> Self {
        self.outputs
            .entry(name.into())
            .or_default()
            .uri = Some(uri.into());
        self
    }

    /// Records the allocated file path for a plain output.
    pub fn with_output_path(mut self, name: impl Into<String>, path: impl Into<String>) -> Self {
        self.outputs
            .entry(name.into())
            .or_default()
            .path = Some(path.into());
        self
    }

    /// Looks up the allocated URI of a named artifact output.
    pub fn output_uri(&self, name: &str) -> Result<&str, Error> {
        self.outputs
            .get(name)
            .and_then(|loc| loc.uri.as_deref())
            .ok_or_else(|| Error::UnknownOutput(name.to_string()))
    }

    /// Looks up the allocated file path of a named plain output.
    pub fn output_path(&self, name: &str) -> Result<&str, Error> {
        self.outputs
            .get(name)
            .and_then(|loc| loc.path.as_deref())
            .ok_or_else(|| Error::UnknownOutput(name.to_string()))
    }

    /// Substitutes every placeholder token in `template`.
    ///
    /// A token with no value in this context is an error.
    pub fn resolve(&self, template: &str) -> Result<String, Error> {
        let data = json!({
            "pipeline_job_id": self.job_id,
            "pipeline_task_id": self.task_id,
            "outputs": self.outputs,
        });
        Ok(ENGINE.render_template(template, &data)?)
    }

    /// Resolves a full argument vector, preserving order.
    pub fn resolve_args(&self, args: &[String]) -> Result<Vec<String>, Error> {
        args.iter().map(|arg| self.resolve(arg)).collect()
    }
}
