//! Container invocation assembly.
//!
//! A built component boils down to an image reference, an ordered
//! `--flag=value` argument vector, and the named output slots the container
//! writes into. Construction is pure string concatenation: values are never
//! quoted or escaped, and the builder never rejects; malformed values
//! surface inside the invoked container.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::artifact::OutputBinding;

/// The value half of a `--flag=value` argument.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    Str(String),
    Int(i64),
    Bool(bool),
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Verbatim, no quoting. Delimiter characters are the caller's
            // responsibility.
            ArgValue::Str(s) => f.write_str(s),
            // Base-10, no separators.
            ArgValue::Int(n) => write!(f, "{n}"),
            ArgValue::Bool(b) => f.write_str(if *b { "true" } else { "false" }),
        }
    }
}

impl From<&str> for ArgValue {
    fn from(value: &str) -> Self {
        ArgValue::Str(value.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(value: String) -> Self {
        ArgValue::Str(value)
    }
}

impl From<i64> for ArgValue {
    fn from(value: i64) -> Self {
        ArgValue::Int(value)
    }
}

impl From<bool> for ArgValue {
    fn from(value: bool) -> Self {
        ArgValue::Bool(value)
    }
}

/// Renders one `--<name>=<value>` argument.
pub fn flag(name: &str, value: impl Into<ArgValue>) -> String {
    format!("--{name}={}", value.into())
}

/// A fully specified container invocation: which image to run and with what
/// arguments. `command` stays empty when the image entrypoint is baked in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerSpec {
    pub image: String,
    #[serde(default)]
    pub command: Vec<String>,
    #[serde(default)]
    pub args: Vec<String>,
}

impl ContainerSpec {
    /// Returns the first flag name that occurs more than once, if any.
    ///
    /// Positional arguments are skipped. Flag-name uniqueness is an
    /// invariant component authors hold in tests; construction itself never
    /// rejects.
    pub fn duplicate_flag(&self) -> Option<&str> {
        let mut seen = HashSet::new();
        for arg in &self.args {
            let Some(rest) = arg.strip_prefix("--") else {
                continue;
            };
            let name = rest.split('=').next().unwrap_or(rest);
            if !seen.insert(name) {
                return Some(name);
            }
        }
        None
    }
}

/// Everything the orchestrator needs to run one component task: the
/// container spec plus the declared output slots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentInvocation {
    pub container: ContainerSpec,
    pub outputs: Vec<OutputBinding>,
}

impl ComponentInvocation {
    /// Looks up a declared output slot by name.
    pub fn output(&self, name: &str) -> Option<&OutputBinding> {
        self.outputs.iter().find(|o| o.name == name)
    }
}
