//! # Kiln Core
//!
//! The declarative component model for the kiln pipeline toolkit.
//!
//! A *component* is a step definition consumed by a managed pipeline
//! orchestrator: a typed interface (parameters, outputs, defaults) plus a
//! container invocation built from it. Nothing here executes anything; the
//! orchestrator schedules the container and substitutes the deferred
//! placeholders at run time.

pub mod artifact;
pub mod container;
pub mod definition;
pub mod error;
pub mod interface;
pub mod placeholder;
pub mod registry;

pub use artifact::{OutputBinding, OutputKind};
pub use container::{ArgValue, ComponentInvocation, ContainerSpec, flag};
pub use definition::{ComponentDefinition, ComponentMeta};
pub use error::Error;
pub use interface::{ComponentInterface, OutputDef, ParameterDef, ParameterType};
pub use placeholder::{PIPELINE_JOB_ID, PIPELINE_TASK_ID, RuntimeContext};
pub use registry::ComponentRegistry;
