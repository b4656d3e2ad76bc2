//! # Kiln Components
//!
//! Concrete component builders for the kiln pipeline toolkit. Each module
//! maps a typed parameter set onto a container invocation the orchestrator
//! can schedule; no transform logic runs here.

pub mod distillation_feature_transform;

pub use distillation_feature_transform::DistillationFeatureTransformParams;
