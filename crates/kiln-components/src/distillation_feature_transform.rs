//! Distillation-stage feature transform engine component.
//!
//! During distillation the feature transform configuration generated by the
//! earlier transform stage is re-used to transform the train/validation
//! splits with teacher-model predictions (soft targets) included. This
//! module only declares the step: the transform itself runs inside a fixed,
//! versioned container image driven by a managed Dataflow backend.

use kiln_core::artifact::{OutputBinding, OutputKind};
use kiln_core::container::{ComponentInvocation, ContainerSpec, flag};
use kiln_core::definition::{ComponentDefinition, ComponentMeta};
use kiln_core::interface::{ComponentInterface, OutputDef, ParameterDef, ParameterType};
use kiln_core::placeholder::{
    PIPELINE_JOB_ID, PIPELINE_TASK_ID, output_path, output_uri, task_scoped_path,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// The transform engine image. Fixed and versioned; no parameter selects it.
pub const IMAGE: &str =
    "us-docker.pkg.dev/vertex-ai/automl-tabular/feature-transform-engine:20230910_1325";

/// Worker image handed to the Dataflow jobs the engine launches.
pub const DATAFLOW_WORKER_IMAGE: &str =
    "us-docker.pkg.dev/vertex-ai/automl-tabular/dataflow-worker:20230910_1325";

/// Registry id of this component.
pub const COMPONENT_ID: &str = "distillation-feature-transform-engine";

/// Model prediction type, as the transform engine understands it.
///
/// Convenience for callers populating
/// [`DistillationFeatureTransformParams::prediction_type`]; the parameter
/// itself stays a plain string and is passed through verbatim, validation
/// belongs to the invoked container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PredictionType {
    Classification,
    Regression,
    TimeSeries,
}

impl PredictionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PredictionType::Classification => "classification",
            PredictionType::Regression => "regression",
            PredictionType::TimeSeries => "time_series",
        }
    }
}

/// Parameters of the distillation-stage feature transform engine step.
///
/// Optional fields carry the same defaults the engine applies, so a
/// deserialized parameter set is always fully populated before the
/// invocation is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DistillationFeatureTransformParams {
    /// Cloud Storage location where all generated outputs land.
    pub root_dir: String,
    /// Project that runs the transform engine.
    pub project: String,
    /// Region for the created services.
    pub location: String,
    /// Path to the transform config produced by the pre-distillation
    /// transform stage.
    pub transform_config_path: String,
    /// Full BigQuery table id of the train split, soft targets included.
    pub bigquery_train_full_table_uri: String,
    /// Full BigQuery table id of the validation split.
    pub bigquery_validate_full_table_uri: String,
    /// Label column of the input data.
    pub target_column: String,
    /// One of "classification", "regression", "time_series".
    pub prediction_type: String,
    /// Dataset in `projectId.datasetId` format for intermediate tables.
    /// When empty the engine stages under an auto-created dataset in the
    /// input data's location.
    #[serde(default)]
    pub bigquery_staging_full_dataset_id: String,
    /// Weight column of the input data.
    #[serde(default)]
    pub weight_column: String,
    /// Machine type for the Dataflow workers.
    #[serde(default = "default_dataflow_machine_type")]
    pub dataflow_machine_type: String,
    /// Upper bound on Dataflow worker count.
    #[serde(default = "default_dataflow_max_num_workers")]
    pub dataflow_max_num_workers: i64,
    /// Disk size, in gigabytes, of each Dataflow worker.
    #[serde(default = "default_dataflow_disk_size_gb")]
    pub dataflow_disk_size_gb: i64,
    /// Fully qualified subnetwork name; empty means the default subnetwork.
    #[serde(default)]
    pub dataflow_subnetwork: String,
    /// Whether Dataflow workers use public IP addresses.
    #[serde(default = "default_true")]
    pub dataflow_use_public_ips: bool,
    /// Custom service account for the Dataflow jobs.
    #[serde(default)]
    pub dataflow_service_account: String,
    /// Customer-managed encryption key.
    #[serde(default)]
    pub encryption_spec_key_name: String,
    /// Accepted for interface compatibility; the engine does not read it and
    /// it is not forwarded to the container.
    #[serde(default)]
    pub autodetect_csv_schema: bool,
}

fn default_dataflow_machine_type() -> String {
    "n1-standard-16".to_string()
}

fn default_dataflow_max_num_workers() -> i64 {
    25
}

fn default_dataflow_disk_size_gb() -> i64 {
    40
}

fn default_true() -> bool {
    true
}

/// Builds the container invocation for one distillation-stage transform task.
///
/// Pure and deterministic: identical parameters yield a byte-identical
/// argument vector. No value is validated or escaped here; malformed values
/// surface inside the invoked container.
pub fn build(params: &DistillationFeatureTransformParams) -> ComponentInvocation {
    let root = params.root_dir.as_str();
    let args = vec![
        // The image serves several engine entry points; the leading
        // positional selects this one.
        "distillation_stage_feature_transform_engine".to_string(),
        flag("project", params.project.as_str()),
        flag("location", params.location.as_str()),
        flag("transform_config_path", params.transform_config_path.as_str()),
        flag(
            "bigquery_train_full_table_uri",
            params.bigquery_train_full_table_uri.as_str(),
        ),
        flag(
            "bigquery_validate_full_table_uri",
            params.bigquery_validate_full_table_uri.as_str(),
        ),
        flag(
            "bigquery_staging_full_dataset_id",
            params.bigquery_staging_full_dataset_id.as_str(),
        ),
        flag("target_column", params.target_column.as_str()),
        flag("prediction_type", params.prediction_type.as_str()),
        flag("weight_column", params.weight_column.as_str()),
        flag("error_file_path", task_scoped_path(root, "error.txt")),
        flag("transform_output_artifact_path", output_uri("transform_output")),
        flag("transform_output_path", task_scoped_path(root, "transform")),
        flag("materialized_examples_path", task_scoped_path(root, "materialized")),
        flag("export_data_path", task_scoped_path(root, "export")),
        flag("materialized_data_path", task_scoped_path(root, "materialized_data")),
        flag("materialized_data_artifact_path", output_uri("materialized_data")),
        // Both run identifiers go into the job name for traceability.
        flag(
            "job_name",
            format!("feature-transform-engine-{PIPELINE_JOB_ID}-{PIPELINE_TASK_ID}"),
        ),
        flag("dataflow_project", params.project.as_str()),
        flag("dataflow_staging_dir", task_scoped_path(root, "dataflow_staging")),
        flag("dataflow_tmp_dir", task_scoped_path(root, "dataflow_tmp")),
        flag("dataflow_max_num_workers", params.dataflow_max_num_workers),
        flag("dataflow_machine_type", params.dataflow_machine_type.as_str()),
        flag("dataflow_worker_container_image", DATAFLOW_WORKER_IMAGE),
        flag("dataflow_disk_size_gb", params.dataflow_disk_size_gb),
        flag(
            "dataflow_subnetwork_fully_qualified",
            params.dataflow_subnetwork.as_str(),
        ),
        flag("dataflow_use_public_ips", params.dataflow_use_public_ips),
        flag("dataflow_service_account", params.dataflow_service_account.as_str()),
        flag("dataflow_kms_key", params.encryption_spec_key_name.as_str()),
        flag("gcp_resources_path", output_path("gcp_resources")),
    ];

    tracing::debug!(image = IMAGE, arg_count = args.len(), "Built container invocation");

    ComponentInvocation {
        container: ContainerSpec {
            image: IMAGE.to_string(),
            command: Vec::new(),
            args,
        },
        outputs: vec![
            OutputBinding::dataset("materialized_data"),
            OutputBinding::artifact("transform_output"),
            OutputBinding::path("gcp_resources"),
        ],
    }
}

/// The registry entry for this component.
pub fn definition() -> ComponentDefinition {
    ComponentDefinition {
        meta: ComponentMeta {
            id: COMPONENT_ID.to_string(),
            name: "Distillation Feature Transform Engine".to_string(),
            category: "tabular".to_string(),
            description: Some(
                "Re-applies a previously generated feature transform config to train/validation \
                 splits that include teacher-model soft targets."
                    .to_string(),
            ),
            version: Some("20230910_1325".to_string()),
        },
        interface: ComponentInterface {
            parameters: vec![
                ParameterDef::required(
                    "root_dir",
                    ParameterType::String,
                    "Cloud Storage location where all generated outputs land.",
                ),
                ParameterDef::required(
                    "project",
                    ParameterType::String,
                    "Project that runs the transform engine.",
                ),
                ParameterDef::required(
                    "location",
                    ParameterType::String,
                    "Region for the created services.",
                ),
                ParameterDef::required(
                    "transform_config_path",
                    ParameterType::String,
                    "Path to the transform config produced by the pre-distillation stage.",
                ),
                ParameterDef::required(
                    "bigquery_train_full_table_uri",
                    ParameterType::String,
                    "Full BigQuery table id of the train split, soft targets included.",
                ),
                ParameterDef::required(
                    "bigquery_validate_full_table_uri",
                    ParameterType::String,
                    "Full BigQuery table id of the validation split.",
                ),
                ParameterDef::required(
                    "target_column",
                    ParameterType::String,
                    "Label column of the input data.",
                ),
                ParameterDef::required(
                    "prediction_type",
                    ParameterType::String,
                    "One of \"classification\", \"regression\", \"time_series\".",
                ),
                ParameterDef::optional(
                    "bigquery_staging_full_dataset_id",
                    ParameterType::String,
                    json!(""),
                    "Dataset in projectId.datasetId format for intermediate tables.",
                ),
                ParameterDef::optional(
                    "weight_column",
                    ParameterType::String,
                    json!(""),
                    "Weight column of the input data.",
                ),
                ParameterDef::optional(
                    "dataflow_machine_type",
                    ParameterType::String,
                    json!("n1-standard-16"),
                    "Machine type for the Dataflow workers.",
                ),
                ParameterDef::optional(
                    "dataflow_max_num_workers",
                    ParameterType::Integer,
                    json!(25),
                    "Upper bound on Dataflow worker count.",
                ),
                ParameterDef::optional(
                    "dataflow_disk_size_gb",
                    ParameterType::Integer,
                    json!(40),
                    "Disk size, in gigabytes, of each Dataflow worker.",
                ),
                ParameterDef::optional(
                    "dataflow_subnetwork",
                    ParameterType::String,
                    json!(""),
                    "Fully qualified subnetwork name; empty means the default subnetwork.",
                ),
                ParameterDef::optional(
                    "dataflow_use_public_ips",
                    ParameterType::Boolean,
                    json!(true),
                    "Whether Dataflow workers use public IP addresses.",
                ),
                ParameterDef::optional(
                    "dataflow_service_account",
                    ParameterType::String,
                    json!(""),
                    "Custom service account for the Dataflow jobs.",
                ),
                ParameterDef::optional(
                    "encryption_spec_key_name",
                    ParameterType::String,
                    json!(""),
                    "Customer-managed encryption key.",
                ),
                ParameterDef::optional(
                    "autodetect_csv_schema",
                    ParameterType::Boolean,
                    json!(false),
                    "Accepted for interface compatibility; not forwarded to the container.",
                ),
            ],
            outputs: vec![
                OutputDef {
                    name: "materialized_data".to_string(),
                    kind: OutputKind::Dataset,
                    description: "The materialized dataset.".to_string(),
                },
                OutputDef {
                    name: "transform_output".to_string(),
                    kind: OutputKind::Artifact,
                    description: "The transform output artifact.".to_string(),
                },
                OutputDef {
                    name: "gcp_resources".to_string(),
                    kind: OutputKind::Path,
                    description: "JSON record of cloud resources provisioned by this step."
                        .to_string(),
                },
            ],
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_core::placeholder::RuntimeContext;
    use kiln_core::registry::ComponentRegistry;
    use serde_json::json;

    fn sample_params() -> DistillationFeatureTransformParams {
        serde_json::from_value(json!({
            "root_dir": "gs://bucket",
            "project": "my-project",
            "location": "us-central1",
            "transform_config_path": "gs://bucket/config/transform_config.json",
            "bigquery_train_full_table_uri": "bq://my-project.dataset.train",
            "bigquery_validate_full_table_uri": "bq://my-project.dataset.validate",
            "target_column": "label",
            "prediction_type": PredictionType::Classification.as_str(),
        }))
        .unwrap()
    }

    #[test]
    fn test_omitted_parameters_take_documented_defaults() {
        let params = sample_params();
        assert_eq!(params.bigquery_staging_full_dataset_id, "");
        assert_eq!(params.weight_column, "");
        assert_eq!(params.dataflow_machine_type, "n1-standard-16");
        assert_eq!(params.dataflow_max_num_workers, 25);
        assert_eq!(params.dataflow_disk_size_gb, 40);
        assert_eq!(params.dataflow_subnetwork, "");
        assert!(params.dataflow_use_public_ips);
        assert_eq!(params.dataflow_service_account, "");
        assert_eq!(params.encryption_spec_key_name, "");
        assert!(!params.autodetect_csv_schema);
    }

    #[test]
    fn test_build_is_deterministic() {
        let params = sample_params();
        assert_eq!(build(&params), build(&params));
    }

    #[test]
    fn test_image_is_constant() {
        let mut params = sample_params();
        let a = build(&params);
        params.project = "other-project".to_string();
        params.prediction_type = "regression".to_string();
        let b = build(&params);
        assert_eq!(a.container.image, IMAGE);
        assert_eq!(b.container.image, IMAGE);
        assert!(a.container.command.is_empty());
    }

    #[test]
    fn test_argument_vector_shape() {
        let invocation = build(&sample_params());
        let args = &invocation.container.args;
        assert_eq!(args.len(), 30);
        assert_eq!(args[0], "distillation_stage_feature_transform_engine");
        assert_eq!(args[1], "--project=my-project");
        assert_eq!(args[2], "--location=us-central1");
        assert_eq!(args.last().unwrap(), "--gcp_resources_path={{outputs.gcp_resources.path}}");
        assert_eq!(invocation.container.duplicate_flag(), None);
    }

    #[test]
    fn test_defaults_reach_the_argument_vector() {
        let args = build(&sample_params()).container.args;
        assert!(args.contains(&"--dataflow_machine_type=n1-standard-16".to_string()));
        assert!(args.contains(&"--dataflow_max_num_workers=25".to_string()));
        assert!(args.contains(&"--dataflow_disk_size_gb=40".to_string()));
        assert!(args.contains(&"--dataflow_use_public_ips=true".to_string()));
        assert!(args.contains(&"--weight_column=".to_string()));
    }

    #[test]
    fn test_booleans_render_lowercase() {
        let mut params = sample_params();
        params.dataflow_use_public_ips = false;
        let args = build(&params).container.args;
        assert!(args.contains(&"--dataflow_use_public_ips=false".to_string()));
    }

    #[test]
    fn test_autodetect_csv_schema_is_not_forwarded() {
        let mut params = sample_params();
        params.autodetect_csv_schema = true;
        let args = build(&params).container.args;
        assert!(!args.iter().any(|a| a.contains("autodetect")));
        // Flipping it must not change the invocation at all.
        params.autodetect_csv_schema = false;
        assert_eq!(args, build(&params).container.args);
    }

    #[test]
    fn test_task_scoped_paths_are_distinct_and_rooted() {
        let ctx = RuntimeContext::new("job1", "task1");
        let args = build(&sample_params()).container.args;
        let mut resolved_paths = Vec::new();
        for arg in &args {
            if let Some(value) = arg.split_once('=').map(|(_, v)| v)
                && value.starts_with("gs://bucket/{{")
            {
                let resolved = ctx.resolve(value).unwrap();
                assert!(resolved.starts_with("gs://bucket/job1/task1/"));
                resolved_paths.push(resolved);
            }
        }
        assert_eq!(resolved_paths.len(), 7);
        let unique: std::collections::HashSet<_> = resolved_paths.iter().collect();
        assert_eq!(unique.len(), resolved_paths.len());
    }

    #[test]
    fn test_transform_output_path_example() {
        let ctx = RuntimeContext::new("job1", "task1");
        let args = build(&sample_params()).container.args;
        let transform = args
            .iter()
            .find(|a| a.starts_with("--transform_output_path="))
            .unwrap();
        assert_eq!(
            ctx.resolve(transform).unwrap(),
            "--transform_output_path=gs://bucket/job1/task1/transform"
        );
    }

    #[test]
    fn test_full_resolution_with_output_locations() {
        let ctx = RuntimeContext::new("job1", "task1")
            .with_output_uri("transform_output", "gs://bucket/artifacts/transform_output")
            .with_output_uri("materialized_data", "gs://bucket/artifacts/materialized_data")
            .with_output_path("gcp_resources", "/outputs/gcp_resources.json");
        let invocation = build(&sample_params());
        let resolved = ctx.resolve_args(&invocation.container.args).unwrap();

        assert!(resolved.contains(&"--job_name=feature-transform-engine-job1-task1".to_string()));
        assert!(resolved.contains(
            &"--transform_output_artifact_path=gs://bucket/artifacts/transform_output".to_string()
        ));
        assert!(resolved.contains(&"--gcp_resources_path=/outputs/gcp_resources.json".to_string()));
        assert!(resolved.contains(&"--error_file_path=gs://bucket/job1/task1/error.txt".to_string()));
        // No token survives resolution.
        assert!(!resolved.iter().any(|a| a.contains("{{")));
    }

    #[test]
    fn test_declared_outputs() {
        let invocation = build(&sample_params());
        assert_eq!(invocation.outputs.len(), 3);
        assert_eq!(
            invocation.output("materialized_data").unwrap().kind,
            OutputKind::Dataset
        );
        assert_eq!(
            invocation.output("transform_output").unwrap().kind,
            OutputKind::Artifact
        );
        assert_eq!(invocation.output("gcp_resources").unwrap().kind, OutputKind::Path);
    }

    #[test]
    fn test_definition_registers_and_roundtrips() {
        let def = definition();
        assert_eq!(def.interface.parameters.len(), 18);
        assert_eq!(def.interface.outputs.len(), 3);
        assert!(def.interface.parameter("root_dir").unwrap().required);
        assert_eq!(
            def.interface
                .parameter("dataflow_machine_type")
                .unwrap()
                .default,
            Some(json!("n1-standard-16"))
        );

        let yaml = serde_yaml::to_string(&def).unwrap();
        let back: kiln_core::ComponentDefinition = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back, def);

        let mut registry = ComponentRegistry::default();
        registry.register(def);
        assert!(registry.get(COMPONENT_ID).is_some());
    }
}
