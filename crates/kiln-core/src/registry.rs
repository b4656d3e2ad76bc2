//! Lookup table of known component definitions.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::definition::ComponentDefinition;

/// Holds every component definition known to the toolkit, keyed by meta id.
///
/// Definitions are registered programmatically by component crates or loaded
/// from a directory of YAML files.
#[derive(Debug, Default, Clone)]
pub struct ComponentRegistry {
    pub definitions: HashMap<String, ComponentDefinition>,
}

impl ComponentRegistry {
    /// Inserts a definition, replacing any previous one with the same id.
    pub fn register(&mut self, def: ComponentDefinition) {
        tracing::debug!(component = %def.meta.id, "Registered component");
        self.definitions.insert(def.meta.id.clone(), def);
    }

    pub fn get(&self, id: &str) -> Option<&ComponentDefinition> {
        self.definitions.get(id)
    }

    /// Loads every `*.yaml`/`*.yml` definition in a directory. Returns the
    /// number of definitions loaded.
    #[tracing::instrument(skip(self))]
    pub fn load_from_directory(&mut self, path: &str) -> Result<usize> {
        let dir_path = Path::new(path);
        if !dir_path.exists() {
            tracing::warn!(path = %path, "Component definition directory does not exist");
            return Ok(0);
        }

        let mut count = 0;
        for entry in fs::read_dir(dir_path)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) == Some("yaml")
                || path.extension().and_then(|s| s.to_str()) == Some("yml")
            {
                let content = fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read component definition: {:?}", path))?;

                let def: ComponentDefinition = serde_yaml::from_str(&content)
                    .with_context(|| format!("Failed to parse YAML: {:?}", path))?;

                tracing::info!(component = %def.meta.id, path = ?path, "Loaded component definition");
                self.definitions.insert(def.meta.id.clone(), def);
                count += 1;
            }
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::OutputKind;
    use crate::definition::ComponentMeta;
    use crate::interface::{ComponentInterface, OutputDef, ParameterDef, ParameterType};

    fn sample_definition(id: &str) -> ComponentDefinition {
        ComponentDefinition {
            meta: ComponentMeta {
                id: id.to_string(),
                name: "Sample".to_string(),
                category: "tabular".to_string(),
                description: Some("A sample component.".to_string()),
                version: Some("20230910_1325".to_string()),
            },
            interface: ComponentInterface {
                parameters: vec![ParameterDef::required(
                    "project",
                    ParameterType::String,
                    "Cloud project id.",
                )],
                outputs: vec![OutputDef {
                    name: "gcp_resources".to_string(),
                    kind: OutputKind::Path,
                    description: String::new(),
                }],
            },
        }
    }

    #[test]
    fn test_register_and_get() {
        let mut registry = ComponentRegistry::default();
        registry.register(sample_definition("sample"));
        assert!(registry.get("sample").is_some());
        assert!(registry.get("other").is_none());
    }

    #[test]
    fn test_missing_directory_is_not_an_error() {
        let mut registry = ComponentRegistry::default();
        let count = registry
            .load_from_directory("/nonexistent/kiln-definitions")
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_load_from_directory() {
        let dir = std::env::temp_dir().join(format!("kiln-registry-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let def = sample_definition("from-disk");
        fs::write(
            dir.join("from-disk.yaml"),
            serde_yaml::to_string(&def).unwrap(),
        )
        .unwrap();
        // Non-definition files are skipped.
        fs::write(dir.join("notes.txt"), "ignore me").unwrap();

        let mut registry = ComponentRegistry::default();
        let count = registry.load_from_directory(dir.to_str().unwrap()).unwrap();
        assert_eq!(count, 1);
        assert_eq!(registry.get("from-disk"), Some(&def));

        fs::remove_dir_all(&dir).unwrap();
    }
}
