mod go;
mod imports;
mod output;

pub use go::{GoGenerator, format_unit};
pub use imports::{BASELINE_IMPORT, ImportSet, detect_imports};
pub use output::Output;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::graph::MappingSpec;
use crate::transformer::TransformerDescriptor;

pub const NO_MAPPING_FOUND: &str =
    "No mapping found. A mapping requires at least one source and one target struct connected by fields.";
pub const MISSING_STRUCT: &str = "No mapping found: source or target struct is missing";

/// Function name used when a unit holds several mapping functions
pub const MULTIPLE_MAPPINGS: &str = "MultipleMappings";
/// Function name reported when nothing was generated
pub const DEFAULT_FUNCTION_NAME: &str = "MapStructs";

/// Generator options
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Overrides `Map<Source>To<Target>` for a single mapping
    pub function_name: Option<String>,
    pub package_name: String,
    /// Parameter name of the source value
    pub source_var: String,
    /// Name of the returned target variable
    pub target_var: String,
    /// One level of indentation
    pub indent: String,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            function_name: None,
            package_name: "main".to_string(),
            source_var: "src".to_string(),
            target_var: "target".to_string(),
            indent: "    ".to_string(),
        }
    }
}

impl GenerateOptions {
    pub fn with_function_name(mut self, name: impl Into<String>) -> Self {
        self.function_name = Some(name.into());
        self
    }

    pub fn with_package(mut self, name: impl Into<String>) -> Self {
        self.package_name = name.into();
        self
    }
}

/// A generated mapping function plus what it needs to compile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedUnit {
    pub function_name: String,
    #[serde(rename = "code", alias = "bodyText")]
    pub body_text: String,
    pub imports: ImportSet,
    pub errors: Vec<String>,
}

impl GeneratedUnit {
    /// An empty unit carrying one error
    pub fn failed(function_name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            function_name: function_name.into(),
            body_text: String::new(),
            imports: ImportSet::baseline(),
            errors: vec![error.into()],
        }
    }

    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Failures inside synthesis; reported on the unit, never returned to callers
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("failed to write output: {0}")]
    Format(#[from] std::fmt::Error),
    #[error("struct {0} has no name")]
    UnnamedStruct(String),
}

/// Generator trait - converts a mapping spec to code
pub trait Generator {
    fn generate(
        &self,
        spec: &MappingSpec,
        transformers: &[TransformerDescriptor],
        options: &GenerateOptions,
    ) -> GeneratedUnit;
}

/// Generate one mapping function with the Go generator
pub fn generate(spec: &MappingSpec, transformers: &[TransformerDescriptor], options: &GenerateOptions) -> GeneratedUnit {
    GoGenerator::new().generate(spec, transformers, options)
}

/// Generate a unit for everything the analyzer found
pub fn generate_all(
    generator: &dyn Generator,
    specs: &[MappingSpec],
    transformers: &[TransformerDescriptor],
    options: &GenerateOptions,
) -> GeneratedUnit {
    match specs {
        [] => GeneratedUnit::failed(DEFAULT_FUNCTION_NAME, NO_MAPPING_FOUND),
        [spec] => generator.generate(spec, transformers, options),
        _ => {
            let per_spec = GenerateOptions {
                function_name: None,
                ..options.clone()
            };
            let units: Vec<GeneratedUnit> = specs
                .iter()
                .map(|spec| generator.generate(spec, transformers, &per_spec))
                .collect();

            let mut imports = ImportSet::new();
            let mut errors = Vec::new();
            for unit in &units {
                imports.merge(&unit.imports);
                errors.extend(unit.errors.iter().cloned());
            }
            let body_text = units
                .iter()
                .filter(|u| !u.body_text.is_empty())
                .map(|u| u.body_text.as_str())
                .collect::<Vec<_>>()
                .join("\n\n");

            GeneratedUnit {
                function_name: MULTIPLE_MAPPINGS.to_string(),
                body_text,
                imports,
                errors,
            }
        }
    }
}
