//! Go struct mapping compiler.
//!
//! Parses `type X struct { ... }` declarations, infers which struct maps onto
//! which from a node/edge graph, and emits a Go conversion function.

pub mod ast;
pub mod catalog;
pub mod error;
pub mod generate;
pub mod graph;
pub mod ids;
pub mod parser;
pub mod project;
pub mod transformer;

use serde::Serialize;
use tracing::debug;

pub use ast::{FieldDescriptor, StructDescriptor};
pub use catalog::{BuiltinCatalog, TransformerCatalog, TransformerTemplate};
pub use error::{Diagnostic, ErrorKind, Severity};
pub use generate::{GenerateOptions, GeneratedUnit, Generator, GoGenerator, format_unit, generate, generate_all};
pub use graph::{FieldMapping, GraphEdge, GraphNode, MappingGraph, MappingSpec, MemoryRegistry, Registry, analyze};
pub use ids::{IdGenerator, SequentialIdGenerator, UuidIdGenerator};
pub use parser::{GoStructParser, StructParser, parse_struct, parse_structs};
pub use project::{ConfigError, FlowConfig, export_config, import_config};
pub use transformer::{TransformerDescriptor, check_go_syntax};

/// Result of compiling a project document
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileResult {
    pub unit: GeneratedUnit,
    /// Complete Go file; absent when the unit carries errors
    pub file: Option<String>,
}

impl CompileResult {
    pub fn is_ok(&self) -> bool {
        self.unit.is_ok()
    }
}

/// Analyze, generate and format in one pass
pub struct Pipeline {
    generator: Box<dyn Generator>,
    options: GenerateOptions,
}

impl Pipeline {
    pub fn new(options: GenerateOptions) -> Self {
        Self {
            generator: Box::new(GoGenerator::new()),
            options,
        }
    }

    /// Go generator with default options
    pub fn standard() -> Self {
        Self::new(GenerateOptions::default())
    }

    pub fn with_generator(mut self, generator: Box<dyn Generator>) -> Self {
        self.generator = generator;
        self
    }

    pub fn options(&self) -> &GenerateOptions {
        &self.options
    }

    pub fn compile(&self, config: &FlowConfig) -> CompileResult {
        let specs = analyze(&config.graph, config);
        debug!(config = %config.id, mappings = specs.len(), "analyzed graph");

        let unit = generate_all(self.generator.as_ref(), &specs, &config.transformers, &self.options);
        let file = unit.is_ok().then(|| format_unit(&unit, &self.options.package_name));

        CompileResult { unit, file }
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> FlowConfig {
        let parser = GoStructParser::new();
        FlowConfig::new("flow", "Users")
            .with_struct(parser.parse_with_id("s1", "type User struct {\n  ID int64\n  Name string\n}"))
            .with_struct(parser.parse_with_id("s2", "type UserDTO struct {\n  ID int64\n  Name string\n}"))
            .with_node(GraphNode::for_struct("n1", "s1", "User"))
            .with_node(GraphNode::for_struct("n2", "s2", "UserDTO"))
            .with_edge(GraphEdge::new("e1", "n1", "n2").from_field("Name").to_field("Name"))
    }

    #[test]
    fn test_compile() {
        let result = Pipeline::standard().compile(&config());
        assert!(result.is_ok());
        assert_eq!(
            result.file.as_deref(),
            Some(
                "package main\n\nimport \"fmt\"\n\nfunc MapUserToUserDTO(src User) UserDTO {\n    var target UserDTO\n\n    // Field mappings\n    target.Name = src.Name\n\n    return target\n}\n"
            )
        );
    }

    #[test]
    fn test_compile_without_edges() {
        let mut config = config();
        config.graph.edges.clear();
        let result = Pipeline::standard().compile(&config);
        assert!(!result.is_ok());
        assert!(result.file.is_none());
        assert_eq!(result.unit.errors, vec![generate::NO_MAPPING_FOUND.to_string()]);
    }

    #[test]
    fn test_package_option() {
        let pipeline = Pipeline::new(GenerateOptions::default().with_package("mappers"));
        let result = pipeline.compile(&config());
        assert!(result.file.is_some_and(|f| f.starts_with("package mappers\n")));
    }
}
