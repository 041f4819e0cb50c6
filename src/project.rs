//! The project document: structs, transformers and the graph connecting them.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::ast::StructDescriptor;
use crate::graph::{GraphEdge, GraphNode, MappingGraph, Registry};
use crate::parser::GoStructParser;
use crate::transformer::TransformerDescriptor;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration format: {0}")]
    InvalidFormat(String),
    #[error("malformed configuration JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowConfig {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub structs: Vec<StructDescriptor>,
    #[serde(flatten)]
    pub graph: MappingGraph,
    #[serde(default)]
    pub transformers: Vec<TransformerDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl FlowConfig {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            structs: Vec::new(),
            graph: MappingGraph::default(),
            transformers: Vec::new(),
            created_at: None,
            updated_at: None,
        }
    }

    pub fn with_struct(mut self, descriptor: StructDescriptor) -> Self {
        self.structs.push(descriptor);
        self
    }

    pub fn with_transformer(mut self, transformer: TransformerDescriptor) -> Self {
        self.transformers.push(transformer);
        self
    }

    pub fn with_node(mut self, node: GraphNode) -> Self {
        self.graph.nodes.push(node);
        self
    }

    pub fn with_edge(mut self, edge: GraphEdge) -> Self {
        self.graph.edges.push(edge);
        self
    }

    /// Remove a struct, the nodes showing it and the edges touching those nodes
    pub fn remove_struct(&self, struct_id: &str) -> FlowConfig {
        let mut next = self.clone();
        next.structs.retain(|s| s.id != struct_id);
        next.drop_nodes(|node| node.struct_ref() == Some(struct_id));
        next
    }

    /// Remove a transformer, the nodes showing it and the edges touching those nodes
    pub fn remove_transformer(&self, transformer_id: &str) -> FlowConfig {
        let mut next = self.clone();
        next.transformers.retain(|t| t.id != transformer_id);
        next.drop_nodes(|node| node.transformer_ref() == Some(transformer_id));
        next
    }

    /// Remove a node and every edge touching it
    pub fn remove_node(&self, node_id: &str) -> FlowConfig {
        let mut next = self.clone();
        next.drop_nodes(|node| node.id == node_id);
        next
    }

    pub fn remove_edge(&self, edge_id: &str) -> FlowConfig {
        let mut next = self.clone();
        next.graph.edges.retain(|e| e.id != edge_id);
        next
    }

    /// Swap in a new version of a struct with the same id
    pub fn replace_struct(&self, descriptor: StructDescriptor) -> FlowConfig {
        let mut next = self.clone();
        if let Some(slot) = next.structs.iter_mut().find(|s| s.id == descriptor.id) {
            *slot = descriptor;
        }
        next
    }

    /// Swap in a new version of a transformer with the same id
    pub fn replace_transformer(&self, transformer: TransformerDescriptor) -> FlowConfig {
        let mut next = self.clone();
        if let Some(slot) = next.transformers.iter_mut().find(|t| t.id == transformer.id) {
            *slot = transformer;
        }
        next
    }

    fn drop_nodes(&mut self, doomed: impl Fn(&GraphNode) -> bool) {
        let removed: Vec<String> = self
            .graph
            .nodes
            .iter()
            .filter(|n| doomed(n))
            .map(|n| n.id.clone())
            .collect();
        self.graph.nodes.retain(|n| !removed.contains(&n.id));
        self.graph
            .edges
            .retain(|e| !removed.contains(&e.source) && !removed.contains(&e.target));
    }
}

impl Registry for FlowConfig {
    fn struct_by_id(&self, id: &str) -> Option<&StructDescriptor> {
        self.structs.iter().find(|s| s.id == id)
    }

    fn transformer_by_id(&self, id: &str) -> Option<&TransformerDescriptor> {
        self.transformers.iter().find(|t| t.id == id)
    }
}

/// Read a project document.
///
/// Structs stored only as source text are parsed again under their stored
/// id, and transformer validity is recomputed rather than trusted.
pub fn import_config(json: &str) -> Result<FlowConfig, ConfigError> {
    let value: Value = serde_json::from_str(json)?;

    for key in ["id", "name"] {
        match value.get(key).and_then(Value::as_str) {
            Some(text) if !text.is_empty() => {}
            _ => return Err(ConfigError::InvalidFormat(format!("missing {}", key))),
        }
    }
    if !value.get("structs").is_some_and(Value::is_array) {
        return Err(ConfigError::InvalidFormat("structs must be an array".to_string()));
    }

    let mut config: FlowConfig = serde_json::from_value(value)?;

    let parser = GoStructParser::new();
    for descriptor in &mut config.structs {
        if descriptor.fields.is_empty() && !descriptor.source_text.trim().is_empty() {
            *descriptor = parser.parse_with_id(&descriptor.id, &descriptor.source_text);
        }
    }
    for transformer in &mut config.transformers {
        *transformer = transformer.clone().with_checked_validity();
    }

    debug!(
        id = %config.id,
        structs = config.structs.len(),
        nodes = config.graph.nodes.len(),
        edges = config.graph.edges.len(),
        transformers = config.transformers.len(),
        "imported configuration"
    );
    Ok(config)
}

/// Write a project document as pretty JSON
pub fn export_config(config: &FlowConfig) -> Result<String, ConfigError> {
    Ok(serde_json::to_string_pretty(config)?)
}
