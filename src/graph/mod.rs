pub mod analyzer;
pub mod handle;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

pub use analyzer::analyze;

use crate::ast::StructDescriptor;
use crate::transformer::TransformerDescriptor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Struct,
    Transformer,
}

/// Node payload; which reference is meaningful depends on the node kind
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub struct_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transformer_id: Option<String>,
    #[serde(default)]
    pub label: String,
}

/// Canvas coordinates, carried through untouched
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NodePosition {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<NodePosition>,
    #[serde(default)]
    pub data: NodeData,
}

impl GraphNode {
    pub fn for_struct(id: impl Into<String>, struct_id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: NodeKind::Struct,
            position: None,
            data: NodeData {
                struct_id: Some(struct_id.into()),
                transformer_id: None,
                label: label.into(),
            },
        }
    }

    pub fn for_transformer(id: impl Into<String>, transformer_id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: NodeKind::Transformer,
            position: None,
            data: NodeData {
                struct_id: None,
                transformer_id: Some(transformer_id.into()),
                label: label.into(),
            },
        }
    }

    pub fn is_struct(&self) -> bool {
        self.kind == NodeKind::Struct
    }

    pub fn is_transformer(&self) -> bool {
        self.kind == NodeKind::Transformer
    }

    /// Referenced struct id, for struct nodes
    pub fn struct_ref(&self) -> Option<&str> {
        match self.kind {
            NodeKind::Struct => self.data.struct_id.as_deref(),
            NodeKind::Transformer => None,
        }
    }

    /// Referenced transformer id, for transformer nodes
    pub fn transformer_ref(&self) -> Option<&str> {
        match self.kind {
            NodeKind::Transformer => self.data.transformer_id.as_deref(),
            NodeKind::Struct => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeData {
    /// Transformer applied along this edge
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transformer_id: Option<String>,
}

impl EdgeData {
    pub fn is_empty(&self) -> bool {
        self.transformer_id.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<String>,
    #[serde(default, skip_serializing_if = "EdgeData::is_empty")]
    pub data: EdgeData,
}

impl GraphEdge {
    pub fn new(id: impl Into<String>, source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            source_handle: None,
            target_handle: None,
            data: EdgeData::default(),
        }
    }

    /// Attach the source end to a struct field
    pub fn from_field(mut self, field: &str) -> Self {
        self.source_handle = Some(handle::source_handle(field));
        self
    }

    /// Attach the target end to a struct field
    pub fn to_field(mut self, field: &str) -> Self {
        self.target_handle = Some(handle::target_handle(field));
        self
    }

    pub fn from_transformer(mut self) -> Self {
        self.source_handle = Some(handle::TRANSFORMER_OUT.to_string());
        self
    }

    pub fn into_transformer(mut self) -> Self {
        self.target_handle = Some(handle::TRANSFORMER_IN.to_string());
        self
    }

    pub fn with_transformer(mut self, transformer_id: impl Into<String>) -> Self {
        self.data.transformer_id = Some(transformer_id.into());
        self
    }

    pub fn transformer_id(&self) -> Option<&str> {
        self.data.transformer_id.as_deref()
    }
}

/// Nodes and edges describing which structs and transformers are connected
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MappingGraph {
    #[serde(default)]
    pub nodes: Vec<GraphNode>,
    #[serde(default)]
    pub edges: Vec<GraphEdge>,
}

impl MappingGraph {
    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }
}

/// One source-field to target-field correspondence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMapping {
    pub source_field: String,
    pub target_field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transformer: Option<TransformerDescriptor>,
}

impl FieldMapping {
    pub fn direct(source_field: impl Into<String>, target_field: impl Into<String>) -> Self {
        Self {
            source_field: source_field.into(),
            target_field: target_field.into(),
            transformer: None,
        }
    }

    pub fn with_transformer(mut self, transformer: TransformerDescriptor) -> Self {
        self.transformer = Some(transformer);
        self
    }
}

/// Resolved source struct, target struct and their field correspondences
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_struct: Option<StructDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_struct: Option<StructDescriptor>,
    #[serde(default)]
    pub field_mappings: Vec<FieldMapping>,
}

impl MappingSpec {
    pub fn new(source: StructDescriptor, target: StructDescriptor) -> Self {
        Self {
            source_struct: Some(source),
            target_struct: Some(target),
            field_mappings: Vec::new(),
        }
    }

    pub fn with_mapping(mut self, mapping: FieldMapping) -> Self {
        self.field_mappings.push(mapping);
        self
    }
}

/// Resolves the ids graph nodes and edges refer to
pub trait Registry {
    fn struct_by_id(&self, id: &str) -> Option<&StructDescriptor>;
    fn transformer_by_id(&self, id: &str) -> Option<&TransformerDescriptor>;
}

/// Registry over owned descriptors
#[derive(Debug, Clone, Default)]
pub struct MemoryRegistry {
    structs: HashMap<String, StructDescriptor>,
    transformers: HashMap<String, TransformerDescriptor>,
}

impl MemoryRegistry {
    pub fn new(
        structs: impl IntoIterator<Item = StructDescriptor>,
        transformers: impl IntoIterator<Item = TransformerDescriptor>,
    ) -> Self {
        Self {
            structs: structs.into_iter().map(|s| (s.id.clone(), s)).collect(),
            transformers: transformers.into_iter().map(|t| (t.id.clone(), t)).collect(),
        }
    }
}

impl Registry for MemoryRegistry {
    fn struct_by_id(&self, id: &str) -> Option<&StructDescriptor> {
        self.structs.get(id)
    }

    fn transformer_by_id(&self, id: &str) -> Option<&TransformerDescriptor> {
        self.transformers.get(id)
    }
}
