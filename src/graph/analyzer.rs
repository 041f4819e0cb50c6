//! Source/target inference over a mapping graph.
//!
//! A struct node with outgoing edges and no incoming ones is a source
//! candidate; one with incoming edges and no outgoing ones is a target
//! candidate. The first candidate of each kind in node order is used, so at
//! most one mapping comes out of a graph.
//!
//! Every surviving edge contributes to exactly one field mapping. Edges that
//! pass through a transformer node are stitched: the i-th edge into the node
//! pairs with the i-th edge out of it, and the pair yields one mapping that
//! carries the node's transformer.

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use super::handle::{UNKNOWN_FIELD, field_key};
use super::{FieldMapping, GraphEdge, GraphNode, MappingGraph, MappingSpec, Registry};
use crate::transformer::TransformerDescriptor;

pub fn analyze(graph: &MappingGraph, registry: &dyn Registry) -> Vec<MappingSpec> {
    let nodes: HashMap<&str, &GraphNode> = graph.nodes.iter().map(|n| (n.id.as_str(), n)).collect();

    let edges: Vec<&GraphEdge> = graph
        .edges
        .iter()
        .filter(|edge| {
            let connected = nodes.contains_key(edge.source.as_str()) && nodes.contains_key(edge.target.as_str());
            if !connected {
                debug!(edge = %edge.id, "dropping dangling edge");
            }
            connected
        })
        .collect();

    let mut out_degree: HashMap<&str, usize> = HashMap::new();
    let mut in_degree: HashMap<&str, usize> = HashMap::new();
    for edge in &edges {
        if nodes[edge.source.as_str()].is_struct() {
            *out_degree.entry(edge.source.as_str()).or_default() += 1;
        }
        if nodes[edge.target.as_str()].is_struct() {
            *in_degree.entry(edge.target.as_str()).or_default() += 1;
        }
    }

    let source = graph
        .nodes
        .iter()
        .filter(|n| n.is_struct())
        .find(|n| degree(&out_degree, &n.id) > 0 && degree(&in_degree, &n.id) == 0);
    let target = graph
        .nodes
        .iter()
        .filter(|n| n.is_struct())
        .find(|n| degree(&in_degree, &n.id) > 0 && degree(&out_degree, &n.id) == 0);

    let (Some(source), Some(target)) = (source, target) else {
        debug!(
            source = source.is_some(),
            target = target.is_some(),
            "no source or target candidate"
        );
        return Vec::new();
    };

    let resolve = |node: &GraphNode| node.struct_ref().and_then(|id| registry.struct_by_id(id));
    let (Some(source_struct), Some(target_struct)) = (resolve(source), resolve(target)) else {
        warn!(
            source = %source.id,
            target = %target.id,
            "mapping endpoint does not reference a known struct"
        );
        return Vec::new();
    };

    let field_mappings = field_mappings(&edges, &nodes, registry);
    debug!(
        source = %source_struct.name,
        target = %target_struct.name,
        mappings = field_mappings.len(),
        "resolved mapping"
    );

    vec![MappingSpec {
        source_struct: Some(source_struct.clone()),
        target_struct: Some(target_struct.clone()),
        field_mappings,
    }]
}

fn field_mappings(
    edges: &[&GraphEdge],
    nodes: &HashMap<&str, &GraphNode>,
    registry: &dyn Registry,
) -> Vec<FieldMapping> {
    // Edge indexes into and out of each transformer node, in edge order
    let mut incoming: HashMap<&str, Vec<usize>> = HashMap::new();
    let mut outgoing: HashMap<&str, Vec<usize>> = HashMap::new();
    for (i, edge) in edges.iter().enumerate() {
        if nodes[edge.target.as_str()].is_transformer() {
            incoming.entry(edge.target.as_str()).or_default().push(i);
        }
        if nodes[edge.source.as_str()].is_transformer() {
            outgoing.entry(edge.source.as_str()).or_default().push(i);
        }
    }

    let mut consumed: HashSet<usize> = HashSet::new();
    let mut mappings = Vec::with_capacity(edges.len());

    for (i, edge) in edges.iter().enumerate() {
        if consumed.contains(&i) {
            continue;
        }

        let into = nodes[edge.target.as_str()];
        let out_of = nodes[edge.source.as_str()];

        let mapping = if into.is_transformer() {
            let next = partner(&incoming, &outgoing, &into.id, i).filter(|j| !consumed.contains(j));
            if let Some(j) = next {
                consumed.insert(j);
            }
            FieldMapping {
                source_field: field_key(edge.source_handle.as_deref()),
                target_field: next
                    .map(|j| field_key(edges[j].target_handle.as_deref()))
                    .unwrap_or_else(|| UNKNOWN_FIELD.to_string()),
                transformer: node_transformer(into, edge, registry),
            }
        } else if out_of.is_transformer() {
            let previous = partner(&outgoing, &incoming, &out_of.id, i).filter(|j| !consumed.contains(j));
            if let Some(j) = previous {
                consumed.insert(j);
            }
            FieldMapping {
                source_field: previous
                    .map(|j| field_key(edges[j].source_handle.as_deref()))
                    .unwrap_or_else(|| UNKNOWN_FIELD.to_string()),
                target_field: field_key(edge.target_handle.as_deref()),
                transformer: node_transformer(out_of, edge, registry),
            }
        } else {
            FieldMapping {
                source_field: field_key(edge.source_handle.as_deref()),
                target_field: field_key(edge.target_handle.as_deref()),
                transformer: edge_transformer(edge, registry),
            }
        };

        consumed.insert(i);
        mappings.push(mapping);
    }

    mappings
}

fn degree(map: &HashMap<&str, usize>, id: &str) -> usize {
    map.get(id).copied().unwrap_or(0)
}

/// Edge at the same position on the other side of a transformer node
fn partner(own: &HashMap<&str, Vec<usize>>, other: &HashMap<&str, Vec<usize>>, node: &str, i: usize) -> Option<usize> {
    let position = own.get(node)?.iter().position(|&j| j == i)?;
    other.get(node)?.get(position).copied()
}

/// The node's transformer, falling back to one attached to the edge
fn node_transformer(node: &GraphNode, edge: &GraphEdge, registry: &dyn Registry) -> Option<TransformerDescriptor> {
    let resolved = node.transformer_ref().and_then(|id| registry.transformer_by_id(id));
    if resolved.is_none() {
        warn!(node = %node.id, "transformer node does not reference a known transformer");
    }
    resolved.cloned().or_else(|| edge_transformer(edge, registry))
}

fn edge_transformer(edge: &GraphEdge, registry: &dyn Registry) -> Option<TransformerDescriptor> {
    let id = edge.transformer_id()?;
    let resolved = registry.transformer_by_id(id);
    if resolved.is_none() {
        warn!(edge = %edge.id, transformer = id, "edge references an unknown transformer");
    }
    resolved.cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::StructDescriptor;
    use crate::graph::{GraphEdge, GraphNode, MemoryRegistry};
    use crate::parser::GoStructParser;
    use crate::transformer::TransformerDescriptor;

    fn user_structs() -> Vec<StructDescriptor> {
        let parser = GoStructParser::new();
        vec![
            parser.parse_with_id("s_user", "type User struct {\n  ID int64\n  Name string\n  Age string\n}"),
            parser.parse_with_id("s_dto", "type UserDTO struct {\n  ID int64\n  FullName string\n  Age int\n}"),
        ]
    }

    fn registry() -> MemoryRegistry {
        let parse = TransformerDescriptor::new(
            "t_atoi",
            "String to Int",
            "string",
            "int",
            "func stringToInt(s string) (int, error) {\n\treturn strconv.Atoi(s)\n}",
        );
        MemoryRegistry::new(user_structs(), vec![parse])
    }

    fn struct_nodes() -> Vec<GraphNode> {
        vec![GraphNode::for_struct("n_user", "s_user", "User"), GraphNode::for_struct("n_dto", "s_dto", "UserDTO")]
    }

    #[test]
    fn test_direct_edges() {
        let graph = MappingGraph {
            nodes: struct_nodes(),
            edges: vec![
                GraphEdge::new("e1", "n_user", "n_dto").from_field("ID").to_field("ID"),
                GraphEdge::new("e2", "n_user", "n_dto").from_field("Name").to_field("FullName"),
            ],
        };

        let specs = analyze(&graph, &registry());
        assert_eq!(specs.len(), 1);
        let spec = &specs[0];
        assert_eq!(spec.source_struct.as_ref().map(|s| s.name.as_str()), Some("User"));
        assert_eq!(spec.target_struct.as_ref().map(|s| s.name.as_str()), Some("UserDTO"));
        assert_eq!(
            spec.field_mappings,
            vec![FieldMapping::direct("ID", "ID"), FieldMapping::direct("Name", "FullName")]
        );
    }

    #[test]
    fn test_no_edges_means_no_mapping() {
        let graph = MappingGraph { nodes: struct_nodes(), edges: Vec::new() };
        assert!(analyze(&graph, &registry()).is_empty());
    }

    #[test]
    fn test_cycle_has_no_source() {
        let graph = MappingGraph {
            nodes: struct_nodes(),
            edges: vec![
                GraphEdge::new("e1", "n_user", "n_dto").from_field("ID").to_field("ID"),
                GraphEdge::new("e2", "n_dto", "n_user").from_field("ID").to_field("ID"),
            ],
        };
        assert!(analyze(&graph, &registry()).is_empty());
    }

    #[test]
    fn test_dangling_edges_dropped() {
        let graph = MappingGraph {
            nodes: struct_nodes(),
            edges: vec![
                GraphEdge::new("e1", "n_user", "n_dto").from_field("ID").to_field("ID"),
                GraphEdge::new("e2", "n_user", "n_gone").from_field("Name").to_field("Name"),
            ],
        };
        let specs = analyze(&graph, &registry());
        assert_eq!(specs[0].field_mappings.len(), 1);
    }

    #[test]
    fn test_unknown_handles_keep_entry() {
        let graph = MappingGraph {
            nodes: struct_nodes(),
            edges: vec![GraphEdge::new("e1", "n_user", "n_dto")],
        };
        let specs = analyze(&graph, &registry());
        assert_eq!(specs[0].field_mappings, vec![FieldMapping::direct(UNKNOWN_FIELD, UNKNOWN_FIELD)]);
    }

    #[test]
    fn test_unresolved_struct_reference() {
        let graph = MappingGraph {
            nodes: vec![GraphNode::for_struct("n_user", "s_user", "User"), GraphNode::for_struct("n_x", "s_missing", "X")],
            edges: vec![GraphEdge::new("e1", "n_user", "n_x").from_field("ID").to_field("ID")],
        };
        assert!(analyze(&graph, &registry()).is_empty());
    }

    #[test]
    fn test_edge_transformer_attached() {
        let graph = MappingGraph {
            nodes: struct_nodes(),
            edges: vec![GraphEdge::new("e1", "n_user", "n_dto").from_field("Age").to_field("Age").with_transformer("t_atoi")],
        };
        let specs = analyze(&graph, &registry());
        let mapping = &specs[0].field_mappings[0];
        assert_eq!(mapping.transformer.as_ref().map(|t| t.id.as_str()), Some("t_atoi"));
    }

    #[test]
    fn test_transformer_node_is_stitched() {
        let mut nodes = struct_nodes();
        nodes.push(GraphNode::for_transformer("n_atoi", "t_atoi", "String to Int"));
        let graph = MappingGraph {
            nodes,
            edges: vec![
                GraphEdge::new("e1", "n_user", "n_dto").from_field("ID").to_field("ID"),
                GraphEdge::new("e2", "n_atoi", "n_dto").from_transformer().to_field("Age"),
                GraphEdge::new("e3", "n_user", "n_atoi").from_field("Age").into_transformer(),
            ],
        };

        let specs = analyze(&graph, &registry());
        assert_eq!(specs.len(), 1);
        let mappings = &specs[0].field_mappings;
        assert_eq!(mappings.len(), 2);
        assert_eq!(mappings[1].source_field, "Age");
        assert_eq!(mappings[1].target_field, "Age");
        assert_eq!(mappings[1].transformer.as_ref().map(|t| t.id.as_str()), Some("t_atoi"));
    }

    #[test]
    fn test_unpaired_transformer_edge() {
        let mut nodes = struct_nodes();
        nodes.push(GraphNode::for_transformer("n_atoi", "t_atoi", "String to Int"));
        let graph = MappingGraph {
            nodes,
            edges: vec![
                GraphEdge::new("e1", "n_user", "n_dto").from_field("ID").to_field("ID"),
                GraphEdge::new("e2", "n_user", "n_atoi").from_field("Age").into_transformer(),
            ],
        };

        let mappings = &analyze(&graph, &registry())[0].field_mappings;
        assert_eq!(mappings.len(), 2);
        assert_eq!(mappings[1].source_field, "Age");
        assert_eq!(mappings[1].target_field, UNKNOWN_FIELD);
    }

    #[test]
    fn test_first_candidates_in_node_order() {
        let parser = GoStructParser::new();
        let mut structs = user_structs();
        structs.push(parser.parse_with_id("s_other", "type Other struct { ID int64 }"));
        let registry = MemoryRegistry::new(structs, Vec::new());

        let mut nodes = vec![GraphNode::for_struct("n_other", "s_other", "Other")];
        nodes.extend(struct_nodes());
        let graph = MappingGraph {
            nodes,
            edges: vec![
                GraphEdge::new("e1", "n_user", "n_dto").from_field("ID").to_field("ID"),
                GraphEdge::new("e2", "n_other", "n_dto").from_field("ID").to_field("ID"),
            ],
        };

        let specs = analyze(&graph, &registry);
        assert_eq!(specs[0].source_struct.as_ref().map(|s| s.name.as_str()), Some("Other"));
        assert_eq!(specs[0].field_mappings.len(), 2);
    }
}
