//! End-to-end behavior of the parse, analyze and generate stages.

use std::sync::Arc;
use struct_mapper::graph::handle::{source_handle, target_handle};
use struct_mapper::{
    BuiltinCatalog, FieldMapping, FlowConfig, GenerateOptions, GoStructParser, GraphEdge, GraphNode, MappingGraph,
    MappingSpec, MemoryRegistry, Pipeline, SequentialIdGenerator, StructParser, TransformerCatalog, analyze,
    export_config, generate, import_config, parse_struct, parse_structs,
};

#[test]
fn test_field_extraction() {
    let user = parse_struct("type User struct { ID int64 `json:\"id\"`; Name string `json:\"name\"` }");

    assert!(user.is_valid, "errors: {:?}", user.errors);
    assert_eq!(user.name, "User");
    let fields: Vec<(&str, &str, Option<&str>)> = user
        .fields
        .iter()
        .map(|f| (f.name.as_str(), f.ty.as_str(), f.tag_value.as_deref()))
        .collect();
    assert_eq!(fields, vec![("ID", "int64", Some("id")), ("Name", "string", Some("name"))]);
}

#[test]
fn test_duplicate_field_detection() {
    let broken = parse_struct("type Broken struct {\n  X int\n  X string\n}");
    assert!(!broken.is_valid);
    assert!(broken.errors.iter().any(|e| e.contains("X")));
}

#[test]
fn test_parse_many_in_source_order() {
    let source = "package models\n\ntype Second struct {\n  A int\n}\n\nfunc helper() {}\n\ntype First struct {\n  B string\n}\n";
    let structs = parse_structs(source);
    let names: Vec<&str> = structs.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Second", "First"]);
}

#[test]
fn test_derived_flags() {
    let profile = parse_struct("type Account struct {\n  Tags []string\n  Owner *Profile\n  Scores map[string]int\n}");

    let tags = profile.field("Tags").unwrap();
    assert!(tags.is_slice && !tags.is_pointer && !tags.is_map);
    assert!(profile.field("Owner").unwrap().is_pointer);
    assert!(profile.field("Scores").unwrap().is_map);
}

#[test]
fn test_auto_match_fallback() {
    let spec = MappingSpec::new(
        parse_struct("type S struct {\n  A int\n  B int\n}"),
        parse_struct("type T struct {\n  A int\n  C int\n}"),
    );
    let unit = generate(&spec, &[], &GenerateOptions::default());

    let assignments: Vec<&str> = unit.body_text.lines().filter(|l| l.contains(" = ")).collect();
    assert_eq!(assignments, vec!["    target.A = src.A"]);
}

#[test]
fn test_generation_is_deterministic() {
    let atoi = BuiltinCatalog
        .find("string_to_int")
        .unwrap()
        .instantiate(&SequentialIdGenerator::new());
    let spec = MappingSpec::new(
        parse_struct("type In struct {\n  Count string\n}"),
        parse_struct("type Out struct {\n  Count int\n}"),
    )
    .with_mapping(FieldMapping::direct("Count", "Count").with_transformer(atoi.clone()));

    let first = generate(&spec, &[atoi.clone()], &GenerateOptions::default());
    let second = generate(&spec, &[atoi], &GenerateOptions::default());
    assert_eq!(first.body_text, second.body_text);
    assert_eq!(first.imports, second.imports);
    assert!(first.body_text.contains("target.Count = stringToInt(src.Count)"));
}

#[test]
fn test_no_mapping_is_reported_not_thrown() {
    let parser = GoStructParser::with_id_generator(Arc::new(SequentialIdGenerator::new()));
    let a = parser.parse_one("type A struct { X int }");
    let b = parser.parse_one("type B struct { X int }");
    let graph = MappingGraph {
        nodes: vec![
            GraphNode::for_struct("n1", a.id.clone(), "A"),
            GraphNode::for_struct("n2", b.id.clone(), "B"),
        ],
        edges: Vec::new(),
    };
    let registry = MemoryRegistry::new([a, b], []);

    assert!(analyze(&graph, &registry).is_empty());

    let config = FlowConfig {
        graph,
        ..FlowConfig::new("flow", "Empty")
    };
    let result = Pipeline::standard().compile(&config);
    assert!(!result.is_ok());
    assert!(result.unit.errors[0].starts_with("No mapping found"));
}

#[test]
fn test_project_round_trip_compiles() {
    let parser = GoStructParser::with_id_generator(Arc::new(SequentialIdGenerator::new()));
    let user = parser.parse_one("type User struct {\n  Email string\n}");
    let contact = parser.parse_one("type Contact struct {\n  Address string\n}");

    let config = FlowConfig::new("flow_1", "Contacts")
        .with_node(GraphNode::for_struct("n1", user.id.clone(), "User"))
        .with_node(GraphNode::for_struct("n2", contact.id.clone(), "Contact"))
        .with_struct(user)
        .with_struct(contact)
        .with_edge(
            GraphEdge::new("e1", "n1", "n2")
                .from_field("Email")
                .to_field("Address"),
        );

    let json = export_config(&config).unwrap();
    assert!(json.contains(&source_handle("Email")));
    assert!(json.contains(&target_handle("Address")));

    let restored = import_config(&json).unwrap();
    let result = Pipeline::standard().compile(&restored);
    let file = result.file.unwrap();
    assert!(file.contains("func MapUserToContact(src User) Contact {"));
    assert!(file.contains("    target.Address = src.Email\n"));
}
