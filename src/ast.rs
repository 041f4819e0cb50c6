use serde::{Deserialize, Serialize};

use crate::error::Diagnostic;
use crate::parser::tag;

// Re-export Position and Span from tokenizer so descriptors and diagnostics share one Span type
pub use crate::parser::tokenizer::{Position, Span};

/// Type text given to a nested inline struct field
pub const NESTED_STRUCT_TYPE: &str = "struct {...}";

/// One member of a struct declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    pub name: String,
    /// Raw type expression, e.g. `*Profile`, `[]string`, `map[string]int`, `time.Time`
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub is_pointer: bool,
    #[serde(default)]
    pub is_slice: bool,
    #[serde(default)]
    pub is_map: bool,
    /// Name part of the `json` tag key, if present
    #[serde(default, alias = "jsonTag", skip_serializing_if = "Option::is_none")]
    pub tag_value: Option<String>,
    /// Full annotation text, without the enclosing quotes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

impl FieldDescriptor {
    /// Build a field; pointer/slice/map flags are projections of the type text
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        let ty = ty.into();
        Self {
            name: name.into(),
            is_pointer: ty.starts_with('*'),
            is_slice: ty.starts_with("[]"),
            is_map: ty.starts_with("map["),
            ty,
            tag_value: None,
            tag: None,
        }
    }

    /// Attach a struct tag, extracting the `json` key's name
    pub fn with_tag(mut self, raw: impl Into<String>) -> Self {
        let raw = raw.into();
        self.tag_value = tag::json_name(&raw);
        self.tag = Some(raw);
        self
    }

    /// Inline `struct {...}` typed field
    pub fn is_nested_struct(&self) -> bool {
        self.ty.starts_with("struct {") || self.ty.starts_with("struct{")
    }
}

/// Validated representation of one `type X struct { ... }` declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructDescriptor {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,
    /// Original declaration text, verbatim
    #[serde(default, alias = "rawCode")]
    pub source_text: String,
    #[serde(default)]
    pub is_valid: bool,
    #[serde(default)]
    pub errors: Vec<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
    /// Positioned findings behind `errors` and `warnings`
    #[serde(skip)]
    pub diagnostics: Vec<Diagnostic>,
}

impl StructDescriptor {
    /// Assemble a descriptor from parse results; validity follows the error diagnostics
    pub fn from_parts(
        id: impl Into<String>,
        name: impl Into<String>,
        fields: Vec<FieldDescriptor>,
        source_text: impl Into<String>,
        diagnostics: Vec<Diagnostic>,
    ) -> Self {
        let errors: Vec<String> = diagnostics
            .iter()
            .filter(|d| d.is_error())
            .map(|d| d.message.clone())
            .collect();
        let warnings = diagnostics
            .iter()
            .filter(|d| !d.is_error())
            .map(|d| d.message.clone())
            .collect();

        Self {
            id: id.into(),
            name: name.into(),
            fields,
            source_text: source_text.into(),
            is_valid: errors.is_empty(),
            errors,
            warnings,
            diagnostics,
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }
}

/// Go identifier check: a letter or underscore, then letters, digits, underscores
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_alphabetic() => chars.all(|c| c == '_' || c.is_alphanumeric()),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_follow_type_prefix() {
        let slice = FieldDescriptor::new("Tags", "[]string");
        assert!(slice.is_slice && !slice.is_pointer && !slice.is_map);

        let pointer = FieldDescriptor::new("Profile", "*Profile");
        assert!(pointer.is_pointer && !pointer.is_slice);

        let map = FieldDescriptor::new("Scores", "map[string]int");
        assert!(map.is_map && !map.is_slice);

        let array = FieldDescriptor::new("Digest", "[32]byte");
        assert!(!array.is_slice && !array.is_map && !array.is_pointer);
    }

    #[test]
    fn test_with_tag_extracts_json_name() {
        let field = FieldDescriptor::new("ID", "int64").with_tag(r#"json:"id,omitempty" db:"user_id""#);
        assert_eq!(field.tag_value.as_deref(), Some("id"));
        assert_eq!(field.tag.as_deref(), Some(r#"json:"id,omitempty" db:"user_id""#));
    }

    #[test]
    fn test_nested_struct_detection() {
        assert!(FieldDescriptor::new("Meta", NESTED_STRUCT_TYPE).is_nested_struct());
        assert!(FieldDescriptor::new("Meta", "struct{ A int }").is_nested_struct());
        assert!(!FieldDescriptor::new("Payload", "structpb.Struct").is_nested_struct());
        assert!(!FieldDescriptor::new("Shape", "structure").is_nested_struct());
    }

    #[test]
    fn test_is_identifier() {
        assert!(is_identifier("userID"));
        assert!(is_identifier("_x1"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("1abc"));
        assert!(!is_identifier("String to Int"));
        assert!(!is_identifier("time.Time"));
    }

    #[test]
    fn test_validity_follows_error_diagnostics() {
        use crate::error::{Diagnostic, ErrorKind};

        let warning = Diagnostic::warning(ErrorKind::EmptyStruct, "Struct has no fields", Span::default());
        let descriptor = StructDescriptor::from_parts("s1", "Empty", Vec::new(), "type Empty struct {}", vec![warning]);
        assert!(descriptor.is_valid);
        assert_eq!(descriptor.warnings, vec!["Struct has no fields".to_string()]);
        assert!(descriptor.errors.is_empty());
    }

    #[test]
    fn test_deserialize_minimal_descriptor() {
        let descriptor: StructDescriptor =
            serde_json::from_str(r#"{"id":"s1","sourceText":"type A struct { X int }"}"#).unwrap();
        assert_eq!(descriptor.id, "s1");
        assert!(descriptor.fields.is_empty());
        assert!(!descriptor.is_valid);
    }
}
