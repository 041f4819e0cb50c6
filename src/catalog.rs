//! Built-in transformer templates.

use serde::Serialize;

use crate::ids::IdGenerator;
use crate::transformer::TransformerDescriptor;

/// A ready-made transformer users can add to a project
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformerTemplate {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub input_type: &'static str,
    pub output_type: &'static str,
    pub code: &'static str,
}

impl TransformerTemplate {
    /// Create a transformer from this template with a fresh id
    pub fn instantiate(&self, ids: &dyn IdGenerator) -> TransformerDescriptor {
        TransformerDescriptor::new(ids.next_id("transformer"), self.name, self.input_type, self.output_type, self.code)
    }
}

/// Source of transformer templates
pub trait TransformerCatalog {
    fn templates(&self) -> &[TransformerTemplate];

    fn find(&self, id: &str) -> Option<&TransformerTemplate> {
        self.templates().iter().find(|t| t.id == id)
    }
}

/// The fixed template list shipped with the crate
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinCatalog;

impl TransformerCatalog for BuiltinCatalog {
    fn templates(&self) -> &[TransformerTemplate] {
        BUILTIN_TEMPLATES
    }
}

static BUILTIN_TEMPLATES: &[TransformerTemplate] = &[
    TransformerTemplate {
        id: "string_to_int",
        name: "String to Int",
        description: "Convert string to integer with error handling",
        input_type: "string",
        output_type: "int",
        code: "func stringToInt(s string) (int, error) {
\treturn strconv.Atoi(s)
}",
    },
    TransformerTemplate {
        id: "timestamp_to_time",
        name: "Timestamp to Time",
        description: "Convert Unix timestamp to time.Time",
        input_type: "int64",
        output_type: "time.Time",
        code: "func timestampToTime(ts int64) time.Time {
\treturn time.Unix(ts, 0)
}",
    },
    TransformerTemplate {
        id: "slice_filter",
        name: "Filter Slice",
        description: "Filter slice based on condition",
        input_type: "[]T",
        output_type: "[]T",
        code: "func filterSlice[T any](slice []T, predicate func(T) bool) []T {
\tresult := make([]T, 0, len(slice))
\tfor _, item := range slice {
\t\tif predicate(item) {
\t\t\tresult = append(result, item)
\t\t}
\t}
\treturn result
}",
    },
    TransformerTemplate {
        id: "map_transform",
        name: "Map Transform",
        description: "Transform slice elements",
        input_type: "[]T",
        output_type: "[]U",
        code: "func mapTransform[T, U any](slice []T, transform func(T) U) []U {
\tresult := make([]U, len(slice))
\tfor i, item := range slice {
\t\tresult[i] = transform(item)
\t}
\treturn result
}",
    },
    TransformerTemplate {
        id: "nil_check",
        name: "Nil Check",
        description: "Safe nil check with default value",
        input_type: "*T",
        output_type: "T",
        code: "func nilCheck[T any](ptr *T, defaultValue T) T {
\tif ptr != nil {
\t\treturn *ptr
\t}
\treturn defaultValue
}",
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::SequentialIdGenerator;

    #[test]
    fn test_builtin_ids() {
        let ids: Vec<&str> = BuiltinCatalog.templates().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec!["string_to_int", "timestamp_to_time", "slice_filter", "map_transform", "nil_check"]);
    }

    #[test]
    fn test_builtin_code_is_valid_go() {
        for template in BuiltinCatalog.templates() {
            assert!(crate::transformer::check_go_syntax(template.code), "{} does not parse", template.id);
        }
    }

    #[test]
    fn test_find() {
        assert_eq!(BuiltinCatalog.find("nil_check").map(|t| t.name), Some("Nil Check"));
        assert!(BuiltinCatalog.find("missing").is_none());
    }

    #[test]
    fn test_instantiate() {
        let ids = SequentialIdGenerator::new();
        let template = BuiltinCatalog.find("timestamp_to_time").unwrap();
        let transformer = template.instantiate(&ids);
        assert_eq!(transformer.id, "transformer_1");
        assert_eq!(transformer.name, "Timestamp to Time");
        assert_eq!(transformer.output_type, "time.Time");
        assert!(transformer.is_valid);
        assert_eq!(transformer.call_name(), "timestampToTime");
    }
}
