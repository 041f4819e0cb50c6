//! User-defined conversion functions attached to mappings.

use serde::{Deserialize, Serialize};
use tracing::warn;
use tree_sitter::Parser;

use crate::ast::is_identifier;

/// A named Go function converting a source field value into a target field value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformerDescriptor {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub input_type: String,
    #[serde(default)]
    pub output_type: String,
    /// Go source of the function
    #[serde(rename = "code", alias = "bodyText", default)]
    pub body_text: String,
    #[serde(default)]
    pub is_valid: bool,
}

impl TransformerDescriptor {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        input_type: impl Into<String>,
        output_type: impl Into<String>,
        body_text: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            input_type: input_type.into(),
            output_type: output_type.into(),
            body_text: body_text.into(),
            is_valid: false,
        }
        .with_checked_validity()
    }

    /// Replace name and body, keeping identity; validity is recomputed
    pub fn edit(&self, name: impl Into<String>, body_text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            body_text: body_text.into(),
            ..self.clone()
        }
        .with_checked_validity()
    }

    /// Recompute `is_valid` from the name and body
    pub fn with_checked_validity(mut self) -> Self {
        self.is_valid = !self.name.trim().is_empty() && check_go_syntax(&self.body_text);
        self
    }

    /// Name declared by a leading `func <name>`; `None` for methods and anything else
    pub fn declared_function(&self) -> Option<&str> {
        let rest = self.body_text.trim_start().strip_prefix("func")?;
        if !rest.starts_with(char::is_whitespace) {
            return None;
        }
        let rest = rest.trim_start();
        let end = rest.find(|c: char| !(c == '_' || c.is_alphanumeric())).unwrap_or(rest.len());
        let name = &rest[..end];
        is_identifier(name).then_some(name)
    }

    /// Identifier used to call this transformer from generated code.
    ///
    /// Prefers the name when it is already an identifier, then the function
    /// the body declares, then the name with non-identifier characters removed.
    pub fn call_name(&self) -> String {
        if is_identifier(&self.name) {
            return self.name.clone();
        }
        if let Some(declared) = self.declared_function() {
            return declared.to_string();
        }
        let sanitized: String = self.name.chars().filter(|c| *c == '_' || c.is_alphanumeric()).collect();
        if is_identifier(&sanitized) {
            sanitized
        } else {
            format!("_{}", sanitized)
        }
    }
}

/// True when `body` parses as Go source without syntax errors
pub fn check_go_syntax(body: &str) -> bool {
    if body.trim().is_empty() {
        return false;
    }

    let mut parser = Parser::new();
    if let Err(err) = parser.set_language(&tree_sitter_go::LANGUAGE.into()) {
        warn!(?err, "failed to load Go grammar");
        return false;
    }

    match parser.parse(body, None) {
        Some(tree) => !tree.root_node().has_error(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STRING_TO_INT: &str = "func stringToInt(s string) (int, error) {\n\treturn strconv.Atoi(s)\n}";

    #[test]
    fn test_valid_function() {
        let t = TransformerDescriptor::new("t1", "String to Int", "string", "int", STRING_TO_INT);
        assert!(t.is_valid);
    }

    #[test]
    fn test_syntax_error_is_invalid() {
        let t = TransformerDescriptor::new("t1", "Broken", "string", "int", "func broken(s string {");
        assert!(!t.is_valid);
    }

    #[test]
    fn test_empty_name_is_invalid() {
        let t = TransformerDescriptor::new("t1", "  ", "string", "int", STRING_TO_INT);
        assert!(!t.is_valid);
    }

    #[test]
    fn test_edit_keeps_identity_and_revalidates() {
        let t = TransformerDescriptor::new("t1", "Broken", "string", "int", "func (");
        let fixed = t.edit("Parse", STRING_TO_INT);
        assert_eq!(fixed.id, "t1");
        assert_eq!(fixed.input_type, "string");
        assert!(fixed.is_valid);
        assert!(!t.is_valid);
    }

    #[test]
    fn test_generic_function_parses() {
        let body = "func nilCheck[T any](ptr *T, defaultValue T) T {\n\tif ptr != nil {\n\t\treturn *ptr\n\t}\n\treturn defaultValue\n}";
        assert!(check_go_syntax(body));
    }

    #[test]
    fn test_declared_function() {
        let t = TransformerDescriptor::new("t1", "String to Int", "string", "int", STRING_TO_INT);
        assert_eq!(t.declared_function(), Some("stringToInt"));

        let method = TransformerDescriptor::new("t2", "m", "", "", "func (u User) Name() string { return u.name }");
        assert_eq!(method.declared_function(), None);
    }

    #[test]
    fn test_call_name() {
        let named = TransformerDescriptor::new("t1", "toUpper", "string", "string", "func x() {}");
        assert_eq!(named.call_name(), "toUpper");

        let display = TransformerDescriptor::new("t2", "String to Int", "string", "int", STRING_TO_INT);
        assert_eq!(display.call_name(), "stringToInt");

        let bare = TransformerDescriptor::new("t3", "To Cents", "float64", "int64", "return 0");
        assert_eq!(bare.call_name(), "ToCents");
    }

    #[test]
    fn test_json_uses_code_key() {
        let t = TransformerDescriptor::new("t1", "Parse", "string", "int", STRING_TO_INT);
        let json = serde_json::to_value(&t).unwrap();
        assert_eq!(json["code"], STRING_TO_INT);
        assert_eq!(json["inputType"], "string");
    }
}
