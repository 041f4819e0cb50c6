//! Validation of parsed declarations.
//!
//! Errors make a struct invalid; warnings never do.

use std::collections::HashMap;

use super::tree_builder::Declaration;
use crate::ast::is_identifier;
use crate::error::{Diagnostic, ErrorKind};
use crate::parser::tokenizer::Span;

pub fn validate(declaration: &Declaration) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    if declaration.name.is_empty() {
        diagnostics.push(
            Diagnostic::error(ErrorKind::MissingStructName, "Struct name is required", declaration.name_span)
                .with_help("Name the type: type User struct { ... }"),
        );
    } else if !declaration.name.starts_with(char::is_uppercase) {
        diagnostics.push(Diagnostic::warning(
            ErrorKind::UnexportedStructName,
            "Struct name should start with uppercase letter for export",
            declaration.name_span,
        ));
    }

    if declaration.fields.is_empty() {
        diagnostics.push(Diagnostic::warning(ErrorKind::EmptyStruct, "Struct has no fields", declaration.name_span));
    }

    let mut seen: HashMap<&str, Span> = HashMap::new();
    for field in &declaration.fields {
        if field.name.is_empty() {
            diagnostics.push(Diagnostic::error(ErrorKind::MissingFieldName, "Field name is required", field.span));
        } else if !is_identifier(&field.name) {
            diagnostics.push(Diagnostic::error(
                ErrorKind::InvalidFieldName,
                format!("Invalid field name: {}", field.name),
                field.span,
            ));
        } else if let Some(first) = seen.get(field.name.as_str()) {
            diagnostics.push(
                Diagnostic::error(ErrorKind::DuplicateField, format!("Duplicate field name: {}", field.name), field.span)
                    .with_related(*first, "first declared here")
                    .with_help("Field names must be unique within a struct"),
            );
        } else {
            seen.insert(&field.name, field.span);
        }

        if field.ty.is_empty() {
            let subject = if field.name.is_empty() { "<unnamed>" } else { field.name.as_str() };
            diagnostics.push(Diagnostic::error(
                ErrorKind::MissingFieldType,
                format!("Field {} is missing type", subject),
                field.span,
            ));
        }
    }

    diagnostics
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::tokenize;
    use crate::parser::tree_builder::TreeBuilder;

    fn check(source: &str) -> Vec<Diagnostic> {
        let declarations = TreeBuilder::new(tokenize(source), source).build();
        validate(&declarations[0])
    }

    fn messages(diagnostics: &[Diagnostic]) -> Vec<&str> {
        diagnostics.iter().map(|d| d.message.as_str()).collect()
    }

    #[test]
    fn test_clean_struct() {
        assert!(check("type User struct {\n  ID int\n  Name string\n}").is_empty());
    }

    #[test]
    fn test_duplicate_field() {
        let diagnostics = check("type User struct {\n  ID int\n  ID string\n}");
        assert_eq!(messages(&diagnostics), vec!["Duplicate field name: ID"]);
        assert!(diagnostics[0].is_error());
        assert_eq!(diagnostics[0].related_span.map(|s| s.start.line), Some(1));
    }

    #[test]
    fn test_lowercase_name_warns() {
        let diagnostics = check("type user struct { ID int }");
        assert_eq!(messages(&diagnostics), vec!["Struct name should start with uppercase letter for export"]);
        assert!(!diagnostics[0].is_error());
    }

    #[test]
    fn test_empty_struct_warns() {
        let diagnostics = check("type Empty struct {}");
        assert_eq!(messages(&diagnostics), vec!["Struct has no fields"]);
        assert!(!diagnostics[0].is_error());
    }

    #[test]
    fn test_missing_field_name() {
        let diagnostics = check("type A struct {\n  []string\n}");
        assert_eq!(messages(&diagnostics), vec!["Field name is required"]);
    }

    #[test]
    fn test_missing_struct_name() {
        let diagnostics = check("type struct { X int }");
        assert_eq!(diagnostics[0].kind, ErrorKind::MissingStructName);
    }
}
