pub mod tag;
pub mod tokenizer;
pub mod tree_builder;
pub mod validate;

use std::sync::Arc;

use tracing::debug;

pub use tokenizer::{Position, Span, Token, Tokenizer, tokenize};
pub use tree_builder::{Declaration, ParsedField, TreeBuilder};

use crate::ast::{FieldDescriptor, StructDescriptor};
use crate::error::{Diagnostic, ErrorKind};
use crate::ids::{IdGenerator, UuidIdGenerator};

pub(crate) const NO_STRUCT_FOUND: &str = "No struct definition found. Expected: type StructName struct { ... }";

/// Turns Go source text into struct descriptors
pub trait StructParser {
    /// Describe the first struct declaration in `source`
    fn parse_one(&self, source: &str) -> StructDescriptor;

    /// Describe every struct declaration in `source`, in order
    fn parse_many(&self, source: &str) -> Vec<StructDescriptor>;
}

/// Parser for Go `type X struct { ... }` declarations
#[derive(Clone)]
pub struct GoStructParser {
    ids: Arc<dyn IdGenerator>,
}

impl Default for GoStructParser {
    fn default() -> Self {
        Self::new()
    }
}

impl GoStructParser {
    pub fn new() -> Self {
        Self::with_id_generator(Arc::new(UuidIdGenerator))
    }

    pub fn with_id_generator(ids: Arc<dyn IdGenerator>) -> Self {
        Self { ids }
    }

    /// Like `parse_one`, keeping an existing id
    pub fn parse_with_id(&self, id: &str, source: &str) -> StructDescriptor {
        let mut builder = TreeBuilder::new(tokenize(source), source);
        let source_text = source.trim();

        let descriptor = match builder.build_first() {
            Some(declaration) => describe(id.to_string(), source_text.to_string(), declaration),
            None => {
                let error = Diagnostic::error(ErrorKind::MissingDeclaration, NO_STRUCT_FOUND, Span::default())
                    .with_help("Declare a struct: type User struct { ID int }");
                StructDescriptor::from_parts(id, "", Vec::new(), source_text, vec![error])
            }
        };

        debug!(
            id = %descriptor.id,
            name = %descriptor.name,
            fields = descriptor.fields.len(),
            valid = descriptor.is_valid,
            "parsed struct"
        );
        descriptor
    }
}

impl StructParser for GoStructParser {
    fn parse_one(&self, source: &str) -> StructDescriptor {
        self.parse_with_id(&self.ids.next_id("struct"), source)
    }

    fn parse_many(&self, source: &str) -> Vec<StructDescriptor> {
        let declarations = TreeBuilder::new(tokenize(source), source).build();
        debug!(count = declarations.len(), "found struct declarations");

        declarations
            .into_iter()
            .map(|declaration| {
                let text = &source[declaration.span.start.byte..declaration.span.end.byte];
                let source_text = if declaration.grouped { format!("type {}", text) } else { text.to_string() };
                describe(self.ids.next_id("struct"), source_text, declaration)
            })
            .collect()
    }
}

/// Validate a declaration and project it into a descriptor
fn describe(id: String, source_text: String, declaration: Declaration) -> StructDescriptor {
    let fields = declaration
        .fields
        .iter()
        .map(|field| {
            let descriptor = FieldDescriptor::new(&field.name, &field.ty);
            match &field.tag {
                Some(tag) => descriptor.with_tag(tag.as_str()),
                None => descriptor,
            }
        })
        .collect();

    let mut diagnostics = match &declaration.failure {
        Some(failure) => vec![failure.clone()],
        None => validate::validate(&declaration),
    };
    diagnostics.extend(declaration.notes.iter().cloned());

    StructDescriptor::from_parts(id, declaration.name, fields, source_text, diagnostics)
}

/// Parse the first struct in `source` with random ids
pub fn parse_struct(source: &str) -> StructDescriptor {
    GoStructParser::new().parse_one(source)
}

/// Parse every struct in `source` with random ids
pub fn parse_structs(source: &str) -> Vec<StructDescriptor> {
    GoStructParser::new().parse_many(source)
}
