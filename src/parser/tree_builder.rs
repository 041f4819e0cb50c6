use super::tokenizer::{Span, Token};
use crate::ast::NESTED_STRUCT_TYPE;
use crate::error::{Diagnostic, ErrorKind};

pub(crate) const INVALID_BODY: &str = "Invalid struct body. Expected: { field declarations }";

/// One field as written, before validation
#[derive(Debug, Clone)]
pub struct ParsedField {
    pub name: String,
    pub ty: String,
    pub tag: Option<String>,
    /// Span of the field name, or of the line start when there is no name
    pub span: Span,
}

/// One `type X struct { ... }` found in the token stream
#[derive(Debug, Clone)]
pub struct Declaration {
    pub name: String,
    pub name_span: Span,
    pub fields: Vec<ParsedField>,
    /// From `type` (or the member name inside a group) through the closing brace
    pub span: Span,
    /// Member of a `type ( ... )` group
    pub grouped: bool,
    /// Structural failure; fields read before it are kept
    pub failure: Option<Diagnostic>,
    /// Non-fatal findings made while reading fields
    pub notes: Vec<Diagnostic>,
}

/// Builds struct declarations from a token stream
pub struct TreeBuilder<'a> {
    tokens: Vec<Token>,
    pos: usize,
    source: &'a str,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(tokens: Vec<Token>, source: &'a str) -> Self {
        Self { tokens, pos: 0, source }
    }

    /// Every struct declaration, in source order
    pub fn build(&mut self) -> Vec<Declaration> {
        self.collect(usize::MAX)
    }

    /// The first struct declaration, if any
    pub fn build_first(&mut self) -> Option<Declaration> {
        self.collect(1).into_iter().next()
    }

    fn collect(&mut self, limit: usize) -> Vec<Declaration> {
        let mut declarations = Vec::new();

        while !self.is_at_end() && declarations.len() < limit {
            if !self.peek().is_word("type") {
                self.advance();
                continue;
            }

            let type_span = self.advance();
            self.skip_newlines();

            if self.peek().is_punct('(') {
                self.advance();
                self.parse_group(&mut declarations, limit);
            } else if let Some(declaration) = self.parse_type_spec(type_span, false) {
                declarations.push(declaration);
            }
        }

        declarations
    }

    /// Members of `type ( ... )`; non-struct members are skipped
    fn parse_group(&mut self, declarations: &mut Vec<Declaration>, limit: usize) {
        while !self.is_at_end() && declarations.len() < limit {
            self.skip_separators();

            match self.peek() {
                Token::Punct { ch: ')', .. } => {
                    self.advance();
                    return;
                }
                Token::Ident { span, .. } => {
                    let start = *span;
                    match self.parse_type_spec(start, true) {
                        Some(declaration) => declarations.push(declaration),
                        None => self.skip_line(')'),
                    }
                }
                Token::Eof { .. } => return,
                _ => {
                    self.advance();
                }
            }
        }
    }

    /// `Name struct { ... }` after `type`. Returns `None` (position restored)
    /// when the type spec is not a struct.
    fn parse_type_spec(&mut self, start: Span, grouped: bool) -> Option<Declaration> {
        let save = self.pos;

        let (name, name_span) = match self.peek() {
            Token::Ident { name, span } if name != "struct" => (name.clone(), *span),
            // `type struct {`: the name is missing, validation reports it
            Token::Ident { span, .. } => (String::new(), span.collapsed()),
            _ => return None,
        };
        if !name.is_empty() {
            self.advance();
        }

        if !self.peek().is_word("struct") {
            self.pos = save;
            return None;
        }
        let struct_span = self.advance();
        self.skip_newlines();

        let mut declaration = Declaration {
            name,
            name_span,
            fields: Vec::new(),
            span: start.to(struct_span),
            grouped,
            failure: None,
            notes: Vec::new(),
        };

        if !self.peek().is_punct('{') {
            declaration.failure = Some(
                Diagnostic::error(ErrorKind::MissingBody, INVALID_BODY, struct_span)
                    .with_help("Follow 'struct' with a field list, e.g. struct { Name string }"),
            );
            return Some(declaration);
        }
        let open = self.advance();

        let (fields, close) = self.parse_fields(&mut declaration.notes);
        declaration.fields = fields;

        match close {
            Some(close) => declaration.span = start.to(close),
            None => {
                let end = self.peek().span();
                declaration.span = start.to(end);
                declaration.failure = Some(
                    Diagnostic::error(ErrorKind::UnclosedBody, INVALID_BODY, end)
                        .with_related(open, "opened here")
                        .with_help("Close the field list with '}'"),
                );
            }
        }

        Some(declaration)
    }

    /// Field lines up to the closing brace. Returns the brace span, or `None`
    /// when input ends first.
    fn parse_fields(&mut self, notes: &mut Vec<Diagnostic>) -> (Vec<ParsedField>, Option<Span>) {
        let mut fields = Vec::new();

        loop {
            self.skip_separators();
            if self.is_at_end() {
                return (fields, None);
            }
            if self.peek().is_punct('}') {
                let close = self.advance();
                return (fields, Some(close));
            }
            self.parse_field_line(&mut fields, notes);
        }
    }

    fn parse_field_line(&mut self, fields: &mut Vec<ParsedField>, notes: &mut Vec<Diagnostic>) {
        let line_start = self.peek().span();

        match self.peek() {
            Token::Punct { ch: '*', .. } => self.parse_embedded_pointer(line_start, fields),
            Token::Ident { .. } => self.parse_named(fields, notes),
            _ => {
                // No leading identifier: keep the text so validation can report the missing name
                let ty = self.type_text();
                let tag = self.tag();
                fields.push(ParsedField { name: String::new(), ty, tag, span: line_start });
            }
        }

        self.finish_line(fields.last().map(|f| f.name.clone()).unwrap_or_default(), notes);
    }

    /// `*Type` or `*pkg.Type`, optionally tagged
    fn parse_embedded_pointer(&mut self, line_start: Span, fields: &mut Vec<ParsedField>) {
        self.advance();

        let (name, ty) = match self.qualified_ident() {
            Some((last, path)) => (last, format!("*{}", path)),
            None => (String::new(), format!("*{}", self.type_text())),
        };
        let tag = self.tag();
        fields.push(ParsedField { name, ty, tag, span: line_start });
    }

    fn parse_named(&mut self, fields: &mut Vec<ParsedField>, notes: &mut Vec<Diagnostic>) {
        // Embedded `Type` or `pkg.Type`: the type name doubles as the field name
        if self.line_ends_at(1) || self.peek_at(1).is_punct('.') {
            let span = self.peek().span();
            if let Some((name, path)) = self.qualified_ident() {
                let tag = self.tag();
                fields.push(ParsedField { name, ty: path, tag, span });
            }
            return;
        }

        let mut names = Vec::new();
        if let Token::Ident { name, span } = self.peek() {
            names.push((name.clone(), *span));
        }
        self.advance();
        while self.peek().is_punct(',') {
            self.advance();
            self.skip_newlines();
            match self.peek() {
                Token::Ident { name, span } => {
                    names.push((name.clone(), *span));
                    self.advance();
                }
                _ => break,
            }
        }

        // Nested inline struct: scanned with the same grammar, kept opaque
        let ty = if self.peek().is_word("struct") && self.peek_at(1).is_punct('{') {
            self.advance();
            let open = self.advance();
            let (_, close) = self.parse_fields(notes);
            if close.is_none() {
                let owner = names.first().map(|(name, _)| name.as_str()).unwrap_or_default();
                notes.push(
                    Diagnostic::error(
                        ErrorKind::UnclosedBody,
                        format!("Unclosed nested struct in field {}", owner),
                        open,
                    )
                    .with_help("Close the nested field list with '}'"),
                );
            }
            NESTED_STRUCT_TYPE.to_string()
        } else {
            self.type_text()
        };
        let tag = self.tag();

        for (name, span) in names {
            fields.push(ParsedField { name, ty: ty.clone(), tag: tag.clone(), span });
        }
    }

    /// Identifier with optional `.Selector` parts; returns (last segment, full path)
    fn qualified_ident(&mut self) -> Option<(String, String)> {
        let Token::Ident { name, .. } = self.peek() else {
            return None;
        };
        let mut last = name.clone();
        let mut path = name.clone();
        self.advance();

        while self.peek().is_punct('.') {
            let Token::Ident { name, .. } = self.peek_at(1) else {
                break;
            };
            last = name.clone();
            path.push('.');
            path.push_str(name);
            self.advance();
            self.advance();
        }

        Some((last, path))
    }

    /// Type tokens up to the tag or end of line, whitespace runs collapsed
    fn type_text(&mut self) -> String {
        let mut text = String::new();
        let mut depth = 0usize;
        let mut prev_end: Option<usize> = None;

        loop {
            let token = self.peek();
            let top = depth == 0;
            let stop = match token {
                Token::Eof { .. } => true,
                Token::Newline { .. } | Token::RawString { .. } | Token::String { .. } => top,
                Token::Punct { ch: ';' | '}', .. } => top,
                _ => false,
            };
            if stop {
                break;
            }

            match token {
                Token::Newline { .. } => {
                    self.advance();
                    continue;
                }
                Token::Punct { ch: '(' | '[' | '{', .. } => depth += 1,
                Token::Punct { ch: ')' | ']' | '}', .. } => depth = depth.saturating_sub(1),
                _ => {}
            }

            let span = token.span();
            if prev_end.is_some_and(|end| span.start.byte > end) {
                text.push(' ');
            }
            text.push_str(&self.source[span.start.byte..span.end.byte]);
            prev_end = Some(span.end.byte);
            self.advance();
        }

        text
    }

    fn tag(&mut self) -> Option<String> {
        let value = self.peek().string_value()?.to_string();
        self.advance();
        Some(value)
    }

    /// Report and skip anything left on a field line
    fn finish_line(&mut self, field: String, notes: &mut Vec<Diagnostic>) {
        if self.line_ends_at(0) {
            return;
        }
        let start = self.peek().span();
        self.skip_line('}');
        let subject = if field.is_empty() { "field declaration".to_string() } else { format!("field {}", field) };
        notes.push(
            Diagnostic::warning(ErrorKind::UnexpectedToken, format!("Unexpected text after {}", subject), start)
                .with_help("Each line declares one field: Name Type `tag`"),
        );
    }

    /// Skip to the end of the line, stopping before `closer` at depth 0
    fn skip_line(&mut self, closer: char) {
        let mut depth = 0usize;

        loop {
            match self.peek() {
                Token::Eof { .. } => return,
                Token::Newline { .. } if depth == 0 => {
                    self.advance();
                    return;
                }
                Token::Punct { ch: ';', .. } if depth == 0 => {
                    self.advance();
                    return;
                }
                Token::Punct { ch, .. } if *ch == closer && depth == 0 => return,
                Token::Punct { ch: '(' | '[' | '{', .. } => depth += 1,
                Token::Punct { ch: ')' | ']' | '}', .. } => depth = depth.saturating_sub(1),
                _ => {}
            }
            self.advance();
        }
    }

    /// True when the token at `offset` ends a field's name/type part
    fn line_ends_at(&self, offset: usize) -> bool {
        matches!(
            self.peek_at(offset),
            Token::Eof { .. }
                | Token::Newline { .. }
                | Token::RawString { .. }
                | Token::String { .. }
                | Token::Punct { ch: ';' | '}', .. }
        )
    }

    fn skip_newlines(&mut self) {
        while matches!(self.peek(), Token::Newline { .. }) {
            self.advance();
        }
    }

    fn skip_separators(&mut self) {
        while matches!(self.peek(), Token::Newline { .. } | Token::Punct { ch: ';', .. }) {
            self.advance();
        }
    }

    fn peek(&self) -> &Token {
        self.peek_at(0)
    }

    /// Token `offset` ahead; past the end this is the final Eof
    fn peek_at(&self, offset: usize) -> &Token {
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[(self.pos + offset).min(last)]
    }

    /// Consume the current token, returning its span
    fn advance(&mut self) -> Span {
        let span = self.peek().span();
        if !self.is_at_end() {
            self.pos += 1;
        }
        span
    }

    fn is_at_end(&self) -> bool {
        matches!(self.peek(), Token::Eof { .. })
    }
}
