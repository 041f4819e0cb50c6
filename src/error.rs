use crate::parser::tokenizer::Span;
use std::fmt;

/// Kind of struct diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MissingDeclaration,
    MissingBody,
    UnclosedBody,
    MissingStructName,
    UnexportedStructName,
    EmptyStruct,
    DuplicateField,
    MissingFieldName,
    InvalidFieldName,
    MissingFieldType,
    UnexpectedToken,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::MissingDeclaration => "Missing declaration",
            ErrorKind::MissingBody => "Missing body",
            ErrorKind::UnclosedBody => "Unclosed body",
            ErrorKind::MissingStructName => "Missing struct name",
            ErrorKind::UnexportedStructName => "Unexported struct name",
            ErrorKind::EmptyStruct => "Empty struct",
            ErrorKind::DuplicateField => "Duplicate field",
            ErrorKind::MissingFieldName => "Missing field name",
            ErrorKind::InvalidFieldName => "Invalid field name",
            ErrorKind::MissingFieldType => "Missing field type",
            ErrorKind::UnexpectedToken => "Unexpected token",
        }
    }
}

/// Whether a diagnostic invalidates the struct
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        }
    }
}

/// A finding about one struct declaration, positioned in the parsed text
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub kind: ErrorKind,
    pub severity: Severity,
    pub message: String,
    pub span: Span,
    pub related_span: Option<Span>,
    pub related_label: Option<String>,
    pub help: Option<String>,
}

impl Diagnostic {
    /// Create a new error diagnostic
    pub fn error(kind: ErrorKind, message: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            severity: Severity::Error,
            message: message.into(),
            span,
            related_span: None,
            related_label: None,
            help: None,
        }
    }

    /// Create a new warning diagnostic
    pub fn warning(kind: ErrorKind, message: impl Into<String>, span: Span) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(kind, message, span)
        }
    }

    /// Add a related span (e.g., "first declared here")
    pub fn with_related(mut self, span: Span, label: impl Into<String>) -> Self {
        self.related_span = Some(span);
        self.related_label = Some(label.into());
        self
    }

    /// Add help text
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Render the diagnostic with source context
    pub fn render(&self, source: &str, filename: &str) -> String {
        self.render_inner(source, filename, false)
    }

    /// Render the diagnostic with ANSI color codes
    pub fn render_color(&self, source: &str, filename: &str) -> String {
        self.render_inner(source, filename, true)
    }

    fn render_inner(&self, source: &str, filename: &str, color: bool) -> String {
        let accent = match (color, self.severity) {
            (false, _) => "",
            (true, Severity::Error) => "\x1b[1;31m",
            (true, Severity::Warning) => "\x1b[1;33m",
        };
        let dim = if color { "\x1b[2m" } else { "" };
        let cyan = if color { "\x1b[1;38;5;73m" } else { "" };
        let reset = if color { "\x1b[0m" } else { "" };

        let mut output = String::new();
        output.push('\n');

        let line = self.span.start.line + 1;
        let col = self.span.start.col + 1;
        output.push_str(&format!(" {}file:{} {}:{}:{}\n", dim, reset, filename, line, col));
        output.push_str(&format!("{}{}:{} {}\n", accent, self.severity.label(), reset, self.message));

        if let Some(source_line) = source.lines().nth(self.span.start.line) {
            let width = format!("{}", line).len().max(2);
            output.push_str(&format!("{}{:>width$} |{}\n", dim, "", reset, width = width));
            output.push_str(&format!("{}{:>width$} |{} {}\n", dim, line, reset, source_line, width = width));
            output.push_str(&format!(
                "{}{:>width$} |{} {}{}{}{}\n",
                dim, "", reset,
                " ".repeat(self.span.start.col),
                accent,
                "^".repeat(underline_len(&self.span, source_line)),
                reset,
                width = width
            ));
        }

        if let Some(ref related) = self.related_span {
            let related_line = related.start.line + 1;
            if let Some(related_source_line) = source.lines().nth(related.start.line) {
                let width = format!("{}", related_line).len().max(2);
                let label = self.related_label.as_deref().unwrap_or("declared here");
                output.push_str(&format!("{}{:>width$} |{} {}\n", dim, related_line, reset, related_source_line, width = width));
                output.push_str(&format!(
                    "{}{:>width$} |{} {}{}{} {}{}\n",
                    dim, "", reset,
                    " ".repeat(related.start.col),
                    dim,
                    "^".repeat(underline_len(related, related_source_line)),
                    label,
                    reset,
                    width = width
                ));
            }
        }

        if let Some(ref help) = self.help {
            output.push('\n');
            for (i, help_line) in help.lines().enumerate() {
                if i == 0 {
                    output.push_str(&format!(" {}help:{} {}\n", cyan, reset, help_line));
                } else {
                    output.push_str(&format!("       {}\n", help_line));
                }
            }
        }

        output.push('\n');
        output
    }
}

/// Caret count: the span on its own line, or the rest of the line for multi-line spans
fn underline_len(span: &Span, source_line: &str) -> usize {
    if span.end.line == span.start.line {
        span.end.col.saturating_sub(span.start.col).max(1)
    } else {
        source_line.chars().count().saturating_sub(span.start.col).max(1)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Diagnostic {}
