use std::fmt;

/// Line-oriented buffer for generated Go source
pub struct Output {
    lines: Vec<String>,
    current_line: String,
    indent_unit: String,
}

impl Output {
    pub fn new(indent_unit: &str) -> Self {
        Self {
            lines: Vec::new(),
            current_line: String::new(),
            indent_unit: indent_unit.to_string(),
        }
    }

    /// Add text to the current line
    pub fn push(&mut self, text: &str) {
        self.current_line.push_str(text);
    }

    /// Add indentation for `level` to the current line
    pub fn indent(&mut self, level: usize) {
        for _ in 0..level {
            self.current_line.push_str(&self.indent_unit);
        }
    }

    /// End the current line
    pub fn newline(&mut self) {
        self.lines.push(std::mem::take(&mut self.current_line));
    }

    /// Add a complete line at `level`
    pub fn line(&mut self, level: usize, text: &str) {
        self.indent(level);
        self.push(text);
        self.newline();
    }

    /// Add an empty line
    pub fn blank(&mut self) {
        self.newline();
    }

    /// Number of completed lines
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.current_line.is_empty()
    }

    /// Finish and return the generated code, without a trailing newline
    pub fn finish(mut self) -> String {
        if !self.current_line.is_empty() {
            self.newline();
        }
        self.lines.join("\n")
    }
}

impl fmt::Write for Output {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let mut parts = s.split('\n');
        if let Some(first) = parts.next() {
            self.push(first);
        }
        for part in parts {
            self.newline();
            self.push(part);
        }
        Ok(())
    }
}
