/// Position in source code
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Position {
    /// Byte offset in source
    pub byte: usize,
    /// Line number (0-indexed)
    pub line: usize,
    /// Column number (0-indexed, in characters)
    pub col: usize,
}

impl Position {
    pub fn new() -> Self {
        Self { byte: 0, line: 0, col: 0 }
    }
}

/// Span in source code (a range from start position to end position)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    /// Span covering both `self` and `other`
    pub fn to(self, other: Span) -> Span {
        Span { start: self.start, end: other.end }
    }

    /// Zero-width span at the start of `self`
    pub fn collapsed(self) -> Span {
        Span { start: self.start, end: self.start }
    }
}

/// Tokens produced by the lexer
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Identifier or keyword (`type`, `struct`, `map` are not distinguished here)
    Ident { name: String, span: Span },
    /// Numeric literal, kept verbatim (array lengths)
    Number { text: String, span: Span },
    /// Raw string literal: `...` (value excludes the backquotes)
    RawString { value: String, span: Span },
    /// Interpreted string literal: "..." (value has \" and \\ unescaped)
    String { value: String, span: Span },
    /// Any other single character: * [ ] { } ( ) . , ; : and friends
    Punct { ch: char, span: Span },
    /// Newline (LF or CRLF), or a block comment spanning lines
    Newline { span: Span },
    /// End of file
    Eof { position: Position },
}

impl Token {
    pub fn span(&self) -> Span {
        match self {
            Token::Ident { span, .. } => *span,
            Token::Number { span, .. } => *span,
            Token::RawString { span, .. } => *span,
            Token::String { span, .. } => *span,
            Token::Punct { span, .. } => *span,
            Token::Newline { span } => *span,
            Token::Eof { position } => Span { start: *position, end: *position },
        }
    }

    /// True for the identifier `word`
    pub fn is_word(&self, word: &str) -> bool {
        matches!(self, Token::Ident { name, .. } if name == word)
    }

    pub fn is_punct(&self, c: char) -> bool {
        matches!(self, Token::Punct { ch, .. } if *ch == c)
    }

    /// String literal payload, for either quote style
    pub fn string_value(&self) -> Option<&str> {
        match self {
            Token::RawString { value, .. } | Token::String { value, .. } => Some(value),
            _ => None,
        }
    }
}

/// Tokenizer for Go type declarations
pub struct Tokenizer<'a> {
    source: &'a str,
    position: Position,
}

impl<'a> Tokenizer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            position: Position::new(),
        }
    }

    /// Tokenize the entire source
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();

        while let Some(c) = self.peek() {
            match c {
                '\n' => {
                    let start = self.position;
                    self.bump();
                    tokens.push(Token::Newline { span: self.span_from(start) });
                }
                c if c.is_whitespace() => {
                    self.bump();
                }
                '/' if self.peek_second() == Some('/') => self.skip_line_comment(),
                '/' if self.peek_second() == Some('*') => {
                    let start = self.position;
                    // Go treats a comment containing a newline as a newline
                    if self.skip_block_comment() {
                        tokens.push(Token::Newline { span: self.span_from(start) });
                    }
                }
                '`' => tokens.push(self.raw_string()),
                '"' => tokens.push(self.interpreted_string()),
                c if is_ident_start(c) => tokens.push(self.ident()),
                c if c.is_ascii_digit() => tokens.push(self.number()),
                c => {
                    let start = self.position;
                    self.bump();
                    tokens.push(Token::Punct { ch: c, span: self.span_from(start) });
                }
            }
        }

        tokens.push(Token::Eof { position: self.position });
        tokens
    }

    fn peek(&self) -> Option<char> {
        self.source[self.position.byte..].chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        let mut chars = self.source[self.position.byte..].chars();
        chars.next();
        chars.next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.position.byte += c.len_utf8();
        if c == '\n' {
            self.position.line += 1;
            self.position.col = 0;
        } else {
            self.position.col += 1;
        }
        Some(c)
    }

    fn span_from(&self, start: Position) -> Span {
        Span { start, end: self.position }
    }

    fn skip_line_comment(&mut self) {
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.bump();
        }
    }

    /// Skip `/* ... */`. Returns whether the comment contained a newline.
    /// An unterminated comment runs to end of input.
    fn skip_block_comment(&mut self) -> bool {
        self.bump();
        self.bump();
        let mut saw_newline = false;
        while let Some(c) = self.bump() {
            if c == '\n' {
                saw_newline = true;
            }
            if c == '*' && self.peek() == Some('/') {
                self.bump();
                break;
            }
        }
        saw_newline
    }

    fn raw_string(&mut self) -> Token {
        let start = self.position;
        self.bump();
        let content_start = self.position.byte;
        let mut content_end = self.source.len();
        while let Some(c) = self.peek() {
            if c == '`' {
                content_end = self.position.byte;
                self.bump();
                break;
            }
            self.bump();
        }
        Token::RawString {
            value: self.source[content_start..content_end].to_string(),
            span: self.span_from(start),
        }
    }

    fn interpreted_string(&mut self) -> Token {
        let start = self.position;
        self.bump();
        let mut value = String::new();
        while let Some(c) = self.peek() {
            match c {
                '"' => {
                    self.bump();
                    break;
                }
                // Unterminated: stop at end of line
                '\n' => break,
                '\\' => {
                    self.bump();
                    match self.bump() {
                        Some('"') => value.push('"'),
                        Some('\\') => value.push('\\'),
                        Some('n') => value.push('\n'),
                        Some('t') => value.push('\t'),
                        Some(other) => {
                            value.push('\\');
                            value.push(other);
                        }
                        None => value.push('\\'),
                    }
                }
                c => {
                    value.push(c);
                    self.bump();
                }
            }
        }
        Token::String { value, span: self.span_from(start) }
    }

    fn ident(&mut self) -> Token {
        let start = self.position;
        while let Some(c) = self.peek() {
            if !is_ident_continue(c) {
                break;
            }
            self.bump();
        }
        Token::Ident {
            name: self.source[start.byte..self.position.byte].to_string(),
            span: self.span_from(start),
        }
    }

    fn number(&mut self) -> Token {
        let start = self.position;
        while let Some(c) = self.peek() {
            if !(c.is_ascii_alphanumeric() || c == '_' || c == '.') {
                break;
            }
            self.bump();
        }
        Token::Number {
            text: self.source[start.byte..self.position.byte].to_string(),
            span: self.span_from(start),
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

fn is_ident_continue(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

/// Tokenize source text
pub fn tokenize(source: &str) -> Vec<Token> {
    Tokenizer::new(source).tokenize()
}
