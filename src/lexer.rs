use std::fmt;

/// Token types produced by the template scanner
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literal text, escapes already applied
    Text(String),

    // Raw `{$ ... }` tag, delimiters included
    ValueTag(String),

    // Raw `{% ... %}` tag, delimiters included
    DirectiveTag(String),

    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn new(kind: TokenKind, line: usize, column: usize) -> Self {
        Self { kind, line, column }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} at {}:{}", self.kind, self.line, self.column)
    }
}

/// Scanner splitting template text into literal text and tag spans
///
/// `{$` opens a value tag closed by the next `}` and `{%` opens a directive
/// closed by the next `%}`. An opener with no closer, or a `{` followed by
/// anything else, is plain text. `{\` emits a literal `{` and drops the
/// backslash.
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.position + 1).copied()
    }

    /// Advance to the next character
    fn advance(&mut self) {
        if self.current_char() == Some('\n') {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        self.position += 1;
    }

    fn advance_by(&mut self, count: usize) {
        for _ in 0..count {
            self.advance();
        }
    }

    /// Position of `closer` at or after `from`
    fn find(&self, from: usize, closer: &[char]) -> Option<usize> {
        if from > self.input.len() {
            return None;
        }
        self.input[from..]
            .windows(closer.len())
            .position(|window| window == closer)
            .map(|offset| from + offset)
    }

    /// Consume `count` characters and return them as a string
    fn take(&mut self, count: usize) -> String {
        let text: String = self.input[self.position..self.position + count].iter().collect();
        self.advance_by(count);
        text
    }

    /// Read plain text up to the next `{`; the current character is always taken
    fn read_text(&mut self) -> String {
        let mut result = String::new();

        if let Some(ch) = self.current_char() {
            result.push(ch);
            self.advance();
        }
        while let Some(ch) = self.current_char() {
            if ch == '{' {
                break;
            }
            result.push(ch);
            self.advance();
        }

        result
    }

    /// Read a tag starting at the current `{`, or the rest of the input when
    /// the closer never appears
    fn read_tag(&mut self, closer: &[char], wrap: fn(String) -> TokenKind) -> TokenKind {
        match self.find(self.position + 2, closer) {
            Some(end) => {
                let length = end + closer.len() - self.position;
                wrap(self.take(length))
            }
            None => {
                let rest = self.input.len() - self.position;
                TokenKind::Text(self.take(rest))
            }
        }
    }

    /// Get the next token
    pub fn next_token(&mut self) -> Token {
        let (line, column) = (self.line, self.column);

        let kind = match (self.current_char(), self.peek()) {
            (None, _) => TokenKind::Eof,
            (Some('{'), Some('$')) => self.read_tag(&['}'], TokenKind::ValueTag),
            (Some('{'), Some('%')) => self.read_tag(&['%', '}'], TokenKind::DirectiveTag),
            (Some('{'), Some('\\')) => {
                self.advance_by(2);
                TokenKind::Text("{".to_string())
            }
            _ => TokenKind::Text(self.read_text()),
        };

        Token::new(kind, line, column)
    }

    /// Tokenize the entire input, merging adjacent text
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens: Vec<Token> = Vec::new();

        loop {
            let token = self.next_token();

            if let TokenKind::Text(text) = &token.kind {
                if let Some(Token {
                    kind: TokenKind::Text(previous),
                    ..
                }) = tokens.last_mut()
                {
                    previous.push_str(text);
                    continue;
                }
            }

            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                break;
            }
        }

        tokens
    }
}
