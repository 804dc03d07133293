//! Tokenizer for QML documents and embedded JavaScript.
//!
//! The lexer is a small `Copy` state machine so the parser can look ahead
//! or backtrack by cloning it. Whitespace and comments are skipped; a token
//! remembers whether a line terminator preceded it, which drives automatic
//! semicolon insertion. A `/` is always lexed as a punctuator: the parser
//! asks for [`Lexer::rescan_regex`] where a regular expression may start.

use crate::ParseError;
use qmlint_common::Span;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    Identifier,
    Number,
    String,
    Template,
    Regex,
    Punct,
    Eof,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    /// A line terminator occurs between the previous token and this one.
    pub newline_before: bool,
}

/// Punctuators, longest first.
const PUNCTUATORS: &[&str] = &[
    ">>>=", "...", "===", "!==", "**=", "<<=", ">>=", ">>>", "&&=", "||=", "??=", "=>", "==",
    "!=", "<=", ">=", "&&", "||", "??", "?.", "++", "--", "+=", "-=", "*=", "/=", "%=", "&=",
    "|=", "^=", "<<", ">>", "**", "{", "}", "(", ")", "[", "]", ";", ",", "<", ">", "+", "-",
    "*", "/", "%", "&", "|", "^", "!", "~", "?", ":", "=", ".", "@",
];

#[derive(Clone, Copy, Debug)]
pub struct Lexer<'a> {
    source: &'a str,
    pos: usize,
    end: usize,
}

fn is_line_terminator(ch: char) -> bool {
    matches!(ch, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

pub fn is_identifier_start(ch: char) -> bool {
    ch == '_' || ch == '$' || ch.is_alphabetic()
}

pub fn is_identifier_part(ch: char) -> bool {
    ch == '_' || ch == '$' || ch.is_alphanumeric()
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Lexer {
            source,
            pos: 0,
            end: source.len(),
        }
    }

    /// A lexer over `source[start..end]`; spans stay relative to `source`.
    pub fn with_range(source: &'a str, start: usize, end: usize) -> Self {
        Lexer {
            source,
            pos: start.min(source.len()),
            end: end.min(source.len()),
        }
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    fn peek_char(&self) -> Option<char> {
        self.source[self.pos..self.end].chars().next()
    }

    fn peek_char_at(&self, offset: usize) -> Option<char> {
        self.source[self.pos..self.end].chars().nth(offset)
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek_char()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn error(&self, start: usize, message: impl Into<String>) -> ParseError {
        ParseError::new(message, Span::new(start as u32, self.pos.max(start + 1) as u32))
    }

    /// Skip whitespace and comments, returning whether a line terminator was seen.
    fn skip_trivia(&mut self) -> Result<bool, ParseError> {
        let mut newline = false;
        while let Some(ch) = self.peek_char() {
            if is_line_terminator(ch) {
                newline = true;
                self.bump();
            } else if ch.is_whitespace() || ch == '\u{feff}' {
                self.bump();
            } else if ch == '/' && self.peek_char_at(1) == Some('/') {
                while let Some(c) = self.peek_char() {
                    if is_line_terminator(c) {
                        break;
                    }
                    self.bump();
                }
            } else if ch == '/' && self.peek_char_at(1) == Some('*') {
                let start = self.pos;
                self.pos += 2;
                loop {
                    match self.bump() {
                        Some('*') if self.peek_char() == Some('/') => {
                            self.bump();
                            break;
                        }
                        Some(c) if is_line_terminator(c) => newline = true,
                        Some(_) => {}
                        None => return Err(self.error(start, "Unclosed comment at end of file")),
                    }
                }
            } else {
                break;
            }
        }
        Ok(newline)
    }

    pub fn next_token(&mut self) -> Result<Token, ParseError> {
        let newline_before = self.skip_trivia()?;
        let start = self.pos;
        let Some(ch) = self.peek_char() else {
            return Ok(self.token(TokenKind::Eof, start, newline_before));
        };

        let kind = if is_identifier_start(ch) {
            while self.peek_char().is_some_and(is_identifier_part) {
                self.bump();
            }
            TokenKind::Identifier
        } else if ch.is_ascii_digit()
            || (ch == '.' && self.peek_char_at(1).is_some_and(|c| c.is_ascii_digit()))
        {
            self.scan_number();
            TokenKind::Number
        } else if ch == '"' || ch == '\'' {
            self.scan_string(ch)?;
            TokenKind::String
        } else if ch == '`' {
            self.scan_template()?;
            TokenKind::Template
        } else {
            let rest = &self.source[self.pos..self.end];
            let Some(punct) = PUNCTUATORS.iter().find(|p| rest.starts_with(**p)) else {
                self.bump();
                return Err(self.error(start, format!("Unexpected character '{ch}'")));
            };
            self.pos += punct.len();
            TokenKind::Punct
        };
        Ok(self.token(kind, start, newline_before))
    }

    fn token(&self, kind: TokenKind, start: usize, newline_before: bool) -> Token {
        Token {
            kind,
            span: Span::new(start as u32, self.pos as u32),
            newline_before,
        }
    }

    fn scan_number(&mut self) {
        if self.peek_char() == Some('0')
            && matches!(
                self.peek_char_at(1),
                Some('x' | 'X' | 'o' | 'O' | 'b' | 'B')
            )
        {
            self.pos += 2;
            while self.peek_char().is_some_and(|c| c.is_ascii_hexdigit()) {
                self.bump();
            }
            return;
        }
        while self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
        }
        if self.peek_char() == Some('.') {
            self.bump();
            while self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
                self.bump();
            }
        }
        if matches!(self.peek_char(), Some('e' | 'E')) {
            let save = self.pos;
            self.bump();
            if matches!(self.peek_char(), Some('+' | '-')) {
                self.bump();
            }
            if self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
                while self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
                    self.bump();
                }
            } else {
                self.pos = save;
            }
        }
    }

    /// Line terminators are accepted inside string literals; the checker
    /// reports them separately.
    fn scan_string(&mut self, quote: char) -> Result<(), ParseError> {
        let start = self.pos;
        self.bump();
        loop {
            match self.bump() {
                Some('\\') => {
                    self.bump();
                }
                Some(c) if c == quote => return Ok(()),
                Some(_) => {}
                None => return Err(self.error(start, "Unclosed string at end of line")),
            }
        }
    }

    fn scan_template(&mut self) -> Result<(), ParseError> {
        let start = self.pos;
        self.bump();
        loop {
            match self.bump() {
                Some('\\') => {
                    self.bump();
                }
                Some('`') => return Ok(()),
                Some('$') if self.peek_char() == Some('{') => {
                    self.bump();
                    self.skip_balanced_braces(start)?;
                }
                Some(_) => {}
                None => return Err(self.error(start, "Unterminated template literal")),
            }
        }
    }

    /// Skip up to and including the `}` matching an already consumed `{`.
    fn skip_balanced_braces(&mut self, start: usize) -> Result<(), ParseError> {
        let mut depth = 1usize;
        while depth > 0 {
            match self.peek_char() {
                Some('{') => {
                    depth += 1;
                    self.bump();
                }
                Some('}') => {
                    depth -= 1;
                    self.bump();
                }
                Some(q @ ('"' | '\'')) => self.scan_string(q)?,
                Some('`') => self.scan_template()?,
                Some(_) => {
                    self.bump();
                }
                None => return Err(self.error(start, "Unterminated template literal")),
            }
        }
        Ok(())
    }

    /// Re-lex the token starting at `start` (a `/` or `/=`) as a regular
    /// expression literal.
    pub fn rescan_regex(&mut self, start: u32, newline_before: bool) -> Result<Token, ParseError> {
        self.pos = start as usize;
        self.bump();
        let mut in_class = false;
        loop {
            match self.bump() {
                Some('\\') => {
                    self.bump();
                }
                Some('[') => in_class = true,
                Some(']') => in_class = false,
                Some('/') if !in_class => break,
                Some(c) if is_line_terminator(c) => {
                    return Err(self.error(start as usize, "Unterminated regular expression literal"));
                }
                Some(_) => {}
                None => {
                    return Err(self.error(start as usize, "Unterminated regular expression literal"));
                }
            }
        }
        while self.peek_char().is_some_and(is_identifier_part) {
            self.bump();
        }
        Ok(self.token(TokenKind::Regex, start as usize, newline_before))
    }
}

/// Decode the escapes of a quoted string literal, `raw` including its quotes.
pub fn unescape_string(raw: &str) -> String {
    let inner = if raw.len() >= 2 { &raw[1..raw.len() - 1] } else { "" };
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('b') => out.push('\u{8}'),
            Some('f') => out.push('\u{c}'),
            Some('v') => out.push('\u{b}'),
            Some('0') => out.push('\0'),
            Some('u') => {
                let mut code = String::new();
                if chars.peek() == Some(&'{') {
                    chars.next();
                    while let Some(c) = chars.next() {
                        if c == '}' {
                            break;
                        }
                        code.push(c);
                    }
                } else {
                    for _ in 0..4 {
                        if let Some(c) = chars.next() {
                            code.push(c);
                        }
                    }
                }
                if let Some(c) = u32::from_str_radix(&code, 16).ok().and_then(char::from_u32) {
                    out.push(c);
                }
            }
            Some('\r') => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
            }
            Some('\n') => {}
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}

/// Numeric value of a number token.
pub fn parse_number(raw: &str) -> f64 {
    let lower = raw.to_ascii_lowercase();
    let radix = if lower.starts_with("0x") {
        16
    } else if lower.starts_with("0o") {
        8
    } else if lower.starts_with("0b") {
        2
    } else {
        return raw.parse::<f64>().unwrap_or(f64::NAN);
    };
    i64::from_str_radix(&lower[2..], radix)
        .map(|v| v as f64)
        .unwrap_or(f64::NAN)
}
