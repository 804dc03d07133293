//! Recursive-descent parser for QML documents.
//!
//! `ParserState` is split across several files by concern:
//! - `state_qml` - document header, object definitions and members
//! - `state_expressions` - JavaScript expressions
//! - `state_statements` - JavaScript statements and functions
//!
//! The state is `Clone`; speculative parses (arrow functions, object
//! bindings) snapshot it and restore on failure.

mod state_expressions;
mod state_qml;
mod state_statements;

use crate::ParseError;
use crate::ast::{Ident, QualifiedName, TypeAnnotation};
use crate::lexer::{Lexer, Token, TokenKind};
use qmlint_common::Span;

/// Nesting limit for objects, statements and expressions. Every operator of
/// a binary chain and every step of a member or call chain counts, since
/// each one adds a level to the tree that later stages walk recursively.
/// The limit keeps those walks inside a 2 MiB thread stack.
pub const MAX_DEPTH: u32 = 96;

#[derive(Clone)]
pub struct ParserState<'a> {
    lexer: Lexer<'a>,
    source: &'a str,
    token: Token,
    prev_end: u32,
    /// Disallow the `in` operator (for-in heads).
    no_in: bool,
    depth: u32,
}

impl<'a> ParserState<'a> {
    pub fn new(source: &'a str) -> Result<Self, ParseError> {
        Self::from_lexer(source, Lexer::new(source))
    }

    /// A parser over `source[start..end]`, used for template substitutions.
    pub(crate) fn with_range(source: &'a str, start: usize, end: usize) -> Result<Self, ParseError> {
        Self::from_lexer(source, Lexer::with_range(source, start, end))
    }

    fn from_lexer(source: &'a str, mut lexer: Lexer<'a>) -> Result<Self, ParseError> {
        let token = lexer.next_token()?;
        Ok(ParserState {
            lexer,
            source,
            token,
            prev_end: token.span.start,
            no_in: false,
            depth: 0,
        })
    }

    // =========================================================================
    // Token helpers
    // =========================================================================

    fn text(&self) -> &'a str {
        self.token.span.slice(self.source)
    }

    fn token_text(&self, token: Token) -> &'a str {
        token.span.slice(self.source)
    }

    fn is_eof(&self) -> bool {
        self.token.kind == TokenKind::Eof
    }

    fn is_punct(&self, punct: &str) -> bool {
        self.token.kind == TokenKind::Punct && self.text() == punct
    }

    fn is_keyword(&self, keyword: &str) -> bool {
        self.token.kind == TokenKind::Identifier && self.text() == keyword
    }

    fn is_identifier(&self) -> bool {
        self.token.kind == TokenKind::Identifier
    }

    fn advance(&mut self) -> Result<Token, ParseError> {
        let current = self.token;
        self.prev_end = current.span.end;
        self.token = self.lexer.next_token()?;
        Ok(current)
    }

    fn peek(&self) -> Result<Token, ParseError> {
        let mut lexer = self.lexer;
        lexer.next_token()
    }

    fn peek_is_punct(&self, punct: &str) -> Result<bool, ParseError> {
        let next = self.peek()?;
        Ok(next.kind == TokenKind::Punct && self.token_text(next) == punct)
    }

    fn eat(&mut self, punct: &str) -> Result<bool, ParseError> {
        if self.is_punct(punct) {
            self.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn expect(&mut self, punct: &str) -> Result<Token, ParseError> {
        if self.is_punct(punct) {
            self.advance()
        } else {
            Err(self.expected(punct))
        }
    }

    fn expect_keyword(&mut self, keyword: &str) -> Result<Token, ParseError> {
        if self.is_keyword(keyword) {
            self.advance()
        } else {
            Err(self.expected(keyword))
        }
    }

    fn expected(&self, what: &str) -> ParseError {
        ParseError::new(format!("Expected token `{what}'"), self.error_span())
    }

    fn unexpected(&self) -> ParseError {
        if self.is_eof() {
            ParseError::new("Unexpected end of file", self.error_span())
        } else {
            ParseError::new(format!("Unexpected token `{}'", self.text()), self.token.span)
        }
    }

    fn error_span(&self) -> Span {
        if self.is_eof() {
            Span::new(self.prev_end, self.prev_end)
        } else {
            self.token.span
        }
    }

    fn span_from(&self, start: u32) -> Span {
        Span::new(start, self.prev_end.max(start))
    }

    /// Automatic semicolon insertion: accept `;`, or a position before `}`,
    /// end of input or a line break.
    fn consume_semicolon(&mut self) -> Result<(), ParseError> {
        if self.eat(";")? {
            return Ok(());
        }
        if self.is_punct("}") || self.is_eof() || self.token.newline_before {
            return Ok(());
        }
        Err(self.expected(";"))
    }

    /// Require that all input has been consumed.
    pub fn finish(&self) -> Result<(), ParseError> {
        if self.is_eof() {
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    fn enter(&mut self) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(ParseError::new("Maximum nesting depth exceeded", self.token.span));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    fn leave_by(&mut self, levels: u32) {
        self.depth = self.depth.saturating_sub(levels);
    }

    // =========================================================================
    // Names
    // =========================================================================

    fn parse_identifier(&mut self) -> Result<Ident, ParseError> {
        if !self.is_identifier() {
            return Err(ParseError::new("Expected identifier", self.error_span()));
        }
        let token = self.advance()?;
        Ok(Ident::new(self.token_text(token), token.span))
    }

    /// `a.b.c`; the dot must be followed by an identifier.
    fn parse_qualified_name(&mut self) -> Result<QualifiedName, ParseError> {
        let first = self.parse_identifier()?;
        let start = first.span.start;
        let mut parts = vec![first];
        while self.is_punct(".") && self.peek()?.kind == TokenKind::Identifier {
            self.advance()?;
            parts.push(self.parse_identifier()?);
        }
        Ok(QualifiedName {
            parts,
            span: self.span_from(start),
        })
    }

    /// `Type`, `Module.Type` or `list<Type>`.
    fn parse_type_annotation(&mut self) -> Result<TypeAnnotation, ParseError> {
        let start = self.token.span.start;
        if self.is_keyword("list") && self.peek_is_punct("<")? {
            self.advance()?;
            self.advance()?;
            let name = self.parse_qualified_name()?;
            self.expect(">")?;
            return Ok(TypeAnnotation {
                name,
                is_list: true,
                span: self.span_from(start),
            });
        }
        let name = self.parse_qualified_name()?;
        Ok(TypeAnnotation {
            name,
            is_list: false,
            span: self.span_from(start),
        })
    }
}
