//! QML parser for the qmlint analyzer.
//!
//! This crate turns QML source text into an owned, span-annotated tree:
//! - `lexer` - tokens for QML and embedded JavaScript
//! - `ast` - documents, imports, object definitions and members
//! - `js` - expressions, statements and functions of script bindings
//!
//! Parsing stops at the first syntax error; the caller reports it as a
//! single diagnostic.

pub mod ast;
pub mod js;
pub mod lexer;
mod parser;

pub use parser::{MAX_DEPTH, ParserState};

use qmlint_common::Span;
use std::fmt;

/// A syntax error with the location where parsing stopped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    pub span: Span,
}

impl ParseError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        ParseError {
            message: message.into(),
            span,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}..{}", self.message, self.span.start, self.span.end)
    }
}

impl std::error::Error for ParseError {}

/// Parse a complete QML document.
pub fn parse_document(source: &str) -> Result<ast::Document, ParseError> {
    let _span = tracing::debug_span!("parse_document", len = source.len()).entered();
    let result = ParserState::new(source).and_then(|mut parser| parser.parse_document());
    if let Err(err) = &result {
        tracing::debug!(message = %err.message, start = err.span.start, "parse failed");
    }
    result
}

/// Parse a standalone JavaScript expression.
pub fn parse_expression(source: &str) -> Result<js::Expr, ParseError> {
    let mut parser = ParserState::new(source)?;
    let expr = parser.parse_expression()?;
    parser.finish()?;
    Ok(expr)
}

#[cfg(test)]
#[path = "../tests/lexer_tests.rs"]
mod lexer_tests;
