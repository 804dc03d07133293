//! Parser state - JavaScript expressions
use super::ParserState;
use crate::ParseError;
use crate::ast::{Ident, TypeAnnotation};
use crate::js::{
    Block, Expr, ExprKind, Function, FunctionBody, ObjectProperty, Param, PropertyKey,
    StringLiteral,
};
use crate::lexer::{TokenKind, parse_number, unescape_string};
use qmlint_common::Span;

const ASSIGNMENT_OPERATORS: &[&str] = &[
    "=", "+=", "-=", "*=", "/=", "%=", "**=", "<<=", ">>=", ">>>=", "&=", "|=", "^=", "&&=",
    "||=", "??=",
];

/// Binary operators and their precedence, loosest first.
const BINARY_OPERATORS: &[(&str, u8)] = &[
    ("??", 1),
    ("||", 1),
    ("&&", 2),
    ("|", 3),
    ("^", 4),
    ("&", 5),
    ("==", 6),
    ("!=", 6),
    ("===", 6),
    ("!==", 6),
    ("<", 7),
    (">", 7),
    ("<=", 7),
    (">=", 7),
    ("instanceof", 7),
    ("in", 7),
    ("<<", 8),
    (">>", 8),
    (">>>", 8),
    ("+", 9),
    ("-", 9),
    ("*", 10),
    ("/", 10),
    ("%", 10),
    ("**", 11),
];

const UNARY_OPERATORS: &[&str] = &["!", "~", "+", "-", "typeof", "void", "delete", "await"];

const RESERVED_WORDS: &[&str] = &[
    "break", "case", "catch", "class", "continue", "debugger", "default", "delete", "do",
    "else", "export", "extends", "finally", "for", "if", "import", "in", "instanceof", "return",
    "super", "switch", "throw", "try", "var", "while", "with", "const", "enum",
];

pub fn is_reserved_word(name: &str) -> bool {
    RESERVED_WORDS.contains(&name)
}

impl<'a> ParserState<'a> {
    // =========================================================================
    // Parse Methods - Expressions
    // =========================================================================

    /// Parse a comma expression.
    pub fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        let first = self.parse_assignment()?;
        if !self.is_punct(",") {
            return Ok(first);
        }
        let start = first.span.start;
        let mut items = vec![first];
        while self.eat(",")? {
            items.push(self.parse_assignment()?);
        }
        Ok(Expr::new(ExprKind::Sequence(items), self.span_from(start)))
    }

    pub(crate) fn parse_assignment(&mut self) -> Result<Expr, ParseError> {
        self.enter()?;
        let result = self.parse_assignment_inner();
        self.leave();
        result
    }

    fn parse_assignment_inner(&mut self) -> Result<Expr, ParseError> {
        let start = self.token.span.start;

        if self.is_identifier() && !is_reserved_word(self.text()) && self.peek_is_punct("=>")? {
            let name = self.parse_identifier()?;
            let params = vec![Param {
                name,
                type_annotation: None,
                default: None,
            }];
            return self.parse_arrow_rest(start, params, None);
        }
        if self.is_punct("(") {
            if let Some(arrow) = self.try_parse_arrow()? {
                return Ok(arrow);
            }
        }

        let left = self.parse_conditional()?;
        if self.token.kind == TokenKind::Punct {
            let text = self.text();
            if let Some(op) = ASSIGNMENT_OPERATORS.iter().copied().find(|op| *op == text) {
                self.advance()?;
                let value = self.parse_assignment()?;
                return Ok(Expr::new(
                    ExprKind::Assign {
                        op,
                        target: Box::new(left),
                        value: Box::new(value),
                    },
                    self.span_from(start),
                ));
            }
        }
        Ok(left)
    }

    /// `( params ) [: Type] => body`, or `None` if the parenthesis starts
    /// an ordinary expression.
    fn try_parse_arrow(&mut self) -> Result<Option<Expr>, ParseError> {
        let saved = self.clone();
        let start = self.token.span.start;
        let head = (|| -> Result<Option<(Vec<Param>, Option<TypeAnnotation>)>, ParseError> {
            let params = self.parse_formal_parameters()?;
            let return_type = if self.eat(":")? {
                Some(self.parse_type_annotation()?)
            } else {
                None
            };
            if self.is_punct("=>") && !self.token.newline_before {
                Ok(Some((params, return_type)))
            } else {
                Ok(None)
            }
        })();
        match head {
            Ok(Some((params, return_type))) => {
                Ok(Some(self.parse_arrow_rest(start, params, return_type)?))
            }
            _ => {
                *self = saved;
                Ok(None)
            }
        }
    }

    fn parse_arrow_rest(
        &mut self,
        start: u32,
        params: Vec<Param>,
        return_type: Option<TypeAnnotation>,
    ) -> Result<Expr, ParseError> {
        self.expect("=>")?;
        let body = if self.is_punct("{") {
            FunctionBody::Block(self.parse_block()?)
        } else {
            let saved_no_in = self.no_in;
            self.no_in = false;
            let expr = self.parse_assignment();
            self.no_in = saved_no_in;
            FunctionBody::Expr(Box::new(expr?))
        };
        let span = self.span_from(start);
        let function = Function {
            name: None,
            params,
            return_type,
            body,
            is_arrow: true,
            span,
        };
        Ok(Expr::new(ExprKind::Function(Box::new(function)), span))
    }

    fn parse_conditional(&mut self) -> Result<Expr, ParseError> {
        let start = self.token.span.start;
        let test = self.parse_binary(1)?;
        if !self.eat("?")? {
            return Ok(test);
        }
        let saved_no_in = self.no_in;
        self.no_in = false;
        let consequent = self.parse_assignment();
        self.no_in = saved_no_in;
        let consequent = consequent?;
        self.expect(":")?;
        let alternate = self.parse_assignment()?;
        Ok(Expr::new(
            ExprKind::Conditional {
                test: Box::new(test),
                consequent: Box::new(consequent),
                alternate: Box::new(alternate),
            },
            self.span_from(start),
        ))
    }

    fn current_binary_operator(&self) -> Option<(&'static str, u8)> {
        let text = self.text();
        let is_word = self.token.kind == TokenKind::Identifier;
        if !(self.token.kind == TokenKind::Punct || is_word) {
            return None;
        }
        if is_word && !matches!(text, "in" | "instanceof") {
            return None;
        }
        if text == "in" && self.no_in {
            return None;
        }
        BINARY_OPERATORS
            .iter()
            .find(|(op, _)| *op == text)
            .map(|(op, prec)| (*op, *prec))
    }

    fn parse_binary(&mut self, min_precedence: u8) -> Result<Expr, ParseError> {
        let start = self.token.span.start;
        let mut left = self.parse_unary()?;
        let mut chained = 0;
        while let Some((op, precedence)) = self.current_binary_operator() {
            if precedence < min_precedence {
                break;
            }
            self.enter()?;
            chained += 1;
            self.advance()?;
            let next_min = if op == "**" { precedence } else { precedence + 1 };
            let right = self.parse_binary(next_min)?;
            left = Expr::new(
                ExprKind::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                self.span_from(start),
            );
        }
        self.leave_by(chained);
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        self.enter()?;
        let result = self.parse_unary_inner();
        self.leave();
        result
    }

    fn parse_unary_inner(&mut self) -> Result<Expr, ParseError> {
        let start = self.token.span.start;
        if matches!(self.token.kind, TokenKind::Punct | TokenKind::Identifier) {
            let text = self.text();
            if let Some(op) = UNARY_OPERATORS.iter().copied().find(|op| *op == text) {
                let is_word = self.token.kind == TokenKind::Identifier;
                if !is_word || !self.peek_is_punct("=>")? {
                    self.advance()?;
                    let operand = self.parse_unary()?;
                    return Ok(Expr::new(
                        ExprKind::Unary {
                            op,
                            operand: Box::new(operand),
                        },
                        self.span_from(start),
                    ));
                }
            }
            if self.token.kind == TokenKind::Punct && (text == "++" || text == "--") {
                let op = if text == "++" { "++" } else { "--" };
                self.advance()?;
                let operand = self.parse_unary()?;
                return Ok(Expr::new(
                    ExprKind::Update {
                        op,
                        prefix: true,
                        operand: Box::new(operand),
                    },
                    self.span_from(start),
                ));
            }
        }

        let expr = self.parse_call_member()?;
        if (self.is_punct("++") || self.is_punct("--")) && !self.token.newline_before {
            let op = if self.is_punct("++") { "++" } else { "--" };
            self.advance()?;
            return Ok(Expr::new(
                ExprKind::Update {
                    op,
                    prefix: false,
                    operand: Box::new(expr),
                },
                self.span_from(start),
            ));
        }
        Ok(expr)
    }

    fn parse_call_member(&mut self) -> Result<Expr, ParseError> {
        let start = self.token.span.start;
        let mut expr = if self.is_keyword("new") {
            self.parse_new()?
        } else {
            self.parse_primary()?
        };
        let mut chained = 0;
        loop {
            if self.is_punct(".") || self.is_punct("?.") || self.is_punct("[") || self.is_punct("(") {
                self.enter()?;
                chained += 1;
            }
            if self.eat(".")? {
                let property = self.parse_property_name()?;
                expr = Expr::new(
                    ExprKind::Member {
                        object: Box::new(expr),
                        property,
                        optional: false,
                    },
                    self.span_from(start),
                );
            } else if self.eat("?.")? {
                if self.is_punct("(") {
                    let arguments = self.parse_arguments()?;
                    expr = Expr::new(
                        ExprKind::Call {
                            callee: Box::new(expr),
                            arguments,
                            optional: true,
                        },
                        self.span_from(start),
                    );
                } else if self.eat("[")? {
                    let index = self.parse_expression_allow_in()?;
                    self.expect("]")?;
                    expr = Expr::new(
                        ExprKind::Index {
                            object: Box::new(expr),
                            index: Box::new(index),
                            optional: true,
                        },
                        self.span_from(start),
                    );
                } else {
                    let property = self.parse_property_name()?;
                    expr = Expr::new(
                        ExprKind::Member {
                            object: Box::new(expr),
                            property,
                            optional: true,
                        },
                        self.span_from(start),
                    );
                }
            } else if self.eat("[")? {
                let index = self.parse_expression_allow_in()?;
                self.expect("]")?;
                expr = Expr::new(
                    ExprKind::Index {
                        object: Box::new(expr),
                        index: Box::new(index),
                        optional: false,
                    },
                    self.span_from(start),
                );
            } else if self.is_punct("(") {
                let arguments = self.parse_arguments()?;
                expr = Expr::new(
                    ExprKind::Call {
                        callee: Box::new(expr),
                        arguments,
                        optional: false,
                    },
                    self.span_from(start),
                );
            } else {
                break;
            }
        }
        self.leave_by(chained);
        Ok(expr)
    }

    fn parse_new(&mut self) -> Result<Expr, ParseError> {
        self.enter()?;
        let result = self.parse_new_inner();
        self.leave();
        result
    }

    fn parse_new_inner(&mut self) -> Result<Expr, ParseError> {
        let start = self.advance()?.span.start;
        let mut callee = if self.is_keyword("new") {
            self.parse_new()?
        } else {
            self.parse_primary()?
        };
        let mut chained = 0;
        loop {
            if self.is_punct(".") || self.is_punct("[") {
                self.enter()?;
                chained += 1;
            }
            if self.eat(".")? {
                let property = self.parse_property_name()?;
                callee = Expr::new(
                    ExprKind::Member {
                        object: Box::new(callee),
                        property,
                        optional: false,
                    },
                    self.span_from(start),
                );
            } else if self.eat("[")? {
                let index = self.parse_expression_allow_in()?;
                self.expect("]")?;
                callee = Expr::new(
                    ExprKind::Index {
                        object: Box::new(callee),
                        index: Box::new(index),
                        optional: false,
                    },
                    self.span_from(start),
                );
            } else {
                break;
            }
        }
        self.leave_by(chained);
        let arguments = if self.is_punct("(") {
            self.parse_arguments()?
        } else {
            Vec::new()
        };
        Ok(Expr::new(
            ExprKind::New {
                callee: Box::new(callee),
                arguments,
            },
            self.span_from(start),
        ))
    }

    /// After `.`: any identifier, reserved words included.
    fn parse_property_name(&mut self) -> Result<Ident, ParseError> {
        if !self.is_identifier() {
            return Err(ParseError::new("Expected identifier", self.error_span()));
        }
        let token = self.advance()?;
        Ok(Ident::new(self.token_text(token), token.span))
    }

    fn parse_expression_allow_in(&mut self) -> Result<Expr, ParseError> {
        let saved_no_in = self.no_in;
        self.no_in = false;
        let result = self.parse_expression();
        self.no_in = saved_no_in;
        result
    }

    fn parse_arguments(&mut self) -> Result<Vec<Expr>, ParseError> {
        self.expect("(")?;
        let saved_no_in = self.no_in;
        self.no_in = false;
        let result = self.parse_argument_list();
        self.no_in = saved_no_in;
        result
    }

    fn parse_argument_list(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut arguments = Vec::new();
        while !self.is_punct(")") {
            arguments.push(self.parse_spread_or_assignment()?);
            if !self.eat(",")? {
                break;
            }
        }
        self.expect(")")?;
        Ok(arguments)
    }

    fn parse_spread_or_assignment(&mut self) -> Result<Expr, ParseError> {
        if self.is_punct("...") {
            let start = self.advance()?.span.start;
            let argument = self.parse_assignment()?;
            return Ok(Expr::new(
                ExprKind::Spread(Box::new(argument)),
                self.span_from(start),
            ));
        }
        self.parse_assignment()
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let token = self.token;
        let text = self.text();
        match token.kind {
            TokenKind::Identifier => {
                let kind = match text {
                    "this" => ExprKind::This,
                    "null" => ExprKind::Null,
                    "true" => ExprKind::Bool(true),
                    "false" => ExprKind::Bool(false),
                    "function" => {
                        let function = self.parse_function(false)?;
                        let span = function.span;
                        return Ok(Expr::new(ExprKind::Function(Box::new(function)), span));
                    }
                    _ if is_reserved_word(text) => return Err(self.unexpected()),
                    _ => ExprKind::Identifier(text.to_string()),
                };
                self.advance()?;
                Ok(Expr::new(kind, token.span))
            }
            TokenKind::Number => {
                self.advance()?;
                Ok(Expr::new(ExprKind::Number(parse_number(text)), token.span))
            }
            TokenKind::String => {
                self.advance()?;
                let literal = StringLiteral {
                    value: unescape_string(text),
                    multiline: text.contains(['\n', '\r', '\u{2028}', '\u{2029}']),
                };
                Ok(Expr::new(ExprKind::String(literal), token.span))
            }
            TokenKind::Template => {
                self.advance()?;
                let substitutions = self.parse_template_substitutions(token.span)?;
                Ok(Expr::new(ExprKind::Template(substitutions), token.span))
            }
            TokenKind::Punct => match text {
                "(" => {
                    self.advance()?;
                    let expr = self.parse_expression_allow_in()?;
                    self.expect(")")?;
                    Ok(expr)
                }
                "[" => self.parse_array_literal(),
                "{" => self.parse_object_literal(),
                "/" | "/=" => {
                    let regex = self
                        .lexer
                        .rescan_regex(token.span.start, token.newline_before)?;
                    self.token = regex;
                    self.advance()?;
                    Ok(Expr::new(ExprKind::Regex, regex.span))
                }
                _ => Err(self.unexpected()),
            },
            TokenKind::Regex | TokenKind::Eof => Err(self.unexpected()),
        }
    }

    fn parse_array_literal(&mut self) -> Result<Expr, ParseError> {
        let start = self.advance()?.span.start;
        let saved_no_in = self.no_in;
        self.no_in = false;
        let mut elements = Vec::new();
        let result = (|| -> Result<(), ParseError> {
            while !self.is_punct("]") {
                if self.is_punct(",") {
                    let comma = self.advance()?;
                    elements.push(Expr::new(ExprKind::Elision, Span::at(comma.span.start)));
                    continue;
                }
                elements.push(self.parse_spread_or_assignment()?);
                if !self.eat(",")? {
                    break;
                }
            }
            self.expect("]")?;
            Ok(())
        })();
        self.no_in = saved_no_in;
        result?;
        Ok(Expr::new(ExprKind::Array(elements), self.span_from(start)))
    }

    fn parse_object_literal(&mut self) -> Result<Expr, ParseError> {
        let start = self.advance()?.span.start;
        let saved_no_in = self.no_in;
        self.no_in = false;
        let mut properties = Vec::new();
        let result = (|| -> Result<(), ParseError> {
            while !self.is_punct("}") {
                properties.push(self.parse_object_property()?);
                if !self.eat(",")? {
                    break;
                }
            }
            self.expect("}")?;
            Ok(())
        })();
        self.no_in = saved_no_in;
        result?;
        Ok(Expr::new(ExprKind::Object(properties), self.span_from(start)))
    }

    fn parse_object_property(&mut self) -> Result<ObjectProperty, ParseError> {
        let start = self.token.span.start;
        if self.is_punct("...") {
            let spread = self.parse_spread_or_assignment()?;
            let ExprKind::Spread(argument) = &spread.kind else {
                return Err(self.unexpected());
            };
            return Ok(ObjectProperty {
                key: PropertyKey::Computed(argument.clone()),
                value: spread.clone(),
                shorthand: false,
                span: self.span_from(start),
            });
        }

        let token = self.token;
        let key = match token.kind {
            TokenKind::Identifier => PropertyKey::Identifier(self.parse_property_name()?),
            TokenKind::String => {
                self.advance()?;
                PropertyKey::String(unescape_string(self.token_text(token)), token.span)
            }
            TokenKind::Number => {
                self.advance()?;
                PropertyKey::Number(parse_number(self.token_text(token)), token.span)
            }
            TokenKind::Punct if self.is_punct("[") => {
                self.advance()?;
                let key = self.parse_assignment()?;
                self.expect("]")?;
                PropertyKey::Computed(Box::new(key))
            }
            _ => return Err(self.unexpected()),
        };

        if self.eat(":")? {
            let value = self.parse_assignment()?;
            return Ok(ObjectProperty {
                key,
                value,
                shorthand: false,
                span: self.span_from(start),
            });
        }
        if self.is_punct("(") {
            let params = self.parse_formal_parameters()?;
            let body = self.parse_block()?;
            let span = self.span_from(start);
            let function = Function {
                name: None,
                params,
                return_type: None,
                body: FunctionBody::Block(body),
                is_arrow: false,
                span,
            };
            return Ok(ObjectProperty {
                key,
                value: Expr::new(ExprKind::Function(Box::new(function)), span),
                shorthand: false,
                span,
            });
        }
        match &key {
            PropertyKey::Identifier(ident) => {
                let value = Expr::new(ExprKind::Identifier(ident.name.clone()), ident.span);
                Ok(ObjectProperty {
                    key,
                    value,
                    shorthand: true,
                    span: self.span_from(start),
                })
            }
            _ => Err(self.expected(":")),
        }
    }

    /// Parse the `${ }` substitutions of the template token at `span`.
    fn parse_template_substitutions(&mut self, span: Span) -> Result<Vec<Expr>, ParseError> {
        let mut substitutions = Vec::new();
        for (start, end) in template_substitution_ranges(self.source, span) {
            let mut parser = ParserState::with_range(self.source, start, end)?;
            parser.depth = self.depth;
            let expr = parser.parse_expression()?;
            if !parser.is_eof() {
                return Err(parser.unexpected());
            }
            substitutions.push(expr);
        }
        Ok(substitutions)
    }

    // =========================================================================
    // Functions
    // =========================================================================

    /// `function [name](params) [: Type] { body }`
    pub(crate) fn parse_function(&mut self, require_name: bool) -> Result<Function, ParseError> {
        let start = self.expect_keyword("function")?.span.start;
        self.eat("*")?;
        let name = if self.is_identifier() && !self.is_punct("(") {
            Some(self.parse_identifier()?)
        } else if require_name {
            return Err(ParseError::new("Expected identifier", self.error_span()));
        } else {
            None
        };
        let params = self.parse_formal_parameters()?;
        let return_type = if self.eat(":")? {
            Some(self.parse_type_annotation()?)
        } else {
            None
        };
        let body: Block = self.parse_block()?;
        Ok(Function {
            name,
            params,
            return_type,
            body: FunctionBody::Block(body),
            is_arrow: false,
            span: self.span_from(start),
        })
    }

    /// `( a, b: int, c = 1, ...rest )`
    pub(crate) fn parse_formal_parameters(&mut self) -> Result<Vec<Param>, ParseError> {
        self.expect("(")?;
        let mut params = Vec::new();
        while !self.is_punct(")") {
            self.eat("...")?;
            let name = self.parse_identifier()?;
            let type_annotation = if self.eat(":")? {
                Some(self.parse_type_annotation()?)
            } else {
                None
            };
            let default = if self.eat("=")? {
                Some(self.parse_assignment()?)
            } else {
                None
            };
            params.push(Param {
                name,
                type_annotation,
                default,
            });
            if !self.eat(",")? {
                break;
            }
        }
        self.expect(")")?;
        Ok(params)
    }
}

/// Byte ranges of the expressions inside `${ }` of a template literal.
fn template_substitution_ranges(source: &str, span: Span) -> Vec<(usize, usize)> {
    let raw = span.slice(source);
    let base = span.start as usize;
    let bytes = raw.as_bytes();
    let mut ranges = Vec::new();
    let mut i = 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'$' if bytes.get(i + 1) == Some(&b'{') => {
                let start = i + 2;
                let mut depth = 1usize;
                let mut j = start;
                while j < bytes.len() && depth > 0 {
                    match bytes[j] {
                        b'{' => depth += 1,
                        b'}' => depth -= 1,
                        quote @ (b'"' | b'\'' | b'`') => {
                            j += 1;
                            while j < bytes.len() && bytes[j] != quote {
                                if bytes[j] == b'\\' {
                                    j += 1;
                                }
                                j += 1;
                            }
                        }
                        _ => {}
                    }
                    j += 1;
                }
                ranges.push((base + start, base + j - 1));
                i = j;
            }
            _ => i += 1,
        }
    }
    ranges
}
