//! Parser state - JavaScript statements
use super::ParserState;
use super::state_expressions::is_reserved_word;
use crate::ParseError;
use crate::js::{
    Block, CatchClause, ForInit, Stmt, StmtKind, SwitchCase, VarDecl, VarDeclarator, VarKind,
};

impl<'a> ParserState<'a> {
    // =========================================================================
    // Parse Methods - Statements
    // =========================================================================

    /// Parse a statement
    pub(crate) fn parse_statement(&mut self) -> Result<Stmt, ParseError> {
        self.enter()?;
        let result = self.parse_statement_inner();
        self.leave();
        result
    }

    fn parse_statement_inner(&mut self) -> Result<Stmt, ParseError> {
        let start = self.token.span.start;
        if self.is_punct("{") {
            let block = self.parse_block()?;
            let span = block.span;
            return Ok(Stmt {
                kind: StmtKind::Block(block),
                span,
            });
        }
        if self.eat(";")? {
            return Ok(Stmt {
                kind: StmtKind::Empty,
                span: self.span_from(start),
            });
        }

        if self.is_identifier() {
            match self.text() {
                "var" | "const" => return self.parse_variable_statement(),
                "let" if self.peek()?.kind == crate::lexer::TokenKind::Identifier => {
                    return self.parse_variable_statement();
                }
                "if" => return self.parse_if_statement(),
                "for" => return self.parse_for_statement(),
                "while" => return self.parse_while_statement(),
                "with" => return self.parse_with_statement(),
                "do" => return self.parse_do_statement(),
                "return" => return self.parse_return_statement(),
                "break" | "continue" => return self.parse_break_or_continue(),
                "throw" => return self.parse_throw_statement(),
                "try" => return self.parse_try_statement(),
                "switch" => return self.parse_switch_statement(),
                "function" => {
                    let function = self.parse_function(true)?;
                    let span = function.span;
                    return Ok(Stmt {
                        kind: StmtKind::Function(function),
                        span,
                    });
                }
                name if !is_reserved_word(name) && self.peek_is_punct(":")? => {
                    let label = self.parse_identifier()?;
                    self.expect(":")?;
                    let body = self.parse_statement()?;
                    return Ok(Stmt {
                        kind: StmtKind::Labeled {
                            label,
                            body: Box::new(body),
                        },
                        span: self.span_from(start),
                    });
                }
                _ => {}
            }
        }

        let expr = self.parse_expression()?;
        self.consume_semicolon()?;
        Ok(Stmt {
            kind: StmtKind::Expr(expr),
            span: self.span_from(start),
        })
    }

    /// `{ statements }`
    pub(crate) fn parse_block(&mut self) -> Result<Block, ParseError> {
        let start = self.expect("{")?.span.start;
        let mut stmts = Vec::new();
        while !self.is_punct("}") {
            if self.is_eof() {
                return Err(self.expected("}"));
            }
            stmts.push(self.parse_statement()?);
        }
        self.expect("}")?;
        Ok(Block {
            stmts,
            span: self.span_from(start),
        })
    }

    fn parse_variable_statement(&mut self) -> Result<Stmt, ParseError> {
        let start = self.token.span.start;
        let decl = self.parse_var_decl()?;
        self.consume_semicolon()?;
        Ok(Stmt {
            kind: StmtKind::Var(decl),
            span: self.span_from(start),
        })
    }

    /// `var a = 1, b` without the terminating semicolon.
    fn parse_var_decl(&mut self) -> Result<VarDecl, ParseError> {
        let start = self.token.span.start;
        let kind = match self.text() {
            "let" => VarKind::Let,
            "const" => VarKind::Const,
            _ => VarKind::Var,
        };
        self.advance()?;
        let mut declarators = Vec::new();
        loop {
            let name = self.parse_identifier()?;
            if self.eat(":")? {
                self.parse_type_annotation()?;
            }
            let init = if self.eat("=")? {
                Some(self.parse_assignment()?)
            } else {
                None
            };
            declarators.push(VarDeclarator { name, init });
            if !self.eat(",")? {
                break;
            }
        }
        Ok(VarDecl {
            kind,
            declarators,
            span: self.span_from(start),
        })
    }

    fn parse_parenthesized(&mut self) -> Result<crate::js::Expr, ParseError> {
        self.expect("(")?;
        let expr = self.parse_expression()?;
        self.expect(")")?;
        Ok(expr)
    }

    fn parse_if_statement(&mut self) -> Result<Stmt, ParseError> {
        let start = self.advance()?.span.start;
        let test = self.parse_parenthesized()?;
        let consequent = self.parse_statement()?;
        let alternate = if self.is_keyword("else") {
            self.advance()?;
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };
        Ok(Stmt {
            kind: StmtKind::If {
                test,
                consequent: Box::new(consequent),
                alternate,
            },
            span: self.span_from(start),
        })
    }

    fn parse_for_statement(&mut self) -> Result<Stmt, ParseError> {
        let start = self.advance()?.span.start;
        self.expect("(")?;

        let saved_no_in = self.no_in;
        self.no_in = true;
        let init = (|| -> Result<Option<ForInit>, ParseError> {
            if self.is_punct(";") {
                return Ok(None);
            }
            if self.is_keyword("var") || self.is_keyword("let") || self.is_keyword("const") {
                return Ok(Some(ForInit::Var(self.parse_var_decl()?)));
            }
            Ok(Some(ForInit::Expr(self.parse_expression()?)))
        })();
        self.no_in = saved_no_in;
        let init = init?;

        if let Some(left) = init.as_ref().filter(|_| self.is_keyword("in") || self.is_keyword("of")) {
            let of = self.is_keyword("of");
            self.advance()?;
            let left = left.clone();
            let right = if of {
                self.parse_assignment()?
            } else {
                self.parse_expression()?
            };
            self.expect(")")?;
            let body = self.parse_statement()?;
            return Ok(Stmt {
                kind: StmtKind::ForIn {
                    left,
                    right,
                    body: Box::new(body),
                    of,
                },
                span: self.span_from(start),
            });
        }

        self.expect(";")?;
        let test = if self.is_punct(";") {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(";")?;
        let update = if self.is_punct(")") {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(")")?;
        let body = self.parse_statement()?;
        Ok(Stmt {
            kind: StmtKind::For {
                init,
                test,
                update,
                body: Box::new(body),
            },
            span: self.span_from(start),
        })
    }

    fn parse_while_statement(&mut self) -> Result<Stmt, ParseError> {
        let start = self.advance()?.span.start;
        let test = self.parse_parenthesized()?;
        let body = self.parse_statement()?;
        Ok(Stmt {
            kind: StmtKind::While {
                test,
                body: Box::new(body),
            },
            span: self.span_from(start),
        })
    }

    fn parse_with_statement(&mut self) -> Result<Stmt, ParseError> {
        let start = self.advance()?.span.start;
        let object = self.parse_parenthesized()?;
        let body = self.parse_statement()?;
        Ok(Stmt {
            kind: StmtKind::With {
                object,
                body: Box::new(body),
            },
            span: self.span_from(start),
        })
    }

    fn parse_do_statement(&mut self) -> Result<Stmt, ParseError> {
        let start = self.advance()?.span.start;
        let body = self.parse_statement()?;
        self.expect_keyword("while")?;
        let test = self.parse_parenthesized()?;
        self.eat(";")?;
        Ok(Stmt {
            kind: StmtKind::DoWhile {
                body: Box::new(body),
                test,
            },
            span: self.span_from(start),
        })
    }

    fn parse_return_statement(&mut self) -> Result<Stmt, ParseError> {
        let start = self.advance()?.span.start;
        let argument = if self.is_punct(";")
            || self.is_punct("}")
            || self.is_eof()
            || self.token.newline_before
        {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.consume_semicolon()?;
        Ok(Stmt {
            kind: StmtKind::Return(argument),
            span: self.span_from(start),
        })
    }

    fn parse_break_or_continue(&mut self) -> Result<Stmt, ParseError> {
        let keyword = self.advance()?;
        let is_break = self.token_text(keyword) == "break";
        let label = if self.is_identifier() && !self.token.newline_before {
            Some(self.parse_identifier()?)
        } else {
            None
        };
        self.consume_semicolon()?;
        let kind = if is_break {
            StmtKind::Break(label)
        } else {
            StmtKind::Continue(label)
        };
        Ok(Stmt {
            kind,
            span: self.span_from(keyword.span.start),
        })
    }

    fn parse_throw_statement(&mut self) -> Result<Stmt, ParseError> {
        let start = self.advance()?.span.start;
        if self.token.newline_before {
            return Err(self.unexpected());
        }
        let argument = self.parse_expression()?;
        self.consume_semicolon()?;
        Ok(Stmt {
            kind: StmtKind::Throw(argument),
            span: self.span_from(start),
        })
    }

    fn parse_try_statement(&mut self) -> Result<Stmt, ParseError> {
        let start = self.advance()?.span.start;
        let block = self.parse_block()?;
        let handler = if self.is_keyword("catch") {
            let catch_start = self.advance()?.span.start;
            let param = if self.eat("(")? {
                let param = self.parse_identifier()?;
                self.expect(")")?;
                Some(param)
            } else {
                None
            };
            let body = self.parse_block()?;
            Some(CatchClause {
                param,
                body,
                span: self.span_from(catch_start),
            })
        } else {
            None
        };
        let finalizer = if self.is_keyword("finally") {
            self.advance()?;
            Some(self.parse_block()?)
        } else {
            None
        };
        if handler.is_none() && finalizer.is_none() {
            return Err(self.expected("catch"));
        }
        Ok(Stmt {
            kind: StmtKind::Try {
                block,
                handler,
                finalizer,
            },
            span: self.span_from(start),
        })
    }

    fn parse_switch_statement(&mut self) -> Result<Stmt, ParseError> {
        let start = self.advance()?.span.start;
        let discriminant = self.parse_parenthesized()?;
        self.expect("{")?;
        let mut cases = Vec::new();
        while !self.is_punct("}") {
            let case_start = self.token.span.start;
            let test = if self.is_keyword("case") {
                self.advance()?;
                Some(self.parse_expression()?)
            } else if self.is_keyword("default") {
                self.advance()?;
                None
            } else {
                return Err(self.unexpected());
            };
            self.expect(":")?;
            let mut body = Vec::new();
            while !self.is_punct("}") && !self.is_keyword("case") && !self.is_keyword("default") {
                if self.is_eof() {
                    return Err(self.expected("}"));
                }
                body.push(self.parse_statement()?);
            }
            cases.push(SwitchCase {
                test,
                body,
                span: self.span_from(case_start),
            });
        }
        self.expect("}")?;
        Ok(Stmt {
            kind: StmtKind::Switch {
                discriminant,
                cases,
            },
            span: self.span_from(start),
        })
    }
}
