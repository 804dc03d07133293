//! Parser state - document header, object definitions and members
use super::ParserState;
use crate::ParseError;
use crate::ast::{
    Annotation, Binding, BindingValue, Document, EnumDeclaration, EnumKey, Import, ImportTarget,
    InlineComponent, MethodDeclaration, ObjectDefinition, ObjectMember, Pragma,
    PropertyDeclaration, QualifiedName, SignalDeclaration, SignalParameter, Version,
};
use crate::js::{Stmt, StmtKind};
use crate::lexer::{TokenKind, parse_number, unescape_string};
use qmlint_common::Span;

impl<'a> ParserState<'a> {
    // =========================================================================
    // Document
    // =========================================================================

    /// Parse a complete document: pragmas and imports, then one root object.
    pub fn parse_document(&mut self) -> Result<Document, ParseError> {
        let mut pragmas = Vec::new();
        let mut imports = Vec::new();
        loop {
            if self.is_keyword("pragma") {
                pragmas.push(self.parse_pragma()?);
            } else if self.is_keyword("import") {
                imports.push(self.parse_import()?);
            } else {
                break;
            }
        }

        let annotations = self.parse_annotations()?;
        if self.is_eof() {
            return Err(ParseError::new(
                "Expected a root object definition",
                self.error_span(),
            ));
        }
        let root = self.parse_object_definition(annotations)?;
        if !self.is_eof() {
            return Err(self.unexpected());
        }

        Ok(Document {
            pragmas,
            imports,
            root,
            span: Span::new(0, self.source.len() as u32),
        })
    }

    fn parse_pragma(&mut self) -> Result<Pragma, ParseError> {
        let start = self.advance()?.span.start;
        let name = self.parse_identifier()?;
        let mut values = Vec::new();
        if self.eat(":")? {
            loop {
                values.push(self.parse_identifier()?);
                if !self.eat(",")? {
                    break;
                }
            }
        }
        let span = self.span_from(start);
        self.consume_semicolon()?;
        Ok(Pragma { name, values, span })
    }

    fn parse_import(&mut self) -> Result<Import, ParseError> {
        let start = self.advance()?.span.start;
        let target = if self.token.kind == TokenKind::String {
            let token = self.advance()?;
            ImportTarget::Path {
                path: unescape_string(self.token_text(token)),
                span: token.span,
            }
        } else if self.is_identifier() {
            ImportTarget::Module(self.parse_qualified_name()?)
        } else {
            return Err(ParseError::new(
                "Expected a module name or a path after import",
                self.error_span(),
            ));
        };

        let version = if self.token.kind == TokenKind::Number && !self.token.newline_before {
            let token = self.advance()?;
            let text = self.token_text(token);
            Some(Version::parse(text).ok_or_else(|| {
                ParseError::new(format!("Invalid import version '{text}'"), token.span)
            })?)
        } else {
            None
        };

        let qualifier = if self.is_keyword("as") && !self.token.newline_before {
            self.advance()?;
            Some(self.parse_identifier()?)
        } else {
            None
        };

        let span = self.span_from(start);
        self.consume_semicolon()?;
        Ok(Import {
            target,
            version,
            qualifier,
            span,
        })
    }

    fn parse_annotations(&mut self) -> Result<Vec<Annotation>, ParseError> {
        let mut annotations = Vec::new();
        while self.is_punct("@") {
            let start = self.advance()?.span.start;
            let name = self.parse_qualified_name()?;
            self.expect("{")?;
            let mut bindings = Vec::new();
            while !self.is_punct("}") {
                if self.eat(";")? {
                    continue;
                }
                let binding_start = self.token.span.start;
                let binding_name = self.parse_qualified_name()?;
                self.expect(":")?;
                let value = self.parse_binding_value()?;
                bindings.push(Binding {
                    name: binding_name,
                    value,
                    span: self.span_from(binding_start),
                });
            }
            self.expect("}")?;
            annotations.push(Annotation {
                name,
                bindings,
                span: self.span_from(start),
            });
        }
        Ok(annotations)
    }

    // =========================================================================
    // Objects
    // =========================================================================

    fn parse_object_definition(
        &mut self,
        annotations: Vec<Annotation>,
    ) -> Result<ObjectDefinition, ParseError> {
        let type_name = self.parse_qualified_name()?;
        let on_target = if self.is_keyword("on") {
            self.advance()?;
            Some(self.parse_qualified_name()?)
        } else {
            None
        };
        self.parse_object_rest(type_name, on_target, annotations)
    }

    /// Parse the `{ ... }` of an object whose type name was already read.
    fn parse_object_rest(
        &mut self,
        type_name: QualifiedName,
        on_target: Option<QualifiedName>,
        annotations: Vec<Annotation>,
    ) -> Result<ObjectDefinition, ParseError> {
        let start = annotations
            .first()
            .map(|a| a.span.start)
            .unwrap_or(type_name.span.start);
        let members = self.parse_object_body()?;
        Ok(ObjectDefinition {
            type_name,
            on_target,
            members,
            annotations,
            span: self.span_from(start),
        })
    }

    fn parse_object_body(&mut self) -> Result<Vec<ObjectMember>, ParseError> {
        self.enter()?;
        let result = self.parse_object_body_inner();
        self.leave();
        result
    }

    fn parse_object_body_inner(&mut self) -> Result<Vec<ObjectMember>, ParseError> {
        self.expect("{")?;
        let mut members = Vec::new();
        loop {
            if self.eat("}")? {
                break;
            }
            if self.is_eof() {
                return Err(self.expected("}"));
            }
            if self.eat(";")? {
                continue;
            }
            members.push(self.parse_member()?);
        }
        Ok(members)
    }

    fn parse_member(&mut self) -> Result<ObjectMember, ParseError> {
        let annotations = self.parse_annotations()?;
        if !self.is_identifier() {
            return Err(self.unexpected());
        }

        let next = self.peek()?;
        if next.kind == TokenKind::Identifier {
            let next_text = self.token_text(next);
            match self.text() {
                "property" => return self.parse_property_declaration(annotations),
                "default" | "readonly" => return self.parse_property_declaration(annotations),
                "required" => {
                    if matches!(next_text, "property" | "default" | "readonly") {
                        return self.parse_property_declaration(annotations);
                    }
                    self.advance()?;
                    let name = self.parse_identifier()?;
                    self.consume_semicolon()?;
                    return Ok(ObjectMember::Required(name));
                }
                "signal" => return self.parse_signal_declaration(annotations),
                "function" => {
                    let function = self.parse_function(true)?;
                    return Ok(ObjectMember::Method(MethodDeclaration {
                        function,
                        annotations,
                    }));
                }
                "enum" => return self.parse_enum_declaration(),
                "component" => return self.parse_inline_component(),
                _ => {}
            }
        }

        let start = self.token.span.start;
        let name = self.parse_qualified_name()?;
        if self.eat(":")? {
            let value = self.parse_binding_value()?;
            return Ok(ObjectMember::Binding(Binding {
                name,
                value,
                span: self.span_from(start),
            }));
        }
        if self.is_punct("{") {
            if name.names_type() {
                return Ok(ObjectMember::Object(
                    self.parse_object_rest(name, None, annotations)?,
                ));
            }
            let body_start = self.token.span.start;
            let members = self.parse_object_body()?;
            let span = self.span_from(body_start);
            return Ok(ObjectMember::Binding(Binding {
                name,
                value: BindingValue::Group { members, span },
                span: self.span_from(start),
            }));
        }
        if self.is_keyword("on") {
            self.advance()?;
            let target = self.parse_qualified_name()?;
            return Ok(ObjectMember::Object(self.parse_object_rest(
                name,
                Some(target),
                annotations,
            )?));
        }
        Err(self.expected(":"))
    }

    /// The right-hand side of `name:`: an object, a list of objects or a
    /// script.
    pub(crate) fn parse_binding_value(&mut self) -> Result<BindingValue, ParseError> {
        if self.is_identifier() {
            let saved = self.clone();
            if let Ok(name) = self.parse_qualified_name() {
                if name.names_type() && (self.is_punct("{") || self.is_keyword("on")) {
                    let on_target = if self.is_keyword("on") {
                        self.advance()?;
                        Some(self.parse_qualified_name()?)
                    } else {
                        None
                    };
                    let object = self.parse_object_rest(name, on_target, Vec::new())?;
                    return Ok(BindingValue::Object(Box::new(object)));
                }
            }
            *self = saved;
        }

        if self.is_punct("[") {
            let saved = self.clone();
            let start = self.advance()?.span.start;
            if let Some(objects) = self.try_parse_object_list()? {
                return Ok(BindingValue::ObjectList {
                    objects,
                    span: self.span_from(start),
                });
            }
            *self = saved;
        }

        Ok(BindingValue::Script(Box::new(self.parse_script_statement()?)))
    }

    /// After `[`: `Type { } , Type { } ]`, or `None` when the list is a
    /// script array.
    fn try_parse_object_list(&mut self) -> Result<Option<Vec<ObjectDefinition>>, ParseError> {
        let mut objects = Vec::new();
        loop {
            if !self.is_identifier() {
                return Ok(None);
            }
            let Ok(name) = self.parse_qualified_name() else {
                return Ok(None);
            };
            if !name.names_type() || !self.is_punct("{") {
                return Ok(None);
            }
            objects.push(self.parse_object_rest(name, None, Vec::new())?);
            if !self.eat(",")? {
                break;
            }
        }
        self.expect("]")?;
        Ok(Some(objects))
    }

    /// A script binding: a block, or a statement ended by ASI.
    fn parse_script_statement(&mut self) -> Result<Stmt, ParseError> {
        if self.is_keyword("function") || self.starts_object_literal()? {
            let start = self.token.span.start;
            let expr = self.parse_expression()?;
            self.consume_semicolon()?;
            return Ok(Stmt {
                kind: StmtKind::Expr(expr),
                span: self.span_from(start),
            });
        }
        self.parse_statement()
    }

    /// `{ "key": ...` or `{}` in binding position is an object literal
    /// (type descriptor files use this for enum values).
    fn starts_object_literal(&self) -> Result<bool, ParseError> {
        if !self.is_punct("{") {
            return Ok(false);
        }
        let mut lexer = self.lexer;
        let first = lexer.next_token()?;
        if first.kind == TokenKind::String {
            let second = lexer.next_token()?;
            return Ok(second.kind == TokenKind::Punct && self.token_text(second) == ":");
        }
        Ok(false)
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    fn parse_property_declaration(
        &mut self,
        annotations: Vec<Annotation>,
    ) -> Result<ObjectMember, ParseError> {
        let start = annotations
            .first()
            .map(|a| a.span.start)
            .unwrap_or(self.token.span.start);
        let mut is_default = false;
        let mut is_required = false;
        let mut is_readonly = false;
        loop {
            match self.text() {
                "default" if self.is_identifier() => is_default = true,
                "required" if self.is_identifier() => is_required = true,
                "readonly" if self.is_identifier() => is_readonly = true,
                _ => break,
            }
            self.advance()?;
        }
        self.expect_keyword("property")?;
        let type_annotation = self.parse_type_annotation()?;
        let name = self.parse_identifier()?;
        let value = if self.eat(":")? {
            Some(self.parse_binding_value()?)
        } else {
            self.consume_semicolon()?;
            None
        };
        Ok(ObjectMember::Property(PropertyDeclaration {
            name,
            type_annotation,
            is_default,
            is_required,
            is_readonly,
            value,
            annotations,
            span: self.span_from(start),
        }))
    }

    fn parse_signal_declaration(
        &mut self,
        annotations: Vec<Annotation>,
    ) -> Result<ObjectMember, ParseError> {
        let start = self.advance()?.span.start;
        let name = self.parse_identifier()?;
        let mut parameters = Vec::new();
        if self.eat("(")? {
            while !self.is_punct(")") {
                parameters.push(self.parse_signal_parameter()?);
                if !self.eat(",")? {
                    break;
                }
            }
            self.expect(")")?;
        }
        let span = self.span_from(start);
        self.consume_semicolon()?;
        Ok(ObjectMember::Signal(SignalDeclaration {
            name,
            parameters,
            annotations,
            span,
        }))
    }

    /// `type name`, `name: type` or a bare `name`.
    fn parse_signal_parameter(&mut self) -> Result<SignalParameter, ParseError> {
        if self.is_identifier() && self.peek_is_punct(":")? {
            let name = self.parse_identifier()?;
            self.advance()?;
            let type_annotation = Some(self.parse_type_annotation()?);
            return Ok(SignalParameter {
                name,
                type_annotation,
            });
        }
        let type_annotation = self.parse_type_annotation()?;
        if self.is_identifier() {
            let name = self.parse_identifier()?;
            return Ok(SignalParameter {
                name,
                type_annotation: Some(type_annotation),
            });
        }
        if type_annotation.is_list || type_annotation.name.len() != 1 {
            return Err(ParseError::new("Expected identifier", self.error_span()));
        }
        Ok(SignalParameter {
            name: type_annotation.name.first().clone(),
            type_annotation: None,
        })
    }

    fn parse_enum_declaration(&mut self) -> Result<ObjectMember, ParseError> {
        let start = self.advance()?.span.start;
        let name = self.parse_identifier()?;
        self.expect("{")?;
        let mut keys = Vec::new();
        while !self.is_punct("}") {
            let key = self.parse_identifier()?;
            let value = if self.eat("=")? {
                let negative = self.eat("-")?;
                if self.token.kind != TokenKind::Number {
                    return Err(ParseError::new(
                        "Expected a number as enum value",
                        self.error_span(),
                    ));
                }
                let token = self.advance()?;
                let value = parse_number(self.token_text(token));
                Some(if negative { -value } else { value })
            } else {
                None
            };
            keys.push(EnumKey { name: key, value });
            if !self.eat(",")? {
                break;
            }
        }
        self.expect("}")?;
        Ok(ObjectMember::Enum(EnumDeclaration {
            name,
            keys,
            span: self.span_from(start),
        }))
    }

    fn parse_inline_component(&mut self) -> Result<ObjectMember, ParseError> {
        let start = self.advance()?.span.start;
        let name = self.parse_identifier()?;
        self.expect(":")?;
        let annotations = self.parse_annotations()?;
        let object = self.parse_object_definition(annotations)?;
        Ok(ObjectMember::InlineComponent(InlineComponent {
            name,
            object,
            span: self.span_from(start),
        }))
    }
}

