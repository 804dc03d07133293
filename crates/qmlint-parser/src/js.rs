//! JavaScript AST for binding expressions, functions and statements.

use crate::ast::{Ident, TypeAnnotation};
use qmlint_common::Span;

#[derive(Clone, Debug, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Expr { kind, span }
    }

    pub fn as_identifier(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::Identifier(name) => Some(name),
            _ => None,
        }
    }

    /// Flatten `a.b.c` into `[a, b, c]` with the span of each name.
    /// Returns `None` for anything but identifiers joined by `.`.
    pub fn as_member_path(&self) -> Option<Vec<(&str, Span)>> {
        let mut path = Vec::new();
        let mut current = self;
        loop {
            match &current.kind {
                ExprKind::Identifier(name) => {
                    path.push((name.as_str(), current.span));
                    break;
                }
                ExprKind::Member {
                    object,
                    property,
                    optional: false,
                } => {
                    path.push((property.name.as_str(), property.span));
                    current = object;
                }
                _ => return None,
            }
        }
        path.reverse();
        Some(path)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct StringLiteral {
    pub value: String,
    /// The raw literal contains a line terminator.
    pub multiline: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ExprKind {
    Identifier(String),
    This,
    Null,
    Bool(bool),
    Number(f64),
    String(StringLiteral),
    /// Substitutions of a template literal.
    Template(Vec<Expr>),
    Regex,
    Array(Vec<Expr>),
    /// An array hole, as in `[1, , 2]`.
    Elision,
    Object(Vec<ObjectProperty>),
    Function(Box<Function>),
    Member {
        object: Box<Expr>,
        property: Ident,
        optional: bool,
    },
    Index {
        object: Box<Expr>,
        index: Box<Expr>,
        optional: bool,
    },
    Call {
        callee: Box<Expr>,
        arguments: Vec<Expr>,
        optional: bool,
    },
    New {
        callee: Box<Expr>,
        arguments: Vec<Expr>,
    },
    Unary {
        op: &'static str,
        operand: Box<Expr>,
    },
    Update {
        op: &'static str,
        prefix: bool,
        operand: Box<Expr>,
    },
    Binary {
        op: &'static str,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Assign {
        op: &'static str,
        target: Box<Expr>,
        value: Box<Expr>,
    },
    Conditional {
        test: Box<Expr>,
        consequent: Box<Expr>,
        alternate: Box<Expr>,
    },
    Sequence(Vec<Expr>),
    Spread(Box<Expr>),
}

#[derive(Clone, Debug, PartialEq)]
pub enum PropertyKey {
    Identifier(Ident),
    String(String, Span),
    Number(f64, Span),
    Computed(Box<Expr>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct ObjectProperty {
    pub key: PropertyKey,
    pub value: Expr,
    /// `{ a }` rather than `{ a: a }`
    pub shorthand: bool,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Param {
    pub name: Ident,
    pub type_annotation: Option<TypeAnnotation>,
    pub default: Option<Expr>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Function {
    pub name: Option<Ident>,
    pub params: Vec<Param>,
    pub return_type: Option<TypeAnnotation>,
    pub body: FunctionBody,
    pub is_arrow: bool,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub enum FunctionBody {
    Block(Block),
    Expr(Box<Expr>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VarKind {
    Var,
    Let,
    Const,
}

#[derive(Clone, Debug, PartialEq)]
pub struct VarDeclarator {
    pub name: Ident,
    pub init: Option<Expr>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct VarDecl {
    pub kind: VarKind,
    pub declarators: Vec<VarDeclarator>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ForInit {
    Var(VarDecl),
    Expr(Expr),
}

#[derive(Clone, Debug, PartialEq)]
pub struct CatchClause {
    pub param: Option<Ident>,
    pub body: Block,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SwitchCase {
    pub test: Option<Expr>,
    pub body: Vec<Stmt>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub enum StmtKind {
    Expr(Expr),
    Var(VarDecl),
    Block(Block),
    If {
        test: Expr,
        consequent: Box<Stmt>,
        alternate: Option<Box<Stmt>>,
    },
    Return(Option<Expr>),
    For {
        init: Option<ForInit>,
        test: Option<Expr>,
        update: Option<Expr>,
        body: Box<Stmt>,
    },
    ForIn {
        left: ForInit,
        right: Expr,
        body: Box<Stmt>,
        of: bool,
    },
    While {
        test: Expr,
        body: Box<Stmt>,
    },
    DoWhile {
        body: Box<Stmt>,
        test: Expr,
    },
    Try {
        block: Block,
        handler: Option<CatchClause>,
        finalizer: Option<Block>,
    },
    Function(Function),
    Throw(Expr),
    Break(Option<Ident>),
    Continue(Option<Ident>),
    Switch {
        discriminant: Expr,
        cases: Vec<SwitchCase>,
    },
    Labeled {
        label: Ident,
        body: Box<Stmt>,
    },
    With {
        object: Expr,
        body: Box<Stmt>,
    },
    Empty,
}
