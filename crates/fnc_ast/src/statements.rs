//! Statements

use fnc_tokens::spanned::{Span, Spanned};

use crate::expr::Expr;

/// A statement
#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    span: Span,
    pub kind: StmtKind,
}

impl Stmt {
    pub fn new(span: Span, kind: StmtKind) -> Self {
        Self { span, kind }
    }
}

impl Spanned for Stmt {
    fn span(&self) -> Span {
        self.span
    }
}

/// Statement kind
#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    Function(FunctionDef),
    Return(Expr),
    If(IfStmt),
    /// An unconditional loop, only left through `break`
    For(Box<Stmt>),
    Break,
    Block(Vec<Stmt>),
    Declare(DeclareStmt),
    Assign(AssignStmt),
    Expr(Expr),
}

/// A function definition
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    pub name: String,
    pub params: Vec<String>,
    pub body: Box<Stmt>,
}

/// A conditional
#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub cond: Expr,
    pub then_branch: Box<Stmt>,
    pub else_branch: Option<Box<Stmt>>,
}

/// `var name = init;`
#[derive(Debug, Clone, PartialEq)]
pub struct DeclareStmt {
    pub name: String,
    pub init: Expr,
}

/// Store into an existing variable
#[derive(Debug, Clone, PartialEq)]
pub struct AssignStmt {
    pub target: String,
    pub target_span: Span,
    pub value: Expr,
}
