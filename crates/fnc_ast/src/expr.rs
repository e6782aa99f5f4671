//! Expressions

use std::fmt::{Display, Formatter};

use fnc_tokens::spanned::{Span, Spanned};
use itertools::Itertools;

/// An expression
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    span: Span,
    pub kind: ExprKind,
}

impl Expr {
    pub fn new(span: Span, kind: ExprKind) -> Self {
        Self { span, kind }
    }

    pub fn integer(span: Span, value: i32) -> Self {
        Self::new(span, ExprKind::Integer(value))
    }

    pub fn var(span: Span, name: impl Into<String>) -> Self {
        Self::new(span, ExprKind::Var(name.into()))
    }

    /// Creates a binary expression spanning both operands
    pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Self {
        let span = lhs.span.join(rhs.span);
        Self::new(
            span,
            ExprKind::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
        )
    }

    pub fn call(span: Span, name: impl Into<String>, args: Vec<Expr>) -> Self {
        Self::new(
            span,
            ExprKind::Call {
                name: name.into(),
                args,
            },
        )
    }
}

impl Spanned for Expr {
    fn span(&self) -> Span {
        self.span
    }
}

/// Expression kind
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Integer(i32),
    Var(String),
    Call {
        name: String,
        args: Vec<Expr>,
    },
}

/// Binary operators.
///
/// There is no `>` or `>=`, those are parsed as [BinaryOp::Lt] and [BinaryOp::Le] with their
/// operands swapped.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    Ne,
    Lt,
    Le,
}

impl BinaryOp {
    /// Whether this operator produces a truth value instead of a number
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Le
        )
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
        }
    }
}

/// Fully parenthesized form, used mostly for debugging and tests
impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            ExprKind::Binary { op, lhs, rhs } => write!(f, "({lhs} {} {rhs})", op.symbol()),
            ExprKind::Integer(value) => write!(f, "{value}"),
            ExprKind::Var(name) => write!(f, "{name}"),
            ExprKind::Call { name, args } => write!(f, "{name}({})", args.iter().join(", ")),
        }
    }
}
