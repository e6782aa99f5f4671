//! The abstract syntax tree of the fnc language.
//!
//! A [Program] is the ordered list of top level statements. Every node owns its children, so
//! the tree never shares subtrees.

pub mod expr;
pub mod statements;

pub use fnc_tokens::spanned::{Span, Spanned};

use statements::Stmt;

/// A parsed source file
#[derive(Debug, Default)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

impl Program {
    pub fn new(statements: Vec<Stmt>) -> Self {
        Self { statements }
    }
}
