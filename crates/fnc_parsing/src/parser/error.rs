use fnc_tokens::spanned::{Span, Spanned};
use fnc_tokens::token::Token;

use crate::lexer::LexingError;

/// Represents an error occurring during parsing
#[derive(Debug, PartialEq, thiserror::Error)]
#[error("syntax error: {kind}")]
pub struct SyntaxError {
    pub kind: ErrorKind,
    pub span: Span,
}

impl SyntaxError {
    /// Creates a new error
    pub fn new(kind: ErrorKind, span: Span) -> Self {
        Self { kind, span }
    }
}

impl Spanned for SyntaxError {
    fn span(&self) -> Span {
        self.span
    }
}

impl From<LexingError> for SyntaxError {
    fn from(value: LexingError) -> Self {
        let span = value.span();
        Self::new(ErrorKind::Lex(value), span)
    }
}

/// [SyntaxError] kind
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum ErrorKind {
    #[error("expected {expected}, got {found}")]
    ExpectedToken { expected: String, found: Token },
    #[error("can not assign to `{0}`, only variables can be assigned to")]
    InvalidAssignmentTarget(String),
    #[error(transparent)]
    Lex(LexingError),
}

impl ErrorKind {
    pub fn expected_token(expected: impl AsRef<str>, found: Token) -> Self {
        Self::ExpectedToken {
            expected: expected.as_ref().to_string(),
            found,
        }
    }
}

pub type SyntaxResult<T = ()> = std::result::Result<T, SyntaxError>;
