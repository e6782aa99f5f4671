//! A fncc compilation error

use std::io;

use fnc_parsing::lexer::LexingError;
use fnc_parsing::parser::SyntaxError;
use fnc_tokens::spanned::{Span, Spanned};
use fnc_tokens::SpannedError;
use thiserror::Error;

use crate::backend::BackendError;
use crate::lowering::LoweringError;

/// The kind of error
#[derive(Debug, Error)]
pub enum FnccErrorKind {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error(transparent)]
    Lowering(#[from] LoweringError),
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// An error occurred while attempting to compile a fnc file
#[derive(Debug, Error)]
#[error(transparent)]
pub struct FnccError(#[from] SpannedError<FnccErrorKind>);

impl FnccError {
    /// Creates a new [FnccError] using a quick constructor
    #[inline]
    pub fn new(error: impl Into<FnccErrorKind>, location: impl Into<Option<Span>>) -> Self {
        Self(SpannedError::new(error.into(), location))
    }

    pub fn kind(&self) -> &FnccErrorKind {
        self.0.error()
    }

    pub fn location(&self) -> Option<Span> {
        self.0.location()
    }

    /// Renders this error with the source lines around its location
    pub fn render(&self, origin: &str, source: &str) -> String {
        self.0.render(origin, source)
    }
}

impl From<io::Error> for FnccError {
    fn from(value: io::Error) -> Self {
        Self::new(value, None)
    }
}

impl From<SyntaxError> for FnccError {
    fn from(value: SyntaxError) -> Self {
        let span = value.span();
        Self::new(value, span)
    }
}

impl From<LexingError> for FnccError {
    fn from(value: LexingError) -> Self {
        SyntaxError::from(value).into()
    }
}

impl From<LoweringError> for FnccError {
    fn from(value: LoweringError) -> Self {
        let span = value.location();
        Self::new(value, span)
    }
}

impl From<BackendError> for FnccError {
    fn from(value: BackendError) -> Self {
        Self::new(value, None)
    }
}

/// A type alias for general results in fncc
pub type FnccResult<T> = Result<T, FnccError>;
