use fnc_ir::IrError;
use fnc_tokens::spanned::Span;
use thiserror::Error;

/// An error raised while lowering a program into ir
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LoweringError {
    #[error("undefined variable `{name}`")]
    UndefinedVariable { name: String, span: Span },
    #[error("undefined function `{name}`")]
    UndefinedFunction { name: String, span: Span },
    #[error("`break` outside of a loop")]
    BreakOutsideLoop { span: Span },
    #[error("can not assign to parameter `{name}`")]
    AssignToParameter { name: String, span: Span },
    #[error("`{name}` takes {expected} argument(s) but {found} were given")]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
        span: Span,
    },
    #[error(transparent)]
    Ir(#[from] IrError),
}

impl LoweringError {
    /// Where in the source this error occurred, if known
    pub fn location(&self) -> Option<Span> {
        match self {
            LoweringError::UndefinedVariable { span, .. }
            | LoweringError::UndefinedFunction { span, .. }
            | LoweringError::BreakOutsideLoop { span }
            | LoweringError::AssignToParameter { span, .. }
            | LoweringError::ArityMismatch { span, .. } => Some(*span),
            LoweringError::Ir(_) => None,
        }
    }
}

pub type LoweringResult<T = ()> = Result<T, LoweringError>;
