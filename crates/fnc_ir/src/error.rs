use thiserror::Error;

use crate::module::BlockId;

/// Errors raised while building ir
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IrError {
    #[error("block {label} in {function} is already terminated")]
    BlockTerminated { function: String, label: String },
    #[error("block {label} in {function} was never terminated")]
    UnterminatedBlock { function: String, label: String },
    #[error("{function} has no block {block}")]
    UnknownBlock { function: String, block: BlockId },
}

pub type IrResult<T = ()> = Result<T, IrError>;
