//! Instructions and terminators

use std::fmt::{Display, Formatter};

use itertools::Itertools;

use crate::module::BlockId;
use crate::names::write_name;
use crate::types::{IrType, Signature};
use crate::value::Value;

/// Integer arithmetic
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum BinaryOp {
    #[display(fmt = "add")]
    Add,
    #[display(fmt = "sub")]
    Sub,
    #[display(fmt = "mul")]
    Mul,
    #[display(fmt = "sdiv")]
    SDiv,
}

/// Signed integer comparisons
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum IntPredicate {
    #[display(fmt = "eq")]
    Eq,
    #[display(fmt = "ne")]
    Ne,
    #[display(fmt = "slt")]
    Slt,
    #[display(fmt = "sle")]
    Sle,
}

/// A non-terminating instruction
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    /// Stack slot for one value of `ty`, `result` is a pointer
    Alloca { result: Value, ty: IrType },
    Load {
        result: Value,
        ty: IrType,
        ptr: Value,
    },
    Store { value: Value, ptr: Value },
    Binary {
        result: Value,
        op: BinaryOp,
        lhs: Value,
        rhs: Value,
    },
    ICmp {
        result: Value,
        predicate: IntPredicate,
        lhs: Value,
        rhs: Value,
    },
    /// Zero extends an integer to the wider `result` type
    ZExt { result: Value, value: Value },
    Call {
        result: Option<Value>,
        signature: Signature,
        callee: String,
        args: Vec<Value>,
    },
}

impl Display for Instruction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Instruction::Alloca { result, ty } => write!(f, "{result} = alloca {ty}"),
            Instruction::Load { result, ty, ptr } => {
                write!(f, "{result} = load {ty}, {}", ptr.typed())
            }
            Instruction::Store { value, ptr } => {
                write!(f, "store {}, {}", value.typed(), ptr.typed())
            }
            Instruction::Binary {
                result,
                op,
                lhs,
                rhs,
            } => write!(f, "{result} = {op} {}, {rhs}", lhs.typed()),
            Instruction::ICmp {
                result,
                predicate,
                lhs,
                rhs,
            } => write!(f, "{result} = icmp {predicate} {}, {rhs}", lhs.typed()),
            Instruction::ZExt { result, value } => {
                write!(f, "{result} = zext {} to {}", value.typed(), result.ty())
            }
            Instruction::Call {
                result,
                signature,
                callee,
                args,
            } => {
                if let Some(result) = result {
                    write!(f, "{result} = ")?;
                }
                // variadic callees need the full function type at the call site
                if signature.variadic {
                    write!(f, "call {signature} @")?;
                } else {
                    write!(f, "call {} @", signature.ret)?;
                }
                write_name(f, callee)?;
                write!(f, "({})", args.iter().map(|arg| arg.typed()).join(", "))
            }
        }
    }
}

/// The single instruction closing a basic block
#[derive(Debug, Clone, PartialEq)]
pub enum Terminator {
    Br(BlockId),
    CondBr {
        cond: Value,
        then_block: BlockId,
        else_block: BlockId,
    },
    Ret(Option<Value>),
}

impl Terminator {
    /// The blocks control may continue to
    pub fn successors(&self) -> Vec<BlockId> {
        match self {
            Terminator::Br(target) => vec![*target],
            Terminator::CondBr {
                then_block,
                else_block,
                ..
            } => vec![*then_block, *else_block],
            Terminator::Ret(_) => vec![],
        }
    }
}
