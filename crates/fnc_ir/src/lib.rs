//! An in-memory, basic block structured intermediate representation.
//!
//! A [Module] holds globals and functions. Functions are either declarations or are made up of
//! [BasicBlock]s, each a straight line of [Instruction]s closed by exactly one [Terminator].
//! Functions are put together with a [FunctionBuilder], which refuses to add anything to a block
//! once it has been terminated.
//!
//! The [Display](std::fmt::Display) implementation of [Module] produces textual llvm assembly.

pub use builder::FunctionBuilder;
pub use error::{IrError, IrResult};
pub use instruction::{BinaryOp, Instruction, IntPredicate, Terminator};
pub use module::{BasicBlock, BlockId, Function, Global, Module};
pub use types::{IrType, Signature};
pub use value::Value;

mod builder;
mod error;
mod instruction;
mod module;
mod names;
mod types;
mod value;
