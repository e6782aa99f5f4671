//! The fnc compiler.
//!
//! Source text goes through three complete passes: lexing and parsing with [fnc_parsing], then
//! [lowering] into an [fnc_ir::Module]. The module's llvm text is handed to a
//! [backend::NativeBackend] to produce an executable. [Fncc] drives the whole process for a file.

use fnc_ir::Module;
use fnc_parsing::{lexer, parser};
use tracing::{debug, debug_span};

pub mod backend;
mod compiler;
pub mod error;
pub mod lowering;

pub use compiler::*;
use error::FnccResult;

/// Runs the pipeline on some source text, producing the lowered module.
///
/// The first error of any stage is returned.
pub fn compile_source(source: &str) -> FnccResult<Module> {
    compile_module(source, lowering::DEFAULT_SOURCE_FILENAME)
}

/// Like [compile_source], recording `source_filename` in the module
pub fn compile_module(source: &str, source_filename: impl Into<String>) -> FnccResult<Module> {
    let tokens = debug_span!("lex").in_scope(|| lexer::tokenize(source))?;
    debug!("lexed {} tokens", tokens.len());
    let program = debug_span!("parse").in_scope(|| parser::parse(tokens))?;
    debug!("parsed {} top level statements", program.statements.len());
    let module = debug_span!("lower")
        .in_scope(|| lowering::Lowerer::new(source_filename).lower_program(&program))?;
    Ok(module)
}
