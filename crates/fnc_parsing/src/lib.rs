//! Lexing and parsing of fnc source text.
//!
//! The front end runs in two complete passes: [lexer::tokenize] turns the source into a vector
//! of tokens ending with a single [TokenKind::Eof](fnc_tokens::token::TokenKind::Eof), then
//! [parser::parse] builds a [Program] from it.

use fnc_ast::Program;
use tracing::debug;

pub mod lexer;
pub mod parser;

/// Lexes and parses some source text, performing no analysis.
pub fn parse_source(source: &str) -> parser::SyntaxResult<Program> {
    let tokens = lexer::tokenize(source)?;
    debug!("lexed {} tokens", tokens.len());
    let program = parser::parse(tokens)?;
    debug!("parsed {} top level statements", program.statements.len());
    Ok(program)
}
