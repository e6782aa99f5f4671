//! Responsible with converting source text into a token sequence

use fnc_tokens::spanned::{Span, Spanned};
use fnc_tokens::token::{Token, TokenKind};
use thiserror::Error;
use tracing::trace;

use crate::lexer::token_parsing::parse_token;

mod token_parsing;

/// Lexes the entire source, returning every token followed by exactly one [TokenKind::Eof].
pub fn tokenize(source: &str) -> LexResult<Vec<Token>> {
    Lexer::new(source).collect()
}

/// Responsible with converting source text into a token stream.
///
/// The lexer yields one [TokenKind::Eof] token after the last real token and then ends. The
/// stream also ends after the first error.
#[derive(Debug)]
pub struct Lexer<'s> {
    source: &'s str,
    offset: usize,
    line: usize,
    col: usize,
    finished: bool,
}

impl<'s> Lexer<'s> {
    /// Creates a new lexer
    pub fn new(source: &'s str) -> Self {
        Self {
            source,
            offset: 0,
            line: 1,
            col: 1,
            finished: false,
        }
    }

    fn rest(&self) -> &'s str {
        &self.source[self.offset..]
    }

    fn span_of(&self, len: usize) -> Span {
        Span::new(self.offset, len, self.line, self.col)
    }

    /// Moves past `len` bytes of the remaining input, keeping line and column in step.
    fn advance(&mut self, len: usize) {
        for c in self.source[self.offset..self.offset + len].chars() {
            if c == '\n' {
                self.line += 1;
                self.col = 1;
            } else {
                self.col += 1;
            }
        }
        self.offset += len;
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        let trimmed = rest.trim_start_matches(char::is_whitespace);
        self.advance(rest.len() - trimmed.len());
    }

    fn next_token(&mut self) -> LexResult<Token> {
        self.skip_whitespace();
        let rest = self.rest();
        if rest.is_empty() {
            return Ok(Token::new(self.span_of(0), TokenKind::Eof));
        }
        match parse_token(rest) {
            Ok((remaining, kind)) => {
                let len = rest.len() - remaining.len();
                let token = Token::new(self.span_of(len), kind);
                self.advance(len);
                Ok(token)
            }
            Err(nom::Err::Failure(_)) => {
                let literal = rest
                    .chars()
                    .take_while(|c| c.is_ascii_digit())
                    .collect::<String>();
                Err(LexingError::IntegerOutOfRange {
                    span: self.span_of(literal.len()),
                    literal,
                })
            }
            Err(_) => {
                // rest is non-empty so there is always a char here
                let ch = rest.chars().next().unwrap_or_default();
                Err(LexingError::InvalidChar {
                    ch,
                    span: self.span_of(ch.len_utf8()),
                })
            }
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = LexResult<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let next = self.next_token();
        match &next {
            Ok(token) => {
                trace!("lexed {:?} at {}", token, token.span());
                if token.is_eof() {
                    self.finished = true;
                }
            }
            Err(_) => self.finished = true,
        }
        Some(next)
    }
}

pub type LexResult<T> = Result<T, LexingError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexingError {
    /// Invalid char
    #[error("invalid char: {ch:?}")]
    InvalidChar { ch: char, span: Span },
    #[error("integer literal {literal} does not fit in a 32-bit signed integer")]
    IntegerOutOfRange { literal: String, span: Span },
}

impl Spanned for LexingError {
    fn span(&self) -> Span {
        match self {
            LexingError::InvalidChar { span, .. } => *span,
            LexingError::IntegerOutOfRange { span, .. } => *span,
        }
    }
}
