//! A lexical token from a source file

use std::fmt::{Debug, Display, Formatter};

use strum::{EnumIter, IntoStaticStr};

use crate::spanned::{Span, Spanned};

/// A lexical token from a source file
#[derive(Clone)]
pub struct Token {
    span: Span,
    kind: TokenKind,
}

impl Token {
    /// Creates a new token
    pub fn new(span: Span, kind: TokenKind) -> Self {
        Self { span, kind }
    }

    /// Gets the kind for this token
    pub fn kind(&self) -> &TokenKind {
        &self.kind
    }

    /// Consumes this token, returning its kind
    pub fn into_kind(self) -> TokenKind {
        self.kind
    }

    /// The text this token was read from. Empty for [TokenKind::Eof].
    pub fn lexeme(&self) -> String {
        self.kind.lexeme()
    }

    pub fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }
}

impl Debug for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(&self.kind, f)
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.kind, f)
    }
}

impl Spanned for Token {
    fn span(&self) -> Span {
        self.span
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

/// The kind for this token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Keyword(Keyword),
    Punct(Punct),
    Identifier(String),
    Integer(i32),
    /// EOF, will only appear at the end of a token sequence
    Eof,
}

impl TokenKind {
    pub fn lexeme(&self) -> String {
        match self {
            TokenKind::Keyword(keyword) => keyword.as_str().to_string(),
            TokenKind::Punct(punct) => punct.as_str().to_string(),
            TokenKind::Identifier(id) => id.clone(),
            TokenKind::Integer(value) => value.to_string(),
            TokenKind::Eof => String::new(),
        }
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::Eof => write!(f, "end of input"),
            TokenKind::Identifier(id) => write!(f, "identifier `{id}`"),
            TokenKind::Integer(value) => write!(f, "integer `{value}`"),
            other => write!(f, "`{}`", other.lexeme()),
        }
    }
}

/// Reserved words
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum Keyword {
    Var,
    Return,
    If,
    Else,
    Fnc,
    For,
    Break,
}

impl Keyword {
    pub fn as_str(&self) -> &'static str {
        (*self).into()
    }
}

/// Operators and punctuation
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, EnumIter, IntoStaticStr)]
pub enum Punct {
    /// `==`
    #[strum(serialize = "==")]
    Eq,
    /// `!=`
    #[strum(serialize = "!=")]
    Neq,
    /// `<=`
    #[strum(serialize = "<=")]
    Lte,
    /// `>=`
    #[strum(serialize = ">=")]
    Gte,
    #[strum(serialize = "+")]
    Plus,
    #[strum(serialize = "-")]
    Minus,
    #[strum(serialize = "*")]
    Star,
    #[strum(serialize = "/")]
    Slash,
    #[strum(serialize = "(")]
    LParen,
    #[strum(serialize = ")")]
    RParen,
    /// `=`
    #[strum(serialize = "=")]
    Assign,
    #[strum(serialize = "<")]
    Lt,
    #[strum(serialize = ">")]
    Gt,
    #[strum(serialize = ";")]
    SemiColon,
    #[strum(serialize = "{")]
    LCurly,
    #[strum(serialize = "}")]
    RCurly,
    #[strum(serialize = ",")]
    Comma,
}

impl Punct {
    pub fn as_str(&self) -> &'static str {
        (*self).into()
    }
}
