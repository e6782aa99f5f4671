use fnc_common::nom_helpers::{recognize_word, word_tag};
use fnc_tokens::token::{Keyword, Punct, TokenKind};
use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::character::complete::{char, digit1, satisfy};
use nom::combinator::{cut, map, map_res, peek, value};
use nom::sequence::preceded;
use nom::IResult;

pub(super) type Result<'a, O> = IResult<&'a str, O>;

/// Parses a single token from the start of `src`, which must not start with whitespace.
///
/// Multi character operators and keywords are tried before identifiers and single character
/// punctuation.
pub(super) fn parse_token(src: &str) -> Result<'_, TokenKind> {
    alt((parse_operator, parse_word, parse_punctuation, parse_integer))(src)
}

fn parse_operator(src: &str) -> Result<'_, TokenKind> {
    map(
        alt((
            value(Punct::Eq, tag("==")),
            value(Punct::Neq, tag("!=")),
            value(Punct::Lte, tag("<=")),
            value(Punct::Gte, tag(">=")),
        )),
        TokenKind::Punct,
    )(src)
}

fn parse_word(src: &str) -> Result<'_, TokenKind> {
    alt((parse_keyword, parse_identifier))(src)
}

fn parse_keyword(src: &str) -> Result<'_, TokenKind> {
    map(
        alt((
            value(Keyword::Var, word_tag("var")),
            value(Keyword::Return, word_tag("return")),
            value(Keyword::If, word_tag("if")),
            value(Keyword::Else, word_tag("else")),
            value(Keyword::Fnc, word_tag("fnc")),
            value(Keyword::For, word_tag("for")),
            value(Keyword::Break, word_tag("break")),
        )),
        TokenKind::Keyword,
    )(src)
}

fn parse_identifier(src: &str) -> Result<'_, TokenKind> {
    map(recognize_word, |id: &str| TokenKind::Identifier(id.to_string()))(src)
}

fn parse_punctuation(src: &str) -> Result<'_, TokenKind> {
    map(
        alt((
            value(Punct::Plus, char('+')),
            value(Punct::Minus, char('-')),
            value(Punct::Star, char('*')),
            value(Punct::Slash, char('/')),
            value(Punct::LParen, char('(')),
            value(Punct::RParen, char(')')),
            value(Punct::Assign, char('=')),
            value(Punct::Lt, char('<')),
            value(Punct::Gt, char('>')),
            value(Punct::SemiColon, char(';')),
            value(Punct::LCurly, char('{')),
            value(Punct::RCurly, char('}')),
            value(Punct::Comma, char(',')),
        )),
        TokenKind::Punct,
    )(src)
}

/// Once digits are seen the literal must fit an `i32`, so a bad literal is a failure rather
/// than a backtrackable error.
fn parse_integer(src: &str) -> Result<'_, TokenKind> {
    preceded(
        peek(satisfy(|c| c.is_ascii_digit())),
        cut(map(
            map_res(digit1, |digits: &str| digits.parse::<i32>()),
            TokenKind::Integer,
        )),
    )(src)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nom::Finish;

    #[test]
    fn test_operator_before_punctuation() {
        let (rest, token) = parse_token("<=1").finish().unwrap();
        assert_eq!(token, TokenKind::Punct(Punct::Lte));
        assert_eq!(rest, "1");
    }

    #[test]
    fn test_keyword_before_identifier() {
        let (_, token) = parse_token("return x").finish().unwrap();
        assert_eq!(token, TokenKind::Keyword(Keyword::Return));
    }

    #[test]
    fn test_keyword_prefix_is_identifier() {
        let (rest, token) = parse_token("iffy;").finish().unwrap();
        assert_eq!(token, TokenKind::Identifier("iffy".to_string()));
        assert_eq!(rest, ";");
    }

    #[test]
    fn test_integer_overflow_is_failure() {
        let err = parse_token("99999999999").unwrap_err();
        assert!(matches!(err, nom::Err::Failure(_)));
    }

    #[test]
    fn test_unknown_char_is_error() {
        let err = parse_token("#").unwrap_err();
        assert!(matches!(err, nom::Err::Error(_)));
    }
}
