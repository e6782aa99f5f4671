//! nom helpers

use nom::bytes::complete::take_while1;
use nom::combinator::verify;
use nom::error::ParseError;
use nom::IResult;

/// Recognizes a run of one or more letters.
///
/// Letters are any unicode alphabetic character. Digits and `_` are never part of a word.
pub fn recognize_word<'a, E: ParseError<&'a str>>(input: &'a str) -> IResult<&'a str, &'a str, E> {
    take_while1(char::is_alphabetic)(input)
}

/// Recognizes `word` only when it makes up the entire letter run at the start of the input.
///
/// `word_tag("if")` accepts `if (` but rejects `iffy`.
pub fn word_tag<'a, E: ParseError<&'a str>>(
    word: &'static str,
) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str, E> {
    verify(recognize_word, move |found: &str| found == word)
}
