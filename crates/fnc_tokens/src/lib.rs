//! Tokens, spans and diagnostics for the fnc language.

use std::fmt::{Display, Formatter};

use crate::spanned::{LineReader, Span};

pub mod spanned;
pub mod token;

/// An error with an optional location in some source text.
///
/// Displaying a [SpannedError] only shows the error and its position. Use
/// [SpannedError::render] to also print the surrounding source lines.
#[derive(Debug, thiserror::Error)]
pub struct SpannedError<E> {
    error: E,
    location: Option<Span>,
}

impl<E> SpannedError<E> {
    pub fn new(error: E, location: impl Into<Option<Span>>) -> Self {
        Self {
            error,
            location: location.into(),
        }
    }

    pub fn error(&self) -> &E {
        &self.error
    }

    pub fn location(&self) -> Option<Span> {
        self.location
    }
}

impl<E: Display> SpannedError<E> {
    /// Renders this error along with the lines of `source` around its location.
    ///
    /// `origin` names the source, usually its file path.
    pub fn render(&self, origin: &str, source: &str) -> String {
        Rendered {
            error: &self.error,
            location: self.location,
            origin,
            source,
        }
        .to_string()
    }
}

impl<E: Display> Display for SpannedError<E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.error)?;
        if let Some(location) = &self.location {
            write!(f, " at {location}")?;
        }
        Ok(())
    }
}

struct Rendered<'a, E> {
    error: &'a E,
    location: Option<Span>,
    origin: &'a str,
    source: &'a str,
}

impl<E: Display> Display for Rendered<'_, E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.error)?;
        let Some(location) = &self.location else {
            return Ok(());
        };
        writeln!(f, "  -> {}:{}", self.origin, location)?;
        let lines = LineReader::new(2, 2).lines(self.source, location);
        let base_line = location.line();
        let width = lines.iter().map(|line| line.line).max().unwrap_or(0) / 10 + 1;
        for line in &lines {
            writeln!(f, "{:width$} | {}", line.line, line.src.trim_end())?;
            if line.line == base_line {
                let col = location.col().saturating_sub(1);
                let marker_len = self
                    .source
                    .get(location.offset()..location.offset() + location.len())
                    .map(|text| text.chars().count())
                    .unwrap_or(0)
                    .max(1);
                writeln!(
                    f,
                    "{}{}{}",
                    " ".repeat(width + 3),
                    " ".repeat(col),
                    "~".repeat(marker_len)
                )?;
            }
        }
        Ok(())
    }
}
