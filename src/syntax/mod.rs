//! Lexing and parsing of L-system source code.
//!
//! The entry point is [`parse`], which turns a complete source text into an [`ast::Ast`].
use std::cmp;
use std::fmt;
use std::result;

use crate::ast;
use crate::diagnostic;

mod lexer;
mod parser;
mod scanner;

pub use self::lexer::Lexer;
pub use self::lexer::Token;
pub use self::lexer::TokenKind;
pub use self::scanner::Scanner;

/// A region of source text, counted in bytes from the start of the source.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct TextRegion {
    start: usize,
    length: usize,
}

/// An error that occurs while lexing or parsing source code.
#[derive(Clone, Debug, Fail, PartialEq)]
pub enum Error {
    /// The input ended while more input was expected.
    #[fail(display = "premature end of input")]
    PrematureEnd {
        /// The offset where the input ended.
        offset: usize,
    },
    /// The scanner was asked to push back before consuming anything.
    #[fail(display = "cannot push back at the start of the input")]
    PushBackAtStart,
    /// A token of a specific kind was required but a different one was found.
    #[fail(display = "expected {} but found {} `{}`", expected, found, text)]
    UnexpectedToken {
        /// The kind of token that would have been valid.
        expected: TokenKind,
        /// The kind of token that was found.
        found: TokenKind,
        /// The text of the token that was found.
        text: String,
        /// Where the token was found.
        region: TextRegion,
    },
    /// The token stream does not form a valid construct.
    #[fail(display = "{}", message)]
    Syntax {
        /// A description of the problem.
        message: String,
        /// Where the problem was found.
        region: TextRegion,
    },
    /// A number literal could not be represented.
    #[fail(display = "illegal number literal `{}`", literal)]
    IllegalNumber {
        /// The literal as written in the source.
        literal: String,
        /// Where the literal was found.
        region: TextRegion,
    },
}

/// A convenience result wrapper for the [`Error`] type.
pub type Result<A> = result::Result<A, Error>;

/// Parses a complete source text into an AST.
pub fn parse(source: &str) -> Result<ast::Ast> {
    parser::Parser::new(source).parse()
}

impl TextRegion {
    /// Creates a region starting at `start` spanning `length` bytes.
    pub fn new(start: usize, length: usize) -> Self {
        TextRegion { start, length }
    }

    /// Creates a region spanning from `start` (inclusive) to `end` (exclusive).
    pub fn between(start: usize, end: usize) -> Self {
        TextRegion::new(start, end.saturating_sub(start))
    }

    /// The offset of the first byte of this region.
    pub fn start(self) -> usize {
        self.start
    }

    /// The number of bytes in this region.
    pub fn length(self) -> usize {
        self.length
    }

    /// The offset just past the last byte of this region.
    pub fn end(self) -> usize {
        self.start + self.length
    }

    /// Returns the smallest region covering both this region and `other`.
    pub fn merge(self, other: TextRegion) -> TextRegion {
        TextRegion::between(
            cmp::min(self.start, other.start),
            cmp::max(self.end(), other.end()),
        )
    }
}

impl fmt::Display for TextRegion {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{}..{})", self.start, self.end())
    }
}

impl Error {
    pub(crate) fn syntax<S>(region: TextRegion, message: S) -> Self
    where
        S: Into<String>,
    {
        let message = message.into();
        Error::Syntax { message, region }
    }

    /// The region of source text where this error occurred.
    pub fn region(&self) -> Option<TextRegion> {
        match *self {
            Error::PrematureEnd { offset } => Some(TextRegion::new(offset, 0)),
            Error::PushBackAtStart => None,
            Error::UnexpectedToken { region, .. } => Some(region),
            Error::Syntax { region, .. } => Some(region),
            Error::IllegalNumber { region, .. } => Some(region),
        }
    }
}

impl diagnostic::Diagnostics for Error {
    fn to_diagnostics(&self, builder: &mut diagnostic::DiagnosticsBuilder) {
        match *self {
            Error::PushBackAtStart => {
                builder.add_diagnostic(codespan_reporting::Severity::Bug, None, &self.to_string());
            }
            _ => {
                if let Some(region) = self.region() {
                    builder.add_region_label(
                        region,
                        None,
                        codespan_reporting::LabelStyle::Primary,
                    );
                }
                builder.add_diagnostic(
                    codespan_reporting::Severity::Error,
                    None,
                    &self.to_string(),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_regions() {
        let a = TextRegion::new(4, 2);
        let b = TextRegion::new(10, 5);

        assert_eq!(TextRegion::new(4, 11), a.merge(b));
        assert_eq!(TextRegion::new(4, 11), b.merge(a));
        assert_eq!(a, a.merge(TextRegion::new(5, 1)));
    }

    #[test]
    fn display_region() {
        assert_eq!("[3..7)", TextRegion::between(3, 7).to_string());
    }
}
