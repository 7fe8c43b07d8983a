use std::result;

use crate::diagnostic;

/// An error that occurs while building or rewriting an L-system.
#[derive(Clone, Debug, Fail, PartialEq)]
pub enum Error {
    /// A random number fell outside of all intervals of a stochastic rule.
    #[fail(display = "no rule matched the random value {}", value)]
    NoRuleMatched {
        /// The random number that was drawn.
        value: f64,
    },
    /// A stochastic rule was created with no rules, or with a probability count that does not
    /// match its rules.
    #[fail(
        display = "invalid probabilities: {} rules but {} probabilities",
        rules, probabilities
    )]
    InvalidProbabilities {
        /// The number of rules.
        rules: usize,
        /// The number of probabilities.
        probabilities: usize,
    },
    /// A parameter list has no closing parenthesis.
    #[fail(display = "missing `)` for the parameters of the token at {}", offset)]
    MissingClosingParenthesis {
        /// The offset of the token with the parameter list.
        offset: usize,
    },
    /// A token has more parameters than its type accepts.
    #[fail(
        display = "the token at {} has {} parameters but accepts at most {}",
        offset, count, max
    )]
    TooManyParameters {
        /// The offset of the token.
        offset: usize,
        /// The number of parameters given.
        count: usize,
        /// The number of parameters accepted.
        max: usize,
    },
    /// A `${name}` placeholder could not be resolved.
    #[fail(display = "unresolved placeholder `${{{}}}`", name)]
    UnresolvedPlaceholder {
        /// The name inside the placeholder.
        name: String,
    },
    /// A parameter was requested that a token does not have.
    #[fail(display = "token `{}` has no parameter {}", token, index)]
    MissingParameter {
        /// The token.
        token: String,
        /// The requested parameter index.
        index: usize,
    },
    /// A parameter is not a valid number.
    #[fail(display = "parameter `{}` is not a valid number", value)]
    BadParameter {
        /// The resolved parameter.
        value: String,
    },
    /// The pattern of a rule consists of more than one token.
    #[fail(
        display = "rule pattern `{}` must be a single token but has {}",
        pattern, count
    )]
    MultiTokenPattern {
        /// The pattern as written.
        pattern: String,
        /// The number of tokens in the pattern.
        count: usize,
    },
    /// The requested number of generations is not positive.
    #[fail(display = "the recursion count must be at least 1 but is {}", count)]
    InvalidRecursionCount {
        /// The requested number of generations.
        count: i64,
    },
}

/// A convenience result wrapper for the [`Error`] type.
pub type Result<A> = result::Result<A, Error>;

impl diagnostic::Diagnostics for Error {
    fn to_diagnostics(&self, builder: &mut diagnostic::DiagnosticsBuilder) {
        builder.add_diagnostic(codespan_reporting::Severity::Error, None, &self.to_string());
    }
}
