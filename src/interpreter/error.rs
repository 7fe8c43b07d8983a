use std::result;

use crate::diagnostic;
use crate::eval;
use crate::scope;
use crate::ty;

/// An error that occurs while running a program.
#[derive(Clone, Debug, Fail, PartialEq)]
pub enum Error {
    /// The value assigned to a variable could not be reduced to a literal.
    #[fail(display = "the value assigned to `{}` is not a literal", name)]
    NotALiteral {
        /// The assigned variable.
        name: String,
    },
    /// A variable that was asked for has no value.
    #[fail(display = "variable `{}` is not defined", name)]
    UndefinedVariable {
        /// The name of the variable.
        name: String,
    },
    /// A variable has a value of an unexpected type.
    #[fail(
        display = "variable `{}` should be of type {} but is of type {}",
        name, expected, actual
    )]
    WrongType {
        /// The name of the variable.
        name: String,
        /// The type that was asked for.
        expected: ty::TermType,
        /// The type of the value.
        actual: ty::TermType,
    },
    /// Evaluating an assigned value failed.
    #[fail(display = "could not evaluate the value of `{}`", name)]
    Eval {
        /// The assigned variable.
        name: String,
        /// The underlying problem.
        #[cause]
        cause: eval::Error,
    },
    /// Defining a variable failed.
    #[fail(display = "could not define a variable")]
    Scope(#[cause] scope::Error),
}

/// A convenience result wrapper for the [`Error`] type.
pub type Result<A> = result::Result<A, Error>;

impl From<scope::Error> for Error {
    fn from(err: scope::Error) -> Self {
        Error::Scope(err)
    }
}

impl diagnostic::Diagnostics for Error {
    fn to_diagnostics(&self, builder: &mut diagnostic::DiagnosticsBuilder) {
        match *self {
            Error::Eval { ref cause, .. } => {
                builder.add_message(self.to_string());
                cause.to_diagnostics(builder);
            }
            Error::Scope(ref cause) => cause.to_diagnostics(builder),
            _ => {
                builder.add_diagnostic(
                    codespan_reporting::Severity::Error,
                    None,
                    &self.to_string(),
                );
            }
        }
    }
}
