use std::result;

use crate::diagnostic;
use crate::ty;

/// Errors that may occur while declaring and looking up symbols.
#[derive(Clone, Debug, Eq, Fail, PartialEq)]
pub enum Error {
    /// No symbol with the given name is visible.
    #[fail(display = "unknown identifier `{}`", name)]
    UnknownIdentifier {
        /// The name that was looked up.
        name: String,
    },
    /// A variable was defined with a type that differs from its established type.
    #[fail(
        display = "existing variable `{}` has type {} while new type is {}",
        name, existing, new
    )]
    TypeConflict {
        /// The name of the variable.
        name: String,
        /// The type the variable already has.
        existing: ty::TermType,
        /// The type the variable was defined with.
        new: ty::TermType,
    },
    /// A variable was defined with a placeholder type.
    #[fail(display = "variable `{}` cannot be defined with type {}", name, ty)]
    NotConcrete {
        /// The name of the variable.
        name: String,
        /// The offending type.
        ty: ty::TermType,
    },
}

/// A convenience result wrapper for the [`Error`] type.
pub type Result<A> = result::Result<A, Error>;

impl diagnostic::Diagnostics for Error {
    fn to_diagnostics(&self, builder: &mut diagnostic::DiagnosticsBuilder) {
        let severity = match *self {
            Error::NotConcrete { .. } => codespan_reporting::Severity::Bug,
            _ => codespan_reporting::Severity::Error,
        };
        builder.add_diagnostic(severity, None, &self.to_string());
    }
}
