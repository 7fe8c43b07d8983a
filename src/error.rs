//! Common error types and utilities.
use std::result;

use crate::diagnostic;
use crate::factory;
use crate::lsystem;
use crate::syntax;
use crate::validator;

/// An error that occurs while interacting with an L-system program.
///
/// Every variant remembers the source file that the error refers to, so that it can be rendered
/// as a diagnostic.
#[derive(Clone, Debug, Fail, PartialEq)]
pub enum Error {
    /// Parsing the source code failed.
    #[fail(display = "syntax error")]
    Syntax {
        /// The span of the source file.
        file: codespan::ByteSpan,
        /// The underlying problem.
        #[cause]
        cause: syntax::Error,
    },
    /// The program is not semantically valid.
    #[fail(display = "validation error")]
    Validation {
        /// The span of the source file.
        file: codespan::ByteSpan,
        /// The underlying problem.
        #[cause]
        cause: validator::Error,
    },
    /// Creating an L-system from the program failed.
    #[fail(display = "could not create the L-system")]
    Build {
        /// The span of the source file.
        file: codespan::ByteSpan,
        /// The underlying problem.
        #[cause]
        cause: factory::Error,
    },
    /// Rewriting or rendering the L-system failed.
    #[fail(display = "could not rewrite the L-system")]
    Rewrite {
        /// The span of the source file.
        file: codespan::ByteSpan,
        /// The underlying problem.
        #[cause]
        cause: lsystem::Error,
    },
}

/// A convenience result wrapper for the [`Error`] type.
pub type Result<A> = result::Result<A, Error>;

impl Error {
    /// The span of the source file that this error refers to.
    pub fn file(&self) -> codespan::ByteSpan {
        match *self {
            Error::Syntax { file, .. }
            | Error::Validation { file, .. }
            | Error::Build { file, .. }
            | Error::Rewrite { file, .. } => file,
        }
    }
}

impl diagnostic::Diagnostics for Error {
    fn to_diagnostics(&self, builder: &mut diagnostic::DiagnosticsBuilder) {
        builder.set_file(self.file());
        match *self {
            Error::Syntax { ref cause, .. } => cause.to_diagnostics(builder),
            Error::Validation { ref cause, .. } => cause.to_diagnostics(builder),
            Error::Build { ref cause, .. } => cause.to_diagnostics(builder),
            Error::Rewrite { ref cause, .. } => cause.to_diagnostics(builder),
        }
    }
}
