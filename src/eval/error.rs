use std::result;

use crate::ast;
use crate::diagnostic;
use crate::scope;
use crate::ty;

/// An error that occurs while evaluating an expression.
#[derive(Clone, Debug, Fail, PartialEq)]
pub enum Error {
    /// An identifier has no value in the evaluation context.
    #[fail(display = "unknown identifier `{}`", name)]
    UnknownIdentifier {
        /// The name of the identifier.
        name: String,
    },
    /// An operator was applied to operands of unsupported types.
    #[fail(
        display = "operator `{}` cannot be applied to {} and {}",
        operator, lhs, rhs
    )]
    TypeMismatch {
        /// The operator.
        operator: ast::Operator,
        /// The type of the left operand.
        lhs: ty::TermType,
        /// The type of the right operand.
        rhs: ty::TermType,
    },
    /// An integer was divided by zero.
    #[fail(display = "integer division by zero")]
    DivisionByZero,
    /// An integer operation overflowed.
    #[fail(display = "integer overflow in `{} {} {}`", lhs, operator, rhs)]
    Overflow {
        /// The operator.
        operator: ast::Operator,
        /// The left operand.
        lhs: i64,
        /// The right operand.
        rhs: i64,
    },
    /// The node cannot be evaluated, because it is not part of an expression.
    #[fail(display = "{} is not an expression", kind)]
    NotAnExpression {
        /// A description of the node.
        kind: String,
    },
    /// Looking up a symbol failed.
    #[fail(display = "symbol lookup failed")]
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
            Error::Scope(ref cause) => cause.to_diagnostics(builder),
            Error::NotAnExpression { .. } => {
                builder.add_diagnostic(codespan_reporting::Severity::Bug, None, &self.to_string());
            }
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
