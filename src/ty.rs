//! The types of terms, and how operators combine them.
use std::fmt;

use crate::ast;

/// The inferred literal category of an expression.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TermType {
    /// A 64-bit signed integer.
    Integer,
    /// A 64-bit floating point number.
    FloatingPoint,
    /// A string.
    StringLiteral,
    /// The type of something that has no value.
    Void,
    /// A type that is not known yet.
    Unknown,
}

impl TermType {
    /// Whether values of this type are numbers.
    pub fn is_numeric(self) -> bool {
        match self {
            TermType::Integer | TermType::FloatingPoint => true,
            _ => false,
        }
    }

    /// Whether this is the type of an actual value, as opposed to a placeholder.
    pub fn is_concrete(self) -> bool {
        match self {
            TermType::Integer | TermType::FloatingPoint | TermType::StringLiteral => true,
            TermType::Void | TermType::Unknown => false,
        }
    }
}

/// Infers the result type of applying a binary operator.
///
/// Returns `None` if the operand types are incompatible with the operator.  `+` accepts a string
/// on either side and concatenates; all other combinations require numbers, with integers
/// promoted to floating point when mixed.
pub fn infer_binary(
    operator: ast::Operator,
    lhs: TermType,
    rhs: TermType,
) -> Option<TermType> {
    match (lhs, rhs) {
        (TermType::StringLiteral, other) | (other, TermType::StringLiteral)
            if operator == ast::Operator::Add =>
        {
            if other == TermType::Void {
                None
            } else {
                Some(TermType::StringLiteral)
            }
        }
        (l, r) if l.is_numeric() && r.is_numeric() => {
            if l == r {
                Some(l)
            } else {
                Some(TermType::FloatingPoint)
            }
        }
        (TermType::Unknown, other) | (other, TermType::Unknown)
            if other == TermType::Unknown || other.is_numeric() =>
        {
            Some(TermType::Unknown)
        }
        _ => None,
    }
}

impl fmt::Display for TermType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            TermType::Integer => f.write_str("integer"),
            TermType::FloatingPoint => f.write_str("floating point"),
            TermType::StringLiteral => f.write_str("string"),
            TermType::Void => f.write_str("void"),
            TermType::Unknown => f.write_str("unknown"),
        }
    }
}
