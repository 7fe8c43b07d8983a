//! Runtime values of terms.
use std::fmt;

use num_traits::ToPrimitive;

use crate::ty;

/// A concrete value produced by evaluating an expression.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// An integer.
    Integer(i64),
    /// A floating point number.
    Float(f64),
    /// A string.
    String(String),
}

impl Value {
    /// The type of this value.
    pub fn ty(&self) -> ty::TermType {
        match *self {
            Value::Integer(_) => ty::TermType::Integer,
            Value::Float(_) => ty::TermType::FloatingPoint,
            Value::String(_) => ty::TermType::StringLiteral,
        }
    }

    /// This value as a floating point number, if it is numeric.
    pub fn to_f64(&self) -> Option<f64> {
        match *self {
            Value::Integer(v) => v.to_f64(),
            Value::Float(v) => Some(v),
            Value::String(_) => None,
        }
    }

    /// This value as an integer, if it is one.
    pub fn as_integer(&self) -> Option<i64> {
        match *self {
            Value::Integer(v) => Some(v),
            _ => None,
        }
    }

    /// This value as a string slice, if it is a string.
    pub fn as_str(&self) -> Option<&str> {
        match *self {
            Value::String(ref v) => Some(v),
            _ => None,
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl<'a> From<&'a str> for Value {
    fn from(v: &'a str) -> Self {
        Value::String(v.to_owned())
    }
}

/// Renders the canonical string form of a value.
///
/// Integers have no fractional part, floats always show a decimal point and strings are written
/// as-is.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Value::Integer(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{:?}", v),
            Value::String(ref v) => f.write_str(v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_strings() {
        assert_eq!("3", Value::Integer(3).to_string());
        assert_eq!("3.0", Value::Float(3.0).to_string());
        assert_eq!("0.25", Value::Float(0.25).to_string());
        assert_eq!("F[+F]", Value::from("F[+F]").to_string());
    }

    #[test]
    fn conversions() {
        assert_eq!(Some(2.0), Value::Integer(2).to_f64());
        assert_eq!(None, Value::from("x").to_f64());
        assert_eq!(Some(7), Value::Integer(7).as_integer());
        assert_eq!(None, Value::Float(7.0).as_integer());
        assert_eq!(Some("x"), Value::from("x").as_str());
        assert_eq!(ty::TermType::FloatingPoint, Value::Float(1.5).ty());
    }
}
