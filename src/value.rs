use std::cmp::Ordering;
use std::fmt;

use crate::error::FatalError;

/// A single stack cell.
///
/// ><> is untyped numerically: integers and floats share one stack. Every
/// arithmetic instruction applies the same promotion rules:
/// - two `Int`s stay `Int` unless the i64 result overflows, in which case the
///   operation is redone in f64;
/// - any `Float` operand makes the result a `Float`;
/// - division keeps `Int` only when it is exact;
/// - modulo is floored (the result takes the sign of the divisor).
#[derive(Debug, Clone, Copy)]
pub enum Value {
    Int(i64),
    Float(f64),
}

impl Value {
    pub fn as_f64(self) -> f64 {
        match self {
            Value::Int(i) => i as f64,
            Value::Float(f) => f,
        }
    }

    pub fn is_zero(self) -> bool {
        match self {
            Value::Int(i) => i == 0,
            Value::Float(f) => f == 0.0,
        }
    }

    /// Truncate towards zero. Fails on NaN and infinities, which have no
    /// integer position or code point.
    pub fn to_i64(self) -> Result<i64, FatalError> {
        match self {
            Value::Int(i) => Ok(i),
            Value::Float(f) if f.is_finite() => Ok(f.trunc() as i64),
            Value::Float(_) => Err(FatalError::InvalidCoordinate(self)),
        }
    }

    pub fn add(self, rhs: Value) -> Value {
        match (self, rhs) {
            (Value::Int(a), Value::Int(b)) => a
                .checked_add(b)
                .map_or(Value::Float(a as f64 + b as f64), Value::Int),
            (a, b) => Value::Float(a.as_f64() + b.as_f64()),
        }
    }

    pub fn sub(self, rhs: Value) -> Value {
        match (self, rhs) {
            (Value::Int(a), Value::Int(b)) => a
                .checked_sub(b)
                .map_or(Value::Float(a as f64 - b as f64), Value::Int),
            (a, b) => Value::Float(a.as_f64() - b.as_f64()),
        }
    }

    pub fn mul(self, rhs: Value) -> Value {
        match (self, rhs) {
            (Value::Int(a), Value::Int(b)) => a
                .checked_mul(b)
                .map_or(Value::Float(a as f64 * b as f64), Value::Int),
            (a, b) => Value::Float(a.as_f64() * b.as_f64()),
        }
    }

    pub fn div(self, rhs: Value) -> Result<Value, FatalError> {
        if rhs.is_zero() {
            return Err(FatalError::DivisionByZero);
        }
        Ok(match (self, rhs) {
            // checked_rem also catches i64::MIN / -1.
            (Value::Int(a), Value::Int(b)) if a.checked_rem(b) == Some(0) => Value::Int(a / b),
            (a, b) => Value::Float(a.as_f64() / b.as_f64()),
        })
    }

    pub fn rem(self, rhs: Value) -> Result<Value, FatalError> {
        if rhs.is_zero() {
            return Err(FatalError::DivisionByZero);
        }
        Ok(match (self, rhs) {
            (Value::Int(a), Value::Int(b)) => match a.checked_rem(b) {
                Some(r) if r != 0 && (r < 0) != (b < 0) => Value::Int(r + b),
                Some(r) => Value::Int(r),
                // i64::MIN % -1
                None => Value::Int(0),
            },
            (a, b) => {
                let (a, b) = (a.as_f64(), b.as_f64());
                let r = a % b;
                if r != 0.0 && (r < 0.0) != (b < 0.0) {
                    Value::Float(r + b)
                } else {
                    Value::Float(r)
                }
            }
        })
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Int(b as i64)
    }
}

impl From<char> for Value {
    fn from(c: char) -> Self {
        Value::Int(c as i64)
    }
}

/// Numeric equality across variants: `Int(2) == Float(2.0)`.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (*self, *other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (a, b) => a.as_f64() == b.as_f64(),
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (*self, *other) {
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(&b)),
            (a, b) => a.as_f64().partial_cmp(&b.as_f64()),
        }
    }
}

/// The form `n` prints: integers in decimal, floats via f64's `Display`
/// (so `2.5` prints as `2.5` and `3.0` as `3`).
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_arithmetic_stays_int() {
        assert!(matches!(Value::Int(2).add(Value::Int(3)), Value::Int(5)));
        assert!(matches!(Value::Int(2).sub(Value::Int(3)), Value::Int(-1)));
        assert!(matches!(Value::Int(4).mul(Value::Int(3)), Value::Int(12)));
    }

    #[test]
    fn test_overflow_promotes_to_float() {
        let v = Value::Int(i64::MAX).add(Value::Int(1));
        assert!(matches!(v, Value::Float(_)));
        assert_eq!(v.as_f64(), i64::MAX as f64 + 1.0);
    }

    #[test]
    fn test_float_operand_promotes() {
        assert!(matches!(Value::Int(1).add(Value::Float(0.5)), Value::Float(f) if f == 1.5));
    }

    #[test]
    fn test_exact_division_is_int() {
        assert!(matches!(Value::Int(6).div(Value::Int(3)), Ok(Value::Int(2))));
    }

    #[test]
    fn test_inexact_division_is_float() {
        assert!(matches!(Value::Int(1).div(Value::Int(4)), Ok(Value::Float(f)) if f == 0.25));
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(Value::Int(1).div(Value::Int(0)), Err(FatalError::DivisionByZero));
        assert_eq!(Value::Int(1).div(Value::Float(0.0)), Err(FatalError::DivisionByZero));
        assert_eq!(Value::Int(1).rem(Value::Int(0)), Err(FatalError::DivisionByZero));
    }

    #[test]
    fn test_floored_modulo() {
        assert!(matches!(Value::Int(7).rem(Value::Int(3)), Ok(Value::Int(1))));
        assert!(matches!(Value::Int(-7).rem(Value::Int(3)), Ok(Value::Int(2))));
        assert!(matches!(Value::Int(7).rem(Value::Int(-3)), Ok(Value::Int(-2))));
        assert!(matches!(Value::Float(-1.5).rem(Value::Int(1)), Ok(Value::Float(f)) if f == 0.5));
    }

    #[test]
    fn test_min_over_minus_one() {
        assert!(matches!(Value::Int(i64::MIN).rem(Value::Int(-1)), Ok(Value::Int(0))));
        assert!(matches!(Value::Int(i64::MIN).div(Value::Int(-1)), Ok(Value::Float(_))));
    }

    #[test]
    fn test_cross_variant_comparison() {
        assert_eq!(Value::Int(2), Value::Float(2.0));
        assert!(Value::Float(2.5) > Value::Int(2));
        assert!(Value::Int(-1) < Value::Float(0.0));
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Int(-12).to_string(), "-12");
        assert_eq!(Value::Float(2.5).to_string(), "2.5");
        assert_eq!(Value::Float(3.0).to_string(), "3");
    }

    #[test]
    fn test_to_i64() {
        assert_eq!(Value::Float(2.9).to_i64(), Ok(2));
        assert_eq!(Value::Float(-2.9).to_i64(), Ok(-2));
        assert!(Value::Float(f64::NAN).to_i64().is_err());
    }
}
