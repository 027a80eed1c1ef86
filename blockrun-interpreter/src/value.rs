//! Runtime value representation for the blockrun interpreter.
//!
//! Expressions produce numbers or booleans. Booleans take part in arithmetic
//! as 0 and 1 and print the way the editor's output pane shows them.

use blockrun_blocks::Number;

/// Runtime values produced by evaluating expression blocks
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    /// 64-bit signed integer
    Integer(i64),
    /// 64-bit floating point number
    Float(f64),
    /// Result of a comparison
    Boolean(bool),
}

impl Value {
    /// Get the type name of this value
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Integer(_) => "Integer",
            Value::Float(_) => "Float",
            Value::Boolean(_) => "Boolean",
        }
    }

    /// Nonzero numbers and `true` are truthy
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Integer(n) => *n != 0,
            Value::Float(f) => *f != 0.0,
            Value::Boolean(b) => *b,
        }
    }

    /// Numeric view of the value, with booleans as 0 and 1
    pub fn as_f64(&self) -> f64 {
        match self {
            Value::Integer(n) => *n as f64,
            Value::Float(f) => *f,
            Value::Boolean(b) => f64::from(u8::from(*b)),
        }
    }

    /// Booleans become integers; numbers are unchanged
    pub fn coerce_numeric(self) -> Value {
        match self {
            Value::Boolean(b) => Value::Integer(i64::from(b)),
            other => other,
        }
    }
}

impl From<Number> for Value {
    fn from(number: Number) -> Self {
        match number {
            Number::Integer(n) => Value::Integer(n),
            Number::Float(f) => Value::Float(f),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Integer(n) => write!(f, "{n}"),
            Value::Float(x) => fmt_float(*x, f),
            Value::Boolean(true) => f.write_str("True"),
            Value::Boolean(false) => f.write_str("False"),
        }
    }
}

/// Whole floats keep their `.0`; very large and very small ones switch to
/// exponent form with a signed exponent of at least two digits, e.g. `1e+16`.
fn fmt_float(x: f64, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    if x.is_nan() {
        return f.write_str("nan");
    }
    if x.is_infinite() {
        return f.write_str(if x > 0.0 { "inf" } else { "-inf" });
    }

    let magnitude = x.abs();
    if magnitude == 0.0 || (1e-4..1e16).contains(&magnitude) {
        return write!(f, "{x:?}");
    }

    let formatted = format!("{x:e}");
    match formatted.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            write!(f, "{mantissa}e{sign}{digits:0>2}")
        }
        None => f.write_str(&formatted),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Value::Integer(-3).to_string(), "-3");
        assert_eq!(Value::Float(2.0).to_string(), "2.0");
        assert_eq!(Value::Float(0.5).to_string(), "0.5");
        assert_eq!(Value::Boolean(true).to_string(), "True");
        assert_eq!(Value::Boolean(false).to_string(), "False");
    }

    #[test]
    fn test_float_exponent_display() {
        assert_eq!(Value::Float(1e16).to_string(), "1e+16");
        assert_eq!(Value::Float(-2.5e20).to_string(), "-2.5e+20");
        assert_eq!(Value::Float(1.2345678901234568e17).to_string(), "1.2345678901234568e+17");
        assert_eq!(Value::Float(1.5e-7).to_string(), "1.5e-07");
        assert_eq!(Value::Float(1e-5).to_string(), "1e-05");
        assert_eq!(Value::Float(1e300).to_string(), "1e+300");
        assert_eq!(Value::Float(1e15).to_string(), "1000000000000000.0");
        assert_eq!(Value::Float(0.0001).to_string(), "0.0001");
        assert_eq!(Value::Float(-0.0).to_string(), "-0.0");
    }

    #[test]
    fn test_truthiness() {
        assert!(Value::Integer(-1).is_truthy());
        assert!(!Value::Integer(0).is_truthy());
        assert!(Value::Float(0.1).is_truthy());
        assert!(!Value::Float(0.0).is_truthy());
        assert!(!Value::Boolean(false).is_truthy());
    }

    #[test]
    fn test_boolean_coercion() {
        assert_eq!(Value::Boolean(true).coerce_numeric(), Value::Integer(1));
        assert_eq!(Value::Boolean(false).as_f64(), 0.0);
        assert_eq!(Value::Float(1.5).coerce_numeric(), Value::Float(1.5));
    }

    #[test]
    fn test_from_number() {
        assert_eq!(Value::from(Number::Integer(4)), Value::Integer(4));
        assert_eq!(Value::from(Number::Float(4.5)), Value::Float(4.5));
    }
}
