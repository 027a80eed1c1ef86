//! Binary operator implementations for the evaluator.
//!
//! Integer arithmetic is checked and reports overflow as `ResultTooLarge`.
//! Division always produces a float. Float results must stay finite.

use crate::error::{Result, RuntimeError};
use crate::value::Value;
use blockrun_blocks::{ArithmeticOperator, BinaryOperator, ComparisonOperator};
use std::cmp::Ordering;

#[inline]
fn checked_int(result: Option<i64>) -> Result<Value> {
    result
        .map(Value::Integer)
        .ok_or_else(RuntimeError::result_too_large)
}

/// Reject infinities and NaN coming out of float arithmetic
#[inline]
fn checked_float(result: f64, op: ArithmeticOperator) -> Result<Value> {
    if result.is_nan() {
        Err(RuntimeError::unexpected_fault(format!(
            "{} produced NaN",
            op.symbol()
        )))
    } else if result.is_infinite() {
        Err(RuntimeError::result_too_large())
    } else {
        Ok(Value::Float(result))
    }
}

/// Evaluate a binary operation on two already-evaluated operands
pub fn evaluate_binary(operator: BinaryOperator, left: Value, right: Value) -> Result<Value> {
    match operator {
        BinaryOperator::Arithmetic(op) => eval_arithmetic(op, left, right),
        BinaryOperator::Comparison(op) => Ok(eval_comparison(op, left, right)),
    }
}

fn eval_arithmetic(op: ArithmeticOperator, left: Value, right: Value) -> Result<Value> {
    match (left.coerce_numeric(), right.coerce_numeric()) {
        (Value::Integer(a), Value::Integer(b)) => eval_int_arithmetic(op, a, b),
        (a, b) => eval_float_arithmetic(op, a.as_f64(), b.as_f64()),
    }
}

fn eval_int_arithmetic(op: ArithmeticOperator, a: i64, b: i64) -> Result<Value> {
    match op {
        ArithmeticOperator::Add => checked_int(a.checked_add(b)),
        ArithmeticOperator::Subtract => checked_int(a.checked_sub(b)),
        ArithmeticOperator::Multiply => checked_int(a.checked_mul(b)),
        ArithmeticOperator::Divide => {
            if b == 0 {
                Err(RuntimeError::division_by_zero())
            } else {
                checked_float(a as f64 / b as f64, op)
            }
        }
        ArithmeticOperator::Power => int_power(a, b),
    }
}

fn int_power(base: i64, exponent: i64) -> Result<Value> {
    if exponent < 0 {
        if base == 0 {
            return Err(RuntimeError::division_by_zero());
        }
        return checked_float((base as f64).powf(exponent as f64), ArithmeticOperator::Power);
    }

    match u32::try_from(exponent) {
        Ok(exponent) => checked_int(base.checked_pow(exponent)),
        // Only 0, 1 and -1 survive an exponent this large
        Err(_) => match base {
            0 | 1 => Ok(Value::Integer(base)),
            -1 if exponent % 2 == 0 => Ok(Value::Integer(1)),
            -1 => Ok(Value::Integer(-1)),
            _ => Err(RuntimeError::result_too_large()),
        },
    }
}

fn eval_float_arithmetic(op: ArithmeticOperator, a: f64, b: f64) -> Result<Value> {
    let result = match op {
        ArithmeticOperator::Add => a + b,
        ArithmeticOperator::Subtract => a - b,
        ArithmeticOperator::Multiply => a * b,
        ArithmeticOperator::Divide => {
            if b == 0.0 {
                return Err(RuntimeError::division_by_zero());
            }
            a / b
        }
        ArithmeticOperator::Power => {
            if a == 0.0 && b < 0.0 {
                return Err(RuntimeError::division_by_zero());
            }
            a.powf(b)
        }
    };
    checked_float(result, op)
}

/// Order an integer against a float without rounding the integer to f64
fn cmp_int_float(a: i64, b: f64) -> Option<Ordering> {
    const TWO_POW_63: f64 = 9_223_372_036_854_775_808.0;

    if b.is_nan() {
        return None;
    }
    if b >= TWO_POW_63 {
        return Some(Ordering::Less);
    }
    if b < -TWO_POW_63 {
        return Some(Ordering::Greater);
    }

    // In range, so the whole part converts exactly
    let whole = b.trunc();
    match a.cmp(&(whole as i64)) {
        Ordering::Equal => 0.0_f64.partial_cmp(&(b - whole)),
        ordering => Some(ordering),
    }
}

fn eval_comparison(op: ComparisonOperator, left: Value, right: Value) -> Value {
    let ordering = match (left.coerce_numeric(), right.coerce_numeric()) {
        (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(&b)),
        (Value::Integer(a), Value::Float(b)) => cmp_int_float(a, b),
        (Value::Float(a), Value::Integer(b)) => cmp_int_float(b, a).map(Ordering::reverse),
        (a, b) => a.as_f64().partial_cmp(&b.as_f64()),
    };

    Value::Boolean(match op {
        ComparisonOperator::GreaterThan => ordering == Some(Ordering::Greater),
        ComparisonOperator::LessThan => ordering == Some(Ordering::Less),
        ComparisonOperator::Equal => ordering == Some(Ordering::Equal),
    })
}
