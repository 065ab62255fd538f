//! Operator semantics.
//!
//! Every operator is a total function returning either a value or a message
//! describing why the operands were rejected.

use std::cmp::Ordering;

use zirconium_parser::ast::{BinaryOp, UnaryOp};

use super::ZrValue;

/// Apply a non-short-circuit binary operator.
pub fn binary(op: BinaryOp, left: &ZrValue, right: &ZrValue) -> Result<ZrValue, String> {
    use BinaryOp::*;

    match op {
        Add => add(left, right),
        Sub | Mul | Div | Mod => match (left, right) {
            (ZrValue::Number(a), ZrValue::Number(b)) => Ok(ZrValue::Number(arithmetic(op, *a, *b))),
            _ => Err(mismatch(op, left, right)),
        },
        Equal => Ok(ZrValue::Boolean(left == right)),
        NotEqual => Ok(ZrValue::Boolean(left != right)),
        Less | LessEqual | Greater | GreaterEqual => {
            let ordering = compare(left, right).ok_or_else(|| mismatch(op, left, right))?;
            let result = match op {
                Less => ordering == Ordering::Less,
                LessEqual => ordering != Ordering::Greater,
                Greater => ordering == Ordering::Greater,
                _ => ordering != Ordering::Less,
            };
            Ok(ZrValue::Boolean(result))
        }
        LogicalAnd => Ok(ZrValue::Boolean(left.is_truthy() && right.is_truthy())),
        LogicalOr => Ok(ZrValue::Boolean(left.is_truthy() || right.is_truthy())),
        Assign => Err("assignment is not a value operator".to_string()),
    }
}

/// IEEE arithmetic on two numbers. Non-arithmetic operators yield NaN.
pub fn arithmetic(op: BinaryOp, a: f64, b: f64) -> f64 {
    match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div => a / b,
        BinaryOp::Mod => a % b,
        _ => f64::NAN,
    }
}

/// Apply a unary operator.
pub fn unary(op: UnaryOp, operand: &ZrValue) -> Result<ZrValue, String> {
    match (op, operand) {
        (UnaryOp::Not, value) => Ok(ZrValue::Boolean(!value.is_truthy())),
        (UnaryOp::Neg, ZrValue::Number(n)) => Ok(ZrValue::Number(-n)),
        (UnaryOp::Neg, value) => Err(format!("cannot negate {}", value.type_name())),
    }
}

fn add(left: &ZrValue, right: &ZrValue) -> Result<ZrValue, String> {
    match (left, right) {
        (ZrValue::Number(a), ZrValue::Number(b)) => Ok(ZrValue::Number(a + b)),
        (ZrValue::String(_), _) | (_, ZrValue::String(_)) => Ok(ZrValue::from(format!("{}{}", left, right))),
        _ => Err(mismatch(BinaryOp::Add, left, right)),
    }
}

fn compare(left: &ZrValue, right: &ZrValue) -> Option<Ordering> {
    match (left, right) {
        (ZrValue::Number(a), ZrValue::Number(b)) => a.partial_cmp(b),
        (ZrValue::String(a), ZrValue::String(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

fn mismatch(op: BinaryOp, left: &ZrValue, right: &ZrValue) -> String {
    format!(
        "operator '{}' cannot be applied to {} and {}",
        op,
        left.type_name(),
        right.type_name()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(n: f64) -> ZrValue {
        ZrValue::Number(n)
    }

    #[test]
    fn arithmetic_on_numbers() {
        assert_eq!(binary(BinaryOp::Add, &num(1.0), &num(2.0)), Ok(num(3.0)));
        assert_eq!(binary(BinaryOp::Mod, &num(7.0), &num(4.0)), Ok(num(3.0)));
        assert_eq!(binary(BinaryOp::Div, &num(1.0), &num(0.0)), Ok(num(f64::INFINITY)));
        assert!(binary(BinaryOp::Sub, &num(1.0), &ZrValue::from("a")).is_err());
    }

    #[test]
    fn plus_concatenates_strings() {
        assert_eq!(
            binary(BinaryOp::Add, &ZrValue::from("hp: "), &num(10.0)),
            Ok(ZrValue::from("hp: 10"))
        );
        assert_eq!(
            binary(BinaryOp::Add, &ZrValue::Boolean(true), &ZrValue::from("!")),
            Ok(ZrValue::from("true!"))
        );
        assert!(binary(BinaryOp::Add, &ZrValue::Boolean(true), &num(1.0)).is_err());
    }

    #[test]
    fn comparisons() {
        assert_eq!(binary(BinaryOp::Less, &num(1.0), &num(2.0)), Ok(ZrValue::Boolean(true)));
        assert_eq!(binary(BinaryOp::GreaterEqual, &num(2.0), &num(2.0)), Ok(ZrValue::Boolean(true)));
        assert_eq!(
            binary(BinaryOp::Greater, &ZrValue::from("b"), &ZrValue::from("a")),
            Ok(ZrValue::Boolean(true))
        );
        assert!(binary(BinaryOp::Less, &num(1.0), &ZrValue::Undefined).is_err());
        assert_eq!(
            binary(BinaryOp::Equal, &ZrValue::from("1"), &num(1.0)),
            Ok(ZrValue::Boolean(false))
        );
    }

    #[test]
    fn unary_ops() {
        assert_eq!(unary(UnaryOp::Not, &num(0.0)), Ok(ZrValue::Boolean(true)));
        assert_eq!(unary(UnaryOp::Neg, &num(2.0)), Ok(num(-2.0)));
        assert!(unary(UnaryOp::Neg, &ZrValue::from("x")).is_err());
    }
}
