use std::cmp::Ordering;
use std::rc::Rc;

use num_bigint::BigInt;
use num_traits::{Signed, Zero};
use rand::distributions::Uniform;
use rand::Rng;

use crate::expect_args;
use crate::invokable::Return;
use crate::primitives::{compare_numbers, failure, mismatch, to_f64, PrimitiveFn};
use crate::universe::Universe;
use crate::value::Value;

pub static INSTANCE_PRIMITIVES: &[(&str, PrimitiveFn)] = &[
    ("<", self::lt),
    ("<=", self::lte),
    (">", self::gt),
    (">=", self::gte),
    ("=", self::eq),
    ("<>", self::neq),
    ("+", self::plus),
    ("-", self::minus),
    ("*", self::times),
    ("/", self::divide),
    ("//", self::divide_float),
    ("%", self::modulo),
    ("rem:", self::remainder),
    ("&", self::bitand),
    ("<<", self::shift_left),
    (">>>", self::shift_right),
    ("bitXor:", self::bitxor),
    ("abs", self::abs),
    ("sqrt", self::sqrt),
    ("asString", self::as_string),
    ("asDouble", self::as_double),
    ("atRandom", self::at_random),
];
pub static CLASS_PRIMITIVES: &[(&str, PrimitiveFn)] = &[("fromString:", self::from_string)];

macro_rules! demote {
    ($expr:expr) => {
        Return::Local(Value::demote($expr))
    };
}

fn from_string(universe: &mut Universe, args: &[Value]) -> Return {
    const SIGNATURE: &str = "Integer>>#fromString:";

    expect_args!(SIGNATURE, args, [
        _,
        value => value,
    ]);

    let value = match value {
        Value::String(value) => value.as_str(),
        Value::Symbol(sym) => universe.lookup_symbol(*sym),
        _ => return mismatch(SIGNATURE),
    };

    match value.parse::<BigInt>() {
        Ok(parsed) => demote!(parsed),
        Err(err) => failure(SIGNATURE, err.to_string()),
    }
}

fn as_string(_: &mut Universe, args: &[Value]) -> Return {
    const SIGNATURE: &str = "Integer>>#asString";

    expect_args!(SIGNATURE, args, [
        value => value,
    ]);

    let value = match value {
        Value::Integer(value) => value.to_string(),
        Value::BigInteger(value) => value.to_string(),
        _ => return mismatch(SIGNATURE),
    };

    Return::Local(Value::String(Rc::new(value)))
}

fn as_double(_: &mut Universe, args: &[Value]) -> Return {
    const SIGNATURE: &str = "Integer>>#asDouble";

    expect_args!(SIGNATURE, args, [
        value => value,
    ]);

    match value {
        Value::Integer(_) | Value::BigInteger(_) => match to_f64(value) {
            Some(value) => Return::Local(Value::Double(value)),
            None => failure(SIGNATURE, "`Integer` too big to be converted to `Double`"),
        },
        _ => mismatch(SIGNATURE),
    }
}

fn at_random(_: &mut Universe, args: &[Value]) -> Return {
    const SIGNATURE: &str = "Integer>>#atRandom";

    expect_args!(SIGNATURE, args, [
        value => value,
    ]);

    let chosen = match value {
        Value::Integer(value) if *value > 0 => {
            let distribution = Uniform::new(0, *value);
            let mut rng = rand::thread_rng();
            rng.sample(distribution)
        }
        Value::Integer(_) => {
            return failure(SIGNATURE, "the range to pick a random value from is empty")
        }
        Value::BigInteger(_) => {
            return failure(SIGNATURE, "the range is too big to pick a random value from")
        }
        _ => return mismatch(SIGNATURE),
    };

    Return::Local(Value::Integer(chosen))
}

fn plus(_: &mut Universe, args: &[Value]) -> Return {
    const SIGNATURE: &str = "Integer>>#+";

    expect_args!(SIGNATURE, args, [
        a => a,
        b => b,
    ]);

    match (a, b) {
        (Value::Integer(a), Value::Integer(b)) => match a.checked_add(*b) {
            Some(value) => Return::Local(Value::Integer(value)),
            None => demote!(Value::promote(*a) + Value::promote(*b)),
        },
        (Value::BigInteger(a), Value::BigInteger(b)) => demote!(a + b),
        (Value::BigInteger(a), Value::Integer(b)) | (Value::Integer(b), Value::BigInteger(a)) => {
            demote!(a + Value::promote(*b))
        }
        (Value::Integer(_) | Value::BigInteger(_), Value::Double(_))
        | (Value::Double(_), Value::Integer(_) | Value::BigInteger(_)) => {
            match (to_f64(a), to_f64(b)) {
                (Some(a), Some(b)) => Return::Local(Value::Double(a + b)),
                _ => failure(SIGNATURE, "`Integer` too big to be converted to `Double`"),
            }
        }
        _ => mismatch(SIGNATURE),
    }
}

fn minus(_: &mut Universe, args: &[Value]) -> Return {
    const SIGNATURE: &str = "Integer>>#-";

    expect_args!(SIGNATURE, args, [
        a => a,
        b => b,
    ]);

    match (a, b) {
        (Value::Integer(a), Value::Integer(b)) => match a.checked_sub(*b) {
            Some(value) => Return::Local(Value::Integer(value)),
            None => demote!(Value::promote(*a) - Value::promote(*b)),
        },
        (Value::BigInteger(a), Value::BigInteger(b)) => demote!(a - b),
        (Value::BigInteger(a), Value::Integer(b)) => demote!(a - Value::promote(*b)),
        (Value::Integer(a), Value::BigInteger(b)) => demote!(Value::promote(*a) - b),
        (Value::Integer(_) | Value::BigInteger(_), Value::Double(_)) => {
            match (to_f64(a), to_f64(b)) {
                (Some(a), Some(b)) => Return::Local(Value::Double(a - b)),
                _ => failure(SIGNATURE, "`Integer` too big to be converted to `Double`"),
            }
        }
        _ => mismatch(SIGNATURE),
    }
}

fn times(_: &mut Universe, args: &[Value]) -> Return {
    const SIGNATURE: &str = "Integer>>#*";

    expect_args!(SIGNATURE, args, [
        a => a,
        b => b,
    ]);

    match (a, b) {
        (Value::Integer(a), Value::Integer(b)) => match a.checked_mul(*b) {
            Some(value) => Return::Local(Value::Integer(value)),
            None => demote!(Value::promote(*a) * Value::promote(*b)),
        },
        (Value::BigInteger(a), Value::BigInteger(b)) => demote!(a * b),
        (Value::BigInteger(a), Value::Integer(b)) | (Value::Integer(b), Value::BigInteger(a)) => {
            demote!(a * Value::promote(*b))
        }
        (Value::Integer(_) | Value::BigInteger(_), Value::Double(_)) => {
            match (to_f64(a), to_f64(b)) {
                (Some(a), Some(b)) => Return::Local(Value::Double(a * b)),
                _ => failure(SIGNATURE, "`Integer` too big to be converted to `Double`"),
            }
        }
        _ => mismatch(SIGNATURE),
    }
}

fn divide(_: &mut Universe, args: &[Value]) -> Return {
    const SIGNATURE: &str = "Integer>>#/";

    expect_args!(SIGNATURE, args, [
        a => a,
        b => b,
    ]);

    let is_zero = match b {
        Value::Integer(b) => *b == 0,
        Value::BigInteger(b) => b.is_zero(),
        _ => false,
    };
    if is_zero {
        return failure(SIGNATURE, "division by zero");
    }

    match (a, b) {
        (Value::Integer(a), Value::Integer(b)) => match a.checked_div(*b) {
            Some(quotient) if a % b != 0 && (*a < 0) != (*b < 0) => {
                Return::Local(Value::Integer(quotient - 1))
            }
            Some(quotient) => Return::Local(Value::Integer(quotient)),
            None => demote!(floor_div(Value::promote(*a), Value::promote(*b))),
        },
        (Value::BigInteger(a), Value::BigInteger(b)) => demote!(floor_div(a.clone(), b.clone())),
        (Value::BigInteger(a), Value::Integer(b)) => {
            demote!(floor_div(a.clone(), Value::promote(*b)))
        }
        (Value::Integer(a), Value::BigInteger(b)) => {
            demote!(floor_div(Value::promote(*a), b.clone()))
        }
        (Value::Integer(_) | Value::BigInteger(_), Value::Double(_)) => {
            match (to_f64(a), to_f64(b)) {
                (Some(a), Some(b)) => Return::Local(Value::Double((a / b).floor())),
                _ => failure(SIGNATURE, "`Integer` too big to be converted to `Double`"),
            }
        }
        _ => mismatch(SIGNATURE),
    }
}

fn divide_float(_: &mut Universe, args: &[Value]) -> Return {
    const SIGNATURE: &str = "Integer>>#//";

    expect_args!(SIGNATURE, args, [
        a => a,
        b => b,
    ]);

    match (to_f64(a), to_f64(b)) {
        (Some(a), Some(b)) => Return::Local(Value::Double(a / b)),
        _ => mismatch(SIGNATURE),
    }
}

fn modulo(_: &mut Universe, args: &[Value]) -> Return {
    const SIGNATURE: &str = "Integer>>#%";

    expect_args!(SIGNATURE, args, [
        a => a,
        b => b,
    ]);

    match (a, b) {
        (Value::Integer(_), Value::Integer(0)) => failure(SIGNATURE, "division by zero"),
        (Value::Integer(a), Value::Integer(b)) => match a.checked_rem(*b) {
            Some(result) if result != 0 && result.signum() != b.signum() => {
                Return::Local(Value::Integer(result + b))
            }
            Some(result) => Return::Local(Value::Integer(result)),
            // `i64::MIN % -1`
            None => Return::Local(Value::Integer(0)),
        },
        (Value::Integer(_) | Value::BigInteger(_), Value::Integer(_) | Value::BigInteger(_)) => {
            let (Some(a), Some(b)) = (to_big(a), to_big(b)) else {
                return mismatch(SIGNATURE);
            };
            if b.is_zero() {
                return failure(SIGNATURE, "division by zero");
            }
            let quotient = floor_div(a.clone(), b.clone());
            demote!(a - quotient * b)
        }
        _ => mismatch(SIGNATURE),
    }
}

fn remainder(_: &mut Universe, args: &[Value]) -> Return {
    const SIGNATURE: &str = "Integer>>#rem:";

    expect_args!(SIGNATURE, args, [
        a => a,
        b => b,
    ]);

    match (a, b) {
        (Value::Integer(_), Value::Integer(0)) => failure(SIGNATURE, "division by zero"),
        (Value::Integer(a), Value::Integer(b)) => {
            Return::Local(Value::Integer(a.checked_rem(*b).unwrap_or(0)))
        }
        (Value::Integer(_) | Value::BigInteger(_), Value::Integer(_) | Value::BigInteger(_)) => {
            let (Some(a), Some(b)) = (to_big(a), to_big(b)) else {
                return mismatch(SIGNATURE);
            };
            if b.is_zero() {
                return failure(SIGNATURE, "division by zero");
            }
            // truncated, the sign follows the dividend
            demote!(a % b)
        }
        _ => mismatch(SIGNATURE),
    }
}

fn abs(_: &mut Universe, args: &[Value]) -> Return {
    const SIGNATURE: &str = "Integer>>#abs";

    expect_args!(SIGNATURE, args, [
        value => value,
    ]);

    match value {
        Value::Integer(value) => match value.checked_abs() {
            Some(value) => Return::Local(Value::Integer(value)),
            None => demote!(Value::promote(*value).abs()),
        },
        Value::BigInteger(value) => demote!(value.abs()),
        _ => mismatch(SIGNATURE),
    }
}

fn sqrt(_: &mut Universe, args: &[Value]) -> Return {
    const SIGNATURE: &str = "Integer>>#sqrt";

    expect_args!(SIGNATURE, args, [
        a => a,
    ]);

    match a {
        Value::Integer(a) if *a >= 0 => {
            let root = Value::promote(*a).sqrt();
            if &root * &root == Value::promote(*a) {
                demote!(root)
            } else {
                Return::Local(Value::Double((*a as f64).sqrt()))
            }
        }
        Value::BigInteger(a) if a.is_positive() => demote!(a.sqrt()),
        Value::Integer(_) | Value::BigInteger(_) => {
            failure(SIGNATURE, "square root of a negative number")
        }
        _ => mismatch(SIGNATURE),
    }
}

fn bitand(_: &mut Universe, args: &[Value]) -> Return {
    const SIGNATURE: &str = "Integer>>#&";

    expect_args!(SIGNATURE, args, [
        a => a,
        b => b,
    ]);

    match (a, b) {
        (Value::Integer(a), Value::Integer(b)) => Return::Local(Value::Integer(a & b)),
        (Value::BigInteger(a), Value::BigInteger(b)) => demote!(a & b),
        (Value::BigInteger(a), Value::Integer(b)) | (Value::Integer(b), Value::BigInteger(a)) => {
            demote!(a & &Value::promote(*b))
        }
        _ => mismatch(SIGNATURE),
    }
}

fn bitxor(_: &mut Universe, args: &[Value]) -> Return {
    const SIGNATURE: &str = "Integer>>#bitXor:";

    expect_args!(SIGNATURE, args, [
        a => a,
        b => b,
    ]);

    match (a, b) {
        (Value::Integer(a), Value::Integer(b)) => Return::Local(Value::Integer(a ^ b)),
        (Value::BigInteger(a), Value::BigInteger(b)) => demote!(a ^ b),
        (Value::BigInteger(a), Value::Integer(b)) | (Value::Integer(b), Value::BigInteger(a)) => {
            demote!(a ^ &Value::promote(*b))
        }
        _ => mismatch(SIGNATURE),
    }
}

fn shift_left(_: &mut Universe, args: &[Value]) -> Return {
    const SIGNATURE: &str = "Integer>>#<<";

    expect_args!(SIGNATURE, args, [
        a => a,
        Value::Integer(b) => b,
    ]);

    let Ok(shift) = usize::try_from(*b) else {
        return failure(SIGNATURE, "negative shift amount");
    };

    match a {
        Value::Integer(a) => {
            if shift < 64 && (a << shift) >> shift == *a {
                Return::Local(Value::Integer(a << shift))
            } else {
                demote!(Value::promote(*a) << shift)
            }
        }
        Value::BigInteger(a) => demote!(a << shift),
        _ => mismatch(SIGNATURE),
    }
}

fn shift_right(_: &mut Universe, args: &[Value]) -> Return {
    const SIGNATURE: &str = "Integer>>#>>>";

    expect_args!(SIGNATURE, args, [
        a => a,
        Value::Integer(b) => b,
    ]);

    let Ok(shift) = usize::try_from(*b) else {
        return failure(SIGNATURE, "negative shift amount");
    };

    match a {
        Value::Integer(a) if shift < 64 => Return::Local(Value::Integer(a >> shift)),
        Value::Integer(a) => Return::Local(Value::Integer(if *a < 0 { -1 } else { 0 })),
        Value::BigInteger(a) => demote!(a >> shift),
        _ => mismatch(SIGNATURE),
    }
}

fn compare(signature: &str, args: &[Value], expected: fn(Ordering) -> bool) -> Return {
    expect_args!(signature, args, [
        a => a,
        b => b,
    ]);

    match compare_numbers(a, b) {
        Some(ordering) => Return::Local(Value::Boolean(expected(ordering))),
        None => mismatch(signature),
    }
}

fn lt(_: &mut Universe, args: &[Value]) -> Return {
    compare("Integer>>#<", args, Ordering::is_lt)
}

fn lte(_: &mut Universe, args: &[Value]) -> Return {
    compare("Integer>>#<=", args, Ordering::is_le)
}

fn gt(_: &mut Universe, args: &[Value]) -> Return {
    compare("Integer>>#>", args, Ordering::is_gt)
}

fn gte(_: &mut Universe, args: &[Value]) -> Return {
    compare("Integer>>#>=", args, Ordering::is_ge)
}

fn eq(_: &mut Universe, args: &[Value]) -> Return {
    const SIGNATURE: &str = "Integer>>#=";

    expect_args!(SIGNATURE, args, [
        a => a,
        b => b,
    ]);

    let equal = compare_numbers(a, b) == Some(Ordering::Equal);
    Return::Local(Value::Boolean(equal))
}

fn neq(_: &mut Universe, args: &[Value]) -> Return {
    const SIGNATURE: &str = "Integer>>#<>";

    expect_args!(SIGNATURE, args, [
        a => a,
        b => b,
    ]);

    let equal = compare_numbers(a, b) == Some(Ordering::Equal);
    Return::Local(Value::Boolean(!equal))
}

/// Integer division, rounding towards negative infinity.
fn to_big(value: &Value) -> Option<BigInt> {
    match value {
        Value::Integer(value) => Some(Value::promote(*value)),
        Value::BigInteger(value) => Some(value.clone()),
        _ => None,
    }
}

fn floor_div(a: BigInt, b: BigInt) -> BigInt {
    let quotient = &a / &b;
    if (&a % &b).is_zero() || (a.is_negative() == b.is_negative()) {
        quotient
    } else {
        quotient - 1
    }
}
