use std::cmp::Ordering;
use std::rc::Rc;

use num_bigint::BigInt;
use num_traits::FromPrimitive;

use crate::expect_args;
use crate::invokable::Return;
use crate::primitives::{compare_numbers, failure, mismatch, to_f64, PrimitiveFn};
use crate::universe::Universe;
use crate::value::Value;

pub static INSTANCE_PRIMITIVES: &[(&str, PrimitiveFn)] = &[
    ("+", self::plus),
    ("-", self::minus),
    ("*", self::times),
    ("//", self::divide),
    ("%", self::modulo),
    ("=", self::eq),
    ("<", self::lt),
    ("<=", self::lte),
    (">", self::gt),
    (">=", self::gte),
    ("sqrt", self::sqrt),
    ("round", self::round),
    ("asString", self::as_string),
    ("asInteger", self::as_integer),
];
pub static CLASS_PRIMITIVES: &[(&str, PrimitiveFn)] = &[
    ("fromString:", self::from_string),
    ("PositiveInfinity", self::positive_infinity),
];

/// Get the operand as a double, or return a type mismatch.
macro_rules! promote {
    ($signature:expr, $value:expr) => {
        match to_f64($value) {
            Some(value) => value,
            None => return mismatch($signature),
        }
    };
}

fn from_string(_: &mut Universe, args: &[Value]) -> Return {
    const SIGNATURE: &str = "Double>>#fromString:";

    expect_args!(SIGNATURE, args, [
        _,
        Value::String(string) => string,
    ]);

    match string.parse() {
        Ok(parsed) => Return::Local(Value::Double(parsed)),
        Err(err) => failure(SIGNATURE, err.to_string()),
    }
}

fn positive_infinity(_: &mut Universe, _: &[Value]) -> Return {
    Return::Local(Value::Double(f64::INFINITY))
}

fn as_string(_: &mut Universe, args: &[Value]) -> Return {
    const SIGNATURE: &str = "Double>>#asString";

    expect_args!(SIGNATURE, args, [
        Value::Double(value) => value,
    ]);

    Return::Local(Value::String(Rc::new(value.to_string())))
}

fn as_integer(_: &mut Universe, args: &[Value]) -> Return {
    const SIGNATURE: &str = "Double>>#asInteger";

    expect_args!(SIGNATURE, args, [
        Value::Double(value) => value,
    ]);

    match BigInt::from_f64(value.trunc()) {
        Some(value) => Return::Local(Value::demote(value)),
        None => failure(SIGNATURE, "non-finite `Double` has no integer value"),
    }
}

fn sqrt(_: &mut Universe, args: &[Value]) -> Return {
    const SIGNATURE: &str = "Double>>#sqrt";

    expect_args!(SIGNATURE, args, [
        Value::Double(value) => value,
    ]);

    Return::Local(Value::Double(value.sqrt()))
}

fn round(_: &mut Universe, args: &[Value]) -> Return {
    const SIGNATURE: &str = "Double>>#round";

    expect_args!(SIGNATURE, args, [
        Value::Double(value) => value,
    ]);

    match BigInt::from_f64(value.round()) {
        Some(value) => Return::Local(Value::demote(value)),
        None => failure(SIGNATURE, "non-finite `Double` cannot be rounded"),
    }
}

fn plus(_: &mut Universe, args: &[Value]) -> Return {
    const SIGNATURE: &str = "Double>>#+";

    expect_args!(SIGNATURE, args, [
        a => a,
        b => b,
    ]);

    let a = promote!(SIGNATURE, a);
    let b = promote!(SIGNATURE, b);

    Return::Local(Value::Double(a + b))
}

fn minus(_: &mut Universe, args: &[Value]) -> Return {
    const SIGNATURE: &str = "Double>>#-";

    expect_args!(SIGNATURE, args, [
        a => a,
        b => b,
    ]);

    let a = promote!(SIGNATURE, a);
    let b = promote!(SIGNATURE, b);

    Return::Local(Value::Double(a - b))
}

fn times(_: &mut Universe, args: &[Value]) -> Return {
    const SIGNATURE: &str = "Double>>#*";

    expect_args!(SIGNATURE, args, [
        a => a,
        b => b,
    ]);

    let a = promote!(SIGNATURE, a);
    let b = promote!(SIGNATURE, b);

    Return::Local(Value::Double(a * b))
}

fn divide(_: &mut Universe, args: &[Value]) -> Return {
    const SIGNATURE: &str = "Double>>#//";

    expect_args!(SIGNATURE, args, [
        a => a,
        b => b,
    ]);

    let a = promote!(SIGNATURE, a);
    let b = promote!(SIGNATURE, b);

    Return::Local(Value::Double(a / b))
}

fn modulo(_: &mut Universe, args: &[Value]) -> Return {
    const SIGNATURE: &str = "Double>>#%";

    expect_args!(SIGNATURE, args, [
        a => a,
        b => b,
    ]);

    let a = promote!(SIGNATURE, a);
    let b = promote!(SIGNATURE, b);

    Return::Local(Value::Double(a % b))
}

fn eq(_: &mut Universe, args: &[Value]) -> Return {
    const SIGNATURE: &str = "Double>>#=";

    expect_args!(SIGNATURE, args, [
        a => a,
        b => b,
    ]);

    let equal = compare_numbers(a, b) == Some(Ordering::Equal);
    Return::Local(Value::Boolean(equal))
}

fn compare(signature: &str, args: &[Value], expected: fn(Ordering) -> bool) -> Return {
    expect_args!(signature, args, [
        a => a,
        b => b,
    ]);

    match (to_f64(b), compare_numbers(a, b)) {
        (Some(_), Some(ordering)) => Return::Local(Value::Boolean(expected(ordering))),
        // NaN is unordered with everything.
        (Some(_), None) => Return::Local(Value::Boolean(false)),
        (None, _) => mismatch(signature),
    }
}

fn lt(_: &mut Universe, args: &[Value]) -> Return {
    compare("Double>>#<", args, Ordering::is_lt)
}

fn lte(_: &mut Universe, args: &[Value]) -> Return {
    compare("Double>>#<=", args, Ordering::is_le)
}

fn gt(_: &mut Universe, args: &[Value]) -> Return {
    compare("Double>>#>", args, Ordering::is_gt)
}

fn gte(_: &mut Universe, args: &[Value]) -> Return {
    compare("Double>>#>=", args, Ordering::is_ge)
}
