use std::collections::hash_map::DefaultHasher;
use std::convert::TryFrom;
use std::hash::Hasher;
use std::rc::Rc;

use crate::expect_args;
use crate::invokable::Return;
use crate::primitives::{failure, mismatch, PrimitiveFn};
use crate::universe::Universe;
use crate::value::Value;

pub static INSTANCE_PRIMITIVES: &[(&str, PrimitiveFn)] = &[
    ("length", self::length),
    ("hashcode", self::hashcode),
    ("isLetters", self::is_letters),
    ("isDigits", self::is_digits),
    ("asSymbol", self::as_symbol),
    ("concatenate:", self::concatenate),
    ("primSubstringFrom:to:", self::prim_substring_from_to),
    ("=", self::eq),
];
pub static CLASS_PRIMITIVES: &[(&str, PrimitiveFn)] = &[];

/// Get the text of a string or a symbol.
fn text<'a>(universe: &'a Universe, value: &'a Value) -> Option<&'a str> {
    match value {
        Value::String(value) => Some(value.as_str()),
        Value::Symbol(sym) => Some(universe.lookup_symbol(*sym)),
        _ => None,
    }
}

fn length(universe: &mut Universe, args: &[Value]) -> Return {
    const SIGNATURE: &str = "String>>#length";

    expect_args!(SIGNATURE, args, [
        value => value,
    ]);

    let Some(value) = text(universe, value) else {
        return mismatch(SIGNATURE);
    };

    match i64::try_from(value.chars().count()) {
        Ok(length) => Return::Local(Value::Integer(length)),
        Err(err) => failure(SIGNATURE, err.to_string()),
    }
}

fn hashcode(universe: &mut Universe, args: &[Value]) -> Return {
    const SIGNATURE: &str = "String>>#hashcode";

    expect_args!(SIGNATURE, args, [
        value => value,
    ]);

    let Some(value) = text(universe, value) else {
        return mismatch(SIGNATURE);
    };

    let mut hasher = DefaultHasher::new();
    hasher.write(value.as_bytes());

    Return::Local(Value::Integer((hasher.finish() >> 1) as i64))
}

fn is_letters(universe: &mut Universe, args: &[Value]) -> Return {
    const SIGNATURE: &str = "String>>#isLetters";

    expect_args!(SIGNATURE, args, [
        value => value,
    ]);

    let Some(value) = text(universe, value) else {
        return mismatch(SIGNATURE);
    };

    Return::Local(Value::Boolean(
        !value.is_empty() && value.chars().all(char::is_alphabetic),
    ))
}

fn is_digits(universe: &mut Universe, args: &[Value]) -> Return {
    const SIGNATURE: &str = "String>>#isDigits";

    expect_args!(SIGNATURE, args, [
        value => value,
    ]);

    let Some(value) = text(universe, value) else {
        return mismatch(SIGNATURE);
    };

    Return::Local(Value::Boolean(
        !value.is_empty() && value.chars().all(char::is_numeric),
    ))
}

fn concatenate(universe: &mut Universe, args: &[Value]) -> Return {
    const SIGNATURE: &str = "String>>#concatenate:";

    expect_args!(SIGNATURE, args, [
        s1 => s1,
        s2 => s2,
    ]);

    let (Some(s1), Some(s2)) = (text(universe, s1), text(universe, s2)) else {
        return mismatch(SIGNATURE);
    };

    Return::Local(Value::String(Rc::new(format!("{}{}", s1, s2))))
}

fn as_symbol(universe: &mut Universe, args: &[Value]) -> Return {
    const SIGNATURE: &str = "String>>#asSymbol";

    expect_args!(SIGNATURE, args, [
        value => value,
    ]);

    match value {
        Value::String(value) => Return::Local(Value::Symbol(universe.intern_symbol(value.as_str()))),
        Value::Symbol(sym) => Return::Local(Value::Symbol(*sym)),
        _ => mismatch(SIGNATURE),
    }
}

fn eq(universe: &mut Universe, args: &[Value]) -> Return {
    const SIGNATURE: &str = "String>>#=";

    expect_args!(SIGNATURE, args, [
        s1 => s1,
        s2 => s2,
    ]);

    let equal = match (s1, s2) {
        // symbols are unique
        (Value::Symbol(a), Value::Symbol(b)) => a == b,
        _ => match (text(universe, s1), text(universe, s2)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        },
    };

    Return::Local(Value::Boolean(equal))
}

fn prim_substring_from_to(universe: &mut Universe, args: &[Value]) -> Return {
    const SIGNATURE: &str = "String>>#primSubstringFrom:to:";

    expect_args!(SIGNATURE, args, [
        value => value,
        Value::Integer(from) => from,
        Value::Integer(to) => to,
    ]);

    let (Some(value), Ok(from), Ok(to)) = (
        text(universe, value),
        usize::try_from(from - 1),
        usize::try_from(*to),
    ) else {
        return mismatch(SIGNATURE);
    };

    let string = Rc::new(value.chars().skip(from).take(to.saturating_sub(from)).collect());

    Return::Local(Value::String(string))
}
