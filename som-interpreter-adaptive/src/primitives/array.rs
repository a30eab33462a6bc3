use std::cell::RefCell;
use std::convert::TryFrom;
use std::rc::Rc;

use crate::expect_args;
use crate::invokable::Return;
use crate::primitives::{failure, PrimitiveFn};
use crate::universe::Universe;
use crate::value::Value;

pub static INSTANCE_PRIMITIVES: &[(&str, PrimitiveFn)] = &[
    ("at:", self::at),
    ("at:put:", self::at_put),
    ("length", self::length),
];

pub static CLASS_PRIMITIVES: &[(&str, PrimitiveFn)] = &[("new:", self::new)];

/// Convert a 1-based index into an offset within `length` elements.
fn offset(index: i64, length: usize) -> Option<usize> {
    usize::try_from(index - 1).ok().filter(|offset| *offset < length)
}

fn at(_: &mut Universe, args: &[Value]) -> Return {
    const SIGNATURE: &str = "Array>>#at:";

    expect_args!(SIGNATURE, args, [
        Value::Array(values) => values,
        Value::Integer(index) => index,
    ]);

    let values = values.borrow();
    match offset(*index, values.len()) {
        Some(offset) => Return::Local(values[offset].clone()),
        None => failure(
            SIGNATURE,
            format!("index {} out of bounds (length is {})", index, values.len()),
        ),
    }
}

fn at_put(_: &mut Universe, args: &[Value]) -> Return {
    const SIGNATURE: &str = "Array>>#at:put:";

    expect_args!(SIGNATURE, args, [
        Value::Array(values) => values,
        Value::Integer(index) => index,
        value => value,
    ]);

    let length = values.borrow().len();
    match offset(*index, length) {
        Some(offset) => {
            values.borrow_mut()[offset] = value.clone();
            Return::Local(Value::Array(values.clone()))
        }
        None => failure(
            SIGNATURE,
            format!("index {} out of bounds (length is {})", index, length),
        ),
    }
}

fn length(_: &mut Universe, args: &[Value]) -> Return {
    const SIGNATURE: &str = "Array>>#length";

    expect_args!(SIGNATURE, args, [
        Value::Array(values) => values,
    ]);

    let length = values.borrow().len();
    match i64::try_from(length) {
        Ok(length) => Return::Local(Value::Integer(length)),
        Err(err) => failure(SIGNATURE, err.to_string()),
    }
}

fn new(_: &mut Universe, args: &[Value]) -> Return {
    const SIGNATURE: &str = "Array>>#new:";

    expect_args!(SIGNATURE, args, [
        _,
        Value::Integer(count) => count,
    ]);

    match usize::try_from(*count) {
        Ok(length) => Return::Local(Value::Array(Rc::new(RefCell::new(vec![
            Value::Nil;
            length
        ])))),
        Err(err) => failure(SIGNATURE, err.to_string()),
    }
}
