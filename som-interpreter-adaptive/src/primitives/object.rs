use std::collections::hash_map::DefaultHasher;
use std::convert::TryFrom;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use crate::error::ExecError;
use crate::expect_args;
use crate::interner::Interned;
use crate::invokable::{Invoke, Return};
use crate::primitives::{failure, PrimitiveFn};
use crate::universe::Universe;
use crate::value::Value;

pub static INSTANCE_PRIMITIVES: &[(&str, PrimitiveFn)] = &[
    ("class", self::class),
    ("hashcode", self::hashcode),
    ("perform:", self::perform),
    ("perform:with:", self::perform_with),
    ("perform:withArguments:", self::perform_with_arguments),
    ("perform:inSuperclass:", self::perform_in_super_class),
    ("instVarAt:", self::inst_var_at),
    ("instVarAt:put:", self::inst_var_at_put),
    ("doesNotUnderstand:arguments:", self::does_not_understand),
    ("==", self::eq),
];
pub static CLASS_PRIMITIVES: &[(&str, PrimitiveFn)] = &[];

fn class(universe: &mut Universe, args: &[Value]) -> Return {
    const SIGNATURE: &str = "Object>>#class";

    expect_args!(SIGNATURE, args, [
        object => object,
    ]);

    Return::Local(Value::Class(object.class(universe)))
}

fn hashcode(universe: &mut Universe, args: &[Value]) -> Return {
    const SIGNATURE: &str = "Object>>#hashcode";

    expect_args!(SIGNATURE, args, [
        value => value,
    ]);

    let mut hasher = DefaultHasher::new();
    match value {
        Value::Instance(instance) => Rc::as_ptr(instance).hash(&mut hasher),
        Value::Array(values) => Rc::as_ptr(values).hash(&mut hasher),
        Value::Block(block) => Rc::as_ptr(block).hash(&mut hasher),
        Value::Invokable(method) => Rc::as_ptr(method).hash(&mut hasher),
        Value::Class(class) => class.0.hash(&mut hasher),
        Value::Symbol(sym) => sym.0.hash(&mut hasher),
        value => value.to_string(universe).hash(&mut hasher),
    }

    Return::Local(Value::Integer((hasher.finish() >> 1) as i64))
}

fn eq(_: &mut Universe, args: &[Value]) -> Return {
    const SIGNATURE: &str = "Object>>#==";

    expect_args!(SIGNATURE, args, [
        a => a,
        b => b,
    ]);

    Return::Local(Value::Boolean(a == b))
}

/// Send `selector` to `object`, the way a message send would.
fn perform_message(
    universe: &mut Universe,
    object: &Value,
    selector: Interned,
    arguments: Vec<Value>,
) -> Return {
    let args = std::iter::once(object.clone()).chain(arguments).collect();
    universe.send_message(selector, args)
}

fn perform(universe: &mut Universe, args: &[Value]) -> Return {
    const SIGNATURE: &str = "Object>>#perform:";

    expect_args!(SIGNATURE, args, [
        object => object,
        Value::Symbol(sym) => sym,
    ]);

    perform_message(universe, object, *sym, Vec::new())
}

fn perform_with(universe: &mut Universe, args: &[Value]) -> Return {
    const SIGNATURE: &str = "Object>>#perform:with:";

    expect_args!(SIGNATURE, args, [
        object => object,
        Value::Symbol(sym) => sym,
        argument => argument,
    ]);

    perform_message(universe, object, *sym, vec![argument.clone()])
}

fn perform_with_arguments(universe: &mut Universe, args: &[Value]) -> Return {
    const SIGNATURE: &str = "Object>>#perform:withArguments:";

    expect_args!(SIGNATURE, args, [
        object => object,
        Value::Symbol(sym) => sym,
        Value::Array(arr) => arr,
    ]);

    let arguments = arr.borrow().clone();
    perform_message(universe, object, *sym, arguments)
}

fn perform_in_super_class(universe: &mut Universe, args: &[Value]) -> Return {
    const SIGNATURE: &str = "Object>>#perform:inSuperclass:";

    expect_args!(SIGNATURE, args, [
        object => object,
        Value::Symbol(sym) => sym,
        Value::Class(class) => class,
    ]);

    match universe.lookup_method(*class, *sym) {
        Some(method) => method.invoke(universe, vec![object.clone()]),
        None => universe.does_not_understand(object.clone(), *sym, Vec::new()),
    }
}

fn inst_var_at(universe: &mut Universe, args: &[Value]) -> Return {
    const SIGNATURE: &str = "Object>>#instVarAt:";

    expect_args!(SIGNATURE, args, [
        object => object,
        Value::Integer(index) => index,
    ]);

    let value = usize::try_from(index - 1)
        .ok()
        .and_then(|index| universe.read_field(object, index));

    match value {
        Some(value) => Return::Local(value),
        None => failure(
            SIGNATURE,
            format!("'{}' has no field #{}", object.to_string(universe), index),
        ),
    }
}

fn inst_var_at_put(universe: &mut Universe, args: &[Value]) -> Return {
    const SIGNATURE: &str = "Object>>#instVarAt:put:";

    expect_args!(SIGNATURE, args, [
        object => object,
        Value::Integer(index) => index,
        value => value,
    ]);

    let written = usize::try_from(index - 1)
        .ok()
        .and_then(|index| universe.write_field(object, index, value.clone()));

    match written {
        Some(()) => Return::Local(value.clone()),
        None => failure(
            SIGNATURE,
            format!("'{}' has no field #{}", object.to_string(universe), index),
        ),
    }
}

/// The default reaction to a message that was not understood: raise an error.
fn does_not_understand(universe: &mut Universe, args: &[Value]) -> Return {
    const SIGNATURE: &str = "Object>>#doesNotUnderstand:arguments:";

    expect_args!(SIGNATURE, args, [
        object => object,
        Value::Symbol(sym) => sym,
        _,
    ]);

    Return::error(ExecError::MessageNotUnderstood {
        receiver: object.to_string(universe),
        selector: universe.lookup_symbol(*sym).to_string(),
    })
}
