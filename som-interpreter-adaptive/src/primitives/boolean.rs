use crate::expect_args;
use crate::invokable::Return;
use crate::primitives::PrimitiveFn;
use crate::universe::Universe;
use crate::value::Value;

pub static INSTANCE_PRIMITIVES: &[(&str, PrimitiveFn)] = &[
    ("ifTrue:", self::if_true),
    ("ifFalse:", self::if_false),
    ("ifTrue:ifFalse:", self::if_true_if_false),
    ("ifFalse:ifTrue:", self::if_false_if_true),
    ("not", self::not),
    ("&", self::and),
    ("|", self::or),
];
pub static CLASS_PRIMITIVES: &[(&str, PrimitiveFn)] = &[];

/// The value of a branch: blocks without parameters get evaluated, anything else is the value itself.
fn branch(universe: &mut Universe, value: &Value) -> Return {
    match value {
        Value::Block(block) if block.nb_parameters() == 0 => block.call(universe, Vec::new()),
        value => Return::Local(value.clone()),
    }
}

fn if_true(universe: &mut Universe, args: &[Value]) -> Return {
    const SIGNATURE: &str = "Boolean>>#ifTrue:";

    expect_args!(SIGNATURE, args, [
        Value::Boolean(condition) => condition,
        then => then,
    ]);

    if *condition {
        branch(universe, then)
    } else {
        Return::Local(Value::Nil)
    }
}

fn if_false(universe: &mut Universe, args: &[Value]) -> Return {
    const SIGNATURE: &str = "Boolean>>#ifFalse:";

    expect_args!(SIGNATURE, args, [
        Value::Boolean(condition) => condition,
        otherwise => otherwise,
    ]);

    if *condition {
        Return::Local(Value::Nil)
    } else {
        branch(universe, otherwise)
    }
}

fn if_true_if_false(universe: &mut Universe, args: &[Value]) -> Return {
    const SIGNATURE: &str = "Boolean>>#ifTrue:ifFalse:";

    expect_args!(SIGNATURE, args, [
        Value::Boolean(condition) => condition,
        then => then,
        otherwise => otherwise,
    ]);

    branch(universe, if *condition { then } else { otherwise })
}

fn if_false_if_true(universe: &mut Universe, args: &[Value]) -> Return {
    const SIGNATURE: &str = "Boolean>>#ifFalse:ifTrue:";

    expect_args!(SIGNATURE, args, [
        Value::Boolean(condition) => condition,
        otherwise => otherwise,
        then => then,
    ]);

    branch(universe, if *condition { then } else { otherwise })
}

fn not(_: &mut Universe, args: &[Value]) -> Return {
    const SIGNATURE: &str = "Boolean>>#not";

    expect_args!(SIGNATURE, args, [
        Value::Boolean(value) => value,
    ]);

    Return::Local(Value::Boolean(!value))
}

fn and(universe: &mut Universe, args: &[Value]) -> Return {
    const SIGNATURE: &str = "Boolean>>#&";

    expect_args!(SIGNATURE, args, [
        Value::Boolean(value) => value,
        other => other,
    ]);

    if *value {
        branch(universe, other)
    } else {
        Return::Local(Value::Boolean(false))
    }
}

fn or(universe: &mut Universe, args: &[Value]) -> Return {
    const SIGNATURE: &str = "Boolean>>#|";

    expect_args!(SIGNATURE, args, [
        Value::Boolean(value) => value,
        other => other,
    ]);

    if *value {
        Return::Local(Value::Boolean(true))
    } else {
        branch(universe, other)
    }
}
