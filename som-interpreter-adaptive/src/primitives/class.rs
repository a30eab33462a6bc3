use std::cell::RefCell;
use std::rc::Rc;

use crate::expect_args;
use crate::invokable::Return;
use crate::primitives::PrimitiveFn;
use crate::universe::Universe;
use crate::value::Value;

pub static INSTANCE_PRIMITIVES: &[(&str, PrimitiveFn)] = &[
    ("new", self::new),
    ("name", self::name),
    ("fields", self::fields),
    ("methods", self::methods),
    ("superclass", self::superclass),
];
pub static CLASS_PRIMITIVES: &[(&str, PrimitiveFn)] = &[];

fn superclass(universe: &mut Universe, args: &[Value]) -> Return {
    const SIGNATURE: &str = "Class>>#superclass";

    expect_args!(SIGNATURE, args, [
        Value::Class(class) => class,
    ]);

    let super_class = universe.class(*class).super_class();
    Return::Local(super_class.map(Value::Class).unwrap_or(Value::Nil))
}

fn new(universe: &mut Universe, args: &[Value]) -> Return {
    const SIGNATURE: &str = "Class>>#new";

    expect_args!(SIGNATURE, args, [
        Value::Class(class) => class,
    ]);

    Return::Local(universe.instantiate(*class))
}

fn name(universe: &mut Universe, args: &[Value]) -> Return {
    const SIGNATURE: &str = "Class>>#name";

    expect_args!(SIGNATURE, args, [
        Value::Class(class) => class,
    ]);

    let name = universe.class(*class).name().to_string();
    Return::Local(Value::Symbol(universe.intern_symbol(&name)))
}

fn methods(universe: &mut Universe, args: &[Value]) -> Return {
    const SIGNATURE: &str = "Class>>#methods";

    expect_args!(SIGNATURE, args, [
        Value::Class(class) => class,
    ]);

    let methods = universe
        .class(*class)
        .methods
        .values()
        .map(|method| Value::Invokable(method.clone()))
        .collect();

    Return::Local(Value::Array(Rc::new(RefCell::new(methods))))
}

fn fields(universe: &mut Universe, args: &[Value]) -> Return {
    const SIGNATURE: &str = "Class>>#fields";

    expect_args!(SIGNATURE, args, [
        Value::Class(class) => class,
    ]);

    let names = universe.class(*class).fields.clone();
    let fields = names
        .iter()
        .map(|field| Value::Symbol(universe.intern_symbol(field)))
        .collect();

    Return::Local(Value::Array(Rc::new(RefCell::new(fields))))
}
