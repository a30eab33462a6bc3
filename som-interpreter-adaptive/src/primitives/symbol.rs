use std::rc::Rc;

use crate::expect_args;
use crate::invokable::Return;
use crate::primitives::PrimitiveFn;
use crate::universe::Universe;
use crate::value::Value;

pub static INSTANCE_PRIMITIVES: &[(&str, PrimitiveFn)] = &[("asString", self::as_string)];
pub static CLASS_PRIMITIVES: &[(&str, PrimitiveFn)] = &[];

fn as_string(universe: &mut Universe, args: &[Value]) -> Return {
    const SIGNATURE: &str = "Symbol>>#asString";

    expect_args!(SIGNATURE, args, [
        Value::Symbol(sym) => sym,
    ]);

    Return::Local(Value::String(Rc::new(
        universe.lookup_symbol(*sym).to_string(),
    )))
}
