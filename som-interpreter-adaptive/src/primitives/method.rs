use crate::expect_args;
use crate::invokable::{Invoke, Return};
use crate::primitives::PrimitiveFn;
use crate::universe::Universe;
use crate::value::Value;

pub static INSTANCE_PRIMITIVES: &[(&str, PrimitiveFn)] = &[
    ("holder", self::holder),
    ("signature", self::signature),
    ("invokeOn:with:", self::invoke_on_with),
];
pub static CLASS_PRIMITIVES: &[(&str, PrimitiveFn)] = &[];

fn holder(_: &mut Universe, args: &[Value]) -> Return {
    const SIGNATURE: &str = "Method>>#holder";

    expect_args!(SIGNATURE, args, [
        Value::Invokable(invokable) => invokable,
    ]);

    Return::Local(Value::Class(invokable.holder()))
}

fn signature(_: &mut Universe, args: &[Value]) -> Return {
    const SIGNATURE: &str = "Method>>#signature";

    expect_args!(SIGNATURE, args, [
        Value::Invokable(invokable) => invokable,
    ]);

    Return::Local(Value::Symbol(invokable.signature()))
}

fn invoke_on_with(universe: &mut Universe, args: &[Value]) -> Return {
    const SIGNATURE: &str = "Method>>#invokeOn:with:";

    expect_args!(SIGNATURE, args, [
        Value::Invokable(invokable) => invokable,
        receiver => receiver,
        Value::Array(args) => args,
    ]);

    let args = std::iter::once(receiver.clone())
        .chain(args.borrow().iter().cloned())
        .collect();
    invokable.invoke(universe, args)
}
