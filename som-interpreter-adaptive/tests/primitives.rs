use som_interpreter_adaptive::error::ExecError;
use som_interpreter_adaptive::value::Value;

mod common;
use common::*;

#[test]
fn wrong_argument_types_are_not_understood() {
    let mut universe = setup_universe();

    let err = universe
        .send("+", Value::Integer(1), vec![Value::String("one".to_string().into())])
        .unwrap_err();
    assert_eq!(
        err.error,
        ExecError::MessageNotUnderstood {
            receiver: "1".to_string(),
            selector: "+".to_string(),
        }
    );
}

#[test]
fn wrong_argument_types_reach_user_handlers() {
    let mut universe = setup_universe();

    // doesNotUnderstand: selector arguments: args = ( ^ selector )
    let integer = universe.integer_class();
    let dnu = method(
        "doesNotUnderstand:arguments:",
        &["selector", "args"],
        &[],
        vec![ret(arg(0, 0))],
    );
    universe.install_method(integer, &dnu).unwrap();

    let output = universe
        .send("bitXor:", Value::Integer(1), vec![Value::Nil])
        .unwrap();
    let selector = universe.intern_symbol("bitXor:");
    assert_eq!(output, Value::Symbol(selector));
}

#[test]
fn primitives_without_implementation_fail_when_called() {
    let mut universe = setup_universe();

    let class = universe
        .define_class(&class_def(
            "Reflective",
            None,
            &[],
            vec![primitive("teleport", &[])],
        ))
        .unwrap();
    let instance = universe.instantiate(class);

    let err = universe.send("teleport", instance, vec![]).unwrap_err();
    assert_eq!(
        err.error,
        ExecError::UnimplementedPrimitive("Reflective>>#teleport".to_string())
    );
}

#[test]
fn strings_and_symbols() {
    let mut universe = setup_universe();

    let hello = Value::String("hello, ".to_string().into());
    let world = Value::String("world".to_string().into());
    let output = universe
        .send("concatenate:", hello, vec![world])
        .unwrap();
    assert_eq!(output, Value::String("hello, world".to_string().into()));

    let output = universe.send("length", output, vec![]).unwrap();
    assert_eq!(output, Value::Integer(12));

    let symbol = universe
        .send("asSymbol", Value::String("foo".to_string().into()), vec![])
        .unwrap();
    let foo = universe.intern_symbol("foo");
    assert_eq!(symbol, Value::Symbol(foo));

    let output = universe
        .send("=", Value::String("foo".to_string().into()), vec![symbol])
        .unwrap();
    assert_eq!(output, Value::Boolean(true));
}

#[test]
fn arrays_are_one_based() {
    let mut universe = setup_universe();

    let array = universe.global("Array").unwrap();
    let array = universe.send("new:", array, vec![Value::Integer(3)]).unwrap();

    universe
        .send("at:put:", array.clone(), vec![Value::Integer(1), Value::Integer(10)])
        .unwrap();
    let output = universe
        .send("at:", array.clone(), vec![Value::Integer(1)])
        .unwrap();
    assert_eq!(output, Value::Integer(10));
    let output = universe
        .send("at:", array.clone(), vec![Value::Integer(3)])
        .unwrap();
    assert_eq!(output, Value::Nil);

    let err = universe
        .send("at:", array.clone(), vec![Value::Integer(4)])
        .unwrap_err();
    assert!(matches!(err.error, ExecError::Primitive { .. }));

    let output = universe.send("length", array, vec![]).unwrap();
    assert_eq!(output, Value::Integer(3));
}

#[test]
fn unknown_globals_fail() {
    let mut universe = setup_universe();

    let probe = method("probe", &[], &[], vec![ret(global("Missing"))]);
    let class = universe
        .define_class(&class_def("Prober", None, &[], vec![probe]))
        .unwrap();
    let instance = universe.instantiate(class);

    let err = universe.send("probe", instance, vec![]).unwrap_err();
    assert_eq!(err.error, ExecError::UnknownGlobal("Missing".to_string()));
    assert_eq!(err.backtrace, vec!["Prober>>#probe".to_string()]);
}

#[test]
fn unknown_globals_reach_the_receiver_from_blocks() {
    let mut universe = setup_universe();

    // unknownGlobal: name = ( ^ 42 )
    // direct = ( ^ Missing )
    // inBlock = ( ^ [ Missing ] value )
    let methods = vec![
        method("unknownGlobal:", &["name"], &[], vec![ret(int(42))]),
        method("direct", &[], &[], vec![ret(global("Missing"))]),
        method(
            "inBlock",
            &[],
            &[],
            vec![ret(send(block(&[], &[], vec![global("Missing")]), "value", vec![]))],
        ),
    ];
    let class = universe
        .define_class(&class_def("Hooked", None, &[], methods))
        .unwrap();
    let instance = universe.instantiate(class);

    let output = universe.send("direct", instance.clone(), vec![]).unwrap();
    assert_eq!(output, Value::Integer(42));
    let output = universe.send("inBlock", instance, vec![]).unwrap();
    assert_eq!(output, Value::Integer(42));
}
