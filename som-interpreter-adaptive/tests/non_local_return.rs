use som_interpreter_adaptive::error::ExecError;
use som_interpreter_adaptive::universe::Universe;
use som_interpreter_adaptive::value::Value;

mod common;
use common::*;

fn define_returns(universe: &mut Universe) -> Value {
    // deep = ( [ [ [ ^ 42 ] value ] value ] value. ^ 0 )
    let deep = method(
        "deep",
        &[],
        &[],
        vec![
            send(
                block(
                    &[],
                    &[],
                    vec![send(
                        block(&[], &[], vec![send(block(&[], &[], vec![ret(int(42))]), "value", vec![])]),
                        "value",
                        vec![],
                    )],
                ),
                "value",
                vec![],
            ),
            ret(int(0)),
        ],
    );

    // escaper = ( ^ [ :x | ^ x ] )
    let escaper = method(
        "escaper",
        &[],
        &[],
        vec![ret(block(&["x"], &[], vec![ret(arg(0, 0))]))],
    );

    // callEscaped = ( ^ self escaper value: 7 )
    let call_escaped = method(
        "callEscaped",
        &[],
        &[],
        vec![ret(send(send(this(), "escaper", vec![]), "value:", vec![int(7)]))],
    );

    // through: aBlock = ( aBlock value. ^ #unreached )
    let through = method(
        "through:",
        &["aBlock"],
        &[],
        vec![send(arg(0, 0), "value", vec![]), ret(symbol("unreached"))],
    );

    // viaOtherMethod = ( self through: [ ^ #home ]. ^ #fallthrough )
    let via_other_method = method(
        "viaOtherMethod",
        &[],
        &[],
        vec![
            send(this(), "through:", vec![block(&[], &[], vec![ret(symbol("home"))])]),
            ret(symbol("fallthrough")),
        ],
    );

    // implicit = ( 1 + 1 )
    let implicit = method("implicit", &[], &[], vec![send(int(1), "+", vec![int(1)])]);

    let class = universe
        .define_class(&class_def(
            "Returns",
            None,
            &[],
            vec![deep, escaper, call_escaped, through, via_other_method, implicit],
        ))
        .unwrap();
    universe.instantiate(class)
}

#[test]
fn returns_from_nested_blocks() {
    let mut universe = setup_universe();
    let returns = define_returns(&mut universe);

    let output = universe.send("deep", returns, vec![]).unwrap();
    assert_eq!(output, Value::Integer(42));
}

#[test]
fn returns_through_other_methods() {
    let mut universe = setup_universe();
    let returns = define_returns(&mut universe);

    let output = universe.send("viaOtherMethod", returns, vec![]).unwrap();
    let home = universe.intern_symbol("home");
    assert_eq!(output, Value::Symbol(home));
}

#[test]
fn methods_without_return_answer_self() {
    let mut universe = setup_universe();
    let returns = define_returns(&mut universe);

    let output = universe.send("implicit", returns.clone(), vec![]).unwrap();
    assert_eq!(output, returns);
}

#[test]
fn escaped_return_is_an_error() {
    let mut universe = setup_universe();
    let returns = define_returns(&mut universe);

    let escaped = universe.send("escaper", returns, vec![]).unwrap();
    let err = universe
        .send("value:", escaped, vec![Value::Integer(1)])
        .unwrap_err();
    assert!(
        matches!(&err.error, ExecError::EscapedNonLocalReturn { method, .. } if method == "Returns>>#escaper"),
        "unexpected error: {}",
        err
    );
}

#[test]
fn escaped_return_unwinds_with_a_backtrace() {
    let mut universe = setup_universe();
    let returns = define_returns(&mut universe);

    let err = universe.send("callEscaped", returns, vec![]).unwrap_err();
    assert!(matches!(err.error, ExecError::EscapedNonLocalReturn { .. }));
    assert_eq!(err.backtrace, vec!["Returns>>#callEscaped".to_string()]);
}
