use num_bigint::BigInt;

use som_interpreter_adaptive::error::ExecError;
use som_interpreter_adaptive::value::Value;

mod common;
use common::*;

#[test]
fn overflowing_addition_promotes() {
    let mut universe = setup_universe();

    let sum = universe
        .send("+", Value::Integer(i64::MAX), vec![Value::Integer(1)])
        .unwrap();
    assert_eq!(sum, Value::BigInteger(BigInt::from(i64::MAX) + 1));

    let product = universe
        .send("*", Value::Integer(i64::MAX), vec![Value::Integer(2)])
        .unwrap();
    assert_eq!(product, Value::BigInteger(BigInt::from(i64::MAX) * 2));

    let difference = universe
        .send("-", Value::Integer(i64::MIN), vec![Value::Integer(1)])
        .unwrap();
    assert_eq!(difference, Value::BigInteger(BigInt::from(i64::MIN) - 1));
}

#[test]
fn results_that_fit_are_demoted() {
    let mut universe = setup_universe();

    let big = universe
        .send("+", Value::Integer(i64::MAX), vec![Value::Integer(1)])
        .unwrap();
    let back = universe.send("-", big, vec![Value::Integer(1)]).unwrap();
    assert_eq!(back, Value::Integer(i64::MAX));

    let big = Value::BigInteger(BigInt::from(i64::MAX) * 4);
    let quotient = universe.send("/", big, vec![Value::Integer(8)]).unwrap();
    assert_eq!(quotient, Value::Integer(i64::MAX / 2));
}

#[test]
fn mixed_arithmetic() {
    let mut universe = setup_universe();

    let sum = universe
        .send("+", Value::Integer(1), vec![Value::Double(0.5)])
        .unwrap();
    assert_eq!(sum, Value::Double(1.5));

    let sum = universe
        .send("+", Value::Double(0.5), vec![Value::Integer(1)])
        .unwrap();
    assert_eq!(sum, Value::Double(1.5));

    let lt = universe
        .send("<", Value::Integer(3), vec![Value::BigInteger(BigInt::from(u64::MAX))])
        .unwrap();
    assert_eq!(lt, Value::Boolean(true));

    let eq = universe
        .send("=", Value::Integer(3), vec![Value::Double(3.0)])
        .unwrap();
    assert_eq!(eq, Value::Boolean(true));
}

#[test]
fn integer_division_rounds_down() {
    let mut universe = setup_universe();

    let quotient = universe
        .send("/", Value::Integer(-7), vec![Value::Integer(2)])
        .unwrap();
    assert_eq!(quotient, Value::Integer(-4));

    let modulo = universe
        .send("%", Value::Integer(-7), vec![Value::Integer(2)])
        .unwrap();
    assert_eq!(modulo, Value::Integer(1));

    let remainder = universe
        .send("rem:", Value::Integer(-7), vec![Value::Integer(2)])
        .unwrap();
    assert_eq!(remainder, Value::Integer(-1));

    let quotient = universe
        .send("/", Value::Integer(i64::MIN), vec![Value::Integer(-1)])
        .unwrap();
    assert_eq!(quotient, Value::BigInteger(-BigInt::from(i64::MIN)));
}

#[test]
fn modulo_and_remainder_accept_big_integers() {
    let mut universe = setup_universe();
    let big: BigInt = BigInt::from(1) << 70;

    let modulo = universe
        .send("%", Value::BigInteger(big.clone()), vec![Value::Integer(7)])
        .unwrap();
    assert_eq!(modulo, Value::Integer(2));

    let modulo = universe
        .send("%", Value::BigInteger(-big.clone()), vec![Value::Integer(7)])
        .unwrap();
    assert_eq!(modulo, Value::Integer(5));

    let modulo = universe
        .send("%", Value::BigInteger(big.clone()), vec![Value::Integer(-7)])
        .unwrap();
    assert_eq!(modulo, Value::Integer(-5));

    let remainder = universe
        .send("rem:", Value::BigInteger(-big.clone()), vec![Value::Integer(7)])
        .unwrap();
    assert_eq!(remainder, Value::Integer(-2));

    let modulo = universe
        .send("%", Value::Integer(3), vec![Value::BigInteger(big.clone())])
        .unwrap();
    assert_eq!(modulo, Value::Integer(3));

    let modulo = universe
        .send(
            "%",
            Value::BigInteger(&big * 3 + 1),
            vec![Value::BigInteger(big.clone())],
        )
        .unwrap();
    assert_eq!(modulo, Value::Integer(1));

    let err = universe
        .send("rem:", Value::BigInteger(big), vec![Value::Integer(0)])
        .unwrap_err();
    assert!(matches!(err.error, ExecError::Primitive { .. }));
}

#[test]
fn square_roots_are_exact() {
    let mut universe = setup_universe();
    let root: i64 = 3_037_000_499;

    let output = universe
        .send("sqrt", Value::Integer(root * root), vec![])
        .unwrap();
    assert_eq!(output, Value::Integer(root));

    // rounds to a perfect square as a double, but is not one
    let output = universe
        .send("sqrt", Value::Integer(root * root + 1), vec![])
        .unwrap();
    assert!(matches!(output, Value::Double(_)), "unexpected result: {:?}", output);

    let output = universe.send("sqrt", Value::Integer(2), vec![]).unwrap();
    assert_eq!(output, Value::Double(2f64.sqrt()));
}

#[test]
fn division_by_zero_fails() {
    let mut universe = setup_universe();

    let err = universe
        .send("/", Value::Integer(1), vec![Value::Integer(0)])
        .unwrap_err();
    assert!(matches!(err.error, ExecError::Primitive { .. }));
}

#[test]
fn computed_in_methods() {
    let mut universe = setup_universe();

    // factorial: n = ( n <= 1 ifTrue: [ ^ 1 ]. ^ n * (self factorial: n - 1) )
    let factorial = method(
        "factorial:",
        &["n"],
        &[],
        vec![
            send(
                send(arg(0, 0), "<=", vec![int(1)]),
                "ifTrue:",
                vec![block(&[], &[], vec![ret(int(1))])],
            ),
            ret(send(
                arg(0, 0),
                "*",
                vec![send(this(), "factorial:", vec![send(arg(0, 0), "-", vec![int(1)])])],
            )),
        ],
    );
    let class = universe
        .define_class(&class_def("Math", None, &[], vec![factorial]))
        .unwrap();
    let math = universe.instantiate(class);

    let output = universe
        .send("factorial:", math.clone(), vec![Value::Integer(20)])
        .unwrap();
    assert_eq!(output, Value::Integer(2_432_902_008_176_640_000));

    let output = universe
        .send("factorial:", math, vec![Value::Integer(25)])
        .unwrap();
    let expected: BigInt = "15511210043330985984000000".parse().unwrap();
    assert_eq!(output, Value::BigInteger(expected));
}
