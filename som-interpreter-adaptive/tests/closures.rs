use som_interpreter_adaptive::universe::Universe;
use som_interpreter_adaptive::value::Value;

mod common;
use common::*;

fn define_closures(universe: &mut Universe) -> Value {
    // makeCounter = ( | count | count := 0. ^ [ count := count + 1 ] )
    let make_counter = method(
        "makeCounter",
        &[],
        &["count"],
        vec![
            assign_local(0, 0, int(0)),
            ret(block(
                &[],
                &[],
                vec![assign_local(1, 0, send(local(1, 0), "+", vec![int(1)]))],
            )),
        ],
    );

    // makeAliased = ( | count counter | count := 0.
    //   counter := [ count := count + 1 ]. count := 10. ^ counter )
    let make_aliased = method(
        "makeAliased",
        &[],
        &["count", "counter"],
        vec![
            assign_local(0, 0, int(0)),
            assign_local(
                0,
                1,
                block(
                    &[],
                    &[],
                    vec![assign_local(1, 0, send(local(1, 0), "+", vec![int(1)]))],
                ),
            ),
            assign_local(0, 0, int(10)),
            ret(local(0, 1)),
        ],
    );

    // adder: n = ( ^ [ :x | x + n ] )
    let adder = method(
        "adder:",
        &["n"],
        &[],
        vec![ret(block(
            &["x"],
            &[],
            vec![send(arg(0, 0), "+", vec![arg(1, 0)])],
        ))],
    );

    // nested: a = ( ^ [ :b | [ :c | a + b + c ] ] )
    let nested = method(
        "nested:",
        &["a"],
        &[],
        vec![ret(block(
            &["b"],
            &[],
            vec![block(
                &["c"],
                &[],
                vec![send(
                    send(arg(2, 0), "+", vec![arg(1, 0)]),
                    "+",
                    vec![arg(0, 0)],
                )],
            )],
        ))],
    );

    // selfie = ( ^ [ self ] )
    let selfie = method("selfie", &[], &[], vec![ret(block(&[], &[], vec![this()]))]);

    // constant = ( ^ [ 42 ] )
    let constant = method("constant", &[], &[], vec![ret(block(&[], &[], vec![int(42)]))]);

    let class = universe
        .define_class(&class_def(
            "Closures",
            None,
            &[],
            vec![make_counter, make_aliased, adder, nested, selfie, constant],
        ))
        .unwrap();
    universe.instantiate(class)
}

#[test]
fn blocks_share_their_enclosing_activation() {
    let mut universe = setup_universe();
    let closures = define_closures(&mut universe);

    let counter = universe.send("makeCounter", closures.clone(), vec![]).unwrap();
    let other = universe.send("makeCounter", closures, vec![]).unwrap();

    for expected in 1..=3 {
        let output = universe.send("value", counter.clone(), vec![]).unwrap();
        assert_eq!(output, Value::Integer(expected));
    }
    let output = universe.send("value", other, vec![]).unwrap();
    assert_eq!(output, Value::Integer(1));
}

#[test]
fn blocks_see_later_writes_of_their_method() {
    let mut universe = setup_universe();
    let closures = define_closures(&mut universe);

    let counter = universe.send("makeAliased", closures, vec![]).unwrap();
    let output = universe.send("value", counter.clone(), vec![]).unwrap();
    assert_eq!(output, Value::Integer(11));
    let output = universe.send("value", counter, vec![]).unwrap();
    assert_eq!(output, Value::Integer(12));
}

#[test]
fn blocks_outlive_their_method() {
    let mut universe = setup_universe();
    let closures = define_closures(&mut universe);

    let add5 = universe
        .send("adder:", closures.clone(), vec![Value::Integer(5)])
        .unwrap();
    let add10 = universe
        .send("adder:", closures, vec![Value::Integer(10)])
        .unwrap();

    let output = universe
        .send("value:", add5.clone(), vec![Value::Integer(1)])
        .unwrap();
    assert_eq!(output, Value::Integer(6));
    let output = universe
        .send("value:", add10, vec![Value::Integer(1)])
        .unwrap();
    assert_eq!(output, Value::Integer(11));
    let output = universe.send("numArgs", add5, vec![]).unwrap();
    assert_eq!(output, Value::Integer(1));
}

#[test]
fn nested_blocks_reach_every_level() {
    let mut universe = setup_universe();
    let closures = define_closures(&mut universe);

    let outer = universe
        .send("nested:", closures, vec![Value::Integer(100)])
        .unwrap();
    let inner = universe
        .send("value:", outer, vec![Value::Integer(20)])
        .unwrap();
    let output = universe
        .send("value:", inner, vec![Value::Integer(3)])
        .unwrap();
    assert_eq!(output, Value::Integer(123));
}

#[test]
fn blocks_see_the_method_receiver() {
    let mut universe = setup_universe();
    let closures = define_closures(&mut universe);

    let selfie = universe.send("selfie", closures.clone(), vec![]).unwrap();
    let output = universe.send("value", selfie, vec![]).unwrap();
    assert_eq!(output, closures);
}

#[test]
fn self_contained_blocks_capture_nothing() {
    let mut universe = setup_universe();
    let closures = define_closures(&mut universe);

    let constant = universe.send("constant", closures.clone(), vec![]).unwrap();
    let Value::Block(block) = &constant else {
        panic!("expected a block, got {:?}", constant);
    };
    assert!(block.frame.is_none());
    let output = universe.send("value", constant.clone(), vec![]).unwrap();
    assert_eq!(output, Value::Integer(42));

    let counter = universe.send("makeCounter", closures, vec![]).unwrap();
    let Value::Block(block) = &counter else {
        panic!("expected a block, got {:?}", counter);
    };
    assert!(block.frame.is_some());
}
