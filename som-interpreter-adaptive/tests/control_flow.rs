use som_interpreter_adaptive::config::UniverseConfig;
use som_interpreter_adaptive::dispatch::CacheState;
use som_interpreter_adaptive::universe::Universe;
use som_interpreter_adaptive::value::Value;

mod common;
use common::*;

fn define_control(universe: &mut Universe) -> Value {
    // choose: c = ( ^ c ifTrue: [ 1 ] ifFalse: [ 2 ] )
    let choose = method(
        "choose:",
        &["c"],
        &[],
        vec![ret(send(
            arg(0, 0),
            "ifTrue:ifFalse:",
            vec![block(&[], &[], vec![int(1)]), block(&[], &[], vec![int(2)])],
        ))],
    );

    // guard: c = ( ^ c ifTrue: 5 )
    let guard = method(
        "guard:",
        &["c"],
        &[],
        vec![ret(send(arg(0, 0), "ifTrue:", vec![int(5)]))],
    );

    // sumTo: n = ( | i total | i := 0. total := 0.
    //   [ i < n ] whileTrue: [ i := i + 1. total := total + i ]. ^ total )
    let sum_to = method(
        "sumTo:",
        &["n"],
        &["i", "total"],
        vec![
            assign_local(0, 0, int(0)),
            assign_local(0, 1, int(0)),
            send(
                block(&[], &[], vec![send(local(1, 0), "<", vec![arg(1, 0)])]),
                "whileTrue:",
                vec![block(
                    &[],
                    &[],
                    vec![
                        assign_local(1, 0, send(local(1, 0), "+", vec![int(1)])),
                        assign_local(1, 1, send(local(1, 1), "+", vec![local(1, 0)])),
                    ],
                )],
            ),
            ret(local(0, 1)),
        ],
    );

    // loopOn: c = ( ^ [ c ] whileFalse: [ ] )
    let loop_on = method(
        "loopOn:",
        &["c"],
        &[],
        vec![ret(send(
            block(&[], &[], vec![arg(1, 0)]),
            "whileFalse:",
            vec![block(&[], &[], vec![])],
        ))],
    );

    let class = universe
        .define_class(&class_def(
            "Control",
            None,
            &[],
            vec![choose, guard, sum_to, loop_on],
        ))
        .unwrap();
    universe.instantiate(class)
}

/// A class answering `ifTrue:ifFalse:` with 99.
fn define_fuzzy(universe: &mut Universe) -> Value {
    let if_true_if_false = method(
        "ifTrue:ifFalse:",
        &["then", "otherwise"],
        &[],
        vec![ret(int(99))],
    );
    let class = universe
        .define_class(&class_def("Fuzzy", None, &[], vec![if_true_if_false]))
        .unwrap();
    universe.instantiate(class)
}

fn site_state(universe: &mut Universe, receiver: &Value, selector: &str) -> CacheState {
    let selector = universe.intern_symbol(selector);
    let method = receiver.lookup_method(universe, selector).unwrap();
    let site = *method.call_sites().last().unwrap();
    universe.call_site_state(site)
}

#[test]
fn booleans_take_the_fast_path() {
    let mut universe = setup_universe();
    let control = define_control(&mut universe);

    let output = universe
        .send("choose:", control.clone(), vec![Value::Boolean(true)])
        .unwrap();
    assert_eq!(output, Value::Integer(1));
    let output = universe
        .send("choose:", control.clone(), vec![Value::Boolean(false)])
        .unwrap();
    assert_eq!(output, Value::Integer(2));

    // the fast path never goes through the message send
    assert_eq!(site_state(&mut universe, &control, "choose:"), CacheState::Uninitialized);
}

#[test]
fn other_receivers_despecialize_the_site() {
    let mut universe = setup_universe();
    let control = define_control(&mut universe);
    let fuzzy = define_fuzzy(&mut universe);

    let output = universe
        .send("choose:", control.clone(), vec![Value::Boolean(true)])
        .unwrap();
    assert_eq!(output, Value::Integer(1));

    let output = universe
        .send("choose:", control.clone(), vec![fuzzy])
        .unwrap();
    assert_eq!(output, Value::Integer(99));
    assert_eq!(site_state(&mut universe, &control, "choose:"), CacheState::Monomorphic);

    // booleans now go through the regular send, and still get the same answer
    let output = universe
        .send("choose:", control.clone(), vec![Value::Boolean(false)])
        .unwrap();
    assert_eq!(output, Value::Integer(2));
    assert_eq!(site_state(&mut universe, &control, "choose:"), CacheState::Polymorphic);
}

#[test]
fn non_block_arguments_fall_back_to_the_send() {
    let mut universe = setup_universe();
    let control = define_control(&mut universe);

    let output = universe
        .send("guard:", control.clone(), vec![Value::Boolean(true)])
        .unwrap();
    assert_eq!(output, Value::Integer(5));
    let output = universe
        .send("guard:", control.clone(), vec![Value::Boolean(false)])
        .unwrap();
    assert_eq!(output, Value::Nil);
    assert_ne!(site_state(&mut universe, &control, "guard:"), CacheState::Uninitialized);
}

#[test]
fn while_loops() {
    let mut universe = setup_universe();
    let control = define_control(&mut universe);

    let output = universe
        .send("sumTo:", control.clone(), vec![Value::Integer(100)])
        .unwrap();
    assert_eq!(output, Value::Integer(5050));
    assert_eq!(site_state(&mut universe, &control, "sumTo:"), CacheState::Uninitialized);

    // the loop ends as soon as the condition is not exactly `false`
    let output = universe
        .send("loopOn:", control.clone(), vec![Value::Integer(3)])
        .unwrap();
    assert_eq!(output, Value::Nil);
    let output = universe
        .send("loopOn:", control, vec![Value::Boolean(true)])
        .unwrap();
    assert_eq!(output, Value::Nil);
}

#[test]
fn specialization_can_be_turned_off() {
    let mut universe = setup_universe_with(UniverseConfig::default().specialize_control_flow(false));
    let control = define_control(&mut universe);

    let output = universe
        .send("choose:", control.clone(), vec![Value::Boolean(true)])
        .unwrap();
    assert_eq!(output, Value::Integer(1));
    assert_eq!(site_state(&mut universe, &control, "choose:"), CacheState::Monomorphic);

    let output = universe
        .send("sumTo:", control, vec![Value::Integer(10)])
        .unwrap();
    assert_eq!(output, Value::Integer(55));
}
