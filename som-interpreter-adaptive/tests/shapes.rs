use som_interpreter_adaptive::class::ClassId;
use som_interpreter_adaptive::shape::LocationKind;
use som_interpreter_adaptive::universe::Universe;
use som_interpreter_adaptive::value::Value;

mod common;
use common::*;

/// `Cell` has a single field, with a getter and a setter.
fn define_cell(universe: &mut Universe, nb_extra_fields: usize) -> ClassId {
    let mut fields = vec!["value".to_string()];
    fields.extend((0..nb_extra_fields).map(|idx| format!("extra{}", idx)));
    let fields: Vec<&str> = fields.iter().map(String::as_str).collect();

    let last = fields.len() - 1;
    let methods = vec![
        method("value", &[], &[], vec![ret(field(0))]),
        method("value:", &["value"], &[], vec![assign_field(0, arg(0, 0))]),
        method("last", &[], &[], vec![ret(field(last))]),
        method("last:", &["value"], &[], vec![assign_field(last, arg(0, 0))]),
    ];
    universe
        .define_class(&class_def("Cell", None, &fields, methods))
        .unwrap()
}

fn kind_of(universe: &Universe, class: ClassId, index: usize) -> LocationKind {
    universe.shape_of(class).location(index).unwrap().kind
}

#[test]
fn unwritten_fields_read_as_nil() {
    let mut universe = setup_universe();
    let class = define_cell(&mut universe, 0);
    let cell = universe.instantiate(class);

    assert_eq!(kind_of(&universe, class, 0), LocationKind::Unwritten);
    let output = universe.send("value", cell, vec![]).unwrap();
    assert_eq!(output, Value::Nil);
}

#[test]
fn first_write_picks_the_storage_kind() {
    let cases = [
        (Value::Integer(7), LocationKind::Integer),
        (Value::Double(2.5), LocationKind::Double),
        (Value::Boolean(true), LocationKind::Reference),
        (Value::String("cell".to_string().into()), LocationKind::Reference),
    ];

    for (value, expected) in cases {
        let mut universe = setup_universe();
        let class = define_cell(&mut universe, 0);
        let cell = universe.instantiate(class);

        universe
            .send("value:", cell.clone(), vec![value.clone()])
            .unwrap();
        assert_eq!(kind_of(&universe, class, 0), expected);
        assert_eq!(universe.shape_of(class).version, 1);

        let output = universe.send("value", cell, vec![]).unwrap();
        assert_eq!(output, value);
    }
}

#[test]
fn generalization_migrates_other_instances() {
    let mut universe = setup_universe();
    let class = define_cell(&mut universe, 0);
    let first = universe.instantiate(class);
    let second = universe.instantiate(class);

    universe
        .send("value:", first.clone(), vec![Value::Integer(1)])
        .unwrap();
    universe
        .send("value:", second.clone(), vec![Value::Integer(2)])
        .unwrap();
    assert_eq!(kind_of(&universe, class, 0), LocationKind::Integer);
    let version = universe.shape_of(class).version;

    universe
        .send("value:", first.clone(), vec![Value::Double(1.5)])
        .unwrap();
    assert_eq!(kind_of(&universe, class, 0), LocationKind::Reference);
    assert_eq!(universe.shape_of(class).version, version + 1);

    let output = universe.send("value", first.clone(), vec![]).unwrap();
    assert_eq!(output, Value::Double(1.5));
    let output = universe.send("value", second.clone(), vec![]).unwrap();
    assert_eq!(output, Value::Integer(2));

    // generalization is one-way
    universe
        .send("value:", second.clone(), vec![Value::Integer(3)])
        .unwrap();
    assert_eq!(kind_of(&universe, class, 0), LocationKind::Reference);
    assert_eq!(universe.shape_of(class).version, version + 1);
    let output = universe.send("value", second, vec![]).unwrap();
    assert_eq!(output, Value::Integer(3));
}

/// `Pair` has two fields, `a` and `b`, with getters and setters.
fn define_pair(universe: &mut Universe) -> ClassId {
    let methods = vec![
        method("a", &[], &[], vec![ret(field(0))]),
        method("a:", &["value"], &[], vec![assign_field(0, arg(0, 0))]),
        method("b", &[], &[], vec![ret(field(1))]),
        method("b:", &["value"], &[], vec![assign_field(1, arg(0, 0))]),
    ];
    universe
        .define_class(&class_def("Pair", None, &["a", "b"], methods))
        .unwrap()
}

#[test]
fn generalization_keeps_every_other_field_intact() {
    let mut universe = setup_universe();
    let class = define_pair(&mut universe);
    let pairs: Vec<Value> = (0..3).map(|_| universe.instantiate(class)).collect();

    for (idx, pair) in pairs.iter().enumerate() {
        universe
            .send("a:", pair.clone(), vec![Value::Integer(idx as i64)])
            .unwrap();
        universe
            .send("b:", pair.clone(), vec![Value::Double(idx as f64 + 0.5)])
            .unwrap();
    }
    assert_eq!(kind_of(&universe, class, 0), LocationKind::Integer);
    assert_eq!(kind_of(&universe, class, 1), LocationKind::Double);

    universe
        .send("a:", pairs[1].clone(), vec![Value::Double(9.5)])
        .unwrap();
    assert_eq!(kind_of(&universe, class, 0), LocationKind::Reference);
    assert_eq!(kind_of(&universe, class, 1), LocationKind::Double);

    let expected = [
        (Value::Integer(0), Value::Double(0.5)),
        (Value::Double(9.5), Value::Double(1.5)),
        (Value::Integer(2), Value::Double(2.5)),
    ];
    for (pair, (a, b)) in pairs.iter().zip(expected) {
        let output = universe.send("a", pair.clone(), vec![]).unwrap();
        assert_eq!(output, a);
        let output = universe.send("b", pair.clone(), vec![]).unwrap();
        assert_eq!(output, b);
    }

    // stale instances keep working when written before being read
    universe
        .send("b:", pairs[2].clone(), vec![Value::Double(-1.0)])
        .unwrap();
    let output = universe.send("a", pairs[2].clone(), vec![]).unwrap();
    assert_eq!(output, Value::Integer(2));
    let output = universe.send("b", pairs[0].clone(), vec![]).unwrap();
    assert_eq!(output, Value::Double(0.5));
}

#[test]
fn superseded_shapes_know_their_successor() {
    let mut universe = setup_universe();
    let class = define_cell(&mut universe, 0);
    let cell = universe.instantiate(class);

    let initial = universe.shape_of(class).id;
    universe
        .send("value:", cell, vec![Value::Integer(1)])
        .unwrap();
    let current = universe.shape_of(class).id;

    assert_ne!(initial, current);
    assert!(!universe.shapes.get(initial).is_current());
    assert_eq!(universe.shapes.get(initial).successor, Some(current));
    assert!(universe.shapes.get(current).is_current());
}

#[test]
fn fields_past_the_inline_ones_overflow() {
    let mut universe = setup_universe();
    let class = define_cell(&mut universe, 7);
    let cell = universe.instantiate(class);

    assert_eq!(kind_of(&universe, class, 7), LocationKind::Overflow);
    let output = universe.send("last", cell.clone(), vec![]).unwrap();
    assert_eq!(output, Value::Nil);

    universe
        .send("last:", cell.clone(), vec![Value::Integer(9)])
        .unwrap();
    assert_eq!(kind_of(&universe, class, 7), LocationKind::Overflow);
    let output = universe.send("last", cell.clone(), vec![]).unwrap();
    assert_eq!(output, Value::Integer(9));

    universe
        .send("last:", cell.clone(), vec![Value::Double(0.5)])
        .unwrap();
    let output = universe.send("last", cell, vec![]).unwrap();
    assert_eq!(output, Value::Double(0.5));
}

#[test]
fn reflective_field_access_shares_the_storage() {
    let mut universe = setup_universe();
    let class = define_cell(&mut universe, 0);
    let cell = universe.instantiate(class);

    universe
        .send("instVarAt:put:", cell.clone(), vec![Value::Integer(1), Value::Integer(5)])
        .unwrap();
    assert_eq!(kind_of(&universe, class, 0), LocationKind::Integer);

    let output = universe.send("value", cell.clone(), vec![]).unwrap();
    assert_eq!(output, Value::Integer(5));
    let output = universe
        .send("instVarAt:", cell, vec![Value::Integer(1)])
        .unwrap();
    assert_eq!(output, Value::Integer(5));
}
