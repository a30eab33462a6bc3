#![allow(dead_code)]

use som_core::ast::*;
use som_core::span::Span;
use som_interpreter_adaptive::config::UniverseConfig;
use som_interpreter_adaptive::universe::Universe;

pub fn setup_universe() -> Universe {
    setup_universe_with(UniverseConfig::default())
}

pub fn setup_universe_with(config: UniverseConfig) -> Universe {
    let _ = env_logger::builder().is_test(true).try_init();
    Universe::with_config(config)
}

pub fn class_def(name: &str, super_class: Option<&str>, fields: &[&str], methods: Vec<MethodDef>) -> ClassDef {
    ClassDef {
        name: name.to_string(),
        super_class: super_class.map(String::from),
        instance_fields: fields.iter().map(|field| field.to_string()).collect(),
        instance_methods: methods,
        static_fields: Vec::new(),
        static_methods: Vec::new(),
    }
}

pub fn method(signature: &str, parameters: &[&str], locals: &[&str], exprs: Vec<Expression>) -> MethodDef {
    MethodDef {
        signature: signature.to_string(),
        parameters: parameters.iter().map(|param| param.to_string()).collect(),
        body: MethodBody::Body {
            locals: locals.iter().map(|local| local.to_string()).collect(),
            body: Body { exprs },
        },
    }
}

pub fn primitive(signature: &str, parameters: &[&str]) -> MethodDef {
    MethodDef {
        signature: signature.to_string(),
        parameters: parameters.iter().map(|param| param.to_string()).collect(),
        body: MethodBody::Primitive,
    }
}

pub fn block(parameters: &[&str], locals: &[&str], exprs: Vec<Expression>) -> Expression {
    Expression::Block(Block {
        parameters: parameters.iter().map(|param| param.to_string()).collect(),
        locals: locals.iter().map(|local| local.to_string()).collect(),
        body: Body { exprs },
    })
}

pub fn send(receiver: Expression, signature: &str, values: Vec<Expression>) -> Expression {
    Expression::Message(Message {
        receiver: Box::new(receiver),
        signature: signature.to_string(),
        values,
    })
}

pub fn send_super(signature: &str, values: Vec<Expression>) -> Expression {
    Expression::SuperMessage(SuperMessage {
        signature: signature.to_string(),
        values,
    })
}

pub fn ret(expr: Expression) -> Expression {
    Expression::Exit(Box::new(expr), Span::new(0, 0))
}

pub fn this() -> Expression {
    Expression::SelfRef
}

pub fn arg(up_idx: usize, idx: usize) -> Expression {
    Expression::Reference(Variable::Argument { up_idx, idx })
}

pub fn local(up_idx: usize, idx: usize) -> Expression {
    Expression::Reference(Variable::Local { up_idx, idx })
}

pub fn field(idx: usize) -> Expression {
    Expression::Reference(Variable::Field(idx))
}

pub fn assign_local(up_idx: usize, idx: usize, expr: Expression) -> Expression {
    Expression::Assignment(Variable::Local { up_idx, idx }, Box::new(expr))
}

pub fn assign_field(idx: usize, expr: Expression) -> Expression {
    Expression::Assignment(Variable::Field(idx), Box::new(expr))
}

pub fn global(name: &str) -> Expression {
    Expression::Global(name.to_string())
}

pub fn int(value: i64) -> Expression {
    Expression::Literal(Literal::Integer(value))
}

pub fn double(value: f64) -> Expression {
    Expression::Literal(Literal::Double(value))
}

pub fn string(value: &str) -> Expression {
    Expression::Literal(Literal::String(value.to_string()))
}

pub fn symbol(value: &str) -> Expression {
    Expression::Literal(Literal::Symbol(value.to_string()))
}
