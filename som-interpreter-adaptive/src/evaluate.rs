use std::cell::RefCell;
use std::rc::Rc;

use log::debug;
use som_core::ast::Variable;

use crate::block::Block;
use crate::error::ExecError;
use crate::frame::{Frame, FrameKind};
use crate::invokable::Return;
use crate::nodes::{
    Body, ControlKind, ControlSend, ControlState, Expression, Literal, Message, SuperMessage,
};
use crate::primitives::blocks::while_loop;
use crate::universe::Universe;
use crate::value::Value;
use crate::SOMRef;

macro_rules! propagate {
    ($expr:expr) => {
        match $expr {
            Return::Local(value) => value,
            ret => return ret,
        }
    };
}

pub(crate) use propagate;

/// The trait for evaluating executable nodes.
pub trait Evaluate {
    /// Evaluate the node within a given universe, against a given activation.
    fn evaluate(&self, universe: &mut Universe, frame: &SOMRef<Frame>) -> Return;
}

impl Evaluate for Expression {
    fn evaluate(&self, universe: &mut Universe, frame: &SOMRef<Frame>) -> Return {
        match self {
            Self::SelfRef => Return::Local(frame.borrow().get_self()),
            Self::Read(variable) => read_variable(frame, *variable),
            Self::Write(variable, expr) => {
                let value = propagate!(expr.evaluate(universe, frame));
                write_variable(frame, *variable, value)
            }
            Self::FieldRead(access) => {
                let self_value = frame.borrow().get_self();
                match universe.read_field_cached(access.site, &self_value, access.index) {
                    Some(value) => Return::Local(value),
                    None => Return::internal(format!("no field #{} to read", access.index)),
                }
            }
            Self::FieldWrite(access, expr) => {
                let value = propagate!(expr.evaluate(universe, frame));
                let self_value = frame.borrow().get_self();
                match universe.write_field_cached(
                    access.site,
                    &self_value,
                    access.index,
                    value.clone(),
                ) {
                    Some(()) => Return::Local(value),
                    None => Return::internal(format!("no field #{} to write to", access.index)),
                }
            }
            Self::Global(name) => match universe.lookup_global(*name) {
                Some(value) => Return::Local(value),
                None => {
                    let self_value = frame.borrow().get_self();
                    universe.unknown_global(self_value, *name)
                }
            },
            Self::Literal(literal) => Return::Local(literal.evaluate()),
            Self::Block(body) => {
                let frame = body.captures.then(|| Rc::clone(frame));
                Return::Local(Value::Block(Rc::new(Block {
                    frame,
                    body: Rc::clone(body),
                })))
            }
            Self::Message(message) => message.evaluate(universe, frame),
            Self::SuperMessage(message) => message.evaluate(universe, frame),
            Self::Control(control) => control.evaluate(universe, frame),
            Self::Exit(expr, span) => {
                let value = propagate!(expr.evaluate(universe, frame));
                let home = Frame::method_frame(frame);
                if home.borrow().is_live() {
                    return Return::NonLocal(value, home);
                }
                let method = match *home.borrow().kind() {
                    FrameKind::Method { holder, signature } => format!(
                        "{}>>#{}",
                        universe.class(holder).name(),
                        universe.lookup_symbol(signature),
                    ),
                    FrameKind::Block => "<block>".to_string(),
                };
                debug!("non-local return from '{}' escaped (at {})", method, span);
                Return::error(ExecError::EscapedNonLocalReturn { method, span: *span })
            }
        }
    }
}

fn read_variable(frame: &SOMRef<Frame>, variable: Variable) -> Return {
    let value = match variable {
        Variable::Argument { up_idx: 0, idx } => frame.borrow().lookup_argument(idx),
        Variable::Local { up_idx: 0, idx } => frame.borrow().lookup_local(idx),
        Variable::Argument { up_idx, idx } => {
            Frame::nth_frame_back(frame, up_idx).and_then(|target| {
                let target = target.borrow();
                target.lookup_argument(idx)
            })
        }
        Variable::Local { up_idx, idx } => {
            Frame::nth_frame_back(frame, up_idx).and_then(|target| {
                let target = target.borrow();
                target.lookup_local(idx)
            })
        }
        Variable::Field(_) => None,
    };
    match value {
        Some(value) => Return::Local(value),
        None => Return::internal(format!("variable {:?} not found", variable)),
    }
}

fn write_variable(frame: &SOMRef<Frame>, variable: Variable, value: Value) -> Return {
    let target = match variable {
        Variable::Argument { up_idx, .. } | Variable::Local { up_idx, .. } => {
            Frame::nth_frame_back(frame, up_idx)
        }
        Variable::Field(_) => None,
    };
    let written = target.and_then(|target| {
        let mut target = target.borrow_mut();
        match variable {
            Variable::Argument { idx, .. } => target.assign_argument(idx, value.clone()),
            Variable::Local { idx, .. } => target.assign_local(idx, value.clone()),
            Variable::Field(_) => None,
        }
    });
    match written {
        Some(()) => Return::Local(value),
        None => Return::internal(format!("variable {:?} not found to assign to", variable)),
    }
}

impl Evaluate for Body {
    fn evaluate(&self, universe: &mut Universe, frame: &SOMRef<Frame>) -> Return {
        let mut last_value = Value::Nil;
        for expr in &self.exprs {
            last_value = propagate!(expr.evaluate(universe, frame));
        }
        Return::Local(last_value)
    }
}

impl Literal {
    /// Build the value of this literal.
    ///
    /// Array literals give a fresh array on each evaluation.
    pub fn evaluate(&self) -> Value {
        match self {
            Self::Symbol(sym) => Value::Symbol(*sym),
            Self::String(string) => Value::String(Rc::clone(string)),
            Self::Double(double) => Value::Double(*double),
            Self::Integer(int) => Value::Integer(*int),
            Self::BigInteger(int) => Value::BigInteger(int.clone()),
            Self::Array(items) => Value::Array(Rc::new(RefCell::new(
                items.iter().map(Literal::evaluate).collect(),
            ))),
        }
    }
}

/// Evaluate the receiver then the arguments, left to right.
fn evaluate_operands(
    universe: &mut Universe,
    frame: &SOMRef<Frame>,
    receiver: Value,
    values: &[Expression],
) -> Result<Vec<Value>, Return> {
    let mut args = Vec::with_capacity(values.len() + 1);
    args.push(receiver);
    for expr in values {
        match expr.evaluate(universe, frame) {
            Return::Local(value) => args.push(value),
            ret => return Err(ret),
        }
    }
    Ok(args)
}

impl Evaluate for Message {
    fn evaluate(&self, universe: &mut Universe, frame: &SOMRef<Frame>) -> Return {
        let receiver = propagate!(self.receiver.evaluate(universe, frame));
        let args = match evaluate_operands(universe, frame, receiver, &self.values) {
            Ok(args) => args,
            Err(ret) => return ret,
        };
        universe.send_cached(self.site, self.selector, args)
    }
}

impl Evaluate for SuperMessage {
    fn evaluate(&self, universe: &mut Universe, frame: &SOMRef<Frame>) -> Return {
        let receiver = frame.borrow().get_self();
        let args = match evaluate_operands(universe, frame, receiver, &self.values) {
            Ok(args) => args,
            Err(ret) => return ret,
        };
        universe.send_super(self.site, self.lookup_class, self.selector, args)
    }
}

impl Evaluate for ControlSend {
    fn evaluate(&self, universe: &mut Universe, frame: &SOMRef<Frame>) -> Return {
        let receiver = propagate!(self.message.receiver.evaluate(universe, frame));
        let args = match evaluate_operands(universe, frame, receiver, &self.message.values) {
            Ok(args) => args,
            Err(ret) => return ret,
        };

        if universe.sites.control(self.site) == ControlState::Specialized {
            if let Some(output) = self.kind.execute(universe, &args) {
                return output;
            }
            *universe.sites.control_mut(self.site) = ControlState::Generic;
            debug!(
                "#{}: control site {} despecialized (receiver {})",
                universe.lookup_symbol(self.message.selector),
                self.site.0,
                args[0].to_string(universe),
            );
        }

        universe.send_cached(self.message.site, self.message.selector, args)
    }
}

impl ControlKind {
    /// Run the fast path, if the operands are of the expected kinds.
    fn execute(self, universe: &mut Universe, args: &[Value]) -> Option<Return> {
        let output = match (self, args) {
            (Self::IfTrue, [Value::Boolean(cond), Value::Block(body)])
            | (Self::IfFalse, [Value::Boolean(cond), Value::Block(body)])
                if body.nb_parameters() == 0 =>
            {
                if *cond == (self == Self::IfTrue) {
                    body.call(universe, Vec::new())
                } else {
                    Return::Local(Value::Nil)
                }
            }
            (Self::IfTrueIfFalse, [Value::Boolean(cond), Value::Block(first), Value::Block(second)])
            | (Self::IfFalseIfTrue, [Value::Boolean(cond), Value::Block(first), Value::Block(second)])
                if first.nb_parameters() == 0 && second.nb_parameters() == 0 =>
            {
                if *cond == (self == Self::IfTrueIfFalse) {
                    first.call(universe, Vec::new())
                } else {
                    second.call(universe, Vec::new())
                }
            }
            (Self::WhileTrue, [Value::Block(condition), Value::Block(body)])
            | (Self::WhileFalse, [Value::Block(condition), Value::Block(body)])
                if condition.nb_parameters() == 0 && body.nb_parameters() == 0 =>
            {
                while_loop(universe, condition, body, self == Self::WhileTrue)
            }
            _ => return None,
        };
        Some(output)
    }
}
