use std::rc::Rc;

use log::trace;

use crate::block::Block;
use crate::error::{ExecError, Exception};
use crate::evaluate::Evaluate;
use crate::frame::Frame;
use crate::method::{Method, MethodKind};
use crate::universe::Universe;
use crate::value::Value;
use crate::SOMRef;

/// Represents the kinds of possible returns from an invocation.
#[derive(Debug)]
pub enum Return {
    /// A local return, the value is for the immediate caller.
    Local(Value),
    /// A non-local return, the value is for the caller of the referenced method activation.
    NonLocal(Value, SOMRef<Frame>),
    /// An exception, expected to bubble all the way up.
    Exception(Box<Exception>),
}

impl Return {
    /// Construct an exceptional return.
    pub fn error(error: ExecError) -> Self {
        Self::Exception(Box::new(Exception::new(error)))
    }

    /// Construct an exceptional return, for an internal inconsistency.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::error(ExecError::Internal(message.into()))
    }
}

/// The trait for invoking methods and primitives.
pub trait Invoke {
    /// Invoke within the given universe and with the given arguments.
    ///
    /// The first argument is the receiver.
    fn invoke(&self, universe: &mut Universe, args: Vec<Value>) -> Return;
}

impl Invoke for Method {
    fn invoke(&self, universe: &mut Universe, args: Vec<Value>) -> Return {
        match self.kind() {
            MethodKind::Defined(env) => {
                let mut iter = args.into_iter();
                let self_value = match iter.next() {
                    Some(receiver) => receiver,
                    None => return Return::internal("missing receiver for invocation"),
                };
                let params: Vec<Value> = iter.collect();
                if params.len() != env.nb_params {
                    return Return::error(ExecError::Primitive {
                        signature: universe.method_name(self),
                        message: format!(
                            "expected {} arguments, got {}",
                            env.nb_params,
                            params.len()
                        ),
                    });
                }
                let frame = Frame::from_method(
                    self.holder,
                    self.signature,
                    self_value,
                    params,
                    env.nb_locals,
                );
                let output = universe.with_frame(frame, |universe, frame| {
                    match env.body.evaluate(universe, frame) {
                        Return::Local(_) => Return::Local(frame.borrow().get_self()),
                        Return::NonLocal(value, target) if Rc::ptr_eq(&target, frame) => {
                            Return::Local(value)
                        }
                        output => output,
                    }
                });
                match output {
                    Return::Exception(mut exception) => {
                        exception.backtrace.push(universe.method_name(self));
                        Return::Exception(exception)
                    }
                    output => output,
                }
            }
            MethodKind::Primitive(func) => match func(universe, &args) {
                Return::Exception(exception)
                    if matches!(exception.error, ExecError::TypeMismatch { .. }) =>
                {
                    trace!("{}, sending #doesNotUnderstand:arguments:", exception.error);
                    universe.does_not_understand_args(self.signature, args)
                }
                output => output,
            },
            MethodKind::NotImplemented(name) => {
                Return::error(ExecError::UnimplementedPrimitive(name.clone()))
            }
        }
    }
}

impl Invoke for Block {
    fn invoke(&self, universe: &mut Universe, args: Vec<Value>) -> Return {
        self.call(universe, args.into_iter().skip(1).collect())
    }
}

