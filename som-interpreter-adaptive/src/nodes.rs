//!
//! The executable tree.
//!
//! This mirrors the resolved tree from `som-core`, with selectors and globals interned,
//! literals pre-built and every specializing node pointing to its site state.
//!

use std::rc::Rc;

use num_bigint::BigInt;
use som_core::ast::Variable;
use som_core::span::Span;

use crate::class::ClassId;
use crate::dispatch::{CallSiteId, ControlSiteId};
use crate::interner::Interned;
use crate::shape::FieldSiteId;

/// A sequence of expressions, evaluating to the value of the last one.
#[derive(Debug, Clone, Default)]
pub struct Body {
    pub exprs: Vec<Expression>,
}

/// The executable part of a block.
#[derive(Debug, Clone)]
pub struct BlockBody {
    pub nb_params: usize,
    pub nb_locals: usize,
    pub body: Body,
    /// Whether the block refers to anything outside itself (enclosing variables,
    /// self, fields, super or a non-local return), and thus needs to capture
    /// the activation it is created in.
    pub captures: bool,
}

/// An executable expression.
#[derive(Debug, Clone)]
pub enum Expression {
    /// The receiver of the current method.
    SelfRef,
    /// Read an argument or a local.
    Read(Variable),
    /// Write an argument or a local.
    Write(Variable, Box<Expression>),
    /// Read a field of the receiver.
    FieldRead(FieldAccess),
    /// Write a field of the receiver.
    FieldWrite(FieldAccess, Box<Expression>),
    /// Read a global.
    Global(Interned),
    /// A literal value.
    Literal(Literal),
    /// A block creation.
    Block(Rc<BlockBody>),
    /// A message send.
    Message(Message),
    /// A message send to super.
    SuperMessage(SuperMessage),
    /// A control-flow message send, with a fast path for booleans and blocks.
    Control(ControlSend),
    /// A non-local return, to the home method's caller.
    Exit(Box<Expression>, Span),
}

/// A field access, along with its site.
#[derive(Debug, Clone, Copy)]
pub struct FieldAccess {
    pub index: usize,
    pub site: FieldSiteId,
}

/// A message send.
#[derive(Debug, Clone)]
pub struct Message {
    pub receiver: Box<Expression>,
    pub selector: Interned,
    pub values: Vec<Expression>,
    pub site: CallSiteId,
}

/// A message send to super.
#[derive(Debug, Clone)]
pub struct SuperMessage {
    pub selector: Interned,
    pub values: Vec<Expression>,
    /// The superclass of the method's holder.
    pub lookup_class: ClassId,
    pub site: CallSiteId,
}

/// The control-flow messages that get a fast path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
    IfTrue,
    IfFalse,
    IfTrueIfFalse,
    IfFalseIfTrue,
    WhileTrue,
    WhileFalse,
}

impl ControlKind {
    /// Get the control-flow kind of a given selector, if any.
    pub fn from_signature(signature: &str) -> Option<Self> {
        match signature {
            "ifTrue:" => Some(Self::IfTrue),
            "ifFalse:" => Some(Self::IfFalse),
            "ifTrue:ifFalse:" => Some(Self::IfTrueIfFalse),
            "ifFalse:ifTrue:" => Some(Self::IfFalseIfTrue),
            "whileTrue:" => Some(Self::WhileTrue),
            "whileFalse:" => Some(Self::WhileFalse),
            _ => None,
        }
    }
}

/// The state of a control-flow send site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlState {
    /// Takes the fast path whenever the operands allow it.
    Specialized,
    /// Saw operands the fast path does not handle: always sends the message.
    Generic,
}

/// A control-flow message send.
#[derive(Debug, Clone)]
pub struct ControlSend {
    pub kind: ControlKind,
    /// The equivalent message send, for the generic path.
    pub message: Message,
    pub site: ControlSiteId,
}

/// A literal value.
#[derive(Debug, Clone)]
pub enum Literal {
    Symbol(Interned),
    String(Rc<String>),
    Double(f64),
    Integer(i64),
    BigInteger(BigInt),
    Array(Vec<Literal>),
}
