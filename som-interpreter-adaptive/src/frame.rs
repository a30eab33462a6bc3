use std::rc::Rc;

use crate::class::ClassId;
use crate::interner::Interned;
use crate::value::Value;
use crate::SOMRef;

/// The kind of a given frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    /// A frame created from a block evaluation.
    Block,
    /// A frame created from a method invocation.
    Method {
        /// The holder of the method being invoked.
        holder: ClassId,
        /// The signature of the method being invoked.
        signature: Interned,
    },
}

/// Represents an activation record.
///
/// Frames are shared: a block created within this activation keeps it alive,
/// and sees every later write to its arguments and locals.
#[derive(Debug)]
pub struct Frame {
    /// This frame's kind.
    pub kind: FrameKind,
    /// The self value.
    pub self_value: Value,
    /// The lexically enclosing frame, for block frames that captured one.
    pub parent: Option<SOMRef<Frame>>,
    /// The arguments within this frame (the receiver excluded).
    pub args: Vec<Value>,
    /// The locals within this frame.
    pub locals: Vec<Value>,
    /// Whether this activation is still running.
    live: bool,
}

impl Frame {
    /// Construct a new frame for a method invocation.
    pub fn from_method(
        holder: ClassId,
        signature: Interned,
        self_value: Value,
        args: Vec<Value>,
        nb_locals: usize,
    ) -> Self {
        Self {
            kind: FrameKind::Method { holder, signature },
            self_value,
            parent: None,
            args,
            locals: vec![Value::Nil; nb_locals],
            live: true,
        }
    }

    /// Construct a new frame for a block evaluation.
    ///
    /// The self value is the one of the enclosing frame (or **nil** without one).
    pub fn from_block(parent: Option<SOMRef<Frame>>, args: Vec<Value>, nb_locals: usize) -> Self {
        let self_value = parent
            .as_ref()
            .map(|frame| frame.borrow().get_self())
            .unwrap_or(Value::Nil);
        Self {
            kind: FrameKind::Block,
            self_value,
            parent,
            args,
            locals: vec![Value::Nil; nb_locals],
            live: true,
        }
    }

    /// Get the frame's kind.
    pub fn kind(&self) -> &FrameKind {
        &self.kind
    }

    /// Get the self value for this frame.
    pub fn get_self(&self) -> Value {
        self.self_value.clone()
    }

    /// Whether this activation is still running.
    pub fn is_live(&self) -> bool {
        self.live
    }

    /// Mark this activation as completed.
    pub fn terminate(&mut self) {
        self.live = false;
    }

    /// Search for an argument.
    pub fn lookup_argument(&self, idx: usize) -> Option<Value> {
        self.args.get(idx).cloned()
    }

    /// Assign to an argument.
    pub fn assign_argument(&mut self, idx: usize, value: Value) -> Option<()> {
        *self.args.get_mut(idx)? = value;
        Some(())
    }

    /// Search for a local binding.
    pub fn lookup_local(&self, idx: usize) -> Option<Value> {
        self.locals.get(idx).cloned()
    }

    /// Assign to a local binding.
    pub fn assign_local(&mut self, idx: usize, value: Value) -> Option<()> {
        *self.locals.get_mut(idx)? = value;
        Some(())
    }

    /// Get the frame `n` lexical levels up from this one.
    pub fn nth_frame_back(frame: &SOMRef<Frame>, n: usize) -> Option<SOMRef<Frame>> {
        let mut current = Rc::clone(frame);
        for _ in 0..n {
            let parent = current.borrow().parent.clone()?;
            current = parent;
        }
        Some(current)
    }

    /// Get the outermost lexically enclosing frame (the home method's frame, for a block).
    pub fn method_frame(frame: &SOMRef<Frame>) -> SOMRef<Frame> {
        let mut current = Rc::clone(frame);
        loop {
            let parent = current.borrow().parent.clone();
            match parent {
                Some(parent) => current = parent,
                None => return current,
            }
        }
    }
}
