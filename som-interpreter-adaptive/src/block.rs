use std::fmt;
use std::rc::Rc;

use crate::class::ClassId;
use crate::evaluate::Evaluate;
use crate::frame::Frame;
use crate::invokable::Return;
use crate::nodes::BlockBody;
use crate::universe::Universe;
use crate::value::Value;
use crate::SOMRef;

/// Represents an executable block.
#[derive(Clone)]
pub struct Block {
    /// Reference to the captured activation, if the block refers to anything outside itself.
    pub frame: Option<SOMRef<Frame>>,
    /// The executable body of the block.
    pub body: Rc<BlockBody>,
}

impl Block {
    /// Get the block's class.
    pub fn class(&self, universe: &Universe) -> ClassId {
        universe.block_class(self.nb_parameters())
    }

    /// Retrieve the number of parameters this block accepts.
    pub fn nb_parameters(&self) -> usize {
        self.body.nb_params
    }

    /// Evaluate the block's body with the given arguments, in a fresh activation.
    pub fn call(&self, universe: &mut Universe, args: Vec<Value>) -> Return {
        let frame = Frame::from_block(self.frame.clone(), args, self.body.nb_locals);
        universe.with_frame(frame, |universe, frame| self.body.body.evaluate(universe, frame))
    }
}

impl fmt::Debug for Block {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct(&format!("Block{}", self.nb_parameters() + 1))
            .field("captures", &self.frame.is_some())
            .finish()
    }
}
