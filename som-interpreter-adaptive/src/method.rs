use std::fmt;

use crate::class::ClassId;
use crate::dispatch::CallSiteId;
use crate::interner::Interned;
use crate::nodes::Body;
use crate::primitives::PrimitiveFn;
use crate::universe::Universe;

/// The executable part of a user-defined method.
pub struct MethodEnv {
    /// The number of parameters (the receiver excluded).
    pub nb_params: usize,
    /// The number of locals.
    pub nb_locals: usize,
    /// The method's body.
    pub body: Body,
    /// The message send sites of this method, in source order.
    pub call_sites: Vec<CallSiteId>,
}

/// The kind of a class method.
pub enum MethodKind {
    /// A user-defined method from the AST.
    Defined(MethodEnv),
    /// An interpreter primitive.
    Primitive(PrimitiveFn),
    /// A non-implemented primitive.
    NotImplemented(String),
}

impl MethodKind {
    /// Whether this invocable is a primitive.
    pub fn is_primitive(&self) -> bool {
        matches!(self, Self::Primitive(_))
    }
}

/// Represents a class method.
pub struct Method {
    pub kind: MethodKind,
    pub holder: ClassId,
    pub signature: Interned,
}

impl Method {
    pub fn class(&self, universe: &Universe) -> ClassId {
        if self.is_primitive() {
            universe.primitive_class()
        } else {
            universe.method_class()
        }
    }

    pub fn kind(&self) -> &MethodKind {
        &self.kind
    }

    pub fn holder(&self) -> ClassId {
        self.holder
    }

    pub fn signature(&self) -> Interned {
        self.signature
    }

    /// Whether this invocable is a primitive.
    pub fn is_primitive(&self) -> bool {
        self.kind.is_primitive()
    }

    /// The message send sites of this method, in source order (none for primitives).
    pub fn call_sites(&self) -> &[CallSiteId] {
        match &self.kind {
            MethodKind::Defined(env) => env.call_sites.as_slice(),
            _ => &[],
        }
    }
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Method")
            .field("holder", &self.holder)
            .field("signature", &self.signature)
            .field("primitive", &self.is_primitive())
            .finish()
    }
}
