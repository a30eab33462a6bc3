use som_core::span::Span;
use thiserror::Error;

/// The kinds of failures an evaluation can end with.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExecError {
    /// A primitive got arguments of the wrong representation.
    ///
    /// This never reaches the host: the invocation layer turns it into a
    /// `doesNotUnderstand:arguments:` send.
    #[error("'{signature}': wrong argument types")]
    TypeMismatch { signature: String },
    /// The default `doesNotUnderstand:arguments:` handler was reached.
    #[error("message not understood: '{receiver}' does not understand #{selector}")]
    MessageNotUnderstood { receiver: String, selector: String },
    /// A non-local return tried to go back to a method activation that already completed.
    #[error("non-local return from '{method}' (at {span}) escaped its method activation")]
    EscapedNonLocalReturn { method: String, span: Span },
    /// Even the does-not-understand fallback selector could not be found.
    #[error("could not find #{selector} anywhere in the class chain of '{class}' (broken bootstrap)")]
    LookupFailure { class: String, selector: String },
    /// A global was read that is not defined and `unknownGlobal:` is not understood.
    #[error("unknown global '{0}'")]
    UnknownGlobal(String),
    /// A method declared as primitive, for which no implementation exists.
    #[error("unimplemented primitive: {0}")]
    UnimplementedPrimitive(String),
    /// A primitive failed (division by zero, index out of bounds, ...).
    #[error("'{signature}': {message}")]
    Primitive { signature: String, message: String },
    /// The executable tree does not match the activation it runs against.
    #[error("internal error: {0}")]
    Internal(String),
}

/// An error bubbling up the invocation chain, along with the methods it went through.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{error}")]
pub struct Exception {
    /// What went wrong.
    pub error: ExecError,
    /// The methods unwound so far, innermost first (eg. `Counter>>#increment`).
    pub backtrace: Vec<String>,
}

impl Exception {
    /// Construct an exception with an empty backtrace.
    pub fn new(error: ExecError) -> Self {
        Self {
            error,
            backtrace: Vec::new(),
        }
    }
}

impl From<ExecError> for Exception {
    fn from(error: ExecError) -> Self {
        Self::new(error)
    }
}
