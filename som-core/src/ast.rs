//!
//! The resolved tree handed to the execution core.
//!
//! Names have already been resolved by the front-end: variables are
//! lexical `(up_idx, idx)` addresses, fields are indices into the
//! receiver's field list and `self` is its own node. Names are kept next to
//! the addresses only for diagnostics.
//!

use crate::span::Span;

/// Represents a class definition.
///
/// Example:
/// ```text
/// Counter = (
///   | total |
///   new = ( self reset )
///   increment = ( total := total + 1 )
///   get = ( ^ total )
///   reset = ( total := 0 )
/// )
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDef {
    /// The name of the class.
    pub name: String,
    /// The name of the superclass (`None` means `Object`, or no superclass at all for `Object` itself).
    pub super_class: Option<String>,
    /// The fields declared by instances of that class (inherited fields are not repeated).
    pub instance_fields: Vec<String>,
    /// The methods declared for instances of that class.
    pub instance_methods: Vec<MethodDef>,
    /// The class-side fields.
    pub static_fields: Vec<String>,
    /// The class-side methods.
    pub static_methods: Vec<MethodDef>,
}

/// Represents a method definition.
///
/// Example:
/// ```text
/// "unary method"       increment = ( self increment: 1 )
/// "positional method"  increment: value = ( total := total + value )
/// "operator method"    + value = ( self increment: value )
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct MethodDef {
    /// The method's signature (eg. `println`, `at:put:` or `==`).
    pub signature: String,
    /// The names of the method's parameters (the receiver is not included).
    pub parameters: Vec<String>,
    /// The method's body.
    pub body: MethodBody,
}

/// Represents a method's body.
///
/// Exemple:
/// ```text
/// "primitive method body"
/// printString: string = primitive
///
/// "actual method body, with a local"
/// double: value = ( |clone| clone := double. ^ (double + clone) )
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum MethodBody {
    /// A primitive (meant to be implemented by the VM itself).
    Primitive,
    /// An actual body for the method, with locals.
    Body { locals: Vec<String>, body: Body },
}

/// Represents the contents of a body (within a method or block).
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    /// The expressions in the body.
    pub exprs: Vec<Expression>,
}

/// A lexically-resolved variable address.
///
/// `up_idx` is the number of enclosing blocks to walk out of, starting from
/// the activation in which the reference appears.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variable {
    /// A parameter of a method or block (the receiver is not counted).
    Argument { up_idx: usize, idx: usize },
    /// A local of a method or block.
    Local { up_idx: usize, idx: usize },
    /// A field of `self` (instance fields, or class-side fields on the class side).
    Field(usize),
}

/// Represents an expression.
///
/// Exemple:
/// ```text
/// "reference"          counter
/// "assignment"         counter := 10
/// "messsage send"      counter incrementBy: 5
/// "exit operation"     ^counter
/// "literal"            'foo'
/// "block"              [ :value | counter incrementBy: value ]
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// The receiver of the enclosing method (`self`).
    SelfRef,
    /// A read of a resolved variable.
    Reference(Variable),
    /// A read of a global binding, by name (eg. `Object`, `true`, `nil`).
    Global(String),
    /// An assignment to a resolved variable (eg. `counter := 10`).
    Assignment(Variable, Box<Expression>),
    /// A message send (eg. `counter incrementBy: 5`).
    Message(Message),
    /// A message send to `super` (eg. `super initialize`).
    SuperMessage(SuperMessage),
    /// An exit operation (eg. `^counter`).
    Exit(Box<Expression>, Span),
    /// A literal (eg. `'foo'`, `10`, `#foo`, ...).
    Literal(Literal),
    /// A block (eg. `[ :value | counter incrementBy: value ]`).
    Block(Block),
}

/// Represents a message send.
///
/// Exemple:
/// ```text
/// "unary message send"
/// 'hello, world' println
///
/// "positional message send"
/// range from: 0 to: 10
///
/// "binary operator message send"
/// value == 3
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    /// The object to which the message is sent to.
    pub receiver: Box<Expression>,
    /// The signature of the message (eg. "ifTrue:ifFalse:").
    pub signature: String,
    /// The list of dynamic values that are passed.
    pub values: Vec<Expression>,
}

/// Represents a message send whose lookup starts in the superclass of the
/// method's holder. The receiver is always `self`.
#[derive(Debug, Clone, PartialEq)]
pub struct SuperMessage {
    /// The signature of the message.
    pub signature: String,
    /// The list of dynamic values that are passed.
    pub values: Vec<Expression>,
}

/// Represents a block.
///
/// Exemple:
/// ```text
/// "simple block"
/// [ 'hello, world' println ]
///
/// "block with parameter"
/// [ :value | value * 2 ]
///
/// "block with parameter and local"
/// [ :value | |serialized| serialized := value asString. serialized println ]
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    /// Represents the parameters' names.
    pub parameters: Vec<String>,
    /// The names of the locals.
    pub locals: Vec<String>,
    /// Represents the block's body.
    pub body: Body,
}

/// Represents a literal.
///
/// Exemple:
/// ```text
/// #foo     "symbol literal"
/// 'hello'  "string literal"
/// 3.14     "double literal"
/// 42       "integer literal"
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// Represents a symbol literal (eg. `#foo`).
    Symbol(String),
    /// Represents a string literal (eg. `'hello'`).
    String(String),
    /// Represents a decimal number literal (eg. `3.14`).
    Double(f64),
    /// Represents a integer number literal (eg. `42`).
    Integer(i64),
    /// Represents a big integer (bigger than a 64-bit signed integer can represent).
    BigInteger(String),
    /// Represents an array literal (eg. `$(1 2 3)`)
    Array(Vec<Literal>),
}
