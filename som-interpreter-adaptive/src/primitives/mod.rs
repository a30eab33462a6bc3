/// Primitives for the **Block** class and its arity-specific subclasses.
pub mod blocks;

/// Primitives for the **Array** class.
pub mod array;
/// Primitives for the **Boolean** class.
pub mod boolean;
/// Primitives for the **Class** class.
pub mod class;
/// Primitives for the **Double** class.
pub mod double;
/// Primitives for the **Integer** class.
pub mod integer;
/// Primitives for the **Method** class and the **Primitive** class.
pub mod method;
/// Primitives for the **Object** class.
pub mod object;
/// Primitives for the **String** class.
pub mod string;
/// Primitives for the **Symbol** class.
pub mod symbol;

use std::cmp::Ordering;

use num_bigint::BigInt;
use num_traits::ToPrimitive;

pub use self::blocks::{block, block1, block2, block3};

use crate::error::ExecError;
use crate::invokable::Return;
use crate::universe::Universe;
use crate::value::Value;

/// A interpreter primitive (just a bare function pointer).
///
/// The first argument is the receiver.
pub type PrimitiveFn = fn(universe: &mut Universe, args: &[Value]) -> Return;

/// Macro for checking and destructuring arguments passed to primitives.
///
/// Arguments of the wrong kind (or missing ones) make the primitive return a type mismatch.
#[macro_export]
macro_rules! expect_args {
    ($signature:expr, $args:expr, [ $( $ptrn:pat $( => $name:ident )? ),* $(,)? ]) => {
        #[allow(unused_mut)]
        let ($($(mut $name,)?)*) = {
            #[allow(unused_variables, unused_mut)]
            let mut iter = $args.iter();
            $(#[allow(unreachable_patterns)]
            $(let $name =)? match iter.next() {
                Some($ptrn) => {$($name)?},
                _ => return $crate::primitives::mismatch($signature),
            };)*
            ($($($name,)?)*)
        };
    };
}

/// The return of a primitive which got arguments of the wrong kind.
pub fn mismatch(signature: &str) -> Return {
    Return::error(ExecError::TypeMismatch {
        signature: signature.to_string(),
    })
}

/// The return of a primitive which failed.
pub fn failure(signature: &str, message: impl Into<String>) -> Return {
    Return::error(ExecError::Primitive {
        signature: signature.to_string(),
        message: message.into(),
    })
}

/// Compare two numbers (integers, big integers and doubles can be mixed).
pub fn compare_numbers(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
        (Value::BigInteger(a), Value::BigInteger(b)) => Some(a.cmp(b)),
        (Value::BigInteger(a), Value::Integer(b)) => Some(a.cmp(&BigInt::from(*b))),
        (Value::Integer(a), Value::BigInteger(b)) => Some(BigInt::from(*a).cmp(b)),
        (Value::Double(a), Value::Double(b)) => a.partial_cmp(b),
        (Value::Integer(a), Value::Double(b)) => (*a as f64).partial_cmp(b),
        (Value::Double(a), Value::Integer(b)) => a.partial_cmp(&(*b as f64)),
        (Value::BigInteger(a), Value::Double(b)) => a.to_f64()?.partial_cmp(b),
        (Value::Double(a), Value::BigInteger(b)) => a.partial_cmp(&b.to_f64()?),
        _ => None,
    }
}

/// Get a number as a double.
pub fn to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Integer(value) => Some(*value as f64),
        Value::BigInteger(value) => value.to_f64(),
        Value::Double(value) => Some(*value),
        _ => None,
    }
}

pub fn get_class_primitives(
    class_name: &str,
) -> Option<&'static [(&'static str, PrimitiveFn)]> {
    match class_name {
        "Array" => Some(self::array::CLASS_PRIMITIVES),
        "Block" => Some(self::block::CLASS_PRIMITIVES),
        "Block1" => Some(self::block1::CLASS_PRIMITIVES),
        "Block2" => Some(self::block2::CLASS_PRIMITIVES),
        "Block3" => Some(self::block3::CLASS_PRIMITIVES),
        "Boolean" => Some(self::boolean::CLASS_PRIMITIVES),
        "Class" => Some(self::class::CLASS_PRIMITIVES),
        "Double" => Some(self::double::CLASS_PRIMITIVES),
        "Integer" => Some(self::integer::CLASS_PRIMITIVES),
        "Method" => Some(self::method::CLASS_PRIMITIVES),
        "Primitive" => Some(self::method::CLASS_PRIMITIVES),
        "Object" => Some(self::object::CLASS_PRIMITIVES),
        "String" => Some(self::string::CLASS_PRIMITIVES),
        "Symbol" => Some(self::symbol::CLASS_PRIMITIVES),
        _ => None,
    }
}

pub fn get_instance_primitives(
    class_name: &str,
) -> Option<&'static [(&'static str, PrimitiveFn)]> {
    match class_name {
        "Array" => Some(self::array::INSTANCE_PRIMITIVES),
        "Block" => Some(self::block::INSTANCE_PRIMITIVES),
        "Block1" => Some(self::block1::INSTANCE_PRIMITIVES),
        "Block2" => Some(self::block2::INSTANCE_PRIMITIVES),
        "Block3" => Some(self::block3::INSTANCE_PRIMITIVES),
        "Boolean" => Some(self::boolean::INSTANCE_PRIMITIVES),
        "Class" => Some(self::class::INSTANCE_PRIMITIVES),
        "Double" => Some(self::double::INSTANCE_PRIMITIVES),
        "Integer" => Some(self::integer::INSTANCE_PRIMITIVES),
        "Method" => Some(self::method::INSTANCE_PRIMITIVES),
        "Primitive" => Some(self::method::INSTANCE_PRIMITIVES),
        "Object" => Some(self::object::INSTANCE_PRIMITIVES),
        "String" => Some(self::string::INSTANCE_PRIMITIVES),
        "Symbol" => Some(self::symbol::INSTANCE_PRIMITIVES),
        _ => None,
    }
}

/// Search for a primitive of a given class, by signature.
pub fn lookup(class_name: &str, is_static: bool, signature: &str) -> Option<PrimitiveFn> {
    let table = if is_static {
        get_class_primitives(class_name)?
    } else {
        get_instance_primitives(class_name)?
    };
    table
        .iter()
        .find(|(name, _)| *name == signature)
        .map(|(_, primitive)| *primitive)
}
