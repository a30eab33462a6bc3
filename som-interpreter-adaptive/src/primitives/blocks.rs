use crate::block::Block;
use crate::evaluate::propagate;
use crate::expect_args;
use crate::invokable::Return;
use crate::primitives::{mismatch, PrimitiveFn};
use crate::universe::Universe;
use crate::value::Value;

/// Evaluate `body` for as long as `condition` evaluates to exactly `expected`.
///
/// Always evaluates to **nil**.
pub fn while_loop(universe: &mut Universe, condition: &Block, body: &Block, expected: bool) -> Return {
    loop {
        match propagate!(condition.call(universe, Vec::new())) {
            Value::Boolean(value) if value == expected => {
                propagate!(body.call(universe, Vec::new()));
            }
            _ => break Return::Local(Value::Nil),
        }
    }
}

/// Primitives for the **Block** class.
pub mod block {
    use super::*;

    pub static INSTANCE_PRIMITIVES: &[(&str, PrimitiveFn)] = &[
        ("numArgs", self::num_args),
        ("whileTrue:", self::while_true),
        ("whileFalse:", self::while_false),
    ];
    pub static CLASS_PRIMITIVES: &[(&str, PrimitiveFn)] = &[];

    fn num_args(_: &mut Universe, args: &[Value]) -> Return {
        const SIGNATURE: &str = "Block>>#numArgs";

        expect_args!(SIGNATURE, args, [
            Value::Block(block) => block,
        ]);

        Return::Local(Value::Integer(block.nb_parameters() as i64))
    }

    fn while_true(universe: &mut Universe, args: &[Value]) -> Return {
        const SIGNATURE: &str = "Block>>#whileTrue:";

        expect_args!(SIGNATURE, args, [
            Value::Block(condition) => condition,
            Value::Block(body) => body,
        ]);

        if condition.nb_parameters() != 0 || body.nb_parameters() != 0 {
            return mismatch(SIGNATURE);
        }

        while_loop(universe, condition, body, true)
    }

    fn while_false(universe: &mut Universe, args: &[Value]) -> Return {
        const SIGNATURE: &str = "Block>>#whileFalse:";

        expect_args!(SIGNATURE, args, [
            Value::Block(condition) => condition,
            Value::Block(body) => body,
        ]);

        if condition.nb_parameters() != 0 || body.nb_parameters() != 0 {
            return mismatch(SIGNATURE);
        }

        while_loop(universe, condition, body, false)
    }
}

/// Primitives for the **Block1** class.
pub mod block1 {
    use super::*;

    pub static INSTANCE_PRIMITIVES: &[(&str, PrimitiveFn)] = &[("value", self::value)];
    pub static CLASS_PRIMITIVES: &[(&str, PrimitiveFn)] = &[];

    fn value(universe: &mut Universe, args: &[Value]) -> Return {
        const SIGNATURE: &str = "Block1>>#value";

        expect_args!(SIGNATURE, args, [
            Value::Block(block) => block,
        ]);

        block.call(universe, Vec::new())
    }
}

/// Primitives for the **Block2** class.
pub mod block2 {
    use super::*;

    pub static INSTANCE_PRIMITIVES: &[(&str, PrimitiveFn)] = &[("value:", self::value)];
    pub static CLASS_PRIMITIVES: &[(&str, PrimitiveFn)] = &[];

    fn value(universe: &mut Universe, args: &[Value]) -> Return {
        const SIGNATURE: &str = "Block2>>#value:";

        expect_args!(SIGNATURE, args, [
            Value::Block(block) => block,
            argument => argument,
        ]);

        block.call(universe, vec![argument.clone()])
    }
}

/// Primitives for the **Block3** class.
pub mod block3 {
    use super::*;

    pub static INSTANCE_PRIMITIVES: &[(&str, PrimitiveFn)] = &[("value:with:", self::value_with)];
    pub static CLASS_PRIMITIVES: &[(&str, PrimitiveFn)] = &[];

    fn value_with(universe: &mut Universe, args: &[Value]) -> Return {
        const SIGNATURE: &str = "Block3>>#value:with:";

        expect_args!(SIGNATURE, args, [
            Value::Block(block) => block,
            argument1 => argument1,
            argument2 => argument2,
        ]);

        block.call(universe, vec![argument1.clone(), argument2.clone()])
    }
}
