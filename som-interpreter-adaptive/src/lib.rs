//!
//! This is the adaptive execution core for the Simple Object Machine.
//!
//! It walks a self-specializing tree: message sends carry inline caches,
//! field accesses go through per-class storage shapes and blocks close over
//! shared activation records.
//!

use std::cell::RefCell;
use std::rc::Rc;

/// Facilities for manipulating blocks.
pub mod block;
/// Facilities for manipulating classes and the class registry.
pub mod class;
/// Facilities for preparing resolved trees into executable nodes.
pub mod compiler;
/// The interpreter's tunables.
pub mod config;
/// Inline caches and the per-universe specialization table.
pub mod dispatch;
/// The interpreter's error types.
pub mod error;
/// Facilities for evaluating nodes and expressions.
pub mod evaluate;
/// Facilities for manipulating activation records.
pub mod frame;
/// Facilities for manipulating class instances.
pub mod instance;
/// Facilities for string interning.
pub mod interner;
/// Facilities for invoking methods and/or primitives.
pub mod invokable;
/// Facilities for manipulating class methods.
pub mod method;
/// The executable tree.
pub mod nodes;
/// Definitions for all supported primitives.
pub mod primitives;
/// Object shapes and storage locations.
pub mod shape;
/// The interpreter's main data structure.
pub mod universe;
/// Facilities for manipulating values.
pub mod value;

/// A strong and owning reference to an object.
pub type SOMRef<T> = Rc<RefCell<T>>;
