//!
//! This crate contains the types shared between a SOM front-end and the adaptive execution core.
//!

/// The resolved SOM tree definitions.
pub mod ast;
/// Source locations.
pub mod span;
