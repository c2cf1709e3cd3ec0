//! Type system for runform
//!
//! This module contains the value types every other crate works on:
//! - `Node`, the field tree
//! - `RuntimeInput`, the runtime-input marker
//! - `FieldPath`, a location inside a tree

pub mod path;
pub mod runtime_input;
pub mod value;

pub use path::{FieldPath, PathSegment};
pub use runtime_input::{RuntimeInput, RUNTIME_INPUT_VALUE};
pub use value::Node;
