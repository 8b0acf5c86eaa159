//! Debug information crate for zdb
//!
//! This crate models the symbol side-channel a Z-machine compiler emits next
//! to a story file: routine code ranges with their locals and line points,
//! and the names of objects, attributes, properties and globals.
//!
//! The main types are:
//! - [`DebugInfo`] - Complete debug information for a story, with lookups
//! - [`DebugInfoBuilder`] - Builder for constructing debug info
//!
//! Reading a compiler's debug file into these types is left to the loader
//! of that format; the debugger only consumes the model.

pub mod builder;
pub mod lookup;
pub mod types;

pub use builder::DebugInfoBuilder;
pub use types::{DebugInfo, LineFlags, LinePoint, Routine, SourceFile, Symbol};
