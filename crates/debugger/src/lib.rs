//! zdb front ends
//!
//! This crate connects a [`debug::Session`] to a line-oriented input stream,
//! either sharing the story's stream ([`run_shared`]) or on a dedicated one
//! that accepts interrupts while a command runs ([`run_interruptible`]).

pub mod repl;

pub use debug::{Session, SessionConfig};
pub use repl::{run_interruptible, run_shared};
