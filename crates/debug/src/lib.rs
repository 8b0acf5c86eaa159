//! Debugger core for Z-machine stories
//!
//! This crate evaluates debugger expressions and drives a paused story
//! through the [`DebugInterface`] a Z-machine interpreter exposes.
//!
//! The main types are:
//! - [`Value`] - Tagged quantity with the guarded operator algebra
//! - [`Evaluator`] - Shared evaluator for the FORM and infix syntaxes
//! - [`Session`] - Command dispatch, stepping, breakpoints and inspection
//! - [`DebugInterface`] - What the session needs from the VM

pub mod breakpoints;
pub mod commands;
pub mod error;
pub mod eval;
pub mod format;
pub mod inspection;
pub mod interface;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod script;
pub mod session;
pub mod source_map;
pub mod stepping;
pub mod types;
pub mod value;

pub use breakpoints::{BreakpointManager, BreakpointSet};
pub use commands::Command;
pub use error::{DebugError, EvalError, ScriptError, VmError};
pub use eval::{Evaluator, SyntaxMode};
pub use format::Formatter;
pub use inspection::Inspector;
pub use interface::DebugInterface;
pub use script::{run_commands, run_script};
pub use session::{Session, SessionConfig};
pub use source_map::SourceMapper;
pub use stepping::Stepper;
pub use types::{CallEvent, CallFrame, PauseHandle, PauseState, SessionState, StoreTarget};
pub use value::{Value, ValueKind};
