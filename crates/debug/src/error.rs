//! Error types for expression evaluation and session control

use thiserror::Error;

/// A malformed or semantically invalid debugger expression.
///
/// Raised from inside the evaluator and caught once at command dispatch.
/// Unknown names and unresolvable addresses are not errors: they evaluate
/// to [`Value::Invalid`](crate::value::Value::Invalid).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    /// The expression text could not be parsed
    #[error("syntax error at column {col}: {msg}")]
    Syntax { col: usize, msg: String },
    /// The expression parsed but cannot be carried out
    #[error("{0}")]
    Expression(String),
}

impl EvalError {
    pub(crate) fn syntax(col: usize, msg: impl Into<String>) -> Self {
        EvalError::Syntax { col, msg: msg.into() }
    }

    pub(crate) fn expression(msg: impl Into<String>) -> Self {
        EvalError::Expression(msg.into())
    }
}

/// A failure reported by the VM debugging interface.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct VmError(pub String);

impl VmError {
    pub fn new(msg: impl Into<String>) -> Self {
        VmError(msg.into())
    }
}

/// A command-level failure, rendered as one line and then the session continues.
#[derive(Debug, Error)]
pub enum DebugError {
    #[error("session is not active")]
    NotActive,
    #[error("target is not paused")]
    NotPaused,
    #[error("no previous command to repeat")]
    NoPreviousCommand,
    #[error("cannot resolve address: {0}")]
    BadAddress(String),
    #[error("usage: {0}")]
    Usage(String),
    #[error("assertion failed: {0}")]
    AssertionFailed(String),
    #[error(transparent)]
    Eval(#[from] EvalError),
    #[error("VM error: {0}")]
    Vm(#[from] VmError),
    #[error("output error: {0}")]
    Io(#[from] std::io::Error),
}

/// A failure while running a command script.
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("failed to open script {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("error reading line {line}: {source}")]
    Read {
        line: usize,
        #[source]
        source: std::io::Error,
    },
    #[error("line {line}: {source}")]
    Command {
        line: usize,
        #[source]
        source: DebugError,
    },
}
