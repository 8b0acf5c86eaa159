//! Core debugger types shared between the session and the VM interface

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Why the target is (or is not) paused, as reported by the VM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PauseState {
    /// Executing instructions
    Running,
    /// Stopped at an armed breakpoint
    PausedByBreakpoint,
    /// Stopped because the VM hit an error
    PausedByError,
    /// Stopped on request: a pause interrupt or a completed step
    PausedByUser,
    /// Stopped at the entry point after a restart
    PausedOnEntry,
    /// The program has finished
    Terminated,
}

impl PauseState {
    /// Whether the target is stopped and can be stepped or inspected
    pub fn is_paused(self) -> bool {
        matches!(
            self,
            PauseState::PausedByBreakpoint
                | PauseState::PausedByError
                | PauseState::PausedByUser
                | PauseState::PausedOnEntry
        )
    }

    /// Human-readable reason, printed when the state changes
    pub fn describe(self) -> &'static str {
        match self {
            PauseState::Running => "Running",
            PauseState::PausedByBreakpoint => "Paused by breakpoint",
            PauseState::PausedByError => "Paused by error",
            PauseState::PausedByUser => "Paused by user",
            PauseState::PausedOnEntry => "Paused on entry",
            PauseState::Terminated => "Terminated",
        }
    }
}

/// Where a routine's result goes when it returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreTarget {
    /// Result is thrown away
    Discard,
    /// Result is pushed on the evaluation stack
    Stack,
    /// Result is stored in a local of the caller (1-15)
    Local(u8),
    /// Result is stored in a global (index 0-239)
    Global(u8),
}

impl StoreTarget {
    /// Decode a Z-machine store variable number; `None` means no store.
    pub fn from_variable(var: Option<u8>) -> Self {
        match var {
            None => StoreTarget::Discard,
            Some(0) => StoreTarget::Stack,
            Some(n @ 1..=15) => StoreTarget::Local(n),
            Some(n) => StoreTarget::Global(n - 16),
        }
    }
}

impl fmt::Display for StoreTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreTarget::Discard => write!(f, "discard"),
            StoreTarget::Stack => write!(f, "stack"),
            StoreTarget::Local(n) => write!(f, "local {}", n),
            StoreTarget::Global(n) => write!(f, "global {}", n),
        }
    }
}

/// One activation record on the VM call stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallFrame {
    /// Unpacked address of the routine header
    pub routine: u32,
    /// Address execution resumes at in the caller
    pub return_pc: u32,
    /// Number of arguments actually passed
    pub arg_count: u8,
    /// Evaluation stack depth of the caller when this frame was entered
    pub prev_stack_depth: u16,
    /// Where the result is stored
    pub store: StoreTarget,
    /// Local variable values (local 1 first)
    pub locals: Vec<u16>,
}

/// A routine entry observed while call tracing is enabled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallEvent {
    /// Packed address of the called routine
    pub routine: u32,
    /// Argument words
    pub args: Vec<u16>,
    /// Call depth of the new frame (the outermost routine is depth 0)
    pub depth: usize,
}

/// Lifecycle of a debugging session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    NotStarted,
    Active,
    Finished,
}

/// Thread-safe "request pause" primitive shared with the VM.
///
/// The VM polls [`PauseHandle::take`] between instructions while running;
/// any thread holding a clone may call [`PauseHandle::request`].
#[derive(Debug, Clone, Default)]
pub struct PauseHandle(Arc<AtomicBool>);

impl PauseHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the VM to pause at the next instruction boundary.
    pub fn request(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether a pause is pending.
    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Consume a pending request. Returns true if one was pending.
    pub fn take(&self) -> bool {
        self.0.swap(false, Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pause_state_is_paused() {
        assert!(PauseState::PausedByBreakpoint.is_paused());
        assert!(PauseState::PausedByError.is_paused());
        assert!(PauseState::PausedByUser.is_paused());
        assert!(PauseState::PausedOnEntry.is_paused());
        assert!(!PauseState::Running.is_paused());
        assert!(!PauseState::Terminated.is_paused());
    }

    #[test]
    fn test_store_target_from_variable() {
        assert_eq!(StoreTarget::from_variable(None), StoreTarget::Discard);
        assert_eq!(StoreTarget::from_variable(Some(0)), StoreTarget::Stack);
        assert_eq!(StoreTarget::from_variable(Some(3)), StoreTarget::Local(3));
        assert_eq!(StoreTarget::from_variable(Some(15)), StoreTarget::Local(15));
        assert_eq!(StoreTarget::from_variable(Some(16)), StoreTarget::Global(0));
        assert_eq!(StoreTarget::from_variable(Some(255)), StoreTarget::Global(239));
    }

    #[test]
    fn test_store_target_display() {
        assert_eq!(StoreTarget::Discard.to_string(), "discard");
        assert_eq!(StoreTarget::Local(2).to_string(), "local 2");
        assert_eq!(StoreTarget::Global(7).to_string(), "global 7");
    }

    #[test]
    fn test_pause_handle_shared_between_clones() {
        let handle = PauseHandle::new();
        let remote = handle.clone();
        assert!(!handle.is_requested());
        remote.request();
        assert!(handle.is_requested());
        assert!(handle.take());
        assert!(!handle.take());
        assert!(!remote.is_requested());
    }

    #[test]
    fn test_pause_handle_across_threads() {
        let handle = PauseHandle::new();
        let remote = handle.clone();
        std::thread::spawn(move || remote.request()).join().unwrap();
        assert!(handle.take());
    }
}
