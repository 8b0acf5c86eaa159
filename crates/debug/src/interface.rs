//! Debugging interface of the Z-machine
//!
//! The [`DebugInterface`] trait is everything the debugger consumes from the
//! virtual machine: execution control, memory and variable access, the
//! object tree, call frames and breakpoint arming. The interpreter owns
//! these facilities; the debugger only drives and inspects them.

use crate::error::VmError;
use crate::types::{CallEvent, CallFrame, PauseHandle, PauseState};

/// Abstract interface to a Z-machine being debugged.
///
/// Addresses are unpacked byte addresses unless a method says otherwise.
/// Packed addresses are decoded by the VM because the decoding depends on
/// the story version.
pub trait DebugInterface {
    // ------------------------------------------------------------------
    // Execution control
    // ------------------------------------------------------------------

    /// Story file version (1-8).
    fn version(&self) -> u8;

    /// Current program counter.
    fn pc(&self) -> u32;

    /// Current pause state.
    fn pause_state(&self) -> PauseState;

    /// A handle other threads may use to request a pause while `run` blocks.
    ///
    /// Resuming (`run` or any step) discards a request made while paused.
    fn pause_handle(&self) -> PauseHandle;

    /// Restart the story and stop at its entry point.
    fn restart(&mut self) -> Result<(), VmError>;

    /// Execute one instruction, entering calls.
    fn step_into(&mut self) -> Result<(), VmError>;

    /// Execute one instruction, running any call it makes to completion.
    fn step_over(&mut self) -> Result<(), VmError>;

    /// Run until the current routine returns to its caller.
    fn step_up(&mut self) -> Result<(), VmError>;

    /// Run until a breakpoint, an error, a pause request or termination.
    fn run(&mut self) -> Result<(), VmError>;

    // ------------------------------------------------------------------
    // Memory and variables
    // ------------------------------------------------------------------

    /// Size of addressable memory in bytes.
    fn memory_size(&self) -> u32;

    fn read_byte(&self, address: u32) -> u8;

    fn read_word(&self, address: u32) -> u16;

    fn write_byte(&mut self, address: u32, value: u8);

    fn write_word(&mut self, address: u32, value: u16);

    /// Read a variable: 0 peeks the top of the evaluation stack, 1-15 are
    /// locals of the current frame, 16-255 are globals.
    fn read_variable(&self, var: u8) -> u16;

    /// Write a variable: 0 replaces the top of the evaluation stack.
    fn write_variable(&mut self, var: u8, value: u16);

    // ------------------------------------------------------------------
    // Object tree
    // ------------------------------------------------------------------

    /// Number of objects in the object table (best effort).
    fn object_count(&self) -> u16;

    /// Address of an object's entry, which begins with its attribute bitmap.
    fn object_address(&self, obj: u16) -> u32;

    fn object_parent(&self, obj: u16) -> u16;

    fn object_child(&self, obj: u16) -> u16;

    fn object_sibling(&self, obj: u16) -> u16;

    /// Make `obj` the first child of `dest`.
    fn move_object(&mut self, obj: u16, dest: u16);

    /// Detach `obj` from its parent.
    fn remove_object(&mut self, obj: u16);

    /// Decoded short name of an object.
    fn object_short_name(&self, obj: u16) -> String;

    // ------------------------------------------------------------------
    // Properties
    // ------------------------------------------------------------------

    /// Address of a property's data, or 0 if the object lacks it.
    fn property_address(&self, obj: u16, prop: u16) -> u32;

    /// Length of the property whose data starts at `data_address`.
    fn property_length(&self, data_address: u32) -> u16;

    /// Next property number after `prop` (0 = first); 0 when none remain.
    fn next_property(&self, obj: u16, prop: u16) -> u16;

    // ------------------------------------------------------------------
    // Frames and evaluation stack
    // ------------------------------------------------------------------

    /// Call frames, innermost first.
    fn frames(&self) -> Vec<CallFrame>;

    /// Total number of words on the evaluation stack.
    fn stack_depth(&self) -> u16;

    fn pop_stack(&mut self) -> u16;

    fn push_stack(&mut self, value: u16);

    // ------------------------------------------------------------------
    // Breakpoints
    // ------------------------------------------------------------------

    fn arm_breakpoint(&mut self, address: u32);

    fn disarm_breakpoint(&mut self, address: u32);

    // ------------------------------------------------------------------
    // Routines and strings
    // ------------------------------------------------------------------

    /// Call a routine by packed address and return its result.
    fn call_routine(&mut self, packed: u32, args: &[u16]) -> Result<u16, VmError>;

    fn unpack_routine(&self, packed: u32) -> u32;

    fn pack_routine(&self, address: u32) -> u32;

    fn unpack_string(&self, packed: u32) -> u32;

    /// Decode the encoded text starting at an unpacked address.
    fn decode_text(&self, address: u32) -> String;

    // ------------------------------------------------------------------
    // Call tracing
    // ------------------------------------------------------------------

    /// Start or stop recording routine entries.
    fn set_call_tracing(&mut self, enabled: bool);

    /// Drain routine entries recorded since the last call.
    fn take_call_events(&mut self) -> Vec<CallEvent>;
}
