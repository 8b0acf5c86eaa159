//! Source-line stepping built on the VM's instruction steps

use debuginfo::DebugInfo;

use crate::error::VmError;
use crate::interface::DebugInterface;
use crate::source_map::SourceMapper;

/// How each underlying instruction step treats calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepMode {
    /// Enter called routines
    Into,
    /// Run called routines to completion
    Over,
}

/// Result of a line step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStep {
    /// No line information covers the current position; nothing was executed
    NoLineInfo,
    /// Stopped on a different source line (or code without line info)
    Moved,
    /// The target stopped being paused (terminated, or hit an error)
    Stopped,
}

/// Stepping operations
pub struct Stepper;

impl Stepper {
    /// Step instructions until the `(file, line)` position changes.
    pub fn step_line<V: DebugInterface + ?Sized>(
        vm: &mut V,
        info: Option<&DebugInfo>,
        mode: StepMode,
    ) -> Result<LineStep, VmError> {
        let Some(start) = SourceMapper::line_key(info, vm.pc()) else {
            return Ok(LineStep::NoLineInfo);
        };

        loop {
            match mode {
                StepMode::Into => vm.step_into()?,
                StepMode::Over => vm.step_over()?,
            }
            if !vm.pause_state().is_paused() {
                return Ok(LineStep::Stopped);
            }
            if SourceMapper::line_key(info, vm.pc()) != Some(start) {
                return Ok(LineStep::Moved);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{sample_debug_info, MockMachine};
    use crate::types::PauseState;

    #[test]
    fn test_no_line_info() {
        let mut vm = MockMachine::sample();
        assert_eq!(Stepper::step_line(&mut vm, None, StepMode::Into), Ok(LineStep::NoLineInfo));
        assert_eq!(vm.pc(), 0x1001);
    }

    #[test]
    fn test_step_line_into_call() {
        let mut vm = MockMachine::sample();
        let info = sample_debug_info();
        vm.step_into().unwrap();
        assert_eq!(Stepper::step_line(&mut vm, Some(&info), StepMode::Into), Ok(LineStep::Moved));
        assert_eq!(vm.pc(), 0x1011);
    }

    #[test]
    fn test_step_line_skips_same_line() {
        let mut vm = MockMachine::sample();
        let info = sample_debug_info();
        vm.step_into().unwrap();
        vm.step_into().unwrap();
        assert_eq!(vm.pc(), 0x1011);
        // 0x1011 and 0x1013 are both on line 8
        Stepper::step_line(&mut vm, Some(&info), StepMode::Into).unwrap();
        assert_eq!(vm.pc(), 0x1015);
    }

    #[test]
    fn test_over_line_runs_call() {
        let mut vm = MockMachine::sample();
        let info = sample_debug_info();
        vm.step_into().unwrap();
        Stepper::step_line(&mut vm, Some(&info), StepMode::Over).unwrap();
        assert_eq!(vm.pc(), 0x1009);
        assert_eq!(vm.read_variable(16), 1);
    }

    #[test]
    fn test_stops_when_terminated() {
        let mut vm = MockMachine::sample();
        let info = sample_debug_info();
        vm.arm_breakpoint(0x100C);
        vm.run().unwrap();
        assert_eq!(Stepper::step_line(&mut vm, Some(&info), StepMode::Over), Ok(LineStep::Stopped));
        assert_eq!(vm.pause_state(), PauseState::Terminated);
    }
}
