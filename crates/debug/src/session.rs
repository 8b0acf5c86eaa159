//! Debugging session that orchestrates stepping, breakpoints, and inspection.

use std::io::{self, Write};

use bumpalo::Bump;
use common::{create_logger, log, log_detail, log_warn, Logger, SourceCache};
use debuginfo::DebugInfo;

use crate::breakpoints::{BreakpointManager, BreakpointSet};
use crate::commands::{self, Command, HELP};
use crate::error::{DebugError, EvalError, VmError};
use crate::eval::{self, Evaluator, SyntaxMode};
use crate::format::{address, Formatter};
use crate::inspection::Inspector;
use crate::interface::DebugInterface;
use crate::source_map::SourceMapper;
use crate::stepping::{LineStep, StepMode, Stepper};
use crate::types::{PauseHandle, PauseState, SessionState};
use crate::value::Value;

/// Session settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Prompt shown before each command
    pub prompt: String,
    /// Expression syntax for `print`, `showobj`, `tree` and `assert`
    pub syntax: SyntaxMode,
    /// Lines shown on each side of the centre line by `list`
    pub list_window: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            prompt: "zdb> ".to_string(),
            syntax: SyntaxMode::Auto,
            list_window: 5,
        }
    }
}

impl SessionConfig {
    /// Defaults overridden by `ZDB_PROMPT`, `ZDB_SYNTAX` and `ZDB_LIST_WINDOW`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env), reading variables through `lookup`.
    /// Unparseable values are logged and ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let log = create_logger("config");
        let mut config = SessionConfig::default();
        if let Some(prompt) = lookup("ZDB_PROMPT") {
            config.prompt = prompt;
        }
        if let Some(syntax) = lookup("ZDB_SYNTAX") {
            match syntax.parse() {
                Ok(mode) => config.syntax = mode,
                Err(e) => log_warn!(log, "ignoring ZDB_SYNTAX: {}", e),
            }
        }
        if let Some(window) = lookup("ZDB_LIST_WINDOW") {
            match window.trim().parse() {
                Ok(n) => config.list_window = n,
                Err(_) => log_warn!(log, "ignoring ZDB_LIST_WINDOW: not a number: {}", window),
            }
        }
        config
    }
}

/// A debugging session generic over the VM it drives.
pub struct Session<V: DebugInterface> {
    vm: V,
    debug_info: Option<DebugInfo>,
    sources: SourceCache,
    config: SessionConfig,
    state: SessionState,
    breakpoints: BreakpointSet,
    trace_calls: bool,
    /// Last command (for repeat on empty line)
    last_command: Option<Command>,
    /// Pause state last printed
    last_reported: Option<PauseState>,
    /// Set by `run` and `reset`; forces the next pause report
    resumed: bool,
    out: Box<dyn Write>,
    /// Captured output lines (for testing)
    output: Vec<String>,
    log: Logger,
}

impl<V: DebugInterface> Session<V> {
    /// Create a session writing to stdout. Call [`activate`](Self::activate)
    /// before executing commands.
    pub fn new(vm: V, debug_info: Option<DebugInfo>, config: SessionConfig) -> Self {
        Self {
            vm,
            debug_info,
            sources: SourceCache::new(),
            config,
            state: SessionState::NotStarted,
            breakpoints: BreakpointSet::new(),
            trace_calls: false,
            last_command: None,
            last_reported: None,
            resumed: false,
            out: Box::new(io::stdout()),
            output: Vec::new(),
            log: create_logger("session"),
        }
    }

    /// Write output somewhere other than stdout.
    pub fn with_output(mut self, out: Box<dyn Write>) -> Self {
        self.out = out;
        self
    }

    /// Use a prepared source cache for `list` and location lines.
    pub fn with_sources(mut self, sources: SourceCache) -> Self {
        self.sources = sources;
        self
    }

    /// Print a line (captures to output buffer for testing)
    fn println(&mut self, msg: impl AsRef<str>) {
        let s = msg.as_ref().to_string();
        if let Err(e) = writeln!(self.out, "{}", s).and_then(|_| self.out.flush()) {
            log_warn!(self.log, "failed to write output: {}", e);
        }
        self.output.push(s);
    }

    /// Print the prompt without a newline. Not captured.
    pub fn print_prompt(&mut self) {
        if let Err(e) = write!(self.out, "{}", self.config.prompt).and_then(|_| self.out.flush()) {
            log_warn!(self.log, "failed to write prompt: {}", e);
        }
    }

    /// Get captured output (for testing)
    pub fn get_output(&self) -> &[String] {
        &self.output
    }

    /// Clear captured output (for testing)
    pub fn clear_output(&mut self) {
        self.output.clear();
    }

    pub fn vm(&self) -> &V {
        &self.vm
    }

    pub fn vm_mut(&mut self) -> &mut V {
        &mut self.vm
    }

    pub fn debug_info(&self) -> Option<&DebugInfo> {
        self.debug_info.as_ref()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == SessionState::Active
    }

    pub fn breakpoints(&self) -> &BreakpointSet {
        &self.breakpoints
    }

    /// Handle for requesting a pause from another thread.
    pub fn pause_handle(&self) -> PauseHandle {
        self.vm.pause_handle()
    }

    /// Start the session: restart the story at its entry point and report
    /// where it is paused.
    ///
    /// # Panics
    ///
    /// If the session was already activated.
    pub fn activate(&mut self) -> Result<(), DebugError> {
        assert_eq!(
            self.state,
            SessionState::NotStarted,
            "session activated twice"
        );
        self.state = SessionState::Active;
        log!(self.log, "session activated");
        self.vm.restart()?;
        self.resumed = true;
        self.report_pause();
        Ok(())
    }

    /// End the session. Call tracing is switched off in the VM.
    pub fn deactivate(&mut self) {
        if self.state != SessionState::Active {
            return;
        }
        if self.trace_calls {
            self.trace_calls = false;
            self.vm.set_call_tracing(false);
        }
        self.state = SessionState::Finished;
        log!(self.log, "session finished");
    }

    /// Parse and execute one line, printing any error. Returns `true` on quit.
    pub fn execute_line(&mut self, line: &str) -> bool {
        match self.execute(commands::parse(line)) {
            Ok(quit) => quit,
            Err(e) => {
                log_detail!(self.log, "command failed: {}", e);
                self.report_error(e);
                false
            }
        }
    }

    /// Print a one-line error and carry on.
    pub fn report_error(&mut self, err: impl std::fmt::Display) {
        self.println(format!("Error: {}", err));
    }

    /// Execute a command. Returns `Ok(true)` if the session should quit.
    pub fn execute(&mut self, cmd: Command) -> Result<bool, DebugError> {
        if self.state != SessionState::Active {
            return Err(DebugError::NotActive);
        }
        let cmd = match cmd {
            Command::Empty => self
                .last_command
                .clone()
                .ok_or(DebugError::NoPreviousCommand)?,
            cmd => {
                self.last_command = Some(cmd.clone());
                cmd
            }
        };
        log_detail!(self.log, "execute {:?}", cmd);

        match cmd {
            Command::Reset => self.cmd_reset(),
            Command::Step => self.cmd_step(V::step_into),
            Command::Over => self.cmd_step(V::step_over),
            Command::Up => self.cmd_step(V::step_up),
            Command::StepLine => self.cmd_step_line(StepMode::Into),
            Command::OverLine => self.cmd_step_line(StepMode::Over),
            Command::Run => self.cmd_run(),
            Command::Pause => self.cmd_pause(),
            Command::Break(spec) => self.cmd_break(&spec),
            Command::Clear(spec) => self.cmd_clear(&spec),
            Command::Breakpoints => self.cmd_breakpoints(),
            Command::TraceCalls => self.cmd_trace_calls(),
            Command::Backtrace => {
                let lines = Inspector::backtrace(&self.vm, self.debug_info.as_ref());
                self.print_lines(lines)
            }
            Command::Locals => {
                let lines = Inspector::locals(&mut self.vm, self.debug_info.as_ref());
                self.print_lines(lines)
            }
            Command::Globals => {
                let lines = Inspector::globals(&self.vm, self.debug_info.as_ref());
                self.print_lines(lines)
            }
            Command::Print(text) => self.cmd_print(&text),
            Command::ShowObj(text) => self.cmd_show_object(&text),
            Command::Tree(root) => self.cmd_tree(root.as_deref()),
            Command::List(spec) => self.cmd_list(spec.as_deref()),
            Command::Syntax(mode) => self.cmd_syntax(mode.as_deref()),
            Command::Assert(text) => self.cmd_assert(&text),
            Command::Quit => {
                self.deactivate();
                return Ok(true);
            }
            Command::Help => self.print_lines(HELP.iter().map(|s| s.to_string()).collect()),
            Command::Empty => Ok(()),
            Command::Unknown(text) => {
                self.println(format!("Unknown command: {}", text));
                self.print_lines(HELP.iter().map(|s| s.to_string()).collect())
            }
        }?;
        Ok(false)
    }

    fn print_lines(&mut self, lines: Vec<String>) -> Result<(), DebugError> {
        for line in lines {
            self.println(line);
        }
        Ok(())
    }

    fn require_paused(&self) -> Result<(), DebugError> {
        if self.vm.pause_state().is_paused() {
            Ok(())
        } else {
            Err(DebugError::NotPaused)
        }
    }

    // ------------------------------------------------------------------
    // Execution
    // ------------------------------------------------------------------

    fn cmd_reset(&mut self) -> Result<(), DebugError> {
        self.vm.restart()?;
        self.resumed = true;
        self.report_pause();
        Ok(())
    }

    fn cmd_step(&mut self, step: fn(&mut V) -> Result<(), VmError>) -> Result<(), DebugError> {
        self.require_paused()?;
        step(&mut self.vm)?;
        self.report_pause();
        Ok(())
    }

    fn cmd_step_line(&mut self, mode: StepMode) -> Result<(), DebugError> {
        self.require_paused()?;
        match Stepper::step_line(&mut self.vm, self.debug_info.as_ref(), mode)? {
            LineStep::NoLineInfo => {
                let pc = self.vm.pc();
                self.println(format!("No line information at {}.", address(pc)));
            }
            LineStep::Moved | LineStep::Stopped => self.report_pause(),
        }
        Ok(())
    }

    fn cmd_run(&mut self) -> Result<(), DebugError> {
        if self.vm.pause_state() == PauseState::Terminated {
            log!(self.log, "restarting terminated story");
            self.vm.restart()?;
        }
        self.require_paused()?;
        self.vm.run()?;
        self.resumed = true;
        self.report_pause();
        Ok(())
    }

    fn cmd_pause(&mut self) -> Result<(), DebugError> {
        if self.vm.pause_state() == PauseState::Running {
            self.vm.pause_handle().request();
            self.println("Pause requested.");
        } else {
            self.println("Target is not running.");
        }
        Ok(())
    }

    /// Print traced calls, then the pause reason if it changed (or the story
    /// was resumed), then the location while paused.
    fn report_pause(&mut self) {
        self.print_call_events();

        let state = self.vm.pause_state();
        let show_reason = self.last_reported != Some(state) || self.resumed;
        self.resumed = false;
        self.last_reported = Some(state);
        log_detail!(self.log, "pause state {:?}", state);

        if show_reason {
            self.println(state.describe());
        }
        if state.is_paused() {
            self.print_location();
        }
    }

    fn print_location(&mut self) {
        let pc = self.vm.pc();
        let here = self.describe_address(pc);
        let line = self
            .debug_info
            .as_ref()
            .and_then(|info| SourceMapper::position(info, pc))
            .map(|pos| SourceMapper::describe_line(&mut self.sources, &pos));
        self.println(here);
        if let Some(line) = line {
            self.println(line);
        }
    }

    fn print_call_events(&mut self) {
        if !self.trace_calls {
            return;
        }
        let events = self.vm.take_call_events();
        for event in events {
            let start = self.vm.unpack_routine(event.routine);
            let name = match self.debug_info.as_ref().and_then(|i| i.routine_starting_at(start)) {
                Some(r) => r.name.clone(),
                None => address(event.routine),
            };
            let args: Vec<String> = event.args.iter().map(|a| (*a as i16).to_string()).collect();
            self.println(format!("{}{}({})", "  ".repeat(event.depth), name, args.join(", ")));
        }
    }

    // ------------------------------------------------------------------
    // Breakpoints
    // ------------------------------------------------------------------

    /// `$XXXX ROUTINE+off`, or just `$XXXX` outside known routines.
    fn describe_address(&self, addr: u32) -> String {
        let here = Formatter::new(&self.vm, self.debug_info.as_ref()).location(addr);
        if here == address(addr) {
            here
        } else {
            format!("{} {}", address(addr), here)
        }
    }

    fn resolve_address(&self, spec: &str, usage: &str) -> Result<u32, DebugError> {
        if spec.is_empty() {
            return Err(DebugError::Usage(usage.to_string()));
        }
        BreakpointManager::resolve(spec, self.debug_info.as_ref())
            .ok_or_else(|| DebugError::BadAddress(spec.to_string()))
    }

    fn cmd_break(&mut self, spec: &str) -> Result<(), DebugError> {
        let addr = self.resolve_address(spec, "break <address>")?;
        let here = self.describe_address(addr);
        if self.breakpoints.add(addr) {
            self.vm.arm_breakpoint(addr);
            log!(self.log, "armed breakpoint at {}", address(addr));
            self.println(format!("Breakpoint set at {}", here));
        } else {
            self.println(format!("Breakpoint already set at {}", here));
        }
        Ok(())
    }

    fn cmd_clear(&mut self, spec: &str) -> Result<(), DebugError> {
        let addr = self.resolve_address(spec, "clear <address>")?;
        let here = self.describe_address(addr);
        if self.breakpoints.remove(addr) {
            self.vm.disarm_breakpoint(addr);
            log!(self.log, "disarmed breakpoint at {}", address(addr));
            self.println(format!("Breakpoint cleared at {}", here));
        } else {
            self.println(format!("No breakpoint at {}", here));
        }
        Ok(())
    }

    fn cmd_breakpoints(&mut self) -> Result<(), DebugError> {
        if self.breakpoints.is_empty() {
            self.println("No breakpoints.");
            return Ok(());
        }
        let lines = self
            .breakpoints
            .iter()
            .map(|addr| self.describe_address(addr))
            .collect();
        self.print_lines(lines)
    }

    fn cmd_trace_calls(&mut self) -> Result<(), DebugError> {
        self.trace_calls = !self.trace_calls;
        self.vm.set_call_tracing(self.trace_calls);
        if self.trace_calls {
            self.println("Call tracing on.");
        } else {
            self.println("Call tracing off.");
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Expressions and inspection
    // ------------------------------------------------------------------

    /// Parse and evaluate with the configured syntax. The result may be an lvalue.
    fn evaluate(&mut self, text: &str) -> Result<Value, DebugError> {
        let arena = Bump::new();
        let expr = eval::parse(&arena, text, self.config.syntax)?;
        let value = Evaluator::new(&mut self.vm, self.debug_info.as_ref()).evaluate(&expr)?;
        Ok(value)
    }

    fn object_arg(&mut self, text: &str) -> Result<u16, DebugError> {
        let value = self.evaluate(text)?.resolve(&self.vm);
        let count = self.vm.object_count() as i32;
        match value.content() {
            Some(n) if matches!(value, Value::Object(_) | Value::Number(_)) && (1..=count).contains(&n) => {
                Ok(n as u16)
            }
            _ => Err(EvalError::Expression(format!("not an object: {}", text)).into()),
        }
    }

    fn cmd_print(&mut self, text: &str) -> Result<(), DebugError> {
        if text.is_empty() {
            return Err(DebugError::Usage("print <expression>".to_string()));
        }
        let value = self.evaluate(text)?;
        let shown = Formatter::new(&self.vm, self.debug_info.as_ref()).value(value);
        self.println(shown);
        Ok(())
    }

    fn cmd_show_object(&mut self, text: &str) -> Result<(), DebugError> {
        if text.is_empty() {
            return Err(DebugError::Usage("showobj <object>".to_string()));
        }
        let obj = self.object_arg(text)?;
        let lines = Inspector::show_object(&self.vm, self.debug_info.as_ref(), obj);
        self.print_lines(lines)
    }

    fn cmd_tree(&mut self, root: Option<&str>) -> Result<(), DebugError> {
        let root = root.map(|text| self.object_arg(text)).transpose()?;
        let lines = Inspector::tree(&self.vm, self.debug_info.as_ref(), root);
        self.print_lines(lines)
    }

    fn cmd_assert(&mut self, text: &str) -> Result<(), DebugError> {
        if text.is_empty() {
            return Err(DebugError::Usage("assert <expression>".to_string()));
        }
        let value = self.evaluate(text)?.resolve(&self.vm);
        if value.truthy() == Some(true) {
            self.println(format!("Assertion passed: {}", text));
            Ok(())
        } else {
            Err(DebugError::AssertionFailed(text.to_string()))
        }
    }

    fn cmd_syntax(&mut self, mode: Option<&str>) -> Result<(), DebugError> {
        if let Some(mode) = mode {
            self.config.syntax = mode
                .parse()
                .map_err(|_| DebugError::Usage("syntax [auto|form|infix]".to_string()))?;
        }
        let syntax = self.config.syntax;
        self.println(format!("Expression syntax: {}", syntax));
        Ok(())
    }

    fn cmd_list(&mut self, spec: Option<&str>) -> Result<(), DebugError> {
        let pc = self.vm.pc();
        let (current, target) = match self.debug_info.as_ref() {
            None => (None, None),
            Some(info) => {
                let current = SourceMapper::position(info, pc);
                let target = match spec {
                    Some(spec) => Some(
                        SourceMapper::parse_line_spec(info, spec, current.as_ref())
                            .ok_or_else(|| DebugError::BadAddress(spec.to_string()))?,
                    ),
                    None => current.as_ref().map(|p| (p.file.clone(), p.loc.line)),
                };
                (current, target)
            }
        };

        let Some((file, line)) = target else {
            self.println(format!("No source information at {}.", address(pc)));
            return Ok(());
        };
        let marker = current.filter(|c| c.file == file).map(|c| c.loc.line);
        let lines = SourceMapper::listing(&mut self.sources, &file, line, self.config.list_window, marker);
        if lines.is_empty() {
            self.println(format!("Cannot read source file {}.", file));
            return Ok(());
        }
        self.print_lines(lines)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::mock::{sample_debug_info, sample_sources, MockMachine};

    pub(crate) fn sample_session() -> Session<MockMachine> {
        let mut session = Session::new(
            MockMachine::sample(),
            Some(sample_debug_info()),
            SessionConfig::default(),
        )
        .with_sources(sample_sources())
        .with_output(Box::new(io::sink()));
        session.activate().unwrap();
        session.clear_output();
        session
    }

    fn run(session: &mut Session<MockMachine>, line: &str) -> Vec<String> {
        session.clear_output();
        session.execute_line(line);
        session.get_output().to_vec()
    }

    #[test]
    fn test_activate_reports_entry() {
        let mut session = Session::new(
            MockMachine::sample(),
            Some(sample_debug_info()),
            SessionConfig::default(),
        )
        .with_sources(sample_sources())
        .with_output(Box::new(io::sink()));
        assert_eq!(session.state(), SessionState::NotStarted);
        session.activate().unwrap();
        assert!(session.is_active());
        assert_eq!(
            session.get_output(),
            &["Paused on entry", "$1001 MAIN+1", "sample.zil:2: <TELL \"Hello\">"]
        );
    }

    #[test]
    #[should_panic(expected = "session activated twice")]
    fn test_activate_twice_panics() {
        let mut session = sample_session();
        let _ = session.activate();
    }

    #[test]
    fn test_commands_need_active_session() {
        let mut session = Session::new(MockMachine::sample(), None, SessionConfig::default())
            .with_output(Box::new(io::sink()));
        assert!(matches!(session.execute(Command::Step), Err(DebugError::NotActive)));
    }

    #[test]
    fn test_step_reports_reason_once() {
        let mut session = sample_session();
        assert_eq!(
            run(&mut session, "s"),
            vec!["Paused by user", "$1004 MAIN+4", "sample.zil:3: <SETG SCORE <GO 7 9>>"]
        );
        assert_eq!(
            run(&mut session, "step"),
            vec!["$1011 GO+1", "sample.zil:8: <PUSH 5> <SET FLAG T>"]
        );
    }

    #[test]
    fn test_blank_line_repeats() {
        let mut session = sample_session();
        assert_eq!(run(&mut session, ""), vec!["Error: no previous command to repeat"]);
        run(&mut session, "s");
        run(&mut session, "s");
        assert_eq!(
            run(&mut session, ""),
            vec!["$1013 GO+3", "sample.zil:8: <PUSH 5> <SET FLAG T>"]
        );
    }

    #[test]
    fn test_break_run_backtrace() {
        let mut session = sample_session();
        assert_eq!(run(&mut session, "break GO+5"), vec!["Breakpoint set at $1015 GO+5"]);
        assert_eq!(
            run(&mut session, "run"),
            vec!["Paused by breakpoint", "$1015 GO+5", "sample.zil:9: <HELPER 1>"]
        );
        assert_eq!(session.vm().pc(), 0x1015);
        assert_eq!(
            run(&mut session, "bt"),
            vec![
                "#0 GO+5 ($1015) args=2 stack=0 store=global SCORE return=MAIN+9",
                "#1 MAIN+9 ($1009) args=0 stack=0 store=discard",
            ]
        );
    }

    #[test]
    fn test_breakpoints_are_idempotent() {
        let mut session = sample_session();
        run(&mut session, "b GO+5");
        assert_eq!(run(&mut session, "b $1015"), vec!["Breakpoint already set at $1015 GO+5"]);
        run(&mut session, "b sample.zil:4");
        assert_eq!(run(&mut session, "bps"), vec!["$1009 MAIN+9", "$1015 GO+5"]);
        assert_eq!(session.vm().armed_breakpoints(), vec![0x1009, 0x1015]);

        assert_eq!(run(&mut session, "c GO+5"), vec!["Breakpoint cleared at $1015 GO+5"]);
        assert_eq!(run(&mut session, "c GO+5"), vec!["No breakpoint at $1015 GO+5"]);
        assert_eq!(session.vm().armed_breakpoints(), vec![0x1009]);
        run(&mut session, "c $1009");
        assert_eq!(run(&mut session, "bps"), vec!["No breakpoints."]);
    }

    #[test]
    fn test_bad_breakpoint_specs() {
        let mut session = sample_session();
        assert_eq!(run(&mut session, "b NOWHERE"), vec!["Error: cannot resolve address: NOWHERE"]);
        assert_eq!(run(&mut session, "b"), vec!["Error: usage: break <address>"]);
    }

    #[test]
    fn test_run_to_end_and_restart() {
        let mut session = sample_session();
        assert_eq!(run(&mut session, "run"), vec!["Terminated"]);
        assert_eq!(run(&mut session, "p SCORE"), vec!["global SCORE = 1 ($0001)"]);
        assert_eq!(run(&mut session, "s"), vec!["Error: target is not paused"]);
        // Running a terminated story starts it again.
        assert_eq!(run(&mut session, "r"), vec!["Terminated"]);
    }

    #[test]
    fn test_reset() {
        let mut session = sample_session();
        run(&mut session, "s");
        run(&mut session, "s");
        assert_eq!(
            run(&mut session, "reset"),
            vec!["Paused on entry", "$1001 MAIN+1", "sample.zil:2: <TELL \"Hello\">"]
        );
    }

    #[test]
    fn test_line_stepping() {
        let mut session = sample_session();
        assert_eq!(
            run(&mut session, "sl"),
            vec!["Paused by user", "$1004 MAIN+4", "sample.zil:3: <SETG SCORE <GO 7 9>>"]
        );
        assert_eq!(run(&mut session, "ol"), vec!["$1009 MAIN+9", "sample.zil:4: <CRLF>"]);
        assert_eq!(session.vm().read_variable(16), 1);
    }

    #[test]
    fn test_line_stepping_without_debug_info() {
        let mut session = Session::new(MockMachine::sample(), None, SessionConfig::default())
            .with_output(Box::new(io::sink()));
        session.activate().unwrap();
        session.clear_output();
        assert_eq!(run(&mut session, "sl"), vec!["No line information at $1001."]);
        assert_eq!(run(&mut session, "s"), vec!["Paused by user", "$1004"]);
    }

    #[test]
    fn test_step_up() {
        let mut session = sample_session();
        run(&mut session, "s");
        run(&mut session, "s");
        assert_eq!(run(&mut session, "up"), vec!["$1009 MAIN+9", "sample.zil:4: <CRLF>"]);
    }

    #[test]
    fn test_trace_calls() {
        let mut session = sample_session();
        assert_eq!(run(&mut session, "tc"), vec!["Call tracing on."]);
        assert!(session.vm().is_tracing());
        assert_eq!(run(&mut session, "run"), vec!["  GO(7, 9)", "    HELPER(1)", "Terminated"]);
        assert_eq!(run(&mut session, "tc"), vec!["Call tracing off."]);
        assert!(!session.vm().is_tracing());
    }

    #[test]
    fn test_print_expressions() {
        let mut session = sample_session();
        assert_eq!(
            run(&mut session, "p <GETP ,LAMP ,P?SIZE>"),
            vec!["word at $0123 = 42 ($002A)"]
        );
        assert_eq!(
            run(&mut session, "p <GETP ,BOX ,P?SIZE>"),
            vec!["word at $006C = 5 ($0005)"]
        );
        assert_eq!(run(&mut session, "p 5 = 3"), vec!["Error: cannot assign to a number"]);
        assert_eq!(
            run(&mut session, "p <PUTP ,BOX ,P?SIZE 3>"),
            vec!["Error: object 3 has no property 7"]
        );
        assert_eq!(run(&mut session, "p"), vec!["Error: usage: print <expression>"]);
    }

    #[test]
    fn test_show_object_and_tree() {
        let mut session = sample_session();
        let lines = run(&mut session, "so LAMP");
        assert_eq!(lines[0], "#2 (LAMP) \"brass lamp\"");
        assert_eq!(lines[4], "  attributes: LIGHTBIT (3), TAKEBIT (17)");
        assert_eq!(run(&mut session, "so 99"), vec!["Error: not an object: 99"]);
        assert_eq!(
            run(&mut session, "tree BOX"),
            vec!["#3 (BOX) \"wooden box\"", "  #4 (COIN) \"gold coin\""]
        );
    }

    #[test]
    fn test_list() {
        let mut session = Session::new(
            MockMachine::sample(),
            Some(sample_debug_info()),
            SessionConfig { list_window: 1, ..SessionConfig::default() },
        )
        .with_sources(sample_sources())
        .with_output(Box::new(io::sink()));
        session.activate().unwrap();
        assert_eq!(
            run(&mut session, "list"),
            vec![
                "     1 <ROUTINE MAIN ()",
                ">    2     <TELL \"Hello\">",
                "     3     <SETG SCORE <GO 7 9>>",
            ]
        );
        assert_eq!(
            run(&mut session, "li 13"),
            vec![
                "    12 <ROUTINE HELPER (N)",
                "    13     <SET N <+ .N 1>>",
                "    14     <RETURN 42>>",
            ]
        );
        assert_eq!(
            run(&mut session, "li other.zil:3"),
            vec!["Error: cannot resolve address: other.zil:3"]
        );
    }

    #[test]
    fn test_syntax() {
        let mut session = sample_session();
        assert_eq!(run(&mut session, "syntax"), vec!["Expression syntax: auto"]);
        assert_eq!(run(&mut session, "syntax form"), vec!["Expression syntax: form"]);
        assert_eq!(session.config().syntax, SyntaxMode::Form);
        assert_eq!(
            run(&mut session, "syntax bogus"),
            vec!["Error: usage: syntax [auto|form|infix]"]
        );
    }

    #[test]
    fn test_assert() {
        let mut session = sample_session();
        assert_eq!(run(&mut session, "assert HERE == 1"), vec!["Assertion passed: HERE == 1"]);
        assert_eq!(
            run(&mut session, "assert HERE == 2"),
            vec!["Error: assertion failed: HERE == 2"]
        );
    }

    #[test]
    fn test_variables() {
        let mut session = sample_session();
        assert_eq!(
            run(&mut session, "g"),
            vec!["SCORE = 0 ($0000)", "HERE = 1 ($0001)", "MOVES = 0 ($0000)"]
        );
        assert_eq!(run(&mut session, "l"), vec!["No locals."]);
    }

    #[test]
    fn test_unknown_command_prints_help() {
        let mut session = sample_session();
        let lines = run(&mut session, "frob");
        assert_eq!(lines[0], "Unknown command: frob");
        assert_eq!(lines.len(), 1 + HELP.len());
    }

    #[test]
    fn test_pause_when_not_running() {
        let mut session = sample_session();
        assert_eq!(run(&mut session, "pause"), vec!["Target is not running."]);
    }

    /// Output stream whose every write fails.
    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }
    }

    #[test]
    fn test_write_failures_are_not_fatal() {
        let mut session = sample_session().with_output(Box::new(BrokenPipe));
        session.print_prompt();
        assert!(session.get_output().is_empty());
        assert_eq!(run(&mut session, "bps"), vec!["No breakpoints."]);
        session.print_prompt();
        assert!(session.is_active());
    }

    #[test]
    fn test_stale_pause_request_is_dropped_on_resume() {
        let mut session = sample_session();
        session.pause_handle().request();
        assert_eq!(run(&mut session, "run"), vec!["Terminated"]);

        run(&mut session, "reset");
        session.pause_handle().request();
        assert_eq!(
            run(&mut session, "over"),
            vec!["Paused by user", "$1004 MAIN+4", "sample.zil:3: <SETG SCORE <GO 7 9>>"]
        );
        assert_eq!(run(&mut session, "over"), vec!["$1009 MAIN+9", "sample.zil:4: <CRLF>"]);
    }

    #[test]
    fn test_quit_finishes_session() {
        let mut session = sample_session();
        assert!(session.execute_line("q"));
        assert_eq!(session.state(), SessionState::Finished);
        assert_eq!(run(&mut session, "s"), vec!["Error: session is not active"]);
    }

    #[test]
    fn test_config_from_lookup() {
        let config = SessionConfig::from_lookup(|key| match key {
            "ZDB_PROMPT" => Some("> ".to_string()),
            "ZDB_SYNTAX" => Some("form".to_string()),
            "ZDB_LIST_WINDOW" => Some("lots".to_string()),
            _ => None,
        });
        assert_eq!(config.prompt, "> ");
        assert_eq!(config.syntax, SyntaxMode::Form);
        assert_eq!(config.list_window, 5);
        assert_eq!(SessionConfig::from_lookup(|_| None), SessionConfig::default());
    }
}
