//! Command parsing for the debugger

/// A parsed debugger command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Restart the target at its entry point
    Reset,
    /// Execute one instruction, entering calls
    Step,
    /// Execute one instruction, running calls to completion
    Over,
    /// Run until the current routine returns
    Up,
    /// Step into until the source line changes
    StepLine,
    /// Step over until the source line changes
    OverLine,
    /// Resume continuous execution
    Run,
    /// Interrupt a running target
    Pause,
    /// Set a breakpoint at an address spec
    Break(String),
    /// Clear a breakpoint at an address spec
    Clear(String),
    /// List breakpoints
    Breakpoints,
    /// Toggle call tracing
    TraceCalls,
    Backtrace,
    Locals,
    Globals,
    /// Evaluate and print an expression
    Print(String),
    /// Show one object's links, attributes and properties
    ShowObj(String),
    /// Show the object tree, optionally under one object
    Tree(Option<String>),
    /// List source around the current or given line
    List(Option<String>),
    /// Show or change the expression syntax
    Syntax(Option<String>),
    /// Fail unless an expression is true (for scripts)
    Assert(String),
    Quit,
    Help,
    /// Empty line (repeat last command)
    Empty,
    /// Unknown command
    Unknown(String),
}

/// Command summary printed by `help`.
pub const HELP: &[&str] = &[
    "Commands:",
    "  reset                  restart the story",
    "  step/s, over/o, up     step into, over, or out of the current routine",
    "  stepline/sl            step into until the source line changes",
    "  overline/ol            step over until the source line changes",
    "  run/r                  run until a breakpoint or the end",
    "  pause                  interrupt a running story",
    "  break/b <addr>         set a breakpoint ($hex, number, file:line, ROUTINE[+off])",
    "  clear/c <addr>         clear a breakpoint",
    "  breakpoints/bps        list breakpoints",
    "  tracecalls/tc          toggle call tracing",
    "  backtrace/bt           show call frames",
    "  locals/l, globals/g    show variables",
    "  print/p <expr>         evaluate an expression",
    "  showobj/so <obj>       show an object",
    "  tree [obj]             show the object tree",
    "  list/li [file:line]    show source",
    "  syntax [auto|form|infix]",
    "  quit/q, help/h/?",
    "A blank line repeats the last command.",
];

/// Parse a command line into a Command
pub fn parse(line: &str) -> Command {
    let line = line.trim();
    if line.is_empty() {
        return Command::Empty;
    }

    let mut parts = line.splitn(2, char::is_whitespace);
    let cmd = parts.next().unwrap_or("").to_ascii_lowercase();
    let args = parts.next().unwrap_or("").trim();
    let optional = || (!args.is_empty()).then(|| args.to_string());

    match cmd.as_str() {
        "reset" => Command::Reset,
        "step" | "s" => Command::Step,
        "over" | "o" => Command::Over,
        "up" => Command::Up,
        "stepline" | "sl" => Command::StepLine,
        "overline" | "ol" => Command::OverLine,
        "run" | "r" => Command::Run,
        "pause" => Command::Pause,
        "break" | "b" => Command::Break(args.to_string()),
        "clear" | "c" => Command::Clear(args.to_string()),
        "breakpoints" | "bps" => Command::Breakpoints,
        "tracecalls" | "tc" => Command::TraceCalls,
        "backtrace" | "bt" => Command::Backtrace,
        "locals" | "l" => Command::Locals,
        "globals" | "g" => Command::Globals,
        "print" | "p" => Command::Print(args.to_string()),
        "showobj" | "so" => Command::ShowObj(args.to_string()),
        "tree" => Command::Tree(optional()),
        "list" | "li" => Command::List(optional()),
        "syntax" => Command::Syntax(optional()),
        "assert" => Command::Assert(args.to_string()),
        "quit" | "q" => Command::Quit,
        "help" | "h" | "?" => Command::Help,
        _ => Command::Unknown(line.to_string()),
    }
}

/// Whether a line is handled out of band, ahead of queued commands.
pub fn is_interrupt(line: &str) -> bool {
    parse(line) == Command::Pause
}
