//! Script execution for the debugger

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::commands;
use crate::error::ScriptError;
use crate::interface::DebugInterface;
use crate::session::Session;

/// Run a debugger script file, echoing each command before executing it.
pub fn run_script<V: DebugInterface>(
    session: &mut Session<V>,
    script_path: &Path,
) -> Result<(), ScriptError> {
    let file = File::open(script_path).map_err(|source| ScriptError::Open {
        path: script_path.display().to_string(),
        source,
    })?;

    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|source| ScriptError::Read { line: index + 1, source })?;
        if !run_line(session, &line, index + 1, true)? {
            break;
        }
    }
    Ok(())
}

/// Run commands from a string. Blank lines and `#` comments are skipped.
pub fn run_commands<V: DebugInterface>(
    session: &mut Session<V>,
    commands: &str,
) -> Result<(), ScriptError> {
    for (index, line) in commands.lines().enumerate() {
        if !run_line(session, line, index + 1, false)? {
            break;
        }
    }
    Ok(())
}

/// Returns false once the script quits.
fn run_line<V: DebugInterface>(
    session: &mut Session<V>,
    line: &str,
    number: usize,
    echo: bool,
) -> Result<bool, ScriptError> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(true);
    }
    if echo {
        println!("> {}", trimmed);
    }
    match session.execute(commands::parse(trimmed)) {
        Ok(quit) => Ok(!quit),
        Err(source) => Err(ScriptError::Command { line: number, source }),
    }
}
