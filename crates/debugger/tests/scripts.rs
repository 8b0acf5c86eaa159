//! File-based session tests
//!
//! Each test consists of:
//! - A `.dbg` script run against the sample story
//! - A `.dbg.expected` file with the session output
//!
//! Errors are part of the transcript, so a failing command does not end
//! the test. Blank lines are dropped since an empty command repeats the
//! previous one.

use datatest_stable::harness;
use debug::mock::{sample_debug_info, sample_sources, MockMachine};
use debugger::{run_shared, Session, SessionConfig};
use std::fs;
use std::io;
use std::path::Path;

fn run_test(path: &Path) -> datatest_stable::Result<()> {
    common::debug::init();

    let script = fs::read_to_string(path)?;
    let commands: String = script
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| format!("{}\n", line))
        .collect();

    let expected_path = format!("{}.expected", path.display());
    let expected = fs::read_to_string(&expected_path)?.trim().to_string();

    let mut session = Session::new(
        MockMachine::sample(),
        Some(sample_debug_info()),
        SessionConfig::default(),
    )
    .with_sources(sample_sources())
    .with_output(Box::new(io::sink()));

    run_shared(&mut session, commands.as_bytes())
        .map_err(|e| format!("Session failed: {}", e))?;

    let actual = session.get_output().join("\n");
    if actual.trim() != expected {
        return Err(format!(
            "Output mismatch for {:?}\n\nExpected:\n{}\n\nActual:\n{}",
            path, expected, actual
        )
        .into());
    }

    Ok(())
}

harness!(run_test, "tests/scripts", r"\.dbg$");
