//! Read-eval-print loops for the two I/O regimes
//!
//! [`run_shared`] reads and executes one line at a time on the calling
//! thread. It suits a debugger sharing its stream with the story, where
//! nothing can be read while the story runs.
//!
//! [`run_interruptible`] reads input on a producer thread. Interrupt
//! commands (`pause`) are handled there immediately; everything else is
//! queued and executed in order by the calling thread.

use std::any::Any;
use std::io::BufRead;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;

use common::{create_logger, log, log_error, Logger};
use debug::commands;
use debug::{DebugError, DebugInterface, PauseHandle, Session, SessionState};

/// Run a session over a stream shared with the story.
///
/// Activates the session if needed and returns when it quits or input ends.
pub fn run_shared<V, R>(session: &mut Session<V>, mut input: R) -> Result<(), DebugError>
where
    V: DebugInterface,
    R: BufRead,
{
    if session.state() == SessionState::NotStarted {
        session.activate()?;
    }

    let mut line = String::new();
    while session.is_active() {
        session.print_prompt();
        line.clear();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        if session.execute_line(&line) {
            break;
        }
    }
    session.deactivate();
    Ok(())
}

/// Run a session over a dedicated stream, accepting `pause` while a
/// command is still executing.
///
/// A panic while executing a command is reported as an error line and the
/// loop carries on.
pub fn run_interruptible<V, R>(session: &mut Session<V>, input: R) -> Result<(), DebugError>
where
    V: DebugInterface,
    R: BufRead + Send + 'static,
{
    let log = create_logger("repl");
    if session.state() == SessionState::NotStarted {
        session.activate()?;
    }

    let (queue, pending) = mpsc::channel();
    let cancel = Arc::new(AtomicBool::new(false));
    let producer = {
        let pause = session.pause_handle();
        let cancel = Arc::clone(&cancel);
        thread::Builder::new()
            .name("zdb-input".to_string())
            .spawn(move || produce(input, queue, pause, cancel))?
    };

    consume(session, pending, &log);
    session.deactivate();

    // The producer may be blocked reading; it sees the flag on its next line.
    cancel.store(true, Ordering::SeqCst);
    if producer.is_finished() {
        if let Err(payload) = producer.join() {
            log_error!(log, "input thread panicked: {}", panic_message(payload.as_ref()));
        }
    } else {
        log!(log, "leaving input thread blocked on read");
    }
    Ok(())
}

/// Read lines until input ends or the consumer cancels. Dropping `queue`
/// on return tells the consumer no more commands will arrive.
fn produce<R: BufRead>(
    mut input: R,
    queue: Sender<String>,
    pause: PauseHandle,
    cancel: Arc<AtomicBool>,
) {
    let log = create_logger("input");
    let mut line = String::new();
    while !cancel.load(Ordering::SeqCst) {
        line.clear();
        match input.read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                log_error!(log, "failed to read command: {}", e);
                break;
            }
        }
        if commands::is_interrupt(&line) {
            log!(log, "pause requested");
            pause.request();
            continue;
        }
        if queue.send(line.clone()).is_err() {
            break;
        }
    }
    log!(log, "input finished");
}

/// Execute queued commands in arrival order while the session is active.
fn consume<V: DebugInterface>(session: &mut Session<V>, pending: Receiver<String>, log: &Logger) {
    while session.is_active() {
        session.print_prompt();
        let Ok(line) = pending.recv() else {
            break;
        };
        match panic::catch_unwind(AssertUnwindSafe(|| session.execute_line(&line))) {
            Ok(true) => break,
            Ok(false) => {}
            Err(payload) => {
                let msg = panic_message(payload.as_ref());
                log_error!(log, "command {:?} panicked: {}", line.trim(), msg);
                session.report_error(format!("internal error: {}", msg));
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use debug::mock::{sample_builder, sample_debug_info, sample_sources, Instr, MockMachine};
    use debug::{PauseState, SessionConfig};
    use std::io::{self, BufReader, Cursor, Read};
    use std::time::Duration;

    fn session_for(vm: MockMachine) -> Session<MockMachine> {
        Session::new(vm, Some(sample_debug_info()), SessionConfig::default())
            .with_sources(sample_sources())
            .with_output(Box::new(io::sink()))
    }

    /// Input fed one line at a time from another thread.
    struct Feed {
        lines: Receiver<String>,
        pending: Vec<u8>,
    }

    impl Read for Feed {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.pending.is_empty() {
                match self.lines.recv() {
                    Ok(line) => self.pending = line.into_bytes(),
                    Err(_) => return Ok(0),
                }
            }
            let n = buf.len().min(self.pending.len());
            buf[..n].copy_from_slice(&self.pending[..n]);
            self.pending.drain(..n);
            Ok(n)
        }
    }

    #[test]
    fn test_shared_runs_lines_in_order() {
        let mut session = session_for(MockMachine::sample());
        run_shared(&mut session, Cursor::new("s\npause\nbt\nquit\nstep\n")).unwrap();
        assert_eq!(session.state(), SessionState::Finished);
        assert_eq!(
            session.get_output(),
            &[
                "Paused on entry",
                "$1001 MAIN+1",
                "sample.zil:2: <TELL \"Hello\">",
                "Paused by user",
                "$1004 MAIN+4",
                "sample.zil:3: <SETG SCORE <GO 7 9>>",
                "Target is not running.",
                "#0 MAIN+4 ($1004) args=0 stack=0 store=discard",
            ]
        );
    }

    #[test]
    fn test_shared_ends_with_input() {
        let mut session = session_for(MockMachine::sample());
        run_shared(&mut session, Cursor::new("b GO+5\nr")).unwrap();
        assert_eq!(session.state(), SessionState::Finished);
        assert_eq!(session.vm().pc(), 0x1015);
    }

    #[test]
    fn test_interruptible_keeps_order() {
        let mut session = session_for(MockMachine::sample());
        run_interruptible(&mut session, Cursor::new("s\ns\nglobals\n")).unwrap();
        assert_eq!(session.state(), SessionState::Finished);
        assert_eq!(session.vm().pc(), 0x1011);
        let output = session.get_output();
        assert_eq!(output[output.len() - 3..], ["SCORE = 0 ($0000)", "HERE = 1 ($0001)", "MOVES = 0 ($0000)"]);
    }

    #[test]
    fn test_pause_interrupts_run() {
        let mut session = session_for(MockMachine::spinning());
        let (feed, lines) = mpsc::channel();
        feed.send("run\n".to_string()).unwrap();
        let feeder = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            for line in ["pause\n", "bt\n", "quit\n"] {
                feed.send(line.to_string()).unwrap();
            }
        });

        let input = BufReader::new(Feed { lines, pending: Vec::new() });
        run_interruptible(&mut session, input).unwrap();
        feeder.join().unwrap();

        assert_eq!(session.state(), SessionState::Finished);
        assert_eq!(session.vm().pause_state(), PauseState::PausedByUser);
        let output = session.get_output();
        assert!(output.iter().any(|l| l == "Paused by user"));
        // The command queued behind the interrupted run still executed.
        assert!(output.iter().any(|l| l.starts_with("#0 SPIN+")));
    }

    #[test]
    fn test_pause_while_paused_does_not_cut_run_short() {
        let mut session = session_for(MockMachine::sample());
        run_interruptible(&mut session, Cursor::new("pause\nrun\n")).unwrap();
        assert_eq!(session.vm().pause_state(), PauseState::Terminated);
        assert_eq!(session.get_output().last().map(String::as_str), Some("Terminated"));
    }

    #[test]
    fn test_panicking_command_is_isolated() {
        let vm = sample_builder().instr(0x1001, 3, Instr::Panic).build();
        let mut session = session_for(vm);
        run_interruptible(&mut session, Cursor::new("s\np 1 + 1\n")).unwrap();
        let output = session.get_output();
        assert_eq!(
            output[output.len() - 2..],
            ["Error: internal error: scripted interpreter fault at $1001", "2 ($0002)"]
        );
    }
}
