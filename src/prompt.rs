//! Interactive questions the interpreter may put to an operator.

use std::io::{self, BufRead, Write};
use std::time::Duration;

use parking_lot::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    EnterRoot,
    EnterDebug,
}

impl Confirmation {
    pub fn question(self) -> &'static str {
        match self {
            Confirmation::EnterRoot => {
                "The script requests ROOT access (file loading and overwriting). Allow?"
            }
            Confirmation::EnterDebug => {
                "The script requests DEV access (diagnostics and unrestricted commands). Allow?"
            }
        }
    }
}

/// Operator's answer when a supervised script outlives its wait budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutChoice {
    Stop,
    Wait,
}

/// Blocking question channel. Confirmations are asked from the dispatching
/// thread, timeout choices from the supervising thread.
pub trait Prompter: Send + Sync {
    fn confirm(&self, request: Confirmation) -> bool;

    /// `extended` is true once the operator has already chosen to wait.
    fn on_timeout(&self, waited: Duration, extended: bool) -> TimeoutChoice;
}

/// Non-interactive policy: refuse every elevation, never interrupt a script.
#[derive(Debug, Clone, Copy, Default)]
pub struct Headless;

impl Prompter for Headless {
    fn confirm(&self, request: Confirmation) -> bool {
        log::info!("declined without an operator: {request:?}");
        false
    }

    fn on_timeout(&self, waited: Duration, _extended: bool) -> TimeoutChoice {
        log::warn!("script still running after {}s; waiting", waited.as_secs());
        TimeoutChoice::Wait
    }
}

/// Asks on stderr and reads `y`/`n` answers from stdin.
#[derive(Default)]
pub struct ConsolePrompter {
    // Serializes questions so two threads never interleave on the terminal.
    io: Mutex<()>,
}

impl ConsolePrompter {
    fn ask(&self, question: &str) -> bool {
        let _guard = self.io.lock();
        let mut err = io::stderr();
        let _ = write!(err, "{question} [y/N] ");
        let _ = err.flush();
        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(_) => matches!(line.trim(), "y" | "Y" | "yes"),
            Err(_) => false,
        }
    }
}

impl Prompter for ConsolePrompter {
    fn confirm(&self, request: Confirmation) -> bool {
        self.ask(request.question())
    }

    fn on_timeout(&self, waited: Duration, extended: bool) -> TimeoutChoice {
        let question = if extended {
            format!(
                "The script is still running after another {}s. Stop it?",
                waited.as_secs()
            )
        } else {
            format!(
                "The script has been running for {}s. Stop it?",
                waited.as_secs()
            )
        };
        if self.ask(&question) {
            TimeoutChoice::Stop
        } else {
            TimeoutChoice::Wait
        }
    }
}
