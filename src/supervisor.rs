//! Watchdog for long statements. The statement runs on a scoped worker
//! thread while the calling thread waits on a budget; when the budget runs
//! out the operator is asked whether to keep waiting or stop the work.

use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use tokio_util::sync::CancellationToken;

use crate::access::PromptCounter;
use crate::error::ScriptError;
use crate::prompt::{Prompter, TimeoutChoice};
use crate::settings::ScriptSettings;

/// How long to wait before the first timeout prompt, and between later ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Budget {
    pub initial: Duration,
    pub extended: Duration,
}

impl Budget {
    pub fn from_settings(settings: &ScriptSettings) -> Self {
        Self {
            initial: settings.initial_wait(),
            extended: settings.extended_wait(),
        }
    }
}

/// One-shot completion flag the watcher can wait on with a deadline.
#[derive(Default)]
struct Completion {
    done: Mutex<bool>,
    signal: Condvar,
}

impl Completion {
    fn finish(&self) {
        *self.done.lock() = true;
        self.signal.notify_all();
    }

    /// Returns whether the work finished before `deadline`.
    fn wait_until(&self, deadline: Instant) -> bool {
        let mut done = self.done.lock();
        while !*done {
            if self.signal.wait_until(&mut done, deadline).timed_out() {
                return *done;
            }
        }
        true
    }

    fn wait(&self) {
        let mut done = self.done.lock();
        while !*done {
            self.signal.wait(&mut done);
        }
    }
}

/// Marks completion even when the worker unwinds.
struct FinishOnDrop<'a>(&'a Completion);

impl Drop for FinishOnDrop<'_> {
    fn drop(&mut self) {
        self.0.finish();
    }
}

/// Run `work` under `budget`. A stop request cancels `cancel` and the call
/// then returns `Ok(())` once the worker has wound down, whatever the work
/// itself returned. A worker panic is re-raised on the calling thread.
pub(crate) fn supervise<F>(
    budget: Budget,
    prompter: &dyn Prompter,
    prompts: &PromptCounter,
    cancel: &CancellationToken,
    work: F,
) -> Result<(), ScriptError>
where
    F: FnOnce() -> Result<(), ScriptError> + Send,
{
    let completion = Completion::default();
    std::thread::scope(|scope| {
        let finished = &completion;
        let worker = scope.spawn(move || {
            let _finish = FinishOnDrop(finished);
            work()
        });

        let stopped = watch(budget, prompter, prompts, cancel, &completion);

        match worker.join() {
            Ok(_) if stopped => Ok(()),
            Ok(Err(ScriptError::Cancelled)) => Ok(()),
            Ok(result) => result,
            Err(panic) => std::panic::resume_unwind(panic),
        }
    })
}

/// Wait for completion, prompting on every expired budget. Returns true if
/// the operator chose to stop.
fn watch(
    budget: Budget,
    prompter: &dyn Prompter,
    prompts: &PromptCounter,
    cancel: &CancellationToken,
    completion: &Completion,
) -> bool {
    let started = Instant::now();
    let mut deadline = started.checked_add(budget.initial);
    let mut extended = false;
    loop {
        // A budget past the end of the clock never expires.
        let Some(until) = deadline else {
            completion.wait();
            return false;
        };
        if completion.wait_until(until) {
            return false;
        }
        // The worker is blocked on a question to the operator; asking a
        // second one on top of it would only confuse.
        if prompts.outstanding() > 0 {
            log::debug!("budget expired during a confirmation; waiting it out");
            completion.wait();
            return false;
        }
        match prompter.on_timeout(started.elapsed(), extended) {
            TimeoutChoice::Stop => {
                log::info!("stopping statement after {:?}", started.elapsed());
                cancel.cancel();
                return true;
            }
            TimeoutChoice::Wait => {
                extended = true;
                deadline = Instant::now().checked_add(budget.extended);
            }
        }
    }
}
