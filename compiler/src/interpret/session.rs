//! One workflow, its run guard and its observable log.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use thiserror::Error;

use crate::parse::types::Workflow;

use super::{CancelToken, Clock, ExecutionLog, Interpreter, RunOutcome};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RunError {
    #[error("workflow '{0}' is already running")]
    AlreadyRunning(String),
}

/// A workflow being edited and run from a single UI session.
///
/// At most one run is in flight at a time; a second `execute` is refused
/// instead of interleaving its lines with the first.
#[derive(Debug)]
pub struct Session {
    workflow: Arc<Workflow>,
    log: ExecutionLog,
    running: AtomicBool,
    current: Mutex<Option<CancelToken>>,
}

impl Session {
    pub fn new(workflow: Workflow) -> Self {
        Self {
            workflow: Arc::new(workflow),
            log: ExecutionLog::new(),
            running: AtomicBool::new(false),
            current: Mutex::new(None),
        }
    }

    pub fn workflow(&self) -> &Workflow {
        &self.workflow
    }

    /// Shared handle to the log; readable while a run is appending.
    pub fn log(&self) -> ExecutionLog {
        self.log.clone()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Stop the in-flight run, if any. Lines already logged stay.
    pub fn cancel(&self) -> bool {
        match self.lock_current().as_ref() {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Clear the log and run the workflow to completion or cancellation.
    pub async fn execute<C: Clock>(&self, interpreter: &Interpreter<C>) -> Result<RunOutcome, RunError> {
        let _guard = self.begin()?;
        let token = CancelToken::new();
        *self.lock_current() = Some(token.clone());

        self.log.clear();
        let mut sink = self.log.clone();
        Ok(interpreter.run(&self.workflow, &mut sink, &token).await)
    }

    fn begin(&self) -> Result<RunGuard<'_>, RunError> {
        self.running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| RunError::AlreadyRunning(self.workflow.name.clone()))?;
        Ok(RunGuard { session: self })
    }

    fn lock_current(&self) -> std::sync::MutexGuard<'_, Option<CancelToken>> {
        self.current.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Releases the running flag when the run ends, including on drop of a
/// cancelled or aborted future.
struct RunGuard<'a> {
    session: &'a Session,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        *self.session.lock_current() = None;
        self.session.running.store(false, Ordering::SeqCst);
    }
}
