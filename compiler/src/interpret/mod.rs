//! Execution interpreter: simulated, time-ordered run of a workflow.
//!
//! Walks the step tree in the same depth-first pre-order as lowering and
//! appends one line pair per step to a [`LogSink`]. Nothing is sent, called
//! or written; every step reaches its success line. Delays go through the
//! injected [`Clock`], and the [`CancelToken`] is checked before every line.

pub mod clock;
pub mod dispatch;
pub mod log;
pub mod session;

pub use clock::{Clock, InstantClock, TokioClock};
pub use log::{ExecutionLog, LogEntry, LogSink, LogStatus};
pub use session::{RunError, Session};

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::Notify;

use crate::parse::types::{Step, Workflow};

use dispatch::{StepLines, indent, step_lines};

// =============================================================================
// CONFIG
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterpreterConfig {
    /// Pause between the start line and the trigger line.
    #[serde(default = "default_trigger_delay_ms")]
    pub trigger_delay_ms: u64,
    /// Pause after every step's lines.
    #[serde(default = "default_step_delay_ms")]
    pub step_delay_ms: u64,
    /// Pause before the completion line.
    #[serde(default = "default_finish_delay_ms")]
    pub finish_delay_ms: u64,
}

fn default_trigger_delay_ms() -> u64 {
    500
}

fn default_step_delay_ms() -> u64 {
    600
}

fn default_finish_delay_ms() -> u64 {
    500
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            trigger_delay_ms: default_trigger_delay_ms(),
            step_delay_ms: default_step_delay_ms(),
            finish_delay_ms: default_finish_delay_ms(),
        }
    }
}

// =============================================================================
// CANCELLATION
// =============================================================================

/// Cloneable stop signal for one run.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: Arc<CancelInner>,
}

#[derive(Debug, Default)]
struct CancelInner {
    cancelled: AtomicBool,
    notify: Notify,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Resolves once [`cancel`](Self::cancel) has been called.
    pub async fn cancelled(&self) {
        loop {
            let notified = self.inner.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}

// =============================================================================
// INTERPRETER
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RunOutcome {
    Completed { emitted: usize },
    /// The log stops at `emitted` lines; nothing is rolled back.
    Cancelled { emitted: usize },
}

impl RunOutcome {
    pub fn emitted(&self) -> usize {
        match self {
            RunOutcome::Completed { emitted } | RunOutcome::Cancelled { emitted } => *emitted,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, RunOutcome::Completed { .. })
    }
}

/// Marker for an observed cancellation; unwinds the traversal via `?`.
struct Stopped;

enum Work<'a> {
    Visit {
        step: &'a Step,
        index: usize,
        depth: usize,
    },
    /// Closing line of a container whose children have all been visited.
    Complete { line: String, depth: usize },
}

pub struct Interpreter<C: Clock = TokioClock> {
    clock: C,
    config: InterpreterConfig,
}

impl Interpreter<TokioClock> {
    pub fn new(config: InterpreterConfig) -> Self {
        Self::with_clock(TokioClock, config)
    }
}

impl<C: Clock> Interpreter<C> {
    pub fn with_clock(clock: C, config: InterpreterConfig) -> Self {
        Self { clock, config }
    }

    pub fn config(&self) -> &InterpreterConfig {
        &self.config
    }

    /// Simulate `workflow`, appending to `sink` until done or cancelled.
    pub async fn run<S>(&self, workflow: &Workflow, sink: &mut S, cancel: &CancelToken) -> RunOutcome
    where
        S: LogSink + Send + ?Sized,
    {
        let mut emitted = 0;
        let result = self.run_inner(workflow, sink, cancel, &mut emitted).await;

        match result {
            Ok(()) => {
                tracing::info!(workflow = %workflow.display_name(), emitted, "simulated run completed");
                RunOutcome::Completed { emitted }
            }
            Err(Stopped) => {
                tracing::info!(workflow = %workflow.display_name(), emitted, "simulated run cancelled");
                RunOutcome::Cancelled { emitted }
            }
        }
    }

    async fn run_inner<S>(
        &self,
        workflow: &Workflow,
        sink: &mut S,
        cancel: &CancelToken,
        emitted: &mut usize,
    ) -> Result<(), Stopped>
    where
        S: LogSink + Send + ?Sized,
    {
        let trigger_type = workflow
            .trigger
            .as_ref()
            .map(|t| t.kind.as_str())
            .filter(|kind| !kind.is_empty())
            .unwrap_or("manual");

        self.emit(sink, cancel, emitted, format!("Starting workflow: {}", workflow.display_name()), LogStatus::Success)?;
        self.pause(self.config.trigger_delay_ms, cancel).await?;
        self.emit(sink, cancel, emitted, format!("Trigger activated: {}", trigger_type), LogStatus::Info)?;

        let mut stack: Vec<Work<'_>> = Vec::new();
        push_children(&mut stack, &workflow.steps, 0);

        while let Some(work) = stack.pop() {
            match work {
                Work::Visit { step, index, depth } => match step_lines(step, index) {
                    StepLines::Container { start, complete } => {
                        tracing::debug!(step = %start, depth, "entering sub workflow");
                        self.emit(sink, cancel, emitted, indent(depth, &start), LogStatus::Info)?;
                        stack.push(Work::Complete { line: complete, depth });
                        push_children(&mut stack, step.children(), depth + 1);
                    }
                    StepLines::Action { info, success } => {
                        self.emit(sink, cancel, emitted, indent(depth, &info), LogStatus::Info)?;
                        self.emit(sink, cancel, emitted, indent(depth, &success), LogStatus::Success)?;
                        self.pause(self.config.step_delay_ms, cancel).await?;
                    }
                },
                Work::Complete { line, depth } => {
                    self.emit(sink, cancel, emitted, indent(depth, &line), LogStatus::Success)?;
                    self.pause(self.config.step_delay_ms, cancel).await?;
                }
            }
        }

        self.pause(self.config.finish_delay_ms, cancel).await?;
        self.emit(sink, cancel, emitted, "Workflow completed successfully!".to_string(), LogStatus::Success)?;

        Ok(())
    }

    fn emit<S>(
        &self,
        sink: &mut S,
        cancel: &CancelToken,
        emitted: &mut usize,
        message: String,
        status: LogStatus,
    ) -> Result<(), Stopped>
    where
        S: LogSink + ?Sized,
    {
        if cancel.is_cancelled() {
            return Err(Stopped);
        }
        sink.append(LogEntry {
            message,
            status,
            time: self.clock.timestamp(),
        });
        *emitted += 1;
        Ok(())
    }

    async fn pause(&self, millis: u64, cancel: &CancelToken) -> Result<(), Stopped> {
        tokio::select! {
            _ = self.clock.sleep(Duration::from_millis(millis)) => Ok(()),
            _ = cancel.cancelled() => Err(Stopped),
        }
    }
}

/// Push `steps` so that the first sibling is popped first.
fn push_children<'a>(stack: &mut Vec<Work<'a>>, steps: &'a [Step], depth: usize) {
    for (index, step) in steps.iter().enumerate().rev() {
        stack.push(Work::Visit { step, index, depth });
    }
}
