use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeZone};
use serde_json::Value;

use flowc::interpret::Clock;
use flowc::parse::types::*;

// =============================================================================
// Workflow builders
// =============================================================================

pub fn workflow(name: &str, trigger: Option<TriggerKind>, steps: Vec<Step>) -> Workflow {
    Workflow {
        name: name.into(),
        trigger: trigger.map(|kind| Trigger {
            kind,
            config: Config::new(),
        }),
        steps,
    }
}

pub fn step(kind: &str, name: &str) -> Step {
    Step {
        id: None,
        kind: StepKind::from(kind.to_string()),
        name: Some(name.into()),
        config: Config::new(),
        steps: vec![],
    }
}

pub fn unnamed(kind: &str) -> Step {
    Step {
        name: None,
        ..step(kind, "")
    }
}

pub fn sub_workflow(name: &str, children: Vec<Step>) -> Step {
    Step {
        steps: children,
        ..step("sub_workflow", name)
    }
}

pub fn with_config(mut step: Step, key: &str, value: &str) -> Step {
    step.config.insert(key.into(), Value::String(value.into()));
    step
}

/// Nest `depth` sub workflows, innermost containing a single email step.
pub fn nested(depth: usize) -> Step {
    let mut current = step("email", "leaf");
    for level in (1..=depth).rev() {
        current = sub_workflow(&format!("level {}", level), vec![current]);
    }
    current
}

// =============================================================================
// Clock
// =============================================================================

/// Never sleeps; records every requested delay and stamps a fixed time.
#[derive(Clone, Default)]
pub struct RecordingClock {
    pub sleeps: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingClock {
    pub fn recorded(&self) -> Vec<u64> {
        self.sleeps
            .lock()
            .unwrap()
            .iter()
            .map(|d| d.as_millis() as u64)
            .collect()
    }
}

#[async_trait]
impl Clock for RecordingClock {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
        tokio::task::yield_now().await;
    }

    fn now(&self) -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap()
    }
}
