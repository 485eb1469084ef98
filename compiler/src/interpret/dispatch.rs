//! Step type → simulated log lines.

use crate::parse::types::{Step, StepKind};

/// Lines a step contributes to the run log, before indentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepLines {
    /// `sub_workflow`: `start` precedes the children, `complete` follows them.
    Container { start: String, complete: String },
    /// Every other step: an info line then a success line.
    Action { info: String, success: String },
}

pub fn step_lines(step: &Step, sibling_index: usize) -> StepLines {
    let name = step.display_name(sibling_index);
    let config = |key: &str, default: &str| step.config_text(key).unwrap_or_else(|| default.to_string());

    let (info, success) = match &step.kind {
        StepKind::SubWorkflow => {
            return StepLines::Container {
                start: format!("▶ Starting: {}", name),
                complete: format!("✓ Completed: {}", name),
            };
        }
        StepKind::Filter => (
            format!("Checking condition: {}", config("condition", "filter criteria")),
            "✓ Condition met, proceeding".to_string(),
        ),
        StepKind::SlackMessage => (
            format!("Sending Slack message to {}", config("channel", "#general")),
            format!("✓ Message sent: \"{}\"", config("message", &name)),
        ),
        StepKind::Email => (
            format!("Sending email to {}", config("to", "recipient")),
            "✓ Email sent".to_string(),
        ),
        StepKind::HttpRequest => (
            format!("Making HTTP request to {}", config("url", "API endpoint")),
            "✓ Request completed".to_string(),
        ),
        StepKind::Delay => (
            format!("Waiting for {}", config("duration", "specified time")),
            "✓ Delay completed".to_string(),
        ),
        StepKind::Action | StepKind::Other(_) => {
            if let StepKind::Other(tag) = &step.kind {
                tracing::warn!(step_type = %tag, step = %name, "unknown step type, simulating generic action");
            }
            (format!("Executing: {}", name), "✓ Step completed".to_string())
        }
    };

    StepLines::Action { info, success }
}

/// Two spaces per nesting level.
pub fn indent(depth: usize, message: &str) -> String {
    format!("{}{}", "  ".repeat(depth), message)
}
