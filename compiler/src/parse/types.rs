//! Rust types mirroring the workflow JSON returned by the generation service.
//!
//! These types are the serde target for `{ name, trigger, steps }` documents.
//! Step and trigger tags are open-ended: anything the lookup tables do not
//! know is preserved verbatim in an `Other` variant so both the compiler and
//! the interpreter can fall back to their default entries.
//!
//! Deserialization never fails on a JSON object. Generated documents are
//! loosely typed, so every field is read through a lenient helper: wrong-typed
//! names and tags are rendered as text, a missing `type` becomes an empty
//! `Other` tag, and non-object configs or non-array step lists read as empty.

use std::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Free-form configuration attached to triggers and steps.
pub type Config = Map<String, Value>;

// =============================================================================
// TOP-LEVEL WORKFLOW
// =============================================================================

/// Name used when the workflow carries none.
pub const DEFAULT_WORKFLOW_NAME: &str = "Generated Workflow";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    #[serde(default, deserialize_with = "lenient_name")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_trigger", skip_serializing_if = "Option::is_none")]
    pub trigger: Option<Trigger>,
    #[serde(default, deserialize_with = "lenient_steps")]
    pub steps: Vec<Step>,
}

impl Workflow {
    /// Workflow used when generation text contains no usable JSON object.
    pub fn fallback(prompt: &str) -> Self {
        let mut config = Config::new();
        config.insert("action".into(), Value::String(prompt.to_string()));

        Workflow {
            name: "Custom Workflow".into(),
            trigger: Some(Trigger {
                kind: TriggerKind::Manual,
                config: Config::new(),
            }),
            steps: vec![Step {
                id: Some("1".into()),
                kind: StepKind::Action,
                name: Some("Execute Action".into()),
                config,
                steps: Vec::new(),
            }],
        }
    }

    /// `name`, or [`DEFAULT_WORKFLOW_NAME`] when it is empty. Used by both
    /// the lowered document and the run log.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            DEFAULT_WORKFLOW_NAME
        } else {
            &self.name
        }
    }

    /// Total number of steps across every nesting level that the
    /// traversals visit.
    pub fn step_count(&self) -> usize {
        count_steps(&self.steps)
    }

    /// Deepest nesting level reached by a visited step (top level = 1).
    pub fn depth(&self) -> usize {
        max_depth(&self.steps)
    }
}

fn count_steps(steps: &[Step]) -> usize {
    steps.iter().map(|s| 1 + count_steps(s.children())).sum()
}

fn max_depth(steps: &[Step]) -> usize {
    steps
        .iter()
        .map(|s| 1 + max_depth(s.children()))
        .max()
        .unwrap_or(0)
}

// =============================================================================
// TRIGGER
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trigger {
    #[serde(rename = "type", default, deserialize_with = "lenient_kind")]
    pub kind: TriggerKind,
    #[serde(default, deserialize_with = "lenient_config")]
    pub config: Config,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TriggerKind {
    Webhook,
    Schedule,
    Manual,
    Other(String),
}

impl TriggerKind {
    pub fn as_str(&self) -> &str {
        match self {
            TriggerKind::Webhook => "webhook",
            TriggerKind::Schedule => "schedule",
            TriggerKind::Manual => "manual",
            TriggerKind::Other(s) => s,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, TriggerKind::Other(_))
    }
}

impl Default for TriggerKind {
    fn default() -> Self {
        TriggerKind::Other(String::new())
    }
}

impl From<String> for TriggerKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "webhook" => TriggerKind::Webhook,
            "schedule" => TriggerKind::Schedule,
            "manual" => TriggerKind::Manual,
            _ => TriggerKind::Other(s),
        }
    }
}

impl From<TriggerKind> for String {
    fn from(kind: TriggerKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// STEP: recursive, `sub_workflow` is the container case
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// Identity supplied by the generator. Never reused for output nodes.
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "lenient_kind")]
    pub kind: StepKind,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_config")]
    pub config: Config,
    /// Only traversed when `kind` is `SubWorkflow`.
    #[serde(default, deserialize_with = "lenient_steps", skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<Step>,
}

impl Step {
    pub fn is_container(&self) -> bool {
        self.kind == StepKind::SubWorkflow
    }

    /// Children visited by the traversals. Empty for every non-container
    /// step, whatever its `steps` field holds.
    pub fn children(&self) -> &[Step] {
        if self.is_container() { &self.steps } else { &[] }
    }

    /// `name` when present and non-empty, otherwise `Step {index}` where
    /// `index` is the 1-based position among siblings.
    pub fn display_name(&self, sibling_index: usize) -> String {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("Step {}", sibling_index + 1),
        }
    }

    /// Config value rendered as plain text; see [`value_text`].
    pub fn config_text(&self, key: &str) -> Option<String> {
        self.config.get(key).and_then(value_text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StepKind {
    Action,
    Filter,
    SlackMessage,
    Email,
    HttpRequest,
    Delay,
    SubWorkflow,
    Other(String),
}

impl StepKind {
    pub fn as_str(&self) -> &str {
        match self {
            StepKind::Action => "action",
            StepKind::Filter => "filter",
            StepKind::SlackMessage => "slack_message",
            StepKind::Email => "email",
            StepKind::HttpRequest => "http_request",
            StepKind::Delay => "delay",
            StepKind::SubWorkflow => "sub_workflow",
            StepKind::Other(s) => s,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, StepKind::Other(_))
    }
}

impl Default for StepKind {
    fn default() -> Self {
        StepKind::Other(String::new())
    }
}

impl From<String> for StepKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "action" => StepKind::Action,
            "filter" => StepKind::Filter,
            "slack_message" => StepKind::SlackMessage,
            "email" => StepKind::Email,
            "http_request" => StepKind::HttpRequest,
            "delay" => StepKind::Delay,
            "sub_workflow" => StepKind::SubWorkflow,
            _ => StepKind::Other(s),
        }
    }
}

impl From<StepKind> for String {
    fn from(kind: StepKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// LENIENT FIELD READERS
// =============================================================================

/// Whether a JSON value counts as present: `null`, `false`, `0` and `""`
/// do not.
pub fn is_present(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => false,
        Value::Bool(true) => true,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64() != Some(0.0),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Text of a present value. Strings are unquoted, everything else is
/// rendered as JSON.
pub fn value_text(value: &Value) -> Option<String> {
    if !is_present(value) {
        return None;
    }
    match value {
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(value_text(&Value::deserialize(deserializer)?))
}

fn lenient_name<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(lenient_text(deserializer)?.unwrap_or_default())
}

fn lenient_kind<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: From<String>,
{
    Ok(T::from(lenient_text(deserializer)?.unwrap_or_default()))
}

fn lenient_config<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Config, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Object(map) => Ok(map),
        _ => Ok(Config::new()),
    }
}

// A present non-object trigger still activates: it lowers to a manual trigger.
fn lenient_trigger<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Trigger>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::Object(_) => Trigger::deserialize(value).map(Some).map_err(D::Error::custom),
        other if is_present(&other) => Ok(Some(Trigger::default())),
        _ => Ok(None),
    }
}

// Non-object entries keep their slot so sibling numbering is unchanged.
fn lenient_steps<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Step>, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::Object(_) => Step::deserialize(item).map_err(D::Error::custom),
                _ => Ok(Step::default()),
            })
            .collect(),
        _ => Ok(Vec::new()),
    }
}
