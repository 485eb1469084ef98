//! Parse phase: JSON → Rust types.
//!
//! Accepts either clean workflow JSON or the raw text returned by the
//! generation service, which may wrap the object in prose or code fences.

pub mod types;

pub use types::*;

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use crate::error::CompilerError;

static OBJECT_SPAN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\{.*\}").expect("object span pattern is valid")
});

/// Deserialize a workflow JSON string into a `Workflow` struct.
pub fn parse(json: &str) -> Result<Workflow, Vec<CompilerError>> {
    let value = serde_json::from_str::<Value>(json).map_err(|e| {
        vec![CompilerError::parse(
            "P001",
            format!("Failed to parse workflow JSON: {}", e),
        )]
    })?;
    parse_value(&value)
}

/// Structural check + conversion of an untyped JSON value.
///
/// `null` and non-objects are rejected with `P003` before any field is read.
/// Every object is accepted; fields of the wrong type degrade to defaults.
pub fn parse_value(value: &Value) -> Result<Workflow, Vec<CompilerError>> {
    if !value.is_object() {
        return Err(vec![CompilerError::invalid_workflow(json_kind(value))]);
    }
    Workflow::deserialize(value).map_err(|e| {
        vec![CompilerError::parse(
            "P004",
            format!("Workflow object has an unexpected shape: {}", e),
        )]
    })
}

/// Recover a workflow from raw generation text.
///
/// Takes the greedy span from the first `{` to the last `}`.
pub fn extract_workflow(text: &str) -> Result<Workflow, Vec<CompilerError>> {
    let Some(span) = OBJECT_SPAN.find(text) else {
        return Err(vec![CompilerError::parse(
            "P002",
            "No JSON object found in generated text",
        )]);
    };

    let value = serde_json::from_str::<Value>(span.as_str()).map_err(|e| {
        vec![CompilerError::parse(
            "P002",
            format!("Generated text contains malformed JSON: {}", e),
        )]
    })?;
    parse_value(&value)
}

/// Like [`extract_workflow`], but substitutes [`Workflow::fallback`] built
/// from `prompt` when nothing usable can be recovered.
pub fn parse_generated(text: &str, prompt: &str) -> Workflow {
    match extract_workflow(text) {
        Ok(workflow) => workflow,
        Err(errors) => {
            for e in &errors {
                tracing::warn!(code = %e.code, "falling back to default workflow: {}", e.message);
            }
            Workflow::fallback(prompt)
        }
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
