//! WASM entry points for browser use.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::error::CompilerError;
use crate::lower::{LowerOptions, NameCollision};
use crate::target::TargetGraph;
use crate::validate::Limits;

/// Validate a workflow JSON: parse + structural rules + lint.
/// Returns a JSON array of CompilerError objects.
#[wasm_bindgen]
pub fn validate_workflow(json: &str) -> JsValue {
    to_js(&validate_workflow_inner(json))
}

fn validate_workflow_inner(json: &str) -> Vec<ErrorDto> {
    let workflow = match crate::parse::parse(json) {
        Ok(w) => w,
        Err(errors) => return errors.into_iter().map(ErrorDto::from).collect(),
    };

    crate::validate::validate_workflow(&workflow, &Limits::default(), &LowerOptions::default())
        .into_iter()
        .map(ErrorDto::from)
        .collect()
}

/// Full pipeline: parse → validate → lower.
/// Returns a JSON object with either `graph` (success) or `errors` (failure).
/// `allow_duplicate_names` selects the overwrite collision policy.
#[wasm_bindgen]
pub fn lower_workflow(json: &str, allow_duplicate_names: bool) -> JsValue {
    to_js(&lower_workflow_inner(json, allow_duplicate_names))
}

/// Plain objects for maps and `null` for missing values, so the result
/// survives `JSON.stringify` with the document's exact keys.
fn to_js<T: Serialize>(value: &T) -> JsValue {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .unwrap_or(JsValue::NULL)
}

fn lower_workflow_inner(json: &str, allow_duplicate_names: bool) -> LowerResult {
    let options = LowerOptions {
        on_name_collision: if allow_duplicate_names {
            NameCollision::Overwrite
        } else {
            NameCollision::Reject
        },
    };

    // 1. Parse
    let workflow = match crate::parse::parse(json) {
        Ok(w) => w,
        Err(errors) => {
            return LowerResult::Errors(errors.into_iter().map(ErrorDto::from).collect());
        }
    };

    // 2. Structural validation (lint warnings do not block)
    let errors: Vec<CompilerError> =
        crate::validate::validate_workflow(&workflow, &Limits::default(), &options)
            .into_iter()
            .filter(|e| !e.is_warning())
            .collect();
    if !errors.is_empty() {
        return LowerResult::Errors(errors.into_iter().map(ErrorDto::from).collect());
    }

    // 3. Lower
    match crate::lower::lower(&workflow, &options) {
        Ok(graph) => LowerResult::Success(graph),
        Err(errors) => LowerResult::Errors(errors.into_iter().map(ErrorDto::from).collect()),
    }
}

// ---------------------------------------------------------------------------
// DTOs for serialization to JS
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ErrorDto {
    code: String,
    phase: String,
    message: String,
    step_path: Option<String>,
}

impl From<CompilerError> for ErrorDto {
    fn from(e: CompilerError) -> Self {
        ErrorDto {
            code: e.code,
            phase: e.phase.to_string(),
            message: e.message,
            step_path: e.step_path,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", content = "result")]
enum LowerResult {
    #[serde(rename = "success")]
    Success(TargetGraph),
    #[serde(rename = "errors")]
    Errors(Vec<ErrorDto>),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SUPPORT_HANDLER: &str = include_str!("../tests/fixtures/support_handler.json");

    #[test]
    fn lower_result_carries_the_import_document() {
        let value = serde_json::to_value(lower_workflow_inner(SUPPORT_HANDLER, false)).unwrap();

        assert_eq!(value["status"], "success");
        let graph = &value["result"];
        let keys: Vec<&str> = graph.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["name", "nodes", "connections", "settings", "staticData", "tags"]);
        assert_eq!(graph["staticData"], json!(null));
        assert_eq!(graph["nodes"].as_array().unwrap().len(), 7);
        assert_eq!(
            graph["connections"]["Trigger"],
            json!({ "main": [[{ "node": "Categorize Issue", "type": "main", "index": 0 }]] })
        );
    }

    #[test]
    fn lower_result_reports_errors() {
        let value = serde_json::to_value(lower_workflow_inner("null", false)).unwrap();
        assert_eq!(value["status"], "errors");
        assert_eq!(value["result"][0]["code"], "P003");
        assert_eq!(value["result"][0]["phase"], "Parse");
    }

    #[test]
    fn duplicate_names_follow_the_flag() {
        let json = r#"{"name":"d","steps":[{"type":"email","name":"A"},{"type":"email","name":"A"}]}"#;

        let rejected = serde_json::to_value(lower_workflow_inner(json, false)).unwrap();
        assert_eq!(rejected["status"], "errors");
        assert_eq!(rejected["result"][0]["code"], "V003");

        let allowed = serde_json::to_value(lower_workflow_inner(json, true)).unwrap();
        assert_eq!(allowed["status"], "success");
    }

    #[test]
    fn validation_lists_lint_warnings() {
        let errors = validate_workflow_inner(r#"{"steps":[{"type":"teleport"}]}"#);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, "W001");
        assert_eq!(errors[0].step_path.as_deref(), Some("1"));
    }
}
