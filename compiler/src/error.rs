//! Unified compiler error type used across all phases.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Parse,
    Validate,
    Lower,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Parse => write!(f, "Parse"),
            Phase::Validate => write!(f, "Validate"),
            Phase::Lower => write!(f, "Lower"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompilerError {
    pub code: String,
    pub phase: Phase,
    pub message: String,
    /// Dotted 1-based sibling indices of the offending step (e.g. `2.1`).
    pub step_path: Option<String>,
}

impl std::fmt::Display for CompilerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.step_path {
            Some(path) => write!(
                f,
                "[{}:{}] {} (step {})",
                self.phase, self.code, self.message, path
            ),
            None => write!(f, "[{}:{}] {}", self.phase, self.code, self.message),
        }
    }
}

impl std::error::Error for CompilerError {}

impl CompilerError {
    pub fn parse(code: &str, message: impl Into<String>) -> Self {
        CompilerError {
            code: code.into(),
            phase: Phase::Parse,
            message: message.into(),
            step_path: None,
        }
    }

    pub fn validate(code: &str, message: impl Into<String>, step_path: Option<String>) -> Self {
        CompilerError {
            code: code.into(),
            phase: Phase::Validate,
            message: message.into(),
            step_path,
        }
    }

    pub fn lower(code: &str, message: impl Into<String>, step_path: Option<String>) -> Self {
        CompilerError {
            code: code.into(),
            phase: Phase::Lower,
            message: message.into(),
            step_path,
        }
    }

    /// The input is null or not a JSON object. Fatal to the call.
    pub fn invalid_workflow(found: &str) -> Self {
        CompilerError::parse(
            "P003",
            format!("Invalid workflow: workflow must be an object, found {}", found),
        )
    }

    pub fn is_invalid_workflow(&self) -> bool {
        self.code == "P003"
    }

    /// Lint codes (`W…`) are informational; everything else is fatal.
    pub fn is_warning(&self) -> bool {
        self.code.starts_with('W')
    }
}

/// Append a 1-based sibling index to a parent step path.
pub fn child_path(parent: Option<&str>, sibling_index: usize) -> String {
    match parent {
        Some(p) => format!("{}.{}", p, sibling_index + 1),
        None => (sibling_index + 1).to_string(),
    }
}
