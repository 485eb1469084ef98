//! Boundary validation phase (pre-lowering).
//!
//! Runs where a generated or hand-edited tree is accepted. Structural rules
//! (`V…`) are fatal; step rules (`W…`) flag input the algorithms will absorb
//! through their default dispatch entries.

pub mod node_rules;
pub mod structural;

use serde::{Deserialize, Serialize};

use crate::error::CompilerError;
use crate::lower::{LowerOptions, NameCollision};
use crate::parse::types::Workflow;

/// Size bounds enforced on accepted trees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limits {
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,
}

fn default_max_depth() -> usize {
    16
}

fn default_max_steps() -> usize {
    500
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            max_steps: default_max_steps(),
        }
    }
}

/// Validate the whole workflow (structural rules + step lint).
pub fn validate_workflow(
    workflow: &Workflow,
    limits: &Limits,
    options: &LowerOptions,
) -> Vec<CompilerError> {
    let check_names = options.on_name_collision == NameCollision::Reject;
    let mut errors = structural::validate_structural(workflow, limits, check_names);
    errors.extend(lint(workflow));
    errors
}

/// Step-level rules only. Every result is a warning.
pub fn lint(workflow: &Workflow) -> Vec<CompilerError> {
    node_rules::lint_workflow(workflow)
}

/// True if any error in `errors` is fatal.
pub fn has_fatal(errors: &[CompilerError]) -> bool {
    errors.iter().any(|e| !e.is_warning())
}
