//! Per-step lint rules (W001–W003).
//!
//! Unknown tags are not fatal: the compiler lowers them to a no-op node and
//! the interpreter runs its generic line pair. They usually point at a
//! generation defect, so they are reported here.

use crate::error::{CompilerError, child_path};
use crate::parse::types::{Step, StepKind, TriggerKind, Workflow};

pub fn lint_workflow(workflow: &Workflow) -> Vec<CompilerError> {
    let mut warnings = Vec::new();

    if let Some(trigger) = &workflow.trigger {
        if let TriggerKind::Other(tag) = &trigger.kind {
            let message = if tag.is_empty() {
                "Trigger has no type, treated as manual".to_string()
            } else {
                format!("Unknown trigger type '{}', treated as manual", tag)
            };
            warnings.push(CompilerError::validate("W002", message, None));
        }
    }

    lint_steps(&workflow.steps, None, &mut warnings);
    warnings
}

fn lint_steps(steps: &[Step], parent: Option<&str>, warnings: &mut Vec<CompilerError>) {
    for (i, step) in steps.iter().enumerate() {
        let path = child_path(parent, i);

        if let StepKind::Other(tag) = &step.kind {
            let message = if tag.is_empty() {
                format!("Step '{}' has no type, treated as a no-op", step.display_name(i))
            } else {
                format!(
                    "Unknown step type '{}' on '{}', treated as a no-op",
                    tag,
                    step.display_name(i)
                )
            };
            warnings.push(CompilerError::validate("W001", message, Some(path.clone())));
        }

        if !step.is_container() && !step.steps.is_empty() {
            warnings.push(CompilerError::validate(
                "W003",
                format!(
                    "Step '{}' of type '{}' has {} nested steps; only sub_workflow steps are traversed",
                    step.display_name(i),
                    step.kind,
                    step.steps.len()
                ),
                Some(path.clone()),
            ));
        }

        lint_steps(step.children(), Some(&path), warnings);
    }
}
