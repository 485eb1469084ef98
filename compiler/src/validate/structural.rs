//! Tree-level structural validation rules (V001–V003).

use std::collections::HashMap;

use crate::error::{CompilerError, child_path};
use crate::lower::trigger::TRIGGER_NODE_NAME;
use crate::parse::types::{Step, Workflow};

use super::Limits;

/// Run all structural validation rules. Returns all errors found.
pub fn validate_structural(
    workflow: &Workflow,
    limits: &Limits,
    check_names: bool,
) -> Vec<CompilerError> {
    let mut errors = Vec::new();

    v001_depth_within_limit(&workflow.steps, limits.max_depth, &mut errors);
    v002_step_count_within_limit(workflow, limits.max_steps, &mut errors);
    if check_names {
        v003_unique_display_names(workflow, &mut errors);
    }

    errors
}

fn v001_depth_within_limit(steps: &[Step], max_depth: usize, errors: &mut Vec<CompilerError>) {
    fn walk(
        steps: &[Step],
        depth: usize,
        parent: Option<&str>,
        max_depth: usize,
        errors: &mut Vec<CompilerError>,
    ) {
        for (i, step) in steps.iter().enumerate() {
            let path = child_path(parent, i);
            if depth > max_depth {
                errors.push(CompilerError::validate(
                    "V001",
                    format!(
                        "Step nesting depth {} exceeds the limit of {}",
                        depth, max_depth
                    ),
                    Some(path),
                ));
                // One report per offending branch.
                continue;
            }
            walk(step.children(), depth + 1, Some(&path), max_depth, errors);
        }
    }

    walk(steps, 1, None, max_depth, errors);
}

fn v002_step_count_within_limit(
    workflow: &Workflow,
    max_steps: usize,
    errors: &mut Vec<CompilerError>,
) {
    let count = workflow.step_count();
    if count > max_steps {
        errors.push(CompilerError::validate(
            "V002",
            format!("Workflow has {} steps, limit is {}", count, max_steps),
            None,
        ));
    }
}

fn v003_unique_display_names(workflow: &Workflow, errors: &mut Vec<CompilerError>) {
    let mut seen: HashMap<String, Option<String>> = HashMap::new();
    if workflow.trigger.is_some() {
        seen.insert(TRIGGER_NODE_NAME.to_string(), None);
    }

    fn walk(
        steps: &[Step],
        parent: Option<&str>,
        seen: &mut HashMap<String, Option<String>>,
        errors: &mut Vec<CompilerError>,
    ) {
        for (i, step) in steps.iter().enumerate() {
            let path = child_path(parent, i);
            let name = step.display_name(i);
            match seen.get(&name) {
                Some(first) => errors.push(CompilerError::validate(
                    "V003",
                    format!(
                        "Duplicate node name '{}' (first used {})",
                        name,
                        match first {
                            Some(p) => format!("at step {}", p),
                            None => "by the trigger".to_string(),
                        }
                    ),
                    Some(path.clone()),
                )),
                None => {
                    seen.insert(name, Some(path.clone()));
                }
            }
            walk(step.children(), Some(&path), seen, errors);
        }
    }

    walk(&workflow.steps, None, &mut seen, errors);
}
