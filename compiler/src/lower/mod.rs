//! Lowering phase: Workflow → TargetGraph.
//!
//! Flattens the nested step tree into the linear node/edge document accepted
//! by the n8n import function. Pure apart from freshly minted node ids.

pub mod builder;
pub mod chain;
pub mod trigger;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CompilerError;
use crate::parse::types::Workflow;
use crate::target::types::{Position, TargetGraph};

use builder::{COLUMN_X, EmittedNode, ROW_HEIGHT, START_Y};

/// What to do when two emitted nodes share a display name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameCollision {
    /// Fail with `L001`.
    #[default]
    Reject,
    /// Keep the last connection registered for the name.
    Overwrite,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LowerOptions {
    #[serde(default)]
    pub on_name_collision: NameCollision,
}

impl LowerOptions {
    pub fn overwrite_duplicates() -> Self {
        LowerOptions {
            on_name_collision: NameCollision::Overwrite,
        }
    }
}

/// Lower a parsed workflow into an n8n document.
pub fn lower(workflow: &Workflow, options: &LowerOptions) -> Result<TargetGraph, Vec<CompilerError>> {
    // 1. Trigger node
    let mut emitted = Vec::with_capacity(workflow.step_count() + 1);
    let mut y = START_Y;
    if let Some(trigger) = &workflow.trigger {
        emitted.push(EmittedNode {
            node: trigger::lower_trigger(trigger, Position(COLUMN_X, y)),
            step_path: None,
        });
        y += ROW_HEIGHT;
    }

    // 2. Steps in depth-first pre-order
    let flattened = builder::flatten_steps(&workflow.steps, y, None);
    emitted.extend(flattened.nodes);

    // 3. Linear chain, projected to name keys
    let graph = chain::build_chain(emitted.len());
    let connections = chain::project_connections(&graph, &emitted, options.on_name_collision)?;

    tracing::debug!(
        workflow = %workflow.display_name(),
        nodes = emitted.len(),
        connections = connections.len(),
        "lowered workflow"
    );

    // 4. Assemble document
    Ok(TargetGraph {
        name: workflow.display_name().to_string(),
        nodes: emitted.into_iter().map(|e| e.node).collect(),
        connections,
        settings: Map::new(),
        static_data: None,
        tags: Vec::new(),
    })
}

/// Lower an untyped JSON value. Null and non-objects fail with `P003`.
pub fn lower_value(value: &Value, options: &LowerOptions) -> Result<TargetGraph, Vec<CompilerError>> {
    let workflow = crate::parse::parse_value(value)?;
    lower(&workflow, options)
}

/// Parse workflow JSON text and lower it in one step.
pub fn lower_json(json: &str, options: &LowerOptions) -> Result<TargetGraph, Vec<CompilerError>> {
    let workflow = crate::parse::parse(json)?;
    lower(&workflow, options)
}
