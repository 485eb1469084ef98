//! Node sequence builder: flatten the step tree into emission order.
//!
//! Depth-first pre-order: each step is emitted before its children, and a
//! container's children are emitted before the container's next sibling.
//! Every level returns its own nodes and the next free y coordinate; the
//! caller concatenates, so no accumulator is shared across calls.

use uuid::Uuid;

use crate::error::child_path;
use crate::parse::types::{Step, StepKind};
use crate::target::types::{Position, TargetNode, TYPE_VERSION};

/// x coordinate shared by every node; the chain is laid out vertically.
pub const COLUMN_X: i64 = 250;
/// y coordinate of the first emitted node.
pub const START_Y: i64 = 250;
/// Vertical distance between consecutive nodes.
pub const ROW_HEIGHT: i64 = 150;

/// A lowered node plus the location of the step it came from.
#[derive(Debug, Clone)]
pub struct EmittedNode {
    pub node: TargetNode,
    /// `None` for the trigger node.
    pub step_path: Option<String>,
}

/// Output of one flattening level.
#[derive(Debug, Clone)]
pub struct Flattened {
    pub nodes: Vec<EmittedNode>,
    pub next_y: i64,
}

pub fn step_node_type(kind: &StepKind) -> &'static str {
    match kind {
        StepKind::SlackMessage => "n8n-nodes-base.slack",
        StepKind::Email => "n8n-nodes-base.emailSend",
        StepKind::HttpRequest => "n8n-nodes-base.httpRequest",
        StepKind::Filter => "n8n-nodes-base.filter",
        StepKind::Delay => "n8n-nodes-base.wait",
        StepKind::SubWorkflow => "n8n-nodes-base.executeWorkflow",
        StepKind::Action | StepKind::Other(_) => "n8n-nodes-base.noOp",
    }
}

/// Flatten `steps` starting at `start_y`. `parent_path` locates the
/// enclosing container (`None` at top level).
pub fn flatten_steps(steps: &[Step], start_y: i64, parent_path: Option<&str>) -> Flattened {
    let mut nodes = Vec::new();
    let mut y = start_y;

    for (index, step) in steps.iter().enumerate() {
        let path = child_path(parent_path, index);

        nodes.push(EmittedNode {
            node: lower_step(step, index, Position(COLUMN_X, y)),
            step_path: Some(path.clone()),
        });
        y += ROW_HEIGHT;

        let children = step.children();
        if !children.is_empty() {
            let nested = flatten_steps(children, y, Some(&path));
            nodes.extend(nested.nodes);
            y = nested.next_y;
        }
    }

    Flattened { nodes, next_y: y }
}

/// Lower a single step, ignoring its children.
pub fn lower_step(step: &Step, sibling_index: usize, position: Position) -> TargetNode {
    if let StepKind::Other(tag) = &step.kind {
        tracing::warn!(
            step_type = %tag,
            step = %step.display_name(sibling_index),
            "unknown step type, lowering as no-op node"
        );
    }

    TargetNode {
        id: Uuid::new_v4(),
        name: step.display_name(sibling_index),
        node_type: step_node_type(&step.kind).into(),
        type_version: TYPE_VERSION,
        position,
        parameters: step.config.clone(),
    }
}
