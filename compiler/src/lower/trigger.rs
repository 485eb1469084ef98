//! Map the workflow trigger → the first n8n node.

use uuid::Uuid;

use crate::parse::types::{Trigger, TriggerKind};
use crate::target::types::{Position, TargetNode, TYPE_VERSION};

pub const TRIGGER_NODE_NAME: &str = "Trigger";

pub fn trigger_node_type(kind: &TriggerKind) -> &'static str {
    match kind {
        TriggerKind::Webhook => "n8n-nodes-base.webhook",
        TriggerKind::Schedule => "n8n-nodes-base.scheduleTrigger",
        TriggerKind::Manual => "n8n-nodes-base.manualTrigger",
        TriggerKind::Other(_) => "n8n-nodes-base.manualTrigger",
    }
}

pub fn lower_trigger(trigger: &Trigger, position: Position) -> TargetNode {
    if let TriggerKind::Other(tag) = &trigger.kind {
        tracing::warn!(trigger_type = %tag, "unknown trigger type, lowering as manual trigger");
    }

    TargetNode {
        id: Uuid::new_v4(),
        name: TRIGGER_NODE_NAME.into(),
        node_type: trigger_node_type(&trigger.kind).into(),
        type_version: TYPE_VERSION,
        position,
        parameters: trigger.config.clone(),
    }
}
