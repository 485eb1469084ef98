//! Linear connection chain over the emission order.
//!
//! Edges are built between node indices first; the name-keyed n8n map is a
//! projection taken only when the document is assembled.

use std::collections::HashMap;

use petgraph::graph::{DiGraph, NodeIndex};

use crate::error::CompilerError;
use crate::target::types::{Connections, MAIN_CHANNEL, NodeOutputs};

use super::NameCollision;
use super::builder::EmittedNode;

/// Node weight is the position in emission order.
pub type ChainGraph = DiGraph<usize, &'static str>;

/// Connect node i → node i+1 for every consecutive pair.
pub fn build_chain(node_count: usize) -> ChainGraph {
    let mut graph = ChainGraph::with_capacity(node_count, node_count.saturating_sub(1));
    let indices: Vec<NodeIndex> = (0..node_count).map(|i| graph.add_node(i)).collect();

    for pair in indices.windows(2) {
        graph.add_edge(pair[0], pair[1], MAIN_CHANNEL);
    }

    graph
}

/// Project the identity-keyed chain onto source display names.
pub fn project_connections(
    graph: &ChainGraph,
    nodes: &[EmittedNode],
    policy: NameCollision,
) -> Result<Connections, Vec<CompilerError>> {
    if policy == NameCollision::Reject {
        let errors = name_collisions(nodes);
        if !errors.is_empty() {
            return Err(errors);
        }
    }

    let mut connections = Connections::new();
    for edge in graph.edge_indices() {
        let Some((source, target)) = graph.edge_endpoints(edge) else {
            continue;
        };
        let source_name = &nodes[graph[source]].node.name;
        let target_name = &nodes[graph[target]].node.name;

        if let Some(dropped) =
            connections.insert(source_name.clone(), NodeOutputs::single(target_name))
        {
            tracing::warn!(
                source = %source_name,
                dropped_target = dropped.first_target().unwrap_or_default(),
                "duplicate node name, earlier connection overwritten"
            );
        }
    }

    Ok(connections)
}

fn name_collisions(nodes: &[EmittedNode]) -> Vec<CompilerError> {
    let mut first_seen: HashMap<&str, Option<&str>> = HashMap::new();
    let mut errors = Vec::new();

    for emitted in nodes {
        let name = emitted.node.name.as_str();
        if let Some(&first) = first_seen.get(name) {
            let first_location = match first {
                Some(path) => format!("step {}", path),
                None => "the trigger".to_string(),
            };
            errors.push(CompilerError::lower(
                "L001",
                format!(
                    "Node name '{}' is used more than once (first at {}); connections are keyed by name",
                    name, first_location,
                ),
                emitted.step_path.clone(),
            ));
        } else {
            first_seen.insert(name, emitted.step_path.as_deref());
        }
    }

    errors
}
