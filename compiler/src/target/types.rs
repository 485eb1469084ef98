//! n8n import document produced by the lowering pass.
//!
//! Field names and nesting are a compatibility contract with the n8n import
//! function and must match exactly:
//! `{ name, nodes, connections, settings, staticData, tags }`.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Version stamped on every emitted node.
pub const TYPE_VERSION: u32 = 1;

/// The only output channel used by the linear chain.
pub const MAIN_CHANNEL: &str = "main";

// =============================================================================
// TOP-LEVEL DOCUMENT
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetGraph {
    pub name: String,
    pub nodes: Vec<TargetNode>,
    pub connections: Connections,
    pub settings: Map<String, Value>,
    pub static_data: Option<Value>,
    pub tags: Vec<String>,
}

impl TargetGraph {
    pub fn node(&self, name: &str) -> Option<&TargetNode> {
        self.nodes.iter().find(|n| n.name == name)
    }

    /// Display names in emission order.
    pub fn node_names(&self) -> Vec<&str> {
        self.nodes.iter().map(|n| n.name.as_str()).collect()
    }
}

// =============================================================================
// NODES
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetNode {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: String,
    pub type_version: u32,
    pub position: Position,
    pub parameters: Map<String, Value>,
}

/// Canvas coordinates, serialized as `[x, y]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position(pub i64, pub i64);

impl Position {
    pub fn x(&self) -> i64 {
        self.0
    }

    pub fn y(&self) -> i64 {
        self.1
    }
}

// =============================================================================
// CONNECTIONS: `{ "Source": { "main": [[{ node, type, index }]] } }`
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionTarget {
    pub node: String,
    #[serde(rename = "type")]
    pub channel: String,
    pub index: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NodeOutputs {
    pub main: Vec<Vec<ConnectionTarget>>,
}

impl NodeOutputs {
    pub fn single(target: &str) -> Self {
        NodeOutputs {
            main: vec![vec![ConnectionTarget {
                node: target.to_string(),
                channel: MAIN_CHANNEL.to_string(),
                index: 0,
            }]],
        }
    }

    /// First target on the first main output, if any.
    pub fn first_target(&self) -> Option<&str> {
        self.main.first()?.first().map(|t| t.node.as_str())
    }
}

/// Source-name keyed connection map. Keys keep their first insertion
/// position; re-inserting a key replaces its value in place.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Connections {
    entries: Vec<(String, NodeOutputs)>,
}

impl Connections {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace. Returns the previous outputs for `source`, if any.
    pub fn insert(&mut self, source: String, outputs: NodeOutputs) -> Option<NodeOutputs> {
        match self.entries.iter_mut().find(|(k, _)| *k == source) {
            Some((_, existing)) => Some(std::mem::replace(existing, outputs)),
            None => {
                self.entries.push((source, outputs));
                None
            }
        }
    }

    pub fn get(&self, source: &str) -> Option<&NodeOutputs> {
        self.entries
            .iter()
            .find(|(k, _)| k == source)
            .map(|(_, v)| v)
    }

    pub fn contains_key(&self, source: &str) -> bool {
        self.get(source).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &NodeOutputs)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

impl Serialize for Connections {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (source, outputs) in &self.entries {
            map.serialize_entry(source, outputs)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Connections {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ConnectionsVisitor;

        impl<'de> Visitor<'de> for ConnectionsVisitor {
            type Value = Connections;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of source node names to outputs")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Connections, A::Error> {
                let mut connections = Connections::new();
                while let Some((source, outputs)) = access.next_entry::<String, NodeOutputs>()? {
                    connections.insert(source, outputs);
                }
                Ok(connections)
            }
        }

        deserializer.deserialize_map(ConnectionsVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reinsert_keeps_key_position() {
        let mut c = Connections::new();
        c.insert("A".into(), NodeOutputs::single("B"));
        c.insert("B".into(), NodeOutputs::single("C"));
        let previous = c.insert("A".into(), NodeOutputs::single("D"));

        assert_eq!(previous.and_then(|o| o.first_target().map(String::from)), Some("B".into()));
        assert_eq!(c.keys().collect::<Vec<_>>(), vec!["A", "B"]);
        assert_eq!(c.get("A").and_then(|o| o.first_target()), Some("D"));
    }

    #[test]
    fn position_serializes_as_pair() {
        assert_eq!(serde_json::to_string(&Position(250, 400)).unwrap(), "[250,400]");
    }
}
