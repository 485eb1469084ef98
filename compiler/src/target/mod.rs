//! Target graph: the flat n8n document emitted by lowering.

pub mod types;

pub use types::*;

impl TargetGraph {
    /// Pretty-printed JSON as written by the export action.
    pub fn to_pretty_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
