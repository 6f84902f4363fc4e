use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Descriptive metadata delivered out-of-band from the invocation stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallAnnotation {
    pub tool_call_id: String,
    pub server_name: String,
    pub tool_description: String,
}

/// Best-effort join from a tool call id to its annotation.
///
/// Annotations arrive on a side channel with no referential integrity;
/// lookups may come back empty and the caller renders blanks. When the same
/// id appears twice the first annotation wins.
#[derive(Debug, Default)]
pub struct AnnotationIndex {
    by_id: HashMap<String, ToolCallAnnotation>,
}

impl AnnotationIndex {
    pub fn from_annotations(annotations: &[ToolCallAnnotation]) -> Self {
        let mut by_id = HashMap::new();
        for annotation in annotations {
            by_id
                .entry(annotation.tool_call_id.clone())
                .or_insert_with(|| annotation.clone());
        }
        Self { by_id }
    }

    pub fn get(&self, tool_call_id: &str) -> Option<&ToolCallAnnotation> {
        self.by_id.get(tool_call_id)
    }

    pub fn server_name(&self, tool_call_id: &str) -> &str {
        self.get(tool_call_id)
            .map(|annotation| annotation.server_name.as_str())
            .unwrap_or("")
    }

    pub fn tool_description(&self, tool_call_id: &str) -> &str {
        self.get(tool_call_id)
            .map(|annotation| annotation.tool_description.as_str())
            .unwrap_or("")
    }
}
