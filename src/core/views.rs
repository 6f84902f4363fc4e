//! Assembles the per-turn tool data a chat surface renders: pending calls
//! joined with their annotations, and finished results with the payload
//! each terminal state contributes.

use crate::core::annotations::AnnotationIndex;
use crate::core::tool_calls::{partition_invocations, ToolCallState, ToolInvocation};
use serde_json::Value;

/// Placeholder payload shown for a denied tool execution.
pub const TOOL_EXECUTION_DENIED: &str = "Tool execution was denied";

#[derive(Debug, Clone)]
pub struct ToolCallView {
    pub tool_call_id: String,
    pub tool_name: String,
    pub needs_approval: bool,
    pub server_name: String,
    pub tool_description: String,
}

#[derive(Debug, Clone)]
pub struct ToolResultView {
    pub tool_call_id: String,
    pub tool_name: String,
    pub is_error: bool,
    pub server_name: String,
    pub tool_description: String,
    pub input: Option<Value>,
    pub result: Value,
}

/// Everything one chat turn shows about its tool invocations.
#[derive(Debug, Default)]
pub struct ToolTurnView {
    pub calls: Vec<ToolCallView>,
    pub results: Vec<ToolResultView>,
}

impl ToolTurnView {
    pub fn build(invocations: &[ToolInvocation], annotations: &AnnotationIndex) -> Self {
        let (calls, results) = partition_invocations(invocations);

        let calls = calls
            .into_iter()
            .map(|invocation| ToolCallView {
                tool_call_id: invocation.tool_call_id.clone(),
                tool_name: invocation.tool_name.clone(),
                needs_approval: invocation.state.needs_approval(),
                server_name: annotations.server_name(&invocation.tool_call_id).to_string(),
                tool_description: annotations
                    .tool_description(&invocation.tool_call_id)
                    .to_string(),
            })
            .collect();

        let results = results
            .into_iter()
            .map(|invocation| ToolResultView {
                tool_call_id: invocation.tool_call_id.clone(),
                tool_name: invocation.tool_name.clone(),
                is_error: matches!(
                    invocation.state,
                    ToolCallState::OutputError | ToolCallState::OutputDenied
                ),
                server_name: annotations.server_name(&invocation.tool_call_id).to_string(),
                tool_description: annotations
                    .tool_description(&invocation.tool_call_id)
                    .to_string(),
                input: invocation.input.clone(),
                result: result_payload(invocation),
            })
            .collect();

        Self { calls, results }
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty() && self.results.is_empty()
    }
}

fn result_payload(invocation: &ToolInvocation) -> Value {
    match invocation.state {
        ToolCallState::OutputAvailable => invocation.output.clone().unwrap_or(Value::Null),
        ToolCallState::OutputError => invocation
            .error_text
            .clone()
            .map(Value::String)
            .unwrap_or(Value::Null),
        ToolCallState::OutputDenied => Value::String(TOOL_EXECUTION_DENIED.to_string()),
        // Non-terminal states never reach the result list.
        _ => Value::Null,
    }
}
