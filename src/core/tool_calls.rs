use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Discrete lifecycle tag carried by each tool invocation record.
///
/// The upstream chat stream drives every transition except the approval
/// decision; this crate observes the tags and classifies them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToolCallState {
    InputStreaming,
    InputAvailable,
    ApprovalRequested,
    ApprovalResponded,
    OutputAvailable,
    OutputError,
    OutputDenied,
}

impl ToolCallState {
    /// States rendered as in-flight tool calls.
    pub fn is_call(self) -> bool {
        matches!(
            self,
            ToolCallState::InputStreaming
                | ToolCallState::InputAvailable
                | ToolCallState::ApprovalRequested
                | ToolCallState::ApprovalResponded
        )
    }

    /// States rendered as finished tool results.
    pub fn is_result(self) -> bool {
        matches!(
            self,
            ToolCallState::OutputAvailable
                | ToolCallState::OutputError
                | ToolCallState::OutputDenied
        )
    }

    /// Terminal states never transition again.
    pub fn is_terminal(self) -> bool {
        self.is_result()
    }

    /// The single state that waits on a human decision.
    pub fn needs_approval(self) -> bool {
        matches!(self, ToolCallState::ApprovalRequested)
    }
}

/// One tool call across its lifetime within a chat turn.
///
/// `tool_call_id` is opaque and stable across updates; the stream replaces
/// the whole record on every transition rather than patching fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInvocation {
    pub tool_call_id: String,
    pub tool_name: String,
    pub state: ToolCallState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_text: Option<String>,
}

impl ToolInvocation {
    pub fn new(tool_call_id: impl Into<String>, tool_name: impl Into<String>, state: ToolCallState) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            tool_name: tool_name.into(),
            state,
            input: None,
            output: None,
            error_text: None,
        }
    }
}

/// Splits an invocation set into in-flight calls and finished results.
///
/// Pure filter: the partitions are disjoint and their union is the input,
/// in input order. An empty input yields two empty partitions.
pub fn partition_invocations(
    invocations: &[ToolInvocation],
) -> (Vec<&ToolInvocation>, Vec<&ToolInvocation>) {
    let calls = invocations.iter().filter(|inv| inv.state.is_call()).collect();
    let results = invocations
        .iter()
        .filter(|inv| inv.state.is_result())
        .collect();
    (calls, results)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invocation(id: &str, state: ToolCallState) -> ToolInvocation {
        ToolInvocation::new(id, "lookup", state)
    }

    const ALL_STATES: [ToolCallState; 7] = [
        ToolCallState::InputStreaming,
        ToolCallState::InputAvailable,
        ToolCallState::ApprovalRequested,
        ToolCallState::ApprovalResponded,
        ToolCallState::OutputAvailable,
        ToolCallState::OutputError,
        ToolCallState::OutputDenied,
    ];

    #[test]
    fn classification_is_total_and_exclusive() {
        for state in ALL_STATES {
            assert!(state.is_call() ^ state.is_result(), "state {state:?}");
        }
    }

    #[test]
    fn exactly_the_result_states_are_terminal() {
        for state in ALL_STATES {
            assert_eq!(state.is_terminal(), state.is_result(), "state {state:?}");
        }
    }

    #[test]
    fn partition_covers_input_without_overlap() {
        let invocations: Vec<ToolInvocation> = ALL_STATES
            .iter()
            .enumerate()
            .map(|(idx, state)| invocation(&format!("call-{idx}"), *state))
            .collect();

        let (calls, results) = partition_invocations(&invocations);
        assert_eq!(calls.len() + results.len(), invocations.len());

        for call in &calls {
            assert!(!results
                .iter()
                .any(|result| result.tool_call_id == call.tool_call_id));
        }
    }

    #[test]
    fn approval_requested_stays_in_call_partition() {
        let invocations = vec![
            invocation("call-1", ToolCallState::ApprovalRequested),
            invocation("call-2", ToolCallState::OutputAvailable),
        ];

        let (calls, results) = partition_invocations(&invocations);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].tool_call_id, "call-1");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].tool_call_id, "call-2");
    }

    #[test]
    fn empty_input_yields_empty_partitions() {
        let (calls, results) = partition_invocations(&[]);
        assert!(calls.is_empty());
        assert!(results.is_empty());
    }

    #[test]
    fn states_round_trip_through_kebab_case() {
        let value = serde_json::to_value(ToolCallState::ApprovalRequested).unwrap();
        assert_eq!(value, serde_json::json!("approval-requested"));

        let parsed: ToolCallState = serde_json::from_value(serde_json::json!("output-denied")).unwrap();
        assert_eq!(parsed, ToolCallState::OutputDenied);
    }
}
