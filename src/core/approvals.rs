use crate::core::tool_calls::ToolInvocation;
use tokio::sync::mpsc;
use tracing::debug;

/// Ephemeral decision forwarded to the owning chat session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApprovalDecision {
    pub tool_call_id: String,
    pub approved: bool,
}

/// Ids currently waiting on a human decision, in invocation order.
///
/// Rebuilt wholesale whenever the invocation set changes; an id is open iff
/// its invocation is in `approval-requested`. There is no incremental
/// mutation, so a rebuild can never leave a half-updated index behind.
#[derive(Debug, Default)]
pub struct PendingApprovals {
    open: Vec<String>,
}

impl PendingApprovals {
    pub fn rebuild(&mut self, invocations: &[ToolInvocation]) {
        self.open.clear();
        for invocation in invocations {
            if invocation.state.needs_approval() {
                self.open.push(invocation.tool_call_id.clone());
            }
        }
    }

    pub fn is_open(&self, tool_call_id: &str) -> bool {
        self.open.iter().any(|id| id == tool_call_id)
    }

    /// Deterministic pick when more than one prompt is open: the first in
    /// iteration order. Known simplification, see DESIGN.md.
    pub fn first_open(&self) -> Option<&str> {
        self.open.first().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.open.is_empty()
    }

    pub fn len(&self) -> usize {
        self.open.len()
    }
}

/// Forwards approval decisions to the owning session over an injected
/// channel.
///
/// The router does not mutate invocation state and does not deduplicate:
/// the upstream stream drives the actual transition, and it must tolerate a
/// stale decision for an id that is no longer pending. A closed receiver
/// (session torn down) makes `resolve` a silent no-op.
#[derive(Debug, Clone)]
pub struct ApprovalRouter {
    tx: mpsc::UnboundedSender<ApprovalDecision>,
}

impl ApprovalRouter {
    pub fn new(tx: mpsc::UnboundedSender<ApprovalDecision>) -> Self {
        Self { tx }
    }

    pub fn resolve(&self, tool_call_id: &str, approved: bool) {
        debug!(tool_call_id = %tool_call_id, approved, "Forwarding tool approval decision");
        let _ = self.tx.send(ApprovalDecision {
            tool_call_id: tool_call_id.to_string(),
            approved,
        });
    }
}
