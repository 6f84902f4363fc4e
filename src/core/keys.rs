use crate::core::approvals::{ApprovalDecision, ApprovalRouter, PendingApprovals};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::debug;

/// Platform-conventional accelerator modifier, resolved once rather than on
/// every keystroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimaryModifier {
    Command,
    Control,
}

impl PrimaryModifier {
    pub fn detect() -> Self {
        if cfg!(any(target_os = "macos", target_os = "ios")) {
            PrimaryModifier::Command
        } else {
            PrimaryModifier::Control
        }
    }

    fn key_modifiers(self) -> KeyModifiers {
        match self {
            PrimaryModifier::Command => KeyModifiers::SUPER,
            PrimaryModifier::Control => KeyModifiers::CONTROL,
        }
    }

    /// Label used when rendering the shortcut next to the prompt buttons.
    pub fn display(self) -> &'static str {
        match self {
            PrimaryModifier::Command => "⌘",
            PrimaryModifier::Control => "Ctrl",
        }
    }
}

/// Where keyboard focus currently sits; accelerators must never hijack
/// normal typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusTarget {
    TextEntry,
    Other,
}

/// Routes the confirm/cancel accelerators to the currently-open approval
/// prompt.
///
/// The embedding event loop owns one instance for as long as the approval
/// list is mounted and feeds every key event through it; dropping the
/// dispatcher releases the decision channel, so no stale callback survives
/// teardown.
#[derive(Debug)]
pub struct ApprovalShortcuts {
    modifier: PrimaryModifier,
    router: ApprovalRouter,
}

impl ApprovalShortcuts {
    pub fn new(router: ApprovalRouter) -> Self {
        Self {
            modifier: PrimaryModifier::detect(),
            router,
        }
    }

    pub fn with_modifier(router: ApprovalRouter, modifier: PrimaryModifier) -> Self {
        Self { modifier, router }
    }

    pub fn modifier(&self) -> PrimaryModifier {
        self.modifier
    }

    /// Maps a key event to a decision against the first open prompt.
    ///
    /// Pure with respect to the router: callers that only want to know what
    /// a key would do can use this directly.
    pub fn decision_for_key(
        &self,
        key: &KeyEvent,
        focus: FocusTarget,
        pending: &PendingApprovals,
    ) -> Option<ApprovalDecision> {
        if focus == FocusTarget::TextEntry {
            return None;
        }
        if !key.modifiers.contains(self.modifier.key_modifiers()) {
            return None;
        }
        let tool_call_id = pending.first_open()?;

        let approved = match key.code {
            KeyCode::Enter => true,
            KeyCode::Backspace => false,
            _ => return None,
        };

        Some(ApprovalDecision {
            tool_call_id: tool_call_id.to_string(),
            approved,
        })
    }

    /// Resolves the accelerator through the router. Returns whether the key
    /// was consumed so the event loop can stop propagation.
    pub fn handle_key(
        &self,
        key: &KeyEvent,
        focus: FocusTarget,
        pending: &PendingApprovals,
    ) -> bool {
        match self.decision_for_key(key, focus, pending) {
            Some(decision) => {
                debug!(
                    tool_call_id = %decision.tool_call_id,
                    approved = decision.approved,
                    "Approval accelerator fired"
                );
                self.router.resolve(&decision.tool_call_id, decision.approved);
                true
            }
            None => false,
        }
    }
}
