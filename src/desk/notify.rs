//! Outbound notifications to supervisors and callers.

use super::types::HelpRequest;

/// Receives lifecycle notifications after state is committed.
pub trait Notifier: Send + Sync {
    /// A question could not be answered automatically.
    fn supervisor_needed(&self, request: &HelpRequest);

    /// A supervisor answered a caller's question.
    fn caller_answered(&self, request: &HelpRequest);
}

/// Notifier that only emits log events.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn supervisor_needed(&self, request: &HelpRequest) {
        tracing::info!(
            request_id = %request.id,
            question = %request.question,
            "Notify supervisor: help needed"
        );
    }

    fn caller_answered(&self, request: &HelpRequest) {
        tracing::info!(
            request_id = %request.id,
            caller_id = %request.caller_id,
            answer = request.answer.as_deref().unwrap_or_default(),
            "Text caller: answer ready"
        );
    }
}
