//! Builds the outbound interrupt for a node from its recorded suspension mode.
//!
//! Every mode is matched explicitly. A new [`SuspensionMode`] variant fails to
//! compile here until someone decides whether it copies a section or is rejected.

use tracing::debug;

use super::envelope::{AsyncSection, InterruptEnvelope, TaskChainSection, TaskSection};
use super::suspension::{SuspensionMode, SuspensionResponse};
use crate::error::DispatchError;

/// Complete `partial` with the section matching the node's suspension mode.
///
/// Nodes that delegated execution to children cannot be interrupted directly;
/// the caller has to target the descendants instead. `partial` is never modified.
pub fn build_interrupt(
    partial: &InterruptEnvelope,
    response: &SuspensionResponse,
) -> Result<InterruptEnvelope, DispatchError> {
    let Some(mode) = response.mode.as_ref() else {
        return Ok(partial.clone());
    };

    let mut envelope = partial.clone();
    match mode {
        SuspensionMode::Sync => {}
        SuspensionMode::Async { callback_ids } => {
            envelope.async_section = Some(AsyncSection {
                callback_ids: callback_ids.clone(),
            });
        }
        SuspensionMode::Task { task_id } => {
            envelope.task_section = Some(TaskSection {
                task_id: task_id.clone(),
            });
        }
        SuspensionMode::TaskChain { task_id, .. } => {
            envelope.task_chain_section = Some(TaskChainSection {
                task_id: task_id.clone(),
            });
        }
        SuspensionMode::Child { .. }
        | SuspensionMode::Children { .. }
        | SuspensionMode::ChildChain { .. } => {
            return Err(DispatchError::InvalidSuspensionMode { mode: mode.kind() });
        }
    }

    debug!(
        interrupt_uuid = %envelope.interrupt_uuid,
        interrupt_type = %envelope.interrupt_type,
        mode = %mode.kind(),
        "Interrupt built"
    );

    Ok(envelope)
}
