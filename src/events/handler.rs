//! Handles inbound node events inside a diagnostic scope.

use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, warn};

use super::store::NodeStatusStore;
use super::types::{
    FacilitatorRequestEvent, HandlerOutcome, InterruptRequestEvent, NodeEvent, SdkResponseEvent,
    StatusUpdateEvent,
};
use crate::config::ContextConfig;
use crate::context::{fully_qualified_name_with, strategy_postfix};
use crate::diagnostics::{
    interrupt_event_fields, node_event_fields, sdk_response_fields, with_log_scope_async,
    LogFields,
};
use crate::error::{ContextError, EngineError, EngineResult};
use crate::interrupt::build_interrupt;
use crate::logging::{log_context_operation, log_error, log_interrupt_dispatch, log_status_rollup};
use crate::status::{calculate_status, is_transition_allowed, node_allowed_start_set, Status};

/// Routes node events against a [`NodeStatusStore`].
///
/// ```rust
/// use std::sync::Arc;
/// use tasker_context::events::{HandlerOutcome, InMemoryNodeStatusStore, NodeEvent, NodeEventHandler};
/// use tasker_context::events::InterruptRequestEvent;
/// use tasker_context::interrupt::{InterruptEnvelope, InterruptType};
///
/// # tokio_test::block_on(async {
/// let handler = NodeEventHandler::new(Arc::new(InMemoryNodeStatusStore::new()));
/// let outcome = handler
///     .handle(NodeEvent::InterruptRequest(InterruptRequestEvent {
///         run_id: "run-1".to_string(),
///         envelope: InterruptEnvelope::new(InterruptType::Abort, "node-1", "notify-1"),
///     }))
///     .await
///     .unwrap();
/// assert!(matches!(outcome, HandlerOutcome::Interrupt(_)));
/// # });
/// ```
pub struct NodeEventHandler<S: NodeStatusStore> {
    store: Arc<S>,
    config: ContextConfig,
}

impl<S: NodeStatusStore> NodeEventHandler<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self::with_config(store, ContextConfig::default())
    }

    pub fn with_config(store: Arc<S>, config: ContextConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Handle one event with its correlation fields bound for the whole call
    pub async fn handle(&self, event: NodeEvent) -> EngineResult<HandlerOutcome> {
        let fields = event_fields(&event);
        let name = event.name();

        let result = with_log_scope_async(fields, self.dispatch(event)).await;
        if let Err(err) = &result {
            log_error("NodeEventHandler", name, &err.to_string(), None);
        }
        result
    }

    /// Handle independent events concurrently; results keep the input order
    pub async fn handle_batch(&self, events: Vec<NodeEvent>) -> Vec<EngineResult<HandlerOutcome>> {
        join_all(events.into_iter().map(|event| self.handle(event))).await
    }

    async fn dispatch(&self, event: NodeEvent) -> EngineResult<HandlerOutcome> {
        match event {
            NodeEvent::StatusUpdate(e) => self.handle_status_update(e).await,
            NodeEvent::InterruptRequest(e) => self.handle_interrupt_request(e).await,
            NodeEvent::FacilitatorRequest(e) => self.handle_facilitator_request(e),
            NodeEvent::SdkResponse(e) => self.handle_sdk_response(e).await,
        }
    }

    async fn handle_status_update(&self, event: StatusUpdateEvent) -> EngineResult<HandlerOutcome> {
        let context = &event.context;
        let run_id = context.run_id();

        if context.is_empty() {
            return Err(ContextError::EmptyContext {
                run_id: run_id.to_string(),
            }
            .into());
        }

        // The parent is read off the context, so the reporting node must be its current frame
        if context.current_runtime_id() != Some(event.node_execution_id.as_str()) {
            warn!(
                node_execution_id = %event.node_execution_id,
                current_runtime_id = ?context.current_runtime_id(),
                "Status update for a node that is not the context's current frame"
            );
            return Err(EngineError::InvalidRequest(format!(
                "node {} is not the current frame of run {} (current: {})",
                event.node_execution_id,
                run_id,
                context.current_runtime_id().unwrap_or_default()
            )));
        }

        let Some(parent_runtime_id) = context.parent_runtime_id().map(str::to_string) else {
            self.store
                .record_status(None, &event.node_execution_id, event.status)
                .await?;
            debug!(status = %event.status, "Root node status recorded");
            return Ok(HandlerOutcome::RootStatus {
                status: event.status,
            });
        };

        self.store
            .record_status(Some(&parent_runtime_id), &event.node_execution_id, event.status)
            .await?;

        let siblings = self.store.sibling_statuses(&parent_runtime_id).await?;
        let status = calculate_status(&siblings, run_id);
        let previous = self.store.node_status(&parent_runtime_id).await?;
        let transition = should_transition(previous, status);

        let parent_context = context.derive_for_finish();
        if transition {
            self.store
                .record_status(parent_context.parent_runtime_id(), &parent_runtime_id, status)
                .await?;
        }

        log_status_rollup(
            run_id,
            &parent_runtime_id,
            siblings.len(),
            previous,
            status,
            transition,
        );

        Ok(HandlerOutcome::ParentRollup {
            parent_runtime_id,
            parent_context,
            previous,
            status,
            transition,
        })
    }

    async fn handle_interrupt_request(
        &self,
        event: InterruptRequestEvent,
    ) -> EngineResult<HandlerOutcome> {
        let envelope = &event.envelope;
        let response = self
            .store
            .suspension_response(&envelope.node_execution_id)
            .await?;
        let kind = response.kind().map(|k| k.as_str());
        let interrupt_type = envelope.interrupt_type.as_str();

        match build_interrupt(envelope, &response) {
            Ok(built) => {
                log_interrupt_dispatch(interrupt_type, &envelope.node_execution_id, kind, "built", None);
                Ok(HandlerOutcome::Interrupt(built))
            }
            Err(err) => {
                log_interrupt_dispatch(
                    interrupt_type,
                    &envelope.node_execution_id,
                    kind,
                    "rejected",
                    Some(err.to_string().as_str()),
                );
                Err(err.into())
            }
        }
    }

    fn handle_facilitator_request(
        &self,
        event: FacilitatorRequestEvent,
    ) -> EngineResult<HandlerOutcome> {
        let (operation, context) = match event.child_frame {
            Some(frame) => ("descend", event.context.descend(frame)?),
            None => ("derive_for_child", event.context.derive_for_child()),
        };

        log_context_operation(operation, context.run_id(), context.depth(), None);

        let fully_qualified_name = fully_qualified_name_with(
            context.frames(),
            self.config.fqn_skip_identifiers.as_slice(),
        );
        // Strategy metadata lives on the spawned child, which is now the current frame
        let strategy_postfix =
            strategy_postfix(context.current_frame(), self.config.use_matrix_field_name);

        Ok(HandlerOutcome::ChildContext {
            context,
            fully_qualified_name,
            strategy_postfix,
        })
    }

    async fn handle_sdk_response(&self, event: SdkResponseEvent) -> EngineResult<HandlerOutcome> {
        if let Some(suspension) = event.suspension {
            debug!(mode = ?suspension.kind(), "Recording suspension");
            self.store
                .record_suspension(&event.node_execution_id, suspension)
                .await?;
        }
        Ok(HandlerOutcome::Acknowledged)
    }
}

/// Whether a parent moves to its rolled-up status.
///
/// A parent with no stored status has never been written, so the first write only
/// needs the target to have an allowed-start entry at all. After that the
/// allowed-start policy decides.
fn should_transition(previous: Option<Status>, status: Status) -> bool {
    match previous {
        Some(previous) => previous != status && is_transition_allowed(previous, status),
        None => !node_allowed_start_set(status).is_empty(),
    }
}

fn event_fields(event: &NodeEvent) -> LogFields {
    match event {
        NodeEvent::StatusUpdate(e) => node_event_fields(&e.context, &e.node_execution_id, &e.notify_id),
        NodeEvent::FacilitatorRequest(e) => {
            node_event_fields(&e.context, &e.node_execution_id, &e.notify_id)
        }
        NodeEvent::InterruptRequest(e) => interrupt_event_fields(&e.envelope, &e.run_id),
        NodeEvent::SdkResponse(e) => {
            sdk_response_fields(&e.event_type, &e.node_execution_id, &e.run_id)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{ExecutionContext, StepCategory, StepFrame};
    use crate::diagnostics::log_field;
    use crate::error::EngineError;
    use crate::events::InMemoryNodeStatusStore;
    use crate::interrupt::{InterruptEnvelope, InterruptType, SuspensionMode};
    use crate::status::Status;

    fn frame(runtime_id: &str, identifier: &str, category: StepCategory) -> StepFrame {
        StepFrame::builder()
            .runtime_id(runtime_id)
            .setup_id(format!("setup-{identifier}"))
            .identifier(identifier)
            .step_type(category.as_str(), category)
            .build()
            .unwrap()
    }

    fn stage_context() -> ExecutionContext {
        ExecutionContext::new("run-1", "plan-1")
            .with_frames(vec![
                frame("pipeline-rt", "pipeline", StepCategory::Pipeline),
                frame("stage-rt", "build", StepCategory::Stage),
            ])
            .unwrap()
    }

    fn step_update(step: &str, status: Status) -> NodeEvent {
        let context = stage_context()
            .descend(frame(step, step, StepCategory::Step))
            .unwrap();
        NodeEvent::StatusUpdate(StatusUpdateEvent {
            context,
            node_execution_id: step.to_string(),
            notify_id: format!("notify-{step}"),
            status,
        })
    }

    #[tokio::test]
    async fn test_status_update_rolls_up_into_parent() {
        let handler = NodeEventHandler::new(Arc::new(InMemoryNodeStatusStore::new()));

        let first = handler.handle(step_update("step-a", Status::Running)).await.unwrap();
        assert!(matches!(
            first,
            HandlerOutcome::ParentRollup {
                previous: None,
                status: Status::Running,
                transition: true,
                ..
            }
        ));

        let outcome = handler.handle(step_update("step-b", Status::Queued)).await.unwrap();

        match outcome {
            HandlerOutcome::ParentRollup {
                parent_runtime_id,
                parent_context,
                previous,
                status,
                transition,
            } => {
                assert_eq!(parent_runtime_id, "stage-rt");
                assert_eq!(parent_context.depth(), 2);
                assert_eq!(previous, Some(Status::Running));
                assert_eq!(status, Status::Running);
                assert!(!transition);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_failed_child_fails_parent() {
        let handler = NodeEventHandler::new(Arc::new(InMemoryNodeStatusStore::new()));

        handler.handle(step_update("step-a", Status::Running)).await.unwrap();
        let outcome = handler.handle(step_update("step-b", Status::Failed)).await.unwrap();

        assert!(matches!(
            outcome,
            HandlerOutcome::ParentRollup {
                previous: Some(Status::Running),
                status: Status::Failed,
                transition: true,
                ..
            }
        ));
        assert_eq!(
            handler.store().node_status("stage-rt").await.unwrap(),
            Some(Status::Failed)
        );
    }

    #[test]
    fn test_first_write_still_needs_an_allowed_start_entry() {
        assert!(should_transition(None, Status::Running));
        assert!(should_transition(None, Status::Succeeded));
        assert!(!should_transition(None, Status::Unrecognized));
        assert!(!should_transition(Some(Status::Running), Status::Running));
        assert!(!should_transition(Some(Status::Succeeded), Status::Running));
    }

    #[tokio::test]
    async fn test_update_from_non_current_node_is_rejected() {
        let handler = NodeEventHandler::new(Arc::new(InMemoryNodeStatusStore::new()));
        let event = NodeEvent::StatusUpdate(StatusUpdateEvent {
            context: stage_context(),
            node_execution_id: "step-a".to_string(),
            notify_id: "notify-a".to_string(),
            status: Status::Failed,
        });

        let err = handler.handle(event).await.unwrap_err();
        assert!(matches!(err, EngineError::InvalidRequest(msg) if msg.contains("step-a")));
        assert!(handler.store().sibling_statuses("pipeline-rt").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_context_is_invalid_request() {
        let handler = NodeEventHandler::new(Arc::new(InMemoryNodeStatusStore::new()));
        let event = NodeEvent::StatusUpdate(StatusUpdateEvent {
            context: ExecutionContext::new("run-1", "plan-1"),
            node_execution_id: "n".to_string(),
            notify_id: "n".to_string(),
            status: Status::Running,
        });

        let err = handler.handle(event).await.unwrap_err();
        assert!(matches!(err, EngineError::InvalidRequest(_)));
        assert!(log_field("runId").is_none());
    }

    #[tokio::test]
    async fn test_interrupt_uses_recorded_suspension() {
        let handler = NodeEventHandler::new(Arc::new(InMemoryNodeStatusStore::new()));
        handler
            .handle(NodeEvent::SdkResponse(SdkResponseEvent {
                event_type: "ADD_EXECUTABLE_RESPONSE".to_string(),
                run_id: "run-1".to_string(),
                node_execution_id: "step-a".to_string(),
                suspension: Some(
                    SuspensionMode::Task {
                        task_id: "task-1".to_string(),
                    }
                    .into(),
                ),
            }))
            .await
            .unwrap();

        let outcome = handler
            .handle(NodeEvent::InterruptRequest(InterruptRequestEvent {
                run_id: "run-1".to_string(),
                envelope: InterruptEnvelope::new(InterruptType::Abort, "step-a", "notify-a"),
            }))
            .await
            .unwrap();

        match outcome {
            HandlerOutcome::Interrupt(envelope) => {
                assert_eq!(envelope.task_section.unwrap().task_id, "task-1");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_interrupt_on_delegating_node_is_rejected() {
        let handler = NodeEventHandler::new(Arc::new(InMemoryNodeStatusStore::new()));
        handler
            .store()
            .record_suspension(
                "stage-rt",
                SuspensionMode::Child {
                    child_node_id: "step-a".to_string(),
                }
                .into(),
            )
            .await
            .unwrap();

        let err = handler
            .handle(NodeEvent::InterruptRequest(InterruptRequestEvent {
                run_id: "run-1".to_string(),
                envelope: InterruptEnvelope::new(InterruptType::Retry, "stage-rt", "notify"),
            }))
            .await
            .unwrap_err();

        assert!(matches!(err, EngineError::DispatchError(msg) if msg.contains("child")));
    }

    #[tokio::test]
    async fn test_facilitator_request_descends() {
        let handler = NodeEventHandler::new(Arc::new(InMemoryNodeStatusStore::new()));
        let outcome = handler
            .handle(NodeEvent::FacilitatorRequest(FacilitatorRequestEvent {
                context: stage_context(),
                node_execution_id: "stage-rt".to_string(),
                notify_id: "notify".to_string(),
                child_frame: Some(frame("step-rt", "compile", StepCategory::Step)),
            }))
            .await
            .unwrap();

        match outcome {
            HandlerOutcome::ChildContext {
                context,
                fully_qualified_name,
                strategy_postfix,
            } => {
                assert_eq!(context.depth(), 3);
                assert_eq!(fully_qualified_name, "pipeline.build.compile");
                assert!(strategy_postfix.is_empty());
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }
}
