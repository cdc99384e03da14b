//! Standard field sets bound while handling each kind of event.

use super::scope::LogFields;
use crate::context::ExecutionContext;
use crate::interrupt::InterruptEnvelope;

pub const RUN_ID: &str = "runId";
pub const PLAN_ID: &str = "planId";
pub const NODE_EXECUTION_ID: &str = "nodeExecutionId";
pub const NOTIFY_ID: &str = "notifyId";
pub const INTERRUPT_TYPE: &str = "interruptType";
pub const INTERRUPT_UUID: &str = "interruptUuid";
pub const SDK_RESPONSE_EVENT_TYPE: &str = "sdkResponseEventType";
pub const STEP_IDENTIFIER: &str = "identifier";

/// Run identity plus the context's attributes.
///
/// Standard keys are written after the attributes so an attribute can never shadow them.
pub fn context_log_fields(context: &ExecutionContext) -> LogFields {
    let mut fields: LogFields = context
        .attributes()
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    fields.insert(RUN_ID.to_string(), context.run_id().to_string());
    fields.insert(PLAN_ID.to_string(), context.plan_id().to_string());
    if let Some(identifier) = context.current_identifier() {
        fields.insert(STEP_IDENTIFIER.to_string(), identifier.to_string());
    }
    fields
}

pub fn node_event_fields(
    context: &ExecutionContext,
    node_execution_id: &str,
    notify_id: &str,
) -> LogFields {
    let mut fields = context_log_fields(context);
    fields.insert(NODE_EXECUTION_ID.to_string(), node_execution_id.to_string());
    fields.insert(NOTIFY_ID.to_string(), notify_id.to_string());
    fields
}

pub fn interrupt_event_fields(envelope: &InterruptEnvelope, run_id: &str) -> LogFields {
    LogFields::from([
        (INTERRUPT_TYPE.to_string(), envelope.interrupt_type.to_string()),
        (INTERRUPT_UUID.to_string(), envelope.interrupt_uuid.to_string()),
        (NOTIFY_ID.to_string(), envelope.notify_id.clone()),
        (RUN_ID.to_string(), run_id.to_string()),
    ])
}

pub fn sdk_response_fields(event_type: &str, node_execution_id: &str, run_id: &str) -> LogFields {
    LogFields::from([
        (SDK_RESPONSE_EVENT_TYPE.to_string(), event_type.to_string()),
        (NODE_EXECUTION_ID.to_string(), node_execution_id.to_string()),
        (RUN_ID.to_string(), run_id.to_string()),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interrupt::InterruptType;

    #[test]
    fn test_node_event_fields_include_attributes() {
        let context = ExecutionContext::new("run-1", "plan-1")
            .with_attribute("accountId", "acc-1")
            .with_attribute(RUN_ID, "spoofed");

        let fields = node_event_fields(&context, "node-1", "notify-1");

        assert_eq!(fields[RUN_ID], "run-1");
        assert_eq!(fields[PLAN_ID], "plan-1");
        assert_eq!(fields["accountId"], "acc-1");
        assert_eq!(fields[NODE_EXECUTION_ID], "node-1");
        assert_eq!(fields[NOTIFY_ID], "notify-1");
        assert!(!fields.contains_key(STEP_IDENTIFIER));
    }

    #[test]
    fn test_interrupt_fields() {
        let envelope = InterruptEnvelope::new(InterruptType::Retry, "node-1", "notify-1");
        let fields = interrupt_event_fields(&envelope, "run-1");

        assert_eq!(fields.len(), 4);
        assert_eq!(fields[INTERRUPT_TYPE], "RETRY");
        assert_eq!(fields[INTERRUPT_UUID], envelope.interrupt_uuid.to_string());
    }

    #[test]
    fn test_sdk_response_fields() {
        let fields = sdk_response_fields("ADD_EXECUTABLE_RESPONSE", "node-1", "run-1");
        assert_eq!(fields[SDK_RESPONSE_EVENT_TYPE], "ADD_EXECUTABLE_RESPONSE");
        assert_eq!(fields.len(), 3);
    }
}
