//! Inbound event envelopes. The wire encoding belongs to the transport; these are
//! only the decoded shapes.

use serde::{Deserialize, Serialize};

use crate::context::{ExecutionContext, StepFrame};
use crate::interrupt::{InterruptEnvelope, SuspensionResponse};
use crate::status::Status;

/// A node reports a new status of its own
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusUpdateEvent {
    /// Context of the reporting node; its current frame is the node itself
    pub context: ExecutionContext,
    pub node_execution_id: String,
    pub notify_id: String,
    pub status: Status,
}

/// Someone asks for an interrupt against a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterruptRequestEvent {
    pub run_id: String,
    pub envelope: InterruptEnvelope,
}

/// A facilitator asks for the context a child node should start with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacilitatorRequestEvent {
    pub context: ExecutionContext,
    pub node_execution_id: String,
    pub notify_id: String,
    /// Frame of the child about to start; absent when the child keeps the parent's level
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child_frame: Option<StepFrame>,
}

/// An executor reports back through the SDK
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SdkResponseEvent {
    pub event_type: String,
    pub run_id: String,
    pub node_execution_id: String,
    /// Present when the executor parked the node
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suspension: Option<SuspensionResponse>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeEvent {
    StatusUpdate(StatusUpdateEvent),
    InterruptRequest(InterruptRequestEvent),
    FacilitatorRequest(FacilitatorRequestEvent),
    SdkResponse(SdkResponseEvent),
}

impl NodeEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::StatusUpdate(_) => "status_update",
            Self::InterruptRequest(_) => "interrupt_request",
            Self::FacilitatorRequest(_) => "facilitator_request",
            Self::SdkResponse(_) => "sdk_response",
        }
    }

    pub fn run_id(&self) -> &str {
        match self {
            Self::StatusUpdate(e) => e.context.run_id(),
            Self::InterruptRequest(e) => &e.run_id,
            Self::FacilitatorRequest(e) => e.context.run_id(),
            Self::SdkResponse(e) => &e.run_id,
        }
    }
}

/// What handling an event decided
#[derive(Debug, Clone, PartialEq)]
pub enum HandlerOutcome {
    /// The reporting node has a parent; its children rolled up to `status`
    ParentRollup {
        parent_runtime_id: String,
        /// Context the parent resumes with
        parent_context: ExecutionContext,
        previous: Option<Status>,
        status: Status,
        /// Whether the parent should move to `status`
        transition: bool,
    },
    /// The reporting node is the root of the run
    RootStatus { status: Status },
    Interrupt(InterruptEnvelope),
    ChildContext {
        context: ExecutionContext,
        fully_qualified_name: String,
        strategy_postfix: String,
    },
    Acknowledged,
}
