//! # Node Events
//!
//! Inbound event envelopes, the store they are applied against and the handler
//! that routes each one through context derivation, status rollup or interrupt
//! dispatch.

pub mod handler;
pub mod store;
pub mod types;

pub use handler::NodeEventHandler;
pub use store::{InMemoryNodeStatusStore, NodeStatusStore};
pub use types::{
    FacilitatorRequestEvent, HandlerOutcome, InterruptRequestEvent, NodeEvent, SdkResponseEvent,
    StatusUpdateEvent,
};
