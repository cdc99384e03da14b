//! # Interrupts
//!
//! Suspension modes a node can be parked in, the interrupt envelope sent to it and
//! the dispatcher that fills the envelope in from the recorded mode.

pub mod dispatcher;
pub mod envelope;
pub mod suspension;

pub use dispatcher::build_interrupt;
pub use envelope::{AsyncSection, InterruptEnvelope, InterruptType, TaskChainSection, TaskSection};
pub use suspension::{SuspensionKind, SuspensionMode, SuspensionResponse};
