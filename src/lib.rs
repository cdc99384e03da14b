#![allow(clippy::doc_markdown)] // Allow technical terms in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Tasker Context
//!
//! Hierarchical execution context, status rollup and interrupt dispatch for a
//! pipeline orchestrator.
//!
//! ## Overview
//!
//! A run is a tree of nodes (pipeline, stages, step groups, steps). Each node
//! carries an [`ExecutionContext`]: the stack of [`StepFrame`]s from the root down
//! to itself, plus run-scoped attributes. When a child reports a status, the
//! statuses of all its siblings are reduced to the parent's status by a fixed
//! precedence ladder. When an operator interrupts a node, the interrupt is built
//! from the way the node is currently parked.
//!
//! ## Module Organization
//!
//! - [`context`] - Frames, execution contexts and the queries handlers run over them
//! - [`status`] - Status lattice, groups, rollup and allowed-start policy
//! - [`interrupt`] - Suspension modes, interrupt envelopes and the dispatcher
//! - [`diagnostics`] - Correlation fields bound for the duration of a handler call
//! - [`events`] - Inbound events and the handler that routes them
//! - [`config`] - Layered configuration
//! - [`logging`] - Structured logging setup and helpers
//! - [`error`] - Structured error handling
//!
//! ## Quick Start
//!
//! ```rust
//! use tasker_context::context::{ExecutionContext, StepCategory, StepFrame};
//! use tasker_context::status::{calculate_status, Status};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let stage = StepFrame::builder()
//!     .identifier("build")
//!     .step_type("CI", StepCategory::Stage)
//!     .build()?;
//!
//! let context = ExecutionContext::new("run-1", "plan-1").descend(stage)?;
//! assert_eq!(context.depth(), 1);
//!
//! let parent = calculate_status(&[Status::Succeeded, Status::Running], context.run_id());
//! assert_eq!(parent, Status::Running);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

pub mod config;
pub mod context;
pub mod diagnostics;
pub mod error;
pub mod events;
pub mod interrupt;
pub mod logging;
pub mod status;

pub use config::EngineConfig;
pub use context::{ExecutionContext, StepCategory, StepFrame, StepType};
pub use diagnostics::{with_log_scope, with_log_scope_async, LogScope};
pub use error::{ContextError, DispatchError, EngineError, EngineResult};
pub use events::{NodeEvent, NodeEventHandler, NodeStatusStore};
pub use interrupt::{build_interrupt, InterruptEnvelope, SuspensionMode, SuspensionResponse};
pub use status::{calculate_status, Status};
