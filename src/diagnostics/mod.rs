//! # Diagnostic Scope
//!
//! Correlation fields bound for the duration of one handler call.

pub mod fields;
pub mod scope;

pub use fields::{context_log_fields, interrupt_event_fields, node_event_fields, sdk_response_fields};
pub use scope::{
    current_log_fields, log_field, with_log_scope, with_log_scope_async, LogFields, LogScope,
    LogScoped,
};
