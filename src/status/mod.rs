//! # Node Status
//!
//! The status lattice, its named groups, the parent rollup and the allowed-start policy.

pub mod aggregator;
pub mod groups;
pub mod states;
pub mod transitions;

pub use aggregator::{calculate_status, calculate_status_by_group};
pub use states::Status;
pub use transitions::{is_transition_allowed, node_allowed_start_set};
