//! # Execution Context
//!
//! The frame stack a node carries while it runs, and the derivations applied to it
//! as execution descends into children and returns to parents.

pub mod accessors;
pub mod execution_context;
pub mod frame;

pub use accessors::{fully_qualified_name, fully_qualified_name_with, strategy_postfix};
pub use execution_context::{ExecutionContext, RunMetadata, TriggerInfo};
pub use frame::{
    MatrixMetadata, StepCategory, StepFrame, StepFrameBuilder, StepType, StrategyMetadata,
};
