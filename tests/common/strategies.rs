#![allow(dead_code)]

use proptest::prelude::*;
use tasker_context::context::{ExecutionContext, StepCategory, StepFrame};
use tasker_context::status::Status;

/// Strategy for generating any status, UNRECOGNIZED included
pub fn status_strategy() -> impl Strategy<Value = Status> {
    prop::sample::select(Status::ALL.to_vec())
}

/// Strategy for generating child status lists, including the empty list
pub fn child_statuses_strategy() -> impl Strategy<Value = Vec<Status>> {
    prop::collection::vec(status_strategy(), 0..12)
}

pub fn category_strategy() -> impl Strategy<Value = StepCategory> {
    prop_oneof![
        Just(StepCategory::Pipeline),
        Just(StepCategory::Stage),
        Just(StepCategory::StepGroup),
        Just(StepCategory::Strategy),
        Just(StepCategory::Fork),
        Just(StepCategory::Step),
    ]
}

/// Strategy for generating valid identifiers
pub fn identifier_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-zA-Z0-9_]{0,15}"
}

/// Strategy for generating contexts of 0..8 frames with unique runtime ids
pub fn context_strategy() -> impl Strategy<Value = ExecutionContext> {
    (
        prop::collection::vec((identifier_strategy(), category_strategy(), 0u32..3), 0..8),
        prop::collection::btree_map(identifier_strategy(), identifier_strategy(), 0..4),
    )
        .prop_map(|(levels, attributes)| {
            let frames = levels
                .into_iter()
                .enumerate()
                .map(|(i, (identifier, category, retry_index))| {
                    StepFrame::builder()
                        .runtime_id(format!("rt-{i}"))
                        .setup_id(format!("setup-{identifier}"))
                        .identifier(identifier)
                        .retry_index(retry_index)
                        .step_type(category.as_str(), category)
                        .build()
                        .expect("valid frame")
                })
                .collect();

            ExecutionContext::new("run-prop", "plan-prop")
                .with_attributes(attributes)
                .with_frames(frames)
                .expect("unique runtime ids")
        })
}
