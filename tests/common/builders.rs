#![allow(dead_code)]

use tasker_context::context::{
    ExecutionContext, MatrixMetadata, StepCategory, StepFrame, StrategyMetadata,
};

use std::collections::BTreeMap;

/// Frame whose runtime id, setup id and identifier are all derived from `identifier`
pub fn frame(identifier: &str, category: StepCategory) -> StepFrame {
    StepFrame::builder()
        .runtime_id(format!("rt-{identifier}"))
        .setup_id(format!("setup-{identifier}"))
        .identifier(identifier)
        .step_type(category.as_str(), category)
        .build()
        .expect("valid frame")
}

pub fn grouped_frame(identifier: &str, group: &str, category: StepCategory) -> StepFrame {
    StepFrame::builder()
        .runtime_id(format!("rt-{identifier}"))
        .setup_id(format!("setup-{identifier}"))
        .identifier(identifier)
        .group(group)
        .step_type(category.as_str(), category)
        .build()
        .expect("valid frame")
}

/// Frame spawned by a matrix strategy for one combination
pub fn matrix_frame(
    identifier: &str,
    category: StepCategory,
    values: &[(&str, &str)],
    combination: Vec<u32>,
) -> StepFrame {
    let values: BTreeMap<String, String> = values
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    StepFrame::builder()
        .runtime_id(format!("rt-{identifier}"))
        .identifier(identifier)
        .step_type(category.as_str(), category)
        .strategy_metadata(StrategyMetadata {
            current_iteration: 0,
            total_iterations: 1,
            matrix: Some(MatrixMetadata {
                values,
                combination,
                node_name: None,
            }),
        })
        .build()
        .expect("valid frame")
}

/// pipeline -> STAGES -> stage `build` -> step group -> step `compile`
pub fn sample_context() -> ExecutionContext {
    ExecutionContext::new("run-1", "plan-1")
        .with_attribute("accountId", "acc-1")
        .with_attribute("orgIdentifier", "org-1")
        .with_attribute("projectIdentifier", "proj-1")
        .with_frames(vec![
            frame("pipeline", StepCategory::Pipeline),
            grouped_frame("stages", "STAGES", StepCategory::Stage),
            grouped_frame("build", "STAGE", StepCategory::Stage),
            grouped_frame("checks", "STEP_GROUP", StepCategory::StepGroup),
            frame("compile", StepCategory::Step),
        ])
        .expect("unique runtime ids")
}

pub fn context_with_depth(depth: usize) -> ExecutionContext {
    let frames = (0..depth)
        .map(|i| frame(&format!("level{i}"), StepCategory::Step))
        .collect();
    ExecutionContext::new("run-1", "plan-1")
        .with_attribute("accountId", "acc-1")
        .with_frames(frames)
        .expect("unique runtime ids")
}
