//! Read-only queries over an [`ExecutionContext`] frame stack.

use super::execution_context::ExecutionContext;
use super::frame::{StepCategory, StepFrame, StepType, MATRIX_DUPLICATE_POSTFIX_KEY};
use crate::error::ContextError;

pub const ACCOUNT_ID: &str = "accountId";
pub const ORG_IDENTIFIER: &str = "orgIdentifier";
pub const PROJECT_IDENTIFIER: &str = "projectIdentifier";

/// Group carried by the frame that fans out into stages
pub const STAGES_GROUP: &str = "STAGES";
/// Identifier of the frame wrapping rollback steps
pub const ROLLBACK_STEPS: &str = "rollbackSteps";
/// Identifiers left out of fully qualified names by default
pub const DEFAULT_FQN_SKIP_IDENTIFIERS: &[&str] = &["parallel"];

impl ExecutionContext {
    pub fn current_frame(&self) -> Option<&StepFrame> {
        self.frames().last()
    }

    pub fn parent_frame(&self) -> Option<&StepFrame> {
        let frames = self.frames();
        frames.len().checked_sub(2).map(|idx| &frames[idx])
    }

    pub fn current_runtime_id(&self) -> Option<&str> {
        self.current_frame().map(StepFrame::runtime_id)
    }

    pub fn current_setup_id(&self) -> Option<&str> {
        self.current_frame().map(StepFrame::setup_id)
    }

    pub fn current_identifier(&self) -> Option<&str> {
        self.current_frame().map(StepFrame::identifier)
    }

    pub fn current_step_type(&self) -> Option<&StepType> {
        self.current_frame().map(StepFrame::step_type)
    }

    pub fn current_group(&self) -> Option<&str> {
        self.current_frame().map(StepFrame::group)
    }

    pub fn current_node_type(&self) -> Option<&str> {
        self.current_frame().map(StepFrame::node_type)
    }

    /// Start timestamp of the current frame; an empty context has none to give
    pub fn current_start_ts(&self) -> Result<i64, ContextError> {
        self.current_frame()
            .map(StepFrame::start_ts)
            .ok_or_else(|| ContextError::EmptyContext {
                run_id: self.run_id().to_string(),
            })
    }

    pub fn parent_runtime_id(&self) -> Option<&str> {
        self.parent_frame().map(StepFrame::runtime_id)
    }

    pub fn parent_step_type(&self) -> Option<&StepType> {
        self.parent_frame().map(StepFrame::step_type)
    }

    fn last_frame_of(&self, category: StepCategory) -> Option<&StepFrame> {
        self.frames()
            .iter()
            .rev()
            .find(|frame| frame.category() == category)
    }

    /// Innermost stage frame, if the current node runs inside a stage
    pub fn stage_frame(&self) -> Option<&StepFrame> {
        self.last_frame_of(StepCategory::Stage)
    }

    pub fn stage_runtime_id(&self) -> Option<&str> {
        self.stage_frame().map(StepFrame::runtime_id)
    }

    pub fn step_group_frame(&self) -> Option<&StepFrame> {
        self.last_frame_of(StepCategory::StepGroup)
    }

    pub fn step_group_identifier(&self) -> Option<&str> {
        self.step_group_frame().map(StepFrame::identifier)
    }

    pub fn strategy_frame(&self) -> Option<&StepFrame> {
        self.last_frame_of(StepCategory::Strategy)
    }

    pub fn is_current_level_at_step(&self) -> bool {
        self.current_frame()
            .is_some_and(|frame| frame.category() == StepCategory::Step)
    }

    pub fn is_current_level_inside_stage(&self) -> bool {
        self.stage_frame().is_some()
    }

    pub fn is_current_level_child_of_step(&self, step_type: &str) -> bool {
        self.parent_step_type()
            .is_some_and(|parent| parent.type_name == step_type)
    }

    /// Whether the current strategy node expands stages: its parent groups
    /// stages directly, or is a fork whose parent does.
    pub fn is_current_strategy_level_at_stage(&self) -> bool {
        let frames = self.frames();
        let count = frames.len();

        if count >= 2 && frames[count - 2].group() == STAGES_GROUP {
            return true;
        }

        count >= 3
            && frames[count - 2].category() == StepCategory::Fork
            && frames[count - 3].group() == STAGES_GROUP
    }

    pub fn is_retry(&self) -> bool {
        self.current_frame()
            .is_some_and(|frame| frame.retry_index() > 0)
    }

    pub fn is_under_rollback_steps(&self) -> bool {
        self.frames()
            .iter()
            .any(|frame| frame.identifier() == ROLLBACK_STEPS)
    }

    pub fn account_id(&self) -> Option<&str> {
        self.attribute(ACCOUNT_ID)
    }

    pub fn org_identifier(&self) -> Option<&str> {
        self.attribute(ORG_IDENTIFIER)
    }

    pub fn project_identifier(&self) -> Option<&str> {
        self.attribute(PROJECT_IDENTIFIER)
    }

    pub fn setting_value(&self, key: &str) -> Option<&str> {
        self.metadata().settings.get(key).map(String::as_str)
    }

    /// A setting counts as enabled only when it is literally `true`
    pub fn setting_enabled(&self, key: &str) -> bool {
        self.setting_value(key)
            .is_some_and(|value| value.eq_ignore_ascii_case("true"))
    }

    pub fn feature_flag_enabled(&self, flag: &str) -> bool {
        self.metadata().feature_flags.contains(flag)
    }

    pub fn fully_qualified_name(&self) -> String {
        fully_qualified_name(self.frames())
    }
}

/// Dot-joined identifiers of the frames an expression resolves through.
///
/// Frames flagged `skip_expression_chain` are left out, as are STEP frames whose
/// identifier is one of the skip identifiers.
pub fn fully_qualified_name(frames: &[StepFrame]) -> String {
    fully_qualified_name_with(frames, DEFAULT_FQN_SKIP_IDENTIFIERS)
}

pub fn fully_qualified_name_with<S: AsRef<str>>(frames: &[StepFrame], skip: &[S]) -> String {
    frames
        .iter()
        .filter(|frame| !frame.skip_expression_chain())
        .filter(|frame| {
            frame.category() != StepCategory::Step
                || !skip.iter().any(|id| id.as_ref() == frame.identifier())
        })
        .map(StepFrame::identifier)
        .collect::<Vec<_>>()
        .join(".")
}

/// Suffix that distinguishes the identifier of a strategy-spawned frame.
///
/// Matrix children use their node name when one was given. Otherwise they use
/// the values (sorted by key) when `use_matrix_field_name` is set, or the
/// combination indices when it is not. Either way the duplicate postfix, if
/// present, is appended last. Loop and parallelism children use the current
/// iteration.
pub fn strategy_postfix(frame: Option<&StepFrame>, use_matrix_field_name: bool) -> String {
    let Some(metadata) = frame.and_then(StepFrame::strategy_metadata) else {
        return String::new();
    };

    match &metadata.matrix {
        Some(matrix) if !matrix.combination.is_empty() => {
            let mut parts: Vec<String> = match matrix.node_name.as_deref() {
                Some(name) if !name.is_empty() => vec![name.to_string()],
                _ if use_matrix_field_name => matrix
                    .values
                    .iter()
                    .filter(|(key, _)| key.as_str() != MATRIX_DUPLICATE_POSTFIX_KEY)
                    .map(|(_, value)| value.replace('.', ""))
                    .collect(),
                _ => matrix.combination.iter().map(u32::to_string).collect(),
            };
            if let Some(dup) = matrix.values.get(MATRIX_DUPLICATE_POSTFIX_KEY) {
                parts.push(dup.clone());
            }
            format!("_{}", parts.join("_"))
        }
        _ if metadata.total_iterations == 0 => String::new(),
        _ => format!("_{}", metadata.current_iteration),
    }
}
