use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

use crate::error::ContextError;

/// Matrix values key carrying the suffix that disambiguates duplicate combinations
pub const MATRIX_DUPLICATE_POSTFIX_KEY: &str = "matrixIdentifierPostfixForDuplicates";

/// Category of the node a frame describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StepCategory {
    Pipeline,
    Stage,
    Phase,
    Section,
    StepGroup,
    Strategy,
    Fork,
    Step,
    /// Value from a newer producer that this build does not know about
    #[serde(other)]
    Unrecognized,
}

impl StepCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pipeline => "PIPELINE",
            Self::Stage => "STAGE",
            Self::Phase => "PHASE",
            Self::Section => "SECTION",
            Self::StepGroup => "STEP_GROUP",
            Self::Strategy => "STRATEGY",
            Self::Fork => "FORK",
            Self::Step => "STEP",
            Self::Unrecognized => "UNRECOGNIZED",
        }
    }
}

impl fmt::Display for StepCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for StepCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PIPELINE" => Ok(Self::Pipeline),
            "STAGE" => Ok(Self::Stage),
            "PHASE" => Ok(Self::Phase),
            "SECTION" => Ok(Self::Section),
            "STEP_GROUP" => Ok(Self::StepGroup),
            "STRATEGY" => Ok(Self::Strategy),
            "FORK" => Ok(Self::Fork),
            "STEP" => Ok(Self::Step),
            "UNRECOGNIZED" => Ok(Self::Unrecognized),
            _ => Err(format!("Invalid step category: {s}")),
        }
    }
}

impl Default for StepCategory {
    fn default() -> Self {
        Self::Step
    }
}

/// Step type of a frame: the executor type name plus its category
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct StepType {
    #[serde(rename = "type")]
    pub type_name: String,
    pub category: StepCategory,
}

impl StepType {
    pub fn new(type_name: impl Into<String>, category: StepCategory) -> Self {
        Self {
            type_name: type_name.into(),
            category,
        }
    }
}

/// Matrix combination a strategy child runs with
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MatrixMetadata {
    pub values: BTreeMap<String, String>,
    pub combination: Vec<u32>,
    /// User-chosen name for the combination; replaces values and indices in the postfix
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_name: Option<String>,
}

/// Looping/matrix/parallelism position of a frame spawned by a strategy node
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StrategyMetadata {
    pub current_iteration: u32,
    pub total_iterations: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matrix: Option<MatrixMetadata>,
}

/// One level of the execution context stack.
///
/// Frames are immutable once built; the only way to get a different frame is to
/// build a new one. Decoding goes through the builder, so a decoded frame holds
/// the same guarantees as a built one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawStepFrame")]
pub struct StepFrame {
    runtime_id: String,
    setup_id: String,
    identifier: String,
    group: String,
    retry_index: u32,
    step_type: StepType,
    skip_expression_chain: bool,
    start_ts: i64,
    #[serde(default)]
    node_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    strategy_metadata: Option<StrategyMetadata>,
}

impl StepFrame {
    pub fn builder() -> StepFrameBuilder {
        StepFrameBuilder::default()
    }

    pub fn runtime_id(&self) -> &str {
        &self.runtime_id
    }

    pub fn setup_id(&self) -> &str {
        &self.setup_id
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn retry_index(&self) -> u32 {
        self.retry_index
    }

    pub fn step_type(&self) -> &StepType {
        &self.step_type
    }

    pub fn category(&self) -> StepCategory {
        self.step_type.category
    }

    pub fn skip_expression_chain(&self) -> bool {
        self.skip_expression_chain
    }

    /// Epoch milliseconds at which the frame was created
    pub fn start_ts(&self) -> i64 {
        self.start_ts
    }

    pub fn node_type(&self) -> &str {
        &self.node_type
    }

    pub fn strategy_metadata(&self) -> Option<&StrategyMetadata> {
        self.strategy_metadata.as_ref()
    }
}

/// Wire shape of a [`StepFrame`] before validation
#[derive(Debug, Deserialize)]
struct RawStepFrame {
    runtime_id: String,
    setup_id: String,
    identifier: String,
    group: String,
    retry_index: u32,
    step_type: StepType,
    skip_expression_chain: bool,
    start_ts: i64,
    #[serde(default)]
    node_type: String,
    #[serde(default)]
    strategy_metadata: Option<StrategyMetadata>,
}

impl TryFrom<RawStepFrame> for StepFrame {
    type Error = ContextError;

    fn try_from(raw: RawStepFrame) -> Result<Self, Self::Error> {
        if raw.runtime_id.is_empty() {
            return Err(ContextError::InvalidFrame {
                reason: "runtime_id must not be empty".to_string(),
            });
        }

        let mut builder = StepFrame::builder()
            .runtime_id(raw.runtime_id)
            .setup_id(raw.setup_id)
            .identifier(raw.identifier)
            .group(raw.group)
            .retry_index(raw.retry_index)
            .skip_expression_chain(raw.skip_expression_chain)
            .start_ts(raw.start_ts)
            .node_type(raw.node_type);
        builder.step_type = raw.step_type;
        builder.strategy_metadata = raw.strategy_metadata;
        builder.build()
    }
}

/// Builder for [`StepFrame`]
#[derive(Debug, Clone, Default)]
pub struct StepFrameBuilder {
    runtime_id: Option<String>,
    setup_id: String,
    identifier: String,
    group: String,
    retry_index: u32,
    step_type: StepType,
    skip_expression_chain: bool,
    start_ts: Option<i64>,
    node_type: String,
    strategy_metadata: Option<StrategyMetadata>,
}

impl StepFrameBuilder {
    pub fn runtime_id(mut self, runtime_id: impl Into<String>) -> Self {
        self.runtime_id = Some(runtime_id.into());
        self
    }

    pub fn setup_id(mut self, setup_id: impl Into<String>) -> Self {
        self.setup_id = setup_id.into();
        self
    }

    pub fn identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = identifier.into();
        self
    }

    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group = group.into();
        self
    }

    pub fn retry_index(mut self, retry_index: u32) -> Self {
        self.retry_index = retry_index;
        self
    }

    pub fn step_type(mut self, type_name: impl Into<String>, category: StepCategory) -> Self {
        self.step_type = StepType::new(type_name, category);
        self
    }

    pub fn skip_expression_chain(mut self, skip: bool) -> Self {
        self.skip_expression_chain = skip;
        self
    }

    /// Override the wall-clock start timestamp (epoch millis, must be positive)
    pub fn start_ts(mut self, start_ts: i64) -> Self {
        self.start_ts = Some(start_ts);
        self
    }

    pub fn node_type(mut self, node_type: impl Into<String>) -> Self {
        self.node_type = node_type.into();
        self
    }

    pub fn strategy_metadata(mut self, metadata: StrategyMetadata) -> Self {
        self.strategy_metadata = Some(metadata);
        self
    }

    pub fn build(self) -> Result<StepFrame, ContextError> {
        let start_ts = match self.start_ts {
            Some(ts) if ts <= 0 => {
                return Err(ContextError::InvalidFrame {
                    reason: format!("start_ts must be positive, got {ts}"),
                })
            }
            Some(ts) => ts,
            None => Utc::now().timestamp_millis().max(1),
        };

        Ok(StepFrame {
            runtime_id: self
                .runtime_id
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            setup_id: self.setup_id,
            identifier: self.identifier,
            group: self.group,
            retry_index: self.retry_index,
            step_type: self.step_type,
            skip_expression_chain: self.skip_expression_chain,
            start_ts,
            node_type: self.node_type,
            strategy_metadata: self.strategy_metadata,
        })
    }
}
