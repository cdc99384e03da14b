use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use super::frame::StepFrame;
use crate::error::ContextError;

/// How a run was started
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TriggerInfo {
    pub trigger_type: String,
    pub triggered_by: String,
    pub trigger_identifier: String,
}

/// Run-scoped metadata, inherited unchanged by every derived context
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RunMetadata {
    pub pipeline_identifier: String,
    pub run_sequence: u64,
    #[serde(default)]
    pub trigger: TriggerInfo,
    #[serde(default)]
    pub feature_flags: BTreeSet<String>,
    #[serde(default)]
    pub settings: HashMap<String, String>,
}

/// Ordered stack of frames (root first, current last) plus run-scoped data.
///
/// Every derivation returns a new value with its own frame and attribute storage,
/// so a snapshot handed to one handler can never observe changes made by another.
/// Share snapshots across tasks with `Arc<ExecutionContext>`. Decoded contexts
/// are checked for runtime id uniqueness the same way [`ExecutionContext::with_frames`] is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawExecutionContext")]
pub struct ExecutionContext {
    run_id: String,
    plan_id: String,
    frames: Vec<StepFrame>,
    attributes: HashMap<String, String>,
    #[serde(default)]
    metadata: RunMetadata,
}

/// Wire shape of an [`ExecutionContext`] before validation
#[derive(Debug, Deserialize)]
struct RawExecutionContext {
    run_id: String,
    plan_id: String,
    frames: Vec<StepFrame>,
    #[serde(default)]
    attributes: HashMap<String, String>,
    #[serde(default)]
    metadata: RunMetadata,
}

impl TryFrom<RawExecutionContext> for ExecutionContext {
    type Error = ContextError;

    fn try_from(raw: RawExecutionContext) -> Result<Self, Self::Error> {
        ExecutionContext::new(raw.run_id, raw.plan_id)
            .with_attributes(raw.attributes)
            .with_metadata(raw.metadata)
            .with_frames(raw.frames)
    }
}

impl ExecutionContext {
    /// Create the root context of a run, with no frames
    pub fn new(run_id: impl Into<String>, plan_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            plan_id: plan_id.into(),
            frames: Vec::new(),
            attributes: HashMap::new(),
            metadata: RunMetadata::default(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn with_attributes<I, K, V>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.attributes
            .extend(attributes.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn with_metadata(mut self, metadata: RunMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Build a context from an explicit frame stack, checking runtime id uniqueness
    pub fn with_frames(mut self, frames: Vec<StepFrame>) -> Result<Self, ContextError> {
        let mut seen = std::collections::HashSet::with_capacity(frames.len());
        for frame in &frames {
            if !seen.insert(frame.runtime_id()) {
                return Err(ContextError::DuplicateRuntimeId {
                    run_id: self.run_id.clone(),
                    runtime_id: frame.runtime_id().to_string(),
                });
            }
        }
        self.frames = frames;
        Ok(self)
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn plan_id(&self) -> &str {
        &self.plan_id
    }

    pub fn frames(&self) -> &[StepFrame] {
        &self.frames
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn attributes(&self) -> &HashMap<String, String> {
        &self.attributes
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn metadata(&self) -> &RunMetadata {
        &self.metadata
    }

    /// Mutable frame access for the owner of a snapshot that has not been handed off
    pub fn frames_mut(&mut self) -> &mut Vec<StepFrame> {
        &mut self.frames
    }

    /// Mutable attribute access for the owner of a snapshot that has not been handed off
    pub fn attributes_mut(&mut self) -> &mut HashMap<String, String> {
        &mut self.attributes
    }

    /// Context for a nested executable at the same logical depth.
    ///
    /// Same frames and attributes, fresh backing storage.
    pub fn derive_for_child(&self) -> Self {
        Self {
            run_id: self.run_id.clone(),
            plan_id: self.plan_id.clone(),
            frames: self.frames.to_vec(),
            attributes: self.attributes.clone(),
            metadata: self.metadata.clone(),
        }
    }

    /// Context for descending into a child node: the current frames plus `frame`
    pub fn descend(&self, frame: StepFrame) -> Result<Self, ContextError> {
        if self
            .frames
            .iter()
            .any(|existing| existing.runtime_id() == frame.runtime_id())
        {
            return Err(ContextError::DuplicateRuntimeId {
                run_id: self.run_id.clone(),
                runtime_id: frame.runtime_id().to_string(),
            });
        }

        let mut derived = self.derive_for_child();
        derived.frames.push(frame);
        Ok(derived)
    }

    /// Context handed back to the parent once the current node finishes.
    ///
    /// # Panics
    ///
    /// Panics when the context has no frames. Finishing a node that was never
    /// entered means the depth bookkeeping is already broken.
    pub fn derive_for_finish(&self) -> Self {
        assert!(
            !self.frames.is_empty(),
            "derive_for_finish called on run {} with no frames",
            self.run_id
        );
        self.truncate(self.frames.len() - 1)
    }

    /// Context holding the first `depth` frames (all of them if `depth` exceeds the stack)
    pub fn truncate(&self, depth: usize) -> Self {
        let keep = depth.min(self.frames.len());
        Self {
            run_id: self.run_id.clone(),
            plan_id: self.plan_id.clone(),
            frames: self.frames[..keep].to_vec(),
            attributes: self.attributes.clone(),
            metadata: self.metadata.clone(),
        }
    }

    /// Value-equal copy sharing no storage with `self`, for handing across a
    /// concurrency boundary.
    pub fn deep_copy(&self) -> Self {
        Self {
            run_id: self.run_id.clone(),
            plan_id: self.plan_id.clone(),
            frames: self.frames.iter().cloned().collect(),
            attributes: self
                .attributes
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            metadata: self.metadata.clone(),
        }
    }
}
