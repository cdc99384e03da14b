use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

/// Kind of out-of-band control signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InterruptType {
    Abort,
    AbortAll,
    Retry,
    ExpireAll,
    MarkExpired,
    MarkFailed,
    MarkSuccess,
    Ignore,
    Pause,
    Resume,
}

impl InterruptType {
    pub const ALL: [InterruptType; 10] = [
        InterruptType::Abort,
        InterruptType::AbortAll,
        InterruptType::Retry,
        InterruptType::ExpireAll,
        InterruptType::MarkExpired,
        InterruptType::MarkFailed,
        InterruptType::MarkSuccess,
        InterruptType::Ignore,
        InterruptType::Pause,
        InterruptType::Resume,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Abort => "ABORT",
            Self::AbortAll => "ABORT_ALL",
            Self::Retry => "RETRY",
            Self::ExpireAll => "EXPIRE_ALL",
            Self::MarkExpired => "MARK_EXPIRED",
            Self::MarkFailed => "MARK_FAILED",
            Self::MarkSuccess => "MARK_SUCCESS",
            Self::Ignore => "IGNORE",
            Self::Pause => "PAUSE",
            Self::Resume => "RESUME",
        }
    }

    /// Check if the interrupt tears the node down
    pub fn is_teardown(&self) -> bool {
        matches!(
            self,
            Self::Abort | Self::AbortAll | Self::ExpireAll | Self::MarkExpired
        )
    }

    /// Check if the interrupt applies to the whole run rather than one node
    pub fn is_run_wide(&self) -> bool {
        matches!(self, Self::AbortAll | Self::ExpireAll)
    }
}

impl fmt::Display for InterruptType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for InterruptType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        InterruptType::ALL
            .iter()
            .find(|t| t.as_str() == s)
            .copied()
            .ok_or_else(|| format!("Invalid interrupt type: {s}"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AsyncSection {
    pub callback_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSection {
    pub task_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskChainSection {
    pub task_id: String,
}

/// Outbound control signal targeted at one node execution.
///
/// Callers fill in the identity fields; [`build_interrupt`](super::build_interrupt)
/// fills in the section matching the node's suspension mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterruptEnvelope {
    pub interrupt_uuid: Uuid,
    pub interrupt_type: InterruptType,
    pub node_execution_id: String,
    pub notify_id: String,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub async_section: Option<AsyncSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_section: Option<TaskSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_chain_section: Option<TaskChainSection>,
}

impl InterruptEnvelope {
    /// Create a partial envelope with a fresh interrupt uuid and no sections
    pub fn new(
        interrupt_type: InterruptType,
        node_execution_id: impl Into<String>,
        notify_id: impl Into<String>,
    ) -> Self {
        Self {
            interrupt_uuid: Uuid::new_v4(),
            interrupt_type,
            node_execution_id: node_execution_id.into(),
            notify_id: notify_id.into(),
            metadata: HashMap::new(),
            async_section: None,
            task_section: None,
            task_chain_section: None,
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Check if any mode-specific section has been filled in
    pub fn has_section(&self) -> bool {
        self.async_section.is_some()
            || self.task_section.is_some()
            || self.task_chain_section.is_some()
    }
}
