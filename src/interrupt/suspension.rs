//! How a node is currently parked.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The one active suspension mode of a parked node, set by the node's own executor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum SuspensionMode {
    /// Returned synchronously; nothing outstanding
    Sync,
    /// Waiting on one or more async callbacks
    Async {
        #[serde(rename = "callbackIds")]
        callback_ids: Vec<String>,
    },
    /// Waiting on a single delegated task
    Task {
        #[serde(rename = "taskId")]
        task_id: String,
    },
    /// Waiting on one task of a chain; later tasks are queued behind it
    TaskChain {
        #[serde(rename = "taskId")]
        task_id: String,
        #[serde(rename = "chainEnd", default)]
        chain_end: bool,
    },
    /// Delegated to a single child node
    Child {
        #[serde(rename = "childNodeId")]
        child_node_id: String,
    },
    /// Delegated to several child nodes running side by side
    Children {
        #[serde(rename = "childNodeIds")]
        child_node_ids: Vec<String>,
        #[serde(rename = "maxConcurrency", default)]
        max_concurrency: Option<u32>,
    },
    /// Delegated to children one after another
    ChildChain {
        #[serde(rename = "nextChildId")]
        next_child_id: String,
        #[serde(rename = "previousChildId", default)]
        previous_child_id: Option<String>,
        #[serde(rename = "lastLink", default)]
        last_link: bool,
    },
}

/// Payload-free tag of a [`SuspensionMode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SuspensionKind {
    Sync,
    Async,
    Task,
    TaskChain,
    Child,
    Children,
    ChildChain,
}

impl SuspensionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sync => "sync",
            Self::Async => "async",
            Self::Task => "task",
            Self::TaskChain => "taskChain",
            Self::Child => "child",
            Self::Children => "children",
            Self::ChildChain => "childChain",
        }
    }
}

impl fmt::Display for SuspensionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl SuspensionMode {
    pub fn kind(&self) -> SuspensionKind {
        match self {
            Self::Sync => SuspensionKind::Sync,
            Self::Async { .. } => SuspensionKind::Async,
            Self::Task { .. } => SuspensionKind::Task,
            Self::TaskChain { .. } => SuspensionKind::TaskChain,
            Self::Child { .. } => SuspensionKind::Child,
            Self::Children { .. } => SuspensionKind::Children,
            Self::ChildChain { .. } => SuspensionKind::ChildChain,
        }
    }

    /// Check if the node handed its execution to descendant nodes
    pub fn delegates_to_descendants(&self) -> bool {
        matches!(
            self,
            Self::Child { .. } | Self::Children { .. } | Self::ChildChain { .. }
        )
    }
}

/// What a node's executor reported when it parked. `mode` is unset for nodes that
/// never suspended.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuspensionResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<SuspensionMode>,
}

impl SuspensionResponse {
    pub fn new(mode: SuspensionMode) -> Self {
        Self { mode: Some(mode) }
    }

    pub fn unset() -> Self {
        Self::default()
    }

    pub fn kind(&self) -> Option<SuspensionKind> {
        self.mode.as_ref().map(SuspensionMode::kind)
    }
}

impl From<SuspensionMode> for SuspensionResponse {
    fn from(mode: SuspensionMode) -> Self {
        Self::new(mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names() {
        assert_eq!(SuspensionKind::TaskChain.to_string(), "taskChain");
        assert_eq!(SuspensionKind::ChildChain.to_string(), "childChain");
        assert_eq!(SuspensionKind::Children.to_string(), "children");
    }

    #[test]
    fn test_delegating_modes() {
        let child = SuspensionMode::Child {
            child_node_id: "n1".to_string(),
        };
        let task = SuspensionMode::Task {
            task_id: "t1".to_string(),
        };

        assert!(child.delegates_to_descendants());
        assert!(!task.delegates_to_descendants());
        assert!(!SuspensionMode::Sync.delegates_to_descendants());
        assert_eq!(child.kind(), SuspensionKind::Child);
    }

    #[test]
    fn test_mode_serde_is_tagged() {
        let mode = SuspensionMode::Async {
            callback_ids: vec!["cb-1".to_string(), "cb-2".to_string()],
        };
        let json = serde_json::to_value(&mode).unwrap();
        assert_eq!(json["mode"], "async");
        assert_eq!(json["callbackIds"][1], "cb-2");

        let parsed: SuspensionMode = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, mode);
    }

    #[test]
    fn test_unset_response_has_no_kind() {
        assert_eq!(SuspensionResponse::unset().kind(), None);
        assert_eq!(
            SuspensionResponse::from(SuspensionMode::Sync).kind(),
            Some(SuspensionKind::Sync)
        );
    }
}
