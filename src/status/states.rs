use serde::{Deserialize, Serialize};
use std::fmt;

/// Execution status of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    /// Accepted but not yet started
    Queued,
    /// Executing on a worker
    Running,
    /// Parked until an async callback arrives
    AsyncWaiting,
    /// Parked until a delegated task responds
    TaskWaiting,
    /// Parked on a timer
    TimedWaiting,
    /// Parked until a resource constraint frees up
    ResourceWaiting,
    /// Pause requested, not yet effective
    Pausing,
    /// Paused by an operator
    Paused,
    /// Waiting for an approval decision
    ApprovalWaiting,
    /// Waiting for manual intervention after a failure
    InterventionWaiting,
    /// Being torn down after an abort or a timeout
    Discontinuing,
    Succeeded,
    /// Failed, but the failure strategy says to carry on
    IgnoreFailed,
    Skipped,
    Suspended,
    Aborted,
    Expired,
    Errored,
    Failed,
    /// Value from a newer producer that this build does not know about
    #[serde(other)]
    Unrecognized,
}

impl Status {
    pub const ALL: [Status; 20] = [
        Status::Queued,
        Status::Running,
        Status::AsyncWaiting,
        Status::TaskWaiting,
        Status::TimedWaiting,
        Status::ResourceWaiting,
        Status::Pausing,
        Status::Paused,
        Status::ApprovalWaiting,
        Status::InterventionWaiting,
        Status::Discontinuing,
        Status::Succeeded,
        Status::IgnoreFailed,
        Status::Skipped,
        Status::Suspended,
        Status::Aborted,
        Status::Expired,
        Status::Errored,
        Status::Failed,
        Status::Unrecognized,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "QUEUED",
            Self::Running => "RUNNING",
            Self::AsyncWaiting => "ASYNC_WAITING",
            Self::TaskWaiting => "TASK_WAITING",
            Self::TimedWaiting => "TIMED_WAITING",
            Self::ResourceWaiting => "RESOURCE_WAITING",
            Self::Pausing => "PAUSING",
            Self::Paused => "PAUSED",
            Self::ApprovalWaiting => "APPROVAL_WAITING",
            Self::InterventionWaiting => "INTERVENTION_WAITING",
            Self::Discontinuing => "DISCONTINUING",
            Self::Succeeded => "SUCCEEDED",
            Self::IgnoreFailed => "IGNORE_FAILED",
            Self::Skipped => "SKIPPED",
            Self::Suspended => "SUSPENDED",
            Self::Aborted => "ABORTED",
            Self::Expired => "EXPIRED",
            Self::Errored => "ERRORED",
            Self::Failed => "FAILED",
            Self::Unrecognized => "UNRECOGNIZED",
        }
    }

    /// Check if this is a terminal status (the node will not run again on its own)
    pub fn is_final(&self) -> bool {
        matches!(
            self,
            Self::Succeeded
                | Self::IgnoreFailed
                | Self::Skipped
                | Self::Suspended
                | Self::Aborted
                | Self::Expired
                | Self::Errored
                | Self::Failed
        )
    }

    /// Check if this terminal status lets the parent carry on
    pub fn is_positive(&self) -> bool {
        matches!(
            self,
            Self::Succeeded | Self::IgnoreFailed | Self::Skipped | Self::Suspended
        )
    }

    /// Check if this is a failure the user has to act on
    pub fn is_broke(&self) -> bool {
        matches!(self, Self::Failed | Self::Errored | Self::Expired)
    }

    /// Check if the node is in flight, executing or parked on machinery rather than a human
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            Self::Running
                | Self::AsyncWaiting
                | Self::TaskWaiting
                | Self::TimedWaiting
                | Self::ResourceWaiting
                | Self::Pausing
                | Self::Discontinuing
        )
    }

    /// Check if the node is parked on a `*_WAITING` status
    pub fn is_waiting(&self) -> bool {
        matches!(
            self,
            Self::AsyncWaiting
                | Self::TaskWaiting
                | Self::TimedWaiting
                | Self::ResourceWaiting
                | Self::ApprovalWaiting
                | Self::InterventionWaiting
        )
    }

    /// Check if the node is blocked on an operator decision
    pub fn awaits_operator(&self) -> bool {
        matches!(
            self,
            Self::Paused | Self::ApprovalWaiting | Self::InterventionWaiting
        )
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Status::ALL
            .iter()
            .find(|status| status.as_str() == s)
            .copied()
            .ok_or_else(|| format!("Invalid status: {s}"))
    }
}

/// Default status for a freshly created node
impl Default for Status {
    fn default() -> Self {
        Self::Queued
    }
}
