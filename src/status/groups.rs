//! Status groupings for validation and rollup logic

use super::states::Status;

/// Statuses after which a node does not run again on its own
pub const FINAL_STATUSES: &[Status] = &[
    Status::Succeeded,
    Status::IgnoreFailed,
    Status::Skipped,
    Status::Suspended,
    Status::Aborted,
    Status::Expired,
    Status::Errored,
    Status::Failed,
];

/// Final statuses that let the parent carry on
pub const POSITIVE_STATUSES: &[Status] = &[
    Status::Succeeded,
    Status::IgnoreFailed,
    Status::Skipped,
    Status::Suspended,
];

/// Final statuses that need a user decision
pub const BROKE_STATUSES: &[Status] = &[Status::Failed, Status::Errored, Status::Expired];

/// Statuses an abort or a timeout can leave behind
pub const ABORT_AND_EXPIRE_STATUSES: &[Status] = &[Status::Aborted, Status::Expired];

/// In-flight statuses that roll up to `RUNNING`
pub const ACTIVE_STATUSES: &[Status] = &[
    Status::Running,
    Status::AsyncWaiting,
    Status::TaskWaiting,
    Status::TimedWaiting,
    Status::ResourceWaiting,
    Status::Pausing,
    Status::Discontinuing,
];

/// Statuses in which a node keeps moving without anyone acting on it
pub const FLOWING_STATUSES: &[Status] = &[
    Status::Queued,
    Status::Running,
    Status::AsyncWaiting,
    Status::TaskWaiting,
    Status::TimedWaiting,
    Status::ResourceWaiting,
    Status::Pausing,
    Status::Discontinuing,
];

/// Statuses a node can be retried from
pub const RETRYABLE_STATUSES: &[Status] = &[
    Status::InterventionWaiting,
    Status::Failed,
    Status::Errored,
    Status::Expired,
];

/// Statuses an abort or expire interrupt may still act on
pub const INTERRUPTIBLE_STATUSES: &[Status] = &[
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
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_groups_agree_with_predicates() {
        for status in Status::ALL {
            assert_eq!(FINAL_STATUSES.contains(&status), status.is_final());
            assert_eq!(POSITIVE_STATUSES.contains(&status), status.is_positive());
            assert_eq!(BROKE_STATUSES.contains(&status), status.is_broke());
            assert_eq!(ACTIVE_STATUSES.contains(&status), status.is_active());
        }
    }

    #[test]
    fn test_flowing_statuses_are_active_or_queued() {
        for status in FLOWING_STATUSES {
            assert!(status.is_active() || *status == Status::Queued);
        }
    }

    #[test]
    fn test_interruptible_statuses_are_never_final() {
        assert!(INTERRUPTIBLE_STATUSES.iter().all(|s| !s.is_final()));
    }
}
