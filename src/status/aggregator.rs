//! # Status Rollup
//!
//! Reduces the statuses of a parent's children to the parent's status. The
//! precedence ladder is fixed; the first rung matched by any child decides.
//!
//! | rung | any child is                         | parent                 |
//! |------|--------------------------------------|------------------------|
//! | 1    | `FAILED`                             | `FAILED`               |
//! | 2    | `ERRORED`                            | `ERRORED`              |
//! | 3    | `EXPIRED`                            | `EXPIRED`              |
//! | 4    | `ABORTED`                            | `ABORTED`              |
//! | 5    | `INTERVENTION_WAITING`               | `INTERVENTION_WAITING` |
//! | 6    | `APPROVAL_WAITING`                   | `APPROVAL_WAITING`     |
//! | 7    | `PAUSED`, and none strictly `RUNNING`| `PAUSED`               |
//! | 8    | active (see [`Status::is_active`])   | `RUNNING`              |
//! | 8    | `QUEUED`                             | `QUEUED`               |
//! | 9    | `IGNORE_FAILED`                      | `IGNORE_FAILED`        |
//! | 10   | anything else, or no children        | `SUCCEEDED`            |
//!
//! `IGNORE_FAILED` only outranks the success class: a paused or running sibling
//! still decides the parent.

use std::collections::BTreeMap;
use tracing::warn;

use super::states::Status;

/// Parent status for the given child statuses.
///
/// `run_id` is only used to attribute the diagnostic logged when a child carries
/// a status this build does not recognize.
pub fn calculate_status(child_statuses: &[Status], run_id: &str) -> Status {
    let any = |status: Status| child_statuses.contains(&status);

    let unrecognized = child_statuses
        .iter()
        .filter(|s| **s == Status::Unrecognized)
        .count();
    if unrecognized > 0 {
        warn!(
            run_id = %run_id,
            unrecognized = unrecognized,
            children = child_statuses.len(),
            "Unrecognized child status treated as lowest precedence"
        );
    }

    if any(Status::Failed) {
        Status::Failed
    } else if any(Status::Errored) {
        Status::Errored
    } else if any(Status::Expired) {
        Status::Expired
    } else if any(Status::Aborted) {
        Status::Aborted
    } else if any(Status::InterventionWaiting) {
        Status::InterventionWaiting
    } else if any(Status::ApprovalWaiting) {
        Status::ApprovalWaiting
    } else if any(Status::Paused) && !any(Status::Running) {
        Status::Paused
    } else if child_statuses.iter().any(Status::is_active) {
        Status::Running
    } else if any(Status::Queued) {
        Status::Queued
    } else if any(Status::IgnoreFailed) {
        Status::IgnoreFailed
    } else {
        Status::Succeeded
    }
}

/// Roll up children per group, e.g. per stage when a parent fans out into several
pub fn calculate_status_by_group<I, G>(children: I, run_id: &str) -> BTreeMap<String, Status>
where
    I: IntoIterator<Item = (G, Status)>,
    G: Into<String>,
{
    let mut grouped: BTreeMap<String, Vec<Status>> = BTreeMap::new();
    for (group, status) in children {
        grouped.entry(group.into()).or_default().push(status);
    }

    grouped
        .into_iter()
        .map(|(group, statuses)| {
            let rolled = calculate_status(&statuses, run_id);
            (group, rolled)
        })
        .collect()
}
