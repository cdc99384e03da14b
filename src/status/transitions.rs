//! Allowed-start policy: which statuses a node may move into a given status from.
//!
//! This is business policy, not something derivable from the rollup ladder, so it
//! is spelled out entry by entry.

use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

use super::groups::{BROKE_STATUSES, INTERRUPTIBLE_STATUSES};
use super::states::Status;

/// Attempted status -> statuses a node may currently be in to make that transition
pub type AllowedStartMap = HashMap<Status, HashSet<Status>>;

static ALLOWED_START_MAP: OnceLock<AllowedStartMap> = OnceLock::new();
static EMPTY_SET: OnceLock<HashSet<Status>> = OnceLock::new();

fn set(statuses: &[Status]) -> HashSet<Status> {
    statuses.iter().copied().collect()
}

fn union(groups: &[&[Status]]) -> HashSet<Status> {
    groups.iter().flat_map(|g| g.iter().copied()).collect()
}

/// Build the allowed-start map
pub fn build_allowed_start_map() -> AllowedStartMap {
    use Status::*;

    let mut map = HashMap::new();

    // Resuming a paused node puts it back in the queue
    map.insert(Queued, set(&[Paused, Pausing]));

    map.insert(
        Running,
        set(&[
            Queued,
            AsyncWaiting,
            TaskWaiting,
            TimedWaiting,
            ResourceWaiting,
            Pausing,
            Paused,
            ApprovalWaiting,
            InterventionWaiting,
        ]),
    );

    // Parking on machinery
    for parked in [AsyncWaiting, TaskWaiting, TimedWaiting, ResourceWaiting] {
        map.insert(parked, set(&[Queued, Running]));
    }
    map.insert(ApprovalWaiting, set(&[Queued, Running, AsyncWaiting]));
    map.insert(InterventionWaiting, set(BROKE_STATUSES));

    // Pause requests
    map.insert(
        Pausing,
        set(&[Queued, Running, AsyncWaiting, TaskWaiting, TimedWaiting]),
    );
    map.insert(
        Paused,
        set(&[
            Queued,
            Running,
            Pausing,
            AsyncWaiting,
            TaskWaiting,
            TimedWaiting,
            ResourceWaiting,
        ]),
    );

    // Teardown. A forced timeout can land a node in EXPIRED while it is already
    // discontinuing, and a discontinuing node may have been expired by its parent.
    map.insert(
        Discontinuing,
        union(&[INTERRUPTIBLE_STATUSES, &[Expired]]),
    );
    map.insert(Aborted, union(&[INTERRUPTIBLE_STATUSES, &[Discontinuing]]));
    map.insert(Expired, union(&[INTERRUPTIBLE_STATUSES, &[Discontinuing]]));

    // Normal completion
    for finished in [Failed, Errored, Skipped, Suspended] {
        map.insert(finished, union(&[INTERRUPTIBLE_STATUSES, &[Discontinuing]]));
    }

    // Operator overrides of a broken node
    map.insert(
        Succeeded,
        union(&[INTERRUPTIBLE_STATUSES, &[Discontinuing], BROKE_STATUSES]),
    );
    map.insert(
        IgnoreFailed,
        union(&[INTERRUPTIBLE_STATUSES, &[Discontinuing], BROKE_STATUSES]),
    );

    map.insert(Unrecognized, HashSet::new());

    map
}

/// Statuses a node may be in when it moves to `status`
pub fn node_allowed_start_set(status: Status) -> &'static HashSet<Status> {
    ALLOWED_START_MAP
        .get_or_init(build_allowed_start_map)
        .get(&status)
        .unwrap_or_else(|| EMPTY_SET.get_or_init(HashSet::new))
}

pub fn is_transition_allowed(from: Status, to: Status) -> bool {
    node_allowed_start_set(to).contains(&from)
}
