use std::panic::{catch_unwind, AssertUnwindSafe};

use tasker_context::diagnostics::{
    current_log_fields, log_field, with_log_scope, with_log_scope_async, LogScope,
};

#[test]
fn test_scope_unbinds_after_return() {
    let inside = with_log_scope([("runId", "run-1"), ("nodeExecutionId", "node-1")], || {
        current_log_fields()
    });

    assert_eq!(inside.len(), 2);
    assert!(log_field("runId").is_none());
    assert!(log_field("nodeExecutionId").is_none());
}

#[test]
fn test_scope_unbinds_after_panic() {
    let result = catch_unwind(AssertUnwindSafe(|| {
        with_log_scope([("runId", "doomed")], || {
            assert_eq!(log_field("runId").as_deref(), Some("doomed"));
            panic!("handler failure");
        })
    }));

    assert!(result.is_err());
    assert!(current_log_fields().is_empty());
}

#[test]
fn test_nested_scope_restores_sentinel() {
    let _outer = LogScope::enter([("runId", "sentinel")]);

    let _ = catch_unwind(AssertUnwindSafe(|| {
        with_log_scope([("runId", "inner")], || panic!("inner failure"))
    }));

    assert_eq!(log_field("runId").as_deref(), Some("sentinel"));
}

#[test]
fn test_scope_is_per_thread() {
    with_log_scope([("runId", "main-thread")], || {
        let seen = std::thread::spawn(|| log_field("runId")).join().unwrap();
        assert!(seen.is_none());
    });
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_async_scope_survives_yield_points() {
    let handle = tokio::spawn(with_log_scope_async([("runId", "async-1")], async {
        let before = log_field("runId");
        tokio::task::yield_now().await;
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let after = log_field("runId");
        (before, after)
    }));

    let (before, after) = handle.await.unwrap();
    assert_eq!(before.as_deref(), Some("async-1"));
    assert_eq!(after.as_deref(), Some("async-1"));
}

#[tokio::test]
async fn test_cancelled_async_scope_leaves_nothing_bound() {
    let future = with_log_scope_async([("runId", "cancelled")], async {
        tokio::time::sleep(std::time::Duration::from_secs(60)).await;
    });

    let timed_out = tokio::time::timeout(std::time::Duration::from_millis(5), future).await;

    assert!(timed_out.is_err());
    assert!(log_field("runId").is_none());
}

#[tokio::test]
async fn test_concurrent_scopes_do_not_leak_into_each_other() {
    let a = with_log_scope_async([("runId", "a")], async {
        tokio::task::yield_now().await;
        log_field("runId")
    });
    let b = with_log_scope_async([("runId", "b")], async {
        tokio::task::yield_now().await;
        log_field("runId")
    });

    let (a, b) = tokio::join!(a, b);
    assert_eq!(a.as_deref(), Some("a"));
    assert_eq!(b.as_deref(), Some("b"));
    assert!(log_field("runId").is_none());
}
