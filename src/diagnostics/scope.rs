//! Scoped binding of correlation fields into the thread's diagnostic context.
//!
//! Fields bound by a [`LogScope`] are visible through [`current_log_fields`] and are
//! recorded on a `log_scope` tracing span for as long as the guard lives. Dropping
//! the guard restores whatever the keys held before, whether the scope ends by
//! return, by `?` or by unwinding.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;
use std::task::{Context, Poll};

use tracing::span::EnteredSpan;

pub type LogFields = BTreeMap<String, String>;

thread_local! {
    static LOG_FIELDS: RefCell<LogFields> = RefCell::new(BTreeMap::new());
}

/// RAII guard for a set of bound diagnostic fields.
///
/// Not `Send`: the binding belongs to the thread that created it.
#[must_use = "fields are unbound as soon as the guard is dropped"]
pub struct LogScope {
    previous: Vec<(String, Option<String>)>,
    _span: EnteredSpan,
    _not_send: PhantomData<*const ()>,
}

impl LogScope {
    pub fn enter<I, K, V>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let fields: Vec<(String, String)> = fields
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();

        let previous: Vec<(String, Option<String>)> = LOG_FIELDS.with(|cell| {
            let mut bound = cell.borrow_mut();
            fields
                .iter()
                .map(|(key, value)| (key.clone(), bound.insert(key.clone(), value.clone())))
                .collect()
        });

        let span = tracing::info_span!("log_scope", fields = %render(&fields)).entered();

        Self {
            previous,
            _span: span,
            _not_send: PhantomData,
        }
    }
}

impl Drop for LogScope {
    fn drop(&mut self) {
        // try_with: the thread-local may already be gone during thread teardown
        let _ = LOG_FIELDS.try_with(|cell| {
            let mut bound = cell.borrow_mut();
            // Reverse order so a key bound twice in one scope ends on its outer value
            for (key, previous) in self.previous.drain(..).rev() {
                match previous {
                    Some(value) => bound.insert(key, value),
                    None => bound.remove(&key),
                };
            }
        });
    }
}

fn render(fields: &[(String, String)]) -> String {
    fields
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Run `body` with `fields` bound, unbinding them on every exit path
pub fn with_log_scope<I, K, V, F, R>(fields: I, body: F) -> R
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
    F: FnOnce() -> R,
{
    let _scope = LogScope::enter(fields);
    body()
}

/// Snapshot of the fields bound on this thread
pub fn current_log_fields() -> LogFields {
    LOG_FIELDS.with(|cell| cell.borrow().clone())
}

pub fn log_field(key: &str) -> Option<String> {
    LOG_FIELDS.with(|cell| cell.borrow().get(key).cloned())
}

/// Future that binds its fields around every poll of the inner future.
///
/// A task on a work-stealing runtime may resume on any worker thread; binding per
/// poll keeps the fields attached to the task rather than to whichever thread
/// happened to run it last. Nothing stays bound between polls or after the
/// future is dropped.
pub struct LogScoped<F> {
    fields: Vec<(String, String)>,
    inner: Pin<Box<F>>,
}

impl<F: Future> Future for LogScoped<F> {
    type Output = F::Output;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        let _scope = LogScope::enter(this.fields.iter().cloned());
        this.inner.as_mut().poll(cx)
    }
}

pub fn with_log_scope_async<I, K, V, F>(fields: I, future: F) -> LogScoped<F>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
    F: Future,
{
    LogScoped {
        fields: fields
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect(),
        inner: Box::pin(future),
    }
}
