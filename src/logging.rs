//! # Structured Logging Module
//!
//! Environment-aware structured logging for context derivation, status rollup and
//! interrupt dispatch. The library never installs a subscriber on its own; services
//! call [`init_structured_logging`] (or [`init_logging_with`]) once at startup.

use std::sync::OnceLock;

use chrono::Utc;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::LoggingConfig;
use crate::status::Status;

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging from the environment
pub fn init_structured_logging() {
    let environment = get_environment();
    let config = LoggingConfig {
        level: get_log_level(&environment),
        environment,
        ..LoggingConfig::default()
    };
    init_logging_with(&config);
}

/// Initialize structured logging from explicit settings. Only the first call has any effect.
pub fn init_logging_with(config: &LoggingConfig) {
    LOGGER_INITIALIZED.get_or_init(|| {
        let filter = || {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level))
        };

        let console = if config.json {
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_level(true)
                .json()
                .with_filter(filter())
                .boxed()
        } else {
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_level(true)
                .with_ansi(config.ansi)
                .with_filter(filter())
                .boxed()
        };

        // Use try_init so an embedding service keeps its own subscriber
        if tracing_subscriber::registry().with(console).try_init().is_err() {
            tracing::debug!(
                "Global tracing subscriber already initialized - continuing with existing subscriber"
            );
        }

        tracing::info!(
            pid = std::process::id(),
            environment = %config.environment,
            level = %config.level,
            json = config.json,
            "STRUCTURED LOGGING: Initialized"
        );
    });
}

/// Get current environment from environment variables
pub(crate) fn get_environment() -> String {
    std::env::var("TASKER_CONTEXT_ENV")
        .or_else(|_| std::env::var("TASKER_ENV"))
        .or_else(|_| std::env::var("APP_ENV"))
        .unwrap_or_else(|_| "development".to_string())
}

/// Get log level based on environment
pub(crate) fn get_log_level(environment: &str) -> String {
    match environment {
        "test" => "debug".to_string(),
        "development" => "debug".to_string(),
        "production" => "info".to_string(),
        _ => "debug".to_string(),
    }
}

/// Log the outcome of rolling child statuses up into a parent
pub fn log_status_rollup(
    run_id: &str,
    parent_id: &str,
    child_count: usize,
    previous: Option<Status>,
    rolled_up: Status,
    transition: bool,
) {
    tracing::info!(
        run_id = %run_id,
        parent_id = %parent_id,
        child_count = child_count,
        previous = previous.map(|s| s.as_str()),
        rolled_up = %rolled_up,
        transition = transition,
        timestamp = %Utc::now().to_rfc3339(),
        "STATUS_ROLLUP"
    );
}

/// Log an interrupt dispatch attempt
pub fn log_interrupt_dispatch(
    interrupt_type: &str,
    node_execution_id: &str,
    mode: Option<&str>,
    status: &str,
    details: Option<&str>,
) {
    tracing::info!(
        interrupt_type = %interrupt_type,
        node_execution_id = %node_execution_id,
        mode = mode,
        status = %status,
        details = details,
        timestamp = %Utc::now().to_rfc3339(),
        "INTERRUPT_DISPATCH"
    );
}

/// Log a context derivation
pub fn log_context_operation(operation: &str, run_id: &str, depth: usize, details: Option<&str>) {
    tracing::debug!(
        operation = %operation,
        run_id = %run_id,
        depth = depth,
        details = details,
        "CONTEXT_OPERATION"
    );
}

/// Log error with full context
pub fn log_error(component: &str, operation: &str, error: &str, context: Option<&str>) {
    tracing::error!(
        component = %component,
        operation = %operation,
        error = %error,
        context = context,
        timestamp = %Utc::now().to_rfc3339(),
        "ERROR"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_detection() {
        std::env::set_var("TASKER_CONTEXT_ENV", "test_override");
        let env = get_environment();
        assert_eq!(env, "test_override");
        std::env::remove_var("TASKER_CONTEXT_ENV");
    }

    #[test]
    fn test_log_level_mapping() {
        assert_eq!(get_log_level("test"), "debug");
        assert_eq!(get_log_level("development"), "debug");
        assert_eq!(get_log_level("production"), "info");
        assert_eq!(get_log_level("unknown"), "debug");
    }

    #[test]
    fn test_init_is_idempotent() {
        let config = LoggingConfig {
            level: "warn".to_string(),
            ..LoggingConfig::default()
        };
        init_logging_with(&config);
        init_logging_with(&config);
        log_context_operation("derive_for_child", "run-1", 2, None);
    }
}
