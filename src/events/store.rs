use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

use crate::error::{EngineError, EngineResult};
use crate::interrupt::SuspensionResponse;
use crate::status::Status;

/// Persistence the event handler reads and writes node state through
#[async_trait]
pub trait NodeStatusStore: Send + Sync {
    /// Record the status of a node, filed under its parent when it has one
    async fn record_status(
        &self,
        parent_id: Option<&str>,
        node_execution_id: &str,
        status: Status,
    ) -> EngineResult<()>;

    async fn node_status(&self, node_execution_id: &str) -> EngineResult<Option<Status>>;

    /// Statuses of every child recorded under `parent_id`
    async fn sibling_statuses(&self, parent_id: &str) -> EngineResult<Vec<Status>>;

    async fn record_suspension(
        &self,
        node_execution_id: &str,
        response: SuspensionResponse,
    ) -> EngineResult<()>;

    /// Last suspension reported for a node; unset when it never parked
    async fn suspension_response(&self, node_execution_id: &str)
        -> EngineResult<SuspensionResponse>;
}

#[derive(Debug, Default)]
struct StoreState {
    statuses: HashMap<String, Status>,
    children: HashMap<String, Vec<String>>,
    parents: HashMap<String, String>,
    suspensions: HashMap<String, SuspensionResponse>,
}

/// In-process store for tests and embedding
#[derive(Debug, Default)]
pub struct InMemoryNodeStatusStore {
    state: RwLock<StoreState>,
}

impl InMemoryNodeStatusStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node_count(&self) -> usize {
        self.state.read().statuses.len()
    }
}

#[async_trait]
impl NodeStatusStore for InMemoryNodeStatusStore {
    async fn record_status(
        &self,
        parent_id: Option<&str>,
        node_execution_id: &str,
        status: Status,
    ) -> EngineResult<()> {
        let mut state = self.state.write();

        if let Some(parent_id) = parent_id {
            match state.parents.get(node_execution_id) {
                Some(existing) if existing != parent_id => {
                    return Err(EngineError::StoreError(format!(
                        "Node {node_execution_id} already recorded under parent {existing}, not {parent_id}"
                    )));
                }
                Some(_) => {}
                None => {
                    state
                        .parents
                        .insert(node_execution_id.to_string(), parent_id.to_string());
                    state
                        .children
                        .entry(parent_id.to_string())
                        .or_default()
                        .push(node_execution_id.to_string());
                }
            }
        }

        state
            .statuses
            .insert(node_execution_id.to_string(), status);
        Ok(())
    }

    async fn node_status(&self, node_execution_id: &str) -> EngineResult<Option<Status>> {
        Ok(self.state.read().statuses.get(node_execution_id).copied())
    }

    async fn sibling_statuses(&self, parent_id: &str) -> EngineResult<Vec<Status>> {
        let state = self.state.read();
        let statuses = state
            .children
            .get(parent_id)
            .map(|children| {
                children
                    .iter()
                    .filter_map(|child| state.statuses.get(child).copied())
                    .collect()
            })
            .unwrap_or_default();
        Ok(statuses)
    }

    async fn record_suspension(
        &self,
        node_execution_id: &str,
        response: SuspensionResponse,
    ) -> EngineResult<()> {
        self.state
            .write()
            .suspensions
            .insert(node_execution_id.to_string(), response);
        Ok(())
    }

    async fn suspension_response(
        &self,
        node_execution_id: &str,
    ) -> EngineResult<SuspensionResponse> {
        Ok(self
            .state
            .read()
            .suspensions
            .get(node_execution_id)
            .cloned()
            .unwrap_or_default())
    }
}
