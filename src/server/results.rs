use chrono::{DateTime, Utc};
use log::info;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::server::agents::AgentRegistry;
use crate::server::error::{CoordinatorError, Result};
use crate::server::tasks::TaskLedger;

/// A single outcome report correlated to one task. Immutable once stored.
#[derive(Clone, Debug)]
pub struct TaskResult {
    pub task_id: String,
    pub agent_id: String,
    pub output: String,
    pub reported_at: DateTime<Utc>,
    pub outcome: String,
}

/// Accepts reported results, validates them against the ledger and the
/// registry, finalizes the task, and stores the result keyed by task id.
/// At most one result per task: re-submission is rejected with `Conflict`,
/// never overwritten.
#[derive(Debug)]
pub struct ResultCorrelator {
    registry: Arc<AgentRegistry>,
    ledger: Arc<TaskLedger>,
    results: Mutex<HashMap<String, TaskResult>>,
}

impl ResultCorrelator {
    pub fn new(registry: Arc<AgentRegistry>, ledger: Arc<TaskLedger>) -> Self {
        Self {
            registry,
            ledger,
            results: Mutex::new(HashMap::new()),
        }
    }

    /// The duplicate check runs before `finalize`, so re-submitting an
    /// already-resolved task surfaces `Conflict` rather than `InvalidState`.
    /// The result map stays locked until the insert, which serializes
    /// submissions for the same task id.
    pub async fn submit(
        &self,
        task_id: &str,
        agent_id: &str,
        output: String,
        outcome: String,
    ) -> Result<TaskResult> {
        if !self.registry.exists(agent_id).await {
            return Err(CoordinatorError::NotFound(format!("Agent `{agent_id}`")));
        }

        let mut results = self.results.lock().await;

        if results.contains_key(task_id) {
            return Err(CoordinatorError::Conflict(format!(
                "Task `{task_id}` already has a result"
            )));
        }

        let task = self.ledger.finalize(task_id, agent_id).await?;

        let result = TaskResult {
            task_id: task.id.clone(),
            agent_id: agent_id.to_string(),
            output,
            reported_at: Utc::now(),
            outcome,
        };
        results.insert(task.id, result.clone());

        info!("Result stored for task `{task_id}`.");
        Ok(result)
    }

    pub async fn get(&self, task_id: &str) -> Result<TaskResult> {
        let results = self.results.lock().await;
        results
            .get(task_id)
            .cloned()
            .ok_or_else(|| CoordinatorError::NotFound(format!("Result for task `{task_id}`")))
    }

    /// Join helper for the agent detail view.
    pub async fn for_task(&self, task_id: &str) -> Option<TaskResult> {
        let results = self.results.lock().await;
        results.get(task_id).cloned()
    }
}
