use chrono::{DateTime, Utc};
use log::info;
use std::collections::HashMap;
use tokio::sync::Mutex;

use crate::server::catalog::CommandCatalog;
use crate::server::error::{CoordinatorError, Result};
use crate::utils::random::random_id;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskStatus {
    Pending,
    Dispatched,
    Completed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Dispatched => "dispatched",
            TaskStatus::Completed => "completed",
        }
    }
}

#[derive(Clone, Debug)]
pub struct Task {
    pub id: String,
    pub agent_id: String,
    pub command: String,
    pub created_at: DateTime<Utc>,
    pub status: TaskStatus,
}

/// Owns the per-agent task lists and is the only writer of task status.
/// Status advances pending -> dispatched -> completed and never regresses.
#[derive(Debug)]
pub struct TaskLedger {
    tasks: Mutex<HashMap<String, Vec<Task>>>,
}

impl TaskLedger {
    pub fn new() -> Self {
        Self {
            tasks: Mutex::new(HashMap::new()),
        }
    }

    /// Creates the empty task list for a newly registered agent.
    pub async fn init_agent(&self, agent_id: &str) {
        let mut tasks = self.tasks.lock().await;
        tasks.entry(agent_id.to_string()).or_default();
    }

    /// Validates the command key against the catalog and appends a pending
    /// task to the agent's list.
    pub async fn enqueue(
        &self,
        agent_id: &str,
        command_key: &str,
        catalog: &CommandCatalog,
    ) -> Result<Task> {
        let mut tasks = self.tasks.lock().await;

        let list = tasks
            .get_mut(agent_id)
            .ok_or_else(|| CoordinatorError::NotFound(format!("Agent `{agent_id}`")))?;

        let command = catalog.resolve(command_key)?;

        let mut id = random_id("task");
        while list.iter().any(|t| t.id == id) {
            id = random_id("task");
        }

        let task = Task {
            id,
            agent_id: agent_id.to_string(),
            command,
            created_at: Utc::now(),
            status: TaskStatus::Pending,
        };
        list.push(task.clone());

        info!("Task `{}` queued for agent `{agent_id}`.", task.id);
        Ok(task)
    }

    /// Selects every pending task for the agent and transitions it to
    /// dispatched in the same critical section, so two concurrent beacons
    /// never both receive the same task. Dispatched tasks are not
    /// re-delivered.
    pub async fn pull_undelivered(&self, agent_id: &str) -> Result<Vec<Task>> {
        let mut tasks = self.tasks.lock().await;

        let list = tasks
            .get_mut(agent_id)
            .ok_or_else(|| CoordinatorError::NotFound(format!("Agent `{agent_id}`")))?;

        let mut pulled = Vec::new();
        for task in list.iter_mut() {
            if task.status == TaskStatus::Pending {
                task.status = TaskStatus::Dispatched;
                pulled.push(task.clone());
            }
        }

        if !pulled.is_empty() {
            info!("Dispatched {} task(s) to agent `{agent_id}`.", pulled.len());
        }
        Ok(pulled)
    }

    /// Transitions dispatched -> completed. A result cannot precede
    /// dispatch, and a completed task never transitions again.
    pub async fn finalize(&self, task_id: &str, agent_id: &str) -> Result<Task> {
        let mut tasks = self.tasks.lock().await;

        let list = tasks
            .get_mut(agent_id)
            .ok_or_else(|| CoordinatorError::NotFound(format!("Agent `{agent_id}`")))?;

        let task = list
            .iter_mut()
            .find(|t| t.id == task_id)
            .ok_or_else(|| CoordinatorError::NotFound(format!("Task `{task_id}`")))?;

        match task.status {
            TaskStatus::Pending => Err(CoordinatorError::InvalidState(format!(
                "Task `{task_id}` has not been dispatched yet"
            ))),
            TaskStatus::Completed => Err(CoordinatorError::InvalidState(format!(
                "Task `{task_id}` is already completed"
            ))),
            TaskStatus::Dispatched => {
                task.status = TaskStatus::Completed;
                Ok(task.clone())
            }
        }
    }

    /// Read-only projection of the agent's tasks in creation order.
    pub async fn tasks_for(&self, agent_id: &str) -> Result<Vec<Task>> {
        let tasks = self.tasks.lock().await;
        tasks
            .get(agent_id)
            .cloned()
            .ok_or_else(|| CoordinatorError::NotFound(format!("Agent `{agent_id}`")))
    }
}

impl Default for TaskLedger {
    fn default() -> Self {
        Self::new()
    }
}
