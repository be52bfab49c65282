use chrono::Utc;
use std::sync::Arc;

use crate::server::agents::{Agent, AgentRegistry, AgentStatus};
use crate::server::catalog::CommandCatalog;
use crate::server::error::Result;
use crate::server::results::{ResultCorrelator, TaskResult};
use crate::server::tasks::{Task, TaskLedger};

/// What a beacon hands back per task. The agent id is implicit in the poll
/// and is not re-sent.
#[derive(Clone, Debug)]
pub struct TaskDelivery {
    pub task_id: String,
    pub command: String,
}

/// Agent detail view: the record, its derived status, and its tasks joined
/// with their results, most recent first.
#[derive(Clone, Debug)]
pub struct AgentDetail {
    pub agent: Agent,
    pub status: AgentStatus,
    pub tasks: Vec<(Task, Option<TaskResult>)>,
}

/// The facade the transport layer talks to. Owns the registry, the catalog,
/// the ledger, and the correlator; every operation fails fast and surfaces
/// its error unchanged.
#[derive(Debug)]
pub struct Coordinator {
    registry: Arc<AgentRegistry>,
    catalog: CommandCatalog,
    ledger: Arc<TaskLedger>,
    correlator: ResultCorrelator,
}

impl Coordinator {
    pub fn new() -> Self {
        let registry = Arc::new(AgentRegistry::new());
        let ledger = Arc::new(TaskLedger::new());
        let correlator = ResultCorrelator::new(Arc::clone(&registry), Arc::clone(&ledger));

        Self {
            registry,
            catalog: CommandCatalog::new(),
            ledger,
            correlator,
        }
    }

    pub fn catalog(&self) -> &CommandCatalog {
        &self.catalog
    }

    /// Registers an agent and creates its empty task list. Never fails.
    pub async fn register_agent(
        &self,
        display_name: String,
        os_info: String,
        source_address: String,
    ) -> Agent {
        let agent = self
            .registry
            .register(display_name, os_info, source_address)
            .await;
        self.ledger.init_agent(&agent.id).await;
        agent
    }

    /// The beacon contract: touch liveness, then atomically pull-and-dispatch
    /// every pending task for this agent.
    pub async fn beacon(&self, agent_id: &str) -> Result<Vec<TaskDelivery>> {
        self.registry.touch(agent_id).await?;

        let pulled = self.ledger.pull_undelivered(agent_id).await?;
        Ok(pulled
            .into_iter()
            .map(|task| TaskDelivery {
                task_id: task.id,
                command: task.command,
            })
            .collect())
    }

    pub async fn enqueue_command(&self, agent_id: &str, command_key: &str) -> Result<Task> {
        self.ledger.enqueue(agent_id, command_key, &self.catalog).await
    }

    pub async fn submit_result(
        &self,
        task_id: &str,
        agent_id: &str,
        output: String,
        outcome: String,
    ) -> Result<TaskResult> {
        self.correlator.submit(task_id, agent_id, output, outcome).await
    }

    pub async fn get_result(&self, task_id: &str) -> Result<TaskResult> {
        self.correlator.get(task_id).await
    }

    /// Pure projection: every agent with its status at the time of the call.
    pub async fn list_agents(&self) -> Vec<(Agent, AgentStatus)> {
        let now = Utc::now();
        self.registry
            .list()
            .await
            .into_iter()
            .map(|agent| {
                let status = agent.status(now);
                (agent, status)
            })
            .collect()
    }

    pub async fn agent_detail(&self, agent_id: &str) -> Result<AgentDetail> {
        let agent = self.registry.get(agent_id).await?;
        let status = agent.status(Utc::now());

        // Creation order reversed: most recent first.
        let mut tasks = self.ledger.tasks_for(agent_id).await?;
        tasks.reverse();

        let mut joined = Vec::with_capacity(tasks.len());
        for task in tasks {
            let result = self.correlator.for_task(&task.id).await;
            joined.push((task, result));
        }

        Ok(AgentDetail {
            agent,
            status,
            tasks: joined,
        })
    }
}

impl Default for Coordinator {
    fn default() -> Self {
        Self::new()
    }
}
