use serde::{Deserialize, Serialize};

use crate::server::agents::{Agent, AgentStatus};
use crate::server::coordinator::{AgentDetail, TaskDelivery};
use crate::server::error::{CoordinatorError, Result};
use crate::server::results::TaskResult;
use crate::server::tasks::Task;
use crate::utils::datetime::format_datetime;

#[derive(Deserialize)]
pub struct RegisterAgentData {
    pub hostname: String,
    pub username: String,
    pub os_info: String,
}

impl RegisterAgentData {
    /// Canonical display name: `hostname\username`.
    pub fn display_name(&self) -> String {
        format!("{}\\{}", self.hostname, self.username)
    }

    pub fn validate(&self) -> Result<()> {
        if self.hostname.trim().is_empty() {
            return Err(CoordinatorError::InvalidRequest(
                "hostname must not be empty".to_string(),
            ));
        }
        if self.username.trim().is_empty() {
            return Err(CoordinatorError::InvalidRequest(
                "username must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Serialize)]
pub struct RegisterAgentResponse {
    pub agent_id: String,
}

#[derive(Serialize)]
pub struct TaskDeliveryData {
    pub task_id: String,
    pub command: String,
}

// Field names are part of the wire contract; deployed agents parse
// `tasksList`, `task_id` and `command` literally.
#[derive(Serialize)]
pub struct BeaconResponse {
    #[serde(rename = "tasksList")]
    pub tasks_list: Vec<TaskDeliveryData>,
}

impl BeaconResponse {
    pub fn from_deliveries(deliveries: Vec<TaskDelivery>) -> Self {
        Self {
            tasks_list: deliveries
                .into_iter()
                .map(|d| TaskDeliveryData {
                    task_id: d.task_id,
                    command: d.command,
                })
                .collect(),
        }
    }
}

#[derive(Deserialize)]
pub struct SendCommandData {
    pub cmd: String,
}

impl SendCommandData {
    pub fn validate(&self) -> Result<()> {
        if self.cmd.trim().is_empty() {
            return Err(CoordinatorError::InvalidRequest(
                "cmd must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Serialize)]
pub struct SendCommandResponse {
    pub task_id: String,
}

#[derive(Deserialize)]
pub struct TaskResultData {
    pub task_id: String,
    pub agent_id: String,
    pub output: String,
    #[serde(default = "default_outcome")]
    pub outcome: String,
}

fn default_outcome() -> String {
    "success".to_string()
}

impl TaskResultData {
    pub fn validate(&self) -> Result<()> {
        if self.task_id.trim().is_empty() {
            return Err(CoordinatorError::InvalidRequest(
                "task_id must not be empty".to_string(),
            ));
        }
        if self.agent_id.trim().is_empty() {
            return Err(CoordinatorError::InvalidRequest(
                "agent_id must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Serialize)]
pub struct AckResponse {
    pub status: String,
}

impl AckResponse {
    pub fn success() -> Self {
        Self {
            status: "success".to_string(),
        }
    }
}

#[derive(Serialize)]
pub struct AgentSummaryData {
    pub id: String,
    pub display_name: String,
    pub os_info: String,
    pub source_address: String,
    pub last_seen: i64,
    pub readable_last_seen: String,
    pub status: String,
}

impl AgentSummaryData {
    pub fn from_agent(agent: &Agent, status: AgentStatus) -> Self {
        Self {
            id: agent.id.to_owned(),
            display_name: agent.display_name.to_owned(),
            os_info: agent.os_info.to_owned(),
            source_address: agent.source_address.to_owned(),
            last_seen: agent.last_seen.timestamp(),
            readable_last_seen: format_datetime(&agent.last_seen),
            status: status.as_str().to_string(),
        }
    }
}

#[derive(Serialize)]
pub struct AgentListResponse {
    pub agents: Vec<AgentSummaryData>,
}

#[derive(Serialize)]
pub struct TaskViewData {
    pub id: String,
    pub command: String,
    pub status: String,
    pub created_at: i64,
    pub readable_created_at: String,
    pub output: String,
    pub outcome: Option<String>,
}

impl TaskViewData {
    pub fn from_task(task: &Task, result: Option<&TaskResult>) -> Self {
        Self {
            id: task.id.to_owned(),
            command: task.command.to_owned(),
            status: task.status.as_str().to_string(),
            created_at: task.created_at.timestamp(),
            readable_created_at: format_datetime(&task.created_at),
            output: result
                .map(|r| r.output.to_owned())
                .unwrap_or_else(|| "No results yet".to_string()),
            outcome: result.map(|r| r.outcome.to_owned()),
        }
    }
}

#[derive(Serialize)]
pub struct AgentDetailResponse {
    pub agent: AgentSummaryData,
    pub commands: Vec<&'static str>,
    pub tasks: Vec<TaskViewData>,
}

impl AgentDetailResponse {
    pub fn from_detail(detail: &AgentDetail, commands: Vec<&'static str>) -> Self {
        Self {
            agent: AgentSummaryData::from_agent(&detail.agent, detail.status),
            commands,
            tasks: detail
                .tasks
                .iter()
                .map(|(task, result)| TaskViewData::from_task(task, result.as_ref()))
                .collect(),
        }
    }
}

#[derive(Serialize)]
pub struct TaskResultResponse {
    pub task_id: String,
    pub agent_id: String,
    pub output: String,
    pub outcome: String,
    pub reported_at: i64,
    pub readable_reported_at: String,
}

impl TaskResultResponse {
    pub fn from_result(result: &TaskResult) -> Self {
        Self {
            task_id: result.task_id.to_owned(),
            agent_id: result.agent_id.to_owned(),
            output: result.output.to_owned(),
            outcome: result.outcome.to_owned(),
            reported_at: result.reported_at.timestamp(),
            readable_reported_at: format_datetime(&result.reported_at),
        }
    }
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub detail: String,
}
