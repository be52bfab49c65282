use chrono::{DateTime, Duration, Utc};
use log::info;
use tokio::sync::Mutex;

use crate::server::error::{CoordinatorError, Result};
use crate::utils::random::random_id;

/// Seconds since the last beacon before an agent is reported inactive.
pub const STALENESS_THRESHOLD_SECS: i64 = 120;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AgentStatus {
    Active,
    Inactive,
}

impl AgentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentStatus::Active => "active",
            AgentStatus::Inactive => "inactive",
        }
    }
}

#[derive(Clone, Debug)]
pub struct Agent {
    pub id: String,
    pub display_name: String,
    pub os_info: String,
    pub source_address: String,
    pub last_seen: DateTime<Utc>,
}

impl Agent {
    pub fn new(
        id: String,
        display_name: String,
        os_info: String,
        source_address: String,
        last_seen: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            display_name,
            os_info,
            source_address,
            last_seen,
        }
    }

    /// Liveness is derived at read time. There is no background sweeper.
    pub fn status(&self, now: DateTime<Utc>) -> AgentStatus {
        if now.signed_duration_since(self.last_seen) < Duration::seconds(STALENESS_THRESHOLD_SECS) {
            AgentStatus::Active
        } else {
            AgentStatus::Inactive
        }
    }
}

/// Owns every agent record. `last_seen` is only advanced through `touch`,
/// which the beacon path calls on each poll.
#[derive(Debug)]
pub struct AgentRegistry {
    agents: Mutex<Vec<Agent>>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self {
            agents: Mutex::new(Vec::new()),
        }
    }

    /// Mints a fresh unique id and stores the record with `last_seen = now`.
    pub async fn register(
        &self,
        display_name: String,
        os_info: String,
        source_address: String,
    ) -> Agent {
        let mut agents = self.agents.lock().await;

        let mut id = random_id("agent");
        while agents.iter().any(|a| a.id == id) {
            id = random_id("agent");
        }

        let agent = Agent::new(id, display_name, os_info, source_address, Utc::now());
        agents.push(agent.clone());

        info!("Agent `{}` registered from {}.", agent.id, agent.source_address);
        agent
    }

    pub async fn touch(&self, agent_id: &str) -> Result<()> {
        let mut agents = self.agents.lock().await;
        match agents.iter_mut().find(|a| a.id == agent_id) {
            Some(agent) => {
                agent.last_seen = Utc::now();
                Ok(())
            }
            None => Err(CoordinatorError::NotFound(format!("Agent `{agent_id}`"))),
        }
    }

    pub async fn get(&self, agent_id: &str) -> Result<Agent> {
        let agents = self.agents.lock().await;
        agents
            .iter()
            .find(|a| a.id == agent_id)
            .cloned()
            .ok_or_else(|| CoordinatorError::NotFound(format!("Agent `{agent_id}`")))
    }

    pub async fn exists(&self, agent_id: &str) -> bool {
        let agents = self.agents.lock().await;
        agents.iter().any(|a| a.id == agent_id)
    }

    /// Insertion order.
    pub async fn list(&self) -> Vec<Agent> {
        self.agents.lock().await.clone()
    }
}

impl Default for AgentRegistry {
    fn default() -> Self {
        Self::new()
    }
}
