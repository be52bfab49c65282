use crate::server::error::{CoordinatorError, Result};

// The only path from operator-selected intent to an executable string.
// Raw command input never reaches an agent.
const COMMANDS: &[(&str, &str)] = &[
    ("dir", "dir"),
    ("net_user", "net user"),
    ("whoami", "whoami /all"),
    ("ip_config", "ipconfig /all"),
    ("system_info", "systeminfo"),
    ("tasklist", "tasklist"),
    ("exit", "exit"),
];

/// Immutable allow-list mapping a friendly key to the command string
/// delivered to an agent.
#[derive(Debug)]
pub struct CommandCatalog;

impl CommandCatalog {
    pub fn new() -> Self {
        Self
    }

    pub fn resolve(&self, key: &str) -> Result<String> {
        COMMANDS
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, command)| command.to_string())
            .ok_or_else(|| CoordinatorError::UnknownCommand(key.to_string()))
    }

    pub fn keys(&self) -> Vec<&'static str> {
        COMMANDS.iter().map(|(key, _)| *key).collect()
    }

    pub fn len(&self) -> usize {
        COMMANDS.len()
    }

    pub fn is_empty(&self) -> bool {
        COMMANDS.is_empty()
    }
}

impl Default for CommandCatalog {
    fn default() -> Self {
        Self::new()
    }
}
