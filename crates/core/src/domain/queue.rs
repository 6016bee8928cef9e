// Queue Domain Model

use serde::{Deserialize, Serialize};

/// Queue identifier
pub type QueueId = String;

/// Operator-supplied binding of types to one queue
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    pub name: QueueId,
    pub workflows: Vec<String>,
    pub activities: Vec<String>,
}

impl QueueConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_workflow(mut self, type_name: impl Into<String>) -> Self {
        self.workflows.push(type_name.into());
        self
    }

    pub fn with_activity(mut self, type_name: impl Into<String>) -> Self {
        self.activities.push(type_name.into());
        self
    }

    /// Check the entry names a queue and no blank types
    pub fn validate(&self) -> super::error::Result<()> {
        use super::DomainError;

        if self.name.trim().is_empty() {
            return Err(DomainError::EmptyQueueName);
        }

        if let Some(blank) = self
            .workflows
            .iter()
            .chain(&self.activities)
            .find(|t| t.trim().is_empty())
        {
            return Err(DomainError::ValidationError(format!(
                "queue '{}' lists a blank type identifier ({:?})",
                self.name, blank
            )));
        }

        Ok(())
    }
}
