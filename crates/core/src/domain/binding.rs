// Type -> Queue Binding Domain Model

use serde::{Deserialize, Serialize};

/// Type identifier of a workflow/activity implementation or interface
pub type TypeName = String;

/// Role a type plays towards the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Workflow,
    Activity,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Workflow => write!(f, "WORKFLOW"),
            Role::Activity => write!(f, "ACTIVITY"),
        }
    }
}

/// Resolved queue for one type (immutable once registered)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeBinding {
    pub type_name: TypeName,
    pub queue: super::QueueId,
    pub role: Role,
}

impl TypeBinding {
    pub fn new(type_name: impl Into<String>, queue: impl Into<String>, role: Role) -> Self {
        Self {
            type_name: type_name.into(),
            queue: queue.into(),
            role,
        }
    }
}
