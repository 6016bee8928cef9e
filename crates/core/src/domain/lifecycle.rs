// Registry Lifecycle State Machine

use super::error::{DomainError, Result};
use serde::{Deserialize, Serialize};

/// Stopped -> Discovering -> Starting -> Running -> Stopping -> Stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LifecycleState {
    Stopped,
    Discovering,
    Starting,
    Running,
    Stopping,
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LifecycleState::Stopped => write!(f, "STOPPED"),
            LifecycleState::Discovering => write!(f, "DISCOVERING"),
            LifecycleState::Starting => write!(f, "STARTING"),
            LifecycleState::Running => write!(f, "RUNNING"),
            LifecycleState::Stopping => write!(f, "STOPPING"),
        }
    }
}

impl LifecycleState {
    /// Validate a transition, returning the target state
    ///
    /// Discovering and Starting may fall back to Stopped when startup aborts.
    pub fn transition(self, to: LifecycleState) -> Result<LifecycleState> {
        use LifecycleState::*;

        let allowed = matches!(
            (self, to),
            (Stopped, Discovering)
                | (Discovering, Starting)
                | (Discovering, Stopped)
                | (Starting, Running)
                | (Starting, Stopped)
                | (Running, Stopping)
                | (Stopping, Stopped)
        );

        if allowed {
            Ok(to)
        } else {
            Err(DomainError::InvalidTransition {
                from: self.to_string(),
                to: to.to_string(),
            })
        }
    }

    pub fn is_serving(self) -> bool {
        self == LifecycleState::Running
    }
}

#[cfg(test)]
mod tests {
    use super::LifecycleState::*;

    #[test]
    fn test_happy_path_transitions() {
        let mut state = Stopped;
        for next in [Discovering, Starting, Running, Stopping, Stopped] {
            state = state.transition(next).unwrap();
        }
        assert_eq!(state, Stopped);
    }

    #[test]
    fn test_startup_abort_returns_to_stopped() {
        assert_eq!(Discovering.transition(Stopped).unwrap(), Stopped);
        assert_eq!(Starting.transition(Stopped).unwrap(), Stopped);
    }

    #[test]
    fn test_invalid_transitions_rejected() {
        assert!(Stopped.transition(Running).is_err());
        assert!(Running.transition(Discovering).is_err());
        let err = Stopping.transition(Running).unwrap_err();
        assert!(err.to_string().contains("STOPPING -> RUNNING"));
    }
}
