// Steward Configuration
// Loaded upstream (see steward-daemon); consumed read-only here

use crate::domain::QueueConfig;
use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};

/// Default engine address
pub const DEFAULT_TARGET: &str = "127.0.0.1:7233";

/// Default engine namespace
pub const DEFAULT_NAMESPACE: &str = "default";

/// Queue used when nothing else resolves
pub const DEFAULT_QUEUE: &str = "DEFAULT_WORKER_QUEUE";

/// Operator-supplied settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StewardConfig {
    /// Enable or disable Steward entirely
    pub enabled: bool,

    /// Engine service address (e.g. "127.0.0.1:7233")
    pub target: String,

    pub namespace: String,

    /// Queue for types not explicitly configured
    pub default_queue: String,

    /// Derive queue names from type names (OrderWorkflow -> ORDER_WORKFLOW_QUEUE)
    pub auto_naming: bool,

    /// Auto-discover activity implementations
    pub auto_pilot: bool,

    /// Restrict auto-discovery to identifiers under this path (e.g. "shop::pizza")
    pub scan_base_package: Option<String>,

    /// Manual queue bindings (always win over auto-discovery)
    pub queues: Vec<QueueConfig>,
}

impl Default for StewardConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            target: DEFAULT_TARGET.to_string(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            default_queue: DEFAULT_QUEUE.to_string(),
            auto_naming: true,
            auto_pilot: true,
            scan_base_package: None,
            queues: Vec::new(),
        }
    }
}

impl StewardConfig {
    pub fn with_queue(mut self, queue: QueueConfig) -> Self {
        self.queues.push(queue);
        self
    }

    /// Whether the auto-discovery pass runs at all
    pub fn auto_discovery_enabled(&self) -> bool {
        self.auto_pilot || self.auto_naming
    }

    /// Effective scan base; a blank value means no restriction
    pub fn scan_scope(&self) -> Option<&str> {
        self.scan_base_package
            .as_deref()
            .map(|base| base.trim().trim_end_matches("::"))
            .filter(|base| !base.is_empty())
    }

    /// Validate settings the core depends on
    ///
    /// # Errors
    /// - AppError::Config if the default queue is blank or a manual entry is malformed
    pub fn validate(&self) -> Result<()> {
        if self.default_queue.trim().is_empty() {
            return Err(AppError::Config("default_queue cannot be empty".to_string()));
        }

        if self.target.trim().is_empty() {
            return Err(AppError::Config("target cannot be empty".to_string()));
        }

        for queue in &self.queues {
            queue
                .validate()
                .map_err(|e| AppError::Config(e.to_string()))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StewardConfig::default();
        assert!(config.enabled);
        assert!(config.auto_naming);
        assert!(config.auto_pilot);
        assert_eq!(config.default_queue, "DEFAULT_WORKER_QUEUE");
        assert_eq!(config.target, "127.0.0.1:7233");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_deserialize_keeps_defaults() {
        let config: StewardConfig = serde_json::from_value(serde_json::json!({
            "auto_naming": false,
            "queues": [{"name": "KITCHEN_QUEUE", "activities": ["KitchenActivitiesImpl"]}]
        }))
        .unwrap();

        assert!(!config.auto_naming);
        assert!(config.auto_pilot);
        assert_eq!(config.queues.len(), 1);
        assert!(config.queues[0].workflows.is_empty());
        assert_eq!(config.queues[0].activities, vec!["KitchenActivitiesImpl"]);
    }

    #[test]
    fn test_validate_rejects_blank_default_queue() {
        let config = StewardConfig {
            default_queue: " ".to_string(),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("default_queue"));
    }

    #[test]
    fn test_blank_scan_base_is_unrestricted() {
        let mut config = StewardConfig {
            scan_base_package: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(config.scan_scope(), None);

        config.scan_base_package = Some("  ".to_string());
        assert_eq!(config.scan_scope(), None);

        config.scan_base_package = Some("shop::pizza::".to_string());
        assert_eq!(config.scan_scope(), Some("shop::pizza"));
    }

    #[test]
    fn test_validate_rejects_unnamed_manual_queue() {
        let config = StewardConfig::default().with_queue(QueueConfig::new(""));
        assert!(matches!(config.validate(), Err(AppError::Config(_))));
    }

    #[test]
    fn test_auto_discovery_gate() {
        let config = StewardConfig {
            auto_naming: false,
            auto_pilot: false,
            ..Default::default()
        };
        assert!(!config.auto_discovery_enabled());
    }
}
