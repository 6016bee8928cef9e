// ID Provider Port (for deterministic testing)

/// ID provider interface (allows deterministic workflow IDs in tests)
pub trait IdProvider: Send + Sync {
    /// Generate a new unique workflow ID
    fn generate_id(&self) -> String;
}

/// UUID v4 provider (production)
pub struct UuidProvider;

impl IdProvider for UuidProvider {
    fn generate_id(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

/// Sequential provider (`{prefix}-1`, `{prefix}-2`, ...) for tests
pub struct SequentialIdProvider {
    prefix: String,
    next: std::sync::atomic::AtomicU64,
}

impl SequentialIdProvider {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: std::sync::atomic::AtomicU64::new(1),
        }
    }
}

impl IdProvider for SequentialIdProvider {
    fn generate_id(&self) -> String {
        let n = self
            .next
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        format!("{}-{}", self.prefix, n)
    }
}
