// Central Error Type for the Application

use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Domain error: {0}")]
    Domain(#[from] crate::domain::DomainError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Engine error: {0}")]
    Engine(#[from] crate::port::EngineError),

    /// A worker pool could not begin serving; startup must abort
    #[error("Worker pool for queue '{queue}' failed to start: {source}")]
    PoolStart {
        queue: String,
        #[source]
        source: crate::port::EngineError,
    },

    /// A manually configured activity has no instance in the component source
    #[error("No component available for activity '{type_name}' configured on queue '{queue}'")]
    MissingComponent { type_name: String, queue: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Errors that must abort the start sequence
    pub fn is_startup_fatal(&self) -> bool {
        matches!(
            self,
            AppError::PoolStart { .. }
                | AppError::MissingComponent { .. }
                | AppError::Engine(_)
                | AppError::Config(_)
        )
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
