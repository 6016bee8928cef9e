// Steward Core - Queue Resolution & Worker Registry
// NO infrastructure dependencies (Hexagonal Architecture)

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod port;

pub use application::{RegistryLifecycle, Steward, StubResolver};
pub use config::StewardConfig;
pub use error::{AppError, Result};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
