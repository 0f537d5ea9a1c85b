use thiserror::Error;

/// Failures raised by the infrastructure adapters: pool and migration
/// problems, the network listener, telemetry install, and identity client
/// construction.
#[derive(Debug, Error)]
pub enum InfraError {
    #[error("listener error: {0}")]
    Listener(#[from] std::io::Error),
    #[error("database error: {message}")]
    Database { message: String },
    #[error("telemetry setup failed: {0}")]
    Telemetry(String),
    #[error("identity client configuration error: {message}")]
    Configuration { message: String },
}

impl InfraError {
    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn telemetry(message: impl Into<String>) -> Self {
        Self::Telemetry(message.into())
    }
}
