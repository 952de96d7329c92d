//! Error types for idlewatch.

use thiserror::Error;

/// Errors that can occur when building or starting an idle detector.
#[derive(Debug, Error)]
pub enum IdleWatchError {
    /// Error extracting configuration from figment.
    #[error("configuration error: {0}")]
    Config(#[from] Box<figment::Error>),

    /// The host loop adapter failed to register the per-iteration hooks.
    ///
    /// This is a host-collaborator failure (e.g. handle exhaustion); the
    /// detector rolls back to `Stopped` and propagates it unchanged.
    #[error("failed to register loop hooks: {0}")]
    HookRegistration(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl IdleWatchError {
    /// Wrap a host adapter error as a hook-registration failure.
    pub fn hook_registration<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::HookRegistration(Box::new(err))
    }
}

/// Result type alias for idlewatch operations.
pub type Result<T> = std::result::Result<T, IdleWatchError>;
