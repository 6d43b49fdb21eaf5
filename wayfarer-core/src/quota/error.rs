use thiserror::Error;

/// Errors from a [`crate::QuotaLog`] backend.
#[derive(Debug, Error)]
pub enum QuotaLogError {
    /// The storage backend failed.
    #[error("quota log backend failed: {source}")]
    Backend {
        /// Backend error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// A lock guarding the log was poisoned by a panicking writer.
    #[error("quota log lock poisoned")]
    Poisoned,
}

impl QuotaLogError {
    /// Wrap a backend error.
    #[must_use]
    pub fn backend(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Backend {
            source: Box::new(source),
        }
    }
}
