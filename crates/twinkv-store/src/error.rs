/// Errors from store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Missing or malformed initialisation options.
    #[error("configuration error: {0}")]
    Config(String),

    /// Failure inside the embedded engine.
    #[error("storage error: {0}")]
    Storage(#[from] redb::Error),

    /// The handle was already closed.
    #[error("store is closed")]
    Closed,

    /// Transport or remote service failure.
    #[error("network error: {0}")]
    Network(String),

    /// The key, item, or its container is absent.
    #[error("key not found: {key}")]
    NotFound { key: String },

    /// Enumerating or dropping a container that does not exist.
    #[error("no such container: {name}")]
    NoSuchContainer { name: String },

    /// I/O error outside the engine (creating parent directories, reading config).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    pub(crate) fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }

    pub(crate) fn no_such_container(name: impl Into<String>) -> Self {
        Self::NoSuchContainer { name: name.into() }
    }

    /// Returns `true` for absence errors, whether of a key or of a container.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::NoSuchContainer { .. })
    }
}

macro_rules! storage_error_from {
    ($($source:ty),+ $(,)?) => {
        $(
            impl From<$source> for StoreError {
                fn from(e: $source) -> Self {
                    Self::Storage(redb::Error::from(e))
                }
            }
        )+
    };
}

storage_error_from!(
    redb::DatabaseError,
    redb::TransactionError,
    redb::TableError,
    redb::StorageError,
    redb::CommitError,
);

impl From<ureq::Error> for StoreError {
    fn from(e: ureq::Error) -> Self {
        Self::Network(e.to_string())
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absence_errors_are_not_found() {
        assert!(StoreError::not_found("a/x").is_not_found());
        assert!(StoreError::no_such_container("a").is_not_found());
        assert!(!StoreError::Config("missing path".into()).is_not_found());
        assert!(!StoreError::Closed.is_not_found());
    }

    #[test]
    fn display_includes_subject() {
        assert_eq!(StoreError::not_found("a/x").to_string(), "key not found: a/x");
        assert_eq!(
            StoreError::no_such_container("logs").to_string(),
            "no such container: logs"
        );
    }
}
