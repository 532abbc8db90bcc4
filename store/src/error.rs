use thiserror::Error;

/// Storage-layer faults.
///
/// Apart from `Duplicate`, which signals a unique-index collision, these are
/// infrastructure failures the governance engine reports as internal errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("key not found: {0}")]
    NotFound(String),

    #[error("duplicate key: {0}")]
    Duplicate(String),

    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("database is corrupted: {0}")]
    Corruption(String),
}
