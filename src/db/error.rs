use thiserror::Error;

/// Failure of a persistence operation. Each variant names the operation that
/// failed and carries the message of whatever went wrong underneath, so
/// callers deal with a single error type no matter the root cause.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to create table: {0}")]
    Schema(String),
    #[error("Failed to add new record: {0}")]
    Insert(String),
    #[error("Failed to update record: {0}")]
    Update(String),
    #[error("Failed to delete records: {0}")]
    Delete(String),
    #[error("Failed to retrieve data: {0}")]
    Query(String),
    #[error("Failed to retrieve column types: {0}")]
    Introspect(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Wrap a driver error into the variant of the operation that raised it.
/// Used as `.map_err(wrap(StorageError::Insert))`.
pub(crate) fn wrap<E: std::fmt::Display>(
    variant: fn(String) -> StorageError,
) -> impl Fn(E) -> StorageError {
    move |err| variant(err.to_string())
}
