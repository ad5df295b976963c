use crate::error::StoreResult;

/// Backend-agnostic key-value store.
///
/// All implementations must satisfy these invariants:
/// - Values are opaque bytes; the store never interprets them.
/// - `get` returns an owned copy of what the last `put` wrote for the key,
///   and distinguishes absence ([`StoreError::NotFound`]) from failure.
/// - `delete` is idempotent: removing an absent key is not an error.
/// - Errors propagate unchanged. There are no retries and no fallback
///   between backends.
///
/// The meaning of the `list` and `delete_tree` argument is backend-defined.
/// The embedded backend treats it as a container name, the distributed
/// backend as a key prefix. Each implementation documents its reading.
///
/// [`StoreError::NotFound`]: crate::StoreError::NotFound
pub trait Store: Send + Sync {
    /// Open a store from positional, backend-specific options.
    fn init(options: &[String]) -> StoreResult<Self>
    where
        Self: Sized;

    /// Read the value stored under `key`.
    fn get(&self, key: &str) -> StoreResult<Vec<u8>>;

    /// Write `value` under `key`, replacing any previous value.
    fn put(&self, key: &str, value: &[u8]) -> StoreResult<()>;

    /// Remove `key`. Succeeds when the key is absent.
    fn delete(&self, key: &str) -> StoreResult<()>;

    /// Enumerate names under `arg` (container listing or prefix scan).
    fn list(&self, arg: &str) -> StoreResult<Vec<String>>;

    /// Remove everything under `arg` in a single operation.
    fn delete_tree(&self, arg: &str) -> StoreResult<()>;

    /// Release the underlying resource. Later calls fail with
    /// [`StoreError::Closed`](crate::StoreError::Closed).
    fn close(&mut self) -> StoreResult<()>;
}
