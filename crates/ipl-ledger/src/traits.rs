use std::collections::BTreeMap;

use crate::error::{LedgerError, LedgerResult};
use crate::transaction::Transaction;

/// Writes staged by one transaction, keyed by ledger key.
pub type WriteSet = BTreeMap<String, Vec<u8>>;

/// Per-transaction view of ledger state.
///
/// This is the only surface the asset logic touches. Implementations decide
/// when writes become durable; callers never manage transaction boundaries.
pub trait StateStore {
    /// Read the value stored under `key`.
    ///
    /// Returns `Ok(None)` if the key has never been written.
    fn get_state(&self, key: &str) -> LedgerResult<Option<Vec<u8>>>;

    /// Write `value` under `key`, replacing any existing value.
    fn put_state(&self, key: &str, value: &[u8]) -> LedgerResult<()>;
}

/// Committed-state storage behind a [`Transaction`].
///
/// Implementations must apply a [`WriteSet`] all-or-nothing and serialize
/// concurrent `apply` calls.
pub trait LedgerBackend: Send + Sync {
    /// Read a committed value.
    fn read(&self, key: &str) -> LedgerResult<Option<Vec<u8>>>;

    /// Apply every write in the set atomically.
    fn apply(&self, writes: &WriteSet) -> LedgerResult<()>;

    /// Open a transaction over this backend.
    fn begin(&self) -> Transaction<'_, Self>
    where
        Self: Sized,
    {
        Transaction::new(self)
    }
}

/// Reject keys the ledger cannot store.
///
/// Keys must be non-empty and must not start with U+0000, which is reserved
/// for composite-key namespaces.
pub fn validate_key(key: &str) -> LedgerResult<()> {
    if key.is_empty() {
        return Err(LedgerError::InvalidKey {
            key: key.to_string(),
            reason: "key must not be empty".into(),
        });
    }
    if key.starts_with('\u{0}') {
        return Err(LedgerError::InvalidKey {
            key: key.to_string(),
            reason: "key must not start with U+0000".into(),
        });
    }
    Ok(())
}
