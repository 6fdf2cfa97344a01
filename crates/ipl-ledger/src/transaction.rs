use std::cell::RefCell;

use tracing::debug;

use crate::error::LedgerResult;
use crate::traits::{validate_key, LedgerBackend, StateStore, WriteSet};

/// A single ledger transaction.
///
/// Reads fall through to committed state unless the transaction has already
/// staged a write for the key. Only writes validate keys; reading a key that
/// can never be stored finds nothing. Staged writes reach the backend only on
/// [`commit`](Self::commit); [`abort`](Self::abort) or dropping the
/// transaction discards them.
pub struct Transaction<'a, B: LedgerBackend + ?Sized> {
    backend: &'a B,
    writes: RefCell<WriteSet>,
}

impl<'a, B: LedgerBackend + ?Sized> Transaction<'a, B> {
    pub fn new(backend: &'a B) -> Self {
        Self {
            backend,
            writes: RefCell::new(WriteSet::new()),
        }
    }

    /// Number of keys with staged writes.
    pub fn pending_writes(&self) -> usize {
        self.writes.borrow().len()
    }

    /// Apply staged writes to the backend. Returns the number of keys written.
    pub fn commit(self) -> LedgerResult<usize> {
        let writes = self.writes.into_inner();
        if writes.is_empty() {
            return Ok(0);
        }
        self.backend.apply(&writes)?;
        debug!(keys = writes.len(), "transaction committed");
        Ok(writes.len())
    }

    /// Discard staged writes. Returns the number of keys discarded.
    pub fn abort(self) -> usize {
        let discarded = self.writes.into_inner().len();
        debug!(keys = discarded, "transaction aborted");
        discarded
    }
}

impl<B: LedgerBackend + ?Sized> StateStore for Transaction<'_, B> {
    fn get_state(&self, key: &str) -> LedgerResult<Option<Vec<u8>>> {
        if let Some(staged) = self.writes.borrow().get(key) {
            return Ok(Some(staged.clone()));
        }
        self.backend.read(key)
    }

    fn put_state(&self, key: &str, value: &[u8]) -> LedgerResult<()> {
        validate_key(key)?;
        self.writes
            .borrow_mut()
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }
}

impl<B: LedgerBackend + ?Sized> std::fmt::Debug for Transaction<'_, B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transaction")
            .field("pending_writes", &self.pending_writes())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LedgerError;
    use crate::memory::InMemoryLedger;

    #[test]
    fn staged_writes_invisible_until_commit() {
        let ledger = InMemoryLedger::new();
        let tx = ledger.begin();
        tx.put_state("doc1", b"hello").unwrap();
        assert_eq!(ledger.read("doc1").unwrap(), None);
        assert_eq!(tx.commit().unwrap(), 1);
        assert_eq!(ledger.read("doc1").unwrap(), Some(b"hello".to_vec()));
    }

    #[test]
    fn read_your_writes() {
        let ledger = InMemoryLedger::new();
        let tx = ledger.begin();
        assert_eq!(tx.get_state("k").unwrap(), None);
        tx.put_state("k", b"v1").unwrap();
        tx.put_state("k", b"v2").unwrap();
        assert_eq!(tx.get_state("k").unwrap(), Some(b"v2".to_vec()));
        assert_eq!(tx.pending_writes(), 1);
    }

    #[test]
    fn abort_discards() {
        let ledger = InMemoryLedger::new();
        let tx = ledger.begin();
        tx.put_state("a", b"1").unwrap();
        tx.put_state("b", b"2").unwrap();
        assert_eq!(tx.abort(), 2);
        assert!(ledger.is_empty());
    }

    #[test]
    fn drop_discards() {
        let ledger = InMemoryLedger::new();
        {
            let tx = ledger.begin();
            tx.put_state("a", b"1").unwrap();
        }
        assert!(ledger.is_empty());
    }

    #[test]
    fn empty_commit_skips_backend() {
        let ledger = InMemoryLedger::new();
        ledger.set_fail_writes(true);
        let tx = ledger.begin();
        assert_eq!(tx.commit().unwrap(), 0);
    }

    #[test]
    fn commit_failure_surfaces() {
        let ledger = InMemoryLedger::new();
        ledger.set_fail_writes(true);
        let tx = ledger.begin();
        tx.put_state("a", b"1").unwrap();
        assert!(matches!(tx.commit(), Err(LedgerError::Unavailable(_))));
        assert!(ledger.is_empty());
    }

    #[test]
    fn invalid_key_rejected_on_put() {
        let ledger = InMemoryLedger::new();
        let tx = ledger.begin();
        assert!(matches!(tx.put_state("", b"x"), Err(LedgerError::InvalidKey { .. })));
        assert!(matches!(tx.put_state("\u{0}ns", b"x"), Err(LedgerError::InvalidKey { .. })));
        assert_eq!(tx.pending_writes(), 0);
    }

    #[test]
    fn invalid_key_reads_as_absent() {
        let ledger = InMemoryLedger::new();
        let tx = ledger.begin();
        assert_eq!(tx.get_state("").unwrap(), None);
        assert_eq!(tx.get_state("\u{0}ns").unwrap(), None);
    }

    #[test]
    fn works_through_trait_object() {
        let ledger = InMemoryLedger::new();
        let backend: &dyn LedgerBackend = &ledger;
        let tx = Transaction::new(backend);
        tx.put_state("k", b"v").unwrap();
        tx.commit().unwrap();
        assert_eq!(ledger.len(), 1);
    }
}
