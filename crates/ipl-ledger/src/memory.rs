use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use crate::error::{LedgerError, LedgerResult};
use crate::traits::{LedgerBackend, WriteSet};

/// In-memory ledger backend for tests, local demos, and embedding.
///
/// Committed state lives in a `BTreeMap` behind a `RwLock`. A write set is
/// applied under a single write lock, so concurrent transactions never
/// observe a partial commit.
pub struct InMemoryLedger {
    state: RwLock<BTreeMap<String, Vec<u8>>>,
    fail_writes: AtomicBool,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(BTreeMap::new()),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Build a ledger with pre-committed entries.
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Vec<u8>>,
    {
        let state = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            state: RwLock::new(state),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Make every subsequent `apply` fail with [`LedgerError::Unavailable`].
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.state.read().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl LedgerBackend for InMemoryLedger {
    fn read(&self, key: &str) -> LedgerResult<Option<Vec<u8>>> {
        let state = self.state.read().map_err(|_| LedgerError::LockPoisoned)?;
        Ok(state.get(key).cloned())
    }

    fn apply(&self, writes: &WriteSet) -> LedgerResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(LedgerError::Unavailable("write rejected".into()));
        }
        let mut state = self.state.write().map_err(|_| LedgerError::LockPoisoned)?;
        for (key, value) in writes {
            state.insert(key.clone(), value.clone());
        }
        Ok(())
    }
}

impl std::fmt::Debug for InMemoryLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryLedger")
            .field("entry_count", &self.len())
            .finish()
    }
}
