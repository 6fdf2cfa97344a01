//! Test doubles shared by the unit tests in this crate.

use std::collections::HashMap;
use std::sync::Mutex;

use ipl_blob::{BlobError, BlobResult, BlobStore};
use ipl_ledger::{LedgerError, LedgerResult, StateStore};
use ipl_types::ContentHash;

pub fn args<const N: usize>(raw: [&str; N]) -> Vec<String> {
    raw.iter().map(|s| s.to_string()).collect()
}

/// Blob store that answers every upload with one fixed hash and records
/// every fetch.
pub struct FixedHashStore {
    hash: ContentHash,
    blobs: Mutex<HashMap<ContentHash, Vec<u8>>>,
    fetched: Mutex<Vec<ContentHash>>,
}

impl FixedHashStore {
    pub fn new(hash: &str) -> Self {
        Self {
            hash: ContentHash::from(hash),
            blobs: Mutex::new(HashMap::new()),
            fetched: Mutex::new(Vec::new()),
        }
    }

    pub fn fetched(&self) -> Vec<ContentHash> {
        self.fetched.lock().unwrap().clone()
    }

    pub fn uploads(&self) -> usize {
        self.blobs.lock().unwrap().len()
    }
}

impl BlobStore for FixedHashStore {
    fn upload(&self, content: &[u8]) -> BlobResult<ContentHash> {
        self.blobs
            .lock()
            .unwrap()
            .insert(self.hash.clone(), content.to_vec());
        Ok(self.hash.clone())
    }

    fn fetch(&self, hash: &ContentHash) -> BlobResult<Vec<u8>> {
        self.fetched.lock().unwrap().push(hash.clone());
        self.blobs
            .lock()
            .unwrap()
            .get(hash)
            .cloned()
            .ok_or_else(|| BlobError::NotFound(hash.clone()))
    }

    fn backend_name(&self) -> &'static str {
        "fixed"
    }
}

/// State store whose reads succeed against a map and whose writes fail.
#[derive(Default)]
pub struct ReadOnlyState {
    entries: HashMap<String, Vec<u8>>,
}

impl ReadOnlyState {
    pub fn with(key: &str, value: &str) -> Self {
        let mut entries = HashMap::new();
        entries.insert(key.to_string(), value.as_bytes().to_vec());
        Self { entries }
    }
}

impl StateStore for ReadOnlyState {
    fn get_state(&self, key: &str) -> LedgerResult<Option<Vec<u8>>> {
        Ok(self.entries.get(key).cloned())
    }

    fn put_state(&self, _key: &str, _value: &[u8]) -> LedgerResult<()> {
        Err(LedgerError::Unavailable("read-only".into()))
    }
}

/// State store whose every call fails.
pub struct BrokenState;

impl StateStore for BrokenState {
    fn get_state(&self, _key: &str) -> LedgerResult<Option<Vec<u8>>> {
        Err(LedgerError::Unavailable("disk on fire".into()))
    }

    fn put_state(&self, _key: &str, _value: &[u8]) -> LedgerResult<()> {
        Err(LedgerError::Unavailable("disk on fire".into()))
    }
}
