use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::RwLock;

use ipl_types::ContentHash;

use crate::error::{BlobError, BlobResult};
use crate::hasher::ContentHasher;
use crate::traits::BlobStore;

/// In-memory, HashMap-based blob store.
///
/// Intended for tests and embedding. Uploads and fetches can be made to fail
/// on demand so callers can exercise their error paths.
pub struct InMemoryBlobStore {
    blobs: RwLock<HashMap<ContentHash, Vec<u8>>>,
    uploads: AtomicUsize,
    fail_uploads: AtomicBool,
    fail_fetches: AtomicBool,
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self {
            blobs: RwLock::new(HashMap::new()),
            uploads: AtomicUsize::new(0),
            fail_uploads: AtomicBool::new(false),
            fail_fetches: AtomicBool::new(false),
        }
    }

    /// Make every subsequent upload fail with [`BlobError::Unavailable`].
    pub fn set_fail_uploads(&self, fail: bool) {
        self.fail_uploads.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent fetch fail with [`BlobError::Unavailable`].
    pub fn set_fail_fetches(&self, fail: bool) {
        self.fail_fetches.store(fail, Ordering::SeqCst);
    }

    /// Number of successful uploads, including duplicates.
    pub fn upload_count(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }

    /// Number of distinct blobs held.
    pub fn len(&self) -> usize {
        self.blobs.read().map(|b| b.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, hash: &ContentHash) -> bool {
        self.blobs
            .read()
            .map(|b| b.contains_key(hash))
            .unwrap_or(false)
    }
}

impl Default for InMemoryBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BlobStore for InMemoryBlobStore {
    fn upload(&self, content: &[u8]) -> BlobResult<ContentHash> {
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(BlobError::Unavailable("upload rejected".into()));
        }
        let hash = ContentHasher::BLOB.hash(content);
        let mut blobs = self.blobs.write().map_err(|_| BlobError::LockPoisoned)?;
        blobs.entry(hash.clone()).or_insert_with(|| content.to_vec());
        self.uploads.fetch_add(1, Ordering::SeqCst);
        Ok(hash)
    }

    fn fetch(&self, hash: &ContentHash) -> BlobResult<Vec<u8>> {
        if self.fail_fetches.load(Ordering::SeqCst) {
            return Err(BlobError::Unavailable("fetch rejected".into()));
        }
        let blobs = self.blobs.read().map_err(|_| BlobError::LockPoisoned)?;
        blobs
            .get(hash)
            .cloned()
            .ok_or_else(|| BlobError::NotFound(hash.clone()))
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

impl std::fmt::Debug for InMemoryBlobStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryBlobStore")
            .field("blob_count", &self.len())
            .field("upload_count", &self.upload_count())
            .finish()
    }
}
