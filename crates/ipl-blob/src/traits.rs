use std::path::Path;
use std::sync::Arc;

use ipl_types::ContentHash;

use crate::error::{BlobError, BlobResult};

/// Content-addressed blob store.
///
/// Implementations must satisfy these invariants:
/// - Uploading identical bytes returns the identical hash.
/// - `fetch` of a hash returned by `upload` yields the uploaded bytes.
/// - Calls block until the store answers. No retries, no internal timeouts
///   beyond what the backend's transport imposes.
pub trait BlobStore: Send + Sync {
    /// Store `content` and return its content hash.
    fn upload(&self, content: &[u8]) -> BlobResult<ContentHash>;

    /// Retrieve the content stored under `hash`.
    fn fetch(&self, hash: &ContentHash) -> BlobResult<Vec<u8>>;

    /// Short backend name for log lines.
    fn backend_name(&self) -> &'static str;

    /// Read a local file once and upload its bytes.
    fn upload_file(&self, path: &Path) -> BlobResult<ContentHash> {
        let content = read_file(path)?;
        self.upload(&content)
    }
}

/// Read a whole local file, tagging failures with the path.
pub fn read_file(path: &Path) -> BlobResult<Vec<u8>> {
    std::fs::read(path).map_err(|source| BlobError::FileRead {
        path: path.to_path_buf(),
        source,
    })
}

impl<T: BlobStore + ?Sized> BlobStore for Box<T> {
    fn upload(&self, content: &[u8]) -> BlobResult<ContentHash> {
        (**self).upload(content)
    }

    fn fetch(&self, hash: &ContentHash) -> BlobResult<Vec<u8>> {
        (**self).fetch(hash)
    }

    fn backend_name(&self) -> &'static str {
        (**self).backend_name()
    }

    fn upload_file(&self, path: &Path) -> BlobResult<ContentHash> {
        (**self).upload_file(path)
    }
}

impl<T: BlobStore + ?Sized> BlobStore for Arc<T> {
    fn upload(&self, content: &[u8]) -> BlobResult<ContentHash> {
        (**self).upload(content)
    }

    fn fetch(&self, hash: &ContentHash) -> BlobResult<Vec<u8>> {
        (**self).fetch(hash)
    }

    fn backend_name(&self) -> &'static str {
        (**self).backend_name()
    }

    fn upload_file(&self, path: &Path) -> BlobResult<ContentHash> {
        (**self).upload_file(path)
    }
}
