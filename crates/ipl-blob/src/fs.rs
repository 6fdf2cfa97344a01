use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use ipl_types::ContentHash;
use tracing::{debug, warn};

use crate::error::{BlobError, BlobResult};
use crate::hasher::{ContentHasher, HASH_PREFIX};
use crate::traits::BlobStore;

/// Blob store backed by a sharded directory on the local filesystem.
///
/// A blob with hash `b3abcdef...` lives at `<root>/ab/cdef...`. Writes go to
/// a temp file under `<root>` and are renamed into place, so a blob file is
/// either absent or complete. Reads re-hash the content and report
/// [`BlobError::Corrupt`] on mismatch.
#[derive(Debug)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    /// Open (and create if needed) a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> BlobResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn object_path(&self, hash: &ContentHash) -> BlobResult<PathBuf> {
        if !ContentHasher::is_well_formed(hash) {
            return Err(BlobError::InvalidHash(hash.clone()));
        }
        let hex = &hash.as_str()[HASH_PREFIX.len()..];
        let (shard, rest) = hex.split_at(2);
        Ok(self.root.join(shard).join(rest))
    }

    pub fn contains(&self, hash: &ContentHash) -> bool {
        self.object_path(hash).map(|p| p.exists()).unwrap_or(false)
    }
}

impl BlobStore for FsBlobStore {
    fn upload(&self, content: &[u8]) -> BlobResult<ContentHash> {
        let hash = ContentHasher::BLOB.hash(content);
        let path = self.object_path(&hash)?;
        if path.exists() {
            debug!(hash = %hash.short(), "blob already present");
            return Ok(hash);
        }
        if let Some(shard) = path.parent() {
            fs::create_dir_all(shard)?;
        }
        let mut tmp = tempfile::NamedTempFile::new_in(&self.root)?;
        tmp.write_all(content)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| BlobError::Io(e.error))?;
        debug!(hash = %hash.short(), bytes = content.len(), "blob written");
        Ok(hash)
    }

    fn fetch(&self, hash: &ContentHash) -> BlobResult<Vec<u8>> {
        let path = self.object_path(hash)?;
        let data = match fs::read(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(BlobError::NotFound(hash.clone()))
            }
            Err(e) => return Err(e.into()),
        };
        let computed = ContentHasher::BLOB.hash(&data);
        if computed != *hash {
            warn!(hash = %hash, computed = %computed, "blob failed verification");
            return Err(BlobError::Corrupt {
                hash: hash.clone(),
                computed,
            });
        }
        Ok(data)
    }

    fn backend_name(&self) -> &'static str {
        "fs"
    }
}
