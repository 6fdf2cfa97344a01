use std::path::PathBuf;

use ipl_types::ContentHash;

/// Errors from blob store operations.
#[derive(Debug, thiserror::Error)]
pub enum BlobError {
    /// No content is stored under the hash.
    #[error("blob not found: {0}")]
    NotFound(ContentHash),

    /// The hash is not one this backend can address.
    #[error("invalid content hash: {0:?}")]
    InvalidHash(ContentHash),

    /// The local file to upload could not be read.
    #[error("failed to read {}: {source}", path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Stored bytes no longer match their hash.
    #[error("corrupt blob {hash}: content hashes to {computed}")]
    Corrupt { hash: ContentHash, computed: ContentHash },

    /// The remote store answered with a failure status.
    #[error("blob store returned HTTP {status}: {message}")]
    Remote { status: u16, message: String },

    /// Transport failure talking to the remote store.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The remote store answered with something we cannot interpret.
    #[error("invalid response from blob store: {0}")]
    InvalidResponse(String),

    /// The store rejected the operation.
    #[error("blob store unavailable: {0}")]
    Unavailable(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("blob store lock poisoned")]
    LockPoisoned,
}

/// Result alias for blob store operations.
pub type BlobResult<T> = Result<T, BlobError>;
