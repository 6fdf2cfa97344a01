use ipl_blob::BlobError;
use ipl_ledger::LedgerError;

/// Coarse classification of a [`ChaincodeError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Argument,
    NotFound,
    Storage,
    BlobStore,
    Dispatch,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Argument => "argument",
            Self::NotFound => "not-found",
            Self::Storage => "storage",
            Self::BlobStore => "blob-store",
            Self::Dispatch => "dispatch",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failures surfaced to the caller of an asset operation.
///
/// Every variant is terminal: nothing in this crate retries.
#[derive(Debug, thiserror::Error)]
pub enum ChaincodeError {
    /// Wrong argument count. Raised before any side effect.
    #[error("Incorrect arguments. {expected}")]
    Argument { expected: &'static str, got: usize },

    #[error("Asset not found: {key}")]
    NotFound { key: String },

    #[error("{context}: {source}")]
    Storage {
        context: String,
        #[source]
        source: LedgerError,
    },

    #[error("{context}: {source}")]
    BlobStore {
        context: String,
        #[source]
        source: BlobError,
    },

    #[error("Unsupported function: {function}")]
    Dispatch { function: String },
}

impl ChaincodeError {
    pub fn storage(context: impl Into<String>, source: LedgerError) -> Self {
        Self::Storage {
            context: context.into(),
            source,
        }
    }

    pub fn blob(context: impl Into<String>, source: BlobError) -> Self {
        Self::BlobStore {
            context: context.into(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Argument { .. } => ErrorKind::Argument,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Storage { .. } => ErrorKind::Storage,
            Self::BlobStore { .. } => ErrorKind::BlobStore,
            Self::Dispatch { .. } => ErrorKind::Dispatch,
        }
    }
}

pub type ChaincodeResult<T> = Result<T, ChaincodeError>;
