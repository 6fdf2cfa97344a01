//! Content-addressed blob storage for the IPL document ledger.
//!
//! Documents are uploaded to a blob store that returns a content hash; the
//! hash is what the ledger records. Fetching by that hash returns the same
//! bytes that were uploaded.
//!
//! # Storage Backends
//!
//! All backends implement the [`BlobStore`] trait:
//!
//! - [`InMemoryBlobStore`] -- `HashMap`-based store for tests and embedding
//! - [`FsBlobStore`] -- sharded object directory on the local filesystem
//! - [`HttpBlobStore`] -- client for an IPFS-compatible HTTP API
//!
//! # Design Rules
//!
//! 1. Uploads are idempotent: identical bytes yield the identical hash.
//! 2. Nothing here retries. Every failure is returned to the caller.
//! 3. The store location is configuration ([`BlobStoreConfig`]), never a constant.

pub mod config;
pub mod error;
pub mod fs;
pub mod hasher;
pub mod http;
pub mod memory;
pub mod traits;

pub use config::{BlobBackend, BlobStoreConfig};
pub use error::{BlobError, BlobResult};
pub use fs::FsBlobStore;
pub use hasher::ContentHasher;
pub use http::HttpBlobStore;
pub use memory::InMemoryBlobStore;
pub use traits::{read_file, BlobStore};
