//! Transactional key-value ledger for the IPL document ledger.
//!
//! This crate provides:
//! - The [`StateStore`] boundary the asset logic reads and writes through
//! - The [`LedgerBackend`] boundary for committed state
//! - [`Transaction`], which stages writes until commit or abort
//! - [`InMemoryLedger`] for tests and embedding
//! - [`FileLedger`], a JSON snapshot file rewritten atomically per commit

pub mod error;
pub mod file;
pub mod memory;
pub mod traits;
pub mod transaction;

pub use error::{LedgerError, LedgerResult};
pub use file::FileLedger;
pub use memory::InMemoryLedger;
pub use traits::{validate_key, LedgerBackend, StateStore, WriteSet};
pub use transaction::Transaction;
