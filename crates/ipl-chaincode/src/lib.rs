//! Asset logic for the IPL document ledger.
//!
//! A ledger record may reference a document held in a content-addressed blob
//! store. This crate implements the four operations over such records and
//! the surface a hosting runtime calls:
//!
//! - `set` / `get` -- plain key-value writes and reads
//! - `set_addipfs` -- upload a local file, then record its content hash
//! - `get_catipfs` -- read a record, then fetch its content by hash
//!
//! [`AssetService`] executes operations against a [`StateStore`] handed in
//! per call. [`ChaincodeHost`] models the hosting runtime: one transaction
//! per call, committed on success and aborted on failure.
//!
//! # Consistency
//!
//! `set_addipfs` uploads before it writes. A failed upload leaves the ledger
//! untouched; a failed ledger write after a successful upload leaves an
//! orphaned blob, which is never cleaned up.
//!
//! [`StateStore`]: ipl_ledger::StateStore

pub mod chaincode;
pub mod error;
pub mod host;
pub mod operation;
pub mod response;
pub mod service;

#[cfg(test)]
pub(crate) mod testing;

pub use chaincode::{dispatch, Chaincode};
pub use error::{ChaincodeError, ChaincodeResult, ErrorKind};
pub use host::ChaincodeHost;
pub use operation::{Invocation, Operation};
pub use response::{Response, ERROR, OK};
pub use service::{AssetService, CatOutcome};
