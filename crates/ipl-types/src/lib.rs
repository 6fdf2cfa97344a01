//! Foundation types for the IPL document ledger.
//!
//! A ledger value that references a document is a composite string:
//! `sender|receiver|filename|contentHash`. This crate owns that wire
//! encoding and the structured [`Record`] it maps to.
//!
//! # Encoding Rules
//!
//! 1. Fields are joined with [`DELIMITER`] in positional order.
//! 2. Fields are never escaped. A field containing the delimiter shifts every
//!    later field on decode; [`Record::has_delimiter_hazard`] reports this.
//! 3. Decoding never fails. Missing positions decode as empty, extra
//!    positions are discarded.

pub mod hash;
pub mod record;

pub use hash::ContentHash;
pub use record::{Record, DELIMITER, MAX_FIELDS};
