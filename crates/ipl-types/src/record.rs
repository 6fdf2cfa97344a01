use std::fmt;

use serde::{Deserialize, Serialize};

use crate::hash::ContentHash;

/// Reserved separator between composite fields.
pub const DELIMITER: char = '|';

/// Number of positional fields a composite value carries.
pub const MAX_FIELDS: usize = 4;

/// Structured view of a composite ledger value.
///
/// On the ledger a record is the string `sender|receiver|filename` before a
/// document has been attached and `sender|receiver|filename|contentHash`
/// afterwards. At most one content hash is attached per record.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub sender: String,
    pub receiver: String,
    pub filename: String,
    pub content_hash: Option<ContentHash>,
}

impl Record {
    pub fn new(
        sender: impl Into<String>,
        receiver: impl Into<String>,
        filename: impl Into<String>,
    ) -> Self {
        Self {
            sender: sender.into(),
            receiver: receiver.into(),
            filename: filename.into(),
            content_hash: None,
        }
    }

    /// Decode a raw composite value.
    ///
    /// Splits on [`DELIMITER`] and assigns fields by position. Positions the
    /// input does not reach stay empty (`content_hash` stays `None`), and
    /// anything past the fourth field is dropped. This never fails.
    pub fn decode(raw: &str) -> Self {
        let mut record = Self::default();
        for (i, field) in raw.split(DELIMITER).take(MAX_FIELDS).enumerate() {
            match i {
                0 => record.sender = field.to_string(),
                1 => record.receiver = field.to_string(),
                2 => record.filename = field.to_string(),
                _ => record.content_hash = Some(ContentHash::from(field)),
            }
        }
        record
    }

    /// Decode raw ledger bytes, replacing invalid UTF-8 sequences.
    pub fn decode_bytes(raw: &[u8]) -> Self {
        Self::decode(&String::from_utf8_lossy(raw))
    }

    /// Encode to the composite wire form.
    ///
    /// Present fields keep their position even when empty; the content hash
    /// is appended only once attached.
    pub fn encode(&self) -> String {
        let mut out = String::with_capacity(
            self.sender.len()
                + self.receiver.len()
                + self.filename.len()
                + self.content_hash.as_ref().map_or(0, |h| h.as_str().len() + 1)
                + 2,
        );
        out.push_str(&self.sender);
        out.push(DELIMITER);
        out.push_str(&self.receiver);
        out.push(DELIMITER);
        out.push_str(&self.filename);
        if let Some(hash) = &self.content_hash {
            out.push(DELIMITER);
            out.push_str(hash.as_str());
        }
        out
    }

    /// Attach a content hash, replacing any existing one.
    pub fn with_content_hash(mut self, hash: ContentHash) -> Self {
        self.content_hash = Some(hash);
        self
    }

    /// Drop the content hash, keeping the first three fields.
    pub fn without_content_hash(mut self) -> Self {
        self.content_hash = None;
        self
    }

    pub fn has_content_hash(&self) -> bool {
        self.content_hash.is_some()
    }

    /// The hash to fetch with. Empty when no hash is attached.
    pub fn content_hash_or_empty(&self) -> ContentHash {
        self.content_hash.clone().unwrap_or_default()
    }

    /// Whether any field contains the delimiter.
    ///
    /// Such a record does not survive an encode/decode cycle: the embedded
    /// delimiter splits the field and shifts every later position.
    pub fn has_delimiter_hazard(&self) -> bool {
        [&self.sender, &self.receiver, &self.filename]
            .into_iter()
            .any(|f| f.contains(DELIMITER))
            || self
                .content_hash
                .as_ref()
                .is_some_and(|h| h.as_str().contains(DELIMITER))
    }

    /// Number of delimiter-separated fields in a raw composite value.
    pub fn field_count(raw: &str) -> usize {
        raw.split(DELIMITER).count()
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}
