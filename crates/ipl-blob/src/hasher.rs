use ipl_types::ContentHash;

/// Prefix marking a BLAKE3-derived content hash.
pub const HASH_PREFIX: &str = "b3";

/// Domain-separated BLAKE3 content hasher.
///
/// The domain tag is prepended to every hash computation, so the same bytes
/// hashed under different domains never collide. Rendered hashes are
/// `b3` followed by 64 lowercase hex characters.
pub struct ContentHasher {
    domain: &'static str,
}

impl ContentHasher {
    /// Hasher for uploaded documents.
    pub const BLOB: Self = Self {
        domain: "ipl-blob-v1",
    };

    /// Hash raw bytes with domain separation.
    pub fn hash(&self, data: &[u8]) -> ContentHash {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.domain.as_bytes());
        hasher.update(b":");
        hasher.update(data);
        ContentHash::new(format!("{HASH_PREFIX}{}", hasher.finalize().to_hex()))
    }

    /// Whether `hash` has the shape this hasher produces.
    pub fn is_well_formed(hash: &ContentHash) -> bool {
        hash.as_str()
            .strip_prefix(HASH_PREFIX)
            .is_some_and(|h| h.len() == 64 && hex::decode(h).is_ok())
    }
}
