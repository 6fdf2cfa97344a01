use std::path::{Path, PathBuf};

use ipl_blob::BlobStore;
use ipl_ledger::StateStore;
use ipl_types::{Record, MAX_FIELDS};
use tracing::{debug, info, info_span, warn, Span};

use crate::error::{ChaincodeError, ChaincodeResult};
use crate::operation::Operation;

/// A record read back together with the content its hash refers to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatOutcome {
    pub record: Record,
    pub content: Vec<u8>,
}

/// Executes asset operations against a caller-supplied [`StateStore`].
///
/// The service keeps no ledger state between calls; every operation starts
/// from a fresh read. It owns the blob store handle, the directory that
/// relative filenames resolve against, and the span all of its events are
/// recorded under.
pub struct AssetService<B> {
    blobs: B,
    files_root: Option<PathBuf>,
    span: Span,
}

impl<B: BlobStore> AssetService<B> {
    /// Create a service logging under `span`.
    ///
    /// Pass `Span::none()` to run silently.
    pub fn new(blobs: B, span: Span) -> Self {
        Self {
            blobs,
            files_root: None,
            span,
        }
    }

    /// Resolve relative filenames in `set_addipfs` against `root`.
    pub fn with_files_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.files_root = Some(root.into());
        self
    }

    pub fn blobs(&self) -> &B {
        &self.blobs
    }

    pub fn span(&self) -> &Span {
        &self.span
    }

    fn op_span(&self, op: Operation) -> Span {
        info_span!(parent: &self.span, "asset", op = op.name())
    }

    fn resolve(&self, filename: &str) -> PathBuf {
        let path = Path::new(filename);
        match &self.files_root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }

    fn read_asset(&self, stub: &dyn StateStore, key: &str) -> ChaincodeResult<Vec<u8>> {
        stub.get_state(key)
            .map_err(|e| ChaincodeError::storage(format!("Failed to get asset: {key}"), e))?
            .ok_or_else(|| ChaincodeError::NotFound {
                key: key.to_string(),
            })
    }

    /// Store `args[1]` verbatim under `args[0]`. Returns the value.
    pub fn set(&self, stub: &dyn StateStore, args: &[String]) -> ChaincodeResult<String> {
        let _span = self.op_span(Operation::Set).entered();
        Operation::Set.check_arity(args)?;
        let (key, value) = (&args[0], &args[1]);

        stub.put_state(key, value.as_bytes())
            .map_err(|e| ChaincodeError::storage(format!("Failed to set asset: {key}"), e))?;
        info!(key = %key, bytes = value.len(), "asset set");
        Ok(value.clone())
    }

    /// Read the value stored under `args[0]`.
    pub fn get(&self, stub: &dyn StateStore, args: &[String]) -> ChaincodeResult<String> {
        let _span = self.op_span(Operation::Get).entered();
        Operation::Get.check_arity(args)?;
        let key = &args[0];

        let value = self.read_asset(stub, key)?;
        debug!(key = %key, bytes = value.len(), "asset read");
        Ok(String::from_utf8_lossy(&value).into_owned())
    }

    /// Upload the file named by a composite value, then record its hash.
    ///
    /// `args[1]` is decoded as `sender|receiver|filename`; anything after the
    /// third field is discarded. The ledger write happens only after the
    /// upload succeeded. Returns the key.
    pub fn set_addipfs(&self, stub: &dyn StateStore, args: &[String]) -> ChaincodeResult<String> {
        let _span = self.op_span(Operation::SetAddIpfs).entered();
        Operation::SetAddIpfs.check_arity(args)?;
        let (key, value) = (&args[0], &args[1]);

        let fields = Record::field_count(value);
        if fields > MAX_FIELDS - 1 {
            warn!(key = %key, fields, "composite value has trailing fields; discarding them");
        }
        let record = Record::decode(value).without_content_hash();
        debug!(
            key = %key,
            sender = %record.sender,
            receiver = %record.receiver,
            filename = %record.filename,
            "composite value decoded"
        );

        let path = self.resolve(&record.filename);
        let hash = self.blobs.upload_file(&path).map_err(|e| {
            warn!(key = %key, path = %path.display(), error = %e, "blob upload failed");
            ChaincodeError::blob("Failed to add to blob store", e)
        })?;
        info!(key = %key, hash = %hash, backend = self.blobs.backend_name(), "blob uploaded");

        let record = record.with_content_hash(hash);
        if record.has_delimiter_hazard() {
            warn!(
                key = %key,
                "content hash contains the field delimiter; record will not decode cleanly"
            );
        }
        let encoded = record.encode();
        stub.put_state(key, encoded.as_bytes()).map_err(|e| {
            warn!(
                key = %key,
                hash = %record.content_hash_or_empty(),
                "ledger write failed after upload; blob is orphaned"
            );
            ChaincodeError::storage(format!("Failed to set asset: {key}"), e)
        })?;
        info!(key = %key, value = %encoded, "record written");
        Ok(key.clone())
    }

    /// Read a record, fetch its content, and return the content hash.
    ///
    /// A record with fewer than four fields is fetched with an empty hash;
    /// whatever the blob store says about that is the result.
    pub fn get_catipfs(&self, stub: &dyn StateStore, args: &[String]) -> ChaincodeResult<String> {
        let _span = self.op_span(Operation::GetCatIpfs).entered();
        Operation::GetCatIpfs.check_arity(args)?;

        let outcome = self.cat(stub, &args[0])?;
        Ok(outcome.record.content_hash_or_empty().into_string())
    }

    /// Read the record under `key` and fetch the content it references.
    pub fn cat(&self, stub: &dyn StateStore, key: &str) -> ChaincodeResult<CatOutcome> {
        let value = self.read_asset(stub, key)?;
        let record = Record::decode_bytes(&value);
        debug!(
            key = %key,
            sender = %record.sender,
            receiver = %record.receiver,
            filename = %record.filename,
            hash = %record.content_hash_or_empty(),
            "record read"
        );

        let hash = record.content_hash_or_empty();
        if hash.is_empty() {
            debug!(key = %key, "record carries no content hash; fetching with empty hash");
        }
        let content = self.blobs.fetch(&hash).map_err(|e| {
            warn!(key = %key, hash = %hash, error = %e, "blob fetch failed");
            ChaincodeError::blob("Failed to fetch from blob store", e)
        })?;
        info!(key = %key, hash = %hash, bytes = content.len(), "content fetched");
        debug!(contents = %String::from_utf8_lossy(&content), "fetched content");
        Ok(CatOutcome { record, content })
    }
}

impl<B: BlobStore> std::fmt::Debug for AssetService<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetService")
            .field("backend", &self.blobs.backend_name())
            .field("files_root", &self.files_root)
            .finish()
    }
}
