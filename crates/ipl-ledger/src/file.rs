use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{LedgerError, LedgerResult};
use crate::traits::{LedgerBackend, WriteSet};

const FORMAT_VERSION: u32 = 1;

/// Ledger backend persisted as a single JSON snapshot file.
///
/// State is loaded once at [`open`](Self::open). Each commit writes the full
/// snapshot to a temp file in the same directory and renames it over the
/// previous file, so a crash leaves either the old or the new state on disk.
pub struct FileLedger {
    path: PathBuf,
    state: RwLock<BTreeMap<String, Vec<u8>>>,
}

#[derive(Serialize, Deserialize)]
struct LedgerFile {
    version: u32,
    entries: BTreeMap<String, FileEntry>,
}

/// Values are stored as text when they are valid UTF-8, hex otherwise.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum FileEntry {
    Text(String),
    Hex(String),
}

impl FileEntry {
    fn from_bytes(value: &[u8]) -> Self {
        match std::str::from_utf8(value) {
            Ok(text) => Self::Text(text.to_string()),
            Err(_) => Self::Hex(hex::encode(value)),
        }
    }

    fn into_bytes(self, key: &str) -> LedgerResult<Vec<u8>> {
        match self {
            Self::Text(text) => Ok(text.into_bytes()),
            Self::Hex(h) => hex::decode(&h)
                .map_err(|e| LedgerError::Serialization(format!("entry {key:?}: {e}"))),
        }
    }
}

impl FileLedger {
    /// Open the ledger at `path`, creating parent directories as needed.
    ///
    /// A missing file is an empty ledger; it is created on first commit.
    pub fn open(path: impl Into<PathBuf>) -> LedgerResult<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let state = if path.exists() {
            load(&path)?
        } else {
            BTreeMap::new()
        };
        info!(path = %path.display(), entries = state.len(), "ledger opened");
        Ok(Self {
            path,
            state: RwLock::new(state),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.state.read().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn persist(&self, state: &BTreeMap<String, Vec<u8>>) -> LedgerResult<()> {
        let file = LedgerFile {
            version: FORMAT_VERSION,
            entries: state
                .iter()
                .map(|(k, v)| (k.clone(), FileEntry::from_bytes(v)))
                .collect(),
        };
        let data = serde_json::to_vec_pretty(&file)
            .map_err(|e| LedgerError::Serialization(e.to_string()))?;

        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(&data)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| LedgerError::Io(e.error))?;
        debug!(path = %self.path.display(), bytes = data.len(), "ledger snapshot written");
        Ok(())
    }
}

fn load(path: &Path) -> LedgerResult<BTreeMap<String, Vec<u8>>> {
    let data = fs::read(path)?;
    let file: LedgerFile =
        serde_json::from_slice(&data).map_err(|e| LedgerError::Serialization(e.to_string()))?;
    if file.version != FORMAT_VERSION {
        return Err(LedgerError::Serialization(format!(
            "unsupported ledger file version {}",
            file.version
        )));
    }
    file.entries
        .into_iter()
        .map(|(k, entry)| {
            let value = entry.into_bytes(&k)?;
            Ok((k, value))
        })
        .collect()
}

impl LedgerBackend for FileLedger {
    fn read(&self, key: &str) -> LedgerResult<Option<Vec<u8>>> {
        let state = self.state.read().map_err(|_| LedgerError::LockPoisoned)?;
        Ok(state.get(key).cloned())
    }

    fn apply(&self, writes: &WriteSet) -> LedgerResult<()> {
        let mut state = self.state.write().map_err(|_| LedgerError::LockPoisoned)?;
        let mut next = state.clone();
        for (key, value) in writes {
            next.insert(key.clone(), value.clone());
        }
        // Disk first: in-memory state only advances once the snapshot is durable.
        self.persist(&next)?;
        *state = next;
        Ok(())
    }
}

impl std::fmt::Debug for FileLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileLedger")
            .field("path", &self.path)
            .field("entry_count", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::StateStore;

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = FileLedger::open(dir.path().join("ledger.json")).unwrap();
        assert!(ledger.is_empty());
        assert!(!ledger.path().exists());
    }

    #[test]
    fn commit_persists_and_reopens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        {
            let ledger = FileLedger::open(&path).unwrap();
            let tx = ledger.begin();
            tx.put_state("doc1", b"hello").unwrap();
            tx.put_state("doc2", b"alice|bob|report.txt|Qm123").unwrap();
            tx.commit().unwrap();
        }
        let reopened = FileLedger::open(&path).unwrap();
        assert_eq!(reopened.read("doc1").unwrap(), Some(b"hello".to_vec()));
        assert_eq!(
            reopened.read("doc2").unwrap(),
            Some(b"alice|bob|report.txt|Qm123".to_vec())
        );
        assert_eq!(reopened.len(), 2);
    }

    #[test]
    fn binary_values_survive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        let ledger = FileLedger::open(&path).unwrap();
        let tx = ledger.begin();
        tx.put_state("bin", &[0xff, 0x00, 0x10]).unwrap();
        tx.commit().unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("ff0010"));
        let reopened = FileLedger::open(&path).unwrap();
        assert_eq!(reopened.read("bin").unwrap(), Some(vec![0xff, 0x00, 0x10]));
    }

    #[test]
    fn creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/ledger.json");
        let ledger = FileLedger::open(&path).unwrap();
        let tx = ledger.begin();
        tx.put_state("k", b"v").unwrap();
        tx.commit().unwrap();
        assert!(path.exists());
    }

    #[test]
    fn corrupt_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        fs::write(&path, b"not json").unwrap();
        assert!(matches!(FileLedger::open(&path), Err(LedgerError::Serialization(_))));
    }

    #[test]
    fn unknown_version_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        fs::write(&path, br#"{"version":9,"entries":{}}"#).unwrap();
        let err = FileLedger::open(&path).unwrap_err();
        assert!(err.to_string().contains("version 9"));
    }

    #[test]
    fn aborted_transaction_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        let ledger = FileLedger::open(&path).unwrap();
        let tx = ledger.begin();
        tx.put_state("k", b"v").unwrap();
        tx.abort();
        assert!(!path.exists());
        assert!(ledger.is_empty());
    }
}
