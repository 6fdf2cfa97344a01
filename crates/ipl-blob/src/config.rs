use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::BlobResult;
use crate::fs::FsBlobStore;
use crate::http::HttpBlobStore;
use crate::memory::InMemoryBlobStore;
use crate::traits::BlobStore;

/// Which blob store implementation to open.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlobBackend {
    /// IPFS-compatible HTTP API at `host:port`.
    #[default]
    Http,
    /// Sharded directory at `root`.
    Fs,
    /// Process-local; contents vanish on exit.
    Memory,
}

impl std::str::FromStr for BlobBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "http" => Ok(Self::Http),
            "fs" => Ok(Self::Fs),
            "memory" => Ok(Self::Memory),
            other => Err(format!("unknown blob backend: {other}")),
        }
    }
}

/// Blob store location and behavior.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct BlobStoreConfig {
    pub backend: BlobBackend,
    pub host: String,
    pub port: u16,
    /// Pin uploads on the remote node. Unpinned content may be collected.
    pub pin: bool,
    /// Object directory for the `fs` backend.
    pub root: PathBuf,
    /// Transport timeout for the `http` backend. Zero disables it.
    pub timeout_secs: u64,
}

impl Default for BlobStoreConfig {
    fn default() -> Self {
        Self {
            backend: BlobBackend::Http,
            host: "ipfs0".into(),
            port: 5001,
            pin: true,
            root: PathBuf::from(".ipl/blobs"),
            timeout_secs: 30,
        }
    }
}

impl BlobStoreConfig {
    /// `host:port` of the remote store.
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Open the configured backend.
    pub fn open(&self) -> BlobResult<Box<dyn BlobStore>> {
        Ok(match self.backend {
            BlobBackend::Http => Box::new(HttpBlobStore::new(self)?),
            BlobBackend::Fs => Box::new(FsBlobStore::open(&self.root)?),
            BlobBackend::Memory => Box::new(InMemoryBlobStore::new()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = BlobStoreConfig::default();
        assert_eq!(c.backend, BlobBackend::Http);
        assert_eq!(c.endpoint(), "ipfs0:5001");
        assert!(c.pin);
        assert_eq!(c.timeout_secs, 30);
    }

    #[test]
    fn parse_partial_toml() {
        let c: BlobStoreConfig = toml::from_str(
            r#"
            backend = "fs"
            root = "/var/lib/ipl/blobs"
            "#,
        )
        .unwrap();
        assert_eq!(c.backend, BlobBackend::Fs);
        assert_eq!(c.root, PathBuf::from("/var/lib/ipl/blobs"));
        assert_eq!(c.port, 5001);
    }

    #[test]
    fn backend_from_str() {
        assert_eq!("http".parse::<BlobBackend>().unwrap(), BlobBackend::Http);
        assert_eq!("fs".parse::<BlobBackend>().unwrap(), BlobBackend::Fs);
        assert_eq!("memory".parse::<BlobBackend>().unwrap(), BlobBackend::Memory);
        assert!("s3".parse::<BlobBackend>().is_err());
    }

    #[test]
    fn open_each_backend() {
        let dir = tempfile::tempdir().unwrap();
        let memory = BlobStoreConfig {
            backend: BlobBackend::Memory,
            ..Default::default()
        };
        assert_eq!(memory.open().unwrap().backend_name(), "memory");

        let fs = BlobStoreConfig {
            backend: BlobBackend::Fs,
            root: dir.path().join("blobs"),
            ..Default::default()
        };
        assert_eq!(fs.open().unwrap().backend_name(), "fs");

        let http = BlobStoreConfig::default();
        assert_eq!(http.open().unwrap().backend_name(), "http");
    }
}
