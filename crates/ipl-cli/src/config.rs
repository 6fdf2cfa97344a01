use std::path::{Path, PathBuf};

use anyhow::Context;
use ipl_blob::BlobStoreConfig;
use serde::{Deserialize, Serialize};

use crate::cli::Cli;

/// Config file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "ipl.toml";

/// Process-wide settings for the `ipl` binary.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    pub ledger_path: PathBuf,
    pub files_root: Option<PathBuf>,
    pub log_level: String,
    pub blob: BlobStoreConfig,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            ledger_path: PathBuf::from(".ipl/ledger.json"),
            files_root: None,
            log_level: "info".into(),
            blob: BlobStoreConfig::default(),
        }
    }
}

impl NodeConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("invalid config {}", path.display()))
    }

    /// File settings (explicit, then `./ipl.toml`, then defaults) with
    /// command-line overrides applied on top.
    pub fn resolve(cli: &Cli) -> anyhow::Result<Self> {
        let mut config = match &cli.config {
            Some(path) => Self::load(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::load(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };
        config.apply_overrides(cli);
        Ok(config)
    }

    fn apply_overrides(&mut self, cli: &Cli) {
        if let Some(ledger) = &cli.ledger {
            self.ledger_path = ledger.clone();
        }
        if let Some(root) = &cli.files_root {
            self.files_root = Some(root.clone());
        }
        if let Some(backend) = cli.blob_backend {
            self.blob.backend = backend;
        }
        if let Some(host) = &cli.blob_host {
            self.blob.host = host.clone();
        }
        if let Some(port) = cli.blob_port {
            self.blob.port = port;
        }
    }

    pub fn log_level(&self) -> anyhow::Result<tracing::Level> {
        self.log_level
            .parse()
            .map_err(|_| anyhow::anyhow!("invalid log level: {}", self.log_level))
    }
}
