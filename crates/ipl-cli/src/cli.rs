use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use ipl_blob::BlobBackend;

#[derive(Parser)]
#[command(
    name = "ipl",
    about = "IPL — key-value ledger with content-addressed document attachments",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Configuration file (TOML). Defaults to ./ipl.toml when present.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Ledger file, overriding the configuration.
    #[arg(long, global = true)]
    pub ledger: Option<PathBuf>,

    /// Directory relative document filenames resolve against.
    #[arg(long, global = true)]
    pub files_root: Option<PathBuf>,

    /// Blob store backend: http, fs, or memory.
    #[arg(long, global = true)]
    pub blob_backend: Option<BlobBackend>,

    #[arg(long, global = true)]
    pub blob_host: Option<String>,

    #[arg(long, global = true)]
    pub blob_port: Option<u16>,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Write the initial record
    Init(InitArgs),
    /// Dispatch a raw operation: set, get, set_addipfs, or get_catipfs
    Invoke(InvokeArgs),
    /// Store a value under a key
    Set(SetArgs),
    /// Read the value stored under a key
    Get(GetArgs),
    /// Upload a document and record its content hash
    Attach(AttachArgs),
    /// Fetch the document a record references
    Retrieve(RetrieveArgs),
    /// Show the effective configuration
    Config(ConfigArgs),
}

#[derive(Args)]
pub struct InitArgs {
    pub key: String,
    pub value: String,
}

#[derive(Args)]
pub struct InvokeArgs {
    pub function: String,
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

#[derive(Args)]
pub struct SetArgs {
    pub key: String,
    pub value: String,
}

#[derive(Args)]
pub struct GetArgs {
    pub key: String,
}

#[derive(Args)]
pub struct AttachArgs {
    pub key: String,
    /// Composite value: sender|receiver|filename
    pub value: String,
}

#[derive(Args)]
pub struct RetrieveArgs {
    pub key: String,
    /// Print the fetched content instead of the content hash
    #[arg(long)]
    pub show_content: bool,
}

#[derive(Args)]
pub struct ConfigArgs {}
