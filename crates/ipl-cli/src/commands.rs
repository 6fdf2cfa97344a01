use anyhow::Context;
use colored::Colorize;
use ipl_blob::BlobStore;
use ipl_chaincode::{AssetService, ChaincodeHost, Invocation, Response};
use ipl_ledger::{FileLedger, Transaction};
use serde_json::json;

use crate::cli::*;
use crate::config::NodeConfig;

type Host = ChaincodeHost<FileLedger, AssetService<Box<dyn BlobStore>>>;

pub fn run_command(cli: Cli, config: NodeConfig) -> anyhow::Result<()> {
    let format = cli.format;
    match cli.command {
        Command::Config(_) => cmd_config(&config, &format),
        Command::Init(args) => {
            let host = open_host(&config)?;
            report(host.init(&[args.key, args.value]), &format)
        }
        Command::Invoke(args) => {
            let host = open_host(&config)?;
            report(host.invoke(&Invocation::new(args.function, args.args)), &format)
        }
        Command::Set(args) => {
            let host = open_host(&config)?;
            report(host.invoke_args(["set".to_string(), args.key, args.value]), &format)
        }
        Command::Get(args) => {
            let host = open_host(&config)?;
            report(host.invoke_args(["get".to_string(), args.key]), &format)
        }
        Command::Attach(args) => {
            let host = open_host(&config)?;
            report(host.invoke_args(["set_addipfs".to_string(), args.key, args.value]), &format)
        }
        Command::Retrieve(args) if args.show_content => {
            let host = open_host(&config)?;
            cmd_show_content(&host, &args.key, &format)
        }
        Command::Retrieve(args) => {
            let host = open_host(&config)?;
            report(host.invoke_args(["get_catipfs".to_string(), args.key]), &format)
        }
    }
}

fn open_host(config: &NodeConfig) -> anyhow::Result<Host> {
    let ledger = FileLedger::open(&config.ledger_path)
        .with_context(|| format!("failed to open ledger {}", config.ledger_path.display()))?;
    let blobs = config
        .blob
        .open()
        .context("failed to open blob store")?;
    let span = tracing::info_span!("ipl", backend = blobs.backend_name());
    let mut service = AssetService::new(blobs, span);
    if let Some(root) = &config.files_root {
        service = service.with_files_root(root);
    }
    Ok(ChaincodeHost::new(ledger, service))
}

fn report(resp: Response, format: &OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            let out = json!({
                "status": resp.status,
                "message": resp.message,
                "payload": resp.payload_str(),
            });
            println!("{out}");
        }
        OutputFormat::Text if resp.is_ok() => {
            println!("{} {}", "✓".green().bold(), resp.payload_str());
        }
        OutputFormat::Text => {}
    }
    if !resp.is_ok() {
        anyhow::bail!("{}", resp.message);
    }
    Ok(())
}

fn cmd_show_content(host: &Host, key: &str, format: &OutputFormat) -> anyhow::Result<()> {
    // Read-only: the transaction is dropped without committing.
    let tx = Transaction::new(host.ledger());
    let outcome = host.chaincode().cat(&tx, key)?;
    match format {
        OutputFormat::Json => {
            let out = json!({
                "key": key,
                "record": outcome.record,
                "content": String::from_utf8_lossy(&outcome.content),
            });
            println!("{out}");
        }
        OutputFormat::Text => {
            println!("{} {}", "Sender:".bold(), outcome.record.sender);
            println!("{} {}", "Receiver:".bold(), outcome.record.receiver);
            println!("{} {}", "File:".bold(), outcome.record.filename);
            println!(
                "{} {}",
                "Hash:".bold(),
                outcome.record.content_hash_or_empty().as_str().yellow()
            );
            println!();
            println!("{}", String::from_utf8_lossy(&outcome.content));
        }
    }
    Ok(())
}

fn cmd_config(config: &NodeConfig, format: &OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(config)?),
        OutputFormat::Text => print!("{}", toml::to_string_pretty(config)?),
    }
    Ok(())
}
