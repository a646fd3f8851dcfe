//! Provision command - run the factory flow against file-backed stores
//!
//! Reads the device certificate from the blob directory, writes the factory
//! items into the provisioning store and waits for the operator to register
//! the enrollment ID.

use crate::config::{expand, Config};
use anyhow::{Context, Result};
use clap::Args;
use factory_identity::{
    FactoryFlow, FileBlobStore, FileProvisioningStore, ItemKind, OperatorConsole, StdConsole,
    StorageUid,
};
use std::io::Write;
use tracing::info;

/// Run the factory provisioning flow
#[derive(Args, Debug)]
pub struct ProvisionArgs {
    /// Blob directory (overrides config)
    #[arg(long)]
    pub blob_dir: Option<String>,

    /// Provisioning store directory (overrides config)
    #[arg(long)]
    pub store_dir: Option<String>,

    /// Blob UID of the device certificate, e.g. 0x100 (overrides config)
    #[arg(long, value_parser = parse_uid)]
    pub cert_uid: Option<StorageUid>,
}

/// List the items in a provisioning store
#[derive(Args, Debug)]
pub struct ItemsArgs {
    /// Provisioning store directory (overrides config)
    #[arg(long)]
    pub store_dir: Option<String>,
}

fn parse_uid(s: &str) -> Result<StorageUid, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => StorageUid::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid storage UID '{s}': {e}"))
}

/// Execute the provision command
pub fn execute(args: ProvisionArgs, config_path: &str) -> Result<()> {
    provision(args, config_path, StdConsole::new(), &mut std::io::stdout().lock())
}

/// Runs the flow with `console` for the operator handoff and writes the
/// summary to `out`. The enrollment ID only ever reaches the console.
fn provision<C: OperatorConsole>(
    args: ProvisionArgs,
    config_path: &str,
    console: C,
    out: &mut dyn Write,
) -> Result<()> {
    let config = Config::load(config_path)?;
    let profile = config.device.to_profile()?;

    let blob_dir = expand(args.blob_dir.as_deref().unwrap_or(&config.storage.blob_dir));
    let store_dir = expand(args.store_dir.as_deref().unwrap_or(&config.storage.store_dir));
    let cert_uid = args.cert_uid.unwrap_or(config.storage.device_cert_uid);

    info!(
        blob_dir = %blob_dir.display(),
        store_dir = %store_dir.display(),
        cert_uid,
        "provisioning device"
    );

    let blobs = FileBlobStore::new(&blob_dir);
    let store = FileProvisioningStore::create(&store_dir).with_context(|| {
        format!("Failed to open provisioning store {}", store_dir.display())
    })?;

    let mut flow = FactoryFlow::new(blobs, store, console)
        .with_profile(profile)
        .with_cert_uid(cert_uid);
    let report = flow.run().context("Factory provisioning failed")?;

    writeln!(out, "Provisioning complete")?;
    writeln!(out, "  Endpoint name:  {}", report.endpoint_name)?;
    writeln!(out, "  Items written:  {}", report.items_written.len())?;
    writeln!(out, "  Store:          {}", store_dir.display())?;

    Ok(())
}

/// Print the items of a provisioning store
pub fn list_items(args: ItemsArgs, config_path: &str) -> Result<()> {
    let config = Config::load(config_path)?;
    let store_dir = expand(args.store_dir.as_deref().unwrap_or(&config.storage.store_dir));

    if !store_dir.is_dir() {
        println!("No provisioning store at {}", store_dir.display());
        return Ok(());
    }

    let store = FileProvisioningStore::open(&store_dir).with_context(|| {
        format!("Failed to open provisioning store {}", store_dir.display())
    })?;

    if store.items().is_empty() {
        println!("Provisioning store {} is empty", store_dir.display());
        return Ok(());
    }

    println!("{:<28} {:<12} {:<8} {:>6}", "NAME", "KIND", "FACTORY", "BYTES");
    for (name, item) in store.items() {
        let kind = match item.kind {
            ItemKind::Config => "config",
            ItemKind::Certificate => "certificate",
        };
        let anchor = if store.trust_anchor_item() == Some(name.as_str()) {
            "  (trust anchor)"
        } else {
            ""
        };
        println!(
            "{:<28} {:<12} {:<8} {:>6}{}",
            name,
            kind,
            item.factory,
            item.data.len(),
            anchor
        );
    }

    Ok(())
}
