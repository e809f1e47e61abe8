//! QuotaStore CLI
//!
//! Development tool that exercises the persistence coordinator against the
//! filesystem blob store: save, load, and delete blobs under a local data
//! directory and inspect per-(tenant, plugin) usage. Not a server.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use quotastore::adapters::{FsBlobStore, InMemoryTtlCache, InMemoryUsageLedger};
use quotastore::{
    CoordinatorConfig, PersistenceCoordinator, PluginId, TenantId, UsageLedger, UsageRecord,
};

// =============================================================================
// CLI Arguments
// =============================================================================

/// QuotaStore - quota-enforced tenant blob persistence
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Data directory for the filesystem blob store
    #[arg(long, env = "QUOTASTORE_ROOT", default_value = "./quotastore-data")]
    root: PathBuf,

    /// Process-wide default quota in bytes
    #[arg(long, env = "QUOTASTORE_DEFAULT_QUOTA", default_value = "104857600")]
    default_quota: u64,

    /// Tenant identifier
    #[arg(long, env = "QUOTASTORE_TENANT")]
    tenant: String,

    /// Plugin identifier
    #[arg(long, env = "QUOTASTORE_PLUGIN")]
    plugin: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, env = "LOG_JSON")]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Save a blob under a key (payload from --data or stdin)
    Save {
        key: String,
        /// Inline payload; omit to read the payload from stdin
        #[arg(long)]
        data: Option<String>,
        /// Per-request quota in bytes; -1 uses the default quota
        #[arg(long, default_value = "-1", allow_hyphen_values = true)]
        max_size: i64,
    },
    /// Load a blob and write its bytes to stdout
    Load { key: String },
    /// Delete a blob and release its bytes from the ledger
    Delete { key: String },
    /// Print the current usage row as JSON
    Usage,
}

// =============================================================================
// Main
// =============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(&args);

    let tenant = TenantId::new(&args.tenant);
    let plugin = PluginId::new(&args.plugin);

    // The CLI ledger is in-memory and rebuilt per invocation; seed it with
    // the bytes already on disk so quota admission sees prior invocations'
    // blobs.
    let ledger = Arc::new(InMemoryUsageLedger::new());
    let on_disk = bytes_on_disk(&args.root, &tenant, &plugin).await?;
    if on_disk > 0 {
        ledger
            .create(UsageRecord::new(tenant.clone(), plugin.clone(), on_disk))
            .await?;
    }

    let coordinator = PersistenceCoordinator::new(
        Arc::new(FsBlobStore::new(&args.root)),
        Arc::new(InMemoryTtlCache::new()),
        ledger,
        CoordinatorConfig::new().with_default_quota(args.default_quota),
    );

    match args.command {
        Command::Save {
            key,
            data,
            max_size,
        } => {
            let payload = match data {
                Some(inline) => inline.into_bytes(),
                None => {
                    let mut buf = Vec::new();
                    std::io::stdin().read_to_end(&mut buf)?;
                    buf
                }
            };
            coordinator
                .save(&tenant, &plugin, max_size, &key, &payload)
                .await?;
            info!(key = %key, bytes = payload.len(), "saved");
        }
        Command::Load { key } => {
            let data = coordinator.load(&tenant, &plugin, &key).await?;
            std::io::stdout().write_all(&data)?;
        }
        Command::Delete { key } => {
            coordinator.delete(&tenant, &plugin, &key).await?;
            info!(key = %key, "deleted");
        }
        Command::Usage => {
            let usage = coordinator.usage(&tenant, &plugin).await?;
            println!("{}", serde_json::to_string_pretty(&usage)?);
        }
    }

    Ok(())
}

/// Total bytes stored on disk for this (tenant, plugin).
async fn bytes_on_disk(root: &Path, tenant: &TenantId, plugin: &PluginId) -> anyhow::Result<u64> {
    let plugin_dir = root.join(tenant.as_str()).join(plugin.as_str());
    let mut entries = match tokio::fs::read_dir(&plugin_dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e.into()),
    };

    let mut total: u64 = 0;
    while let Some(entry) = entries.next_entry().await? {
        total += entry.metadata().await?.len();
    }
    Ok(total)
}

// =============================================================================
// Logging Setup
// =============================================================================

fn init_logging(args: &Args) {
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if args.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true))
            .init();
    }
}
