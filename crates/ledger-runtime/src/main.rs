//! # Ledger Runtime
//!
//! Operator tooling around the ledger application.
//!
//! ```text
//! ledger-runtime init     --output genesis.json [--config ledger.json]
//! ledger-runtime validate --genesis genesis.json [--config ledger.json]
//! ledger-runtime migrate  --genesis old.json --output new.json [--target 3]
//! ledger-runtime export   --genesis genesis.json --output out.json [--prune]
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ledger_runtime::{GenesisState, LedgerApp, LedgerConfig, MigrationPipeline, GENESIS_VERSION};
use ledger_telemetry::{init_telemetry, TelemetryConfig};
use tracing::info;

#[derive(Parser)]
#[command(name = "ledger-runtime")]
#[command(about = "Enterprise ledger genesis and migration tooling", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write an empty genesis built from the config
    Init {
        #[arg(short, long)]
        output: PathBuf,

        /// Ledger config file. The built-in default has no signers
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Import a genesis file and run every invariant check
    Validate {
        #[arg(short, long)]
        genesis: PathBuf,

        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Rewrite an older genesis layout
    Migrate {
        #[arg(short, long)]
        genesis: PathBuf,

        #[arg(short, long)]
        output: PathBuf,

        /// Target layout version
        #[arg(short, long, default_value_t = GENESIS_VERSION)]
        target: u64,

        /// Config whose anchor params fill the new storage fields
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Import a genesis and export it again, optionally pruned
    Export {
        #[arg(short, long)]
        genesis: PathBuf,

        #[arg(short, long)]
        output: PathBuf,

        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Drop anchor records beyond each chain's limit first
        #[arg(long)]
        prune: bool,
    },
}

fn load_config(path: Option<&Path>) -> Result<LedgerConfig> {
    match path {
        Some(path) => Ok(LedgerConfig::from_json_file(path)?),
        None => Ok(LedgerConfig::default()),
    }
}

fn load_genesis(path: &Path) -> Result<GenesisState> {
    let json = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    GenesisState::from_json(&json).with_context(|| format!("parsing {}", path.display()))
}

fn write_json(path: &Path, json: &str) -> Result<()> {
    std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut telemetry = TelemetryConfig::from_env();
    if cli.verbose {
        telemetry.log_level = "debug".to_string();
    }
    init_telemetry(telemetry)?;

    match cli.command {
        Commands::Init { output, config } => {
            let config = load_config(config.as_deref())?;
            let genesis = GenesisState::new(&config);
            genesis.validate().context("config produces an invalid genesis")?;
            write_json(&output, &genesis.to_json_pretty()?)?;
            info!("wrote empty genesis to {}", output.display());
        }
        Commands::Validate { genesis, config } => {
            let config = load_config(config.as_deref())?;
            let state = load_genesis(&genesis)?;
            let mut app = LedgerApp::from_genesis(config, &state)?;
            let totals = app.assert_invariants()?;
            info!(
                "{} is valid: {} locked, {} purchase orders, {} chains",
                genesis.display(),
                totals.total_locked,
                state.orders.purchase_orders.len(),
                state.anchor.chains.len()
            );
        }
        Commands::Migrate {
            genesis,
            output,
            target,
            config,
        } => {
            let pipeline = match config.as_deref() {
                Some(path) => MigrationPipeline::standard_with(&load_config(Some(path))?.anchor),
                None => MigrationPipeline::standard(),
            };
            let json = std::fs::read_to_string(&genesis).with_context(|| format!("reading {}", genesis.display()))?;
            let value: serde_json::Value = serde_json::from_str(&json)?;
            let migrated = pipeline.migrate(value, target)?;
            if target == GENESIS_VERSION {
                // must load under the current layout
                let state: GenesisState = serde_json::from_value(migrated.clone())?;
                state.validate().context("migrated genesis is invalid")?;
            }
            write_json(&output, &serde_json::to_string_pretty(&migrated)?)?;
            info!("migrated {} to version {} at {}", genesis.display(), target, output.display());
        }
        Commands::Export {
            genesis,
            output,
            config,
            prune,
        } => {
            let config = load_config(config.as_deref())?;
            let state = load_genesis(&genesis)?;
            let mut app = LedgerApp::from_genesis(config, &state)?;
            if prune {
                let pruned = app.prune_anchor_storage()?;
                info!("pruned {} anchor records", pruned);
            }
            let exported = app.export_genesis()?;
            write_json(&output, &exported.to_json_pretty()?)?;
            info!("exported genesis to {}", output.display());
        }
    }

    Ok(())
}
