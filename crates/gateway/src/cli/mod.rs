pub mod config;
pub mod init;

use clap::{Parser, Subcommand};

/// wabridge — a WhatsApp messaging bridge.
#[derive(Debug, Parser)]
#[command(name = "wabridge", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the bridge server (default when no subcommand is given).
    Serve,
    /// Configuration utilities.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Initialize a new wabridge deployment in the current directory.
    Init {
        /// Skip interactive prompts and use sensible defaults (filesystem storage).
        #[arg(long)]
        defaults: bool,
    },
    /// Print version information.
    Version,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Parse the config file and report any errors.
    Validate,
    /// Dump the resolved configuration (with defaults) as TOML.
    Show,
}

// ── Config loading helper ─────────────────────────────────────────────

/// Load the configuration from the path specified by `WABRIDGE_CONFIG` (or
/// `wabridge.toml` by default).  Returns the parsed [`Config`] and the
/// path that was used.
///
/// This is shared by `serve` and the `config` subcommands so the logic
/// lives in one place.
pub fn load_config() -> anyhow::Result<(wb_core::Config, String)> {
    let config_path =
        std::env::var("WABRIDGE_CONFIG").unwrap_or_else(|_| "wabridge.toml".into());

    let config = if std::path::Path::new(&config_path).exists() {
        let raw = std::fs::read_to_string(&config_path)
            .map_err(|e| anyhow::anyhow!("reading {config_path}: {e}"))?;
        toml::from_str(&raw)
            .map_err(|e| anyhow::anyhow!("parsing {config_path}: {e}"))?
    } else {
        wb_core::Config::default()
    };

    Ok((config, config_path))
}
