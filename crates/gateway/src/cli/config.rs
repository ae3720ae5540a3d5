//! `wabridge config` subcommands.
//!
//! `validate` runs the same checks `serve` runs at startup and sets the exit
//! code; `show` dumps the effective TOML with every default filled in.

use wb_core::config::{Config, ConfigSeverity, StorageBackend, TransportKind};

/// Validate the config, printing each issue. Returns `false` when at least
/// one error-severity issue is present.
pub fn validate(config: &Config, config_path: &str) -> bool {
    let issues = config.validate();

    if issues.is_empty() {
        println!("Config OK ({config_path})");
        print_effective(config);
        return true;
    }

    for issue in &issues {
        println!("{issue}");
    }

    let errors = issues
        .iter()
        .filter(|e| e.severity == ConfigSeverity::Error)
        .count();
    let warnings = issues.len() - errors;
    println!();
    println!("{errors} error(s), {warnings} warning(s) in {config_path}");

    errors == 0
}

/// Dump the resolved config (defaults filled in) as TOML. Kept as pure TOML
/// so the output can be piped straight into a fresh `wabridge.toml`.
pub fn show(config: &Config) {
    match toml::to_string_pretty(config) {
        Ok(rendered) => print!("{rendered}"),
        Err(e) => {
            eprintln!("Failed to serialize config: {e}");
            std::process::exit(1);
        }
    }
}

/// One line per concern: where the bridge listens, where credentials live,
/// which transport runs, and how reconnects behave.
fn print_effective(config: &Config) {
    println!(
        "  listen     http://{}:{}",
        config.server.host, config.server.port
    );
    println!("  session    {}", config.session.id);
    match config.storage.backend {
        StorageBackend::Filesystem => println!(
            "  storage    filesystem ({})",
            config.storage.dir.display()
        ),
        StorageBackend::Remote => {
            println!("  storage    remote ({})", config.storage.base_url)
        }
    }
    match config.transport.kind {
        TransportKind::Sim => println!(
            "  transport  sim (pairs as {})",
            config.transport.sim_identity
        ),
    }

    let r = &config.reconnect;
    let attempts = match r.max_attempts {
        0 => "unlimited attempts".to_owned(),
        n => format!("up to {n} attempts"),
    };
    if r.backoff_factor > 1.0 {
        println!(
            "  reconnect  {}ms growing x{} to {}ms, {attempts}",
            r.delay_ms, r.backoff_factor, r.max_delay_ms
        );
    } else {
        println!("  reconnect  every {}ms, {attempts}", r.delay_ms);
    }
}
