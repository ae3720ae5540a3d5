use std::path::Path;

// ── Public entry point ───────────────────────────────────────────────

/// Scaffold a new wabridge deployment in the current directory.
///
/// When `use_defaults` is `true` the filesystem storage backend is used
/// without any interactive prompts.  Otherwise the user is asked to pick
/// where credentials should live.
pub fn init(use_defaults: bool) -> anyhow::Result<()> {
    init_in(Path::new("."), use_defaults)
}

// ── Core implementation (directory-parameterised for testability) ─────

fn init_in(base: &Path, use_defaults: bool) -> anyhow::Result<()> {
    let config_path = base.join("wabridge.toml");

    if config_path.exists() {
        anyhow::bail!(
            "wabridge.toml already exists. Use a different directory or remove it first."
        );
    }

    let (backend, base_url) = if use_defaults {
        ("filesystem".to_owned(), None)
    } else {
        prompt_backend()?
    };

    // ── Generate files ───────────────────────────────────────────────
    let config_content = render_config(&backend, base_url.as_deref());

    std::fs::write(&config_path, config_content)?;

    // ── Create directories ───────────────────────────────────────────
    std::fs::create_dir_all(base.join("wa-auth"))?;

    // ── Success message ──────────────────────────────────────────────
    eprintln!();
    eprintln!("  wabridge deployment initialized!");
    eprintln!();
    eprintln!("  Created:");
    eprintln!("    wabridge.toml - bridge configuration");
    eprintln!("    wa-auth/      - credential storage directory");
    eprintln!();
    eprintln!("  Next steps:");
    eprintln!("    1. Set WABRIDGE_API_TOKEN to protect the HTTP API");
    eprintln!("    2. Run `wabridge` to start the server");
    eprintln!("    3. POST /v1/session/start and scan the QR from the logs");
    eprintln!();

    Ok(())
}

// ── Interactive backend selection ────────────────────────────────────

fn prompt_backend() -> anyhow::Result<(String, Option<String>)> {
    eprintln!();
    eprintln!("  Welcome to wabridge!");
    eprintln!("  Let's set up your deployment.\n");

    let choice = prompt(
        "  Where should session credentials be stored?\n  [1] Filesystem  [2] Remote HTTP store\n  >",
    );

    match choice.as_str() {
        "1" => Ok(("filesystem".to_owned(), None)),
        "2" => {
            let base_url = prompt("  Store base URL (e.g. \"http://localhost:7070\"):");
            if base_url.is_empty() {
                anyhow::bail!("A base URL is required for the remote backend.");
            }
            Ok(("remote".to_owned(), Some(base_url)))
        }
        _ => {
            eprintln!("  Invalid choice, defaulting to filesystem.");
            Ok(("filesystem".to_owned(), None))
        }
    }
}

fn prompt(question: &str) -> String {
    eprint!("{question} ");
    let mut input = String::new();
    std::io::stdin().read_line(&mut input).unwrap_or_default();
    input.trim().to_string()
}

// ── Template rendering ───────────────────────────────────────────────

fn render_config(backend: &str, base_url: Option<&str>) -> String {
    let storage_extra = match base_url {
        Some(url) => format!("base_url = \"{url}\"\n"),
        None => String::new(),
    };

    format!(
        r#"# wabridge configuration
# Values shown are the defaults; uncomment to override.

[server]
port = 3200
host = "127.0.0.1"
# Env var holding the API bearer token (unset = open dev mode).
# api_token_env = "WABRIDGE_API_TOKEN"

[server.cors]
# allowed_origins = ["http://localhost:*", "http://127.0.0.1:*"]

[session]
id = "default"
# Print QR challenges to the terminal while authenticating.
log_qr = true

[storage]
backend = "{backend}"
dir = "./wa-auth"
{storage_extra}
[transport]
kind = "sim"
# sim_identity = "15550009999"

[reconnect]
# Delay before reconnect attempts, in milliseconds.
delay_ms = 5000
# 0 = retry forever.
max_attempts = 0
"#
    )
}

// ── Tests ────────────────────────────────────────────────────────────
