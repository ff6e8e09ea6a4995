//! # Vault Recall CLI (`recall`)
//!
//! The `recall` binary is the shell around the sync engine, standing in for
//! a host application's plugin surface. It wires config, the HTTP backend,
//! and persisted state into a [`SyncEngine`] and maps engine errors to
//! user-facing messages.
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `recall init` | Scaffold a starter config file |
//! | `recall sync` | Upload changed notes to the remote index |
//! | `recall stats` | Show sync-state counts |
//! | `recall ask "<question>"` | Ask a question (plain or vault-grounded) |
//! | `recall index list` | Enumerate remote indexes |
//! | `recall index delete` | Delete the active index and clear sync state |
//!
//! ## Examples
//!
//! ```bash
//! recall init
//! recall sync --progress human
//! recall sync --scope projects/ --dry-run
//! recall ask "what did I decide about the roadmap?" --grounded
//! recall stats
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use vault_recall::backend::HttpBackend;
use vault_recall::config;
use vault_recall::engine::SyncEngine;
use vault_recall::error::EngineError;
use vault_recall::models::QueryMode;
use vault_recall::progress::ProgressMode;
use vault_recall::uploader::CancelFlag;

/// Vault Recall — sync a note vault into a remote retrieval index and ask
/// grounded questions against it.
#[derive(Parser)]
#[command(
    name = "recall",
    about = "Vault Recall — vault synchronization and retrieval-grounded queries",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./recall.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scaffold a starter config file.
    Init,

    /// Upload changed notes to the remote index.
    ///
    /// Only documents whose content fingerprint differs from the last
    /// recorded sync state are uploaded. Failures are counted per item and
    /// retried naturally on the next run.
    Sync {
        /// Restrict the sync to a vault path prefix (e.g. `projects/`).
        #[arg(long)]
        scope: Option<String>,

        /// Show the delta without uploading anything.
        #[arg(long)]
        dry_run: bool,

        /// Ignore recorded fingerprints and re-upload every note.
        #[arg(long)]
        full: bool,

        /// Progress output: `auto`, `off`, `human`, or `json` (stderr).
        #[arg(long, default_value = "auto")]
        progress: String,
    },

    /// Show sync-state counts (total / synced / pending).
    Stats,

    /// Ask a question.
    Ask {
        /// The question text.
        question: String,

        /// Ground the answer in the synced vault index (requires a prior
        /// sync) and append citations.
        #[arg(long)]
        grounded: bool,
    },

    /// Manage the remote index.
    Index {
        #[command(subcommand)]
        action: IndexAction,
    },
}

#[derive(Subcommand)]
enum IndexAction {
    /// Enumerate remote indexes.
    List,
    /// Delete the active index and clear all sync state.
    Delete {
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
}

const STARTER_CONFIG: &str = r#"[vault]
root = "./vault"
include_globs = ["**/*.md", "**/*.txt"]
exclude_globs = []

[backend]
model = "gemini-2.0-flash"
poll_interval_secs = 5
max_poll_attempts = 36

[index]
display_name = "vault-recall"

[state]
path = "./recall.state.json"
"#;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Commands::Init = cli.command {
        if cli.config.exists() {
            anyhow::bail!("config already exists: {}", cli.config.display());
        }
        std::fs::write(&cli.config, STARTER_CONFIG)?;
        println!("Wrote {}", cli.config.display());
        println!("Set GEMINI_API_KEY and edit the vault root, then run `recall sync`.");
        return Ok(());
    }

    let cfg = config::load_config(&cli.config)?;
    let backend = Arc::new(HttpBackend::new(&cfg.backend).map_err(user_message)?);
    let engine = SyncEngine::new(cfg, backend).map_err(user_message)?;

    match cli.command {
        Commands::Init => unreachable!(),

        Commands::Sync {
            scope,
            dry_run,
            full,
            progress,
        } => {
            if dry_run {
                let delta = engine
                    .preview_delta(scope.as_deref())
                    .await
                    .map_err(user_message)?;
                println!("sync (dry-run)");
                println!("  notes needing upload: {}", delta.len());
                for doc in &delta {
                    println!("  {}", doc.id);
                }
                return Ok(());
            }

            let mode = match progress.as_str() {
                "auto" => ProgressMode::default_for_tty(),
                "off" => ProgressMode::Off,
                "human" => ProgressMode::Human,
                "json" => ProgressMode::Json,
                other => anyhow::bail!("unknown progress mode: {}", other),
            };
            let reporter = mode.reporter();

            let cancel = CancelFlag::new();
            let ctrl_c_cancel = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    eprintln!("cancelling after the current note...");
                    ctrl_c_cancel.cancel();
                }
            });

            let summary = engine
                .sync_vault(scope.as_deref(), reporter.as_ref(), &cancel, full)
                .await
                .map_err(user_message)?;

            println!("sync");
            println!("  uploaded:  {}", summary.success);
            println!("  failed:    {}", summary.failed);
            println!("  unchanged: {}", summary.skipped);
            println!("ok");
        }

        Commands::Stats => {
            let stats = engine.get_sync_stats().await;
            let index = engine.active_index().await;
            println!("Vault Recall — Sync Stats");
            println!("=========================");
            println!();
            println!("  Index:   {}", match &index {
                Some(handle) => handle.to_string(),
                None => "none".to_string(),
            });
            println!("  Total:   {}", stats.total);
            println!("  Synced:  {}", stats.synced);
            println!("  Pending: {}", stats.pending);
        }

        Commands::Ask { question, grounded } => {
            let mode = if grounded {
                QueryMode::Grounded
            } else {
                QueryMode::Plain
            };
            let answer = engine.query(&question, mode).await.map_err(user_message)?;

            print!("{}", answer.text);
            if let Some(sources) = answer.citations {
                print!("{}", sources);
            }
            println!();
        }

        Commands::Index { action } => match action {
            IndexAction::List => {
                let indexes = engine.list_indexes().await.map_err(user_message)?;
                if indexes.is_empty() {
                    println!("No remote indexes.");
                }
                for handle in indexes {
                    println!("{}", handle);
                }
            }
            IndexAction::Delete { yes } => {
                if !yes {
                    anyhow::bail!(
                        "deleting the index clears all sync state; re-run with --yes to confirm"
                    );
                }
                engine.delete_index().await.map_err(user_message)?;
                println!("Index deleted; sync state cleared.");
            }
        },
    }

    Ok(())
}

/// Map engine errors to the messages users should see. The raw error stays
/// in the diagnostic log only.
fn user_message(err: EngineError) -> anyhow::Error {
    tracing::debug!("engine error: {:?}", err);
    match &err {
        EngineError::RateLimited => {
            anyhow::anyhow!("The backend is rate limiting requests. Wait a moment and retry.")
        }
        EngineError::AuthFailed => {
            anyhow::anyhow!("Authentication failed. Check the GEMINI_API_KEY environment variable.")
        }
        EngineError::NotSynced => {
            anyhow::anyhow!("The vault has not been synced yet. Run `recall sync` first.")
        }
        EngineError::ContentBlocked => {
            anyhow::anyhow!("The backend's content filter blocked this request.")
        }
        _ => anyhow::Error::new(err),
    }
}
