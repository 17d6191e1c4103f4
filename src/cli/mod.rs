//! Command parsing and dispatch
//!
//! All CLI logic lives here. `main.rs` calls `cli::run()`. With no
//! subcommand the interactive session starts, which is the normal way to use
//! the assistant; the subcommands exist for inspection and scripting.

mod session;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, warn};

use nines::actions::{LibreOfficeService, WorkspaceActions};
use nines::chat::DeepSeekClient;
use nines::config::Settings;
use nines::dispatcher::IntentDispatcher;
use nines::memory::InteractionMemory;
use nines::personality::{PersonalityFormatter, PersonalityProfile, RandomChooser};
use nines::secure_config::{SecureConfig, SecureConfigStore};
use nines::updater::{SelfUpdater, UpdateOutcome};
use nines::workspace::{Workspace, REQUIRED_DIRS};

#[derive(Parser)]
#[command(name = "nines")]
#[command(version)]
#[command(about = "Self-maintaining local personal assistant", long_about = None)]
struct Cli {
    /// Workspace root (default: ~/nines, or NINES_WORKSPACE)
    #[arg(long, global = true)]
    workspace: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the interactive session (default when no command is given)
    Run {
        /// Skip the startup self-update check
        #[arg(long)]
        no_update: bool,
    },
    /// Show workspace and configuration status
    Status,
    /// List recent interactions
    Memory {
        /// Maximum number of interactions to show
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Read or write the encrypted config store
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print a config value (api_key is masked)
    Get {
        /// `api_key` or a user preference name
        key: String,
    },
    /// Set a config value
    Set {
        /// `api_key` or a user preference name
        key: String,
        /// Value to store
        value: String,
    },
}

/// Entry point for the CLI, called from main().
pub async fn run() -> Result<()> {
    // .env before settings so NINES_* lines are visible to the loader
    dotenvy::dotenv().ok();

    let mut settings = Settings::load();
    nines::utils::logging::init_logging(&settings.logging);

    let cli = Cli::parse();
    if let Some(workspace) = cli.workspace {
        settings.workspace = workspace;
    }

    match cli.command {
        None => run_assistant(&settings, false).await,
        Some(Commands::Run { no_update }) => run_assistant(&settings, no_update).await,
        Some(Commands::Status) => cmd_status(&settings),
        Some(Commands::Memory { limit }) => cmd_memory(&settings, limit),
        Some(Commands::Config { action }) => cmd_config(&settings, action),
    }
}

/// Bootstrap, self-update, wire the pipeline, hand over to the session loop.
async fn run_assistant(settings: &Settings, no_update: bool) -> Result<()> {
    let workspace = Workspace::new(settings.workspace.clone());
    // Best effort: a partially prepared workspace still lets the session start.
    if let Err(e) = workspace.ensure() {
        warn!(error = %e, "workspace bootstrap incomplete");
    }

    if !no_update {
        self_update_step(settings).await;
    }

    let secure_config = load_secure_config(settings, &workspace);

    let profile = PersonalityProfile::load(&workspace.personality_path())
        .context("personality profile unusable")?;

    let memory = InteractionMemory::new(workspace.memory_db_path());
    memory.init().context("interaction memory unusable")?;

    let chat = Arc::new(DeepSeekClient::new(
        &secure_config.api_key,
        &settings.api_base,
        &settings.model,
    ));
    let actions = WorkspaceActions::new(
        workspace.vault_dir(),
        Box::new(LibreOfficeService::new(workspace.documents_dir())),
    );
    let formatter = PersonalityFormatter::new(profile, Box::new(RandomChooser::new()));
    let mut dispatcher = IntentDispatcher::new(chat, Box::new(actions), memory, formatter);

    session::run_loop(&mut dispatcher).await
}

/// Startup self-update. Any failure is logged and the session starts on the
/// old code; only a successful swap leads to a relaunch.
async fn self_update_step(settings: &Settings) {
    let Some(base_url) = settings.update_url.as_deref() else {
        debug!("no update URL configured, skipping self-update");
        return;
    };

    let binary = match std::env::current_exe() {
        Ok(path) => path,
        Err(e) => {
            warn!(error = %e, "cannot locate own binary, skipping self-update");
            return;
        }
    };

    let updater = SelfUpdater::new(binary, base_url);
    match updater.check_and_apply().await {
        Ok(UpdateOutcome::UpToDate) => debug!("binary up to date"),
        Ok(UpdateOutcome::Applied) => {
            println!("Update applied. Restarting...");
            // Returns only on failure; the session then continues on old code.
            if let Err(e) = updater.relaunch() {
                warn!(error = %e, "relaunch failed, continuing without restart");
            }
        }
        Err(e) => warn!(error = %e, "self-update failed"),
    }
}

/// Decrypt the config store, degrading to defaults when the key is absent or
/// the store is unusable. Corruption is reported, never fatal here.
fn load_secure_config(settings: &Settings, workspace: &Workspace) -> SecureConfig {
    let Some(key) = settings.config_key.as_deref() else {
        warn!("NINES_CONFIG_KEY not set, starting with empty config");
        return SecureConfig::default();
    };

    let store = match SecureConfigStore::new(workspace.encrypted_config_path(), key) {
        Ok(store) => store,
        Err(e) => {
            warn!(error = %e, "config key unusable, starting with empty config");
            return SecureConfig::default();
        }
    };

    match store.load() {
        Ok(config) => config,
        Err(e) => {
            warn!(error = %e, "encrypted config unusable, starting with defaults");
            SecureConfig::default()
        }
    }
}

/// Show workspace and configuration status.
fn cmd_status(settings: &Settings) -> Result<()> {
    let workspace = Workspace::new(settings.workspace.clone());

    println!("Nines Status");
    println!("============");
    println!();
    println!("  Version:   {}", env!("CARGO_PKG_VERSION"));
    println!("  Workspace: {}", workspace.root().display());
    println!();

    println!("Directories");
    println!("-----------");
    for dir in REQUIRED_DIRS {
        let state = if workspace.root().join(dir).is_dir() {
            "present"
        } else {
            "missing"
        };
        println!("  {:<26} {}", dir, state);
    }
    println!();

    println!("Configuration");
    println!("-------------");
    let personality = match PersonalityProfile::load(&workspace.personality_path()) {
        Ok(profile) => format!("{} categories", profile.category_count()),
        Err(_) => "missing or invalid".to_string(),
    };
    println!("  Personality:      {}", personality);
    let encrypted = if workspace.encrypted_config_path().exists() {
        "present"
    } else {
        "not created yet"
    };
    println!("  Encrypted config: {}", encrypted);
    let key_state = if settings.config_key.is_some() {
        "set"
    } else {
        "not set"
    };
    println!("  Config key:       {}", key_state);
    let update = settings.update_url.as_deref().unwrap_or("disabled");
    println!("  Update source:    {}", update);
    println!("  Chat endpoint:    {}", settings.api_base);
    println!();

    println!("Memory");
    println!("------");
    let memory = InteractionMemory::new(workspace.memory_db_path());
    if memory.db_path().exists() {
        match memory.count() {
            Ok(count) => println!("  Interactions: {}", count),
            Err(e) => println!("  Interactions: unreadable ({})", e),
        }
    } else {
        println!("  Interactions: none recorded yet");
    }

    Ok(())
}

/// List recent interactions, newest first.
fn cmd_memory(settings: &Settings, limit: usize) -> Result<()> {
    let workspace = Workspace::new(settings.workspace.clone());
    let memory = InteractionMemory::new(workspace.memory_db_path());

    // Inspecting an empty workspace must not create the database.
    if !memory.db_path().exists() {
        println!("No interactions recorded yet.");
        return Ok(());
    }

    let records = memory.recent(limit)?;
    if records.is_empty() {
        println!("No interactions recorded yet.");
        return Ok(());
    }

    for record in records {
        println!(
            "[{}] {}",
            record.id,
            record.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
        );
        println!("  > {}", record.user_input);
        println!("  < {}", record.response);
    }
    Ok(())
}

/// Read or write the encrypted config store.
fn cmd_config(settings: &Settings, action: ConfigAction) -> Result<()> {
    let key_hex = settings
        .config_key
        .as_deref()
        .context("NINES_CONFIG_KEY is not set")?;
    let workspace = Workspace::new(settings.workspace.clone());
    let store = SecureConfigStore::new(workspace.encrypted_config_path(), key_hex)?;

    match action {
        ConfigAction::Get { key } => {
            let config = store.load()?;
            match key.as_str() {
                "api_key" => println!("api_key = {}", mask(&config.api_key)),
                other => match config.user_prefs.get(other) {
                    Some(value) => println!("{} = {}", other, value),
                    None => println!("{} is not set", other),
                },
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = store.load()?;
            match key.as_str() {
                "api_key" => config.api_key = value,
                other => {
                    config
                        .user_prefs
                        .insert(other.to_string(), serde_json::Value::String(value));
                }
            }
            store.save(&config)?;
            println!("{} updated", key);
        }
    }
    Ok(())
}

fn mask(secret: &str) -> String {
    if secret.is_empty() {
        return "(not set)".to_string();
    }
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}
