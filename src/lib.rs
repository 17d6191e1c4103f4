//! Nines - Self-maintaining local personal assistant

pub mod actions;
pub mod chat;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod intent;
pub mod memory;
pub mod personality;
pub mod secure_config;
pub mod updater;
pub mod utils;
pub mod workspace;

pub use chat::{ChatCompletionClient, DeepSeekClient};
pub use config::Settings;
pub use dispatcher::IntentDispatcher;
pub use error::{NinesError, Result};
pub use intent::Intent;
pub use memory::{InteractionMemory, InteractionRecord};
pub use personality::{PersonalityFormatter, PersonalityProfile, RandomChooser, TemplateChooser};
pub use secure_config::{SecureConfig, SecureConfigStore};
pub use updater::{SelfUpdater, UpdateOutcome};
pub use workspace::Workspace;
