//! Workspace layout and environment bootstrap
//!
//! The assistant owns a fixed directory tree rooted at the configured
//! workspace path. `Workspace::ensure` brings the tree into existence and
//! seeds required default files; it never touches data that is already
//! there, so running it on every startup is safe.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::json;
use tracing::{debug, info};

use crate::error::{NinesError, Result};

/// Directories required under the workspace root, relative paths.
pub const REQUIRED_DIRS: [&str; 6] = [
    "config",
    "scripts",
    "memory_db",
    "obsidian_vault",
    "libreoffice_docs",
    "thunderbird_data/profile",
];

/// A workspace root plus the well-known paths inside it.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding the personality profile and encrypted config.
    pub fn config_dir(&self) -> PathBuf {
        self.root.join("config")
    }

    /// Markdown note vault targeted by `create_note`.
    pub fn vault_dir(&self) -> PathBuf {
        self.root.join("obsidian_vault")
    }

    /// Output directory for generated office documents.
    pub fn documents_dir(&self) -> PathBuf {
        self.root.join("libreoffice_docs")
    }

    /// Personality profile document (seeded on first run).
    pub fn personality_path(&self) -> PathBuf {
        self.config_dir().join("personality.json")
    }

    /// Encrypted configuration store.
    pub fn encrypted_config_path(&self) -> PathBuf {
        self.config_dir().join("encrypted.cfg")
    }

    /// SQLite interaction log.
    pub fn memory_db_path(&self) -> PathBuf {
        self.root.join("memory_db").join("memory.sqlite")
    }

    /// Create every required directory and seed default files that are
    /// absent. Idempotent; existing files and directories are left alone.
    pub fn ensure(&self) -> Result<()> {
        for dir in REQUIRED_DIRS {
            let path = self.root.join(dir);
            fs::create_dir_all(&path)
                .map_err(|e| NinesError::Setup(format!("cannot create {}: {}", path.display(), e)))?;
        }

        let personality = self.personality_path();
        if !personality.exists() {
            let content = serde_json::to_string_pretty(&default_personality())
                .map_err(|e| NinesError::Setup(format!("cannot render personality seed: {}", e)))?;
            fs::write(&personality, content).map_err(|e| {
                NinesError::Setup(format!("cannot write {}: {}", personality.display(), e))
            })?;
            info!(path = %personality.display(), "seeded default personality profile");
        }

        debug!(root = %self.root.display(), "workspace ready");
        Ok(())
    }
}

/// Canonical seed content for `config/personality.json`.
fn default_personality() -> serde_json::Value {
    json!({
        "acknowledge": [
            "Roger that...",
            "Affirmative. Task complete."
        ],
        "error": [
            "System error detected: {error}",
            "Alert: {error}"
        ]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_ensure_creates_tree() {
        let dir = tempdir().unwrap();
        let ws = Workspace::new(dir.path());

        ws.ensure().unwrap();

        for required in REQUIRED_DIRS {
            assert!(dir.path().join(required).is_dir(), "missing {}", required);
        }
        assert!(ws.personality_path().is_file());
    }

    #[test]
    fn test_ensure_is_idempotent() {
        let dir = tempdir().unwrap();
        let ws = Workspace::new(dir.path());

        ws.ensure().unwrap();
        ws.ensure().unwrap();

        assert!(ws.vault_dir().is_dir());
    }

    #[test]
    fn test_ensure_keeps_existing_personality() {
        let dir = tempdir().unwrap();
        let ws = Workspace::new(dir.path());
        fs::create_dir_all(ws.config_dir()).unwrap();
        fs::write(ws.personality_path(), r#"{"acknowledge":["Hi."],"error":["Bad: {error}"]}"#)
            .unwrap();

        ws.ensure().unwrap();

        let content = fs::read_to_string(ws.personality_path()).unwrap();
        assert!(content.contains("Hi."));
        assert!(!content.contains("Roger that"));
    }

    #[test]
    fn test_seed_has_required_categories() {
        let seed = default_personality();
        let acknowledge = seed.get("acknowledge").and_then(|v| v.as_array()).unwrap();
        let error = seed.get("error").and_then(|v| v.as_array()).unwrap();
        assert!(!acknowledge.is_empty());
        assert!(!error.is_empty());
        assert!(error.iter().all(|t| t.as_str().unwrap().contains("{error}")));
    }

    #[test]
    fn test_paths_compose_from_root() {
        let ws = Workspace::new("/srv/nines");
        assert_eq!(
            ws.personality_path(),
            PathBuf::from("/srv/nines/config/personality.json")
        );
        assert_eq!(
            ws.encrypted_config_path(),
            PathBuf::from("/srv/nines/config/encrypted.cfg")
        );
        assert_eq!(
            ws.memory_db_path(),
            PathBuf::from("/srv/nines/memory_db/memory.sqlite")
        );
    }
}
