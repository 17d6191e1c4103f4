//! Encrypted configuration store
//!
//! Secrets and user preferences live in a single JSON document encrypted at
//! rest with ChaCha20-Poly1305. The on-disk blob is hex(nonce || ciphertext);
//! the 256-bit key arrives out-of-band (environment) and is never written to
//! disk. An absent store file is a normal first-run condition and decrypts to
//! the default config; anything present but unreadable is a corrupt-config
//! condition, never a silent wrong value.

use std::fs;
use std::path::PathBuf;

use chacha20poly1305::{
    aead::{rand_core::RngCore, Aead, OsRng},
    ChaCha20Poly1305, KeyInit, Nonce,
};
use serde::{Deserialize, Serialize};

use crate::error::{NinesError, Result};

const KEY_LEN: usize = 32;
const NONCE_LEN: usize = 12;

/// Decrypted form of the configuration store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SecureConfig {
    /// API key for the chat completion service
    #[serde(default)]
    pub api_key: String,
    /// Free-form user preferences
    #[serde(default)]
    pub user_prefs: serde_json::Map<String, serde_json::Value>,
}

/// Handle on the encrypted store at a fixed path.
///
/// The file is opened and closed per operation; nothing is cached between
/// calls.
#[derive(Debug)]
pub struct SecureConfigStore {
    path: PathBuf,
    key: [u8; KEY_LEN],
}

impl SecureConfigStore {
    /// Create a store handle from a hex-encoded 256-bit key.
    pub fn new(path: impl Into<PathBuf>, key_hex: &str) -> Result<Self> {
        Ok(Self {
            path: path.into(),
            key: decode_key(key_hex)?,
        })
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Read and decrypt the store. A missing file yields the default config.
    pub fn load(&self) -> Result<SecureConfig> {
        if !self.path.exists() {
            return Ok(SecureConfig::default());
        }

        let blob = fs::read_to_string(&self.path)
            .map_err(|e| NinesError::ConfigCorrupt(format!("cannot read store: {}", e)))?;
        let combined = hex::decode(blob.trim())
            .map_err(|e| NinesError::ConfigCorrupt(format!("store is not valid hex: {}", e)))?;
        if combined.len() < NONCE_LEN {
            return Err(NinesError::ConfigCorrupt(
                "store blob shorter than a nonce".to_string(),
            ));
        }

        let (nonce, ciphertext) = combined.split_at(NONCE_LEN);
        let cipher = ChaCha20Poly1305::new_from_slice(&self.key)
            .map_err(|e| NinesError::ConfigCorrupt(format!("cipher init failed: {}", e)))?;
        let plaintext = cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| {
                NinesError::ConfigCorrupt("decryption failed (wrong key or tampered data)".to_string())
            })?;

        let text = String::from_utf8(plaintext)
            .map_err(|e| NinesError::ConfigCorrupt(format!("store is not UTF-8: {}", e)))?;
        serde_json::from_str(&text)
            .map_err(|e| NinesError::ConfigCorrupt(format!("store is not valid JSON: {}", e)))
    }

    /// Encrypt and overwrite the store with a fresh random nonce.
    pub fn save(&self, config: &SecureConfig) -> Result<()> {
        let plaintext = serde_json::to_vec(config)?;

        let cipher = ChaCha20Poly1305::new_from_slice(&self.key)
            .map_err(|e| NinesError::ConfigCorrupt(format!("cipher init failed: {}", e)))?;
        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce_bytes);
        let ciphertext = cipher
            .encrypt(Nonce::from_slice(&nonce_bytes), plaintext.as_ref())
            .map_err(|e| NinesError::ConfigCorrupt(format!("encryption failed: {}", e)))?;

        let mut combined = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        combined.extend_from_slice(&nonce_bytes);
        combined.extend_from_slice(&ciphertext);

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, hex::encode(combined))?;
        Ok(())
    }
}

fn decode_key(key_hex: &str) -> Result<[u8; KEY_LEN]> {
    let bytes = hex::decode(key_hex.trim())
        .map_err(|e| NinesError::ConfigCorrupt(format!("config key is not valid hex: {}", e)))?;
    bytes.try_into().map_err(|_| {
        NinesError::ConfigCorrupt("config key must be 64 hex characters (32 bytes)".to_string())
    })
}
