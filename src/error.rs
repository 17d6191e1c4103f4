//! Error types for Nines
//!
//! This module defines all error types used throughout the assistant.
//! Uses `thiserror` for ergonomic error handling with automatic `Display` and
//! `Error` trait implementations.

use thiserror::Error;

/// The primary error type for Nines operations.
///
/// Every variant's display string contains the word "error": replies are
/// classified as success or failure by case-insensitive containment of that
/// marker, so an error rendered into outcome text must keep carrying it.
#[derive(Error, Debug)]
pub enum NinesError {
    /// Environment bootstrap failures (directory creation, seed files)
    #[error("Setup error: {0}")]
    Setup(String),

    /// Self-update failures (fetch, staging, verification, swap, relaunch)
    #[error("Update error: {0}")]
    Update(String),

    /// Encrypted config present but undecryptable or unparseable.
    /// An absent config file is not an error.
    #[error("Corrupt config error: {0}")]
    ConfigCorrupt(String),

    /// Chat completion failures (transport, HTTP status, malformed payload)
    #[error("External service error: {0}")]
    ExternalService(String),

    /// Intent validation failures (unknown action, missing/mistyped parameter)
    #[error("Invalid intent error: {0}")]
    InvalidIntent(String),

    /// Action handler failures (file write, document conversion, etc.)
    #[error("Action error: {0}")]
    ActionExecution(String),

    /// Personality profile failures (missing category, empty template list)
    #[error("Profile error: {0}")]
    Profile(String),

    /// Standard I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Interaction store errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// A specialized `Result` type for Nines operations.
pub type Result<T> = std::result::Result<T, NinesError>;
