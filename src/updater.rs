//! Self-update
//!
//! At startup the assistant compares its own binary against a remote
//! candidate by SHA-256. On a mismatch the candidate is staged in the live
//! binary's directory, verified, and renamed over the live path in one
//! atomic step; the caller then relaunches the process with the same
//! arguments. Every failure is an `Update` error and the old code keeps
//! running; a partial download can never leave the program truncated.

use std::env;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::{NinesError, Result};

/// Relative path of the published binary under the update base URL.
const REMOTE_BINARY_PATH: &str = "bin/nines";

/// Timeout for the candidate fetch.
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// What `check_and_apply` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Local and remote hashes match; nothing was written.
    UpToDate,
    /// The live binary was replaced; the caller should relaunch.
    Applied,
}

/// Compares and replaces the running binary.
pub struct SelfUpdater {
    binary_path: PathBuf,
    base_url: String,
    client: reqwest::Client,
}

impl SelfUpdater {
    pub fn new(binary_path: impl Into<PathBuf>, base_url: &str) -> Self {
        Self {
            binary_path: binary_path.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Fetch the remote candidate and swap it in when hashes differ.
    ///
    /// Idempotent while the remote is unchanged: a second call after a swap
    /// sees equal hashes and does nothing.
    pub async fn check_and_apply(&self) -> Result<UpdateOutcome> {
        let current = fs::read(&self.binary_path)
            .map_err(|e| NinesError::Update(format!("cannot read current binary: {}", e)))?;
        let current_hash = sha256_hex(&current);

        let candidate = self.fetch_candidate().await?;
        let candidate_hash = sha256_hex(&candidate);

        if candidate_hash == current_hash {
            debug!(hash = %current_hash, "binary up to date");
            return Ok(UpdateOutcome::UpToDate);
        }

        info!(from = %current_hash, to = %candidate_hash, "applying update");
        self.stage_and_swap(&candidate, &candidate_hash)?;
        Ok(UpdateOutcome::Applied)
    }

    /// Replace this process with the binary at `binary_path`, forwarding the
    /// original arguments.
    ///
    /// On success this never returns. Exec is unix-only; elsewhere an
    /// `Update` error is reported and the current process keeps running.
    pub fn relaunch(&self) -> Result<()> {
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            use std::process::Command;

            let err = Command::new(&self.binary_path)
                .args(env::args_os().skip(1))
                .exec();
            Err(NinesError::Update(format!("relaunch failed: {}", err)))
        }
        #[cfg(not(unix))]
        {
            Err(NinesError::Update(
                "relaunch not supported on this platform".to_string(),
            ))
        }
    }

    async fn fetch_candidate(&self) -> Result<Vec<u8>> {
        let url = format!("{}/{}", self.base_url, REMOTE_BINARY_PATH);
        let response = self
            .client
            .get(&url)
            .timeout(FETCH_TIMEOUT)
            .send()
            .await
            .map_err(|e| NinesError::Update(format!("fetch failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(NinesError::Update(format!(
                "fetch failed: {} returned {}",
                url,
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| NinesError::Update(format!("fetch body failed: {}", e)))?;
        Ok(bytes.to_vec())
    }

    fn stage_and_swap(&self, candidate: &[u8], expected_hash: &str) -> Result<()> {
        let dir = self.binary_path.parent().ok_or_else(|| {
            NinesError::Update("binary path has no parent directory".to_string())
        })?;

        // Staging in the same directory keeps the rename on one filesystem,
        // which is what makes it atomic.
        let mut staged = NamedTempFile::new_in(dir)
            .map_err(|e| NinesError::Update(format!("cannot stage candidate: {}", e)))?;
        staged
            .write_all(candidate)
            .map_err(|e| NinesError::Update(format!("cannot write staged candidate: {}", e)))?;
        staged
            .flush()
            .map_err(|e| NinesError::Update(format!("cannot flush staged candidate: {}", e)))?;

        let written = fs::read(staged.path())
            .map_err(|e| NinesError::Update(format!("cannot verify staged candidate: {}", e)))?;
        if sha256_hex(&written) != expected_hash {
            return Err(NinesError::Update(
                "staged candidate failed hash verification".to_string(),
            ));
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(staged.path(), fs::Permissions::from_mode(0o755))
                .map_err(|e| NinesError::Update(format!("cannot set permissions: {}", e)))?;
        }

        staged
            .persist(&self.binary_path)
            .map_err(|e| NinesError::Update(format!("cannot swap binary: {}", e)))?;
        Ok(())
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}
