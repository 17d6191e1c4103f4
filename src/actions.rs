//! Action handlers
//!
//! Validated intents route here. Handlers catch their own failures and fold
//! them into outcome text (carrying the error marker) so one bad action never
//! takes down the dispatch loop. Document rendering is behind a trait; the
//! default implementation shells out to headless LibreOffice and stays a
//! boundary, not an integration.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::error::{NinesError, Result};
use crate::intent::Intent;

const SOFFICE_BIN: &str = "soffice";
const CONVERT_TIMEOUT: Duration = Duration::from_secs(60);

/// Executes validated intents, yielding outcome text.
#[async_trait]
pub trait ActionRunner: Send + Sync {
    async fn run(&self, intent: &Intent) -> String;
}

/// Produces office documents from plain content.
#[async_trait]
pub trait DocumentService: Send + Sync {
    async fn create(&self, doc_type: &str, content: &str, filename: &str) -> Result<String>;
}

/// Default action runner operating on workspace directories.
pub struct WorkspaceActions {
    vault_dir: PathBuf,
    documents: Box<dyn DocumentService>,
}

impl WorkspaceActions {
    pub fn new(vault_dir: PathBuf, documents: Box<dyn DocumentService>) -> Self {
        Self {
            vault_dir,
            documents,
        }
    }

    async fn create_note(&self, title: &str, content: &str) -> Result<String> {
        validate_file_stem(title)?;
        tokio::fs::create_dir_all(&self.vault_dir).await?;
        let path = self.vault_dir.join(format!("{}.md", title));
        tokio::fs::write(&path, content).await?;
        debug!(path = %path.display(), "note written");
        Ok(format!("Note '{}' created", title))
    }
}

#[async_trait]
impl ActionRunner for WorkspaceActions {
    async fn run(&self, intent: &Intent) -> String {
        match intent {
            Intent::CreateNote { title, content } => {
                match self.create_note(title, content).await {
                    Ok(outcome) => outcome,
                    Err(e) => format!("Note error: {}", e),
                }
            }
            Intent::CreateDocument {
                doc_type,
                content,
                filename,
            } => match self.documents.create(doc_type, content, filename).await {
                Ok(outcome) => outcome,
                Err(e) => format!("Document error: {}", e),
            },
            Intent::Unhandled { name } => {
                debug!(action = %name, "no handler, acknowledging");
                "Command executed".to_string()
            }
        }
    }
}

/// Document service backed by `soffice --headless --convert-to`.
///
/// Content is staged as plain text next to the output, converted, and the
/// staging file removed. The converted file keeps the requested name with
/// the format's extension.
pub struct LibreOfficeService {
    output_dir: PathBuf,
}

impl LibreOfficeService {
    pub fn new(output_dir: PathBuf) -> Self {
        Self { output_dir }
    }

    fn target_format(doc_type: &str) -> Result<&'static str> {
        match doc_type.to_lowercase().as_str() {
            "swriter" | "writer" | "text" => Ok("odt"),
            "scalc" | "calc" => Ok("ods"),
            "simpress" | "impress" => Ok("odp"),
            other => Err(NinesError::ActionExecution(format!(
                "unknown document type '{}'",
                other
            ))),
        }
    }
}

#[async_trait]
impl DocumentService for LibreOfficeService {
    async fn create(&self, doc_type: &str, content: &str, filename: &str) -> Result<String> {
        let format = Self::target_format(doc_type)?;
        validate_file_stem(filename)?;

        tokio::fs::create_dir_all(&self.output_dir).await?;
        let staged = self.output_dir.join(format!("{}.txt", filename));
        tokio::fs::write(&staged, content).await?;

        let mut cmd = Command::new(SOFFICE_BIN);
        cmd.arg("--headless")
            .arg("--convert-to")
            .arg(format)
            .arg("--outdir")
            .arg(&self.output_dir)
            .arg(&staged)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let result = tokio::time::timeout(CONVERT_TIMEOUT, cmd.output()).await;
        let _ = tokio::fs::remove_file(&staged).await;

        let output = result
            .map_err(|_| {
                NinesError::ActionExecution(format!(
                    "conversion timed out after {}s",
                    CONVERT_TIMEOUT.as_secs()
                ))
            })?
            .map_err(|e| {
                NinesError::ActionExecution(format!("cannot run {}: {}", SOFFICE_BIN, e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(NinesError::ActionExecution(format!(
                "{} exited with {}: {}",
                SOFFICE_BIN,
                output.status,
                stderr.trim()
            )));
        }

        debug!(filename = %filename, format = %format, "document converted");
        Ok("Document created".to_string())
    }
}

/// Intent parameters become file names; keep them inside their directory.
fn validate_file_stem(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(NinesError::ActionExecution(
            "file name must not be empty".to_string(),
        ));
    }
    if name.contains('/') || name.contains('\\') || name.contains("..") {
        return Err(NinesError::ActionExecution(format!(
            "unsafe file name '{}'",
            name
        )));
    }
    Ok(())
}
