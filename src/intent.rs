//! Intent validation
//!
//! The chat service replies with untyped JSON shaped like
//! `{"intent": "<name>", "parameters": {...}}`. Nothing downstream trusts
//! that payload: it is mapped into the closed `Intent` union here or
//! rejected, and handlers only ever see validated variants.

use serde_json::Value;

use crate::error::{NinesError, Result};

/// Actions recognized by name but executed as a no-op acknowledgement.
const FALLBACK_ACTIONS: [&str; 1] = ["check_email"];

/// A validated action request.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    /// Write a markdown note into the vault.
    CreateNote { title: String, content: String },
    /// Produce an office document via the document service.
    CreateDocument {
        doc_type: String,
        content: String,
        filename: String,
    },
    /// Recognized action with no handler; acknowledged without side effects.
    Unhandled { name: String },
}

impl Intent {
    /// Parse and validate a raw chat payload.
    pub fn parse(raw: &str) -> Result<Intent> {
        let value: Value = serde_json::from_str(raw)
            .map_err(|e| NinesError::InvalidIntent(format!("payload is not JSON: {}", e)))?;
        Self::from_value(&value)
    }

    /// Validate an already-parsed JSON value.
    ///
    /// Unknown action names and missing or mistyped required parameters are
    /// rejected; unrecognized extra parameters are ignored.
    pub fn from_value(value: &Value) -> Result<Intent> {
        let name = value
            .get("intent")
            .and_then(Value::as_str)
            .ok_or_else(|| NinesError::InvalidIntent("missing 'intent' field".to_string()))?;

        match name {
            "create_note" => {
                let params = required_params(value, name)?;
                Ok(Intent::CreateNote {
                    title: required_str(params, "title", name)?,
                    content: required_str(params, "content", name)?,
                })
            }
            "create_document" => {
                let params = required_params(value, name)?;
                Ok(Intent::CreateDocument {
                    doc_type: required_str(params, "type", name)?,
                    content: required_str(params, "content", name)?,
                    filename: required_str(params, "filename", name)?,
                })
            }
            other if FALLBACK_ACTIONS.contains(&other) => Ok(Intent::Unhandled {
                name: other.to_string(),
            }),
            other => Err(NinesError::InvalidIntent(format!(
                "unknown action '{}'",
                other
            ))),
        }
    }

    /// Action name, for logs.
    pub fn name(&self) -> &str {
        match self {
            Intent::CreateNote { .. } => "create_note",
            Intent::CreateDocument { .. } => "create_document",
            Intent::Unhandled { name } => name,
        }
    }
}

fn required_params<'a>(value: &'a Value, action: &str) -> Result<&'a serde_json::Map<String, Value>> {
    value.get("parameters").and_then(Value::as_object).ok_or_else(|| {
        NinesError::InvalidIntent(format!("action '{}' requires a parameters object", action))
    })
}

fn required_str(params: &serde_json::Map<String, Value>, key: &str, action: &str) -> Result<String> {
    params
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            NinesError::InvalidIntent(format!(
                "action '{}' requires string parameter '{}'",
                action, key
            ))
        })
}
