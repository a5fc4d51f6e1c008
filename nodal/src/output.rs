//! Text and JSON rendering of command results.
//!
//! Every command builds one DTO. In JSON mode the DTO is printed as is; in
//! text mode the command supplies its own rendering.

use anyhow::Result;
use nodal_core::ErrorKind;
use serde::Serialize;
use std::io::{self, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Writes command results to stdout and failures to stderr.
pub struct OutputWriter {
    format: OutputFormat,
    stdout: io::Stdout,
}

impl OutputWriter {
    pub fn new(json: bool) -> Self {
        let format = match json {
            true => OutputFormat::Json,
            false => OutputFormat::Text,
        };
        Self {
            format,
            stdout: io::stdout(),
        }
    }

    /// Print `data` as JSON, or the text produced by `text_fn`.
    ///
    /// `text_fn` only runs in text mode and must supply its own trailing
    /// newline.
    pub fn write<T: Serialize>(&self, data: &T, text_fn: impl FnOnce() -> String) -> Result<()> {
        let mut out = self.stdout.lock();
        match self.format {
            OutputFormat::Json => writeln!(out, "{}", serde_json::to_string_pretty(data)?)?,
            OutputFormat::Text => write!(out, "{}", text_fn())?,
        }
        Ok(())
    }

    /// Report a failed command on stderr, tagged with the node error kind
    /// when the failure came from `nodal_core`.
    pub fn write_error(&self, error: &anyhow::Error, result_code: u8) {
        let kind = error_kind(error);
        let mut err = io::stderr().lock();
        match self.format {
            OutputFormat::Json => {
                let error_output = ErrorOutput {
                    success: false,
                    result_code,
                    kind: kind.map(|k| k.as_str().to_string()),
                    error: format!("{:#}", error),
                };
                if let Ok(json) = serde_json::to_string_pretty(&error_output) {
                    let _ = writeln!(err, "{}", json);
                }
            }
            OutputFormat::Text => {
                let _ = match kind {
                    Some(kind) => writeln!(err, "Error [{}]: {:#}", kind, error),
                    None => writeln!(err, "Error: {:#}", error),
                };
            }
        }
    }
}

/// Kind of the first `nodal_core` error in the chain of `error`.
pub fn error_kind(error: &anyhow::Error) -> Option<ErrorKind> {
    error
        .chain()
        .find_map(|cause| cause.downcast_ref::<nodal_core::Error>())
        .map(nodal_core::Error::kind)
}

// ============================================================================
// Data Transfer Objects (DTOs) for JSON output
// ============================================================================

/// Error output structure.
#[derive(Debug, Serialize)]
pub struct ErrorOutput {
    pub success: bool,
    pub result_code: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub error: String,
}

/// Output for `init` command.
#[derive(Debug, Serialize)]
pub struct InitOutput {
    pub success: bool,
    pub result_code: u8,
    pub image: String,
    pub file: String,
}

/// Child information for `ls` command.
#[derive(Debug, Clone, Serialize)]
pub struct EntryInfo {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_type: Option<String>,
}

/// Output for `ls` command.
#[derive(Debug, Serialize)]
pub struct LsOutput {
    pub success: bool,
    pub result_code: u8,
    pub path: String,
    pub order: String,
    pub entries: Vec<EntryInfo>,
}

/// Output for `mkgroup` and `put` commands.
#[derive(Debug, Serialize)]
pub struct CreatedOutput {
    pub success: bool,
    pub result_code: u8,
    pub path: String,
    pub object_type: String,
}

/// Output for `cat` command.
#[derive(Debug, Serialize)]
pub struct CatOutput {
    pub success: bool,
    pub result_code: u8,
    pub path: String,
    pub dtype: String,
    pub dims: Vec<u64>,
    pub values: Vec<serde_json::Value>,
}

/// Output for `ln` command.
#[derive(Debug, Serialize)]
pub struct LinkOutput {
    pub success: bool,
    pub result_code: u8,
    pub name: String,
    pub target: String,
    pub link_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_file: Option<String>,
}

/// Output for `mv` command.
#[derive(Debug, Serialize)]
pub struct MoveOutput {
    pub success: bool,
    pub result_code: u8,
    pub src: String,
    pub dst: String,
}

/// Output for `rm` command.
#[derive(Debug, Serialize)]
pub struct RemoveOutput {
    pub success: bool,
    pub result_code: u8,
    pub path: String,
}

/// Output for `exists` command.
#[derive(Debug, Serialize)]
pub struct ExistsOutput {
    pub success: bool,
    pub result_code: u8,
    pub path: String,
    pub exists: bool,
}

/// Output for `stat` command.
#[derive(Debug, Serialize)]
pub struct StatOutput {
    pub success: bool,
    pub result_code: u8,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_type: Option<String>,
    pub object_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dtype: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dims: Option<Vec<u64>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_error_kind_found_through_context() {
        let err = Err::<(), _>(nodal_core::Error::link("Unable to delete link \"x\""))
            .context("Failed to remove x")
            .unwrap_err();
        assert_eq!(error_kind(&err), Some(ErrorKind::Link));
    }

    #[test]
    fn test_error_kind_absent_for_cli_errors() {
        let err = anyhow::anyhow!("Image already exists");
        assert_eq!(error_kind(&err), None);
    }

    #[test]
    fn test_error_output_omits_missing_kind() {
        let output = ErrorOutput {
            success: false,
            result_code: 1,
            kind: None,
            error: "boom".to_string(),
        };
        let json = serde_json::to_value(&output).unwrap();
        assert!(json.get("kind").is_none());
        assert_eq!(json["error"], "boom");
    }
}
