use chrono::{DateTime, Utc};
use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;

use crate::error::{DsError, ErrorCode, Result};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable formatted output with colors (default)
    #[default]
    Human,
    /// Pretty-printed JSON envelope
    Json,
    /// Plain text without colors, one record per line
    Plain,
}

impl OutputFormat {
    /// Check if this format should use colors
    #[must_use]
    pub const fn use_colors(&self) -> bool {
        matches!(self, Self::Human)
    }

    /// Check if this format is machine-readable
    #[must_use]
    pub const fn is_machine_readable(&self) -> bool {
        matches!(self, Self::Json)
    }
}

#[derive(Serialize)]
pub struct RobotResponse<T> {
    pub status: RobotStatus,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub data: T,
}

#[derive(Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RobotStatus {
    Ok,
    #[serde(rename = "error")]
    StructuredError {
        /// Error code enum value (e.g., "EMPTY_QUERY")
        code: ErrorCode,
        /// Numeric error code (e.g., 401)
        numeric_code: u16,
        message: String,
        /// Actionable suggestion for recovery
        suggestion: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        context: Option<serde_json::Value>,
        recoverable: bool,
        category: String,
    },
}

pub fn robot_ok<T: Serialize>(data: T) -> RobotResponse<T> {
    RobotResponse {
        status: RobotStatus::Ok,
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        data,
    }
}

/// Create a robot error response from a `DsError` with code, suggestion and
/// context.
pub fn robot_error_structured(err: &DsError) -> RobotResponse<serde_json::Value> {
    RobotResponse {
        status: RobotStatus::from(err),
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        data: serde_json::Value::Null,
    }
}

impl From<&DsError> for RobotStatus {
    fn from(err: &DsError) -> Self {
        let structured = err.to_structured();
        Self::StructuredError {
            code: structured.code,
            numeric_code: structured.numeric_code,
            message: structured.message,
            suggestion: structured.suggestion,
            context: structured.context,
            recoverable: structured.recoverable,
            category: structured.category,
        }
    }
}

pub fn emit_json<T: Serialize>(value: &T) -> Result<()> {
    let payload = serde_json::to_string_pretty(value)?;
    println!("{payload}");
    Ok(())
}

pub struct HumanLayout {
    lines: Vec<String>,
    key_width: usize,
}

impl Default for HumanLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl HumanLayout {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            lines: Vec::new(),
            key_width: 14,
        }
    }

    pub fn title(&mut self, text: &str) -> &mut Self {
        self.lines.push(text.bold().to_string());
        self.lines.push(String::new());
        self
    }

    pub fn section(&mut self, text: &str) -> &mut Self {
        self.lines.push(text.bold().to_string());
        self.lines.push("-".repeat(text.len().max(3)));
        self
    }

    pub fn kv(&mut self, key: &str, value: &str) -> &mut Self {
        let padded = format!("{key:width$}", width = self.key_width);
        self.lines.push(format!("{} {value}", padded.dimmed()));
        self
    }

    pub fn bullet(&mut self, text: &str) -> &mut Self {
        self.lines.push(format!("- {text}"));
        self
    }

    pub fn blank(&mut self) -> &mut Self {
        self.lines.push(String::new());
        self
    }

    pub fn push_line(&mut self, line: impl Into<String>) -> &mut Self {
        self.lines.push(line.into());
        self
    }

    #[must_use]
    pub fn build(self) -> String {
        self.lines.join("\n")
    }
}

pub fn emit_human(layout: HumanLayout) {
    println!("{}", layout.build());
}

/// Emit `data` as a JSON envelope, or through the human/plain renderers.
pub fn emit_formatted<T: Serialize>(
    value: &T,
    format: OutputFormat,
    human_fn: impl FnOnce(&T) -> HumanLayout,
    plain_fn: impl FnOnce(&T) -> Vec<String>,
) -> Result<()> {
    match format {
        OutputFormat::Human => emit_human(human_fn(value)),
        OutputFormat::Json => emit_json(&robot_ok(value))?,
        OutputFormat::Plain => {
            for line in plain_fn(value) {
                println!("{line}");
            }
        }
    }
    Ok(())
}
