//! Output formatting for CLI commands.
//!
//! Provides abstraction layer for outputting results in text or JSON format.

use anyhow::Result;
use serde::Serialize;
use std::io::{self, Write};
use subvol_core::{OmapEntry, OmapOp, SubvolumeRecord, SubvolumeState};

/// Output format selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Writer for command output with format abstraction.
pub struct OutputWriter {
    format: OutputFormat,
    stdout: io::Stdout,
}

impl OutputWriter {
    /// Create a new OutputWriter.
    pub fn new(json: bool) -> Self {
        Self {
            format: if json {
                OutputFormat::Json
            } else {
                OutputFormat::Text
            },
            stdout: io::stdout(),
        }
    }

    /// Write output using the configured format.
    ///
    /// The `text_fn` closure is called only in text mode to generate the
    /// human-readable output.
    pub fn write<T: Serialize>(&self, data: &T, text_fn: impl FnOnce() -> String) -> Result<()> {
        match self.format {
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(data)?;
                writeln!(&self.stdout, "{}", json)?;
            }
            OutputFormat::Text => {
                let text = text_fn();
                if !text.is_empty() {
                    write!(&self.stdout, "{}", text)?;
                }
            }
        }
        Ok(())
    }

    /// Write an error message to stderr.
    ///
    /// In JSON mode, writes a JSON error object with success=false.
    pub fn write_error(&self, error: &anyhow::Error, result_code: u8) {
        match self.format {
            OutputFormat::Json => {
                let error_output = ErrorOutput {
                    success: false,
                    result_code,
                    error: format!("{:#}", error),
                };
                if let Ok(json) = serde_json::to_string_pretty(&error_output) {
                    let _ = writeln!(io::stderr(), "{}", json);
                }
            }
            OutputFormat::Text => {
                let _ = writeln!(io::stderr(), "Error: {:#}", error);
            }
        }
    }
}

// ============================================================================
// Data Transfer Objects (DTOs) for JSON output
// ============================================================================

/// Error output structure.
#[derive(Debug, Serialize)]
pub struct ErrorOutput {
    pub success: bool,
    pub result_code: u8,
    pub error: String,
}

/// Output for `omap volume` and `omap snap`.
#[derive(Debug, Serialize)]
pub struct OmapOutput {
    pub success: bool,
    pub result_code: u8,
    pub handle: String,
    pub entry: OmapEntry,
    pub cleanup: Vec<OmapOp>,
}

impl OmapOutput {
    pub fn to_text(&self) -> String {
        if self.entry.is_empty() {
            return format!("{}: no {} id derivable\n", self.handle, self.entry.kind());
        }

        let mut out = format!("{} {}\n", self.entry.value(), self.entry.id());
        for op in &self.cleanup {
            out.push_str(&format!("  {}\n", op));
        }
        out
    }
}

/// Output for `name`.
#[derive(Debug, Serialize)]
pub struct NameOutput {
    pub success: bool,
    pub result_code: u8,
    pub path: String,
    pub name: String,
}

/// Output for `snapshot-id`.
#[derive(Debug, Serialize)]
pub struct SnapshotIdOutput {
    pub success: bool,
    pub result_code: u8,
    pub handle: String,
    pub id: String,
}

/// One row of the `ls` table.
#[derive(Debug, Clone, Serialize)]
pub struct SubvolumeInfo {
    pub filesystem: String,
    pub subvolume: String,
    pub group: String,
    pub state: SubvolumeState,
}

impl SubvolumeInfo {
    pub fn new(record: &SubvolumeRecord, state: SubvolumeState) -> Self {
        Self {
            filesystem: record.filesystem.clone(),
            subvolume: record.name.clone(),
            group: record.group.clone(),
            state,
        }
    }
}

/// Output for `ls`.
#[derive(Debug, Serialize)]
pub struct LsOutput {
    pub success: bool,
    pub result_code: u8,
    pub subvolumes: Vec<SubvolumeInfo>,
}

impl LsOutput {
    /// Render as an aligned table.
    pub fn to_text(&self) -> String {
        let header = ["Filesystem", "Subvolume", "SubvolumeGroup", "State"];
        let rows: Vec<[String; 4]> = self
            .subvolumes
            .iter()
            .map(|s| {
                [
                    s.filesystem.clone(),
                    s.subvolume.clone(),
                    s.group.clone(),
                    s.state.to_string(),
                ]
            })
            .collect();

        let mut widths = header.map(str::len);
        for row in &rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.len());
            }
        }

        let mut out = String::new();
        let mut push_row = |cells: [&str; 4]| {
            let line = cells
                .iter()
                .zip(widths)
                .map(|(cell, width)| format!("{:<width$}", cell, width = width))
                .collect::<Vec<_>>()
                .join("  ");
            out.push_str(line.trim_end());
            out.push('\n');
        };

        push_row(header);
        for row in &rows {
            push_row([
                row[0].as_str(),
                row[1].as_str(),
                row[2].as_str(),
                row[3].as_str(),
            ]);
        }
        out
    }
}
