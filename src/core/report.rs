//! Rendering of validation outcomes as text or JSON.

use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;

use super::validator::Validation;
use crate::error::Result;
use crate::utils::encoding::Charset;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    path: String,
    encoding: &'static str,
    #[serde(flatten)]
    validation: &'a Validation,
}

/// Write the human-readable report for one file.
pub fn write_text<W: Write>(
    out: &mut W,
    path: &Path,
    charset: Charset,
    validation: &Validation,
) -> Result<()> {
    let name = charset.name();
    match validation {
        Validation::Valid => {
            writeln!(out, "File {} is valid {}", path.display(), name)?;
        }
        Validation::Invalid(failure) => {
            writeln!(out, "File {} has invalid {} at {}", path.display(), name, failure.offset)?;
            writeln!(out, "Hex snippet: {}", failure.context_hex())?;
        }
        Validation::IoFailure { message } => {
            writeln!(out, "Error checking file: {}: '{}'", message, path.display())?;
        }
    }
    Ok(())
}

/// Write the report as a single JSON object followed by a newline.
pub fn write_json<W: Write>(
    out: &mut W,
    path: &Path,
    charset: Charset,
    validation: &Validation,
) -> Result<()> {
    let report = JsonReport {
        path: path.to_string_lossy().into_owned(),
        encoding: charset.name(),
        validation,
    };
    serde_json::to_writer(&mut *out, &report)?;
    writeln!(out)?;
    Ok(())
}

pub fn write_report<W: Write>(
    out: &mut W,
    format: OutputFormat,
    path: &Path,
    charset: Charset,
    validation: &Validation,
) -> Result<()> {
    match format {
        OutputFormat::Text => write_text(out, path, charset, validation),
        OutputFormat::Json => write_json(out, path, charset, validation),
    }
}
