//! Error types for every pipeline stage, one enum per concern.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures while shelling out to the external sync tool.
#[derive(Debug, Error)]
pub enum RemoteSyncError {
    #[error("could not launch sync tool '{bin}': {source}")]
    Spawn {
        bin: String,
        #[source]
        source: io::Error,
    },
    #[error("sync tool {operation} failed for '{remote_path}' (exit code {code:?}): {stderr}")]
    CommandFailed {
        operation: &'static str,
        remote_path: String,
        code: Option<i32>,
        stderr: String,
    },
    /// The tool reported success but the expected file never arrived.
    #[error("fetched file missing locally: {0}")]
    MissingLocalFile(PathBuf),
}

/// Failures while reading the spreadsheet workbook.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("could not open workbook {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: calamine::XlsxError,
    },
    #[error("could not read worksheet '{sheet}' in {path}: {source}")]
    Worksheet {
        path: PathBuf,
        sheet: String,
        #[source]
        source: calamine::XlsxError,
    },
    #[error("workbook {0} contains no worksheets")]
    NoWorksheet(PathBuf),
    #[error("workbook {0} has no usable header row")]
    MissingHeader(PathBuf),
}

/// Failures while rendering one document from the template.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("invalid document package {path}: {source}")]
    Package {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },
    #[error("document package {0} has no word/document.xml part")]
    MissingDocumentPart(PathBuf),
    #[error("template {0} is not valid UTF-8 text")]
    NotText(PathBuf),
}

/// Failures while shelling out to the external format converter.
#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("could not launch converter '{bin}': {source}")]
    Spawn {
        bin: String,
        #[source]
        source: io::Error,
    },
    #[error("conversion of {path} failed (exit code {code:?}): {stderr}")]
    CommandFailed {
        path: PathBuf,
        code: Option<i32>,
        stderr: String,
    },
    /// The converter exited cleanly but produced no output file.
    #[error("converted file missing: {0}")]
    MissingOutput(PathBuf),
}

/// Failures while assembling configuration from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("required environment variable {0} is not set")]
    MissingVar(&'static str),
    #[error("environment variable {var} must be {expected}, got '{value}'")]
    InvalidVar {
        var: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// A batch-fatal failure: nothing after the failing stage ran.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("could not create scratch directory: {0}")]
    Scratch(io::Error),
    #[error(transparent)]
    Fetch(#[from] RemoteSyncError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}
