//! Format converter: delegates to an external conversion binary (soffice).
//! A conversion failure is per-document, never fatal for the batch.

use std::path::{Path, PathBuf};
use std::process::Command;

use async_trait::async_trait;
#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;
use tracing::{debug, info};

use crate::error::ConversionError;

#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait Convert: Send + Sync {
    /// Converts the file into `target_format` (e.g. "pdf") next to the
    /// input, returning the path of the converted file.
    async fn convert(
        &self,
        path: &Path,
        target_format: &str,
    ) -> Result<PathBuf, ConversionError>;
}

/// Production implementation invoking LibreOffice headless.
pub struct SofficeConvert {
    bin: String,
}

impl SofficeConvert {
    pub fn new(bin: impl Into<String>) -> Self {
        Self { bin: bin.into() }
    }
}

#[async_trait]
impl Convert for SofficeConvert {
    async fn convert(
        &self,
        path: &Path,
        target_format: &str,
    ) -> Result<PathBuf, ConversionError> {
        let out_dir = path.parent().unwrap_or_else(|| Path::new("."));
        debug!(bin = %self.bin, input = %path.display(), target_format, "Invoking converter");

        let output = Command::new(&self.bin)
            .arg("--headless")
            .arg("--convert-to")
            .arg(target_format)
            .arg("--outdir")
            .arg(out_dir)
            .arg(path)
            .output()
            .map_err(|e| ConversionError::Spawn {
                bin: self.bin.clone(),
                source: e,
            })?;

        if !output.status.success() {
            return Err(ConversionError::CommandFailed {
                path: path.to_path_buf(),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        let converted = path.with_extension(target_format);
        if !converted.exists() {
            return Err(ConversionError::MissingOutput(converted));
        }
        info!(input = %path.display(), output = %converted.display(), "Converted document");
        Ok(converted)
    }
}
