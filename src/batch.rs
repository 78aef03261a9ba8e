//! Batch orchestrator: one complete fetch → read → render → convert → upload
//! pass over every spreadsheet row.
//!
//! Error policy: failing to fetch the spreadsheet or the template aborts the
//! whole batch (zero documents uploaded). Everything after that is
//! per-record: a record that cannot be named, rendered, converted or
//! uploaded is logged and skipped, and the batch completes for the rest.

use std::path::Path;

use futures::future;
use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::convert::Convert;
use crate::error::BatchError;
use crate::remote::{join_remote, Remote};
use crate::render::Renderer;
use crate::spreadsheet;

/// What happened to one spreadsheet row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DocumentOutcome {
    Uploaded,
    /// The output document was already published remotely.
    SkippedExisting,
    Failed(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentReport {
    /// 1-based worksheet row (the header is row 1), as read from the file,
    /// so blank rows dropped by the reader never shift it.
    pub row: usize,
    pub filename: String,
    pub outcome: DocumentOutcome,
}

/// Summary of one batch, logged as JSON after every run.
#[derive(Debug, Default, Serialize)]
pub struct BatchReport {
    pub rendered: usize,
    pub converted: usize,
    pub uploaded: usize,
    pub skipped_existing: usize,
    pub failed: usize,
    pub documents: Vec<DocumentReport>,
}

impl BatchReport {
    fn push(&mut self, row: usize, filename: String, outcome: DocumentOutcome) {
        match &outcome {
            DocumentOutcome::Failed(_) => self.failed += 1,
            DocumentOutcome::SkippedExisting => self.skipped_existing += 1,
            DocumentOutcome::Uploaded => {}
        }
        self.documents.push(DocumentReport {
            row,
            filename,
            outcome,
        });
    }
}

/// Runs one batch against the given remote and converter.
pub async fn run_batch<R, C>(
    config: &Config,
    remote: &R,
    converter: &C,
) -> Result<BatchReport, BatchError>
where
    R: Remote + ?Sized,
    C: Convert + ?Sized,
{
    let batch_id = Uuid::new_v4();
    info!(%batch_id, "Starting batch");

    // Fresh scratch space per batch, dropped (and deleted) at the end.
    let scratch = tempfile::Builder::new()
        .prefix("docmerge_")
        .tempdir()
        .map_err(BatchError::Scratch)?;
    let scratch_dir = scratch.path();

    let (spreadsheet_path, template_path) = future::try_join(
        remote.fetch(&config.remote.spreadsheet, scratch_dir),
        remote.fetch(&config.remote.template, scratch_dir),
    )
    .await?;

    let records = spreadsheet::read_records(&spreadsheet_path)?;
    let mut report = BatchReport::default();
    if records.is_empty() {
        warn!(%batch_id, "Spreadsheet contains no data rows");
        return Ok(report);
    }

    let renderer = Renderer::new(config.render.clone());
    let template_ext = template_path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_string();

    for record in &records {
        let row = record.row();

        let Some(rendered_name) = renderer.output_filename(record, &template_ext) else {
            warn!(
                row,
                name_field = %config.render.name_field,
                "Record has no usable name field, skipping"
            );
            report.push(
                row,
                String::new(),
                DocumentOutcome::Failed(format!(
                    "missing field '{}'",
                    config.render.name_field
                )),
            );
            continue;
        };

        let final_name = match &config.render.convert_to {
            Some(format) => replace_extension(&rendered_name, format),
            None => rendered_name.clone(),
        };
        let remote_target = join_remote(&config.remote.output_dir, &final_name);

        match remote.exists(&remote_target).await {
            Ok(true) => {
                info!(row, remote = %remote_target, "Already published, skipping");
                report.push(row, final_name, DocumentOutcome::SkippedExisting);
                continue;
            }
            Ok(false) => {}
            Err(e) => {
                warn!(row, error = %e, remote = %remote_target, "Existence probe failed, uploading anyway");
            }
        }

        let output_path = scratch_dir.join(&rendered_name);
        if let Err(e) = renderer.render(&template_path, record, &output_path) {
            error!(row, error = %e, "Render failed, skipping record");
            report.push(row, final_name, DocumentOutcome::Failed(format!("render: {e}")));
            continue;
        }
        report.rendered += 1;

        let upload_path = match &config.render.convert_to {
            Some(format) => match converter.convert(&output_path, format).await {
                Ok(path) => {
                    report.converted += 1;
                    path
                }
                Err(e) => {
                    error!(row, error = %e, "Conversion failed, skipping document");
                    report.push(row, final_name, DocumentOutcome::Failed(format!("convert: {e}")));
                    continue;
                }
            },
            None => output_path.clone(),
        };

        if let Err(e) = remote.push(&upload_path, &config.remote.output_dir).await {
            error!(row, error = %e, "Upload failed, skipping document");
            report.push(row, final_name, DocumentOutcome::Failed(format!("upload: {e}")));
            continue;
        }
        report.uploaded += 1;
        report.push(row, final_name, DocumentOutcome::Uploaded);
    }

    info!(
        %batch_id,
        rendered = report.rendered,
        converted = report.converted,
        uploaded = report.uploaded,
        skipped_existing = report.skipped_existing,
        failed = report.failed,
        "Batch complete"
    );
    Ok(report)
}

fn replace_extension(filename: &str, extension: &str) -> String {
    Path::new(filename)
        .with_extension(extension)
        .to_string_lossy()
        .into_owned()
}
