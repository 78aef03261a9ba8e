use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Top-level runtime configuration, assembled once at startup and passed into
/// each component. See [`crate::load_config`] for the environment mapping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub remote: RemoteConfig,
    pub render: RenderConfig,
    pub schedule: ScheduleConfig,
    pub tools: ToolsConfig,
}

impl Config {
    pub fn trace_loaded(&self) {
        info!(
            spreadsheet = %self.remote.spreadsheet,
            template = %self.remote.template,
            output_dir = %self.remote.output_dir,
            name_field = %self.render.name_field,
            convert_to = self.render.convert_to.as_deref().unwrap_or("<disabled>"),
            interval_minutes = self.schedule.interval_minutes,
            "Loaded Config"
        );
        debug!(?self, "Config loaded (full debug)");
    }
}

/// Remote locations, as opaque `remote:path` strings understood by the sync
/// tool. Never validated locally beyond string formatting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Remote path of the spreadsheet to fetch each batch.
    pub spreadsheet: String,
    /// Remote path of the document template to fetch each batch.
    pub template: String,
    /// Remote directory the rendered documents are published into.
    pub output_dir: String,
}

/// Naming and conversion rules for rendered documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Record field whose value names the output document. Records without it
    /// are skipped.
    pub name_field: String,
    /// Fixed prefix prepended to every output filename.
    pub output_prefix: String,
    /// Target format for the optional conversion step (e.g. "pdf").
    /// `None` disables conversion and uploads the rendered document as-is.
    pub convert_to: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    pub interval_minutes: u64,
}

impl ScheduleConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_minutes * 60)
    }
}

/// Paths of the external binaries the pipeline shells out to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    pub rclone_bin: String,
    pub soffice_bin: String,
}
