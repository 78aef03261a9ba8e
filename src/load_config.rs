use tracing::{error, info};

use crate::config::{Config, RemoteConfig, RenderConfig, ScheduleConfig, ToolsConfig};
use crate::error::ConfigError;

const DEFAULT_INTERVAL_MINUTES: u64 = 60;

/// Assembles the full [`Config`] from environment variables.
///
/// Required: `REMOTE_SPREADSHEET`, `REMOTE_TEMPLATE`, `REMOTE_OUTPUT_DIR`,
/// `NAME_FIELD`. Everything else has a default. Credentials are never read
/// here; they live in the sync tool's own config file.
pub fn load_config() -> Result<Config, ConfigError> {
    let spreadsheet = require_var("REMOTE_SPREADSHEET")?;
    let template = require_var("REMOTE_TEMPLATE")?;
    let output_dir = require_var("REMOTE_OUTPUT_DIR")?;
    let name_field = require_var("NAME_FIELD")?;

    let interval_minutes = match std::env::var("INTERVAL_MINUTES") {
        Ok(raw) => match raw.parse::<u64>() {
            Ok(0) => {
                error!(value = %raw, "INTERVAL_MINUTES must be positive");
                return Err(ConfigError::InvalidVar {
                    var: "INTERVAL_MINUTES",
                    expected: "a positive integer",
                    value: raw,
                });
            }
            Ok(minutes) => minutes,
            Err(e) => {
                error!(error = ?e, value = %raw, "INTERVAL_MINUTES is not an integer");
                return Err(ConfigError::InvalidVar {
                    var: "INTERVAL_MINUTES",
                    expected: "a positive integer",
                    value: raw,
                });
            }
        },
        Err(_) => DEFAULT_INTERVAL_MINUTES,
    };

    let output_prefix = std::env::var("OUTPUT_PREFIX").unwrap_or_default();
    let convert_to = std::env::var("CONVERT_TO")
        .ok()
        .map(|s| s.trim().trim_start_matches('.').to_string())
        .filter(|s| !s.is_empty());
    let rclone_bin = std::env::var("RCLONE_BIN").unwrap_or_else(|_| "rclone".to_string());
    let soffice_bin = std::env::var("SOFFICE_BIN").unwrap_or_else(|_| "soffice".to_string());

    let config = Config {
        remote: RemoteConfig {
            spreadsheet,
            template,
            output_dir,
        },
        render: RenderConfig {
            name_field,
            output_prefix,
            convert_to,
        },
        schedule: ScheduleConfig { interval_minutes },
        tools: ToolsConfig {
            rclone_bin,
            soffice_bin,
        },
    };

    info!(
        interval_minutes = config.schedule.interval_minutes,
        "Config assembled from environment"
    );

    Ok(config)
}

fn require_var(name: &'static str) -> Result<String, ConfigError> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        Ok(_) => {
            error!(var = name, "Required environment variable is empty");
            Err(ConfigError::MissingVar(name))
        }
        Err(e) => {
            error!(error = ?e, var = name, "Required environment variable not set");
            Err(ConfigError::MissingVar(name))
        }
    }
}
