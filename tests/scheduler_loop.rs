//! Scheduler loop tests with a deterministic ticker: no real sleeps.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rust_xlsxwriter::Workbook;
use tempfile::tempdir;
use tokio::sync::Notify;

use docmerge::config::{Config, RemoteConfig, RenderConfig, ScheduleConfig, ToolsConfig};
use docmerge::convert::MockConvert;
use docmerge::error::RemoteSyncError;
use docmerge::remote::MockRemote;
use docmerge::scheduler::{run_loop, IntervalTicker, Ticker};

fn test_config() -> Config {
    Config {
        remote: RemoteConfig {
            spreadsheet: "drive:input/people.xlsx".to_string(),
            template: "drive:input/template.txt".to_string(),
            output_dir: "drive:out".to_string(),
        },
        render: RenderConfig {
            name_field: "name".to_string(),
            output_prefix: String::new(),
            convert_to: None,
        },
        schedule: ScheduleConfig {
            interval_minutes: 60,
        },
        tools: ToolsConfig {
            rclone_bin: "rclone".to_string(),
            soffice_bin: "soffice".to_string(),
        },
    }
}

/// Ticks instantly a fixed number of times, then signals `exhausted` and
/// parks forever, so the loop's shutdown branch wins the final select.
struct BoundedTicker {
    remaining: usize,
    exhausted: Arc<Notify>,
}

#[async_trait]
impl Ticker for BoundedTicker {
    async fn tick(&mut self) {
        if self.remaining == 0 {
            self.exhausted.notify_one();
            std::future::pending::<()>().await;
        }
        self.remaining -= 1;
    }
}

#[tokio::test]
async fn loop_survives_failing_batches_and_stops_on_shutdown() {
    let mut remote = MockRemote::new();
    remote.expect_fetch().returning(|remote_path, _| {
        Err(RemoteSyncError::CommandFailed {
            operation: "copy",
            remote_path: remote_path.to_string(),
            code: Some(1),
            stderr: "remote unreachable".to_string(),
        })
    });
    remote.expect_push().times(0);
    let converter = MockConvert::new();

    let exhausted = Arc::new(Notify::new());
    let mut ticker = BoundedTicker {
        remaining: 2,
        exhausted: exhausted.clone(),
    };
    let shutdown = async move { exhausted.notified().await };

    let stats = run_loop(&test_config(), &remote, &converter, &mut ticker, shutdown).await;

    // One immediate batch plus one per tick; every one aborted, none fatal.
    assert_eq!(stats.batches, 3);
    assert_eq!(stats.failures, 3);
}

#[tokio::test]
async fn loop_runs_a_full_batch_per_tick() {
    let fixtures = tempdir().expect("fixture dir");
    let spreadsheet = fixtures.path().join("people.xlsx");
    let template = fixtures.path().join("template.txt");

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.write_string(0, 0, "name").expect("header");
    worksheet.write_string(1, 0, "Alice").expect("row");
    workbook.save(&spreadsheet).expect("save workbook");
    fs::write(&template, "{{name}}").expect("write template");

    let mut remote = MockRemote::new();
    {
        let spreadsheet: PathBuf = spreadsheet.clone();
        let template: PathBuf = template.clone();
        remote.expect_fetch().returning(move |remote_path, dir| {
            let source = if remote_path.ends_with("people.xlsx") {
                &spreadsheet
            } else {
                &template
            };
            let target = dir.join(source.file_name().unwrap());
            fs::copy(source, &target).expect("copy fixture");
            Ok(target)
        });
    }
    remote.expect_exists().returning(|_| Ok(false));
    // Two batches, one document each.
    remote.expect_push().times(2).returning(|_, _| Ok(()));
    let converter = MockConvert::new();

    let exhausted = Arc::new(Notify::new());
    let mut ticker = BoundedTicker {
        remaining: 1,
        exhausted: exhausted.clone(),
    };
    let shutdown = async move { exhausted.notified().await };

    let stats = run_loop(&test_config(), &remote, &converter, &mut ticker, shutdown).await;

    assert_eq!(stats.batches, 2);
    assert_eq!(stats.failures, 0);
}

#[tokio::test(start_paused = true)]
async fn interval_ticker_waits_a_full_period_before_the_first_tick() {
    let period = Duration::from_secs(600);
    let mut ticker = IntervalTicker::new(period);

    let before = tokio::time::Instant::now();
    ticker.tick().await;
    assert!(before.elapsed() >= period);

    // Subsequent ticks keep the same cadence.
    let before = tokio::time::Instant::now();
    ticker.tick().await;
    assert!(before.elapsed() >= period);
}
