//! Remote sync wrapper: every transfer is delegated to an external sync
//! binary (rclone). The trait exists so the batch pipeline can be exercised
//! with a mock that never launches a real process.

use std::path::{Path, PathBuf};
use std::process::Command;

use async_trait::async_trait;
#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;
use tracing::{debug, info};

use crate::error::RemoteSyncError;

/// Narrow capability set over the external sync tool.
///
/// Failures surface the tool's exit code and captured stderr; there is no
/// retry here. A failed operation is retried only by the next scheduled batch.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait Remote: Send + Sync {
    /// Copies the remote file into `local_dir`, overwriting, and returns the
    /// local path of the downloaded file.
    async fn fetch(
        &self,
        remote_path: &str,
        local_dir: &Path,
    ) -> Result<PathBuf, RemoteSyncError>;

    /// Uploads a local file into the remote directory, overwriting any
    /// remote file of the same name.
    async fn push(&self, local_path: &Path, remote_dir: &str) -> Result<(), RemoteSyncError>;

    /// Probes whether a remote file already exists.
    async fn exists(&self, remote_path: &str) -> Result<bool, RemoteSyncError>;
}

/// Production implementation shelling out to rclone.
pub struct RcloneRemote {
    bin: String,
}

impl RcloneRemote {
    pub fn new(bin: impl Into<String>) -> Self {
        Self { bin: bin.into() }
    }

    fn run(
        &self,
        operation: &'static str,
        remote_path: &str,
        args: &[&str],
    ) -> Result<std::process::Output, RemoteSyncError> {
        debug!(bin = %self.bin, ?args, "Invoking sync tool");
        let output = Command::new(&self.bin)
            .args(args)
            .output()
            .map_err(|e| RemoteSyncError::Spawn {
                bin: self.bin.clone(),
                source: e,
            })?;
        if !output.status.success() {
            return Err(RemoteSyncError::CommandFailed {
                operation,
                remote_path: remote_path.to_string(),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        Ok(output)
    }
}

#[async_trait]
impl Remote for RcloneRemote {
    async fn fetch(
        &self,
        remote_path: &str,
        local_dir: &Path,
    ) -> Result<PathBuf, RemoteSyncError> {
        let dir = local_dir.display().to_string();
        self.run("copy", remote_path, &["copy", remote_path, &dir])?;

        let local_path = local_dir.join(remote_file_name(remote_path));
        if !local_path.exists() {
            return Err(RemoteSyncError::MissingLocalFile(local_path));
        }
        info!(remote = remote_path, local = %local_path.display(), "Fetched remote file");
        Ok(local_path)
    }

    async fn push(&self, local_path: &Path, remote_dir: &str) -> Result<(), RemoteSyncError> {
        let file_name = local_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let remote_file = join_remote(remote_dir, &file_name);
        let local = local_path.display().to_string();
        // copyto targets the exact remote file and overwrites it in place.
        self.run("copyto", &remote_file, &["copyto", &local, &remote_file])?;
        info!(local = %local, remote = %remote_file, "Pushed file to remote");
        Ok(())
    }

    async fn exists(&self, remote_path: &str) -> Result<bool, RemoteSyncError> {
        // lsf exits non-zero for paths that simply do not exist; only a
        // failure to launch the tool is an error here.
        let output = Command::new(&self.bin)
            .args(["lsf", remote_path])
            .output()
            .map_err(|e| RemoteSyncError::Spawn {
                bin: self.bin.clone(),
                source: e,
            })?;
        let found = output.status.success()
            && !String::from_utf8_lossy(&output.stdout).trim().is_empty();
        debug!(remote = remote_path, found, "Probed remote file");
        Ok(found)
    }
}

/// Last path segment of a `remote:dir/file` string.
pub fn remote_file_name(remote_path: &str) -> &str {
    remote_path
        .rsplit('/')
        .next()
        .and_then(|tail| tail.rsplit(':').next())
        .unwrap_or(remote_path)
}

/// Joins a remote directory and a filename without doubling separators.
pub fn join_remote(remote_dir: &str, file_name: &str) -> String {
    format!("{}/{}", remote_dir.trim_end_matches('/'), file_name)
}
