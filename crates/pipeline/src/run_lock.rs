use crate::error::{PipelineError, Result};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

const LOCK_FILE_NAME: &str = ".headerdoc.lock";

/// Exclusive claim on an output directory for the duration of one run.
pub(crate) struct RunLock {
    file: File,
    path: PathBuf,
}

impl RunLock {
    pub(crate) fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for RunLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

/// Take the run lock without waiting; a concurrent run yields `Locked`.
pub(crate) async fn acquire_run_lock(output_root: &Path) -> Result<RunLock> {
    tokio::fs::create_dir_all(output_root).await?;
    let path = output_root.join(LOCK_FILE_NAME);

    tokio::task::spawn_blocking(move || -> Result<RunLock> {
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .map_err(|err| {
                PipelineError::Other(format!("open run lock {}: {err}", path.display()))
            })?;

        if file.try_lock_exclusive().is_err() {
            return Err(PipelineError::Locked(path));
        }
        log::debug!("Acquired run lock {}", path.display());
        Ok(RunLock { file, path })
    })
    .await
    .map_err(|err| PipelineError::Other(format!("join run lock task: {err}")))?
}
