use loadreport_common::{ConvertError, Result};
use std::path::{Path, PathBuf};
use tracing::info;

/// The output directory, handed to everything that writes report artifacts.
///
/// Creation happens once in [`OutputSink::create`]; writers never create
/// directories themselves.
#[derive(Debug, Clone)]
pub struct OutputSink {
    dir: PathBuf,
}

impl OutputSink {
    /// Open `dir` as the output sink, creating it (and its parents) if absent.
    pub async fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        let exists = tokio::fs::try_exists(&dir)
            .await
            .map_err(|e| ConvertError::io(&dir, e))?;
        if !exists {
            tokio::fs::create_dir_all(&dir)
                .await
                .map_err(|e| ConvertError::io(&dir, e))?;
            info!(dir = %dir.display(), "Created output directory");
        }
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_of(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// Write `bytes` to `name`, replacing any previous file of that name.
    pub async fn write(&self, name: &str, bytes: &[u8]) -> Result<PathBuf> {
        let path = self.path_of(name);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| ConvertError::io(&path, e))?;
        Ok(path)
    }

    /// `true` if `name` exists in the sink as a regular file.
    pub async fn exists(&self, name: &str) -> bool {
        tokio::fs::metadata(self.path_of(name))
            .await
            .map(|m| m.is_file())
            .unwrap_or(false)
    }
}
