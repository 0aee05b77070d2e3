use std::{fs, path::PathBuf};

use anyhow::Context;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Bytes were handed off. `location` is known when the sink wrote a file itself.
    Saved { location: Option<PathBuf> },
    Cancelled,
}

/// Where a downloaded image goes: a file dialog, a directory, a browser save.
pub trait DownloadSink {
    fn save(&mut self, file_name: &str, png: &[u8]) -> anyhow::Result<SaveOutcome>;
}

/// Writes downloads into a fixed directory, creating it when missing.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl DownloadSink for DirectorySink {
    fn save(&mut self, file_name: &str, png: &[u8]) -> anyhow::Result<SaveOutcome> {
        fs::create_dir_all(&self.dir).with_context(|| {
            format!("failed to create output directory '{}'", self.dir.display())
        })?;
        let path = self.dir.join(file_name);
        fs::write(&path, png)
            .with_context(|| format!("failed to write '{}'", path.display()))?;
        Ok(SaveOutcome::Saved {
            location: Some(path),
        })
    }
}
