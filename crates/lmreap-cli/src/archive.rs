//! Status report archive
//!
//! Keeps the last raw status report on disk for later inspection. Writes go
//! to a sibling temporary file which is renamed into place, so a reader never
//! sees a half-written report.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct ReportArchive {
    path: PathBuf,
}

impl ReportArchive {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the archived report with `report`
    pub fn save(&self, report: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let temp_path = Self::temp_path(&self.path);
        let result = Self::write_synced(&temp_path, report.as_bytes())
            .and_then(|()| fs::rename(&temp_path, &self.path));

        if result.is_err() {
            let _ = fs::remove_file(&temp_path);
        }
        result
    }

    fn write_synced(path: &Path, data: &[u8]) -> io::Result<()> {
        let mut file = File::create(path)?;
        file.write_all(data)?;
        file.flush()?;
        file.sync_all()
    }

    fn temp_path(final_path: &Path) -> PathBuf {
        let mut temp = final_path.as_os_str().to_owned();
        temp.push(".tmp");
        PathBuf::from(temp)
    }
}
