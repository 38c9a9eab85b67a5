use super::NoteStore;
use crate::error::{MintError, Result};
use crate::model::FileStat;
use chrono::{DateTime, FixedOffset, Local, Utc};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;
use std::time::SystemTime;
use walkdir::WalkDir;

/// Production storage backed by the local filesystem.
pub struct FileStore;

impl FileStore {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FileStore {
    fn default() -> Self {
        Self::new()
    }
}

fn epoch_seconds(time: SystemTime) -> i64 {
    DateTime::<Utc>::from(time).timestamp()
}

fn local_time(time: SystemTime) -> DateTime<FixedOffset> {
    DateTime::<Local>::from(time).fixed_offset()
}

impl NoteStore for FileStore {
    fn list_files(&self, root: &Path, predicate: &dyn Fn(&str) -> bool) -> Result<Vec<FileStat>> {
        let mut found = Vec::new();
        for entry in WalkDir::new(root) {
            let entry = entry.map_err(|e| MintError::Store(e.to_string()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let file_name = entry.file_name().to_string_lossy().into_owned();
            if !predicate(&file_name) {
                continue;
            }
            let meta = entry.metadata().map_err(|e| MintError::Store(e.to_string()))?;
            let directory = entry
                .path()
                .parent()
                .unwrap_or(root)
                .to_path_buf();
            found.push(FileStat {
                directory,
                file_name,
                last_modified: epoch_seconds(meta.modified().map_err(MintError::Io)?),
                size: meta.len(),
                check_sum: None,
            });
        }
        Ok(found)
    }

    fn read_text(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path).map_err(MintError::Io)
    }

    fn write_text(&self, path: &Path, content: &str) -> Result<()> {
        fs::write(path, content).map_err(MintError::Io)
    }

    fn checksum(&self, path: &Path) -> Result<String> {
        let content = fs::read(path).map_err(MintError::Io)?;
        let digest = Sha256::digest(&content);
        Ok(format!("sha256:{}", hex::encode(digest)))
    }

    fn move_file(&self, src: &Path, dst: &Path) -> Result<()> {
        fs::rename(src, dst).map_err(MintError::Io)
    }

    fn file_time(&self, path: &Path) -> Result<(DateTime<FixedOffset>, bool)> {
        let meta = fs::metadata(path).map_err(MintError::Io)?;
        // Creation time is not available on every platform/filesystem.
        match meta.created() {
            Ok(created) => Ok((local_time(created), true)),
            Err(_) => Ok((local_time(meta.modified().map_err(MintError::Io)?), false)),
        }
    }
}
