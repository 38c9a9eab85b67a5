//! Per-directory note index with incremental refresh.
//!
//! An index remembers, per markdown file under its root: the stat record it was
//! last seen with, the parsed metadata envelope, and any storage exception hit
//! while reading it. `update` diffs the directory against those records so an
//! unchanged corpus costs a directory walk and nothing else.

use crate::error::Result;
use crate::model::{FileStat, NoteInfo};
use crate::note;
use crate::store::NoteStore;
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub fn is_markdown(file_name: &str) -> bool {
    file_name.to_lowercase().ends_with(".md")
}

#[derive(Debug, Clone)]
pub struct NoteIndex {
    pub name: String,
    pub path: PathBuf,
    /// Stat records keyed by full path, as of the last refresh.
    pub files: BTreeMap<PathBuf, FileStat>,
    /// Parsed envelopes keyed by full path. A file with a storage exception has
    /// a `files` entry but no `notes` entry.
    pub notes: BTreeMap<PathBuf, NoteInfo>,
    /// Storage errors from the last refresh, keyed by full path. Never persisted.
    pub exceptions: BTreeMap<PathBuf, String>,
}

/// On-disk shape of an index. Exceptions are transient and left out.
#[derive(Serialize, Deserialize)]
struct IndexSnapshot {
    name: String,
    path: PathBuf,
    files: Vec<FileStat>,
    notes: Vec<NoteInfo>,
}

impl NoteIndex {
    pub fn new(name: &str, path: &Path) -> NoteIndex {
        NoteIndex {
            name: name.to_string(),
            path: path.to_path_buf(),
            files: BTreeMap::new(),
            notes: BTreeMap::new(),
            exceptions: BTreeMap::new(),
        }
    }

    /// Build a fresh index with a full scan of `path`.
    pub fn create<S: NoteStore>(
        store: &S,
        zone: &FixedOffset,
        name: &str,
        path: &Path,
    ) -> Result<NoteIndex> {
        let mut index = NoteIndex::new(name, path);
        index.update(store, zone, false)?;
        Ok(index)
    }

    /// Refresh against the directory's current contents.
    ///
    /// Vanished files are dropped. New or changed files are re-read and re-parsed,
    /// replacing whatever was recorded for that path before; a storage error on the
    /// way replaces the note entry with an exception entry, and a later successful
    /// pass clears it. Change detection compares size and mtime, or checksums when
    /// `force_checksum` is set (every witnessed file is hashed up front).
    pub fn update<S: NoteStore>(
        &mut self,
        store: &S,
        zone: &FixedOffset,
        force_checksum: bool,
    ) -> Result<()> {
        let mut witnessed: BTreeMap<PathBuf, FileStat> = BTreeMap::new();
        for stat in store.list_files(&self.path, &is_markdown)? {
            witnessed.insert(stat.full_path(), stat);
        }
        if force_checksum {
            for (path, stat) in witnessed.iter_mut() {
                stat.check_sum = Some(store.checksum(path)?);
            }
        }

        let vanished: Vec<PathBuf> = self
            .files
            .keys()
            .filter(|path| !witnessed.contains_key(*path))
            .cloned()
            .collect();
        for path in vanished {
            self.files.remove(&path);
            self.notes.remove(&path);
            self.exceptions.remove(&path);
        }

        for (path, mut stat) in witnessed {
            let changed = match self.files.get(&path) {
                None => true,
                Some(previous) => stat.has_changed_from(previous, force_checksum),
            };
            if !changed {
                continue;
            }

            self.exceptions.remove(&path);
            let loaded = if stat.check_sum.is_some() {
                note::load_info(store, zone, &path)
            } else {
                match store.checksum(&path) {
                    Ok(sum) => {
                        stat.check_sum = Some(sum);
                        note::load_info(store, zone, &path)
                    }
                    Err(err) => Err(err),
                }
            };
            match loaded {
                Ok(info) => {
                    self.files.insert(path.clone(), stat);
                    self.notes.insert(path, info);
                }
                Err(err) => {
                    self.files.insert(path.clone(), stat);
                    self.notes.remove(&path);
                    self.exceptions.insert(path, err.to_string());
                }
            }
        }
        Ok(())
    }

    /// Envelopes for notes under `path`, in path order.
    pub fn notes_in_path(&self, path: &Path) -> Vec<NoteInfo> {
        self.notes
            .values()
            .filter(|info| info.file_path.starts_with(path))
            .cloned()
            .collect()
    }

    pub fn serialize(&self) -> Result<String> {
        let snapshot = IndexSnapshot {
            name: self.name.clone(),
            path: self.path.clone(),
            files: self.files.values().cloned().collect(),
            notes: self.notes.values().cloned().collect(),
        };
        Ok(serde_json::to_string_pretty(&snapshot)?)
    }

    pub fn deserialize(text: &str) -> Result<NoteIndex> {
        let snapshot: IndexSnapshot = serde_json::from_str(text)?;
        let mut index = NoteIndex::new(&snapshot.name, &snapshot.path);
        for stat in snapshot.files {
            index.files.insert(stat.full_path(), stat);
        }
        for info in snapshot.notes {
            index.notes.insert(info.file_path.clone(), info);
        }
        Ok(index)
    }
}
