//! The registry: every registered directory merged into one view.
//!
//! `load_all` rebuilds the merged view from scratch on every call. Derived maps
//! are cleared first, so the result is a pure function of the directory
//! registrations and what's on disk; there is no incremental conflict
//! bookkeeping to drift out of sync. Per-directory indices are kept between
//! loads (and cached on disk) so a rebuild only re-parses changed files.
//!
//! Id conflicts demote every claimant. When a second note shows up with an id
//! the merge already saw, the first claimant is pulled out of `by_id` and
//! appended to the conflict list with the rest; no note wins by registration
//! order.

use crate::error::Result;
use crate::index::NoteIndex;
use crate::model::{NoteInfo, ParseState};
use crate::note::{self, Note};
use crate::store::NoteStore;
use crate::transaction::ChangeTransaction;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

const DIRECTORY_FILENAME: &str = "directory.json";

/// One id claimed by notes in a candidate directory and, possibly, the registry.
#[derive(Debug, Clone)]
pub struct IndexConflict {
    pub id: String,
    /// Claimants already in the registry (empty when the collision is entirely
    /// inside the candidate directory).
    pub existing: Vec<NoteInfo>,
    /// Claimants from the candidate directory.
    pub conflicting: Vec<NoteInfo>,
}

#[derive(Serialize, Deserialize)]
struct DirectoryEntry {
    path: PathBuf,
}

pub struct Registry<S> {
    store: S,
    zone: FixedOffset,
    /// Registered index names to their root directories.
    pub directory: BTreeMap<String, PathBuf>,
    /// Indices loaded from the on-disk cache, consumed by the next `load_all`.
    cached: BTreeMap<String, NoteIndex>,
    pub indices: BTreeMap<String, NoteIndex>,
    /// Unconflicted notes by id.
    pub by_id: BTreeMap<String, NoteInfo>,
    /// Conflicted notes by id; every claimant of the id is in the list.
    pub conflicts: BTreeMap<String, Vec<NoteInfo>>,
    pub by_path: BTreeMap<PathBuf, NoteInfo>,
    /// Every id seen in the last load, conflicted or not.
    pub all_ids: BTreeSet<String>,
}

impl<S: NoteStore> Registry<S> {
    pub fn new(store: S, zone: FixedOffset) -> Registry<S> {
        Registry {
            store,
            zone,
            directory: BTreeMap::new(),
            cached: BTreeMap::new(),
            indices: BTreeMap::new(),
            by_id: BTreeMap::new(),
            conflicts: BTreeMap::new(),
            by_path: BTreeMap::new(),
            all_ids: BTreeSet::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn zone(&self) -> &FixedOffset {
        &self.zone
    }

    pub fn register(&mut self, name: &str, path: &Path) {
        self.directory.insert(name.to_string(), path.to_path_buf());
    }

    pub fn unregister(&mut self, name: &str) -> bool {
        self.indices.remove(name);
        self.cached.remove(name);
        self.directory.remove(name).is_some()
    }

    /// Parse a note fresh from storage, bypassing every derived map.
    pub fn load_note(&self, path: &Path) -> Result<Note> {
        note::load_note(&self.store, &self.zone, path)
    }

    /// Creation time of a file, falling back to modification time.
    /// The flag is true when the platform reported a real creation time.
    pub fn file_time(&self, path: &Path) -> Result<(DateTime<FixedOffset>, bool)> {
        self.store.file_time(path)
    }

    /// The registered index whose root contains `path`, if any.
    pub fn index_containing(&self, path: &Path) -> Option<&NoteIndex> {
        self.indices
            .values()
            .find(|index| path.starts_with(&index.path))
    }

    /// Refresh every registered index and rebuild the merged view.
    ///
    /// Merging walks directories in name order, but the outcome doesn't depend
    /// on it: an id claimed twice ends with *all* claimants in the conflict
    /// list and none in `by_id`. Notes without an id finalize as `NoId`,
    /// whatever their raw parse state was.
    pub fn load_all(&mut self, force_checksum: bool) -> Result<()> {
        self.by_id.clear();
        self.conflicts.clear();
        self.by_path.clear();
        self.all_ids.clear();

        let directories: Vec<(String, PathBuf)> = self
            .directory
            .iter()
            .map(|(name, path)| (name.clone(), path.clone()))
            .collect();

        for (name, root) in directories {
            let mut index = match self.indices.remove(&name) {
                Some(index) => index,
                None => match self.cached.remove(&name) {
                    Some(index) => index,
                    None => NoteIndex::new(&name, &root),
                },
            };
            index.update(&self.store, &self.zone, force_checksum)?;

            for info in index.notes.values_mut() {
                match info.id.clone() {
                    Some(id) => {
                        self.all_ids.insert(id.clone());
                        if self.by_id.contains_key(&id) {
                            // The first claimant stays in by_id until the
                            // demotion pass below, so it keys the conflict list
                            // for every later claimant of the same id.
                            self.conflicts.entry(id).or_default().push(info.clone());
                        } else {
                            self.by_id.insert(id, info.clone());
                        }
                    }
                    None => info.state = ParseState::NoId,
                }
            }
            self.indices.insert(name, index);
        }

        // Demote first claimants of conflicted ids.
        for (id, list) in self.conflicts.iter_mut() {
            if let Some(first) = self.by_id.remove(id) {
                list.push(first);
            }
            for info in list.iter_mut() {
                info.state = ParseState::Conflict;
            }
        }
        for info in self.by_id.values_mut() {
            info.state = ParseState::Ok;
        }

        // Push the final states back into the per-index copies, then derive the
        // path map from those so every view agrees.
        for index in self.indices.values_mut() {
            for info in index.notes.values_mut() {
                if let Some(id) = &info.id {
                    if self.by_id.contains_key(id) {
                        info.state = ParseState::Ok;
                    } else if self.conflicts.contains_key(id) {
                        info.state = ParseState::Conflict;
                    }
                }
            }
        }
        for index in self.indices.values() {
            for (path, info) in &index.notes {
                self.by_path.insert(path.clone(), info.clone());
            }
        }
        Ok(())
    }

    /// Dry-run merge of an unregistered directory against the current view.
    ///
    /// Reports one record per colliding id, accumulating every claimant:
    /// collisions against unconflicted ids, against already-conflicted ids, and
    /// between notes inside the candidate directory itself. Never mutates the
    /// registry.
    pub fn find_conflicts(&self, path: &Path) -> Result<BTreeMap<String, IndexConflict>> {
        let candidate = NoteIndex::create(&self.store, &self.zone, "!", path)?;

        let mut found: BTreeMap<String, IndexConflict> = BTreeMap::new();
        let mut valid_ids: BTreeMap<String, NoteInfo> = BTreeMap::new();
        for info in candidate.notes.values() {
            let id = match &info.id {
                Some(id) => id.clone(),
                None => continue,
            };
            if let Some(existing) = self.by_id.get(&id) {
                found
                    .entry(id.clone())
                    .or_insert_with(|| IndexConflict {
                        id,
                        existing: vec![existing.clone()],
                        conflicting: Vec::new(),
                    })
                    .conflicting
                    .push(info.clone());
            } else if let Some(existing) = self.conflicts.get(&id) {
                found
                    .entry(id.clone())
                    .or_insert_with(|| IndexConflict {
                        id,
                        existing: existing.clone(),
                        conflicting: Vec::new(),
                    })
                    .conflicting
                    .push(info.clone());
            } else if valid_ids.contains_key(&id) {
                found
                    .entry(id.clone())
                    .or_insert_with(|| IndexConflict {
                        id,
                        existing: Vec::new(),
                        conflicting: Vec::new(),
                    })
                    .conflicting
                    .push(info.clone());
            } else {
                valid_ids.insert(id, info.clone());
            }
        }

        // First claimants of in-candidate collisions start out looking valid;
        // fold them into their conflict records.
        for (id, conflict) in found.iter_mut() {
            if let Some(first) = valid_ids.remove(id) {
                conflict.conflicting.push(first);
            }
        }
        Ok(found)
    }

    /// Whether any note in the registry claims this id, conflicted or not.
    pub fn has_id(&self, id: &str) -> bool {
        self.by_id.contains_key(id) || self.conflicts.contains_key(id)
    }

    pub fn create_empty_transaction(&self) -> ChangeTransaction<'_, S> {
        ChangeTransaction::new(self)
    }

    /// Commit a transaction's staged changes to storage, one file at a time.
    ///
    /// Each file's move and rewrite are applied together, but files are
    /// independent of each other; the caller reloads afterwards to re-derive
    /// states. Returns the number of files written.
    pub fn apply_transaction(&self, transaction: ChangeTransaction<'_, S>) -> Result<usize> {
        let (by_path, file_moves) = transaction.into_changes();
        let mut applied = 0;
        for (origin, staged) in by_path {
            let note = match staged {
                Some(note) => note,
                None => continue,
            };
            let target = file_moves
                .get(&origin)
                .cloned()
                .unwrap_or_else(|| origin.clone());
            if target != origin {
                self.store.move_file(&origin, &target)?;
            }
            self.store.write_text(&target, &note.to_file_text()?)?;
            applied += 1;
        }
        Ok(applied)
    }

    /// Map of note id -> ids of the notes that link to it.
    ///
    /// Only unconflicted notes contribute links, and conflicted targets are
    /// skipped entirely; a conflicted id neither gives nor receives backlinks.
    pub fn backlinks(&self) -> BTreeMap<String, Vec<String>> {
        let mut links: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (source_id, info) in &self.by_id {
            for target in &info.links_to {
                if self.conflicts.contains_key(target) {
                    continue;
                }
                links.entry(target.clone()).or_default().push(source_id.clone());
            }
        }
        links
    }

    // --- Persistence ---

    /// Restore a registry from `data_dir`: the directory registrations plus any
    /// per-index caches. A missing directory file means a brand new registry; a
    /// corrupt index cache is skipped and that directory gets a full rescan.
    pub fn load(store: S, zone: FixedOffset, data_dir: &Path) -> Result<Registry<S>> {
        let mut registry = Registry::new(store, zone);
        let directory_path = data_dir.join(DIRECTORY_FILENAME);
        if !directory_path.exists() {
            return Ok(registry);
        }

        let text = fs::read_to_string(&directory_path)?;
        let entries: BTreeMap<String, DirectoryEntry> = serde_json::from_str(&text)?;
        for (name, entry) in entries {
            if let Ok(cache) = fs::read_to_string(data_dir.join(index_filename(&name))) {
                if let Ok(index) = NoteIndex::deserialize(&cache) {
                    registry.cached.insert(name.clone(), index);
                }
            }
            registry.directory.insert(name, entry.path);
        }
        Ok(registry)
    }

    /// Write the directory registrations and every loaded index to `data_dir`,
    /// keeping a `.back` copy of anything overwritten.
    pub fn save(&self, data_dir: &Path) -> Result<()> {
        fs::create_dir_all(data_dir)?;

        let entries: BTreeMap<String, DirectoryEntry> = self
            .directory
            .iter()
            .map(|(name, path)| (name.clone(), DirectoryEntry { path: path.clone() }))
            .collect();
        let text = serde_json::to_string_pretty(&entries)?;
        write_with_backup(&data_dir.join(DIRECTORY_FILENAME), &text)?;

        for (name, index) in &self.indices {
            write_with_backup(&data_dir.join(index_filename(name)), &index.serialize()?)?;
        }
        Ok(())
    }
}

pub fn index_filename(name: &str) -> String {
    format!("index-{}.json", name)
}

fn write_with_backup(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        let mut backup = path.as_os_str().to_os_string();
        backup.push(".back");
        fs::copy(path, PathBuf::from(backup))?;
    }
    fs::write(path, content)?;
    Ok(())
}
