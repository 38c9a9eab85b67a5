//! Staged note changes, validated before anything touches storage.
//!
//! A transaction snapshots the registry's id set and known paths at creation.
//! Fetching a note hands back a copy; mutating it changes nothing until the
//! copy is verified and staged with `add_change`. Verification runs against the
//! transaction's own working state, so a chain of changes is checked against
//! what the corpus *will* look like, not what it looked like at the start.

use crate::error::{MintError, Result};
use crate::model::NoteInfo;
use crate::note::Note;
use crate::registry::Registry;
use crate::store::NoteStore;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// Outcome of asking a fixer for a change: a proposed note, a reasoned no-op,
/// or a reasoned failure. The detail lines are shown to the user either way.
#[derive(Debug)]
pub enum TryChangeResult {
    Ok { note: Note, details: Vec<String> },
    Nothing { details: Vec<String> },
    Failed { details: Vec<String> },
}

impl TryChangeResult {
    pub fn ok(note: Note, details: Vec<String>) -> TryChangeResult {
        TryChangeResult::Ok { note, details }
    }

    pub fn nothing(details: Vec<String>) -> TryChangeResult {
        TryChangeResult::Nothing { details }
    }

    pub fn failed(details: Vec<String>) -> TryChangeResult {
        TryChangeResult::Failed { details }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, TryChangeResult::Ok { .. })
    }

    pub fn details(&self) -> &[String] {
        match self {
            TryChangeResult::Ok { details, .. } => details,
            TryChangeResult::Nothing { details } => details,
            TryChangeResult::Failed { details } => details,
        }
    }
}

pub struct ChangeTransaction<'a, S> {
    registry: &'a Registry<S>,
    /// Staged notes keyed by *original* path; `None` means untouched.
    by_path: BTreeMap<PathBuf, Option<Note>>,
    /// Original path -> destination path, seeded with identity entries so any
    /// known file's current location counts as claimed.
    file_moves: BTreeMap<PathBuf, PathBuf>,
    /// Every id claimed somewhere in the working state.
    ids: BTreeSet<String>,
}

impl<'a, S: NoteStore> ChangeTransaction<'a, S> {
    pub fn new(registry: &'a Registry<S>) -> ChangeTransaction<'a, S> {
        let mut by_path = BTreeMap::new();
        let mut file_moves = BTreeMap::new();
        for path in registry.by_path.keys() {
            by_path.insert(path.clone(), None);
            file_moves.insert(path.clone(), path.clone());
        }
        ChangeTransaction {
            registry,
            by_path,
            file_moves,
            ids: registry.all_ids.clone(),
        }
    }

    pub fn registry(&self) -> &'a Registry<S> {
        self.registry
    }

    /// Whether `id` is claimed in the transaction's working state.
    pub fn has_id(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Number of staged changes.
    pub fn len(&self) -> usize {
        self.by_path.values().filter(|staged| staged.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of a note's envelope as the transaction currently sees it: the
    /// staged version if there is one, the registry's otherwise.
    pub fn get_note_info_state(&self, path: &Path) -> Result<NoteInfo> {
        match self.by_path.get(path) {
            None => Err(MintError::NoteNotFound(path.to_path_buf())),
            Some(Some(staged)) => Ok(staged.info.clone()),
            Some(None) => match self.registry.by_path.get(path) {
                Some(info) => Ok(info.clone()),
                None => Err(MintError::NoteNotFound(path.to_path_buf())),
            },
        }
    }

    /// Copy of a full note as the transaction currently sees it. An untouched
    /// note is parsed fresh from storage, so its envelope carries raw parse
    /// states, not the registry's merged ones.
    pub fn get_note_state(&self, path: &Path) -> Result<Note> {
        match self.by_path.get(path) {
            None => Err(MintError::NoteNotFound(path.to_path_buf())),
            Some(Some(staged)) => Ok(staged.clone()),
            Some(None) => self.registry.load_note(path),
        }
    }

    /// Whether `update` could be staged for the note at `original_path`.
    ///
    /// False when a *changed* id is already claimed, or a *changed* destination
    /// path collides with any destination in the transaction. Unchanged fields
    /// are never checked, so re-staging a note under its own id is always fine.
    pub fn verify(&self, original_path: &Path, update: &Note) -> Result<bool> {
        let original = self.get_note_info_state(original_path)?;

        if original.id != update.info.id {
            if let Some(id) = &update.info.id {
                if self.ids.contains(id) {
                    return Ok(false);
                }
            }
        }
        if original.file_path != update.info.file_path
            && self.path_conflict(&update.info.file_path)
        {
            return Ok(false);
        }
        Ok(true)
    }

    /// Stage `update` as the new state of the note at `original_path`,
    /// reserving its id and destination path. Errors when `verify` says no.
    pub fn add_change(&mut self, original_path: &Path, update: Note) -> Result<()> {
        if !self.verify(original_path, &update)? {
            return Err(MintError::ConflictingChange(
                "this change conflicts, verify a change against the transaction before adding it"
                    .to_string(),
            ));
        }

        let original = self.get_note_info_state(original_path)?;
        if original.id != update.info.id {
            if let Some(old_id) = &original.id {
                self.ids.remove(old_id);
            }
            if let Some(new_id) = &update.info.id {
                self.ids.insert(new_id.clone());
            }
        }
        if original.file_path != update.info.file_path {
            self.file_moves
                .insert(original_path.to_path_buf(), update.info.file_path.clone());
        }
        self.by_path.insert(original_path.to_path_buf(), Some(update));
        Ok(())
    }

    fn path_conflict(&self, path: &Path) -> bool {
        self.file_moves.values().any(|target| target == path)
    }

    pub(crate) fn into_changes(
        self,
    ) -> (BTreeMap<PathBuf, Option<Note>>, BTreeMap<PathBuf, PathBuf>) {
        (self.by_path, self.file_moves)
    }
}
