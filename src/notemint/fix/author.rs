use crate::error::Result;
use crate::model::NoteInfo;
use crate::store::NoteStore;
use crate::transaction::{ChangeTransaction, TryChangeResult};
use std::path::Path;

/// Repairs a missing author with a caller-supplied name, usually the
/// configured default.
pub struct AuthorFixer {
    author: String,
}

impl AuthorFixer {
    pub fn new(author: &str) -> AuthorFixer {
        AuthorFixer {
            author: author.to_string(),
        }
    }

    pub fn check(&self, note: &NoteInfo) -> bool {
        note.author.is_none()
    }

    pub fn try_change<S: NoteStore>(
        &self,
        path: &Path,
        transaction: &ChangeTransaction<'_, S>,
    ) -> Result<TryChangeResult> {
        let mut note = transaction.get_note_state(path)?;
        let details = vec![format!(" * will set author to '{}'", self.author)];
        note.info.author = Some(self.author.clone());
        Ok(TryChangeResult::ok(note, details))
    }
}
