//! Fixers: repair strategies for one missing note attribute each.
//!
//! A fixer proposes, it never writes. `check` says whether a note needs the
//! repair; `try_change` fetches the note through a transaction, computes the
//! repaired version, and returns it with human-readable detail lines. The
//! caller verifies and stages the result, batching many notes into one commit.
//!
//! The set is closed on purpose: five attributes, five fixers, one enum.

pub mod author;
pub mod created;
pub mod filename;
pub mod id;
pub mod title;

pub use author::AuthorFixer;
pub use created::CreatedFixer;
pub use filename::FilenameFixer;
pub use id::IdFixer;
pub use title::TitleFixer;

use crate::error::Result;
use crate::model::NoteInfo;
use crate::store::NoteStore;
use crate::transaction::{ChangeTransaction, TryChangeResult};
use std::path::Path;

pub enum Fixer {
    Created(CreatedFixer),
    Id(IdFixer),
    Title(TitleFixer),
    Author(AuthorFixer),
    Filename(FilenameFixer),
}

impl Fixer {
    /// The attribute this fixer repairs, for messages.
    pub fn attribute(&self) -> &'static str {
        match self {
            Fixer::Created(_) => "created",
            Fixer::Id(_) => "id",
            Fixer::Title(_) => "title",
            Fixer::Author(_) => "author",
            Fixer::Filename(_) => "filename",
        }
    }

    /// Whether the note needs this repair.
    pub fn check(&self, note: &NoteInfo) -> bool {
        match self {
            Fixer::Created(fixer) => fixer.check(note),
            Fixer::Id(fixer) => fixer.check(note),
            Fixer::Title(fixer) => fixer.check(note),
            Fixer::Author(fixer) => fixer.check(note),
            Fixer::Filename(fixer) => fixer.check(note),
        }
    }

    /// Compute the repaired note as the transaction currently sees it.
    pub fn try_change<S: NoteStore>(
        &self,
        path: &Path,
        transaction: &ChangeTransaction<'_, S>,
    ) -> Result<TryChangeResult> {
        match self {
            Fixer::Created(fixer) => fixer.try_change(path, transaction),
            Fixer::Id(fixer) => fixer.try_change(path, transaction),
            Fixer::Title(fixer) => fixer.try_change(path, transaction),
            Fixer::Author(fixer) => fixer.try_change(path, transaction),
            Fixer::Filename(fixer) => fixer.try_change(path, transaction),
        }
    }
}

/// One row of the missing-attribute report.
pub struct AttrCheck {
    pub name: &'static str,
    pub description: &'static str,
    pub hint: &'static str,
    pub check: fn(&NoteInfo) -> bool,
}

/// The attribute checks in report order.
pub fn attr_checks() -> Vec<AttrCheck> {
    vec![
        AttrCheck {
            name: "created",
            description: "missing a creation time",
            hint: "try the 'nm fix created' command",
            check: |note| note.created.is_none(),
        },
        AttrCheck {
            name: "id",
            description: "missing an id",
            hint: "try the 'nm fix id' command",
            check: |note| note.id.is_none(),
        },
        AttrCheck {
            name: "title",
            description: "missing the title in the metadata",
            hint: "try the 'nm fix title' command",
            check: |note| note.title.is_none(),
        },
        AttrCheck {
            name: "filename",
            description: "missing an id in their filename",
            hint: "try the 'nm fix filename' command",
            check: |note| match &note.id {
                Some(id) => !note.file_name().contains(id.as_str()),
                None => true,
            },
        },
        AttrCheck {
            name: "author",
            description: "missing an author",
            hint: "try the 'nm fix author' command",
            check: |note| note.author.is_none(),
        },
    ]
}
