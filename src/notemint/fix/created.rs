use crate::error::Result;
use crate::model::NoteInfo;
use crate::note::{ID_TIME_FORMAT, LONG_STAMP_PATTERN};
use crate::store::NoteStore;
use crate::transaction::{ChangeTransaction, TryChangeResult};
use chrono::NaiveDateTime;
use std::path::Path;

/// Repairs a missing creation time.
///
/// A 14-digit stamp embedded in the filename wins when it parses to a real
/// date; a stamp that doesn't parse is a hard failure rather than a fallback,
/// since a bogus stamp usually means the filename lies. Otherwise the file
/// system's creation time is used, or its modification time on platforms that
/// don't track creation.
pub struct CreatedFixer;

impl Default for CreatedFixer {
    fn default() -> Self {
        Self::new()
    }
}

impl CreatedFixer {
    pub fn new() -> CreatedFixer {
        CreatedFixer
    }

    pub fn check(&self, note: &NoteInfo) -> bool {
        note.created.is_none()
    }

    pub fn try_change<S: NoteStore>(
        &self,
        path: &Path,
        transaction: &ChangeTransaction<'_, S>,
    ) -> Result<TryChangeResult> {
        let mut note = transaction.get_note_state(path)?;
        let mut details = Vec::new();

        let file_name = note.info.file_name();
        if let Some(stamp) = LONG_STAMP_PATTERN.find(&file_name) {
            let zone = transaction.registry().zone();
            let parsed = NaiveDateTime::parse_from_str(stamp.as_str(), ID_TIME_FORMAT)
                .ok()
                .and_then(|naive| naive.and_local_timezone(*zone).single());
            return match parsed {
                Some(created) => {
                    details.push(format!(" * found timestamp in file name: {}", created));
                    note.info.created = Some(created);
                    Ok(TryChangeResult::ok(note, details))
                }
                None => {
                    details.push(
                        " * file had a long-stamp but it didn't parse to a valid date/time"
                            .to_string(),
                    );
                    Ok(TryChangeResult::failed(details))
                }
            };
        }

        let (extracted, was_created) = transaction.registry().file_time(path)?;
        let kind = if was_created { "created" } else { "last modified" };
        details.push(format!(
            " * extracted {} timestamp from file system: {}",
            kind, extracted
        ));
        note.info.created = Some(extracted);
        Ok(TryChangeResult::ok(note, details))
    }
}
