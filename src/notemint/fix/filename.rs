use crate::error::Result;
use crate::model::NoteInfo;
use crate::store::NoteStore;
use crate::transaction::{ChangeTransaction, TryChangeResult};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

const MAX_SLUG_LENGTH: usize = 64;

static DATE_PREFIX_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^20[\d.\-_\s]*\d").unwrap());
static NON_ALPHANUMERIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]").unwrap());

const STOP_WORDS: [&str; 11] = [
    "on", "to", "the", "of", "and", "is", "at", "a", "an", "for", "in",
];

/// Repairs a filename that doesn't carry the note's id.
///
/// The default repair prepends `{id}_` to the current name. With `complete`,
/// the name is rebuilt as `{id}-{slug}.md` from the title instead; `force` on
/// top of that reconsiders every note, not just ones missing their id.
pub struct FilenameFixer {
    complete: bool,
    force: bool,
}

impl Default for FilenameFixer {
    fn default() -> Self {
        Self::new()
    }
}

impl FilenameFixer {
    pub fn new() -> FilenameFixer {
        FilenameFixer {
            complete: false,
            force: false,
        }
    }

    pub fn rebuilding(force: bool) -> FilenameFixer {
        FilenameFixer {
            complete: true,
            force,
        }
    }

    pub fn check(&self, note: &NoteInfo) -> bool {
        if self.complete && self.force {
            return true;
        }
        match &note.id {
            Some(id) => !note.file_name().contains(id.as_str()),
            None => true,
        }
    }

    pub fn try_change<S: NoteStore>(
        &self,
        path: &Path,
        transaction: &ChangeTransaction<'_, S>,
    ) -> Result<TryChangeResult> {
        let mut note = transaction.get_note_state(path)?;
        let mut details = Vec::new();

        let id = match note.info.id.clone() {
            Some(id) => id,
            None => {
                details.push(" * cannot fix the file name of a note without an id".to_string());
                return Ok(TryChangeResult::failed(details));
            }
        };

        let current = note.info.file_name();
        let proposed = if self.complete {
            match &note.info.title {
                Some(title) => complete_rewrite(&id, title),
                None => {
                    details.push(
                        " * cannot rewrite the file name of a note without a title".to_string(),
                    );
                    return Ok(TryChangeResult::failed(details));
                }
            }
        } else if current.contains(&id) {
            current.clone()
        } else {
            prepend_id(&id, &current)
        };

        if proposed == current {
            details.push(" * note already has the proposed name".to_string());
            return Ok(TryChangeResult::nothing(details));
        }

        let directory = note
            .info
            .file_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        note.info.file_path = directory.join(&proposed);
        details.push(format!(" * proposed new filename: {}", proposed));
        Ok(TryChangeResult::ok(note, details))
    }
}

fn prepend_id(id: &str, file_name: &str) -> String {
    let (stem, extension) = match file_name.rfind('.') {
        Some(position) => (&file_name[..position], &file_name[position..]),
        None => (file_name, ""),
    };
    format!("{}_{}{}", id, stem.trim(), extension)
}

/// `{id}-{slug}.md` where the slug is built from the title: lowercased, any
/// leading date prefix stripped, non-alphanumerics treated as word breaks,
/// stop words dropped, words joined by dashes up to the length cap.
fn complete_rewrite(id: &str, title: &str) -> String {
    let lowered = title.to_lowercase();
    let stripped = DATE_PREFIX_PATTERN.replace(&lowered, "");
    let spaced = NON_ALPHANUMERIC.replace_all(&stripped, " ");
    let words: Vec<&str> = spaced
        .split_whitespace()
        .filter(|word| !STOP_WORDS.contains(word))
        .collect();
    format!("{}-{}.md", id, add_words_up_to(MAX_SLUG_LENGTH, &words))
}

fn add_words_up_to(limit: usize, words: &[&str]) -> String {
    let mut joined = String::new();
    for word in words {
        if joined.is_empty() {
            joined.push_str(word);
            continue;
        }
        if joined.len() + 1 + word.len() > limit {
            break;
        }
        joined.push('-');
        joined.push_str(word);
    }
    joined
}
