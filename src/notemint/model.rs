use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Validation state of a note's metadata envelope.
///
/// The state is recomputed on every registry load; outside of a load cycle it is stale and
/// must not be trusted across edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParseState {
    /// No front-matter block was found in the file.
    Missing,
    /// A front-matter block was found but could not be parsed.
    Failed,
    /// Parsed, not yet validated against the registry.
    Unknown,
    /// Validated, no id present.
    NoId,
    /// The id collides with at least one other note.
    Conflict,
    /// Validated, unique id.
    Ok,
}

/// The metadata envelope of one note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteInfo {
    pub file_path: PathBuf,
    pub created: Option<DateTime<FixedOffset>>,
    pub id: Option<String>,
    pub title: Option<String>,
    pub author: Option<String>,
    /// When true, this note receives a generated "referenced by" section.
    #[serde(default)]
    pub backlink: Option<bool>,
    /// Ids referenced from the note body, first-seen order. Derived at parse time.
    #[serde(default)]
    pub links_to: Vec<String>,
    pub state: ParseState,
    /// Human-readable diagnostic for `Missing`/`Failed` parses.
    #[serde(default)]
    pub info: Option<String>,
}

impl NoteInfo {
    pub fn empty(file_path: PathBuf) -> Self {
        Self {
            file_path,
            created: None,
            id: None,
            title: None,
            author: None,
            backlink: None,
            links_to: Vec::new(),
            state: ParseState::Unknown,
            info: None,
        }
    }

    pub fn file_name(&self) -> String {
        self.file_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn has_backlink(&self) -> bool {
        self.backlink.unwrap_or(false)
    }
}

/// Stat record for one witnessed file, used for incremental change detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileStat {
    pub directory: PathBuf,
    pub file_name: String,
    /// Modification time as epoch seconds.
    pub last_modified: i64,
    pub size: u64,
    #[serde(default)]
    pub check_sum: Option<String>,
}

impl FileStat {
    pub fn full_path(&self) -> PathBuf {
        self.directory.join(&self.file_name)
    }

    /// Whether this stat record differs from a previously captured one.
    ///
    /// The size+mtime comparison is an optimistic heuristic; the checksum comparison is
    /// authoritative but requires hashing full file contents, so it is opt-in.
    pub fn has_changed_from(&self, other: &FileStat, use_checksum: bool) -> bool {
        if use_checksum {
            self.check_sum != other.check_sum
        } else {
            self.size != other.size || self.last_modified != other.last_modified
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn stat(modified: i64, size: u64, sum: Option<&str>) -> FileStat {
        FileStat {
            directory: PathBuf::from("/notes"),
            file_name: "a.md".to_string(),
            last_modified: modified,
            size,
            check_sum: sum.map(String::from),
        }
    }

    #[test]
    fn test_full_path_joins_directory_and_name() {
        assert_eq!(stat(100, 10, None).full_path(), Path::new("/notes/a.md"));
    }

    #[test]
    fn test_stat_comparison_uses_size_and_mtime() {
        let old = stat(100, 10, Some("sha256:aa"));
        assert!(!stat(100, 10, Some("sha256:bb")).has_changed_from(&old, false));
        assert!(stat(101, 10, None).has_changed_from(&old, false));
        assert!(stat(100, 11, None).has_changed_from(&old, false));
    }

    #[test]
    fn test_stat_comparison_with_checksum_is_authoritative() {
        let old = stat(100, 10, Some("sha256:aa"));
        assert!(!stat(999, 99, Some("sha256:aa")).has_changed_from(&old, true));
        assert!(stat(100, 10, Some("sha256:bb")).has_changed_from(&old, true));
    }

    #[test]
    fn test_file_name_helper() {
        let info = NoteInfo::empty(PathBuf::from("/notes/deep/note-01.md"));
        assert_eq!(info.file_name(), "note-01.md");
    }

    #[test]
    fn test_backlink_flag_defaults_off() {
        let mut info = NoteInfo::empty(PathBuf::from("/notes/a.md"));
        assert!(!info.has_backlink());
        info.backlink = Some(true);
        assert!(info.has_backlink());
        info.backlink = Some(false);
        assert!(!info.has_backlink());
    }
}
