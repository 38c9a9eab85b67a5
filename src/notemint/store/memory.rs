use super::NoteStore;
use crate::error::{MintError, Result};
use crate::model::FileStat;
use chrono::{DateTime, FixedOffset};
use sha2::{Digest, Sha256};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// One stored file: content plus the times a real filesystem would report.
#[derive(Debug, Clone)]
pub struct MemFile {
    pub content: String,
    /// Modification time as epoch seconds.
    pub modified: i64,
    /// Creation time, when the simulated platform reports one.
    pub created: Option<DateTime<FixedOffset>>,
}

/// In-memory storage for testing. Times are whatever the fixture set them to,
/// so change detection and timestamp extraction are fully deterministic.
pub struct InMemoryStore {
    files: RefCell<BTreeMap<PathBuf, MemFile>>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            files: RefCell::new(BTreeMap::new()),
        }
    }

    pub fn insert_file(
        &self,
        path: impl Into<PathBuf>,
        content: impl Into<String>,
        modified: i64,
        created: Option<DateTime<FixedOffset>>,
    ) {
        self.files.borrow_mut().insert(
            path.into(),
            MemFile {
                content: content.into(),
                modified,
                created,
            },
        );
    }

    /// Snapshot of path -> content, for asserting which files a commit touched.
    pub fn contents(&self) -> BTreeMap<PathBuf, String> {
        self.files
            .borrow()
            .iter()
            .map(|(path, file)| (path.clone(), file.content.clone()))
            .collect()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.files.borrow().contains_key(path)
    }

    fn missing(path: &Path) -> MintError {
        MintError::Store(format!("No such file: {}", path.display()))
    }
}

impl NoteStore for InMemoryStore {
    fn list_files(&self, root: &Path, predicate: &dyn Fn(&str) -> bool) -> Result<Vec<FileStat>> {
        let files = self.files.borrow();
        let mut found = Vec::new();
        for (path, file) in files.iter() {
            if !path.starts_with(root) {
                continue;
            }
            let file_name = match path.file_name() {
                Some(name) => name.to_string_lossy().into_owned(),
                None => continue,
            };
            if !predicate(&file_name) {
                continue;
            }
            found.push(FileStat {
                directory: path.parent().unwrap_or(root).to_path_buf(),
                file_name,
                last_modified: file.modified,
                size: file.content.len() as u64,
                check_sum: None,
            });
        }
        Ok(found)
    }

    fn read_text(&self, path: &Path) -> Result<String> {
        self.files
            .borrow()
            .get(path)
            .map(|f| f.content.clone())
            .ok_or_else(|| Self::missing(path))
    }

    fn write_text(&self, path: &Path, content: &str) -> Result<()> {
        let mut files = self.files.borrow_mut();
        match files.get_mut(path) {
            Some(file) => {
                file.content = content.to_string();
                // Rewrites advance the clock so stat-based change detection sees them.
                file.modified += 1;
            }
            None => {
                files.insert(
                    path.to_path_buf(),
                    MemFile {
                        content: content.to_string(),
                        modified: 0,
                        created: None,
                    },
                );
            }
        }
        Ok(())
    }

    fn checksum(&self, path: &Path) -> Result<String> {
        let files = self.files.borrow();
        let file = files.get(path).ok_or_else(|| Self::missing(path))?;
        let digest = Sha256::digest(file.content.as_bytes());
        Ok(format!("sha256:{}", hex::encode(digest)))
    }

    fn move_file(&self, src: &Path, dst: &Path) -> Result<()> {
        let mut files = self.files.borrow_mut();
        let file = files.remove(src).ok_or_else(|| Self::missing(src))?;
        files.insert(dst.to_path_buf(), file);
        Ok(())
    }

    fn file_time(&self, path: &Path) -> Result<(DateTime<FixedOffset>, bool)> {
        let files = self.files.borrow();
        let file = files.get(path).ok_or_else(|| Self::missing(path))?;
        match file.created {
            Some(created) => Ok((created, true)),
            None => {
                let fallback = DateTime::from_timestamp(file.modified, 0)
                    .unwrap_or_default()
                    .fixed_offset();
                Ok((fallback, false))
            }
        }
    }
}

// --- Test Fixtures ---

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use super::*;
    use crate::registry::Registry;
    use chrono::{FixedOffset, TimeZone};

    /// The fixed zone used by the sample corpus (UTC-5, matching the sample timestamps).
    pub fn fixture_zone() -> FixedOffset {
        FixedOffset::west_opt(5 * 3600).unwrap()
    }

    pub const MD_ALPHA_NOTE_0: &str = "\
---
title: Note Sample 0
author: Alice Allison
created: '2024-01-02T08:01:35-05:00'
id: 20240102080135
---
# Sample Note 0

This is some text in sample note 0.
";

    pub const MD_ALPHA_NOTE_1: &str = "\
---
title: Note Sample 1
author: Bob Bobertson
created: '1999-09-07T01:21:14-05:00'
id: 19990907012114
---
# Sample Note 1

This is some text in sample note 1.
";

    pub const MD_ALPHA_NOTE_2: &str = "\
---
title: Note Sample 2
author: Carol Carlson
created: '2003-09-07T06:30:10-05:00'
id: 20030907063010
---
# Sample Note 2

This is some text in sample note 2.
";

    pub const MD_ALPHA_NOTE_3: &str = "\
---
title: Note Sample 3
author: Dan Danielson
created: '2010-11-23T14:01:48-05:00'
id: 20101123140148
---
# Sample Note 3

This is some text in sample note 3.
";

    pub const MD_ALPHA_NOTE_4: &str = "\
---
title: Note Sample 4
author: Erin Erinson
created: '2018-04-05T11:22:33-05:00'
id: 20180405112233
---
# Sample Note 4

This is some text in sample note 4.
";

    /// A note with no creation time and no id; its simulated filesystem creation
    /// time is 2015-04-30 17:49:27 in the fixture zone.
    pub const MD_NO_TIMESTAMP: &str = "\
---
title: Note Missing Timestamp
author: Alice Allison
---
# Note Missing Timestamp

Nothing in the front matter says when this was written.
";

    pub const MD_LEGIT_STAMP: &str = "\
---
title: Note With Stamped Filename
author: Alice Allison
---
# Note With Stamped Filename

The filename carries a usable timestamp.
";

    pub const MD_WRONG_STAMP: &str = "\
---
title: Note With Malformed Stamp
author: Alice Allison
---
# Note With Malformed Stamp

The filename stamp does not correspond to a real date.
";

    pub fn unstamped_created() -> DateTime<FixedOffset> {
        fixture_zone()
            .with_ymd_and_hms(2015, 4, 30, 17, 49, 27)
            .single()
            .unwrap()
    }

    pub struct StoreFixture {
        pub store: InMemoryStore,
    }

    impl Default for StoreFixture {
        fn default() -> Self {
            Self::new()
        }
    }

    impl StoreFixture {
        pub fn new() -> Self {
            Self {
                store: InMemoryStore::new(),
            }
        }

        pub fn with_note(self, path: &str, content: &str) -> Self {
            self.store.insert_file(path, content, 100, None);
            self
        }

        /// The five well-formed notes under /alpha, all with unique ids.
        pub fn with_alpha_notes(self) -> Self {
            self.with_note("/alpha/note-00.md", MD_ALPHA_NOTE_0)
                .with_note("/alpha/note-01.md", MD_ALPHA_NOTE_1)
                .with_note("/alpha/note-02.md", MD_ALPHA_NOTE_2)
                .with_note("/alpha/note-03.md", MD_ALPHA_NOTE_3)
                .with_note("/alpha/note-04.md", MD_ALPHA_NOTE_4)
        }

        /// /fix/timestamp-none.md: no created, no id, known filesystem creation time.
        pub fn with_unstamped_note(self) -> Self {
            self.store.insert_file(
                "/fix/timestamp-none.md",
                MD_NO_TIMESTAMP,
                100,
                Some(unstamped_created()),
            );
            self
        }

        /// Two notes whose filenames embed timestamps, one valid and one not.
        pub fn with_stamped_notes(self) -> Self {
            self.with_note("/fix/timestamp-legit-20031117110124.md", MD_LEGIT_STAMP)
                .with_note("/fix/timestamp-wrong-20130434025112.md", MD_WRONG_STAMP)
        }

        /// A small corpus under /links where notes reference each other by id.
        pub fn with_link_notes(self) -> Self {
            self.with_note(
                "/links/note-01.md",
                "\
---
title: Linking Note One
author: Alice Allison
created: '2003-11-27T10:37:17-05:00'
id: 20031127103717
backlink: true
---
# Linking Note One

See [[20201204110546]] and also [[20160227182247]] for background.
",
            )
            .with_note(
                "/links/note-02.md",
                "\
---
title: Linking Note Two
author: Bob Bobertson
created: '1991-08-02T21:16:42-05:00'
id: 19910802211642
---
# Linking Note Two

Builds on [[20160227182247]].
",
            )
            .with_note(
                "/links/note-03.md",
                "\
---
title: Linked Target
author: Carol Carlson
created: '2016-02-27T18:22:47-05:00'
id: 20160227182247
backlink: true
---
# Linked Target

Often referenced, links to nothing.
",
            )
            .with_note(
                "/links/note-04.md",
                "\
---
title: Quiet Target
author: Dan Danielson
created: '2020-12-04T11:05:46-05:00'
id: 20201204110546
---
# Quiet Target

Also referenced, links to nothing.
",
            )
        }

        /// Registry over the given directories with the fixture zone.
        pub fn registry(self, directories: &[(&str, &str)]) -> Registry<InMemoryStore> {
            let mut registry = Registry::new(self.store, fixture_zone());
            for (name, path) in directories {
                registry.register(name, Path::new(path));
            }
            registry
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::StoreFixture;
    use super::*;

    #[test]
    fn test_read_write_round_trip() {
        let store = InMemoryStore::new();
        store.insert_file("/notes/a.md", "hello", 100, None);

        assert_eq!(store.read_text(Path::new("/notes/a.md")).unwrap(), "hello");
        store.write_text(Path::new("/notes/a.md"), "changed").unwrap();
        assert_eq!(store.read_text(Path::new("/notes/a.md")).unwrap(), "changed");
    }

    #[test]
    fn test_write_bumps_modified_time() {
        let store = InMemoryStore::new();
        store.insert_file("/notes/a.md", "hello", 100, None);
        store.write_text(Path::new("/notes/a.md"), "olleh").unwrap();

        let is_md = |name: &str| name.ends_with(".md");
        let stats = store.list_files(Path::new("/notes"), &is_md).unwrap();
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].last_modified, 101);
    }

    #[test]
    fn test_list_files_scopes_to_root() {
        let fixture = StoreFixture::new().with_alpha_notes().with_unstamped_note();
        let is_md = |name: &str| name.to_lowercase().ends_with(".md");

        let alpha = fixture
            .store
            .list_files(Path::new("/alpha"), &is_md)
            .unwrap();
        assert_eq!(alpha.len(), 5);

        let fix = fixture.store.list_files(Path::new("/fix"), &is_md).unwrap();
        assert_eq!(fix.len(), 1);
        assert_eq!(fix[0].file_name, "timestamp-none.md");
    }

    #[test]
    fn test_move_file_preserves_times() {
        let store = InMemoryStore::new();
        store.insert_file("/a/src.md", "content", 42, None);
        store
            .move_file(Path::new("/a/src.md"), Path::new("/a/dst.md"))
            .unwrap();

        assert!(!store.contains(Path::new("/a/src.md")));
        let is_md = |name: &str| name.ends_with(".md");
        let stats = store.list_files(Path::new("/a"), &is_md).unwrap();
        assert_eq!(stats[0].last_modified, 42);
    }

    #[test]
    fn test_file_time_prefers_creation_time() {
        let fixture = StoreFixture::new().with_unstamped_note();
        let (time, was_created) = fixture
            .store
            .file_time(Path::new("/fix/timestamp-none.md"))
            .unwrap();

        assert!(was_created);
        assert_eq!(time, super::fixtures::unstamped_created());
    }

    #[test]
    fn test_file_time_falls_back_to_modified() {
        let store = InMemoryStore::new();
        store.insert_file("/a/a.md", "x", 1000, None);
        let (time, was_created) = store.file_time(Path::new("/a/a.md")).unwrap();

        assert!(!was_created);
        assert_eq!(time.timestamp(), 1000);
    }

    #[test]
    fn test_checksum_tracks_content() {
        let store = InMemoryStore::new();
        store.insert_file("/a/a.md", "one", 1, None);
        store.insert_file("/a/b.md", "one", 1, None);
        store.insert_file("/a/c.md", "two", 1, None);

        let a = store.checksum(Path::new("/a/a.md")).unwrap();
        let b = store.checksum(Path::new("/a/b.md")).unwrap();
        let c = store.checksum(Path::new("/a/c.md")).unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
