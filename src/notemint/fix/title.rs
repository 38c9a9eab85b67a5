use crate::error::Result;
use crate::model::NoteInfo;
use crate::store::NoteStore;
use crate::transaction::{ChangeTransaction, TryChangeResult};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

static HEADER_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^# (.*)").unwrap());

/// Repairs a missing title by lifting the body's leading markdown header.
pub struct TitleFixer;

impl Default for TitleFixer {
    fn default() -> Self {
        Self::new()
    }
}

impl TitleFixer {
    pub fn new() -> TitleFixer {
        TitleFixer
    }

    pub fn check(&self, note: &NoteInfo) -> bool {
        note.title.is_none()
    }

    pub fn try_change<S: NoteStore>(
        &self,
        path: &Path,
        transaction: &ChangeTransaction<'_, S>,
    ) -> Result<TryChangeResult> {
        let mut note = transaction.get_note_state(path)?;
        let mut details = Vec::new();

        let first_line = note.content.trim().lines().next().unwrap_or("");
        match HEADER_PATTERN.captures(first_line) {
            Some(captures) => {
                let title = captures[1].trim().to_string();
                details.push(format!(" * header found in content: {}", title));
                note.info.title = Some(title);
                Ok(TryChangeResult::ok(note, details))
            }
            None => {
                details.push(" * no header found in content".to_string());
                Ok(TryChangeResult::failed(details))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Registry;
    use crate::store::memory::fixtures::StoreFixture;
    use crate::store::memory::InMemoryStore;

    const MD_UNTITLED: &str = "\
---
author: Alice Allison
---
# A Perfectly Good Header

The front matter forgot the title.
";

    const MD_HEADLESS: &str = "\
---
author: Alice Allison
---
Just prose, starting from the first line.
";

    fn title_registry() -> Registry<InMemoryStore> {
        let mut registry = StoreFixture::new()
            .with_note("/fix/untitled.md", MD_UNTITLED)
            .with_note("/fix/headless.md", MD_HEADLESS)
            .registry(&[("fix", "/fix")]);
        registry.load_all(false).unwrap();
        registry
    }

    #[test]
    fn test_lifts_title_from_header() {
        let registry = title_registry();
        let transaction = registry.create_empty_transaction();
        let fixer = TitleFixer::new();

        let path = Path::new("/fix/untitled.md");
        assert!(fixer.check(&registry.by_path[path]));
        match fixer.try_change(path, &transaction).unwrap() {
            TryChangeResult::Ok { note, details } => {
                assert_eq!(note.info.title.as_deref(), Some("A Perfectly Good Header"));
                assert!(details[0].contains("header found in content"));
            }
            other => panic!("expected a staged change, got {:?}", other),
        }
    }

    #[test]
    fn test_fails_without_header() {
        let registry = title_registry();
        let transaction = registry.create_empty_transaction();

        let path = Path::new("/fix/headless.md");
        match TitleFixer::new().try_change(path, &transaction).unwrap() {
            TryChangeResult::Failed { details } => {
                assert!(details[0].contains("no header found"));
            }
            other => panic!("expected a failure, got {:?}", other),
        }
    }
}
