use crate::error::Result;
use crate::model::NoteInfo;
use crate::note::ID_TIME_FORMAT;
use crate::store::NoteStore;
use crate::transaction::{ChangeTransaction, TryChangeResult};
use chrono::Duration;
use std::path::Path;

/// Repairs a missing id by deriving one from the creation time.
///
/// When the derived id is already claimed, the fixer fails unless `resolve` is
/// on; resolving walks the creation time forward one second at a time until the
/// id is free, staging the adjusted creation time along with the id so the two
/// stay consistent.
pub struct IdFixer {
    resolve: bool,
}

impl IdFixer {
    pub fn new(resolve: bool) -> IdFixer {
        IdFixer { resolve }
    }

    pub fn check(&self, note: &NoteInfo) -> bool {
        note.id.is_none()
    }

    pub fn try_change<S: NoteStore>(
        &self,
        path: &Path,
        transaction: &ChangeTransaction<'_, S>,
    ) -> Result<TryChangeResult> {
        let mut note = transaction.get_note_state(path)?;
        let mut details = Vec::new();

        let created = match note.info.created {
            Some(created) => created,
            None => {
                details.push(
                    " * cannot generate an id for this note, it has no creation time".to_string(),
                );
                return Ok(TryChangeResult::failed(details));
            }
        };

        let new_id = created.format(ID_TIME_FORMAT).to_string();
        if !transaction.has_id(&new_id) {
            details.push(format!(" * id from creation timestamp = {}", new_id));
            note.info.id = Some(new_id);
            return Ok(TryChangeResult::ok(note, details));
        }

        if !self.resolve {
            details.push(format!(
                " * cannot create id {} because it conflicts with an existing id",
                new_id
            ));
            return Ok(TryChangeResult::failed(details));
        }

        let mut adjusted = created;
        let mut offset = 0i64;
        let mut proposed = new_id;
        while transaction.has_id(&proposed) {
            adjusted += Duration::seconds(1);
            offset += 1;
            proposed = adjusted.format(ID_TIME_FORMAT).to_string();
        }
        details.push(format!(
            " * propose changing the creation time by {} seconds to {}",
            offset, adjusted
        ));
        details.push(format!(" * new id would then be {}", proposed));
        note.info.created = Some(adjusted);
        note.info.id = Some(proposed);
        Ok(TryChangeResult::ok(note, details))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Registry;
    use crate::store::memory::fixtures::StoreFixture;
    use crate::store::memory::InMemoryStore;
    use chrono::{FixedOffset, TimeZone};

    // No id, creation time colliding with alpha note 0's id.
    const MD_COPYCAT: &str = "\
---
title: Copycat Note
author: Erin Erinson
created: '2024-01-02T08:01:35-05:00'
---
# Copycat Note

Written in the same second as another note.
";

    // Collides on the derived id and on the next second after it.
    const MD_NEXT_SECOND: &str = "\
---
title: Next Second Note
author: Erin Erinson
created: '2024-01-02T08:01:36-05:00'
id: 20240102080136
---
# Next Second Note

Occupies the second after sample note 0.
";

    fn copycat_registry() -> Registry<InMemoryStore> {
        let mut registry = StoreFixture::new()
            .with_alpha_notes()
            .with_note("/fix/copycat.md", MD_COPYCAT)
            .with_note("/fix/next-second.md", MD_NEXT_SECOND)
            .registry(&[("fix", "/fix"), ("notes", "/alpha")]);
        registry.load_all(false).unwrap();
        registry
    }

    #[test]
    fn test_derives_id_from_created() {
        let mut registry = StoreFixture::new()
            .with_unstamped_note()
            .registry(&[("fix", "/fix")]);
        registry.load_all(false).unwrap();
        let mut transaction = registry.create_empty_transaction();

        let path = Path::new("/fix/timestamp-none.md");
        let mut note = transaction.get_note_state(path).unwrap();
        note.info.created = Some(
            FixedOffset::west_opt(5 * 3600)
                .unwrap()
                .with_ymd_and_hms(2015, 4, 30, 17, 49, 27)
                .unwrap(),
        );
        transaction.add_change(path, note).unwrap();

        match IdFixer::new(false).try_change(path, &transaction).unwrap() {
            TryChangeResult::Ok { note, details } => {
                assert_eq!(note.info.id.as_deref(), Some("20150430174927"));
                assert!(details[0].contains("id from creation timestamp"));
            }
            other => panic!("expected a staged change, got {:?}", other),
        }
    }

    #[test]
    fn test_fails_without_created() {
        let mut registry = StoreFixture::new()
            .with_unstamped_note()
            .registry(&[("fix", "/fix")]);
        registry.load_all(false).unwrap();
        let transaction = registry.create_empty_transaction();

        let path = Path::new("/fix/timestamp-none.md");
        match IdFixer::new(false).try_change(path, &transaction).unwrap() {
            TryChangeResult::Failed { details } => {
                assert!(details[0].contains("it has no creation time"));
            }
            other => panic!("expected a failure, got {:?}", other),
        }
    }

    #[test]
    fn test_collision_fails_without_resolve() {
        let registry = copycat_registry();
        let transaction = registry.create_empty_transaction();

        let path = Path::new("/fix/copycat.md");
        match IdFixer::new(false).try_change(path, &transaction).unwrap() {
            TryChangeResult::Failed { details } => {
                assert!(details[0].contains("conflicts with an existing id"));
            }
            other => panic!("expected a failure, got {:?}", other),
        }
    }

    #[test]
    fn test_resolve_walks_forward_past_taken_seconds() {
        let registry = copycat_registry();
        let transaction = registry.create_empty_transaction();

        // 20240102080135 and ...36 are both taken, so resolution lands on ...37.
        let path = Path::new("/fix/copycat.md");
        match IdFixer::new(true).try_change(path, &transaction).unwrap() {
            TryChangeResult::Ok { note, details } => {
                assert_eq!(note.info.id.as_deref(), Some("20240102080137"));
                let expected = FixedOffset::west_opt(5 * 3600)
                    .unwrap()
                    .with_ymd_and_hms(2024, 1, 2, 8, 1, 37)
                    .unwrap();
                assert_eq!(note.info.created, Some(expected));
                assert!(details[0].contains("by 2 seconds"));
                assert!(details[1].contains("20240102080137"));
            }
            other => panic!("expected a staged change, got {:?}", other),
        }
    }
}
