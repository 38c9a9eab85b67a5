use crate::commands::{helpers, CmdMessage, CmdResult};
use crate::error::Result;
use crate::registry::{self, Registry};
use crate::store::NoteStore;
use std::fs;
use std::path::Path;

/// Unregister an index. The notes on disk are left alone, only the
/// registration and its cached scan are removed.
pub fn run<S: NoteStore>(
    registry: &mut Registry<S>,
    data_dir: &Path,
    name: &str,
    skip_confirm: bool,
) -> Result<CmdResult> {
    let mut result = CmdResult::default();

    if !registry.directory.contains_key(name) {
        return Ok(result.with_message(CmdMessage::error(format!(
            "No index named '{}' is registered",
            name
        ))));
    }

    let prompt = format!("Delete the index '{}'? The notes are not touched.", name);
    if !helpers::confirm(&prompt, skip_confirm)? {
        return Ok(result.with_message(CmdMessage::info("Operation cancelled.")));
    }

    registry.unregister(name);
    registry.save(data_dir)?;

    // Drop the cached scan along with its backup.
    let cache = data_dir.join(registry::index_filename(name));
    let _ = fs::remove_file(&cache);
    let mut backup = cache.into_os_string();
    backup.push(".back");
    let _ = fs::remove_file(backup);

    result.add_message(CmdMessage::success(format!("Deleted index '{}'", name)));
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::MessageLevel;
    use crate::store::memory::fixtures::StoreFixture;
    use std::env;
    use std::path::PathBuf;

    fn scratch_dir(tag: &str) -> PathBuf {
        let dir = env::temp_dir().join(format!("notemint_test_delete_{}", tag));
        if dir.exists() {
            fs::remove_dir_all(&dir).unwrap();
        }
        dir
    }

    #[test]
    fn test_delete_removes_registration_and_cache() {
        let data_dir = scratch_dir("removes");
        let mut registry = StoreFixture::new()
            .with_alpha_notes()
            .registry(&[("alpha", "/alpha")]);
        registry.load_all(false).unwrap();
        registry.save(&data_dir).unwrap();
        assert!(data_dir.join("index-alpha.json").exists());

        let result = run(&mut registry, &data_dir, "alpha", true).unwrap();

        assert!(matches!(result.messages[0].level, MessageLevel::Success));
        assert!(registry.directory.is_empty());
        assert!(!data_dir.join("index-alpha.json").exists());
        fs::remove_dir_all(&data_dir).unwrap();
    }

    #[test]
    fn test_delete_unknown_index() {
        let data_dir = scratch_dir("unknown");
        let mut registry = StoreFixture::new().registry(&[]);

        let result = run(&mut registry, &data_dir, "ghost", true).unwrap();

        assert!(matches!(result.messages[0].level, MessageLevel::Error));
        assert!(result.messages[0].content.contains("ghost"));
    }
}
