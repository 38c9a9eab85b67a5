use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::registry::Registry;
use crate::store::NoteStore;
use std::path::Path;

/// Rescan every registered directory with checksums, bypassing the
/// size and mtime shortcuts. This is the way to catch edits that kept
/// a file's stat line identical.
pub fn run<S: NoteStore>(registry: &mut Registry<S>, data_dir: &Path) -> Result<CmdResult> {
    let mut result = CmdResult::default();

    if registry.directory.is_empty() {
        result.add_message(CmdMessage::info("No indices registered, nothing to reload."));
        return Ok(result);
    }

    registry.load_all(true)?;
    registry.save(data_dir)?;

    let notes: usize = registry.indices.values().map(|index| index.notes.len()).sum();
    result.add_message(CmdMessage::success(format!(
        "Reloaded {} indices holding {} notes",
        registry.indices.len(),
        notes
    )));

    for index in registry.indices.values() {
        for (path, error) in &index.exceptions {
            result.add_message(CmdMessage::warning(format!(
                "{}: {}",
                path.display(),
                error
            )));
        }
    }
    Ok(result)
}
