use crate::commands::{CmdMessage, CmdResult, IndexOverview};
use crate::error::Result;
use crate::registry::Registry;
use crate::store::NoteStore;
use std::path::Path;

/// List the registered indices with their note and exception counts.
pub fn run<S: NoteStore>(registry: &mut Registry<S>, data_dir: &Path) -> Result<CmdResult> {
    let mut result = CmdResult::default();

    if registry.directory.is_empty() {
        result.add_message(CmdMessage::info(
            "No indices registered. Run 'nm index create <name>' inside a notes directory.",
        ));
        return Ok(result);
    }

    // 1. Refresh the indices and keep the on-disk cache warm.
    registry.load_all(false)?;
    registry.save(data_dir)?;

    // 2. Report per-index totals.
    let indices: Vec<IndexOverview> = registry
        .indices
        .values()
        .map(|index| IndexOverview {
            name: index.name.clone(),
            path: index.path.clone(),
            notes: index.notes.len(),
            exceptions: index.exceptions.len(),
            last_modified: index.files.values().map(|stat| stat.last_modified).max(),
        })
        .collect();

    let exceptions: usize = indices.iter().map(|overview| overview.exceptions).sum();
    if exceptions > 0 {
        result.add_message(CmdMessage::warning(format!(
            "{} files could not be read, run 'nm index reload' for details",
            exceptions
        )));
    }
    if !registry.conflicts.is_empty() {
        result.add_message(CmdMessage::warning(format!(
            "{} ids are claimed by more than one note",
            registry.conflicts.len()
        )));
    }

    Ok(result.with_indices(indices))
}
