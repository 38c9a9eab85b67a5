use crate::commands::{helpers, CmdMessage, CmdResult};
use crate::error::Result;
use crate::registry::Registry;
use crate::store::NoteStore;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

static NAME_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z0-9][a-z0-9-]*$").unwrap());

/// Register the working directory as a new index.
///
/// The directory is scanned for id conflicts against the already indexed
/// notes first, and the registration must be confirmed when any are found.
pub fn run<S: NoteStore>(
    registry: &mut Registry<S>,
    data_dir: &Path,
    name: &str,
    cwd: &Path,
    skip_confirm: bool,
) -> Result<CmdResult> {
    let mut result = CmdResult::default();

    // 1. Validate the name and the directory.
    if !NAME_PATTERN.is_match(name) {
        return Ok(result.with_message(CmdMessage::error(
            "Index names may only use lowercase letters, digits and dashes",
        )));
    }
    if registry.directory.contains_key(name) {
        return Ok(result.with_message(CmdMessage::error(format!(
            "An index named '{}' already exists",
            name
        ))));
    }
    for (existing, path) in &registry.directory {
        if cwd.starts_with(path) {
            return Ok(result.with_message(CmdMessage::error(format!(
                "The directory {} is already covered by index '{}'",
                cwd.display(),
                existing
            ))));
        }
        if path.starts_with(cwd) {
            return Ok(result.with_message(CmdMessage::error(format!(
                "Index '{}' at {} sits inside this directory",
                existing,
                path.display()
            ))));
        }
    }

    // 2. Load what is already indexed and scan the candidate for conflicts.
    registry.load_all(false)?;
    let conflicts = registry.find_conflicts(cwd)?;
    if !conflicts.is_empty() {
        for conflict in conflicts.values() {
            result.add_message(CmdMessage::warning(format!(
                "Conflict for id {}:",
                conflict.id
            )));
            for note in &conflict.existing {
                result.add_message(CmdMessage::info(format!(
                    "  already indexed: {}",
                    note.file_path.display()
                )));
            }
            for note in &conflict.conflicting {
                result.add_message(CmdMessage::info(format!(
                    "  in this directory: {}",
                    note.file_path.display()
                )));
            }
        }
        if !helpers::confirm("Register the directory anyway?", skip_confirm)? {
            return Ok(result.with_message(CmdMessage::info("Operation cancelled.")));
        }
    }

    // 3. Register, rescan and persist.
    registry.register(name, cwd);
    registry.load_all(false)?;
    registry.save(data_dir)?;

    let count = registry
        .indices
        .get(name)
        .map(|index| index.notes.len())
        .unwrap_or(0);
    Ok(result.with_message(CmdMessage::success(format!(
        "Registered '{}' with {} notes",
        name, count
    ))))
}
