use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::fix::attr_checks;
use crate::registry::Registry;
use crate::store::NoteStore;
use std::path::Path;

/// Corpus overview: per-index totals, parse problems, id conflicts and the
/// per-attribute report of what the fixers could repair.
pub fn run<S: NoteStore>(
    registry: &mut Registry<S>,
    data_dir: &Path,
    count: usize,
) -> Result<CmdResult> {
    let mut result = CmdResult::default();

    if registry.directory.is_empty() {
        result.add_message(CmdMessage::info(
            "No indices registered. Run 'nm index create <name>' inside a notes directory.",
        ));
        return Ok(result);
    }

    registry.load_all(false)?;
    registry.save(data_dir)?;

    let total: usize = registry.indices.values().map(|index| index.notes.len()).sum();
    result.add_message(CmdMessage::info(format!(
        "{} notes across {} indices",
        total,
        registry.indices.len()
    )));
    for index in registry.indices.values() {
        result.add_message(CmdMessage::info(format!(
            "  {}: {} notes at {}",
            index.name,
            index.notes.len(),
            index.path.display()
        )));
    }

    let troubled = registry
        .by_path
        .values()
        .filter(|info| info.info.is_some())
        .count();
    if troubled > 0 {
        result.add_message(CmdMessage::warning(format!(
            "{} notes have front matter that did not parse cleanly",
            troubled
        )));
    }
    let exceptions: usize = registry
        .indices
        .values()
        .map(|index| index.exceptions.len())
        .sum();
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

    for message in attribute_report(registry, count) {
        result.add_message(message);
    }
    Ok(result)
}

/// The "what could be fixed" report, grouped by attribute check.
pub fn attribute_report<S: NoteStore>(registry: &Registry<S>, count: usize) -> Vec<CmdMessage> {
    let mut messages = Vec::new();

    for check in attr_checks() {
        let matching: Vec<_> = registry
            .by_path
            .values()
            .filter(|info| (check.check)(info))
            .collect();
        if matching.is_empty() {
            continue;
        }
        messages.push(CmdMessage::warning(format!(
            "Found {} notes that are {}",
            matching.len(),
            check.description
        )));
        for info in matching.iter().take(count) {
            messages.push(CmdMessage::info(format!(
                " -> {}",
                info.file_path.display()
            )));
        }
        if matching.len() > count {
            messages.push(CmdMessage::info(format!(
                " -> ... and {} more",
                matching.len() - count
            )));
        }
        messages.push(CmdMessage::info(format!(" ({})", check.hint)));
    }

    if messages.is_empty() {
        messages.push(CmdMessage::success("All notes have their attributes in place."));
    }
    messages
}
