use crate::commands::{helpers, CmdMessage, CmdResult};
use crate::error::Result;
use crate::note;
use crate::registry::Registry;
use crate::store::NoteStore;
use std::path::{Path, PathBuf};

/// Flip the backlink flag on the working set. Notes already in the
/// requested state are left untouched.
pub fn set<S: NoteStore>(
    registry: &mut Registry<S>,
    data_dir: &Path,
    enabled: bool,
    files: &[PathBuf],
    cwd: &Path,
    skip_confirm: bool,
) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    registry.load_all(false)?;

    let (working, messages) = helpers::working_notes(registry, cwd, files);
    for message in messages {
        result.add_message(message);
    }

    let mut transaction = registry.create_empty_transaction();
    for path in &working {
        let mut note = transaction.get_note_state(path)?;
        if note.info.backlink.unwrap_or(false) == enabled {
            continue;
        }
        note.info.backlink = Some(enabled);
        result.add_message(CmdMessage::info(format!(
            "{}: backlink set to {}",
            path.display(),
            if enabled { "on" } else { "off" }
        )));
        transaction.add_change(path, note)?;
    }

    if transaction.is_empty() {
        result.add_message(CmdMessage::info(format!(
            "Checked {} notes and none needed to be changed",
            working.len()
        )));
        return Ok(result);
    }

    let prompt = format!("Apply these {} changes?", transaction.len());
    if !helpers::confirm(&prompt, skip_confirm)? {
        return Ok(result.with_message(CmdMessage::info("Operation cancelled.")));
    }
    let applied = registry.apply_transaction(transaction)?;
    registry.load_all(false)?;
    registry.save(data_dir)?;

    result.add_message(CmdMessage::success(format!("Applied {} changes", applied)));
    Ok(result)
}

/// Regenerate the backlinks section of every unconflicted, flag-enabled note,
/// skipping notes whose section is already current. A note whose referencing
/// sources have all been edited away gets its stale section removed.
pub fn generate<S: NoteStore>(
    registry: &mut Registry<S>,
    data_dir: &Path,
    skip_confirm: bool,
) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    registry.load_all(false)?;

    let links = registry.backlinks();
    let flagged: Vec<(String, PathBuf)> = registry
        .by_id
        .iter()
        .filter(|(_, info)| info.backlink == Some(true))
        .map(|(id, info)| (id.clone(), info.file_path.clone()))
        .collect();

    let mut transaction = registry.create_empty_transaction();
    for (target_id, path) in &flagged {
        let note = transaction.get_note_state(path)?;
        let mut updated = note.clone();
        match links.get(target_id) {
            Some(sources) => updated.set_backlink_section(&render_section(registry, sources)),
            None => updated.content = note::strip_backlink_section(&note.content),
        }
        if updated.content.trim_end() == note.content.trim_end() {
            continue;
        }

        result.add_message(CmdMessage::info(format!(
            "Updating backlinks in {}",
            path.display()
        )));
        transaction.add_change(path, updated)?;
    }

    if transaction.is_empty() {
        result.add_message(CmdMessage::info(format!(
            "Checked {} notes and none needed to be changed",
            flagged.len()
        )));
        return Ok(result);
    }

    let prompt = format!("Apply these {} changes?", transaction.len());
    if !helpers::confirm(&prompt, skip_confirm)? {
        return Ok(result.with_message(CmdMessage::info("Operation cancelled.")));
    }
    let applied = registry.apply_transaction(transaction)?;
    registry.load_all(false)?;
    registry.save(data_dir)?;

    result.add_message(CmdMessage::success(format!("Applied {} changes", applied)));
    Ok(result)
}

fn render_section<S: NoteStore>(registry: &Registry<S>, sources: &[String]) -> String {
    let mut lines = Vec::new();
    for source in sources {
        let title = registry
            .by_id
            .get(source)
            .and_then(|info| info.title.clone())
            .unwrap_or_else(|| String::from("(untitled)"));
        lines.push(format!("* [[{}]] {}", source, title));
    }
    format!("## Referenced By\n\n{}", lines.join("\n"))
}
