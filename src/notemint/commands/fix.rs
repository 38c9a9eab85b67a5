use crate::commands::{helpers, summary, CmdMessage, CmdResult};
use crate::error::Result;
use crate::fix::Fixer;
use crate::registry::Registry;
use crate::store::NoteStore;
use crate::transaction::TryChangeResult;
use std::path::{Path, PathBuf};

const NOTE_CAP: usize = 5;

/// Run one or more fixers over the working set, staging everything into a
/// single transaction that is committed once confirmed.
///
/// With more than one fixer the run is capped at five notes, and each note
/// sees the fixers in order, so an id derived from a freshly repaired
/// creation time lands in the same pass.
pub fn run<S: NoteStore>(
    registry: &mut Registry<S>,
    data_dir: &Path,
    fixers: &[Fixer],
    files: &[PathBuf],
    cwd: &Path,
    count: Option<usize>,
    skip_confirm: bool,
) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    registry.load_all(false)?;

    // 1. Resolve the working set.
    let (mut working, messages) = helpers::working_notes(registry, cwd, files);
    for message in messages {
        result.add_message(message);
    }
    if fixers.len() > 1 && working.len() > NOTE_CAP {
        result.add_message(CmdMessage::info(
            "This command is limited to processing five notes at a time.",
        ));
        working.truncate(NOTE_CAP);
    }
    if let Some(n) = count {
        working.truncate(n);
    }
    if working.is_empty() {
        if result.messages.is_empty() {
            result.add_message(CmdMessage::info("No notes to fix."));
        }
        return Ok(result);
    }

    // 2. Stage proposals, reading each note through the transaction so
    //    earlier fixes are visible to later fixers.
    let mut transaction = registry.create_empty_transaction();
    let mut resolve_hint = false;
    for path in &working {
        let mut announced = false;
        for fixer in fixers {
            let info = transaction.get_note_info_state(path)?;
            if !fixer.check(&info) {
                continue;
            }
            if !announced {
                result.add_message(CmdMessage::info(format!("{}:", path.display())));
                announced = true;
            }
            match fixer.try_change(path, &transaction)? {
                TryChangeResult::Ok { note, details } => {
                    for detail in &details {
                        result.add_message(CmdMessage::info(detail));
                    }
                    if transaction.verify(path, &note)? {
                        transaction.add_change(path, note)?;
                    } else {
                        result.add_message(CmdMessage::warning(
                            " * the change conflicts with another staged change",
                        ));
                    }
                }
                TryChangeResult::Nothing { details } => {
                    for detail in &details {
                        result.add_message(CmdMessage::info(detail));
                    }
                }
                TryChangeResult::Failed { details } => {
                    for detail in &details {
                        result.add_message(CmdMessage::warning(detail));
                    }
                    if matches!(fixer, Fixer::Id(_)) && info.created.is_some() {
                        resolve_hint = true;
                    }
                }
            }
        }
    }
    if resolve_hint {
        result.add_message(CmdMessage::info(
            "Consider running with the --resolve option.",
        ));
    }

    if transaction.is_empty() {
        result.add_message(CmdMessage::info("There were no potential fixes found"));
        return Ok(result);
    }

    // 3. Confirm and commit.
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

/// A bare `nm fix`: report what the fixers could repair, with up to
/// `count` sample paths per attribute.
pub fn report<S: NoteStore>(
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

    for message in summary::attribute_report(registry, count) {
        result.add_message(message);
    }
    Ok(result)
}
