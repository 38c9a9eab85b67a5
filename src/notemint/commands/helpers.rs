use crate::commands::CmdMessage;
use crate::error::{MintError, Result};
use crate::registry::Registry;
use crate::store::NoteStore;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Prompt for an explicit `Y` unless confirmation is skipped.
pub fn confirm(prompt: &str, skip_confirm: bool) -> Result<bool> {
    if skip_confirm {
        return Ok(true);
    }
    print!("[Y] {}: ", prompt);
    io::stdout().flush().map_err(MintError::Io)?;

    let mut input = String::new();
    io::stdin().read_line(&mut input).map_err(MintError::Io)?;
    Ok(input.trim() == "Y")
}

/// The notes a command operates on: the explicitly named files when given
/// (unknown ones are warned about and skipped), otherwise every indexed note
/// under the working directory.
pub fn working_notes<S: NoteStore>(
    registry: &Registry<S>,
    cwd: &Path,
    files: &[PathBuf],
) -> (Vec<PathBuf>, Vec<CmdMessage>) {
    let mut messages = Vec::new();

    if files.is_empty() {
        return match registry.index_containing(cwd) {
            Some(index) => {
                let notes = index
                    .notes_in_path(cwd)
                    .iter()
                    .map(|note| note.file_path.clone())
                    .collect();
                (notes, messages)
            }
            None => {
                messages.push(CmdMessage::error(format!(
                    "The working directory is not part of any registered index: {}",
                    cwd.display()
                )));
                (Vec::new(), messages)
            }
        };
    }

    let mut working = Vec::new();
    for file in files {
        let absolute = absolutize(cwd, file);
        if registry.by_path.contains_key(&absolute) {
            working.push(absolute);
        } else {
            messages.push(CmdMessage::warning(format!(
                "Not an indexed note, skipping: {}",
                absolute.display()
            )));
        }
    }
    (working, messages)
}

pub fn absolutize(cwd: &Path, file: &Path) -> PathBuf {
    if file.is_absolute() {
        file.to_path_buf()
    } else {
        cwd.join(file)
    }
}
