use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::note::ID_TIME_FORMAT;
use crate::registry::Registry;
use crate::store::NoteStore;
use chrono::Utc;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Pack indexed notes into per-index `<name>-<stamp>.tar.gz` files.
pub fn run<S: NoteStore>(
    registry: &mut Registry<S>,
    data_dir: &Path,
    names: &[String],
    output_dir: &Path,
) -> Result<CmdResult> {
    let mut result = CmdResult::default();

    if registry.directory.is_empty() {
        result.add_message(CmdMessage::info("No indices registered, nothing to archive."));
        return Ok(result);
    }

    // 1. Resolve targets, defaulting to every registered index.
    let targets: Vec<String> = if names.is_empty() {
        registry.directory.keys().cloned().collect()
    } else {
        let mut known = Vec::new();
        for name in names {
            if registry.directory.contains_key(name) {
                known.push(name.clone());
            } else {
                result.add_message(CmdMessage::error(format!(
                    "No index named '{}' is registered",
                    name
                )));
            }
        }
        known
    };

    // 2. Refresh the scan so the archives match what is on disk.
    registry.load_all(false)?;
    registry.save(data_dir)?;

    let stamp = Utc::now().with_timezone(registry.zone()).format(ID_TIME_FORMAT);
    let mut archives = Vec::new();
    for name in &targets {
        let index = match registry.indices.get(name) {
            Some(index) => index,
            None => continue,
        };
        if index.notes.is_empty() {
            result.add_message(CmdMessage::info(format!(
                "Index '{}' has no notes to archive",
                name
            )));
            continue;
        }

        // 3. Read each note back through the store and tar it up.
        let mut entries = Vec::new();
        for path in index.notes.keys() {
            let relative = path.strip_prefix(&index.path).unwrap_or(path);
            let entry_name = PathBuf::from(name).join(relative);
            entries.push((entry_name, registry.store().read_text(path)?));
        }

        let filename = format!("{}-{}.tar.gz", name, stamp);
        let target = output_dir.join(filename);
        let file = File::create(&target)?;
        write_archive(file, &entries)?;

        result.add_message(CmdMessage::success(format!(
            "Archived {} notes from '{}' to {}",
            entries.len(),
            name,
            target.display()
        )));
        archives.push(target);
    }

    result.archives = archives;
    Ok(result)
}

fn write_archive<W: Write>(writer: W, entries: &[(PathBuf, String)]) -> Result<()> {
    let enc = GzEncoder::new(writer, Compression::default());
    let mut tar = tar::Builder::new(enc);

    for (entry_name, content) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        tar.append_data(&mut header, entry_name, content.as_bytes())?;
    }

    tar.finish()?;
    Ok(())
}
