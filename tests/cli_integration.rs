use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;

const NOTE_A: &str = "\
---
created: '2024-01-02T08:01:35-05:00'
id: '20240102080135'
title: First Note
author: Alice Allison
---
# First Note

Some body text.
";

const NOTE_B: &str = "\
---
created: '2021-06-15T09:30:00-05:00'
id: '20210615093000'
title: Second Note
author: Bob Bobertson
---
# Second Note

More body text.
";

const NOTE_WITHOUT_STAMP: &str = "\
---
title: Stampless
author: Alice Allison
---
# Stampless

No creation time in the front matter.
";

fn nm(home: &Path, cwd: &Path) -> Command {
    let mut cmd = Command::cargo_bin("nm").unwrap();
    cmd.env("NOTEMINT_HOME", home).current_dir(cwd);
    cmd
}

fn write_note(dir: &Path, name: &str, content: &str) {
    fs::create_dir_all(dir).unwrap();
    fs::write(dir.join(name), content).unwrap();
}

#[test]
fn test_index_create_then_overview() {
    let temp = tempfile::tempdir().unwrap();
    let home = temp.path().join("home");
    let notes = temp.path().join("notes");
    write_note(&notes, "note-a.md", NOTE_A);
    write_note(&notes, "note-b.md", NOTE_B);

    nm(&home, &notes)
        .args(["--yes", "index", "create", "alpha"])
        .assert()
        .success()
        .stdout(predicates::str::contains("Registered 'alpha' with 2 notes"));

    nm(&home, &notes)
        .arg("index")
        .assert()
        .success()
        .stdout(predicates::str::contains("alpha"))
        .stdout(predicates::str::contains("2 notes"));
}

#[test]
fn test_index_create_rejects_nested_directory() {
    let temp = tempfile::tempdir().unwrap();
    let home = temp.path().join("home");
    let notes = temp.path().join("notes");
    let inner = notes.join("inner");
    write_note(&notes, "note-a.md", NOTE_A);
    write_note(&inner, "note-b.md", NOTE_B);

    nm(&home, &notes)
        .args(["--yes", "index", "create", "alpha"])
        .assert()
        .success();

    nm(&home, &inner)
        .args(["--yes", "index", "create", "beta"])
        .assert()
        .success()
        .stdout(predicates::str::contains("already covered by index 'alpha'"));
}

#[test]
fn test_summary_reports_missing_attributes() {
    let temp = tempfile::tempdir().unwrap();
    let home = temp.path().join("home");
    let notes = temp.path().join("notes");
    write_note(&notes, "note-a.md", NOTE_A);
    write_note(&notes, "stampless.md", NOTE_WITHOUT_STAMP);

    nm(&home, &notes)
        .args(["--yes", "index", "create", "alpha"])
        .assert()
        .success();

    nm(&home, &notes)
        .arg("summary")
        .assert()
        .success()
        .stdout(predicates::str::contains("2 notes across 1 indices"))
        .stdout(predicates::str::contains(
            "Found 1 notes that are missing a creation time",
        ))
        .stdout(predicates::str::contains(
            "Found 1 notes that are missing an id",
        ));
}

#[test]
fn test_fix_created_then_id_repairs_a_note() {
    let temp = tempfile::tempdir().unwrap();
    let home = temp.path().join("home");
    let notes = temp.path().join("notes");
    // The filename stamp gives the created fixer a deterministic answer.
    write_note(&notes, "20031117110124-meeting.md", NOTE_WITHOUT_STAMP);

    nm(&home, &notes)
        .args(["--yes", "index", "create", "alpha"])
        .assert()
        .success();

    nm(&home, &notes)
        .args(["--yes", "fix", "created"])
        .assert()
        .success()
        .stdout(predicates::str::contains("found timestamp in file name"))
        .stdout(predicates::str::contains("Applied 1 changes"));

    nm(&home, &notes)
        .args(["--yes", "fix", "id"])
        .assert()
        .success()
        .stdout(predicates::str::contains("id from creation timestamp"))
        .stdout(predicates::str::contains("Applied 1 changes"));

    // Title, author and the filename stamp were already fine, so the
    // report comes back clean.
    nm(&home, &notes)
        .arg("fix")
        .assert()
        .success()
        .stdout(predicates::str::contains(
            "All notes have their attributes in place.",
        ));

    let text = fs::read_to_string(notes.join("20031117110124-meeting.md")).unwrap();
    assert!(text.contains("id: '20031117110124'"));
}

#[test]
fn test_backlink_gen_writes_referenced_by_section() {
    let temp = tempfile::tempdir().unwrap();
    let home = temp.path().join("home");
    let notes = temp.path().join("notes");
    write_note(
        &notes,
        "source.md",
        "\
---
created: '2024-01-02T08:01:35-05:00'
id: '20240102080135'
title: Source Note
author: Alice Allison
---
# Source Note

Builds on [[20210615093000]].
",
    );
    write_note(
        &notes,
        "target.md",
        "\
---
created: '2021-06-15T09:30:00-05:00'
id: '20210615093000'
title: Target Note
author: Bob Bobertson
backlink: true
---
# Target Note

Referenced from elsewhere.
",
    );

    nm(&home, &notes)
        .args(["--yes", "index", "create", "alpha"])
        .assert()
        .success();

    nm(&home, &notes)
        .args(["--yes", "backlink", "gen"])
        .assert()
        .success()
        .stdout(predicates::str::contains("Applied 1 changes"));

    let text = fs::read_to_string(notes.join("target.md")).unwrap();
    assert!(text.contains("<!-- backlinks -->"));
    assert!(text.contains("## Referenced By"));
    assert!(text.contains("* [[20240102080135]] Source Note"));

    // A second run finds everything current.
    nm(&home, &notes)
        .args(["--yes", "backlink", "gen"])
        .assert()
        .success()
        .stdout(predicates::str::contains(
            "Checked 1 notes and none needed to be changed",
        ));
}

#[test]
fn test_index_archive_produces_tarball() {
    let temp = tempfile::tempdir().unwrap();
    let home = temp.path().join("home");
    let notes = temp.path().join("notes");
    write_note(&notes, "note-a.md", NOTE_A);

    nm(&home, &notes)
        .args(["--yes", "index", "create", "alpha"])
        .assert()
        .success();

    nm(&home, &notes)
        .args(["--yes", "index", "archive"])
        .assert()
        .success()
        .stdout(predicates::str::contains("Archived 1 notes from 'alpha'"));

    let archive = fs::read_dir(&notes)
        .unwrap()
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .find(|path| {
            path.file_name()
                .map(|name| name.to_string_lossy().starts_with("alpha-"))
                .unwrap_or(false)
        })
        .expect("archive file should exist");
    let bytes = fs::read(archive).unwrap();
    assert_eq!(&bytes[..2], &[0x1f, 0x8b]);
}

#[test]
fn test_delete_prompt_can_be_declined() {
    let temp = tempfile::tempdir().unwrap();
    let home = temp.path().join("home");
    let notes = temp.path().join("notes");
    write_note(&notes, "note-a.md", NOTE_A);

    nm(&home, &notes)
        .args(["--yes", "index", "create", "alpha"])
        .assert()
        .success();

    nm(&home, &notes)
        .args(["index", "delete", "alpha"])
        .write_stdin("n\n")
        .assert()
        .success()
        .stdout(predicates::str::contains("Operation cancelled."));

    // Still registered.
    nm(&home, &notes)
        .arg("index")
        .assert()
        .success()
        .stdout(predicates::str::contains("alpha"));
}

#[test]
fn test_config_author_round_trip() {
    let temp = tempfile::tempdir().unwrap();
    let home = temp.path().join("home");
    fs::create_dir_all(temp.path().join("anywhere")).unwrap();

    nm(&home, &temp.path().join("anywhere"))
        .args(["config", "--author", "Alice Allison"])
        .assert()
        .success()
        .stdout(predicates::str::contains("Author set to 'Alice Allison'"));

    nm(&home, &temp.path().join("anywhere"))
        .arg("config")
        .assert()
        .success()
        .stdout(predicates::str::contains("author: Alice Allison"));
}

#[test]
fn test_bare_invocation_prints_summary() {
    let temp = tempfile::tempdir().unwrap();
    let home = temp.path().join("home");
    let anywhere = temp.path().join("anywhere");
    fs::create_dir_all(&anywhere).unwrap();

    nm(&home, &anywhere)
        .assert()
        .success()
        .stdout(predicates::str::contains("No indices registered"));
}
