//! Front-matter parsing and note serialization.
//!
//! A note file is an optional YAML front-matter block fenced by `---` or `...` lines,
//! followed by markdown body text. Parsing classifies the file into a [`ParseState`]
//! and never fails outright: unreadable metadata becomes a `Failed` envelope carrying
//! a diagnostic, and the original text is preserved so nothing is lost.
//!
//! Serialization is the inverse, with one guard: a `Failed` envelope refuses to
//! serialize, because rewriting a file whose metadata we couldn't understand would
//! destroy whatever is actually in it.

use crate::error::{MintError, Result};
use crate::model::{NoteInfo, ParseState};
use crate::store::NoteStore;
use chrono::{DateTime, FixedOffset, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_yaml::{Mapping, Value};
use std::path::Path;

/// Strftime format of the 14-digit note id, `YYYYMMDDHHMMSS`.
pub const ID_TIME_FORMAT: &str = "%Y%m%d%H%M%S";

/// A 14-digit run, as embedded in filenames like `20031117110124-title.md`.
pub static LONG_STAMP_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{14}").unwrap());

static LINK_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[\[(\d{14})\]\]").unwrap());

pub const BACKLINK_SECTION_START: &str = "<!-- backlinks -->";
pub const BACKLINK_SECTION_END: &str = "<!-- /backlinks -->";

const FENCE_TOKENS: [&str; 2] = ["---", "..."];

const RECOGNIZED_KEYS: [&str; 5] = ["created", "id", "title", "author", "backlink"];

/// One markdown note: metadata envelope, body text, and any front-matter keys the
/// envelope doesn't recognize (carried through rewrites untouched).
#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    pub info: NoteInfo,
    pub content: String,
    pub extra: Mapping,
}

impl Note {
    /// Serialize the note back into file text.
    ///
    /// Recognized keys are written from the envelope (null when unset), unrecognized
    /// keys verbatim. The backlink flag is only written when on; turning it off
    /// removes the key entirely.
    pub fn to_file_text(&self) -> Result<String> {
        if self.info.state == ParseState::Failed {
            return Err(MintError::FailedMetadata(self.info.file_path.clone()));
        }

        let mut mapping = Mapping::new();
        mapping.insert(
            Value::from("created"),
            match &self.info.created {
                Some(created) => Value::from(created.to_rfc3339()),
                None => Value::Null,
            },
        );
        mapping.insert(Value::from("id"), optional_string(&self.info.id));
        mapping.insert(Value::from("title"), optional_string(&self.info.title));
        mapping.insert(Value::from("author"), optional_string(&self.info.author));
        if self.info.has_backlink() {
            mapping.insert(Value::from("backlink"), Value::from(true));
        }
        for (key, value) in &self.extra {
            mapping.insert(key.clone(), value.clone());
        }

        let front = serde_yaml::to_string(&mapping)?;
        Ok(format!(
            "---\n{}---\n{}",
            front,
            end_with_two_blank_lines(&self.content)
        ))
    }

    /// Replace the generated backlink section of the body, or append one.
    pub fn set_backlink_section(&mut self, section: &str) {
        let base = strip_backlink_section(&self.content);
        self.content = format!(
            "{}\n\n{}\n{}\n{}\n",
            base.trim_end(),
            BACKLINK_SECTION_START,
            section.trim_end(),
            BACKLINK_SECTION_END
        );
    }
}

fn optional_string(value: &Option<String>) -> Value {
    match value {
        Some(text) => Value::from(text.as_str()),
        None => Value::Null,
    }
}

/// Load just the metadata envelope for a file.
pub fn load_info<S: NoteStore>(store: &S, zone: &FixedOffset, path: &Path) -> Result<NoteInfo> {
    Ok(load_note(store, zone, path)?.info)
}

/// Load a full note, content included.
pub fn load_note<S: NoteStore>(store: &S, zone: &FixedOffset, path: &Path) -> Result<Note> {
    let content = store.read_text(path)?;
    Ok(note_from_content(&content, zone, path))
}

/// Parse raw file text into a note. Infallible: parse problems are recorded in the
/// envelope's state and diagnostic rather than returned as errors.
pub fn note_from_content(content: &str, zone: &FixedOffset, path: &Path) -> Note {
    let (state, mapping, body) = extract_front_matter(content);
    let info = build_info(state, mapping.as_ref(), &body, zone, path);

    let mut extra = Mapping::new();
    if let Some(mapping) = &mapping {
        for (key, value) in mapping {
            let recognized = key
                .as_str()
                .map(|k| RECOGNIZED_KEYS.contains(&k))
                .unwrap_or(false);
            if !recognized {
                extra.insert(key.clone(), value.clone());
            }
        }
    }

    Note {
        info,
        content: body,
        extra,
    }
}

fn build_info(
    state: ParseState,
    mapping: Option<&Mapping>,
    body: &str,
    zone: &FixedOffset,
    path: &Path,
) -> NoteInfo {
    let mut info = NoteInfo::empty(path.to_path_buf());
    info.state = state;

    match state {
        ParseState::Failed => {
            info.info = Some("Failed to parse YAML from document".to_string());
        }
        ParseState::Missing => {
            info.info = Some("File missing metadata".to_string());
        }
        _ => {
            if let Some(mapping) = mapping {
                info.id = string_value(mapping.get("id"));
                info.title = string_value(mapping.get("title"));
                info.author = string_value(mapping.get("author"));
                info.backlink = mapping.get("backlink").and_then(Value::as_bool);
                match mapping.get("created") {
                    None | Some(Value::Null) => {}
                    Some(value) => match parse_created_value(value, zone) {
                        Some(created) => info.created = Some(created),
                        None => {
                            info.info = Some("Failed to parse creation time stamp".to_string());
                            info.state = ParseState::Failed;
                        }
                    },
                }
            }
        }
    }

    info.links_to = extract_links(&strip_backlink_section(body));
    info
}

/// Ids are conventionally unquoted in front matter, so the YAML parser hands them
/// back as integers; normalize scalars to strings either way.
fn string_value(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(text)) => Some(text.clone()),
        Some(Value::Number(number)) => Some(number.to_string()),
        _ => None,
    }
}

fn parse_created_value(value: &Value, zone: &FixedOffset) -> Option<DateTime<FixedOffset>> {
    let text = value.as_str()?;
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(zone));
    }
    // Timestamps written without an offset are taken to be in the local zone.
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return naive.and_local_timezone(*zone).single();
        }
    }
    None
}

/// Split raw file text into (state, parsed front matter, body).
///
/// The file must start with a fence line (`---` or `...`), contain a block of valid
/// YAML, and close with another fence line. A missing opening fence is `Missing`; an
/// unclosed or unparsable block is `Failed`. For both, the body is the original text.
pub fn extract_front_matter(content: &str) -> (ParseState, Option<Mapping>, String) {
    let lines: Vec<&str> = content.trim().split('\n').collect();
    match lines.first() {
        Some(first) if FENCE_TOKENS.contains(&first.trim()) => {}
        _ => return (ParseState::Missing, None, content.to_string()),
    }

    let mut front_lines = Vec::new();
    let mut body_lines = Vec::new();
    let mut complete = false;
    for line in &lines[1..] {
        if !complete && FENCE_TOKENS.contains(&line.trim()) {
            complete = true;
            continue;
        }
        if complete {
            body_lines.push(*line);
        } else {
            front_lines.push(*line);
        }
    }

    if !complete {
        return (ParseState::Failed, None, content.to_string());
    }

    let body = body_lines.join("\n");
    match serde_yaml::from_str::<Value>(&front_lines.join("\n")) {
        Ok(Value::Mapping(mapping)) => (ParseState::Unknown, Some(mapping), body),
        Ok(Value::Null) => (ParseState::Unknown, Some(Mapping::new()), body),
        _ => (ParseState::Failed, None, content.to_string()),
    }
}

/// Ids referenced from the body as `[[YYYYMMDDHHMMSS]]`, first-seen order, de-duplicated.
pub fn extract_links(body: &str) -> Vec<String> {
    let mut links = Vec::new();
    for captures in LINK_PATTERN.captures_iter(body) {
        let id = captures[1].to_string();
        if !links.contains(&id) {
            links.push(id);
        }
    }
    links
}

/// Remove every generated backlink section from the body.
pub fn strip_backlink_section(content: &str) -> String {
    if !content.contains(BACKLINK_SECTION_START) {
        return content.to_string();
    }

    let mut kept = String::new();
    let mut rest = content;
    while let Some(start) = rest.find(BACKLINK_SECTION_START) {
        kept.push_str(&rest[..start]);
        match rest[start..].find(BACKLINK_SECTION_END) {
            Some(offset) => rest = &rest[start + offset + BACKLINK_SECTION_END.len()..],
            None => rest = "",
        }
    }
    kept.push_str(rest);
    format!("{}\n", kept.trim_end())
}

fn end_with_two_blank_lines(text: &str) -> String {
    if text.ends_with("\n\n") {
        text.to_string()
    } else if text.ends_with('\n') {
        format!("{}\n", text)
    } else {
        format!("{}\n\n", text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone};

    const MD_MISSING_METADATA: &str = "
# This is a markdown note with no metadata

Here is some data in it
";

    const MD_MISSING_END_TOKEN: &str = "
---
title: this is my title
author: John Doe
created: '2021-02-13T20:45:39-05:00'
id: 20210213204539
--
# A note with a missing front-matter end token

Here's the content of this text
";

    const MD_CORRUPTED_YAML: &str = "
---
title: Discursive Quantum Semiotics: A treatise on interior positionality
author: Fan C. Professor, Ph.D
created: '2021-02-13T15:55:57-05:00'
id: 20210213155557
---
# A note with malformed yaml front-matter

The title will make the YAML parser fail.
";

    const MD_BROKEN_TIMESTAMP: &str = "
---
title: \"My Dissertation: a lesson on enduring tasks that never end\"
author: Jane Doe
created: '2020-02-30T16:02:22-05:00'
id: 20210213160222
---
# A note with an invalid timestamp

February 30th has never once happened.
";

    const MD_SAMPLE_NOTE: &str = "
...
title: Note Sample 0
author: Robert Robertson
created: '2021-02-13T16:05:25-05:00'
id: 20210213160525
...
# Sample Note 0

This is some text in the sample note 0
";

    const MD_EXTRA_METADATA: &str = "
---
title: Note With Extras
author: Robert Robertson
created: '2021-02-13T16:05:25-05:00'
id: 20210213172911
source: IPhone 19
tags:
  - synergy
  - upcycle
---
# Note With Extras

This one carries keys we don't recognize.
";

    const MD_WITH_LINKS: &str = "
---
title: Note With Links
author: Robert Robertson
created: '2021-02-13T16:06:41-05:00'
id: 20210213160641
backlink: true
---
# Note With Links

See [[20210213160525]] and [[20210213172911]], then [[20210213160525]] again.
";

    const MD_WITH_SECTION: &str = "\
---
title: Note With Generated Section
author: Robert Robertson
created: '2021-02-13T16:07:02-05:00'
id: 20210213160702
backlink: true
---
# Note With Generated Section

This is some text in the sample note 1.

<!-- backlinks -->
## Referenced By
* [[20210213160641]] Note With Links
<!-- /backlinks -->
";

    fn zone() -> FixedOffset {
        FixedOffset::west_opt(5 * 3600).unwrap()
    }

    fn parse(content: &str) -> Note {
        note_from_content(content, &zone(), Path::new("/notes/sample.md"))
    }

    #[test]
    fn test_missing_metadata() {
        let note = parse(MD_MISSING_METADATA);
        assert_eq!(note.info.state, ParseState::Missing);
        assert_eq!(note.info.info.as_deref(), Some("File missing metadata"));
        assert_eq!(note.content, MD_MISSING_METADATA);
    }

    #[test]
    fn test_no_end_token() {
        let note = parse(MD_MISSING_END_TOKEN);
        assert_eq!(note.info.state, ParseState::Failed);
        assert_eq!(
            note.info.info.as_deref(),
            Some("Failed to parse YAML from document")
        );
        assert_eq!(note.content, MD_MISSING_END_TOKEN);
    }

    #[test]
    fn test_corrupted_yaml() {
        let note = parse(MD_CORRUPTED_YAML);
        assert_eq!(note.info.state, ParseState::Failed);
        assert!(note.info.id.is_none());
    }

    #[test]
    fn test_broken_timestamp() {
        let note = parse(MD_BROKEN_TIMESTAMP);
        assert_eq!(note.info.state, ParseState::Failed);
        assert_eq!(
            note.info.info.as_deref(),
            Some("Failed to parse creation time stamp")
        );
        assert!(note.info.created.is_none());
    }

    #[test]
    fn test_metadata_ok() {
        let note = parse(MD_SAMPLE_NOTE);
        assert_eq!(note.info.state, ParseState::Unknown);
        assert_eq!(note.info.id.as_deref(), Some("20210213160525"));
        assert_eq!(note.info.title.as_deref(), Some("Note Sample 0"));
        assert_eq!(note.info.author.as_deref(), Some("Robert Robertson"));
        let expected = zone().with_ymd_and_hms(2021, 2, 13, 16, 5, 25).unwrap();
        assert_eq!(note.info.created, Some(expected));
    }

    #[test]
    fn test_unquoted_id_normalizes_to_string() {
        // The sample id is unquoted, so YAML sees an integer first.
        let note = parse(MD_SAMPLE_NOTE);
        assert_eq!(note.info.id.as_deref(), Some("20210213160525"));
    }

    #[test]
    fn test_round_trip_reproduces_envelope_and_content() {
        let note = parse(MD_SAMPLE_NOTE);
        let text = note.to_file_text().unwrap();
        let reloaded = parse(&text);

        assert_eq!(reloaded.info, note.info);
        assert_eq!(reloaded.content.trim_end(), note.content.trim_end());
    }

    #[test]
    fn test_round_trip_preserves_extra_keys() {
        let mut note = parse(MD_EXTRA_METADATA);
        note.info.author = Some("New Author".to_string());
        let text = note.to_file_text().unwrap();

        let (_, mapping, _) = extract_front_matter(&text);
        let mapping = mapping.unwrap();
        assert_eq!(mapping.get("author").unwrap().as_str(), Some("New Author"));
        assert_eq!(mapping.get("source").unwrap().as_str(), Some("IPhone 19"));
        let tags: Vec<&str> = mapping
            .get("tags")
            .unwrap()
            .as_sequence()
            .unwrap()
            .iter()
            .filter_map(Value::as_str)
            .collect();
        assert_eq!(tags, vec!["synergy", "upcycle"]);
    }

    #[test]
    fn test_serialize_missing_metadata_writes_nulls() {
        let mut note = parse(MD_MISSING_METADATA);
        note.info.author = Some("New Author".to_string());
        let text = note.to_file_text().unwrap();

        let (_, mapping, _) = extract_front_matter(&text);
        let mapping = mapping.unwrap();
        assert_eq!(mapping.get("author").unwrap().as_str(), Some("New Author"));
        assert!(mapping.get("created").unwrap().is_null());
        assert!(mapping.get("id").unwrap().is_null());
        assert!(mapping.get("title").unwrap().is_null());
    }

    #[test]
    fn test_serialize_failed_metadata_is_an_error() {
        let note = parse(MD_CORRUPTED_YAML);
        match note.to_file_text() {
            Err(MintError::FailedMetadata(path)) => {
                assert_eq!(path, Path::new("/notes/sample.md"))
            }
            other => panic!("expected FailedMetadata, got {:?}", other),
        }
    }

    #[test]
    fn test_serialize_updates_fields() {
        let mut note = parse(MD_SAMPLE_NOTE);
        note.info.id = Some("new-id".to_string());
        note.info.title = Some("New Title".to_string());
        let (_, mapping, _) = extract_front_matter(&note.to_file_text().unwrap());
        let mapping = mapping.unwrap();

        assert_eq!(mapping.get("id").unwrap().as_str(), Some("new-id"));
        assert_eq!(mapping.get("title").unwrap().as_str(), Some("New Title"));
    }

    #[test]
    fn test_serialize_updated_created_round_trips() {
        let other_zone = FixedOffset::west_opt(8 * 3600).unwrap();
        let stamp = other_zone.with_ymd_and_hms(2020, 2, 2, 22, 0, 20).unwrap();

        let mut note = parse(MD_SAMPLE_NOTE);
        note.info.created = Some(stamp);
        let reloaded = parse(&note.to_file_text().unwrap());

        assert_eq!(reloaded.info.created, Some(stamp));
    }

    #[test]
    fn test_backlink_flag_written_when_on() {
        let mut note = parse(MD_SAMPLE_NOTE);
        note.info.backlink = Some(true);
        let (_, mapping, _) = extract_front_matter(&note.to_file_text().unwrap());
        assert_eq!(
            mapping.unwrap().get("backlink").and_then(Value::as_bool),
            Some(true)
        );
    }

    #[test]
    fn test_backlink_flag_removed_when_off() {
        let mut note = parse(MD_WITH_LINKS);
        assert!(note.info.has_backlink());
        note.info.backlink = Some(false);
        let text = note.to_file_text().unwrap();

        assert!(!text.contains("backlink"));
        assert!(!parse(&text).info.has_backlink());
    }

    #[test]
    fn test_links_extracted_and_deduplicated() {
        let note = parse(MD_WITH_LINKS);
        assert_eq!(
            note.info.links_to,
            vec!["20210213160525".to_string(), "20210213172911".to_string()]
        );
    }

    #[test]
    fn test_links_ignore_generated_section() {
        let note = parse(MD_WITH_SECTION);
        assert!(note.info.links_to.is_empty());
    }

    #[test]
    fn test_strip_backlink_section() {
        let note = parse(MD_WITH_SECTION);
        let expected = "# Note With Generated Section

This is some text in the sample note 1.
";
        assert_eq!(strip_backlink_section(&note.content), expected);
    }

    #[test]
    fn test_set_backlink_section_replaces_existing() {
        let mut note = parse(MD_WITH_SECTION);
        assert!(note.content.contains("* [[20210213160641]] Note With Links"));

        note.set_backlink_section("THIS IS THE REPLACEMENT");
        assert!(note.content.contains("THIS IS THE REPLACEMENT"));
        assert!(!note.content.contains("* [[20210213160641]] Note With Links"));
        assert_eq!(note.content.matches(BACKLINK_SECTION_START).count(), 1);
    }

    #[test]
    fn test_end_with_two_blank_lines_0() {
        let text = "this is some text";
        assert_eq!(end_with_two_blank_lines(text), format!("{}\n\n", text));
    }

    #[test]
    fn test_end_with_two_blank_lines_1() {
        let text = "this is some text\n";
        assert_eq!(end_with_two_blank_lines(text), format!("{}\n", text));
    }

    #[test]
    fn test_end_with_two_blank_lines_2() {
        let text = "this is some text\n\n";
        assert_eq!(end_with_two_blank_lines(text), text);
    }

    #[test]
    fn test_end_with_two_blank_lines_3() {
        let text = "this is some text\n\n\n";
        assert_eq!(end_with_two_blank_lines(text), text);
    }
}
