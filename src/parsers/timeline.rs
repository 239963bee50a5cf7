use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::warn;

use crate::models::{Timeline, TimelineDay};
use crate::utils::{MAX_TIMELINE_SIZE_BYTES, validate_file_size};

/// Parse a timeline document (JSON array of day groups)
///
/// Days that share a date label are merged into the first occurrence, keeping
/// message order, so dates stay unique keys.
pub fn parse_timeline_str(json: &str) -> Result<Timeline> {
    let days: Vec<TimelineDay> =
        serde_json::from_str(json).context("Failed to parse timeline JSON")?;
    Ok(merge_duplicate_dates(days))
}

/// Parse a timeline document from disk
pub fn parse_timeline_file(path: &Path) -> Result<Timeline> {
    let mut file = File::open(path)
        .with_context(|| format!("Failed to open timeline file: {}", path.display()))?;
    validate_file_size(&file, path, MAX_TIMELINE_SIZE_BYTES)?;

    let mut content = String::new();
    file.read_to_string(&mut content)
        .with_context(|| format!("Failed to read timeline file: {}", path.display()))?;

    parse_timeline_str(&content).with_context(|| format!("Invalid timeline: {}", path.display()))
}

/// Write a timeline document atomically (temp file + rename), pretty-printed
pub fn write_timeline_file(path: &Path, timeline: &[TimelineDay]) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let json = serde_json::to_string_pretty(timeline).context("Failed to serialize timeline")?;
    let temp_path = path.with_extension("json.tmp");
    fs::write(&temp_path, json)
        .with_context(|| format!("Failed to write temp file: {}", temp_path.display()))?;
    fs::rename(&temp_path, path)
        .with_context(|| format!("Failed to move timeline into place: {}", path.display()))?;

    Ok(())
}

fn merge_duplicate_dates(days: Vec<TimelineDay>) -> Timeline {
    let mut merged: Timeline = Vec::with_capacity(days.len());
    let mut positions: HashMap<String, usize> = HashMap::with_capacity(days.len());

    for day in days {
        if let Some(&idx) = positions.get(&day.date) {
            warn!(date = %day.date, "Duplicate date in timeline, merging messages");
            merged[idx].messages.extend(day.messages);
        } else {
            positions.insert(day.date.clone(), merged.len());
            merged.push(day);
        }
    }

    merged
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const SAMPLE: &str = r#"[
        {"date": "10/01/2025", "messages": [
            {"sender": "Amy", "time": "9:00", "type": "text", "content": "Hello world"}
        ]},
        {"date": "10/02/2025", "messages": []}
    ]"#;

    #[test]
    fn test_parse_timeline_str() {
        let timeline = parse_timeline_str(SAMPLE).unwrap();
        assert_eq!(timeline.len(), 2);
        assert_eq!(timeline[0].date, "10/01/2025");
        assert_eq!(timeline[0].messages.len(), 1);
        assert!(timeline[1].messages.is_empty());
    }

    #[test]
    fn test_parse_timeline_empty_array() {
        assert!(parse_timeline_str("[]").unwrap().is_empty());
    }

    #[test]
    fn test_parse_timeline_rejects_object() {
        let err = parse_timeline_str(r#"{"date": "x"}"#).unwrap_err();
        assert!(err.to_string().contains("Failed to parse timeline JSON"));
    }

    #[test]
    fn test_duplicate_dates_are_merged_in_order() {
        let json = r#"[
            {"date": "d1", "messages": [{"sender": "A", "time": "1", "type": "text", "content": "one"}]},
            {"date": "d2", "messages": [{"sender": "B", "time": "2", "type": "text", "content": "two"}]},
            {"date": "d1", "messages": [{"sender": "C", "time": "3", "type": "text", "content": "three"}]}
        ]"#;
        let timeline = parse_timeline_str(json).unwrap();
        assert_eq!(timeline.len(), 2);
        assert_eq!(timeline[0].date, "d1");
        let contents: Vec<&str> = timeline[0].messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["one", "three"]);
        assert_eq!(timeline[1].date, "d2");
    }

    #[test]
    fn test_parse_timeline_file() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(SAMPLE.as_bytes()).unwrap();

        let timeline = parse_timeline_file(tmp.path()).unwrap();
        assert_eq!(timeline.len(), 2);
    }

    #[test]
    fn test_write_then_read_back() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("public").join("timeline.json");
        let timeline = parse_timeline_str(SAMPLE).unwrap();

        write_timeline_file(&path, &timeline).unwrap();

        assert!(!dir.path().join("public").join("timeline.json.tmp").exists());
        assert_eq!(parse_timeline_file(&path).unwrap(), timeline);
    }

    #[test]
    fn test_parse_timeline_file_missing() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = parse_timeline_file(&dir.path().join("nope.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to open timeline file"));
    }
}
