// src/report.rs

use crate::error::{Error, Result};
use crate::model::{Status, TranslationRecord};
use glob::Pattern;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;

/// Writes the records as a pretty-printed JSON array
pub fn write_json<'a, W: Write>(
    records: impl IntoIterator<Item = &'a TranslationRecord>,
    mut writer: W,
) -> Result<()> {
    let records: Vec<&TranslationRecord> = records.into_iter().collect();
    serde_json::to_writer_pretty(&mut writer, &records)?;
    writeln!(writer)?;
    Ok(())
}

/// Keeps the records whose translation file name matches one of `patterns`.
/// No patterns keeps everything.
pub fn select<'a>(
    records: &'a [TranslationRecord],
    patterns: &[String],
) -> Result<Vec<&'a TranslationRecord>> {
    let patterns = patterns
        .iter()
        .map(|p| {
            Pattern::new(p).map_err(|source| Error::Pattern {
                pattern: p.clone(),
                source,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(records
        .iter()
        .filter(|record| {
            if patterns.is_empty() {
                return true;
            }
            let Some(name) = record.translation().path().file_name() else {
                return false;
            };
            let name = name.to_string_lossy();
            patterns.iter().any(|pattern| pattern.matches(&name))
        })
        .collect())
}

/// Number of records per status
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusSummary {
    counts: BTreeMap<Status, usize>,
}

impl StatusSummary {
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a TranslationRecord>) -> Self {
        let mut summary = StatusSummary::default();
        for record in records {
            *summary.counts.entry(record.status()).or_insert(0) += 1;
        }
        summary
    }

    pub fn count(&self, status: Status) -> usize {
        self.counts.get(&status).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Everything except up-to-date translations
    pub fn pending(&self) -> usize {
        self.total() - self.count(Status::UpToDate)
    }
}

impl fmt::Display for StatusSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = Status::ALL
            .iter()
            .map(|status| format!("{}: {}", status, self.count(*status)))
            .collect();
        write!(f, "{}", parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::LanguageTag;
    use crate::model::{RevisionedFile, TrackState, TranslationFile};
    use pretty_assertions::assert_eq;

    fn record(translation: &str, state: TrackState) -> TranslationRecord {
        TranslationRecord::new(
            TranslationFile::new(
                RevisionedFile::untracked(translation),
                LanguageTag::parse("fr").unwrap(),
            ),
            RevisionedFile::untracked("en/a.md"),
            "main",
            state,
        )
    }

    fn records() -> Vec<TranslationRecord> {
        vec![
            record("fr/a.md", TrackState::ToCreate { missing_lines: 3 }),
            record("fr/b.md", TrackState::UpToDate),
            record("fr/c.txt", TrackState::UpToDate),
            record(
                "fr/d.md",
                TrackState::Orphan {
                    original_was_deleted: true,
                    surplus_lines: 2,
                },
            ),
        ]
    }

    #[test]
    fn test_summary_counts() {
        let records = records();
        let summary = StatusSummary::from_records(&records);
        assert_eq!(summary.total(), 4);
        assert_eq!(summary.count(Status::UpToDate), 2);
        assert_eq!(summary.count(Status::ToUpdate), 0);
        assert_eq!(summary.pending(), 2);
        assert_eq!(
            summary.to_string(),
            "To Create: 1, To Initialize: 0, To Update: 0, Up-To-Date: 2, Orphan: 1"
        );
    }

    #[test]
    fn test_summary_serializes_display_names() {
        let records = records();
        let json = serde_json::to_value(StatusSummary::from_records(&records)).unwrap();
        assert_eq!(json["counts"]["Up-To-Date"], 2);
        assert_eq!(json["counts"]["Orphan"], 1);
    }

    #[test]
    fn test_select_by_file_name() {
        let records = records();
        let selected: Vec<_> = select(&records, &["*.md".to_string()])
            .unwrap()
            .into_iter()
            .map(|r| r.translation().path().to_string_lossy().into_owned())
            .collect();
        assert_eq!(selected, vec!["fr/a.md", "fr/b.md", "fr/d.md"]);
    }

    #[test]
    fn test_select_without_patterns_keeps_all() {
        let records = records();
        assert_eq!(select(&records, &[]).unwrap().len(), 4);
    }

    #[test]
    fn test_select_rejects_bad_pattern() {
        let records = records();
        assert!(matches!(
            select(&records, &["[a".to_string()]),
            Err(Error::Pattern { .. })
        ));
    }

    #[test]
    fn test_write_json_array() {
        let records = records();
        let mut out = Vec::new();
        write_json(&records, &mut out).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(json.as_array().unwrap().len(), 4);
        assert_eq!(json[1]["status"], "Up-To-Date");
        assert_eq!(json[3]["original_was_deleted"], true);
    }
}
