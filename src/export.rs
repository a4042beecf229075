// 📦 Export
// One JSON artifact per puzzle plus summary.json and summary.csv

use crate::model::Record;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

pub const SUMMARY_JSON: &str = "summary.json";
pub const SUMMARY_CSV: &str = "summary.csv";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportSummary {
    pub record_count: usize,
    pub first_date: Option<String>,
    pub last_date: Option<String>,
    pub min_id: Option<u32>,
    pub max_id: Option<u32>,
    pub generated_at: DateTime<Utc>,
    pub files: Vec<String>,
}

impl ExportSummary {
    pub fn from_records(records: &[Record]) -> Self {
        ExportSummary {
            record_count: records.len(),
            first_date: records.iter().map(|r| r.record_date).min().map(|d| d.to_string()),
            last_date: records.iter().map(|r| r.record_date).max().map(|d| d.to_string()),
            min_id: records.iter().map(|r| r.record_id).min(),
            max_id: records.iter().map(|r| r.record_id).max(),
            generated_at: Utc::now(),
            files: Vec::new(),
        }
    }
}

/// Row of summary.csv
#[derive(Debug, Serialize)]
struct SummaryRow<'a> {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Puzzle")]
    record_id: u32,
    #[serde(rename = "Category_1")]
    category_1: &'a str,
    #[serde(rename = "Category_2")]
    category_2: &'a str,
    #[serde(rename = "Category_3")]
    category_3: &'a str,
    #[serde(rename = "Category_4")]
    category_4: &'a str,
}

impl<'a> SummaryRow<'a> {
    fn from_record(record: &'a Record) -> Self {
        let name = |i: usize| record.categories.get(i).map(|c| c.name.as_str()).unwrap_or("");
        SummaryRow {
            date: record.date_key(),
            record_id: record.record_id,
            category_1: name(0),
            category_2: name(1),
            category_3: name(2),
            category_4: name(3),
        }
    }
}

/// File name of a puzzle's artifact; the puzzle number disambiguates same-day records
pub fn record_file_name(record: &Record) -> String {
    format!("{}-{}.json", record.date_key(), record.record_id)
}

pub fn export_records(records: &[Record], dir: &Path) -> Result<ExportSummary> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create export directory: {}", dir.display()))?;

    let mut summary = ExportSummary::from_records(records);

    for record in records {
        let name = record_file_name(record);
        let path = dir.join(&name);
        let json = serde_json::to_string_pretty(record)?;
        fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
        summary.files.push(name);
    }

    let summary_path = dir.join(SUMMARY_JSON);
    fs::write(&summary_path, serde_json::to_string_pretty(&summary)?)
        .with_context(|| format!("Failed to write {}", summary_path.display()))?;

    write_summary_csv(records, &dir.join(SUMMARY_CSV))?;

    info!(dir = %dir.display(), records = records.len(), "export written");
    Ok(summary)
}

fn write_summary_csv(records: &[Record], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    for record in records {
        writer
            .serialize(SummaryRow::from_record(record))
            .context("Failed to write summary row")?;
    }
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Category;
    use chrono::NaiveDate;

    fn record(day: u32, id: u32) -> Record {
        let categories = (0..4)
            .map(|rank| {
                Category::new(
                    format!("Group {}", rank),
                    rank,
                    vec!["A".into(), "B".into(), "C".into(), "D".into()],
                )
            })
            .collect();
        Record::new(NaiveDate::from_ymd_opt(2025, 7, day).unwrap(), id, categories)
    }

    #[test]
    fn test_export_writes_artifacts_and_summary() {
        let dir = tempfile::tempdir().unwrap();
        let records = vec![record(30, 780), record(31, 781)];

        let summary = export_records(&records, dir.path()).unwrap();

        assert_eq!(summary.record_count, 2);
        assert_eq!(summary.first_date.as_deref(), Some("2025-07-30"));
        assert_eq!(summary.last_date.as_deref(), Some("2025-07-31"));
        assert_eq!(summary.max_id, Some(781));

        let artifact = fs::read_to_string(dir.path().join("2025-07-31-781.json")).unwrap();
        let parsed: Record = serde_json::from_str(&artifact).unwrap();
        assert_eq!(parsed, records[1]);

        let csv_text = fs::read_to_string(dir.path().join(SUMMARY_CSV)).unwrap();
        let mut lines = csv_text.lines();
        assert_eq!(
            lines.next(),
            Some("Date,Puzzle,Category_1,Category_2,Category_3,Category_4")
        );
        assert_eq!(
            lines.next(),
            Some("2025-07-30,780,Group 0,Group 1,Group 2,Group 3")
        );
    }

    #[test]
    fn test_export_empty() {
        let dir = tempfile::tempdir().unwrap();
        let summary = export_records(&[], dir.path()).unwrap();
        assert_eq!(summary.record_count, 0);
        assert!(summary.first_date.is_none());
        assert!(dir.path().join(SUMMARY_JSON).exists());
    }
}
