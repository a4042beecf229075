// 🧩 Puzzle Model
// Records, categories and the diagnostics produced while parsing them

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Number of categories in a complete puzzle
pub const CATEGORIES_PER_RECORD: usize = 4;

/// Number of words in a complete category
pub const WORDS_PER_CATEGORY: usize = 4;

// ============================================================================
// RECORD + CATEGORY
// ============================================================================

/// Category - One named grouping of words within a puzzle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    /// Zero-based position within the record, in header order
    pub rank: usize,
    pub words: Vec<String>,
}

impl Category {
    pub fn new(name: impl Into<String>, rank: usize, words: Vec<String>) -> Self {
        Category {
            name: name.into(),
            rank,
            words,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.words.len() == WORDS_PER_CATEGORY
    }
}

/// Record - One day's puzzle, accepted only with 4 categories × 4 words
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Serialized as YYYY-MM-DD
    pub record_date: NaiveDate,
    /// Puzzle number taken from the `#NNN` marker
    pub record_id: u32,
    pub categories: Vec<Category>,
}

impl Record {
    pub fn new(record_date: NaiveDate, record_id: u32, categories: Vec<Category>) -> Self {
        Record {
            record_date,
            record_id,
            categories,
        }
    }

    /// Canonical YYYY-MM-DD form of the date
    pub fn date_key(&self) -> String {
        self.record_date.format("%Y-%m-%d").to_string()
    }

    pub fn is_complete(&self) -> bool {
        self.categories.len() == CATEGORIES_PER_RECORD
            && self.categories.iter().all(Category::is_complete)
    }

    /// All words of the puzzle, in category then word order
    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.categories
            .iter()
            .flat_map(|c| c.words.iter().map(String::as_str))
    }

    /// Case-insensitive substring match over category names and words
    pub fn matches(&self, term: &str) -> bool {
        let needle = term.to_lowercase();
        self.categories.iter().any(|c| {
            c.name.to_lowercase().contains(&needle)
                || c.words.iter().any(|w| w.to_lowercase().contains(&needle))
        })
    }
}

// ============================================================================
// DIAGNOSTICS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticKind {
    /// Line matched no recognised shape
    Noise,
    /// Word line (or header) with no owning category/record
    OrphanWords,
    /// Record sealed with the wrong number of categories or words
    IncompleteRecord,
    /// Date text could not be normalised
    InvalidDate,
    /// Puzzle number could not be read
    InvalidId,
}

impl DiagnosticKind {
    pub fn code(&self) -> &str {
        match self {
            DiagnosticKind::Noise => "noise",
            DiagnosticKind::OrphanWords => "orphan-words",
            DiagnosticKind::IncompleteRecord => "incomplete-record",
            DiagnosticKind::InvalidDate => "invalid-date",
            DiagnosticKind::InvalidId => "invalid-id",
        }
    }
}

/// Diagnostic - Non-fatal note about a line or record that was not accepted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// 1-based source line (record-start line for record-level notes)
    pub line: Option<usize>,
    pub kind: DiagnosticKind,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Diagnostic {
            line: None,
            kind,
            message: message.into(),
        }
    }

    /// Builder pattern: attach source line number
    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.line {
            Some(line) => write!(f, "line {}: [{}] {}", line, self.kind.code(), self.message),
            None => write!(f, "[{}] {}", self.kind.code(), self.message),
        }
    }
}

/// ParseOutcome - Accepted records plus everything that was not
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParseOutcome {
    pub records: Vec<Record>,
    pub diagnostics: Vec<Diagnostic>,
}

impl ParseOutcome {
    pub fn summary(&self) -> String {
        format!(
            "{} records accepted, {} diagnostics",
            self.records.len(),
            self.diagnostics.len()
        )
    }

    pub fn diagnostics_of(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(move |d| d.kind == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> Record {
        let cats = (0..4)
            .map(|i| {
                Category::new(
                    format!("Group {}", i),
                    i,
                    vec!["Apple".into(), "Pear".into(), "Plum".into(), "Fig".into()],
                )
            })
            .collect();
        Record::new(NaiveDate::from_ymd_opt(2025, 7, 31).unwrap(), 781, cats)
    }

    #[test]
    fn test_record_date_key() {
        assert_eq!(sample_record().date_key(), "2025-07-31");
    }

    #[test]
    fn test_record_serializes_date_as_iso() {
        let json = serde_json::to_value(sample_record()).unwrap();
        assert_eq!(json["record_date"], "2025-07-31");
        assert_eq!(json["categories"][2]["rank"], 2);
    }

    #[test]
    fn test_record_matches_case_insensitive() {
        let record = sample_record();
        assert!(record.matches("pear"));
        assert!(record.matches("group 3"));
        assert!(!record.matches("banana"));
    }

    #[test]
    fn test_diagnostic_display() {
        let d = Diagnostic::new(DiagnosticKind::Noise, "unrecognised line").at_line(12);
        assert_eq!(d.to_string(), "line 12: [noise] unrecognised line");
    }
}
