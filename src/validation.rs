// ✅ Record Validator
// A record is atomic: 4 categories × 4 words, or it is dropped

use crate::accumulator::SealedRecord;
use crate::model::{Diagnostic, DiagnosticKind, CATEGORIES_PER_RECORD, WORDS_PER_CATEGORY};
use tracing::warn;

/// Shortfall found in a sealed record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shortfall {
    CategoryCount { found: usize },
    WordCount { category: String, rank: usize, found: usize },
}

impl Shortfall {
    pub fn describe(&self) -> String {
        match self {
            Shortfall::CategoryCount { found } => format!(
                "has {} categories, expected {}",
                found, CATEGORIES_PER_RECORD
            ),
            Shortfall::WordCount {
                category,
                rank,
                found,
            } => format!(
                "category {} {:?} has {} words, expected {}",
                rank, category, found, WORDS_PER_CATEGORY
            ),
        }
    }
}

/// First structural shortfall of a record, if any
///
/// Category count is checked before word counts.
pub fn check_record(record: &SealedRecord) -> Option<Shortfall> {
    if record.categories.len() != CATEGORIES_PER_RECORD {
        return Some(Shortfall::CategoryCount {
            found: record.categories.len(),
        });
    }

    record
        .categories
        .iter()
        .find(|c| c.words.len() != WORDS_PER_CATEGORY)
        .map(|c| Shortfall::WordCount {
            category: c.name.clone(),
            rank: c.rank,
            found: c.words.len(),
        })
}

/// Keep complete records, emit one diagnostic per dropped record
pub fn validate_records(
    candidates: Vec<SealedRecord>,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<SealedRecord> {
    let mut accepted = Vec::with_capacity(candidates.len());

    for record in candidates {
        match check_record(&record) {
            None => accepted.push(record),
            Some(shortfall) => {
                warn!(
                    date = %record.date_text,
                    line = record.line,
                    "dropping incomplete record: {}",
                    shortfall.describe()
                );
                diagnostics.push(
                    Diagnostic::new(
                        DiagnosticKind::IncompleteRecord,
                        format!(
                            "record {} #{} {}",
                            record.date_text,
                            record.id_text,
                            shortfall.describe()
                        ),
                    )
                    .at_line(record.line),
                );
            }
        }
    }

    accepted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Category;

    fn sealed(category_sizes: &[usize]) -> SealedRecord {
        SealedRecord {
            line: 1,
            date_text: "Jul 31, 2025".into(),
            id_text: "781".into(),
            categories: category_sizes
                .iter()
                .enumerate()
                .map(|(rank, &n)| {
                    Category::new(
                        format!("C{}", rank),
                        rank,
                        (0..n).map(|i| format!("W{}", i)).collect(),
                    )
                })
                .collect(),
        }
    }

    #[test]
    fn test_complete_record_passes() {
        assert_eq!(check_record(&sealed(&[4, 4, 4, 4])), None);
    }

    #[test]
    fn test_category_count_shortfall() {
        assert_eq!(
            check_record(&sealed(&[4, 4, 4])),
            Some(Shortfall::CategoryCount { found: 3 })
        );
        assert_eq!(
            check_record(&sealed(&[4, 4, 4, 4, 4])),
            Some(Shortfall::CategoryCount { found: 5 })
        );
    }

    #[test]
    fn test_word_count_shortfall_names_category() {
        let shortfall = check_record(&sealed(&[4, 4, 5, 4])).unwrap();
        assert_eq!(
            shortfall,
            Shortfall::WordCount {
                category: "C2".into(),
                rank: 2,
                found: 5
            }
        );
        assert!(shortfall.describe().contains("\"C2\" has 5 words"));
    }

    #[test]
    fn test_validate_records_drops_and_diagnoses() {
        let mut diagnostics = Vec::new();
        let accepted = validate_records(
            vec![sealed(&[4, 4, 4, 4]), sealed(&[4, 4, 4])],
            &mut diagnostics,
        );

        assert_eq!(accepted.len(), 1);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::IncompleteRecord);
        assert!(diagnostics[0].message.contains("Jul 31, 2025"));
        assert!(diagnostics[0].message.contains("3 categories"));
    }
}
