// 🏗️ Puzzle Parser
// raw text → classify → accumulate → validate → normalize → records
//
// Malformed content never fails the parse: it becomes diagnostics.

use crate::accumulator::Accumulator;
use crate::classifier::LineClassifier;
use crate::config::ParserConfig;
use crate::model::ParseOutcome;
use crate::normalize::normalize_records;
use crate::validation::validate_records;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::{debug, info};

/// PuzzleParser - Parses one dump layout
#[derive(Debug, Clone, Default)]
pub struct PuzzleParser {
    classifier: LineClassifier,
}

impl PuzzleParser {
    pub fn new(config: ParserConfig) -> Self {
        PuzzleParser {
            classifier: LineClassifier::new(config),
        }
    }

    pub fn config(&self) -> &ParserConfig {
        self.classifier.config()
    }

    /// Parser version (recorded as provenance on import)
    pub fn version(&self) -> &str {
        "1.0.0"
    }

    /// Parse a raw dump. Never fails for malformed content.
    pub fn parse(&self, raw_text: &str) -> ParseOutcome {
        let mut accumulator = Accumulator::new();

        for (idx, line) in raw_text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let kind = self.classifier.classify(line);
            debug!(line = idx + 1, ?kind, "classified");
            accumulator.apply(idx + 1, kind, line);
        }

        let (sealed, mut diagnostics) = accumulator.finish();
        let sealed_count = sealed.len();
        let validated = validate_records(sealed, &mut diagnostics);
        let records = normalize_records(validated, &mut diagnostics);

        info!(
            sealed = sealed_count,
            accepted = records.len(),
            diagnostics = diagnostics.len(),
            "parse complete"
        );

        ParseOutcome {
            records,
            diagnostics,
        }
    }

    /// Read and parse a dump file
    ///
    /// Fails only if the file cannot be read or is not UTF-8.
    pub fn parse_file(&self, file_path: &Path) -> Result<ParseOutcome> {
        let bytes = std::fs::read(file_path)
            .with_context(|| format!("Failed to open file: {}", file_path.display()))?;
        let text = String::from_utf8(bytes)
            .with_context(|| format!("File is not valid UTF-8: {}", file_path.display()))?;

        info!(file = %file_path.display(), bytes = text.len(), "parsing dump");
        Ok(self.parse(&text))
    }
}

/// Parse with the default layout
pub fn parse(raw_text: &str) -> ParseOutcome {
    PuzzleParser::default().parse(raw_text)
}

/// Parse with a custom layout
pub fn parse_with(raw_text: &str, config: &ParserConfig) -> ParseOutcome {
    PuzzleParser::new(config.clone()).parse(raw_text)
}

/// Read and parse a file with the default layout
pub fn parse_file(file_path: &Path) -> Result<ParseOutcome> {
    PuzzleParser::default().parse_file(file_path)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DiagnosticKind;

    const WELL_FORMED: &str = "\
- Jul 31, 2025 #781
- Fruit
-   APPLE, PEAR, PLUM,
-   FIG
- Colors
-   RED, BLUE, GREEN, GOLD
- Birds
-   CROW, WREN,
-   LARK, KITE
- Trees
-   OAK, ASH, ELM, YEW
";

    #[test]
    fn test_parse_well_formed() {
        let outcome = parse(WELL_FORMED);

        assert!(outcome.diagnostics.is_empty(), "{:?}", outcome.diagnostics);
        assert_eq!(outcome.records.len(), 1);

        let record = &outcome.records[0];
        assert_eq!(record.date_key(), "2025-07-31");
        assert_eq!(record.record_id, 781);
        assert_eq!(record.categories[0].words, vec!["APPLE", "PEAR", "PLUM", "FIG"]);
        assert_eq!(record.categories[3].name, "Trees");
    }

    #[test]
    fn test_blank_lines_are_not_noise() {
        let text = WELL_FORMED.replace('\n', "\n\n");
        let outcome = parse(&text);
        assert!(outcome.diagnostics.is_empty());
        assert_eq!(outcome.records.len(), 1);
    }

    #[test]
    fn test_noise_line_numbers_are_one_based() {
        let text = format!("Scraped at 10:00\n{}", WELL_FORMED);
        let outcome = parse(&text);
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.diagnostics[0].kind, DiagnosticKind::Noise);
        assert_eq!(outcome.diagnostics[0].line, Some(1));
    }

    #[test]
    fn test_parse_with_custom_marker() {
        let text = WELL_FORMED.replace('-', "*");
        let config = ParserConfig::default().with_marker('*');
        assert_eq!(parse_with(&text, &config).records.len(), 1);
        // Default layout sees only noise
        assert!(parse(&text).records.is_empty());
    }

    #[test]
    fn test_parse_file_missing() {
        let result = parse_file(Path::new("definitely_missing_dump.txt"));
        assert!(result.is_err());
    }
}
