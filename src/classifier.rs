// 🔎 Line Classifier
// Commits every input line to exactly one structural role before the fold

use crate::config::ParserConfig;
use regex::Regex;
use std::sync::OnceLock;

/// Classification of a single non-empty, trimmed line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    /// `- Jul 31, 2025 #781 [inline category]`
    RecordStart {
        date_text: String,
        id_text: String,
        trailing_category_text: Option<String>,
    },
    /// Marker followed by a shallow indent: opens a category
    CategoryHeader { raw_text: String },
    /// Marker followed by a deep indent: words for the open category
    WordContinuation { raw_text: String },
    /// Anything else
    Noise,
}

fn record_start_regex() -> &'static Regex {
    static RECORD_START_RE: OnceLock<Regex> = OnceLock::new();
    RECORD_START_RE.get_or_init(|| {
        // Applied to the text after the marker
        Regex::new(
            r"^\s*(?P<date>[A-Za-z]{3}\s+\d{1,2},\s*\d{4})\s*#(?P<id>\d+)\b(?P<rest>.*)$",
        )
        .unwrap()
    })
}

/// Line classifier for one dump layout
#[derive(Debug, Clone)]
pub struct LineClassifier {
    config: ParserConfig,
}

impl LineClassifier {
    pub fn new(config: ParserConfig) -> Self {
        LineClassifier { config }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Number of whitespace characters directly after the marker
    pub fn indent_after_marker(after_marker: &str) -> usize {
        after_marker.chars().take_while(|c| c.is_whitespace()).count()
    }

    /// Deep indent after the marker means the line continues the open category
    pub fn is_continuation_indent(&self, after_marker: &str) -> bool {
        Self::indent_after_marker(after_marker) >= self.config.continuation_indent
    }

    /// Classify one line. Leading/trailing whitespace around the line is ignored.
    pub fn classify(&self, line: &str) -> LineKind {
        let line = line.trim();

        let after_marker = match line.strip_prefix(self.config.marker) {
            Some(rest) => rest,
            None => return LineKind::Noise,
        };

        if let Some(caps) = record_start_regex().captures(after_marker) {
            let trailing_category_text = caps
                .name("rest")
                .map(|m| clean_inline_category(m.as_str()))
                .filter(|s| !s.is_empty());

            return LineKind::RecordStart {
                date_text: collapse_whitespace(&caps["date"]),
                id_text: caps["id"].to_string(),
                trailing_category_text,
            };
        }

        let raw_text = after_marker.trim().to_string();
        if raw_text.is_empty() {
            return LineKind::Noise;
        }

        if self.is_continuation_indent(after_marker) {
            LineKind::WordContinuation { raw_text }
        } else if clean_category_name(&raw_text).is_empty() {
            // `- **` or `- :` names nothing
            LineKind::Noise
        } else {
            LineKind::CategoryHeader { raw_text }
        }
    }
}

impl Default for LineClassifier {
    fn default() -> Self {
        LineClassifier::new(ParserConfig::default())
    }
}

// ============================================================================
// TEXT HELPERS
// ============================================================================

fn is_markup(c: char) -> bool {
    matches!(c, '*' | '_' | '`')
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Category label without surrounding whitespace, emphasis markup or trailing colons
///
/// Cleaning an already clean name returns it unchanged.
pub fn clean_category_name(raw: &str) -> String {
    raw.trim_start_matches(|c: char| c.is_whitespace() || is_markup(c))
        .trim_end_matches(|c: char| c.is_whitespace() || is_markup(c) || c == ':')
        .to_string()
}

/// Category text following the puzzle number, e.g. `#781: Fruit` or `#781 - Fruit`
fn clean_inline_category(rest: &str) -> String {
    let rest = rest.trim_start_matches(|c: char| c.is_whitespace() || matches!(c, ':' | '-'));
    clean_category_name(rest)
}

/// Words from a continuation line
///
/// Handles both `FOO, BAR, BAZ,` and a single bare `QUX`. Case is preserved;
/// empty tokens are dropped.
pub fn split_words(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|token| token.trim_matches(|c: char| c.is_whitespace() || is_markup(c)))
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn classify(line: &str) -> LineKind {
        LineClassifier::default().classify(line)
    }

    #[test]
    fn test_record_start_plain() {
        assert_eq!(
            classify("- Jul 31, 2025 #781"),
            LineKind::RecordStart {
                date_text: "Jul 31, 2025".into(),
                id_text: "781".into(),
                trailing_category_text: None,
            }
        );
    }

    #[test]
    fn test_record_start_with_inline_category() {
        match classify("- Aug 1, 2025 #782 **Things that sting**") {
            LineKind::RecordStart {
                date_text,
                trailing_category_text,
                ..
            } => {
                assert_eq!(date_text, "Aug 1, 2025");
                assert_eq!(trailing_category_text.as_deref(), Some("Things that sting"));
            }
            other => panic!("expected record start, got {:?}", other),
        }
    }

    #[rstest]
    #[case("- Jul 31, 2025 #781: Fruit", Some("Fruit"))]
    #[case("- Jul 31, 2025 #781**Fruit**", Some("Fruit"))]
    #[case("- Jul 31, 2025 #781 - Fruit", Some("Fruit"))]
    #[case("- Jul 31, 2025 #781:", None)]
    fn test_record_start_with_punctuation_after_id(
        #[case] line: &str,
        #[case] category: Option<&str>,
    ) {
        match classify(line) {
            LineKind::RecordStart {
                id_text,
                trailing_category_text,
                ..
            } => {
                assert_eq!(id_text, "781");
                assert_eq!(trailing_category_text.as_deref(), category);
            }
            other => panic!("expected record start, got {:?}", other),
        }
    }

    #[test]
    fn test_id_glued_to_letters_is_not_a_record_start() {
        assert!(!matches!(
            classify("- Jul 31, 2025 #781abc"),
            LineKind::RecordStart { .. }
        ));
    }

    #[test]
    fn test_record_start_accepts_unknown_month_shape() {
        // Month validity is the normalizer's call, not the classifier's
        assert!(matches!(
            classify("- Abc 99, 2025 #1"),
            LineKind::RecordStart { .. }
        ));
    }

    #[rstest]
    #[case(0, false)]
    #[case(1, false)]
    #[case(2, false)]
    #[case(3, true)]
    #[case(4, true)]
    fn test_continuation_boundary(#[case] spaces: usize, #[case] continuation: bool) {
        let line = format!("-{}APPLE, PEAR", " ".repeat(spaces));
        let kind = classify(&line);
        if continuation {
            assert_eq!(
                kind,
                LineKind::WordContinuation {
                    raw_text: "APPLE, PEAR".into()
                }
            );
        } else {
            assert_eq!(
                kind,
                LineKind::CategoryHeader {
                    raw_text: "APPLE, PEAR".into()
                }
            );
        }
    }

    #[test]
    fn test_tab_counts_as_whitespace() {
        assert!(matches!(
            classify("-\t\t\tFIG"),
            LineKind::WordContinuation { .. }
        ));
    }

    #[test]
    fn test_noise() {
        assert_eq!(classify("debug: fetched 3 pages"), LineKind::Noise);
        assert_eq!(classify("-"), LineKind::Noise);
        assert_eq!(classify("-    "), LineKind::Noise);
        assert_eq!(classify(""), LineKind::Noise);
    }

    #[test]
    fn test_markup_only_header_is_noise() {
        assert_eq!(classify("- **"), LineKind::Noise);
        assert_eq!(classify("- :"), LineKind::Noise);
        assert_eq!(classify("-  _::_"), LineKind::Noise);
        // Deep indent still means words
        assert!(matches!(classify("-   **"), LineKind::WordContinuation { .. }));
    }

    #[test]
    fn test_custom_marker() {
        let classifier = LineClassifier::new(ParserConfig::default().with_marker('•'));
        assert!(matches!(
            classifier.classify("• Fruit"),
            LineKind::CategoryHeader { .. }
        ));
        assert_eq!(classifier.classify("- Fruit"), LineKind::Noise);
    }

    #[test]
    fn test_split_words_comma_list() {
        assert_eq!(split_words("FOO, BAR, BAZ,"), vec!["FOO", "BAR", "BAZ"]);
    }

    #[test]
    fn test_split_words_single_and_case() {
        assert_eq!(split_words("Qux"), vec!["Qux"]);
        assert_eq!(split_words("Qux,"), vec!["Qux"]);
        assert!(split_words(" , ,").is_empty());
    }

    #[test]
    fn test_clean_category_name() {
        assert_eq!(clean_category_name("  **Fruit:** "), "Fruit");
        assert_eq!(clean_category_name("_Things in a kitchen_"), "Things in a kitchen");
        assert_eq!(clean_category_name("Ratio::"), "Ratio");
        assert_eq!(clean_category_name("**Ratio:**:"), "Ratio");
    }

    #[rstest]
    #[case("Ratio::")]
    #[case("  **Fruit:** ")]
    #[case("_A_:")]
    #[case("U.S. states")]
    fn test_clean_category_name_is_stable(#[case] raw: &str) {
        let once = clean_category_name(raw);
        assert_eq!(clean_category_name(&once), once);
    }
}
