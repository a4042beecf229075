// 🖨️ Raw-text Renderer
// Writes records back in the dump layout the parser reads

use crate::config::ParserConfig;
use crate::model::Record;

/// Render records as a dump, one block per record
pub fn render_records(records: &[Record], config: &ParserConfig) -> String {
    let mut out = String::new();
    for record in records {
        render_record_into(&mut out, record, config);
    }
    out
}

pub fn render_record(record: &Record, config: &ParserConfig) -> String {
    let mut out = String::new();
    render_record_into(&mut out, record, config);
    out
}

fn render_record_into(out: &mut String, record: &Record, config: &ParserConfig) {
    let marker = config.marker;
    // Headers must stay below the word-line threshold
    let header_pad = " ".repeat(config.continuation_indent.saturating_sub(1).min(1));
    let word_pad = " ".repeat(config.continuation_indent);

    out.push_str(&format!(
        "{} {} #{}\n",
        marker,
        record.record_date.format("%b %-d, %Y"),
        record.record_id
    ));

    let mut categories: Vec<_> = record.categories.iter().collect();
    categories.sort_by_key(|c| c.rank);

    for category in categories {
        out.push_str(&format!("{}{}{}\n", marker, header_pad, category.name));
        out.push_str(&format!(
            "{}{}{}\n",
            marker,
            word_pad,
            category.words.join(", ")
        ));
    }
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Category;
    use chrono::NaiveDate;

    #[test]
    fn test_render_record_layout() {
        let record = Record::new(
            NaiveDate::from_ymd_opt(2025, 8, 3).unwrap(),
            784,
            vec![Category::new(
                "Fruit",
                0,
                vec!["APPLE".into(), "PEAR".into(), "PLUM".into(), "FIG".into()],
            )],
        );

        let text = render_record(&record, &ParserConfig::default());
        assert_eq!(
            text,
            "- Aug 3, 2025 #784\n- Fruit\n-   APPLE, PEAR, PLUM, FIG\n\n"
        );
    }

    #[test]
    fn test_render_headers_stay_below_word_threshold() {
        let record = Record::new(
            NaiveDate::from_ymd_opt(2025, 8, 3).unwrap(),
            784,
            vec![Category::new(
                "Fruit",
                0,
                vec!["APPLE".into(), "PEAR".into(), "PLUM".into(), "FIG".into()],
            )],
        );

        let tight = ParserConfig::default()
            .with_marker('•')
            .with_continuation_indent(1);
        assert_eq!(
            render_record(&record, &tight),
            "• Aug 3, 2025 #784\n•Fruit\n• APPLE, PEAR, PLUM, FIG\n\n"
        );

        let wide = ParserConfig::default().with_continuation_indent(5);
        assert_eq!(
            render_record(&record, &wide),
            "- Aug 3, 2025 #784\n- Fruit\n-     APPLE, PEAR, PLUM, FIG\n\n"
        );
    }
}
