// 🧮 Record Accumulator
// Explicit two-state fold over classified lines

use crate::classifier::{clean_category_name, split_words, LineKind};
use crate::model::{Category, Diagnostic, DiagnosticKind};
use tracing::debug;

/// A record as sealed by the accumulator, before validation and normalisation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedRecord {
    /// 1-based line of the record-start marker
    pub line: usize,
    pub date_text: String,
    pub id_text: String,
    pub categories: Vec<Category>,
}

#[derive(Debug, Clone)]
struct OpenCategory {
    name: String,
    words: Vec<String>,
}

#[derive(Debug, Clone)]
struct OpenRecord {
    sealed: SealedRecord,
    category: Option<OpenCategory>,
}

impl OpenRecord {
    /// The single close-category operation
    ///
    /// A category with no words is dropped, never appended empty.
    fn close_category(&mut self) {
        if let Some(category) = self.category.take() {
            if category.words.is_empty() {
                debug!(name = %category.name, "dropping empty category");
                return;
            }
            let rank = self.sealed.categories.len();
            self.sealed
                .categories
                .push(Category::new(category.name, rank, category.words));
        }
    }

    fn open_category(&mut self, name: String) {
        self.close_category();
        self.category = Some(OpenCategory {
            name,
            words: Vec::new(),
        });
    }
}

#[derive(Debug, Clone)]
enum State {
    Idle,
    InRecord(OpenRecord),
}

/// Accumulator - Owns the in-progress record until it is sealed
#[derive(Debug)]
pub struct Accumulator {
    state: State,
    sealed: Vec<SealedRecord>,
    diagnostics: Vec<Diagnostic>,
}

impl Default for Accumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl Accumulator {
    pub fn new() -> Self {
        Accumulator {
            state: State::Idle,
            sealed: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, State::Idle)
    }

    /// The single seal operation, shared by record-start and end of input
    fn seal(&mut self) {
        if let State::InRecord(mut open) = std::mem::replace(&mut self.state, State::Idle) {
            open.close_category();
            debug!(
                line = open.sealed.line,
                date = %open.sealed.date_text,
                categories = open.sealed.categories.len(),
                "sealed record"
            );
            self.sealed.push(open.sealed);
        }
    }

    /// Apply one classified line
    pub fn apply(&mut self, line_no: usize, kind: LineKind, raw_line: &str) {
        match kind {
            LineKind::RecordStart {
                date_text,
                id_text,
                trailing_category_text,
            } => {
                self.seal();
                let mut open = OpenRecord {
                    sealed: SealedRecord {
                        line: line_no,
                        date_text,
                        id_text,
                        categories: Vec::new(),
                    },
                    category: None,
                };
                if let Some(name) = trailing_category_text {
                    open.open_category(name);
                }
                self.state = State::InRecord(open);
            }
            LineKind::CategoryHeader { raw_text } => match &mut self.state {
                State::InRecord(open) => {
                    open.open_category(clean_category_name(&raw_text));
                }
                State::Idle => {
                    self.diagnostics.push(
                        Diagnostic::new(
                            DiagnosticKind::OrphanWords,
                            format!("category header outside any record: {:?}", raw_text),
                        )
                        .at_line(line_no),
                    );
                }
            },
            LineKind::WordContinuation { raw_text } => {
                let words = split_words(&raw_text);
                let target = match &mut self.state {
                    State::InRecord(OpenRecord {
                        category: Some(category),
                        ..
                    }) => Some(category),
                    _ => None,
                };
                match target {
                    Some(category) => category.words.extend(words),
                    None => {
                        self.diagnostics.push(
                            Diagnostic::new(
                                DiagnosticKind::OrphanWords,
                                format!(
                                    "word line with no open category, discarded {} word(s): {:?}",
                                    words.len(),
                                    raw_text
                                ),
                            )
                            .at_line(line_no),
                        );
                    }
                }
            }
            LineKind::Noise => {
                self.diagnostics.push(
                    Diagnostic::new(
                        DiagnosticKind::Noise,
                        format!("unrecognised line: {:?}", raw_line.trim()),
                    )
                    .at_line(line_no),
                );
            }
        }
    }

    /// End of input: seal whatever is open and hand over the results
    pub fn finish(mut self) -> (Vec<SealedRecord>, Vec<Diagnostic>) {
        self.seal();
        (self.sealed, self.diagnostics)
    }
}
