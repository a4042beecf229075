// Puzzle Archive - Core Library
// Exposes all modules for use in CLI, API server, and tests

pub mod accumulator;
pub mod classifier;
pub mod config;
pub mod db;
pub mod export;
pub mod logging;
pub mod model;
pub mod normalize;
pub mod parser;
pub mod render;
pub mod validation;

// Re-export commonly used types
pub use accumulator::{Accumulator, SealedRecord};
pub use classifier::{LineClassifier, LineKind};
pub use config::{Config, ParserConfig};
pub use db::{
    Event, ImportSummary,
    setup_database, insert_records, get_all_records, get_records_by_date,
    get_record_by_id, search_records, count_records, backup_database,
    insert_event, get_events_for_entity,
};
pub use export::{export_records, ExportSummary};
pub use model::{Category, Diagnostic, DiagnosticKind, ParseOutcome, Record};
pub use normalize::{normalize_date, parse_human_date, DateError};
pub use parser::{parse, parse_file, parse_with, PuzzleParser};
pub use render::{render_record, render_records};
pub use validation::{check_record, Shortfall};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
